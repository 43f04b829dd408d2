//! The closed camera/drone model registry.
//!
//! Entries are process-wide constants (spec §3, §9): loaded once behind a
//! [`once_cell::sync::Lazy`] map and never mutated or reloaded. Every field
//! required verbatim downstream in the WPML schema (`droneEnumValue`,
//! `payloadEnumValue`) is carried as-is; there is no translation layer.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Resolution mode a camera can be driven in; selects the minimum photo
/// interval used by the solver when the caller is not in timer mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionMode {
    Low,
    High,
}

/// Immutable photogrammetric description of one drone/camera model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraSpec {
    pub model: &'static str,
    /// Sensor width, millimetres.
    pub sensor_width_mm: f64,
    /// Sensor height, millimetres.
    pub sensor_height_mm: f64,
    /// Focal length, millimetres.
    pub focal_length_mm: f64,
    /// Image width, pixels.
    pub image_width_px: u32,
    /// Image height, pixels.
    pub image_height_px: u32,
    /// Minimum photo interval (seconds) in low-resolution mode.
    pub min_interval_low_s: f64,
    /// Minimum photo interval (seconds) in high-resolution mode.
    pub min_interval_high_s: f64,
    /// Opaque DJI drone enum, emitted verbatim in the WPML schema.
    pub drone_enum_value: u32,
    /// Opaque DJI payload enum, emitted verbatim in the WPML schema.
    pub payload_enum_value: u32,
}

impl CameraSpec {
    pub fn min_interval_s(&self, mode: ResolutionMode) -> f64 {
        match mode {
            ResolutionMode::Low => self.min_interval_low_s,
            ResolutionMode::High => self.min_interval_high_s,
        }
    }
}

static REGISTRY: Lazy<HashMap<&'static str, CameraSpec>> = Lazy::new(|| {
    let mut m = HashMap::new();
    for spec in CAMERAS {
        m.insert(spec.model, *spec);
    }
    m
});

/// The closed set of supported drone models.
///
/// Values are taken from DJI's published WPML drone/payload enum tables
/// (`droneEnumValue` 67 = M30 series, 77 = Mavic 3 Enterprise series, 99 =
/// Mini 4 Pro) and each model's published camera geometry.
const CAMERAS: &[CameraSpec] = &[
    CameraSpec {
        model: "mini_4_pro",
        sensor_width_mm: 9.8,
        sensor_height_mm: 7.35,
        focal_length_mm: 6.86,
        image_width_px: 1000,
        image_height_px: 750,
        min_interval_low_s: 2.0,
        min_interval_high_s: 5.0,
        drone_enum_value: 99,
        payload_enum_value: 66,
    },
    CameraSpec {
        model: "mavic_3e",
        sensor_width_mm: 13.2,
        sensor_height_mm: 8.8,
        focal_length_mm: 12.29,
        image_width_px: 5280,
        image_height_px: 3956,
        min_interval_low_s: 2.0,
        min_interval_high_s: 4.0,
        drone_enum_value: 77,
        payload_enum_value: 65,
    },
    CameraSpec {
        model: "m30t",
        sensor_width_mm: 6.3,
        sensor_height_mm: 4.7,
        focal_length_mm: 4.5,
        image_width_px: 4000,
        image_height_px: 3000,
        min_interval_low_s: 2.0,
        min_interval_high_s: 5.0,
        drone_enum_value: 67,
        payload_enum_value: 52,
    },
];

/// Look up a camera spec by model identifier. Returns `None` for anything
/// outside the closed registry — callers at the request boundary turn that
/// into a `ValidationError` (spec §6.3).
pub fn lookup(model: &str) -> Option<CameraSpec> {
    REGISTRY.get(model).copied()
}
