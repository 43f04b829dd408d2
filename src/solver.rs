//! Photogrammetric parameter solver (spec §4.3, L2): derives altitude,
//! footprint, spacings, and speed/interval from a camera spec, target GSD,
//! and overlap percentages.

use crate::camera::{CameraSpec, ResolutionMode};
use serde::{Deserialize, Serialize};

/// Inputs to the solver (spec §4.3). Mirrors the request fields that feed
/// it — kept separate from [`crate::request::MissionRequest`] so the solver
/// stays independently testable.
#[derive(Debug, Clone, Copy)]
pub struct SolverInput {
    pub camera: CameraSpec,
    /// Target ground sampling distance, cm/pixel.
    pub target_gsd_cm: f64,
    /// Front overlap, percent (0-99).
    pub front_overlap_pct: f64,
    /// Side overlap, percent (0-99).
    pub side_overlap_pct: f64,
    pub resolution_mode: ResolutionMode,
    /// Bypasses the GSD-derived altitude when set.
    pub altitude_override_m: Option<f64>,
    /// Timer mode: (chosen speed m/s, chosen interval s). Either may be set
    /// independently; `None` falls back to the camera-derived defaults.
    pub timer_speed_ms: Option<f64>,
    pub timer_interval_s: Option<f64>,
    /// Polygon area, m², for the photo-count/time estimates (spec §4.3 step 8).
    pub area_m2: Option<f64>,
}

/// Computed, immutable flight parameters (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlightParams {
    pub altitude_m: f64,
    pub gsd_cm: f64,
    pub footprint_width_m: f64,
    pub footprint_height_m: f64,
    pub line_spacing_m: f64,
    pub photo_spacing_m: f64,
    pub speed_ms: f64,
    pub interval_s: f64,
    pub actual_speed_ms: Option<f64>,
    pub actual_photo_spacing_m: Option<f64>,
    pub actual_front_overlap_pct: Option<f64>,
    pub estimated_photos: Option<u64>,
    pub estimated_time_min: Option<f64>,
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Runs the solver (spec §4.3 steps 1-8). Pure and deterministic: identical
/// inputs always produce byte-identical (bit-identical, for floats)
/// outputs (spec §8 "Round-trip / idempotence").
pub fn solve(input: &SolverInput) -> FlightParams {
    let cam = &input.camera;

    // Step 1: altitude.
    let altitude_m = input.altitude_override_m.unwrap_or_else(|| {
        (input.target_gsd_cm * cam.focal_length_mm * cam.image_width_px as f64)
            / (cam.sensor_width_mm * 100.0)
    });

    // Step 2: effective GSD, always back-computed from the final altitude.
    let gsd_cm =
        (cam.sensor_width_mm * altitude_m * 100.0) / (cam.focal_length_mm * cam.image_width_px as f64);

    // Step 3: footprint.
    let footprint_width_m = (cam.sensor_width_mm / cam.focal_length_mm) * altitude_m;
    let footprint_height_m = (cam.sensor_height_mm / cam.focal_length_mm) * altitude_m;

    // Step 4: spacings.
    let line_spacing_m = round_to(footprint_width_m * (1.0 - input.side_overlap_pct / 100.0), 2);
    let photo_spacing_m = round_to(footprint_height_m * (1.0 - input.front_overlap_pct / 100.0), 2);

    // Step 5: interval.
    let interval_s = input
        .timer_interval_s
        .unwrap_or_else(|| cam.min_interval_s(input.resolution_mode));

    // Step 6: recommended speed.
    let speed_ms = round_to(photo_spacing_m / interval_s, 2);

    // Step 7: timer-mode shadow fields.
    let (actual_speed_ms, actual_photo_spacing_m, actual_front_overlap_pct) =
        if let Some(chosen_speed) = input.timer_speed_ms {
            let actual_spacing = chosen_speed * interval_s;
            let actual_overlap = (100.0 * (1.0 - actual_spacing / footprint_height_m))
                .round()
                .clamp(0.0, 99.0);
            (
                Some(round_to(chosen_speed, 2)),
                Some(round_to(actual_spacing, 2)),
                Some(actual_overlap),
            )
        } else {
            (None, None, None)
        };

    // Step 8: estimates, if an area was provided.
    let (estimated_photos, estimated_time_min) = match input.area_m2 {
        Some(area) if area > 0.0 && photo_spacing_m > 0.0 && line_spacing_m > 0.0 => {
            let photos = (1.2 * area / (photo_spacing_m * line_spacing_m)).floor() as u64;
            let effective_speed = actual_speed_ms.unwrap_or(speed_ms);
            let time = if effective_speed > 0.0 {
                Some(round_to(
                    (area.sqrt() * area.sqrt() / line_spacing_m * 1.1) / effective_speed / 60.0,
                    1,
                ))
            } else {
                None
            };
            (Some(photos), time)
        }
        _ => (None, None),
    };

    FlightParams {
        altitude_m: round_to(altitude_m, 1),
        gsd_cm: round_to(gsd_cm, 3),
        footprint_width_m: round_to(footprint_width_m, 2),
        footprint_height_m: round_to(footprint_height_m, 2),
        line_spacing_m,
        photo_spacing_m,
        speed_ms,
        interval_s,
        actual_speed_ms,
        actual_photo_spacing_m,
        actual_front_overlap_pct,
        estimated_photos,
        estimated_time_min,
    }
}
