//! The [`Waypoint`] produced by every pattern generator (spec §3).

use serde::{Deserialize, Serialize};

/// A single georeferenced flight-plan waypoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    /// Zero-based sequence index. Invariant: across a [`crate::request::Mission`]
    /// these form the exact sequence `0..N-1` in order (spec invariant 1).
    pub index: usize,
    pub lon: f64,
    pub lat: f64,
    /// Altitude, metres, relative to takeoff.
    pub altitude_m: f64,
    /// Heading, degrees from true north, clockwise, `[0, 360)`.
    pub heading_deg: f64,
    /// Gimbal pitch, degrees; -90 = nadir, 0 = horizon.
    pub gimbal_pitch_deg: f64,
    pub speed_ms: f64,
    pub photo_trigger: bool,
}

impl Waypoint {
    /// Re-applies sequential indices `0..N-1` to a waypoint list, leaving
    /// every other field untouched. Used by the simplifier and the
    /// double-grid concatenation, both of which must re-index after
    /// reordering or dropping waypoints (spec invariant 1).
    pub fn reindex(waypoints: &mut [Waypoint]) {
        for (i, wp) in waypoints.iter_mut().enumerate() {
            wp.index = i;
        }
    }
}
