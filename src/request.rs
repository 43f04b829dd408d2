//! Request/response types crossing the core boundary (spec §6).
//!
//! `MissionRequest` is the entire configuration surface of this system
//! (SPEC_FULL.md §1.3) — there is no environment or config-file layer
//! beneath it.

use crate::archive::FinishAction;
use crate::camera::ResolutionMode;
use crate::geometry::Coordinate;
use crate::patterns::{CorridorOptions, OrbitOptions};
use crate::simplify::{SimplificationStats, SimplifyOptions};
use crate::solver::FlightParams;
use crate::waypoint::Waypoint;
use serde::{Deserialize, Serialize};

/// Everything needed to run the pipeline once (spec §6.1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionRequest {
    pub polygon: Vec<Coordinate>,
    pub drone_model: String,
    pub pattern: PatternTag,
    pub target_gsd_cm: f64,
    pub front_overlap_pct: f64,
    pub side_overlap_pct: f64,
    pub flight_angle_deg: f64,
    pub resolution_mode: ResolutionMode,
    pub speed_override_ms: Option<f64>,
    /// Timer mode: overrides the camera's minimum photo interval (spec
    /// §6.1 `photo_interval_s`). The solver does not re-clamp this against
    /// the camera's own minimum (spec §9 open question 5 — preserved
    /// verbatim).
    pub photo_interval_s: Option<f64>,
    pub altitude_override_m: Option<f64>,
    pub gimbal_pitch_deg: f64,
    pub finish_action: FinishAction,
    pub takeoff_altitude_m: f64,
    pub simplify: Option<SimplifyOptions>,
    pub corridor: Option<CorridorOptions>,
    pub orbit: Option<OrbitOptions>,
}

impl Default for MissionRequest {
    fn default() -> Self {
        Self {
            polygon: Vec::new(),
            drone_model: String::new(),
            pattern: PatternTag::Grid,
            target_gsd_cm: 2.0,
            front_overlap_pct: 75.0,
            side_overlap_pct: 65.0,
            flight_angle_deg: 0.0,
            resolution_mode: ResolutionMode::High,
            speed_override_ms: None,
            photo_interval_s: None,
            altitude_override_m: None,
            gimbal_pitch_deg: -90.0,
            finish_action: FinishAction::GoHome,
            takeoff_altitude_m: 30.0,
            simplify: None,
            corridor: None,
            orbit: None,
        }
    }
}

/// Which flight pattern to generate; carries only the request-side tag
/// (`PatternKind` in [`crate::patterns`] carries the resolved options).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternTag {
    Grid,
    DoubleGrid,
    Corridor,
    Orbit,
}

/// One violation of the pre-core validation rules (spec §6.3). Unlike the
/// single fatal `PlannerError::Validation`, `validate()` accumulates every
/// violation it finds so a caller can report them all at once
/// (SPEC_FULL.md §2).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationViolation {
    pub message: String,
}

impl MissionRequest {
    /// Runs every rule in spec §6.3 and returns every violation found (not
    /// just the first). An empty result means the request may proceed to
    /// the pipeline.
    pub fn validate(&self) -> Vec<ValidationViolation> {
        let mut violations = Vec::new();
        let push = |violations: &mut Vec<ValidationViolation>, message: String| {
            violations.push(ValidationViolation { message });
        };

        if self.polygon.len() < 3 {
            push(
                &mut violations,
                format!("polygon must have at least 3 vertices, got {}", self.polygon.len()),
            );
        }
        for (i, c) in self.polygon.iter().enumerate() {
            if !c.is_finite() || !c.in_global_bounds() {
                push(&mut violations, format!("polygon vertex {i} is out of global bounds"));
            }
        }

        if self.target_gsd_cm <= 0.0 || self.target_gsd_cm > 20.0 {
            push(
                &mut violations,
                format!("target_gsd_cm must be in (0, 20], got {}", self.target_gsd_cm),
            );
        }
        if !(0.0..=99.0).contains(&self.front_overlap_pct) {
            push(
                &mut violations,
                format!("front_overlap_pct must be in [0, 99], got {}", self.front_overlap_pct),
            );
        }
        if !(0.0..=99.0).contains(&self.side_overlap_pct) {
            push(
                &mut violations,
                format!("side_overlap_pct must be in [0, 99], got {}", self.side_overlap_pct),
            );
        }
        if crate::camera::lookup(&self.drone_model).is_none() {
            push(&mut violations, format!("unknown drone model '{}'", self.drone_model));
        }

        violations
    }
}

/// A single non-fatal, out-of-band condition (spec §6.4), surfaced as a
/// typed enum rather than a bare string (SPEC_FULL.md §2) so callers can
/// match on kind; `Display` gives the human-readable message.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum MissionWarning {
    /// Waypoint count exceeds the consumer's limit of 99.
    WaypointCountExceeded { count: usize },
    /// Altitude exceeds the common legal limit of 120 m.
    AltitudeExceedsLegalLimit { altitude_m: f64 },
    /// Timer-mode actual front overlap dropped below 50%.
    TimerOverlapBelowFifty { actual_pct: f64 },
    /// Polygon area exceeds 500,000 m².
    OversizeArea { area_m2: f64 },
    /// Pattern produced zero waypoints (spec §7 `EmptyResultError`):
    /// non-fatal, folded into the warnings list rather than an error.
    EmptyResult,
}

impl std::fmt::Display for MissionWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MissionWarning::WaypointCountExceeded { count } => {
                write!(f, "waypoint count {count} exceeds the consumer limit of 99")
            }
            MissionWarning::AltitudeExceedsLegalLimit { altitude_m } => {
                write!(f, "altitude {altitude_m:.1} m exceeds the common 120 m legal limit")
            }
            MissionWarning::TimerOverlapBelowFifty { actual_pct } => {
                write!(f, "timer-mode actual front overlap {actual_pct:.0}% is below 50%")
            }
            MissionWarning::OversizeArea { area_m2 } => {
                write!(f, "polygon area {area_m2:.0} m² exceeds 500,000 m²")
            }
            MissionWarning::EmptyResult => write!(f, "pattern produced zero waypoints for the given polygon/spacing"),
        }
    }
}

/// The tuple `(FlightParams, [Waypoint], Warnings, SimplificationStats?)`
/// returned by the orchestrator (spec §3).
#[derive(Debug, Clone, Serialize)]
pub struct Mission {
    pub flight_params: FlightParams,
    pub waypoints: Vec<Waypoint>,
    pub warnings: Vec<MissionWarning>,
    pub simplification_stats: Option<SimplificationStats>,
}

/// What crosses back out of the core to the caller (spec §6.2).
#[derive(Debug, Clone, Serialize)]
pub struct MissionResponse {
    pub success: bool,
    pub message: String,
    pub mission: Option<Mission>,
    pub archive: Option<Vec<u8>>,
}

impl MissionResponse {
    pub(crate) fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            mission: None,
            archive: None,
        }
    }

    pub(crate) fn success(message: impl Into<String>, mission: Mission, archive: Option<Vec<u8>>) -> Self {
        Self {
            success: true,
            message: message.into(),
            mission: Some(mission),
            archive,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> MissionRequest {
        MissionRequest {
            polygon: vec![
                Coordinate::new(-74.0721, 4.7110),
                Coordinate::new(-74.0711, 4.7110),
                Coordinate::new(-74.0711, 4.7120),
                Coordinate::new(-74.0721, 4.7120),
            ],
            drone_model: "mini_4_pro".into(),
            ..MissionRequest::default()
        }
    }

    #[test]
    fn valid_request_has_no_violations() {
        assert!(valid_request().validate().is_empty());
    }

    #[test]
    fn two_vertex_polygon_is_rejected() {
        let mut request = valid_request();
        request.polygon.truncate(2);
        assert!(!request.validate().is_empty());
    }

    #[test]
    fn unknown_drone_model_is_rejected() {
        let mut request = valid_request();
        request.drone_model = "phantom_4".into();
        let violations = request.validate();
        assert!(violations.iter().any(|v| v.message.contains("unknown drone model")));
    }

    #[test]
    fn out_of_range_gsd_is_rejected() {
        let mut request = valid_request();
        request.target_gsd_cm = 25.0;
        assert!(!request.validate().is_empty());
    }

    #[test]
    fn accumulates_every_violation_not_just_the_first() {
        let mut request = valid_request();
        request.polygon.truncate(1);
        request.target_gsd_cm = -1.0;
        request.drone_model = "nonexistent".into();
        let violations = request.validate();
        assert!(violations.len() >= 3, "expected multiple violations, got {violations:?}");
    }
}
