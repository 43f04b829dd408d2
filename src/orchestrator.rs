//! Pipeline composition (spec §2 "Orchestrator"): validate → solve →
//! pattern → simplify → archive, accumulating warnings along the way.
//! This is the only component that composes the lower layers and the only
//! place a wall-clock timestamp is sampled (for the archive's
//! `createTime`/`updateTime`) — every layer beneath it stays pure.

use crate::archive::{self, ArchiveOptions};
use crate::camera::{self, CameraSpec};
use crate::error::PlannerError;
use crate::geometry::{crosses_antimeridian, signed_area, Coordinate, Polygon};
use crate::patterns::{self, CorridorOptions, OrbitOptions, PatternKind, PatternRequest};
use crate::projection::Transformer;
use crate::request::{Mission, MissionRequest, MissionResponse, MissionWarning, PatternTag};
use crate::simplify::{self, SimplifyOptions};
use crate::solver::{self, SolverInput};

const LEGAL_ALTITUDE_LIMIT_M: f64 = 120.0;
const CONSUMER_WAYPOINT_LIMIT: usize = 99;
const TIMER_OVERLAP_WARNING_THRESHOLD_PCT: f64 = 50.0;
const OVERSIZE_AREA_M2: f64 = 500_000.0;

/// Runs the full pipeline and returns a structured response. Never panics
/// on a malformed request — validation failures produce
/// `MissionResponse { success: false, .. }` rather than propagating a
/// `PlannerError` (spec §7: "Violations produce `ValidationError` without
/// running the pipeline").
pub fn plan_mission(request: &MissionRequest) -> MissionResponse {
    let violations = request.validate();
    if !violations.is_empty() {
        let message = violations
            .iter()
            .map(|v| v.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        tracing::warn!(violations = violations.len(), "mission request failed validation");
        return MissionResponse::failure(format!("validation failed: {message}"));
    }

    match run_pipeline(request) {
        Ok(response) => response,
        Err(err) => {
            tracing::error!(error = %err, "mission pipeline aborted");
            MissionResponse::failure(err.to_string())
        }
    }
}

fn run_pipeline(request: &MissionRequest) -> Result<MissionResponse, PlannerError> {
    let camera = camera::lookup(&request.drone_model)
        .expect("drone model validated to exist by MissionRequest::validate");

    if crosses_antimeridian(&request.polygon) {
        return Err(PlannerError::Projection(
            "polygon crosses the antimeridian; no single local UTM zone can host it".into(),
        ));
    }

    let polygon = Polygon::new(request.polygon.clone());
    let area_m2 = polygon_area_m2(&polygon)?;

    let mut warnings = Vec::new();
    if area_m2 > OVERSIZE_AREA_M2 {
        warnings.push(MissionWarning::OversizeArea { area_m2 });
    }

    let flight_params = solve_flight_params(request, &camera, area_m2);
    tracing::debug!(altitude_m = flight_params.altitude_m, "flight parameters solved");

    if flight_params.altitude_m > LEGAL_ALTITUDE_LIMIT_M {
        warnings.push(MissionWarning::AltitudeExceedsLegalLimit {
            altitude_m: flight_params.altitude_m,
        });
    }
    if let Some(actual_overlap) = flight_params.actual_front_overlap_pct {
        if actual_overlap < TIMER_OVERLAP_WARNING_THRESHOLD_PCT {
            warnings.push(MissionWarning::TimerOverlapBelowFifty {
                actual_pct: actual_overlap,
            });
        }
    }

    // spec §8 boundary behaviour: a polygon smaller than half a single
    // photo's covered ground area cannot hold a real flight line, so this
    // is an empty mission regardless of what the buffered-clip generators
    // below would otherwise produce (the outward buffer in `patterns::grid`
    // can inflate a tiny ring past its own clip threshold and emit a few
    // spurious waypoints if this isn't checked first).
    let min_area_m2 = flight_params.photo_spacing_m * flight_params.line_spacing_m / 2.0;
    if area_m2 < min_area_m2 {
        warnings.push(MissionWarning::EmptyResult);
        for warning in &warnings {
            tracing::warn!(%warning, "mission warning");
        }
        let mission = Mission {
            flight_params,
            waypoints: Vec::new(),
            warnings,
            simplification_stats: None,
        };
        return Ok(MissionResponse::success("empty mission", mission, None));
    }

    let pattern_kind = resolve_pattern_kind(request);
    let pattern_request = PatternRequest {
        polygon: &polygon,
        flight_params: &flight_params,
        flight_angle_deg: request.flight_angle_deg,
        gimbal_pitch_deg: request.gimbal_pitch_deg,
        buffer_percent: 15.0,
    };
    let raw_waypoints = patterns::generate(pattern_kind, &pattern_request)?;

    if raw_waypoints.is_empty() {
        warnings.push(MissionWarning::EmptyResult);
        for warning in &warnings {
            tracing::warn!(%warning, "mission warning");
        }
        let mission = Mission {
            flight_params,
            waypoints: Vec::new(),
            warnings,
            simplification_stats: None,
        };
        return Ok(MissionResponse::success("empty mission", mission, None));
    }
    tracing::info!(waypoint_count = raw_waypoints.len(), "pattern generated");

    let simplify_options = request.simplify.unwrap_or(SimplifyOptions {
        enabled: false,
        angle_threshold_deg: 15.0,
        max_time_between_s: None,
        max_distance_between_m: None,
    });
    let (waypoints, stats) = simplify::simplify(&raw_waypoints, &simplify_options);
    tracing::debug!(
        original = stats.original_count,
        simplified = stats.simplified_count,
        reduction_pct = stats.reduction_pct,
        "simplification complete"
    );

    if waypoints.len() > CONSUMER_WAYPOINT_LIMIT {
        warnings.push(MissionWarning::WaypointCountExceeded {
            count: waypoints.len(),
        });
    }
    for warning in &warnings {
        tracing::warn!(%warning, "mission warning");
    }

    let archive_options = ArchiveOptions {
        finish_action: request.finish_action,
        takeoff_altitude_m: request.takeoff_altitude_m,
        created_at_ms: now_unix_millis(),
    };
    let archive_bytes = archive::build(&waypoints, &camera, &archive_options)?;
    tracing::info!(bytes = archive_bytes.len(), "archive built");

    let mission = Mission {
        flight_params,
        waypoints,
        warnings,
        simplification_stats: Some(stats),
    };
    Ok(MissionResponse::success("mission generated", mission, Some(archive_bytes)))
}

fn solve_flight_params(request: &MissionRequest, camera: &CameraSpec, area_m2: f64) -> solver::FlightParams {
    let input = SolverInput {
        camera: *camera,
        target_gsd_cm: request.target_gsd_cm,
        front_overlap_pct: request.front_overlap_pct,
        side_overlap_pct: request.side_overlap_pct,
        resolution_mode: request.resolution_mode,
        altitude_override_m: request.altitude_override_m,
        timer_speed_ms: request.speed_override_ms,
        timer_interval_s: request.photo_interval_s,
        area_m2: Some(area_m2),
    };
    solver::solve(&input)
}

fn resolve_pattern_kind(request: &MissionRequest) -> PatternKind {
    match request.pattern {
        PatternTag::Grid => PatternKind::Grid,
        PatternTag::DoubleGrid => PatternKind::DoubleGrid,
        PatternTag::Corridor => PatternKind::Corridor(request.corridor.unwrap_or(CorridorOptions::default())),
        PatternTag::Orbit => PatternKind::Orbit(request.orbit.unwrap_or(OrbitOptions::default())),
    }
}

/// Polygon area in m², computed via the shoelace formula on a local planar
/// projection anchored at the polygon's own centroid (spec §4.3 step 8
/// needs an area; spec §4.2 only defines `signed_area` in a local frame).
fn polygon_area_m2(polygon: &Polygon) -> Result<f64, PlannerError> {
    let open = polygon.open_vertices();
    if open.len() < 3 {
        return Ok(0.0);
    }
    let mean_lon = open.iter().map(|c| c.lon).sum::<f64>() / open.len() as f64;
    let mean_lat = open.iter().map(|c| c.lat).sum::<f64>() / open.len() as f64;
    let transformer = Transformer::new(Coordinate::new(mean_lon, mean_lat))?;

    let mut local = Vec::with_capacity(open.len());
    for c in open {
        local.push(transformer.to_local(*c)?);
    }
    let area = signed_area(&local).abs();
    if area < 1e-6 {
        return Err(PlannerError::Geometry("polygon area is degenerate (approximately zero)".into()));
    }
    Ok(area)
}

fn now_unix_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::FinishAction;
    use crate::camera::ResolutionMode;

    fn s1_request() -> MissionRequest {
        MissionRequest {
            polygon: vec![
                Coordinate::new(-74.0721, 4.7110),
                Coordinate::new(-74.0711, 4.7110),
                Coordinate::new(-74.0711, 4.7120),
                Coordinate::new(-74.0721, 4.7120),
            ],
            drone_model: "mini_4_pro".into(),
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

    #[test]
    fn s1_end_to_end_grid_mission() {
        let response = plan_mission(&s1_request());
        assert!(response.success, "{}", response.message);
        let mission = response.mission.unwrap();
        assert!(mission.waypoints.len() >= 40);
        assert!((mission.flight_params.altitude_m - 14.0).abs() < 1e-6);
        assert!(response.archive.is_some());
    }

    #[test]
    fn antimeridian_crossing_polygon_is_rejected() {
        let mut request = s1_request();
        request.polygon = vec![
            Coordinate::new(179.9, 10.0),
            Coordinate::new(-179.9, 10.0),
            Coordinate::new(-179.9, 10.01),
            Coordinate::new(179.9, 10.01),
        ];
        let response = plan_mission(&request);
        assert!(!response.success);
        assert!(response.message.contains("antimeridian"));
    }

    #[test]
    fn invalid_request_fails_before_pipeline() {
        let mut request = s1_request();
        request.polygon.truncate(2);
        let response = plan_mission(&request);
        assert!(!response.success);
        assert!(response.mission.is_none());
        assert!(response.archive.is_none());
    }

    #[test]
    fn sub_threshold_area_is_empty_before_pattern_generation() {
        // A ~1.1m square is far smaller than photo_spacing * line_spacing /
        // 2, so this must short-circuit to an empty, archive-less mission
        // rather than let the grid generator's outward clip buffer (which
        // is larger than the polygon itself at this scale) emit a few
        // spurious waypoints.
        let mut request = s1_request();
        request.polygon = vec![
            Coordinate::new(-74.07210, 4.71100),
            Coordinate::new(-74.07209, 4.71100),
            Coordinate::new(-74.07209, 4.71101),
            Coordinate::new(-74.07210, 4.71101),
        ];
        let response = plan_mission(&request);
        assert!(response.success, "{}", response.message);
        let mission = response.mission.unwrap();
        assert!(mission.waypoints.is_empty());
        assert!(mission.warnings.iter().any(|w| matches!(w, MissionWarning::EmptyResult)));
        assert!(response.archive.is_none());
    }

    #[test]
    fn double_grid_roughly_doubles_waypoint_count() {
        let mut grid_request = s1_request();
        grid_request.pattern = PatternTag::Grid;
        let grid = plan_mission(&grid_request).mission.unwrap().waypoints.len();

        let mut double_request = s1_request();
        double_request.pattern = PatternTag::DoubleGrid;
        let double = plan_mission(&double_request).mission.unwrap().waypoints.len();

        let ratio = double as f64 / grid as f64;
        assert!((1.5..=2.5).contains(&ratio), "ratio was {ratio}");
    }

    #[test]
    fn s3_orbit_mission_has_expected_waypoint_count() {
        let mut request = s1_request();
        request.pattern = PatternTag::Orbit;
        request.orbit = Some(OrbitOptions {
            center: None,
            radius_m: None,
            num_orbits: 2,
            altitude_step_m: 10.0,
            photos_per_orbit: 24,
        });
        let response = plan_mission(&request);
        assert!(response.success, "{}", response.message);
        assert_eq!(response.mission.unwrap().waypoints.len(), 48);
    }

    #[test]
    fn oversize_area_triggers_warning() {
        let mut request = s1_request();
        // A roughly 1km square around the same anchor comfortably exceeds
        // the 500,000 m^2 oversize threshold.
        request.polygon = vec![
            Coordinate::new(-74.08, 4.70),
            Coordinate::new(-74.07, 4.70),
            Coordinate::new(-74.07, 4.71),
            Coordinate::new(-74.08, 4.71),
        ];
        let response = plan_mission(&request);
        assert!(response.success, "{}", response.message);
        let mission = response.mission.unwrap();
        assert!(mission
            .warnings
            .iter()
            .any(|w| matches!(w, MissionWarning::OversizeArea { .. })));
    }

    #[test]
    fn timer_mode_interval_and_speed_overrides_reach_the_solver() {
        let mut request = s1_request();
        request.photo_interval_s = Some(1.0);
        request.speed_override_ms = Some(10.0);
        let response = plan_mission(&request);
        assert!(response.success, "{}", response.message);
        let params = response.mission.unwrap().flight_params;
        assert_eq!(params.interval_s, 1.0);
        assert_eq!(params.actual_speed_ms, Some(10.0));

        let actual_overlap = params.actual_front_overlap_pct.expect("timer mode shadow overlap");
        assert!(actual_overlap < TIMER_OVERLAP_WARNING_THRESHOLD_PCT);
    }

    #[test]
    fn low_timer_overlap_surfaces_as_warning() {
        let mut request = s1_request();
        request.photo_interval_s = Some(1.0);
        request.speed_override_ms = Some(10.0);
        let response = plan_mission(&request);
        assert!(response.success, "{}", response.message);
        let mission = response.mission.unwrap();
        assert!(mission
            .warnings
            .iter()
            .any(|w| matches!(w, MissionWarning::TimerOverlapBelowFifty { .. })));
    }
}
