//! Flight-pattern generators (spec §4.4, L3): grid, double-grid, corridor,
//! orbit. Every generator shares the contract
//! `(polygon, flight_params, flight_angle_deg, gimbal_pitch) -> [Waypoint]`,
//! runs in a local planar frame anchored at the polygon centroid, and
//! converts back to WGS84 as its final step (spec §4.4 preamble). Dispatch
//! across the four variants is a tagged union at the orchestrator (spec §9
//! "Polymorphism across patterns").

pub mod corridor;
pub mod grid;
pub mod orbit;

use crate::error::Result;
use crate::geometry::{Coordinate, LocalPoint, Polygon};
use crate::projection::Transformer;
use crate::solver::FlightParams;
use crate::waypoint::Waypoint;
use serde::{Deserialize, Serialize};

/// Corridor-specific knobs (spec §6.1 `corridor` substructure).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CorridorOptions {
    /// Number of parallel lines, clamped to `[1, 5]` (spec §4.4.3).
    pub num_lines: u32,
}

impl Default for CorridorOptions {
    fn default() -> Self {
        Self { num_lines: 1 }
    }
}

/// Orbit-specific knobs (spec §6.1 `orbit` substructure). `center` and
/// `radius_m` default to the spec §4.4.4 algorithm's own computation (the
/// polygon centroid and `1.2 * max_vertex_distance`) when left unset;
/// when given, they override that computation directly instead.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OrbitOptions {
    pub center: Option<Coordinate>,
    pub radius_m: Option<f64>,
    pub num_orbits: u32,
    pub altitude_step_m: f64,
    pub photos_per_orbit: u32,
}

impl Default for OrbitOptions {
    fn default() -> Self {
        Self {
            center: None,
            radius_m: None,
            num_orbits: 1,
            altitude_step_m: 10.0,
            photos_per_orbit: 24,
        }
    }
}

/// Which of the four flight patterns to generate, with its pattern-specific
/// options attached (spec §6.1 `pattern`).
#[derive(Debug, Clone, Copy)]
pub enum PatternKind {
    Grid,
    DoubleGrid,
    Corridor(CorridorOptions),
    Orbit(OrbitOptions),
}

/// Common inputs to every generator.
#[derive(Debug, Clone, Copy)]
pub struct PatternRequest<'a> {
    pub polygon: &'a Polygon,
    pub flight_params: &'a FlightParams,
    pub flight_angle_deg: f64,
    pub gimbal_pitch_deg: f64,
    pub buffer_percent: f64,
}

/// Generates the waypoint list for `kind` against `request`.
pub fn generate(kind: PatternKind, request: &PatternRequest) -> Result<Vec<Waypoint>> {
    match kind {
        PatternKind::Grid => grid::generate(request, 0.0),
        PatternKind::DoubleGrid => grid::generate_double(request),
        PatternKind::Corridor(opts) => corridor::generate(request, opts),
        PatternKind::Orbit(opts) => orbit::generate(request, opts),
    }
}

/// Builds a [`Transformer`] anchored at the polygon centroid and projects
/// every ring vertex into the local plane (shared setup for grid, corridor;
/// orbit reuses it too since it also needs the centroid).
pub(crate) fn project_polygon(polygon: &Polygon) -> Result<(Transformer, Vec<LocalPoint>)> {
    let open = polygon.open_vertices();
    let mean_lon = open.iter().map(|c| c.lon).sum::<f64>() / open.len() as f64;
    let mean_lat = open.iter().map(|c| c.lat).sum::<f64>() / open.len() as f64;
    let transformer = Transformer::new(Coordinate::new(mean_lon, mean_lat))?;

    let mut local = Vec::with_capacity(polygon.ring().len());
    for c in polygon.ring() {
        local.push(transformer.to_local(*c)?);
    }
    Ok((transformer, local))
}

pub(crate) fn to_wgs84_waypoint(
    transformer: &Transformer,
    point: LocalPoint,
    altitude_m: f64,
    heading_deg: f64,
    gimbal_pitch_deg: f64,
    speed_ms: f64,
) -> Result<Waypoint> {
    let coord = transformer.to_wgs84(point)?;
    Ok(Waypoint {
        index: 0,
        lon: coord.lon,
        lat: coord.lat,
        altitude_m,
        heading_deg,
        gimbal_pitch_deg,
        speed_ms,
        photo_trigger: true,
    })
}
