//! GeoFlight Planner: a photogrammetric drone-survey mission planner.
//!
//! Pure computational core — projection, geometry, the parameter solver,
//! the four flight-pattern generators, the waypoint simplifier, and the
//! DJI-WPML archive builder — plus a thin async command boundary for a
//! desktop shell. See `DESIGN.md` for how each module is grounded.

pub mod archive;
pub mod camera;
pub mod commands;
pub mod error;
pub mod geometry;
pub mod logging;
pub mod orchestrator;
pub mod patterns;
pub mod projection;
pub mod request;
pub mod simplify;
pub mod solver;
pub mod waypoint;

pub use error::{PlannerError, Result};
pub use orchestrator::plan_mission;
pub use request::{Mission, MissionRequest, MissionResponse, MissionWarning, PatternTag};
