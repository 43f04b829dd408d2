//! Async command boundary (SPEC_FULL.md §0): the only async seam in the
//! crate, mirroring the teacher's `#[tauri::command] pub async fn
//! generate_flightpath(...)` surface. The pipeline itself is synchronous
//! and CPU-bound (spec §5 "no internal parallelism... completes in well
//! under a second"); this wrapper exists only so a desktop shell's event
//! loop is never blocked waiting on it.

use crate::orchestrator;
use crate::request::{MissionRequest, MissionResponse};

/// Runs a mission-generation request on the calling async runtime's
/// blocking pool and returns the structured response (spec §6.2). The
/// caller treats this as a black-box future (spec §5); cancellation is
/// the caller dropping the returned future, which is safe since the core
/// has no external effects to undo (spec §5 "idempotent").
#[tauri::command]
pub async fn plan_mission(request: MissionRequest) -> MissionResponse {
    tokio::task::spawn_blocking(move || orchestrator::plan_mission(&request))
        .await
        .unwrap_or_else(|join_err| MissionResponse::failure(format!("mission task panicked: {join_err}")))
}
