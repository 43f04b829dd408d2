//! Optional structured-logging bootstrap (SPEC_FULL.md §1.1).
//!
//! A library must never install a global subscriber on its host's behalf,
//! so this is an explicit opt-in a binary or desktop shell calls once at
//! start-up — mirroring the pattern used across the weather-services
//! corpus (`edr-api`, `wms-api`): an `EnvFilter` built from `RUST_LOG`
//! (defaulting to `info`) feeding a `fmt` layer.

use tracing_subscriber::EnvFilter;

/// Installs a global `tracing` subscriber reading `RUST_LOG` (default
/// `info`). Safe to call at most once per process; a second call is a
/// silent no-op rather than a panic, since a desktop shell embedding this
/// crate may already have installed its own subscriber.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
