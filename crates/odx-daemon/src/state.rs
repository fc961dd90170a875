//! Shared runtime state for odx-daemon.
//!
//! Handlers receive `State<Arc<AppState>>` from Axum. The daemon owns no
//! reconciliation logic itself: everything is delegated to the scheduler,
//! which the boot path wires against the real store and ledger (or tests
//! wire against the in-memory doubles).

use std::sync::Arc;

use odx_engine::ReconciliationScheduler;

/// Static build metadata included in health responses.
#[derive(Clone, Debug)]
pub struct BuildInfo {
    pub service: &'static str,
    pub version: &'static str,
}

/// Cloneable (Arc) handle shared across all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub scheduler: Arc<ReconciliationScheduler>,
    pub build: BuildInfo,
}

impl AppState {
    pub fn new(scheduler: Arc<ReconciliationScheduler>) -> Self {
        Self {
            scheduler,
            build: BuildInfo {
                service: "odx-daemon",
                version: env!("CARGO_PKG_VERSION"),
            },
        }
    }
}
