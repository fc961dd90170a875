//! Request and response types for all odx-daemon HTTP endpoints.
//!
//! These types are `Serialize + Deserialize` so they can be JSON-encoded
//! by Axum and decoded by tests. No business logic lives here.

use serde::{Deserialize, Serialize};

use odx_engine::{RunSummary, StatsSnapshot};

// ---------------------------------------------------------------------------
// GET /v1/health
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `worker_active && store_ok`.
    pub healthy: bool,
    pub worker_active: bool,
    pub store_ok: bool,
    pub service: String,
    pub version: String,
    pub stats: StatsSnapshot,
}

// ---------------------------------------------------------------------------
// GET /v1/status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub worker_active: bool,
    pub interval_secs: u64,
    pub contract_address: String,
    pub stats: StatsSnapshot,
}

// ---------------------------------------------------------------------------
// POST /v1/run
// ---------------------------------------------------------------------------

/// 200 body for a run that executed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunAccepted {
    pub success: bool,
    pub summary: RunSummary,
}

/// 409 body for contention ("already running") and 500 body for run-level
/// failure; `message` distinguishes the two.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRefused {
    pub success: bool,
    pub message: String,
}

// ---------------------------------------------------------------------------
// POST /v1/worker/*
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerResponse {
    pub worker_active: bool,
    pub interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntervalRequest {
    pub interval_secs: u64,
}

/// 400 body for rejected admin input (e.g. an interval below the floor).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
