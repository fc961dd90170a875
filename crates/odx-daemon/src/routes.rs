//! Axum router and all HTTP handlers for odx-daemon.
//!
//! `build_router` is the single entry point; `main.rs` calls it and
//! attaches middleware layers. All handlers are `pub(crate)` so the
//! scenario tests in `tests/` can compose the router directly.
//!
//! The admin operations map 1:1 to the scheduler: health, status, manual
//! run, worker start/stop, interval change. Authorization is intentionally
//! not enforced here; deploy this surface behind an authenticated proxy.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tracing::info;

use odx_engine::RunOutcome;

use crate::{
    api_types::{
        ErrorResponse, HealthResponse, IntervalRequest, RunAccepted, RunRefused, StatusResponse,
        WorkerResponse,
    },
    state::AppState,
};

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the complete application router wired to the given shared state.
///
/// Middleware layers (CORS, tracing) are **not** applied here; `main.rs`
/// attaches them after this call so tests can use the bare router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/health", get(health))
        .route("/v1/status", get(status_handler))
        .route("/v1/run", post(run_manual))
        .route("/v1/worker/start", post(worker_start))
        .route("/v1/worker/stop", post(worker_stop))
        .route("/v1/worker/interval", post(worker_interval))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// GET /v1/health
// ---------------------------------------------------------------------------

pub(crate) async fn health(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    let health = st.scheduler.health_check().await;
    (
        StatusCode::OK,
        Json(HealthResponse {
            healthy: health.healthy,
            worker_active: health.worker_active,
            store_ok: health.store_ok,
            service: st.build.service.to_string(),
            version: st.build.version.to_string(),
            stats: health.stats,
        }),
    )
}

// ---------------------------------------------------------------------------
// GET /v1/status
// ---------------------------------------------------------------------------

pub(crate) async fn status_handler(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    let engine = st.scheduler.engine();
    (
        StatusCode::OK,
        Json(StatusResponse {
            worker_active: st.scheduler.is_active().await,
            interval_secs: st.scheduler.interval().await.as_secs(),
            contract_address: engine.contract_address().to_string(),
            stats: engine.stats_snapshot(),
        }),
    )
}

// ---------------------------------------------------------------------------
// POST /v1/run
// ---------------------------------------------------------------------------

/// Trigger exactly one reconciliation run outside the timer cadence.
///
/// Contention is a 409 with `message: "already running"`, a normal and
/// expected outcome distinct from a 500 run-level failure.
pub(crate) async fn run_manual(State(st): State<Arc<AppState>>) -> Response {
    match st.scheduler.run_manual().await {
        RunOutcome::Completed(summary) => {
            info!(duration_ms = summary.duration_ms, "manual run complete");
            (
                StatusCode::OK,
                Json(RunAccepted {
                    success: true,
                    summary,
                }),
            )
                .into_response()
        }
        RunOutcome::AlreadyRunning => (
            StatusCode::CONFLICT,
            Json(RunRefused {
                success: false,
                message: "already running".to_string(),
            }),
        )
            .into_response(),
        RunOutcome::Failed { message } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(RunRefused {
                success: false,
                message,
            }),
        )
            .into_response(),
    }
}

// ---------------------------------------------------------------------------
// POST /v1/worker/start  /v1/worker/stop
// ---------------------------------------------------------------------------

pub(crate) async fn worker_start(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    st.scheduler.start().await;
    info!("worker/start");
    worker_response(&st).await
}

pub(crate) async fn worker_stop(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    st.scheduler.stop().await;
    info!("worker/stop");
    worker_response(&st).await
}

// ---------------------------------------------------------------------------
// POST /v1/worker/interval
// ---------------------------------------------------------------------------

pub(crate) async fn worker_interval(
    State(st): State<Arc<AppState>>,
    Json(req): Json<IntervalRequest>,
) -> Response {
    let interval = std::time::Duration::from_secs(req.interval_secs);
    match st.scheduler.set_interval(interval).await {
        Ok(()) => {
            info!(interval_secs = req.interval_secs, "worker/interval");
            let (status, body) = worker_response(&st).await;
            (status, body).into_response()
        }
        Err(err) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("{err:#}"),
            }),
        )
            .into_response(),
    }
}

async fn worker_response(st: &Arc<AppState>) -> (StatusCode, Json<WorkerResponse>) {
    (
        StatusCode::OK,
        Json(WorkerResponse {
            worker_active: st.scheduler.is_active().await,
            interval_secs: st.scheduler.interval().await.as_secs(),
        }),
    )
}
