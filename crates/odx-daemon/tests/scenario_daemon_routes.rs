//! In-process scenario tests for odx-daemon HTTP endpoints.
//!
//! These tests spin up the Axum router **without** binding a TCP socket.
//! Each test calls `routes::build_router` and drives it via
//! `tower::ServiceExt::oneshot` — no network, DB, or chain I/O required:
//! the scheduler is wired against the in-memory doubles from odx-testkit.

use std::sync::Arc;
use std::time::Duration;

use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt; // oneshot

use odx_daemon::{routes, state};
use odx_engine::{
    EngineConfig, OrderStore, ReconcilerEngine, ReconciliationScheduler, SchedulerConfig,
    TradeStore,
};
use odx_ledger::ChainStateReader;
use odx_schemas::Side;
use odx_testkit::{buy_order, sell_order, MemStore, PaperLedger, PaperSettlement};

const CONTRACT: &str = "0x00000000000000000000000000000000000000c1";

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build a fresh in-process router backed by the paper store/ledger.
/// Returns the store so tests can seed and inspect rows.
fn make_router() -> (axum::Router, Arc<MemStore>) {
    let store = Arc::new(MemStore::new());
    let ledger = Arc::new(PaperLedger::new());

    // A crossed book so a manual run has something to settle.
    let buy = buy_order(CONTRACT, 1, 10.0, 100.0, 100.0, 30);
    let sell = sell_order(CONTRACT, 2, 9.0, 50.0, 50.0, 20);
    ledger.seed_order(Side::Buy, 1, &buy.user_address, 100.0, 10.0, 100.0, true);
    ledger.seed_order(Side::Sell, 2, &sell.user_address, 50.0, 9.0, 50.0, true);
    store.insert_order(buy);
    store.insert_order(sell);

    let engine = Arc::new(ReconcilerEngine::new(
        EngineConfig {
            contract_address: CONTRACT.to_string(),
            ..EngineConfig::default()
        },
        ChainStateReader::new(ledger),
        Arc::new(PaperSettlement::new()),
        Arc::clone(&store) as Arc<dyn OrderStore>,
        Arc::clone(&store) as Arc<dyn TradeStore>,
    ));
    let scheduler = Arc::new(ReconciliationScheduler::new(
        engine,
        Arc::clone(&store) as Arc<dyn OrderStore>,
        SchedulerConfig {
            interval: Duration::from_secs(60),
        },
    ));

    let st = Arc::new(state::AppState::new(scheduler));
    (routes::build_router(st), store)
}

/// Drive the router with a single request and return (status, body_bytes).
async fn call(router: axum::Router, req: Request<axum::body::Body>) -> (StatusCode, bytes::Bytes) {
    let resp = router.oneshot(req).await.expect("oneshot failed");
    let status = resp.status();
    let body = resp
        .into_body()
        .collect()
        .await
        .expect("body collect failed")
        .to_bytes();
    (status, body)
}

fn parse_json(b: bytes::Bytes) -> serde_json::Value {
    serde_json::from_slice(&b).expect("body is not valid JSON")
}

fn get(uri: &str) -> Request<axum::body::Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap()
}

fn post(uri: &str) -> Request<axum::body::Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<axum::body::Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(axum::body::Body::from(body.to_string()))
        .unwrap()
}

// ---------------------------------------------------------------------------
// GET /v1/health
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_reports_unhealthy_while_worker_is_stopped() {
    let (router, _store) = make_router();
    let (status, body) = call(router, get("/v1/health")).await;

    assert_eq!(status, StatusCode::OK);
    let json = parse_json(body);
    assert_eq!(json["healthy"], false, "worker not started yet");
    assert_eq!(json["worker_active"], false);
    assert_eq!(json["store_ok"], true);
    assert_eq!(json["service"], "odx-daemon");
    assert_eq!(json["stats"]["runs"], 0);
}

// ---------------------------------------------------------------------------
// GET /v1/status
// ---------------------------------------------------------------------------

#[tokio::test]
async fn status_reports_scope_interval_and_stats() {
    let (router, _store) = make_router();
    let (status, body) = call(router, get("/v1/status")).await;

    assert_eq!(status, StatusCode::OK);
    let json = parse_json(body);
    assert_eq!(json["worker_active"], false);
    assert_eq!(json["interval_secs"], 60);
    assert_eq!(json["contract_address"], CONTRACT);
    assert_eq!(json["stats"]["runs"], 0);
}

// ---------------------------------------------------------------------------
// POST /v1/run
// ---------------------------------------------------------------------------

#[tokio::test]
async fn manual_run_executes_and_reports_counts() {
    let (router, store) = make_router();
    let (status, body) = call(router, post("/v1/run")).await;

    assert_eq!(status, StatusCode::OK);
    let json = parse_json(body);
    assert_eq!(json["success"], true);
    assert_eq!(json["summary"]["trigger"], "manual");
    assert_eq!(json["summary"]["matches_found"], 1);
    assert_eq!(json["summary"]["matches_executed"], 1);
    assert_eq!(json["summary"]["errors"], 0);

    assert_eq!(store.trades().len(), 1, "the crossed pair settled");
}

// ---------------------------------------------------------------------------
// POST /v1/worker/start  /v1/worker/stop
// ---------------------------------------------------------------------------

#[tokio::test]
async fn worker_start_then_stop_roundtrips() {
    let (router, _store) = make_router();

    let (status, body) = call(router.clone(), post("/v1/worker/start")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse_json(body)["worker_active"], true);

    let (status, body) = call(router.clone(), get("/v1/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse_json(body)["healthy"], true);

    let (status, body) = call(router, post("/v1/worker/stop")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse_json(body)["worker_active"], false);
}

// ---------------------------------------------------------------------------
// POST /v1/worker/interval
// ---------------------------------------------------------------------------

#[tokio::test]
async fn interval_below_floor_is_rejected_with_400() {
    let (router, _store) = make_router();

    let (status, body) = call(
        router.clone(),
        post_json("/v1/worker/interval", serde_json::json!({ "interval_secs": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json = parse_json(body);
    assert!(
        json["error"].as_str().unwrap_or_default().contains("floor"),
        "error names the floor, got: {json}"
    );

    let (status, body) = call(
        router,
        post_json("/v1/worker/interval", serde_json::json!({ "interval_secs": 30 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse_json(body)["interval_secs"], 30);
}
