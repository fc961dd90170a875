//! odx-daemon entry point.
//!
//! This file is intentionally thin: it sets up tracing, connects the store
//! and the ledger, wires the scheduler, and starts the HTTP server. All
//! route handlers live in `routes.rs`; shared state types in `state.rs`.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use axum::http::{HeaderValue, Method};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{info, Level};

use odx_daemon::{routes, state};
use odx_engine::{
    EngineConfig, OrderStore, ReconcilerEngine, ReconciliationScheduler, SchedulerConfig,
    TradeStore,
};
use odx_ledger::{ChainStateReader, OrderStorage, SettlementClient, Web3Ledger, Web3LedgerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env.local if present (dev convenience). Silent if the file does
    // not exist — production injects env vars directly.
    let _ = dotenvy::from_filename(".env.local");

    init_tracing();

    let pool = odx_db::connect_from_env().await?;
    odx_db::migrate(&pool).await?;
    let store = Arc::new(odx_db::PgStore::new(pool));

    let ledger_cfg = Web3LedgerConfig {
        rpc_url: env_or("ODX_RPC_URL", "http://127.0.0.1:8545"),
        contract_address: std::env::var("ODX_CONTRACT_ADDRESS")
            .context("missing env var ODX_CONTRACT_ADDRESS")?,
        settlement_key: std::env::var("ODX_SETTLEMENT_KEY").ok(),
        confirmations: 1,
    };
    let ledger = Arc::new(Web3Ledger::connect(&ledger_cfg)?);

    let storage: Arc<dyn OrderStorage> = Arc::clone(&ledger) as Arc<dyn OrderStorage>;
    let settlement: Arc<dyn SettlementClient> = Arc::clone(&ledger) as Arc<dyn SettlementClient>;
    let orders: Arc<dyn OrderStore> = Arc::clone(&store) as Arc<dyn OrderStore>;

    let engine = Arc::new(ReconcilerEngine::new(
        EngineConfig {
            contract_address: ledger.contract_address(),
            ..EngineConfig::default()
        },
        ChainStateReader::new(storage),
        settlement,
        Arc::clone(&orders),
        Arc::clone(&store) as Arc<dyn TradeStore>,
    ));

    let scheduler = Arc::new(ReconciliationScheduler::new(
        engine,
        orders,
        SchedulerConfig {
            interval: interval_from_env(),
        },
    ));

    // The worker starts with the daemon; the admin surface can stop it.
    scheduler.start().await;

    let shared = Arc::new(state::AppState::new(scheduler));
    let app = routes::build_router(Arc::clone(&shared))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_localhost_only());

    let addr = bind_addr_from_env().unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 8787)));
    info!("odx-daemon listening on http://{}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app)
        .await
        .context("server crashed")?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn interval_from_env() -> Duration {
    std::env::var("ODX_RECONCILE_INTERVAL_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(SchedulerConfig::default().interval)
}

fn bind_addr_from_env() -> Option<SocketAddr> {
    std::env::var("ODX_DAEMON_ADDR").ok()?.parse().ok()
}

/// CORS: allow only localhost origins.
fn cors_localhost_only() -> CorsLayer {
    let allowed_origins = [
        "http://localhost",
        "http://127.0.0.1",
        "http://localhost:3000",
        "http://127.0.0.1:3000",
        "http://localhost:5173",
        "http://127.0.0.1:5173",
    ];

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(tower_http::cors::Any)
}
