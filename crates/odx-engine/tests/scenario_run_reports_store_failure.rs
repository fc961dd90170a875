//! Scenario: a catastrophic store failure fails the run but releases the
//! gate.
//!
//! # Invariants under test
//!
//! 1. An unreachable store makes the run report Failed (with a message),
//!    and the error count increments.
//! 2. The single-flight gate is released on the failure path: a later run
//!    succeeds once the store is back.

use std::sync::Arc;

use odx_engine::{EngineConfig, ReconcilerEngine, RunOutcome, RunTrigger};
use odx_ledger::ChainStateReader;
use odx_testkit::{MemStore, PaperLedger, PaperSettlement};

const CONTRACT: &str = "0x00000000000000000000000000000000000000c1";

#[tokio::test]
async fn store_failure_fails_the_run_and_releases_the_gate() {
    let store = Arc::new(MemStore::new());
    let ledger = Arc::new(PaperLedger::new());
    let settlement = Arc::new(PaperSettlement::new());

    store.set_fail_queries(true);

    let engine = ReconcilerEngine::new(
        EngineConfig {
            contract_address: CONTRACT.to_string(),
            ..EngineConfig::default()
        },
        ChainStateReader::new(ledger),
        settlement,
        Arc::clone(&store) as Arc<dyn odx_engine::OrderStore>,
        Arc::clone(&store) as Arc<dyn odx_engine::TradeStore>,
    );

    let outcome = engine.run(RunTrigger::Manual).await;
    let RunOutcome::Failed { message } = outcome else {
        panic!("an unreachable store must fail the run, got {outcome:?}");
    };
    assert!(!message.is_empty());

    let stats = engine.stats_snapshot();
    assert_eq!(stats.runs, 1);
    assert_eq!(stats.errors, 1);
    assert!(!stats.running, "running flag clears on the failure path");

    // Store recovers; the gate must have been released.
    store.set_fail_queries(false);
    assert!(engine.run(RunTrigger::Manual).await.is_completed());
    assert_eq!(engine.stats_snapshot().runs, 2);
}
