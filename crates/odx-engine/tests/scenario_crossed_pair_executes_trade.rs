//! Scenario: a crossed book produces exactly one settled trade.
//!
//! A BUY (price 10, remaining 100) against a SELL (price 9, remaining 50)
//! on the same contract must yield one pair, one settlement call, and one
//! trade row at the maker price: price 9, amount 50, total 450, fee 0.45.

use std::sync::Arc;

use odx_engine::{EngineConfig, ReconcilerEngine, RunOutcome, RunTrigger};
use odx_ledger::ChainStateReader;
use odx_schemas::Side;
use odx_testkit::{buy_order, sell_order, MemStore, PaperLedger, PaperSettlement};

const CONTRACT: &str = "0x00000000000000000000000000000000000000c1";

fn engine(
    store: &Arc<MemStore>,
    ledger: &Arc<PaperLedger>,
    settlement: &Arc<PaperSettlement>,
) -> ReconcilerEngine {
    ReconcilerEngine::new(
        EngineConfig {
            contract_address: CONTRACT.to_string(),
            ..EngineConfig::default()
        },
        ChainStateReader::new(Arc::clone(ledger) as Arc<dyn odx_ledger::OrderStorage>),
        Arc::clone(settlement) as Arc<dyn odx_ledger::SettlementClient>,
        Arc::clone(store) as Arc<dyn odx_engine::OrderStore>,
        Arc::clone(store) as Arc<dyn odx_engine::TradeStore>,
    )
}

#[tokio::test]
async fn crossed_pair_settles_at_maker_price() {
    let store = Arc::new(MemStore::new());
    let ledger = Arc::new(PaperLedger::new());
    let settlement = Arc::new(PaperSettlement::new());

    let buy = buy_order(CONTRACT, 1, 10.0, 100.0, 100.0, 30);
    let sell = sell_order(CONTRACT, 2, 9.0, 50.0, 50.0, 20);
    let (buy_id, sell_id) = (buy.id, sell.id);

    // Ledger mirrors local state so the sync stage is a no-op.
    ledger.seed_order(Side::Buy, 1, &buy.user_address, 100.0, 10.0, 100.0, true);
    ledger.seed_order(Side::Sell, 2, &sell.user_address, 50.0, 9.0, 50.0, true);

    store.insert_order(buy);
    store.insert_order(sell);

    let engine = engine(&store, &ledger, &settlement);
    let outcome = engine.run(RunTrigger::Manual).await;

    let RunOutcome::Completed(summary) = outcome else {
        panic!("run must complete, got {outcome:?}");
    };
    assert_eq!(summary.sync_checked, 2);
    assert_eq!(summary.sync_updated, 0);
    assert_eq!(summary.matches_found, 1);
    assert_eq!(summary.matches_executed, 1);
    assert_eq!(summary.errors, 0);

    assert_eq!(settlement.calls(), vec![(1, 2)]);

    let trades = store.trades();
    assert_eq!(trades.len(), 1);
    let trade = &trades[0];
    assert_eq!(trade.buy_order_id, buy_id);
    assert_eq!(trade.sell_order_id, sell_id);
    assert_eq!(trade.price, 9.0, "maker price: the resting sell's limit");
    assert_eq!(trade.amount, 50.0);
    assert!((trade.total_value - 450.0).abs() < 1e-9);
    assert!((trade.fee - 0.45).abs() < 1e-9);
    assert_eq!(trade.tx_hash, "paper:tx:1:2");

    let stats = engine.stats_snapshot();
    assert_eq!(stats.runs, 1);
    assert_eq!(stats.matches_executed, 1);
    assert_eq!(stats.errors, 0);
    assert!(stats.last_run_at.is_some());
}

#[tokio::test]
async fn trade_amount_never_exceeds_either_remaining() {
    let store = Arc::new(MemStore::new());
    let ledger = Arc::new(PaperLedger::new());
    let settlement = Arc::new(PaperSettlement::new());

    // One big buy against two sells; ledger mirrors local state.
    let buy = buy_order(CONTRACT, 1, 10.0, 100.0, 100.0, 30);
    let sell_a = sell_order(CONTRACT, 2, 9.0, 60.0, 60.0, 20);
    let sell_b = sell_order(CONTRACT, 3, 9.5, 60.0, 60.0, 10);

    ledger.seed_order(Side::Buy, 1, &buy.user_address, 100.0, 10.0, 100.0, true);
    ledger.seed_order(Side::Sell, 2, &sell_a.user_address, 60.0, 9.0, 60.0, true);
    ledger.seed_order(Side::Sell, 3, &sell_b.user_address, 60.0, 9.5, 60.0, true);

    for o in [buy, sell_a, sell_b] {
        store.insert_order(o);
    }

    let engine = engine(&store, &ledger, &settlement);
    let outcome = engine.run(RunTrigger::Manual).await;
    assert!(outcome.is_completed());

    let trades = store.trades();
    assert_eq!(trades.len(), 2);
    // Second pair is sized from the buy's provisional remaining (40), so
    // the pass allocates exactly 100 of the buy, never more.
    assert_eq!(trades[0].amount, 60.0);
    assert_eq!(trades[1].amount, 40.0);
}
