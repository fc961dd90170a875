//! Scenario: ledger ground truth drives local order state.
//!
//! # Invariants under test
//!
//! 1. An order whose ledger read returns the zero-address owner transitions
//!    to EXECUTED with remaining 0, regardless of prior local state.
//! 2. A live, partially filled ledger order updates local remaining/filled
//!    and keeps `filled + remaining == amount`.
//! 3. A ledger order marked inactive settles locally even when the ledger
//!    still reports a remaining amount.
//!
//! All tests are pure in-process; no DB or network required.

use std::sync::Arc;

use odx_engine::{OrderStore, OrderSynchronizer, SyncConfig};
use odx_ledger::ChainStateReader;
use odx_schemas::{OrderStatus, Side};
use odx_testkit::{buy_order, sell_order, MemStore, PaperLedger};

const CONTRACT: &str = "0x00000000000000000000000000000000000000c1";

fn synchronizer(store: Arc<MemStore>, ledger: Arc<PaperLedger>) -> OrderSynchronizer {
    OrderSynchronizer::new(
        ChainStateReader::new(ledger),
        store,
        SyncConfig::default(),
    )
}

#[tokio::test]
async fn vanished_order_settles_to_executed_with_zero_remaining() {
    let store = Arc::new(MemStore::new());
    let ledger = Arc::new(PaperLedger::new());

    let order = buy_order(CONTRACT, 7, 10.0, 100.0, 40.0, 60);
    let order_id = order.id;
    store.insert_order(order);
    // Nothing seeded on the ledger: the read returns the zero-address
    // sentinel.

    let report = synchronizer(Arc::clone(&store), ledger)
        .sync_orders(CONTRACT)
        .await
        .expect("sync must not fail at the top level");

    assert_eq!(report.checked, 1);
    assert_eq!(report.updated, 1);
    assert!(report.failures.is_empty());

    let synced = store.order(order_id).expect("order still exists");
    assert_eq!(synced.status, OrderStatus::Executed);
    assert_eq!(synced.remaining_amount, 0.0);
    assert_eq!(synced.filled_amount, synced.amount);
}

#[tokio::test]
async fn live_partial_fill_updates_amounts_and_conserves() {
    let store = Arc::new(MemStore::new());
    let ledger = Arc::new(PaperLedger::new());

    let order = sell_order(CONTRACT, 3, 9.0, 100.0, 100.0, 60);
    let order_id = order.id;
    ledger.seed_order(Side::Sell, 3, &order.user_address, 100.0, 9.0, 30.0, true);
    store.insert_order(order);

    let report = synchronizer(Arc::clone(&store), ledger)
        .sync_orders(CONTRACT)
        .await
        .expect("sync must not fail at the top level");
    assert_eq!(report.updated, 1);

    let synced = store.order(order_id).expect("order still exists");
    assert_eq!(synced.status, OrderStatus::Active);
    assert_eq!(synced.remaining_amount, 30.0);
    assert_eq!(synced.filled_amount, 70.0);
    assert!(
        (synced.filled_amount + synced.remaining_amount - synced.amount).abs() < 1e-9,
        "conservation must hold after every sync"
    );
}

#[tokio::test]
async fn inactive_ledger_order_settles_locally() {
    let store = Arc::new(MemStore::new());
    let ledger = Arc::new(PaperLedger::new());

    let order = buy_order(CONTRACT, 11, 10.0, 100.0, 50.0, 60);
    let order_id = order.id;
    ledger.seed_order(Side::Buy, 11, &order.user_address, 100.0, 10.0, 50.0, false);
    store.insert_order(order);

    synchronizer(Arc::clone(&store), ledger)
        .sync_orders(CONTRACT)
        .await
        .expect("sync must not fail at the top level");

    let synced = store.order(order_id).expect("order still exists");
    assert_eq!(synced.status, OrderStatus::Executed);
    assert_eq!(synced.remaining_amount, 0.0);
    assert_eq!(synced.filled_amount, synced.amount);
}

#[tokio::test]
async fn orders_outside_the_contract_scope_are_not_considered() {
    let store = Arc::new(MemStore::new());
    let ledger = Arc::new(PaperLedger::new());

    let foreign = buy_order(
        "0x00000000000000000000000000000000000000c2",
        5,
        10.0,
        100.0,
        100.0,
        60,
    );
    let foreign_id = foreign.id;
    store.insert_order(foreign);

    let report = synchronizer(Arc::clone(&store), ledger)
        .sync_orders(CONTRACT)
        .await
        .expect("sync must not fail at the top level");

    assert_eq!(report.checked, 0);
    let untouched = store.order(foreign_id).expect("order still exists");
    assert_eq!(untouched.status, OrderStatus::Active);

    // It would have settled (nothing on the ledger) had it been in scope.
    let open = store
        .open_orders("0x00000000000000000000000000000000000000c2")
        .await
        .expect("query");
    assert_eq!(open.len(), 1);
}
