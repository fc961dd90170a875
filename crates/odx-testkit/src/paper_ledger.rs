//! In-memory stand-in for the on-chain order storage.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use odx_ledger::{ether_to_raw, ChainOrderRecord, LedgerError, OrderStorage, DEFAULT_DECIMALS};
use odx_schemas::Side;

/// Orders are keyed by (side, chain id). Reading an id that was never
/// seeded, or was removed to simulate full settlement, returns the
/// zero-address sentinel record, exactly like the contract's storage
/// accessor.
#[derive(Default)]
pub struct PaperLedger {
    orders: Mutex<BTreeMap<(Side, u64), ChainOrderRecord>>,
    failing: Mutex<BTreeSet<(Side, u64)>>,
    read_latency: Option<Duration>,
}

impl PaperLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// A ledger whose every read suspends for `latency` first. Used by
    /// overlap scenarios that need a run to be genuinely in flight.
    pub fn with_read_latency(latency: Duration) -> Self {
        Self {
            read_latency: Some(latency),
            ..Self::default()
        }
    }

    /// Seed one live order, amounts in ether units.
    pub fn seed_order(
        &self,
        side: Side,
        chain_order_id: u64,
        owner: &str,
        amount: f64,
        price: f64,
        remaining: f64,
        active: bool,
    ) {
        self.orders.lock().expect("paper ledger lock").insert(
            (side, chain_order_id),
            ChainOrderRecord {
                owner: owner.to_string(),
                amount: ether_to_raw(amount, DEFAULT_DECIMALS),
                price: ether_to_raw(price, DEFAULT_DECIMALS),
                remaining: ether_to_raw(remaining, DEFAULT_DECIMALS),
                active,
            },
        );
    }

    /// Remove an order: subsequent reads see the zero-address sentinel.
    pub fn remove_order(&self, side: Side, chain_order_id: u64) {
        self.orders
            .lock()
            .expect("paper ledger lock")
            .remove(&(side, chain_order_id));
    }

    /// Script a transport failure for one order id.
    pub fn fail_order(&self, side: Side, chain_order_id: u64) {
        self.failing
            .lock()
            .expect("paper ledger lock")
            .insert((side, chain_order_id));
    }
}

#[async_trait]
impl OrderStorage for PaperLedger {
    async fn read_order(
        &self,
        side: Side,
        chain_order_id: u64,
    ) -> Result<ChainOrderRecord, LedgerError> {
        if let Some(latency) = self.read_latency {
            tokio::time::sleep(latency).await;
        }

        if self
            .failing
            .lock()
            .expect("paper ledger lock")
            .contains(&(side, chain_order_id))
        {
            return Err(LedgerError::Transport(format!(
                "paper: scripted read failure for {side} #{chain_order_id}"
            )));
        }

        Ok(self
            .orders
            .lock()
            .expect("paper ledger lock")
            .get(&(side, chain_order_id))
            .cloned()
            .unwrap_or_else(ChainOrderRecord::absent))
    }
}
