//! Scripted settlement collaborator.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use odx_ledger::{LedgerError, SettlementClient, SettlementReceipt};

/// Succeeds by default with stable receipts; `fail_pair` / `fail_all`
/// script reverts. Every call is recorded in arrival order, including the
/// failing ones.
#[derive(Default)]
pub struct PaperSettlement {
    calls: Mutex<Vec<(u64, u64)>>,
    failing_pairs: Mutex<BTreeSet<(u64, u64)>>,
    fail_all: AtomicBool,
}

impl PaperSettlement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a revert for one (buy, sell) pair.
    pub fn fail_pair(&self, buy_chain_order_id: u64, sell_chain_order_id: u64) {
        self.failing_pairs
            .lock()
            .expect("paper settlement lock")
            .insert((buy_chain_order_id, sell_chain_order_id));
    }

    /// Script a revert for every settlement call.
    pub fn fail_all(&self) {
        self.fail_all.store(true, Ordering::SeqCst);
    }

    /// Settlement calls received so far, as (buy, sell) chain id pairs.
    pub fn calls(&self) -> Vec<(u64, u64)> {
        self.calls.lock().expect("paper settlement lock").clone()
    }
}

#[async_trait]
impl SettlementClient for PaperSettlement {
    async fn match_orders(
        &self,
        _contract_address: &str,
        buy_chain_order_id: u64,
        sell_chain_order_id: u64,
    ) -> Result<SettlementReceipt, LedgerError> {
        let seq = {
            let mut calls = self.calls.lock().expect("paper settlement lock");
            calls.push((buy_chain_order_id, sell_chain_order_id));
            calls.len() as u64
        };

        let reverted = self.fail_all.load(Ordering::SeqCst)
            || self
                .failing_pairs
                .lock()
                .expect("paper settlement lock")
                .contains(&(buy_chain_order_id, sell_chain_order_id));

        if reverted {
            return Err(LedgerError::Reverted {
                tx_hash: format!("paper:tx:revert:{buy_chain_order_id}:{sell_chain_order_id}"),
            });
        }

        Ok(SettlementReceipt {
            tx_hash: format!("paper:tx:{buy_chain_order_id}:{sell_chain_order_id}"),
            block_number: seq,
        })
    }
}
