//! Order synchronizer: pulls ledger ground truth for every open order and
//! reconciles local status / remaining amount.
//!
//! Per-order failures are absorbed, counted and logged; they never abort
//! the rest of the pass. The only top-level error is the store being
//! unreachable for the initial candidate query. A second pass against an
//! unchanged ledger writes nothing (the write is skipped when neither
//! status nor remaining moved beyond the configured tolerance).

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, warn};
use uuid::Uuid;

use odx_ledger::{ChainStateReader, LedgerError, OnChainOrder};
use odx_schemas::{Order, OrderStatus};

use crate::config::SyncConfig;
use crate::store::OrderStore;

/// One order's failure during a sync pass.
#[derive(Debug, Clone)]
pub struct SyncFailure {
    pub order_id: Uuid,
    pub chain_order_id: i64,
    pub message: String,
}

/// Aggregate result of one synchronization pass.
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    /// Candidates considered.
    pub checked: usize,
    /// Rows actually written.
    pub updated: usize,
    pub failures: Vec<SyncFailure>,
}

pub struct OrderSynchronizer {
    reader: ChainStateReader,
    store: Arc<dyn OrderStore>,
    config: SyncConfig,
}

impl OrderSynchronizer {
    pub fn new(reader: ChainStateReader, store: Arc<dyn OrderStore>, config: SyncConfig) -> Self {
        Self {
            reader,
            store,
            config,
        }
    }

    /// Synchronize every ACTIVE order scoped to `contract_address`.
    pub async fn sync_orders(&self, contract_address: &str) -> Result<SyncReport> {
        let candidates = self
            .store
            .open_orders(contract_address)
            .await
            .context("fetch open orders for sync")?;
        Ok(self.sync_candidates(&candidates).await)
    }

    /// Synchronize an explicit candidate set. Candidate order is irrelevant:
    /// per-order decisions are independent of each other.
    pub async fn sync_candidates(&self, candidates: &[Order]) -> SyncReport {
        let mut report = SyncReport::default();

        for order in candidates {
            report.checked += 1;
            match self.sync_one(order).await {
                Ok(true) => report.updated += 1,
                Ok(false) => {}
                Err(err) => {
                    warn!(
                        order_id = %order.id,
                        chain_order_id = order.chain_order_id,
                        error = %err,
                        "order sync failed"
                    );
                    report.failures.push(SyncFailure {
                        order_id: order.id,
                        chain_order_id: order.chain_order_id,
                        message: format!("{err:#}"),
                    });
                }
            }
        }

        report
    }

    /// Returns `Ok(true)` if a row was written, `Ok(false)` for a no-op.
    async fn sync_one(&self, order: &Order) -> Result<bool> {
        let onchain = self.read_with_retry(order).await?;
        let decision = reconcile_decision(order, &onchain);

        let status_changed = decision.status != order.status;
        let amount_moved =
            (decision.remaining - order.remaining_amount).abs() > self.config.amount_tolerance;
        if !status_changed && !amount_moved {
            debug!(order_id = %order.id, "sync no-op");
            return Ok(false);
        }

        self.store
            .apply_sync(order.id, decision.status, decision.remaining, decision.filled)
            .await
            .context("apply sync update")?;

        debug!(
            order_id = %order.id,
            status = %decision.status,
            remaining = decision.remaining,
            "order synced"
        );
        Ok(true)
    }

    async fn read_with_retry(&self, order: &Order) -> Result<OnChainOrder> {
        let chain_id = u64::try_from(order.chain_order_id)
            .map_err(|_| LedgerError::Decode(format!("negative chain id: {}", order.chain_order_id)))?;

        let attempts = self.config.read_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.reader.read_order(order.side, chain_id).await {
                Ok(rec) => return Ok(rec),
                Err(err) if attempt < attempts => {
                    debug!(
                        order_id = %order.id,
                        attempt,
                        error = %err,
                        "ledger read attempt failed; retrying"
                    );
                    attempt += 1;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct SyncDecision {
    status: OrderStatus,
    remaining: f64,
    filled: f64,
}

/// Pure reconciliation rule for one order against its ledger record.
///
/// An order gone from the book is fully settled. An order still on the book
/// is ACTIVE only while the ledger marks it active with positive remaining.
/// Whenever the decision is EXECUTED, remaining is forced to zero and
/// filled to the original amount, keeping
/// `filled + remaining == amount` and `EXECUTED ⇒ remaining == 0` true.
fn reconcile_decision(order: &Order, onchain: &OnChainOrder) -> SyncDecision {
    if onchain.exists && onchain.active && onchain.remaining > 0.0 {
        return SyncDecision {
            status: OrderStatus::Active,
            remaining: onchain.remaining,
            filled: (order.amount - onchain.remaining).max(0.0),
        };
    }

    SyncDecision {
        status: OrderStatus::Executed,
        remaining: 0.0,
        filled: order.amount,
    }
}
