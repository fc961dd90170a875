//! Trade executor: submits detected pairs for settlement and records the
//! resulting trades.
//!
//! Pairs are processed sequentially, in the detector's priority order, so
//! trade recording stays deterministic and two pairs can never race for the
//! same order's remaining amount. A failed pair is logged with both ledger
//! order ids and skipped; it never aborts the batch.
//!
//! This component does not mutate order rows. The next sync cycle is the
//! sole authority on post-settlement order state.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use odx_ledger::{LedgerError, SettlementClient};
use odx_match::MatchCandidate;
use odx_schemas::NewTrade;

use crate::config::ExecutorConfig;
use crate::store::TradeStore;

/// One pair's failure during an execution pass.
#[derive(Debug, Clone)]
pub struct ExecFailure {
    pub buy_chain_order_id: i64,
    pub sell_chain_order_id: i64,
    pub message: String,
}

/// Aggregate result of one execution pass.
#[derive(Debug, Clone, Default)]
pub struct ExecReport {
    pub attempted: usize,
    pub executed: usize,
    pub failures: Vec<ExecFailure>,
}

pub struct TradeExecutor {
    settlement: Arc<dyn SettlementClient>,
    trades: Arc<dyn TradeStore>,
    config: ExecutorConfig,
}

impl TradeExecutor {
    pub fn new(
        settlement: Arc<dyn SettlementClient>,
        trades: Arc<dyn TradeStore>,
        config: ExecutorConfig,
    ) -> Self {
        Self {
            settlement,
            trades,
            config,
        }
    }

    /// Execute candidates sequentially in the given priority order.
    pub async fn execute_pairs(
        &self,
        contract_address: &str,
        candidates: &[MatchCandidate],
    ) -> ExecReport {
        let mut report = ExecReport::default();

        for pair in candidates {
            report.attempted += 1;
            match self.execute_one(contract_address, pair).await {
                Ok(trade_id) => {
                    info!(
                        %trade_id,
                        buy = pair.buy.chain_order_id,
                        sell = pair.sell.chain_order_id,
                        price = pair.price,
                        amount = pair.amount,
                        "trade recorded"
                    );
                    report.executed += 1;
                }
                Err(err) => {
                    warn!(
                        buy = pair.buy.chain_order_id,
                        sell = pair.sell.chain_order_id,
                        error = %err,
                        "match execution failed; pair skipped"
                    );
                    report.failures.push(ExecFailure {
                        buy_chain_order_id: pair.buy.chain_order_id,
                        sell_chain_order_id: pair.sell.chain_order_id,
                        message: format!("{err:#}"),
                    });
                }
            }
        }

        report
    }

    async fn execute_one(
        &self,
        contract_address: &str,
        pair: &MatchCandidate,
    ) -> Result<Uuid> {
        let buy_id = u64::try_from(pair.buy.chain_order_id)
            .map_err(|_| LedgerError::Decode(format!("negative chain id: {}", pair.buy.chain_order_id)))?;
        let sell_id = u64::try_from(pair.sell.chain_order_id)
            .map_err(|_| LedgerError::Decode(format!("negative chain id: {}", pair.sell.chain_order_id)))?;

        let receipt = self
            .settlement
            .match_orders(contract_address, buy_id, sell_id)
            .await?;

        let total_value = pair.price * pair.amount;
        let trade = NewTrade {
            buy_order_id: pair.buy.id,
            sell_order_id: pair.sell.id,
            buyer_address: pair.buy.user_address.clone(),
            seller_address: pair.sell.user_address.clone(),
            base_symbol: self.config.base_symbol.clone(),
            quote_symbol: self.config.quote_symbol.clone(),
            price: pair.price,
            amount: pair.amount,
            total_value,
            fee: self.config.fee_rate * total_value,
            tx_hash: receipt.tx_hash,
            block_number: i64::try_from(receipt.block_number).unwrap_or(i64::MAX),
            executed_at: Utc::now(),
        };

        self.trades
            .insert_trade(trade)
            .await
            .context("insert trade")
    }
}
