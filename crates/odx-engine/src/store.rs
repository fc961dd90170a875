//! Store seams.
//!
//! The engine never talks to a database directly; it goes through these
//! traits. `odx-db` implements them over Postgres, `odx-testkit` in memory.
//! Split in two so the writer discipline stays visible at the type level:
//! the synchronizer holds an [`OrderStore`], the executor a [`TradeStore`],
//! and neither can touch the other's rows.

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use odx_schemas::{NewTrade, Order, OrderStatus};

/// Order rows, scoped queries plus the one mutation the sync path owns.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// ACTIVE orders scoped to one exchange contract, oldest first.
    async fn open_orders(&self, contract_address: &str) -> Result<Vec<Order>>;

    /// Apply one sync decision and refresh `updated_at`.
    async fn apply_sync(
        &self,
        order_id: Uuid,
        status: OrderStatus,
        remaining: f64,
        filled: f64,
    ) -> Result<()>;

    /// Trivial connectivity probe for health checks. Must not mutate.
    async fn probe(&self) -> Result<()>;
}

/// Append-only trade rows; the executor is the only writer.
#[async_trait]
pub trait TradeStore: Send + Sync {
    /// Insert one immutable trade row; returns the assigned id.
    async fn insert_trade(&self, trade: NewTrade) -> Result<Uuid>;
}
