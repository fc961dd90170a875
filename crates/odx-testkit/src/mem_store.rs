//! In-memory implementation of the engine store seams.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use odx_engine::{OrderStore, TradeStore};
use odx_schemas::{NewTrade, Order, OrderStatus};

/// Order and trade rows behind plain mutexes. `open_orders` mirrors the SQL
/// ordering (oldest first); scripted switches simulate the store being
/// unreachable.
#[derive(Default)]
pub struct MemStore {
    orders: Mutex<BTreeMap<Uuid, Order>>,
    trades: Mutex<Vec<(Uuid, NewTrade)>>,
    fail_queries: AtomicBool,
    fail_probe: AtomicBool,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_order(&self, order: Order) {
        self.orders
            .lock()
            .expect("mem store lock")
            .insert(order.id, order);
    }

    pub fn order(&self, order_id: Uuid) -> Option<Order> {
        self.orders
            .lock()
            .expect("mem store lock")
            .get(&order_id)
            .cloned()
    }

    pub fn trades(&self) -> Vec<NewTrade> {
        self.trades
            .lock()
            .expect("mem store lock")
            .iter()
            .map(|(_, t)| t.clone())
            .collect()
    }

    /// Make `open_orders` fail, simulating an unreachable store.
    pub fn set_fail_queries(&self, fail: bool) {
        self.fail_queries.store(fail, Ordering::SeqCst);
    }

    /// Make the health probe fail without touching query behavior.
    pub fn set_fail_probe(&self, fail: bool) {
        self.fail_probe.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl OrderStore for MemStore {
    async fn open_orders(&self, contract_address: &str) -> Result<Vec<Order>> {
        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(anyhow!("paper store: scripted query failure"));
        }

        let mut open: Vec<Order> = self
            .orders
            .lock()
            .expect("mem store lock")
            .values()
            .filter(|o| o.contract_address == contract_address && o.status == OrderStatus::Active)
            .cloned()
            .collect();
        open.sort_by_key(|o| o.created_at);
        Ok(open)
    }

    async fn apply_sync(
        &self,
        order_id: Uuid,
        status: OrderStatus,
        remaining: f64,
        filled: f64,
    ) -> Result<()> {
        let mut orders = self.orders.lock().expect("mem store lock");
        let order = orders
            .get_mut(&order_id)
            .ok_or_else(|| anyhow!("unknown order {order_id}"))?;

        order.status = status;
        order.remaining_amount = remaining;
        order.filled_amount = filled;
        order.updated_at = Utc::now();
        Ok(())
    }

    async fn probe(&self) -> Result<()> {
        if self.fail_probe.load(Ordering::SeqCst) {
            return Err(anyhow!("paper store: scripted probe failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl TradeStore for MemStore {
    async fn insert_trade(&self, trade: NewTrade) -> Result<Uuid> {
        let trade_id = Uuid::new_v4();
        self.trades
            .lock()
            .expect("mem store lock")
            .push((trade_id, trade));
        Ok(trade_id)
    }
}
