//! Postgres store for the desk.
//!
//! Connection and migration helpers, a connectivity/schema probe, and
//! [`PgStore`] — the production implementation of the engine's
//! [`OrderStore`] / [`TradeStore`] seams. Scenario coverage for store
//! behavior lives in `odx-engine` against the in-memory double; this crate
//! stays a thin SQL layer.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use odx_engine::{OrderStore, TradeStore};
use odx_schemas::{NewTrade, Order, OrderStatus, Side, Trade};

pub const ENV_DB_URL: &str = "ODX_DATABASE_URL";

/// Connect to Postgres using ODX_DATABASE_URL.
pub async fn connect_from_env() -> Result<PgPool> {
    let url =
        std::env::var(ENV_DB_URL).with_context(|| format!("missing env var {ENV_DB_URL}"))?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&url)
        .await
        .context("failed to connect to Postgres")?;

    Ok(pool)
}

/// Run embedded SQLx migrations.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("db migrate failed")?;
    Ok(())
}

/// Simple status query (connectivity + schema presence).
pub async fn status(pool: &PgPool) -> Result<DbStatus> {
    let (one,): (i32,) = sqlx::query_as::<_, (i32,)>("select 1")
        .fetch_one(pool)
        .await
        .context("status connectivity query failed")?;
    let ok = one == 1;

    let (exists,): (bool,) = sqlx::query_as::<_, (bool,)>(
        r#"
        select exists (
            select 1
            from information_schema.tables
            where table_schema='public' and table_name='orders'
        )
        "#,
    )
    .fetch_one(pool)
    .await
    .context("status table-exists query failed")?;

    Ok(DbStatus {
        ok,
        has_orders_table: exists,
    })
}

#[derive(Debug, Clone)]
pub struct DbStatus {
    pub ok: bool,
    pub has_orders_table: bool,
}

/// sqlx-backed implementation of the engine store seams.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Fetch one trade row by id.
    pub async fn fetch_trade(&self, trade_id: Uuid) -> Result<Trade> {
        let row = sqlx::query(
            r#"
            select
              id, buy_order_id, sell_order_id, buyer_address, seller_address,
              base_symbol, quote_symbol, price, amount, total_value, fee,
              tx_hash, block_number, executed_at
            from trades
            where id = $1
            "#,
        )
        .bind(trade_id)
        .fetch_one(&self.pool)
        .await
        .context("fetch_trade failed")?;

        trade_from_row(&row)
    }
}

#[async_trait]
impl OrderStore for PgStore {
    async fn open_orders(&self, contract_address: &str) -> Result<Vec<Order>> {
        let rows = sqlx::query(
            r#"
            select
              id, chain_order_id, side, contract_address, price, amount,
              remaining_amount, filled_amount, status, user_address,
              created_at, updated_at
            from orders
            where contract_address = $1
              and status = 'ACTIVE'
            order by created_at asc
            "#,
        )
        .bind(contract_address)
        .fetch_all(&self.pool)
        .await
        .context("open_orders query failed")?;

        rows.iter().map(order_from_row).collect()
    }

    async fn apply_sync(
        &self,
        order_id: Uuid,
        status: OrderStatus,
        remaining: f64,
        filled: f64,
    ) -> Result<()> {
        sqlx::query(
            r#"
            update orders
            set status = $2,
                remaining_amount = $3,
                filled_amount = $4,
                updated_at = now()
            where id = $1
            "#,
        )
        .bind(order_id)
        .bind(status.as_str())
        .bind(remaining)
        .bind(filled)
        .execute(&self.pool)
        .await
        .context("apply_sync update failed")?;

        Ok(())
    }

    async fn probe(&self) -> Result<()> {
        sqlx::query_as::<_, (i32,)>("select 1")
            .fetch_one(&self.pool)
            .await
            .context("store probe failed")?;
        Ok(())
    }
}

#[async_trait]
impl TradeStore for PgStore {
    async fn insert_trade(&self, trade: NewTrade) -> Result<Uuid> {
        let trade_id = Uuid::new_v4();

        sqlx::query(
            r#"
            insert into trades (
              id, buy_order_id, sell_order_id, buyer_address, seller_address,
              base_symbol, quote_symbol, price, amount, total_value, fee,
              tx_hash, block_number, executed_at
            ) values (
              $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14
            )
            "#,
        )
        .bind(trade_id)
        .bind(trade.buy_order_id)
        .bind(trade.sell_order_id)
        .bind(&trade.buyer_address)
        .bind(&trade.seller_address)
        .bind(&trade.base_symbol)
        .bind(&trade.quote_symbol)
        .bind(trade.price)
        .bind(trade.amount)
        .bind(trade.total_value)
        .bind(trade.fee)
        .bind(&trade.tx_hash)
        .bind(trade.block_number)
        .bind(trade.executed_at)
        .execute(&self.pool)
        .await
        .context("insert_trade failed")?;

        Ok(trade_id)
    }
}

fn order_from_row(row: &PgRow) -> Result<Order> {
    let side: String = row.try_get("side")?;
    let status: String = row.try_get("status")?;

    Ok(Order {
        id: row.try_get("id")?,
        chain_order_id: row.try_get("chain_order_id")?,
        side: Side::parse(&side).ok_or_else(|| anyhow!("invalid side: {side}"))?,
        contract_address: row.try_get("contract_address")?,
        price: row.try_get("price")?,
        amount: row.try_get("amount")?,
        remaining_amount: row.try_get("remaining_amount")?,
        filled_amount: row.try_get("filled_amount")?,
        status: OrderStatus::parse(&status).ok_or_else(|| anyhow!("invalid status: {status}"))?,
        user_address: row.try_get("user_address")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn trade_from_row(row: &PgRow) -> Result<Trade> {
    Ok(Trade {
        id: row.try_get("id")?,
        buy_order_id: row.try_get("buy_order_id")?,
        sell_order_id: row.try_get("sell_order_id")?,
        buyer_address: row.try_get("buyer_address")?,
        seller_address: row.try_get("seller_address")?,
        base_symbol: row.try_get("base_symbol")?,
        quote_symbol: row.try_get("quote_symbol")?,
        price: row.try_get("price")?,
        amount: row.try_get("amount")?,
        total_value: row.try_get("total_value")?,
        fee: row.try_get("fee")?,
        tx_hash: row.try_get("tx_hash")?,
        block_number: row.try_get("block_number")?,
        executed_at: row.try_get("executed_at")?,
    })
}
