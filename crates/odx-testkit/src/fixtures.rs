//! Order row fixtures for scenario tests.

use chrono::{Duration, Utc};
use uuid::Uuid;

use odx_schemas::{Order, OrderStatus, Side};

/// ACTIVE buy order. `age_secs` backdates creation for FIFO cases.
pub fn buy_order(
    contract_address: &str,
    chain_order_id: i64,
    price: f64,
    amount: f64,
    remaining: f64,
    age_secs: i64,
) -> Order {
    order(
        contract_address,
        chain_order_id,
        Side::Buy,
        price,
        amount,
        remaining,
        age_secs,
    )
}

/// ACTIVE sell order. `age_secs` backdates creation for FIFO cases.
pub fn sell_order(
    contract_address: &str,
    chain_order_id: i64,
    price: f64,
    amount: f64,
    remaining: f64,
    age_secs: i64,
) -> Order {
    order(
        contract_address,
        chain_order_id,
        Side::Sell,
        price,
        amount,
        remaining,
        age_secs,
    )
}

fn order(
    contract_address: &str,
    chain_order_id: i64,
    side: Side,
    price: f64,
    amount: f64,
    remaining: f64,
    age_secs: i64,
) -> Order {
    let created = Utc::now() - Duration::seconds(age_secs);
    Order {
        id: Uuid::new_v4(),
        chain_order_id,
        side,
        contract_address: contract_address.to_string(),
        price,
        amount,
        remaining_amount: remaining,
        filled_amount: amount - remaining,
        status: OrderStatus::Active,
        // Deterministic, distinct per chain id; never the zero sentinel.
        user_address: format!("0x{:040x}", 0xa000 + chain_order_id.unsigned_abs() as u128),
        created_at: created,
        updated_at: created,
    }
}
