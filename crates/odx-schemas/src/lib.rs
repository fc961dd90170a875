//! Shared domain types for the ODX desk.
//!
//! Everything here is plain data: serde-friendly structs and enums shared by
//! the store, the ledger adapters, the engine, and the admin surface.
//! No IO; the only logic is the string codecs used at the DB boundary.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Side
// ---------------------------------------------------------------------------

/// Order side, as recorded both locally and on the ledger.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "BUY" => Some(Side::Buy),
            "SELL" => Some(Side::Sell),
            _ => None,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// OrderStatus
// ---------------------------------------------------------------------------

/// Local order lifecycle. The sync path is the only writer of this field.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum OrderStatus {
    Active,
    Executed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Active => "ACTIVE",
            OrderStatus::Executed => "EXECUTED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ACTIVE" => Some(OrderStatus::Active),
            "EXECUTED" => Some(OrderStatus::Executed),
            _ => None,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Order
// ---------------------------------------------------------------------------

/// A locally tracked order, mirrored against the on-chain book.
///
/// Amounts and prices are ether-scale `f64` decoded from the ledger's
/// 18-decimal fixed-point units. Invariants maintained by the sync path:
/// `filled_amount + remaining_amount == amount` (within tolerance) and
/// `status == Executed` implies `remaining_amount == 0`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    /// Ledger-side order identifier; unique per (side, contract).
    pub chain_order_id: i64,
    pub side: Side,
    /// Exchange contract this order lives on.
    pub contract_address: String,
    pub price: f64,
    pub amount: f64,
    pub remaining_amount: f64,
    pub filled_amount: f64,
    pub status: OrderStatus,
    /// Chain address of the owning user.
    pub user_address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Trade
// ---------------------------------------------------------------------------

/// Insert shape for one settled match. The store assigns the row id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTrade {
    pub buy_order_id: Uuid,
    pub sell_order_id: Uuid,
    pub buyer_address: String,
    pub seller_address: String,
    pub base_symbol: String,
    pub quote_symbol: String,
    /// Executed price under the maker rule (the resting sell's limit price).
    pub price: f64,
    pub amount: f64,
    /// `price * amount`.
    pub total_value: f64,
    pub fee: f64,
    /// Settlement transaction reference.
    pub tx_hash: String,
    /// Block the settlement transaction landed in.
    pub block_number: i64,
    pub executed_at: DateTime<Utc>,
}

/// A persisted trade row. Append-only: never mutated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub id: Uuid,
    pub buy_order_id: Uuid,
    pub sell_order_id: Uuid,
    pub buyer_address: String,
    pub seller_address: String,
    pub base_symbol: String,
    pub quote_symbol: String,
    pub price: f64,
    pub amount: f64,
    pub total_value: f64,
    pub fee: f64,
    pub tx_hash: String,
    pub block_number: i64,
    pub executed_at: DateTime<Utc>,
}
