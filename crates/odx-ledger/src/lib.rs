//! Ledger adapters: the seam between the desk and the on-chain order book.
//!
//! Two traits define the boundary:
//!
//! - [`OrderStorage`] — read-only access to the contract's per-side order
//!   storage. Returns raw fixed-point units exactly as stored on chain.
//! - [`SettlementClient`] — the write path: submits a match instruction for
//!   two ledger order ids. This is the only path that can mutate ledger
//!   order state; the desk never drives settlement transactions elsewhere.
//!
//! [`ChainStateReader`] sits above `OrderStorage` and decodes raw records
//! into desk units, mapping the contract's zero-address sentinel to
//! non-existence. The production implementation of both traits is
//! [`Web3Ledger`]; deterministic in-memory doubles live in `odx-testkit`.
//!
//! Nothing in this crate retries. Per-order retry policy belongs to the
//! synchronizer.

use async_trait::async_trait;

use odx_schemas::Side;

mod error;
pub mod reader;
mod rpc;

pub use error::LedgerError;
pub use reader::{ether_to_raw, raw_to_ether, ChainStateReader, OnChainOrder, DEFAULT_DECIMALS};
pub use rpc::{Web3Ledger, Web3LedgerConfig};

/// The ledger's "empty" owner sentinel: storage reads for an order id that
/// was never created (or was deleted) return this owner.
pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// `true` if `addr` is the empty-owner sentinel (any casing, with or
/// without the `0x` prefix; an empty string also counts).
pub fn is_zero_address(addr: &str) -> bool {
    let hex = addr.strip_prefix("0x").unwrap_or(addr);
    hex.chars().all(|c| c == '0')
}

/// One order record as stored by the ledger contract.
///
/// `amount`, `price` and `remaining` are raw fixed-point units (18 decimals
/// unless the contract declares otherwise); they never cross into the rest
/// of the desk undecoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainOrderRecord {
    /// Hex-encoded owner address; the zero address means "no such order".
    pub owner: String,
    pub amount: u128,
    pub price: u128,
    pub remaining: u128,
    pub active: bool,
}

impl ChainOrderRecord {
    /// The sentinel record a storage read yields for an absent order id.
    pub fn absent() -> Self {
        Self {
            owner: ZERO_ADDRESS.to_string(),
            amount: 0,
            price: 0,
            remaining: 0,
            active: false,
        }
    }
}

/// Read-only accessor over the ledger's per-side order storage.
///
/// Implementations surface transport and decode failures as-is; they do not
/// retry and they never write.
#[async_trait]
pub trait OrderStorage: Send + Sync {
    async fn read_order(
        &self,
        side: Side,
        chain_order_id: u64,
    ) -> Result<ChainOrderRecord, LedgerError>;
}

/// Receipt for a settlement call that landed on chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementReceipt {
    pub tx_hash: String,
    pub block_number: u64,
}

/// The settlement collaborator: submits a match of one buy and one sell
/// ledger order on the given exchange contract.
///
/// Treated as a black box that may fail independently of the desk. The
/// caller must tolerate per-pair failure without aborting its batch.
#[async_trait]
pub trait SettlementClient: Send + Sync {
    async fn match_orders(
        &self,
        contract_address: &str,
        buy_chain_order_id: u64,
        sell_chain_order_id: u64,
    ) -> Result<SettlementReceipt, LedgerError>;
}
