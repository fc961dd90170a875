use thiserror::Error;

/// Failures surfaced by ledger reads and settlement submissions.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// JSON-RPC transport failure: node unreachable, timeout, bad response.
    #[error("ledger transport failure: {0}")]
    Transport(String),

    /// The call succeeded but the returned data could not be decoded.
    #[error("ledger decode failure: {0}")]
    Decode(String),

    /// The settlement transaction was mined but reverted.
    #[error("settlement reverted: tx {tx_hash}")]
    Reverted { tx_hash: String },

    /// The configured settlement key is missing or malformed.
    #[error("settlement key error: {0}")]
    Key(String),
}
