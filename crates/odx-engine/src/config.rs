//! Per-component tuning. Every struct has workable defaults; the daemon
//! overrides from env at boot.

use std::time::Duration;

/// Floor for admin-supplied scheduler intervals.
pub const MIN_INTERVAL: Duration = Duration::from_secs(10);

/// Tuning for the order synchronizer.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Writes are skipped when status is unchanged and remaining moved by no
    /// more than this; repeated sync passes against an unchanged ledger
    /// become no-ops.
    pub amount_tolerance: f64,
    /// Ledger read attempts per order before that order counts as failed.
    pub read_attempts: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            amount_tolerance: 1e-4,
            read_attempts: 2,
        }
    }
}

/// Tuning for the trade executor.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Flat fee rate applied to gross trade value.
    pub fee_rate: f64,
    /// Asset symbols recorded on trade rows.
    pub base_symbol: String,
    pub quote_symbol: String,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            fee_rate: 0.001,
            base_symbol: "TOKEN".to_string(),
            quote_symbol: "ETH".to_string(),
        }
    }
}

/// Tuning for the reconciliation scheduler.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Tick interval for scheduled runs. The floor in [`MIN_INTERVAL`] is
    /// enforced on admin-supplied changes, not on this constructor value,
    /// so tests can tick fast.
    pub interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
        }
    }
}

/// Top-level engine wiring: which contract the desk is scoped to, plus the
/// component tunings.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Exchange contract scope; unscoped orders are never considered.
    pub contract_address: String,
    pub sync: SyncConfig,
    pub executor: ExecutorConfig,
}
