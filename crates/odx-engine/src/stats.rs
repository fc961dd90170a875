//! Process-lifetime reconciliation counters.
//!
//! Owned by the engine/scheduler pair, read by the admin surface. Plain
//! atomics: readers never block a run, and a snapshot is cheap enough to
//! take on every status request. Reset only on process restart.

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default)]
pub struct RunStats {
    runs: AtomicU64,
    orders_synced: AtomicU64,
    matches_executed: AtomicU64,
    errors: AtomicU64,
    ticks_skipped: AtomicU64,
    /// Epoch-ms of the last completed run attempt; 0 = never ran.
    last_run_at_ms: AtomicI64,
    running: AtomicBool,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let last_ms = self.last_run_at_ms.load(Ordering::Relaxed);
        StatsSnapshot {
            runs: self.runs.load(Ordering::Relaxed),
            orders_synced: self.orders_synced.load(Ordering::Relaxed),
            matches_executed: self.matches_executed.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            ticks_skipped: self.ticks_skipped.load(Ordering::Relaxed),
            last_run_at: DateTime::<Utc>::from_timestamp_millis(last_ms).filter(|_| last_ms != 0),
            running: self.running.load(Ordering::Relaxed),
        }
    }

    pub fn runs(&self) -> u64 {
        self.runs.load(Ordering::Relaxed)
    }

    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }

    pub fn matches_executed(&self) -> u64 {
        self.matches_executed.load(Ordering::Relaxed)
    }

    pub fn ticks_skipped(&self) -> u64 {
        self.ticks_skipped.load(Ordering::Relaxed)
    }

    pub(crate) fn record_run(&self, synced: u64, executed: u64, errors: u64) {
        self.runs.fetch_add(1, Ordering::Relaxed);
        self.orders_synced.fetch_add(synced, Ordering::Relaxed);
        self.matches_executed.fetch_add(executed, Ordering::Relaxed);
        self.errors.fetch_add(errors, Ordering::Relaxed);
        self.stamp_last_run();
    }

    pub(crate) fn record_failed_run(&self) {
        self.runs.fetch_add(1, Ordering::Relaxed);
        self.errors.fetch_add(1, Ordering::Relaxed);
        self.stamp_last_run();
    }

    pub(crate) fn record_skipped_tick(&self) {
        self.ticks_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::Relaxed);
    }

    fn stamp_last_run(&self) {
        self.last_run_at_ms
            .store(Utc::now().timestamp_millis(), Ordering::Relaxed);
    }
}

/// Serializable point-in-time view of [`RunStats`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub runs: u64,
    pub orders_synced: u64,
    pub matches_executed: u64,
    pub errors: u64,
    pub ticks_skipped: u64,
    pub last_run_at: Option<DateTime<Utc>>,
    pub running: bool,
}
