//! One reconciliation run: sync → detect → execute, behind a single-flight
//! gate.
//!
//! The gate is an explicit IDLE → RUNNING compare-and-swap. A request
//! arriving while a run holds the gate is rejected immediately (not
//! queued, not retried) and signalled distinctly from failure. The
//! RUNNING → IDLE transition is tied to an RAII permit, so it survives
//! early returns on the error path.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use odx_ledger::{ChainStateReader, SettlementClient};

use crate::config::EngineConfig;
use crate::executor::TradeExecutor;
use crate::stats::{RunStats, StatsSnapshot};
use crate::store::{OrderStore, TradeStore};
use crate::sync::OrderSynchronizer;

// ---------------------------------------------------------------------------
// Single-flight gate
// ---------------------------------------------------------------------------

/// IDLE → RUNNING gate. `try_acquire` either wins the CAS and returns a
/// permit, or observes a holder and returns `None` without blocking.
pub(crate) struct RunGate {
    running: AtomicBool,
}

impl RunGate {
    pub(crate) fn new() -> Self {
        Self {
            running: AtomicBool::new(false),
        }
    }

    pub(crate) fn try_acquire(&self) -> Option<RunPermit<'_>> {
        self.running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
            .then(|| RunPermit { gate: self })
    }
}

/// Releases the gate on drop: the RUNNING → IDLE transition is guaranteed
/// on every exit path.
pub(crate) struct RunPermit<'a> {
    gate: &'a RunGate,
}

impl Drop for RunPermit<'_> {
    fn drop(&mut self) {
        self.gate.running.store(false, Ordering::SeqCst);
    }
}

// ---------------------------------------------------------------------------
// Run outcome
// ---------------------------------------------------------------------------

/// Why a run was requested. Opaque to the run itself; logged only.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RunTrigger {
    Scheduled,
    Manual,
}

impl RunTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunTrigger::Scheduled => "scheduled",
            RunTrigger::Manual => "manual",
        }
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub trigger: String,
    pub duration_ms: u64,
    pub sync_checked: usize,
    pub sync_updated: usize,
    pub matches_found: usize,
    pub matches_executed: usize,
    /// Per-item errors absorbed during the run (sync + execution).
    pub errors: usize,
}

/// Outcome of a run request.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// The run executed; per-item failures, if any, are in the summary.
    Completed(RunSummary),
    /// Another run holds the gate. Normal and expected; not an error.
    AlreadyRunning,
    /// The run started but aborted on an unexpected error.
    Failed { message: String },
}

impl RunOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, RunOutcome::Completed(_))
    }

    pub fn is_already_running(&self) -> bool {
        matches!(self, RunOutcome::AlreadyRunning)
    }
}

// ---------------------------------------------------------------------------
// ReconcilerEngine
// ---------------------------------------------------------------------------

/// Owns one reconciliation pipeline for one exchange contract.
pub struct ReconcilerEngine {
    synchronizer: OrderSynchronizer,
    executor: TradeExecutor,
    orders: Arc<dyn OrderStore>,
    contract_address: String,
    gate: RunGate,
    stats: Arc<RunStats>,
}

impl ReconcilerEngine {
    pub fn new(
        config: EngineConfig,
        reader: ChainStateReader,
        settlement: Arc<dyn SettlementClient>,
        orders: Arc<dyn OrderStore>,
        trades: Arc<dyn TradeStore>,
    ) -> Self {
        Self {
            synchronizer: OrderSynchronizer::new(reader, Arc::clone(&orders), config.sync),
            executor: TradeExecutor::new(settlement, trades, config.executor),
            orders,
            contract_address: config.contract_address,
            gate: RunGate::new(),
            stats: Arc::new(RunStats::new()),
        }
    }

    pub fn contract_address(&self) -> &str {
        &self.contract_address
    }

    pub fn stats_snapshot(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub(crate) fn note_skipped_tick(&self) {
        self.stats.record_skipped_tick();
    }

    /// Run the full pipeline once. Rejected immediately when a run is
    /// already active.
    pub async fn run(&self, trigger: RunTrigger) -> RunOutcome {
        let Some(_permit) = self.gate.try_acquire() else {
            info!(trigger = trigger.as_str(), "run rejected: already running");
            return RunOutcome::AlreadyRunning;
        };

        self.stats.set_running(true);
        let outcome = match self.run_inner(trigger).await {
            Ok(summary) => {
                self.stats.record_run(
                    summary.sync_updated as u64,
                    summary.matches_executed as u64,
                    summary.errors as u64,
                );
                info!(
                    trigger = trigger.as_str(),
                    duration_ms = summary.duration_ms,
                    checked = summary.sync_checked,
                    synced = summary.sync_updated,
                    matched = summary.matches_found,
                    executed = summary.matches_executed,
                    errors = summary.errors,
                    "reconciliation run complete"
                );
                RunOutcome::Completed(summary)
            }
            Err(err) => {
                self.stats.record_failed_run();
                let message = format!("{err:#}");
                error!(
                    trigger = trigger.as_str(),
                    error = %message,
                    "reconciliation run failed"
                );
                RunOutcome::Failed { message }
            }
        };
        self.stats.set_running(false);

        outcome
        // _permit drops here: RUNNING → IDLE on every path above.
    }

    async fn run_inner(&self, trigger: RunTrigger) -> Result<RunSummary> {
        let started = Instant::now();

        let sync = self.synchronizer.sync_orders(&self.contract_address).await?;

        // Matching sees only the freshly-synchronized open set.
        let open = self
            .orders
            .open_orders(&self.contract_address)
            .await
            .context("fetch open orders for matching")?;
        let pairs = odx_match::find_crossable_pairs(&open);

        let exec = self
            .executor
            .execute_pairs(&self.contract_address, &pairs)
            .await;

        Ok(RunSummary {
            trigger: trigger.as_str().to_string(),
            duration_ms: started.elapsed().as_millis() as u64,
            sync_checked: sync.checked,
            sync_updated: sync.updated,
            matches_found: pairs.len(),
            matches_executed: exec.executed,
            errors: sync.failures.len() + exec.failures.len(),
        })
    }
}
