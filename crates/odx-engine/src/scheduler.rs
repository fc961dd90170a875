//! Timer-driven reconciliation loop with manual trigger and health check.
//!
//! One tokio task owns the ticker (`tokio::time::interval`, whose first
//! tick completes immediately, so starting the worker runs once right away).
//! Each tick spawns an independent run attempt; the engine's single-flight
//! gate rejects overlap and a rejected scheduled attempt is counted as a
//! skipped tick, not queued. Stopping aborts only the ticker task: an
//! in-flight run finishes naturally and releases the gate on its own.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::{SchedulerConfig, MIN_INTERVAL};
use crate::run::{ReconcilerEngine, RunOutcome, RunTrigger};
use crate::stats::StatsSnapshot;
use crate::store::OrderStore;

/// Health view reported by [`ReconciliationScheduler::health_check`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Health {
    /// `worker_active && store_ok`.
    pub healthy: bool,
    pub worker_active: bool,
    pub store_ok: bool,
    pub stats: StatsSnapshot,
}

struct WorkerState {
    interval: Duration,
    ticker: Option<JoinHandle<()>>,
}

pub struct ReconciliationScheduler {
    engine: Arc<ReconcilerEngine>,
    /// Probe target for health checks; same store the engine reconciles.
    orders: Arc<dyn OrderStore>,
    state: Mutex<WorkerState>,
}

impl ReconciliationScheduler {
    pub fn new(
        engine: Arc<ReconcilerEngine>,
        orders: Arc<dyn OrderStore>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            engine,
            orders,
            state: Mutex::new(WorkerState {
                interval: config.interval,
                ticker: None,
            }),
        }
    }

    /// Start the worker: one immediate run attempt, then one per tick.
    /// No-op (with a warning) when already active.
    pub async fn start(&self) {
        let mut state = self.state.lock().await;
        if state.ticker.is_some() {
            warn!("scheduler start ignored: worker already active");
            return;
        }
        state.ticker = Some(self.spawn_ticker(state.interval));
        info!(
            interval_secs = state.interval.as_secs(),
            "reconciliation worker started"
        );
    }

    /// Stop the worker. Future ticks are cancelled; an in-flight run is not.
    pub async fn stop(&self) {
        let mut state = self.state.lock().await;
        match state.ticker.take() {
            Some(handle) => {
                handle.abort();
                info!("reconciliation worker stopped");
            }
            None => warn!("scheduler stop ignored: worker not active"),
        }
    }

    /// Change the tick interval. Rejects values under [`MIN_INTERVAL`].
    /// When the worker is active the ticker is restarted under the same
    /// lock, which (like `start`) triggers an immediate run attempt.
    pub async fn set_interval(&self, interval: Duration) -> Result<()> {
        if interval < MIN_INTERVAL {
            bail!(
                "interval {}s is below the {}s floor",
                interval.as_secs(),
                MIN_INTERVAL.as_secs()
            );
        }

        let mut state = self.state.lock().await;
        state.interval = interval;
        if let Some(handle) = state.ticker.take() {
            handle.abort();
            state.ticker = Some(self.spawn_ticker(interval));
            info!(
                interval_secs = interval.as_secs(),
                "reconciliation worker restarted with new interval"
            );
        }
        Ok(())
    }

    /// Trigger exactly one run outside the timer cadence, subject to the
    /// same single-flight gate.
    pub async fn run_manual(&self) -> RunOutcome {
        self.engine.run(RunTrigger::Manual).await
    }

    pub async fn is_active(&self) -> bool {
        self.state.lock().await.ticker.is_some()
    }

    pub async fn interval(&self) -> Duration {
        self.state.lock().await.interval
    }

    /// Read-only health report: worker state, a trivial store probe, and a
    /// stats snapshot. Mutates nothing.
    pub async fn health_check(&self) -> Health {
        let worker_active = self.is_active().await;
        let store_ok = self.orders.probe().await.is_ok();
        Health {
            healthy: worker_active && store_ok,
            worker_active,
            store_ok,
            stats: self.engine.stats_snapshot(),
        }
    }

    pub fn engine(&self) -> Arc<ReconcilerEngine> {
        Arc::clone(&self.engine)
    }

    fn spawn_ticker(&self, interval: Duration) -> JoinHandle<()> {
        let engine = Arc::clone(&self.engine);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                // Each attempt runs in its own task so a slow run can never
                // stall the ticker; overlap is rejected by the gate.
                let engine = Arc::clone(&engine);
                tokio::spawn(async move {
                    if engine.run(RunTrigger::Scheduled).await.is_already_running() {
                        engine.note_skipped_tick();
                        info!("scheduled tick skipped: run already in flight");
                    }
                });
            }
        })
    }
}
