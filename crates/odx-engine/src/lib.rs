//! odx-engine
//!
//! The reconciliation core of the desk: keeps the local order record
//! consistent with the on-chain book and opportunistically settles
//! crossable pairs.
//!
//! Pipeline per run: synchronize → detect → execute, strictly in that
//! order, behind a single-flight gate. A run never matches against
//! pre-sync order data, and a second run request is rejected (not queued)
//! while one is active.
//!
//! Writer discipline: the synchronizer is the only writer of order
//! status/remaining/filled; the executor is the only writer of trade rows.
//! Settlement success is confirmed by the *next* sync cycle observing the
//! ledger, never by mutating orders here.

pub mod config;

mod executor;
mod run;
mod scheduler;
mod stats;
mod store;
mod sync;

pub use config::{EngineConfig, ExecutorConfig, SchedulerConfig, SyncConfig, MIN_INTERVAL};
pub use executor::{ExecFailure, ExecReport, TradeExecutor};
pub use run::{ReconcilerEngine, RunOutcome, RunSummary, RunTrigger};
pub use scheduler::{Health, ReconciliationScheduler};
pub use stats::{RunStats, StatsSnapshot};
pub use store::{OrderStore, TradeStore};
pub use sync::{OrderSynchronizer, SyncFailure, SyncReport};
