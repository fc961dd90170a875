//! Deterministic test doubles for the desk.
//!
//! Design decisions (kept intentionally simple/deterministic):
//! - Derived identifiers are stable strings:
//!     - settlement: `"paper:tx:{buy}:{sell}"`
//!     - reverted:   `"paper:tx:revert:{buy}:{sell}"`
//! - No randomness beyond freshly assigned row ids.
//! - Failures are scripted explicitly, never spontaneous.
//! - The paper ledger can inject a fixed read latency so overlap scenarios
//!   have a run that is genuinely in flight; it defaults to zero.

mod fixtures;
mod mem_store;
mod paper_ledger;
mod paper_settlement;

pub use fixtures::{buy_order, sell_order};
pub use mem_store::MemStore;
pub use paper_ledger::PaperLedger;
pub use paper_settlement::PaperSettlement;
