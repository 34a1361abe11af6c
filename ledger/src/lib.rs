//! Vote ledger for the ember engine.
//!
//! Tracks who voted how much for which pool in which period, the per-pool and
//! global accumulators settlement divides over, and the per-period reward
//! pools the emission schedule fills.

pub mod error;
pub mod ledger;

pub use error::LedgerError;
pub use ledger::{Allocation, VoteLedger};
