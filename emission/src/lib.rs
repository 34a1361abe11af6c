//! Emission schedule for the ember engine.
//!
//! Computes the weekly reward budget, applies the bounded growth/decay
//! multiplier at each period rollover, enforces the supply ceiling, and
//! forwards what was minted into the vote ledger's per-period reward pool.

pub mod error;
pub mod schedule;

pub use error::EmissionError;
pub use schedule::EmissionSchedule;
