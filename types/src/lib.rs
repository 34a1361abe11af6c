//! Fundamental types for the ember incentive engine.
//!
//! This crate defines the core types shared across every other crate in the
//! workspace: addresses, gauge ids, timestamps, the epoch clock, token units,
//! overflow-safe math, and engine parameters.

pub mod address;
pub mod amount;
pub mod math;
pub mod params;
pub mod time;

pub use address::{Address, GaugeId};
pub use amount::{RewardToken, BASIS, EMBER_UNIT};
pub use math::{apply_bps, mul_div, MathError};
pub use params::EngineParams;
pub use time::{EpochClock, Period, Timestamp};
