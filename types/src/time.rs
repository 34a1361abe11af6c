//! Timestamps, periods, and the epoch clock.
//!
//! Timestamps are Unix epoch seconds (UTC). A period is the fixed-length
//! window that votes target and settlement pays out; the clock maps one to
//! the other deterministically.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// A Unix timestamp in seconds since epoch (UTC).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The epoch (time zero).
    pub const EPOCH: Self = Self(0);

    pub fn new(secs: u64) -> Self {
        Self(secs)
    }

    /// Get the current system time as a `Timestamp`.
    pub fn now() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock before Unix epoch")
            .as_secs();
        Self(secs)
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    /// Seconds elapsed since this timestamp (relative to `now`).
    pub fn elapsed_since(&self, now: Timestamp) -> u64 {
        now.0.saturating_sub(self.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

/// A period index — strictly increasing, derived from time, never stored
/// redundantly beyond what lookups need.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Period(u64);

impl Period {
    /// Period zero.
    pub const GENESIS: Self = Self(0);

    pub fn new(index: u64) -> Self {
        Self(index)
    }

    pub fn index(&self) -> u64 {
        self.0
    }

    /// The period after this one.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// The period before this one (saturating at genesis).
    pub fn prev(&self) -> Self {
        Self(self.0.saturating_sub(1))
    }

    /// Iterate every period from `self` through `last` inclusive.
    pub fn through(&self, last: Period) -> impl Iterator<Item = Period> {
        (self.0..=last.0).map(Period)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "period-{}", self.0)
    }
}

/// Pure mapping between wall-clock time and period indices.
///
/// `period_at(now) = floor(now / period_secs)`. Deterministic,
/// side-effect-free; the clock holds no mutable state.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct EpochClock {
    period_secs: u64,
}

impl EpochClock {
    /// Seconds in the standard weekly period.
    pub const WEEK_SECS: u64 = 7 * 24 * 3600;

    /// A clock with the standard weekly period length.
    pub fn weekly() -> Self {
        Self {
            period_secs: Self::WEEK_SECS,
        }
    }

    /// A clock with a custom period length.
    ///
    /// # Panics
    /// Panics if `period_secs` is zero.
    pub fn new(period_secs: u64) -> Self {
        assert!(period_secs > 0, "period length must be non-zero");
        Self { period_secs }
    }

    pub fn period_secs(&self) -> u64 {
        self.period_secs
    }

    /// The period containing `now`.
    pub fn period_at(&self, now: Timestamp) -> Period {
        Period(now.as_secs() / self.period_secs)
    }

    /// The first second of a period.
    pub fn start_of(&self, period: Period) -> Timestamp {
        Timestamp::new(period.index().saturating_mul(self.period_secs))
    }
}
