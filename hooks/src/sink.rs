//! Per-gauge reward sinks.

use crate::error::HookError;
use ember_types::{Address, GaugeId, RewardToken};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// The reward distributor bound to one gauge.
///
/// Voter stakes are deposited/withdrawn in lockstep with the vote ledger so
/// the sink's per-voter accounting matches recorded vote weight; settled
/// emissions arrive through `notify` and stream out over the sink's window.
pub trait RewardSink {
    /// Record `weight` of voting stake for `user`.
    fn deposit(&self, weight: u128, user: &Address) -> Result<(), HookError>;

    /// Remove `weight` of voting stake for `user`.
    fn withdraw(&self, weight: u128, user: &Address) -> Result<(), HookError>;

    /// Push a settled reward amount into the sink's stream.
    fn notify(&self, token: RewardToken, amount: u128) -> Result<(), HookError>;

    /// Amount from a prior settlement the sink has not finished streaming.
    fn unsettled_remainder(&self, token: RewardToken) -> u128;
}

/// The gauge→sink bindings owned by the engine.
///
/// One sink per gauge, bound at gauge creation and never rebound.
#[derive(Default)]
pub struct SinkSet {
    sinks: HashMap<GaugeId, Arc<dyn RewardSink>>,
}

impl SinkSet {
    pub fn new() -> Self {
        Self {
            sinks: HashMap::new(),
        }
    }

    /// Bind a sink to a gauge.
    pub fn bind(&mut self, gauge: GaugeId, sink: Arc<dyn RewardSink>) {
        self.sinks.insert(gauge, sink);
    }

    /// Look up the sink bound to a gauge.
    pub fn get(&self, gauge: GaugeId) -> Result<&Arc<dyn RewardSink>, HookError> {
        self.sinks.get(&gauge).ok_or(HookError::MissingSink(gauge))
    }

    pub fn contains(&self, gauge: GaugeId) -> bool {
        self.sinks.contains_key(&gauge)
    }
}

/// Deterministic in-memory reward sink for testing.
///
/// Tracks per-voter stakes and notified totals; `fail_with` injects a
/// persistent failure into every mutating call until cleared.
pub struct NullSink {
    stakes: Mutex<HashMap<Address, u128>>,
    notified: Mutex<HashMap<RewardToken, u128>>,
    remainders: Mutex<HashMap<RewardToken, u128>>,
    failure: Mutex<Option<String>>,
}

impl NullSink {
    pub fn new() -> Self {
        Self {
            stakes: Mutex::new(HashMap::new()),
            notified: Mutex::new(HashMap::new()),
            remainders: Mutex::new(HashMap::new()),
            failure: Mutex::new(None),
        }
    }

    /// Inject a failure returned by every mutating call until cleared.
    pub fn fail_with(&self, reason: impl Into<String>) {
        *self.failure.lock().unwrap() = Some(reason.into());
    }

    /// Clear an injected failure.
    pub fn clear_failure(&self) {
        *self.failure.lock().unwrap() = None;
    }

    /// Configure the unstreamed remainder reported for a token.
    pub fn set_unsettled_remainder(&self, token: RewardToken, amount: u128) {
        self.remainders.lock().unwrap().insert(token, amount);
    }

    /// Stake currently recorded for a voter.
    pub fn staked_of(&self, user: &Address) -> u128 {
        self.stakes.lock().unwrap().get(user).copied().unwrap_or(0)
    }

    /// Sum of all recorded voter stakes.
    pub fn total_staked(&self) -> u128 {
        self.stakes.lock().unwrap().values().sum()
    }

    /// Total amount notified for a token.
    pub fn notified_of(&self, token: RewardToken) -> u128 {
        self.notified
            .lock()
            .unwrap()
            .get(&token)
            .copied()
            .unwrap_or(0)
    }

    fn check_failure(&self) -> Result<(), HookError> {
        match self.failure.lock().unwrap().as_ref() {
            Some(reason) => Err(HookError::Failed(reason.clone())),
            None => Ok(()),
        }
    }
}

impl Default for NullSink {
    fn default() -> Self {
        Self::new()
    }
}

impl RewardSink for NullSink {
    fn deposit(&self, weight: u128, user: &Address) -> Result<(), HookError> {
        self.check_failure()?;
        *self.stakes.lock().unwrap().entry(user.clone()).or_default() += weight;
        Ok(())
    }

    fn withdraw(&self, weight: u128, user: &Address) -> Result<(), HookError> {
        self.check_failure()?;
        let mut stakes = self.stakes.lock().unwrap();
        let entry = stakes.entry(user.clone()).or_default();
        *entry = entry.saturating_sub(weight);
        Ok(())
    }

    fn notify(&self, token: RewardToken, amount: u128) -> Result<(), HookError> {
        self.check_failure()?;
        *self.notified.lock().unwrap().entry(token).or_default() += amount;
        Ok(())
    }

    fn unsettled_remainder(&self, token: RewardToken) -> u128 {
        self.remainders
            .lock()
            .unwrap()
            .get(&token)
            .copied()
            .unwrap_or(0)
    }
}
