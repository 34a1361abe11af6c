//! Recovery ledger for swept emissions.

use ember_types::{GaugeId, Period};
use serde::{Deserialize, Serialize};

/// One emission sweep: a dead gauge's claimable for one period, redirected
/// to the governance recovery account instead of a sink.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweptEmission {
    pub gauge: GaugeId,
    pub period: Period,
    pub amount: u128,
}

/// Auditable log of everything swept to the recovery account, so emissions
/// accrued by dead gauges are never silently lost.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RecoveryLog {
    entries: Vec<SweptEmission>,
    total: u128,
}

impl RecoveryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, gauge: GaugeId, period: Period, amount: u128) {
        self.entries.push(SweptEmission {
            gauge,
            period,
            amount,
        });
        self.total = self.total.saturating_add(amount);
    }

    pub fn entries(&self) -> &[SweptEmission] {
        &self.entries
    }

    pub fn total(&self) -> u128 {
        self.total
    }
}
