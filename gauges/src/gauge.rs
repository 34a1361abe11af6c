//! Gauge and pool records.

use ember_types::{Address, GaugeId, Period};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The flavor of pool a gauge incentivizes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GaugeKind {
    /// A classic constant-product pool. Its sink streams one reward epoch at
    /// a time, so settlements below the unstreamed remainder are held back.
    Classic,
    /// A concentrated-liquidity pool at a given tick spacing. Several of
    /// these can exist per token pair, one gauge each.
    Concentrated { tick_spacing: u32 },
}

impl GaugeKind {
    pub fn is_classic(&self) -> bool {
        matches!(self, GaugeKind::Classic)
    }
}

/// One gauge — the settlement target associated with a pool.
///
/// Created once, never destroyed; cycles Alive↔Dead. The redirect pointer is
/// set only by emission redirection and cleared on revival.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Gauge {
    pub id: GaugeId,
    pub pool: Address,
    pub kind: GaugeKind,
    pub alive: bool,
    pub redirect_to: Option<GaugeId>,
    /// Last period through which `distribute` advanced this gauge.
    pub last_settled: Period,
    /// Periods paid (or swept) exactly once. Monotonic: entries are never
    /// removed.
    pub settled: BTreeSet<Period>,
}

impl Gauge {
    pub fn new(id: GaugeId, pool: Address, kind: GaugeKind, current_period: Period) -> Self {
        Self {
            id,
            pool,
            kind,
            alive: true,
            redirect_to: None,
            // No back-settlement is owed at creation.
            last_settled: current_period,
            settled: BTreeSet::new(),
        }
    }

    pub fn is_settled(&self, period: Period) -> bool {
        self.settled.contains(&period)
    }
}

/// A recognized liquidity venue and its token pair.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PoolVenue {
    pub pool: Address,
    pub token0: Address,
    pub token1: Address,
}

impl PoolVenue {
    /// Order-independent token identity, used to group gauges of one pair.
    pub fn pair_key(&self) -> (Address, Address) {
        if self.token0 <= self.token1 {
            (self.token0.clone(), self.token1.clone())
        } else {
            (self.token1.clone(), self.token0.clone())
        }
    }
}
