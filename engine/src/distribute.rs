//! Settlement — turning accumulated votes into paid rewards.

use crate::engine::IncentiveEngine;
use crate::error::EngineError;
use ember_types::{apply_bps, Address, GaugeId, Period, RewardToken, Timestamp};

/// Outcome of a batch distribution call.
///
/// Each gauge's failure is caught into an entry instead of aborting the
/// batch; sibling gauges already settled stay settled and failed gauges
/// remain retryable.
#[derive(Debug, Default)]
pub struct DistributionReport {
    /// Gauges whose distribution completed.
    pub distributed: Vec<GaugeId>,
    /// Gauges whose distribution failed, with the cause.
    pub failures: Vec<GaugeFailure>,
}

impl DistributionReport {
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }
}

/// One failed gauge in a batch distribution.
#[derive(Debug)]
pub struct GaugeFailure {
    pub gauge: GaugeId,
    pub pool: Address,
    pub error: String,
}

impl IncentiveEngine {
    /// A pool's claimable share of one period's reward budget.
    pub fn claimable_for_period(
        &self,
        pool: &Address,
        period: Period,
    ) -> Result<u128, EngineError> {
        Ok(self.ledger.claimable_for_period(pool, period)?)
    }

    /// Settle every period a gauge is owed, from its last-settled marker
    /// through the current period, then advance the marker.
    ///
    /// Rolls the emission schedule over first so settlement always sees the
    /// current period's budget. When the marker actually advances, the
    /// pool's fee split is synced once, parameterized by the gauge's
    /// alive/dead state. Runs for dead gauges too: each period no-ops and
    /// the marker still advances (such ranges are what
    /// `recover_stuck_emissions` catches up).
    pub fn distribute(&mut self, id: GaugeId, now: Timestamp) -> Result<(), EngineError> {
        if self.distributing {
            return Err(EngineError::SettlementInProgress);
        }
        self.distributing = true;
        let result = self.distribute_inner(id, now);
        self.distributing = false;
        result
    }

    fn distribute_inner(&mut self, id: GaugeId, now: Timestamp) -> Result<(), EngineError> {
        self.schedule.rollover(&mut self.ledger, &self.clock, now)?;
        let current = self.clock.period_at(now);
        let (pool, last_settled, alive) = {
            let gauge = self.registry.gauge(id)?;
            (gauge.pool.clone(), gauge.last_settled, gauge.alive)
        };
        if last_settled >= current {
            return Ok(());
        }

        for period in last_settled.next().through(current) {
            let claimable = self.ledger.claimable_for_period(&pool, period)?;
            self.settle(id, period, claimable)?;
        }

        // Once-per-period side effect, only when the marker moves.
        self.fees.sync_fee_split(&pool, alive)?;
        self.registry.advance_marker(id, current)?;
        tracing::debug!(gauge = %id, through = %current, "distribution advanced");
        Ok(())
    }

    /// Settle a single historical period without touching the last-settled
    /// marker — for catching up arbitrary gaps.
    pub fn distribute_for_period(
        &mut self,
        id: GaugeId,
        period: Period,
        now: Timestamp,
    ) -> Result<(), EngineError> {
        if self.distributing {
            return Err(EngineError::SettlementInProgress);
        }
        self.distributing = true;
        let result = self.distribute_for_period_inner(id, period, now);
        self.distributing = false;
        result
    }

    fn distribute_for_period_inner(
        &mut self,
        id: GaugeId,
        period: Period,
        now: Timestamp,
    ) -> Result<(), EngineError> {
        self.schedule.rollover(&mut self.ledger, &self.clock, now)?;
        let pool = self.registry.gauge(id)?.pool.clone();
        let claimable = self.ledger.claimable_for_period(&pool, period)?;
        self.settle(id, period, claimable)?;
        Ok(())
    }

    /// Distribute every gauge, isolating per-gauge failures.
    pub fn distribute_all(&mut self, now: Timestamp) -> DistributionReport {
        self.distribute_range(0, self.registry.len(), now)
    }

    /// Distribute the gauges in `[start, end)` of the creation-ordered set,
    /// clamped to the set length. A failing gauge is recorded and skipped;
    /// the rest are unaffected.
    pub fn distribute_range(
        &mut self,
        start: usize,
        end: usize,
        now: Timestamp,
    ) -> DistributionReport {
        let end = end.min(self.registry.len());
        let start = start.min(end);
        let ids: Vec<GaugeId> = self.registry.ids()[start..end].to_vec();

        let mut report = DistributionReport::default();
        for id in ids {
            let pool = match self.registry.gauge(id) {
                Ok(gauge) => gauge.pool.clone(),
                Err(_) => continue,
            };
            match self.distribute(id, now) {
                Ok(()) => report.distributed.push(id),
                Err(err) => {
                    tracing::warn!(gauge = %id, %pool, error = %err, "gauge distribution failed, skipping");
                    report.failures.push(GaugeFailure {
                        gauge: id,
                        pool,
                        error: err.to_string(),
                    });
                }
            }
        }
        report
    }

    /// Pay one (gauge, period) claimable into the resolved sink.
    ///
    /// No-op when the gauge is dead, the claimable is zero, or the pair is
    /// already settled. A distribution is left pending — not marked — when a
    /// nonzero share is too small for the sink's stream window, or (classic
    /// gauges) smaller than what the sink is still streaming from an earlier
    /// settlement. The settled marker is set only after every external call
    /// succeeds, so a collaborator failure leaves the pair retryable.
    fn settle(
        &mut self,
        id: GaugeId,
        period: Period,
        claimable: u128,
    ) -> Result<bool, EngineError> {
        let (alive, kind) = {
            let gauge = self.registry.gauge(id)?;
            (gauge.alive, gauge.kind)
        };
        if !alive || claimable == 0 || self.registry.is_settled(id, period) {
            return Ok(false);
        }

        let alt = apply_bps(claimable, self.params.alt_split_bps)?;
        let primary = claimable - alt;
        let window = self.params.stream_window_secs as u128;
        if (primary > 0 && primary / window == 0) || (alt > 0 && alt / window == 0) {
            tracing::debug!(
                gauge = %id,
                %period,
                primary,
                alt,
                "share below stream resolution, left pending"
            );
            return Ok(false);
        }

        let sink_gauge = self.registry.resolve_sink(id);
        let sink = self.sinks.get(sink_gauge)?;
        if kind.is_classic() {
            let primary_held = primary > 0 && primary < sink.unsettled_remainder(RewardToken::Primary);
            let alt_held = alt > 0 && alt < sink.unsettled_remainder(RewardToken::Alt);
            if primary_held || alt_held {
                tracing::debug!(
                    gauge = %id,
                    %period,
                    "prior stream remainder exceeds top-up, left pending"
                );
                return Ok(false);
            }
        }

        if alt > 0 {
            let converted = self.converter.convert(alt)?;
            sink.notify(RewardToken::Alt, converted)?;
        }
        if primary > 0 {
            sink.notify(RewardToken::Primary, primary)?;
        }
        self.registry.mark_settled(id, period)?;
        tracing::debug!(gauge = %id, %period, primary, alt, "period settled");
        Ok(true)
    }
}
