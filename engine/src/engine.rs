//! The incentive engine — composition root and governance surface.

use std::sync::Arc;

use crate::error::EngineError;
use crate::recovery::RecoveryLog;
use ember_emission::EmissionSchedule;
use ember_gauges::{GaugeKind, GaugeRegistry};
use ember_hooks::{FeeRouter, RewardSink, SinkSet, StakingSource, TokenConverter};
use ember_ledger::VoteLedger;
use ember_types::{Address, EngineParams, EpochClock, GaugeId, Period, Timestamp};

/// The engine: one owned state struct per component, collaborator handles
/// for everything external, and the settlement re-entrancy flag.
///
/// Every externally triggered operation runs to completion before the next;
/// there is no interior concurrency.
pub struct IncentiveEngine {
    pub(crate) params: EngineParams,
    pub(crate) clock: EpochClock,
    governance: Address,
    pub(crate) ledger: VoteLedger,
    pub(crate) schedule: EmissionSchedule,
    pub(crate) registry: GaugeRegistry,
    pub(crate) sinks: SinkSet,
    staking: Arc<dyn StakingSource>,
    pub(crate) fees: Arc<dyn FeeRouter>,
    pub(crate) converter: Arc<dyn TokenConverter>,
    pub(crate) recovery: RecoveryLog,
    /// Mutual exclusion for the settlement path; set and cleared around
    /// every distribute call, including failing ones.
    pub(crate) distributing: bool,
}

impl IncentiveEngine {
    pub fn new(
        params: EngineParams,
        governance: Address,
        staking: Arc<dyn StakingSource>,
        fees: Arc<dyn FeeRouter>,
        converter: Arc<dyn TokenConverter>,
    ) -> Self {
        let clock = EpochClock::new(params.period_secs);
        Self {
            clock,
            ledger: VoteLedger::new(clock, governance.clone()),
            schedule: EmissionSchedule::new(&params),
            registry: GaugeRegistry::new(),
            sinks: SinkSet::new(),
            staking,
            fees,
            converter,
            recovery: RecoveryLog::new(),
            distributing: false,
            params,
            governance,
        }
    }

    // ── Reads ────────────────────────────────────────────────────────────

    pub fn ledger(&self) -> &VoteLedger {
        &self.ledger
    }

    pub fn schedule(&self) -> &EmissionSchedule {
        &self.schedule
    }

    pub fn registry(&self) -> &GaugeRegistry {
        &self.registry
    }

    pub fn recovery(&self) -> &RecoveryLog {
        &self.recovery
    }

    pub fn params(&self) -> &EngineParams {
        &self.params
    }

    pub fn current_period(&self, now: Timestamp) -> Period {
        self.clock.period_at(now)
    }

    fn ensure_governance(&self, caller: &Address) -> Result<(), EngineError> {
        if *caller == self.governance {
            Ok(())
        } else {
            Err(EngineError::NotGovernance(caller.clone()))
        }
    }

    // ── Bootstrap ────────────────────────────────────────────────────────

    /// One-time genesis: anchors the emission schedule and mints the initial
    /// weekly emission for manual distribution. Returns the minted amount.
    pub fn initialize(&mut self, caller: &Address, now: Timestamp) -> Result<u128, EngineError> {
        self.ensure_governance(caller)?;
        let minted = self.schedule.init_genesis(&self.clock, now)?;
        tracing::info!(
            period = %self.schedule.active_period(),
            minted,
            "emission schedule initialized"
        );
        Ok(minted)
    }

    /// Rotate the emission schedule into the current period, funding the new
    /// period's reward pool. Idempotent; callable by anyone.
    pub fn rollover(
        &mut self,
        now: Timestamp,
    ) -> Result<Option<(Period, u128)>, EngineError> {
        let minted = self.schedule.rollover(&mut self.ledger, &self.clock, now)?;
        if let Some((period, amount)) = &minted {
            tracing::info!(%period, amount, "emission rolled over");
        }
        Ok(minted)
    }

    // ── Voting ───────────────────────────────────────────────────────────

    /// Allocate `user`'s voting power across pools for the next period.
    pub fn vote(
        &mut self,
        caller: &Address,
        user: &Address,
        pools: &[Address],
        weights: &[u128],
        now: Timestamp,
    ) -> Result<(), EngineError> {
        self.ledger.vote(
            caller,
            user,
            pools,
            weights,
            now,
            &self.registry,
            &self.sinks,
            self.staking.as_ref(),
        )?;
        Ok(())
    }

    /// Clear `user`'s next-period allocation (e.g. after a full unstake).
    pub fn reset(
        &mut self,
        caller: &Address,
        user: &Address,
        now: Timestamp,
    ) -> Result<(), EngineError> {
        self.ledger.reset(
            caller,
            user,
            now,
            &self.registry,
            &self.sinks,
            self.staking.as_ref(),
        )?;
        Ok(())
    }

    /// Re-apply `user`'s last allocation at current voting power.
    pub fn poke(
        &mut self,
        caller: &Address,
        user: &Address,
        now: Timestamp,
    ) -> Result<(), EngineError> {
        self.ledger.poke(
            caller,
            user,
            now,
            &self.registry,
            &self.sinks,
            self.staking.as_ref(),
        )?;
        Ok(())
    }

    // ── Whitelist and pool directory ─────────────────────────────────────

    pub fn whitelist_token(
        &mut self,
        caller: &Address,
        token: &Address,
    ) -> Result<(), EngineError> {
        self.ensure_governance(caller)?;
        self.registry.whitelist_token(token)?;
        tracing::info!(%token, "token whitelisted");
        Ok(())
    }

    pub fn revoke_token(&mut self, caller: &Address, token: &Address) -> Result<(), EngineError> {
        self.ensure_governance(caller)?;
        self.registry.revoke_token(token)?;
        tracing::info!(%token, "token removed from whitelist");
        Ok(())
    }

    /// Register a venue from the external pool factory.
    pub fn recognize_pool(
        &mut self,
        caller: &Address,
        pool: Address,
        token0: Address,
        token1: Address,
    ) -> Result<(), EngineError> {
        self.ensure_governance(caller)?;
        self.registry.recognize_pool(pool, token0, token1)?;
        Ok(())
    }

    // ── Gauge lifecycle ──────────────────────────────────────────────────

    /// Create the gauge for a pool and bind the sink the external factory
    /// deployed for it. No back-settlement is owed at creation.
    pub fn create_gauge(
        &mut self,
        caller: &Address,
        pool: &Address,
        kind: GaugeKind,
        sink: Arc<dyn RewardSink>,
        now: Timestamp,
    ) -> Result<GaugeId, EngineError> {
        self.ensure_governance(caller)?;
        let current = self.clock.period_at(now);
        let id = self.registry.create_gauge(pool, kind, current)?;
        self.sinks.bind(id, sink);
        tracing::info!(%id, %pool, "gauge created");
        Ok(id)
    }

    /// Kill a gauge and sweep its unsettled claimable through the current
    /// period to the recovery account. The last-settled marker stays put so
    /// distribution after a later revival remains well-defined.
    pub fn kill_gauge(
        &mut self,
        caller: &Address,
        id: GaugeId,
        now: Timestamp,
    ) -> Result<u128, EngineError> {
        self.ensure_governance(caller)?;
        self.registry.kill(id)?;
        let swept = self.sweep_dead_gauge(id, now)?;
        tracing::warn!(%id, swept, "gauge killed");
        Ok(swept)
    }

    /// Revive a killed gauge, clearing any redirect.
    pub fn revive_gauge(&mut self, caller: &Address, id: GaugeId) -> Result<(), EngineError> {
        self.ensure_governance(caller)?;
        self.registry.revive(id)?;
        tracing::info!(%id, "gauge revived");
        Ok(())
    }

    /// Point every gauge sharing `pool`'s token identity at `dest`, killing
    /// (and sweeping) the others that are still alive. `dest` must itself
    /// belong to that gauge set.
    pub fn redirect_emissions(
        &mut self,
        caller: &Address,
        pool: &Address,
        dest: GaugeId,
        now: Timestamp,
    ) -> Result<(), EngineError> {
        self.ensure_governance(caller)?;
        let members = self.registry.pair_members(pool)?;
        if !members.contains(&dest) {
            return Err(ember_gauges::GaugeError::DestinationNotInPair {
                pool: pool.clone(),
                dest,
            }
            .into());
        }
        for member in members {
            if member == dest {
                continue;
            }
            self.registry.set_redirect(member, dest)?;
            if self.registry.gauge(member)?.alive {
                self.registry.kill(member)?;
                let swept = self.sweep_dead_gauge(member, now)?;
                tracing::warn!(gauge = %member, %dest, swept, "gauge redirected and killed");
            }
        }
        Ok(())
    }

    /// Manually sweep one unsettled period of a dead gauge — for ranges the
    /// kill-time loop could not see because calls arrived late.
    pub fn recover_stuck_emissions(
        &mut self,
        caller: &Address,
        id: GaugeId,
        period: Period,
    ) -> Result<u128, EngineError> {
        self.ensure_governance(caller)?;
        let gauge = self.registry.gauge(id)?;
        if gauge.alive {
            return Err(ember_gauges::GaugeError::GaugeStillAlive(id).into());
        }
        if gauge.is_settled(period) {
            return Err(ember_gauges::GaugeError::AlreadySettled(id, period).into());
        }
        let pool = gauge.pool.clone();
        let claimable = self.ledger.claimable_for_period(&pool, period)?;
        if claimable > 0 {
            self.registry.mark_settled(id, period)?;
            self.recovery.record(id, period, claimable);
            tracing::warn!(%id, %period, claimable, "stuck emissions recovered");
        }
        Ok(claimable)
    }

    /// Governance-gated emission multiplier change.
    pub fn update_multiplier(
        &mut self,
        caller: &Address,
        new_bps: u32,
    ) -> Result<(), EngineError> {
        self.ensure_governance(caller)?;
        self.schedule.update_multiplier(new_bps)?;
        tracing::info!(new_bps, "emission multiplier updated");
        Ok(())
    }

    // ── Internals ────────────────────────────────────────────────────────

    /// Sweep every unsettled, nonzero-claimable period of a dead gauge from
    /// its marker through the current period into the recovery log, marking
    /// each settled. Does not advance the marker.
    pub(crate) fn sweep_dead_gauge(
        &mut self,
        id: GaugeId,
        now: Timestamp,
    ) -> Result<u128, EngineError> {
        let current = self.clock.period_at(now);
        let (pool, last_settled) = {
            let gauge = self.registry.gauge(id)?;
            (gauge.pool.clone(), gauge.last_settled)
        };
        let mut swept = 0u128;
        for period in last_settled.next().through(current) {
            if self.registry.is_settled(id, period) {
                continue;
            }
            let claimable = self.ledger.claimable_for_period(&pool, period)?;
            if claimable == 0 {
                continue;
            }
            self.registry.mark_settled(id, period)?;
            self.recovery.record(id, period, claimable);
            swept = swept.saturating_add(claimable);
        }
        Ok(swept)
    }
}
