//! Core vote ledger — vote, reset, poke, and the period accumulators.

use std::collections::HashMap;

use crate::error::LedgerError;
use ember_gauges::GaugeRegistry;
use ember_hooks::{SinkSet, StakingSource};
use ember_types::{mul_div, Address, EpochClock, Period, Timestamp};
use serde::{Deserialize, Serialize};

/// One user's recorded allocation for one period.
///
/// Weights are the scaled shares actually applied (after skipping dead
/// gauges, zero shares and duplicates), so `total` is the valid total, not
/// necessarily the user's full voting power.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Allocation {
    /// Pools voted, in submission order.
    pub pools: Vec<Address>,
    /// Scaled vote weight recorded per pool.
    pub weights: HashMap<Address, u128>,
    /// Sum of the recorded weights.
    pub total: u128,
}

/// The vote ledger.
///
/// Period-indexed accumulators are mutated only here: votes increment them,
/// `reset` decrements them, and nothing else touches them. The invariant
/// `sum(pool_votes[*][p]) == total_votes[p]` holds for every period.
#[derive(Serialize, Deserialize)]
pub struct VoteLedger {
    clock: EpochClock,
    /// The governance authority, allowed to act for any user.
    governance: Address,
    /// `pool_votes[pool][period]` — votes accumulated per pool per period.
    pool_votes: HashMap<Address, HashMap<Period, u128>>,
    /// `total_votes[period]` — global vote total per period.
    total_votes: HashMap<Period, u128>,
    /// `total_reward[period]` — emission budget minted for each period.
    total_reward: HashMap<Period, u128>,
    /// Per-user, per-period allocations.
    allocations: HashMap<Address, HashMap<Period, Allocation>>,
    /// The period each user last cast a vote in.
    last_voted: HashMap<Address, Period>,
}

impl VoteLedger {
    pub fn new(clock: EpochClock, governance: Address) -> Self {
        Self {
            clock,
            governance,
            pool_votes: HashMap::new(),
            total_votes: HashMap::new(),
            total_reward: HashMap::new(),
            allocations: HashMap::new(),
            last_voted: HashMap::new(),
        }
    }

    pub fn clock(&self) -> &EpochClock {
        &self.clock
    }

    // ── Reward pool ──────────────────────────────────────────────────────

    /// Credit a period's reward pool (called by the emission schedule on
    /// rollover).
    pub fn add_reward_for_period(
        &mut self,
        period: Period,
        amount: u128,
    ) -> Result<(), LedgerError> {
        let entry = self.total_reward.entry(period).or_default();
        *entry = entry.checked_add(amount).ok_or(LedgerError::Overflow)?;
        Ok(())
    }

    pub fn reward_for_period(&self, period: Period) -> u128 {
        self.total_reward.get(&period).copied().unwrap_or(0)
    }

    // ── Accumulator reads ────────────────────────────────────────────────

    pub fn pool_votes_at(&self, pool: &Address, period: Period) -> u128 {
        self.pool_votes
            .get(pool)
            .and_then(|m| m.get(&period))
            .copied()
            .unwrap_or(0)
    }

    pub fn total_votes_at(&self, period: Period) -> u128 {
        self.total_votes.get(&period).copied().unwrap_or(0)
    }

    pub fn user_allocation(&self, user: &Address, period: Period) -> Option<&Allocation> {
        self.allocations.get(user).and_then(|m| m.get(&period))
    }

    pub fn last_voted(&self, user: &Address) -> Option<Period> {
        self.last_voted.get(user).copied()
    }

    /// A pool's claimable share of a period's reward:
    /// `floor(total_reward * pool_votes / total_votes)`.
    /// Zero when nobody voted that period.
    pub fn claimable_for_period(
        &self,
        pool: &Address,
        period: Period,
    ) -> Result<u128, LedgerError> {
        let total = self.total_votes_at(period);
        if total == 0 {
            return Ok(0);
        }
        let reward = self.reward_for_period(period);
        let votes = self.pool_votes_at(pool, period);
        Ok(mul_div(reward, votes, total)?)
    }

    // ── Authorization ────────────────────────────────────────────────────

    /// A caller may act for another user only as that user's admin or
    /// delegate, or as the governance authority.
    fn ensure_authorized(
        &self,
        caller: &Address,
        user: &Address,
        staking: &dyn StakingSource,
    ) -> Result<(), LedgerError> {
        if caller == user
            || *caller == self.governance
            || staking.is_admin_for(caller, user)
            || staking.is_delegate_for(caller, user)
        {
            Ok(())
        } else {
            Err(LedgerError::Unauthorized {
                caller: caller.clone(),
                user: user.clone(),
            })
        }
    }

    // ── Reset ────────────────────────────────────────────────────────────

    /// Clear a user's allocation for the upcoming period, unwinding the
    /// accumulators and withdrawing the recorded weights from each pool's
    /// sink. Used directly when voting power is fully withdrawn; `vote`
    /// always runs it first.
    pub fn reset(
        &mut self,
        caller: &Address,
        user: &Address,
        now: Timestamp,
        registry: &GaugeRegistry,
        sinks: &SinkSet,
        staking: &dyn StakingSource,
    ) -> Result<(), LedgerError> {
        self.ensure_authorized(caller, user, staking)?;
        let next = self.clock.period_at(now).next();
        self.reset_allocation(user, next, registry, sinks)
    }

    fn reset_allocation(
        &mut self,
        user: &Address,
        period: Period,
        registry: &GaugeRegistry,
        sinks: &SinkSet,
    ) -> Result<(), LedgerError> {
        let alloc = match self.allocations.get_mut(user).and_then(|m| m.remove(&period)) {
            Some(alloc) if alloc.total > 0 || !alloc.pools.is_empty() => alloc,
            _ => return Ok(()),
        };

        for pool in &alloc.pools {
            let weight = alloc.weights.get(pool).copied().unwrap_or(0);
            if let Some(gauge) = registry.gauge_for_pool(pool) {
                sinks.get(gauge)?.withdraw(weight, user)?;
            }
            if let Some(entry) = self.pool_votes.get_mut(pool).and_then(|m| m.get_mut(&period)) {
                *entry = entry.saturating_sub(weight);
            }
        }
        if let Some(entry) = self.total_votes.get_mut(&period) {
            *entry = entry.saturating_sub(alloc.total);
        }
        Ok(())
    }

    // ── Vote ─────────────────────────────────────────────────────────────

    /// Allocate a user's voting power across pools for the upcoming period.
    ///
    /// Always resets the prior allocation first, in the same call, so old
    /// and new votes are never counted together. Pools are skipped (without
    /// failing the vote) when their gauge is missing or dead, when the
    /// scaled share rounds to zero, or when the pool already appeared in
    /// this submission; the recorded total is the valid total only.
    pub fn vote(
        &mut self,
        caller: &Address,
        user: &Address,
        pools: &[Address],
        weights: &[u128],
        now: Timestamp,
        registry: &GaugeRegistry,
        sinks: &SinkSet,
        staking: &dyn StakingSource,
    ) -> Result<(), LedgerError> {
        self.ensure_authorized(caller, user, staking)?;
        self.cast(user, pools, weights, now, registry, sinks, staking)
    }

    /// Re-apply a user's most recent allocation at current voting power.
    ///
    /// No-op when the user never voted or holds no recorded allocation.
    /// Used after external stake changes so power moves propagate without a
    /// fresh submission.
    pub fn poke(
        &mut self,
        caller: &Address,
        user: &Address,
        now: Timestamp,
        registry: &GaugeRegistry,
        sinks: &SinkSet,
        staking: &dyn StakingSource,
    ) -> Result<(), LedgerError> {
        self.ensure_authorized(caller, user, staking)?;
        let voted_in = match self.last_voted.get(user) {
            Some(p) => *p,
            None => return Ok(()),
        };
        let target = voted_in.next();
        let alloc = match self.allocations.get(user).and_then(|m| m.get(&target)) {
            Some(alloc) => alloc,
            None => return Ok(()),
        };
        let pools = alloc.pools.clone();
        let weights: Vec<u128> = pools
            .iter()
            .map(|p| alloc.weights.get(p).copied().unwrap_or(0))
            .collect();
        self.cast(user, &pools, &weights, now, registry, sinks, staking)
    }

    fn cast(
        &mut self,
        user: &Address,
        pools: &[Address],
        weights: &[u128],
        now: Timestamp,
        registry: &GaugeRegistry,
        sinks: &SinkSet,
        staking: &dyn StakingSource,
    ) -> Result<(), LedgerError> {
        if pools.is_empty() {
            return Err(LedgerError::EmptyVote);
        }
        if pools.len() != weights.len() {
            return Err(LedgerError::LengthMismatch {
                pools: pools.len(),
                weights: weights.len(),
            });
        }

        let current = self.clock.period_at(now);
        let next = current.next();
        self.reset_allocation(user, next, registry, sinks)?;

        let power = staking.voting_power_of(user);
        let mut total_weight: u128 = 0;
        for w in weights {
            total_weight = total_weight.checked_add(*w).ok_or(LedgerError::Overflow)?;
        }
        // A zero weight sum still books the reset above; substituting 1
        // makes every share round to zero instead of dividing by zero.
        if total_weight == 0 {
            total_weight = 1;
        }

        let mut alloc = Allocation::default();
        for (pool, weight) in pools.iter().zip(weights) {
            if !registry.is_votable(pool) {
                continue;
            }
            if alloc.weights.contains_key(pool) {
                continue;
            }
            let share = mul_div(*weight, power, total_weight)?;
            if share == 0 {
                continue;
            }
            let gauge = match registry.gauge_for_pool(pool) {
                Some(g) => g,
                None => continue,
            };
            sinks.get(gauge)?.deposit(share, user)?;

            let entry = self
                .pool_votes
                .entry(pool.clone())
                .or_default()
                .entry(next)
                .or_default();
            *entry = entry.checked_add(share).ok_or(LedgerError::Overflow)?;

            alloc.pools.push(pool.clone());
            alloc.weights.insert(pool.clone(), share);
            alloc.total = alloc.total.checked_add(share).ok_or(LedgerError::Overflow)?;
        }

        if !alloc.pools.is_empty() {
            let entry = self.total_votes.entry(next).or_default();
            *entry = entry
                .checked_add(alloc.total)
                .ok_or(LedgerError::Overflow)?;
            self.allocations
                .entry(user.clone())
                .or_default()
                .insert(next, alloc);
        }
        self.last_voted.insert(user.clone(), current);
        Ok(())
    }

    // ── Persistence ──────────────────────────────────────────────────────

    /// Serialize the ledger for persistence.
    pub fn to_bytes(&self) -> Vec<u8> {
        bincode::serialize(self).unwrap_or_default()
    }

    /// Restore a ledger from serialized bytes.
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        bincode::deserialize(data).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_gauges::GaugeKind;
    use ember_hooks::{NullSink, NullStaking};
    use std::sync::Arc;

    fn test_address(n: u8) -> Address {
        Address::new(format!("embr_{:0>40}", n))
    }

    struct Fixture {
        ledger: VoteLedger,
        registry: GaugeRegistry,
        sinks: SinkSet,
        staking: NullStaking,
        sink_a: Arc<NullSink>,
        sink_b: Arc<NullSink>,
        pool_a: Address,
        pool_b: Address,
    }

    fn fixture() -> Fixture {
        let clock = EpochClock::new(1000);
        let governance = test_address(200);
        let mut registry = GaugeRegistry::new();
        let (t0, t1, t2) = (test_address(250), test_address(251), test_address(252));
        for t in [&t0, &t1, &t2] {
            registry.whitelist_token(t).unwrap();
        }
        let pool_a = test_address(1);
        let pool_b = test_address(2);
        registry
            .recognize_pool(pool_a.clone(), t0.clone(), t1.clone())
            .unwrap();
        registry.recognize_pool(pool_b.clone(), t0, t2).unwrap();

        let mut sinks = SinkSet::new();
        let ga = registry
            .create_gauge(&pool_a, GaugeKind::Classic, Period::new(0))
            .unwrap();
        let gb = registry
            .create_gauge(&pool_b, GaugeKind::Classic, Period::new(0))
            .unwrap();
        let sink_a = Arc::new(NullSink::new());
        let sink_b = Arc::new(NullSink::new());
        sinks.bind(ga, sink_a.clone());
        sinks.bind(gb, sink_b.clone());

        Fixture {
            ledger: VoteLedger::new(clock, governance),
            registry,
            sinks,
            staking: NullStaking::new(),
            sink_a,
            sink_b,
            pool_a,
            pool_b,
        }
    }

    #[test]
    fn test_vote_splits_power_across_pools() {
        let mut f = fixture();
        let user = test_address(10);
        f.staking.set_power(&user, 100);
        let now = Timestamp::new(500); // period 0, votes target period 1

        f.ledger
            .vote(
                &user,
                &user,
                &[f.pool_a.clone(), f.pool_b.clone()],
                &[1, 1],
                now,
                &f.registry,
                &f.sinks,
                &f.staking,
            )
            .unwrap();

        let next = Period::new(1);
        assert_eq!(f.ledger.pool_votes_at(&f.pool_a, next), 50);
        assert_eq!(f.ledger.pool_votes_at(&f.pool_b, next), 50);
        assert_eq!(f.ledger.total_votes_at(next), 100);
        assert_eq!(f.sink_a.staked_of(&user), 50);
        assert_eq!(f.sink_b.staked_of(&user), 50);
        assert_eq!(f.ledger.last_voted(&user), Some(Period::new(0)));
    }

    #[test]
    fn test_revote_auto_resets_previous_allocation() {
        let mut f = fixture();
        let user = test_address(10);
        f.staking.set_power(&user, 100);
        let now = Timestamp::new(500);

        f.ledger
            .vote(
                &user,
                &user,
                &[f.pool_a.clone(), f.pool_b.clone()],
                &[1, 1],
                now,
                &f.registry,
                &f.sinks,
                &f.staking,
            )
            .unwrap();
        f.ledger
            .vote(
                &user,
                &user,
                &[f.pool_a.clone()],
                &[1],
                now,
                &f.registry,
                &f.sinks,
                &f.staking,
            )
            .unwrap();

        let next = Period::new(1);
        assert_eq!(f.ledger.pool_votes_at(&f.pool_a, next), 100);
        assert_eq!(f.ledger.pool_votes_at(&f.pool_b, next), 0);
        assert_eq!(f.ledger.total_votes_at(next), 100);
        assert_eq!(f.sink_a.staked_of(&user), 100);
        assert_eq!(f.sink_b.staked_of(&user), 0);
    }

    #[test]
    fn test_vote_then_reset_round_trips_accumulators() {
        let mut f = fixture();
        let user = test_address(10);
        f.staking.set_power(&user, 90);
        let now = Timestamp::new(500);

        f.ledger
            .vote(
                &user,
                &user,
                &[f.pool_a.clone(), f.pool_b.clone()],
                &[2, 1],
                now,
                &f.registry,
                &f.sinks,
                &f.staking,
            )
            .unwrap();
        f.ledger
            .reset(&user, &user, now, &f.registry, &f.sinks, &f.staking)
            .unwrap();

        let next = Period::new(1);
        assert_eq!(f.ledger.pool_votes_at(&f.pool_a, next), 0);
        assert_eq!(f.ledger.pool_votes_at(&f.pool_b, next), 0);
        assert_eq!(f.ledger.total_votes_at(next), 0);
        assert_eq!(f.sink_a.staked_of(&user), 0);
        assert_eq!(f.sink_b.staked_of(&user), 0);
        assert!(f.ledger.user_allocation(&user, next).is_none());
    }

    #[test]
    fn test_zero_weight_sum_persists_reset_only() {
        let mut f = fixture();
        let user = test_address(10);
        f.staking.set_power(&user, 100);
        let now = Timestamp::new(500);

        f.ledger
            .vote(
                &user,
                &user,
                &[f.pool_a.clone()],
                &[1],
                now,
                &f.registry,
                &f.sinks,
                &f.staking,
            )
            .unwrap();
        assert_eq!(f.ledger.total_votes_at(Period::new(1)), 100);

        // All-zero weights: prior allocation is unwound, nothing new lands.
        f.ledger
            .vote(
                &user,
                &user,
                &[f.pool_a.clone()],
                &[0],
                now,
                &f.registry,
                &f.sinks,
                &f.staking,
            )
            .unwrap();
        assert_eq!(f.ledger.total_votes_at(Period::new(1)), 0);
        assert_eq!(f.ledger.pool_votes_at(&f.pool_a, Period::new(1)), 0);
        assert_eq!(f.sink_a.staked_of(&user), 0);
        assert_eq!(f.ledger.last_voted(&user), Some(Period::new(0)));
    }

    #[test]
    fn test_dead_gauge_and_duplicate_pools_are_skipped() {
        let mut f = fixture();
        let user = test_address(10);
        f.staking.set_power(&user, 90);
        let now = Timestamp::new(500);
        let gb = f.registry.gauge_for_pool(&f.pool_b).unwrap();
        f.registry.kill(gb).unwrap();

        f.ledger
            .vote(
                &user,
                &user,
                &[f.pool_a.clone(), f.pool_b.clone(), f.pool_a.clone()],
                &[1, 1, 1],
                now,
                &f.registry,
                &f.sinks,
                &f.staking,
            )
            .unwrap();

        // Only the first pool_a entry lands: 1/3 of 90.
        let next = Period::new(1);
        assert_eq!(f.ledger.pool_votes_at(&f.pool_a, next), 30);
        assert_eq!(f.ledger.pool_votes_at(&f.pool_b, next), 0);
        assert_eq!(f.ledger.total_votes_at(next), 30);
        let alloc = f.ledger.user_allocation(&user, next).unwrap();
        assert_eq!(alloc.total, 30);
        assert_eq!(alloc.pools.len(), 1);
    }

    #[test]
    fn test_vote_rejects_bad_shapes() {
        let mut f = fixture();
        let user = test_address(10);
        let now = Timestamp::new(500);
        assert_eq!(
            f.ledger.vote(
                &user,
                &user,
                &[],
                &[],
                now,
                &f.registry,
                &f.sinks,
                &f.staking
            ),
            Err(LedgerError::EmptyVote)
        );
        assert_eq!(
            f.ledger.vote(
                &user,
                &user,
                &[f.pool_a.clone()],
                &[1, 2],
                now,
                &f.registry,
                &f.sinks,
                &f.staking
            ),
            Err(LedgerError::LengthMismatch {
                pools: 1,
                weights: 2
            })
        );
    }

    #[test]
    fn test_acting_for_another_user_requires_delegation() {
        let mut f = fixture();
        let user = test_address(10);
        let stranger = test_address(11);
        f.staking.set_power(&user, 100);
        let now = Timestamp::new(500);

        let denied = f.ledger.vote(
            &stranger,
            &user,
            &[f.pool_a.clone()],
            &[1],
            now,
            &f.registry,
            &f.sinks,
            &f.staking,
        );
        assert_eq!(
            denied,
            Err(LedgerError::Unauthorized {
                caller: stranger.clone(),
                user: user.clone()
            })
        );

        f.staking.add_delegate(&stranger, &user);
        f.ledger
            .vote(
                &stranger,
                &user,
                &[f.pool_a.clone()],
                &[1],
                now,
                &f.registry,
                &f.sinks,
                &f.staking,
            )
            .unwrap();
        assert_eq!(f.ledger.total_votes_at(Period::new(1)), 100);

        // Governance may always act.
        let governance = test_address(200);
        f.ledger
            .reset(&governance, &user, now, &f.registry, &f.sinks, &f.staking)
            .unwrap();
        assert_eq!(f.ledger.total_votes_at(Period::new(1)), 0);
    }

    #[test]
    fn test_poke_reapplies_last_allocation_at_new_power() {
        let mut f = fixture();
        let user = test_address(10);
        f.staking.set_power(&user, 100);
        let now = Timestamp::new(500);

        f.ledger
            .vote(
                &user,
                &user,
                &[f.pool_a.clone(), f.pool_b.clone()],
                &[3, 1],
                now,
                &f.registry,
                &f.sinks,
                &f.staking,
            )
            .unwrap();
        assert_eq!(f.ledger.pool_votes_at(&f.pool_a, Period::new(1)), 75);

        f.staking.set_power(&user, 200);
        f.ledger
            .poke(&user, &user, now, &f.registry, &f.sinks, &f.staking)
            .unwrap();

        let next = Period::new(1);
        assert_eq!(f.ledger.pool_votes_at(&f.pool_a, next), 150);
        assert_eq!(f.ledger.pool_votes_at(&f.pool_b, next), 50);
        assert_eq!(f.ledger.total_votes_at(next), 200);
    }

    #[test]
    fn test_poke_without_prior_vote_is_a_no_op() {
        let mut f = fixture();
        let user = test_address(10);
        f.ledger
            .poke(
                &user,
                &user,
                Timestamp::new(500),
                &f.registry,
                &f.sinks,
                &f.staking,
            )
            .unwrap();
        assert_eq!(f.ledger.total_votes_at(Period::new(1)), 0);
    }

    #[test]
    fn test_claimable_for_period_apportions_reward() {
        let mut f = fixture();
        let user = test_address(10);
        f.staking.set_power(&user, 100);
        let now = Timestamp::new(500);
        f.ledger
            .vote(
                &user,
                &user,
                &[f.pool_a.clone(), f.pool_b.clone()],
                &[3, 1],
                now,
                &f.registry,
                &f.sinks,
                &f.staking,
            )
            .unwrap();
        let next = Period::new(1);
        f.ledger.add_reward_for_period(next, 1_000_000).unwrap();

        assert_eq!(
            f.ledger.claimable_for_period(&f.pool_a, next).unwrap(),
            750_000
        );
        assert_eq!(
            f.ledger.claimable_for_period(&f.pool_b, next).unwrap(),
            250_000
        );
        // Nobody voted in period 2: zero, not a division error.
        assert_eq!(
            f.ledger
                .claimable_for_period(&f.pool_a, Period::new(2))
                .unwrap(),
            0
        );
    }

    #[test]
    fn test_ledger_snapshot_round_trip() {
        let mut f = fixture();
        let user = test_address(10);
        f.staking.set_power(&user, 100);
        f.ledger
            .vote(
                &user,
                &user,
                &[f.pool_a.clone()],
                &[1],
                Timestamp::new(500),
                &f.registry,
                &f.sinks,
                &f.staking,
            )
            .unwrap();

        let restored = VoteLedger::from_bytes(&f.ledger.to_bytes()).unwrap();
        assert_eq!(restored.total_votes_at(Period::new(1)), 100);
        assert_eq!(restored.pool_votes_at(&f.pool_a, Period::new(1)), 100);
        assert_eq!(restored.last_voted(&user), Some(Period::new(0)));
    }
}
