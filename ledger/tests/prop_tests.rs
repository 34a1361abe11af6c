use proptest::prelude::*;
use std::sync::Arc;

use ember_gauges::{GaugeKind, GaugeRegistry};
use ember_hooks::{NullSink, NullStaking, SinkSet};
use ember_ledger::VoteLedger;
use ember_types::{Address, EpochClock, Period, Timestamp};

const POOL_COUNT: u8 = 4;

fn addr(n: u8) -> Address {
    Address::new(format!("embr_{:0>40}", n))
}

fn pool(n: u8) -> Address {
    addr(100 + n)
}

fn build_world() -> (VoteLedger, GaugeRegistry, SinkSet, NullStaking) {
    let mut registry = GaugeRegistry::new();
    let base = addr(250);
    registry.whitelist_token(&base).unwrap();
    for n in 0..POOL_COUNT {
        let other = addr(200 + n);
        registry.whitelist_token(&other).unwrap();
        registry
            .recognize_pool(pool(n), base.clone(), other)
            .unwrap();
    }
    let mut sinks = SinkSet::new();
    for n in 0..POOL_COUNT {
        let id = registry
            .create_gauge(&pool(n), GaugeKind::Classic, Period::new(0))
            .unwrap();
        sinks.bind(id, Arc::new(NullSink::new()));
    }
    let ledger = VoteLedger::new(EpochClock::new(1000), addr(0));
    (ledger, registry, sinks, NullStaking::new())
}

proptest! {
    /// After any sequence of votes, every period's pool totals sum to the
    /// global total.
    #[test]
    fn pool_votes_always_sum_to_total_votes(
        votes in proptest::collection::vec(
            (1u8..6, proptest::collection::vec((0u8..POOL_COUNT, 0u128..1_000), 1..5), 1u128..1_000_000),
            1..25,
        ),
    ) {
        let (mut ledger, registry, sinks, staking) = build_world();
        let now = Timestamp::new(500);

        for (user_n, alloc, power) in votes {
            let user = addr(user_n);
            staking.set_power(&user, power);
            let pools: Vec<Address> = alloc.iter().map(|(p, _)| pool(*p)).collect();
            let weights: Vec<u128> = alloc.iter().map(|(_, w)| *w).collect();
            ledger.vote(&user, &user, &pools, &weights, now, &registry, &sinks, &staking).unwrap();
        }

        let next = Period::new(1);
        let summed: u128 = (0..POOL_COUNT).map(|n| ledger.pool_votes_at(&pool(n), next)).sum();
        prop_assert_eq!(summed, ledger.total_votes_at(next));
    }

    /// vote followed by reset returns every accumulator to its pre-vote value.
    #[test]
    fn vote_reset_round_trip(
        others in proptest::collection::vec(
            (1u8..4, 0u8..POOL_COUNT, 1u128..1_000_000),
            0..8,
        ),
        target_alloc in proptest::collection::vec((0u8..POOL_COUNT, 0u128..1_000), 1..5),
        target_power in 1u128..1_000_000,
    ) {
        let (mut ledger, registry, sinks, staking) = build_world();
        let now = Timestamp::new(500);

        // Background voters.
        for (user_n, pool_n, power) in others {
            let user = addr(user_n);
            staking.set_power(&user, power);
            ledger.vote(&user, &user, &[pool(pool_n)], &[1], now, &registry, &sinks, &staking).unwrap();
        }

        let next = Period::new(1);
        let before: Vec<u128> = (0..POOL_COUNT).map(|n| ledger.pool_votes_at(&pool(n), next)).collect();
        let total_before = ledger.total_votes_at(next);

        let target = addr(99);
        staking.set_power(&target, target_power);
        let pools: Vec<Address> = target_alloc.iter().map(|(p, _)| pool(*p)).collect();
        let weights: Vec<u128> = target_alloc.iter().map(|(_, w)| *w).collect();
        ledger.vote(&target, &target, &pools, &weights, now, &registry, &sinks, &staking).unwrap();
        ledger.reset(&target, &target, now, &registry, &sinks, &staking).unwrap();

        let after: Vec<u128> = (0..POOL_COUNT).map(|n| ledger.pool_votes_at(&pool(n), next)).collect();
        prop_assert_eq!(before, after);
        prop_assert_eq!(total_before, ledger.total_votes_at(next));
    }

    /// A pool's claimable share never exceeds the period's reward, and the
    /// shares across pools never sum above it.
    #[test]
    fn claimable_bounded_by_period_reward(
        votes in proptest::collection::vec(
            (1u8..6, 0u8..POOL_COUNT, 1u128..1_000_000),
            1..12,
        ),
        reward in 0u128..u64::MAX as u128,
    ) {
        let (mut ledger, registry, sinks, staking) = build_world();
        let now = Timestamp::new(500);
        for (user_n, pool_n, power) in votes {
            let user = addr(user_n);
            staking.set_power(&user, power);
            ledger.vote(&user, &user, &[pool(pool_n)], &[1], now, &registry, &sinks, &staking).unwrap();
        }
        let next = Period::new(1);
        ledger.add_reward_for_period(next, reward).unwrap();

        let mut summed = 0u128;
        for n in 0..POOL_COUNT {
            let share = ledger.claimable_for_period(&pool(n), next).unwrap();
            prop_assert!(share <= reward);
            summed += share;
        }
        prop_assert!(summed <= reward, "shares {} exceed reward {}", summed, reward);
    }
}
