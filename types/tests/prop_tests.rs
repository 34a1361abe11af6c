use proptest::prelude::*;

use ember_types::{mul_div, EpochClock, Timestamp};

proptest! {
    /// For operands that fit in u64, mul_div agrees with the widened exact product.
    #[test]
    fn mul_div_matches_widened_product(
        a in 0u64..u64::MAX,
        b in 0u64..u64::MAX,
        d in 1u64..u64::MAX,
    ) {
        let exact = (a as u128) * (b as u128) / (d as u128);
        prop_assert_eq!(mul_div(a as u128, b as u128, d as u128).unwrap(), exact);
    }

    /// A proportional share never exceeds the whole.
    #[test]
    fn mul_div_share_bounded(
        amount in 0u128..u64::MAX as u128,
        part in 0u64..10_000,
        total in 1u64..10_000,
    ) {
        prop_assume!(part <= total);
        let share = mul_div(amount, part as u128, total as u128).unwrap();
        prop_assert!(share <= amount, "share {} > amount {}", share, amount);
    }

    /// Period indices never decrease as time advances.
    #[test]
    fn period_at_monotonic(
        period_secs in 1u64..10_000_000,
        t1 in 0u64..1_000_000_000,
        dt in 0u64..1_000_000_000,
    ) {
        let clock = EpochClock::new(period_secs);
        let p1 = clock.period_at(Timestamp::new(t1));
        let p2 = clock.period_at(Timestamp::new(t1 + dt));
        prop_assert!(p2 >= p1);
    }

    /// start_of is the earliest timestamp mapping into its period.
    #[test]
    fn start_of_round_trips(
        period_secs in 1u64..10_000_000,
        index in 0u64..1_000_000,
    ) {
        let clock = EpochClock::new(period_secs);
        let p = clock.period_at(clock.start_of(ember_types::Period::new(index)));
        prop_assert_eq!(p.index(), index);
    }
}
