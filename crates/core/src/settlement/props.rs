//! Property-based tests for settlement distribution.

use chrono::{Days, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::distributor::SettlementDistributor;
use super::types::VolumeWeights;

fn period_strategy() -> impl Strategy<Value = (NaiveDate, NaiveDate)> {
    (0u64..1000, 0u64..60).prop_map(|(offset, span)| {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1)
            .unwrap()
            .checked_add_days(Days::new(offset))
            .unwrap();
        (start, start.checked_add_days(Days::new(span)).unwrap())
    })
}

fn cents_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn weights_strategy(start: NaiveDate) -> impl Strategy<Value = VolumeWeights> {
    prop::collection::btree_map(0u64..60, (-500i64..50_000).prop_map(|c| Decimal::new(c, 2)), 0..20)
        .prop_map(move |raw| {
            raw.into_iter()
                .map(|(offset, volume)| (start.checked_add_days(Days::new(offset)).unwrap(), volume))
                .collect()
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// The final cumulative amount is exactly what was left to distribute.
    #[test]
    fn prop_distribution_conserves_total(
        (start, end) in period_strategy(),
        total in cents_strategy(),
        drawn in cents_strategy(),
    ) {
        let result = SettlementDistributor::cumulative_daily_distribution(start, end, total, drawn, None);
        let net = (total - drawn).max(Decimal::ZERO);

        if net.is_zero() {
            prop_assert!(result.is_empty());
        } else {
            let last = result.last().unwrap();
            prop_assert_eq!(last.cumulative_available, net);
            let unlocked: Decimal = result.iter().map(|day| day.daily_unlock).sum();
            prop_assert_eq!(unlocked, net);
            prop_assert!(result.iter().all(|day| day.daily_unlock >= Decimal::ZERO));
        }
    }

    /// Weighted distributions conserve the total and stay non-negative.
    #[test]
    fn prop_weighted_distribution_conserves_total(
        ((start, end), weights) in period_strategy()
            .prop_flat_map(|period| (Just(period), weights_strategy(period.0))),
        total in cents_strategy(),
    ) {
        let result = SettlementDistributor::cumulative_daily_distribution(
            start, end, total, Decimal::ZERO, Some(&weights),
        );
        if let Some(last) = result.last() {
            prop_assert_eq!(last.cumulative_available, total);
            prop_assert!(result.iter().all(|day| day.daily_unlock >= Decimal::ZERO));
            for pair in result.windows(2) {
                prop_assert!(pair[0].cumulative_available <= pair[1].cumulative_available);
            }
        }
    }

    /// A zero draw leaves the distribution unchanged.
    #[test]
    fn prop_zero_draw_is_identity(
        (start, end) in period_strategy(),
        total in cents_strategy(),
        offset in 0u64..60,
    ) {
        let original = SettlementDistributor::cumulative_daily_distribution(start, end, total, Decimal::ZERO, None);
        let draw_date = start.checked_add_days(Days::new(offset)).unwrap();
        let recalculated = SettlementDistributor::recalculate_after_draw(&original, Decimal::ZERO, draw_date);
        prop_assert_eq!(recalculated, original);
    }

    /// Draws never push cumulative amounts below zero.
    #[test]
    fn prop_draw_never_negative(
        (start, end) in period_strategy(),
        total in cents_strategy(),
        draw in cents_strategy(),
        offset in 0u64..60,
    ) {
        let original = SettlementDistributor::cumulative_daily_distribution(start, end, total, Decimal::ZERO, None);
        let draw_date = start.checked_add_days(Days::new(offset)).unwrap();
        let recalculated = SettlementDistributor::recalculate_after_draw(&original, draw, draw_date);

        prop_assert_eq!(recalculated.len(), original.len());
        for (before, after) in original.iter().zip(&recalculated) {
            prop_assert!(after.cumulative_available >= Decimal::ZERO);
            if before.date < draw_date {
                prop_assert_eq!(before, after);
            }
        }
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use crate::settlement::types::DailyDistribution;
    use rust_decimal_macros::dec;

    #[test]
    fn test_single_day_period() {
        let day = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let result =
            SettlementDistributor::cumulative_daily_distribution(day, day, dec!(42.42), Decimal::ZERO, None);
        assert_eq!(
            result,
            vec![DailyDistribution {
                date: day,
                daily_unlock: dec!(42.42),
                cumulative_available: dec!(42.42),
                days_accumulated: 1,
                is_settlement_day: false,
            }]
        );
    }
}
