//! Tests for opportunity detection.

use cashcast_shared::types::PayoutForecastId;
use chrono::{Days, NaiveDate};
use proptest::prelude::*;
use rstest::rstest;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::finder::{OpportunityFinder, available_to_spend};
use super::types::{OpportunityConfig, PayoutForecast};
use crate::projection::DailyBalance;

fn day(offset: u64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 7, 1)
        .unwrap()
        .checked_add_days(Days::new(offset))
        .unwrap()
}

fn payout(offset: u64, amount: Decimal, confidence: Option<Decimal>) -> PayoutForecast {
    PayoutForecast {
        id: PayoutForecastId::new(),
        date: day(offset),
        amount,
        confidence,
        label: None,
    }
}

fn balances(values: &[Decimal]) -> Vec<DailyBalance> {
    values
        .iter()
        .zip(0u64..)
        .map(|(&running_balance, offset)| DailyBalance {
            date: day(offset),
            running_balance,
            daily_change: Decimal::ZERO,
            daily_inflow: Decimal::ZERO,
            daily_outflow: Decimal::ZERO,
            credit_overflow: Decimal::ZERO,
            event_count: 0,
            card_credit: Default::default(),
        })
        .collect()
}

proptest! {
    /// Nothing is surfaced while every running total stays at or under the floor.
    #[test]
    fn prop_nothing_below_floor(
        amounts in prop::collection::vec(0i64..10_000, 0..10),
    ) {
        // Each payout is under $100, ten of them stay under $1,000.
        let payouts: Vec<PayoutForecast> = amounts
            .iter()
            .zip(0u64..)
            .map(|(&cents, offset)| payout(offset, Decimal::new(cents, 2), None))
            .collect();
        let finder = OpportunityFinder::default();
        prop_assert!(finder.from_payout_forecasts(Decimal::ZERO, Decimal::ZERO, &payouts).is_empty());
    }

    /// Available-to-spend is never negative.
    #[test]
    fn prop_available_to_spend_non_negative(
        balance in -1_000_000i64..1_000_000,
        reserve in 0i64..1_000_000,
        upcoming in 0i64..1_000_000,
    ) {
        let available = available_to_spend(Decimal::from(balance), Decimal::from(reserve), Decimal::from(upcoming));
        prop_assert!(available >= Decimal::ZERO);
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[rstest]
    #[case(dec!(10000), dec!(2000), dec!(3000), dec!(5000))]
    #[case(dec!(1000), dec!(2000), dec!(0), dec!(0))]
    #[case(dec!(-500), dec!(0), dec!(0), dec!(0))]
    fn test_available_to_spend(
        #[case] balance: Decimal,
        #[case] reserve: Decimal,
        #[case] upcoming: Decimal,
        #[case] expected: Decimal,
    ) {
        assert_eq!(available_to_spend(balance, reserve, upcoming), expected);
    }

    #[test]
    fn test_payouts_accumulate_in_date_order() {
        let payouts = vec![
            payout(10, dec!(800), Some(dec!(0.9))),
            payout(3, dec!(600), None),
            payout(20, dec!(100), None),
        ];
        let finder = OpportunityFinder::new(OpportunityConfig::with_reserve(dec!(1000)));
        let result = finder.from_payout_forecasts(dec!(1500), dec!(200), &payouts);

        // 300 spendable today; +600 = 900 stays under the floor.
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].date, day(10));
        assert_eq!(result[0].available_amount, dec!(1700));
        assert_eq!(result[0].confidence, dec!(0.9));
        assert_eq!(
            result[0].reasoning,
            "Payout of $800.00 expected Jul 11, 2025 brings available funds to $1,700.00"
        );
        assert_eq!(result[1].available_amount, dec!(1800));
        assert_eq!(result[1].confidence, dec!(0.7));
    }

    #[test]
    fn test_floor_is_strict() {
        let payouts = vec![payout(1, dec!(1000), None)];
        let finder = OpportunityFinder::default();
        assert!(
            finder
                .from_payout_forecasts(Decimal::ZERO, Decimal::ZERO, &payouts)
                .is_empty()
        );
    }

    #[test]
    fn test_at_most_three_chronological() {
        let payouts: Vec<PayoutForecast> = (0..6)
            .rev()
            .map(|offset| payout(offset, dec!(5000), None))
            .collect();
        let result =
            OpportunityFinder::default().from_payout_forecasts(Decimal::ZERO, Decimal::ZERO, &payouts);
        let dates: Vec<NaiveDate> = result.iter().map(|o| o.date).collect();
        assert_eq!(dates, vec![day(0), day(1), day(2)]);
    }

    #[test]
    fn test_window_after_dip() {
        let projection = balances(&[
            dec!(5000),
            dec!(3000),
            dec!(1500),
            dec!(2500),
            dec!(4000),
            dec!(6000),
            dec!(5500),
        ]);
        let finder = OpportunityFinder::new(OpportunityConfig::with_reserve(dec!(2000)));
        let windows = finder.from_daily_balances(&projection);

        assert_eq!(windows.len(), 1);
        let window = &windows[0];
        assert_eq!(window.low_point_date, day(2));
        assert_eq!(window.low_point_balance, dec!(1500));
        assert_eq!(window.peak_date, day(5));
        assert_eq!(window.peak_balance, dec!(6000));
        assert_eq!(window.opportunity_amount, dec!(4000));
        assert_eq!(window.earliest_safe_date, Some(day(3)));
        assert_eq!(window.confidence, dec!(0.7));
    }

    #[test]
    fn test_safe_date_omitted_when_equal_to_peak() {
        let projection = balances(&[dec!(3000), dec!(1000), dec!(2500), dec!(2400)]);
        let finder = OpportunityFinder::new(OpportunityConfig::with_reserve(dec!(2000)));
        let windows = finder.from_daily_balances(&projection);

        // 2,400 on day 3 is a second low point, so the first recovery ends at day 2.
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].peak_date, day(2));
        assert_eq!(windows[0].earliest_safe_date, None);
    }

    #[test]
    fn test_peak_ties_take_earliest() {
        let projection = balances(&[dec!(900), dec!(100), dec!(700), dec!(700)]);
        let windows = OpportunityFinder::default().from_daily_balances(&projection);
        assert_eq!(windows[0].peak_date, day(2));
    }

    #[test]
    fn test_peak_below_reserve_not_surfaced() {
        let projection = balances(&[dec!(900), dec!(100), dec!(700)]);
        let finder = OpportunityFinder::new(OpportunityConfig::with_reserve(dec!(1000)));
        assert!(finder.from_daily_balances(&projection).is_empty());
    }

    #[test]
    fn test_flat_or_rising_projection_has_no_windows() {
        let finder = OpportunityFinder::default();
        assert!(finder.from_daily_balances(&[]).is_empty());
        assert!(
            finder
                .from_daily_balances(&balances(&[dec!(100), dec!(200), dec!(300)]))
                .is_empty()
        );
        // A dip on the final day has no recovery.
        assert!(
            finder
                .from_daily_balances(&balances(&[dec!(300), dec!(100)]))
                .is_empty()
        );
    }
}
