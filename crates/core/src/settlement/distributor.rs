//! Settlement distribution arithmetic.
//!
//! Daily shares are truncated to the cent and the final day absorbs whatever
//! is left, so a distribution always adds up to its net amount exactly.

use cashcast_shared::types::money::{CENT_PLACES, ONE_CENT, floor_zero, round_cents};
use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::debug;

use super::types::{
    DailyDistribution, DistributionMode, HistoricalVolume, SettlementBucket, VolumeWeights,
};
use crate::event::{CashFlowEvent, EventType};

/// Distributes settlement funds across days.
pub struct SettlementDistributor;

impl SettlementDistributor {
    /// Spreads `total_cumulative_amount - already_drawn` across every day of
    /// `[period_start, period_end]`.
    ///
    /// With `volume_weights`, each day's share follows its sales volume;
    /// otherwise every day gets the same share. Each day's share is truncated
    /// toward zero to the cent, never rounded up, and the last day takes what
    /// is left. With 200 over three days that gives 66.66, 66.66 and 66.68.
    /// Returns an empty list when nothing is left to distribute or the period
    /// is empty.
    #[must_use]
    pub fn cumulative_daily_distribution(
        period_start: NaiveDate,
        period_end: NaiveDate,
        total_cumulative_amount: Decimal,
        already_drawn: Decimal,
        volume_weights: Option<&VolumeWeights>,
    ) -> Vec<DailyDistribution> {
        let net_available = round_cents(floor_zero(total_cumulative_amount - already_drawn));
        if net_available.is_zero() {
            return Vec::new();
        }

        let Ok(total_days) = usize::try_from((period_end - period_start).num_days() + 1) else {
            return Vec::new();
        };
        if total_days == 0 {
            return Vec::new();
        }

        let dates: Vec<NaiveDate> = period_start.iter_days().take(total_days).collect();
        let shares = day_shares(&dates, net_available, volume_weights);

        let mut cumulative = Decimal::ZERO;
        let mut distributions: Vec<DailyDistribution> = dates
            .into_iter()
            .zip(shares)
            .zip(1u32..)
            .map(|((date, share), days_accumulated)| {
                let daily_unlock = truncate_cents(share);
                cumulative += daily_unlock;
                DailyDistribution {
                    date,
                    daily_unlock,
                    cumulative_available: cumulative,
                    days_accumulated,
                    is_settlement_day: false,
                }
            })
            .collect();

        if let Some(last) = distributions.last_mut() {
            let before_last = last.cumulative_available - last.daily_unlock;
            last.daily_unlock = net_available - before_last;
            last.cumulative_available = net_available;
        }

        distributions
    }

    /// Applies a withdrawal made on `draw_date` to an existing distribution.
    ///
    /// Days before the draw keep their values; from the draw date on, the
    /// cumulative amount drops by the draw, never below zero. If no day
    /// matches `draw_date` the distribution is returned unchanged.
    #[must_use]
    pub fn recalculate_after_draw(
        distributions: &[DailyDistribution],
        draw_amount: Decimal,
        draw_date: NaiveDate,
    ) -> Vec<DailyDistribution> {
        if !distributions.iter().any(|day| day.date == draw_date) {
            debug!(%draw_date, "Draw date outside distribution, nothing recalculated");
            return distributions.to_vec();
        }

        let draw = floor_zero(draw_amount);
        distributions
            .iter()
            .map(|day| {
                if day.date < draw_date {
                    day.clone()
                } else {
                    DailyDistribution {
                        cumulative_available: floor_zero(day.cumulative_available - draw),
                        ..day.clone()
                    }
                }
            })
            .collect()
    }

    /// Spreads a bucket's net amount evenly from `today` through its
    /// settlement date.
    ///
    /// A bucket settling today or earlier yields one record for today holding
    /// the full amount.
    #[must_use]
    pub fn bucket_daily_distributions(
        bucket: &SettlementBucket,
        today: NaiveDate,
    ) -> Vec<DailyDistribution> {
        let net = bucket.net_distributable();
        if net.is_zero() {
            return Vec::new();
        }

        if bucket.settlement_date <= today {
            return vec![DailyDistribution {
                date: today,
                daily_unlock: net,
                cumulative_available: net,
                days_accumulated: 1,
                is_settlement_day: true,
            }];
        }

        let Ok(days) = usize::try_from((bucket.settlement_date - today).num_days() + 1) else {
            return Vec::new();
        };

        let mut cumulative = Decimal::ZERO;
        today
            .iter_days()
            .zip(split_evenly(net, days))
            .zip(1u32..)
            .map(|((date, daily_unlock), days_accumulated)| {
                cumulative += daily_unlock;
                DailyDistribution {
                    date,
                    daily_unlock,
                    cumulative_available: cumulative,
                    days_accumulated,
                    is_settlement_day: date == bucket.settlement_date,
                }
            })
            .collect()
    }

    /// Distributes a bucket according to `mode`.
    #[must_use]
    pub fn distribute(
        bucket: &SettlementBucket,
        mode: &DistributionMode,
        today: NaiveDate,
    ) -> Vec<DailyDistribution> {
        let weights = match mode {
            DistributionMode::Even => return Self::bucket_daily_distributions(bucket, today),
            DistributionMode::Cumulative => None,
            DistributionMode::VolumeWeighted(weights) => Some(weights),
        };

        let mut distributions = Self::cumulative_daily_distribution(
            bucket.period_start,
            bucket.period_end,
            bucket.cumulative_total(),
            bucket.total_draws,
            weights,
        );
        for day in &mut distributions {
            day.is_settlement_day = day.date == bucket.settlement_date;
        }
        distributions
    }

    /// Sums historical net sales per day within the period.
    #[must_use]
    pub fn volume_weights_from_history(
        history: &[HistoricalVolume],
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> VolumeWeights {
        let mut weights = VolumeWeights::new();
        for record in history
            .iter()
            .filter(|record| record.date >= period_start && record.date <= period_end)
        {
            *weights.entry(record.date).or_insert(Decimal::ZERO) += record.net_amount;
        }
        weights
    }

    /// Total unlocked as of `date`.
    #[must_use]
    pub fn available_on(distributions: &[DailyDistribution], date: NaiveDate) -> Decimal {
        distributions
            .iter()
            .filter(|day| day.date <= date)
            .max_by_key(|day| day.date)
            .map_or(Decimal::ZERO, |day| day.cumulative_available)
    }

    /// Each non-zero daily unlock as an inflow event.
    #[must_use]
    pub fn to_events(distributions: &[DailyDistribution], label: &str) -> Vec<CashFlowEvent> {
        distributions
            .iter()
            .filter(|day| !day.daily_unlock.is_zero())
            .map(|day| unlock_event(day.daily_unlock, day.date, label))
            .collect()
    }

    /// Inflow events for a projection starting on `start`.
    ///
    /// Unlocks dated before `start` are already available but not yet drawn,
    /// so they arrive as one inflow on `start`. The events add up to the whole
    /// distribution.
    #[must_use]
    pub fn to_events_from(
        distributions: &[DailyDistribution],
        label: &str,
        start: NaiveDate,
    ) -> Vec<CashFlowEvent> {
        let carried: Decimal = distributions
            .iter()
            .filter(|day| day.date < start)
            .map(|day| day.daily_unlock)
            .sum();

        let mut events = Vec::new();
        if !carried.is_zero() {
            debug!(%start, %carried, "Earlier unlocks carried into the first projected day");
            events.push(unlock_event(carried, start, label));
        }
        events.extend(
            distributions
                .iter()
                .filter(|day| day.date >= start && !day.daily_unlock.is_zero())
                .map(|day| unlock_event(day.daily_unlock, day.date, label)),
        );
        events
    }
}

fn unlock_event(amount: Decimal, date: NaiveDate, label: &str) -> CashFlowEvent {
    CashFlowEvent::new(EventType::Inflow, amount, date).with_label(label)
}

fn truncate_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(CENT_PLACES, RoundingStrategy::ToZero)
}

/// Raw (unrounded) share of `net` for each date.
///
/// Days without volume data are weighted like an average observed day. With
/// no usable volume at all the split is even.
fn day_shares(
    dates: &[NaiveDate],
    net: Decimal,
    volume_weights: Option<&VolumeWeights>,
) -> Vec<Decimal> {
    let even = net / Decimal::from(dates.len());
    let Some(weights) = volume_weights else {
        return vec![even; dates.len()];
    };

    let observed: Vec<Option<Decimal>> = dates
        .iter()
        .map(|date| weights.get(date).copied().map(floor_zero))
        .collect();
    let covered_days = observed.iter().flatten().count();
    let covered_volume: Decimal = observed.iter().flatten().copied().sum();

    if covered_days == 0 || covered_volume.is_zero() {
        debug!("No usable volume weights, distributing evenly");
        return vec![even; dates.len()];
    }

    let average_day = covered_volume / Decimal::from(covered_days);
    let total_volume = covered_volume + average_day * Decimal::from(dates.len() - covered_days);

    observed
        .into_iter()
        .map(|volume| net * volume.unwrap_or(average_day) / total_volume)
        .collect()
}

/// Splits `total` into `parts` cent amounts that add up to `total` exactly.
///
/// Leftover cents go to the earliest parts.
fn split_evenly(total: Decimal, parts: usize) -> Vec<Decimal> {
    if parts == 0 {
        return Vec::new();
    }

    let count = Decimal::from(parts);
    let base = truncate_cents(total / count);
    let leftover_cents = ((total - base * count) / ONE_CENT)
        .trunc()
        .to_usize()
        .unwrap_or(0);

    (0..parts)
        .map(|i| if i < leftover_cents { base + ONE_CENT } else { base })
        .collect()
}
