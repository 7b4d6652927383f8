//! Detection of safe-to-spend windows.

use cashcast_shared::types::money::{floor_zero, format_usd};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use super::types::{BuyingOpportunity, OpportunityConfig, OpportunityWindow, PayoutForecast};
use crate::projection::DailyBalance;

/// Cash free for discretionary spending, never negative.
#[must_use]
pub fn available_to_spend(balance: Decimal, reserve: Decimal, upcoming_expenses: Decimal) -> Decimal {
    floor_zero(balance - reserve - upcoming_expenses)
}

/// Finds buying opportunities in forecasts and projected balances.
#[derive(Debug, Clone, Default)]
pub struct OpportunityFinder {
    config: OpportunityConfig,
}

impl OpportunityFinder {
    /// Creates a finder with the given thresholds.
    #[must_use]
    pub const fn new(config: OpportunityConfig) -> Self {
        Self { config }
    }

    /// Thresholds in use.
    #[must_use]
    pub const fn config(&self) -> &OpportunityConfig {
        &self.config
    }

    /// Accumulates payouts, in date order, onto today's available-to-spend.
    ///
    /// Every running total above the materiality floor is an opportunity;
    /// only the first `max_results` are returned.
    #[must_use]
    pub fn from_payout_forecasts(
        &self,
        current_balance: Decimal,
        upcoming_expenses: Decimal,
        payouts: &[PayoutForecast],
    ) -> Vec<BuyingOpportunity> {
        let mut sorted: Vec<&PayoutForecast> = payouts.iter().collect();
        sorted.sort_by_key(|payout| payout.date);

        let mut cumulative =
            available_to_spend(current_balance, self.config.reserve_amount, upcoming_expenses);

        let mut opportunities = Vec::new();
        for payout in sorted {
            cumulative += payout.amount;
            if cumulative <= self.config.materiality_floor {
                continue;
            }
            opportunities.push(BuyingOpportunity {
                date: payout.date,
                available_amount: cumulative,
                confidence: payout.confidence.unwrap_or(self.config.default_confidence),
                reasoning: format!(
                    "Payout of {} expected {} brings available funds to {}",
                    format_usd(payout.amount),
                    display_date(payout.date),
                    format_usd(cumulative),
                ),
            });
        }
        opportunities.truncate(self.config.max_results);

        debug!(
            payouts = payouts.len(),
            found = opportunities.len(),
            "Scanned payout forecasts"
        );
        opportunities
    }

    /// Finds dips in the projection and the recoveries that follow them.
    ///
    /// A low point is a day strictly below the previous day and not above the
    /// next. Its peak is the highest later day before the next low point.
    #[must_use]
    pub fn from_daily_balances(&self, balances: &[DailyBalance]) -> Vec<OpportunityWindow> {
        let reserve = self.config.reserve_amount;
        let lows = low_points(balances);

        lows.iter()
            .enumerate()
            .filter_map(|(n, &low)| {
                let next_low = lows.get(n + 1).copied().unwrap_or(balances.len());
                let recovery = &balances[low + 1..next_low];
                let low_day = &balances[low];

                let peak = recovery.iter().fold(None, |best: Option<&DailyBalance>, day| {
                    match best {
                        Some(current) if current.running_balance >= day.running_balance => best,
                        _ => Some(day),
                    }
                })?;
                if peak.running_balance <= low_day.running_balance {
                    return None;
                }

                let opportunity_amount = peak.running_balance - reserve;
                if opportunity_amount <= Decimal::ZERO {
                    return None;
                }

                let earliest_safe_date = recovery
                    .iter()
                    .find(|day| day.running_balance > reserve)
                    .map(|day| day.date)
                    .filter(|date| *date < peak.date);

                Some(OpportunityWindow {
                    low_point_date: low_day.date,
                    low_point_balance: low_day.running_balance,
                    peak_date: peak.date,
                    peak_balance: peak.running_balance,
                    earliest_safe_date,
                    opportunity_amount,
                    confidence: self.config.default_confidence,
                    reasoning: format!(
                        "Balance dips to {} on {} and recovers to {} by {}, {} above reserve",
                        format_usd(low_day.running_balance),
                        display_date(low_day.date),
                        format_usd(peak.running_balance),
                        display_date(peak.date),
                        format_usd(opportunity_amount),
                    ),
                })
            })
            .take(self.config.max_results)
            .collect()
    }
}

fn low_points(balances: &[DailyBalance]) -> Vec<usize> {
    (1..balances.len())
        .filter(|&i| {
            let balance = balances[i].running_balance;
            balance < balances[i - 1].running_balance
                && balances
                    .get(i + 1)
                    .is_none_or(|next| balance <= next.running_balance)
        })
        .collect()
}

fn display_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}
