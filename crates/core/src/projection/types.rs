//! Projection data types.

use std::collections::BTreeMap;

use cashcast_shared::types::CreditCardId;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::ProjectionError;
use crate::event::CashFlowEvent;

/// Available credit per card, ordered by card ID.
pub type CardCreditMap = BTreeMap<CreditCardId, Decimal>;

/// A credit card as seen by the simulator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditCard {
    /// Card ID.
    pub id: CreditCardId,
    /// Display name.
    pub name: String,
    /// Limit granted by the issuer.
    pub credit_limit: Decimal,
    /// User-entered limit that takes precedence over the issuer's.
    #[serde(default)]
    pub credit_limit_override: Option<Decimal>,
    /// Amount currently owed.
    #[serde(default)]
    pub balance: Decimal,
}

impl CreditCard {
    /// Limit in force: the override when present.
    #[must_use]
    pub fn effective_limit(&self) -> Decimal {
        self.credit_limit_override.unwrap_or(self.credit_limit)
    }

    /// Credit still available on the card.
    #[must_use]
    pub fn available_credit(&self) -> Decimal {
        self.effective_limit() - self.balance
    }
}

/// Projected cash position at the end of one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyBalance {
    /// Day.
    pub date: NaiveDate,
    /// Cash balance at end of day.
    pub running_balance: Decimal,
    /// Inflow minus cash outflow.
    pub daily_change: Decimal,
    /// Sum of inflows.
    pub daily_inflow: Decimal,
    /// Sum of cash outflows.
    pub daily_outflow: Decimal,
    /// Cash forced out by cards exceeding their limit.
    pub credit_overflow: Decimal,
    /// Events counted on this day.
    pub event_count: usize,
    /// Available credit of every tracked card at end of day.
    pub card_credit: CardCreditMap,
}

/// Output of a projection run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionResult {
    /// One record per projected day, in date order.
    pub daily_balances: Vec<DailyBalance>,
    /// Lowest running balance over the horizon.
    pub minimum_balance: Decimal,
    /// Earliest day the minimum was reached.
    pub minimum_date: NaiveDate,
    /// Overflow debits synthesized during the run.
    pub overflow_events: Vec<CashFlowEvent>,
}

impl ProjectionResult {
    /// Number of days ending below `threshold`.
    #[must_use]
    pub fn days_below(&self, threshold: Decimal) -> usize {
        self.daily_balances
            .iter()
            .filter(|day| day.running_balance < threshold)
            .count()
    }
}

/// How the reference day's own events are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TodayPolicy {
    /// Count today's events like any other day.
    #[default]
    Include,
    /// Ignore today's events entirely.
    Exclude,
    /// Show today's change, but only roll it into the balance from tomorrow.
    Defer,
}

/// Parameters of a projection run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionOptions {
    /// First projected day ("today").
    pub reference_date: NaiveDate,
    /// Number of days to project, today included.
    pub days_to_project: u32,
    /// Treatment of today's events.
    pub today: TodayPolicy,
    /// Whether card credit is tracked and overflow converted to cash.
    pub track_credit_cards: bool,
}

impl ProjectionOptions {
    /// Default horizon in days.
    pub const DEFAULT_DAYS: u32 = 90;

    /// Longest accepted horizon, roughly ten years.
    pub const MAX_DAYS: u32 = 3660;

    /// Options for a default 90-day run with card tracking.
    #[must_use]
    pub const fn new(reference_date: NaiveDate) -> Self {
        Self {
            reference_date,
            days_to_project: Self::DEFAULT_DAYS,
            today: TodayPolicy::Include,
            track_credit_cards: true,
        }
    }

    /// Sets the horizon.
    #[must_use]
    pub const fn with_days(mut self, days: u32) -> Self {
        self.days_to_project = days;
        self
    }

    /// Sets the treatment of today's events.
    #[must_use]
    pub const fn with_today(mut self, today: TodayPolicy) -> Self {
        self.today = today;
        self
    }

    /// Enables or disables card tracking.
    #[must_use]
    pub const fn with_card_tracking(mut self, track: bool) -> Self {
        self.track_credit_cards = track;
        self
    }

    /// Checks the horizon is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError::InvalidDays`] for a zero or overlong horizon.
    pub const fn validate(&self) -> Result<(), ProjectionError> {
        if self.days_to_project == 0 || self.days_to_project > Self::MAX_DAYS {
            return Err(ProjectionError::InvalidDays {
                days: self.days_to_project,
                max: Self::MAX_DAYS,
            });
        }
        Ok(())
    }
}
