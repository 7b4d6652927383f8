//! Day-by-day cash balance simulation.
//!
//! The run is a strict fold over days: each day consumes the previous day's
//! card-credit snapshot and produces a new one.

use std::collections::BTreeMap;

use cashcast_shared::types::CreditCardId;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use super::error::ProjectionError;
use super::types::{
    CardCreditMap, CreditCard, DailyBalance, ProjectionOptions, ProjectionResult, TodayPolicy,
};
use crate::event::{CashFlowEvent, EventType};

/// Simulates running cash balances over a horizon.
pub struct ProjectionEngine;

impl ProjectionEngine {
    /// Projects `starting_balance` forward through `events`.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError::InvalidDays`] if the horizon is rejected by
    /// [`ProjectionOptions::validate`]: zero days, or more than
    /// [`ProjectionOptions::MAX_DAYS`] (3660). Longer horizons are not clamped.
    pub fn run(
        starting_balance: Decimal,
        events: &[CashFlowEvent],
        credit_cards: &[CreditCard],
        options: &ProjectionOptions,
    ) -> Result<ProjectionResult, ProjectionError> {
        options.validate()?;
        debug!(
            reference_date = %options.reference_date,
            days = options.days_to_project,
            events = events.len(),
            cards = credit_cards.len(),
            "Running projection"
        );

        let mut by_day: BTreeMap<NaiveDate, Vec<&CashFlowEvent>> = BTreeMap::new();
        for event in events {
            by_day.entry(event.effective_date()).or_default().push(event);
        }

        let card_names: BTreeMap<CreditCardId, &str> = credit_cards
            .iter()
            .map(|card| (card.id, card.name.as_str()))
            .collect();
        let credit = if options.track_credit_cards {
            CardCredit::from_cards(credit_cards)
        } else {
            CardCredit::default()
        };

        let initial = Simulation {
            balance: starting_balance,
            credit,
            days: Vec::new(),
            overflow_events: Vec::new(),
        };

        let simulation = options
            .reference_date
            .iter_days()
            .take(options.days_to_project as usize)
            .enumerate()
            .fold(initial, |simulation, (offset, date)| {
                let is_today = offset == 0;
                let todays_events = match (is_today, options.today) {
                    (true, TodayPolicy::Exclude) => &[][..],
                    _ => by_day.get(&date).map_or(&[][..], Vec::as_slice),
                };
                simulation.step(
                    date,
                    todays_events,
                    is_today && options.today == TodayPolicy::Defer,
                    options.track_credit_cards,
                    &card_names,
                )
            });

        Ok(simulation.finish(starting_balance, options.reference_date))
    }
}

/// Calendar projection with card tracking and overflow handling.
///
/// With `exclude_today`, today's events are ignored entirely.
///
/// # Errors
///
/// Returns [`ProjectionError::InvalidDays`] when `days` is zero or exceeds
/// [`ProjectionOptions::MAX_DAYS`] (3660). Longer horizons are not clamped.
pub fn calculate_calendar_balances(
    starting_balance: Decimal,
    events: &[CashFlowEvent],
    days_to_project: u32,
    exclude_today: bool,
    credit_cards: &[CreditCard],
    reference_date: NaiveDate,
) -> Result<ProjectionResult, ProjectionError> {
    let today = if exclude_today {
        TodayPolicy::Exclude
    } else {
        TodayPolicy::Include
    };
    let options = ProjectionOptions::new(reference_date)
        .with_days(days_to_project)
        .with_today(today);
    ProjectionEngine::run(starting_balance, events, credit_cards, &options)
}

/// Chart projection without card tracking.
///
/// With `exclude_today`, today's change is reported but only rolled into the
/// balance from tomorrow on.
///
/// # Errors
///
/// Returns [`ProjectionError::InvalidDays`] when `days` is zero or exceeds
/// [`ProjectionOptions::MAX_DAYS`] (3660). Longer horizons are not clamped.
pub fn calculate_chart_balances(
    starting_balance: Decimal,
    events: &[CashFlowEvent],
    days_to_project: u32,
    exclude_today: bool,
    reference_date: NaiveDate,
) -> Result<ProjectionResult, ProjectionError> {
    let today = if exclude_today {
        TodayPolicy::Defer
    } else {
        TodayPolicy::Include
    };
    let options = ProjectionOptions::new(reference_date)
        .with_days(days_to_project)
        .with_today(today)
        .with_card_tracking(false);
    ProjectionEngine::run(starting_balance, events, &[], &options)
}

/// Snapshot of every tracked card's available credit.
#[derive(Debug, Clone, Default)]
struct CardCredit(CardCreditMap);

impl CardCredit {
    fn from_cards(cards: &[CreditCard]) -> Self {
        Self(
            cards
                .iter()
                .map(|card| (card.id, card.available_credit()))
                .collect(),
        )
    }

    /// Applies one day of card activity.
    ///
    /// Returns the next snapshot, with negative credit clamped to zero, and the
    /// amount each card went over its limit.
    fn apply(&self, events: &[&CashFlowEvent]) -> (Self, Vec<(CreditCardId, Decimal)>) {
        let mut next = self.0.clone();

        for event in events {
            if let Some(card) = event.card_purchase() {
                match next.get_mut(&card) {
                    Some(available) => *available -= event.magnitude(),
                    None => debug!(%card, "Purchase on untracked card ignored"),
                }
            }
        }
        for event in events {
            if let Some(card) = event.card_payment() {
                if let Some(available) = next.get_mut(&card) {
                    *available += event.magnitude();
                }
            }
        }

        let overflows = next
            .iter_mut()
            .filter(|(_, available)| **available < Decimal::ZERO)
            .map(|(card, available)| {
                let over = -*available;
                *available = Decimal::ZERO;
                (*card, over)
            })
            .collect();

        (Self(next), overflows)
    }
}

struct Simulation {
    balance: Decimal,
    credit: CardCredit,
    days: Vec<DailyBalance>,
    overflow_events: Vec<CashFlowEvent>,
}

impl Simulation {
    fn step(
        self,
        date: NaiveDate,
        events: &[&CashFlowEvent],
        defer: bool,
        track_credit_cards: bool,
        card_names: &BTreeMap<CreditCardId, &str>,
    ) -> Self {
        let Self {
            balance,
            credit,
            mut days,
            mut overflow_events,
        } = self;

        let daily_inflow: Decimal = events
            .iter()
            .filter(|event| event.is_inflow())
            .map(|event| event.magnitude())
            .sum();
        let daily_outflow: Decimal = events
            .iter()
            .filter(|event| event.is_cash_outflow())
            .map(|event| event.magnitude())
            .sum();
        let daily_change = daily_inflow - daily_outflow;

        let (credit, overflows) = if track_credit_cards {
            credit.apply(events)
        } else {
            (credit, Vec::new())
        };

        let mut credit_overflow = Decimal::ZERO;
        for (card, amount) in overflows {
            debug!(%card, %amount, %date, "Card over limit, excess paid from cash");
            credit_overflow += amount;
            let name = card_names.get(&card).copied().unwrap_or("card");
            overflow_events.push(
                CashFlowEvent::new(EventType::CreditOverflow, amount, date)
                    .with_card(card)
                    .with_label(format!("Credit overflow: {name}")),
            );
        }

        let next_balance = balance + daily_change - credit_overflow;
        days.push(DailyBalance {
            date,
            running_balance: if defer { balance } else { next_balance },
            daily_change,
            daily_inflow,
            daily_outflow,
            credit_overflow,
            event_count: events.len(),
            card_credit: credit.0.clone(),
        });

        Self {
            balance: next_balance,
            credit,
            days,
            overflow_events,
        }
    }

    fn finish(self, starting_balance: Decimal, reference_date: NaiveDate) -> ProjectionResult {
        let (minimum_balance, minimum_date) = self
            .days
            .iter()
            .fold(None, |lowest: Option<(Decimal, NaiveDate)>, day| match lowest {
                Some((balance, _)) if balance <= day.running_balance => lowest,
                _ => Some((day.running_balance, day.date)),
            })
            .unwrap_or((starting_balance, reference_date));

        ProjectionResult {
            daily_balances: self.days,
            minimum_balance,
            minimum_date,
            overflow_events: self.overflow_events,
        }
    }
}
