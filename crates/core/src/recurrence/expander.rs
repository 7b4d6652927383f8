//! Recurrence expansion.

use chrono::{Days, Months, NaiveDate};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::types::{Frequency, RecurringTransaction, TransactionKind};
use crate::event::{CashFlowEvent, EventType};

/// Hard cap on walk steps per expansion.
pub const MAX_ITERATIONS: usize = 1000;

/// How far ahead [`RecurrenceExpander::next_occurrence`] looks.
pub const LOOKAHEAD_MONTHS: u32 = 24;

/// Expands recurring transactions into calendar dates.
pub struct RecurrenceExpander;

impl RecurrenceExpander {
    /// Generates every occurrence of `transaction` within
    /// `[range_start, range_end]`, in ascending order.
    ///
    /// The walk starts at the transaction's start date and stops past its end
    /// date, past `range_end`, on an unknown frequency, or after
    /// [`MAX_ITERATIONS`] steps. Exception dates are skipped.
    #[must_use]
    pub fn generate_dates(
        transaction: &RecurringTransaction,
        range_start: NaiveDate,
        range_end: NaiveDate,
    ) -> Vec<NaiveDate> {
        if !transaction.is_active || range_end < range_start {
            return Vec::new();
        }

        let frequency = transaction.frequency;
        let last = transaction
            .end_date
            .map_or(range_end, |end_date| end_date.min(range_end));

        let mut dates = Vec::new();
        let mut current = fast_forward(frequency, transaction.start_date, range_start);

        for _ in 0..MAX_ITERATIONS {
            if current > last {
                return dates;
            }

            if current >= range_start
                && frequency.allows(current)
                && !transaction.is_excluded(current)
            {
                dates.push(current);
            }

            match frequency.advance(current) {
                Some(next) => current = next,
                None => {
                    debug!(
                        transaction_id = %transaction.id,
                        frequency = ?frequency,
                        "Recurrence stopped: frequency cannot advance"
                    );
                    return dates;
                }
            }
        }

        warn!(
            transaction_id = %transaction.id,
            collected = dates.len(),
            "Recurrence expansion hit the iteration cap"
        );
        dates
    }

    /// First occurrence strictly after `after`, looking up to two years ahead.
    #[must_use]
    pub fn next_occurrence(
        transaction: &RecurringTransaction,
        after: NaiveDate,
    ) -> Option<NaiveDate> {
        let window_start = after.checked_add_days(Days::new(1))?;
        let window_end = after.checked_add_months(Months::new(LOOKAHEAD_MONTHS))?;
        Self::generate_dates(transaction, window_start, window_end)
            .into_iter()
            .next()
    }

    /// Returns true if an occurrence lands exactly on `date`.
    #[must_use]
    pub fn occurs_on(transaction: &RecurringTransaction, date: NaiveDate) -> bool {
        !Self::generate_dates(transaction, date, date).is_empty()
    }

    /// Total amount recurring within one calendar month.
    ///
    /// This is `amount × occurrences in the month`, so a weekly charge counts
    /// four or five times depending on the month.
    #[must_use]
    pub fn monthly_amount(transaction: &RecurringTransaction, year: i32, month: u32) -> Decimal {
        let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
            return Decimal::ZERO;
        };
        let Some(last) = first
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
        else {
            return Decimal::ZERO;
        };

        let count = Self::generate_dates(transaction, first, last).len();
        transaction.amount * Decimal::from(count)
    }

    /// Occurrences within the range as cash-flow events.
    ///
    /// Income becomes an inflow and expenses become recurring outflows.
    #[must_use]
    pub fn to_events(
        transaction: &RecurringTransaction,
        range_start: NaiveDate,
        range_end: NaiveDate,
    ) -> Vec<CashFlowEvent> {
        let event_type = match transaction.kind {
            TransactionKind::Income => EventType::Inflow,
            TransactionKind::Expense => EventType::Recurring,
        };

        Self::generate_dates(transaction, range_start, range_end)
            .into_iter()
            .map(|date| {
                CashFlowEvent::new(event_type, transaction.amount, date)
                    .with_label(transaction.name.clone())
            })
            .collect()
    }
}

/// Skips whole periods of a day-based series that end before `range_start`.
///
/// The skipped dates could never be emitted, and skipping them keeps old
/// daily or weekly series from exhausting the iteration cap.
fn fast_forward(frequency: Frequency, start: NaiveDate, range_start: NaiveDate) -> NaiveDate {
    let Some(period) = frequency.period_days() else {
        return start;
    };
    let Ok(gap) = u64::try_from((range_start - start).num_days()) else {
        return start;
    };

    let skipped = gap / period * period;
    start.checked_add_days(Days::new(skipped)).unwrap_or(start)
}
