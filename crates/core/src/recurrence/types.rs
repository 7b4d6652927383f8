//! Recurring transaction data types.

use cashcast_shared::types::RecurringTransactionId;
use cashcast_shared::types::date::calendar_date;
use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How often a recurring transaction repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Frequency {
    /// Every day.
    Daily,
    /// Every 7 days.
    Weekly,
    /// Every 14 days.
    #[serde(alias = "biweekly")]
    BiWeekly,
    /// Same day each calendar month.
    Monthly,
    /// Every second calendar month.
    #[serde(rename = "every-2-months")]
    EveryTwoMonths,
    /// Every third calendar month.
    #[serde(rename = "every-3-months", alias = "quarterly")]
    EveryThreeMonths,
    /// Monday through Friday.
    #[serde(alias = "weekdays-only")]
    Weekdays,
    /// Anything the expander does not understand.
    #[serde(other)]
    Unknown,
}

impl Frequency {
    /// Fixed distance between occurrences in days, for day-based frequencies.
    ///
    /// Weekdays repeat their pattern every 7 days.
    #[must_use]
    pub const fn period_days(self) -> Option<u64> {
        match self {
            Self::Daily => Some(1),
            Self::Weekly | Self::Weekdays => Some(7),
            Self::BiWeekly => Some(14),
            Self::Monthly | Self::EveryTwoMonths | Self::EveryThreeMonths | Self::Unknown => None,
        }
    }

    /// Whether an occurrence may land on this date at all.
    #[must_use]
    pub fn allows(self, date: NaiveDate) -> bool {
        match self {
            Self::Weekdays => !is_weekend(date),
            _ => true,
        }
    }

    /// Steps from one occurrence to the next.
    ///
    /// Month steps use calendar arithmetic and clamp to the end of shorter
    /// months. Returns `None` for [`Frequency::Unknown`] or on calendar overflow.
    #[must_use]
    pub fn advance(self, date: NaiveDate) -> Option<NaiveDate> {
        match self {
            Self::Daily => date.checked_add_days(Days::new(1)),
            Self::Weekly => date.checked_add_days(Days::new(7)),
            Self::BiWeekly => date.checked_add_days(Days::new(14)),
            Self::Monthly => date.checked_add_months(Months::new(1)),
            Self::EveryTwoMonths => date.checked_add_months(Months::new(2)),
            Self::EveryThreeMonths => date.checked_add_months(Months::new(3)),
            Self::Weekdays => {
                let mut next = date.checked_add_days(Days::new(1))?;
                while is_weekend(next) {
                    next = next.checked_add_days(Days::new(1))?;
                }
                Some(next)
            }
            Self::Unknown => None,
        }
    }
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Direction of a recurring transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Money coming in.
    Income,
    /// Money going out.
    Expense,
}

/// A single suppressed occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceException {
    /// Occurrence date to skip.
    #[serde(deserialize_with = "calendar_date::deserialize")]
    pub date: NaiveDate,
    /// Why it was skipped.
    #[serde(default)]
    pub reason: Option<String>,
}

/// A user-defined recurring income or expense.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringTransaction {
    /// Definition ID.
    #[serde(default)]
    pub id: RecurringTransactionId,
    /// Human label.
    pub name: String,
    /// Amount per occurrence, signed or unsigned.
    pub amount: Decimal,
    /// Repeat frequency.
    pub frequency: Frequency,
    /// First occurrence.
    #[serde(deserialize_with = "calendar_date::deserialize")]
    pub start_date: NaiveDate,
    /// Last possible occurrence; unbounded when absent.
    #[serde(default, deserialize_with = "calendar_date::option::deserialize")]
    pub end_date: Option<NaiveDate>,
    /// Inactive definitions produce nothing.
    #[serde(default = "default_active")]
    pub is_active: bool,
    /// Income or expense.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// Suppressed occurrences.
    #[serde(default)]
    pub exceptions: Vec<RecurrenceException>,
}

fn default_active() -> bool {
    true
}

impl RecurringTransaction {
    /// Creates an active definition with no end date and no exceptions.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        amount: Decimal,
        frequency: Frequency,
        start_date: NaiveDate,
        kind: TransactionKind,
    ) -> Self {
        Self {
            id: RecurringTransactionId::new(),
            name: name.into(),
            amount,
            frequency,
            start_date,
            end_date: None,
            is_active: true,
            kind,
            exceptions: Vec::new(),
        }
    }

    /// Returns true if an exception suppresses the occurrence on `date`.
    #[must_use]
    pub fn is_excluded(&self, date: NaiveDate) -> bool {
        self.exceptions.iter().any(|exception| exception.date == date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[rstest]
    #[case(Frequency::Daily, ymd(2024, 1, 31), ymd(2024, 2, 1))]
    #[case(Frequency::Weekly, ymd(2024, 1, 31), ymd(2024, 2, 7))]
    #[case(Frequency::BiWeekly, ymd(2024, 1, 31), ymd(2024, 2, 14))]
    #[case(Frequency::Monthly, ymd(2024, 1, 31), ymd(2024, 2, 29))]
    #[case(Frequency::Monthly, ymd(2023, 1, 31), ymd(2023, 2, 28))]
    #[case(Frequency::EveryTwoMonths, ymd(2024, 12, 31), ymd(2025, 2, 28))]
    #[case(Frequency::EveryThreeMonths, ymd(2024, 11, 30), ymd(2025, 2, 28))]
    #[case(Frequency::Weekdays, ymd(2024, 3, 1), ymd(2024, 3, 4))]
    #[case(Frequency::Weekdays, ymd(2024, 3, 4), ymd(2024, 3, 5))]
    fn test_advance(#[case] frequency: Frequency, #[case] from: NaiveDate, #[case] to: NaiveDate) {
        assert_eq!(frequency.advance(from), Some(to));
    }

    #[test]
    fn test_unknown_does_not_advance() {
        assert_eq!(Frequency::Unknown.advance(ymd(2024, 1, 1)), None);
    }

    #[rstest]
    #[case("\"daily\"", Frequency::Daily)]
    #[case("\"bi-weekly\"", Frequency::BiWeekly)]
    #[case("\"biweekly\"", Frequency::BiWeekly)]
    #[case("\"every-2-months\"", Frequency::EveryTwoMonths)]
    #[case("\"every-3-months\"", Frequency::EveryThreeMonths)]
    #[case("\"weekdays\"", Frequency::Weekdays)]
    #[case("\"weekdays-only\"", Frequency::Weekdays)]
    #[case("\"fortnightly-ish\"", Frequency::Unknown)]
    fn test_frequency_wire_names(#[case] json: &str, #[case] expected: Frequency) {
        assert_eq!(serde_json::from_str::<Frequency>(json).unwrap(), expected);
    }

    #[test]
    fn test_weekdays_disallow_weekend() {
        assert!(!Frequency::Weekdays.allows(ymd(2024, 3, 2)));
        assert!(!Frequency::Weekdays.allows(ymd(2024, 3, 3)));
        assert!(Frequency::Weekdays.allows(ymd(2024, 3, 4)));
        assert!(Frequency::Daily.allows(ymd(2024, 3, 2)));
    }

    #[test]
    fn test_deserialize_definition() {
        let json = r#"{
            "name": "Warehouse rent",
            "amount": "-4200",
            "frequency": "monthly",
            "start_date": "2024-03-01",
            "end_date": null,
            "type": "expense",
            "exceptions": [{"date": "2024-06-01", "reason": "prepaid"}]
        }"#;
        let tx: RecurringTransaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.frequency, Frequency::Monthly);
        assert_eq!(tx.start_date, ymd(2024, 3, 1));
        assert!(tx.is_active);
        assert_eq!(tx.kind, TransactionKind::Expense);
        assert!(tx.is_excluded(ymd(2024, 6, 1)));
        assert!(!tx.is_excluded(ymd(2024, 7, 1)));
    }
}
