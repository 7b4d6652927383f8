//! Settlement data types.

use std::collections::BTreeMap;

use cashcast_shared::types::SettlementId;
use cashcast_shared::types::date::calendar_date;
use cashcast_shared::types::money::{floor_zero, round_cents};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Historical sales volume per day, used to weight distributions.
pub type VolumeWeights = BTreeMap<NaiveDate, Decimal>;

/// A marketplace accounting period awaiting payout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementBucket {
    /// Settlement ID.
    #[serde(default)]
    pub id: SettlementId,
    /// First day of the settlement period.
    #[serde(deserialize_with = "calendar_date::deserialize")]
    pub period_start: NaiveDate,
    /// Last day of the settlement period.
    #[serde(deserialize_with = "calendar_date::deserialize")]
    pub period_end: NaiveDate,
    /// Day the marketplace pays out.
    #[serde(deserialize_with = "calendar_date::deserialize")]
    pub settlement_date: NaiveDate,
    /// Amount eligible for payout.
    pub eligible_amount: Decimal,
    /// Amount held back as reserve.
    #[serde(default)]
    pub reserve_amount: Decimal,
    /// Fees, refunds and other corrections.
    #[serde(default)]
    pub adjustments: Decimal,
    /// Amount already withdrawn against this bucket.
    #[serde(default)]
    pub total_draws: Decimal,
}

impl SettlementBucket {
    /// Amount the bucket can still distribute before draws.
    #[must_use]
    pub fn cumulative_total(&self) -> Decimal {
        self.eligible_amount + self.adjustments - self.reserve_amount
    }

    /// Amount still distributable, never negative, rounded to the cent.
    #[must_use]
    pub fn net_distributable(&self) -> Decimal {
        round_cents(floor_zero(self.cumulative_total() - self.total_draws))
    }
}

/// One day of a settlement distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyDistribution {
    /// Day the amount unlocks.
    pub date: NaiveDate,
    /// Amount unlocking that day.
    pub daily_unlock: Decimal,
    /// Total unlocked up to and including that day.
    pub cumulative_available: Decimal,
    /// Number of days accumulated so far, this one included.
    pub days_accumulated: u32,
    /// Whether this is the bucket's payout day.
    pub is_settlement_day: bool,
}

/// How a bucket's funds are spread across days.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "weights", rename_all = "kebab-case")]
pub enum DistributionMode {
    /// Evenly from today through the settlement date.
    #[default]
    Even,
    /// Evenly across the settlement period, net of draws.
    Cumulative,
    /// Across the settlement period, proportional to daily sales volume.
    VolumeWeighted(VolumeWeights),
}

/// A historical transaction-day total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalVolume {
    /// Day of the sales.
    #[serde(deserialize_with = "calendar_date::deserialize")]
    pub date: NaiveDate,
    /// Net amount sold that day.
    pub net_amount: Decimal,
}
