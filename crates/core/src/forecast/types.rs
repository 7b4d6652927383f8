//! Forecast input snapshot and report.

use cashcast_shared::types::SettlementId;
use cashcast_shared::types::date::calendar_date;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::event::CashFlowEvent;
use crate::opportunity::{BuyingOpportunity, OpportunityWindow, PayoutForecast};
use crate::projection::{CreditCard, ProjectionResult};
use crate::recurrence::RecurringTransaction;
use crate::settlement::{DailyDistribution, DistributionMode, SettlementBucket};

/// A settlement bucket and how to spread it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementSource {
    /// The bucket.
    pub bucket: SettlementBucket,
    /// Distribution mode; even when absent.
    #[serde(default)]
    pub distribution: DistributionMode,
    /// Label for the generated inflow events.
    #[serde(default)]
    pub label: Option<String>,
}

/// Everything known about the business's cash on one day.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForecastInput {
    /// Cash on hand.
    pub starting_balance: Decimal,
    /// One-off dated events.
    #[serde(default)]
    pub events: Vec<CashFlowEvent>,
    /// Recurring definitions, expanded over the horizon.
    #[serde(default)]
    pub recurring: Vec<RecurringTransaction>,
    /// Cards to track.
    #[serde(default)]
    pub credit_cards: Vec<CreditCard>,
    /// Settlement buckets, distributed into inflows.
    #[serde(default)]
    pub settlements: Vec<SettlementSource>,
    /// Forecasted payouts for the buying-opportunity list.
    #[serde(default)]
    pub payouts: Vec<PayoutForecast>,
    /// Committed outflows due soon.
    #[serde(default)]
    pub upcoming_expenses: Decimal,
    /// Overrides "today".
    #[serde(default, deserialize_with = "calendar_date::option::deserialize")]
    pub reference_date: Option<NaiveDate>,
}

/// The distribution computed for one settlement bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementDistribution {
    /// Bucket the distribution belongs to.
    pub settlement_id: SettlementId,
    /// Daily unlocks.
    pub days: Vec<DailyDistribution>,
}

/// Output of a forecast run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastReport {
    /// First projected day.
    pub reference_date: NaiveDate,
    /// Day-by-day projection.
    pub projection: ProjectionResult,
    /// Per-bucket settlement distributions.
    pub distributions: Vec<SettlementDistribution>,
    /// Payout-driven buying opportunities.
    pub opportunities: Vec<BuyingOpportunity>,
    /// Dip-and-recovery windows from the projection.
    pub windows: Vec<OpportunityWindow>,
    /// Days ending below the reserve.
    pub days_below_reserve: usize,
}
