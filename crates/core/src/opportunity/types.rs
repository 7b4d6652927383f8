//! Buying-opportunity data types.

use cashcast_shared::config::OpportunitySettings;
use cashcast_shared::types::PayoutForecastId;
use cashcast_shared::types::date::calendar_date;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A forecasted marketplace payout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutForecast {
    /// Forecast ID.
    #[serde(default)]
    pub id: PayoutForecastId,
    /// Expected payout date.
    #[serde(deserialize_with = "calendar_date::deserialize")]
    pub date: NaiveDate,
    /// Expected payout amount.
    pub amount: Decimal,
    /// Forecast confidence between 0 and 1, when the forecaster supplied one.
    #[serde(default)]
    pub confidence: Option<Decimal>,
    /// Source label.
    #[serde(default)]
    pub label: Option<String>,
}

/// A date from which discretionary spending is safe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyingOpportunity {
    /// Date the funds become available.
    pub date: NaiveDate,
    /// Cumulative amount available to spend.
    pub available_amount: Decimal,
    /// Confidence between 0 and 1.
    pub confidence: Decimal,
    /// Human-readable explanation.
    pub reasoning: String,
}

/// A recovery after a dip in the projected balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpportunityWindow {
    /// Bottom of the dip.
    pub low_point_date: NaiveDate,
    /// Balance at the bottom of the dip.
    pub low_point_balance: Decimal,
    /// Highest day of the recovery.
    pub peak_date: NaiveDate,
    /// Balance on the peak day.
    pub peak_balance: Decimal,
    /// First day after the dip that clears the reserve, if before the peak.
    pub earliest_safe_date: Option<NaiveDate>,
    /// Peak balance above the reserve.
    pub opportunity_amount: Decimal,
    /// Confidence between 0 and 1.
    pub confidence: Decimal,
    /// Human-readable explanation.
    pub reasoning: String,
}

/// Thresholds for opportunity detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpportunityConfig {
    /// Cash always kept on hand.
    pub reserve_amount: Decimal,
    /// Amounts at or below this are not worth surfacing.
    pub materiality_floor: Decimal,
    /// Maximum number of results.
    pub max_results: usize,
    /// Confidence used when a forecast carries none.
    pub default_confidence: Decimal,
}

impl OpportunityConfig {
    /// Default materiality floor.
    pub const MATERIALITY_FLOOR: Decimal = Decimal::ONE_THOUSAND;

    /// Default result cap.
    pub const MAX_RESULTS: usize = 3;

    /// Default forecast confidence (0.7).
    pub const DEFAULT_CONFIDENCE: Decimal = Decimal::from_parts(7, 0, 0, false, 1);

    /// Default thresholds with the given reserve.
    #[must_use]
    pub fn with_reserve(reserve_amount: Decimal) -> Self {
        Self {
            reserve_amount,
            ..Self::default()
        }
    }
}

impl Default for OpportunityConfig {
    fn default() -> Self {
        Self {
            reserve_amount: Decimal::ZERO,
            materiality_floor: Self::MATERIALITY_FLOOR,
            max_results: Self::MAX_RESULTS,
            default_confidence: Self::DEFAULT_CONFIDENCE,
        }
    }
}

impl From<&OpportunitySettings> for OpportunityConfig {
    fn from(settings: &OpportunitySettings) -> Self {
        Self {
            reserve_amount: settings.reserve_amount,
            materiality_floor: settings.materiality_floor,
            max_results: settings.max_results,
            default_confidence: settings.default_confidence,
        }
    }
}
