//! End-to-end forecast run.

use cashcast_shared::AppConfig;
use chrono::{Days, NaiveDate};
use rayon::prelude::*;
use tracing::{info, instrument};

use super::types::{ForecastInput, ForecastReport, SettlementDistribution};
use crate::event::CashFlowEvent;
use crate::opportunity::{OpportunityConfig, OpportunityFinder};
use crate::projection::{ProjectionEngine, ProjectionError, ProjectionOptions, TodayPolicy};
use crate::recurrence::RecurrenceExpander;
use crate::settlement::SettlementDistributor;

const DEFAULT_SETTLEMENT_LABEL: &str = "Settlement payout";

/// Runs expansion, projection and opportunity detection over a snapshot.
#[derive(Debug, Clone)]
pub struct ForecastPipeline {
    days_to_project: u32,
    today: TodayPolicy,
    track_credit_cards: bool,
    finder: OpportunityFinder,
}

impl Default for ForecastPipeline {
    fn default() -> Self {
        Self::new(OpportunityConfig::default())
    }
}

impl ForecastPipeline {
    /// Creates a pipeline with a 90-day horizon and card tracking.
    #[must_use]
    pub const fn new(opportunity: OpportunityConfig) -> Self {
        Self {
            days_to_project: ProjectionOptions::DEFAULT_DAYS,
            today: TodayPolicy::Include,
            track_credit_cards: true,
            finder: OpportunityFinder::new(opportunity),
        }
    }

    /// Creates a pipeline from application settings.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        let today = if config.projection.exclude_today {
            TodayPolicy::Exclude
        } else {
            TodayPolicy::Include
        };
        Self::new(OpportunityConfig::from(&config.opportunity))
            .with_days(config.projection.days_to_project)
            .with_today(today)
            .with_card_tracking(config.projection.track_credit_cards)
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

    /// Runs the forecast.
    ///
    /// `today` is used unless the snapshot pins its own reference date.
    /// Recurring definitions and settlement buckets are expanded in parallel;
    /// the merged events are sorted stably by effective date before the
    /// sequential projection.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError`] if the configured horizon is invalid.
    #[instrument(skip_all, fields(days = self.days_to_project))]
    pub fn run(
        &self,
        input: &ForecastInput,
        today: NaiveDate,
    ) -> Result<ForecastReport, ProjectionError> {
        let reference_date = input.reference_date.unwrap_or(today);
        let options = ProjectionOptions::new(reference_date)
            .with_days(self.days_to_project)
            .with_today(self.today)
            .with_card_tracking(self.track_credit_cards);
        options.validate()?;

        let horizon_end = reference_date
            .checked_add_days(Days::new(u64::from(self.days_to_project - 1)))
            .unwrap_or(NaiveDate::MAX);

        let recurring_events: Vec<CashFlowEvent> = input
            .recurring
            .par_iter()
            .flat_map_iter(|transaction| {
                RecurrenceExpander::to_events(transaction, reference_date, horizon_end)
            })
            .collect();

        let distributions: Vec<(SettlementDistribution, Vec<CashFlowEvent>)> = input
            .settlements
            .par_iter()
            .map(|source| {
                let days = SettlementDistributor::distribute(
                    &source.bucket,
                    &source.distribution,
                    reference_date,
                );
                let label = source.label.as_deref().unwrap_or(DEFAULT_SETTLEMENT_LABEL);
                let events = SettlementDistributor::to_events_from(&days, label, reference_date);
                let distribution = SettlementDistribution {
                    settlement_id: source.bucket.id,
                    days,
                };
                (distribution, events)
            })
            .collect();

        let mut events = input.events.clone();
        events.extend(recurring_events);
        let mut settlement_distributions = Vec::with_capacity(distributions.len());
        for (distribution, settlement_events) in distributions {
            events.extend(settlement_events);
            settlement_distributions.push(distribution);
        }
        events.sort_by_key(CashFlowEvent::effective_date);

        let projection =
            ProjectionEngine::run(input.starting_balance, &events, &input.credit_cards, &options)?;

        let opportunities = self.finder.from_payout_forecasts(
            input.starting_balance,
            input.upcoming_expenses,
            &input.payouts,
        );
        let windows = self.finder.from_daily_balances(&projection.daily_balances);
        let days_below_reserve = projection.days_below(self.finder.config().reserve_amount);

        info!(
            %reference_date,
            events = events.len(),
            minimum_balance = %projection.minimum_balance,
            minimum_date = %projection.minimum_date,
            overflows = projection.overflow_events.len(),
            opportunities = opportunities.len(),
            "Forecast complete"
        );

        Ok(ForecastReport {
            reference_date,
            projection,
            distributions: settlement_distributions,
            opportunities,
            windows,
            days_below_reserve,
        })
    }
}
