//! Application configuration management.

use chrono::NaiveDate;
use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Projection configuration.
    #[serde(default)]
    pub projection: ProjectionSettings,
    /// Buying-opportunity configuration.
    #[serde(default)]
    pub opportunity: OpportunitySettings,
    /// Input configuration.
    #[serde(default)]
    pub input: InputSettings,
}

/// Projection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectionSettings {
    /// Number of days to project, today included.
    #[serde(default = "default_days_to_project")]
    pub days_to_project: u32,
    /// Leave today's not-yet-settled activity out of the projection.
    #[serde(default)]
    pub exclude_today: bool,
    /// Track per-card available credit and credit overflow.
    #[serde(default = "default_true")]
    pub track_credit_cards: bool,
    /// IANA time zone used to decide what "today" is.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Fixed reference date, mostly for reproducible runs.
    #[serde(default)]
    pub reference_date: Option<NaiveDate>,
}

fn default_days_to_project() -> u32 {
    90
}

fn default_true() -> bool {
    true
}

fn default_timezone() -> String {
    "UTC".to_string()
}

impl Default for ProjectionSettings {
    fn default() -> Self {
        Self {
            days_to_project: default_days_to_project(),
            exclude_today: false,
            track_credit_cards: true,
            timezone: default_timezone(),
            reference_date: None,
        }
    }
}

impl ProjectionSettings {
    /// Parses the configured time zone.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] for a name missing from the tz database.
    pub fn tz(&self) -> AppResult<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| AppError::Config(format!("Unknown time zone: {}", self.timezone)))
    }
}

/// Buying-opportunity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct OpportunitySettings {
    /// Cash the business always keeps on hand.
    #[serde(default)]
    pub reserve_amount: Decimal,
    /// Smallest amount worth surfacing as an opportunity.
    #[serde(default = "default_materiality_floor")]
    pub materiality_floor: Decimal,
    /// Maximum number of opportunities reported.
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    /// Confidence used when a forecast carries none.
    #[serde(default = "default_confidence")]
    pub default_confidence: Decimal,
}

fn default_materiality_floor() -> Decimal {
    Decimal::ONE_THOUSAND
}

fn default_max_results() -> usize {
    3
}

fn default_confidence() -> Decimal {
    Decimal::new(7, 1)
}

impl Default for OpportunitySettings {
    fn default() -> Self {
        Self {
            reserve_amount: Decimal::ZERO,
            materiality_floor: default_materiality_floor(),
            max_results: default_max_results(),
            default_confidence: default_confidence(),
        }
    }
}

/// Input configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InputSettings {
    /// Path of the JSON snapshot to project; stdin when unset.
    #[serde(default)]
    pub snapshot_path: Option<String>,
}

impl AppConfig {
    /// Loads configuration from config files and the environment.
    ///
    /// Sources, later ones winning: `config/default`, `config/{RUN_MODE}`,
    /// then `CASHCAST__SECTION__KEY` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> AppResult<Self> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("CASHCAST")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let loaded: Self = config.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Checks cross-field constraints serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] describing the first invalid setting.
    pub fn validate(&self) -> AppResult<()> {
        self.projection.tz()?;

        if self.opportunity.default_confidence < Decimal::ZERO
            || self.opportunity.default_confidence > Decimal::ONE
        {
            return Err(AppError::Config(
                "opportunity.default_confidence must be between 0 and 1".to_string(),
            ));
        }
        if self.opportunity.reserve_amount.is_sign_negative() {
            return Err(AppError::Config(
                "opportunity.reserve_amount cannot be negative".to_string(),
            ));
        }

        Ok(())
    }
}
