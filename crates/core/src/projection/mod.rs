//! Daily balance projection with per-card credit tracking.

pub mod engine;
pub mod error;
pub mod types;


pub use engine::{ProjectionEngine, calculate_calendar_balances, calculate_chart_balances};
pub use error::ProjectionError;
pub use types::{
    CardCreditMap, CreditCard, DailyBalance, ProjectionOptions, ProjectionResult, TodayPolicy,
};
