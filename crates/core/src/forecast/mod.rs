//! Forecast pipeline tying expansion, projection and opportunity detection
//! together over a single input snapshot.

pub mod pipeline;
pub mod types;

pub use pipeline::ForecastPipeline;
pub use types::{ForecastInput, ForecastReport, SettlementDistribution, SettlementSource};
