//! Buying-opportunity detection.
//!
//! Two views of the same question: when will enough cash be free to spend?
//! One accumulates forecasted payouts onto today's spendable cash, the other
//! reads dips and recoveries straight off a balance projection.

pub mod finder;
pub mod types;

#[cfg(test)]
mod tests;

pub use finder::{OpportunityFinder, available_to_spend};
pub use types::{BuyingOpportunity, OpportunityConfig, OpportunityWindow, PayoutForecast};
