//! Cash-flow projection engine for Cashcast.
//!
//! This crate contains pure computation with ZERO I/O: no clock, no files,
//! no network. Every entry point takes an explicit reference date.
//!
//! # Modules
//!
//! - `event` - Dated cash-flow events
//! - `recurrence` - Recurring transaction expansion
//! - `settlement` - Settlement fund distribution
//! - `projection` - Daily balance simulation with credit-card tracking
//! - `opportunity` - Buying-opportunity detection
//! - `forecast` - End-to-end pipeline over an input snapshot

pub mod event;
pub mod forecast;
pub mod opportunity;
pub mod projection;
pub mod recurrence;
pub mod settlement;

pub use event::{CashFlowEvent, EventType};
pub use forecast::{ForecastInput, ForecastPipeline, ForecastReport};
