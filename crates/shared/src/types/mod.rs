//! Common types used across the application.

pub mod date;
pub mod id;
pub mod money;

pub use date::{DateParseError, parse_calendar_date};
pub use id::*;
