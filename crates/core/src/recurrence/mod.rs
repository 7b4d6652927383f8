//! Expansion of recurring transactions into concrete calendar occurrences.

pub mod expander;
pub mod types;


pub use expander::{LOOKAHEAD_MONTHS, MAX_ITERATIONS, RecurrenceExpander};
pub use types::{Frequency, RecurrenceException, RecurringTransaction, TransactionKind};
