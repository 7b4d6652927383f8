//! Projection error types.

use thiserror::Error;

/// Projection-related errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectionError {
    /// Horizon is empty or unreasonably long.
    #[error("Days to project must be between 1 and {max}, got {days}")]
    InvalidDays {
        /// Requested horizon.
        days: u32,
        /// Largest accepted horizon.
        max: u32,
    },
}
