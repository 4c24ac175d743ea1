//! Error types for the tendril host abstraction.

use thiserror::Error;

/// Errors that can occur at the boundary between a behavior and its host.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EnvError {
    /// A line sink received a different number of vertices than it was sized for
    #[error("Line sink expected {expected} positions, got {actual}")]
    CountMismatch { expected: usize, actual: usize },

    /// The line sink was never sized with `set_count`
    #[error("Line sink has no vertex count set")]
    CountNotSet,

    /// Clock operation failed
    #[error("Clock error: {0}")]
    ClockError(String),
}

impl EnvError {
    /// Creates a count mismatch error.
    pub fn count_mismatch(expected: usize, actual: usize) -> Self {
        Self::CountMismatch { expected, actual }
    }

    /// Creates a clock error.
    pub fn clock(msg: impl Into<String>) -> Self {
        Self::ClockError(msg.into())
    }
}
