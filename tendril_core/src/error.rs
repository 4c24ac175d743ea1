//! Error types for the animation behaviors.

use tendril_env::EnvError;
use thiserror::Error;

/// Errors raised by segment chains, facing rotators and their configuration.
#[derive(Debug, Error)]
pub enum AnimError {
    /// A configuration value would produce NaN/Infinity or break an ordering
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// `advance` was called before `allocate`
    #[error("Segment chain used before allocation")]
    NotAllocated,

    /// `allocate` was called a second time
    #[error("Segment chain already allocated")]
    AlreadyAllocated,

    /// Configuration could not be read or parsed
    #[error("Config error: {0}")]
    Config(String),

    /// The host rejected a call
    #[error("Host error: {0}")]
    Env(#[from] EnvError),
}

impl AnimError {
    /// Creates an invalid configuration error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Creates a config load/parse error.
    pub fn config(msg: impl std::fmt::Display) -> Self {
        Self::Config(msg.to_string())
    }
}
