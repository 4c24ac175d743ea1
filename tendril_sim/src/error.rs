//! Error types for the simulation harness.

use tendril_core::AnimError;
use tendril_env::EnvError;
use thiserror::Error;

/// Errors raised while building or exporting a simulation run.
#[derive(Debug, Error)]
pub enum SimError {
    /// A behavior rejected its configuration or a frame
    #[error("Animation error: {0}")]
    Anim(#[from] AnimError),

    /// The host side (clock, sink) failed
    #[error("Environment error: {0}")]
    Env(#[from] EnvError),

    /// Scenario setup is inconsistent
    #[error("Invalid scenario: {0}")]
    InvalidScenario(String),

    /// Export could not be written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Export could not be serialized
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
