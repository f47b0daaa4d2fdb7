//! Error types for the qpaudio-core crate.

use thiserror::Error;

/// Shared `Result` alias for the crate.
pub type Result<T> = std::result::Result<T, EraserError>;

/// Top-level error type for the demo engine.
#[derive(Debug, Error)]
pub enum EraserError {
    /// A caller broke a generator precondition (unknown speaker, degenerate
    /// misclassification target, empty selection pool, duplicate catalog ids).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A session-context call arrived out of order.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EraserError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

impl From<toml::ser::Error> for EraserError {
    fn from(value: toml::ser::Error) -> Self {
        Self::Config(value.to_string())
    }
}

impl From<Box<figment::Error>> for EraserError {
    fn from(value: Box<figment::Error>) -> Self {
        Self::Config(value.to_string())
    }
}
