//! Error types for the revenue insight engine

use thiserror::Error;

/// Result type alias for revenue engine operations
pub type Result<T> = std::result::Result<T, RevenueError>;

/// Main error type for the revenue engine
#[derive(Error, Debug)]
pub enum RevenueError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Computation error: {0}")]
    ComputationError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Unknown feature: {0}")]
    UnknownFeature(String),

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Insufficient data: need at least {required} observations, got {got}")]
    InsufficientData { required: usize, got: usize },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl RevenueError {
    pub(crate) fn invalid_parameter(
        name: &str,
        value: impl std::fmt::Display,
        reason: &str,
    ) -> Self {
        RevenueError::InvalidParameter {
            name: name.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<serde_json::Error> for RevenueError {
    fn from(err: serde_json::Error) -> Self {
        RevenueError::SerializationError(err.to_string())
    }
}

impl From<csv::Error> for RevenueError {
    fn from(err: csv::Error) -> Self {
        RevenueError::SerializationError(err.to_string())
    }
}

impl From<statrs::StatsError> for RevenueError {
    fn from(err: statrs::StatsError) -> Self {
        RevenueError::ComputationError(err.to_string())
    }
}
