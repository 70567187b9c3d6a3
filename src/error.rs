//! Error types for the valuation pipeline

use thiserror::Error;

/// Structural failures that stop a valuation before it produces numbers
#[derive(Error, Debug)]
pub enum ValuationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Field {field} is not a number")]
    InvalidField { field: &'static str },

    #[error("Non-finite {quantity}: {value}")]
    NonFinite { quantity: &'static str, value: f64 },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for valuation operations
pub type Result<T> = std::result::Result<T, ValuationError>;
