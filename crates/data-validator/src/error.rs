//! Validation Error Types

use thiserror::Error;

/// Errors during data validation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Value out of allowed range
    #[error("{field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// NaN or infinite input
    #[error("{field} value is not a finite number")]
    NonFinite { field: &'static str },
}

/// Errors while building a scaler from its fitted parameters
#[derive(Debug, Error)]
pub enum ScalerError {
    #[error("failed to parse scaler parameters: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{name} has {actual} entries, expected {expected}")]
    ColumnCount {
        name: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("scaler parameter {name} contains a non-finite value")]
    NonFinite { name: &'static str },

    #[error("feature_range ({min}, {max}) is empty")]
    EmptyFeatureRange { min: f64, max: f64 },

    #[error("matrix has {actual} columns, expected {expected}")]
    Shape { expected: usize, actual: usize },
}
