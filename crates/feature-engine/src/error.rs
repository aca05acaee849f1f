//! Feature Error Types

use crate::field::CategoricalField;
use data_validator::{ScalerError, ValidationError};
use thiserror::Error;

/// Errors while turning a patient record into a feature vector
#[derive(Debug, Error)]
pub enum FeatureError {
    /// Label not registered for the field at training time
    #[error("unknown label {label:?} for field {field}")]
    UnknownLabel {
        field: CategoricalField,
        label: String,
    },

    /// Numeric input outside its domain
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Scaler(#[from] ScalerError),
}

/// Errors while building label encoders from their artifact
#[derive(Debug, Error)]
pub enum EncoderError {
    #[error("failed to parse label encoders: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unknown categorical field {0:?}")]
    UnknownField(String),

    #[error("no label encoder for field {0}")]
    MissingField(CategoricalField),

    #[error("label encoder for {0} has no labels")]
    NoLabels(CategoricalField),

    #[error("label encoder for {0} contains an empty label")]
    EmptyLabel(CategoricalField),

    #[error("label {label:?} appears twice for field {field}")]
    DuplicateLabel {
        field: CategoricalField,
        label: String,
    },
}
