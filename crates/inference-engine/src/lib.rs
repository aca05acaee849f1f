//! Cost Inference Engine
//!
//! Loads the fitted artifacts once and runs the estimate pipeline:
//! encode, scale, predict, format.

mod artifacts;
mod currency;
mod engine;
mod model;
mod onnx;

pub use artifacts::{ArtifactError, ArtifactPaths, EstimatorContext};
pub use currency::format_currency;
pub use engine::{CostEstimate, CostEstimator};
pub use model::{
    load_model, model_from_json_str, Aggregation, LinearRegressor, Regressor, TreeEnsembleRegressor,
};
pub use onnx::OnnxRegressor;

use data_validator::ValidationError;
use feature_engine::{CategoricalField, FeatureError};
use thiserror::Error;

/// Errors during inference
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Model load failed: {0}")]
    ModelLoadError(String),
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
    #[error("Invalid input shape: expected {expected}, got {actual}")]
    InvalidInputShape { expected: String, actual: String },
    #[error("Model returned a non-finite value: {0}")]
    NonFiniteOutput(f64),
}

/// Errors from a single estimate request
#[derive(Debug, Error)]
pub enum EstimateError {
    /// Label not registered for the field
    #[error("unknown label {label:?} for field {field}")]
    UnknownLabel {
        field: CategoricalField,
        label: String,
    },

    /// Age or length of stay outside its domain
    #[error(transparent)]
    OutOfRange(ValidationError),

    #[error("prediction failed: {0}")]
    Prediction(#[from] InferenceError),
}

impl From<FeatureError> for EstimateError {
    fn from(err: FeatureError) -> Self {
        match err {
            FeatureError::UnknownLabel { field, label } => EstimateError::UnknownLabel { field, label },
            FeatureError::Validation(e) => EstimateError::OutOfRange(e),
            FeatureError::Scaler(e) => {
                EstimateError::Prediction(InferenceError::InferenceFailed(e.to_string()))
            }
        }
    }
}
