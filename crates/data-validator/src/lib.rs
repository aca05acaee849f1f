//! Data Validation and Normalization
//!
//! Provides domain checks for the numeric patient inputs and the fitted
//! scaler applied to the (Age, Length of Stay) column pair.

mod error;
mod normalizer;
mod validator;

pub use error::{ScalerError, ValidationError};
pub use normalizer::{NormalizationMethod, Normalizer, NUMERIC_COLUMNS};
pub use validator::{ValidationConfig, Validator};
