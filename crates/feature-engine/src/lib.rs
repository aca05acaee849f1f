//! Feature Engineering Engine
//!
//! Turns a submitted patient record into the exact 10-column vector the
//! cost model was trained on: categorical labels are encoded through the
//! fitted label encoders and the numeric pair is scaled.

mod encoder;
mod error;
mod features;
mod field;
mod record;

pub use encoder::{EncoderRegistry, LabelEncoder};
pub use error::{EncoderError, FeatureError};
pub use features::{EncodedFeatures, FeatureBuilder, FeatureVector, FEATURE_DIMENSION};
pub use field::{CategoricalField, FeatureColumn};
pub use record::PatientRecord;

#[cfg(test)]
mod test_support;
