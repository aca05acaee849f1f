//! Startup Artifact Loading

use crate::model::{load_model, Regressor};
use crate::InferenceError;
use data_validator::{Normalizer, ScalerError, ValidationConfig};
use feature_engine::{EncoderError, EncoderRegistry};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Errors loading the fitted artifacts. Fatal: nothing can be served.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to open {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid label encoders in {}: {source}", path.display())]
    Encoders { path: PathBuf, source: EncoderError },

    #[error("invalid scaler in {}: {source}", path.display())]
    Scaler { path: PathBuf, source: ScalerError },

    #[error("invalid model in {}: {source}", path.display())]
    Model {
        path: PathBuf,
        source: InferenceError,
    },
}

/// Locations of the three fitted artifacts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactPaths {
    /// Label encoder JSON
    pub encoders: PathBuf,
    /// Scaler JSON
    pub scaler: PathBuf,
    /// Model JSON or ONNX
    pub model: PathBuf,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self {
            encoders: PathBuf::from("artifacts/label_encoders.json"),
            scaler: PathBuf::from("artifacts/scaler.json"),
            model: PathBuf::from("artifacts/model.json"),
        }
    }
}

impl ArtifactPaths {
    /// Resolve all three paths relative to `dir`
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            encoders: dir.join("label_encoders.json"),
            scaler: dir.join("scaler.json"),
            model: dir.join("model.json"),
        }
    }

    /// Load every artifact into an immutable estimator context
    pub fn load(&self, validation: ValidationConfig) -> Result<EstimatorContext, ArtifactError> {
        info!(
            encoders = %self.encoders.display(),
            scaler = %self.scaler.display(),
            model = %self.model.display(),
            "Loading artifacts"
        );

        let encoders = EncoderRegistry::from_reader(open(&self.encoders)?).map_err(|source| {
            ArtifactError::Encoders {
                path: self.encoders.clone(),
                source,
            }
        })?;

        let scaler = Normalizer::from_reader(open(&self.scaler)?).map_err(|source| {
            ArtifactError::Scaler {
                path: self.scaler.clone(),
                source,
            }
        })?;

        let model = load_model(&self.model).map_err(|source| ArtifactError::Model {
            path: self.model.clone(),
            source,
        })?;

        Ok(EstimatorContext {
            encoders,
            scaler,
            validation,
            model,
        })
    }
}

fn open(path: &Path) -> Result<BufReader<File>, ArtifactError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// Everything the estimator needs, fixed at startup
#[derive(Debug)]
pub struct EstimatorContext {
    pub encoders: EncoderRegistry,
    pub scaler: Normalizer,
    pub validation: ValidationConfig,
    pub model: Box<dyn Regressor>,
}
