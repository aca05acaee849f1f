//! ONNX Regressor using tract

use crate::model::Regressor;
use crate::InferenceError;
use feature_engine::{FeatureVector, FEATURE_DIMENSION};
use std::fmt;
use std::path::{Path, PathBuf};
use tract_onnx::prelude::*;
use tracing::{debug, info};

/// Regressor exported to ONNX with a `[1, 10]` float input and one output
pub struct OnnxRegressor {
    /// Model path
    model_path: PathBuf,
    /// Optimized execution plan
    plan: TypedRunnableModel<TypedModel>,
}

impl OnnxRegressor {
    /// Load and optimize the ONNX model
    pub fn load(path: &Path) -> Result<Self, InferenceError> {
        info!("Loading ONNX model from {}", path.display());

        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|model| model.with_input_fact(0, f32::fact([1, FEATURE_DIMENSION]).into()))
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|e| InferenceError::ModelLoadError(format!("{}: {e}", path.display())))?;

        info!("Model loaded successfully");
        Ok(Self {
            model_path: path.to_path_buf(),
            plan,
        })
    }

    /// Get model path
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }
}

impl fmt::Debug for OnnxRegressor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OnnxRegressor")
            .field("model_path", &self.model_path)
            .finish_non_exhaustive()
    }
}

impl Regressor for OnnxRegressor {
    fn predict(&self, features: &FeatureVector) -> Result<f64, InferenceError> {
        let failed = |e: TractError| InferenceError::InferenceFailed(e.to_string());

        let input = Tensor::from_shape(&[1, FEATURE_DIMENSION], &features.to_f32()).map_err(failed)?;
        let outputs = self.plan.run(tvec!(input.into())).map_err(failed)?;

        let output = outputs
            .first()
            .ok_or_else(|| InferenceError::InferenceFailed("model produced no outputs".to_string()))?;
        let output = output.cast_to::<f64>().map_err(failed)?;
        let view = output.to_array_view::<f64>().map_err(failed)?;

        if view.len() != 1 {
            return Err(InferenceError::InvalidInputShape {
                expected: "1 output value".to_string(),
                actual: format!("{:?}", view.shape()),
            });
        }
        let value = view.iter().next().copied().unwrap_or(f64::NAN);
        debug!("ONNX prediction: {}", value);
        Ok(value)
    }

    fn kind(&self) -> &'static str {
        "onnx"
    }
}
