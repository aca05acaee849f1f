//! Regression Models
//!
//! The cost model is opaque to the rest of the pipeline: it maps one
//! feature vector to one amount. JSON artifacts describe linear and
//! tree-ensemble regressors; `.onnx` files go through tract.

use crate::onnx::OnnxRegressor;
use crate::InferenceError;
use feature_engine::{FeatureVector, FEATURE_DIMENSION};
use serde::Deserialize;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

/// A fitted regressor
pub trait Regressor: fmt::Debug + Send + Sync {
    /// Predict the cost for one feature vector
    fn predict(&self, features: &FeatureVector) -> Result<f64, InferenceError>;

    /// Short model family name for logs and health output
    fn kind(&self) -> &'static str;
}

/// Ordinary linear model: `intercept + sum(coefficient * feature)`
#[derive(Debug, Clone, PartialEq)]
pub struct LinearRegressor {
    coefficients: [f64; FEATURE_DIMENSION],
    intercept: f64,
}

impl LinearRegressor {
    pub fn new(coefficients: &[f64], intercept: f64) -> Result<Self, InferenceError> {
        let coefficients: [f64; FEATURE_DIMENSION] =
            coefficients
                .try_into()
                .map_err(|_| InferenceError::InvalidInputShape {
                    expected: format!("{FEATURE_DIMENSION} coefficients"),
                    actual: format!("{} coefficients", coefficients.len()),
                })?;
        if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
            return Err(InferenceError::ModelLoadError(
                "linear model has non-finite parameters".to_string(),
            ));
        }
        Ok(Self {
            coefficients,
            intercept,
        })
    }
}

impl Regressor for LinearRegressor {
    fn predict(&self, features: &FeatureVector) -> Result<f64, InferenceError> {
        let sum = self
            .coefficients
            .iter()
            .zip(features.values())
            .fold(self.intercept, |acc, (c, x)| acc + c * x);
        Ok(sum)
    }

    fn kind(&self) -> &'static str {
        "linear"
    }
}

/// How tree outputs are combined
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    /// Random forest style average
    #[default]
    Mean,
    /// Boosting style sum
    Sum,
}

/// Node of a fitted decision tree
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
enum TreeNode {
    /// Go `left` when `features[feature] <= threshold`, else `right`
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct Tree {
    nodes: Vec<TreeNode>,
}

impl Tree {
    /// Children always point forward, so the walk terminates
    fn validate(&self, index: usize) -> Result<(), InferenceError> {
        let invalid = |reason: String| {
            InferenceError::ModelLoadError(format!("tree {index}: {reason}"))
        };

        if self.nodes.is_empty() {
            return Err(invalid("no nodes".to_string()));
        }
        for (i, node) in self.nodes.iter().enumerate() {
            match *node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if feature >= FEATURE_DIMENSION {
                        return Err(invalid(format!("node {i} splits on feature {feature}")));
                    }
                    if !threshold.is_finite() {
                        return Err(invalid(format!("node {i} has a non-finite threshold")));
                    }
                    for child in [left, right] {
                        if child <= i || child >= self.nodes.len() {
                            return Err(invalid(format!("node {i} has invalid child {child}")));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if !value.is_finite() {
                        return Err(invalid(format!("node {i} has a non-finite value")));
                    }
                }
            }
        }
        Ok(())
    }

    fn predict(&self, values: &[f64; FEATURE_DIMENSION]) -> f64 {
        let mut index = 0;
        loop {
            match self.nodes[index] {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if values[feature] <= threshold { left } else { right };
                }
                TreeNode::Leaf { value } => return value,
            }
        }
    }
}

/// Ensemble of decision trees:
/// `base_score + learning_rate * aggregate(tree outputs)`
#[derive(Debug, Clone, PartialEq)]
pub struct TreeEnsembleRegressor {
    trees: Vec<Tree>,
    aggregation: Aggregation,
    base_score: f64,
    learning_rate: f64,
}

impl TreeEnsembleRegressor {
    fn new(
        trees: Vec<Tree>,
        aggregation: Aggregation,
        base_score: f64,
        learning_rate: f64,
    ) -> Result<Self, InferenceError> {
        if trees.is_empty() {
            return Err(InferenceError::ModelLoadError(
                "tree ensemble has no trees".to_string(),
            ));
        }
        if !base_score.is_finite() || !learning_rate.is_finite() {
            return Err(InferenceError::ModelLoadError(
                "tree ensemble has non-finite parameters".to_string(),
            ));
        }
        for (i, tree) in trees.iter().enumerate() {
            tree.validate(i)?;
        }
        Ok(Self {
            trees,
            aggregation,
            base_score,
            learning_rate,
        })
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }
}

impl Regressor for TreeEnsembleRegressor {
    fn predict(&self, features: &FeatureVector) -> Result<f64, InferenceError> {
        let values = features.values();
        let total: f64 = self.trees.iter().map(|tree| tree.predict(values)).sum();
        let combined = match self.aggregation {
            Aggregation::Mean => total / self.trees.len() as f64,
            Aggregation::Sum => total,
        };
        Ok(self.base_score + self.learning_rate * combined)
    }

    fn kind(&self) -> &'static str {
        "tree_ensemble"
    }
}

fn default_learning_rate() -> f64 {
    1.0
}

/// Serialized model artifact, tagged by `kind`
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum ModelArtifact {
    Linear {
        coefficients: Vec<f64>,
        intercept: f64,
    },
    TreeEnsemble {
        trees: Vec<Tree>,
        #[serde(default)]
        aggregation: Aggregation,
        #[serde(default)]
        base_score: f64,
        #[serde(default = "default_learning_rate")]
        learning_rate: f64,
    },
}

impl ModelArtifact {
    fn into_regressor(self) -> Result<Box<dyn Regressor>, InferenceError> {
        Ok(match self {
            ModelArtifact::Linear {
                coefficients,
                intercept,
            } => Box::new(LinearRegressor::new(&coefficients, intercept)?),
            ModelArtifact::TreeEnsemble {
                trees,
                aggregation,
                base_score,
                learning_rate,
            } => Box::new(TreeEnsembleRegressor::new(
                trees,
                aggregation,
                base_score,
                learning_rate,
            )?),
        })
    }
}

/// Parse a JSON model artifact
pub fn model_from_json_str(json: &str) -> Result<Box<dyn Regressor>, InferenceError> {
    let artifact: ModelArtifact =
        serde_json::from_str(json).map_err(|e| InferenceError::ModelLoadError(e.to_string()))?;
    artifact.into_regressor()
}

/// Load a model artifact; `.onnx` files are run with tract, anything else
/// is read as a JSON model description
pub fn load_model(path: &Path) -> Result<Box<dyn Regressor>, InferenceError> {
    let is_onnx = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("onnx"));
    if is_onnx {
        return Ok(Box::new(OnnxRegressor::load(path)?));
    }

    let file = File::open(path).map_err(|e| {
        InferenceError::ModelLoadError(format!("{}: {e}", path.display()))
    })?;
    let artifact: ModelArtifact = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| InferenceError::ModelLoadError(format!("{}: {e}", path.display())))?;
    let model = artifact.into_regressor()?;
    info!("Loaded {} model from {}", model.kind(), path.display());
    Ok(model)
}
