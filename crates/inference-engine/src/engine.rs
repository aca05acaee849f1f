//! Cost Estimator
//!
//! One synchronous pass per submission: validate and encode the record,
//! scale the numeric pair, run the model, format the amount.

use crate::artifacts::EstimatorContext;
use crate::currency::format_currency;
use crate::model::Regressor;
use crate::{EstimateError, InferenceError};
use data_validator::Validator;
use feature_engine::{FeatureBuilder, FeatureVector, PatientRecord};
use serde::Serialize;
use tracing::{debug, info};

/// Result of one estimate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostEstimate {
    /// Predicted cost in dollars
    pub amount: f64,
    /// `amount` for display, e.g. `$25,431.27`
    pub formatted: String,
    /// Model input the amount was predicted from
    pub features: FeatureVector,
}

/// Feature vector builder and cost predictor
#[derive(Debug)]
pub struct CostEstimator {
    builder: FeatureBuilder,
    model: Box<dyn Regressor>,
}

impl CostEstimator {
    /// Create an estimator from loaded artifacts
    pub fn new(context: EstimatorContext) -> Self {
        info!("Creating cost estimator with {} model", context.model.kind());
        let builder = FeatureBuilder::new(
            context.encoders,
            context.scaler,
            Validator::new(context.validation),
        );
        Self {
            builder,
            model: context.model,
        }
    }

    /// Estimate the cost for one record
    pub fn estimate(&self, record: &PatientRecord) -> Result<CostEstimate, EstimateError> {
        let features = self.builder.build(record)?;
        self.predict(features)
    }

    /// Estimate many records; the numeric columns are scaled as one matrix.
    /// Fails on the first invalid record.
    pub fn estimate_batch(&self, records: &[PatientRecord]) -> Result<Vec<CostEstimate>, EstimateError> {
        self.builder
            .build_batch(records)?
            .into_iter()
            .map(|features| self.predict(features))
            .collect()
    }

    fn predict(&self, features: FeatureVector) -> Result<CostEstimate, EstimateError> {
        let amount = self.model.predict(&features)?;
        if !amount.is_finite() {
            return Err(InferenceError::NonFiniteOutput(amount).into());
        }
        debug!(amount, "Estimate complete");
        Ok(CostEstimate {
            amount,
            formatted: format_currency(amount),
            features,
        })
    }

    /// Feature builder holding the fitted encoders and scaler
    pub fn builder(&self) -> &FeatureBuilder {
        &self.builder
    }

    /// Model family name
    pub fn model_kind(&self) -> &'static str {
        self.model.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::ArtifactPaths;
    use crate::model::{model_from_json_str, LinearRegressor};
    use data_validator::{Normalizer, ValidationConfig};
    use feature_engine::{CategoricalField, EncoderRegistry, FeatureColumn};
    use std::path::Path;

    fn sample_estimator() -> CostEstimator {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../artifacts");
        let context = ArtifactPaths::in_dir(&dir)
            .load(ValidationConfig::default())
            .unwrap();
        CostEstimator::new(context)
    }

    fn sample_record() -> PatientRecord {
        PatientRecord {
            hospital: "General".into(),
            age: 45.0,
            length_of_stay: 5.0,
            blood_type: "O+".into(),
            medical_condition: "Diabetes".into(),
            insurance_provider: "Aetna".into(),
            medication: "Metformin".into(),
            admission_type: "Emergency".into(),
            test_results: "Normal".into(),
            gender: "Male".into(),
        }
    }

    fn toy_estimator(model: Box<dyn Regressor>) -> CostEstimator {
        let encoders = EncoderRegistry::from_labels(CategoricalField::ALL.map(|field| {
            let labels = match field {
                CategoricalField::Gender => vec!["Female".to_string(), "Male".to_string()],
                _ => vec!["A".to_string(), "B".to_string()],
            };
            (field, labels)
        }))
        .unwrap();
        CostEstimator::new(EstimatorContext {
            encoders,
            scaler: Normalizer::identity(),
            validation: ValidationConfig::default(),
            model,
        })
    }

    /// Model whose output is the sum of its inputs, so the vector is observable
    fn summing_estimator() -> CostEstimator {
        let model = model_from_json_str(
            r#"{"kind":"linear","coefficients":[1,1,1,1,1,1,1,1,1,1],"intercept":0}"#,
        )
        .unwrap();
        toy_estimator(model)
    }

    #[test]
    fn test_example_estimate() {
        let estimator = sample_estimator();
        let estimate = estimator.estimate(&sample_record()).unwrap();

        let encoders = estimator.builder().encoders();
        let code = |field: CategoricalField, label: &str| f64::from(encoders.encode(field, label).unwrap());
        let [age, stay] = estimator.builder().scaler().transform([45.0, 5.0]);
        assert_eq!(
            estimate.features.values(),
            &[
                code(CategoricalField::Hospital, "General"),
                age,
                stay,
                code(CategoricalField::BloodType, "O+"),
                code(CategoricalField::MedicalCondition, "Diabetes"),
                code(CategoricalField::InsuranceProvider, "Aetna"),
                code(CategoricalField::Medication, "Metformin"),
                code(CategoricalField::AdmissionType, "Emergency"),
                code(CategoricalField::TestResults, "Normal"),
                code(CategoricalField::Gender, "Male"),
            ]
        );

        assert!(estimate.amount >= 0.0);
        assert_eq!(estimate.formatted, format_currency(estimate.amount));
        assert!(estimate.formatted.starts_with('$'));
        assert!(estimate.formatted.contains(','));
        assert_eq!(estimate.formatted.split('.').nth(1).map(str::len), Some(2));
    }

    #[test]
    fn test_estimate_is_deterministic() {
        let estimator = sample_estimator();
        let first = estimator.estimate(&sample_record()).unwrap();
        let second = estimator.estimate(&sample_record()).unwrap();
        assert_eq!(first.amount.to_bits(), second.amount.to_bits());
        assert_eq!(first, second);
    }

    #[test]
    fn test_unknown_label() {
        let estimator = sample_estimator();
        let record = PatientRecord {
            insurance_provider: "Acme Health".into(),
            ..sample_record()
        };
        assert!(matches!(
            estimator.estimate(&record),
            Err(EstimateError::UnknownLabel { field: CategoricalField::InsuranceProvider, .. })
        ));
    }

    #[test]
    fn test_out_of_range() {
        let estimator = sample_estimator();
        let record = PatientRecord {
            length_of_stay: -1.0,
            ..sample_record()
        };
        assert!(matches!(
            estimator.estimate(&record),
            Err(EstimateError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_vector_reaches_model_in_order() {
        let estimator = summing_estimator();
        let record = PatientRecord {
            hospital: "B".into(),
            age: 40.0,
            length_of_stay: 3.0,
            blood_type: "A".into(),
            medical_condition: "B".into(),
            insurance_provider: "A".into(),
            medication: "B".into(),
            admission_type: "A".into(),
            test_results: "B".into(),
            gender: "Male".into(),
        };
        let estimate = estimator.estimate(&record).unwrap();
        assert_eq!(estimate.features.get(FeatureColumn::Age), 40.0);
        assert_eq!(estimate.amount, 1.0 + 40.0 + 3.0 + 0.0 + 1.0 + 0.0 + 1.0 + 0.0 + 1.0 + 1.0);
        assert_eq!(estimate.formatted, "$48.00");
    }

    #[test]
    fn test_non_finite_output_rejected() {
        let mut coefficients = [0.0; 10];
        coefficients[FeatureColumn::Age.position()] = f64::MAX;
        let model = LinearRegressor::new(&coefficients, 0.0).unwrap();
        let estimator = toy_estimator(Box::new(model));
        let record = PatientRecord {
            hospital: "A".into(),
            age: 120.0,
            length_of_stay: 0.0,
            blood_type: "A".into(),
            medical_condition: "A".into(),
            insurance_provider: "A".into(),
            medication: "A".into(),
            admission_type: "A".into(),
            test_results: "A".into(),
            gender: "Female".into(),
        };
        assert!(matches!(
            estimator.estimate(&record),
            Err(EstimateError::Prediction(InferenceError::NonFiniteOutput(_)))
        ));
    }

    #[test]
    fn test_batch_estimates() {
        let estimator = sample_estimator();
        let records = vec![
            sample_record(),
            PatientRecord {
                age: 70.0,
                length_of_stay: 20.0,
                ..sample_record()
            },
        ];
        let estimates = estimator.estimate_batch(&records).unwrap();
        assert_eq!(estimates.len(), 2);
        assert_eq!(estimates[0], estimator.estimate(&records[0]).unwrap());
        assert_eq!(estimates[1], estimator.estimate(&records[1]).unwrap());
    }
}
