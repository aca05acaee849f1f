//! Feature Vector Assembly

use crate::encoder::EncoderRegistry;
use crate::error::FeatureError;
use crate::field::{CategoricalField, FeatureColumn};
use crate::record::PatientRecord;
use data_validator::{Normalizer, Validator, NUMERIC_COLUMNS};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Number of model input columns
pub const FEATURE_DIMENSION: usize = FeatureColumn::ORDER.len();

/// Model input in training column order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector {
    values: [f64; FEATURE_DIMENSION],
}

impl FeatureVector {
    /// Raw values in column order
    pub fn values(&self) -> &[f64; FEATURE_DIMENSION] {
        &self.values
    }

    /// Value of one column
    pub fn get(&self, column: FeatureColumn) -> f64 {
        self.values[column.position()]
    }

    /// Values narrowed to `f32`, for models with single precision inputs
    pub fn to_f32(&self) -> [f32; FEATURE_DIMENSION] {
        self.values.map(|v| v as f32)
    }

    fn numeric(&self) -> [f64; NUMERIC_COLUMNS] {
        [self.get(FeatureColumn::Age), self.get(FeatureColumn::LengthOfStay)]
    }

    /// Overwrite the Age and Length of Stay positions; nothing else changes
    fn set_numeric(&mut self, numeric: [f64; NUMERIC_COLUMNS]) {
        self.values[FeatureColumn::Age.position()] = numeric[0];
        self.values[FeatureColumn::LengthOfStay.position()] = numeric[1];
    }
}

/// Encoded record before scaling, one named field per model column
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EncodedFeatures {
    pub hospital: u32,
    pub age: f64,
    pub length_of_stay: f64,
    pub blood_type: u32,
    pub medical_condition: u32,
    pub insurance_provider: u32,
    pub medication: u32,
    pub admission_type: u32,
    pub test_results: u32,
    pub gender: u32,
}

impl EncodedFeatures {
    /// Code assigned to a categorical field
    pub fn code(&self, field: CategoricalField) -> u32 {
        match field {
            CategoricalField::Hospital => self.hospital,
            CategoricalField::BloodType => self.blood_type,
            CategoricalField::MedicalCondition => self.medical_condition,
            CategoricalField::InsuranceProvider => self.insurance_provider,
            CategoricalField::Medication => self.medication,
            CategoricalField::AdmissionType => self.admission_type,
            CategoricalField::TestResults => self.test_results,
            CategoricalField::Gender => self.gender,
        }
    }

    /// Value of one model column
    pub fn value(&self, column: FeatureColumn) -> f64 {
        match column {
            FeatureColumn::Categorical(field) => f64::from(self.code(field)),
            FeatureColumn::Age => self.age,
            FeatureColumn::LengthOfStay => self.length_of_stay,
        }
    }

    /// Lay the fields out in training column order, unscaled
    pub fn to_vector(&self) -> FeatureVector {
        FeatureVector {
            values: FeatureColumn::ORDER.map(|column| self.value(column)),
        }
    }
}

/// Builds model inputs from submitted records.
///
/// Holds the fitted encoders, the fitted scaler and the numeric domain
/// checks. All three are fixed at construction and only read afterwards,
/// so one builder can serve any number of concurrent requests.
#[derive(Debug, Clone)]
pub struct FeatureBuilder {
    encoders: EncoderRegistry,
    scaler: Normalizer,
    validator: Validator,
}

impl FeatureBuilder {
    /// Create a new feature builder
    pub fn new(encoders: EncoderRegistry, scaler: Normalizer, validator: Validator) -> Self {
        Self {
            encoders,
            scaler,
            validator,
        }
    }

    /// Validate the numeric inputs and encode every categorical label
    pub fn encode(&self, record: &PatientRecord) -> Result<EncodedFeatures, FeatureError> {
        self.validator.validate_age(record.age)?;
        self.validator.validate_length_of_stay(record.length_of_stay)?;

        let code = |field: CategoricalField| self.encoders.encode(field, record.label(field));
        Ok(EncodedFeatures {
            hospital: code(CategoricalField::Hospital)?,
            age: record.age,
            length_of_stay: record.length_of_stay,
            blood_type: code(CategoricalField::BloodType)?,
            medical_condition: code(CategoricalField::MedicalCondition)?,
            insurance_provider: code(CategoricalField::InsuranceProvider)?,
            medication: code(CategoricalField::Medication)?,
            admission_type: code(CategoricalField::AdmissionType)?,
            test_results: code(CategoricalField::TestResults)?,
            gender: code(CategoricalField::Gender)?,
        })
    }

    /// Lay out the encoded record and scale the Age and Length of Stay
    /// positions. The categorical codes are left unscaled.
    pub fn scale(&self, encoded: &EncodedFeatures) -> FeatureVector {
        let mut vector = encoded.to_vector();
        vector.set_numeric(self.scaler.transform(vector.numeric()));
        vector
    }

    /// Encode and scale one record
    pub fn build(&self, record: &PatientRecord) -> Result<FeatureVector, FeatureError> {
        let encoded = self.encode(record)?;
        let vector = self.scale(&encoded);
        debug!(?vector, "Built feature vector");
        Ok(vector)
    }

    /// Encode many records and scale their numeric columns as one matrix.
    /// Fails on the first invalid record.
    pub fn build_batch(&self, records: &[PatientRecord]) -> Result<Vec<FeatureVector>, FeatureError> {
        let mut vectors = records
            .iter()
            .map(|record| self.encode(record).map(|encoded| encoded.to_vector()))
            .collect::<Result<Vec<_>, _>>()?;

        let mut numeric = Array2::<f64>::zeros((vectors.len(), NUMERIC_COLUMNS));
        for (mut row, vector) in numeric.rows_mut().into_iter().zip(&vectors) {
            let [age, stay] = vector.numeric();
            row[0] = age;
            row[1] = stay;
        }

        let scaled = self.scaler.transform_matrix(numeric.view())?;
        for (vector, row) in vectors.iter_mut().zip(scaled.rows()) {
            vector.set_numeric([row[0], row[1]]);
        }

        debug!("Built {} feature vectors", vectors.len());
        Ok(vectors)
    }

    /// Fitted label encoders
    pub fn encoders(&self) -> &EncoderRegistry {
        &self.encoders
    }

    /// Fitted scaler
    pub fn scaler(&self) -> &Normalizer {
        &self.scaler
    }

    /// Numeric domain checks
    pub fn validator(&self) -> &Validator {
        &self.validator
    }
}
