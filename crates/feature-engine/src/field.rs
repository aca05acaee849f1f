//! Field and Column Identifiers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Categorical input fields, each backed by a fitted label encoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CategoricalField {
    #[serde(rename = "Hospital")]
    Hospital,
    #[serde(rename = "Blood Type")]
    BloodType,
    #[serde(rename = "Medical Condition")]
    MedicalCondition,
    #[serde(rename = "Insurance Provider")]
    InsuranceProvider,
    #[serde(rename = "Medication")]
    Medication,
    #[serde(rename = "Admission Type")]
    AdmissionType,
    #[serde(rename = "Test Results")]
    TestResults,
    #[serde(rename = "Gender")]
    Gender,
}

impl CategoricalField {
    /// Every field, in feature-vector order
    pub const ALL: [CategoricalField; 8] = [
        CategoricalField::Hospital,
        CategoricalField::BloodType,
        CategoricalField::MedicalCondition,
        CategoricalField::InsuranceProvider,
        CategoricalField::Medication,
        CategoricalField::AdmissionType,
        CategoricalField::TestResults,
        CategoricalField::Gender,
    ];

    /// Column name used by the training data and the encoder artifact
    pub fn name(&self) -> &'static str {
        match self {
            CategoricalField::Hospital => "Hospital",
            CategoricalField::BloodType => "Blood Type",
            CategoricalField::MedicalCondition => "Medical Condition",
            CategoricalField::InsuranceProvider => "Insurance Provider",
            CategoricalField::Medication => "Medication",
            CategoricalField::AdmissionType => "Admission Type",
            CategoricalField::TestResults => "Test Results",
            CategoricalField::Gender => "Gender",
        }
    }

    /// Look up a field by its column name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.name() == name)
    }

    pub(crate) fn ordinal(self) -> usize {
        self as usize
    }
}

impl fmt::Display for CategoricalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Columns of the model input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureColumn {
    Categorical(CategoricalField),
    Age,
    LengthOfStay,
}

impl FeatureColumn {
    /// Column order the model was trained on. Nothing else defines it.
    pub const ORDER: [FeatureColumn; 10] = [
        FeatureColumn::Categorical(CategoricalField::Hospital),
        FeatureColumn::Age,
        FeatureColumn::LengthOfStay,
        FeatureColumn::Categorical(CategoricalField::BloodType),
        FeatureColumn::Categorical(CategoricalField::MedicalCondition),
        FeatureColumn::Categorical(CategoricalField::InsuranceProvider),
        FeatureColumn::Categorical(CategoricalField::Medication),
        FeatureColumn::Categorical(CategoricalField::AdmissionType),
        FeatureColumn::Categorical(CategoricalField::TestResults),
        FeatureColumn::Categorical(CategoricalField::Gender),
    ];

    /// Position of this column in the model input
    pub fn position(self) -> usize {
        Self::ORDER
            .iter()
            .position(|column| *column == self)
            .unwrap_or_else(|| unreachable!("every column appears in ORDER"))
    }

    /// Whether the fitted scaler applies to this column
    pub fn is_scaled(self) -> bool {
        matches!(self, FeatureColumn::Age | FeatureColumn::LengthOfStay)
    }
}
