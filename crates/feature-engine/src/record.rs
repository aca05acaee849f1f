//! Submitted Patient Record

use crate::field::CategoricalField;
use serde::{Deserialize, Serialize};

/// Raw field values as submitted by the form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    #[serde(alias = "Hospital")]
    pub hospital: String,
    /// Age in years
    #[serde(alias = "Age")]
    pub age: f64,
    /// Length of stay in days
    #[serde(alias = "Length of Stay")]
    pub length_of_stay: f64,
    #[serde(alias = "Blood Type")]
    pub blood_type: String,
    #[serde(alias = "Medical Condition")]
    pub medical_condition: String,
    #[serde(alias = "Insurance Provider")]
    pub insurance_provider: String,
    #[serde(alias = "Medication")]
    pub medication: String,
    #[serde(alias = "Admission Type")]
    pub admission_type: String,
    #[serde(alias = "Test Results")]
    pub test_results: String,
    #[serde(alias = "Gender")]
    pub gender: String,
}

impl PatientRecord {
    /// Submitted label for a categorical field
    pub fn label(&self, field: CategoricalField) -> &str {
        match field {
            CategoricalField::Hospital => &self.hospital,
            CategoricalField::BloodType => &self.blood_type,
            CategoricalField::MedicalCondition => &self.medical_condition,
            CategoricalField::InsuranceProvider => &self.insurance_provider,
            CategoricalField::Medication => &self.medication,
            CategoricalField::AdmissionType => &self.admission_type,
            CategoricalField::TestResults => &self.test_results,
            CategoricalField::Gender => &self.gender,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_record;

    #[test]
    fn test_accepts_column_names() {
        let json = r#"{
            "Hospital": "General", "Age": 45, "Length of Stay": 5,
            "Blood Type": "O+", "Medical Condition": "Diabetes",
            "Insurance Provider": "Aetna", "Medication": "Metformin",
            "Admission Type": "Emergency", "Test Results": "Normal", "Gender": "Male"
        }"#;
        let record: PatientRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record, sample_record());
    }

    #[test]
    fn test_label_lookup() {
        let record = sample_record();
        assert_eq!(record.label(CategoricalField::BloodType), "O+");
        assert_eq!(record.label(CategoricalField::TestResults), "Normal");
    }
}
