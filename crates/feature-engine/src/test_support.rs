//! Shared fixtures for unit tests

use crate::encoder::EncoderRegistry;
use crate::features::FeatureBuilder;
use crate::record::PatientRecord;
use data_validator::{Normalizer, Validator};

pub(crate) const ENCODERS_JSON: &str = r#"{
    "Hospital": ["Brown Group", "General", "Johnson PLC"],
    "Blood Type": ["A+", "A-", "AB+", "AB-", "B+", "B-", "O+", "O-"],
    "Medical Condition": ["Arthritis", "Asthma", "Cancer", "Diabetes", "Hypertension", "Obesity"],
    "Insurance Provider": ["Aetna", "Blue Cross", "Cigna", "Medicare", "UnitedHealthcare"],
    "Medication": ["Aspirin", "Ibuprofen", "Lipitor", "Metformin", "Paracetamol", "Penicillin"],
    "Admission Type": ["Elective", "Emergency", "Urgent"],
    "Test Results": ["Abnormal", "Inconclusive", "Normal"],
    "Gender": ["Female", "Male"]
}"#;

pub(crate) fn sample_record() -> PatientRecord {
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

pub(crate) fn sample_builder() -> FeatureBuilder {
    let encoders = EncoderRegistry::from_json_str(ENCODERS_JSON).unwrap();
    let scaler = Normalizer::z_score(&[51.5, 15.5], &[19.6, 8.7]).unwrap();
    FeatureBuilder::new(encoders, scaler, Validator::default())
}
