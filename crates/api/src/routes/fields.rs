//! Form Field Routes

use axum::{extract::State, Json};
use feature_engine::CategoricalField;
use serde::Serialize;

use crate::SharedState;

/// Choices for one selection control
#[derive(Debug, Serialize)]
pub struct FieldOptions {
    pub field: CategoricalField,
    /// Labels in code order
    pub labels: Vec<String>,
}

/// Inclusive numeric domain
#[derive(Debug, Serialize)]
pub struct NumericDomain {
    pub min: f64,
    pub max: f64,
}

impl From<(f64, f64)> for NumericDomain {
    fn from((min, max): (f64, f64)) -> Self {
        Self { min, max }
    }
}

#[derive(Debug, Serialize)]
pub struct NumericDomains {
    pub age: NumericDomain,
    pub length_of_stay: NumericDomain,
}

/// Response for fields endpoint
#[derive(Debug, Serialize)]
pub struct FieldsResponse {
    pub categorical: Vec<FieldOptions>,
    pub numeric: NumericDomains,
}

/// Everything a form needs to offer only valid inputs
pub async fn get_fields(State(state): State<SharedState>) -> Json<FieldsResponse> {
    let builder = state.estimator.builder();
    let categorical = CategoricalField::ALL
        .into_iter()
        .map(|field| FieldOptions {
            field,
            labels: builder.encoders().classes(field).to_vec(),
        })
        .collect();

    let validation = builder.validator().config();
    Json(FieldsResponse {
        categorical,
        numeric: NumericDomains {
            age: validation.age_range.into(),
            length_of_stay: validation.length_of_stay_range.into(),
        },
    })
}
