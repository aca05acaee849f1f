//! API Error Responses

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use inference_engine::EstimateError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Errors setting up the log subscriber
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("unknown logging.level {0:?}, expected trace, debug, info, warn or error")]
    InvalidLevel(String),

    #[error(transparent)]
    Install(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Errors returned by handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Estimate(#[from] EstimateError),

    #[error("{0}")]
    BadRequest(String),

    #[error("metrics exporter is not installed")]
    MetricsDisabled,
}

impl ApiError {
    /// Short label for failure metrics
    pub fn reason(&self) -> &'static str {
        match self {
            ApiError::Estimate(EstimateError::UnknownLabel { .. }) => "unknown_label",
            ApiError::Estimate(EstimateError::OutOfRange(_)) => "out_of_range",
            ApiError::Estimate(EstimateError::Prediction(_)) => "prediction",
            ApiError::BadRequest(_) => "bad_request",
            ApiError::MetricsDisabled => "metrics_disabled",
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, field) = match &self {
            ApiError::Estimate(EstimateError::UnknownLabel { field, .. }) => {
                (StatusCode::UNPROCESSABLE_ENTITY, Some(field.name().to_string()))
            }
            ApiError::Estimate(EstimateError::OutOfRange(_)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, None)
            }
            ApiError::Estimate(EstimateError::Prediction(e)) => {
                error!(error = %e, "Prediction failed");
                let body = ErrorBody {
                    error: "prediction failed".to_string(),
                    field: None,
                };
                return (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response();
            }
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, None),
            ApiError::MetricsDisabled => (StatusCode::NOT_FOUND, None),
        };

        let body = ErrorBody {
            error: self.to_string(),
            field,
        };
        (status, Json(body)).into_response()
    }
}
