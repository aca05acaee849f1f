//! Feedback Routes
//!
//! Feedback is acknowledged and logged, never stored.

use axum::{extract::rejection::JsonRejection, http::StatusCode, Json};
use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;

/// Longest accepted feedback, in characters
pub const MAX_FEEDBACK_CHARS: usize = 5_000;

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct FeedbackResponse {
    pub id: Uuid,
    pub message: String,
}

/// Acknowledge a feedback submission
pub async fn post_feedback(
    payload: Result<Json<FeedbackRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<FeedbackResponse>), ApiError> {
    let Json(request) = payload?;
    let text = request.text.trim();
    if text.is_empty() {
        return Err(ApiError::BadRequest(
            "Please enter some feedback before submitting.".to_string(),
        ));
    }
    let chars = text.chars().count();
    if chars > MAX_FEEDBACK_CHARS {
        return Err(ApiError::BadRequest(format!(
            "Feedback is limited to {MAX_FEEDBACK_CHARS} characters."
        )));
    }

    let id = Uuid::new_v4();
    info!(%id, chars, "Feedback received");
    counter!("feedback_total").increment(1);

    Ok((
        StatusCode::ACCEPTED,
        Json(FeedbackResponse {
            id,
            message: "Thank you for your valuable feedback!".to_string(),
        }),
    ))
}
