//! Estimate Routes

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::{DateTime, Utc};
use feature_engine::PatientRecord;
use inference_engine::CostEstimate;
use metrics::{counter, histogram};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::error::ApiError;
use crate::SharedState;

/// Largest accepted batch
pub const MAX_BATCH_SIZE: usize = 1_000;

/// Response for single estimate endpoint
#[derive(Debug, Serialize)]
pub struct EstimateResponse {
    #[serde(flatten)]
    pub estimate: CostEstimate,
    pub estimated_at: DateTime<Utc>,
}

/// Request for batch endpoint
#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub records: Vec<PatientRecord>,
}

/// Response for batch endpoint
#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub data: Vec<CostEstimate>,
    pub count: usize,
    pub estimated_at: DateTime<Utc>,
}

fn record_failure(err: ApiError) -> ApiError {
    counter!("estimate_failures_total", "reason" => err.reason()).increment(1);
    err
}

/// Estimate the cost for one patient record
pub async fn post_estimate(
    State(state): State<SharedState>,
    payload: Result<Json<PatientRecord>, JsonRejection>,
) -> Result<Json<EstimateResponse>, ApiError> {
    let Json(record) = payload.map_err(|e| record_failure(e.into()))?;
    let start = Instant::now();
    let estimate = state
        .estimator
        .estimate(&record)
        .map_err(|e| record_failure(e.into()))?;

    let elapsed = start.elapsed();
    counter!("estimates_total").increment(1);
    histogram!("estimate_latency_seconds").record(elapsed.as_secs_f64());
    debug!(amount = estimate.amount, ?elapsed, "Served estimate");

    Ok(Json(EstimateResponse {
        estimate,
        estimated_at: Utc::now(),
    }))
}

/// Estimate costs for several records at once
pub async fn post_estimate_batch(
    State(state): State<SharedState>,
    payload: Result<Json<BatchRequest>, JsonRejection>,
) -> Result<Json<BatchResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| record_failure(e.into()))?;
    if request.records.len() > MAX_BATCH_SIZE {
        return Err(record_failure(ApiError::BadRequest(format!(
            "batch of {} records exceeds the limit of {MAX_BATCH_SIZE}",
            request.records.len()
        ))));
    }

    let start = Instant::now();
    let data = state
        .estimator
        .estimate_batch(&request.records)
        .map_err(|e| record_failure(e.into()))?;

    counter!("estimates_total").increment(data.len() as u64);
    histogram!("estimate_latency_seconds").record(start.elapsed().as_secs_f64());

    Ok(Json(BatchResponse {
        count: data.len(),
        data,
        estimated_at: Utc::now(),
    }))
}
