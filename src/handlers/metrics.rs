//! Prometheus metrics endpoint
//!
//! Exposes the process metrics registry in text exposition format.

use crate::error::{AppError, AppResult};
use axum::extract::State;

use crate::handlers::AppState;

/// Metrics exposition handler
pub async fn handler(State(state): State<AppState>) -> AppResult<String> {
    state
        .metrics()
        .export()
        .map_err(|e| AppError::Internal(format!("Failed to encode metrics: {e}")))
}
