//! Health check endpoints
//!
//! `/health` is a plain liveness probe. `/health/ai` reports whether the AI
//! provider is configured and includes a read-only circuit breaker snapshot.

use crate::breaker::BreakerSnapshot;
use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use crate::handlers::AppState;

/// Liveness response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// AI dependency health response
#[derive(Debug, Serialize)]
pub struct AiHealthResponse {
    /// "available" when credentials are configured, "unavailable" otherwise
    pub ai: &'static str,
    /// Breaker state snapshot, side-effect free
    pub breaker: BreakerSnapshot,
}

/// Running banner for the service root
#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: &'static str,
}

/// Root banner handler
pub async fn root_handler() -> Json<RootResponse> {
    Json(RootResponse {
        message: "AIVA is running",
    })
}

/// Liveness handler
pub async fn handler() -> (StatusCode, Json<HealthResponse>) {
    (StatusCode::OK, Json(HealthResponse { status: "OK" }))
}

/// AI availability handler
pub async fn ai_handler(State(state): State<AppState>) -> (StatusCode, Json<AiHealthResponse>) {
    let ai = if state.provider_configured() {
        "available"
    } else {
        "unavailable"
    };

    (
        StatusCode::OK,
        Json(AiHealthResponse {
            ai,
            breaker: state.breaker().snapshot(),
        }),
    )
}
