//! Greeting endpoint
//!
//! AIVA greets the user with a warm, encouraging message. The only user
//! input is an optional name, sanitized before it reaches the prompt.

use crate::error::AppResult;
use crate::metrics::{AiEndpoint, AiOutcome};
use crate::{prompt, sanitize};
use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::handlers::{AppState, map_ai_failure, reject_validation};

/// Request body for the greeting endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct HelloRequest {
    #[serde(default)]
    pub name: Option<String>,
}

/// Response body for the greeting endpoint
#[derive(Debug, Serialize)]
pub struct HelloResponse {
    pub aiva_message: String,
}

/// Greeting handler
pub async fn handler(
    State(state): State<AppState>,
    Json(request): Json<HelloRequest>,
) -> AppResult<Json<HelloResponse>> {
    let name = sanitize::optional_name("name", request.name.as_deref())
        .map_err(|e| reject_validation(AiEndpoint::Hello, state.metrics(), e))?;
    let user_name = name.as_deref().unwrap_or(sanitize::DEFAULT_NAME);

    let provider = state.provider()?;
    let prompt = prompt::greeting(user_name);

    let aiva_message = state
        .breaker()
        .execute(|| provider.generate(&prompt))
        .await
        .map_err(|e| map_ai_failure(AiEndpoint::Hello, state.metrics(), e))?;

    state
        .metrics()
        .record_ai_call(AiEndpoint::Hello, AiOutcome::Success);

    Ok(Json(HelloResponse { aiva_message }))
}
