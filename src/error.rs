//! Error types for AIVA
//!
//! All errors implement `IntoResponse` for Axum handlers. Each variant maps
//! to exactly one HTTP outcome category; internal detail is logged at the
//! point of failure and never echoed in the response body.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Main error type for the application
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("AI service is temporarily unavailable. Retry in {retry_after_seconds} seconds.")]
    CircuitOpen { retry_after_seconds: u64 },

    #[error("AI service rate limit exceeded. Please try again in a moment.")]
    RateLimited,

    #[error("AI returned an invalid response. Please try again later.")]
    MalformedAiResponse,

    /// No AI provider is configured (missing credentials). Distinct from
    /// `CircuitOpen`: the breaker never engages for an unconfigured provider.
    #[error("AI service is temporarily unavailable.")]
    AiUnavailable,

    #[error("Failed to call AI service. Please try again later.")]
    AiCallFailed,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::CircuitOpen { .. } | Self::AiUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::MalformedAiResponse | Self::AiCallFailed => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Config(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = match &self {
            Self::CircuitOpen {
                retry_after_seconds,
            } => Json(serde_json::json!({
                "error": self.to_string(),
                "retry_after_seconds": retry_after_seconds,
            })),
            _ => Json(serde_json::json!({
                "error": self.to_string(),
            })),
        };

        (status, body).into_response()
    }
}

/// Convenience type alias for Results
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Build a validation error for a named request field
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_message_names_field() {
        let err = AppError::validation("name", "contains disallowed characters");
        assert_eq!(
            err.to_string(),
            "Invalid name: contains disallowed characters"
        );
    }

    #[test]
    fn test_validation_error_response_status() {
        let err = AppError::validation("name", "too long");
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_circuit_open_error_response_status() {
        let err = AppError::CircuitOpen {
            retry_after_seconds: 42,
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_circuit_open_message_carries_cooldown() {
        let err = AppError::CircuitOpen {
            retry_after_seconds: 42,
        };
        assert!(err.to_string().contains("42 seconds"));
    }

    #[test]
    fn test_rate_limited_response_status() {
        let response = AppError::RateLimited.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn test_malformed_ai_response_status() {
        let response = AppError::MalformedAiResponse.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_ai_unavailable_response_status() {
        let response = AppError::AiUnavailable.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_ai_call_failed_response_status() {
        let response = AppError::AiCallFailed.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
