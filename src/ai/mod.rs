//! AI provider boundary
//!
//! The provider is an opaque remote dependency that accepts one text prompt
//! and returns free-form text. It is modelled as the [`AiProvider`] trait so
//! handlers and tests can inject mock providers that never touch the
//! network. The production implementation is [`GeminiClient`], a thin
//! reqwest wrapper around the Gemini `generateContent` REST endpoint.

pub mod recovery;

use crate::config::AiConfig;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Maximum provider error body length retained for logs and error variants
const MAX_ERROR_BODY: usize = 500;

/// Trait for the external generative-AI provider
///
/// Allows dependency injection of mock providers in tests. The call may take
/// unbounded time upstream; implementations must bound it with a timeout,
/// and a timeout counts as a failure for circuit breaker purposes.
#[async_trait]
pub trait AiProvider: Send + Sync {
    /// Send a single prompt and return the model's raw text output
    async fn generate(&self, prompt: &str) -> Result<String, AiError>;
}

/// Errors from the AI provider boundary
#[derive(Debug, Error)]
pub enum AiError {
    /// Provider signalled quota exhaustion. Still counts toward the breaker
    /// threshold like any other failure, but maps to a distinct 429 outcome.
    #[error("AI provider rate limit exceeded")]
    RateLimited,

    #[error("AI request timed out after {timeout_seconds} seconds")]
    Timeout { timeout_seconds: u64 },

    #[error("AI provider returned HTTP {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("network error calling AI provider: {reason}")]
    Network { reason: String },

    #[error("AI provider returned no candidate text")]
    EmptyResponse,
}

/// Classify a non-success provider response
///
/// Rate-limit detection matches the HTTP status plus a provider-specific
/// body marker. The substring match is inherently fragile, which is why it
/// is isolated here: swapping the detection strategy must not touch any
/// orchestration code.
fn classify_http_failure(status: StatusCode, body: &str) -> AiError {
    if status == StatusCode::TOO_MANY_REQUESTS || body.contains("RESOURCE_EXHAUSTED") {
        return AiError::RateLimited;
    }

    AiError::Upstream {
        status: status.as_u16(),
        body: truncate(body, MAX_ERROR_BODY),
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.len() <= max {
        return text.to_string();
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

/// Gemini REST client
///
/// Calls `{base_url}/v1beta/models/{model}:generateContent` with the API key
/// in the `x-goog-api-key` header. The request timeout comes from config and
/// bounds the only unbounded-latency operation in the service.
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
    timeout_seconds: u64,
}

impl GeminiClient {
    pub fn new(config: &AiConfig, api_key: String) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            timeout_seconds: config.request_timeout_seconds,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

#[async_trait]
impl AiProvider for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, AiError> {
        let request = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AiError::Timeout {
                        timeout_seconds: self.timeout_seconds,
                    }
                } else {
                    AiError::Network {
                        reason: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_http_failure(status, &body));
        }

        let parsed: GenerateResponse = response.json().await.map_err(|e| AiError::Network {
            reason: format!("failed to read provider response: {e}"),
        })?;

        let text: String = parsed
            .candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(AiError::EmptyResponse);
        }

        tracing::debug!(
            model = %self.model,
            response_bytes = text.len(),
            "AI provider call succeeded"
        );

        Ok(text)
    }
}
