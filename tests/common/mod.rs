//! Shared helpers for integration tests
//!
//! Builds app routers around a scripted mock AI provider so tests are
//! hermetic and never call real model endpoints.

#![allow(dead_code)]

use aiva::ai::{AiError, AiProvider};
use aiva::config::Config;
use aiva::handlers::{AppState, router};
use aiva::knowledge::{GuidanceChunk, KnowledgeBase};
use aiva::spending::Transaction;
use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// Scripted mock provider returning queued results in order
pub struct MockProvider {
    responses: Mutex<VecDeque<Result<String, AiError>>>,
}

impl MockProvider {
    pub fn with_responses(responses: Vec<Result<String, AiError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
        })
    }

    pub fn succeeding_with(text: &str) -> Arc<Self> {
        Self::with_responses(vec![Ok(text.to_string())])
    }
}

#[async_trait]
impl AiProvider for MockProvider {
    async fn generate(&self, _prompt: &str) -> Result<String, AiError> {
        self.responses
            .lock()
            .expect("mock provider lock")
            .pop_front()
            .unwrap_or(Err(AiError::EmptyResponse))
    }
}

pub fn test_transactions() -> Vec<Transaction> {
    serde_json::from_str(
        r#"[
            {"amount": -40.0, "category": "Food"},
            {"amount": -10.0, "category": "Transport"},
            {"amount": 1850.0, "category": "Income"}
        ]"#,
    )
    .expect("test transactions should parse")
}

pub fn test_knowledge() -> KnowledgeBase {
    let chunks: Vec<GuidanceChunk> = serde_json::from_str(
        r#"[
            {
                "id": "food-1",
                "category": "Food",
                "text": "Food guidance for {user_name}."
            },
            {
                "id": "checkin-1",
                "type": "multi_category_checkin",
                "categories": ["Food"],
                "text": "Check-in context.",
                "question": "How are you feeling?",
                "options": ["Stressed.", "Fine."]
            }
        ]"#,
    )
    .expect("test knowledge should parse");
    KnowledgeBase::from_chunks(chunks)
}

/// Build application state around an optional mock provider
pub fn test_state(provider: Option<Arc<dyn AiProvider>>) -> AppState {
    AppState::from_parts(
        Arc::new(Config::default()),
        provider,
        test_knowledge(),
        test_transactions(),
    )
    .expect("test state should build")
}

/// Build a full application router around an optional mock provider
pub fn test_app(provider: Option<Arc<dyn AiProvider>>) -> Router {
    router(test_state(provider))
}

/// POST a JSON body and return status plus parsed response body
pub async fn post_json(
    app: Router,
    path: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request should build");

    send(app, request).await
}

/// GET a path and return status plus parsed response body
pub async fn get_json(app: Router, path: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(path)
        .body(Body::empty())
        .expect("request should build");

    send(app, request).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.expect("request should complete");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should read");

    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::String(
            String::from_utf8_lossy(&bytes).into_owned(),
        ))
    };

    (status, body)
}
