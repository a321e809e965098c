//! End-to-end tests for the insight and check-in flows
//!
//! Exercises all five outcome categories per AI operation: success, 400
//! validation, 429 rate-limited, 503 circuit-open/unavailable, and 500
//! generic failure.

mod common;

use aiva::ai::AiError;
use axum::http::StatusCode;
use common::*;
use serde_json::json;

fn narrative() -> String {
    r#"```json
{
    "top_category": "Shopping",
    "emotional_tone": "reassuring",
    "suggested_action": "Try preparing one extra meal at home this week.",
    "aiva_insight": "Food was your top spending category this week, and that's okay."
}
```"#
        .to_string()
}

fn followup() -> String {
    r#"{
        "aiva_followup": "That sounds like a heavy week.",
        "detected_emotion": "stress",
        "supportive_reframe": "Comfort spending under pressure is human.",
        "next_step_suggestion": "Plan one no-spend evening."
    }"#
    .to_string()
}

#[tokio::test]
async fn insights_success_merges_local_summary_with_narrative() {
    let provider = MockProvider::succeeding_with(&narrative());
    let (status, body) = post_json(test_app(Some(provider)), "/v1/ai/insights", json!({})).await;

    assert_eq!(status, StatusCode::OK);

    // Locally computed summary is authoritative.
    assert_eq!(body["spending_summary"]["Food"], 40.0);
    assert_eq!(body["spending_summary"]["Transport"], 10.0);
    assert_eq!(body["top_category"], "Food");

    // AI narrative fields are additive.
    assert_eq!(body["emotional_tone"], "reassuring");
    assert_eq!(
        body["suggested_action"],
        "Try preparing one extra meal at home this week."
    );

    // Check-in data comes from the knowledge base.
    assert_eq!(body["checkin_question"], "How are you feeling?");
    assert_eq!(body["checkin_options"][0], "Stressed.");
}

#[tokio::test]
async fn insights_without_credentials_returns_503() {
    let (status, body) = post_json(test_app(None), "/v1/ai/insights", json!({})).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"].as_str().expect("error").contains("unavailable"));
}

#[tokio::test]
async fn insights_rate_limited_returns_429() {
    let provider = MockProvider::with_responses(vec![Err(AiError::RateLimited)]);
    let (status, body) = post_json(test_app(Some(provider)), "/v1/ai/insights", json!({})).await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert!(body["error"].as_str().expect("error").contains("rate limit"));
}

#[tokio::test]
async fn insights_malformed_ai_output_returns_500_without_leaking() {
    let provider = MockProvider::succeeding_with("Sure! Here's your answer: {a:1}");
    let (status, body) = post_json(test_app(Some(provider)), "/v1/ai/insights", json!({})).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let message = body["error"].as_str().expect("error");
    assert!(!message.contains("Sure!"), "raw AI text must never be echoed");
}

#[tokio::test]
async fn insights_circuit_opens_after_threshold_failures() {
    // Default breaker threshold is 3.
    let provider = MockProvider::with_responses(vec![
        Err(AiError::EmptyResponse),
        Err(AiError::EmptyResponse),
        Err(AiError::EmptyResponse),
    ]);
    let app = test_app(Some(provider));

    for _ in 0..3 {
        let (status, _) = post_json(app.clone(), "/v1/ai/insights", json!({})).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    // Circuit is now open: fail fast with backoff guidance, no provider call.
    let (status, body) = post_json(app.clone(), "/v1/ai/insights", json!({})).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["retry_after_seconds"].is_u64());
    assert!(body["retry_after_seconds"].as_u64().expect("seconds") <= 60);

    let (_, health) = get_json(app, "/health/ai").await;
    assert_eq!(health["breaker"]["state"], "open");
}

#[tokio::test]
async fn open_circuit_rejects_all_ai_endpoints() {
    let provider = MockProvider::with_responses(vec![
        Err(AiError::EmptyResponse),
        Err(AiError::EmptyResponse),
        Err(AiError::EmptyResponse),
    ]);
    let app = test_app(Some(provider));

    for _ in 0..3 {
        post_json(app.clone(), "/v1/ai/insights", json!({})).await;
    }

    // The breaker is shared process-wide, so the greeting endpoint is also
    // rejected while the circuit is open.
    let (status, _) = post_json(app, "/v1/ai/hello", json!({"name": "Jane"})).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn rate_limit_counts_toward_breaker_threshold() {
    let provider = MockProvider::with_responses(vec![
        Err(AiError::RateLimited),
        Err(AiError::RateLimited),
        Err(AiError::RateLimited),
    ]);
    let app = test_app(Some(provider));

    for _ in 0..3 {
        let (status, _) = post_json(app.clone(), "/v1/ai/insights", json!({})).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    }

    let (_, health) = get_json(app, "/health/ai").await;
    assert_eq!(health["breaker"]["state"], "open");
}

#[tokio::test]
async fn checkin_success_returns_followup_fields() {
    let provider = MockProvider::succeeding_with(&followup());
    let (status, body) = post_json(
        test_app(Some(provider)),
        "/v1/ai/checkin",
        json!({
            "name": "Jane",
            "category": "Food",
            "selected_option": "I've been really stressed or burnt out."
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["detected_emotion"], "stress");
    assert_eq!(body["next_step_suggestion"], "Plan one no-spend evening.");
}

#[tokio::test]
async fn checkin_without_credentials_returns_503() {
    let (status, _) = post_json(
        test_app(None),
        "/v1/ai/checkin",
        json!({"category": "Food", "selected_option": "Fine."}),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn breaker_recovers_after_successful_trial() {
    // Breaker with threshold 1 and a 1-second cooldown so the test can wait
    // out the cooldown in real time.
    let config = aiva::config::Config {
        breaker: aiva::config::BreakerConfig {
            failure_threshold: 1,
            cooldown_seconds: 1,
        },
        ..Default::default()
    };

    let provider = MockProvider::with_responses(vec![
        Err(AiError::EmptyResponse),
        Ok("Hello again, friend!".to_string()),
    ]);
    let state = aiva::handlers::AppState::from_parts(
        std::sync::Arc::new(config),
        Some(provider),
        test_knowledge(),
        test_transactions(),
    )
    .expect("state should build");
    let app = aiva::handlers::router(state);

    // Trip the breaker.
    let (status, _) = post_json(app.clone(), "/v1/ai/hello", json!({})).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let (status, _) = post_json(app.clone(), "/v1/ai/hello", json!({})).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    // After the cooldown the half-open trial succeeds and closes the circuit.
    tokio::time::sleep(std::time::Duration::from_millis(1100)).await;
    let (status, body) = post_json(app.clone(), "/v1/ai/hello", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["aiva_message"], "Hello again, friend!");

    let (_, health) = get_json(app, "/health/ai").await;
    assert_eq!(health["breaker"]["state"], "closed");
    assert_eq!(health["breaker"]["failure_count"], 0);
}

#[tokio::test]
async fn metrics_endpoint_reflects_ai_outcomes() {
    let provider = MockProvider::succeeding_with(&narrative());
    let app = test_app(Some(provider));

    post_json(app.clone(), "/v1/ai/insights", json!({})).await;

    let (status, body) = get_json(app, "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    let text = body.as_str().expect("metrics text");
    assert!(text.contains(r#"aiva_ai_calls_total{endpoint="insights",outcome="success"} 1"#));
}
