//! Insight generation endpoint
//!
//! The orchestrator: summarizes the mock transactions, computes the dominant
//! category and spend level locally, retrieves guidance from the knowledge
//! base, and asks the AI for the narrative fields through the circuit
//! breaker. Locally computed fields are authoritative in the response; the
//! AI contributes only the narrative.

use crate::ai::recovery;
use crate::error::{AppError, AppResult};
use crate::metrics::{AiEndpoint, AiOutcome};
use crate::spending::{SpendLevel, dominant_category, summarize_spending};
use crate::{prompt, sanitize};
use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::handlers::{AppState, map_ai_failure};

/// Emotional tone the AI must choose from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionalTone {
    Reassuring,
    Motivating,
    Grounding,
}

/// Narrative fields recovered from the AI response
///
/// `top_category` is intentionally absent: the locally computed dominant
/// category is authoritative, so whatever the model claims is discarded.
#[derive(Debug, Deserialize)]
struct InsightNarrative {
    emotional_tone: EmotionalTone,
    suggested_action: String,
    aiva_insight: String,
}

/// Response body for the insights endpoint
#[derive(Debug, Serialize)]
pub struct InsightResponse {
    /// Spending totals by category, computed locally
    pub spending_summary: BTreeMap<String, f64>,
    /// Category with highest spending, computed locally
    pub top_category: String,
    pub emotional_tone: EmotionalTone,
    pub suggested_action: String,
    pub aiva_insight: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkin_question: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkin_options: Option<Vec<String>>,
}

/// Insight generation handler
pub async fn handler(State(state): State<AppState>) -> AppResult<Json<InsightResponse>> {
    // 1. Local compute: pure, synchronous, no external calls.
    let totals = summarize_spending(state.transactions());
    if totals.is_empty() {
        return Err(AppError::validation(
            "transactions",
            "no spending data available to analyze",
        ));
    }

    let top_category = dominant_category(&totals)
        .ok_or_else(|| AppError::Internal("spending summary unexpectedly empty".to_string()))?
        .to_string();
    let total_spend: f64 = totals.values().sum();
    let spend_level = SpendLevel::from_total(total_spend);

    // 2. Static guidance lookup.
    let guidance_text = state
        .knowledge()
        .guidance_text(&top_category, sanitize::DEFAULT_NAME);
    let checkin = state.knowledge().checkin_for_category(&top_category);
    let checkin_question = checkin.and_then(|c| c.question.clone());
    let checkin_options = checkin.and_then(|c| c.options.clone());

    tracing::debug!(
        top_category = %top_category,
        total_spend = total_spend,
        spend_level = spend_level.as_str(),
        "Computed local spending context"
    );

    // 3. AI call through the breaker.
    let provider = state.provider()?;
    let prompt = prompt::insight(
        &totals,
        &top_category,
        total_spend,
        spend_level,
        &guidance_text,
    );

    let ai_text = state
        .breaker()
        .execute(|| provider.generate(&prompt))
        .await
        .map_err(|e| map_ai_failure(AiEndpoint::Insights, state.metrics(), e))?;

    // 4. Recover the narrative; the raw AI text is logged, never echoed.
    let narrative = parse_narrative(&state, &ai_text)?;

    state
        .metrics()
        .record_ai_call(AiEndpoint::Insights, AiOutcome::Success);

    // 5. Merge: local summary and check-in data are authoritative, the AI
    // narrative is additive.
    Ok(Json(InsightResponse {
        spending_summary: totals,
        top_category,
        emotional_tone: narrative.emotional_tone,
        suggested_action: narrative.suggested_action,
        aiva_insight: narrative.aiva_insight,
        checkin_question,
        checkin_options,
    }))
}

fn parse_narrative(state: &AppState, ai_text: &str) -> AppResult<InsightNarrative> {
    let envelope = recovery::recover_json(ai_text).map_err(|e| {
        tracing::error!(
            error = %e,
            response_bytes = ai_text.len(),
            "AI returned non-JSON for insights"
        );
        state
            .metrics()
            .record_ai_call(AiEndpoint::Insights, AiOutcome::MalformedResponse);
        AppError::MalformedAiResponse
    })?;

    serde_json::from_value(serde_json::Value::Object(envelope)).map_err(|e| {
        tracing::error!(
            error = %e,
            "AI insight response was missing required narrative fields"
        );
        state
            .metrics()
            .record_ai_call(AiEndpoint::Insights, AiOutcome::MalformedResponse);
        AppError::MalformedAiResponse
    })
}
