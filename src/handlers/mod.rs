//! HTTP request handlers for the AIVA API

use crate::ai::{AiError, AiProvider, GeminiClient};
use crate::breaker::{BreakerError, CircuitBreaker};
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::knowledge::KnowledgeBase;
use crate::metrics::{AiEndpoint, AiOutcome, Metrics};
use crate::spending::Transaction;
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;

pub mod checkins;
pub mod health;
pub mod hello;
pub mod insights;
pub mod metrics;
pub mod transactions;

/// Application state shared across all handlers
///
/// The circuit breaker is the only mutable member; everything else is
/// read-only for the process lifetime. All fields are Arc'd for cheap
/// cloning across Axum handlers. The provider is `None` when no API key is
/// configured, in which case AI endpoints return 503 without ever engaging
/// the breaker.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    breaker: Arc<CircuitBreaker>,
    provider: Option<Arc<dyn AiProvider>>,
    knowledge: Arc<KnowledgeBase>,
    transactions: Arc<Vec<Transaction>>,
    metrics: Arc<Metrics>,
}

impl AppState {
    /// Create AppState from configuration, loading static data from disk
    /// and reading provider credentials from the environment
    pub fn new(config: Arc<Config>) -> AppResult<Self> {
        let transactions = crate::spending::load_transactions(&config.data.transactions_path)?;
        let knowledge = KnowledgeBase::from_file(&config.data.knowledge_base_path)?;

        let provider: Option<Arc<dyn AiProvider>> = match std::env::var(&config.ai.api_key_env) {
            Ok(key) if !key.trim().is_empty() => {
                Some(Arc::new(GeminiClient::new(&config.ai, key)?))
            }
            _ => {
                tracing::warn!(
                    api_key_env = %config.ai.api_key_env,
                    "No AI credentials configured; AI endpoints will return 503"
                );
                None
            }
        };

        Self::from_parts(config, provider, knowledge, transactions)
    }

    /// Assemble AppState from pre-built components
    ///
    /// This is the seam integration tests use to inject mock providers and
    /// in-memory data without touching disk or the environment.
    pub fn from_parts(
        config: Arc<Config>,
        provider: Option<Arc<dyn AiProvider>>,
        knowledge: KnowledgeBase,
        transactions: Vec<Transaction>,
    ) -> AppResult<Self> {
        let breaker = CircuitBreaker::new(
            config.breaker.failure_threshold,
            Duration::from_secs(config.breaker.cooldown_seconds),
        );

        let metrics = Metrics::new()
            .map_err(|e| AppError::Internal(format!("Failed to build metrics registry: {e}")))?;

        Ok(Self {
            config,
            breaker: Arc::new(breaker),
            provider,
            knowledge: Arc::new(knowledge),
            transactions: Arc::new(transactions),
            metrics: Arc::new(metrics),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    /// The configured AI provider, or `AiUnavailable` when credentials are absent
    pub fn provider(&self) -> AppResult<&Arc<dyn AiProvider>> {
        self.provider.as_ref().ok_or(AppError::AiUnavailable)
    }

    pub fn provider_configured(&self) -> bool {
        self.provider.is_some()
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root_handler))
        .route("/transactions/mock", get(transactions::handler))
        .route("/health", get(health::handler))
        .route("/health/ai", get(health::ai_handler))
        .route("/metrics", get(metrics::handler))
        .route("/v1/ai/hello", post(hello::handler))
        .route("/v1/ai/insights", post(insights::handler))
        .route("/v1/ai/checkin", post(checkins::handler))
        .layer(axum::middleware::from_fn(
            crate::middleware::request_id_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Map a breaker-wrapped AI failure to its response category
///
/// Logs the full failure detail here, at the orchestration boundary, then
/// returns the category-appropriate generic error. Rate limits surface as
/// 429 even though they count toward the breaker threshold like any other
/// failure.
fn map_ai_failure(endpoint: AiEndpoint, metrics: &Metrics, err: BreakerError<AiError>) -> AppError {
    let (outcome, app_err) = match err {
        BreakerError::Open { retry_after } => {
            tracing::warn!(
                endpoint = endpoint.as_str(),
                retry_after_seconds = retry_after.as_secs(),
                "Rejected AI call: circuit is open"
            );
            (
                AiOutcome::CircuitOpen,
                AppError::CircuitOpen {
                    retry_after_seconds: retry_after.as_secs(),
                },
            )
        }
        BreakerError::Operation(AiError::RateLimited) => {
            tracing::error!(
                endpoint = endpoint.as_str(),
                "AI provider rate limit exceeded"
            );
            (AiOutcome::RateLimited, AppError::RateLimited)
        }
        BreakerError::Operation(ai_err) => {
            tracing::error!(
                endpoint = endpoint.as_str(),
                error = %ai_err,
                "AI call failed"
            );
            (AiOutcome::Failure, AppError::AiCallFailed)
        }
    };

    metrics.record_ai_call(endpoint, outcome);
    app_err
}

/// Record a sanitization rejection before surfacing it
fn reject_validation(endpoint: AiEndpoint, metrics: &Metrics, err: AppError) -> AppError {
    metrics.record_validation_failure(endpoint);
    err
}
