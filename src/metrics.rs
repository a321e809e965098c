//! Prometheus metrics collection
//!
//! Tracks AI call outcomes per endpoint and validation rejections, exposed
//! via the `/metrics` endpoint in Prometheus text format. Label values come
//! from closed enums to keep cardinality fixed.

use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

/// AI-backed endpoint, used as a metrics label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiEndpoint {
    Hello,
    Insights,
    Checkin,
}

impl AiEndpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            AiEndpoint::Hello => "hello",
            AiEndpoint::Insights => "insights",
            AiEndpoint::Checkin => "checkin",
        }
    }
}

/// Outcome of one AI call attempt, used as a metrics label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiOutcome {
    Success,
    CircuitOpen,
    RateLimited,
    MalformedResponse,
    Failure,
}

impl AiOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            AiOutcome::Success => "success",
            AiOutcome::CircuitOpen => "circuit_open",
            AiOutcome::RateLimited => "rate_limited",
            AiOutcome::MalformedResponse => "malformed_response",
            AiOutcome::Failure => "failure",
        }
    }
}

/// Metrics collector shared across handlers via AppState
pub struct Metrics {
    registry: Registry,
    ai_calls_total: IntCounterVec,
    validation_failures_total: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let ai_calls_total = IntCounterVec::new(
            Opts::new("aiva_ai_calls_total", "AI call attempts by outcome"),
            &["endpoint", "outcome"],
        )?;
        registry.register(Box::new(ai_calls_total.clone()))?;

        let validation_failures_total = IntCounterVec::new(
            Opts::new(
                "aiva_validation_failures_total",
                "Rejected requests by endpoint",
            ),
            &["endpoint"],
        )?;
        registry.register(Box::new(validation_failures_total.clone()))?;

        Ok(Self {
            registry,
            ai_calls_total,
            validation_failures_total,
        })
    }

    pub fn record_ai_call(&self, endpoint: AiEndpoint, outcome: AiOutcome) {
        self.ai_calls_total
            .with_label_values(&[endpoint.as_str(), outcome.as_str()])
            .inc();
    }

    pub fn record_validation_failure(&self, endpoint: AiEndpoint) {
        self.validation_failures_total
            .with_label_values(&[endpoint.as_str()])
            .inc();
    }

    /// Render all metrics in Prometheus text exposition format
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer)
            .map_err(|e| prometheus::Error::Msg(format!("metrics were not valid UTF-8: {e}")))
    }
}
