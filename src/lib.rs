//! AIVA - Emotionally intelligent financial well-being insight service
//!
//! This library provides an HTTP backend that enriches mock transaction data
//! with AI-generated insight text. The outbound AI call is guarded by a
//! circuit breaker, and all user-supplied free text passes through a
//! prompt-injection sanitizer before it is interpolated into any prompt.

pub mod ai;
pub mod breaker;
pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod knowledge;
pub mod metrics;
pub mod middleware;
pub mod prompt;
pub mod sanitize;
pub mod spending;
pub mod telemetry;
