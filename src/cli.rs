//! Command-line interface for AIVA
//!
//! Provides argument parsing and subcommand handling for the server binary.

use clap::{Parser, Subcommand};

/// Emotionally intelligent financial well-being insight service
#[derive(Parser)]
#[command(name = "aiva")]
#[command(version)]
#[command(about = "Emotionally intelligent financial well-being insight service")]
#[command(
    long_about = "AIVA serves AI-generated financial insight endpoints over mock transaction \
    data, with a circuit breaker guarding the external AI provider and strict sanitization \
    of all user-supplied text."
)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml", global = true)]
    pub config: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate a template configuration file
    Config {
        /// Output file path (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<String>,
    },
}

/// Generate template configuration content
pub fn generate_config_template() -> &'static str {
    r#"# AIVA Configuration
# ==================
#
# Every setting is optional; the server runs with built-in defaults when a
# section or the whole file is absent. The AI API key is never read from this
# file - set the environment variable named by ai.api_key_env instead.

[server]
# IP address to bind to (0.0.0.0 for all interfaces, 127.0.0.1 for localhost only)
host = "0.0.0.0"

# Port to listen on
port = 8000

[ai]
# Model identifier passed to the provider
model = "gemini-2.5-flash"

# Provider base URL (point at a local mock for testing)
base_url = "https://generativelanguage.googleapis.com"

# Outbound request timeout in seconds (1-300); a timeout counts as a
# circuit breaker failure
request_timeout_seconds = 30

# Environment variable holding the API key. When the variable is unset the
# AI endpoints return 503 without engaging the breaker.
api_key_env = "GEMINI_API_KEY"

[breaker]
# Consecutive failures before the circuit opens
failure_threshold = 3

# Seconds to wait before attempting a half-open trial call
cooldown_seconds = 60

[data]
# Static data files, loaded once at startup
transactions_path = "data/mock_transactions.json"
knowledge_base_path = "data/knowledge_base.json"

[observability]
# Default log level when RUST_LOG is not set (trace, debug, info, warn, error)
log_level = "info"
"#
}
