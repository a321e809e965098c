//! AIVA HTTP server
//!
//! Starts an Axum web server exposing the AI insight endpoints over mock
//! transaction data.

use aiva::{cli, config::Config, handlers, telemetry};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = cli::Cli::parse();

    if let Some(cli::Command::Config { output }) = &args.command {
        let template = cli::generate_config_template();
        match output {
            Some(path) => {
                std::fs::write(path, template)?;
                println!("Wrote configuration template to {path}");
            }
            None => print!("{template}"),
        }
        return Ok(());
    }

    let config = Config::load(&args.config)?;
    telemetry::init(&config.observability.log_level);

    tracing::info!(
        host = %config.server.host,
        port = config.server.port,
        "Starting AIVA server"
    );

    let state = handlers::AppState::new(Arc::new(config.clone()))?;
    let app = handlers::router(state);

    let addr = SocketAddr::from((
        config
            .server
            .host
            .parse::<std::net::IpAddr>()
            .unwrap_or_else(|_| std::net::IpAddr::from([0, 0, 0, 0])),
        config.server.port,
    ));

    tracing::info!("Listening on {}", addr);
    tracing::info!("Health check available at http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
