//! # Cattery API Server
//!
//! The main entry point for the Actix-web HTTP server.

use actix_web::{HttpServer, web};
use anyhow::Context;

use api_server::build_app;
use api_server::config::AppConfig;
use api_server::state::AppState;
use api_server::telemetry::{TelemetryConfig, init_telemetry};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env();

    tracing::info!(
        "Starting Cattery API Server on {}:{}",
        config.host,
        config.port
    );

    let state = AppState::new(config.clone()).await;

    #[cfg(feature = "scheduler")]
    let mut scheduler = match api_server::background::start_session_purge(
        &config.scheduler,
        state.sessions.clone(),
    )
    .await
    {
        Ok(scheduler) => scheduler,
        Err(e) => {
            tracing::error!("Failed to start scheduler: {:?}. Continuing without it.", e);
            None
        }
    };

    let data = web::Data::new(state);

    HttpServer::new(move || build_app(data.clone()))
        .bind((config.host.as_str(), config.port))
        .with_context(|| format!("failed to bind {}:{}", config.host, config.port))?
        .run()
        .await
        .context("HTTP server terminated with an error")?;

    #[cfg(feature = "scheduler")]
    if let Some(scheduler) = scheduler.as_mut() {
        if let Err(e) = scheduler.shutdown().await {
            tracing::warn!("Scheduler shutdown failed: {:?}", e);
        }
    }

    tracing::info!("Server stopped");
    Ok(())
}
