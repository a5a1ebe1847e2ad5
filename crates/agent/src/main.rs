//! Dockwise agent
//!
//! Runs the analysis engine on a timer and serves results, health probes,
//! and Prometheus metrics over HTTP.

use advisor_lib::engine::AnalysisEngine;
use advisor_lib::health::HealthRegistry;
use anyhow::Result;
use dockwise_agent::{api, config::AgentConfig, provider_for, refresh::RefreshLoop};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const AGENT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting dockwise-agent");

    let config = AgentConfig::load()?;
    info!(
        host_name = %config.host_name,
        data_dir = %config.data_dir.display(),
        snapshot = ?config.snapshot_path,
        "Agent configured"
    );

    let engine = Arc::new(
        AnalysisEngine::builder(provider_for(&config))
            .config(config.engine_config())
            .host_name(config.host_name.clone())
            .build(),
    );
    engine.logger().log_startup(AGENT_VERSION, engine.provider_name());

    let health_registry = HealthRegistry::with_engine_components().await;

    let (shutdown_tx, _) = broadcast::channel(1);

    let refresh = RefreshLoop::new(
        Arc::clone(&engine),
        health_registry.clone(),
        config.refresh_interval(),
    );
    let refresh_handle = tokio::spawn(refresh.run(shutdown_tx.subscribe()));

    let app_state = Arc::new(api::AppState::new(Arc::clone(&engine), health_registry));
    let api_handle = tokio::spawn(api::serve(config.api_port, app_state));

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            engine.logger().log_shutdown("SIGINT received");
        }
        res = api_handle => {
            match res {
                Ok(Err(e)) => error!(error = %e, "API server exited"),
                Err(e) => error!(error = %e, "API server task failed"),
                Ok(Ok(())) => {}
            }
            engine.logger().log_shutdown("API server stopped");
        }
    }

    let _ = shutdown_tx.send(());
    if let Err(e) = refresh_handle.await {
        error!(error = %e, "Refresh loop task failed");
    }
    info!("Shutdown complete");

    Ok(())
}
