//! Timer-driven background analysis
//!
//! Each tick asks the engine for a result (served from cache while fresh)
//! on the blocking pool, then mirrors the outcome into component health.

use advisor_lib::engine::{AnalysisEngine, AnalysisResult};
use advisor_lib::health::{components, HealthRegistry};
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::interval;
use tracing::{debug, error, info};

pub struct RefreshLoop {
    engine: Arc<AnalysisEngine>,
    health: HealthRegistry,
    interval: Duration,
}

impl RefreshLoop {
    pub fn new(engine: Arc<AnalysisEngine>, health: HealthRegistry, interval: Duration) -> Self {
        Self {
            engine,
            health,
            interval,
        }
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        info!(
            interval_secs = self.interval.as_secs(),
            provider = %self.engine.provider_name(),
            "Starting analysis refresh loop"
        );

        let mut ticker = interval(self.interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.run_once().await {
                        Ok(result) => debug!(
                            recommendations = result.recommendations.len(),
                            health = %result.health.status,
                            "Refresh cycle complete"
                        ),
                        Err(e) => {
                            error!(error = %e, "Refresh cycle failed");
                            self.health
                                .set_unhealthy(components::ENGINE, e.to_string())
                                .await;
                        }
                    }
                }
                _ = shutdown.recv() => {
                    info!("Shutting down analysis refresh loop");
                    break;
                }
            }
        }
    }

    pub async fn run_once(&self) -> Result<Arc<AnalysisResult>> {
        let engine = Arc::clone(&self.engine);
        let result = tokio::task::spawn_blocking(move || engine.get_or_compute())
            .await
            .context("Analysis task failed")?;

        sync_health(&self.health, &self.engine, &result).await;
        Ok(result)
    }
}

/// Reflect the latest result into the provider/engine/history components
pub async fn sync_health(health: &HealthRegistry, engine: &AnalysisEngine, result: &AnalysisResult) {
    match &result.provider_error {
        Some(e) => health.set_degraded(components::PROVIDER, e.clone()).await,
        None => health.set_healthy(components::PROVIDER).await,
    }

    match engine.last_history_error() {
        Some(e) => health.set_degraded(components::HISTORY, e).await,
        None => health.set_healthy(components::HISTORY).await,
    }

    health.set_healthy(components::ENGINE).await;
    health.set_ready(true).await;
}
