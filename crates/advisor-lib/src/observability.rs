//! Observability for the analysis engine
//!
//! Provides:
//! - Prometheus metrics (analysis latency, cache hits, provider/history failures, current health)
//! - Structured logging of engine events with tracing

use crate::analysis::{HealthStatus, ResourceProfile};
use prometheus::{
    register_histogram, register_int_counter, register_int_gauge, Histogram, IntCounter, IntGauge,
};
use std::sync::OnceLock;
use tracing::{debug, info, warn};

/// Histogram buckets for a full analysis pass (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5,
];

/// Registered once per process
static GLOBAL_METRICS: OnceLock<EngineMetricsInner> = OnceLock::new();

struct EngineMetricsInner {
    analysis_latency_seconds: Histogram,
    analyses_total: IntCounter,
    cache_hits_total: IntCounter,
    provider_errors_total: IntCounter,
    history_save_errors_total: IntCounter,
    fields_defaulted_total: IntCounter,
    containers_analyzed: IntGauge,
    recommendations_current: IntGauge,
    health_status: IntGauge,
}

impl EngineMetricsInner {
    fn new() -> Self {
        Self {
            analysis_latency_seconds: register_histogram!(
                "dockwise_analysis_latency_seconds",
                "Time spent running a full analysis pass",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register analysis_latency_seconds"),

            analyses_total: register_int_counter!(
                "dockwise_analyses_total",
                "Analyses computed (cache misses and forced refreshes)"
            )
            .expect("Failed to register analyses_total"),

            cache_hits_total: register_int_counter!(
                "dockwise_cache_hits_total",
                "Requests served from the cached analysis"
            )
            .expect("Failed to register cache_hits_total"),

            provider_errors_total: register_int_counter!(
                "dockwise_provider_errors_total",
                "Snapshot captures that failed"
            )
            .expect("Failed to register provider_errors_total"),

            history_save_errors_total: register_int_counter!(
                "dockwise_history_save_errors_total",
                "History persistence failures"
            )
            .expect("Failed to register history_save_errors_total"),

            fields_defaulted_total: register_int_counter!(
                "dockwise_fields_defaulted_total",
                "Snapshot fields that were missing and replaced with defaults"
            )
            .expect("Failed to register fields_defaulted_total"),

            containers_analyzed: register_int_gauge!(
                "dockwise_containers_analyzed",
                "Containers in the most recent analysis"
            )
            .expect("Failed to register containers_analyzed"),

            recommendations_current: register_int_gauge!(
                "dockwise_recommendations_current",
                "Recommendations in the most recent analysis"
            )
            .expect("Failed to register recommendations_current"),

            health_status: register_int_gauge!(
                "dockwise_health_status",
                "Rolled-up health of the most recent analysis (0 excellent, 3 critical)"
            )
            .expect("Failed to register health_status"),
        }
    }
}

/// Handle to the process-wide engine metrics. Clones share the same metrics.
#[derive(Clone)]
pub struct EngineMetrics {
    _private: (),
}

impl Default for EngineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(EngineMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &EngineMetricsInner {
        GLOBAL_METRICS.get_or_init(EngineMetricsInner::new)
    }

    pub fn observe_analysis_latency(&self, duration_secs: f64) {
        self.inner().analysis_latency_seconds.observe(duration_secs);
        self.inner().analyses_total.inc();
    }

    pub fn inc_cache_hits(&self) {
        self.inner().cache_hits_total.inc();
    }

    pub fn inc_provider_errors(&self) {
        self.inner().provider_errors_total.inc();
    }

    pub fn inc_history_save_errors(&self) {
        self.inner().history_save_errors_total.inc();
    }

    pub fn add_fields_defaulted(&self, count: usize) {
        self.inner().fields_defaulted_total.inc_by(count as u64);
    }

    /// Gauges describing the latest result
    pub fn set_current(&self, containers: usize, recommendations: usize, health: HealthStatus) {
        let inner = self.inner();
        inner.containers_analyzed.set(containers as i64);
        inner.recommendations_current.set(recommendations as i64);
        inner.health_status.set(health.level());
    }
}

/// Structured logger for engine events
#[derive(Clone)]
pub struct StructuredLogger {
    host_name: String,
}

impl StructuredLogger {
    pub fn new(host_name: impl Into<String>) -> Self {
        Self {
            host_name: host_name.into(),
        }
    }

    pub fn log_startup(&self, version: &str, provider: &str) {
        info!(
            event = "engine_started",
            host = %self.host_name,
            version = %version,
            provider = %provider,
            "Analysis engine started"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "engine_shutdown",
            host = %self.host_name,
            reason = %reason,
            "Analysis engine shutting down"
        );
    }

    pub fn log_analysis(
        &self,
        containers: usize,
        recommendations: usize,
        profile: ResourceProfile,
        health: HealthStatus,
        elapsed_ms: f64,
    ) {
        info!(
            event = "analysis_completed",
            host = %self.host_name,
            containers = containers,
            recommendations = recommendations,
            profile = %profile,
            health = %health,
            elapsed_ms = elapsed_ms,
            "Analysis completed"
        );
    }

    pub fn log_cache_hit(&self, age_secs: i64) {
        debug!(
            event = "analysis_cache_hit",
            host = %self.host_name,
            age_secs = age_secs,
            "Serving cached analysis"
        );
    }

    pub fn log_provider_failure(&self, provider: &str, error: &str) {
        warn!(
            event = "provider_failed",
            host = %self.host_name,
            provider = %provider,
            error = %error,
            "Snapshot capture failed, analyzing an empty snapshot"
        );
    }

    pub fn log_defaulted_fields(&self, defaulted: usize, clamped: usize) {
        if defaulted + clamped == 0 {
            return;
        }
        debug!(
            event = "snapshot_normalized",
            host = %self.host_name,
            defaulted = defaulted,
            clamped = clamped,
            "Snapshot fields defaulted or clamped"
        );
    }

    pub fn log_history_saved(&self, saved: bool, error: Option<&str>) {
        if saved {
            debug!(event = "history_saved", host = %self.host_name, "History persisted");
        } else {
            warn!(
                event = "history_save_failed",
                host = %self.host_name,
                error = ?error,
                "Failed to persist history, keeping it in memory"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_metrics_registration_is_shared() {
        let metrics = EngineMetrics::new();
        let other = EngineMetrics::new();

        metrics.observe_analysis_latency(0.002);
        metrics.inc_cache_hits();
        metrics.add_fields_defaulted(3);
        other.set_current(4, 7, HealthStatus::Warning);

        let names: Vec<String> = prometheus::gather()
            .iter()
            .map(|family| family.get_name().to_string())
            .collect();
        assert!(names.iter().any(|n| n == "dockwise_health_status"));
        assert!(names.iter().any(|n| n == "dockwise_cache_hits_total"));
    }

    #[test]
    fn test_structured_logger_creation() {
        let logger = StructuredLogger::new("test-host");
        assert_eq!(logger.host_name, "test-host");
    }
}
