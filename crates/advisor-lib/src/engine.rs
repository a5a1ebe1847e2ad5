//! Analysis engine
//!
//! Runs the full pipeline (capture, normalize, analyze, select profile, match
//! templates, generate recommendations) and memoizes the result in a single
//! time-boxed slot. The cache slot and the history store live behind one
//! mutex, so concurrent callers are serialized for the whole
//! check-compute-record cycle.

use crate::analysis::{
    catalog, match_templates, recommend_resources, ContainerTemplate, HealthSummary,
    HostThresholds, Priority, Recommendation, RecommendationGenerator, RecommendationKind,
    ResourceRecommendation, TemplateMatch, UsageAnalysis, UsageAnalyzer,
};
use crate::clock::{Clock, SystemClock};
use crate::history::{
    default_data_dir, ContainerHistoryEntry, HistoryBackend, HistoryLog, HistoryStore,
    JsonFileBackend, SystemMetricsEntry, DEFAULT_HISTORY_LIMIT,
};
use crate::models::{HostSnapshot, Snapshot};
use crate::normalize::{normalize, NormalizationReport, RawSnapshot};
use crate::observability::{EngineMetrics, StructuredLogger};
use crate::provider::SnapshotProvider;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// How long a computed result is served before recomputing
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub cache_ttl: Duration,
    /// Entries kept per history list
    pub history_limit: usize,
    /// Where the default JSON history backend writes
    pub data_dir: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_ttl: DEFAULT_CACHE_TTL,
            history_limit: DEFAULT_HISTORY_LIMIT,
            data_dir: default_data_dir(),
        }
    }
}

/// Container and host halves of an analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSection {
    pub container_analysis: UsageAnalysis,
    pub system_metrics: HostSnapshot,
}

/// Everything one analysis pass produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub timestamp: DateTime<Utc>,
    pub analysis: AnalysisSection,
    pub recommendations: Vec<Recommendation>,
    pub resource_recommendation: ResourceRecommendation,
    pub matched_templates: Vec<TemplateMatch>,
    pub container_templates: Vec<ContainerTemplate>,
    pub health: HealthSummary,
    pub normalization: NormalizationReport,
    /// Set when the snapshot could not be captured and an empty one was analyzed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_error: Option<String>,
}

impl AnalysisResult {
    /// Recommendations filtered by priority and/or type, in generated order
    pub fn recommendations_matching(
        &self,
        priority: Option<Priority>,
        kind: Option<RecommendationKind>,
    ) -> Vec<&Recommendation> {
        self.recommendations
            .iter()
            .filter(|r| priority.map_or(true, |p| r.priority == p))
            .filter(|r| kind.map_or(true, |k| r.kind == k))
            .collect()
    }

    /// Seconds since this result was computed
    pub fn age_secs(&self, now: DateTime<Utc>) -> i64 {
        (now - self.timestamp).num_seconds()
    }
}

struct EngineState {
    cached: Option<Arc<AnalysisResult>>,
    history: HistoryStore,
    last_history_error: Option<String>,
}

pub struct AnalysisEngine {
    provider: Box<dyn SnapshotProvider>,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
    analyzer: UsageAnalyzer,
    generator: RecommendationGenerator,
    metrics: EngineMetrics,
    logger: StructuredLogger,
    state: Mutex<EngineState>,
}

pub struct AnalysisEngineBuilder {
    provider: Box<dyn SnapshotProvider>,
    clock: Option<Arc<dyn Clock>>,
    history_backend: Option<Box<dyn HistoryBackend>>,
    config: EngineConfig,
    analyzer: UsageAnalyzer,
    thresholds: HostThresholds,
    host_name: String,
}

impl AnalysisEngineBuilder {
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn history_backend(mut self, backend: impl HistoryBackend + 'static) -> Self {
        self.history_backend = Some(Box::new(backend));
        self
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn analyzer(mut self, analyzer: UsageAnalyzer) -> Self {
        self.analyzer = analyzer;
        self
    }

    pub fn thresholds(mut self, thresholds: HostThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Name attached to structured log events
    pub fn host_name(mut self, host_name: impl Into<String>) -> Self {
        self.host_name = host_name.into();
        self
    }

    pub fn build(self) -> AnalysisEngine {
        let backend = self
            .history_backend
            .unwrap_or_else(|| Box::new(JsonFileBackend::new(self.config.data_dir.clone())));
        let history = HistoryStore::open(backend, self.config.history_limit);

        AnalysisEngine {
            provider: self.provider,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            config: self.config,
            analyzer: self.analyzer,
            generator: RecommendationGenerator::with_thresholds(self.thresholds),
            metrics: EngineMetrics::new(),
            logger: StructuredLogger::new(self.host_name),
            state: Mutex::new(EngineState {
                cached: None,
                history,
                last_history_error: None,
            }),
        }
    }
}

impl AnalysisEngine {
    pub fn builder(provider: Box<dyn SnapshotProvider>) -> AnalysisEngineBuilder {
        AnalysisEngineBuilder {
            provider,
            clock: None,
            history_backend: None,
            config: EngineConfig::default(),
            analyzer: UsageAnalyzer::default(),
            thresholds: HostThresholds::default(),
            host_name: "localhost".to_string(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn logger(&self) -> &StructuredLogger {
        &self.logger
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Cached result if still fresh, otherwise a new one
    pub fn get_or_compute(&self) -> Arc<AnalysisResult> {
        self.get_or_compute_at(self.clock.now())
    }

    pub fn get_or_compute_at(&self, now: DateTime<Utc>) -> Arc<AnalysisResult> {
        let mut state = self.lock();

        if let Some(cached) = &state.cached {
            let age = now.signed_duration_since(cached.timestamp);
            if age.num_milliseconds() < self.config.cache_ttl.as_millis() as i64 {
                self.metrics.inc_cache_hits();
                self.logger.log_cache_hit(age.num_seconds());
                return Arc::clone(cached);
            }
        }

        self.compute(&mut state, now)
    }

    /// Recompute now regardless of cache age
    pub fn refresh(&self) -> Arc<AnalysisResult> {
        let now = self.clock.now();
        let mut state = self.lock();
        self.compute(&mut state, now)
    }

    pub fn cached(&self) -> Option<Arc<AnalysisResult>> {
        self.lock().cached.clone()
    }

    pub fn history(&self) -> HistoryLog {
        self.lock().history.load()
    }

    /// Error from the most recent history save, if it failed
    pub fn last_history_error(&self) -> Option<String> {
        self.lock().last_history_error.clone()
    }

    /// Drop the cached result so the next call recomputes
    pub fn invalidate(&self) {
        self.lock().cached = None;
    }

    /// Run the pure pipeline over an already-normalized snapshot
    pub fn analyze_snapshot(
        &self,
        snapshot: &Snapshot,
        normalization: NormalizationReport,
        now: DateTime<Utc>,
    ) -> AnalysisResult {
        let usage = self.analyzer.analyze(&snapshot.containers);
        let resources = recommend_resources(&usage, &snapshot.host);
        let matches = match_templates(&usage.container_types, usage.total_containers);
        let recommendations = self
            .generator
            .generate(&usage, &snapshot.host, &resources, &matches);
        let health = HealthSummary::from_recommendations(&recommendations);

        AnalysisResult {
            timestamp: now,
            analysis: AnalysisSection {
                container_analysis: usage,
                system_metrics: snapshot.host.clone(),
            },
            recommendations,
            resource_recommendation: resources,
            matched_templates: matches,
            container_templates: catalog(),
            health,
            normalization,
            provider_error: None,
        }
    }

    fn lock(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn compute(&self, state: &mut EngineState, now: DateTime<Utc>) -> Arc<AnalysisResult> {
        let started = Instant::now();

        let (raw, provider_error) = match self.provider.capture() {
            Ok(raw) => (raw, None),
            Err(e) => {
                let message = format!("{e:#}");
                self.metrics.inc_provider_errors();
                self.logger.log_provider_failure(self.provider.name(), &message);
                (RawSnapshot::default(), Some(message))
            }
        };

        let (snapshot, report) = normalize(raw);
        self.metrics.add_fields_defaulted(report.defaulted_count());
        self.logger
            .log_defaulted_fields(report.defaulted_count(), report.clamped_count());

        let mut result = self.analyze_snapshot(&snapshot, report, now);
        result.provider_error = provider_error;

        self.record_history(state, &result);

        let elapsed = started.elapsed();
        let usage = &result.analysis.container_analysis;
        self.metrics.observe_analysis_latency(elapsed.as_secs_f64());
        self.metrics.set_current(
            usage.total_containers,
            result.recommendations.len(),
            result.health.status,
        );
        self.logger.log_analysis(
            usage.total_containers,
            result.recommendations.len(),
            result.resource_recommendation.resource_profile,
            result.health.status,
            elapsed.as_secs_f64() * 1000.0,
        );

        let result = Arc::new(result);
        state.cached = Some(Arc::clone(&result));
        result
    }

    fn record_history(&self, state: &mut EngineState, result: &AnalysisResult) {
        let usage = &result.analysis.container_analysis;
        let host = &result.analysis.system_metrics;

        state.history.append_containers(ContainerHistoryEntry {
            timestamp: result.timestamp,
            container_count: usage.total_containers,
            running_count: usage.running_containers,
        });
        state.history.append_system_metrics(SystemMetricsEntry {
            timestamp: result.timestamp,
            cpu_usage: host.cpu_usage,
            memory_usage: host.memory_usage,
            disk_usage: host.disk_usage,
        });

        match state.history.save() {
            Ok(()) => {
                state.last_history_error = None;
                self.logger.log_history_saved(true, None);
            }
            Err(e) => {
                let message = e.to_string();
                self.metrics.inc_history_save_errors();
                self.logger.log_history_saved(false, Some(&message));
                state.last_history_error = Some(message);
            }
        }
    }
}
