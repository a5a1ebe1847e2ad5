//! Resource telemetry analysis and recommendation engine
//!
//! This crate provides the core functionality for:
//! - Snapshot capture and normalization of container and host records
//! - Rule-based usage analysis and resource profile selection
//! - Template matching and prioritized recommendations
//! - A time-boxed analysis cache with bounded, persisted history
//! - Health checks and observability

pub mod analysis;
pub mod clock;
pub mod engine;
pub mod error;
pub mod health;
pub mod history;
pub mod models;
pub mod normalize;
pub mod observability;
pub mod provider;

pub use analysis::{
    HealthStatus, HealthSummary, Priority, Recommendation, RecommendationKind, ResourceProfile,
    TemplateKind,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{AnalysisEngine, AnalysisResult, AnalysisSection, EngineConfig};
pub use error::{HistoryError, ProviderError};
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use history::{HistoryLog, HistoryTrend, JsonFileBackend, MemoryBackend};
pub use models::*;
pub use observability::{EngineMetrics, StructuredLogger};
pub use provider::{FileProvider, SimulatedProvider, SnapshotProvider, StaticProvider};
