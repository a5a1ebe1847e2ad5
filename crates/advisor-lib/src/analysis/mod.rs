//! Deterministic rule-based analysis pipeline
//!
//! usage -> {profile, templates} -> recommend -> report

pub mod profile;
pub mod recommend;
pub mod report;
pub mod templates;
pub mod usage;

pub use profile::{
    format_memory_mb, recommend_resources, select_profile, ProfileFigures, ResourceProfile,
    ResourceRecommendation, SystemMetricsSummary,
};
pub use recommend::{
    Category, HostThresholds, Priority, Recommendation, RecommendationGenerator,
    RecommendationKind,
};
pub use report::{HealthStatus, HealthSummary};
pub use templates::{catalog, match_templates, ContainerTemplate, TemplateKind, TemplateMatch};
pub use usage::{AnalysisStatus, Opportunity, OpportunityKind, UsageAnalysis, UsageAnalyzer};
