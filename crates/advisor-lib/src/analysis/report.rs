//! Aggregate health status derived from a recommendation list

use super::recommend::{Priority, Recommendation, RecommendationKind};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Excellent,
    Good,
    Warning,
    Critical,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Excellent => "excellent",
            HealthStatus::Good => "good",
            HealthStatus::Warning => "warning",
            HealthStatus::Critical => "critical",
        }
    }

    /// Severity level exported as a gauge (0 excellent .. 3 critical)
    pub fn level(&self) -> i64 {
        match self {
            HealthStatus::Excellent => 0,
            HealthStatus::Good => 1,
            HealthStatus::Warning => 2,
            HealthStatus::Critical => 3,
        }
    }

    pub fn from_counts(issues: usize, high_priority: usize) -> Self {
        match issues {
            0 => HealthStatus::Excellent,
            n if n <= 2 && high_priority == 0 => HealthStatus::Good,
            n if n <= 4 => HealthStatus::Warning,
            _ => HealthStatus::Critical,
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthSummary {
    pub status: HealthStatus,
    pub issues_count: usize,
    pub high_priority_count: usize,
}

impl HealthSummary {
    /// Roll up a recommendation list. The template bundle is a suggestion,
    /// not an issue, and is not counted.
    pub fn from_recommendations(recommendations: &[Recommendation]) -> Self {
        let issues: Vec<&Recommendation> = recommendations
            .iter()
            .filter(|r| r.kind != RecommendationKind::Templates)
            .collect();
        let high_priority_count = issues.iter().filter(|r| r.priority == Priority::High).count();

        Self {
            status: HealthStatus::from_counts(issues.len(), high_priority_count),
            issues_count: issues.len(),
            high_priority_count,
        }
    }
}
