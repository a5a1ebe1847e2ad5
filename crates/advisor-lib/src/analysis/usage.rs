//! Container usage analysis
//!
//! Reduces a snapshot to aggregate statistics and classifies containers as
//! high-memory, high-CPU, idle, or unreliable relative to their peers.

use crate::models::{ContainerRef, ContainerSnapshot};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Multiple of the running average above which usage is "high"
pub const HIGH_USAGE_FACTOR: f64 = 1.75;

/// Fraction of the running average below which a container is idle
pub const IDLE_FACTOR: f64 = 0.1;

/// Multiple of the average restart count that flags a container
pub const RESTART_FACTOR: f64 = 3.0;

/// Restart count a container must also exceed to be flagged
pub const RESTART_FLOOR: u32 = 3;

/// Whether the analysis saw any containers at all
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    Analyzed,
    NoContainers,
}

/// Class of improvable container issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpportunityKind {
    MemoryLimit,
    CpuLimit,
    IdleContainers,
    Reliability,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    #[serde(rename = "type")]
    pub kind: OpportunityKind,
    pub affected: Vec<ContainerRef>,
    pub description: String,
}

impl Opportunity {
    /// Display names of the affected containers
    pub fn names(&self) -> Vec<String> {
        self.affected.iter().map(|c| c.name.clone()).collect()
    }
}

/// Aggregate statistics and classified subsets for one snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageAnalysis {
    pub status: AnalysisStatus,
    pub total_containers: usize,
    pub running_containers: usize,
    pub stopped_containers: usize,
    /// Image family -> container count
    pub container_types: BTreeMap<String, usize>,
    /// Image family -> tags seen for that family
    pub image_tags: BTreeMap<String, BTreeSet<String>>,
    pub average_memory_usage: f64,
    pub average_cpu_usage: f64,
    pub high_memory_containers: Vec<ContainerRef>,
    pub high_cpu_containers: Vec<ContainerRef>,
    pub idle_containers: Vec<ContainerRef>,
    pub average_restart_count: f64,
    pub high_restart_containers: Vec<ContainerRef>,
    pub optimization_opportunities: Vec<Opportunity>,
}

impl UsageAnalysis {
    /// Zeroed result for an empty container list
    pub fn no_containers() -> Self {
        Self {
            status: AnalysisStatus::NoContainers,
            total_containers: 0,
            running_containers: 0,
            stopped_containers: 0,
            container_types: BTreeMap::new(),
            image_tags: BTreeMap::new(),
            average_memory_usage: 0.0,
            average_cpu_usage: 0.0,
            high_memory_containers: Vec::new(),
            high_cpu_containers: Vec::new(),
            idle_containers: Vec::new(),
            average_restart_count: 0.0,
            high_restart_containers: Vec::new(),
            optimization_opportunities: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.status == AnalysisStatus::NoContainers
    }

    /// True when no tag or family name of this family marks a lightweight variant
    pub fn lacks_lightweight_variant(&self, family: &str) -> bool {
        let is_light = |s: &str| s.contains("alpine") || s.contains("slim");
        if is_light(family) {
            return false;
        }
        !self
            .image_tags
            .get(family)
            .map(|tags| tags.iter().any(|t| is_light(t.as_str())))
            .unwrap_or(false)
    }
}

/// Classifies containers relative to the running average
#[derive(Debug, Clone)]
pub struct UsageAnalyzer {
    pub high_usage_factor: f64,
    pub idle_factor: f64,
    pub restart_factor: f64,
    pub restart_floor: u32,
}

impl Default for UsageAnalyzer {
    fn default() -> Self {
        Self {
            high_usage_factor: HIGH_USAGE_FACTOR,
            idle_factor: IDLE_FACTOR,
            restart_factor: RESTART_FACTOR,
            restart_floor: RESTART_FLOOR,
        }
    }
}

impl UsageAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn analyze(&self, containers: &[ContainerSnapshot]) -> UsageAnalysis {
        if containers.is_empty() {
            return UsageAnalysis::no_containers();
        }

        let running: Vec<&ContainerSnapshot> =
            containers.iter().filter(|c| c.status.is_running()).collect();
        let stopped = containers.iter().filter(|c| c.status.is_stopped()).count();

        let average_memory_usage = mean(running.iter().map(|c| c.memory_usage));
        let average_cpu_usage = mean(running.iter().map(|c| c.cpu_usage));

        let mut high_memory_containers = Vec::new();
        let mut high_cpu_containers = Vec::new();
        let mut idle_containers = Vec::new();

        for c in &running {
            if average_memory_usage > 0.0
                && c.memory_usage > average_memory_usage * self.high_usage_factor
            {
                high_memory_containers.push(c.reference());
            }
            if average_cpu_usage > 0.0 && c.cpu_usage > average_cpu_usage * self.high_usage_factor
            {
                high_cpu_containers.push(c.reference());
            }
            // A zero average on either axis means nothing is idle by this rule.
            if average_memory_usage > 0.0
                && average_cpu_usage > 0.0
                && c.memory_usage < average_memory_usage * self.idle_factor
                && c.cpu_usage < average_cpu_usage * self.idle_factor
            {
                idle_containers.push(c.reference());
            }
        }

        let average_restart_count = mean(containers.iter().map(|c| c.restart_count as f64));
        let high_restart_containers: Vec<ContainerRef> = containers
            .iter()
            .filter(|c| {
                c.restart_count as f64 > average_restart_count * self.restart_factor
                    && c.restart_count > self.restart_floor
            })
            .map(ContainerSnapshot::reference)
            .collect();

        let mut container_types = BTreeMap::new();
        let mut image_tags: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for c in containers {
            let family = c.image_family().to_string();
            *container_types.entry(family.clone()).or_insert(0) += 1;
            let tags = image_tags.entry(family).or_default();
            if let Some(tag) = c.image_tag() {
                tags.insert(tag.to_string());
            }
        }

        let optimization_opportunities = opportunities(
            &high_memory_containers,
            &high_cpu_containers,
            &idle_containers,
            &high_restart_containers,
        );

        UsageAnalysis {
            status: AnalysisStatus::Analyzed,
            total_containers: containers.len(),
            running_containers: running.len(),
            stopped_containers: stopped,
            container_types,
            image_tags,
            average_memory_usage,
            average_cpu_usage,
            high_memory_containers,
            high_cpu_containers,
            idle_containers,
            average_restart_count,
            high_restart_containers,
            optimization_opportunities,
        }
    }
}

fn opportunities(
    high_memory: &[ContainerRef],
    high_cpu: &[ContainerRef],
    idle: &[ContainerRef],
    high_restart: &[ContainerRef],
) -> Vec<Opportunity> {
    [
        (
            OpportunityKind::MemoryLimit,
            high_memory,
            "Set memory limits for high memory containers",
        ),
        (
            OpportunityKind::CpuLimit,
            high_cpu,
            "Set CPU quotas for high CPU usage containers",
        ),
        (
            OpportunityKind::IdleContainers,
            idle,
            "Consider removing or optimizing idle containers",
        ),
        (
            OpportunityKind::Reliability,
            high_restart,
            "Investigate containers with high restart counts",
        ),
    ]
    .into_iter()
    .filter(|(_, affected, _)| !affected.is_empty())
    .map(|(kind, affected, description)| Opportunity {
        kind,
        affected: affected.to_vec(),
        description: description.to_string(),
    })
    .collect()
}

/// Arithmetic mean, 0 for an empty set
fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContainerStatus;
    use chrono::{DateTime, Utc};

    fn container(name: &str, image: &str, status: &str, memory: f64, cpu: f64) -> ContainerSnapshot {
        ContainerSnapshot {
            id: format!("{name}-0123456789abcdef"),
            name: name.to_string(),
            image: image.to_string(),
            status: ContainerStatus::from(status),
            created: DateTime::<Utc>::UNIX_EPOCH,
            ports: Vec::new(),
            size: 0.0,
            memory_usage: memory,
            cpu_usage: cpu,
            restart_count: 0,
        }
    }

    fn with_restarts(mut c: ContainerSnapshot, restarts: u32) -> ContainerSnapshot {
        c.restart_count = restarts;
        c
    }

    fn names(refs: &[ContainerRef]) -> Vec<&str> {
        refs.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_empty_input_returns_sentinel() {
        let analysis = UsageAnalyzer::new().analyze(&[]);

        assert!(analysis.is_empty());
        assert_eq!(analysis.total_containers, 0);
        assert_eq!(analysis.running_containers, 0);
        assert_eq!(analysis.stopped_containers, 0);
        assert!(analysis.optimization_opportunities.is_empty());
    }

    #[test]
    fn test_partition_counts_exclude_other_statuses() {
        let containers = vec![
            container("a", "nginx", "running", 10.0, 1.0),
            container("b", "nginx", "exited", 0.0, 0.0),
            container("c", "nginx", "paused", 10.0, 1.0),
            container("d", "nginx", "restarting", 0.0, 0.0),
        ];
        let analysis = UsageAnalyzer::new().analyze(&containers);

        assert_eq!(analysis.total_containers, 4);
        assert_eq!(analysis.running_containers, 1);
        assert_eq!(analysis.stopped_containers, 1);
        assert!(analysis.running_containers + analysis.stopped_containers <= analysis.total_containers);
    }

    #[test]
    fn test_averages_use_running_containers_only() {
        let containers = vec![
            container("a", "nginx", "running", 100.0, 10.0),
            container("b", "nginx", "running", 300.0, 30.0),
            container("c", "nginx", "exited", 5000.0, 90.0),
        ];
        let analysis = UsageAnalyzer::new().analyze(&containers);

        assert_eq!(analysis.average_memory_usage, 200.0);
        assert_eq!(analysis.average_cpu_usage, 20.0);
    }

    #[test]
    fn test_high_memory_threshold_is_strict() {
        // avg = 100, threshold = 175 exactly
        let at_threshold = vec![
            container("a", "app", "running", 75.0, 5.0),
            container("b", "app", "running", 75.0, 5.0),
            container("c", "app", "running", 75.0, 5.0),
            container("d", "app", "running", 175.0, 5.0),
        ];
        let analysis = UsageAnalyzer::new().analyze(&at_threshold);
        assert_eq!(analysis.average_memory_usage, 100.0);
        assert!(analysis.high_memory_containers.is_empty());

        // avg = 100.25, threshold = 175.4375
        let above = vec![
            container("a", "app", "running", 75.0, 5.0),
            container("b", "app", "running", 75.0, 5.0),
            container("c", "app", "running", 75.0, 5.0),
            container("d", "app", "running", 176.0, 5.0),
        ];
        let analysis = UsageAnalyzer::new().analyze(&above);
        assert_eq!(names(&analysis.high_memory_containers), vec!["d"]);
        assert_eq!(
            analysis.optimization_opportunities[0].kind,
            OpportunityKind::MemoryLimit
        );
    }

    #[test]
    fn test_high_cpu_classification() {
        let containers = vec![
            container("a", "app", "running", 100.0, 2.0),
            container("b", "app", "running", 100.0, 2.0),
            container("c", "app", "running", 100.0, 2.0),
            container("hot", "app", "running", 100.0, 60.0),
        ];
        let analysis = UsageAnalyzer::new().analyze(&containers);

        assert_eq!(names(&analysis.high_cpu_containers), vec!["hot"]);
        assert!(analysis
            .optimization_opportunities
            .iter()
            .any(|o| o.kind == OpportunityKind::CpuLimit && o.names() == vec!["hot"]));
    }

    #[test]
    fn test_idle_requires_both_axes_below_tenth_of_average() {
        let containers = vec![
            container("busy1", "app", "running", 400.0, 40.0),
            container("busy2", "app", "running", 400.0, 40.0),
            container("idle", "app", "running", 1.0, 0.1),
            container("low-mem-only", "app", "running", 1.0, 30.0),
        ];
        let analysis = UsageAnalyzer::new().analyze(&containers);

        assert_eq!(names(&analysis.idle_containers), vec!["idle"]);
    }

    #[test]
    fn test_zero_cpu_average_never_flags_idle() {
        // Every running container reports zero CPU, so the idle rule cannot fire.
        let containers = vec![
            container("a", "app", "running", 400.0, 0.0),
            container("b", "app", "running", 1.0, 0.0),
            container("c", "app", "running", 1.0, 0.0),
        ];
        let analysis = UsageAnalyzer::new().analyze(&containers);

        assert_eq!(analysis.average_cpu_usage, 0.0);
        assert!(analysis.idle_containers.is_empty());
        assert!(analysis.high_cpu_containers.is_empty());
    }

    #[test]
    fn test_high_restart_needs_both_conditions() {
        let containers = vec![
            with_restarts(container("a", "app", "running", 10.0, 1.0), 0),
            with_restarts(container("b", "app", "running", 10.0, 1.0), 0),
            with_restarts(container("c", "app", "running", 10.0, 1.0), 0),
            with_restarts(container("d", "app", "running", 10.0, 1.0), 0),
            with_restarts(container("flappy", "app", "exited", 0.0, 0.0), 12),
        ];
        let analysis = UsageAnalyzer::new().analyze(&containers);
        assert_eq!(analysis.average_restart_count, 2.4);
        assert_eq!(names(&analysis.high_restart_containers), vec!["flappy"]);

        // 3 restarts exceeds 3x a 0.6 average but not the floor of 3
        let low = vec![
            with_restarts(container("a", "app", "running", 10.0, 1.0), 0),
            with_restarts(container("b", "app", "running", 10.0, 1.0), 0),
            with_restarts(container("c", "app", "running", 10.0, 1.0), 0),
            with_restarts(container("d", "app", "running", 10.0, 1.0), 0),
            with_restarts(container("e", "app", "running", 10.0, 1.0), 3),
        ];
        let analysis = UsageAnalyzer::new().analyze(&low);
        assert!(analysis.high_restart_containers.is_empty());
    }

    #[test]
    fn test_container_types_group_by_family() {
        let containers = vec![
            container("a", "nginx:latest", "running", 10.0, 1.0),
            container("b", "nginx:1.25-alpine", "running", 10.0, 1.0),
            container("c", "redis", "exited", 0.0, 0.0),
        ];
        let analysis = UsageAnalyzer::new().analyze(&containers);

        assert_eq!(analysis.container_types.get("nginx"), Some(&2));
        assert_eq!(analysis.container_types.get("redis"), Some(&1));
        assert!(!analysis.lacks_lightweight_variant("nginx"));
        assert!(analysis.lacks_lightweight_variant("redis"));
    }

    #[test]
    fn test_opportunity_order_is_stable() {
        let containers = vec![
            container("a", "app", "running", 100.0, 2.0),
            container("b", "app", "running", 100.0, 2.0),
            container("c", "app", "running", 100.0, 2.0),
            container("d", "app", "running", 100.0, 2.0),
            container("big", "app", "running", 900.0, 60.0),
        ];
        let analysis = UsageAnalyzer::new().analyze(&containers);

        let kinds: Vec<_> = analysis
            .optimization_opportunities
            .iter()
            .map(|o| o.kind)
            .collect();
        assert_eq!(kinds, vec![OpportunityKind::MemoryLimit, OpportunityKind::CpuLimit]);
    }
}
