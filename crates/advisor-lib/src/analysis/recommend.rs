//! Recommendation generation
//!
//! Produces an ordered, typed list of recommendations: host-level checks
//! first, then one entry per optimization opportunity, then image, network
//! and orchestration heuristics, and finally a bundled template suggestion.

use super::profile::ResourceRecommendation;
use super::templates::TemplateMatch;
use super::usage::{Opportunity, OpportunityKind, UsageAnalysis};
use crate::models::HostSnapshot;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a recommendation applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    System,
    Container,
    Image,
    Network,
    Management,
    Templates,
}

impl RecommendationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationKind::System => "system",
            RecommendationKind::Container => "container",
            RecommendationKind::Image => "image",
            RecommendationKind::Network => "network",
            RecommendationKind::Management => "management",
            RecommendationKind::Templates => "templates",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        [
            RecommendationKind::System,
            RecommendationKind::Container,
            RecommendationKind::Image,
            RecommendationKind::Network,
            RecommendationKind::Management,
            RecommendationKind::Templates,
        ]
        .into_iter()
        .find(|k| k.as_str().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for RecommendationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Memory,
    Cpu,
    Disk,
    ResourceManagement,
    ResourceEfficiency,
    Reliability,
    Optimization,
    Organization,
    Orchestration,
    BestPractices,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Memory => "memory",
            Category::Cpu => "cpu",
            Category::Disk => "disk",
            Category::ResourceManagement => "resource_management",
            Category::ResourceEfficiency => "resource_efficiency",
            Category::Reliability => "reliability",
            Category::Optimization => "optimization",
            Category::Organization => "organization",
            Category::Orchestration => "orchestration",
            Category::BestPractices => "best_practices",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: RecommendationKind,
    pub category: Category,
    pub priority: Priority,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<String>,
    /// Container names, for display
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub affected_containers: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub templates: Vec<TemplateMatch>,
}

impl Recommendation {
    fn new(
        kind: RecommendationKind,
        category: Category,
        priority: Priority,
        title: &str,
        description: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            category,
            priority,
            title: title.to_string(),
            description: description.into(),
            actions: Vec::new(),
            affected_containers: Vec::new(),
            templates: Vec::new(),
        }
    }

    fn with_actions<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.actions = actions.into_iter().map(Into::into).collect();
        self
    }

    fn affecting(mut self, opportunity: &Opportunity) -> Self {
        self.affected_containers = opportunity.names();
        self
    }
}

/// Host-level and inventory thresholds
#[derive(Debug, Clone)]
pub struct HostThresholds {
    pub memory_percent: f64,
    pub cpu_percent: f64,
    pub disk_percent: f64,
    /// Containers above which custom networks are suggested
    pub network_containers: usize,
    /// Containers above which compose orchestration is suggested
    pub compose_containers: usize,
}

impl Default for HostThresholds {
    fn default() -> Self {
        Self {
            memory_percent: 80.0,
            cpu_percent: 80.0,
            disk_percent: 85.0,
            network_containers: 2,
            compose_containers: 3,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecommendationGenerator {
    pub thresholds: HostThresholds,
}

impl RecommendationGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_thresholds(thresholds: HostThresholds) -> Self {
        Self { thresholds }
    }

    pub fn generate(
        &self,
        usage: &UsageAnalysis,
        host: &HostSnapshot,
        resources: &ResourceRecommendation,
        matches: &[TemplateMatch],
    ) -> Vec<Recommendation> {
        let mut recommendations = self.host_checks(host);

        recommendations.extend(
            usage
                .optimization_opportunities
                .iter()
                .map(|o| opportunity_recommendation(o, resources)),
        );

        for family in usage.container_types.keys() {
            if usage.lacks_lightweight_variant(family) {
                recommendations.push(lightweight_image(family));
            }
        }

        if usage.total_containers > self.thresholds.network_containers {
            recommendations.push(
                Recommendation::new(
                    RecommendationKind::Network,
                    Category::Organization,
                    Priority::Medium,
                    "Use Custom Networks",
                    "Create custom bridge networks for container groups to improve isolation and security",
                )
                .with_actions([
                    "Create networks with 'docker network create'",
                    "Group related containers on the same network",
                    "Use network aliases for service discovery",
                ]),
            );
        }

        if usage.total_containers > self.thresholds.compose_containers {
            recommendations.push(
                Recommendation::new(
                    RecommendationKind::Management,
                    Category::Orchestration,
                    Priority::High,
                    "Use Docker Compose",
                    "Consider using Docker Compose to manage your multi-container application",
                )
                .with_actions([
                    "Create a docker-compose.yml file",
                    "Define all services, networks, and volumes",
                    "Use 'docker-compose up' to start all services together",
                ]),
            );
        }

        if !matches.is_empty() {
            let mut bundle = Recommendation::new(
                RecommendationKind::Templates,
                Category::BestPractices,
                Priority::Medium,
                "Recommended Container Templates",
                "Consider using these pre-configured templates for your container workloads",
            );
            bundle.templates = matches.to_vec();
            recommendations.push(bundle);
        }

        recommendations
    }

    fn host_checks(&self, host: &HostSnapshot) -> Vec<Recommendation> {
        let t = &self.thresholds;
        let mut out = Vec::new();

        if host.memory_usage > t.memory_percent {
            out.push(
                Recommendation::new(
                    RecommendationKind::System,
                    Category::Memory,
                    Priority::High,
                    "High Memory Usage",
                    format!(
                        "System memory usage is over {:.0}%. Consider adding more memory or reducing container memory limits.",
                        t.memory_percent
                    ),
                )
                .with_actions([
                    "Add more system memory",
                    "Review and reduce memory limits for containers",
                    "Stop unnecessary containers",
                ]),
            );
        }

        if host.cpu_usage > t.cpu_percent {
            out.push(
                Recommendation::new(
                    RecommendationKind::System,
                    Category::Cpu,
                    Priority::High,
                    "High CPU Usage",
                    format!(
                        "System CPU usage is over {:.0}%. Consider adding more CPU resources or optimizing container CPU usage.",
                        t.cpu_percent
                    ),
                )
                .with_actions([
                    "Add more CPU resources",
                    "Set CPU quotas for high-usage containers",
                    "Optimize applications for better CPU efficiency",
                ]),
            );
        }

        if host.disk_usage > t.disk_percent {
            out.push(
                Recommendation::new(
                    RecommendationKind::System,
                    Category::Disk,
                    Priority::High,
                    "Disk Space Running Low",
                    format!(
                        "Disk usage is over {:.0}%. Consider cleaning up unused images and volumes or adding more storage.",
                        t.disk_percent
                    ),
                )
                .with_actions([
                    "Run 'docker system prune' to remove unused data",
                    "Remove unused images with 'docker image prune'",
                    "Clean up unused volumes",
                    "Add more storage space",
                ]),
            );
        }

        out
    }
}

fn opportunity_recommendation(
    opportunity: &Opportunity,
    resources: &ResourceRecommendation,
) -> Recommendation {
    let names = opportunity.names().join(", ");

    let recommendation = match opportunity.kind {
        OpportunityKind::MemoryLimit => Recommendation::new(
            RecommendationKind::Container,
            Category::ResourceManagement,
            Priority::Medium,
            "Memory Limit Optimization",
            format!("Set appropriate memory limits for high memory containers: {names}"),
        )
        .with_actions([
            "Set memory limits in container configuration".to_string(),
            format!(
                "Use --memory={} --memory-reservation={} when running containers",
                resources.recommended_memory, resources.recommended_memory_reservation
            ),
            "Monitor memory usage patterns".to_string(),
        ]),
        OpportunityKind::CpuLimit => Recommendation::new(
            RecommendationKind::Container,
            Category::ResourceManagement,
            Priority::Medium,
            "CPU Quota Optimization",
            format!("Set CPU quotas for high CPU usage containers: {names}"),
        )
        .with_actions([
            "Set CPU limits in container configuration".to_string(),
            format!("Use --cpus={} when running containers", resources.recommended_cpu),
            "Profile CPU-heavy code paths".to_string(),
        ]),
        OpportunityKind::IdleContainers => Recommendation::new(
            RecommendationKind::Container,
            Category::ResourceEfficiency,
            Priority::Low,
            "Idle Container Optimization",
            format!("Optimize or remove idle containers: {names}"),
        )
        .with_actions([
            "Stop containers when not in use",
            "Consider using container orchestration for auto-scaling",
            "Reduce resource allocation for underutilized containers",
        ]),
        OpportunityKind::Reliability => Recommendation::new(
            RecommendationKind::Container,
            Category::Reliability,
            Priority::High,
            "Container Reliability Issues",
            format!("Investigate containers with high restart counts: {names}"),
        )
        .with_actions([
            "Review container logs for error patterns",
            "Check for resource constraints causing crashes",
            "Consider implementing healthchecks",
            "Adjust restart policies",
        ]),
    };
    recommendation.affecting(opportunity)
}

fn lightweight_image(family: &str) -> Recommendation {
    Recommendation::new(
        RecommendationKind::Image,
        Category::Optimization,
        Priority::Medium,
        "Use Lightweight Images",
        format!(
            "Consider using Alpine or slim variants for {family} images to reduce size and improve performance"
        ),
    )
    .with_actions([
        format!("Replace '{family}' with '{family}:alpine' or '{family}:slim'"),
        "Rebuild containers with optimized images".to_string(),
        "Create custom Dockerfiles with minimal dependencies".to_string(),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::profile::recommend_resources;
    use crate::analysis::templates::match_templates;
    use crate::analysis::usage::UsageAnalyzer;
    use crate::models::{ContainerSnapshot, ContainerStatus};
    use chrono::{DateTime, Utc};

    fn container(name: &str, image: &str, memory: f64, cpu: f64, restarts: u32) -> ContainerSnapshot {
        ContainerSnapshot {
            id: format!("{name}-0123456789abcdef"),
            name: name.to_string(),
            image: image.to_string(),
            status: ContainerStatus::Running,
            created: DateTime::<Utc>::UNIX_EPOCH,
            ports: Vec::new(),
            size: 0.0,
            memory_usage: memory,
            cpu_usage: cpu,
            restart_count: restarts,
        }
    }

    fn run(containers: &[ContainerSnapshot], host: &HostSnapshot) -> Vec<Recommendation> {
        let usage = UsageAnalyzer::new().analyze(containers);
        let resources = recommend_resources(&usage, host);
        let matches = match_templates(&usage.container_types, usage.total_containers);
        RecommendationGenerator::new().generate(&usage, host, &resources, &matches)
    }

    fn calm_host() -> HostSnapshot {
        HostSnapshot {
            cpu_usage: 40.0,
            memory_usage: 40.0,
            disk_usage: 40.0,
            total_memory: 16_384.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_host_thresholds_fire_independently() {
        let host = HostSnapshot {
            cpu_usage: 81.0,
            memory_usage: 90.0,
            disk_usage: 86.0,
            ..Default::default()
        };
        let recs = run(&[], &host);

        let titles: Vec<_> = recs.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["High Memory Usage", "High CPU Usage", "Disk Space Running Low"]
        );
        assert!(recs.iter().all(|r| r.priority == Priority::High));
    }

    #[test]
    fn test_thresholds_are_strict() {
        let host = HostSnapshot {
            cpu_usage: 80.0,
            memory_usage: 80.0,
            disk_usage: 85.0,
            ..Default::default()
        };
        assert!(run(&[], &host).is_empty());
    }

    #[test]
    fn test_reliability_recommendation_lists_names() {
        let containers = vec![
            container("a", "nginx:alpine", 10.0, 1.0, 0),
            container("b", "nginx:alpine", 10.0, 1.0, 0),
            container("c", "nginx:alpine", 10.0, 1.0, 0),
            container("d", "nginx:alpine", 10.0, 1.0, 0),
            container("flappy", "nginx:alpine", 10.0, 1.0, 12),
        ];
        let recs = run(&containers, &calm_host());

        let reliability = recs
            .iter()
            .find(|r| r.category == Category::Reliability)
            .expect("reliability recommendation");
        assert_eq!(reliability.priority, Priority::High);
        assert_eq!(reliability.affected_containers, vec!["flappy"]);
        assert!(reliability.description.ends_with("flappy"));
    }

    #[test]
    fn test_memory_limit_action_carries_profile_figures() {
        let containers = vec![
            container("a", "redis:alpine", 75.0, 5.0, 0),
            container("b", "redis:alpine", 75.0, 5.0, 0),
            container("c", "redis:alpine", 75.0, 5.0, 0),
            container("big", "redis:alpine", 900.0, 5.0, 0),
        ];
        let recs = run(&containers, &calm_host());

        let memory = recs
            .iter()
            .find(|r| r.title == "Memory Limit Optimization")
            .expect("memory recommendation");
        // Balanced host with a memory hotspot upgrades to memory-optimized
        assert!(memory.actions[1].contains("--memory=2g"));
        assert!(memory.actions[1].contains("--memory-reservation=1g"));
    }

    #[test]
    fn test_inventory_heuristics_and_ordering() {
        let containers = vec![
            container("web", "nginx:latest", 50.0, 5.0, 0),
            container("db", "postgres:13", 50.0, 5.0, 0),
            container("cache", "redis:alpine", 50.0, 5.0, 0),
            container("api", "node:16", 50.0, 5.0, 0),
        ];
        let recs = run(&containers, &calm_host());

        let kinds: Vec<_> = recs.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![
                RecommendationKind::Image,
                RecommendationKind::Image,
                RecommendationKind::Image,
                RecommendationKind::Network,
                RecommendationKind::Management,
                RecommendationKind::Templates,
            ]
        );
        // BTreeMap order: nginx, node, postgres (redis already alpine)
        assert!(recs[0].description.contains("nginx"));
        assert!(recs[1].description.contains("node"));
        assert!(recs[2].description.contains("postgres"));
        assert_eq!(recs[5].templates.len(), 4);
    }

    #[test]
    fn test_generation_is_deterministic() {
        let containers = vec![
            container("web", "nginx", 500.0, 50.0, 0),
            container("db", "postgres", 10.0, 1.0, 9),
            container("x", "app", 10.0, 1.0, 0),
            container("y", "app", 10.0, 1.0, 0),
        ];
        let host = HostSnapshot {
            cpu_usage: 85.0,
            memory_usage: 20.0,
            disk_usage: 90.0,
            ..Default::default()
        };

        assert_eq!(run(&containers, &host), run(&containers, &host));
    }

    #[test]
    fn test_templates_field_omitted_when_empty() {
        let host = HostSnapshot {
            disk_usage: 95.0,
            ..Default::default()
        };
        let recs = run(&[], &host);
        let json = serde_json::to_value(&recs[0]).unwrap();

        assert_eq!(json["type"], "system");
        assert_eq!(json["category"], "disk");
        assert!(json.get("templates").is_none());
        assert!(json.get("affected_containers").is_none());
    }

    #[test]
    fn test_priority_and_kind_parse() {
        assert_eq!(Priority::parse("HIGH"), Some(Priority::High));
        assert_eq!(Priority::parse("urgent"), None);
        assert_eq!(RecommendationKind::parse("network"), Some(RecommendationKind::Network));
        assert!(Priority::High > Priority::Low);
    }
}
