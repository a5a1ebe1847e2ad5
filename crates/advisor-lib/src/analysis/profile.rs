//! Resource sizing profile selection
//!
//! Maps host utilization and the usage analysis onto one of five fixed
//! sizing profiles.

use super::usage::UsageAnalysis;
use crate::models::HostSnapshot;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Total memory assumed when the host did not report one (16 GB)
pub const DEFAULT_TOTAL_MEMORY_MB: f64 = 16_384.0;

/// Host utilization above which the conservative profile is chosen
const HIGH_LOAD_PERCENT: f64 = 80.0;
/// Host utilization below which the performance profile is chosen
const LOW_LOAD_PERCENT: f64 = 30.0;
/// Utilization that marks a resource as the constrained one
const PRESSURE_PERCENT: f64 = 60.0;
/// Utilization under which the other resource counts as available
const HEADROOM_PERCENT: f64 = 40.0;

/// Named sizing profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceProfile {
    Minimal,
    Balanced,
    Performance,
    MemoryOptimized,
    CpuOptimized,
}

/// Fixed CPU/memory figures attached to a profile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileFigures {
    /// CPU cores
    pub cpu: f64,
    pub memory: &'static str,
    pub memory_reservation: &'static str,
    pub description: &'static str,
}

impl ResourceProfile {
    pub const ALL: [ResourceProfile; 5] = [
        ResourceProfile::Minimal,
        ResourceProfile::Balanced,
        ResourceProfile::Performance,
        ResourceProfile::MemoryOptimized,
        ResourceProfile::CpuOptimized,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceProfile::Minimal => "minimal",
            ResourceProfile::Balanced => "balanced",
            ResourceProfile::Performance => "performance",
            ResourceProfile::MemoryOptimized => "memory-optimized",
            ResourceProfile::CpuOptimized => "cpu-optimized",
        }
    }

    pub fn figures(&self) -> ProfileFigures {
        match self {
            ResourceProfile::Minimal => ProfileFigures {
                cpu: 0.5,
                memory: "256m",
                memory_reservation: "128m",
                description: "Minimum resources for basic functionality",
            },
            ResourceProfile::Balanced => ProfileFigures {
                cpu: 1.0,
                memory: "512m",
                memory_reservation: "256m",
                description: "Balanced resources for general-purpose workloads",
            },
            ResourceProfile::Performance => ProfileFigures {
                cpu: 2.0,
                memory: "1g",
                memory_reservation: "512m",
                description: "Enhanced performance for demanding applications",
            },
            ResourceProfile::MemoryOptimized => ProfileFigures {
                cpu: 1.0,
                memory: "2g",
                memory_reservation: "1g",
                description: "Optimized for memory-intensive applications",
            },
            ResourceProfile::CpuOptimized => ProfileFigures {
                cpu: 4.0,
                memory: "1g",
                memory_reservation: "512m",
                description: "Optimized for CPU-intensive workloads",
            },
        }
    }

    /// Whether a container-level hotspot may upgrade this profile
    fn is_upgradable(&self) -> bool {
        matches!(self, ResourceProfile::Minimal | ResourceProfile::Balanced)
    }
}

impl fmt::Display for ResourceProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Host figures the profile decision was based on
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SystemMetricsSummary {
    pub memory_usage_percent: f64,
    pub cpu_usage_percent: f64,
    /// Total memory in MB
    pub total_memory: f64,
}

/// Selected profile plus its concrete figures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceRecommendation {
    pub resource_profile: ResourceProfile,
    pub description: String,
    pub recommended_cpu: f64,
    pub recommended_memory: String,
    pub recommended_memory_reservation: String,
    pub available_memory: String,
    pub system_metrics: SystemMetricsSummary,
}

/// Pick a profile for the given analysis and host readings
pub fn select_profile(usage: &UsageAnalysis, host: &HostSnapshot) -> ResourceProfile {
    let cpu = host.cpu_usage;
    let memory = host.memory_usage;

    let mut profile = if cpu > HIGH_LOAD_PERCENT || memory > HIGH_LOAD_PERCENT {
        ResourceProfile::Minimal
    } else if cpu < LOW_LOAD_PERCENT && memory < LOW_LOAD_PERCENT {
        ResourceProfile::Performance
    } else {
        ResourceProfile::Balanced
    };

    // Refine towards the constrained resource
    if memory > PRESSURE_PERCENT && cpu < HEADROOM_PERCENT {
        profile = ResourceProfile::MemoryOptimized;
    } else if cpu > PRESSURE_PERCENT && memory < HEADROOM_PERCENT {
        profile = ResourceProfile::CpuOptimized;
    }

    // Hotspot upgrades only apply to the host-level choice
    let base = profile;
    if !usage.high_memory_containers.is_empty() && base.is_upgradable() {
        profile = ResourceProfile::MemoryOptimized;
    }
    // Can override the memory upgrade above
    if !usage.high_cpu_containers.is_empty() && base.is_upgradable() {
        profile = ResourceProfile::CpuOptimized;
    }

    profile
}

/// Select a profile and resolve it to concrete figures
pub fn recommend_resources(usage: &UsageAnalysis, host: &HostSnapshot) -> ResourceRecommendation {
    let profile = select_profile(usage, host);
    let figures = profile.figures();

    let total_memory = if host.total_memory > 0.0 {
        host.total_memory
    } else {
        DEFAULT_TOTAL_MEMORY_MB
    };
    let available = total_memory * (1.0 - host.memory_usage / 100.0);

    ResourceRecommendation {
        resource_profile: profile,
        description: figures.description.to_string(),
        recommended_cpu: figures.cpu,
        recommended_memory: figures.memory.to_string(),
        recommended_memory_reservation: figures.memory_reservation.to_string(),
        available_memory: format_memory_mb(available),
        system_metrics: SystemMetricsSummary {
            memory_usage_percent: host.memory_usage,
            cpu_usage_percent: host.cpu_usage,
            total_memory,
        },
    }
}

/// Format a MB figure the way container runtimes take it (`1.5g`, `512m`)
pub fn format_memory_mb(mb: f64) -> String {
    if mb >= 1024.0 {
        format!("{:.1}g", mb / 1024.0)
    } else {
        format!("{:.0}m", mb)
    }
}
