//! Core data models for the advisor engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Length of the abbreviated container id shown to users
pub const SHORT_ID_LEN: usize = 12;

/// Container lifecycle state as reported by the runtime
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ContainerStatus {
    Running,
    Exited,
    Paused,
    Restarting,
    Created,
    Dead,
    Other(String),
}

impl ContainerStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ContainerStatus::Running => "running",
            ContainerStatus::Exited => "exited",
            ContainerStatus::Paused => "paused",
            ContainerStatus::Restarting => "restarting",
            ContainerStatus::Created => "created",
            ContainerStatus::Dead => "dead",
            ContainerStatus::Other(s) => s,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, ContainerStatus::Running)
    }

    /// Only `exited` counts as stopped; paused and other states count as neither.
    pub fn is_stopped(&self) -> bool {
        matches!(self, ContainerStatus::Exited)
    }
}

impl From<String> for ContainerStatus {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "running" => ContainerStatus::Running,
            "exited" => ContainerStatus::Exited,
            "paused" => ContainerStatus::Paused,
            "restarting" => ContainerStatus::Restarting,
            "created" => ContainerStatus::Created,
            "dead" => ContainerStatus::Dead,
            _ => ContainerStatus::Other(value),
        }
    }
}

impl From<&str> for ContainerStatus {
    fn from(value: &str) -> Self {
        ContainerStatus::from(value.to_string())
    }
}

impl From<ContainerStatus> for String {
    fn from(value: ContainerStatus) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for ContainerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time capture of a single container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerSnapshot {
    pub id: String,
    pub name: String,
    pub image: String,
    pub status: ContainerStatus,
    pub created: DateTime<Utc>,
    pub ports: Vec<String>,
    /// Root filesystem size in MB
    pub size: f64,
    /// Resident memory in MB
    pub memory_usage: f64,
    /// CPU usage percent
    pub cpu_usage: f64,
    pub restart_count: u32,
}

impl ContainerSnapshot {
    /// First twelve characters of the container id
    pub fn short_id(&self) -> &str {
        match self.id.char_indices().nth(SHORT_ID_LEN) {
            Some((idx, _)) => &self.id[..idx],
            None => &self.id,
        }
    }

    /// Image name with the tag suffix stripped (`redis:alpine` -> `redis`)
    pub fn image_family(&self) -> &str {
        image_family(&self.image)
    }

    /// Tag portion of the image reference, if any
    pub fn image_tag(&self) -> Option<&str> {
        self.image.split_once(':').map(|(_, tag)| tag)
    }

    pub fn reference(&self) -> ContainerRef {
        ContainerRef {
            id: self.short_id().to_string(),
            name: self.name.clone(),
        }
    }
}

/// Portion of an image reference before its first `:` separator
pub fn image_family(image: &str) -> &str {
    image.split_once(':').map(|(family, _)| family).unwrap_or(image)
}

/// Identifies a container in classification lists and recommendations
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerRef {
    pub id: String,
    pub name: String,
}

/// Container totals as reported by the runtime daemon
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerCounts {
    pub running: u32,
    pub total: u32,
    pub images: u32,
}

/// Point-in-time capture of host-level metrics
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HostSnapshot {
    /// CPU usage percent
    pub cpu_usage: f64,
    /// Memory usage percent
    pub memory_usage: f64,
    /// Root disk usage percent
    pub disk_usage: f64,
    /// Total memory in MB
    pub total_memory: f64,
    /// Used memory in MB
    pub used_memory: f64,
    /// Receive rate in KB/s
    pub network_rx: f64,
    /// Transmit rate in KB/s
    pub network_tx: f64,
    /// Load averages (1, 5, 15 minutes)
    pub system_load: Vec<f64>,
    pub container_counts: ContainerCounts,
}

/// Normalized snapshot handed to the analysis pipeline
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub containers: Vec<ContainerSnapshot>,
    pub host: HostSnapshot,
}
