//! Normalization of raw provider records
//!
//! Providers hand over loosely-typed records that may be missing fields or
//! carry out-of-range readings. Normalization fills defaults (0 for numbers,
//! `"unknown"` for strings), clamps percentages to `[0, 100]`, and keeps an
//! audit trail of every field it had to touch.

use crate::models::{ContainerCounts, ContainerSnapshot, ContainerStatus, HostSnapshot, Snapshot};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

/// Placeholder for missing string fields
pub const UNKNOWN: &str = "unknown";

/// Container record as delivered by a snapshot provider
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawContainerRecord {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub status: Option<String>,
    /// Creation time in unix seconds
    #[serde(default, deserialize_with = "lenient")]
    pub created: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub ports: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient")]
    pub size: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub memory_usage: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub cpu_usage: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub restart_count: Option<u32>,
}

/// Host record as delivered by a snapshot provider
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawHostRecord {
    #[serde(default, deserialize_with = "lenient")]
    pub cpu_usage: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub memory_usage: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub disk_usage: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub total_memory: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub used_memory: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub network_rx: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub network_tx: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub system_load: Option<Vec<f64>>,
    #[serde(default, deserialize_with = "lenient")]
    pub docker_containers_running: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub docker_containers_total: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub docker_images: Option<u32>,
}

/// Accept any JSON value, keeping it only when it has the expected type.
/// A mismatch becomes `None` so normalization defaults that one field.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

/// Unvalidated snapshot straight from a provider
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSnapshot {
    #[serde(default)]
    pub containers: Vec<RawContainerRecord>,
    #[serde(default)]
    pub host: RawHostRecord,
}

/// Record a field adjustment belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "record", content = "index")]
pub enum RecordSource {
    Container(usize),
    Host,
}

/// What normalization did to a field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "original")]
pub enum AdjustmentKind {
    /// Field was missing or not a finite number
    Defaulted,
    /// Field was out of range; carries the original reading
    Clamped(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldAdjustment {
    pub source: RecordSource,
    pub field: String,
    pub kind: AdjustmentKind,
}

/// Audit trail of every field touched while normalizing one snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizationReport {
    pub adjustments: Vec<FieldAdjustment>,
}

impl NormalizationReport {
    pub fn is_clean(&self) -> bool {
        self.adjustments.is_empty()
    }

    pub fn defaulted_count(&self) -> usize {
        self.adjustments
            .iter()
            .filter(|a| a.kind == AdjustmentKind::Defaulted)
            .count()
    }

    pub fn clamped_count(&self) -> usize {
        self.adjustments.len() - self.defaulted_count()
    }

    fn record(&mut self, source: RecordSource, field: &str, kind: AdjustmentKind) {
        debug!(?source, field, ?kind, "Normalized snapshot field");
        self.adjustments.push(FieldAdjustment {
            source,
            field: field.to_string(),
            kind,
        });
    }
}

/// Field-level normalizer bound to one record
struct FieldNormalizer<'a> {
    source: RecordSource,
    report: &'a mut NormalizationReport,
}

impl FieldNormalizer<'_> {
    fn text(&mut self, field: &str, value: Option<String>) -> String {
        match value {
            Some(v) if !v.trim().is_empty() => v,
            _ => {
                self.report.record(self.source, field, AdjustmentKind::Defaulted);
                UNKNOWN.to_string()
            }
        }
    }

    /// Non-negative quantity (MB, KB/s, counts)
    fn quantity(&mut self, field: &str, value: Option<f64>) -> f64 {
        self.bounded(field, value, f64::INFINITY)
    }

    /// Percentage clamped to `[0, 100]`
    fn percent(&mut self, field: &str, value: Option<f64>) -> f64 {
        self.bounded(field, value, 100.0)
    }

    fn bounded(&mut self, field: &str, value: Option<f64>, max: f64) -> f64 {
        match value {
            Some(v) if v.is_finite() => {
                let clamped = v.clamp(0.0, max);
                if clamped != v {
                    self.report
                        .record(self.source, field, AdjustmentKind::Clamped(v));
                }
                clamped
            }
            _ => {
                self.report.record(self.source, field, AdjustmentKind::Defaulted);
                0.0
            }
        }
    }

    fn count(&mut self, field: &str, value: Option<u32>) -> u32 {
        value.unwrap_or_else(|| {
            self.report.record(self.source, field, AdjustmentKind::Defaulted);
            0
        })
    }

    fn timestamp(&mut self, field: &str, value: Option<f64>) -> DateTime<Utc> {
        let parsed = value
            .filter(|v| v.is_finite())
            .and_then(|secs| DateTime::from_timestamp(secs.trunc() as i64, 0));
        parsed.unwrap_or_else(|| {
            self.report.record(self.source, field, AdjustmentKind::Defaulted);
            DateTime::<Utc>::UNIX_EPOCH
        })
    }
}

/// Normalize a single container record
pub fn normalize_container(
    index: usize,
    raw: RawContainerRecord,
    report: &mut NormalizationReport,
) -> ContainerSnapshot {
    let mut n = FieldNormalizer {
        source: RecordSource::Container(index),
        report,
    };

    ContainerSnapshot {
        id: n.text("id", raw.id),
        name: n.text("name", raw.name),
        image: n.text("image", raw.image),
        status: ContainerStatus::from(n.text("status", raw.status)),
        created: n.timestamp("created", raw.created),
        ports: raw.ports.unwrap_or_default(),
        size: n.quantity("size", raw.size),
        memory_usage: n.quantity("memory_usage", raw.memory_usage),
        cpu_usage: n.percent("cpu_usage", raw.cpu_usage),
        restart_count: n.count("restart_count", raw.restart_count),
    }
}

/// Normalize the host record
pub fn normalize_host(raw: RawHostRecord, report: &mut NormalizationReport) -> HostSnapshot {
    let mut n = FieldNormalizer {
        source: RecordSource::Host,
        report,
    };

    HostSnapshot {
        cpu_usage: n.percent("cpu_usage", raw.cpu_usage),
        memory_usage: n.percent("memory_usage", raw.memory_usage),
        disk_usage: n.percent("disk_usage", raw.disk_usage),
        total_memory: n.quantity("total_memory", raw.total_memory),
        used_memory: n.quantity("used_memory", raw.used_memory),
        network_rx: n.quantity("network_rx", raw.network_rx),
        network_tx: n.quantity("network_tx", raw.network_tx),
        system_load: raw.system_load.unwrap_or_default(),
        container_counts: ContainerCounts {
            running: n.count("docker_containers_running", raw.docker_containers_running),
            total: n.count("docker_containers_total", raw.docker_containers_total),
            images: n.count("docker_images", raw.docker_images),
        },
    }
}

/// Normalize a whole provider snapshot
pub fn normalize(raw: RawSnapshot) -> (Snapshot, NormalizationReport) {
    let mut report = NormalizationReport::default();

    let containers = raw
        .containers
        .into_iter()
        .enumerate()
        .map(|(i, c)| normalize_container(i, c, &mut report))
        .collect();
    let host = normalize_host(raw.host, &mut report);

    (Snapshot { containers, host }, report)
}
