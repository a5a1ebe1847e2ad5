//! Bounded analysis history
//!
//! Two parallel FIFO logs (container counts and host percentages), each capped
//! at a fixed number of entries and persisted as flat JSON arrays:
//! - `container_history.json`
//! - `system_metrics.json`
//!
//! Loading never fails: a missing or corrupt file yields an empty list.

use crate::error::HistoryError;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Entries kept per list
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

pub const CONTAINER_HISTORY_FILE: &str = "container_history.json";
pub const SYSTEM_METRICS_FILE: &str = "system_metrics.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerHistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub container_count: usize,
    pub running_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemMetricsEntry {
    pub timestamp: DateTime<Utc>,
    pub cpu_usage: f64,
    pub memory_usage: f64,
    pub disk_usage: f64,
}

/// Point-in-time copy of both lists, oldest first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryLog {
    pub containers: Vec<ContainerHistoryEntry>,
    pub system_metrics: Vec<SystemMetricsEntry>,
}

/// Summary of how the recorded samples moved over the window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryTrend {
    pub container_samples: usize,
    pub metric_samples: usize,
    pub average_cpu_usage: f64,
    pub average_memory_usage: f64,
    pub average_disk_usage: f64,
    /// Last minus first sample
    pub cpu_delta: f64,
    pub memory_delta: f64,
    pub disk_delta: f64,
    pub container_delta: i64,
}

impl HistoryLog {
    pub fn is_empty(&self) -> bool {
        self.containers.is_empty() && self.system_metrics.is_empty()
    }

    /// Keep only the most recent `n` entries of each list
    pub fn tail(&self, n: usize) -> HistoryLog {
        let skip = |len: usize| len.saturating_sub(n);
        HistoryLog {
            containers: self.containers[skip(self.containers.len())..].to_vec(),
            system_metrics: self.system_metrics[skip(self.system_metrics.len())..].to_vec(),
        }
    }

    pub fn trend(&self) -> Option<HistoryTrend> {
        if self.is_empty() {
            return None;
        }

        let metrics = &self.system_metrics;
        let container_delta = match (self.containers.first(), self.containers.last()) {
            (Some(first), Some(last)) => last.container_count as i64 - first.container_count as i64,
            _ => 0,
        };

        Some(HistoryTrend {
            container_samples: self.containers.len(),
            metric_samples: metrics.len(),
            average_cpu_usage: mean(metrics, |e| e.cpu_usage),
            average_memory_usage: mean(metrics, |e| e.memory_usage),
            average_disk_usage: mean(metrics, |e| e.disk_usage),
            cpu_delta: delta(metrics, |e| e.cpu_usage),
            memory_delta: delta(metrics, |e| e.memory_usage),
            disk_delta: delta(metrics, |e| e.disk_usage),
            container_delta,
        })
    }
}

fn mean(entries: &[SystemMetricsEntry], field: impl Fn(&SystemMetricsEntry) -> f64) -> f64 {
    if entries.is_empty() {
        return 0.0;
    }
    entries.iter().map(field).sum::<f64>() / entries.len() as f64
}

fn delta(entries: &[SystemMetricsEntry], field: impl Fn(&SystemMetricsEntry) -> f64) -> f64 {
    match (entries.first(), entries.last()) {
        (Some(first), Some(last)) => field(last) - field(first),
        _ => 0.0,
    }
}

/// Where history lists are persisted
pub trait HistoryBackend: Send + Sync {
    fn load_containers(&self) -> Result<Vec<ContainerHistoryEntry>, HistoryError>;
    fn load_system_metrics(&self) -> Result<Vec<SystemMetricsEntry>, HistoryError>;
    /// Overwrite both lists
    fn save(&self, log: &HistoryLog) -> Result<(), HistoryError>;
    fn describe(&self) -> String;
}

/// Pretty-printed JSON arrays under a data directory
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    data_dir: PathBuf,
}

impl JsonFileBackend {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn read<T: DeserializeOwned>(&self, file: &str) -> Result<Vec<T>, HistoryError> {
        let path = self.data_dir.join(file);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let data = std::fs::read(&path).map_err(|source| HistoryError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(serde_json::from_slice(&data)?)
    }

    fn write<T: Serialize>(&self, file: &str, entries: &[T]) -> Result<(), HistoryError> {
        let path = self.data_dir.join(file);
        std::fs::create_dir_all(&self.data_dir).map_err(io_error(&self.data_dir))?;

        let json = serde_json::to_vec_pretty(entries)?;

        // Write atomically using temp file
        let temp_path = path.with_extension("tmp");
        let mut f = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .map_err(io_error(&temp_path))?;
        f.write_all(&json).map_err(io_error(&temp_path))?;
        f.sync_all().map_err(io_error(&temp_path))?;

        std::fs::rename(&temp_path, &path).map_err(io_error(&path))?;
        Ok(())
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> HistoryError {
    let path = path.to_path_buf();
    move |source| HistoryError::Io { path, source }
}

impl HistoryBackend for JsonFileBackend {
    fn load_containers(&self) -> Result<Vec<ContainerHistoryEntry>, HistoryError> {
        self.read(CONTAINER_HISTORY_FILE)
    }

    fn load_system_metrics(&self) -> Result<Vec<SystemMetricsEntry>, HistoryError> {
        self.read(SYSTEM_METRICS_FILE)
    }

    fn save(&self, log: &HistoryLog) -> Result<(), HistoryError> {
        self.write(CONTAINER_HISTORY_FILE, &log.containers)?;
        self.write(SYSTEM_METRICS_FILE, &log.system_metrics)
    }

    fn describe(&self) -> String {
        self.data_dir.display().to_string()
    }
}

/// In-process backend; clones share the same storage
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    log: Arc<Mutex<HistoryLog>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log(log: HistoryLog) -> Self {
        Self {
            log: Arc::new(Mutex::new(log)),
        }
    }

    /// What was last saved
    pub fn saved(&self) -> HistoryLog {
        self.log.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl HistoryBackend for MemoryBackend {
    fn load_containers(&self) -> Result<Vec<ContainerHistoryEntry>, HistoryError> {
        Ok(self.saved().containers)
    }

    fn load_system_metrics(&self) -> Result<Vec<SystemMetricsEntry>, HistoryError> {
        Ok(self.saved().system_metrics)
    }

    fn save(&self, log: &HistoryLog) -> Result<(), HistoryError> {
        *self.log.lock().unwrap_or_else(|e| e.into_inner()) = log.clone();
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

/// Capped, append-only history backed by a [`HistoryBackend`]
pub struct HistoryStore {
    backend: Box<dyn HistoryBackend>,
    limit: usize,
    containers: VecDeque<ContainerHistoryEntry>,
    system_metrics: VecDeque<SystemMetricsEntry>,
}

impl HistoryStore {
    /// Load existing lists, degrading each to empty on failure
    pub fn open(backend: Box<dyn HistoryBackend>, limit: usize) -> Self {
        let containers = backend.load_containers().unwrap_or_else(|e| {
            warn!(backend = %backend.describe(), error = %e, "Failed to load container history, starting fresh");
            Vec::new()
        });
        let system_metrics = backend.load_system_metrics().unwrap_or_else(|e| {
            warn!(backend = %backend.describe(), error = %e, "Failed to load system metrics history, starting fresh");
            Vec::new()
        });

        let mut store = Self {
            backend,
            limit,
            containers: containers.into(),
            system_metrics: system_metrics.into(),
        };
        store.truncate();

        info!(
            backend = %store.backend.describe(),
            containers = store.containers.len(),
            system_metrics = store.system_metrics.len(),
            "Loaded analysis history"
        );
        store
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn append_containers(&mut self, entry: ContainerHistoryEntry) {
        while self.containers.len() >= self.limit {
            self.containers.pop_front();
        }
        self.containers.push_back(entry);
    }

    pub fn append_system_metrics(&mut self, entry: SystemMetricsEntry) {
        while self.system_metrics.len() >= self.limit {
            self.system_metrics.pop_front();
        }
        self.system_metrics.push_back(entry);
    }

    pub fn load(&self) -> HistoryLog {
        HistoryLog {
            containers: self.containers.iter().cloned().collect(),
            system_metrics: self.system_metrics.iter().cloned().collect(),
        }
    }

    /// Truncate to the cap, then overwrite the persisted lists
    pub fn save(&mut self) -> Result<(), HistoryError> {
        self.truncate();
        let log = self.load();
        self.backend.save(&log)?;
        debug!(
            backend = %self.backend.describe(),
            containers = log.containers.len(),
            system_metrics = log.system_metrics.len(),
            "History persisted"
        );
        Ok(())
    }

    fn truncate(&mut self) {
        while self.containers.len() > self.limit {
            self.containers.pop_front();
        }
        while self.system_metrics.len() > self.limit {
            self.system_metrics.pop_front();
        }
    }
}

/// Per-user data directory (`~/.dockwise/data`)
pub fn default_data_dir() -> PathBuf {
    dirs_next::home_dir()
        .map(|home| home.join(".dockwise").join("data"))
        .unwrap_or_else(|| PathBuf::from(".dockwise").join("data"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::TempDir;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH + Duration::seconds(secs)
    }

    fn containers(secs: i64, count: usize) -> ContainerHistoryEntry {
        ContainerHistoryEntry {
            timestamp: at(secs),
            container_count: count,
            running_count: count,
        }
    }

    fn metrics(secs: i64, cpu: f64) -> SystemMetricsEntry {
        SystemMetricsEntry {
            timestamp: at(secs),
            cpu_usage: cpu,
            memory_usage: 50.0,
            disk_usage: 40.0,
        }
    }

    #[test]
    fn test_append_evicts_oldest() {
        let mut store = HistoryStore::open(Box::new(MemoryBackend::new()), 3);
        for i in 0..5 {
            store.append_containers(containers(i, i as usize));
        }

        let log = store.load();
        assert_eq!(log.containers.len(), 3);
        assert_eq!(log.containers[0].container_count, 2);
        assert_eq!(log.containers[2].container_count, 4);
    }

    #[test]
    fn test_open_truncates_oversized_log() {
        let backend = MemoryBackend::with_log(HistoryLog {
            containers: (0..150).map(|i| containers(i, i as usize)).collect(),
            system_metrics: Vec::new(),
        });
        let store = HistoryStore::open(Box::new(backend), DEFAULT_HISTORY_LIMIT);

        let log = store.load();
        assert_eq!(log.containers.len(), 100);
        assert_eq!(log.containers[0].container_count, 50);
    }

    #[test]
    fn test_json_backend_roundtrip() {
        let dir = TempDir::new().unwrap();
        let backend = JsonFileBackend::new(dir.path().join("nested"));

        let mut store = HistoryStore::open(Box::new(backend.clone()), 10);
        store.append_containers(containers(1, 4));
        store.append_system_metrics(metrics(1, 12.5));
        store.save().unwrap();

        assert!(dir.path().join("nested").join(CONTAINER_HISTORY_FILE).exists());
        assert!(!dir.path().join("nested").join("container_history.tmp").exists());

        let reopened = HistoryStore::open(Box::new(backend), 10);
        assert_eq!(reopened.load(), store.load());
    }

    #[test]
    fn test_corrupt_file_degrades_to_empty() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONTAINER_HISTORY_FILE), b"{not json").unwrap();
        std::fs::write(
            dir.path().join(SYSTEM_METRICS_FILE),
            serde_json::to_vec(&vec![metrics(5, 30.0)]).unwrap(),
        )
        .unwrap();

        let store = HistoryStore::open(Box::new(JsonFileBackend::new(dir.path())), 10);
        let log = store.load();

        assert!(log.containers.is_empty());
        assert_eq!(log.system_metrics.len(), 1);
    }

    #[test]
    fn test_missing_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = HistoryStore::open(Box::new(JsonFileBackend::new(dir.path().join("absent"))), 10);
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_trend() {
        let log = HistoryLog {
            containers: vec![containers(0, 2), containers(60, 5)],
            system_metrics: vec![metrics(0, 10.0), metrics(60, 30.0), metrics(120, 50.0)],
        };
        let trend = log.trend().unwrap();

        assert_eq!(trend.metric_samples, 3);
        assert_eq!(trend.average_cpu_usage, 30.0);
        assert_eq!(trend.cpu_delta, 40.0);
        assert_eq!(trend.memory_delta, 0.0);
        assert_eq!(trend.container_delta, 3);
        assert!(HistoryLog::default().trend().is_none());
    }

    #[test]
    fn test_tail() {
        let log = HistoryLog {
            containers: (0..5).map(|i| containers(i, i as usize)).collect(),
            system_metrics: vec![metrics(0, 1.0)],
        };
        let tail = log.tail(2);
        assert_eq!(tail.containers.len(), 2);
        assert_eq!(tail.containers[0].container_count, 3);
        assert_eq!(tail.system_metrics.len(), 1);
    }
}
