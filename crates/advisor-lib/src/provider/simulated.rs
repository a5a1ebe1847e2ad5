//! Simulated snapshot provider for demo mode
//!
//! Produces a fixed set of demo containers and cycles through a table of
//! plausible host readings so repeated refreshes show movement without a
//! random source.

use super::SnapshotProvider;
use crate::normalize::{RawContainerRecord, RawHostRecord, RawSnapshot};
use anyhow::Result;
use chrono::Utc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Simulated host total memory (16 GB)
const SIMULATED_TOTAL_MEMORY_MB: f64 = 16.0 * 1024.0;

const SECS_PER_DAY: f64 = 86_400.0;

/// (cpu %, used memory MB, disk %, rx KB/s, tx KB/s)
const HOST_READINGS: &[(f64, f64, f64, f64, f64)] = &[
    (22.4, 6_150.0, 54.2, 412.0, 180.5),
    (35.8, 7_420.0, 54.3, 655.1, 240.9),
    (61.3, 9_870.0, 54.5, 910.7, 433.2),
    (47.0, 11_260.0, 54.6, 288.4, 96.3),
    (15.9, 4_480.0, 54.6, 120.2, 61.8),
];

/// Fixed demo container
struct DemoContainer {
    id: &'static str,
    name: &'static str,
    image: &'static str,
    status: &'static str,
    age_days: f64,
    ports: &'static [&'static str],
    /// Image size in MB
    size: f64,
    /// Memory usage in MB
    memory: f64,
    cpu: f64,
    restarts: u32,
}

const DEMO_CONTAINERS: &[DemoContainer] = &[
    DemoContainer {
        id: "abc123def456",
        name: "web-server",
        image: "nginx:latest",
        status: "running",
        age_days: 3.0,
        ports: &["80/tcp", "443/tcp"],
        size: 125.8,
        memory: 128.5,
        cpu: 5.2,
        restarts: 2,
    },
    DemoContainer {
        id: "def456ghi789",
        name: "postgres-db",
        image: "postgres:13",
        status: "running",
        age_days: 10.0,
        ports: &["5432/tcp"],
        size: 421.3,
        memory: 356.8,
        cpu: 8.7,
        restarts: 0,
    },
    DemoContainer {
        id: "ghi789jkl012",
        name: "redis-cache",
        image: "redis:alpine",
        status: "running",
        age_days: 5.0,
        ports: &["6379/tcp"],
        size: 32.1,
        memory: 42.6,
        cpu: 1.3,
        restarts: 1,
    },
    DemoContainer {
        id: "jkl012mno345",
        name: "node-app",
        image: "node:14",
        status: "exited",
        age_days: 1.0,
        ports: &["3000/tcp"],
        size: 978.5,
        memory: 0.0,
        cpu: 0.0,
        restarts: 5,
    },
];

/// Demo-mode provider
#[derive(Debug, Default)]
pub struct SimulatedProvider {
    tick: AtomicUsize,
}

impl SimulatedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn containers(now: f64) -> Vec<RawContainerRecord> {
        DEMO_CONTAINERS
            .iter()
            .map(|c| RawContainerRecord {
                id: Some(c.id.to_string()),
                name: Some(c.name.to_string()),
                image: Some(c.image.to_string()),
                status: Some(c.status.to_string()),
                created: Some(now - SECS_PER_DAY * c.age_days),
                ports: Some(c.ports.iter().map(|p| p.to_string()).collect()),
                size: Some(c.size),
                memory_usage: Some(c.memory),
                cpu_usage: Some(c.cpu),
                restart_count: Some(c.restarts),
            })
            .collect()
    }

    fn host(&self, containers: &[RawContainerRecord]) -> RawHostRecord {
        let tick = self.tick.fetch_add(1, Ordering::Relaxed);
        let (cpu, used, disk, rx, tx) = HOST_READINGS[tick % HOST_READINGS.len()];

        let running = containers
            .iter()
            .filter(|c| c.status.as_deref() == Some("running"))
            .count() as u32;

        RawHostRecord {
            cpu_usage: Some(cpu),
            memory_usage: Some(used / SIMULATED_TOTAL_MEMORY_MB * 100.0),
            disk_usage: Some(disk),
            total_memory: Some(SIMULATED_TOTAL_MEMORY_MB),
            used_memory: Some(used),
            network_rx: Some(rx),
            network_tx: Some(tx),
            system_load: Some(vec![cpu / 25.0, cpu / 30.0, cpu / 40.0]),
            docker_containers_running: Some(running),
            docker_containers_total: Some(containers.len() as u32),
            docker_images: Some(12),
        }
    }
}

impl SnapshotProvider for SimulatedProvider {
    fn name(&self) -> &str {
        "simulated"
    }

    fn capture(&self) -> Result<RawSnapshot> {
        let now = Utc::now().timestamp() as f64;
        let containers = Self::containers(now);
        let host = self.host(&containers);
        Ok(RawSnapshot { containers, host })
    }
}
