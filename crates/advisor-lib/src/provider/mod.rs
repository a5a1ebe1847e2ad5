//! Snapshot providers
//!
//! A provider supplies raw container and host records to the engine. The
//! engine does not care whether they come from a live runtime, a file, or a
//! simulation.

mod file;
mod simulated;

pub use file::FileProvider;
pub use simulated::SimulatedProvider;

use crate::normalize::RawSnapshot;
use anyhow::Result;

/// Trait for snapshot sources
pub trait SnapshotProvider: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Capture one point-in-time snapshot
    fn capture(&self) -> Result<RawSnapshot>;
}

/// Provider that always returns the snapshot it was built with
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    snapshot: RawSnapshot,
}

impl StaticProvider {
    pub fn new(snapshot: RawSnapshot) -> Self {
        Self { snapshot }
    }
}

impl SnapshotProvider for StaticProvider {
    fn name(&self) -> &str {
        "static"
    }

    fn capture(&self) -> Result<RawSnapshot> {
        Ok(self.snapshot.clone())
    }
}
