//! Dockwise agent: background analysis loop and HTTP API
//!
//! The binary in `main.rs` wires these together; the library exists so the
//! router and refresh loop can be driven from integration tests.

pub mod api;
pub mod config;
pub mod refresh;

use advisor_lib::provider::{FileProvider, SimulatedProvider, SnapshotProvider};
use config::AgentConfig;

/// Provider selected by configuration
pub fn provider_for(config: &AgentConfig) -> Box<dyn SnapshotProvider> {
    match &config.snapshot_path {
        Some(path) => Box::new(FileProvider::new(path.clone())),
        None => Box::new(SimulatedProvider::new()),
    }
}
