//! Snapshot provider backed by a JSON document on disk

use super::SnapshotProvider;
use crate::error::ProviderError;
use crate::normalize::RawSnapshot;
use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reads `{ "containers": [...], "host": {...} }` from a file on every capture
#[derive(Debug, Clone)]
pub struct FileProvider {
    path: PathBuf,
}

impl FileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<RawSnapshot, ProviderError> {
        let data = std::fs::read(&self.path).map_err(|source| ProviderError::Io {
            path: self.path.clone(),
            source,
        })?;
        let snapshot: RawSnapshot =
            serde_json::from_slice(&data).map_err(|source| ProviderError::Malformed {
                path: self.path.clone(),
                source,
            })?;

        debug!(
            path = %self.path.display(),
            containers = snapshot.containers.len(),
            "Read snapshot file"
        );
        Ok(snapshot)
    }
}

impl SnapshotProvider for FileProvider {
    fn name(&self) -> &str {
        "file"
    }

    fn capture(&self) -> Result<RawSnapshot> {
        Ok(self.read()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_reads_snapshot_document() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "containers": [
                    {{"id": "abc", "name": "db", "image": "postgres:13", "status": "running",
                      "memory_usage": 300.0, "cpu_usage": 4.0, "restart_count": 0}}
                ],
                "host": {{"cpu_usage": 20.0, "memory_usage": 35.0, "total_memory": 8192.0}}
            }}"#
        )
        .unwrap();

        let provider = FileProvider::new(file.path());
        let snapshot = provider.capture().unwrap();

        assert_eq!(snapshot.containers.len(), 1);
        assert_eq!(snapshot.containers[0].image.as_deref(), Some("postgres:13"));
        assert_eq!(snapshot.host.total_memory, Some(8192.0));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let provider = FileProvider::new("/nonexistent/dockwise/snapshot.json");
        let err = provider.capture().unwrap_err();
        assert!(err.to_string().contains("snapshot.json"));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let provider = FileProvider::new(file.path());
        let err = provider.capture().unwrap_err();
        assert!(err.downcast_ref::<ProviderError>().is_some());
    }
}
