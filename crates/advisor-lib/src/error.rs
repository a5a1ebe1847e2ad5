//! Error types for the advisor engine

use std::path::PathBuf;

/// Errors raised while capturing a snapshot
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("failed to read snapshot {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed snapshot {path:?}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors raised while loading or persisting history
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("history io error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("history serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
