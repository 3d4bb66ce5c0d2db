//! Error types for the node facade.

use std::path::PathBuf;

use thiserror::Error;

use flypost_store::StoreError;
use flypost_sync::ClientError;

/// Errors loading the node configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Errors that can occur during node operations.
#[derive(Debug, Error)]
pub enum NodeError {
    /// Storage error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Sync client error.
    #[error("sync error: {0}")]
    Client(#[from] ClientError),

    /// Listener or socket error.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type for node operations.
pub type Result<T> = std::result::Result<T, NodeError>;
