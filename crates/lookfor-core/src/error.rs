/// Error types surfaced by the core.
///
/// Filesystem problems met while scanning (unreadable directories, vanished
/// entries, stale job messages, missing roots) are absorbed and logged, never
/// returned. Only API misuse and setup failures reach the caller.
use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by [`crate::index::FileSystemModel`] operations.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The address does not resolve to a node in the current tree.
    #[error("model index does not refer to a node in the current tree")]
    InvalidIndex,

    /// Check state can only be written through column 0.
    #[error("column {column} is not checkable")]
    NotCheckable { column: usize },

    /// `PartiallyChecked` is derived from children and cannot be requested.
    #[error("partially checked is derived and cannot be set directly")]
    PartialCheckNotSettable,

    /// `set_data` was called with a role that cannot be written.
    #[error("role {role:?} is read-only")]
    UnsupportedRole { role: crate::index::Role },

    /// The scan worker pool could not be created.
    #[error("failed to build scan worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

/// Errors raised while loading or validating a [`crate::config::ModelConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid configuration: {message}")]
    Invalid { message: String },
}
