/// LookFor Core — lazily-populated filesystem index with tri-state selection.
///
/// This crate contains all business logic with zero UI dependencies.
/// A tree view, table view or CLI drives it through [`index::FileSystemModel`].
///
/// # Modules
///
/// - [`model`] — Arena-allocated node store and entry descriptors.
/// - [`scanner`] — Per-directory background scan jobs and the coordinator that applies them.
/// - [`index`] — Row/column addressing, field registry and change notifications.
/// - [`check`] — Hierarchical tri-state checkbox propagation.
/// - [`platform`] — Owner and permission-string lookups.
/// - [`config`] — Model configuration.
/// - [`error`] — Error types.
pub mod check;
pub mod config;
pub mod error;
pub mod index;
pub mod model;
pub mod platform;
pub mod scanner;

pub use config::ModelConfig;
pub use error::{ConfigError, ModelError};
pub use index::{FileSystemModel, ModelEvent, ModelIndex, ModelObserver, Role};
pub use model::{CheckState, NodeId, ScanStatus};
