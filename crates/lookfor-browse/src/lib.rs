/// LookFor Browse — headless tree-view front-end.
///
/// Drives `lookfor-core` the way an interactive tree view would: a flattened
/// list of visible rows, lazy expansion, checkbox toggling and a once-per-frame
/// pump of scan results. Rendering and export are plain text, CSV and JSON.
pub mod export;
pub mod render;
pub mod session;

pub use export::{export_selection_csv, write_selection_csv, TreeSnapshot};
pub use render::{render_rows, render_to_string};
pub use session::{BrowseSession, VisibleRow};
