/// `FileSystemModel` — the read/mutate surface a tree or table view consumes.
///
/// Owns the node store, the scan coordinator, the field registry and the
/// observer list. Everything here runs on the control thread; scan workers
/// only ever talk to it through the coordinator's channel, which the view
/// drains by calling [`FileSystemModel::process_scan_events`] (once per frame)
/// or [`FileSystemModel::process_until_idle`].
use super::fields::{FieldRegistry, FieldValue};
use super::{ItemFlags, ModelEvent, ModelIndex, ModelObserver, Notifier, Role};
use crate::check;
use crate::config::ModelConfig;
use crate::error::ModelError;
use crate::model::{CheckState, EntryInfo, FileNode, FileTree, NodeId, ScanStatus};
use crate::scanner::{ScanCoordinator, ScanStats};
use compact_str::CompactString;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{info, warn};

pub struct FileSystemModel {
    tree: FileTree,
    scans: ScanCoordinator,
    fields: FieldRegistry,
    notifier: Notifier,
    config: ModelConfig,
}

impl FileSystemModel {
    /// Model with the standard six-column registry.
    pub fn new(config: ModelConfig) -> Result<Self, ModelError> {
        Self::with_fields(config, FieldRegistry::standard())
    }

    pub fn with_fields(config: ModelConfig, fields: FieldRegistry) -> Result<Self, ModelError> {
        let scans = ScanCoordinator::new(&config)?;
        Ok(Self {
            tree: FileTree::new(),
            scans,
            fields,
            notifier: Notifier::new(),
            config,
        })
    }

    pub fn subscribe(&mut self, observer: impl ModelObserver + 'static) {
        self.notifier.subscribe(observer);
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn fields(&self) -> &FieldRegistry {
        &self.fields
    }

    /// Read-only access to the node store.
    pub fn tree(&self) -> &FileTree {
        &self.tree
    }

    // ── Root ───────────────────────────────────────────────────────────────

    /// Replace the whole tree with one rooted at `path`.
    ///
    /// In-flight scans are cancelled without waiting. If `path` does not
    /// exist the model is left empty; that is not an error. Otherwise the new
    /// root's scan starts immediately.
    pub fn set_root(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        self.notifier.emit(ModelEvent::ModelAboutToBeReset);
        self.scans.reset(&mut self.tree);

        match EntryInfo::read(path, root_display_name(path)) {
            Some(info) => {
                info!(root = %path.display(), "root set");
                let root = self.tree.set_root(path, info);
                self.scans.run_scan(&mut self.tree, root);
            }
            None => warn!(root = %path.display(), "root does not exist, model left empty"),
        }

        self.notifier.emit(ModelEvent::ModelReset);
    }

    pub fn root_path(&self) -> Option<&Path> {
        self.tree.root().map(|_| self.tree.root_path())
    }

    /// Address of the root at column 0.
    pub fn root_index(&self) -> Option<ModelIndex> {
        self.index(0, 0, None)
    }

    // ── Addressing ─────────────────────────────────────────────────────────

    /// Rows under `parent`: 1 or 0 at the top level (the root, if any),
    /// otherwise the node's discovered child count.
    pub fn row_count(&self, parent: Option<&ModelIndex>) -> usize {
        match parent {
            None => usize::from(self.tree.root().is_some()),
            Some(index) => self.resolve(index).map_or(0, FileNode::child_count),
        }
    }

    pub fn column_count(&self) -> usize {
        self.fields.column_count()
    }

    /// Address of the `row`-th child of `parent` (or of the root when `parent`
    /// is `None`) at `column`.
    pub fn index(&self, row: usize, column: usize, parent: Option<&ModelIndex>) -> Option<ModelIndex> {
        if column >= self.column_count() {
            return None;
        }
        let id = match parent {
            None if row == 0 => self.tree.root()?,
            None => return None,
            Some(parent) => {
                let parent_id = self.resolve_id(parent)?;
                self.tree.child(parent_id, row)?
            }
        };
        Some(ModelIndex::of_node(self.tree.node(id), id, column))
    }

    /// Address of `index`'s parent at column 0; `None` for the root.
    pub fn parent(&self, index: &ModelIndex) -> Option<ModelIndex> {
        let parent = self.resolve(index)?.parent?;
        Some(ModelIndex::of_node(self.tree.node(parent), parent, 0))
    }

    /// Whether a view should draw an expander for `parent`.
    ///
    /// A directory that has not finished scanning may still gain children.
    pub fn has_children(&self, parent: Option<&ModelIndex>) -> bool {
        match parent {
            None => self.tree.root().is_some(),
            Some(index) => self.resolve(index).is_some_and(|node| {
                node.child_count() > 0 || (node.is_dir() && node.status != ScanStatus::Finished)
            }),
        }
    }

    // ── Values ─────────────────────────────────────────────────────────────

    pub fn data(&self, index: &ModelIndex, role: Role) -> Option<FieldValue> {
        let node = self.resolve(index)?;
        self.fields.value(node, index.column(), role)
    }

    pub fn header_data(&self, section: usize) -> Option<&str> {
        self.fields.label(section)
    }

    pub fn flags(&self, index: &ModelIndex) -> ItemFlags {
        if self.resolve(index).is_none() {
            return ItemFlags::default();
        }
        ItemFlags {
            selectable: true,
            enabled: true,
            user_checkable: index.column() == 0,
        }
    }

    pub fn is_dir(&self, index: &ModelIndex) -> bool {
        self.resolve(index).is_some_and(FileNode::is_dir)
    }

    pub fn file_path(&self, index: &ModelIndex) -> Option<PathBuf> {
        self.tree.full_path(self.resolve_id(index)?)
    }

    pub fn check_state(&self, index: &ModelIndex) -> Option<CheckState> {
        self.resolve(index).map(|node| node.check)
    }

    pub fn scan_status(&self, index: &ModelIndex) -> Option<ScanStatus> {
        self.resolve(index).map(|node| node.status)
    }

    // ── Lazy loading ───────────────────────────────────────────────────────

    /// `true` for a directory whose listing has not finished.
    pub fn can_fetch_more(&self, index: &ModelIndex) -> bool {
        self.resolve(index)
            .is_some_and(|node| node.is_dir() && node.status != ScanStatus::Finished)
    }

    /// Start scanning `index`'s directory if it has never been scanned.
    ///
    /// Returns `true` if a scan was started. Calling it again while the scan
    /// runs, or after it finished, does nothing.
    pub fn fetch_more(&mut self, index: &ModelIndex) -> bool {
        let Some(id) = self.resolve_id(index) else {
            return false;
        };
        if self.tree.node(id).status != ScanStatus::NotScanned {
            return false;
        }
        self.scans.run_scan(&mut self.tree, id).is_some()
    }

    // ── Selection ──────────────────────────────────────────────────────────

    /// Set the check state of `index`'s node and propagate it.
    ///
    /// Only `Checked` and `Unchecked` can be requested.
    pub fn set_check_state(&mut self, index: &ModelIndex, state: CheckState) -> Result<(), ModelError> {
        let id = self.resolve_id(index).ok_or(ModelError::InvalidIndex)?;
        if index.column() != 0 {
            return Err(ModelError::NotCheckable {
                column: index.column(),
            });
        }
        if state == CheckState::PartiallyChecked {
            return Err(ModelError::PartialCheckNotSettable);
        }
        check::set_check_state(&mut self.tree, id, state, &mut self.notifier);
        Ok(())
    }

    /// Generic write entry point. Only [`Role::CheckState`] is writable.
    ///
    /// Returns `Ok(false)` when the value is not a check state.
    pub fn set_data(
        &mut self,
        index: &ModelIndex,
        value: &FieldValue,
        role: Role,
    ) -> Result<bool, ModelError> {
        if role != Role::CheckState {
            return Err(ModelError::UnsupportedRole { role });
        }
        match value.as_check() {
            Some(state) => self.set_check_state(index, state).map(|()| true),
            None => Ok(false),
        }
    }

    /// Paths of the topmost fully-checked entries, in tree order.
    pub fn checked_paths(&self) -> Vec<PathBuf> {
        check::topmost_checked(&self.tree)
            .into_iter()
            .filter_map(|id| self.tree.full_path(id))
            .collect()
    }

    /// Addresses of the topmost fully-checked entries, in tree order.
    pub fn checked_indexes(&self) -> Vec<ModelIndex> {
        check::topmost_checked(&self.tree)
            .into_iter()
            .map(|id| ModelIndex::of_node(self.tree.node(id), id, 0))
            .collect()
    }

    // ── Scan pumping ───────────────────────────────────────────────────────

    /// Apply pending scan messages without blocking.
    ///
    /// At most `max_events_per_pump` messages are applied per call so a huge
    /// directory cannot stall the caller's frame. Returns `true` if the tree
    /// changed.
    pub fn process_scan_events(&mut self) -> bool {
        let mut changed = false;
        for _ in 0..self.config.max_events_per_pump {
            let Some(msg) = self.scans.try_next() else {
                break;
            };
            changed |= self.scans.apply(msg, &mut self.tree, &mut self.notifier);
        }
        changed
    }

    /// Apply scan messages until no scan is in flight or `timeout` elapses.
    ///
    /// Returns `true` if every scan finished in time.
    pub fn process_until_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.scans.in_flight() > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            if let Some(msg) = self.scans.next_timeout(remaining) {
                self.scans.apply(msg, &mut self.tree, &mut self.notifier);
            }
        }
        true
    }

    /// `true` while any directory scan is in flight.
    pub fn is_scanning(&self) -> bool {
        self.scans.in_flight() > 0
    }

    pub fn scan_stats(&self) -> ScanStats {
        self.scans.stats()
    }

    // ── Internals ──────────────────────────────────────────────────────────

    /// Node behind `index`, if it belongs to the current tree and the column exists.
    fn resolve(&self, index: &ModelIndex) -> Option<&FileNode> {
        if index.column() >= self.column_count() {
            return None;
        }
        let node = self.tree.get(index.node_id())?;
        (node.row == index.row()).then_some(node)
    }

    fn resolve_id(&self, index: &ModelIndex) -> Option<NodeId> {
        self.resolve(index).map(|_| index.node_id())
    }
}

/// Display name for the root: the last path component, or the whole path for
/// filesystem roots like `/` or `C:\`.
fn root_display_name(path: &Path) -> CompactString {
    match path.file_name() {
        Some(name) => CompactString::new(name.to_string_lossy()),
        None => CompactString::new(path.to_string_lossy()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::EventLog;

    fn model() -> FileSystemModel {
        let config = ModelConfig {
            worker_threads: 2,
            ..ModelConfig::default()
        };
        FileSystemModel::new(config).unwrap()
    }

    #[test]
    fn test_empty_model() {
        let model = model();
        assert_eq!(model.row_count(None), 0);
        assert_eq!(model.index(0, 0, None), None);
        assert!(!model.has_children(None));
        assert_eq!(model.column_count(), 6);
        assert_eq!(model.header_data(1), Some("Size"));
    }

    #[test]
    fn test_missing_root_leaves_model_empty() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut model = model();
        let log = EventLog::new();
        model.subscribe(log.clone());

        model.set_root(tmp.path().join("does-not-exist"));
        assert_eq!(model.row_count(None), 0);
        assert!(!model.is_scanning());
        assert_eq!(
            log.snapshot(),
            vec![ModelEvent::ModelAboutToBeReset, ModelEvent::ModelReset]
        );
    }

    #[test]
    fn test_out_of_range_addresses() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut model = model();
        model.set_root(tmp.path());
        assert!(model.process_until_idle(Duration::from_secs(30)));

        let root = model.root_index().unwrap();
        assert_eq!(model.index(1, 0, None), None);
        assert_eq!(model.index(0, 6, None), None);
        assert_eq!(model.index(0, 0, Some(&root)), None);
        assert_eq!(model.parent(&root), None);
        assert_eq!(model.data(&root.sibling_at_column(9), Role::Display), None);
    }

    #[test]
    fn test_root_display_name() {
        assert_eq!(root_display_name(Path::new("/home/user/docs")), "docs");
        assert_eq!(root_display_name(Path::new("/")), "/");
    }

    #[test]
    fn test_flags() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut model = model();
        model.set_root(tmp.path());
        let root = model.root_index().unwrap();

        assert!(model.flags(&root).user_checkable);
        let size_cell = root.sibling_at_column(1);
        let flags = model.flags(&size_cell);
        assert!(flags.selectable && flags.enabled && !flags.user_checkable);
    }

    #[test]
    fn test_set_data_routes_check_state() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut model = model();
        model.set_root(tmp.path());
        let root = model.root_index().unwrap();

        let checked = FieldValue::Check(CheckState::Checked);
        assert!(model.set_data(&root, &checked, Role::CheckState).unwrap());
        assert_eq!(model.check_state(&root), Some(CheckState::Checked));

        let text = FieldValue::Text(CompactString::new("x"));
        assert!(!model.set_data(&root, &text, Role::CheckState).unwrap());
        assert!(matches!(
            model.set_data(&root, &checked, Role::Display),
            Err(ModelError::UnsupportedRole { .. })
        ));
        assert!(matches!(
            model.set_check_state(&root.sibling_at_column(2), CheckState::Unchecked),
            Err(ModelError::NotCheckable { column: 2 })
        ));
    }

    #[test]
    fn test_partial_check_is_rejected() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(tmp.path().join("leaf"), b"x").unwrap();
        let mut model = model();
        model.set_root(tmp.path());
        assert!(model.process_until_idle(Duration::from_secs(30)));
        let root = model.root_index().unwrap();
        let leaf = model.index(0, 0, Some(&root)).unwrap();
        let log = EventLog::new();
        model.subscribe(log.clone());

        assert!(matches!(
            model.set_check_state(&leaf, CheckState::PartiallyChecked),
            Err(ModelError::PartialCheckNotSettable)
        ));
        let partial = FieldValue::Check(CheckState::PartiallyChecked);
        assert!(matches!(
            model.set_data(&root, &partial, Role::CheckState),
            Err(ModelError::PartialCheckNotSettable)
        ));
        assert_eq!(model.check_state(&leaf), Some(CheckState::Unchecked));
        assert_eq!(model.check_state(&root), Some(CheckState::Unchecked));
        assert!(log.is_empty());
    }

    #[test]
    fn test_stale_index_after_reset() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut model = model();
        model.set_root(tmp.path());
        let old_root = model.root_index().unwrap();

        model.set_root(tmp.path());
        let new_root = model.root_index().unwrap();
        assert_ne!(old_root, new_root);
        assert_eq!(model.data(&old_root, Role::Display), None);
        assert!(!model.can_fetch_more(&old_root));
        assert!(matches!(
            model.set_check_state(&old_root, CheckState::Checked),
            Err(ModelError::InvalidIndex)
        ));
    }
}
