/// Browse session — the state a tree view keeps on top of the model.
///
/// Centralises the flattened visible-row list and the set of expanded
/// directories. Scan results reach the model through [`BrowseSession::pump`],
/// which runs once per frame; whenever the model reports a structural change
/// the visible rows are rebuilt with the expansion state preserved.
use lookfor_core::index::EventLog;
use lookfor_core::{
    CheckState, FileSystemModel, ModelConfig, ModelError, ModelEvent, ModelIndex, NodeId,
};
use std::collections::HashSet;
use std::path::{Component, Path};
use std::time::{Duration, Instant};
use tracing::debug;

/// Maximum rows in the flattened visible-rows list.
///
/// Fully expanding a huge tree would otherwise allocate without bound.
/// Collapsing a directory frees room for another.
pub const MAX_VISIBLE_ROWS: usize = 500_000;

/// A row in the flattened visible-rows list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VisibleRow {
    /// Column-0 address of the node.
    pub index: ModelIndex,
    /// Nesting depth (0 = root).
    pub depth: u16,
    /// Whether this directory is currently expanded (meaningless for files).
    pub expanded: bool,
}

pub struct BrowseSession {
    model: FileSystemModel,
    events: EventLog,
    visible_rows: Vec<VisibleRow>,
    expanded: HashSet<NodeId>,
}

impl BrowseSession {
    pub fn new(config: ModelConfig) -> Result<Self, ModelError> {
        Ok(Self::with_model(FileSystemModel::new(config)?))
    }

    /// Wrap an existing model, e.g. one built with a custom field registry.
    pub fn with_model(mut model: FileSystemModel) -> Self {
        let events = EventLog::new();
        model.subscribe(events.clone());
        let mut session = Self {
            model,
            events,
            visible_rows: Vec::new(),
            expanded: HashSet::new(),
        };
        session.sync();
        session
    }

    pub fn model(&self) -> &FileSystemModel {
        &self.model
    }

    pub fn rows(&self) -> &[VisibleRow] {
        &self.visible_rows
    }

    /// Point the session at a new root. The root starts out expanded.
    pub fn open(&mut self, path: impl AsRef<Path>) {
        self.model.set_root(path);
        self.sync();
    }

    /// Apply pending scan results. Called once per frame.
    ///
    /// Returns `true` if anything changed and the view should repaint.
    pub fn pump(&mut self) -> bool {
        self.model.process_scan_events();
        self.sync()
    }

    /// Pump until every scan has finished or `timeout` elapses.
    pub fn settle(&mut self, timeout: Duration) -> bool {
        let idle = self.model.process_until_idle(timeout);
        self.sync();
        idle
    }

    // ── Expansion ──────────────────────────────────────────────────────────

    /// Expand the directory at `row`, starting its scan if it was never listed.
    ///
    /// Children already discovered appear immediately; the rest are spliced
    /// in by later pumps. Returns `false` for files and out-of-range rows.
    pub fn expand(&mut self, row: usize) -> bool {
        let Some(&visible) = self.visible_rows.get(row) else {
            return false;
        };
        if !self.model.is_dir(&visible.index) {
            return false;
        }
        if visible.expanded {
            return true;
        }
        if self.model.can_fetch_more(&visible.index) && self.model.fetch_more(&visible.index) {
            debug!(path = ?self.model.file_path(&visible.index), "listing requested");
        }
        self.expanded.insert(visible.index.node_id());

        let headroom = MAX_VISIBLE_ROWS.saturating_sub(self.visible_rows.len());
        let child_depth = visible.depth + 1;
        let new_rows: Vec<VisibleRow> = (0..self.model.row_count(Some(&visible.index)))
            .filter_map(|r| self.model.index(r, 0, Some(&visible.index)))
            .take(headroom)
            .map(|index| VisibleRow {
                index,
                depth: child_depth,
                expanded: false,
            })
            .collect();

        let insert_pos = row + 1;
        self.visible_rows.splice(insert_pos..insert_pos, new_rows);
        self.visible_rows[row].expanded = true;
        true
    }

    /// Collapse the directory at `row`, hiding all of its descendants.
    pub fn collapse(&mut self, row: usize) -> bool {
        let Some(&visible) = self.visible_rows.get(row) else {
            return false;
        };
        if !visible.expanded {
            return false;
        }
        self.expanded.remove(&visible.index.node_id());

        let remove_start = row + 1;
        let mut remove_end = remove_start;
        while remove_end < self.visible_rows.len()
            && self.visible_rows[remove_end].depth > visible.depth
        {
            remove_end += 1;
        }
        for hidden in self.visible_rows.drain(remove_start..remove_end) {
            self.expanded.remove(&hidden.index.node_id());
        }
        self.visible_rows[row].expanded = false;
        true
    }

    pub fn toggle_expand(&mut self, row: usize) -> bool {
        match self.visible_rows.get(row).map(|r| r.expanded) {
            Some(true) => self.collapse(row),
            Some(false) => self.expand(row),
            None => false,
        }
    }

    /// Expand every directory shallower than `depth`, level by level.
    ///
    /// Each level's listings are pumped to completion before the next level is
    /// opened. Returns `false` if `timeout` ran out first.
    pub fn expand_to_depth(&mut self, depth: u16, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        for level in 0..depth {
            if !self.settle(deadline.saturating_duration_since(Instant::now())) {
                return false;
            }
            let pending: Vec<ModelIndex> = self
                .visible_rows
                .iter()
                .filter(|r| r.depth == level && !r.expanded && self.model.is_dir(&r.index))
                .map(|r| r.index)
                .collect();
            for index in pending {
                self.model.fetch_more(&index);
                self.expanded.insert(index.node_id());
            }
            self.rebuild_visible_rows();
        }
        self.settle(deadline.saturating_duration_since(Instant::now()))
    }

    // ── Lookup and selection ───────────────────────────────────────────────

    /// Resolve `path` to the address of an already-discovered entry.
    ///
    /// `path` must be the root or lie under it.
    pub fn find(&self, path: impl AsRef<Path>) -> Option<ModelIndex> {
        let root_path = self.model.root_path()?;
        let relative = path.as_ref().strip_prefix(root_path).ok()?;
        let tree = self.model.tree();

        let mut current = self.model.root_index()?;
        for component in relative.components() {
            let name = match component {
                Component::Normal(name) => name,
                Component::CurDir => continue,
                _ => return None,
            };
            let child = tree
                .children(current.node_id())
                .iter()
                .copied()
                .find(|&id| tree.node(id).info.file_name.as_os_str() == name)?;
            current = self
                .model
                .index(tree.node(child).row, 0, Some(&current))?;
        }
        Some(current)
    }

    /// Set the check state of the entry at `path`.
    ///
    /// Returns `Ok(false)` if no discovered entry has that path.
    pub fn set_checked(&mut self, path: impl AsRef<Path>, state: CheckState) -> Result<bool, ModelError> {
        let Some(index) = self.find(path) else {
            return Ok(false);
        };
        self.model.set_check_state(&index, state)?;
        self.sync();
        Ok(true)
    }

    /// Toggle the checkbox on a visible row: anything but `Checked` becomes
    /// `Checked`.
    pub fn toggle_checked(&mut self, row: usize) -> Result<(), ModelError> {
        let index = self
            .visible_rows
            .get(row)
            .map(|r| r.index)
            .ok_or(ModelError::InvalidIndex)?;
        let next = match self.model.check_state(&index) {
            Some(CheckState::Checked) => CheckState::Unchecked,
            _ => CheckState::Checked,
        };
        self.model.set_check_state(&index, next)?;
        self.sync();
        Ok(())
    }

    // ── Internals ──────────────────────────────────────────────────────────

    /// Consume recorded model events, rebuilding rows on structural change.
    fn sync(&mut self) -> bool {
        let events = self.events.drain();
        if events.is_empty() {
            return false;
        }

        let mut structural = false;
        for event in &events {
            match event {
                ModelEvent::ModelReset => {
                    self.expanded.clear();
                    if let Some(root) = self.model.root_index() {
                        self.expanded.insert(root.node_id());
                    }
                    structural = true;
                }
                ModelEvent::RowsInserted { .. } => structural = true,
                _ => {}
            }
        }
        if structural {
            self.rebuild_visible_rows();
        }
        true
    }

    /// Rebuild the flattened list from the model, keeping expansion state.
    fn rebuild_visible_rows(&mut self) {
        self.visible_rows.clear();
        if let Some(root) = self.model.root_index() {
            self.build_rows(root);
        }
    }

    /// Pre-order walk of the expanded part of the tree, on an explicit stack.
    fn build_rows(&mut self, root: ModelIndex) {
        let mut stack = vec![(root, 0u16)];
        while let Some((index, depth)) = stack.pop() {
            if self.visible_rows.len() >= MAX_VISIBLE_ROWS {
                break;
            }

            let expanded = self.expanded.contains(&index.node_id()) && self.model.is_dir(&index);
            self.visible_rows.push(VisibleRow {
                index,
                depth,
                expanded,
            });

            if expanded {
                let child_depth = depth.saturating_add(1);
                for row in (0..self.model.row_count(Some(&index))).rev() {
                    if let Some(child) = self.model.index(row, 0, Some(&index)) {
                        stack.push((child, child_depth));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn session() -> BrowseSession {
        let config = ModelConfig {
            worker_threads: 2,
            ..ModelConfig::default()
        };
        BrowseSession::new(config).unwrap()
    }

    fn name_of(session: &BrowseSession, row: usize) -> String {
        let index = session.rows()[row].index;
        session.model().tree().node(index.node_id()).info.name.to_string()
    }

    #[test]
    fn test_empty_session_has_no_rows() {
        let session = session();
        assert!(session.rows().is_empty());
        assert!(session.find("/").is_none());
    }

    #[test]
    fn test_open_shows_root_expanded() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("one"), b"1").unwrap();
        let mut session = session();
        session.open(tmp.path());
        assert_eq!(session.rows().len(), 1);
        assert!(session.rows()[0].expanded);

        assert!(session.settle(Duration::from_secs(30)));
        assert_eq!(session.rows().len(), 2);
        assert_eq!(name_of(&session, 1), "one");
        assert_eq!(session.rows()[1].depth, 1);
    }

    #[test]
    fn test_expand_file_is_refused() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("one"), b"1").unwrap();
        let mut session = session();
        session.open(tmp.path());
        session.settle(Duration::from_secs(30));

        assert!(!session.expand(1));
        assert!(!session.expand(99));
        assert!(!session.collapse(1));
    }

    #[test]
    fn test_collapse_root_hides_children() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("d")).unwrap();
        fs::write(tmp.path().join("d").join("inner"), b"x").unwrap();
        let mut session = session();
        session.open(tmp.path());
        session.settle(Duration::from_secs(30));

        assert!(session.expand(1));
        session.settle(Duration::from_secs(30));
        assert_eq!(session.rows().len(), 3);

        assert!(session.toggle_expand(0));
        assert_eq!(session.rows().len(), 1);
        assert!(!session.rows()[0].expanded);

        // Collapsing forgets nested expansion.
        assert!(session.toggle_expand(0));
        assert_eq!(session.rows().len(), 2);
    }

    #[test]
    fn test_deep_tree_rows_are_preorder() {
        const LEVELS: usize = 48;
        let tmp = TempDir::new().unwrap();
        let mut dir = tmp.path().to_path_buf();
        fs::write(dir.join("f"), b"x").unwrap();
        for _ in 0..LEVELS {
            dir.push("d");
            fs::create_dir(&dir).unwrap();
            fs::write(dir.join("f"), b"x").unwrap();
        }

        let mut session = session();
        session.open(tmp.path());
        assert!(session.expand_to_depth(LEVELS as u16 + 1, Duration::from_secs(60)));

        // root, every "d", and one "f" per directory
        let rows = session.rows();
        assert_eq!(rows.len(), 2 * LEVELS + 2);
        assert_eq!(rows.iter().map(|r| r.depth).max(), Some(LEVELS as u16 + 1));

        // Each row's parent is the nearest earlier row one level up.
        let tree = session.model().tree();
        for (i, row) in rows.iter().enumerate().skip(1) {
            let parent = rows[..i]
                .iter()
                .rev()
                .find(|r| r.depth + 1 == row.depth)
                .unwrap();
            assert_eq!(
                tree.parent(row.index.node_id()),
                Some(parent.index.node_id())
            );
        }
    }
}
