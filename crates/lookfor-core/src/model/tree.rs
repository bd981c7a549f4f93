/// Arena-backed node store.
///
/// All nodes live in a single `Vec<FileNode>`. Relationships between nodes use
/// [`NodeId`] rather than heap pointers. The store is a plain data structure:
/// no locking, no channels. Only the control thread touches it.
use super::entry::EntryInfo;
use super::node::{CheckState, FileNode, NodeId};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct FileTree {
    /// Arena: every node of the current generation.
    nodes: Vec<FileNode>,

    root: Option<NodeId>,

    /// Absolute location of the root; child paths are rebuilt from it.
    root_path: PathBuf,

    /// Bumped by [`clear`](Self::clear) so ids from a discarded tree never resolve.
    generation: u32,
}

impl FileTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty tree with pre-allocated capacity.
    pub fn with_capacity(estimated_nodes: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(estimated_nodes),
            ..Self::default()
        }
    }

    /// Install the single root node. Any previous content is discarded first.
    pub fn set_root(&mut self, path: &Path, info: EntryInfo) -> NodeId {
        if !self.nodes.is_empty() {
            self.clear();
        }
        let id = NodeId::new(0, self.generation);
        self.nodes.push(FileNode::new(info, None, 0));
        self.root = Some(id);
        self.root_path = path.to_path_buf();
        id
    }

    /// Append a child to `parent` and return its id.
    ///
    /// The child's row is the parent's current child count. A child discovered
    /// under a parent that is not `Unchecked` starts out `Checked`, so streamed
    /// entries stay consistent with an in-progress selection.
    ///
    /// Returns `None` if `parent` does not belong to the current tree.
    pub fn add_child(&mut self, parent: NodeId, info: EntryInfo) -> Option<NodeId> {
        if !self.contains(parent) {
            return None;
        }
        let id = NodeId::new(self.nodes.len(), self.generation);
        let parent_node = &mut self.nodes[parent.slot()];
        let row = parent_node.children.len();
        parent_node.children.push(id);
        let inherited = if parent_node.check == CheckState::Unchecked {
            CheckState::Unchecked
        } else {
            CheckState::Checked
        };

        let mut node = FileNode::new(info, Some(parent), row);
        node.check = inherited;
        self.nodes.push(node);
        Some(id)
    }

    /// Discard every node. Outstanding ids become stale.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.root_path = PathBuf::new();
        self.generation = self.generation.wrapping_add(1);
    }

    #[inline]
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    #[inline]
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// `true` if `id` refers to a live node of this tree.
    #[inline]
    pub fn contains(&self, id: NodeId) -> bool {
        id.generation() == self.generation && id.slot() < self.nodes.len()
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&FileNode> {
        if self.contains(id) {
            Some(&self.nodes[id.slot()])
        } else {
            None
        }
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut FileNode> {
        if self.contains(id) {
            Some(&mut self.nodes[id.slot()])
        } else {
            None
        }
    }

    /// Get the node for an id known to be live.
    ///
    /// Panics on a stale id; use [`get`](Self::get) for untrusted ids.
    #[inline]
    pub fn node(&self, id: NodeId) -> &FileNode {
        assert!(self.contains(id), "stale NodeId {id:?}");
        &self.nodes[id.slot()]
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut FileNode {
        assert!(self.contains(id), "stale NodeId {id:?}");
        &mut self.nodes[id.slot()]
    }

    /// Direct children in discovery order. Empty for stale ids.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// The `row`-th child of `id`.
    pub fn child(&self, id: NodeId, row: usize) -> Option<NodeId> {
        self.get(id)?.children.get(row).copied()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.parent
    }

    /// Reconstruct the full path for a node by walking up to the root.
    pub fn full_path(&self, id: NodeId) -> Option<PathBuf> {
        let mut segments = Vec::new();
        let mut current = id;
        loop {
            let node = self.get(current)?;
            match node.parent {
                Some(parent) => {
                    segments.push(node.info.file_name.as_os_str());
                    current = parent;
                }
                None => break,
            }
        }
        let mut path = self.root_path.clone();
        for segment in segments.iter().rev() {
            path.push(segment);
        }
        Some(path)
    }

    /// Total number of nodes in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the tree contains no nodes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EntryKind;

    fn dir(name: &str) -> EntryInfo {
        EntryInfo::bare(name, EntryKind::Directory)
    }

    fn file(name: &str, size: u64) -> EntryInfo {
        let mut info = EntryInfo::bare(name, EntryKind::File);
        info.size = size;
        info
    }

    #[test]
    fn test_rows_follow_insertion_order() {
        let mut tree = FileTree::with_capacity(4);
        let root = tree.set_root(Path::new("/data"), dir("data"));
        let a = tree.add_child(root, file("a.txt", 1)).unwrap();
        let b = tree.add_child(root, dir("b")).unwrap();
        let c = tree.add_child(root, file("c.txt", 3)).unwrap();

        assert_eq!(tree.children(root), &[a, b, c]);
        for (row, &id) in tree.children(root).iter().enumerate() {
            assert_eq!(tree.node(id).row, row);
            assert_eq!(tree.parent(id), Some(root));
        }
        assert_eq!(tree.child(root, 1), Some(b));
        assert_eq!(tree.child(root, 3), None);
        assert!(tree.node(root).is_root());
    }

    #[test]
    fn test_full_path() {
        let mut tree = FileTree::with_capacity(4);
        let root = tree.set_root(Path::new("/data"), dir("data"));
        let users = tree.add_child(root, dir("users")).unwrap();
        let file = tree.add_child(users, file("test.txt", 50)).unwrap();

        assert_eq!(tree.full_path(root).unwrap(), PathBuf::from("/data"));
        assert_eq!(
            tree.full_path(file).unwrap(),
            PathBuf::from("/data/users/test.txt")
        );
    }

    #[test]
    fn test_child_inherits_check_from_selected_parent() {
        let mut tree = FileTree::new();
        let root = tree.set_root(Path::new("/r"), dir("r"));
        let plain = tree.add_child(root, file("plain", 0)).unwrap();
        assert_eq!(tree.node(plain).check, CheckState::Unchecked);

        tree.node_mut(root).check = CheckState::Checked;
        let checked = tree.add_child(root, file("checked", 0)).unwrap();
        assert_eq!(tree.node(checked).check, CheckState::Checked);

        tree.node_mut(root).check = CheckState::PartiallyChecked;
        let partial = tree.add_child(root, file("partial", 0)).unwrap();
        assert_eq!(tree.node(partial).check, CheckState::Checked);
    }

    #[test]
    fn test_clear_invalidates_old_ids() {
        let mut tree = FileTree::new();
        let root = tree.set_root(Path::new("/old"), dir("old"));
        let child = tree.add_child(root, file("x", 1)).unwrap();

        tree.clear();
        assert!(tree.is_empty());
        assert!(tree.root().is_none());
        assert!(tree.get(root).is_none());
        assert!(tree.add_child(root, file("y", 1)).is_none());

        // A new tree reuses slot 0, but the old id must not resolve to it.
        let new_root = tree.set_root(Path::new("/new"), dir("new"));
        assert_eq!(new_root.slot(), root.slot());
        assert!(tree.get(root).is_none());
        assert!(tree.get(child).is_none());
        assert!(tree.get(new_root).is_some());
    }

    #[cfg(unix)]
    #[test]
    fn test_full_path_uses_raw_names() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let mut tree = FileTree::new();
        let root = tree.set_root(Path::new("/r"), dir("r"));
        let mut info = dir("bad\u{fffd}name");
        info.file_name = OsStr::from_bytes(b"bad\xffname").to_os_string();
        let bad = tree.add_child(root, info).unwrap();
        let inner = tree.add_child(bad, file("x.txt", 1)).unwrap();

        let mut expected = PathBuf::from("/r");
        expected.push(OsStr::from_bytes(b"bad\xffname"));
        expected.push("x.txt");
        assert_eq!(tree.full_path(inner).unwrap(), expected);
    }
}
