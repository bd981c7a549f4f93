/// A single node in the arena-allocated tree.
///
/// Nodes are stored in a flat `Vec<FileNode>`. Parent-child relationships use
/// [`NodeId`]s rather than pointers, so nothing dangles when the tree is
/// discarded: ids minted before a reset carry an older generation and simply
/// stop resolving.
use super::entry::{EntryInfo, EntryKind};
use serde::{Deserialize, Serialize};

/// Generation-tagged index into the arena `Vec<FileNode>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    slot: u32,
    generation: u32,
}

impl NodeId {
    #[inline]
    pub(crate) fn new(slot: usize, generation: u32) -> Self {
        debug_assert!(slot <= u32::MAX as usize, "NodeId overflow");
        Self {
            slot: slot as u32,
            generation,
        }
    }

    /// Arena position as a `usize` for Vec indexing.
    #[inline]
    pub fn slot(self) -> usize {
        self.slot as usize
    }

    /// Tree generation this id was minted in.
    #[inline]
    pub fn generation(self) -> u32 {
        self.generation
    }
}

/// Tri-state check value used for hierarchical multi-select.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CheckState {
    #[default]
    Unchecked,
    PartiallyChecked,
    Checked,
}

impl CheckState {
    /// One-character marker used by text renderers.
    pub fn marker(self) -> char {
        match self {
            Self::Unchecked => ' ',
            Self::PartiallyChecked => '-',
            Self::Checked => 'x',
        }
    }
}

/// Lazy-load progress of a node's own directory listing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanStatus {
    #[default]
    NotScanned,
    Running,
    Finished,
}

/// A single file or directory in the tree.
#[derive(Debug, Clone)]
pub struct FileNode {
    pub info: EntryInfo,

    pub check: CheckState,

    pub status: ScanStatus,

    /// Position among the parent's children. Always 0 for the root.
    pub row: usize,

    /// `None` only for the root.
    pub parent: Option<NodeId>,

    /// Children in discovery order.
    pub children: Vec<NodeId>,
}

impl FileNode {
    pub(crate) fn new(info: EntryInfo, parent: Option<NodeId>, row: usize) -> Self {
        Self {
            info,
            check: CheckState::Unchecked,
            status: ScanStatus::NotScanned,
            row,
            parent,
            children: Vec::new(),
        }
    }

    #[inline]
    pub fn is_dir(&self) -> bool {
        self.info.kind == EntryKind::Directory
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    #[inline]
    pub fn child_count(&self) -> usize {
        self.children.len()
    }
}
