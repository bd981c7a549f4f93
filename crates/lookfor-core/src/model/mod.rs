/// Node store for the LookFor filesystem index.
///
/// Re-exports the arena tree, its node type and the entry descriptors that
/// scan workers produce.
pub mod entry;
pub mod node;
pub mod size;
pub mod tree;

pub use entry::{EntryInfo, EntryKind};
pub use node::{CheckState, FileNode, NodeId, ScanStatus};
pub use tree::FileTree;
