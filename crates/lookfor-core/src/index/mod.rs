/// Tree index adapter — row/column/parent addressing over the node store.
///
/// A view addresses cells with [`ModelIndex`] values and learns about changes
/// through [`ModelEvent`]s delivered synchronously, on the control thread, to
/// every subscribed [`ModelObserver`]. Structural insertions are always
/// bracketed: `RowsAboutToBeInserted` before the tree changes, `RowsInserted`
/// after, so a view can keep derived addressing valid.
pub mod fields;
pub mod model;

pub use fields::{FieldRegistry, FieldValue, IconKind};
pub use model::FileSystemModel;

use crate::model::{FileNode, NodeId};
use parking_lot::Mutex;
use std::sync::Arc;

/// Address of one cell: a node plus a column.
///
/// Only ever minted by the model, so `row` always equals the node's stored
/// position within its parent. An index kept across a `set_root` stops
/// resolving rather than pointing into the new tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ModelIndex {
    row: usize,
    column: usize,
    node: NodeId,
}

impl ModelIndex {
    pub(crate) fn of_node(node: &FileNode, id: NodeId, column: usize) -> Self {
        Self {
            row: node.row,
            column,
            node: id,
        }
    }

    #[inline]
    pub fn row(&self) -> usize {
        self.row
    }

    #[inline]
    pub fn column(&self) -> usize {
        self.column
    }

    #[inline]
    pub fn node_id(&self) -> NodeId {
        self.node
    }

    /// Same node, another column.
    pub fn sibling_at_column(&self, column: usize) -> Self {
        Self { column, ..*self }
    }
}

/// Which facet of a cell is being read or written.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// The column's field value.
    Display,
    /// Tri-state check value. Column 0 only.
    CheckState,
    /// Icon kind. Column 0 only.
    Decoration,
}

/// Per-cell capabilities.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ItemFlags {
    pub selectable: bool,
    pub enabled: bool,
    pub user_checkable: bool,
}

/// Change notifications emitted by [`FileSystemModel`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModelEvent {
    /// The whole tree is about to be discarded.
    ModelAboutToBeReset,
    /// A new (possibly empty) tree is in place.
    ModelReset,
    /// Rows `first..=last` are about to appear under `parent`.
    RowsAboutToBeInserted {
        parent: ModelIndex,
        first: usize,
        last: usize,
    },
    /// Rows `first..=last` now exist under `parent`.
    RowsInserted {
        parent: ModelIndex,
        first: usize,
        last: usize,
    },
    /// Cells between the two corners (same parent) changed.
    DataChanged {
        top_left: ModelIndex,
        bottom_right: ModelIndex,
    },
}

/// Receives model events on the control thread.
pub trait ModelObserver: Send {
    fn on_event(&mut self, event: &ModelEvent);
}

impl<F> ModelObserver for F
where
    F: FnMut(&ModelEvent) + Send,
{
    fn on_event(&mut self, event: &ModelEvent) {
        self(event)
    }
}

/// Fan-out of model events to subscribed observers.
#[derive(Default)]
pub struct Notifier {
    observers: Vec<Box<dyn ModelObserver>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: impl ModelObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn emit(&mut self, event: ModelEvent) {
        for observer in &mut self.observers {
            observer.on_event(&event);
        }
    }
}

/// Observer that records every event into a shared buffer.
///
/// Clone it, subscribe one clone, and read or drain from the other.
#[derive(Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<ModelEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return everything recorded so far.
    pub fn drain(&self) -> Vec<ModelEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    /// Copy of everything recorded so far.
    pub fn snapshot(&self) -> Vec<ModelEvent> {
        self.events.lock().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl ModelObserver for EventLog {
    fn on_event(&mut self, event: &ModelEvent) {
        self.events.lock().push(event.clone());
    }
}
