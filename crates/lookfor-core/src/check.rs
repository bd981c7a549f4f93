/// Checkbox propagation — hierarchical tri-state selection.
///
/// Setting a node's state forces it onto the whole subtree, then walks up to
/// the root recomputing each ancestor from its direct children: all children
/// agree → that state, otherwise `PartiallyChecked`. The result keeps the
/// invariant that a node is `PartiallyChecked` exactly when its children
/// disagree or one of them is itself partial.
///
/// Every state change is announced with `DataChanged`: one range per parent
/// level on the way down, one single-row event per node on the way up.
use crate::index::{ModelEvent, ModelIndex, Notifier};
use crate::model::{CheckState, FileTree, NodeId};

/// Set `node` to `state` and propagate in both directions.
///
/// Returns `false` (and does nothing) if `node` is not part of `tree` or
/// `state` is `PartiallyChecked`, which is only ever derived.
pub fn set_check_state(
    tree: &mut FileTree,
    node: NodeId,
    state: CheckState,
    notifier: &mut Notifier,
) -> bool {
    if state == CheckState::PartiallyChecked {
        return false;
    }
    let Some(target) = tree.get_mut(node) else {
        return false;
    };
    target.check = state;

    force_subtree(tree, node, state, notifier);
    recompute_ancestors(tree, node, notifier);
    true
}

/// Push `state` onto every descendant of `node`.
fn force_subtree(tree: &mut FileTree, node: NodeId, state: CheckState, notifier: &mut Notifier) {
    let mut stack = vec![node];
    while let Some(id) = stack.pop() {
        let child_count = tree.node(id).child_count();
        if child_count == 0 {
            continue;
        }
        for row in 0..child_count {
            let child = tree.node(id).children[row];
            tree.node_mut(child).check = state;
        }

        let children = &tree.node(id).children;
        let (first, last) = (children[0], children[child_count - 1]);
        notifier.emit(ModelEvent::DataChanged {
            top_left: ModelIndex::of_node(tree.node(first), first, 0),
            bottom_right: ModelIndex::of_node(tree.node(last), last, 0),
        });
        stack.extend(children.iter().rev().copied());
    }
}

/// Announce `node`, then climb to the root re-deriving each ancestor.
fn recompute_ancestors(tree: &mut FileTree, node: NodeId, notifier: &mut Notifier) {
    let mut current = node;
    loop {
        let current_node = tree.node(current);
        notifier.emit(ModelEvent::DataChanged {
            top_left: ModelIndex::of_node(current_node, current, 0),
            bottom_right: ModelIndex::of_node(current_node, current, 0),
        });

        let Some(parent) = current_node.parent else {
            break;
        };
        if let Some(derived) = children_state(tree, parent) {
            tree.node_mut(parent).check = derived;
        }
        current = parent;
    }
}

/// Common state of `node`'s direct children, or `PartiallyChecked` if any two
/// disagree. `None` for a childless node.
pub fn children_state(tree: &FileTree, node: NodeId) -> Option<CheckState> {
    let mut children = tree.children(node).iter().map(|&c| tree.node(c).check);
    let first = children.next()?;
    if children.all(|state| state == first) {
        Some(first)
    } else {
        Some(CheckState::PartiallyChecked)
    }
}

/// Topmost fully-checked nodes under the root, in pre-order.
///
/// A checked directory stands for its whole subtree, so its descendants are
/// not listed separately. Partially checked directories are descended into.
pub fn topmost_checked(tree: &FileTree) -> Vec<NodeId> {
    let mut selected = Vec::new();
    let Some(root) = tree.root() else {
        return selected;
    };
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        match tree.node(id).check {
            CheckState::Checked => selected.push(id),
            CheckState::PartiallyChecked => {
                stack.extend(tree.children(id).iter().rev().copied());
            }
            CheckState::Unchecked => {}
        }
    }
    selected
}
