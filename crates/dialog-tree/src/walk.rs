//! Recursive traversal utilities for document trees.

use std::ops::ControlFlow;

use crate::refs::NodeRef;
use crate::tree::DocumentTree;

/// Controls whether to descend into children during a walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkAction {
    /// Continue walking and descend into the children.
    Advance,
    /// Skip the children of the current node.
    Skip,
}

/// Walk a node and its descendants in pre-order (parent before children,
/// children in sibling order).
pub fn walk_node<B>(
    tree: &DocumentTree,
    node: NodeRef,
    f: &mut dyn FnMut(NodeRef) -> ControlFlow<B, WalkAction>,
) -> ControlFlow<B, ()> {
    match f(node) {
        ControlFlow::Break(b) => return ControlFlow::Break(b),
        ControlFlow::Continue(WalkAction::Skip) => return ControlFlow::Continue(()),
        ControlFlow::Continue(WalkAction::Advance) => {}
    }
    for &child in tree.children(node) {
        walk_node(tree, child, f)?;
    }
    ControlFlow::Continue(())
}

/// Collect `node` and all of its descendants in pre-order.
pub fn descendants(tree: &DocumentTree, node: NodeRef) -> Vec<NodeRef> {
    let mut out = Vec::new();
    let _ = walk_node::<()>(tree, node, &mut |n| {
        out.push(n);
        ControlFlow::Continue(WalkAction::Advance)
    });
    out
}
