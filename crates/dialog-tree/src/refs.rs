//! Entity references for the document arena.

use cranelift_entity::entity_impl;

/// Reference to a node in a [`DocumentTree`](crate::DocumentTree).
///
/// A thin `u32` wrapper indexing into the tree's `PrimaryMap`. Slots are
/// never recycled, so equality of two refs is node identity for the
/// lifetime of the tree.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeRef(u32);
entity_impl!(NodeRef, "node");
