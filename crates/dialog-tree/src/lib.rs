//! Arena-backed node tree for dialog definition documents.
//!
//! A document is a single [`DocumentTree`] that owns every node. Nodes are
//! addressed by [`NodeRef`] handles which are never reused, so a handle to a
//! removed node can never alias a live one.

pub mod errors;
pub mod printer;
pub mod refs;
pub mod tree;
pub mod value;
pub mod walk;

pub use errors::{TreeError, TreeResult};
pub use printer::print_subtree;
pub use refs::NodeRef;
pub use tree::{DocumentTree, NodeData};
pub use value::PropertyValue;
pub use walk::{WalkAction, descendants, walk_node};
