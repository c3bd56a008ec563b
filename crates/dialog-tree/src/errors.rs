//! Errors raised by structural tree operations.

use derive_more::{Display, Error};

use crate::refs::NodeRef;

pub type TreeResult<T> = Result<T, TreeError>;

#[derive(Clone, Debug, Display, Error, PartialEq, Eq)]
pub enum TreeError {
    /// A sibling with the same name already exists.
    #[display("{parent} already has a child named `{name}`")]
    DuplicateName { parent: String, name: String },

    /// Names must be non-empty and must not contain `/`.
    #[display("invalid node name `{_0}`")]
    InvalidName(#[error(not(source))] String),

    /// The handle refers to a node that was removed from the tree.
    #[display("{_0} has been removed from the tree")]
    Removed(#[error(not(source))] NodeRef),

    #[display("{node} and {sibling} do not share a parent")]
    NotSibling { node: NodeRef, sibling: NodeRef },
}
