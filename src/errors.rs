//! Error handling for the conversion host.

use derive_more::{Display, Error, From};
use dialog_rewrite::RewriteError;
use dialog_tree::TreeError;

/// Result type for host operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, From)]
pub enum Error {
    /// I/O errors when reading or writing documents.
    #[display("I/O error: {_0}")]
    Io(std::io::Error),

    /// The document is not valid JSON or does not have the node shape.
    #[display("invalid document: {_0}")]
    Json(serde_json::Error),

    /// The document violates a tree invariant (e.g. duplicate sibling names).
    #[display("invalid document: {_0}")]
    Tree(TreeError),

    #[display("conversion failed: {_0}")]
    Rewrite(RewriteError),

    #[from(ignore)]
    #[display("no node at path {_0}")]
    PathNotFound(#[error(not(source))] String),
}
