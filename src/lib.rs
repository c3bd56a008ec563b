//! Host-side conversion of legacy dialog documents.
//!
//! Loads JSON documents into [`DocumentTree`]s, runs the rewrite engine on
//! every legacy dialog and writes the result back.
//!
//! [`DocumentTree`]: dialog_tree::DocumentTree

pub mod conversion;
pub mod document;
pub mod errors;

pub use conversion::{DialogReport, convert_dialogs, find_legacy_dialogs};
pub use errors::{Error, Result};
