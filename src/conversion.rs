//! Converting every legacy dialog below a path.
//!
//! Each dialog is converted by its own engine run, so a dialog that cannot
//! be converted is rolled back (per the engine's failure policy) without
//! affecting the others. Under [`FailurePolicy::Rollback`] that is one
//! document copy per dialog.
//!
//! [`FailurePolicy::Rollback`]: dialog_rewrite::FailurePolicy::Rollback

use std::ops::ControlFlow;

use dialog_rewrite::{
    DialogStructureRule, RewriteEngine, RewriteError, RewriteOutcome, RewriteRule,
};
use dialog_tree::{DocumentTree, NodeRef, WalkAction, walk_node};
use tracing::{info, warn};

use crate::errors::{Error, Result};

/// Outcome of converting one dialog.
#[derive(Debug)]
pub struct DialogReport {
    /// Path of the legacy dialog before conversion.
    pub path: String,
    pub result: std::result::Result<RewriteOutcome, RewriteError>,
}

impl DialogReport {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Legacy dialogs below `start`, in document order: the nodes
/// [`DialogStructureRule`] matches.
///
/// Dialogs nested inside another dialog are not listed; converting the
/// outer dialog converts them as well.
pub fn find_legacy_dialogs(tree: &DocumentTree, start: NodeRef) -> Vec<NodeRef> {
    let mut dialogs = Vec::new();
    let _ = walk_node::<()>(tree, start, &mut |node| {
        if DialogStructureRule.matches(tree, node) {
            dialogs.push(node);
            ControlFlow::Continue(WalkAction::Skip)
        } else {
            ControlFlow::Continue(WalkAction::Advance)
        }
    });
    dialogs
}

/// Resolve `path` and convert every legacy dialog below it.
pub fn convert_dialogs(
    engine: &RewriteEngine,
    tree: &mut DocumentTree,
    path: &str,
) -> Result<Vec<DialogReport>> {
    let start = tree
        .resolve(path)
        .ok_or_else(|| Error::PathNotFound(path.to_owned()))?;

    let dialogs = find_legacy_dialogs(tree, start);
    info!(count = dialogs.len(), path, "found legacy dialogs");

    let mut reports = Vec::with_capacity(dialogs.len());
    for dialog in dialogs {
        let path = tree.path(dialog);
        let result = engine.run(tree, dialog);
        match &result {
            Ok(outcome) => info!(
                dialog = %path,
                converted = %tree.path(outcome.root),
                rewrites = outcome.rewrites,
                "converted dialog"
            ),
            Err(err) => warn!(dialog = %path, error = %err, "dialog not converted"),
        }
        reports.push(DialogReport { path, result });
    }
    Ok(reports)
}
