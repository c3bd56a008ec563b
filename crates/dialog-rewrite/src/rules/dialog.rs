//! Rewrites the basic structure of a legacy dialog.
//!
//! A `cq:Dialog` node is replaced by a sibling `cq:dialog` container whose
//! `content` is either a tab panel or a plain panel. The dialog's items (tabs
//! or widgets) are copied into `content/items` without being finalized, so
//! later rules of the same run convert them individually.
//!
//! ```text
//! dialog : cq:Dialog              cq:dialog : nt:unstructured
//!   items : cq:WidgetCollection     content : cq:Panel
//!     a                     =>        items : cq:WidgetCollection
//!     b                                 a
//!                                       b
//! ```

use dialog_tree::{DocumentTree, NodeRef};
use tracing::debug;

use super::schema::*;
use crate::errors::{RuleError, RuleResult};
use crate::rewriter::SubtreeRewriter;
use crate::rule::RewriteRule;

/// Child-name paths, relative to the dialog, where legacy authors put the
/// tab panel marker. Only these positions are inspected.
const TAB_MARKER_POSITIONS: [&[&str]; 3] = [&[], &[ITEMS], &[ITEMS, TABS]];

pub struct DialogStructureRule;

impl RewriteRule for DialogStructureRule {
    fn matches(&self, tree: &DocumentTree, node: NodeRef) -> bool {
        has_type(tree, node, DIALOG_TYPE)
    }

    fn apply(&self, rewriter: &mut SubtreeRewriter<'_>) -> RuleResult<NodeRef> {
        let root = rewriter.node();
        let tree = rewriter.tree();

        let Some(parent) = rewriter.parent() else {
            return Err(RuleError::structural_mismatch(format!(
                "dialog {} has no parent to hold the converted dialog",
                tree.path(root)
            )));
        };
        if tree.has_child(parent, CONTAINER_NAME) {
            return Err(RuleError::target_conflict(format!(
                "could not rewrite dialog: {}/{CONTAINER_NAME} already exists",
                tree.path(parent).trim_end_matches('/')
            )));
        }

        let tabbed = is_tabbed(tree, root);
        let dialog_items = dialog_items(tree, root)?;
        let help_path = tree.property(root, HELP_PATH_PROPERTY).cloned();
        let title = tree.property(root, TITLE_PROPERTY).cloned();
        let items_to_copy: Vec<(NodeRef, String)> = tree
            .children(dialog_items)
            .iter()
            .map(|&item| (item, tree.name(item).to_owned()))
            .collect();

        let container = rewriter.add_child(parent, CONTAINER_NAME, CONTAINER_TYPE)?;
        rewriter.finalize(container)?;
        rewriter.set_property(container, RESOURCE_TYPE_PROPERTY, DIALOG_RESOURCE_TYPE)?;
        if let Some(help_path) = help_path {
            rewriter.set_property(container, HELP_PATH_PROPERTY, help_path)?;
        }
        if let Some(title) = title {
            rewriter.set_property(container, JCR_TITLE_PROPERTY, title)?;
        }

        // The content panel is converted further by panel rules.
        let content_type = if tabbed { TAB_PANEL_TYPE } else { PANEL_TYPE };
        let content = rewriter.add_child(container, CONTENT_NAME, content_type)?;
        let items = rewriter.add_child(content, ITEMS, WIDGET_COLLECTION_TYPE)?;
        for (item, name) in &items_to_copy {
            rewriter.copy_subtree(*item, items, name)?;
        }

        rewriter.remove(root)?;

        debug!(
            tabbed,
            items = items_to_copy.len(),
            container = %rewriter.tree().path(container),
            "converted dialog structure"
        );
        Ok(container)
    }

    fn ranking(&self) -> i32 {
        1
    }

    fn name(&self) -> &'static str {
        "dialog-structure"
    }
}

/// Whether any of the [`TAB_MARKER_POSITIONS`] holds a tab panel.
fn is_tabbed(tree: &DocumentTree, dialog: NodeRef) -> bool {
    TAB_MARKER_POSITIONS.iter().any(|path| {
        descend(tree, dialog, path).is_some_and(|node| is_tab_panel(tree, node))
    })
}

fn descend(tree: &DocumentTree, node: NodeRef, path: &[&str]) -> Option<NodeRef> {
    path.iter().try_fold(node, |n, name| tree.child(n, name))
}

/// Returns the node whose children are the dialog's items: widgets, or tabs
/// for a tabbed dialog.
///
/// Follows the chain of `items` children down to the first widget
/// collection. A `tabs` tab panel inside that collection wraps the real
/// items one level deeper.
fn dialog_items(tree: &DocumentTree, dialog: NodeRef) -> RuleResult<NodeRef> {
    let not_found = || {
        RuleError::structural_mismatch(format!(
            "unable to find the dialog items of {}",
            tree.path(dialog)
        ))
    };

    let mut current = dialog;
    let collection = loop {
        let items = tree.child(current, ITEMS).ok_or_else(not_found)?;
        if has_type(tree, items, WIDGET_COLLECTION_TYPE) {
            break items;
        }
        current = items;
    };

    match tree.child(collection, TABS) {
        Some(tabs) if is_tab_panel(tree, tabs) => tree.child(tabs, ITEMS).ok_or_else(not_found),
        _ => Ok(collection),
    }
}
