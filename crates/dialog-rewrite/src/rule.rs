//! Rewrite rule trait.

use dialog_tree::{DocumentTree, NodeRef};

use crate::errors::RuleResult;
use crate::rewriter::SubtreeRewriter;

/// A rule that can match and transform one legacy structural pattern.
///
/// Rules must be stateless with respect to the nodes they visit: the same
/// instance may be shared by engine runs on different trees at the same
/// time, hence the `Send + Sync` bound.
pub trait RewriteRule: Send + Sync {
    /// Test whether the rule applies to `node`.
    ///
    /// Must be a pure predicate over the current tree.
    fn matches(&self, tree: &DocumentTree, node: NodeRef) -> bool;

    /// Rewrite the node held by `rewriter`, which previously satisfied
    /// [`RewriteRule::matches`].
    ///
    /// Returns the node that now represents the rewritten position. Nodes
    /// that must not be revisited during this run are recorded with
    /// [`SubtreeRewriter::finalize`]. The tree must stay well-formed even
    /// when an error is returned.
    fn apply(&self, rewriter: &mut SubtreeRewriter<'_>) -> RuleResult<NodeRef>;

    /// Priority of the rule; higher rankings are tried first.
    fn ranking(&self) -> i32 {
        0
    }

    /// Optional: return a human-readable name for diagnostics.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
