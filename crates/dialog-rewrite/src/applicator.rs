//! RewriteEngine: fixpoint application of rewrite rules.
//!
//! The engine walks the tree in pre-order from the start node. At the first
//! non-finalized node matched by a rule it applies that rule, then discards
//! the traversal and starts a fresh walk, since a rewrite may have changed
//! ancestors, siblings and descendants of the matched node at once. The run
//! ends when a full walk finds no match, or fails when a rule fails or the
//! rewrite budget is exhausted.

use std::collections::HashSet;
use std::ops::ControlFlow;

use dialog_tree::{DocumentTree, NodeRef, TreeError, WalkAction, walk_node};
use tracing::{debug, trace, warn};

use crate::errors::{RewriteError, RewriteErrorKind};
use crate::registry::RuleRegistry;
use crate::rewriter::SubtreeRewriter;
use crate::rule::RewriteRule;

const DEFAULT_MAX_REWRITES: usize = 1000;

/// What happens to the tree when a run fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Restore the tree to its state before the run.
    ///
    /// Every run clones the whole tree up front, successful runs included,
    /// so a caller issuing one run per subtree pays for one full copy per
    /// run. Use [`FailurePolicy::KeepPartial`] when the caller can discard
    /// a failed tree itself.
    #[default]
    Rollback,
    /// Leave the tree as the failing run left it.
    KeepPartial,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Maximum number of successful rewrites in a single run.
    pub max_rewrites: usize,
    pub failure_policy: FailurePolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_rewrites: DEFAULT_MAX_REWRITES,
            failure_policy: FailurePolicy::default(),
        }
    }
}

/// Phases of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineState {
    Scanning,
    Matched,
    Rewriting,
    Done,
    Failed,
}

/// One successful rule application.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RewriteStep {
    pub rule: &'static str,
    /// Path of the matched node.
    pub path: String,
    /// Path of the node the rule returned.
    pub replacement: String,
}

/// Result of a successful run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RewriteOutcome {
    /// Root of the rewritten subtree. Callers must rebind to it.
    pub root: NodeRef,
    pub rewrites: usize,
    /// Number of full walks, including the final one that found no match.
    pub traversals: usize,
    pub steps: Vec<RewriteStep>,
}

/// Per-run bookkeeping. Never shared between runs.
struct RunState {
    root: NodeRef,
    finalized: HashSet<NodeRef>,
    state: EngineState,
    traversals: usize,
    steps: Vec<RewriteStep>,
}

impl RunState {
    fn transition(&mut self, next: EngineState) {
        trace!(from = ?self.state, to = ?next, "engine state");
        self.state = next;
    }

    fn fail(&mut self, error: RewriteError) -> RewriteError {
        self.transition(EngineState::Failed);
        error
    }
}

/// Applies a [`RuleRegistry`] to document trees until a fixpoint.
///
/// The engine holds no per-run state, so one engine can serve many runs,
/// including concurrent runs on different trees.
pub struct RewriteEngine {
    registry: RuleRegistry,
    config: EngineConfig,
}

impl RewriteEngine {
    pub fn new(registry: RuleRegistry) -> Self {
        Self {
            registry,
            config: EngineConfig::default(),
        }
    }

    /// Set maximum number of rewrites per run.
    pub fn with_max_rewrites(mut self, n: usize) -> Self {
        self.config.max_rewrites = n;
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.config.failure_policy = policy;
        self
    }

    /// Rewrite the whole document, starting at the document root.
    pub fn rewrite_document(&self, tree: &mut DocumentTree) -> Result<RewriteOutcome, RewriteError> {
        let root = tree.root();
        self.run(tree, root)
    }

    /// Rewrite the subtree rooted at `start` until no rule matches.
    ///
    /// On failure the tree is rolled back or left as is, according to the
    /// configured [`FailurePolicy`].
    pub fn run(
        &self,
        tree: &mut DocumentTree,
        start: NodeRef,
    ) -> Result<RewriteOutcome, RewriteError> {
        let snapshot = match self.config.failure_policy {
            FailurePolicy::Rollback => Some(tree.clone()),
            FailurePolicy::KeepPartial => None,
        };

        let result = self.run_to_fixpoint(tree, start);

        if let Err(err) = &result {
            warn!(error = %err, "rewrite run failed");
            if let Some(snapshot) = snapshot {
                *tree = snapshot;
                debug!("tree rolled back to its state before the run");
            }
        }
        result
    }

    fn run_to_fixpoint(
        &self,
        tree: &mut DocumentTree,
        start: NodeRef,
    ) -> Result<RewriteOutcome, RewriteError> {
        if !tree.is_alive(start) {
            return Err(RewriteError::new(
                RewriteErrorKind::Tree(TreeError::Removed(start)),
                None,
                tree.path(start),
            ));
        }

        let mut run = RunState {
            root: start,
            finalized: HashSet::new(),
            state: EngineState::Scanning,
            traversals: 0,
            steps: Vec::new(),
        };

        loop {
            run.transition(EngineState::Scanning);
            run.traversals += 1;

            let Some((node, rule)) = self.scan(tree, run.root, &run.finalized) else {
                run.transition(EngineState::Done);
                debug!(
                    rewrites = run.steps.len(),
                    traversals = run.traversals,
                    "fixpoint reached"
                );
                return Ok(RewriteOutcome {
                    root: run.root,
                    rewrites: run.steps.len(),
                    traversals: run.traversals,
                    steps: run.steps,
                });
            };

            run.transition(EngineState::Matched);
            if run.steps.len() >= self.config.max_rewrites {
                let error = RewriteError::new(
                    RewriteErrorKind::NonTermination {
                        limit: self.config.max_rewrites,
                    },
                    Some(rule.name()),
                    tree.path(node),
                );
                return Err(run.fail(error));
            }

            run.transition(EngineState::Rewriting);
            if let Err(error) = self.rewrite_node(tree, node, rule, &mut run) {
                return Err(run.fail(error));
            }
        }
    }

    /// Find the first non-finalized node, in pre-order, matched by a rule.
    fn scan<'r>(
        &'r self,
        tree: &DocumentTree,
        root: NodeRef,
        finalized: &HashSet<NodeRef>,
    ) -> Option<(NodeRef, &'r dyn RewriteRule)> {
        let walk = walk_node(tree, root, &mut |node| {
            if finalized.contains(&node) {
                return ControlFlow::Continue(WalkAction::Advance);
            }
            match self.registry.first_match(tree, node) {
                Some(rule) => ControlFlow::Break((node, rule)),
                None => ControlFlow::Continue(WalkAction::Advance),
            }
        });
        match walk {
            ControlFlow::Break(hit) => Some(hit),
            ControlFlow::Continue(()) => None,
        }
    }

    fn rewrite_node(
        &self,
        tree: &mut DocumentTree,
        node: NodeRef,
        rule: &dyn RewriteRule,
        run: &mut RunState,
    ) -> Result<(), RewriteError> {
        let path = tree.path(node);
        let parent = tree.parent(node);
        let next_sibling = tree.next_sibling(node);
        trace!(rule = rule.name(), path = %path, "applying rule");

        let mut rewriter = SubtreeRewriter::new(tree, node);
        let applied = rule.apply(&mut rewriter);
        let in_scope = applied
            .as_ref()
            .is_ok_and(|&r| rewriter.is_valid_replacement(r));
        let finalized = rewriter.into_finalized();
        let replacement =
            applied.map_err(|e| RewriteError::new(e.into(), Some(rule.name()), path.clone()))?;

        if !tree.is_alive(replacement) {
            return Err(RewriteError::new(
                RewriteErrorKind::InvalidReplacement(format!(
                    "{replacement} is not attached to the tree"
                )),
                Some(rule.name()),
                path,
            ));
        }
        if !in_scope {
            return Err(RewriteError::new(
                RewriteErrorKind::InvalidReplacement(format!(
                    "{} is outside the rewritten subtree",
                    tree.path(replacement)
                )),
                Some(rule.name()),
                path,
            ));
        }

        // A replacement created next to a removed node takes over its slot.
        if replacement != node && !tree.is_alive(node) && tree.parent(replacement) == parent {
            let before = next_sibling
                .filter(|&s| s != replacement && tree.is_alive(s) && tree.parent(s) == parent);
            tree.order_before(replacement, before).map_err(|e| {
                RewriteError::new(RewriteErrorKind::Tree(e), Some(rule.name()), path.clone())
            })?;
        }

        run.finalized.extend(finalized);
        if node == run.root {
            run.root = replacement;
        }

        let replacement_path = tree.path(replacement);
        debug!(
            rule = rule.name(),
            path = %path,
            replacement = %replacement_path,
            "rewrote node"
        );
        run.steps.push(RewriteStep {
            rule: rule.name(),
            path,
            replacement: replacement_path,
        });
        Ok(())
    }
}
