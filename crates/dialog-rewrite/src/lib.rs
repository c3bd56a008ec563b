//! Fixpoint rule-rewriting engine for dialog definition trees.
//!
//! Rules implement [`RewriteRule`]; a [`RuleRegistry`] orders them by
//! ranking and a [`RewriteEngine`] applies them to a [`DocumentTree`]
//! until no node matches any rule.
//!
//! [`DocumentTree`]: dialog_tree::DocumentTree

pub mod applicator;
pub mod errors;
pub mod registry;
pub mod rewriter;
pub mod rule;
pub mod rules;

pub use applicator::{
    EngineConfig, EngineState, FailurePolicy, RewriteEngine, RewriteOutcome, RewriteStep,
};
pub use errors::{RewriteError, RewriteErrorKind, RuleError, RuleResult};
pub use registry::RuleRegistry;
pub use rewriter::SubtreeRewriter;
pub use rule::RewriteRule;
pub use rules::{DialogStructureRule, builtin_rules};
