//! Error types for rule application and engine runs.

use std::fmt;

use derive_more::{Display, Error};
use dialog_tree::TreeError;

pub type RuleResult<T> = Result<T, RuleError>;

/// Failure reported by a rule's `apply`.
#[derive(Clone, Debug, Display, Error, PartialEq, Eq)]
pub enum RuleError {
    /// An expected sub-structure is missing; the input is malformed or
    /// unsupported.
    #[display("structural mismatch: {_0}")]
    StructuralMismatch(#[error(not(source))] String),

    /// The rewrite destination already exists.
    #[display("target conflict: {_0}")]
    TargetConflict(#[error(not(source))] String),

    /// The rule tried to touch a node outside its granted scope.
    #[display("scope violation: {_0}")]
    ScopeViolation(#[error(not(source))] String),

    #[display("{_0}")]
    Tree(TreeError),
}

impl RuleError {
    pub fn structural_mismatch(msg: impl fmt::Display) -> Self {
        RuleError::StructuralMismatch(msg.to_string())
    }

    pub fn target_conflict(msg: impl fmt::Display) -> Self {
        RuleError::TargetConflict(msg.to_string())
    }

    pub fn scope_violation(msg: impl fmt::Display) -> Self {
        RuleError::ScopeViolation(msg.to_string())
    }
}

impl From<TreeError> for RuleError {
    fn from(error: TreeError) -> Self {
        match error {
            // A name collision at the destination is a conflicting target.
            e @ TreeError::DuplicateName { .. } => RuleError::TargetConflict(e.to_string()),
            other => RuleError::Tree(other),
        }
    }
}

/// Failure of a whole engine run.
///
/// Carries the rule that failed (if any) and the path of the node it was
/// applied to, so hosts can report where conversion stopped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RewriteError {
    kind: Box<RewriteErrorKind>,
    rule: Option<&'static str>,
    path: String,
}

impl RewriteError {
    pub fn new(kind: RewriteErrorKind, rule: Option<&'static str>, path: impl Into<String>) -> Self {
        RewriteError {
            kind: Box::new(kind),
            rule,
            path: path.into(),
        }
    }

    pub fn kind(&self) -> &RewriteErrorKind {
        &self.kind
    }

    pub fn rule(&self) -> Option<&'static str> {
        self.rule
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for RewriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.rule {
            Some(rule) => write!(f, "{} (rule `{rule}` at {})", self.kind, self.path),
            None => write!(f, "{} (at {})", self.kind, self.path),
        }
    }
}

impl std::error::Error for RewriteError {}

#[derive(Clone, Debug, Display, PartialEq, Eq)]
pub enum RewriteErrorKind {
    #[display("structural mismatch: {_0}")]
    StructuralMismatch(String),

    #[display("target conflict: {_0}")]
    TargetConflict(String),

    #[display("scope violation: {_0}")]
    ScopeViolation(String),

    /// The rule returned a node that is no longer part of the tree.
    #[display("invalid replacement: {_0}")]
    InvalidReplacement(String),

    /// The rewrite budget ran out before a fixpoint was reached.
    #[display("no progress after {limit} rewrites")]
    NonTermination { limit: usize },

    #[display("{_0}")]
    Tree(TreeError),
}

impl From<RuleError> for RewriteErrorKind {
    fn from(error: RuleError) -> Self {
        match error {
            RuleError::StructuralMismatch(msg) => RewriteErrorKind::StructuralMismatch(msg),
            RuleError::TargetConflict(msg) => RewriteErrorKind::TargetConflict(msg),
            RuleError::ScopeViolation(msg) => RewriteErrorKind::ScopeViolation(msg),
            RuleError::Tree(e) => RewriteErrorKind::Tree(e),
        }
    }
}
