//! Ordered collection of rewrite rules.

use dialog_tree::{DocumentTree, NodeRef};

use crate::rule::RewriteRule;

/// Rules ordered by descending ranking.
///
/// Rules with equal ranking keep their registration order, so the first
/// matching rule for a node is always well defined.
#[derive(Default)]
pub struct RuleRegistry {
    rules: Vec<Box<dyn RewriteRule>>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule (builder style).
    pub fn register(mut self, rule: impl RewriteRule + 'static) -> Self {
        self.push(Box::new(rule));
        self
    }

    /// Insert a rule after every rule of greater or equal ranking.
    pub fn push(&mut self, rule: Box<dyn RewriteRule>) {
        let ranking = rule.ranking();
        let position = self
            .rules
            .iter()
            .position(|r| r.ranking() < ranking)
            .unwrap_or(self.rules.len());
        self.rules.insert(position, rule);
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn RewriteRule> {
        self.rules.iter().map(|r| r.as_ref())
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.iter().map(|r| r.name()).collect()
    }

    /// The first rule, in priority order, that matches `node`.
    pub fn first_match(&self, tree: &DocumentTree, node: NodeRef) -> Option<&dyn RewriteRule> {
        self.iter().find(|rule| rule.matches(tree, node))
    }
}
