//! Built-in rewrite rules.

pub mod dialog;
pub mod schema;

pub use dialog::DialogStructureRule;

use crate::registry::RuleRegistry;

/// Registry holding every built-in rule.
pub fn builtin_rules() -> RuleRegistry {
    RuleRegistry::new().register(DialogStructureRule)
}
