//! ICP rule set and its loader

pub mod loader;

pub use loader::{load_rules, ConfigWarning, RuleSet, RulesLoad};
