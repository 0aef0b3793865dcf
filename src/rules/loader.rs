//! Loads the static ICP rules document.
//!
//! A broken or missing rules file never stops the evaluator: the loader returns
//! [`RulesLoad::Fallback`] with an empty [`RuleSet`] and a warning for the caller
//! to surface.

use serde_json::{Map, Value};
use std::fmt;
use std::path::{Path, PathBuf};

/// Arbitrarily nested rule name → rule value mapping, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    rules: Map<String, Value>,
}

impl RuleSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parses a JSON document whose top level must be an object.
    pub fn from_json(content: &str) -> std::result::Result<Self, String> {
        match serde_json::from_str::<Value>(content) {
            Ok(Value::Object(rules)) => Ok(Self { rules }),
            Ok(other) => Err(format!(
                "expected a JSON object at the top level, found {}",
                json_kind(&other)
            )),
            Err(e) => Err(format!("malformed JSON: {}", e)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.rules.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.rules.keys()
    }

    /// Two-space indented JSON, keys in load order.
    pub fn to_pretty_json(&self) -> String {
        if self.rules.is_empty() {
            return "{}".to_string();
        }
        serde_json::to_string_pretty(&self.rules).unwrap_or_else(|_| "{}".to_string())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Non-fatal problem with the rules file.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigWarning {
    pub path: PathBuf,
    pub reason: String,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Could not load rules file {}: {}",
            self.path.display(),
            self.reason
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RulesLoad {
    Loaded(RuleSet),
    Fallback {
        rules: RuleSet,
        warning: ConfigWarning,
    },
}

impl RulesLoad {
    pub fn warning(&self) -> Option<&ConfigWarning> {
        match self {
            RulesLoad::Loaded(_) => None,
            RulesLoad::Fallback { warning, .. } => Some(warning),
        }
    }

    pub fn rules(&self) -> &RuleSet {
        match self {
            RulesLoad::Loaded(rules) | RulesLoad::Fallback { rules, .. } => rules,
        }
    }

    pub fn into_rules(self) -> RuleSet {
        match self {
            RulesLoad::Loaded(rules) | RulesLoad::Fallback { rules, .. } => rules,
        }
    }
}

pub fn load_rules(path: &Path) -> RulesLoad {
    let fallback = |reason: String| RulesLoad::Fallback {
        rules: RuleSet::empty(),
        warning: ConfigWarning {
            path: path.to_path_buf(),
            reason,
        },
    };

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => return fallback(e.to_string()),
    };

    match RuleSet::from_json(&content) {
        Ok(rules) => {
            log::info!("Loaded {} ICP rules from {}", rules.len(), path.display());
            RulesLoad::Loaded(rules)
        }
        Err(reason) => fallback(reason),
    }
}
