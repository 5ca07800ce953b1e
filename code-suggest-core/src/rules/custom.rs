//! Custom rules loaded from a TOML file
//!
//! ```toml
//! [[rules]]
//! language = "python"
//! id = "py-assert"
//! pattern = '(?m)^\s*assert\s'
//! title = "assert is stripped with -O"
//! description = "Assertions disappear when Python runs with optimizations."
//! category = "bug_fix"
//! priority = "medium"
//! fix = "Raise an explicit exception instead of {match}"
//! ```

use super::{RuleDef, RuleError, RuleRegistry};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// A rule definition tagged with the language it applies to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomRule {
    pub language: String,
    #[serde(flatten)]
    pub rule: RuleDef,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomRuleFile {
    #[serde(default)]
    pub rules: Vec<CustomRule>,
}

impl CustomRuleFile {
    pub fn from_file(path: &Path) -> Result<Self, RuleError> {
        let content = std::fs::read_to_string(path)
            .map_err(|source| RuleError::Io { path: path.to_path_buf(), source })?;
        Self::parse(&content, path)
    }

    pub fn parse(content: &str, path: &Path) -> Result<Self, RuleError> {
        toml::from_str(content)
            .map_err(|e| RuleError::Parse { path: path.to_path_buf(), message: e.to_string() })
    }
}

impl RuleRegistry {
    /// Built-in rules plus the rules of a custom rule file, compiled eagerly
    pub fn load_with_custom(path: &Path) -> Result<Self, RuleError> {
        let file = CustomRuleFile::from_file(path)?;
        debug!("Loaded {} custom rules from {}", file.rules.len(), path.display());
        Self::with_custom(file.rules)
    }
}
