//! Rule tables for the pattern-based suggestion extractor
//!
//! Every rule is a tagged record: a regex or substring pattern plus the
//! category, priority and fix template of the suggestion it produces.
//! Built-in tables live in per-language static arrays and are compiled once
//! into a [`RuleRegistry`]. Custom rules from a TOML file are compiled when
//! the file is loaded, so a broken pattern surfaces at startup and never
//! during extraction.

pub mod custom;
pub mod javascript;
pub mod python;
pub mod rust;

use crate::suggestion::{Priority, SuggestionType};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::ops::Range;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

pub use custom::{CustomRule, CustomRuleFile};

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("Rule '{id}' has an invalid pattern: {source}")]
    InvalidPattern {
        id: String,
        #[source]
        source: regex::Error,
    },

    #[error("Rule '{id}' has an empty pattern")]
    EmptyPattern { id: String },

    #[error("Duplicate rule id '{id}' for {language}")]
    DuplicateId { id: String, language: Language },

    #[error("Unknown language '{language}' for rule '{id}'")]
    UnknownLanguage { id: String, language: String },

    #[error("Failed to read rule file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse rule file {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Languages with a built-in rule table
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    JavaScript,
    TypeScript,
    Rust,
}

impl Language {
    pub const ALL: [Language; 4] = [Self::Python, Self::JavaScript, Self::TypeScript, Self::Rust];

    /// Resolve a language name, alias, extension or file path
    pub fn from_hint(hint: &str) -> Option<Self> {
        match regex_utils::language::normalize(hint)? {
            "python" => Some(Self::Python),
            "javascript" => Some(Self::JavaScript),
            "typescript" => Some(Self::TypeScript),
            "rust" => Some(Self::Rust),
            _ => None,
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        regex_utils::language::from_path(path).and_then(Self::from_hint)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::JavaScript => "javascript",
            Self::TypeScript => "typescript",
            Self::Rust => "rust",
        }
    }

    /// Built-in table rows, in evaluation order
    pub fn builtin_specs(&self) -> Vec<&'static RuleSpec> {
        match self {
            Self::Python => python::RULES.iter().collect(),
            Self::JavaScript => javascript::RULES.iter().collect(),
            Self::TypeScript => {
                javascript::RULES.iter().chain(javascript::TYPESCRIPT_RULES.iter()).collect()
            }
            Self::Rust => rust::RULES.iter().collect(),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    #[default]
    Regex,
    Substring,
}

/// A row of a built-in rule table
#[derive(Debug, Clone, Copy)]
pub struct RuleSpec {
    pub id: &'static str,
    pub kind: PatternKind,
    pub pattern: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub category: SuggestionType,
    pub priority: Priority,
    /// Fix template; `{match}` is replaced by the matched text
    pub fix: &'static str,
    /// Only applies when the framework hint matches
    pub framework: Option<&'static str>,
}

impl RuleSpec {
    pub fn to_def(&self) -> RuleDef {
        RuleDef {
            id: self.id.to_string(),
            kind: self.kind,
            pattern: self.pattern.to_string(),
            title: self.title.to_string(),
            description: self.description.to_string(),
            category: self.category,
            priority: self.priority,
            fix: (!self.fix.is_empty()).then(|| self.fix.to_string()),
            framework: self.framework.map(str::to_string),
        }
    }
}

/// Owned rule definition, the shape custom rule files deserialize into
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleDef {
    pub id: String,
    #[serde(default)]
    pub kind: PatternKind,
    pub pattern: String,
    pub title: String,
    pub description: String,
    pub category: SuggestionType,
    pub priority: Priority,
    #[serde(default)]
    pub fix: Option<String>,
    #[serde(default)]
    pub framework: Option<String>,
}

#[derive(Debug, Clone)]
enum Matcher {
    Regex(Regex),
    Substring(String),
}

impl Matcher {
    fn find(&self, text: &str) -> Option<Range<usize>> {
        match self {
            Self::Regex(re) => re.find(text).map(|m| m.range()),
            Self::Substring(needle) => text.find(needle.as_str()).map(|i| i..i + needle.len()),
        }
    }

    fn find_all(&self, text: &str) -> Vec<Range<usize>> {
        match self {
            Self::Regex(re) => re.find_iter(text).map(|m| m.range()).collect(),
            Self::Substring(needle) => text
                .match_indices(needle.as_str())
                .map(|(i, m)| i..i + m.len())
                .collect(),
        }
    }
}

/// A compiled rule
#[derive(Debug, Clone)]
pub struct Rule {
    def: RuleDef,
    matcher: Matcher,
}

impl Rule {
    pub fn compile(def: RuleDef) -> Result<Self, RuleError> {
        if def.pattern.is_empty() {
            return Err(RuleError::EmptyPattern { id: def.id });
        }

        let matcher = match def.kind {
            PatternKind::Regex => match Regex::new(&def.pattern) {
                Ok(re) => Matcher::Regex(re),
                Err(source) => return Err(RuleError::InvalidPattern { id: def.id, source }),
            },
            PatternKind::Substring => Matcher::Substring(def.pattern.clone()),
        };

        // Framework names compare in normalised form
        let def = RuleDef {
            framework: def.framework.as_deref().map(regex_utils::framework::normalize),
            ..def
        };

        Ok(Self { def, matcher })
    }

    pub fn id(&self) -> &str {
        &self.def.id
    }

    pub fn def(&self) -> &RuleDef {
        &self.def
    }

    pub fn category(&self) -> SuggestionType {
        self.def.category
    }

    pub fn priority(&self) -> Priority {
        self.def.priority
    }

    /// Whether the rule is active for a normalised framework hint
    pub fn applies_to(&self, framework: Option<&str>) -> bool {
        match self.def.framework.as_deref() {
            None => true,
            Some(required) => framework == Some(required),
        }
    }

    pub fn find(&self, text: &str) -> Option<Range<usize>> {
        self.matcher.find(text)
    }

    pub fn find_all(&self, text: &str) -> Vec<Range<usize>> {
        self.matcher.find_all(text)
    }

    /// Render the fix template for a matched fragment
    pub fn render_fix(&self, matched: &str) -> Option<String> {
        self.def.fix.as_ref().map(|fix| fix.replace("{match}", matched.trim()))
    }
}

/// The ordered rules for one language
#[derive(Debug, Clone)]
pub struct RuleSet {
    language: Language,
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn compile(
        language: Language,
        defs: impl IntoIterator<Item = RuleDef>,
    ) -> Result<Self, RuleError> {
        let mut set = Self { language, rules: Vec::new() };
        for def in defs {
            set.push(Rule::compile(def)?)?;
        }
        Ok(set)
    }

    fn push(&mut self, rule: Rule) -> Result<(), RuleError> {
        if self.rules.iter().any(|r| r.id() == rule.id()) {
            return Err(RuleError::DuplicateId {
                id: rule.id().to_string(),
                language: self.language,
            });
        }
        self.rules.push(rule);
        Ok(())
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

static BUILTIN: Lazy<Arc<RuleRegistry>> = Lazy::new(|| {
    Arc::new(RuleRegistry::compile_builtin().expect("Invalid built-in rule table"))
});

/// Compiled rule sets for every supported language
#[derive(Debug, Clone)]
pub struct RuleRegistry {
    sets: HashMap<Language, RuleSet>,
}

impl RuleRegistry {
    /// Shared registry of the built-in tables, compiled on first use
    pub fn builtin() -> Arc<RuleRegistry> {
        Arc::clone(&BUILTIN)
    }

    /// Compile the built-in tables from scratch
    pub fn compile_builtin() -> Result<Self, RuleError> {
        let mut sets = HashMap::new();
        for language in Language::ALL {
            let defs = language.builtin_specs().into_iter().map(RuleSpec::to_def);
            sets.insert(language, RuleSet::compile(language, defs)?);
        }
        Ok(Self { sets })
    }

    /// Built-in tables followed by custom rules, custom rules evaluated last
    pub fn with_custom(custom: Vec<CustomRule>) -> Result<Self, RuleError> {
        let mut registry = (*Self::builtin()).clone();
        registry.extend(custom)?;
        Ok(registry)
    }

    pub fn extend(&mut self, custom: Vec<CustomRule>) -> Result<(), RuleError> {
        let mut seen = HashSet::new();
        for rule in custom {
            let language = Language::from_hint(&rule.language).ok_or_else(|| {
                RuleError::UnknownLanguage { id: rule.rule.id.clone(), language: rule.language.clone() }
            })?;

            // TypeScript inherits the JavaScript table, so a JavaScript rule lands in both
            let targets: &[Language] = match language {
                Language::JavaScript => &[Language::JavaScript, Language::TypeScript],
                _ => std::slice::from_ref(&language),
            };

            if !seen.insert((language, rule.rule.id.clone())) {
                return Err(RuleError::DuplicateId { id: rule.rule.id, language });
            }

            let compiled = Rule::compile(rule.rule)?;
            for target in targets {
                self.sets
                    .entry(*target)
                    .or_insert_with(|| RuleSet { language: *target, rules: Vec::new() })
                    .push(compiled.clone())?;
            }
        }
        Ok(())
    }

    pub fn rules_for(&self, language: Language) -> Option<&RuleSet> {
        self.sets.get(&language)
    }

    pub fn rule_count(&self) -> usize {
        self.sets.values().map(RuleSet::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(id: &str, kind: PatternKind, pattern: &str) -> RuleDef {
        RuleDef {
            id: id.to_string(),
            kind,
            pattern: pattern.to_string(),
            title: "title".to_string(),
            description: "description".to_string(),
            category: SuggestionType::Improvement,
            priority: Priority::Low,
            fix: Some("replace {match}".to_string()),
            framework: None,
        }
    }

    #[test]
    fn test_builtin_tables_compile() {
        let registry = RuleRegistry::compile_builtin().unwrap();
        for language in Language::ALL {
            let set = registry.rules_for(language).unwrap();
            assert!(!set.is_empty(), "{} has no rules", language);
        }

        let js = registry.rules_for(Language::JavaScript).unwrap().len();
        let ts = registry.rules_for(Language::TypeScript).unwrap().len();
        assert_eq!(ts, js + javascript::TYPESCRIPT_RULES.len());
    }

    #[test]
    fn test_builtin_rule_ids_are_unique() {
        for language in Language::ALL {
            let mut ids = HashSet::new();
            for spec in language.builtin_specs() {
                assert!(ids.insert(spec.id), "duplicate id {}", spec.id);
            }
        }
    }

    #[test]
    fn test_invalid_pattern_fails_at_compile() {
        let err = Rule::compile(def("broken", PatternKind::Regex, "(unclosed")).unwrap_err();
        assert!(matches!(err, RuleError::InvalidPattern { ref id, .. } if id == "broken"));

        let err = Rule::compile(def("empty", PatternKind::Substring, "")).unwrap_err();
        assert!(matches!(err, RuleError::EmptyPattern { .. }));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = RuleSet::compile(
            Language::Python,
            vec![def("a", PatternKind::Substring, "x"), def("a", PatternKind::Substring, "y")],
        );
        assert!(matches!(result, Err(RuleError::DuplicateId { .. })));
    }

    #[test]
    fn test_substring_matcher() {
        let rule = Rule::compile(def("s", PatternKind::Substring, "eval(")).unwrap();
        assert_eq!(rule.find("x = eval(y)"), Some(4..9));
        assert_eq!(rule.find_all("eval(a); eval(b)"), vec![0..5, 9..14]);
        assert_eq!(rule.render_fix(" eval( ").as_deref(), Some("replace eval("));
    }

    #[test]
    fn test_framework_scoping() {
        let mut scoped = def("f", PatternKind::Substring, "x");
        scoped.framework = Some("React.js".to_string());
        let rule = Rule::compile(scoped).unwrap();

        assert!(rule.applies_to(Some("react")));
        assert!(!rule.applies_to(Some("vue")));
        assert!(!rule.applies_to(None));
    }

    #[test]
    fn test_language_hints() {
        assert_eq!(Language::from_hint("Python"), Some(Language::Python));
        assert_eq!(Language::from_hint(".ts"), Some(Language::TypeScript));
        assert_eq!(Language::from_path("web/app.jsx"), Some(Language::JavaScript));
        assert_eq!(Language::from_hint("haskell"), None);
    }
}
