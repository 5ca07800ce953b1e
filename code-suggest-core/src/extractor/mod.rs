//! Pattern-based suggestion extractor
//!
//! A synchronous, stateless pass over a unit of text: pick the rule set for
//! the language hint, run every rule in table order and turn each match into
//! a [`SuggestionDraft`]. Persisting the drafts is the caller's business.

use crate::rules::{Language, Rule, RuleRegistry};
use crate::suggestion::SuggestionDraft;
use regex_utils::{code_blocks, location};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::ops::Range;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, trace};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// How many drafts a single rule may contribute per text
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// At most one draft per rule, at the first match
    #[default]
    First,
    /// One draft per non-overlapping match
    All,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ExtractOptions {
    #[serde(default)]
    pub match_mode: MatchMode,
}

/// Input contract: `{ text, language?, frameworkHint? }`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ExtractRequest {
    pub text: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub framework_hint: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SuggestionExtractor {
    registry: Arc<RuleRegistry>,
    options: ExtractOptions,
}

impl Default for SuggestionExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl SuggestionExtractor {
    /// Extractor over the built-in rule tables with default options
    pub fn new() -> Self {
        Self::with_registry(RuleRegistry::builtin(), ExtractOptions::default())
    }

    pub fn with_registry(registry: Arc<RuleRegistry>, options: ExtractOptions) -> Self {
        Self { registry, options }
    }

    pub fn with_options(mut self, options: ExtractOptions) -> Self {
        self.options = options;
        self
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Run the rules for `language` over `text`.
    ///
    /// Unknown or missing languages and blank text produce an empty list.
    pub fn extract(
        &self,
        text: &str,
        language: Option<&str>,
        framework_hint: Option<&str>,
    ) -> Vec<SuggestionDraft> {
        let language = language.and_then(|hint| {
            let resolved = Language::from_hint(hint);
            if resolved.is_none() {
                debug!("No rule table for language hint '{}'", hint);
            }
            resolved
        });
        self.extract_for(text, language, framework_hint)
    }

    pub fn extract_request(&self, request: &ExtractRequest) -> Vec<SuggestionDraft> {
        self.extract(&request.text, request.language.as_deref(), request.framework_hint.as_deref())
    }

    /// Validate a JSON request before extracting from it
    pub fn extract_json(&self, input: &Value) -> Result<Vec<SuggestionDraft>, ExtractError> {
        let object = input.as_object().ok_or_else(|| {
            ExtractError::InvalidInput(format!("expected an object, got {}", json_kind(input)))
        })?;

        let text = match object.get("text") {
            Some(Value::String(text)) => text,
            Some(other) => {
                return Err(ExtractError::InvalidInput(format!(
                    "`text` must be a string, got {}",
                    json_kind(other)
                )));
            }
            None => return Err(ExtractError::InvalidInput("missing `text`".to_string())),
        };

        let language = optional_string(object, "language")?;
        let framework_hint = optional_string(object, "frameworkHint")?;

        Ok(self.extract(text, language, framework_hint))
    }

    /// Extract from a source file, taking the language from its extension
    pub fn extract_file(
        &self,
        path: &str,
        content: &str,
        framework_hint: Option<&str>,
    ) -> Vec<SuggestionDraft> {
        self.extract_for(content, Language::from_path(path), framework_hint)
    }

    /// Extract from every fenced code block of an AI reply.
    ///
    /// Line numbers are relative to the reply, not to the block.
    pub fn extract_code_blocks(
        &self,
        reply: &str,
        framework_hint: Option<&str>,
    ) -> Vec<SuggestionDraft> {
        let mut drafts = Vec::new();

        for block in code_blocks::extract(reply) {
            let language = block.language.and_then(Language::from_hint);
            let (block_line, _) = location::line_col(reply, block.offset);

            for mut draft in self.extract_for(block.code, language, framework_hint) {
                draft.line_number = draft.line_number.map(|line| line + block_line - 1);
                drafts.push(draft);
            }
        }

        drafts
    }

    fn extract_for(
        &self,
        text: &str,
        language: Option<Language>,
        framework_hint: Option<&str>,
    ) -> Vec<SuggestionDraft> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        let Some(rules) = language.and_then(|l| self.registry.rules_for(l)) else {
            return Vec::new();
        };

        let framework = framework_hint
            .map(regex_utils::framework::normalize)
            .filter(|f| !f.is_empty());

        let mut drafts = Vec::new();
        for rule in rules.rules() {
            if !rule.applies_to(framework.as_deref()) {
                continue;
            }

            let ranges = match self.options.match_mode {
                MatchMode::First => rule.find(text).into_iter().collect(),
                MatchMode::All => rule.find_all(text),
            };

            for range in ranges {
                trace!("Rule {} matched at {:?}", rule.id(), range);
                drafts.push(draft_for(rule, text, range));
            }
        }

        debug!(
            "Extracted {} suggestions from {} bytes of {}",
            drafts.len(),
            text.len(),
            rules.language()
        );
        drafts
    }
}

fn draft_for(rule: &Rule, text: &str, range: Range<usize>) -> SuggestionDraft {
    let def = rule.def();
    let (line, _) = location::line_col(text, range.start);
    let snippet = location::line_at(text, range.start).trim();

    SuggestionDraft {
        rule_id: def.id.clone(),
        suggestion_type: def.category,
        title: def.title.clone(),
        description: def.description.clone(),
        code_snippet: (!snippet.is_empty()).then(|| snippet.to_string()),
        suggested_fix: rule.render_fix(&text[range]),
        priority: def.priority,
        line_number: Some(line),
    }
}

fn optional_string<'a>(
    object: &'a serde_json::Map<String, Value>,
    key: &str,
) -> Result<Option<&'a str>, ExtractError> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(ExtractError::InvalidInput(format!(
            "`{}` must be a string, got {}",
            key,
            json_kind(other)
        ))),
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

#[cfg(test)]
mod tests;
