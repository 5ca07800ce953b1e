//! Suggestion records produced by the extractor and reviewed by users
//!
//! A [`SuggestionDraft`] is what the pure extractor returns. Attaching it to
//! a repository and file turns it into a [`CodeSuggestion`], which is what
//! the stores persist and what users apply or dismiss.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SuggestionError {
    #[error("Invalid suggestion status transition: {from} -> {to}")]
    InvalidTransition { from: SuggestionStatus, to: SuggestionStatus },

    #[error("Unknown {field} value: {value}")]
    UnknownValue { field: &'static str, value: String },
}

/// Kind of recommendation a suggestion carries
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionType {
    Improvement,
    BugFix,
    Optimization,
    Security,
}

impl SuggestionType {
    pub const ALL: [SuggestionType; 4] =
        [Self::Improvement, Self::BugFix, Self::Optimization, Self::Security];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Improvement => "improvement",
            Self::BugFix => "bug_fix",
            Self::Optimization => "optimization",
            Self::Security => "security",
        }
    }
}

impl fmt::Display for SuggestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for SuggestionType {
    type Err = SuggestionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "improvement" => Ok(Self::Improvement),
            "bug_fix" | "bugfix" => Ok(Self::BugFix),
            "optimization" => Ok(Self::Optimization),
            "security" => Ok(Self::Security),
            other => Err(SuggestionError::UnknownValue {
                field: "suggestion type",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    pub const ALL: [Priority; 4] = [Self::Low, Self::Medium, Self::High, Self::Critical];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for Priority {
    type Err = SuggestionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            other => Err(SuggestionError::UnknownValue {
                field: "priority",
                value: other.to_string(),
            }),
        }
    }
}

/// Review state. `Applied` and `Dismissed` are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionStatus {
    #[default]
    Pending,
    Applied,
    Dismissed,
}

impl SuggestionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    pub fn can_transition_to(&self, next: SuggestionStatus) -> bool {
        matches!((self, next), (Self::Pending, Self::Applied) | (Self::Pending, Self::Dismissed))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Applied => "applied",
            Self::Dismissed => "dismissed",
        }
    }
}

impl fmt::Display for SuggestionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for SuggestionStatus {
    type Err = SuggestionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "applied" => Ok(Self::Applied),
            "dismissed" => Ok(Self::Dismissed),
            other => Err(SuggestionError::UnknownValue {
                field: "status",
                value: other.to_string(),
            }),
        }
    }
}

/// Who authored a suggestion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    Human,
    Ai,
}

/// Extractor output before it is attached to a repository and file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SuggestionDraft {
    pub rule_id: String,
    pub suggestion_type: SuggestionType,
    pub title: String,
    pub description: String,
    pub code_snippet: Option<String>,
    pub suggested_fix: Option<String>,
    pub priority: Priority,
    /// 1-based line of the match
    pub line_number: Option<usize>,
}

/// A persisted suggestion attached to a repository file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CodeSuggestion {
    pub id: Uuid,
    pub repository_id: Uuid,
    pub file_path: String,
    pub suggestion_type: SuggestionType,
    pub title: String,
    pub description: String,
    pub code_snippet: Option<String>,
    pub suggested_fix: Option<String>,
    pub priority: Priority,
    pub status: SuggestionStatus,
    pub is_ai_generated: bool,
    pub line_number: Option<usize>,
    pub rule_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl CodeSuggestion {
    pub fn from_draft(
        draft: SuggestionDraft,
        repository_id: Uuid,
        file_path: impl Into<String>,
        provenance: Provenance,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            repository_id,
            file_path: file_path.into(),
            suggestion_type: draft.suggestion_type,
            title: draft.title,
            description: draft.description,
            code_snippet: draft.code_snippet,
            suggested_fix: draft.suggested_fix,
            priority: draft.priority,
            status: SuggestionStatus::Pending,
            is_ai_generated: provenance == Provenance::Ai,
            line_number: draft.line_number,
            rule_id: Some(draft.rule_id),
            created_at: Utc::now(),
        }
    }

    pub fn provenance(&self) -> Provenance {
        if self.is_ai_generated { Provenance::Ai } else { Provenance::Human }
    }

    /// Move to `next`, rejecting anything but a pending -> terminal step
    pub fn transition(&mut self, next: SuggestionStatus) -> Result<(), SuggestionError> {
        if !self.status.can_transition_to(next) {
            return Err(SuggestionError::InvalidTransition { from: self.status, to: next });
        }
        self.status = next;
        Ok(())
    }

    pub fn apply(&mut self) -> Result<(), SuggestionError> {
        self.transition(SuggestionStatus::Applied)
    }

    pub fn dismiss(&mut self) -> Result<(), SuggestionError> {
        self.transition(SuggestionStatus::Dismissed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> SuggestionDraft {
        SuggestionDraft {
            rule_id: "py-eval".to_string(),
            suggestion_type: SuggestionType::Security,
            title: "Avoid eval()".to_string(),
            description: "eval executes arbitrary code".to_string(),
            code_snippet: Some("eval(x)".to_string()),
            suggested_fix: Some("Use ast.literal_eval".to_string()),
            priority: Priority::High,
            line_number: Some(2),
        }
    }

    #[test]
    fn test_from_draft_starts_pending() {
        let repo = Uuid::new_v4();
        let suggestion = CodeSuggestion::from_draft(draft(), repo, "app.py", Provenance::Ai);

        assert_eq!(suggestion.status, SuggestionStatus::Pending);
        assert_eq!(suggestion.repository_id, repo);
        assert_eq!(suggestion.file_path, "app.py");
        assert!(suggestion.is_ai_generated);
        assert_eq!(suggestion.provenance(), Provenance::Ai);
        assert_eq!(suggestion.rule_id.as_deref(), Some("py-eval"));
    }

    #[test]
    fn test_terminal_transitions() {
        let mut applied = CodeSuggestion::from_draft(draft(), Uuid::new_v4(), "a.py", Provenance::Human);
        applied.apply().unwrap();
        assert_eq!(applied.status, SuggestionStatus::Applied);
        assert!(applied.dismiss().is_err());
        assert_eq!(
            applied.apply(),
            Err(SuggestionError::InvalidTransition {
                from: SuggestionStatus::Applied,
                to: SuggestionStatus::Applied
            })
        );

        let mut dismissed =
            CodeSuggestion::from_draft(draft(), Uuid::new_v4(), "a.py", Provenance::Human);
        dismissed.dismiss().unwrap();
        assert!(dismissed.apply().is_err());
        assert!(dismissed.transition(SuggestionStatus::Pending).is_err());
        assert_eq!(dismissed.status, SuggestionStatus::Dismissed);
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&SuggestionType::BugFix).unwrap(), "\"bug_fix\"");
        assert_eq!(serde_json::to_string(&Priority::Critical).unwrap(), "\"critical\"");
        assert_eq!(serde_json::to_string(&SuggestionStatus::Dismissed).unwrap(), "\"dismissed\"");
    }

    #[test]
    fn test_parse_enums() {
        assert_eq!("bug-fix".parse::<SuggestionType>().unwrap(), SuggestionType::BugFix);
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!("applied".parse::<SuggestionStatus>().unwrap(), SuggestionStatus::Applied);
        assert!("urgent".parse::<Priority>().is_err());
        assert!(Priority::Critical > Priority::High);
    }
}
