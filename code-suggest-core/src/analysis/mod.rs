//! Repository analysis runs
//!
//! A [`CodeAnalysisRun`] is created `running`, then finished exactly once as
//! `completed` or `failed`. The [`runner`] drives a run over a set of source
//! files and the [`sources`] module collects those files from disk.

pub mod runner;
pub mod sources;

use crate::suggestion::SuggestionType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

pub use runner::AnalysisRunner;
pub use sources::{ScanConfig, SourceFile, collect_sources};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("Analysis run {id} is already {status}")]
    InvalidTransition { id: Uuid, status: AnalysisStatus },

    #[error("Unknown analysis type: {0}")]
    UnknownType(String),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisType {
    #[default]
    Full,
    Security,
    Quality,
    Performance,
}

impl AnalysisType {
    pub const ALL: [AnalysisType; 4] = [Self::Full, Self::Security, Self::Quality, Self::Performance];

    /// Whether suggestions of `kind` belong in this analysis
    pub fn keeps(&self, kind: SuggestionType) -> bool {
        match self {
            Self::Full => true,
            Self::Security => kind == SuggestionType::Security,
            Self::Quality => matches!(kind, SuggestionType::Improvement | SuggestionType::BugFix),
            Self::Performance => kind == SuggestionType::Optimization,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Security => "security",
            Self::Quality => "quality",
            Self::Performance => "performance",
        }
    }
}

impl fmt::Display for AnalysisType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for AnalysisType {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(Self::Full),
            "security" => Ok(Self::Security),
            "quality" => Ok(Self::Quality),
            "performance" => Ok(Self::Performance),
            other => Err(AnalysisError::UnknownType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    #[default]
    Running,
    Completed,
    Failed,
}

impl AnalysisStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Running)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for AnalysisStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CodeAnalysisRun {
    pub id: Uuid,
    pub repository_id: Uuid,
    pub analysis_type: AnalysisType,
    pub status: AnalysisStatus,
    /// Aggregated results, `null` until the run completes
    pub results: serde_json::Value,
    pub issues_found: usize,
    pub suggestions_count: usize,
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl CodeAnalysisRun {
    pub fn start(repository_id: Uuid, analysis_type: AnalysisType) -> Self {
        Self {
            id: Uuid::new_v4(),
            repository_id,
            analysis_type,
            status: AnalysisStatus::Running,
            results: serde_json::Value::Null,
            issues_found: 0,
            suggestions_count: 0,
            error: None,
            started_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn complete(
        &mut self,
        results: serde_json::Value,
        issues_found: usize,
        suggestions_count: usize,
    ) -> Result<(), AnalysisError> {
        self.ensure_running()?;
        self.status = AnalysisStatus::Completed;
        self.results = results;
        self.issues_found = issues_found;
        self.suggestions_count = suggestions_count;
        self.completed_at = Some(Utc::now());
        Ok(())
    }

    pub fn fail(&mut self, error: impl Into<String>) -> Result<(), AnalysisError> {
        self.ensure_running()?;
        self.status = AnalysisStatus::Failed;
        self.error = Some(error.into());
        self.completed_at = Some(Utc::now());
        Ok(())
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_terminal()
    }

    fn ensure_running(&self) -> Result<(), AnalysisError> {
        if self.status.is_terminal() {
            return Err(AnalysisError::InvalidTransition { id: self.id, status: self.status });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_run_completes_once() {
        let mut run = CodeAnalysisRun::start(Uuid::new_v4(), AnalysisType::Full);
        assert_eq!(run.status, AnalysisStatus::Running);
        assert!(run.completed_at.is_none());

        run.complete(json!({ "files_analyzed": 3 }), 1, 4).unwrap();
        assert_eq!(run.status, AnalysisStatus::Completed);
        assert_eq!(run.issues_found, 1);
        assert_eq!(run.suggestions_count, 4);
        assert!(run.completed_at.is_some());

        assert!(run.fail("late").is_err());
        assert!(run.complete(json!({}), 0, 0).is_err());
        assert_eq!(run.status, AnalysisStatus::Completed);
    }

    #[test]
    fn test_failed_run_is_terminal() {
        let mut run = CodeAnalysisRun::start(Uuid::new_v4(), AnalysisType::Security);
        run.fail("store unavailable").unwrap();

        assert_eq!(run.error.as_deref(), Some("store unavailable"));
        assert_eq!(
            run.complete(json!({}), 0, 0),
            Err(AnalysisError::InvalidTransition { id: run.id, status: AnalysisStatus::Failed })
        );
    }

    #[test]
    fn test_analysis_type_filter() {
        use SuggestionType::*;

        assert!(SuggestionType::ALL.iter().all(|t| AnalysisType::Full.keeps(*t)));
        assert!(AnalysisType::Security.keeps(Security));
        assert!(!AnalysisType::Security.keeps(BugFix));
        assert!(AnalysisType::Quality.keeps(Improvement));
        assert!(AnalysisType::Quality.keeps(BugFix));
        assert!(!AnalysisType::Quality.keeps(Optimization));
        assert!(AnalysisType::Performance.keeps(Optimization));
        assert!(!AnalysisType::Performance.keeps(Security));
    }

    #[test]
    fn test_parse_analysis_type() {
        assert_eq!("Security".parse::<AnalysisType>().unwrap(), AnalysisType::Security);
        assert!(matches!("lint".parse::<AnalysisType>(), Err(AnalysisError::UnknownType(_))));
    }
}
