//! Persistence collaborators
//!
//! Suggestions are append-only and queryable by repository, file and status.
//! Analysis runs and conversation turns get their own traits so callers can
//! depend on just the part they use.

pub mod file;
pub mod memory;

use crate::analysis::{AnalysisError, CodeAnalysisRun};
use crate::relay::{ChatMessage, Role};
use crate::suggestion::{CodeSuggestion, SuggestionError, SuggestionStatus};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: Uuid },

    #[error("Rejected transition: {0}")]
    Transition(String),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub fn suggestion_not_found(id: Uuid) -> Self {
        Self::NotFound { kind: "Suggestion", id }
    }

    pub fn run_exists(id: Uuid) -> Self {
        Self::Transition(format!("run {} is already recorded", id))
    }

    pub fn run_not_found(id: Uuid) -> Self {
        Self::NotFound { kind: "Analysis run", id }
    }
}

impl From<SuggestionError> for StoreError {
    fn from(e: SuggestionError) -> Self {
        Self::Transition(e.to_string())
    }
}

impl From<AnalysisError> for StoreError {
    fn from(e: AnalysisError) -> Self {
        Self::Transition(e.to_string())
    }
}

/// Query over stored suggestions; unset fields match everything
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionFilter {
    pub repository_id: Option<Uuid>,
    pub file_path: Option<String>,
    pub status: Option<SuggestionStatus>,
}

impl SuggestionFilter {
    pub fn repository(mut self, repository_id: Uuid) -> Self {
        self.repository_id = Some(repository_id);
        self
    }

    pub fn file(mut self, file_path: impl Into<String>) -> Self {
        self.file_path = Some(file_path.into());
        self
    }

    pub fn status(mut self, status: SuggestionStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn matches(&self, suggestion: &CodeSuggestion) -> bool {
        self.repository_id.is_none_or(|id| id == suggestion.repository_id)
            && self.file_path.as_deref().is_none_or(|p| p == suggestion.file_path)
            && self.status.is_none_or(|s| s == suggestion.status)
    }
}

#[async_trait]
pub trait SuggestionStore: Send + Sync {
    /// Append suggestions; existing rows are never replaced
    async fn insert(&self, suggestions: Vec<CodeSuggestion>) -> Result<(), StoreError>;

    async fn get(&self, id: Uuid) -> Result<CodeSuggestion, StoreError>;

    /// Matching suggestions in insertion order
    async fn list(&self, filter: &SuggestionFilter) -> Result<Vec<CodeSuggestion>, StoreError>;

    /// Move a pending suggestion to a terminal status
    async fn update_status(
        &self,
        id: Uuid,
        status: SuggestionStatus,
    ) -> Result<CodeSuggestion, StoreError>;
}

#[async_trait]
pub trait AnalysisRunStore: Send + Sync {
    /// Record a new run. An id that is already stored is rejected.
    async fn insert_run(&self, run: &CodeAnalysisRun) -> Result<(), StoreError>;

    /// Replace a stored run. A run that is already finished cannot be updated.
    async fn update_run(&self, run: &CodeAnalysisRun) -> Result<(), StoreError>;

    async fn get_run(&self, id: Uuid) -> Result<CodeAnalysisRun, StoreError>;

    /// Runs, newest first
    async fn list_runs(
        &self,
        repository_id: Option<Uuid>,
    ) -> Result<Vec<CodeAnalysisRun>, StoreError>;
}

#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn persist(
        &self,
        conversation_id: Uuid,
        role: Role,
        content: &str,
    ) -> Result<(), StoreError>;

    /// Messages of a conversation in the order they were persisted
    async fn history(&self, conversation_id: Uuid) -> Result<Vec<ChatMessage>, StoreError>;
}

/// Shared check for `update_run` implementations
pub(crate) fn check_run_update(
    stored: &CodeAnalysisRun,
    update: &CodeAnalysisRun,
) -> Result<(), StoreError> {
    if stored.is_finished() {
        return Err(AnalysisError::InvalidTransition { id: stored.id, status: stored.status }.into());
    }
    if stored.repository_id != update.repository_id {
        return Err(StoreError::Transition(format!(
            "run {} cannot move to another repository",
            stored.id
        )));
    }
    Ok(())
}

pub(crate) fn sort_runs(runs: &mut [CodeAnalysisRun]) {
    runs.sort_by(|a, b| b.started_at.cmp(&a.started_at).then_with(|| a.id.cmp(&b.id)));
}
