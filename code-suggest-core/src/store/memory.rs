//! In-memory store, used by tests and short-lived relay sessions

use super::{
    AnalysisRunStore, ConversationStore, StoreError, SuggestionFilter, SuggestionStore,
    check_run_update, sort_runs,
};
use crate::analysis::CodeAnalysisRun;
use crate::relay::{ChatMessage, Role};
use crate::suggestion::{CodeSuggestion, SuggestionStatus};
use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct MemoryStore {
    suggestions: RwLock<Vec<CodeSuggestion>>,
    runs: DashMap<Uuid, CodeAnalysisRun>,
    conversations: DashMap<Uuid, Vec<ChatMessage>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SuggestionStore for MemoryStore {
    async fn insert(&self, suggestions: Vec<CodeSuggestion>) -> Result<(), StoreError> {
        self.suggestions.write().await.extend(suggestions);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<CodeSuggestion, StoreError> {
        self.suggestions
            .read()
            .await
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| StoreError::suggestion_not_found(id))
    }

    async fn list(&self, filter: &SuggestionFilter) -> Result<Vec<CodeSuggestion>, StoreError> {
        Ok(self.suggestions.read().await.iter().filter(|s| filter.matches(s)).cloned().collect())
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: SuggestionStatus,
    ) -> Result<CodeSuggestion, StoreError> {
        let mut suggestions = self.suggestions.write().await;
        let suggestion = suggestions
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| StoreError::suggestion_not_found(id))?;
        suggestion.transition(status)?;
        Ok(suggestion.clone())
    }
}

#[async_trait]
impl AnalysisRunStore for MemoryStore {
    async fn insert_run(&self, run: &CodeAnalysisRun) -> Result<(), StoreError> {
        match self.runs.entry(run.id) {
            Entry::Occupied(_) => Err(StoreError::run_exists(run.id)),
            Entry::Vacant(slot) => {
                slot.insert(run.clone());
                Ok(())
            }
        }
    }

    async fn update_run(&self, run: &CodeAnalysisRun) -> Result<(), StoreError> {
        let mut stored = self.runs.get_mut(&run.id).ok_or_else(|| StoreError::run_not_found(run.id))?;
        check_run_update(&stored, run)?;
        *stored = run.clone();
        Ok(())
    }

    async fn get_run(&self, id: Uuid) -> Result<CodeAnalysisRun, StoreError> {
        self.runs.get(&id).map(|r| r.clone()).ok_or_else(|| StoreError::run_not_found(id))
    }

    async fn list_runs(
        &self,
        repository_id: Option<Uuid>,
    ) -> Result<Vec<CodeAnalysisRun>, StoreError> {
        let mut runs: Vec<_> = self
            .runs
            .iter()
            .filter(|r| repository_id.is_none_or(|id| id == r.repository_id))
            .map(|r| r.value().clone())
            .collect();
        sort_runs(&mut runs);
        Ok(runs)
    }
}

#[async_trait]
impl ConversationStore for MemoryStore {
    async fn persist(
        &self,
        conversation_id: Uuid,
        role: Role,
        content: &str,
    ) -> Result<(), StoreError> {
        self.conversations
            .entry(conversation_id)
            .or_default()
            .push(ChatMessage::new(role, content));
        Ok(())
    }

    async fn history(&self, conversation_id: Uuid) -> Result<Vec<ChatMessage>, StoreError> {
        Ok(self.conversations.get(&conversation_id).map(|m| m.clone()).unwrap_or_default())
    }
}
