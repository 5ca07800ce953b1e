//! JSON file store under a data directory
//!
//! ```text
//! <data_dir>/
//!   suggestions.json      all suggestions, insertion order
//!   runs.json             all analysis runs
//!   conversations.jsonl   one persisted chat message per line
//! ```

use super::{
    AnalysisRunStore, ConversationStore, StoreError, SuggestionFilter, SuggestionStore,
    check_run_update, sort_runs,
};
use crate::analysis::CodeAnalysisRun;
use crate::relay::{ChatMessage, Role};
use crate::suggestion::{CodeSuggestion, SuggestionStatus};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

const SUGGESTIONS_FILE: &str = "suggestions.json";
const RUNS_FILE: &str = "runs.json";
const CONVERSATIONS_FILE: &str = "conversations.jsonl";

#[derive(Debug, Serialize, Deserialize)]
struct ConversationRecord {
    conversation_id: Uuid,
    role: Role,
    content: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct JsonFileStore {
    data_dir: PathBuf,
    // Serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self { data_dir: data_dir.into(), lock: Mutex::new(()) }
    }

    /// Store rooted at the user's data directory
    pub fn default_location() -> Option<Self> {
        dirs::data_dir().map(|dir| Self::new(dir.join("code-suggest")))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    async fn read_all<T: DeserializeOwned>(&self, name: &str) -> Result<Vec<T>, StoreError> {
        let path = self.data_dir.join(name);
        if !fs::try_exists(&path).await? {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&path).await?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    async fn write_all<T: Serialize>(&self, name: &str, items: &[T]) -> Result<(), StoreError> {
        fs::create_dir_all(&self.data_dir).await?;
        let path = self.data_dir.join(name);
        let tmp = self.data_dir.join(format!("{}.tmp", name));

        fs::write(&tmp, serde_json::to_vec_pretty(items)?).await?;
        fs::rename(&tmp, &path).await?;
        debug!("Wrote {} records to {}", items.len(), path.display());
        Ok(())
    }
}

#[async_trait]
impl SuggestionStore for JsonFileStore {
    async fn insert(&self, suggestions: Vec<CodeSuggestion>) -> Result<(), StoreError> {
        if suggestions.is_empty() {
            return Ok(());
        }
        let _guard = self.lock.lock().await;
        let mut all: Vec<CodeSuggestion> = self.read_all(SUGGESTIONS_FILE).await?;
        all.extend(suggestions);
        self.write_all(SUGGESTIONS_FILE, &all).await
    }

    async fn get(&self, id: Uuid) -> Result<CodeSuggestion, StoreError> {
        let all: Vec<CodeSuggestion> = self.read_all(SUGGESTIONS_FILE).await?;
        all.into_iter().find(|s| s.id == id).ok_or_else(|| StoreError::suggestion_not_found(id))
    }

    async fn list(&self, filter: &SuggestionFilter) -> Result<Vec<CodeSuggestion>, StoreError> {
        let all: Vec<CodeSuggestion> = self.read_all(SUGGESTIONS_FILE).await?;
        Ok(all.into_iter().filter(|s| filter.matches(s)).collect())
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: SuggestionStatus,
    ) -> Result<CodeSuggestion, StoreError> {
        let _guard = self.lock.lock().await;
        let mut all: Vec<CodeSuggestion> = self.read_all(SUGGESTIONS_FILE).await?;
        let suggestion = all
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| StoreError::suggestion_not_found(id))?;
        suggestion.transition(status)?;
        let updated = suggestion.clone();

        self.write_all(SUGGESTIONS_FILE, &all).await?;
        Ok(updated)
    }
}

#[async_trait]
impl AnalysisRunStore for JsonFileStore {
    async fn insert_run(&self, run: &CodeAnalysisRun) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut runs: Vec<CodeAnalysisRun> = self.read_all(RUNS_FILE).await?;
        if runs.iter().any(|r| r.id == run.id) {
            return Err(StoreError::run_exists(run.id));
        }
        runs.push(run.clone());
        self.write_all(RUNS_FILE, &runs).await
    }

    async fn update_run(&self, run: &CodeAnalysisRun) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut runs: Vec<CodeAnalysisRun> = self.read_all(RUNS_FILE).await?;
        let stored = runs
            .iter_mut()
            .find(|r| r.id == run.id)
            .ok_or_else(|| StoreError::run_not_found(run.id))?;
        check_run_update(stored, run)?;
        *stored = run.clone();
        self.write_all(RUNS_FILE, &runs).await
    }

    async fn get_run(&self, id: Uuid) -> Result<CodeAnalysisRun, StoreError> {
        let runs: Vec<CodeAnalysisRun> = self.read_all(RUNS_FILE).await?;
        runs.into_iter().find(|r| r.id == id).ok_or_else(|| StoreError::run_not_found(id))
    }

    async fn list_runs(
        &self,
        repository_id: Option<Uuid>,
    ) -> Result<Vec<CodeAnalysisRun>, StoreError> {
        let mut runs: Vec<CodeAnalysisRun> = self.read_all(RUNS_FILE).await?;
        runs.retain(|r| repository_id.is_none_or(|id| id == r.repository_id));
        sort_runs(&mut runs);
        Ok(runs)
    }
}

#[async_trait]
impl ConversationStore for JsonFileStore {
    async fn persist(
        &self,
        conversation_id: Uuid,
        role: Role,
        content: &str,
    ) -> Result<(), StoreError> {
        let record = ConversationRecord {
            conversation_id,
            role,
            content: content.to_string(),
            created_at: Utc::now(),
        };
        let mut line = serde_json::to_string(&record)?;
        line.push('\n');

        let _guard = self.lock.lock().await;
        fs::create_dir_all(&self.data_dir).await?;
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.data_dir.join(CONVERSATIONS_FILE))
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    async fn history(&self, conversation_id: Uuid) -> Result<Vec<ChatMessage>, StoreError> {
        let path = self.data_dir.join(CONVERSATIONS_FILE);
        if !fs::try_exists(&path).await? {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&path).await?;
        let mut messages = Vec::new();
        for line in content.lines().filter(|l| !l.trim().is_empty()) {
            let record: ConversationRecord = serde_json::from_str(line)?;
            if record.conversation_id == conversation_id {
                messages.push(ChatMessage::new(record.role, record.content));
            }
        }
        Ok(messages)
    }
}
