//! Conversational relay
//!
//! Forwards a user message and the conversation history to an upstream
//! chat-completion API, persists both sides of the exchange and, when the
//! trigger policy fires on the reply, runs the extractor against the first
//! open file.

pub mod claude;
pub mod errors;
pub mod mock;
pub mod openai_compat;
pub mod retry;
pub mod trigger;

use crate::extractor::SuggestionExtractor;
use crate::store::{ConversationStore, SuggestionStore};
use crate::suggestion::{CodeSuggestion, Provenance};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

pub use claude::{ClaudeConfig, ClaudeProvider};
pub use errors::{ChatError, RelayError};
pub use mock::MockProvider;
pub use openai_compat::{OpenAiCompatConfig, OpenAiCompatProvider};
pub use retry::RetryPolicy;
pub use trigger::{KeywordTrigger, NeverAnalyze, ShouldAnalyze};

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an expert software engineer helping a developer \
understand and improve their code. Point out bugs, security problems and performance issues, \
and show corrected code in fenced code blocks tagged with the language.";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self { role, content: content.into() }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// An upstream chat-completion API
#[async_trait]
pub trait ChatProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Send one user turn and return the assistant's text
    async fn send(
        &self,
        system_prompt: &str,
        history: &[ChatMessage],
        user_message: &str,
    ) -> Result<String, ChatError>;
}

/// A file the user has open in the editor
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OpenFile {
    pub path: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayRequest {
    pub conversation_id: Uuid,
    pub message: String,
    #[serde(default)]
    pub repository_id: Option<Uuid>,
    #[serde(default)]
    pub open_files: Vec<OpenFile>,
    #[serde(default)]
    pub framework_hint: Option<String>,
}

impl RelayRequest {
    pub fn new(conversation_id: Uuid, message: impl Into<String>) -> Self {
        Self {
            conversation_id,
            message: message.into(),
            repository_id: None,
            open_files: Vec::new(),
            framework_hint: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayResponse {
    pub conversation_id: Uuid,
    pub reply: String,
    /// Path of the file the extractor ran against, if it ran
    pub analyzed_file: Option<String>,
    pub suggestions: Vec<CodeSuggestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RelayOptions {
    pub system_prompt: String,
    /// Also extract from fenced code blocks in the reply
    pub scan_code_blocks: bool,
}

impl Default for RelayOptions {
    fn default() -> Self {
        Self { system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(), scan_code_blocks: false }
    }
}

/// Path that code found in an assistant reply is stored under.
///
/// `message_index` is the 0-based position of the reply in the conversation;
/// line numbers of suggestions stored under this path count from the first
/// line of that message.
pub fn reply_path(conversation_id: Uuid, message_index: usize) -> String {
    format!("conversation/{}/message-{}", conversation_id, message_index)
}

pub struct ChatRelay {
    provider: Arc<dyn ChatProvider>,
    conversations: Arc<dyn ConversationStore>,
    suggestions: Arc<dyn SuggestionStore>,
    extractor: SuggestionExtractor,
    trigger: Box<dyn ShouldAnalyze>,
    options: RelayOptions,
}

impl ChatRelay {
    pub fn new(
        provider: Arc<dyn ChatProvider>,
        conversations: Arc<dyn ConversationStore>,
        suggestions: Arc<dyn SuggestionStore>,
    ) -> Self {
        Self {
            provider,
            conversations,
            suggestions,
            extractor: SuggestionExtractor::new(),
            trigger: Box::new(KeywordTrigger::default()),
            options: RelayOptions::default(),
        }
    }

    pub fn with_extractor(mut self, extractor: SuggestionExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_trigger(mut self, trigger: impl ShouldAnalyze + 'static) -> Self {
        self.trigger = Box::new(trigger);
        self
    }

    pub fn with_options(mut self, options: RelayOptions) -> Self {
        self.options = options;
        self
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Relay one user turn
    pub async fn handle(&self, request: RelayRequest) -> Result<RelayResponse, RelayError> {
        if request.message.trim().is_empty() {
            return Err(RelayError::InvalidRequest("message is empty".to_string()));
        }
        let conversation_id = request.conversation_id;

        let history = self.conversations.history(conversation_id).await?;
        self.conversations.persist(conversation_id, Role::User, &request.message).await?;

        let reply = self
            .provider
            .send(&self.options.system_prompt, &history, &request.message)
            .await?;
        self.conversations.persist(conversation_id, Role::Assistant, &reply).await?;
        info!(
            "Relayed turn {} of conversation {} via {}",
            history.len() / 2 + 1,
            conversation_id,
            self.provider.name()
        );

        let mut response =
            RelayResponse { conversation_id, reply, analyzed_file: None, suggestions: Vec::new() };

        if !self.trigger.should_analyze(&response.reply) {
            return Ok(response);
        }
        let (Some(repository_id), Some(file)) = (request.repository_id, request.open_files.first())
        else {
            debug!("Analysis triggered but no repository or open file");
            return Ok(response);
        };

        let framework = request.framework_hint.as_deref();
        let mut suggestions: Vec<CodeSuggestion> = self
            .extractor
            .extract_file(&file.path, &file.content, framework)
            .into_iter()
            .map(|d| CodeSuggestion::from_draft(d, repository_id, &file.path, Provenance::Ai))
            .collect();

        if self.options.scan_code_blocks {
            // The assistant message follows the history and the user turn
            let path = reply_path(conversation_id, history.len() + 1);
            suggestions.extend(
                self.extractor
                    .extract_code_blocks(&response.reply, framework)
                    .into_iter()
                    .map(|d| CodeSuggestion::from_draft(d, repository_id, &path, Provenance::Ai)),
            );
        }

        self.suggestions.insert(suggestions.clone()).await?;
        info!("Stored {} suggestions for {}", suggestions.len(), file.path);

        response.analyzed_file = Some(file.path.clone());
        response.suggestions = suggestions;
        Ok(response)
    }
}

#[cfg(test)]
mod tests;
