//! OpenAI-compatible chat completions for DeepSeek, Azure OpenAI and similar services
//!
//! The services share the request and response shapes and differ in base
//! URL, auth header and (for Azure) the deployment-scoped endpoint.

use super::{ChatError, ChatMessage, ChatProvider, RetryPolicy, Role};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OpenAiCompatConfig {
    pub provider: String,
    pub base_url: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Model name, or deployment name on Azure
    pub model: String,
    pub max_tokens: usize,
    pub temperature: f32,
    pub timeout_secs: u64,
    pub auth_header: String,
    /// Prepended to the key with a space; empty sends the bare key
    pub auth_prefix: String,
    /// Azure `api-version` query parameter; switches to deployment URLs
    pub api_version: Option<String>,
    pub retry: RetryPolicy,
}

impl Default for OpenAiCompatConfig {
    fn default() -> Self {
        Self::deepseek()
    }
}

impl OpenAiCompatConfig {
    pub fn deepseek() -> Self {
        Self {
            provider: "deepseek".to_string(),
            base_url: "https://api.deepseek.com".to_string(),
            api_key_env: "DEEPSEEK_API_KEY".to_string(),
            model: "deepseek-chat".to_string(),
            max_tokens: 4096,
            temperature: 0.2,
            timeout_secs: 60,
            auth_header: "Authorization".to_string(),
            auth_prefix: "Bearer".to_string(),
            api_version: None,
            retry: RetryPolicy::default(),
        }
    }

    /// Azure OpenAI, addressed as `<endpoint>/openai/deployments/<deployment>`
    pub fn azure(endpoint: impl Into<String>, deployment: impl Into<String>) -> Self {
        Self {
            provider: "azure".to_string(),
            base_url: endpoint.into(),
            api_key_env: "AZURE_OPENAI_API_KEY".to_string(),
            model: deployment.into(),
            auth_header: "api-key".to_string(),
            auth_prefix: String::new(),
            api_version: Some("2024-02-15-preview".to_string()),
            ..Self::deepseek()
        }
    }

    pub fn endpoint(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        match &self.api_version {
            Some(version) => format!(
                "{}/openai/deployments/{}/chat/completions?api-version={}",
                base, self.model, version
            ),
            None => format!("{}/chat/completions", base),
        }
    }

    pub fn auth_value(&self, api_key: &str) -> String {
        if self.auth_prefix.is_empty() {
            api_key.to_string()
        } else {
            format!("{} {}", self.auth_prefix, api_key)
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: usize,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// System prompt, then history, then the new user turn
pub fn build_messages(
    system_prompt: &str,
    history: &[ChatMessage],
    user_message: &str,
) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    if !system_prompt.is_empty() {
        messages.push(ChatMessage::system(system_prompt));
    }
    messages.extend(history.iter().filter(|m| m.role != Role::System).cloned());
    messages.push(ChatMessage::user(user_message));
    messages
}

/// Text of the first choice
pub fn parse_response(body: &str, provider: &str) -> Result<String, ChatError> {
    let response: ChatCompletionResponse = serde_json::from_str(body)?;
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| ChatError::empty(provider))
}

pub(crate) fn retry_after(headers: &reqwest::header::HeaderMap) -> Option<Duration> {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

pub struct OpenAiCompatProvider {
    client: Client,
    config: OpenAiCompatConfig,
}

impl OpenAiCompatProvider {
    pub fn new(config: OpenAiCompatConfig) -> Result<Self, ChatError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ChatError::config(e.to_string()))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &OpenAiCompatConfig {
        &self.config
    }

    async fn send_once(
        &self,
        request: &ChatCompletionRequest<'_>,
        api_key: &str,
    ) -> Result<String, ChatError> {
        let response = self
            .client
            .post(self.config.endpoint())
            .header(self.config.auth_header.as_str(), self.config.auth_value(api_key))
            .json(request)
            .send()
            .await
            .map_err(|e| self.timeout_aware(e))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = retry_after(response.headers());
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::from_status(status.as_u16(), body, retry_after));
        }

        let body = response.text().await?;
        parse_response(&body, &self.config.provider)
    }

    fn timeout_aware(&self, e: reqwest::Error) -> ChatError {
        if e.is_timeout() {
            ChatError::timeout(Duration::from_secs(self.config.timeout_secs))
        } else {
            e.into()
        }
    }
}

#[async_trait]
impl ChatProvider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.config.provider
    }

    async fn send(
        &self,
        system_prompt: &str,
        history: &[ChatMessage],
        user_message: &str,
    ) -> Result<String, ChatError> {
        let api_key = std::env::var(&self.config.api_key_env).map_err(|_| {
            ChatError::config(format!(
                "{} API key not found in ${}",
                self.config.provider, self.config.api_key_env
            ))
        })?;

        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages: build_messages(system_prompt, history, user_message),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };
        debug!("Sending {} messages to {}", request.messages.len(), self.config.provider);

        self.config
            .retry
            .run(&self.config.provider, || self.send_once(&request, &api_key))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let deepseek = OpenAiCompatConfig::deepseek();
        assert_eq!(deepseek.endpoint(), "https://api.deepseek.com/chat/completions");
        assert_eq!(deepseek.auth_value("k"), "Bearer k");

        let azure = OpenAiCompatConfig::azure("https://acme.openai.azure.com/", "gpt-4o");
        assert_eq!(
            azure.endpoint(),
            "https://acme.openai.azure.com/openai/deployments/gpt-4o/chat/completions?api-version=2024-02-15-preview"
        );
        assert_eq!(azure.auth_header, "api-key");
        assert_eq!(azure.auth_value("k"), "k");
    }

    #[test]
    fn test_build_messages() {
        let history = vec![
            ChatMessage::system("stale prompt"),
            ChatMessage::user("hi"),
            ChatMessage::assistant("hello"),
        ];
        let messages = build_messages("be helpful", &history, "review this");

        let roles: Vec<_> = messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, [Role::System, Role::User, Role::Assistant, Role::User]);
        assert_eq!(messages[0].content, "be helpful");
        assert_eq!(messages[3].content, "review this");
    }

    #[test]
    fn test_request_wire_format() {
        let request = ChatCompletionRequest {
            model: "deepseek-chat",
            messages: build_messages("sys", &[], "hi"),
            max_tokens: 10,
            temperature: 0.0,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "hi");
        assert_eq!(value["model"], "deepseek-chat");
    }

    #[test]
    fn test_parse_response() {
        let body = r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"Use a parameterized query."},"finish_reason":"stop"}]}"#;
        assert_eq!(parse_response(body, "deepseek").unwrap(), "Use a parameterized query.");

        let empty = r#"{"choices":[]}"#;
        assert!(matches!(parse_response(empty, "deepseek"), Err(ChatError::EmptyResponse { .. })));

        let null_content = r#"{"choices":[{"message":{"content":null}}]}"#;
        assert!(parse_response(null_content, "azure").is_err());

        assert!(matches!(parse_response("<html>", "azure"), Err(ChatError::ParseError { .. })));
    }

    #[test]
    fn test_config_from_toml() {
        let config: OpenAiCompatConfig = toml::from_str(
            r#"
provider = "azure"
base_url = "https://acme.openai.azure.com"
model = "gpt-4o"
auth_header = "api-key"
auth_prefix = ""
api_version = "2024-06-01"
"#,
        )
        .unwrap();
        assert!(config.endpoint().ends_with("api-version=2024-06-01"));
        assert_eq!(config.api_key_env, "DEEPSEEK_API_KEY");
    }
}
