//! Anthropic Claude provider with retry and rate limiting

use super::openai_compat::retry_after;
use super::{ChatError, ChatMessage, ChatProvider, RetryPolicy, Role};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::debug;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Sliding one-minute window of request timestamps
#[derive(Debug, Clone)]
struct RateLimiter {
    max_rpm: usize,
    request_times: Arc<Mutex<Vec<Instant>>>,
}

impl RateLimiter {
    fn new(max_rpm: usize) -> Self {
        Self { max_rpm, request_times: Arc::new(Mutex::new(Vec::new())) }
    }

    async fn wait_if_needed(&self) {
        if self.max_rpm == 0 {
            return;
        }
        let mut times = self.request_times.lock().await;
        let now = Instant::now();

        times.retain(|&t| now.duration_since(t) < Duration::from_secs(60));

        if times.len() >= self.max_rpm {
            if let Some(&oldest) = times.first() {
                let wait_time = Duration::from_secs(60).saturating_sub(now.duration_since(oldest));
                if wait_time > Duration::ZERO {
                    debug!("Rate limit reached, waiting {:?}", wait_time);
                    sleep(wait_time).await;
                }
            }
        }

        times.push(Instant::now());
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClaudeConfig {
    pub api_key_env: String,
    pub base_url: String,
    pub model: String,
    pub max_tokens: usize,
    pub temperature: f32,
    pub timeout_secs: u64,
    /// Zero disables client-side rate limiting
    pub max_requests_per_minute: usize,
    pub retry: RetryPolicy,
}

impl Default for ClaudeConfig {
    fn default() -> Self {
        Self {
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
            base_url: "https://api.anthropic.com".to_string(),
            model: "claude-3-5-sonnet-20241022".to_string(),
            max_tokens: 4096,
            temperature: 0.2,
            timeout_secs: 60,
            max_requests_per_minute: 50,
            retry: RetryPolicy::default(),
        }
    }
}

#[derive(Debug, Serialize)]
struct MessageRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: usize,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    #[serde(default)]
    content: Vec<Content>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum Content {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

/// History and user turn; the system prompt travels as a top-level field
fn build_messages(history: &[ChatMessage], user_message: &str) -> Vec<ChatMessage> {
    let mut messages: Vec<ChatMessage> =
        history.iter().filter(|m| m.role != Role::System).cloned().collect();
    messages.push(ChatMessage::user(user_message));
    messages
}

/// Concatenated text blocks of a messages API response
fn parse_response(body: &str) -> Result<String, ChatError> {
    let response: MessageResponse = serde_json::from_str(body)?;
    let text: String = response
        .content
        .into_iter()
        .filter_map(|c| match c {
            Content::Text { text } => Some(text),
            Content::Other => None,
        })
        .collect::<Vec<_>>()
        .join("");

    if text.trim().is_empty() {
        return Err(ChatError::empty("claude"));
    }
    Ok(text)
}

pub struct ClaudeProvider {
    client: Client,
    config: ClaudeConfig,
    rate_limiter: RateLimiter,
}

impl ClaudeProvider {
    pub fn new(config: ClaudeConfig) -> Result<Self, ChatError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ChatError::config(e.to_string()))?;
        let rate_limiter = RateLimiter::new(config.max_requests_per_minute);

        Ok(Self { client, config, rate_limiter })
    }

    async fn send_once(&self, request: &MessageRequest<'_>, api_key: &str) -> Result<String, ChatError> {
        self.rate_limiter.wait_if_needed().await;

        let response = self
            .client
            .post(format!("{}/v1/messages", self.config.base_url.trim_end_matches('/')))
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ChatError::timeout(Duration::from_secs(self.config.timeout_secs))
                } else {
                    e.into()
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = retry_after(response.headers());
            let body = response.text().await.unwrap_or_default();
            // 529 is Anthropic's "overloaded"
            return Err(ChatError::from_status(status.as_u16(), body, retry_after));
        }

        let body = response.text().await?;
        parse_response(&body)
    }
}

#[async_trait]
impl ChatProvider for ClaudeProvider {
    fn name(&self) -> &str {
        "claude"
    }

    async fn send(
        &self,
        system_prompt: &str,
        history: &[ChatMessage],
        user_message: &str,
    ) -> Result<String, ChatError> {
        let api_key = std::env::var(&self.config.api_key_env).map_err(|_| {
            ChatError::config(format!("Anthropic API key not found in ${}", self.config.api_key_env))
        })?;

        let request = MessageRequest {
            model: &self.config.model,
            messages: build_messages(history, user_message),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            system: (!system_prompt.is_empty()).then_some(system_prompt),
        };
        debug!("Sending {} messages to claude", request.messages.len());

        self.config.retry.run("claude", || self.send_once(&request, &api_key)).await
    }
}
