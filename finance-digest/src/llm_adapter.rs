use crate::config::LlmSettings;
use crate::types::{DigestError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Chat completions can take minutes on long inputs.
const LLM_TIMEOUT_SECONDS: u64 = 600;

/// Trait for language-model backends used by the summarizer
#[async_trait]
pub trait LlmAdapter: Send + Sync {
    fn adapter_name(&self) -> String;

    /// Run one system + user exchange and return the model's reply.
    async fn complete(&self, system_prompt: &str, user_content: &str) -> Result<String>;
}

/// Adapter for any OpenAI-compatible chat completions endpoint (DeepSeek by default).
pub struct OpenAiCompatibleAdapter {
    client: Client,
    settings: LlmSettings,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatMessage>,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

impl OpenAiCompatibleAdapter {
    pub fn new(settings: LlmSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(LLM_TIMEOUT_SECONDS))
            .connect_timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self { client, settings })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.settings.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl LlmAdapter for OpenAiCompatibleAdapter {
    fn adapter_name(&self) -> String {
        format!("openai-compatible ({})", self.settings.model)
    }

    async fn complete(&self, system_prompt: &str, user_content: &str) -> Result<String> {
        let body = json!({
            "model": self.settings.model,
            "messages": [
                { "role": "system", "content": system_prompt },
                { "role": "user", "content": user_content },
            ],
        });

        info!("Requesting summary from {} ({} chars of input)", self.adapter_name(), user_content.chars().count());

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.settings.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(DigestError::General(format!("HTTP {}: {}", status, text)));
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&text)?;
        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| DigestError::General("completion returned no choices".to_string()))?;

        let reply = choice
            .message
            .and_then(|m| m.content)
            .or(choice.text)
            .ok_or_else(|| DigestError::General("completion choice has no content".to_string()))?;

        debug!("Received {} chars from {}", reply.chars().count(), self.adapter_name());
        Ok(reply.trim().to_string())
    }
}

/// Mock LLM adapter for development and testing
pub struct MockLlmAdapter {
    name: String,
    reply: std::result::Result<String, String>,
    calls: Arc<AtomicUsize>,
}

impl MockLlmAdapter {
    pub fn new(name: impl Into<String>, reply: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reply: Ok(reply.into()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reply: Err(error.into()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared counter, still readable after the adapter is boxed away.
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

#[async_trait]
impl LlmAdapter for MockLlmAdapter {
    fn adapter_name(&self) -> String {
        format!("Mock LLM Adapter ({})", self.name)
    }

    async fn complete(&self, _system_prompt: &str, _user_content: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply.clone().map_err(DigestError::General)
    }
}
