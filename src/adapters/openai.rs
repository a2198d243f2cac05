use crate::adapters::llm::{
    build_client, ensure_success, require_text, ModelConfig, ReviewAdapter,
};
use crate::core::credentials;
use crate::error::ReviewError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Chat Completions client. DeepSeek speaks the same protocol, so it is
/// served by this adapter with a different base URL and key.
pub struct OpenAIAdapter {
    client: Client,
    config: ModelConfig,
    base_url: String,
}

#[derive(Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
    max_tokens: usize,
    stream: bool,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl OpenAIAdapter {
    pub fn new(config: ModelConfig) -> Result<Self> {
        let base_url = config.base_url();
        let client = build_client(config.timeout)?;

        Ok(Self {
            client,
            config,
            base_url,
        })
    }

    async fn complete(&self, api_key: &str, diff: &str) -> Result<String> {
        let request = OpenAIRequest {
            model: &self.config.model_name,
            messages: vec![
                Message {
                    role: "system",
                    content: &self.config.system_prompt,
                },
                Message {
                    role: "user",
                    content: diff,
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            stream: false,
        };

        let label = self.config.provider.label();
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", label))?;

        let response = ensure_success(response, self.config.provider).await?;
        let parsed: OpenAIResponse = response
            .json()
            .await
            .with_context(|| format!("Failed to parse {} response", label))?;

        require_text(
            parsed
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.message.content),
        )
    }
}

#[async_trait]
impl ReviewAdapter for OpenAIAdapter {
    async fn review(&self, diff: &str) -> Result<String, ReviewError> {
        let api_key = credentials::resolve(&self.config.api_key_env)?;
        debug!(model = %self.config.model_name, "calling chat completions");
        self.complete(&api_key, diff)
            .await
            .map_err(|e| ReviewError::provider(self.config.provider.label(), e))
    }

    fn model_name(&self) -> &str {
        &self.config.model_name
    }
}
