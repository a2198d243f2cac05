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

const ANTHROPIC_VERSION: &str = "2023-06-01";

pub struct AnthropicAdapter {
    client: Client,
    config: ModelConfig,
    base_url: String,
}

#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    max_tokens: usize,
    temperature: f32,
    system: &'a str,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    content: Vec<Content>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(rename = "type")]
    content_type: String,
    text: Option<String>,
}

impl AnthropicAdapter {
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
        let request = AnthropicRequest {
            model: &self.config.model_name,
            messages: vec![Message {
                role: "user",
                content: diff,
            }],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            system: &self.config.system_prompt,
        };

        let response = self
            .client
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .context("Failed to send request to Anthropic")?;

        let response = ensure_success(response, self.config.provider).await?;
        let parsed: AnthropicResponse = response
            .json()
            .await
            .context("Failed to parse Anthropic response")?;

        // Only text blocks carry review content.
        require_text(
            parsed
                .content
                .into_iter()
                .find(|block| block.content_type == "text")
                .and_then(|block| block.text),
        )
    }
}

#[async_trait]
impl ReviewAdapter for AnthropicAdapter {
    async fn review(&self, diff: &str) -> Result<String, ReviewError> {
        let api_key = credentials::resolve(&self.config.api_key_env)?;
        debug!(model = %self.config.model_name, "calling anthropic messages");
        self.complete(&api_key, diff)
            .await
            .map_err(|e| ReviewError::provider(self.config.provider.label(), e))
    }

    fn model_name(&self) -> &str {
        &self.config.model_name
    }
}
