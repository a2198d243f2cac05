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

/// Client for the Gemini `generateContent` endpoint.
pub struct GeminiAdapter {
    client: Client,
    config: ModelConfig,
    base_url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    system_instruction: InstructionContent<'a>,
    contents: Vec<UserContent<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct InstructionContent<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct UserContent<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: usize,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GeminiAdapter {
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
        let request = GeminiRequest {
            system_instruction: InstructionContent {
                parts: vec![Part {
                    text: &self.config.system_prompt,
                }],
            },
            contents: vec![UserContent {
                role: "user",
                parts: vec![Part { text: diff }],
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_tokens,
            },
        };

        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url, self.config.model_name
        );
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to send request to Gemini")?;

        let response = ensure_success(response, self.config.provider).await?;
        let parsed: GeminiResponse = response
            .json()
            .await
            .context("Failed to parse Gemini response")?;

        require_text(
            parsed
                .candidates
                .into_iter()
                .next()
                .and_then(|candidate| candidate.content)
                .and_then(|content| content.parts.into_iter().next())
                .and_then(|part| part.text),
        )
    }
}

#[async_trait]
impl ReviewAdapter for GeminiAdapter {
    async fn review(&self, diff: &str) -> Result<String, ReviewError> {
        let api_key = credentials::resolve(&self.config.api_key_env)?;
        debug!(model = %self.config.model_name, "calling gemini generateContent");
        self.complete(&api_key, diff)
            .await
            .map_err(|e| ReviewError::provider(self.config.provider.label(), e))
    }

    fn model_name(&self) -> &str {
        &self.config.model_name
    }
}
