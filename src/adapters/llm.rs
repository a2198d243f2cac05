use crate::error::ReviewError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Backend families a model can be served by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    DeepSeek,
    OpenAI,
    Anthropic,
    Gemini,
}

impl Provider {
    pub fn label(&self) -> &'static str {
        match self {
            Provider::DeepSeek => "DeepSeek",
            Provider::OpenAI => "OpenAI",
            Provider::Anthropic => "Anthropic",
            Provider::Gemini => "Gemini",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Provider::DeepSeek => "https://api.deepseek.com",
            Provider::OpenAI => "https://api.openai.com/v1",
            Provider::Anthropic => "https://api.anthropic.com/v1",
            Provider::Gemini => "https://generativelanguage.googleapis.com/v1beta",
        }
    }
}

/// Everything an adapter needs to talk to its backend, minus the key.
///
/// The key is looked up from `api_key_env` on every review, never stored.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub provider: Provider,
    pub model_name: String,
    pub api_key_env: String,
    pub base_url: Option<String>,
    pub system_prompt: String,
    pub temperature: f32,
    pub max_tokens: usize,
    pub timeout: Duration,
}

impl ModelConfig {
    pub fn base_url(&self) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| self.provider.default_base_url().to_string())
            .trim_end_matches('/')
            .to_string()
    }
}

/// Turns a diff into review text. One implementation per backend.
#[async_trait]
pub trait ReviewAdapter: Send + Sync {
    async fn review(&self, diff: &str) -> Result<String, ReviewError>;
    fn model_name(&self) -> &str;
}

pub(crate) fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .context("Failed to build HTTP client")
}

/// Fails on any non-2xx status, keeping the body for the error message.
pub(crate) async fn ensure_success(
    response: reqwest::Response,
    provider: Provider,
) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    anyhow::bail!("{} API error ({}): {}", provider.label(), status, body);
}

/// A response with no text is a failure, not an empty review.
pub(crate) fn require_text(text: Option<String>) -> Result<String> {
    match text {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => anyhow::bail!("response contained no review text"),
    }
}

#[cfg(test)]
pub(crate) fn test_config(provider: Provider, api_key_env: &str, base_url: &str) -> ModelConfig {
    ModelConfig {
        provider,
        model_name: "test-model".to_string(),
        api_key_env: api_key_env.to_string(),
        base_url: Some(base_url.to_string()),
        system_prompt: "Review this.".to_string(),
        temperature: 0.2,
        max_tokens: 256,
        timeout: Duration::from_secs(5),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trims_trailing_slash() {
        let config = test_config(Provider::OpenAI, "UNUSED", "http://localhost:1234/");
        assert_eq!(config.base_url(), "http://localhost:1234");
    }

    #[test]
    fn base_url_defaults_per_provider() {
        let mut config = test_config(Provider::DeepSeek, "UNUSED", "");
        config.base_url = None;
        assert_eq!(config.base_url(), "https://api.deepseek.com");
    }

    #[test]
    fn require_text_rejects_missing_and_blank() {
        assert!(require_text(None).is_err());
        assert!(require_text(Some("  \n".to_string())).is_err());
        assert_eq!(require_text(Some("LGTM".to_string())).unwrap(), "LGTM");
    }
}
