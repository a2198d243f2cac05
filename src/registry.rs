//! The one table of supported models.
//!
//! Validation and dispatch both read [`MODELS`], so an id is either fully
//! supported or rejected up front.

use crate::adapters::llm::{ModelConfig, Provider, ReviewAdapter};
use crate::adapters::{AnthropicAdapter, GeminiAdapter, OpenAIAdapter};
use crate::config::Config;
use crate::core::ReviewPrompt;
use crate::error::ReviewError;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelSpec {
    /// Identifier accepted on the command line.
    pub id: &'static str,
    pub provider: Provider,
    /// Model name sent to the provider's API.
    pub api_model: &'static str,
    pub api_key_env: &'static str,
}

pub const MODELS: &[ModelSpec] = &[
    ModelSpec {
        id: "deepseek-chat",
        provider: Provider::DeepSeek,
        api_model: "deepseek-chat",
        api_key_env: "DEEPSEEK_API_KEY",
    },
    ModelSpec {
        id: "gemini-2.0-flash-exp",
        provider: Provider::Gemini,
        api_model: "gemini-2.0-flash-exp",
        api_key_env: "GEMINI_API_KEY",
    },
    ModelSpec {
        id: "gpt-4o",
        provider: Provider::OpenAI,
        api_model: "gpt-4o",
        api_key_env: "OPENAI_API_KEY",
    },
    ModelSpec {
        id: "claude-sonnet",
        provider: Provider::Anthropic,
        api_model: "claude-3-5-sonnet-20241022",
        api_key_env: "ANTHROPIC_API_KEY",
    },
];

pub fn model_ids() -> impl Iterator<Item = &'static str> {
    MODELS.iter().map(|spec| spec.id)
}

fn unknown_model(id: &str) -> ReviewError {
    ReviewError::UnknownModel {
        model: id.to_string(),
        supported: model_ids().collect::<Vec<_>>().join(", "),
    }
}

/// Builds the adapter for one registry entry. Credentials are not touched here.
pub fn create_adapter(spec: &ModelSpec, config: &Config) -> Result<Arc<dyn ReviewAdapter>> {
    let base_url = match spec.provider {
        Provider::DeepSeek => config.base_urls.deepseek.clone(),
        Provider::OpenAI => config.base_urls.openai.clone(),
        Provider::Anthropic => config.base_urls.anthropic.clone(),
        Provider::Gemini => config.base_urls.gemini.clone(),
    };

    let prompt = ReviewPrompt::new(config.system_prompt.as_deref());
    let model_config = ModelConfig {
        provider: spec.provider,
        model_name: spec.api_model.to_string(),
        api_key_env: spec.api_key_env.to_string(),
        base_url,
        system_prompt: prompt.as_str().to_string(),
        temperature: config.temperature,
        max_tokens: config.max_tokens,
        timeout: Duration::from_secs(config.timeout_secs),
    };

    let adapter: Arc<dyn ReviewAdapter> = match spec.provider {
        Provider::DeepSeek | Provider::OpenAI => Arc::new(OpenAIAdapter::new(model_config)?),
        Provider::Anthropic => Arc::new(AnthropicAdapter::new(model_config)?),
        Provider::Gemini => Arc::new(GeminiAdapter::new(model_config)?),
    };
    Ok(adapter)
}

struct RegistryEntry {
    spec: &'static ModelSpec,
    adapter: Arc<dyn ReviewAdapter>,
}

/// Maps model ids to ready adapters.
pub struct ModelRegistry {
    entries: Vec<RegistryEntry>,
}

impl ModelRegistry {
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_factory(|spec| create_adapter(spec, config))
    }

    /// Builds one adapter per entry of [`MODELS`] using `factory`.
    pub fn with_factory<F>(mut factory: F) -> Result<Self>
    where
        F: FnMut(&'static ModelSpec) -> Result<Arc<dyn ReviewAdapter>>,
    {
        let entries = MODELS
            .iter()
            .map(|spec| -> Result<RegistryEntry> {
                Ok(RegistryEntry {
                    spec,
                    adapter: factory(spec)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { entries })
    }

    pub fn lookup(&self, model_id: &str) -> Result<&'static ModelSpec, ReviewError> {
        Ok(self.entry(model_id)?.spec)
    }

    /// Runs the review on the adapter registered for `model_id`.
    ///
    /// No fallback: a provider failure is returned as-is.
    pub async fn dispatch(&self, model_id: &str, diff: &str) -> Result<String, ReviewError> {
        let entry = self.entry(model_id)?;
        let spec = entry.spec;
        info!(
            model = spec.id,
            provider = spec.provider.label(),
            api_model = entry.adapter.model_name(),
            "dispatching review"
        );
        entry.adapter.review(diff).await
    }

    fn entry(&self, model_id: &str) -> Result<&RegistryEntry, ReviewError> {
        self.entries
            .iter()
            .find(|entry| entry.spec.id == model_id)
            .ok_or_else(|| unknown_model(model_id))
    }
}
