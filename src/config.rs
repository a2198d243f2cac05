use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAMES: [&str; 2] = [".diffreview.yml", ".diffreview.yaml"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_max_diff_size")]
    pub max_diff_size: usize,

    pub system_prompt: Option<String>,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub base_urls: BaseUrls,
}

/// Per-provider endpoint overrides, mostly useful for proxies.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BaseUrls {
    pub deepseek: Option<String>,
    pub openai: Option<String>,
    pub anthropic: Option<String>,
    pub gemini: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: default_model(),
            max_diff_size: default_max_diff_size(),
            system_prompt: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
            base_urls: BaseUrls::default(),
        }
    }
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub model: Option<String>,
    pub max_diff_size: Option<usize>,
    pub prompt: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<usize>,
    pub timeout_secs: Option<u64>,
}

impl Config {
    pub fn load() -> Result<Self> {
        for name in CONFIG_FILE_NAMES {
            let path = PathBuf::from(name);
            if path.exists() {
                return Self::load_from(&path);
            }
        }

        if let Some(home_dir) = dirs::home_dir() {
            let home_config = home_dir.join(CONFIG_FILE_NAMES[0]);
            if home_config.exists() {
                return Self::load_from(&home_config);
            }
        }

        Ok(Config::default())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    pub fn merge_with_cli(&mut self, cli: CliOverrides) {
        if let Some(model) = cli.model {
            self.model = model;
        }
        if let Some(size) = cli.max_diff_size {
            self.max_diff_size = size;
        }
        if let Some(prompt) = cli.prompt {
            self.system_prompt = Some(prompt);
        }
        if let Some(temperature) = cli.temperature {
            self.temperature = temperature;
        }
        if let Some(tokens) = cli.max_tokens {
            self.max_tokens = tokens;
        }
        if let Some(secs) = cli.timeout_secs {
            self.timeout_secs = secs;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_diff_size == 0 {
            anyhow::bail!("max_diff_size must be greater than zero");
        }
        if self.timeout_secs == 0 {
            anyhow::bail!("timeout_secs must be greater than zero");
        }
        Ok(())
    }
}

fn default_model() -> String {
    "deepseek-chat".to_string()
}

fn default_max_diff_size() -> usize {
    10_000
}

fn default_temperature() -> f32 {
    0.2
}

fn default_max_tokens() -> usize {
    4000
}

fn default_timeout_secs() -> u64 {
    60
}
