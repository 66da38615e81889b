//! Layered configuration for the `scrumpilot` binary.
//!
//! Sources, highest priority first:
//! 1. `SCRUMPILOT_*` environment variables (`__` nests, so
//!    `SCRUMPILOT_LLM__MODEL` sets `llm.model`)
//! 2. `OPENAI_API_KEY` / `OPENAI_MODEL`
//! 3. `scrumpilot.toml` in the working directory
//! 4. Built-in defaults
//!
//! A `.env` file is loaded into the process environment first when present.

use std::path::Path;
use std::time::Duration;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use scrumpilot_core::OpenAiConfig;

pub const CONFIG_FILE: &str = "scrumpilot.toml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub llm: LlmSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// When set, every route except the health check requires this key.
    pub api_key: Option<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        ServerSettings {
            host: "0.0.0.0".to_string(),
            port: 8001,
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LlmSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        let gateway = OpenAiConfig::default();
        LlmSettings {
            api_key: None,
            model: gateway.model,
            base_url: gateway.base_url,
            max_tokens: gateway.max_tokens,
            timeout_secs: gateway.timeout.as_secs(),
        }
    }
}

impl LlmSettings {
    pub fn gateway_config(&self) -> OpenAiConfig {
        OpenAiConfig {
            api_key: self.api_key.clone().filter(|k| !k.trim().is_empty()),
            model: self.model.clone(),
            base_url: self.base_url.trim_end_matches('/').to_string(),
            max_tokens: self.max_tokens,
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

impl Settings {
    /// Load `.env`, then extract the layered settings.
    pub fn load() -> Result<Self, figment::Error> {
        let _ = dotenvy::dotenv();
        Self::figment().extract()
    }

    /// The provider chain, without `.env` loading.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()));

        let local = Path::new(CONFIG_FILE);
        if local.exists() {
            figment = figment.merge(Toml::file(local));
        }

        figment
            .merge(Env::raw().filter_map(|key| {
                if key == "OPENAI_API_KEY" {
                    Some("llm.api_key".into())
                } else if key == "OPENAI_MODEL" {
                    Some("llm.model".into())
                } else {
                    None
                }
            }))
            .merge(Env::prefixed("SCRUMPILOT_").split("__"))
    }
}
