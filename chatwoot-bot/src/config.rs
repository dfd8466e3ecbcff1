//! Bot configuration: TOML file with `[chatwoot]`, `[gemini]`, `[service]`
//! and `[cache]` sections.

use std::path::Path;

use serde::Deserialize;

use crate::core::error::{BotError, Result};

/// Sample config written by `cwbot init-config`.
pub const SAMPLE_CONFIG: &str = r#"[chatwoot]
account_id = 1
access_key = "your_chatwoot_access_token_here"
url = "https://your-chatwoot-instance.com/"

[gemini]
api_key = "your_gemini_api_key_here"
model = "models/gemini-2.5-flash"
max_tokens = 1000
temperature = 0.7
# system_prompt = "You are a helpful customer service assistant."

[service]
host = "0.0.0.0"
port = 8000
# log_file = "logs/cwbot.log"

[cache]
# Idle seconds after which cached conversation context is dropped.
ttl_secs = 7200
"#;

#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    pub chatwoot: ChatwootConfig,
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatwootConfig {
    pub url: String,
    pub access_key: String,
    #[serde(default = "default_account_id")]
    pub account_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Overrides the built-in customer-service system prompt when set.
    #[serde(default)]
    pub system_prompt: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub log_file: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: i64,
}

fn default_account_id() -> i64 {
    1
}

fn default_model() -> String {
    "models/gemini-2.5-flash".to_string()
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_temperature() -> f32 {
    0.7
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_ttl_secs() -> i64 {
    context_cache::DEFAULT_TTL_SECS
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_file: None,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
        }
    }
}

impl BotConfig {
    /// Loads and validates the config from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            BotError::Config(format!("cannot read config file {}: {}", path.display(), e))
        })?;
        let config: BotConfig = toml::from_str(&raw)
            .map_err(|e| BotError::Config(format!("invalid config file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects blank credentials and unparsable URLs early, before anything
    /// binds or connects.
    pub fn validate(&self) -> Result<()> {
        if self.chatwoot.url.trim().is_empty() {
            return Err(BotError::Config("chatwoot.url must be set".to_string()));
        }
        if reqwest::Url::parse(&self.chatwoot.url).is_err() {
            return Err(BotError::Config(format!(
                "chatwoot.url is not a valid URL: {}",
                self.chatwoot.url
            )));
        }
        if self.chatwoot.access_key.trim().is_empty() {
            return Err(BotError::Config(
                "chatwoot.access_key must be set".to_string(),
            ));
        }
        if self.gemini.api_key.trim().is_empty() {
            return Err(BotError::Config("gemini.api_key must be set".to_string()));
        }
        if self.cache.ttl_secs <= 0 {
            return Err(BotError::Config(
                "cache.ttl_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Writes [`SAMPLE_CONFIG`] to `path` unless the file already exists.
    /// Returns true if the file was created.
    pub fn write_sample(path: impl AsRef<Path>) -> Result<bool> {
        let path = path.as_ref();
        if path.exists() {
            return Ok(false);
        }
        std::fs::write(path, SAMPLE_CONFIG)?;
        Ok(true)
    }
}
