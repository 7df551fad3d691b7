use crate::llm::anthropic::{self, AnthropicProvider};
use crate::llm::chat::{ChatCompletionsProvider, OPENAI_CHAT_URL, OPENROUTER_API_URL};
use crate::llm::openai::{self, OpenAiResponsesProvider};
use crate::llm::Provider;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid config value: {0}")]
    InvalidValue(String),
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub http: HttpConfig,
    pub providers: Vec<ProviderSpec>,
    pub merge: ProviderSpec,
    pub code: CodeConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_seconds: u64,
}

/// Which request/response envelope a provider speaks
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderKind {
    OpenaiResponses,
    ChatCompletions,
    AnthropicMessages,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ProviderSpec {
    pub kind: ProviderKind,
    pub name: String,
    pub model: String,
    pub api_key_env: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct CodeConfig {
    pub model: String,
    pub api_key_env: String,
    pub endpoint: String,
    pub timeout_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            http: HttpConfig::default(),
            providers: vec![
                ProviderSpec {
                    kind: ProviderKind::OpenaiResponses,
                    name: "OpenAI".to_string(),
                    model: openai::DEFAULT_MODEL.to_string(),
                    api_key_env: "OPENAI_API_KEY".to_string(),
                    endpoint: None,
                    max_tokens: None,
                },
                ProviderSpec {
                    kind: ProviderKind::ChatCompletions,
                    name: "Gemini (OpenRouter)".to_string(),
                    model: "google/gemini-2.5-pro-preview-03-25".to_string(),
                    api_key_env: "OPENROUTER_API_KEY".to_string(),
                    endpoint: Some(OPENROUTER_API_URL.to_string()),
                    max_tokens: None,
                },
                ProviderSpec {
                    kind: ProviderKind::AnthropicMessages,
                    name: "Claude".to_string(),
                    model: anthropic::DEFAULT_MODEL.to_string(),
                    api_key_env: "ANTHROPIC_API_KEY".to_string(),
                    endpoint: None,
                    max_tokens: Some(anthropic::DEFAULT_MAX_TOKENS),
                },
            ],
            merge: ProviderSpec {
                kind: ProviderKind::ChatCompletions,
                name: "Merge".to_string(),
                model: "chatgpt-4o-latest".to_string(),
                api_key_env: "OPENAI_API_KEY".to_string(),
                endpoint: Some(OPENAI_CHAT_URL.to_string()),
                max_tokens: None,
            },
            code: CodeConfig::default(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        HttpConfig {
            timeout_seconds: crate::llm::transport::DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl Default for CodeConfig {
    fn default() -> Self {
        CodeConfig {
            model: "anthropic/claude-3.5-sonnet".to_string(),
            api_key_env: "OPENROUTER_API_KEY".to_string(),
            endpoint: OPENROUTER_API_URL.to_string(),
            timeout_seconds: 180,
        }
    }
}

impl ProviderSpec {
    /// Instantiate the adapter described by this entry
    pub fn build(&self) -> Arc<dyn Provider> {
        match self.kind {
            ProviderKind::OpenaiResponses => {
                let mut provider = OpenAiResponsesProvider::new(&self.name, &self.api_key_env)
                    .with_model(&self.model);
                if let Some(endpoint) = &self.endpoint {
                    provider = provider.with_endpoint(endpoint);
                }
                Arc::new(provider)
            }
            ProviderKind::ChatCompletions => {
                let endpoint = self.endpoint.as_deref().unwrap_or(OPENROUTER_API_URL);
                Arc::new(ChatCompletionsProvider::new(
                    &self.name,
                    &self.model,
                    &self.api_key_env,
                    endpoint,
                ))
            }
            ProviderKind::AnthropicMessages => {
                let mut provider = AnthropicProvider::new(&self.name, &self.api_key_env)
                    .with_model(&self.model)
                    .with_max_tokens(self.max_tokens.unwrap_or(anthropic::DEFAULT_MAX_TOKENS));
                if let Some(endpoint) = &self.endpoint {
                    provider = provider.with_endpoint(endpoint);
                }
                Arc::new(provider)
            }
        }
    }

    fn validate(&self, section: &str) -> Result<(), ConfigError> {
        for (field, value) in [
            ("name", &self.name),
            ("model", &self.model),
            ("api_key_env", &self.api_key_env),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue(format!(
                    "{}.{} must not be empty",
                    section, field
                )));
            }
        }

        if self.max_tokens == Some(0) {
            return Err(ConfigError::InvalidValue(format!(
                "{}.max_tokens must be greater than 0",
                section
            )));
        }

        Ok(())
    }
}

impl Config {
    /// Default config file: ~/.config/vibe/config.toml
    pub fn default_path() -> Option<PathBuf> {
        let home = std::env::var("HOME").ok().filter(|h| !h.is_empty())?;
        Some(PathBuf::from(home).join(".config").join("vibe").join("config.toml"))
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, the default path is tried and
    /// built-in defaults are used when it is absent.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Config::default(),
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&contents)?)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.providers.is_empty() {
            return Err(ConfigError::InvalidValue(
                "at least one provider must be configured".to_string(),
            ));
        }

        let mut names = HashSet::new();
        for spec in &self.providers {
            spec.validate("providers")?;
            if !names.insert(spec.name.as_str()) {
                return Err(ConfigError::InvalidValue(format!(
                    "duplicate provider name: {}",
                    spec.name
                )));
            }
        }

        self.merge.validate("merge")?;

        if self.http.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue(
                "http.timeout_seconds must be greater than 0".to_string(),
            ));
        }

        if self.code.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue(
                "code.timeout_seconds must be greater than 0".to_string(),
            ));
        }

        if self.code.model.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "code.model must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_seconds)
    }

    pub fn build_providers(&self) -> Vec<Arc<dyn Provider>> {
        self.providers.iter().map(ProviderSpec::build).collect()
    }
}
