use crate::llm::client::{api_error, to_payload, Provider, ProviderError, ProviderRequest};
use serde::{Deserialize, Serialize};

pub const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
pub const ANTHROPIC_VERSION: &str = "2023-06-01";
pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";
pub const DEFAULT_MAX_TOKENS: u32 = 2048;

#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    error: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

/// Anthropic Messages API
pub struct AnthropicProvider {
    name: String,
    model: String,
    api_key_env: String,
    endpoint: String,
    max_tokens: u32,
}

impl AnthropicProvider {
    pub fn new(name: impl Into<String>, api_key_env: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: DEFAULT_MODEL.to_string(),
            api_key_env: api_key_env.into(),
            endpoint: ANTHROPIC_API_URL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

impl Provider for AnthropicProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn api_key_env(&self) -> &str {
        &self.api_key_env
    }

    fn build_request(&self, prompt: &str, api_key: &str) -> Result<ProviderRequest, ProviderError> {
        let payload = to_payload(&AnthropicRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        })?;

        Ok(ProviderRequest {
            provider: self.name.clone(),
            endpoint: self.endpoint.clone(),
            headers: vec![
                ("x-api-key".to_string(), api_key.to_string()),
                ("anthropic-version".to_string(), ANTHROPIC_VERSION.to_string()),
            ],
            payload,
        })
    }

    fn parse_response(&self, body: &str) -> Result<String, ProviderError> {
        let response: AnthropicResponse = serde_json::from_str(body)?;

        if let Some(error) = response.error.as_ref().filter(|e| e.is_object()) {
            return Err(api_error(error));
        }

        match response.content.first() {
            Some(block) if !block.text.is_empty() => Ok(block.text.clone()),
            _ => Err(ProviderError::EmptyContent),
        }
    }
}
