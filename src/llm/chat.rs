use crate::llm::client::{api_error, to_payload, Provider, ProviderError, ProviderRequest};
use serde::{Deserialize, Serialize};

pub const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    error: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Any OpenAI-compatible `/chat/completions` endpoint (OpenRouter, OpenAI chat)
pub struct ChatCompletionsProvider {
    name: String,
    model: String,
    api_key_env: String,
    endpoint: String,
    system_prompt: Option<String>,
    extra_headers: Vec<(String, String)>,
    stream: bool,
}

impl ChatCompletionsProvider {
    pub fn new(
        name: impl Into<String>,
        model: impl Into<String>,
        api_key_env: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            api_key_env: api_key_env.into(),
            endpoint: endpoint.into(),
            system_prompt: None,
            extra_headers: Vec::new(),
            stream: false,
        }
    }

    /// Send `system` as a leading system message
    pub fn with_system_prompt(mut self, system: impl Into<String>) -> Self {
        self.system_prompt = Some(system.into());
        self
    }

    /// Ask for a Server-Sent Events body (`"stream": true`)
    pub fn with_streaming(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.push((name.into(), value.into()));
        self
    }
}

impl Provider for ChatCompletionsProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn api_key_env(&self) -> &str {
        &self.api_key_env
    }

    fn build_request(&self, prompt: &str, api_key: &str) -> Result<ProviderRequest, ProviderError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &self.system_prompt {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: prompt,
        });

        let payload = to_payload(&ChatRequest {
            model: &self.model,
            messages,
            stream: self.stream,
        })?;

        let mut headers = vec![("Authorization".to_string(), format!("Bearer {}", api_key))];
        headers.extend(self.extra_headers.iter().cloned());

        Ok(ProviderRequest {
            provider: self.name.clone(),
            endpoint: self.endpoint.clone(),
            headers,
            payload,
        })
    }

    fn parse_response(&self, body: &str) -> Result<String, ProviderError> {
        let response: ChatResponse = serde_json::from_str(body)?;

        if let Some(error) = response.error.as_ref().filter(|e| e.is_object()) {
            return Err(api_error(error));
        }

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or(ProviderError::EmptyContent)
    }
}
