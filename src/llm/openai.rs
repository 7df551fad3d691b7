use crate::llm::client::{api_error, to_payload, Provider, ProviderError, ProviderRequest};
use serde::{Deserialize, Serialize};

pub const OPENAI_RESPONSES_URL: &str = "https://api.openai.com/v1/responses";
pub const DEFAULT_MODEL: &str = "gpt-4.1";

#[derive(Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct ResponsesResponse {
    #[serde(default)]
    output: Vec<OutputItem>,
    error: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct OutputItem {
    #[serde(default)]
    content: Vec<OutputContent>,
}

#[derive(Deserialize)]
struct OutputContent {
    #[serde(default)]
    text: String,
}

/// OpenAI Responses API (`/v1/responses`)
pub struct OpenAiResponsesProvider {
    name: String,
    model: String,
    api_key_env: String,
    endpoint: String,
}

impl OpenAiResponsesProvider {
    pub fn new(name: impl Into<String>, api_key_env: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: DEFAULT_MODEL.to_string(),
            api_key_env: api_key_env.into(),
            endpoint: OPENAI_RESPONSES_URL.to_string(),
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
}

impl Provider for OpenAiResponsesProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn api_key_env(&self) -> &str {
        &self.api_key_env
    }

    fn build_request(&self, prompt: &str, api_key: &str) -> Result<ProviderRequest, ProviderError> {
        let payload = to_payload(&ResponsesRequest {
            model: &self.model,
            input: prompt,
        })?;

        Ok(ProviderRequest {
            provider: self.name.clone(),
            endpoint: self.endpoint.clone(),
            headers: vec![("Authorization".to_string(), format!("Bearer {}", api_key))],
            payload,
        })
    }

    fn parse_response(&self, body: &str) -> Result<String, ProviderError> {
        let response: ResponsesResponse = serde_json::from_str(body)?;

        if let Some(error) = response.error.as_ref().filter(|e| e.is_object()) {
            return Err(api_error(error));
        }

        response
            .output
            .first()
            .and_then(|item| item.content.first())
            .map(|content| content.text.clone())
            .filter(|text| !text.is_empty())
            .ok_or(ProviderError::EmptyContent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> OpenAiResponsesProvider {
        OpenAiResponsesProvider::new("OpenAI", "OPENAI_API_KEY")
    }

    #[test]
    fn test_build_request() {
        let request = provider().build_request("Explain recursion.", "sk-1").unwrap();

        assert_eq!(request.provider, "OpenAI");
        assert_eq!(request.endpoint, OPENAI_RESPONSES_URL);
        assert_eq!(
            request.headers,
            vec![("Authorization".to_string(), "Bearer sk-1".to_string())]
        );
        assert_eq!(request.payload["model"], DEFAULT_MODEL);
        assert_eq!(request.payload["input"], "Explain recursion.");
    }

    #[test]
    fn test_parse_output_text() {
        let body = r#"{"output":[{"type":"message","content":[{"type":"output_text","text":"Hello"}]}],"error":null}"#;
        assert_eq!(provider().parse_response(body).unwrap(), "Hello");
    }

    #[test]
    fn test_parse_no_output() {
        let err = provider().parse_response(r#"{"output":[]}"#).unwrap_err();
        assert!(matches!(err, ProviderError::EmptyContent));

        let err = provider().parse_response(r#"{"output":[{"content":[]}]}"#).unwrap_err();
        assert!(matches!(err, ProviderError::EmptyContent));
    }

    #[test]
    fn test_parse_error_in_body() {
        let body = r#"{"output":[],"error":{"message":"model not found","type":"invalid_request_error","code":"model_not_found"}}"#;
        let err = provider().parse_response(body).unwrap_err();
        assert_eq!(err.to_string(), "API error (model_not_found): model not found");
    }
}
