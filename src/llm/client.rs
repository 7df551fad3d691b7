use crate::llm::credentials::Credentials;
use crate::llm::transport::Transport;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while talking to a single provider
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{0} environment variable not set")]
    MissingCredential(String),

    #[error("failed to build request: {0}")]
    RequestConstruction(String),

    #[error("request timed out")]
    Timeout,

    #[error("failed to send request: {0}")]
    Network(String),

    #[error("API request failed with status {status}: {detail}")]
    Status { status: u16, detail: String },

    #[error("failed to parse response body: {0}")]
    ResponseParse(#[from] serde_json::Error),

    #[error("API error ({code}): {message}")]
    Api { code: String, message: String },

    #[error("no content found in response")]
    EmptyContent,

    #[error("provider task failed: {0}")]
    TaskFailed(String),
}

/// A fully built outbound call for one provider
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    pub provider: String,
    pub endpoint: String,
    pub headers: Vec<(String, String)>,
    pub payload: Value,
}

/// Status and raw body of a provider response
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// One chat-completion backend: knows its own envelope, auth and schema.
pub trait Provider: Send + Sync {
    fn name(&self) -> &str;

    /// Environment variable holding this provider's API key
    fn api_key_env(&self) -> &str;

    fn build_request(&self, prompt: &str, api_key: &str) -> Result<ProviderRequest, ProviderError>;

    /// Extract the completion text from a 200 response body
    fn parse_response(&self, body: &str) -> Result<String, ProviderError>;
}

/// Run a single provider call end to end.
///
/// A missing credential short-circuits before anything reaches the transport.
pub async fn complete(
    provider: &dyn Provider,
    prompt: &str,
    transport: &dyn Transport,
    credentials: &dyn Credentials,
) -> Result<String, ProviderError> {
    let request = prepare(provider, prompt, credentials)?;
    let response = transport.send(&request).await?;
    debug!(provider = provider.name(), status = response.status, "response received");

    if response.status != 200 {
        return Err(ProviderError::Status {
            status: response.status,
            detail: describe_error_body(&response.body),
        });
    }

    provider.parse_response(&response.body)
}

/// Resolve the API key and build the outbound request
pub(crate) fn prepare(
    provider: &dyn Provider,
    prompt: &str,
    credentials: &dyn Credentials,
) -> Result<ProviderRequest, ProviderError> {
    let api_key = credentials
        .lookup(provider.api_key_env())
        .ok_or_else(|| ProviderError::MissingCredential(provider.api_key_env().to_string()))?;

    let request = provider.build_request(prompt, &api_key)?;
    debug!(provider = provider.name(), endpoint = %request.endpoint, "dispatching request");
    Ok(request)
}

/// Serialize a typed payload, mapping failures to `RequestConstruction`
pub(crate) fn to_payload<T: serde::Serialize>(payload: &T) -> Result<Value, ProviderError> {
    serde_json::to_value(payload).map_err(|e| ProviderError::RequestConstruction(e.to_string()))
}

/// Render an `{"error": {...}}` object found in a body as `ProviderError::Api`.
///
/// `code` may arrive as a string or a number depending on the provider.
pub(crate) fn api_error(error: &Value) -> ProviderError {
    let message = error
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("unknown error")
        .to_string();
    let code = match error.get("code").or_else(|| error.get("type")) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => "unknown".to_string(),
        Some(other) => other.to_string(),
    };
    ProviderError::Api { code, message }
}

/// Summarize a non-200 body: structured error text if present, raw body otherwise
pub fn describe_error_body(body: &str) -> String {
    let trimmed = body.trim();
    let Ok(value) = serde_json::from_str::<Value>(trimmed) else {
        return trimmed.to_string();
    };

    match value.get("error") {
        Some(Value::Object(error)) => {
            let message = error.get("message").and_then(Value::as_str);
            let kind = error.get("type").and_then(Value::as_str);
            match (kind, message) {
                (Some(kind), Some(message)) => {
                    format!("API Error: Type={}, Message={}", kind, message)
                }
                (None, Some(message)) => format!("API Error: {}", message),
                _ => trimmed.to_string(),
            }
        }
        Some(Value::String(message)) => format!("API Error: {}", message),
        _ => trimmed.to_string(),
    }
}
