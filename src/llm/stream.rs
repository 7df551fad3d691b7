use crate::llm::client::{api_error, describe_error_body, prepare, Provider, ProviderError};
use crate::llm::credentials::Credentials;
use crate::llm::transport::{ByteStream, Transport};
use memchr::memchr;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// One decoded Server-Sent Events line of a chat-completions stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Delta(String),
    /// In-stream API error or an undecodable chunk; the stream may go on
    Error(String),
    Done,
}

#[derive(Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    error: Option<Value>,
}

#[derive(Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: Delta,
}

#[derive(Deserialize, Default)]
struct Delta {
    content: Option<String>,
}

/// Decode a single SSE line. Comments, blank lines and empty deltas yield nothing.
pub fn parse_line(line: &str) -> Option<StreamEvent> {
    let payload = line.trim().strip_prefix("data:")?.trim_start();
    if payload.is_empty() {
        return None;
    }
    if payload == "[DONE]" {
        return Some(StreamEvent::Done);
    }

    let chunk: StreamChunk = match serde_json::from_str(payload) {
        Ok(chunk) => chunk,
        Err(e) => {
            return Some(StreamEvent::Error(format!(
                "failed to decode stream chunk: {}: {}",
                e, payload
            )));
        }
    };

    if let Some(error) = chunk.error.as_ref().filter(|e| e.is_object()) {
        return Some(StreamEvent::Error(api_error(error).to_string()));
    }

    chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content)
        .filter(|content| !content.is_empty())
        .map(StreamEvent::Delta)
}

/// Splits arbitrary body chunks into lines and decodes them
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one body chunk; returns the events of every line it completed
    pub fn push(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(newline) = memchr(b'\n', &self.buffer) {
            let line: Vec<u8> = self.buffer.drain(..=newline).collect();
            events.extend(parse_line(&String::from_utf8_lossy(&line)));
        }
        events
    }

    /// Decode whatever trails the last newline once the body has ended
    pub fn finish(&mut self) -> Option<StreamEvent> {
        let rest = std::mem::take(&mut self.buffer);
        parse_line(&String::from_utf8_lossy(&rest))
    }
}

/// Start a streaming call; only a 200 response hands its body back.
///
/// Credential and status handling match `complete`.
pub async fn open_stream(
    provider: &dyn Provider,
    prompt: &str,
    transport: &dyn Transport,
    credentials: &dyn Credentials,
) -> Result<ByteStream, ProviderError> {
    let request = prepare(provider, prompt, credentials)?;
    let response = transport.send_streaming(&request).await?;
    debug!(provider = provider.name(), status = response.status, "stream opened");

    if response.status != 200 {
        let status = response.status;
        let body = response.into_text().await?;
        return Err(ProviderError::Status {
            status,
            detail: describe_error_body(&body),
        });
    }

    Ok(response)
}
