use crate::llm::client::{HttpResponse, ProviderError, ProviderRequest};
use async_trait::async_trait;
use futures_util::stream::{self, BoxStream, StreamExt};
use reqwest::{Client, RequestBuilder};
use std::time::Duration;

/// Generation can take many minutes on large prompts
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20 * 60);

/// A response whose body is still arriving
pub struct ByteStream {
    pub status: u16,
    pub chunks: BoxStream<'static, Result<Vec<u8>, ProviderError>>,
}

impl ByteStream {
    /// A stream that yields an already buffered body in one chunk
    pub fn buffered(response: HttpResponse) -> Self {
        Self {
            status: response.status,
            chunks: stream::iter([Ok(response.body.into_bytes())]).boxed(),
        }
    }

    /// Drain the rest of the body
    pub async fn into_text(mut self) -> Result<String, ProviderError> {
        let mut body = Vec::new();
        while let Some(chunk) = self.chunks.next().await {
            body.extend_from_slice(&chunk?);
        }
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

/// Sends a built request and hands back status and body untouched
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &ProviderRequest) -> Result<HttpResponse, ProviderError>;

    /// Like `send`, but yields the body as it arrives.
    ///
    /// Defaults to buffering the whole body through `send`.
    async fn send_streaming(&self, request: &ProviderRequest) -> Result<ByteStream, ProviderError> {
        self.send(request).await.map(ByteStream::buffered)
    }
}

/// `reqwest`-backed transport with a per-call timeout
pub struct HttpTransport {
    http_client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, ProviderError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::RequestConstruction(e.to_string()))?;

        Ok(Self { http_client })
    }

    fn post(&self, request: &ProviderRequest) -> RequestBuilder {
        let mut builder = self
            .http_client
            .post(&request.endpoint)
            .json(&request.payload);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout
        } else if err.is_builder() {
            ProviderError::RequestConstruction(err.to_string())
        } else {
            ProviderError::Network(err.to_string())
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ProviderRequest) -> Result<HttpResponse, ProviderError> {
        let response = self.post(request).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(HttpResponse { status, body })
    }

    async fn send_streaming(&self, request: &ProviderRequest) -> Result<ByteStream, ProviderError> {
        let response = self.post(request).send().await?;
        let status = response.status().as_u16();
        let chunks = response
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()).map_err(ProviderError::from))
            .boxed();

        Ok(ByteStream { status, chunks })
    }
}
