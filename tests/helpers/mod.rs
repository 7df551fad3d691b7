#![allow(dead_code)]

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use vibe::llm::{ByteStream, Credentials, HttpResponse, ProviderRequest};
use vibe::{ProviderError, Transport};

/// Canned reply for one endpoint
pub enum Reply {
    Ok(u16, String),
    /// Body delivered in these chunks when streamed
    Stream(u16, Vec<String>),
    Timeout,
}

/// Transport that never touches the network and records every request
#[derive(Default)]
pub struct StubTransport {
    replies: Mutex<HashMap<String, Reply>>,
    calls: Mutex<Vec<ProviderRequest>>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, endpoint: &str, status: u16, body: &str) -> Self {
        self.replies
            .lock()
            .unwrap()
            .insert(endpoint.to_string(), Reply::Ok(status, body.to_string()));
        self
    }

    pub fn stream(self, endpoint: &str, status: u16, chunks: &[&str]) -> Self {
        let chunks = chunks.iter().map(|chunk| chunk.to_string()).collect();
        self.replies
            .lock()
            .unwrap()
            .insert(endpoint.to_string(), Reply::Stream(status, chunks));
        self
    }

    pub fn timeout(self, endpoint: &str) -> Self {
        self.replies
            .lock()
            .unwrap()
            .insert(endpoint.to_string(), Reply::Timeout);
        self
    }

    pub fn calls(&self) -> Vec<ProviderRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, endpoint: &str) -> usize {
        self.calls()
            .iter()
            .filter(|request| request.endpoint == endpoint)
            .count()
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn send(&self, request: &ProviderRequest) -> Result<HttpResponse, ProviderError> {
        self.calls.lock().unwrap().push(request.clone());

        match self.replies.lock().unwrap().get(&request.endpoint) {
            Some(Reply::Ok(status, body)) => Ok(HttpResponse {
                status: *status,
                body: body.clone(),
            }),
            Some(Reply::Stream(status, chunks)) => Ok(HttpResponse {
                status: *status,
                body: chunks.concat(),
            }),
            Some(Reply::Timeout) => Err(ProviderError::Timeout),
            None => Err(ProviderError::Network(format!(
                "no stub for {}",
                request.endpoint
            ))),
        }
    }

    async fn send_streaming(&self, request: &ProviderRequest) -> Result<ByteStream, ProviderError> {
        let streamed = match self.replies.lock().unwrap().get(&request.endpoint) {
            Some(Reply::Stream(status, chunks)) => Some((*status, chunks.clone())),
            _ => None,
        };

        match streamed {
            Some((status, chunks)) => {
                self.calls.lock().unwrap().push(request.clone());
                Ok(ByteStream {
                    status,
                    chunks: stream::iter(chunks.into_iter().map(|chunk| Ok(chunk.into_bytes())))
                        .boxed(),
                })
            }
            None => self.send(request).await.map(ByteStream::buffered),
        }
    }
}

/// Credentials with every given variable set to a dummy key
pub fn credentials(vars: &[&str]) -> Arc<dyn Credentials> {
    let keys: HashMap<String, String> = vars
        .iter()
        .map(|var| (var.to_string(), format!("key-for-{}", var)))
        .collect();
    Arc::new(keys)
}
