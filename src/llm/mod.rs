pub mod anthropic;
pub mod chat;
pub mod client;
pub mod credentials;
pub mod openai;
pub mod stream;
pub mod transport;

pub use anthropic::AnthropicProvider;
pub use chat::ChatCompletionsProvider;
pub use client::{complete, HttpResponse, Provider, ProviderError, ProviderRequest};
pub use credentials::{Credentials, EnvCredentials};
pub use openai::OpenAiResponsesProvider;
pub use stream::{open_stream, SseDecoder, StreamEvent};
pub use transport::{ByteStream, HttpTransport, Transport};
