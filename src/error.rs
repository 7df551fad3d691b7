use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigError;
use crate::context::ContextError;
use crate::llm::ProviderError;

/// Top-level application error that wraps all module-specific errors
///
/// Only fatal conditions end up here. Per-provider failures inside `gen` are
/// reported inline and never become an `AppError`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to read prompt file {path}: {source}")]
    PromptRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Context(#[from] ContextError),

    #[error("LLM error: {0}")]
    Llm(#[from] ProviderError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for application-level operations
pub type AppResult<T> = std::result::Result<T, AppError>;
