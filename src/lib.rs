pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod generate;
pub mod llm;
pub mod render;

// Re-export commonly used types for convenience
pub use error::{AppError, AppResult};
pub use generate::{GenOptions, GenReport, MergeOutcome, ProviderResult};
pub use llm::{Provider, ProviderError, Transport};
