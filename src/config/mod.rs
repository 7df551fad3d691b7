pub mod settings;

pub use settings::{CodeConfig, Config, ConfigError, HttpConfig, ProviderKind, ProviderSpec};
