use std::collections::HashMap;

/// Source of provider API keys
pub trait Credentials: Send + Sync {
    /// Look up a key; empty values count as absent
    fn lookup(&self, var: &str) -> Option<String>;
}

/// Reads keys from the process environment
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvCredentials;

impl Credentials for EnvCredentials {
    fn lookup(&self, var: &str) -> Option<String> {
        std::env::var(var).ok().filter(|key| !key.is_empty())
    }
}

impl Credentials for HashMap<String, String> {
    fn lookup(&self, var: &str) -> Option<String> {
        self.get(var).filter(|key| !key.is_empty()).cloned()
    }
}
