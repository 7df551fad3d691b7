use crate::llm::{complete, Credentials, Provider, ProviderError, Transport};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Terminal outcome of one provider call
#[derive(Debug)]
pub struct ProviderResult {
    pub provider: String,
    pub outcome: Result<String, ProviderError>,
}

impl ProviderResult {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Dispatch one task per provider and return the completion queue.
///
/// The queue yields exactly one result per provider, in arrival order, and
/// closes once every worker has finished. A worker that dies before reporting
/// is reported by the coordinator as `TaskFailed`.
///
/// Must be called from within a tokio runtime.
pub fn fan_out(
    providers: &[Arc<dyn Provider>],
    prompt: Arc<str>,
    transport: Arc<dyn Transport>,
    credentials: Arc<dyn Credentials>,
) -> mpsc::Receiver<ProviderResult> {
    let (tx, rx) = mpsc::channel(providers.len().max(1));
    let mut workers = Vec::with_capacity(providers.len());

    for provider in providers {
        let provider = Arc::clone(provider);
        let prompt = Arc::clone(&prompt);
        let transport = Arc::clone(&transport);
        let credentials = Arc::clone(&credentials);
        let tx = tx.clone();
        let name = provider.name().to_string();

        let handle = tokio::spawn(async move {
            let outcome = complete(
                provider.as_ref(),
                &prompt,
                transport.as_ref(),
                credentials.as_ref(),
            )
            .await;

            let result = ProviderResult {
                provider: provider.name().to_string(),
                outcome,
            };
            if tx.send(result).await.is_err() {
                debug!(provider = provider.name(), "completion queue closed before send");
            }
        });

        workers.push((name, handle));
    }

    debug!(workers = workers.len(), "fan-out dispatched");

    tokio::spawn(async move {
        for (name, handle) in workers {
            if let Err(e) = handle.await {
                warn!(provider = %name, error = %e, "provider task ended without a result");
                let result = ProviderResult {
                    provider: name,
                    outcome: Err(ProviderError::TaskFailed(e.to_string())),
                };
                let _ = tx.send(result).await;
            }
        }
        // the last sender drops here and the queue closes
    });

    rx
}
