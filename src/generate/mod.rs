//! Multi-provider generation: fan out one prompt, render each answer as it
//! arrives, then ask the merge model to reconcile the successful ones.

pub mod aggregator;
pub mod merge;

pub use aggregator::{fan_out, ProviderResult};
pub use merge::{MergeRequest, Success};

use crate::llm::{complete, Credentials, Provider, ProviderError, Transport};
use crate::render::Output;
use std::io::{self, Write};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Failure of the secondary synthesis call
#[derive(Debug, Error)]
#[error("failed to merge responses: {0}")]
pub struct MergeError(#[from] pub ProviderError);

/// Everything the aggregator needs, resolved up front
pub struct GenOptions {
    pub providers: Vec<Arc<dyn Provider>>,
    pub merge: Arc<dyn Provider>,
    pub output: Output,
}

#[derive(Debug)]
pub enum MergeOutcome {
    /// No provider succeeded, so nothing was sent
    Skipped,
    Merged(String),
    Failed(MergeError),
}

/// What happened during one `gen` run
#[derive(Debug)]
pub struct GenReport {
    pub dispatched: usize,
    pub successes: Vec<Success>,
    pub failures: Vec<(String, ProviderError)>,
    pub merge: MergeOutcome,
}

/// Aggregator lifecycle, logged as it advances
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Collecting,
    AllReceived,
    Merging,
    Done,
}

fn response_block(provider: &str, text: &str) -> String {
    format!("### {} Response\n\n```\n{}\n```", provider, text)
}

fn merged_block(text: &str) -> String {
    format!("## Merged Response\n\n```\n{}\n```", text)
}

/// Run the full fan-out, render and merge pipeline.
///
/// Provider and merge failures are written to `err` and recorded in the
/// report; only write failures on `out`/`err` are returned as errors.
pub async fn run<O: Write, E: Write>(
    options: &GenOptions,
    prompt: Arc<str>,
    transport: Arc<dyn Transport>,
    credentials: Arc<dyn Credentials>,
    out: &mut O,
    err: &mut E,
) -> io::Result<GenReport> {
    let dispatched = options.providers.len();
    debug!(phase = ?Phase::Collecting, providers = dispatched);

    let mut queue = fan_out(
        &options.providers,
        prompt,
        Arc::clone(&transport),
        Arc::clone(&credentials),
    );

    let mut successes = Vec::new();
    let mut failures = Vec::new();

    while let Some(result) = queue.recv().await {
        match result.outcome {
            Ok(text) => {
                let block = response_block(&result.provider, &text);
                writeln!(out, "{}", options.output.display(&block))?;
                successes.push(Success {
                    provider: result.provider,
                    text,
                });
            }
            Err(e) => {
                writeln!(err, "{} error: {}", result.provider, e)?;
                failures.push((result.provider, e));
            }
        }
    }
    debug!(phase = ?Phase::AllReceived, succeeded = successes.len(), failed = failures.len());

    let merge = match MergeRequest::new(successes.clone()) {
        None => {
            writeln!(out, "\nNo successful responses to merge.")?;
            MergeOutcome::Skipped
        }
        Some(request) => {
            debug!(phase = ?Phase::Merging, inputs = request.responses().len());
            writeln!(out, "\n=== Merging Responses ===")?;
            let outcome = complete(
                options.merge.as_ref(),
                &request.prompt(),
                transport.as_ref(),
                credentials.as_ref(),
            )
            .await;

            match outcome {
                Ok(text) => {
                    writeln!(out, "{}", options.output.display(&merged_block(&text)))?;
                    MergeOutcome::Merged(text)
                }
                Err(e) => {
                    let e = MergeError::from(e);
                    writeln!(err, "Error merging responses: {}", e)?;
                    MergeOutcome::Failed(e)
                }
            }
        }
    };

    writeln!(
        err,
        "{} of {} providers responded successfully.",
        successes.len(),
        dispatched
    )?;
    debug!(phase = ?Phase::Done);

    Ok(GenReport {
        dispatched,
        successes,
        failures,
        merge,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_block_format() {
        assert_eq!(
            response_block("Claude", "hi"),
            "### Claude Response\n\n```\nhi\n```"
        );
        assert_eq!(merged_block("both"), "## Merged Response\n\n```\nboth\n```");
    }

    #[test]
    fn test_merge_error_message() {
        let e = MergeError::from(ProviderError::MissingCredential("OPENAI_API_KEY".to_string()));
        assert_eq!(
            e.to_string(),
            "failed to merge responses: OPENAI_API_KEY environment variable not set"
        );
    }
}
