use crate::config::Config;
use crate::context::{self, Selection, SourceFile};
use crate::error::AppResult;
use crate::llm::{
    complete, open_stream, ByteStream, ChatCompletionsProvider, Credentials, EnvCredentials,
    HttpTransport, ProviderError, SseDecoder, StreamEvent, Transport,
};
use crate::render::Output;
use clap::Args;
use futures_util::StreamExt;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

const PROJECT_URL: &str = "https://github.com/daviddl9/vibe";
const CLIENT_TITLE: &str = concat!("vibe-code/", env!("CARGO_PKG_VERSION"));

#[derive(Args, Debug)]
pub struct CodeArgs {
    /// What you want done, e.g. "add a multiply helper to lib/a.go"
    pub prompt: String,

    /// Directory to gather context from
    #[arg(default_value = ".")]
    pub target_dir: PathBuf,

    /// LLM model to use via OpenRouter (defaults to the configured code model)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Print raw markdown output without formatting (streamed output is always raw)
    #[arg(short, long)]
    pub raw: bool,

    /// Wait for the full response instead of streaming it
    #[arg(long)]
    pub no_stream: bool,
}

/// Concatenate files into the context block embedded in the system message
pub fn file_context(files: &[SourceFile]) -> String {
    let mut context = String::new();
    for file in files {
        context.push_str(&format!("// File: {}\n", file.path.display()));
        context.push_str(&file.content);
        context.push_str("\n\n---\n\n");
    }
    context
}

pub fn system_prompt(context: &str) -> String {
    format!(
        "You are an expert programming assistant integrated into a CLI tool called 'vibe'.
The user is working in the project context provided below (code files from their directory).
Analyze the user's request and the provided file context carefully.
Generate the necessary code modifications, additions, or provide explanations as requested.
Format your response clearly using Markdown. Use language-specific code blocks (e.g., ```go ... ```, ```python ... ```).
If modifying existing code, clearly indicate the file and the changes. If adding new code, suggest where it should go.
Focus on fulfilling the user's request accurately based *only* on the provided context and general programming best practices for the relevant language(s).
Do not add extraneous conversation or introductory/concluding remarks outside of the requested code/explanation.

--- FILE CONTEXT START ---
{}
--- FILE CONTEXT END ---",
        context
    )
}

pub fn user_prompt(request: &str) -> String {
    format!(
        "Based on the file context provided in the system message, fulfill the following request:\n\n\"{}\"",
        request
    )
}

pub async fn run(args: CodeArgs, config: &Config) -> AppResult<()> {
    let transport = HttpTransport::new(Duration::from_secs(config.code.timeout_seconds))?;
    let output = Output::for_stdout(args.raw);

    run_code(
        &args,
        config,
        &output,
        &transport,
        &EnvCredentials,
        &mut io::stdout(),
        &mut io::stderr(),
    )
    .await
}

/// Gather context, send one request and print the answer to `out`.
///
/// Progress and warnings go to `err`. The response header is only printed
/// once the provider has accepted the request.
pub async fn run_code<O: Write, E: Write>(
    args: &CodeArgs,
    config: &Config,
    output: &Output,
    transport: &dyn Transport,
    credentials: &dyn Credentials,
    out: &mut O,
    err: &mut E,
) -> AppResult<()> {
    let root = context::resolve_dir(&args.target_dir)?;

    writeln!(err, "Gathering context from: {}", root.display())?;
    let collected = context::collect(&root, Selection::Code);
    if collected.files.is_empty() {
        writeln!(err, "Warning: No relevant files found for context in the target directory.")?;
    } else {
        writeln!(
            err,
            "Collected context from {} file(s). (Skipped {} directories)",
            collected.files.len(),
            collected.skipped_dirs
        )?;
    }

    let streaming = !args.no_stream;
    let model = args.model.as_deref().unwrap_or(&config.code.model);
    let provider = ChatCompletionsProvider::new(
        "OpenRouter",
        model,
        &config.code.api_key_env,
        &config.code.endpoint,
    )
    .with_system_prompt(system_prompt(&file_context(&collected.files)))
    .with_header("HTTP-Referer", PROJECT_URL)
    .with_header("X-Title", CLIENT_TITLE)
    .with_streaming(streaming);

    info!(model, streaming, "sending code request");
    writeln!(
        err,
        "Sending request to OpenRouter model: {} (Streaming: {})...",
        model, streaming
    )?;

    let prompt = user_prompt(&args.prompt);
    if streaming {
        let response = open_stream(&provider, &prompt, transport, credentials).await?;
        writeln!(out, "\n--- LLM Response ---")?;
        print_stream(response, out, err).await?;
    } else {
        match complete(&provider, &prompt, transport, credentials).await {
            Ok(content) => {
                writeln!(out, "\n--- LLM Response ---")?;
                writeln!(out, "{}", output.display(&content))?;
            }
            Err(ProviderError::EmptyContent) => {
                writeln!(out, "\n--- LLM Response ---")?;
                warn!("received an empty response from the LLM");
                writeln!(err, "Warning: Received an empty response from the LLM.")?;
            }
            Err(e) => return Err(e.into()),
        }
    }
    writeln!(out, "--------------------")?;

    Ok(())
}

#[derive(Default)]
struct StreamProgress {
    received: bool,
    errors: usize,
}

impl StreamProgress {
    /// Returns true once the stream has signalled its end
    fn handle<O: Write, E: Write>(
        &mut self,
        event: StreamEvent,
        out: &mut O,
        err: &mut E,
    ) -> io::Result<bool> {
        match event {
            StreamEvent::Delta(text) => {
                write!(out, "{}", text)?;
                out.flush()?;
                self.received = true;
                Ok(false)
            }
            StreamEvent::Error(message) => {
                warn!(%message, "error inside response stream");
                writeln!(err, "\nAPI Error during stream: {}", message)?;
                self.errors += 1;
                Ok(false)
            }
            StreamEvent::Done => Ok(true),
        }
    }
}

/// Print deltas as they arrive until `[DONE]` or the body ends
async fn print_stream<O: Write, E: Write>(
    mut response: ByteStream,
    out: &mut O,
    err: &mut E,
) -> io::Result<()> {
    let mut decoder = SseDecoder::new();
    let mut progress = StreamProgress::default();
    let mut done = false;

    while !done {
        match response.chunks.next().await {
            Some(Ok(bytes)) => {
                for event in decoder.push(&bytes) {
                    if progress.handle(event, out, err)? {
                        done = true;
                        break;
                    }
                }
            }
            Some(Err(e)) => {
                warn!(error = %e, "error reading response stream");
                writeln!(err, "\nError reading stream: {}", e)?;
                progress.errors += 1;
                break;
            }
            None => break,
        }
    }
    if !done {
        if let Some(event) = decoder.finish() {
            progress.handle(event, out, err)?;
        }
    }
    writeln!(out)?;

    if progress.errors > 0 {
        writeln!(err, "Note: Errors occurred during streaming. Output may be incomplete.")?;
    } else if !progress.received {
        warn!("received an empty response stream from the LLM");
        writeln!(err, "Warning: Received an empty response from the LLM.")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Provider;

    #[tokio::test]
    async fn test_stream_read_failure_stops_with_note() {
        use futures_util::stream;

        let response = ByteStream {
            status: 200,
            chunks: stream::iter([
                Ok(b"data: {\"choices\":[{\"delta\":{\"content\":\"par\"}}]}\n".to_vec()),
                Err(ProviderError::Network("connection reset".to_string())),
                Ok(b"data: {\"choices\":[{\"delta\":{\"content\":\"tial\"}}]}\n".to_vec()),
            ])
            .boxed(),
        };

        let mut out = Vec::new();
        let mut err = Vec::new();
        print_stream(response, &mut out, &mut err).await.unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "par\n");
        let err = String::from_utf8(err).unwrap();
        assert!(err.contains("Error reading stream: failed to send request: connection reset"));
        assert!(err.contains("Output may be incomplete."));
    }

    #[test]
    fn test_file_context_layout() {
        let files = vec![
            SourceFile {
                path: PathBuf::from("/p/a.go"),
                content: "package a".to_string(),
            },
            SourceFile {
                path: PathBuf::from("/p/b.rs"),
                content: "fn b() {}".to_string(),
            },
        ];

        assert_eq!(
            file_context(&files),
            "// File: /p/a.go\npackage a\n\n---\n\n// File: /p/b.rs\nfn b() {}\n\n---\n\n"
        );
    }

    #[test]
    fn test_system_prompt_wraps_context() {
        let prompt = system_prompt("// File: x\n");
        assert!(prompt.contains("--- FILE CONTEXT START ---\n// File: x\n\n--- FILE CONTEXT END ---"));
    }

    #[test]
    fn test_user_prompt_quotes_request() {
        assert!(user_prompt("refactor main.go").ends_with("\n\n\"refactor main.go\""));
    }

    #[test]
    fn test_request_shape() {
        let provider = ChatCompletionsProvider::new("OpenRouter", "m", "OPENROUTER_API_KEY", "https://x")
            .with_system_prompt(system_prompt(""))
            .with_header("HTTP-Referer", PROJECT_URL)
            .with_header("X-Title", CLIENT_TITLE);
        let request = provider.build_request(&user_prompt("hi"), "k").unwrap();

        let messages = request.payload["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "system");
        assert!(request.headers.iter().any(|(n, v)| n == "X-Title" && v.starts_with("vibe-code/")));
    }
}
