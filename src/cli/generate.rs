use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::generate::{self, GenOptions};
use crate::llm::{Credentials, EnvCredentials, HttpTransport, Transport};
use crate::render::Output;
use clap::Args;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

#[derive(Args, Debug)]
pub struct GenArgs {
    /// File whose contents are sent as the prompt
    pub prompt_file: PathBuf,

    /// Print raw markdown output without formatting
    #[arg(short, long)]
    pub raw: bool,
}

/// Read the prompt once; this is the only fatal step of `gen`
pub fn read_prompt(path: &Path) -> AppResult<Arc<str>> {
    let bytes = fs::read(path).map_err(|source| AppError::PromptRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Arc::from(String::from_utf8_lossy(&bytes).as_ref()))
}

pub async fn run(args: GenArgs, config: &Config) -> AppResult<()> {
    let prompt = read_prompt(&args.prompt_file)?;
    debug!(path = %args.prompt_file.display(), bytes = prompt.len(), "prompt loaded");

    let options = GenOptions {
        providers: config.build_providers(),
        merge: config.merge.build(),
        output: Output::for_stdout(args.raw),
    };
    let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(config.timeout())?);
    let credentials: Arc<dyn Credentials> = Arc::new(EnvCredentials);

    // Unlocked handles: workers may log to stderr while results are drained.
    let report = generate::run(
        &options,
        prompt,
        transport,
        credentials,
        &mut io::stdout(),
        &mut io::stderr(),
    )
    .await?;

    debug!(
        succeeded = report.successes.len(),
        failed = report.failures.len(),
        "gen finished"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_prompt() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prompt.txt");
        fs::write(&path, "Explain recursion.").unwrap();

        assert_eq!(&*read_prompt(&path).unwrap(), "Explain recursion.");
    }

    #[test]
    fn test_read_prompt_missing_is_fatal() {
        let dir = TempDir::new().unwrap();
        let err = read_prompt(&dir.path().join("missing.txt")).unwrap_err();
        assert!(matches!(err, AppError::PromptRead { .. }));
        assert!(err.to_string().contains("failed to read prompt file"));
    }

    #[test]
    fn test_read_prompt_tolerates_invalid_utf8() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prompt.bin");
        fs::write(&path, [b'o', b'k', 0xff]).unwrap();

        assert!(read_prompt(&path).unwrap().starts_with("ok"));
    }
}
