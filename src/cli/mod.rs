//! Command-line interface for vibe
//!
//! Provides `gen`, `show` and `code` subcommands.

use crate::config::Config;
use crate::error::AppResult;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod code;
mod generate;
mod show;

pub use code::{run_code, CodeArgs};
pub use generate::GenArgs;
pub use show::{write_listing, ShowArgs};

/// Send source context and prompts to several LLMs at once
#[derive(Parser, Debug)]
#[command(name = "vibe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to ~/.config/vibe/config.toml when present)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate responses from multiple AI models and merge them
    Gen(GenArgs),

    /// Traverse and display files in the target directory
    Show(ShowArgs),

    /// Ask an LLM to work on code using the directory as context
    Code(CodeArgs),
}

fn init_tracing(verbose: bool) {
    // RUST_LOG always applies; --verbose adds DEBUG on top of the WARN default.
    let filter = if verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

pub async fn run() -> AppResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Gen(args) => {
            let config = Config::load(cli.config.as_deref())?;
            generate::run(args, &config).await
        }
        Commands::Show(args) => show::run(args),
        Commands::Code(args) => {
            let config = Config::load(cli.config.as_deref())?;
            code::run(args, &config).await
        }
    }
}
