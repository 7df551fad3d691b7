use crate::context::{self, Selection, SourceFile};
use crate::error::AppResult;
use crate::render::Output;
use clap::Args;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::warn;

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Directory to traverse
    pub directory: PathBuf,

    /// Show all files, including normally filtered ones
    #[arg(short, long)]
    pub unfiltered: bool,

    /// Output plain text without markdown rendering or colors
    #[arg(short = 'o', long)]
    pub output_plain: bool,
}

fn plain_entry(file: &SourceFile) -> String {
    format!("// File: {}\n\n{}\n", file.path.display(), file.content)
}

fn markdown_entry(file: &SourceFile) -> String {
    format!(
        "## {}\n\n```{}\n{}\n```\n",
        file.path.display(),
        file.language(),
        file.content
    )
}

/// Print every file, separated by `---`
pub fn write_listing<W: Write>(files: &[SourceFile], output: &Output, out: &mut W) -> io::Result<()> {
    for file in files {
        if output.is_raw() {
            write!(out, "{}", plain_entry(file))?;
        } else {
            match output.render(&markdown_entry(file)) {
                Ok(rendered) => write!(out, "{}", rendered)?,
                Err(e) => {
                    warn!(path = %file.path.display(), error = %e, "rendering failed, falling back to plain output");
                    write!(out, "{}", plain_entry(file))?;
                }
            }
        }
        writeln!(out, "---")?;
    }
    Ok(())
}

pub fn run(args: ShowArgs) -> AppResult<()> {
    let root = context::resolve_dir(&args.directory)?;

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "Traversing directory: {}", root.display())?;
    if !args.unfiltered {
        writeln!(
            stdout,
            "Filtering out test, mod, sum, LICENSE, hidden, and markdown files. Use -u to show all."
        )?;
    }
    if args.output_plain {
        writeln!(stdout, "Outputting plain text format.")?;
    }
    writeln!(stdout, "---")?;

    let collected = context::collect(
        &root,
        Selection::Show {
            unfiltered: args.unfiltered,
        },
    );

    let output = if args.output_plain {
        Output::raw()
    } else {
        Output::for_stdout(false)
    };
    write_listing(&collected.files, &output, &mut stdout)?;

    Ok(())
}
