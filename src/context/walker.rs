use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Files above this size are never read into context
pub const MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;

const SKIP_DIRS: &[&str] = &[
    ".git",
    "node_modules",
    "vendor",
    "__pycache__",
    "venv",
    ".venv",
    "target",
    "build",
    "dist",
];

const CODE_EXTENSIONS: &[&str] = &[
    "go", "html", "py", "js", "ts", "jsx", "tsx", "rs", "java", "kt", "c", "h", "cpp", "cs", "rb",
    "php", "md", "yaml", "yml", "toml", "json", "sh", "sql",
];

const CODE_FILE_NAMES: &[&str] = &["dockerfile", ".dockerignore", ".env", ".env.example"];

#[derive(Debug, Error)]
pub enum ContextError {
    #[error("directory not found: {0}")]
    NotFound(PathBuf),

    #[error("path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("failed to stat {path}: {source}")]
    Stat {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Which files a command wants from the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Browsing: drops tests, module files, licenses, Markdown and dotfiles
    /// unless `unfiltered`
    Show { unfiltered: bool },
    /// Prompt context: source/config extensions plus a few known dotfiles
    Code,
}

impl Selection {
    pub fn includes(&self, file_name: &str) -> bool {
        match self {
            Selection::Show { unfiltered: true } => true,
            Selection::Show { unfiltered: false } => {
                let lower = file_name.to_lowercase();
                !(file_name.ends_with("_test.go")
                    || file_name == "go.mod"
                    || file_name == "go.sum"
                    || file_name == "LICENSE"
                    || lower.ends_with(".md")
                    || file_name.starts_with('.'))
            }
            Selection::Code => {
                let lower = file_name.to_lowercase();
                if CODE_FILE_NAMES.contains(&lower.as_str()) {
                    return true;
                }
                if file_name.starts_with('.') {
                    return false;
                }
                Path::new(&lower)
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| CODE_EXTENSIONS.contains(&ext))
            }
        }
    }

    fn checks_size(&self) -> bool {
        matches!(self, Selection::Code)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub content: String,
}

impl SourceFile {
    /// Fence language derived from the extension, `text` when there is none
    pub fn language(&self) -> String {
        self.path
            .extension()
            .and_then(|ext| ext.to_str())
            .filter(|ext| !ext.is_empty())
            .map(str::to_lowercase)
            .unwrap_or_else(|| "text".to_string())
    }
}

#[derive(Debug, Default)]
pub struct Collected {
    pub files: Vec<SourceFile>,
    pub skipped_dirs: usize,
}

/// Absolute, existing directory for `path`
pub fn resolve_dir(path: &Path) -> Result<PathBuf, ContextError> {
    let absolute = std::path::absolute(path).map_err(|source| ContextError::Stat {
        path: path.to_path_buf(),
        source,
    })?;

    match fs::metadata(&absolute) {
        Ok(meta) if meta.is_dir() => Ok(absolute),
        Ok(_) => Err(ContextError::NotADirectory(absolute)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(ContextError::NotFound(absolute)),
        Err(source) => Err(ContextError::Stat {
            path: absolute,
            source,
        }),
    }
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || SKIP_DIRS.contains(&&*name)
}

/// Walk `root` and read every selected file.
///
/// Unreadable entries, non-UTF-8 files and oversized files are skipped with a
/// warning; the walk itself never fails past `root`.
pub fn collect(root: &Path, selection: Selection) -> Collected {
    let mut collected = Collected::default();

    let mut walker = WalkDir::new(root).sort_by_file_name().into_iter();
    while let Some(entry) = walker.next() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "error accessing path");
                continue;
            }
        };

        if is_skipped_dir(&entry) {
            collected.skipped_dirs += 1;
            walker.skip_current_dir();
            continue;
        }

        if !entry.file_type().is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if !selection.includes(&name) {
            continue;
        }

        if selection.checks_size() {
            match entry.metadata() {
                Ok(meta) if meta.len() > MAX_FILE_SIZE => {
                    warn!(path = %entry.path().display(), "skipping large file (>5MB)");
                    continue;
                }
                _ => {}
            }
        }

        // invalid UTF-8 is replaced rather than dropping the file
        match fs::read(entry.path()) {
            Ok(bytes) => collected.files.push(SourceFile {
                path: entry.path().to_path_buf(),
                content: String::from_utf8_lossy(&bytes).into_owned(),
            }),
            Err(e) => warn!(path = %entry.path().display(), error = %e, "error reading file"),
        }
    }

    debug!(
        files = collected.files.len(),
        skipped_dirs = collected.skipped_dirs,
        "context collected"
    );
    collected
}
