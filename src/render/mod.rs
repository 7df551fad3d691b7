pub mod markdown;

pub use markdown::{MarkdownRenderer, Theme};

use std::io::{self, IsTerminal};
use tracing::warn;

/// Shared display path for every block the commands print
pub struct Output {
    renderer: Option<MarkdownRenderer>,
}

impl Output {
    /// Raw Markdown, untouched
    pub fn raw() -> Self {
        Self { renderer: None }
    }

    pub fn styled(theme: Theme) -> Self {
        Self {
            renderer: Some(MarkdownRenderer::new(theme)),
        }
    }

    /// Styled on a terminal, layout-only when stdout is redirected
    pub fn for_stdout(raw: bool) -> Self {
        if raw {
            Self::raw()
        } else if std::io::stdout().is_terminal() {
            Self::styled(Theme::Dark)
        } else {
            Self::styled(Theme::Plain)
        }
    }

    pub fn is_raw(&self) -> bool {
        self.renderer.is_none()
    }

    /// Render `markdown`; raw mode returns it unchanged
    pub fn render(&self, markdown: &str) -> io::Result<String> {
        match &self.renderer {
            Some(renderer) => renderer.render(markdown),
            None => Ok(markdown.to_string()),
        }
    }

    /// Render `markdown`, falling back to the raw text if rendering fails
    pub fn display(&self, markdown: &str) -> String {
        match self.render(markdown) {
            Ok(rendered) => rendered,
            Err(e) => {
                warn!(error = %e, "markdown rendering failed, printing raw text");
                markdown.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_passthrough() {
        let md = "### OpenAI Response\n\n```\nhi\n```";
        assert_eq!(Output::raw().display(md), md);
        assert!(Output::raw().is_raw());
    }

    #[test]
    fn test_styled_renders() {
        let out = Output::styled(Theme::Plain).display("**hi**");
        assert_eq!(out.trim_end(), "hi");
    }

    #[test]
    fn test_for_stdout_raw_flag_wins() {
        assert!(Output::for_stdout(true).is_raw());
        assert!(!Output::for_stdout(false).is_raw());
    }
}
