use crossterm::queue;
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use std::io::{self, Write};

/// Color scheme for styled output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Dark,
    /// Layout only, no escape sequences
    Plain,
}

const CODE_COLOR: Color = Color::Green;
const LINK_COLOR: Color = Color::Blue;
const MUTED_COLOR: Color = Color::Grey;

fn heading_color(level: HeadingLevel) -> Color {
    match level {
        HeadingLevel::H1 | HeadingLevel::H2 => Color::Cyan,
        _ => Color::Magenta,
    }
}

/// Renders Markdown into ANSI-styled terminal text
pub struct MarkdownRenderer {
    theme: Theme,
}

struct RenderState<W: Write> {
    out: W,
    theme: Theme,
    list_stack: Vec<Option<u64>>,
    quote_depth: usize,
    in_code_block: bool,
    link_target: Option<String>,
    at_line_start: bool,
}

impl MarkdownRenderer {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }

    pub fn render(&self, markdown: &str) -> io::Result<String> {
        let mut buffer = Vec::with_capacity(markdown.len() + markdown.len() / 4);
        self.render_to(markdown, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    pub fn render_to<W: Write>(&self, markdown: &str, out: W) -> io::Result<()> {
        let mut state = RenderState {
            out,
            theme: self.theme,
            list_stack: Vec::new(),
            quote_depth: 0,
            in_code_block: false,
            link_target: None,
            at_line_start: true,
        };

        let options = Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES;
        for event in Parser::new_ext(markdown, options) {
            state.handle(event)?;
        }

        state.out.flush()
    }
}

impl<W: Write> RenderState<W> {
    fn styled(&self) -> bool {
        self.theme != Theme::Plain
    }

    fn color(&mut self, color: Color) -> io::Result<()> {
        if self.styled() {
            queue!(self.out, SetForegroundColor(color))?;
        }
        Ok(())
    }

    fn attr(&mut self, attr: Attribute) -> io::Result<()> {
        if self.styled() {
            queue!(self.out, SetAttribute(attr))?;
        }
        Ok(())
    }

    fn reset(&mut self) -> io::Result<()> {
        if self.styled() {
            queue!(self.out, SetAttribute(Attribute::Reset), ResetColor)?;
        }
        Ok(())
    }

    fn newline(&mut self) -> io::Result<()> {
        queue!(self.out, Print("\n"))?;
        self.at_line_start = true;
        Ok(())
    }

    /// Block separation: end the current line, then one blank line
    fn blank_line(&mut self) -> io::Result<()> {
        if !self.at_line_start {
            self.newline()?;
        }
        self.newline()
    }

    fn prefix(&mut self) -> io::Result<()> {
        if self.at_line_start && self.quote_depth > 0 {
            let bar = "│ ".repeat(self.quote_depth);
            self.color(MUTED_COLOR)?;
            queue!(self.out, Print(bar))?;
            self.reset()?;
        }
        Ok(())
    }

    fn text(&mut self, text: &str) -> io::Result<()> {
        self.prefix()?;
        queue!(self.out, Print(text))?;
        self.at_line_start = text.ends_with('\n');
        Ok(())
    }

    fn code_block_text(&mut self, text: &str) -> io::Result<()> {
        for line in text.split_inclusive('\n') {
            self.prefix()?;
            queue!(self.out, Print("    "))?;
            self.color(CODE_COLOR)?;
            queue!(self.out, Print(line.trim_end_matches('\n')))?;
            self.reset()?;
            if line.ends_with('\n') {
                self.newline()?;
            } else {
                self.at_line_start = false;
            }
        }
        Ok(())
    }

    fn handle(&mut self, event: Event<'_>) -> io::Result<()> {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => {
                if self.in_code_block {
                    self.code_block_text(&text)
                } else {
                    self.text(&text)
                }
            }
            Event::Code(code) => {
                self.prefix()?;
                self.color(CODE_COLOR)?;
                if self.styled() {
                    queue!(self.out, Print(&*code))?;
                } else {
                    queue!(self.out, Print(format!("`{}`", code)))?;
                }
                self.reset()?;
                self.at_line_start = false;
                Ok(())
            }
            Event::SoftBreak => self.text(" "),
            Event::HardBreak => self.newline(),
            Event::Rule => {
                if !self.at_line_start {
                    self.newline()?;
                }
                self.color(MUTED_COLOR)?;
                queue!(self.out, Print("─".repeat(40)))?;
                self.reset()?;
                self.blank_line()
            }
            Event::Html(html) | Event::InlineHtml(html) => self.text(&html),
            Event::TaskListMarker(done) => self.text(if done { "[x] " } else { "[ ] " }),
            _ => Ok(()),
        }
    }

    fn start(&mut self, tag: Tag<'_>) -> io::Result<()> {
        match tag {
            Tag::Heading { level, .. } => {
                self.color(heading_color(level))?;
                self.attr(Attribute::Bold)?;
                if level == HeadingLevel::H1 {
                    self.attr(Attribute::Underlined)?;
                }
                if !self.styled() {
                    let hashes = match level {
                        HeadingLevel::H1 => "# ",
                        HeadingLevel::H2 => "## ",
                        HeadingLevel::H3 => "### ",
                        HeadingLevel::H4 => "#### ",
                        HeadingLevel::H5 => "##### ",
                        HeadingLevel::H6 => "###### ",
                    };
                    self.text(hashes)?;
                }
                Ok(())
            }
            Tag::CodeBlock(_) => {
                if !self.at_line_start {
                    self.newline()?;
                }
                self.in_code_block = true;
                Ok(())
            }
            Tag::List(start) => {
                if !self.list_stack.is_empty() && !self.at_line_start {
                    self.newline()?;
                }
                self.list_stack.push(start);
                Ok(())
            }
            Tag::Item => {
                if !self.at_line_start {
                    self.newline()?;
                }
                let depth = self.list_stack.len().saturating_sub(1);
                let marker = match self.list_stack.last_mut() {
                    Some(Some(number)) => {
                        let marker = format!("{}. ", number);
                        *number += 1;
                        marker
                    }
                    _ => "• ".to_string(),
                };
                self.text(&format!("{}{}", "  ".repeat(depth), marker))
            }
            Tag::BlockQuote(_) => {
                if !self.at_line_start {
                    self.newline()?;
                }
                self.quote_depth += 1;
                Ok(())
            }
            Tag::Emphasis => self.attr(Attribute::Italic),
            Tag::Strong => self.attr(Attribute::Bold),
            Tag::Strikethrough => self.attr(Attribute::CrossedOut),
            Tag::Link { dest_url, .. } => {
                self.link_target = Some(dest_url.to_string());
                self.color(LINK_COLOR)?;
                self.attr(Attribute::Underlined)
            }
            _ => Ok(()),
        }
    }

    fn end(&mut self, tag: TagEnd) -> io::Result<()> {
        match tag {
            TagEnd::Heading(_) => {
                self.reset()?;
                self.blank_line()
            }
            TagEnd::Paragraph => {
                if self.list_stack.is_empty() {
                    self.blank_line()
                } else {
                    Ok(())
                }
            }
            TagEnd::CodeBlock => {
                self.in_code_block = false;
                self.blank_line()
            }
            TagEnd::List(_) => {
                self.list_stack.pop();
                if self.list_stack.is_empty() {
                    self.blank_line()
                } else {
                    Ok(())
                }
            }
            TagEnd::BlockQuote(_) => {
                self.quote_depth = self.quote_depth.saturating_sub(1);
                Ok(())
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => self.reset(),
            TagEnd::Link => {
                self.reset()?;
                if let Some(target) = self.link_target.take() {
                    self.color(MUTED_COLOR)?;
                    self.text(&format!(" ({})", target))?;
                    self.reset()?;
                }
                Ok(())
            }
            TagEnd::TableCell => self.text("  "),
            TagEnd::TableRow | TagEnd::TableHead => self.newline(),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(markdown: &str) -> String {
        MarkdownRenderer::new(Theme::Plain).render(markdown).unwrap()
    }

    #[test]
    fn test_plain_has_no_escape_codes() {
        let out = plain("# Title\n\nSome **bold** and `code`.\n");
        assert!(!out.contains('\u{1b}'));
        assert!(out.contains("# Title"));
        assert!(out.contains("Some bold and `code`."));
    }

    #[test]
    fn test_dark_theme_emits_escape_codes() {
        let out = MarkdownRenderer::new(Theme::Dark).render("## Heading").unwrap();
        assert!(out.contains('\u{1b}'));
        assert!(out.contains("Heading"));
    }

    #[test]
    fn test_code_block_indented() {
        let out = plain("```rust\nfn main() {}\nlet x = 1;\n```\n");
        assert!(out.contains("    fn main() {}\n"));
        assert!(out.contains("    let x = 1;\n"));
    }

    #[test]
    fn test_lists() {
        let out = plain("- one\n- two\n\n1. first\n2. second\n");
        assert!(out.contains("• one\n"));
        assert!(out.contains("• two\n"));
        assert!(out.contains("1. first\n"));
        assert!(out.contains("2. second\n"));
    }

    #[test]
    fn test_nested_list_indented() {
        let out = plain("- outer\n  - inner\n");
        assert!(out.contains("• outer\n"));
        assert!(out.contains("  • inner"));
    }

    #[test]
    fn test_link_target_shown() {
        let out = plain("see [docs](https://example.com)\n");
        assert!(out.contains("docs (https://example.com)"));
    }

    #[test]
    fn test_block_quote_prefixed() {
        let out = plain("> quoted line\n");
        assert!(out.contains("│ quoted line"));
    }

    #[test]
    fn test_response_block_shape() {
        let out = plain("### Claude Response\n\n```\nRecursion is...\n```");
        assert!(out.starts_with("### Claude Response\n\n"));
        assert!(out.contains("    Recursion is...\n"));
    }
}
