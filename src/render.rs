//! Terminal output rendering for the chat client.
//!
//! This module provides the renderer trait and a plain-text implementation
//! with optional ANSI styling for code segments.

use std::io::{self, Stdout, Write};

use crate::format::{Segment, format_message};
use crate::types::{Message, Role};

/// ANSI escape code for dim text (used for code block language labels).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for cyan text (used for inline code).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for magenta text (used for code block bodies).
const ANSI_MAGENTA: &str = "\x1b[35m";

/// ANSI escape code for red text (used for errors).
const ANSI_RED: &str = "\x1b[31m";

/// Trait for rendering chat output.
///
/// This abstraction allows for different rendering strategies: ANSI-styled
/// terminal output, plain output for piping, or capture in tests.
pub trait Renderer: Send {
    /// Print a chat message: the user's line or the assistant's reply.
    fn print_message(&mut self, message: &Message);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);

    /// Print an error message.
    fn print_error(&mut self, error: &str);
}

/// Plain text renderer with optional ANSI styling.
pub struct PlainTextRenderer {
    stdout: Stdout,
    use_color: bool,
}

impl PlainTextRenderer {
    /// Creates a new PlainTextRenderer with ANSI colors enabled.
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
            use_color: true,
        }
    }

    /// Creates a new PlainTextRenderer with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self {
            stdout: io::stdout(),
            use_color,
        }
    }

    /// Flushes stdout to ensure immediate display.
    fn flush(&mut self) {
        let _ = self.stdout.flush();
    }

    /// Formats an assistant message body, styling each segment.
    ///
    /// Trusted pre-rendered HTML bypasses the formatter and is emitted
    /// verbatim.
    fn assistant_text(&self, message: &Message) -> String {
        if let Some(html) = message.trusted_html() {
            return html.to_string();
        }

        let mut out = String::new();
        for segment in format_message(&message.content) {
            match segment {
                Segment::Plain(text) => out.push_str(&text),
                Segment::InlineCode(code) => {
                    if self.use_color {
                        out.push_str(ANSI_CYAN);
                        out.push_str(&code);
                        out.push_str(ANSI_RESET);
                    } else {
                        out.push('`');
                        out.push_str(&code);
                        out.push('`');
                    }
                }
                Segment::CodeBlock(block) => {
                    out.push('\n');
                    if !block.language().is_empty() {
                        if self.use_color {
                            out.push_str(ANSI_DIM);
                        }
                        out.push('[');
                        out.push_str(block.language());
                        out.push(']');
                        if self.use_color {
                            out.push_str(ANSI_RESET);
                        }
                        out.push('\n');
                    }
                    if self.use_color {
                        out.push_str(ANSI_MAGENTA);
                    }
                    for line in block.body().lines() {
                        out.push_str("  ");
                        out.push_str(line);
                        out.push('\n');
                    }
                    if self.use_color {
                        out.push_str(ANSI_RESET);
                    }
                }
            }
        }
        out
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for PlainTextRenderer {
    fn print_message(&mut self, message: &Message) {
        match message.role {
            Role::User => {
                println!("You: {}", message.content);
            }
            Role::Assistant => {
                println!("Bot: {}", self.assistant_text(message));
            }
        }
        self.flush();
    }

    fn print_info(&mut self, info: &str) {
        println!("{info}");
        self.flush();
    }

    fn print_error(&mut self, error: &str) {
        if self.use_color {
            eprintln!("{ANSI_RED}Error: {error}{ANSI_RESET}");
        } else {
            eprintln!("Error: {error}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renderer_default_has_color() {
        let renderer = PlainTextRenderer::new();
        assert!(renderer.use_color);
    }

    #[test]
    fn renderer_without_color() {
        let renderer = PlainTextRenderer::with_color(false);
        assert!(!renderer.use_color);
    }

    #[test]
    fn plain_assistant_text_without_color_restores_backticks() {
        let renderer = PlainTextRenderer::with_color(false);
        let message = Message::assistant("use `map` here");
        assert_eq!(renderer.assistant_text(&message), "use `map` here");
    }

    #[test]
    fn code_block_gets_language_header_and_indent() {
        let renderer = PlainTextRenderer::with_color(false);
        let message = Message::assistant("Run ```python\nprint(1)\n``` now");
        assert_eq!(
            renderer.assistant_text(&message),
            "Run \n[python]\n  print(1)\n now"
        );
    }

    #[test]
    fn trusted_html_bypasses_formatter() {
        let renderer = PlainTextRenderer::with_color(false);
        let message = Message::assistant_html("`x`", "<code>x</code>");
        assert_eq!(renderer.assistant_text(&message), "<code>x</code>");
    }
}
