//! Splits assistant message text into typed render segments.
//!
//! Assistant answers embed code in Markdown-style backtick spans: triple
//! backticks fence a multi-line block (first line is the language label)
//! and single backticks mark inline code. [`format_message`] splits a
//! message into an ordered sequence of [`Segment`]s so a renderer can
//! style each kind; everything between matches is preserved verbatim as
//! plain text.
//!
//! Messages that carry trusted pre-rendered HTML
//! ([`Message::trusted_html`](crate::types::Message::trusted_html)) bypass
//! this formatter entirely; renderers emit that HTML verbatim.

/// A fenced code block.
///
/// Stores the text between the fences verbatim so the original message is
/// recoverable byte-for-byte; the language label and body are derived
/// views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    raw: String,
}

impl CodeBlock {
    fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// The text between the fences, verbatim.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The language label: the first line of the block, trimmed. Empty
    /// when no label was given.
    pub fn language(&self) -> &str {
        match self.raw.split_once('\n') {
            Some((first, _)) => first.trim(),
            None => self.raw.trim(),
        }
    }

    /// The code body: everything after the language line, with a single
    /// trailing newline stripped.
    pub fn body(&self) -> &str {
        match self.raw.split_once('\n') {
            Some((_, rest)) => rest.strip_suffix('\n').unwrap_or(rest),
            None => "",
        }
    }
}

/// One typed span of a formatted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Plain text, verbatim.
    Plain(String),

    /// Inline code with the single-backtick delimiters stripped.
    InlineCode(String),

    /// A fenced code block.
    CodeBlock(CodeBlock),
}

/// Splits message text into an ordered sequence of segments.
///
/// Triple-backtick fences are matched non-greedily (first terminator
/// wins, nested fences are not supported) and take precedence over single
/// backticks at the same position. A backtick run with no terminator
/// never matches and stays plain text. Empty input yields an empty
/// sequence.
///
/// # Examples
///
/// ```
/// use docqa::format::{Segment, format_message};
///
/// let segments = format_message("see `x` for details");
/// assert_eq!(segments.len(), 3);
/// assert_eq!(segments[1], Segment::InlineCode("x".to_string()));
/// ```
pub fn format_message(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut plain_start = 0;
    let mut i = 0;

    while i < text.len() {
        if !text[i..].starts_with('`') {
            i += text[i..].chars().next().map(char::len_utf8).unwrap_or(1);
            continue;
        }

        if text[i..].starts_with("```") {
            if let Some(rel) = text[i + 3..].find("```") {
                flush_plain(&mut segments, &text[plain_start..i]);
                let inner = &text[i + 3..i + 3 + rel];
                segments.push(Segment::CodeBlock(CodeBlock::new(inner)));
                i = i + 3 + rel + 3;
                plain_start = i;
            } else {
                // Unterminated fence: the whole backtick run is plain.
                i += text[i..].chars().take_while(|c| *c == '`').count();
            }
        } else if let Some(rel) = text[i + 1..].find('`') {
            flush_plain(&mut segments, &text[plain_start..i]);
            segments.push(Segment::InlineCode(text[i + 1..i + 1 + rel].to_string()));
            i = i + 1 + rel + 1;
            plain_start = i;
        } else {
            // Unmatched single backtick stays plain.
            i += 1;
        }
    }

    flush_plain(&mut segments, &text[plain_start..]);
    segments
}

fn flush_plain(segments: &mut Vec<Segment>, text: &str) {
    if !text.is_empty() {
        segments.push(Segment::Plain(text.to_string()));
    }
}

/// Re-joins segments into the original message text.
///
/// Inverse of [`format_message`]: for any input, the reconstruction is
/// byte-for-byte identical to the text that was formatted.
pub fn reconstruct(segments: &[Segment]) -> String {
    let mut text = String::new();
    for segment in segments {
        match segment {
            Segment::Plain(s) => text.push_str(s),
            Segment::InlineCode(s) => {
                text.push('`');
                text.push_str(s);
                text.push('`');
            }
            Segment::CodeBlock(block) => {
                text.push_str("```");
                text.push_str(block.raw());
                text.push_str("```");
            }
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_round_trip(text: &str) {
        assert_eq!(reconstruct(&format_message(text)), text, "input: {text:?}");
    }

    #[test]
    fn empty_input_yields_no_segments() {
        assert!(format_message("").is_empty());
    }

    #[test]
    fn text_without_backticks_is_one_plain_segment() {
        let segments = format_message("just words, nothing else");
        assert_eq!(
            segments,
            vec![Segment::Plain("just words, nothing else".to_string())]
        );
    }

    #[test]
    fn fenced_block_with_language() {
        let segments = format_message("Run ```python\nprint(1)\n``` now");
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0], Segment::Plain("Run ".to_string()));
        let Segment::CodeBlock(block) = &segments[1] else {
            panic!("expected code block, got {:?}", segments[1]);
        };
        assert_eq!(block.language(), "python");
        assert_eq!(block.body(), "print(1)");
        assert_eq!(segments[2], Segment::Plain(" now".to_string()));
    }

    #[test]
    fn fence_without_language_line() {
        let segments = format_message("```\nx = 1\n```");
        let Segment::CodeBlock(block) = &segments[0] else {
            panic!("expected code block");
        };
        assert_eq!(block.language(), "");
        assert_eq!(block.body(), "x = 1");
    }

    #[test]
    fn fence_with_no_newline_has_empty_body() {
        let segments = format_message("```json```");
        let Segment::CodeBlock(block) = &segments[0] else {
            panic!("expected code block");
        };
        assert_eq!(block.language(), "json");
        assert_eq!(block.body(), "");
    }

    #[test]
    fn inline_code_between_plain_text() {
        let segments = format_message("use `map` here");
        assert_eq!(
            segments,
            vec![
                Segment::Plain("use ".to_string()),
                Segment::InlineCode("map".to_string()),
                Segment::Plain(" here".to_string()),
            ]
        );
    }

    #[test]
    fn inline_code_spans_newlines() {
        let segments = format_message("`a\nb`");
        assert_eq!(segments, vec![Segment::InlineCode("a\nb".to_string())]);
    }

    #[test]
    fn first_terminator_wins() {
        let segments = format_message("```a``` ```b```");
        assert_eq!(segments.len(), 3);
        let Segment::CodeBlock(first) = &segments[0] else {
            panic!("expected code block");
        };
        assert_eq!(first.raw(), "a");
        let Segment::CodeBlock(second) = &segments[2] else {
            panic!("expected code block");
        };
        assert_eq!(second.raw(), "b");
    }

    #[test]
    fn fence_precedes_inline_at_same_position() {
        let segments = format_message("```rust\nlet `x`;\n```");
        assert_eq!(segments.len(), 1);
        let Segment::CodeBlock(block) = &segments[0] else {
            panic!("expected code block");
        };
        assert_eq!(block.body(), "let `x`;");
    }

    #[test]
    fn unterminated_fence_stays_plain() {
        let segments = format_message("start ``` never closed");
        assert_eq!(
            segments,
            vec![Segment::Plain("start ``` never closed".to_string())]
        );
    }

    #[test]
    fn unmatched_single_backtick_stays_plain() {
        let segments = format_message("odd ` one out");
        assert_eq!(segments, vec![Segment::Plain("odd ` one out".to_string())]);
    }

    #[test]
    fn text_after_unterminated_fence_still_scans() {
        let segments = format_message("``` open then `x`");
        assert_eq!(
            segments,
            vec![
                Segment::Plain("``` open then ".to_string()),
                Segment::InlineCode("x".to_string()),
            ]
        );
    }

    #[test]
    fn empty_inline_span() {
        let segments = format_message("a``b");
        assert_eq!(
            segments,
            vec![
                Segment::Plain("a".to_string()),
                Segment::InlineCode(String::new()),
                Segment::Plain("b".to_string()),
            ]
        );
    }

    #[test]
    fn reconstruction_is_byte_for_byte() {
        assert_round_trip("Run ```python\nprint(1)\n``` now");
        assert_round_trip("no code at all");
        assert_round_trip("inline `a` and ```c\nd\n``` mixed `b`");
        assert_round_trip("``` unterminated stays put");
        assert_round_trip("unicode 你好 `码` done");
        assert_round_trip("");
    }

    #[test]
    fn multibyte_text_does_not_panic() {
        let segments = format_message("héllo ```py\nprint('é')\n``` ok");
        assert_eq!(segments.len(), 3);
    }
}
