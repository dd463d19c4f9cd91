//! Line wrapping for console and log output.
//!
//! Wrapping is word-based: tokens are never split unless `break_long_words`
//! (or `break_on_hyphens` for hyphenated compounds) asks for it, so a token
//! wider than the line overflows rather than being corrupted.

use console::measure_text_width;

/// Width of the `YYYY-MM-DD HH:MM:SS.mmm | LEVEL    | ` record header.
pub const HEADER_WIDTH: usize = 37;

pub const DEFAULT_LINE_WIDTH: usize = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrapOptions {
    pub line_width: usize,
    pub break_long_words: bool,
    pub break_on_hyphens: bool,
    /// Columns reserved on the first line for a prefix the caller prepends.
    /// Continuation lines are indented by the same amount.
    pub header_offset: usize,
}

impl Default for WrapOptions {
    fn default() -> Self {
        Self {
            line_width: DEFAULT_LINE_WIDTH,
            break_long_words: false,
            break_on_hyphens: false,
            header_offset: 0,
        }
    }
}

impl WrapOptions {
    pub fn with_header_offset(self, header_offset: usize) -> Self {
        Self {
            header_offset,
            ..self
        }
    }

    /// Content columns available on every line.
    fn available(&self) -> usize {
        self.line_width.saturating_sub(self.header_offset).max(1)
    }
}

/// Wraps `message` to the configured width.
///
/// Newlines in the input are hard breaks; each segment is wrapped on its own.
/// Every line after the first is indented by `header_offset` spaces so it
/// aligns under the first line's text once the caller prepends its header.
pub fn format_message(message: &str, options: &WrapOptions) -> String {
    if message.is_empty() {
        return String::new();
    }

    let available = options.available();
    let mut lines = Vec::new();
    for segment in message.split('\n') {
        wrap_segment(segment, available, options, &mut lines);
    }

    let indent = " ".repeat(options.header_offset);
    let mut out = String::with_capacity(message.len() + lines.len() * indent.len());
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            out.push('\n');
            if !line.is_empty() {
                out.push_str(&indent);
            }
        }
        out.push_str(line);
    }
    out
}

/// A wrappable piece of text. `glued` chunks continue the previous chunk
/// without a separating space (the tail of a hyphen split).
struct Chunk<'a> {
    text: &'a str,
    glued: bool,
}

fn split_chunks(segment: &str, break_on_hyphens: bool) -> Vec<Chunk<'_>> {
    let mut chunks = Vec::new();
    for word in segment.split_whitespace() {
        if !break_on_hyphens {
            chunks.push(Chunk {
                text: word,
                glued: false,
            });
            continue;
        }

        let chars: Vec<(usize, char)> = word.char_indices().collect();
        let mut start = 0;
        let mut glued = false;
        for i in 1..chars.len().saturating_sub(1) {
            let (idx, c) = chars[i];
            if c == '-' && chars[i - 1].1.is_alphanumeric() && chars[i + 1].1.is_alphanumeric() {
                let end = idx + c.len_utf8();
                chunks.push(Chunk {
                    text: &word[start..end],
                    glued,
                });
                start = end;
                glued = true;
            }
        }
        chunks.push(Chunk {
            text: &word[start..],
            glued,
        });
    }
    chunks
}

fn wrap_segment(segment: &str, available: usize, options: &WrapOptions, lines: &mut Vec<String>) {
    let chunks = split_chunks(segment, options.break_on_hyphens);
    if chunks.is_empty() {
        lines.push(String::new());
        return;
    }

    let mut current = String::new();
    let mut width = 0;
    for chunk in chunks {
        let chunk_width = measure_text_width(chunk.text);
        let gap = usize::from(!current.is_empty() && !chunk.glued);

        if width + gap + chunk_width <= available {
            if gap == 1 {
                current.push(' ');
            }
            current.push_str(chunk.text);
            width += gap + chunk_width;
            continue;
        }

        if chunk_width <= available || !options.break_long_words {
            // Start a fresh line. A chunk still wider than the line overflows intact.
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            current.push_str(chunk.text);
            width = chunk_width;
            continue;
        }

        let mut rest = chunk.text;
        let room = available.saturating_sub(width + gap);
        if !current.is_empty() && room > 0 {
            let (head, tail) = split_at_width(rest, room);
            if !head.is_empty() {
                if gap == 1 {
                    current.push(' ');
                }
                current.push_str(head);
                rest = tail;
            }
        }
        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        loop {
            let (head, tail) = split_at_width_min_one(rest, available);
            if tail.is_empty() {
                current.push_str(head);
                width = measure_text_width(head);
                break;
            }
            lines.push(head.to_string());
            rest = tail;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
}

/// Splits `text` at the last char boundary that keeps the head within `limit` columns.
fn split_at_width(text: &str, limit: usize) -> (&str, &str) {
    let mut width = 0;
    let mut buf = [0u8; 4];
    for (idx, ch) in text.char_indices() {
        let w = measure_text_width(ch.encode_utf8(&mut buf));
        if width + w > limit {
            return text.split_at(idx);
        }
        width += w;
    }
    (text, "")
}

/// Like [`split_at_width`] but always consumes at least one char.
fn split_at_width_min_one(text: &str, limit: usize) -> (&str, &str) {
    let (head, tail) = split_at_width(text, limit);
    if head.is_empty() {
        let first = text.chars().next().map_or(text.len(), char::len_utf8);
        return text.split_at(first);
    }
    (head, tail)
}
