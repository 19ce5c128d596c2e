//! Line accessor over a source document
//!
//! Parsing and formatting are line-oriented, so callers hand the full text
//! to [`Document`] once and the rest of the crate indexes lines instead of
//! re-splitting large strings repeatedly.

use crate::position::{byte_offset_of_utf16_col, Range};

/// An in-memory document split into lines, with the dominant line ending
/// detected once at construction.
#[derive(Debug, Clone)]
pub struct Document {
    text: String,
    lines: Vec<String>,
    crlf: bool,
}

impl Document {
    pub fn new(text: &str) -> Self {
        let crlf = text.contains("\r\n");
        let lines = split_lines(text);
        Self {
            text: text.to_string(),
            lines,
            crlf,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn line(&self, n: usize) -> Option<&str> {
        self.lines.get(n).map(String::as_str)
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// The line ending used when joining formatted output.
    pub fn line_ending(&self) -> &'static str {
        if self.crlf { "\r\n" } else { "\n" }
    }

    /// The source text covered by `range`, joined with `\n` across lines.
    ///
    /// Out-of-bounds positions clamp to the document, so a stale range never
    /// panics.
    pub fn slice(&self, range: &Range) -> String {
        if self.lines.is_empty() || range.start.line >= self.lines.len() {
            return String::new();
        }
        let end_line = range
            .end
            .line
            .min(self.lines.len() - 1)
            .max(range.start.line);
        if range.start.line == end_line {
            let line = &self.lines[range.start.line];
            let s = byte_offset_of_utf16_col(line, range.start.character);
            let e = byte_offset_of_utf16_col(line, range.end.character).max(s);
            return line[s..e].to_string();
        }
        let mut out = String::new();
        let first = &self.lines[range.start.line];
        out.push_str(&first[byte_offset_of_utf16_col(first, range.start.character)..]);
        for line in &self.lines[range.start.line + 1..end_line] {
            out.push('\n');
            out.push_str(line);
        }
        let last = &self.lines[end_line];
        out.push('\n');
        out.push_str(&last[..byte_offset_of_utf16_col(last, range.end.character)]);
        out
    }
}

/// Split text into lines without their endings. A trailing newline yields a
/// final empty line, so joining the lines with the document ending
/// round-trips the original text.
fn split_lines(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    text.split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l).to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Range;

    #[test]
    fn detects_crlf_documents() {
        let doc = Document::new("a\r\nb\r\n");
        assert_eq!(doc.line_ending(), "\r\n");
        assert_eq!(doc.line(0), Some("a"));
        assert_eq!(doc.line(1), Some("b"));
    }

    #[test]
    fn slice_single_and_multi_line() {
        let doc = Document::new("const i32 X = 42\nstruct S {\n}\n");
        assert_eq!(doc.slice(&Range::new(0, 14, 0, 16)), "42");
        assert_eq!(doc.slice(&Range::new(1, 0, 2, 1)), "struct S {\n}");
    }

    #[test]
    fn slice_clamps_out_of_bounds() {
        let doc = Document::new("ab\n");
        assert_eq!(doc.slice(&Range::new(5, 0, 6, 0)), "");
        assert_eq!(doc.slice(&Range::new(0, 0, 0, 99)), "ab");
    }
}
