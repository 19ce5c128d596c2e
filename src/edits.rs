//! Range and diff utilities
//!
//! Formatting always operates on whole lines, and editors apply results as
//! replace-edits. These helpers widen a caller-supplied range to line
//! boundaries and shrink a formatted result to the smallest edit that
//! covers only the lines that actually changed, keeping the editor's undo
//! stack and re-render cost small.

use crate::document::Document;
use crate::position::{utf16_col, Position, Range};

/// A replace-edit against the original document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub range: Range,
    pub new_text: String,
}

/// Extend a range so it starts at column 0 of its start line and ends at
/// the end of its end line, clamped to the document.
pub fn normalize_formatting_range(doc: &Document, range: &Range) -> Range {
    let last_line = doc.line_count().saturating_sub(1);
    let start_line = range.start.line.min(last_line);
    let end_line = range.end.line.clamp(start_line, last_line);
    let end_text = doc.line(end_line).unwrap_or("");
    Range {
        start: Position::new(start_line, 0),
        end: Position::new(end_line, utf16_col(end_text, end_text.len())),
    }
}

/// Compute the smallest set of replace-edits (at most one) that turns
/// `original` into `formatted` within `range`. Lines common to both ends
/// are trimmed away; identical texts produce no edits.
pub fn build_minimal_edits(
    doc: &Document,
    range: &Range,
    original: &str,
    formatted: &str,
) -> Vec<TextEdit> {
    if original == formatted {
        return Vec::new();
    }
    let orig: Vec<&str> = split_keep_empty(original);
    let new: Vec<&str> = split_keep_empty(formatted);

    let mut prefix = 0;
    while prefix < orig.len() && prefix < new.len() && orig[prefix] == new[prefix] {
        prefix += 1;
    }
    let mut suffix = 0;
    while suffix < orig.len() - prefix
        && suffix < new.len() - prefix
        && orig[orig.len() - 1 - suffix] == new[new.len() - 1 - suffix]
    {
        suffix += 1;
    }

    let base = range.start.line;
    let orig_mid = &orig[prefix..orig.len() - suffix];
    let new_mid = &new[prefix..new.len() - suffix];
    let ending = doc.line_ending();

    if orig_mid.is_empty() {
        // pure insertion before the first unchanged suffix line
        let at = Position::new(base + prefix, 0);
        let mut text = new_mid.join(ending);
        text.push_str(ending);
        return vec![TextEdit {
            range: Range {
                start: at,
                end: at,
            },
            new_text: text,
        }];
    }

    let start = Position::new(base + prefix, 0);
    let end_line = base + prefix + orig_mid.len() - 1;
    let end_text = doc.line(end_line).unwrap_or("");
    let end = Position::new(end_line, utf16_col(end_text, end_text.len()));
    vec![TextEdit {
        range: Range { start, end },
        new_text: new_mid.join(ending),
    }]
}

/// Line split that drops a trailing empty segment, so "a\n" is one line.
fn split_keep_empty(text: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = text
        .split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .collect();
    if lines.last() == Some(&"") {
        lines.pop();
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_extends_to_whole_lines() {
        let doc = Document::new("struct S {\n  1: i32 x\n}\n");
        let r = normalize_formatting_range(&doc, &Range::new(1, 3, 1, 5));
        assert_eq!(r, Range::new(1, 0, 1, 10));
    }

    #[test]
    fn normalize_clamps_out_of_bounds() {
        let doc = Document::new("a\nb\n");
        let r = normalize_formatting_range(&doc, &Range::new(10, 0, 20, 0));
        assert_eq!(r.start.line, 2);
        assert_eq!(r.end.line, 2);
    }

    #[test]
    fn identical_texts_need_no_edits() {
        let doc = Document::new("a\nb\n");
        let edits = build_minimal_edits(&doc, &Range::new(0, 0, 1, 1), "a\nb\n", "a\nb\n");
        assert!(edits.is_empty());
    }

    #[test]
    fn only_changed_lines_are_replaced() {
        let original = "struct S {\n  1: i32 x\n}\n";
        let formatted = "struct S {\n    1: i32 x\n}\n";
        let doc = Document::new(original);
        let edits = build_minimal_edits(&doc, &Range::new(0, 0, 2, 1), original, formatted);
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].range, Range::new(1, 0, 1, 10));
        assert_eq!(edits[0].new_text, "    1: i32 x");
    }

    #[test]
    fn insertion_when_formatting_adds_lines() {
        let original = "struct S {\n}\n";
        let formatted = "struct S {\n    1: i32 x\n}\n";
        let doc = Document::new(original);
        let edits = build_minimal_edits(&doc, &Range::new(0, 0, 1, 1), original, formatted);
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].range.start, edits[0].range.end);
        assert_eq!(edits[0].range.start.line, 1);
        assert_eq!(edits[0].new_text, "    1: i32 x\n");
    }
}
