//! AST index
//!
//! Fast lookup maps over a parsed document, built once per parse in
//! O(nodes). Incremental formatting uses the index to decide which
//! top-level constructs a dirty line range touches, so untouched regions
//! can be copied instead of re-scanned.

use std::collections::{HashMap, HashSet};

use crate::ast::{Ast, Definition};

/// Line-span of one top-level construct, in body order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstructSpan {
    pub start_line: usize,
    pub end_line: usize,
    /// Index into `ast.body`.
    pub body_index: usize,
    pub invalid: bool,
}

/// Lookup maps over one parsed document.
#[derive(Debug, Clone, Default)]
pub struct AstIndex {
    pub const_starts: HashSet<usize>,
    pub struct_starts: HashSet<usize>,
    pub enum_starts: HashSet<usize>,
    pub service_starts: HashSet<usize>,
    /// Line → (body index, field index) for struct fields.
    pub struct_field_index: HashMap<usize, (usize, usize)>,
    /// Line → (body index, member index) for enum members.
    pub enum_member_index: HashMap<usize, (usize, usize)>,
    /// Every top-level construct's line span, sorted by start line.
    pub construct_spans: Vec<ConstructSpan>,
    /// Per line: true when the line starts inside an open block comment.
    pub comment_line_flags: Vec<bool>,
}

/// Build the index for a parsed document.
pub fn build_ast_index(ast: &Ast) -> AstIndex {
    let mut index = AstIndex {
        comment_line_flags: ast.comment_line_flags.clone(),
        ..AstIndex::default()
    };

    for (body_index, def) in ast.body.iter().enumerate() {
        let range = def.range();
        index.construct_spans.push(ConstructSpan {
            start_line: range.start.line,
            end_line: range.end.line,
            body_index,
            invalid: matches!(def, Definition::Invalid(_)),
        });
        match def {
            Definition::Const(_) => {
                index.const_starts.insert(range.start.line);
            }
            Definition::Struct(s) => {
                index.struct_starts.insert(range.start.line);
                for (field_index, field) in s.fields.iter().enumerate() {
                    index
                        .struct_field_index
                        .insert(field.range.start.line, (body_index, field_index));
                }
            }
            Definition::Enum(e) => {
                index.enum_starts.insert(range.start.line);
                for (member_index, member) in e.members.iter().enumerate() {
                    index
                        .enum_member_index
                        .insert(member.name_range.start.line, (body_index, member_index));
                }
            }
            Definition::Service(_) => {
                index.service_starts.insert(range.start.line);
            }
            _ => {}
        }
    }
    index.construct_spans.sort_by_key(|s| s.start_line);
    index
}

impl AstIndex {
    /// Expand a dirty line interval to cover whole top-level constructs.
    ///
    /// Returns `None` (caller falls back to full formatting) when the
    /// range touches an `Invalid` construct or starts inside a block
    /// comment; construct boundaries cannot be trusted in either case.
    pub fn resolve_dirty_span(&self, start_line: usize, end_line: usize) -> Option<(usize, usize)> {
        if self
            .comment_line_flags
            .get(start_line)
            .copied()
            .unwrap_or(false)
        {
            return None;
        }
        let mut lo = start_line;
        let mut hi = end_line;
        for span in &self.construct_spans {
            if span.start_line > end_line {
                break;
            }
            if span.end_line < start_line {
                continue;
            }
            if span.invalid {
                return None;
            }
            lo = lo.min(span.start_line);
            hi = hi.max(span.end_line);
        }
        Some((lo, hi))
    }
}
