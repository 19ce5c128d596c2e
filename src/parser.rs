//! Structural parser for the IDL dialect
//!
//! A single-pass, line-by-line parser that builds a position-accurate AST
//! from source text. Instead of a grammar runtime, the parser keeps three
//! small explicit state machines: a block-comment flag that persists across
//! line boundaries, a brace-depth counter that ignores braces inside
//! strings and comments, and the current top-level construct state.
//!
//! The parser never fails. A top-level declaration that does not parse is
//! emitted as [`Definition::Invalid`] carrying its raw text, and scanning
//! resumes on the next line, so one broken statement never aborts the rest
//! of the document.
//!
//! # Example
//!
//! ```rust
//! use thriftfmt::parser::parse;
//! use thriftfmt::ast::Definition;
//!
//! let ast = parse("struct User {\n  1: i32 id\n}\n");
//! assert!(matches!(ast.body[0], Definition::Struct(_)));
//! ```

use crate::ast::{
    Ast, Const, Definition, Enum, EnumMember, Field, Function, Include, Invalid, Namespace,
    Requiredness, Service, Struct, StructKind, Typedef,
};
use crate::position::{utf16_col, Position, Range};
use crate::text::{
    ident_end, mask_line, parse_argument_text, parse_const_text, parse_enum_member_text,
    parse_function_text, parse_struct_field_text, parse_type_at, skip_ws, split_line_comment,
    split_top_level_parts_indexed, Span,
};

/// Parse source text into an AST. Never fails; malformed declarations
/// degrade to `Invalid` nodes.
pub fn parse(text: &str) -> Ast {
    let ast = Parser::new(text).parse();
    tracing::trace!(definitions = ast.body.len(), "parsed document");
    ast
}

/// The structural parser. Construct once per document.
pub struct Parser {
    lines: Vec<String>,
    masked: Vec<Vec<u8>>,
    comment_flags: Vec<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Enum,
    Struct(StructKind),
    Service,
}

impl Parser {
    pub fn new(text: &str) -> Self {
        let lines: Vec<String> = if text.is_empty() {
            Vec::new()
        } else {
            text.split('\n')
                .map(|l| l.strip_suffix('\r').unwrap_or(l).to_string())
                .collect()
        };
        let mut masked = Vec::with_capacity(lines.len());
        let mut comment_flags = Vec::with_capacity(lines.len());
        let mut in_block = false;
        for line in &lines {
            comment_flags.push(in_block);
            masked.push(mask_line(line, &mut in_block));
        }
        Self {
            lines,
            masked,
            comment_flags,
        }
    }

    pub fn parse(&self) -> Ast {
        let mut body = Vec::new();
        let mut i = 0;
        while i < self.lines.len() {
            let masked = &self.masked[i];
            if is_blank(masked) {
                i += 1;
                continue;
            }
            let Some((ws, we)) = first_word(masked) else {
                body.push(self.invalid_lines(i, i));
                i += 1;
                continue;
            };
            let word = &self.lines[i][ws..we];
            match word {
                "namespace" => {
                    body.push(self.parse_namespace(i, ws));
                    i += 1;
                }
                "include" => {
                    body.push(self.parse_include(i, ws));
                    i += 1;
                }
                "typedef" => {
                    body.push(self.parse_typedef(i, ws));
                    i += 1;
                }
                "const" => {
                    let (def, next) = self.parse_const(i, ws);
                    body.push(def);
                    i = next;
                }
                "enum" => {
                    let (def, next) = self.parse_block(i, ws, BlockKind::Enum);
                    body.push(def);
                    i = next;
                }
                "struct" | "union" | "exception" => {
                    let kind = StructKind::from_keyword(word).unwrap_or(StructKind::Struct);
                    let (def, next) = self.parse_block(i, ws, BlockKind::Struct(kind));
                    body.push(def);
                    i = next;
                }
                "service" => {
                    let (def, next) = self.parse_block(i, ws, BlockKind::Service);
                    body.push(def);
                    i = next;
                }
                _ => {
                    body.push(self.invalid_lines(i, i));
                    i += 1;
                }
            }
        }
        Ast {
            body,
            comment_line_flags: self.comment_flags.clone(),
        }
    }

    fn line_range(&self, line: usize, start: usize, end: usize) -> Range {
        let text = &self.lines[line];
        Range {
            start: Position::new(line, utf16_col(text, start)),
            end: Position::new(line, utf16_col(text, end)),
        }
    }

    fn invalid_lines(&self, start: usize, end: usize) -> Definition {
        let raw = self.lines[start..=end].join("\n");
        let end_len = self.lines[end].len();
        Definition::Invalid(Invalid {
            raw,
            range: Range {
                start: Position::new(start, 0),
                end: Position::new(end, utf16_col(&self.lines[end], end_len)),
            },
        })
    }

    fn parse_namespace(&self, i: usize, kw_start: usize) -> Definition {
        let line = &self.lines[i];
        let (code, _) = split_line_comment(line);
        let code = code.trim_end();
        let Some(kw_end) = ident_end(code, kw_start, false) else {
            return self.invalid_lines(i, i);
        };
        let p = skip_ws(code, kw_end);
        // scope may be dotted or the wildcard `*`
        let scope_end = if code.as_bytes().get(p) == Some(&b'*') {
            Some(p + 1)
        } else {
            ident_end(code, p, true)
        };
        let Some(se) = scope_end else {
            return self.invalid_lines(i, i);
        };
        let scope = code[p..se].to_string();
        let np = skip_ws(code, se);
        let Some(ne) = ident_end(code, np, true) else {
            return self.invalid_lines(i, i);
        };
        if !code[ne..].trim().is_empty() {
            return self.invalid_lines(i, i);
        }
        Definition::Namespace(Namespace {
            scope,
            namespace: code[np..ne].to_string(),
            name_range: self.line_range(i, np, ne),
            range: self.line_range(i, kw_start, code.len()),
        })
    }

    fn parse_include(&self, i: usize, kw_start: usize) -> Definition {
        let line = &self.lines[i];
        let (code, _) = split_line_comment(line);
        let code = code.trim_end();
        let Some(kw_end) = ident_end(code, kw_start, false) else {
            return self.invalid_lines(i, i);
        };
        let p = skip_ws(code, kw_end);
        let bytes = code.as_bytes();
        let quote = match bytes.get(p) {
            Some(&q) if q == b'"' || q == b'\'' => q,
            _ => return self.invalid_lines(i, i),
        };
        let Some(close_rel) = code[p + 1..].find(quote as char) else {
            return self.invalid_lines(i, i);
        };
        let close = p + 1 + close_rel;
        if !code[close + 1..].trim().is_empty() {
            return self.invalid_lines(i, i);
        }
        Definition::Include(Include {
            path: code[p + 1..close].to_string(),
            range: self.line_range(i, kw_start, code.len()),
        })
    }

    fn parse_typedef(&self, i: usize, kw_start: usize) -> Definition {
        let line = &self.lines[i];
        let (code, _) = split_line_comment(line);
        let code = code.trim_end();
        let code = code
            .strip_suffix(|c| c == ',' || c == ';')
            .unwrap_or(code)
            .trim_end();
        let (base, _annotation) = crate::text::split_trailing_annotation(code);
        let Some(kw_end) = ident_end(base, kw_start, false) else {
            return self.invalid_lines(i, i);
        };
        let p = skip_ws(base, kw_end);
        let Some(type_span) = parse_type_at(base, p) else {
            return self.invalid_lines(i, i);
        };
        let np = skip_ws(base, type_span.end);
        let Some(ne) = ident_end(base, np, false) else {
            return self.invalid_lines(i, i);
        };
        if !base[ne..].trim().is_empty() {
            return self.invalid_lines(i, i);
        }
        Definition::Typedef(Typedef {
            name: base[np..ne].to_string(),
            name_range: self.line_range(i, np, ne),
            alias_type: type_span.slice(base).to_string(),
            alias_type_range: self.line_range(i, type_span.start, type_span.end),
            range: self.line_range(i, kw_start, ne),
        })
    }

    fn parse_const(&self, i: usize, kw_start: usize) -> (Definition, usize) {
        // a const value may span lines until its brackets balance
        let mut last = i;
        let mut balance = bracket_balance(&self.masked[i], 0, self.masked[i].len());
        while balance > 0 && last + 1 < self.lines.len() {
            last += 1;
            balance += bracket_balance(&self.masked[last], 0, self.masked[last].len());
        }
        let mut joined = Joined::default();
        for j in i..=last {
            let (code, _) = split_line_comment(&self.lines[j]);
            joined.push(j, 0, code);
        }
        let Some(parts) = parse_const_text(&joined.text) else {
            return (self.invalid_lines(i, last), last + 1);
        };
        let value_range = self.joined_range(&joined, parts.value_span);
        let def = Definition::Const(Const {
            name: parts.name,
            name_range: self.joined_range(&joined, parts.name_span),
            value_type: parts.value_type,
            value_type_range: self.joined_range(&joined, parts.type_span),
            value: parts.value,
            value_range,
            range: Range {
                start: Position::new(i, utf16_col(&self.lines[i], kw_start)),
                end: value_range.end,
            },
        });
        (def, last + 1)
    }

    fn parse_block(&self, i: usize, kw_start: usize, kind: BlockKind) -> (Definition, usize) {
        // locate the open brace: same line, or first structural line below
        let (open_line, open_col) = match find_byte(&self.masked[i], 0, b'{') {
            Some(col) => (i, col),
            None => {
                let mut j = i + 1;
                loop {
                    if j >= self.lines.len() {
                        return (self.invalid_lines(i, i), i + 1);
                    }
                    if is_blank(&self.masked[j]) {
                        j += 1;
                        continue;
                    }
                    match first_non_space(&self.masked[j]) {
                        Some(col) if self.masked[j][col] == b'{' => break (j, col),
                        _ => return (self.invalid_lines(i, i), i + 1),
                    }
                }
            }
        };

        let (close_line, close_col) = self.find_close(open_line, open_col);

        let header_end = if open_line == i {
            open_col
        } else {
            self.lines[i].len()
        };
        let header = split_line_comment(&self.lines[i][..header_end]).0;
        let Some((name, name_span, extends)) = self.parse_block_header(header, kw_start, kind)
        else {
            return (self.invalid_lines(i, close_line), close_line + 1);
        };
        let name_range = self.line_range(i, name_span.start, name_span.end);
        let close_line_len = self.lines[close_line].len();
        let range = Range {
            start: Position::new(i, utf16_col(&self.lines[i], kw_start)),
            end: Position::new(
                close_line,
                utf16_col(&self.lines[close_line], (close_col + 1).min(close_line_len)),
            ),
        };

        let segments = self.member_segments(open_line, open_col, close_line, close_col);

        let def = match kind {
            BlockKind::Enum => Definition::Enum(Enum {
                name,
                name_range,
                members: self.parse_enum_members(&segments),
                range,
            }),
            BlockKind::Struct(sk) => Definition::Struct(Struct {
                kind: sk,
                name,
                name_range,
                fields: self.parse_struct_fields(&segments),
                range,
            }),
            BlockKind::Service => Definition::Service(Service {
                name,
                name_range,
                extends,
                functions: self.parse_service_functions(&segments),
                range,
            }),
        };
        (def, close_line + 1)
    }

    fn parse_block_header(
        &self,
        header: &str,
        kw_start: usize,
        kind: BlockKind,
    ) -> Option<(String, Span, Option<String>)> {
        let kw_end = ident_end(header, kw_start, false)?;
        let p = skip_ws(header, kw_end);
        let ne = ident_end(header, p, false)?;
        let name = header[p..ne].to_string();
        let name_span = Span::new(p, ne);
        let mut extends = None;
        if kind == BlockKind::Service {
            let q = skip_ws(header, ne);
            if let Some(e) = ident_end(header, q, false) {
                if &header[q..e] == "extends" {
                    let xp = skip_ws(header, e);
                    let xe = ident_end(header, xp, true)?;
                    extends = Some(header[xp..xe].to_string());
                }
            }
        }
        // anything left after the name (header annotations) is tolerated
        Some((name, name_span, extends))
    }

    /// Scan for the `}` matching the `{` at (open_line, open_col). When the
    /// document ends first, the block closes at end of input.
    fn find_close(&self, open_line: usize, open_col: usize) -> (usize, usize) {
        let mut depth = 1i32;
        let mut line = open_line;
        let mut col = open_col + 1;
        loop {
            let masked = &self.masked[line];
            while col < masked.len() {
                match masked[col] {
                    b'{' => depth += 1,
                    b'}' => {
                        depth -= 1;
                        if depth == 0 {
                            return (line, col);
                        }
                    }
                    _ => {}
                }
                col += 1;
            }
            if line + 1 >= self.lines.len() {
                let last = self.lines.len().saturating_sub(1);
                return (last, self.lines.get(last).map_or(0, String::len));
            }
            line += 1;
            col = 0;
        }
    }

    /// Interior (line, start, end) byte slices between the construct braces.
    fn member_segments(
        &self,
        open_line: usize,
        open_col: usize,
        close_line: usize,
        close_col: usize,
    ) -> Vec<(usize, usize, usize)> {
        let mut segments = Vec::new();
        if open_line == close_line {
            segments.push((open_line, open_col + 1, close_col));
            return segments;
        }
        segments.push((open_line, open_col + 1, self.lines[open_line].len()));
        for j in open_line + 1..close_line {
            segments.push((j, 0, self.lines[j].len()));
        }
        segments.push((close_line, 0, close_col));
        segments
    }

    /// Comment-stripped code slice of one member segment. The start offset
    /// is unchanged; comments only shorten the end.
    fn segment_code<'a>(&'a self, seg: &(usize, usize, usize)) -> (usize, usize, &'a str) {
        let (line, start, end) = *seg;
        let slice = &self.lines[line][start..end];
        let (code, _) = split_line_comment(slice);
        (line, start, code)
    }

    /// Like [`segment_code`], but blanks out any part of the slice that the
    /// mask marks as comment (covers `/* … */` interiors).
    fn segment_is_commented(&self, line: usize, start: usize, code: &str) -> bool {
        let masked = &self.masked[line];
        code.bytes().enumerate().all(|(k, b)| {
            b == b' ' || b == b'\t' || masked.get(start + k) != Some(&b)
        })
    }

    fn parse_enum_members(&self, segments: &[(usize, usize, usize)]) -> Vec<EnumMember> {
        let mut members = Vec::new();
        for seg in segments {
            let (line, start, code) = self.segment_code(seg);
            if code.trim().is_empty() || self.segment_is_commented(line, start, code) {
                continue;
            }
            for (off, part) in split_top_level_parts_indexed(code) {
                let Some(parts) = parse_enum_member_text(part) else {
                    continue;
                };
                let base = start + off;
                members.push(EnumMember {
                    name: parts.name,
                    name_range: self.line_range(
                        line,
                        base + parts.name_span.start,
                        base + parts.name_span.end,
                    ),
                    initializer: parts.initializer,
                    initializer_range: parts
                        .initializer_span
                        .map(|s| self.line_range(line, base + s.start, base + s.end)),
                });
            }
        }
        members
    }

    fn parse_struct_fields(&self, segments: &[(usize, usize, usize)]) -> Vec<Field> {
        let mut fields = Vec::new();
        let mut pending = Joined::default();
        let mut balance = 0i32;
        for seg in segments {
            let (line, start, code) = self.segment_code(seg);
            if balance == 0
                && (code.trim().is_empty() || self.segment_is_commented(line, start, code))
            {
                continue;
            }
            let seg_balance = bracket_balance(&self.masked[line], start, start + code.len());
            pending.push(line, start, code);
            balance += seg_balance;
            if balance > 0 {
                continue;
            }
            balance = 0;
            let unit = std::mem::take(&mut pending);
            self.flush_fields(&unit, &mut fields);
        }
        if !pending.text.trim().is_empty() {
            self.flush_fields(&pending, &mut fields);
        }
        fields
    }

    fn flush_fields(&self, unit: &Joined, fields: &mut Vec<Field>) {
        for (off, part) in split_top_level_parts_indexed(&unit.text) {
            let Some(parts) = parse_struct_field_text(part) else {
                continue;
            };
            fields.push(self.field_from_parts(unit, off, part, &parts));
        }
    }

    fn field_from_parts(
        &self,
        unit: &Joined,
        off: usize,
        part: &str,
        parts: &crate::text::FieldParts,
    ) -> Field {
        let shift = |s: Span| Span::new(off + s.start, off + s.end);
        Field {
            id: parts.id,
            requiredness: Requiredness::from_keyword(parts.requiredness.as_deref()),
            field_type: parts.field_type.clone(),
            type_range: self.joined_range(unit, shift(parts.type_span)),
            name: parts.name.clone(),
            name_range: self.joined_range(unit, shift(parts.name_span)),
            default_value: parts.default_value.clone(),
            default_value_range: parts
                .default_span
                .map(|s| self.joined_range(unit, shift(s))),
            annotation: parts.annotation.clone(),
            range: self.joined_range(unit, Span::new(off, off + part.len())),
        }
    }

    fn parse_service_functions(&self, segments: &[(usize, usize, usize)]) -> Vec<Function> {
        let mut functions = Vec::new();
        let mut pending = Joined::default();
        let mut balance = 0i32;
        let codes: Vec<(usize, usize, &str)> =
            segments.iter().map(|s| self.segment_code(s)).collect();
        for (idx, (line, start, code)) in codes.iter().enumerate() {
            if pending.text.trim().is_empty()
                && (code.trim().is_empty() || self.segment_is_commented(*line, *start, code))
            {
                continue;
            }
            pending.push(*line, *start, code);
            balance += paren_balance(code);
            if balance > 0 {
                continue;
            }
            let next_code = codes[idx + 1..]
                .iter()
                .map(|(_, _, c)| c.trim())
                .find(|c| !c.is_empty());
            if !pending.text.contains('(') {
                if next_code.is_some_and(|c| c.starts_with('(')) {
                    continue;
                }
                // an unparseable member; drop it rather than letting it
                // corrupt the next signature
                pending = Joined::default();
                continue;
            }
            // a closed signature may still be followed by a throws clause
            // on the next line
            if next_code.is_some_and(|c| c.starts_with("throws"))
                && !pending.text.contains("throws")
            {
                continue;
            }
            balance = 0;
            let unit = std::mem::take(&mut pending);
            if let Some(func) = self.function_from_unit(&unit) {
                functions.push(func);
            }
        }
        if !pending.text.trim().is_empty() {
            if let Some(func) = self.function_from_unit(&pending) {
                functions.push(func);
            }
        }
        functions
    }

    fn function_from_unit(&self, unit: &Joined) -> Option<Function> {
        let parts = parse_function_text(&unit.text)?;
        let arguments = self.fields_in_list(unit, parts.args_span, &parts.args_text);
        let throws = match (parts.throws_span, parts.throws_text.as_deref()) {
            (Some(span), Some(text)) => self.fields_in_list(unit, span, text),
            _ => Vec::new(),
        };
        let sig_start = unit.text.len() - unit.text.trim_start().len();
        Some(Function {
            name: parts.name,
            name_range: self.joined_range(unit, parts.name_span),
            return_type: parts.return_type,
            return_type_range: self.joined_range(unit, parts.return_type_span),
            oneway: parts.oneway,
            arguments,
            throws,
            range: self.joined_range(unit, Span::new(sig_start, parts.signature_end)),
        })
    }

    fn fields_in_list(&self, unit: &Joined, list_span: Span, list_text: &str) -> Vec<Field> {
        let mut out = Vec::new();
        for (off, part) in split_top_level_parts_indexed(list_text) {
            let Some(parts) = parse_argument_text(part) else {
                continue;
            };
            out.push(self.field_from_parts(unit, list_span.start + off, part, &parts));
        }
        out
    }

    fn joined_range(&self, joined: &Joined, span: Span) -> Range {
        let (sl, sc) = joined.pos(span.start);
        let (el, ec) = joined.pos(span.end);
        Range {
            start: Position::new(sl, utf16_col(&self.lines[sl], sc)),
            end: Position::new(el, utf16_col(&self.lines[el], ec)),
        }
    }
}

/// Member text gathered across physical lines, with a map back from byte
/// offsets in the joined text to (line, column) in the document.
#[derive(Debug, Default)]
struct Joined {
    text: String,
    segs: Vec<Seg>,
}

#[derive(Debug)]
struct Seg {
    start: usize,
    len: usize,
    line: usize,
    col: usize,
}

impl Joined {
    fn push(&mut self, line: usize, col: usize, s: &str) {
        if !self.text.is_empty() {
            self.text.push('\n');
        }
        self.segs.push(Seg {
            start: self.text.len(),
            len: s.len(),
            line,
            col,
        });
        self.text.push_str(s);
    }

    fn pos(&self, off: usize) -> (usize, usize) {
        for seg in self.segs.iter().rev() {
            if off >= seg.start {
                return (seg.line, seg.col + (off - seg.start).min(seg.len));
            }
        }
        self.segs.first().map_or((0, 0), |seg| (seg.line, seg.col))
    }
}

fn is_blank(masked: &[u8]) -> bool {
    masked.iter().all(|&b| b == b' ' || b == b'\t')
}

fn first_non_space(masked: &[u8]) -> Option<usize> {
    masked.iter().position(|&b| b != b' ' && b != b'\t')
}

/// (start, end) of a leading identifier on a masked line.
fn first_word(masked: &[u8]) -> Option<(usize, usize)> {
    let start = first_non_space(masked)?;
    let b = masked[start];
    if !(b.is_ascii_alphabetic() || b == b'_') {
        return None;
    }
    let mut end = start + 1;
    while end < masked.len() && (masked[end].is_ascii_alphanumeric() || masked[end] == b'_') {
        end += 1;
    }
    Some((start, end))
}

fn find_byte(masked: &[u8], from: usize, target: u8) -> Option<usize> {
    masked[from..]
        .iter()
        .position(|&b| b == target)
        .map(|p| from + p)
}

/// Net `([{` vs `)]}` balance over a masked slice.
fn bracket_balance(masked: &[u8], start: usize, end: usize) -> i32 {
    let mut depth = 0;
    for &b in &masked[start.min(masked.len())..end.min(masked.len())] {
        match b {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth -= 1,
            _ => {}
        }
    }
    depth
}

/// Net paren balance over comment-stripped code, string-aware.
fn paren_balance(code: &str) -> i32 {
    let mut depth = 0;
    let mut in_str: Option<u8> = None;
    let mut escaped = false;
    for &b in code.as_bytes() {
        if let Some(q) = in_str {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == q {
                in_str = None;
            }
            continue;
        }
        match b {
            b'"' | b'\'' => in_str = Some(b),
            b'(' => depth += 1,
            b')' => depth -= 1,
            _ => {}
        }
    }
    depth
}
