//! Line-oriented construct handlers
//!
//! The walker re-derives formatted output line by line: it detects each
//! top-level construct, expands inline bodies into canonical multi-line
//! form, re-indents members, and hands contiguous member blocks to the
//! alignment engine. Anything it cannot confidently restructure is emitted
//! unchanged; the walker never fails.

use crate::options::{CollectionStyle, FormatOptions, TrailingComma};
use crate::text::{
    is_enum_member_text, is_struct_field_text, mask_line, normalize_type, parse_argument_text,
    parse_const_text, parse_enum_member_text, parse_function_text, parse_struct_field_text,
    split_line_comment, split_top_level_parts, split_trailing_annotation, EnumMemberParts,
    FieldParts, FunctionParts,
};

use super::align::layout_rows;

/// Walks a run of source lines and produces formatted output lines.
/// Incremental formatting runs the same walker over a slice of whole
/// top-level constructs, which is what keeps the two modes equivalent.
pub struct LineWalker<'a> {
    lines: &'a [String],
    masked: Vec<Vec<u8>>,
    /// Per line: starts inside an open `/* … */` comment.
    flags: Vec<bool>,
    opts: &'a FormatOptions,
    out: Vec<String>,
    i: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockShape {
    Enum,
    Struct,
    Service,
}

/// One member-level output unit collected from a construct body.
enum Item {
    Blank,
    Comment(String),
    CommentBlock { from: usize, to: usize },
    StructRow { parts: FieldParts, had_sep: bool, comment: Option<String> },
    EnumRow { parts: EnumMemberParts, had_sep: bool, comment: Option<String> },
    Func { parts: FunctionParts, had_sep: bool, comment: Option<String> },
    Raw(Vec<String>),
}

impl Item {
    fn is_member(&self) -> bool {
        matches!(
            self,
            Item::StructRow { .. } | Item::EnumRow { .. } | Item::Func { .. }
        )
    }
}

impl<'a> LineWalker<'a> {
    pub fn new(lines: &'a [String], opts: &'a FormatOptions) -> Self {
        let mut masked = Vec::with_capacity(lines.len());
        let mut flags = Vec::with_capacity(lines.len());
        let mut in_block = false;
        for line in lines {
            flags.push(in_block);
            masked.push(mask_line(line, &mut in_block));
        }
        Self {
            lines,
            masked,
            flags,
            opts,
            out: Vec::new(),
            i: 0,
        }
    }

    pub fn run(mut self) -> Vec<String> {
        while self.i < self.lines.len() {
            self.step();
        }
        self.out
    }

    fn indent(&self, level: usize) -> String {
        self.opts.indent_unit().repeat(level)
    }

    fn step(&mut self) {
        let i = self.i;
        let raw = &self.lines[i];
        if raw.trim().is_empty() {
            self.out.push(String::new());
            self.i += 1;
            return;
        }
        if is_blank_bytes(&self.masked[i]) {
            let t = raw.trim_start();
            if t.starts_with("/*") && !self.flags[i] {
                self.consume_comment_block(0);
                return;
            }
            if t.starts_with("//") || t.starts_with('#') {
                self.out.push(t.trim_end().to_string());
                self.i += 1;
                return;
            }
            // a line continuing (or closing) a comment we did not open
            self.out.push(raw.clone());
            self.i += 1;
            return;
        }
        if self.flags[i] {
            // code after an inline `*/` close; leave mixed lines alone
            self.out.push(raw.clone());
            self.i += 1;
            return;
        }
        let word = first_word_of(&self.masked[i], raw);
        match word.as_deref() {
            Some("namespace") | Some("include") => {
                self.format_simple_line(i);
                self.i += 1;
            }
            Some("typedef") => {
                self.format_typedef(i);
                self.i += 1;
            }
            Some("const") => self.format_const(),
            Some("enum") => self.format_block(BlockShape::Enum),
            Some("struct") | Some("union") | Some("exception") => {
                self.format_block(BlockShape::Struct)
            }
            Some("service") => self.format_block(BlockShape::Service),
            _ => {
                self.out.push(raw.clone());
                self.i += 1;
            }
        }
    }

    /// End line of the block comment opening at `from`, bounded by `limit`.
    fn comment_block_end(&self, from: usize, limit: usize) -> usize {
        let mut j = from;
        while j < limit && self.flags.get(j + 1).copied().unwrap_or(false) {
            j += 1;
        }
        j
    }

    fn consume_comment_block(&mut self, level: usize) {
        let from = self.i;
        let to = self.comment_block_end(from, self.lines.len() - 1);
        if !is_blank_bytes(&self.masked[to]) {
            // the close line carries code; re-indent the pure comment lines
            // and leave the mixed line alone
            if to > from {
                self.emit_comment_lines(from, to - 1, level);
            }
            self.out.push(self.lines[to].clone());
        } else {
            self.emit_comment_lines(from, to, level);
        }
        self.i = to + 1;
    }

    /// Re-indent a `/* … */` block: open and close at the member's indent,
    /// interior `*` lines one column deeper, other content untouched.
    fn emit_comment_lines(&mut self, from: usize, to: usize, level: usize) {
        let ind = self.indent(level);
        for (k, idx) in (from..=to).enumerate() {
            let t = self.lines[idx].trim();
            let line = if k == 0 {
                format!("{ind}{t}")
            } else if t.starts_with("*/") {
                format!("{ind}{t}")
            } else if t.starts_with('*') {
                format!("{ind} {t}")
            } else {
                self.lines[idx].clone()
            };
            self.out.push(line);
        }
    }

    fn format_simple_line(&mut self, i: usize) {
        let (code, comment) = split_line_comment(&self.lines[i]);
        let norm = collapse_spaces(code);
        self.out.push(join_comment(norm, comment));
    }

    fn format_typedef(&mut self, i: usize) {
        let raw = &self.lines[i];
        let (code, comment) = split_line_comment(raw);
        let (code, sep) = strip_sep(code);
        let (base, annotation) = split_trailing_annotation(code);
        let formatted = format_typedef_text(base).map(|mut line| {
            if let Some(anno) = annotation {
                line.push(' ');
                line.push_str(anno);
            }
            if let Some(c) = sep {
                line.push(c);
            }
            join_comment(line, comment)
        });
        match formatted {
            Some(line) => self.out.push(line),
            None => self.out.push(raw.clone()),
        }
    }

    fn format_const(&mut self) {
        let i = self.i;
        let mut last = i;
        let mut balance = bracket_balance(&self.masked[i]);
        while balance > 0 && last + 1 < self.lines.len() {
            last += 1;
            balance += bracket_balance(&self.masked[last]);
        }
        let multiline = last > i;

        let mut joined = String::new();
        let mut interior_comment = false;
        let mut tail_comment: Option<String> = None;
        for j in i..=last {
            let (code, comment) = split_line_comment(&self.lines[j]);
            if let Some(c) = comment {
                if j < last {
                    interior_comment = true;
                } else {
                    tail_comment = Some(c.trim().to_string());
                }
            }
            if !joined.is_empty() {
                joined.push(' ');
            }
            joined.push_str(code.trim());
        }

        let style = self.opts.collection_style;
        let preserve_as_is =
            multiline && (style == CollectionStyle::Preserve || interior_comment);
        let parsed = if preserve_as_is {
            None
        } else {
            parse_const_text(&joined)
        };
        let Some(parts) = parsed else {
            for j in i..=last {
                self.out.push(self.lines[j].clone());
            }
            self.i = last + 1;
            return;
        };

        let ntype = normalize_type(&parts.value_type);
        let value = parts.value.trim().to_string();
        let sep = parts.separator.map(String::from).unwrap_or_default();
        let single = format!("const {} {} = {}{}", ntype, parts.name, value, sep);
        let single = match &tail_comment {
            Some(c) => format!("{single} {c}"),
            None => single,
        };

        let is_collection = value.starts_with('[') || value.starts_with('{');
        let closes = matches!(value.as_bytes().last(), Some(b']') | Some(b'}'));
        let too_long = single.chars().count() > self.opts.max_line_length;
        if style == CollectionStyle::Multiline
            && is_collection
            && closes
            && (multiline || too_long)
        {
            let open = &value[..1];
            let close = &value[value.len() - 1..];
            let inner = &value[1..value.len() - 1];
            self.out
                .push(format!("const {} {} = {}", ntype, parts.name, open));
            let ind = self.indent(1);
            for element in split_top_level_parts(inner) {
                self.out.push(format!("{ind}{element},"));
            }
            let mut close_line = format!("{close}{}", parts.separator.map(String::from).unwrap_or_default());
            if let Some(c) = tail_comment {
                close_line.push(' ');
                close_line.push_str(&c);
            }
            self.out.push(close_line);
        } else {
            self.out.push(single);
        }
        self.i = last + 1;
    }

    fn format_block(&mut self, shape: BlockShape) {
        let i = self.i;
        let (open_line, open_col) = match find_byte(&self.masked[i], b'{') {
            Some(col) => (i, col),
            None => {
                let mut j = i + 1;
                loop {
                    if j >= self.lines.len() {
                        self.out.push(self.lines[i].clone());
                        self.i = i + 1;
                        return;
                    }
                    if self.lines[j].trim().is_empty() {
                        j += 1;
                        continue;
                    }
                    match self.masked[j].iter().position(|&b| b != b' ' && b != b'\t') {
                        Some(col) if self.masked[j][col] == b'{' => break (j, col),
                        _ => {
                            self.out.push(self.lines[i].clone());
                            self.i = i + 1;
                            return;
                        }
                    }
                }
            }
        };
        let (close_line, close_col) = self.find_close(open_line, open_col);

        let header_raw = if open_line == i {
            &self.lines[i][..open_col]
        } else {
            self.lines[i].as_str()
        };
        let header = collapse_spaces(split_line_comment(header_raw).0);
        let after = self.after_close_text(close_line, close_col);

        if open_line == close_line
            && self.lines[open_line][open_col + 1..close_col].trim().is_empty()
        {
            self.out.push(format!("{header} {{}}{after}"));
            self.i = close_line + 1;
            return;
        }

        self.out.push(format!("{header} {{"));
        let segments = member_segments(self.lines, open_line, open_col, close_line, close_col);
        let items = self.collect_items(shape, &segments);
        self.emit_items(items);
        self.out.push(format!("}}{after}"));
        self.i = close_line + 1;
    }

    fn after_close_text(&self, close_line: usize, close_col: usize) -> String {
        let rest = self.lines[close_line].get(close_col + 1..).unwrap_or("");
        let (code, comment) = split_line_comment(rest);
        let code = code.trim();
        let mut s = String::new();
        if code == "," || code == ";" {
            s.push_str(code);
        } else if !code.is_empty() {
            s.push(' ');
            s.push_str(code);
        }
        if let Some(c) = comment {
            s.push(' ');
            s.push_str(c.trim());
        }
        s
    }

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

    fn collect_items(&self, shape: BlockShape, segments: &[(usize, usize, usize)]) -> Vec<Item> {
        let mut items = Vec::new();
        let mut pending = Pending::default();
        let mut k = 0;
        while k < segments.len() {
            let (line, start, end) = segments[k];
            let raw_slice = &self.lines[line][start..end];
            let masked_slice = &self.masked[line][start..end];
            let (code, comment) = split_line_comment(raw_slice);

            if pending.is_empty() {
                if raw_slice.trim().is_empty() {
                    items.push(Item::Blank);
                    k += 1;
                    continue;
                }
                if is_blank_bytes(masked_slice) {
                    let t = raw_slice.trim_start();
                    if t.starts_with("/*") && start == 0 && !self.flags[line] {
                        let limit = segments.last().map(|s| s.0).unwrap_or(line);
                        let to = self.comment_block_end(line, limit);
                        if is_blank_bytes(&self.masked[to]) {
                            items.push(Item::CommentBlock { from: line, to });
                            while k < segments.len() && segments[k].0 <= to {
                                k += 1;
                            }
                            continue;
                        }
                    }
                    if t.starts_with("//") || t.starts_with('#') {
                        items.push(Item::Comment(t.trim_end().to_string()));
                        k += 1;
                        continue;
                    }
                    items.push(Item::Raw(vec![raw_slice.to_string()]));
                    k += 1;
                    continue;
                }
            } else if raw_slice.trim().is_empty() {
                k += 1;
                continue;
            }

            if let Some(c) = comment {
                if pending.comment.is_some() {
                    pending.interior_comment = true;
                }
                pending.comment = Some(c.trim().to_string());
            } else if pending.comment.is_some() {
                pending.interior_comment = true;
            }
            pending.push_code(code, raw_slice);
            pending.balance += match shape {
                BlockShape::Service => paren_balance(code),
                _ => bracket_balance(&self.masked[line][start..start + code.len()]),
            };
            if pending.balance > 0 {
                k += 1;
                continue;
            }

            if shape == BlockShape::Service {
                let next_code = segments[k + 1..]
                    .iter()
                    .map(|(l, s, e)| split_line_comment(&self.lines[*l][*s..*e]).0.trim())
                    .find(|c| !c.is_empty());
                if !pending.text.contains('(') {
                    if next_code.is_some_and(|c| c.starts_with('(')) {
                        k += 1;
                        continue;
                    }
                    items.push(Item::Raw(std::mem::take(&mut pending).raw_lines));
                    k += 1;
                    continue;
                }
                if next_code.is_some_and(|c| c.starts_with("throws"))
                    && !pending.text.contains("throws")
                {
                    k += 1;
                    continue;
                }
            }

            let unit = std::mem::take(&mut pending);
            self.flush_unit(shape, unit, &mut items);
            k += 1;
        }
        if !pending.is_empty() {
            let unit = std::mem::take(&mut pending);
            self.flush_unit(shape, unit, &mut items);
        }
        items
    }

    fn flush_unit(&self, shape: BlockShape, unit: Pending, items: &mut Vec<Item>) {
        if unit.interior_comment {
            items.push(Item::Raw(unit.raw_lines));
            return;
        }
        match shape {
            BlockShape::Service => {
                if let Some(parts) = parse_function_text(&unit.text) {
                    let had_sep = parts.separator.is_some();
                    items.push(Item::Func {
                        parts,
                        had_sep,
                        comment: unit.comment,
                    });
                    return;
                }
                // several functions on one line, separated by `,` or `;`
                let pieces = split_top_level_functions(&unit.text);
                let parsed: Vec<_> = pieces
                    .iter()
                    .map(|(piece, _)| parse_function_text(piece))
                    .collect();
                if pieces.len() > 1 && parsed.iter().all(Option::is_some) {
                    let count = pieces.len();
                    for (idx, (parts, (_, had_sep))) in
                        parsed.into_iter().flatten().zip(pieces).enumerate()
                    {
                        let last = idx + 1 == count;
                        items.push(Item::Func {
                            parts,
                            had_sep,
                            comment: last.then(|| unit.comment.clone()).flatten(),
                        });
                    }
                } else {
                    items.push(Item::Raw(unit.raw_lines));
                }
            }
            BlockShape::Struct => {
                let text_had_comma = unit.text.trim_end().ends_with(',');
                let parts_texts = split_top_level_parts(&unit.text);
                let mut parsed = Vec::with_capacity(parts_texts.len());
                for part in &parts_texts {
                    if !is_struct_field_text(part) {
                        items.push(Item::Raw(unit.raw_lines));
                        return;
                    }
                    match parse_struct_field_text(part) {
                        Some(p) => parsed.push(p),
                        None => {
                            items.push(Item::Raw(unit.raw_lines));
                            return;
                        }
                    }
                }
                let count = parsed.len();
                for (idx, parts) in parsed.into_iter().enumerate() {
                    let last = idx + 1 == count;
                    let had_sep =
                        !last || parts.separator.is_some() || text_had_comma;
                    items.push(Item::StructRow {
                        parts,
                        had_sep,
                        comment: last.then(|| unit.comment.clone()).flatten(),
                    });
                }
            }
            BlockShape::Enum => {
                let text_had_comma = unit.text.trim_end().ends_with(',');
                let parts_texts = split_top_level_parts(&unit.text);
                let mut parsed = Vec::with_capacity(parts_texts.len());
                for part in &parts_texts {
                    if !is_enum_member_text(part) {
                        items.push(Item::Raw(unit.raw_lines));
                        return;
                    }
                    match parse_enum_member_text(part) {
                        Some(p) => parsed.push(p),
                        None => {
                            items.push(Item::Raw(unit.raw_lines));
                            return;
                        }
                    }
                }
                let count = parsed.len();
                for (idx, parts) in parsed.into_iter().enumerate() {
                    let last = idx + 1 == count;
                    let had_sep =
                        !last || parts.separator.is_some() || text_had_comma;
                    items.push(Item::EnumRow {
                        parts,
                        had_sep,
                        comment: last.then(|| unit.comment.clone()).flatten(),
                    });
                }
            }
        }
    }

    fn emit_items(&mut self, items: Vec<Item>) {
        let last_member = items.iter().rposition(Item::is_member);

        // group rows between blank lines for alignment
        let mut group_ids = Vec::with_capacity(items.len());
        let mut group = 0usize;
        for item in &items {
            if matches!(item, Item::Blank) {
                group += 1;
            }
            group_ids.push(group);
        }

        // lay out each group's rows
        let mut laid_out: Vec<Option<String>> = vec![None; items.len()];
        for gid in 0..=group {
            let row_indices: Vec<usize> = items
                .iter()
                .enumerate()
                .filter(|(idx, item)| {
                    group_ids[*idx] == gid
                        && matches!(item, Item::StructRow { .. } | Item::EnumRow { .. })
                })
                .map(|(idx, _)| idx)
                .collect();
            if row_indices.is_empty() {
                continue;
            }
            let rows: Vec<Vec<String>> = row_indices
                .iter()
                .map(|&idx| self.row_cells(&items[idx], Some(idx) == last_member))
                .collect();
            let flags = match &items[row_indices[0]] {
                Item::EnumRow { .. } => [
                    false,
                    self.opts.align_enum_equals || self.opts.align_enum_names,
                    self.opts.align_enum_values,
                    self.opts.align_annotations,
                    self.opts.align_comments,
                ]
                .to_vec(),
                _ => [
                    false,
                    self.opts.align_types,
                    self.opts.align_field_names,
                    self.opts.align_struct_defaults,
                    self.opts.align_annotations,
                    self.opts.align_comments,
                ]
                .to_vec(),
            };
            for (idx, line) in row_indices.iter().zip(layout_rows(&rows, &flags)) {
                laid_out[*idx] = Some(line);
            }
        }

        let ind = self.indent(1);
        for (idx, item) in items.iter().enumerate() {
            match item {
                Item::Blank => self.out.push(String::new()),
                Item::Comment(text) => self.out.push(format!("{ind}{text}")),
                Item::CommentBlock { from, to } => self.emit_comment_lines(*from, *to, 1),
                Item::StructRow { .. } | Item::EnumRow { .. } => {
                    if let Some(line) = &laid_out[idx] {
                        self.out.push(format!("{ind}{line}"));
                    }
                }
                Item::Func {
                    parts,
                    had_sep,
                    comment,
                } => {
                    let sep = self.separator_for(Some(idx) == last_member, *had_sep);
                    self.emit_function(parts, &sep, comment.as_deref());
                }
                Item::Raw(lines) => {
                    for line in lines {
                        self.out.push(line.clone());
                    }
                }
            }
        }
    }

    fn row_cells(&self, item: &Item, is_last: bool) -> Vec<String> {
        match item {
            Item::StructRow {
                parts,
                had_sep,
                comment,
            } => {
                let mut c0 = match parts.id {
                    Some(id) => format!("{id}:"),
                    None => String::new(),
                };
                if let Some(req) = &parts.requiredness {
                    if !c0.is_empty() {
                        c0.push(' ');
                    }
                    c0.push_str(req);
                }
                let mut cells = vec![
                    c0,
                    normalize_type(&parts.field_type),
                    parts.name.clone(),
                    parts
                        .default_value
                        .as_deref()
                        .map(|v| format!("= {v}"))
                        .unwrap_or_default(),
                    parts.annotation.clone().unwrap_or_default(),
                ];
                append_separator(&mut cells, &self.separator_for(is_last, *had_sep));
                cells.push(comment.clone().unwrap_or_default());
                cells
            }
            Item::EnumRow {
                parts,
                had_sep,
                comment,
            } => {
                let (eq, value) = match &parts.initializer {
                    Some(v) => ("=".to_string(), v.clone()),
                    None => (String::new(), String::new()),
                };
                let mut cells = vec![
                    parts.name.clone(),
                    eq,
                    value,
                    parts.annotation.clone().unwrap_or_default(),
                ];
                append_separator(&mut cells, &self.separator_for(is_last, *had_sep));
                cells.push(comment.clone().unwrap_or_default());
                cells
            }
            _ => Vec::new(),
        }
    }

    fn separator_for(&self, is_last: bool, had_sep: bool) -> String {
        if !is_last {
            return if had_sep { ",".to_string() } else { String::new() };
        }
        match self.opts.trailing_comma {
            TrailingComma::Preserve => {
                if had_sep {
                    ",".to_string()
                } else {
                    String::new()
                }
            }
            TrailingComma::Add => ",".to_string(),
            TrailingComma::Remove => String::new(),
        }
    }

    fn emit_function(&mut self, parts: &FunctionParts, sep: &str, comment: Option<&str>) {
        let args: Vec<String> = split_top_level_parts(&parts.args_text)
            .iter()
            .map(|p| format_field_like(p))
            .collect();
        let throws = match parts.throws_text.as_deref() {
            Some(t) => {
                let exs: Vec<String> = split_top_level_parts(t)
                    .iter()
                    .map(|p| format_field_like(p))
                    .collect();
                format!(" throws ({})", exs.join(", "))
            }
            None => String::new(),
        };
        let anno = parts
            .annotation
            .as_deref()
            .map(|a| format!(" {a}"))
            .unwrap_or_default();
        let mut head = String::new();
        if parts.oneway {
            head.push_str("oneway ");
        }
        head.push_str(&normalize_type(&parts.return_type));
        head.push(' ');
        head.push_str(&parts.name);

        let ind = self.indent(1);
        let mut single = format!("{ind}{head}({}){throws}{anno}{sep}", args.join(", "));
        if let Some(c) = comment {
            single.push(' ');
            single.push_str(c);
        }
        if single.chars().count() <= self.opts.max_line_length || args.is_empty() {
            self.out.push(single);
            return;
        }

        let inner = self.indent(2);
        self.out.push(format!("{ind}{head}("));
        let count = args.len();
        for (k, arg) in args.into_iter().enumerate() {
            let comma = if k + 1 < count { "," } else { "" };
            self.out.push(format!("{inner}{arg}{comma}"));
        }
        let mut close = format!("{ind}){throws}{anno}{sep}");
        if let Some(c) = comment {
            close.push(' ');
            close.push_str(c);
        }
        self.out.push(close);
    }
}

/// In-progress member unit spanning one or more physical lines.
#[derive(Default)]
struct Pending {
    text: String,
    raw_lines: Vec<String>,
    balance: i32,
    comment: Option<String>,
    interior_comment: bool,
}

impl Pending {
    fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    fn push_code(&mut self, code: &str, raw: &str) {
        if !self.text.is_empty() {
            self.text.push(' ');
        }
        self.text.push_str(code.trim());
        self.raw_lines.push(raw.to_string());
    }
}

/// Append the member separator to the last non-empty content cell so it
/// hugs the text (`id,` not `id ,`).
fn append_separator(cells: &mut [String], sep: &str) {
    if sep.is_empty() {
        return;
    }
    if let Some(cell) = cells.iter_mut().rev().find(|c| !c.is_empty()) {
        cell.push_str(sep);
    }
}

/// Split a run of function declarations on top-level `,`/`;` boundaries.
/// Each piece reports whether a separator followed it (the last piece
/// checks the text's own trailing separator).
fn split_top_level_functions(text: &str) -> Vec<(String, bool)> {
    let bytes = text.as_bytes();
    let mut pieces = Vec::new();
    let mut in_str: Option<u8> = None;
    let mut escaped = false;
    let mut depth: i32 = 0;
    let mut part_start = 0;
    for (i, &b) in bytes.iter().enumerate() {
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
            b'<' | b'(' | b'[' | b'{' => depth += 1,
            b'>' | b')' | b']' | b'}' => depth = (depth - 1).max(0),
            b',' | b';' if depth == 0 => {
                let piece = text[part_start..i].trim();
                if !piece.is_empty() {
                    pieces.push((piece.to_string(), true));
                }
                part_start = i + 1;
            }
            _ => {}
        }
    }
    let tail = text[part_start..].trim();
    if !tail.is_empty() {
        pieces.push((tail.to_string(), false));
    }
    pieces
}

/// Canonical text for one argument/throws entry; falls back to collapsed
/// source text when the entry does not parse.
fn format_field_like(part: &str) -> String {
    let Some(p) = parse_argument_text(part) else {
        return collapse_spaces(part);
    };
    let mut s = String::new();
    if let Some(id) = p.id {
        s.push_str(&format!("{id}: "));
    }
    if let Some(req) = &p.requiredness {
        s.push_str(req);
        s.push(' ');
    }
    s.push_str(&normalize_type(&p.field_type));
    s.push(' ');
    s.push_str(&p.name);
    if let Some(v) = &p.default_value {
        s.push_str(" = ");
        s.push_str(v);
    }
    if let Some(a) = &p.annotation {
        s.push(' ');
        s.push_str(a);
    }
    s
}

fn format_typedef_text(base: &str) -> Option<String> {
    let b = base.trim_end();
    let i = crate::text::skip_ws(b, 0);
    let kw_end = crate::text::ident_end(b, i, false)?;
    if &b[i..kw_end] != "typedef" {
        return None;
    }
    let p = crate::text::skip_ws(b, kw_end);
    let type_span = crate::text::parse_type_at(b, p)?;
    let np = crate::text::skip_ws(b, type_span.end);
    let ne = crate::text::ident_end(b, np, false)?;
    if !b[ne..].trim().is_empty() {
        return None;
    }
    Some(format!(
        "typedef {} {}",
        normalize_type(type_span.slice(b)),
        &b[np..ne]
    ))
}

fn join_comment(base: String, comment: Option<&str>) -> String {
    match comment {
        Some(c) if base.is_empty() => c.trim().to_string(),
        Some(c) => format!("{} {}", base, c.trim()),
        None => base,
    }
}

/// Collapse whitespace runs outside string literals to single spaces.
fn collapse_spaces(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_str: Option<char> = None;
    let mut escaped = false;
    for ch in s.trim().chars() {
        if let Some(q) = in_str {
            out.push(ch);
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == q {
                in_str = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' => {
                in_str = Some(ch);
                out.push(ch);
            }
            ' ' | '\t' => {
                if !out.ends_with(' ') && !out.is_empty() {
                    out.push(' ');
                }
            }
            _ => out.push(ch),
        }
    }
    out.trim_end().to_string()
}

fn strip_sep(code: &str) -> (&str, Option<char>) {
    let t = code.trim_end();
    match t.as_bytes().last() {
        Some(&b) if b == b',' || b == b';' => (t[..t.len() - 1].trim_end(), Some(b as char)),
        _ => (t, None),
    }
}

fn is_blank_bytes(masked: &[u8]) -> bool {
    masked.iter().all(|&b| b == b' ' || b == b'\t')
}

fn first_word_of(masked: &[u8], raw: &str) -> Option<String> {
    let start = masked.iter().position(|&b| b != b' ' && b != b'\t')?;
    let b = masked[start];
    if !(b.is_ascii_alphabetic() || b == b'_') {
        return None;
    }
    let mut end = start + 1;
    while end < masked.len() && (masked[end].is_ascii_alphanumeric() || masked[end] == b'_') {
        end += 1;
    }
    Some(raw[start..end].to_string())
}

fn find_byte(masked: &[u8], target: u8) -> Option<usize> {
    masked.iter().position(|&b| b == target)
}

fn member_segments(
    lines: &[String],
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
    // partial first/last segments carry no blank-line meaning; keep them
    // only when they have content
    if !lines[open_line][open_col + 1..].trim().is_empty() {
        segments.push((open_line, open_col + 1, lines[open_line].len()));
    }
    for j in open_line + 1..close_line {
        segments.push((j, 0, lines[j].len()));
    }
    if !lines[close_line][..close_col].trim().is_empty() {
        segments.push((close_line, 0, close_col));
    }
    segments
}

fn bracket_balance(masked: &[u8]) -> i32 {
    let mut depth = 0;
    for &b in masked {
        match b {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth -= 1,
            _ => {}
        }
    }
    depth
}

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
