//! Field/value text parsers and normalization helpers
//!
//! Stateless pure functions that recognize and decompose one logical
//! declaration (struct field, enum member, const, service function) into
//! structured pieces, plus the text-normalization helpers the formatter
//! uses. Every parser returns `None` instead of failing: malformed text is
//! the caller's problem to pass through unchanged.
//!
//! All spans are byte offsets into the input text, so the structural parser
//! can map them onto document positions.

/// Byte span into a parsed text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.end]
    }
}

/// Split a line into its code part and trailing line comment.
///
/// The comment delimiter (`//` or `#`) is only recognized outside string
/// literals.
pub fn split_line_comment(text: &str) -> (&str, Option<&str>) {
    let bytes = text.as_bytes();
    let mut in_str: Option<u8> = None;
    let mut escaped = false;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if let Some(q) = in_str {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == q {
                in_str = None;
            }
            i += 1;
            continue;
        }
        match b {
            b'"' | b'\'' => {
                in_str = Some(b);
                i += 1;
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                return (&text[..i], Some(&text[i..]));
            }
            b'#' => {
                return (&text[..i], Some(&text[i..]));
            }
            _ => i += 1,
        }
    }
    (text, None)
}

/// Split a trailing parenthesized annotation group off `text`.
///
/// The group counts as an annotation only if it is balanced, sits at the
/// very end of the text, and its parentheses are not inside a string
/// literal. Returns the base with trailing whitespace trimmed.
pub fn split_trailing_annotation(text: &str) -> (&str, Option<&str>) {
    let t = text.trim_end();
    if !t.ends_with(')') {
        return (text, None);
    }
    let bytes = t.as_bytes();
    let mut in_str: Option<u8> = None;
    let mut escaped = false;
    let mut stack: Vec<usize> = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if let Some(q) = in_str {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == q {
                in_str = None;
            }
            i += 1;
            continue;
        }
        match b {
            b'"' | b'\'' => in_str = Some(b),
            b'(' => stack.push(i),
            b')' => {
                let Some(open) = stack.pop() else {
                    return (text, None);
                };
                if stack.is_empty() && i == t.len() - 1 {
                    let base = t[..open].trim_end();
                    return (base, Some(&t[open..]));
                }
            }
            _ => {}
        }
        i += 1;
    }
    (text, None)
}

/// Remove whitespace around `<`, `>` and `,` in a generic type expression,
/// to arbitrary nesting depth: `map < string , i32 >` → `map<string,i32>`.
pub fn normalize_type(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b == b' ' || b == b'\t' {
            let j = skip_ws(text, i);
            let prev = out.as_bytes().last().copied();
            let next = bytes.get(j).copied();
            if let (Some(p), Some(n)) = (prev, next) {
                if !matches!(p, b'<' | b'>' | b',') && !matches!(n, b'<' | b'>' | b',') {
                    out.push(' ');
                }
            }
            i = j;
        } else {
            let ch = text[i..].chars().next().unwrap_or(' ');
            out.push(ch);
            i += ch.len_utf8().max(1);
        }
    }
    out
}

/// Split on commas that are not nested inside `<…>`, `(…)`, `[…]`, `{…}`
/// or a string literal. Parts are trimmed; empty parts are dropped.
pub fn split_top_level_parts(text: &str) -> Vec<String> {
    split_top_level_parts_indexed(text)
        .into_iter()
        .map(|(_, part)| part.to_string())
        .collect()
}

/// Like [`split_top_level_parts`], but each part carries the byte offset of
/// its first character in `text`, for range computation.
pub fn split_top_level_parts_indexed(text: &str) -> Vec<(usize, &str)> {
    let bytes = text.as_bytes();
    let mut parts = Vec::new();
    let mut in_str: Option<u8> = None;
    let mut escaped = false;
    let mut depth: i32 = 0;
    let mut part_start = 0;
    let mut i = 0;

    fn push<'a>(parts: &mut Vec<(usize, &'a str)>, text: &'a str, start: usize, end: usize) {
        let raw = &text[start..end];
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            let lead = raw.len() - raw.trim_start().len();
            parts.push((start + lead, trimmed));
        }
    }

    while i < bytes.len() {
        let b = bytes[i];
        if let Some(q) = in_str {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == q {
                in_str = None;
            }
            i += 1;
            continue;
        }
        match b {
            b'"' | b'\'' => in_str = Some(b),
            b'<' | b'(' | b'[' | b'{' => depth += 1,
            b'>' | b')' | b']' | b'}' => depth = (depth - 1).max(0),
            b',' if depth == 0 => {
                push(&mut parts, text, part_start, i);
                part_start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    push(&mut parts, text, part_start, bytes.len());
    parts
}

/// Mask one line for structural scanning: bytes inside strings and comments
/// become spaces, so brace/keyword scanners over the result are trivially
/// inert to them. Offsets into the mask equal byte offsets into the line.
/// `in_block_comment` persists across lines and closes on an inline `*/`.
pub(crate) fn mask_line(line: &str, in_block_comment: &mut bool) -> Vec<u8> {
    let bytes = line.as_bytes();
    let mut out = vec![b' '; bytes.len()];
    let mut in_str: Option<u8> = None;
    let mut escaped = false;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if *in_block_comment {
            if b == b'*' && bytes.get(i + 1) == Some(&b'/') {
                *in_block_comment = false;
                i += 2;
            } else {
                i += 1;
            }
            continue;
        }
        if let Some(q) = in_str {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == q {
                in_str = None;
            }
            i += 1;
            continue;
        }
        match b {
            b'"' | b'\'' => {
                in_str = Some(b);
                i += 1;
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => break,
            b'#' => break,
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                *in_block_comment = true;
                i += 2;
            }
            _ => {
                out[i] = b;
                i += 1;
            }
        }
    }
    out
}

/// Skip spaces, tabs and newlines. Newlines only occur in member text
/// joined across physical lines (multi-line signatures, const values).
pub(crate) fn skip_ws(s: &str, mut i: usize) -> usize {
    let bytes = s.as_bytes();
    while i < bytes.len()
        && matches!(bytes[i], b' ' | b'\t' | b'\n' | b'\r')
    {
        i += 1;
    }
    i
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_byte(b: u8, allow_dots: bool) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || (allow_dots && b == b'.')
}

/// End offset of an identifier starting at `i`, or `None`.
pub(crate) fn ident_end(s: &str, i: usize, allow_dots: bool) -> Option<usize> {
    let bytes = s.as_bytes();
    if !bytes.get(i).copied().is_some_and(is_ident_start) {
        return None;
    }
    let mut e = i + 1;
    while e < bytes.len() && is_ident_byte(bytes[e], allow_dots) {
        e += 1;
    }
    Some(e)
}

/// End offset of an integer (optional leading `-`) starting at `i`.
fn digits_end(s: &str, i: usize) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut e = i;
    if bytes.get(e) == Some(&b'-') {
        e += 1;
    }
    let first_digit = e;
    while e < bytes.len() && bytes[e].is_ascii_digit() {
        e += 1;
    }
    (e > first_digit).then_some(e)
}

/// Span of a type expression starting at `i`: an identifier (dots allowed)
/// optionally followed by a balanced `<…>` group, whitespace tolerated.
pub(crate) fn parse_type_at(s: &str, i: usize) -> Option<Span> {
    let e = ident_end(s, i, true)?;
    let j = skip_ws(s, e);
    let bytes = s.as_bytes();
    if bytes.get(j) != Some(&b'<') {
        return Some(Span::new(i, e));
    }
    let mut depth = 1;
    let mut k = j + 1;
    while k < bytes.len() {
        match bytes[k] {
            b'<' => depth += 1,
            b'>' => {
                depth -= 1;
                if depth == 0 {
                    return Some(Span::new(i, k + 1));
                }
            }
            _ => {}
        }
        k += 1;
    }
    None
}

/// Matching close paren for the `(` at `open`, string-aware.
fn find_matching_paren(s: &str, open: usize) -> Option<usize> {
    let bytes = s.as_bytes();
    debug_assert_eq!(bytes.get(open), Some(&b'('));
    let mut in_str: Option<u8> = None;
    let mut escaped = false;
    let mut depth = 0;
    let mut i = open;
    while i < bytes.len() {
        let b = bytes[i];
        if let Some(q) = in_str {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == q {
                in_str = None;
            }
            i += 1;
            continue;
        }
        match b {
            b'"' | b'\'' => in_str = Some(b),
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Strip one trailing `,` or `;` separator (after trailing whitespace).
fn strip_separator(t: &str) -> (&str, Option<char>) {
    let t = t.trim_end();
    match t.as_bytes().last() {
        Some(&b) if b == b',' || b == b';' => (t[..t.len() - 1].trim_end(), Some(b as char)),
        _ => (t, None),
    }
}

/// Decomposed struct field or function argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldParts {
    pub id: Option<i64>,
    pub id_span: Option<Span>,
    pub requiredness: Option<String>,
    pub field_type: String,
    pub type_span: Span,
    pub name: String,
    pub name_span: Span,
    pub default_value: Option<String>,
    pub default_span: Option<Span>,
    pub annotation: Option<String>,
    pub separator: Option<char>,
    pub comment: Option<String>,
}

/// Decompose `id: [requiredness] type name [= default] [(anno)] [,|;] [// c]`.
/// Returns `None` when the text does not match that shape; never panics.
pub fn parse_struct_field_text(text: &str) -> Option<FieldParts> {
    parse_field_core(text, true)
}

/// Like [`parse_struct_field_text`] but the field id is optional, as in
/// function argument and throws lists.
pub fn parse_argument_text(text: &str) -> Option<FieldParts> {
    parse_field_core(text, false)
}

fn parse_field_core(text: &str, id_required: bool) -> Option<FieldParts> {
    let (code, comment) = split_line_comment(text);
    let comment = comment.map(|c| c.trim_end().to_string());
    let (code, separator) = strip_separator(code);
    let (base, annotation) = split_trailing_annotation(code);
    let annotation = annotation.map(str::to_string);

    let b = base;
    let mut i = skip_ws(b, 0);

    let mut id = None;
    let mut id_span = None;
    if let Some(e) = digits_end(b, i) {
        let j = skip_ws(b, e);
        if b.as_bytes().get(j) == Some(&b':') {
            id = b[i..e].parse::<i64>().ok();
            id.as_ref()?;
            id_span = Some(Span::new(i, e));
            i = skip_ws(b, j + 1);
        } else {
            return None;
        }
    } else if id_required {
        return None;
    }

    let mut requiredness = None;
    if let Some(e) = ident_end(b, i, false) {
        let word = &b[i..e];
        if word == "required" || word == "optional" {
            requiredness = Some(word.to_string());
            i = skip_ws(b, e);
        }
    }

    let type_span = parse_type_at(b, i)?;
    let field_type = type_span.slice(b).to_string();
    i = skip_ws(b, type_span.end);

    let name_end = ident_end(b, i, false)?;
    let name = b[i..name_end].to_string();
    let name_span = Span::new(i, name_end);
    i = skip_ws(b, name_end);

    let (default_value, default_span) = if b.as_bytes().get(i) == Some(&b'=') {
        let vs = skip_ws(b, i + 1);
        let ve = b.len();
        if vs >= ve {
            return None;
        }
        (Some(b[vs..ve].to_string()), Some(Span::new(vs, ve)))
    } else {
        if i < b.len() {
            return None;
        }
        (None, None)
    };

    Some(FieldParts {
        id,
        id_span,
        requiredness,
        field_type,
        type_span,
        name,
        name_span,
        default_value,
        default_span,
        annotation,
        separator,
        comment,
    })
}

/// Decomposed enum member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumMemberParts {
    pub name: String,
    pub name_span: Span,
    pub initializer: Option<String>,
    pub initializer_span: Option<Span>,
    pub annotation: Option<String>,
    pub separator: Option<char>,
    pub comment: Option<String>,
}

/// Decompose `Name [= value] [(anno)] [,|;] [// c]`.
pub fn parse_enum_member_text(text: &str) -> Option<EnumMemberParts> {
    let (code, comment) = split_line_comment(text);
    let comment = comment.map(|c| c.trim_end().to_string());
    let (code, separator) = strip_separator(code);
    let (base, annotation) = split_trailing_annotation(code);
    let annotation = annotation.map(str::to_string);

    let b = base;
    let i = skip_ws(b, 0);
    let name_end = ident_end(b, i, false)?;
    let name = b[i..name_end].to_string();
    let name_span = Span::new(i, name_end);
    let mut j = skip_ws(b, name_end);

    let (initializer, initializer_span) = if b.as_bytes().get(j) == Some(&b'=') {
        j = skip_ws(b, j + 1);
        let ve = b.len();
        if j >= ve {
            return None;
        }
        (Some(b[j..ve].to_string()), Some(Span::new(j, ve)))
    } else {
        if j < b.len() {
            return None;
        }
        (None, None)
    };

    Some(EnumMemberParts {
        name,
        name_span,
        initializer,
        initializer_span,
        annotation,
        separator,
        comment,
    })
}

/// Decomposed const declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstParts {
    pub value_type: String,
    pub type_span: Span,
    pub name: String,
    pub name_span: Span,
    pub value: String,
    pub value_span: Span,
    pub separator: Option<char>,
    pub comment: Option<String>,
}

/// Decompose `const type name = value [,|;] [// c]`. The value text is
/// taken verbatim through to the end of the code part, so collection and
/// string values keep their internal structure.
pub fn parse_const_text(text: &str) -> Option<ConstParts> {
    let (code, comment) = split_line_comment(text);
    let comment = comment.map(|c| c.trim_end().to_string());
    let (b, separator) = strip_separator(code);

    let mut i = skip_ws(b, 0);
    let kw_end = ident_end(b, i, false)?;
    if &b[i..kw_end] != "const" {
        return None;
    }
    i = skip_ws(b, kw_end);

    let type_span = parse_type_at(b, i)?;
    let value_type = type_span.slice(b).to_string();
    i = skip_ws(b, type_span.end);

    let name_end = ident_end(b, i, false)?;
    let name = b[i..name_end].to_string();
    let name_span = Span::new(i, name_end);
    i = skip_ws(b, name_end);

    if b.as_bytes().get(i) != Some(&b'=') {
        return None;
    }
    let vs = skip_ws(b, i + 1);
    if vs >= b.len() {
        return None;
    }
    let value_span = Span::new(vs, b.len());

    Some(ConstParts {
        value_type,
        type_span,
        name,
        name_span,
        value: value_span.slice(b).to_string(),
        value_span,
        separator,
        comment,
    })
}

/// Decomposed service function signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionParts {
    pub oneway: bool,
    pub return_type: String,
    pub return_type_span: Span,
    pub name: String,
    pub name_span: Span,
    /// Text between the argument parens, and its span.
    pub args_text: String,
    pub args_span: Span,
    pub throws_text: Option<String>,
    pub throws_span: Option<Span>,
    pub annotation: Option<String>,
    pub separator: Option<char>,
    pub comment: Option<String>,
    /// Offset just past the closing paren of `throws` (or of the argument
    /// list when there is no throws clause).
    pub signature_end: usize,
}

/// Decompose `[oneway] type name(args) [throws (exs)] [(anno)] [,|;] [// c]`.
/// Parses left to right so the argument and throws groups are never
/// mistaken for a trailing annotation.
pub fn parse_function_text(text: &str) -> Option<FunctionParts> {
    let (code, comment) = split_line_comment(text);
    let comment = comment.map(|c| c.trim_end().to_string());
    let (b, separator) = strip_separator(code);

    let mut i = skip_ws(b, 0);
    let mut oneway = false;
    if let Some(e) = ident_end(b, i, false) {
        if &b[i..e] == "oneway" {
            oneway = true;
            i = skip_ws(b, e);
        }
    }

    let return_type_span = parse_type_at(b, i)?;
    let return_type = return_type_span.slice(b).to_string();
    i = skip_ws(b, return_type_span.end);

    let name_end = ident_end(b, i, false)?;
    let name = b[i..name_end].to_string();
    let name_span = Span::new(i, name_end);
    i = skip_ws(b, name_end);

    if b.as_bytes().get(i) != Some(&b'(') {
        return None;
    }
    let args_close = find_matching_paren(b, i)?;
    let args_span = Span::new(i + 1, args_close);
    let args_text = args_span.slice(b).to_string();
    let mut signature_end = args_close + 1;
    i = skip_ws(b, signature_end);

    let mut throws_text = None;
    let mut throws_span = None;
    if let Some(e) = ident_end(b, i, false) {
        if &b[i..e] == "throws" {
            let open = skip_ws(b, e);
            if b.as_bytes().get(open) != Some(&b'(') {
                return None;
            }
            let close = find_matching_paren(b, open)?;
            let span = Span::new(open + 1, close);
            throws_text = Some(span.slice(b).to_string());
            throws_span = Some(span);
            signature_end = close + 1;
            i = skip_ws(b, signature_end);
        }
    }

    let mut annotation = None;
    if b.as_bytes().get(i) == Some(&b'(') {
        let close = find_matching_paren(b, i)?;
        if b[close + 1..].trim().is_empty() {
            annotation = Some(b[i..close + 1].to_string());
            i = b.len();
        } else {
            return None;
        }
    }
    if i < b.len() && !b[i..].trim().is_empty() {
        return None;
    }

    Some(FunctionParts {
        oneway,
        return_type,
        return_type_span,
        name,
        name_span,
        args_text,
        args_span,
        throws_text,
        throws_span,
        annotation,
        separator,
        comment,
        signature_end,
    })
}

/// Fast pre-check: does this look like a struct field (`id:` prefix)?
pub fn is_struct_field_text(text: &str) -> bool {
    let t = text.trim_start();
    let Some(e) = digits_end(t, 0) else {
        return false;
    };
    t.as_bytes().get(skip_ws(t, e)) == Some(&b':')
}

/// Fast pre-check: does this look like an enum member line?
pub fn is_enum_member_text(text: &str) -> bool {
    let t = text.trim_start();
    let Some(e) = ident_end(t, 0, false) else {
        return false;
    };
    let rest = t[e..].trim_start();
    rest.is_empty()
        || rest.starts_with('=')
        || rest.starts_with(',')
        || rest.starts_with(';')
        || rest.starts_with('(')
        || rest.starts_with("//")
        || rest.starts_with('#')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_split_respects_strings() {
        let (code, comment) = split_line_comment("1: string url = \"http://x\" // real");
        assert_eq!(code, "1: string url = \"http://x\" ");
        assert_eq!(comment, Some("// real"));
        let (code, comment) = split_line_comment("name # note");
        assert_eq!(code, "name ");
        assert_eq!(comment, Some("# note"));
        assert_eq!(split_line_comment("plain").1, None);
    }

    #[test]
    fn trailing_annotation_must_be_balanced_and_last() {
        let (base, anno) = split_trailing_annotation("1: i32 id (go.tag=\"x\")");
        assert_eq!(base, "1: i32 id");
        assert_eq!(anno, Some("(go.tag=\"x\")"));
        // paren inside string is inert
        let (base, anno) = split_trailing_annotation("x = \"a)\"");
        assert_eq!(base, "x = \"a)\"");
        assert_eq!(anno, None);
        // unbalanced
        assert_eq!(split_trailing_annotation("f(a))").1, None);
    }

    #[test]
    fn normalizes_generics_recursively() {
        assert_eq!(normalize_type("map < string , i32 >"), "map<string,i32>");
        assert_eq!(
            normalize_type("map<string, list< map < i32 , string > > >"),
            "map<string,list<map<i32,string>>>"
        );
        assert_eq!(normalize_type("  i32  "), "i32");
    }

    #[test]
    fn top_level_split_respects_nesting_and_strings() {
        assert_eq!(
            split_top_level_parts("1: map<i32, string> m = {1: \"a,b\"}, 2: i32 n"),
            vec!["1: map<i32, string> m = {1: \"a,b\"}", "2: i32 n"]
        );
        assert_eq!(split_top_level_parts("a, , b,"), vec!["a", "b"]);
        let indexed = split_top_level_parts_indexed(" x , y ");
        assert_eq!(indexed, vec![(1, "x"), (5, "y")]);
    }

    #[test]
    fn parses_a_full_struct_field() {
        let parts =
            parse_struct_field_text("1: optional list<i32> ids = [1, 2] (anno=\"x\"), // c")
                .unwrap();
        assert_eq!(parts.id, Some(1));
        assert_eq!(parts.requiredness.as_deref(), Some("optional"));
        assert_eq!(parts.field_type, "list<i32>");
        assert_eq!(parts.name, "ids");
        assert_eq!(parts.default_value.as_deref(), Some("[1, 2]"));
        assert_eq!(parts.annotation.as_deref(), Some("(anno=\"x\")"));
        assert_eq!(parts.separator, Some(','));
        assert_eq!(parts.comment.as_deref(), Some("// c"));
    }

    #[test]
    fn field_default_span_slices_the_exact_value() {
        let text = "1: optional list<i32> ids = [1, 2] (anno=\"x\")";
        let parts = parse_struct_field_text(text).unwrap();
        let span = parts.default_span.unwrap();
        // span is relative to the annotation-stripped base, which is a
        // prefix of the original text
        assert_eq!(&text[span.start..span.end], "[1, 2]");
    }

    #[test]
    fn field_with_negative_id_and_spaced_generics() {
        let parts = parse_struct_field_text("-1: map < string , i32 > m;").unwrap();
        assert_eq!(parts.id, Some(-1));
        assert_eq!(parts.field_type, "map < string , i32 >");
        assert_eq!(parts.separator, Some(';'));
    }

    #[test]
    fn malformed_field_returns_none() {
        assert!(parse_struct_field_text("not a field").is_none());
        assert!(parse_struct_field_text("1: i32").is_none());
        assert!(parse_struct_field_text("1: i32 x =").is_none());
        assert!(parse_struct_field_text("1: i32 x junk").is_none());
    }

    #[test]
    fn argument_id_is_optional() {
        let parts = parse_argument_text("string name").unwrap();
        assert_eq!(parts.id, None);
        assert_eq!(parts.field_type, "string");
        let parts = parse_argument_text("2: i64 count").unwrap();
        assert_eq!(parts.id, Some(2));
    }

    #[test]
    fn parses_enum_members() {
        let parts = parse_enum_member_text("ACTIVE = 1, // live").unwrap();
        assert_eq!(parts.name, "ACTIVE");
        assert_eq!(parts.initializer.as_deref(), Some("1"));
        assert_eq!(parts.separator, Some(','));
        assert_eq!(parts.comment.as_deref(), Some("// live"));
        let bare = parse_enum_member_text("UNKNOWN").unwrap();
        assert_eq!(bare.initializer, None);
        assert!(parse_enum_member_text("= 3").is_none());
    }

    #[test]
    fn parses_const_with_collection_value() {
        let parts = parse_const_text("const map<string, i32> M = {\"a\": 1},").unwrap();
        assert_eq!(parts.value_type, "map<string, i32>");
        assert_eq!(parts.name, "M");
        assert_eq!(parts.value, "{\"a\": 1}");
        assert_eq!(parts.separator, Some(','));
        assert!(parse_const_text("const i32 X").is_none());
    }

    #[test]
    fn parses_function_signatures() {
        let parts = parse_function_text(
            "User fetch(1: i64 id, 2: bool full) throws (1: NotFound e) (idempotent=\"1\"),",
        )
        .unwrap();
        assert!(!parts.oneway);
        assert_eq!(parts.return_type, "User");
        assert_eq!(parts.name, "fetch");
        assert_eq!(parts.args_text, "1: i64 id, 2: bool full");
        assert_eq!(parts.throws_text.as_deref(), Some("1: NotFound e"));
        assert_eq!(parts.annotation.as_deref(), Some("(idempotent=\"1\")"));
        assert_eq!(parts.separator, Some(','));

        let oneway = parse_function_text("oneway void ping()").unwrap();
        assert!(oneway.oneway);
        assert_eq!(oneway.return_type, "void");
        assert_eq!(oneway.args_text, "");
        // the empty argument list is not mistaken for an annotation
        assert_eq!(oneway.annotation, None);
    }

    #[test]
    fn function_signature_end_covers_throws() {
        let text = "void f() throws (1: E e)";
        let parts = parse_function_text(text).unwrap();
        assert_eq!(parts.signature_end, text.len());
    }

    #[test]
    fn quick_checks() {
        assert!(is_struct_field_text("  12 : i32 x"));
        assert!(is_struct_field_text("-1: i32 x"));
        assert!(!is_struct_field_text("i32 x"));
        assert!(is_enum_member_text("FOO = 1,"));
        assert!(is_enum_member_text("FOO"));
        assert!(!is_enum_member_text("1: i32 x"));
    }

    #[test]
    fn mask_line_tracks_block_comments_across_lines() {
        let mut in_block = false;
        let m1 = mask_line("struct A { /* open", &mut in_block);
        assert!(in_block);
        assert_eq!(&m1[..10], b"struct A {");
        let m2 = mask_line("} not real */ struct B {", &mut in_block);
        assert!(!in_block);
        assert_eq!(String::from_utf8_lossy(&m2).trim_start(), "struct B {");
        // braces inside strings are masked
        let m3 = mask_line("x = \"{}\" {", &mut in_block);
        assert_eq!(m3.iter().filter(|&&b| b == b'{').count(), 1);
    }
}
