//! Core formatting engine
//!
//! Converts arbitrary (and possibly malformed) IDL source text into a
//! canonical textual form under the style rules in
//! [`FormatOptions`](crate::options::FormatOptions). Formatting is
//! deterministic and idempotent: re-formatting formatted output is a
//! no-op. Incremental mode re-formats only the top-level constructs a
//! dirty line range touches and splices them into the surrounding text,
//! falling back to full-document formatting whenever the range cannot be
//! resolved to construct boundaries.
//!
//! # Example
//!
//! ```rust
//! use thriftfmt::formatter::format_source;
//! use thriftfmt::options::FormatOptions;
//!
//! let input = "struct User{1:i32 id,2:string name}\n";
//! let opts = FormatOptions::default();
//! let formatted = format_source(input, &opts);
//! assert!(formatted.contains("struct User {"));
//! assert_eq!(format_source(&formatted, &opts), formatted);
//! ```

mod align;
mod blocks;

use crate::document::Document;
use crate::edits::normalize_formatting_range;
use crate::index::build_ast_index;
use crate::options::FormatOptions;
use crate::parser;
use crate::position::Range;

use blocks::LineWalker;

/// Incremental spans larger than this re-format the whole document; the
/// exact value is tuned, not semantically load-bearing.
pub const MAX_DIRTY_LINES: usize = 200;

/// Output mode for the formatter CLI.
///
/// Determines how formatted content is handled after processing.
#[derive(Clone, Copy, Debug)]
pub enum Mode {
    /// Print formatted code to stdout
    Stdout,
    /// Write formatted code back to source files
    Write,
    /// Check if formatting would change the code (used for CI/validation)
    Check,
}

/// Format a whole document under the given options.
///
/// Never fails on any input: lines the formatter cannot confidently
/// restructure are emitted unchanged. The output always ends with a
/// newline (using the document's dominant line ending) unless it is empty.
pub fn format_source(text: &str, opts: &FormatOptions) -> String {
    if text.is_empty() {
        return String::new();
    }
    let doc = Document::new(text);
    let out = LineWalker::new(doc.lines(), opts).run();
    join_lines(out, &doc)
}

/// Format a document, limiting work to the constructs a dirty line range
/// touches when incremental formatting is enabled.
///
/// Incremental output is byte-identical to [`format_source`] whenever the
/// untouched remainder of the document is already at its formatting fixed
/// point; every unresolvable range falls back to full formatting.
pub fn format_source_range(
    text: &str,
    opts: &FormatOptions,
    dirty_range: Option<&Range>,
) -> String {
    let Some(dirty) = dirty_range else {
        return format_source(text, opts);
    };
    if !opts.incremental_formatting_enabled || text.is_empty() {
        return format_source(text, opts);
    }
    let doc = Document::new(text);
    let normalized = normalize_formatting_range(&doc, dirty);
    if normalized.start.line >= doc.line_count() {
        return format_source(text, opts);
    }
    let span = normalized.end.line - normalized.start.line + 1;
    if span > MAX_DIRTY_LINES {
        tracing::debug!(span, "dirty range over ceiling, formatting full document");
        return format_source(text, opts);
    }

    let ast = parser::parse(text);
    let index = build_ast_index(&ast);
    let Some((start, end)) = index.resolve_dirty_span(normalized.start.line, normalized.end.line)
    else {
        tracing::debug!("dirty range unresolvable, formatting full document");
        return format_source(text, opts);
    };
    let end = end.min(doc.line_count() - 1);

    let formatted = LineWalker::new(&doc.lines()[start..=end], opts).run();
    let mut out: Vec<String> = doc.lines()[..start].to_vec();
    out.extend(formatted);
    out.extend_from_slice(&doc.lines()[end + 1..]);
    join_lines(out, &doc)
}

fn join_lines(lines: Vec<String>, doc: &Document) -> String {
    let ending = doc.line_ending();
    let mut out = lines.join(ending);
    if !out.is_empty() && !out.ends_with('\n') {
        out.push_str(ending);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{CollectionStyle, TrailingComma};
    use crate::position::Range;
    use pretty_assertions::assert_eq;

    fn fmt(src: &str) -> String {
        format_source(src, &FormatOptions::default())
    }

    #[test]
    fn expands_inline_struct_into_field_lines() {
        let out = fmt("struct User{1:i32 id,2:string name,3:list<i32> nums}\n");
        assert_eq!(
            out,
            "struct User {\n    1: i32       id,\n    2: string    name,\n    3: list<i32> nums\n}\n"
        );
    }

    #[test]
    fn formatting_is_idempotent() {
        let inputs = [
            "struct User{1:i32 id,2:string name}\n",
            "enum E { A=1,B = 2, }\n",
            "service Api { void ping(); User fetch(1: i64 id) throws (1: NotFound e), }\n",
            "const map < string , i32 > M = {\"a\": 1}\n",
            "typedef map < string , list< i32 > > Index\n",
            "struct S {\n  /**\n   * doc\n   */\n  1: i32 x\n}\n",
            "junk that is not idl\nstruct S { 1: i32 x }\n",
        ];
        for src in inputs {
            let once = fmt(src);
            let twice = fmt(&once);
            assert_eq!(once, twice, "not idempotent for {src:?}");
        }
    }

    #[test]
    fn generic_spacing_normalizes_everywhere() {
        let out = fmt("typedef map < string , i32 > Counts\n");
        assert_eq!(out, "typedef map<string,i32> Counts\n");
        let out = fmt("struct S { 1: map < string , i32 > m }\n");
        assert!(out.contains("map<string,i32> m"));
    }

    #[test]
    fn empty_inline_body_stays_inline_and_keeps_sibling() {
        let out = fmt("struct EmptyStruct {}\nstruct NextStruct { 1: i32 id }\n");
        assert_eq!(
            out,
            "struct EmptyStruct {}\nstruct NextStruct {\n    1: i32 id\n}\n"
        );
    }

    #[test]
    fn alignment_resets_at_blank_lines() {
        let src = "struct S {\n1: i32 a,\n2: string bb,\n\n3: binary c,\n}\n";
        let out = fmt(src);
        assert_eq!(
            out,
            "struct S {\n    1: i32    a,\n    2: string bb,\n\n    3: binary c,\n}\n"
        );
    }

    #[test]
    fn trailing_comma_policies() {
        let src = "struct S { 1: i32 a, 2: i32 b }\n";
        let add = FormatOptions {
            trailing_comma: TrailingComma::Add,
            ..FormatOptions::default()
        };
        let out = format_source(src, &add);
        assert!(out.contains("b,\n"));
        let remove = FormatOptions {
            trailing_comma: TrailingComma::Remove,
            ..FormatOptions::default()
        };
        let out = format_source("struct S { 1: i32 a, 2: i32 b, }\n", &remove);
        assert!(out.contains("b\n"));
        // preserve keeps the source's choice
        let out = fmt("struct S { 1: i32 a, 2: i32 b, }\n");
        assert!(out.contains("b,\n"));
    }

    #[test]
    fn enum_equals_align() {
        let out = fmt("enum Color { RED = 1, CHARTREUSE = 2 }\n");
        assert_eq!(
            out,
            "enum Color {\n    RED        = 1,\n    CHARTREUSE = 2\n}\n"
        );
    }

    #[test]
    fn doc_comments_reindent_but_keep_content() {
        let src = "struct S {\n      /**\n * The id.\n       */\n  1: i32 id\n}\n";
        let out = fmt(src);
        assert_eq!(
            out,
            "struct S {\n    /**\n     * The id.\n    */\n    1: i32 id\n}\n"
        );
    }

    #[test]
    fn malformed_member_lines_pass_through_unchanged() {
        let src = "struct S {\n  1: i32 good,\n  ?? not a field ??\n}\n";
        let out = fmt(src);
        assert!(out.contains("  ?? not a field ??"));
        assert!(out.contains("1: i32 good,"));
    }

    #[test]
    fn string_braces_do_not_confuse_the_walker() {
        let src = "struct T { 1: string tmpl = \"{{value}\", }\nstruct Next { 1: i32 id }\n";
        let out = fmt(src);
        assert!(out.contains("struct T {"));
        assert!(out.contains("struct Next {"));
        assert_eq!(out.matches("}\n").count(), 2);
    }

    #[test]
    fn long_function_signatures_break_one_arg_per_line() {
        let opts = FormatOptions {
            max_line_length: 40,
            ..FormatOptions::default()
        };
        let src = "service Api { SomeVeryLongReturnType fetchEverything(1: i64 identifier, 2: string query) }\n";
        let out = format_source(src, &opts);
        assert!(out.contains("fetchEverything(\n"));
        assert!(out.contains("        1: i64 identifier,\n"));
        assert!(out.contains("        2: string query\n"));
        assert!(out.contains("    )\n"));
        assert_eq!(out, format_source(&out, &opts));
    }

    #[test]
    fn multiline_collection_style_expands_long_consts() {
        let opts = FormatOptions {
            collection_style: CollectionStyle::Multiline,
            max_line_length: 30,
            ..FormatOptions::default()
        };
        let src = "const list<string> NAMES = [\"alpha\", \"beta\", \"gamma\"]\n";
        let out = format_source(src, &opts);
        assert_eq!(
            out,
            "const list<string> NAMES = [\n    \"alpha\",\n    \"beta\",\n    \"gamma\",\n]\n"
        );
        assert_eq!(out, format_source(&out, &opts));
    }

    #[test]
    fn incremental_matches_full_on_formatted_documents() {
        let opts = FormatOptions::default();
        let base = fmt("struct A { 1: i32 x, 2: i32 y }\n\nstruct B { 1: string s }\n\nenum E { A = 1 }\n");
        // dirty the middle construct
        let edited = base.replace("1: string s", "1:string s,2:i32   t");
        let full = format_source(&edited, &opts);
        let b_line = edited
            .lines()
            .position(|l| l.contains("struct B"))
            .unwrap();
        let dirty = Range::new(b_line + 1, 0, b_line + 1, 5);
        let incremental = format_source_range(&edited, &opts, Some(&dirty));
        assert_eq!(incremental, full);
    }

    #[test]
    fn incremental_falls_back_when_disabled_or_unresolvable() {
        let opts = FormatOptions {
            incremental_formatting_enabled: false,
            ..FormatOptions::default()
        };
        let src = "struct A{1:i32 x}\n";
        let dirty = Range::new(0, 0, 0, 1);
        assert_eq!(
            format_source_range(src, &opts, Some(&dirty)),
            format_source(src, &opts)
        );
        // unresolvable: dirty range starts inside a block comment
        let opts = FormatOptions::default();
        let src = "/*\nstruct Fake {\n*/\nstruct Real{1:i32 x}\n";
        let dirty = Range::new(1, 0, 1, 1);
        assert_eq!(
            format_source_range(src, &opts, Some(&dirty)),
            format_source(src, &opts)
        );
    }

    #[test]
    fn out_of_range_dirty_lines_fall_back_to_full() {
        let opts = FormatOptions::default();
        let src = "struct A{1:i32 x}\n";
        let dirty = Range::new(99, 0, 120, 0);
        assert_eq!(
            format_source_range(src, &opts, Some(&dirty)),
            format_source(src, &opts)
        );
    }

    #[test]
    fn never_loses_member_content() {
        let src = "struct S {\n  1: i32 a = [\n  // interior comment forces passthrough\n  1, 2],\n}\n";
        let out = fmt(src);
        assert!(out.contains("interior comment"));
        assert!(out.contains("1, 2]"));
    }

    #[test]
    fn crlf_documents_keep_their_line_ending() {
        let out = fmt("struct S { 1: i32 x }\r\n");
        assert!(out.contains("\r\n"));
        assert_eq!(fmt(&out), out);
    }

    #[test]
    fn comments_only_construct_keeps_braces() {
        let out = fmt("struct S {\n  // nothing\n}\n");
        assert_eq!(out, "struct S {\n    // nothing\n}\n");
    }
}
