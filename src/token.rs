//! Per-line tokenizer
//!
//! Converts one line of source text into a sequence of typed tokens. The
//! tokenizer is aware of string-literal and comment boundaries, so braces
//! and commas inside them stay inert for every downstream scanner.
//!
//! # Example
//!
//! ```rust
//! use thriftfmt::token::{tokenize_line, TokenKind};
//!
//! let tokens = tokenize_line("1: optional string name = \"x\" // note");
//! assert!(tokens.iter().any(|t| t.kind == TokenKind::Str));
//! assert_eq!(tokens.last().unwrap().kind, TokenKind::Comment);
//! ```

/// Token classification for one line of source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    Symbol,
    Str,
    Comment,
    Whitespace,
}

/// One token, with UTF-16 column offsets into its line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub start: usize,
    pub end: usize,
}

fn is_ident_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn is_ident_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

/// Tokenize a single line, left to right.
///
/// Runs of `[A-Za-z_][A-Za-z0-9_]*` become identifiers, `"…"`/`'…'` spans
/// (backslash-escape aware) become strings, `//` or `#` to end of line
/// becomes a comment, and runs of spaces/tabs collapse to one whitespace
/// token preserving the literal text. Everything else is a one-character
/// symbol. An unterminated string extends to the end of the line rather
/// than being an error, so brace and comma scanners stay inert across it.
pub fn tokenize_line(line: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;
    let mut col = 0;

    while i < chars.len() {
        let start_col = col;
        let ch = chars[i];

        if is_ident_start(ch) {
            let mut text = String::new();
            while i < chars.len() && is_ident_char(chars[i]) {
                text.push(chars[i]);
                col += chars[i].len_utf16();
                i += 1;
            }
            tokens.push(Token {
                kind: TokenKind::Identifier,
                text,
                start: start_col,
                end: col,
            });
        } else if ch == ' ' || ch == '\t' {
            let mut text = String::new();
            while i < chars.len() && (chars[i] == ' ' || chars[i] == '\t') {
                text.push(chars[i]);
                col += 1;
                i += 1;
            }
            tokens.push(Token {
                kind: TokenKind::Whitespace,
                text,
                start: start_col,
                end: col,
            });
        } else if ch == '"' || ch == '\'' {
            let quote = ch;
            let mut text = String::new();
            text.push(quote);
            col += 1;
            i += 1;
            let mut escaped = false;
            let mut closed = false;
            while i < chars.len() {
                let c = chars[i];
                text.push(c);
                col += c.len_utf16();
                i += 1;
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == quote {
                    closed = true;
                    break;
                }
            }
            // unterminated strings run to end of line by design
            let _ = closed;
            tokens.push(Token {
                kind: TokenKind::Str,
                text,
                start: start_col,
                end: col,
            });
        } else if (ch == '/' && chars.get(i + 1) == Some(&'/')) || ch == '#' {
            let text: String = chars[i..].iter().collect();
            let width: usize = chars[i..].iter().map(|c| c.len_utf16()).sum();
            tokens.push(Token {
                kind: TokenKind::Comment,
                text,
                start: start_col,
                end: start_col + width,
            });
            break;
        } else {
            col += ch.len_utf16();
            i += 1;
            tokens.push(Token {
                kind: TokenKind::Symbol,
                text: ch.to_string(),
                start: start_col,
                end: col,
            });
        }
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(line: &str) -> Vec<TokenKind> {
        tokenize_line(line).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn classifies_a_struct_field_line() {
        let tokens = tokenize_line("1: required i32 id,");
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["1", ":", " ", "required", " ", "i32", " ", "id", ","]
        );
        assert_eq!(tokens[3].kind, TokenKind::Identifier);
        assert_eq!(tokens[8].kind, TokenKind::Symbol);
    }

    #[test]
    fn tokens_never_overlap_and_cover_the_line() {
        let line = "  struct User { } // tail";
        let tokens = tokenize_line(line);
        let mut last_end = 0;
        for t in &tokens {
            assert!(t.start >= last_end, "overlap at {:?}", t);
            assert_eq!(t.start, last_end);
            last_end = t.end;
        }
        let joined: String = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(joined, line);
    }

    #[test]
    fn braces_inside_strings_are_string_tokens() {
        let tokens = tokenize_line("1: string tmpl = \"{{value}\",");
        let string = tokens.iter().find(|t| t.kind == TokenKind::Str).unwrap();
        assert_eq!(string.text, "\"{{value}\"");
        assert!(!tokens
            .iter()
            .any(|t| t.kind == TokenKind::Symbol && t.text == "{"));
    }

    #[test]
    fn unterminated_string_extends_to_end_of_line() {
        let tokens = tokenize_line("x = \"oops {");
        let last = tokens.last().unwrap();
        assert_eq!(last.kind, TokenKind::Str);
        assert_eq!(last.text, "\"oops {");
    }

    #[test]
    fn hash_and_slash_comments() {
        assert_eq!(
            kinds("# leading"),
            vec![TokenKind::Comment]
        );
        let tokens = tokenize_line("i32 // c1 // c2");
        assert_eq!(tokens.last().unwrap().text, "// c1 // c2");
    }

    #[test]
    fn comment_marker_inside_string_is_inert() {
        let tokens = tokenize_line("url = \"http://host\"");
        assert!(!tokens.iter().any(|t| t.kind == TokenKind::Comment));
    }
}
