//! # ThriftFmt - Thrift IDL Parser and Formatter
//!
//! ThriftFmt is a language tool for the Thrift interface-definition
//! dialect (struct/enum/service/typedef/const definitions with typed
//! fields, annotations, nested generic containers, and doc comments),
//! written in Rust. A hand-written line-oriented parser builds a
//! position-accurate AST, and a deterministic re-printer converts
//! arbitrary — and possibly malformed — source text into a canonical form
//! under configurable style rules.
//!
//! ## Guarantees
//!
//! - Formatting is idempotent: re-formatting formatted output is a no-op.
//! - The parser never fails: malformed declarations degrade to `Invalid`
//!   AST nodes and the rest of the document still parses.
//! - The formatter never fails: lines it cannot confidently restructure
//!   are emitted unchanged, so content is never dropped.
//! - Incremental (dirty-range-limited) formatting produces output
//!   byte-identical to full formatting on documents whose untouched
//!   remainder is already formatted, and falls back to full formatting
//!   whenever a dirty range cannot be resolved to construct boundaries.
//!
//! ## Usage
//!
//! ### As a Library
//!
//! ```rust
//! use thriftfmt::formatter::format_source;
//! use thriftfmt::options::FormatOptions;
//! use thriftfmt::parser::parse;
//!
//! let source = "struct User{1:i32 id,2:string name}\n";
//!
//! let ast = parse(source);
//! assert_eq!(ast.body.len(), 1);
//!
//! let formatted = format_source(source, &FormatOptions::default());
//! assert!(formatted.starts_with("struct User {"));
//! ```
//!
//! ### As a CLI Tool
//!
//! The library is also available as a command-line tool. See the `main`
//! module for CLI usage details.
//!
//! ## Modules
//!
//! - [`token`] - Per-line tokenizer
//! - [`text`] - Field/value parsers and normalization helpers
//! - [`parser`] - Line-oriented structural parser
//! - [`ast`] - AST node types with source ranges
//! - [`index`] - Lookup maps for incremental formatting
//! - [`formatter`] - Core formatting engine and public API
//! - [`options`] - The closed formatter configuration surface
//! - [`edits`] - Whole-line range normalization and minimal edits
//! - [`cache`] - Dependency-injected AST cache collaborator

/// AST node types with source ranges
pub mod ast;

/// Dependency-injected AST cache collaborator
pub mod cache;

/// Line accessor over a source document
pub mod document;

/// Whole-line range normalization and minimal replace-edits
pub mod edits;

/// Core formatting engine and public API
pub mod formatter;

/// Lookup maps over a parsed document for incremental formatting
pub mod index;

/// The closed formatter configuration surface
pub mod options;

/// Source positions and ranges (0-based lines, UTF-16 columns)
pub mod position;

/// Line-oriented structural parser
pub mod parser;

/// Field/value parsers and normalization helpers
pub mod text;

/// Per-line tokenizer
pub mod token;

pub use formatter::{format_source, format_source_range};
pub use options::FormatOptions;
