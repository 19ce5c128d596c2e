//! Formatter configuration
//!
//! A closed configuration struct enumerating every recognized option with a
//! typed default. The serde surface uses the exact camelCase flag names the
//! editor settings expose (`alignTypes`, `trailingComma`, …); unknown
//! fields are ignored and omitted fields fall back to their defaults, so an
//! options object from any editor version deserializes cleanly.
//!
//! # Example
//!
//! ```rust
//! use thriftfmt::options::{FormatOptions, TrailingComma};
//!
//! let opts = FormatOptions::from_json(r#"{"trailingComma": "add", "indentSize": 2}"#).unwrap();
//! assert_eq!(opts.trailing_comma, TrailingComma::Add);
//! assert_eq!(opts.indent_size, 2);
//! assert!(opts.align_types); // untouched defaults survive
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Policy for the separator after the last field/member in a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrailingComma {
    Preserve,
    Add,
    Remove,
}

/// Layout policy for collection const values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionStyle {
    Preserve,
    Multiline,
}

/// Every style rule the formatter honors. See the crate docs for what each
/// alignment flag lines up; padding is always max-width-in-block plus one
/// space, reset at blank lines and block boundaries.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormatOptions {
    pub align_types: bool,
    pub align_field_names: bool,
    pub align_struct_defaults: bool,
    pub align_annotations: bool,
    pub align_comments: bool,
    pub align_enum_names: bool,
    pub align_enum_equals: bool,
    pub align_enum_values: bool,
    pub trailing_comma: TrailingComma,
    pub indent_size: usize,
    pub max_line_length: usize,
    pub collection_style: CollectionStyle,
    pub insert_spaces: bool,
    pub tab_size: usize,
    pub incremental_formatting_enabled: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            align_types: true,
            align_field_names: true,
            align_struct_defaults: false,
            align_annotations: false,
            align_comments: false,
            align_enum_names: true,
            align_enum_equals: true,
            align_enum_values: false,
            trailing_comma: TrailingComma::Preserve,
            indent_size: 4,
            max_line_length: 100,
            collection_style: CollectionStyle::Preserve,
            insert_spaces: true,
            tab_size: 4,
            incremental_formatting_enabled: true,
        }
    }
}

/// Failure to load a config file. Core formatting never errors; this is
/// strictly a boundary concern of the CLI and editor host.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid config '{path}': {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

impl FormatOptions {
    /// Deserialize an editor-supplied options object. Unknown fields are
    /// ignored; omitted fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load options from a `thriftfmt.toml` file using the same camelCase
    /// keys as the editor surface.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// One level of indentation.
    pub fn indent_unit(&self) -> String {
        if self.insert_spaces {
            " ".repeat(self.indent_size)
        } else {
            "\t".to_string()
        }
    }

    /// Display width of one indentation level, for line-length checks.
    pub fn indent_width(&self) -> usize {
        if self.insert_spaces {
            self.indent_size
        } else {
            self.tab_size
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_stable() {
        let opts = FormatOptions::default();
        assert!(opts.align_types);
        assert!(opts.align_field_names);
        assert!(!opts.align_struct_defaults);
        assert_eq!(opts.trailing_comma, TrailingComma::Preserve);
        assert_eq!(opts.collection_style, CollectionStyle::Preserve);
        assert_eq!(opts.indent_size, 4);
        assert!(opts.incremental_formatting_enabled);
    }

    #[test]
    fn camel_case_names_round_trip_from_json() {
        let opts = FormatOptions::from_json(
            r#"{
                "alignTypes": false,
                "alignEnumEquals": false,
                "trailingComma": "remove",
                "collectionStyle": "multiline",
                "insertSpaces": false,
                "tabSize": 8,
                "incrementalFormattingEnabled": false
            }"#,
        )
        .unwrap();
        assert!(!opts.align_types);
        assert!(!opts.align_enum_equals);
        assert_eq!(opts.trailing_comma, TrailingComma::Remove);
        assert_eq!(opts.collection_style, CollectionStyle::Multiline);
        assert!(!opts.insert_spaces);
        assert_eq!(opts.tab_size, 8);
        assert!(!opts.incremental_formatting_enabled);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let opts = FormatOptions::from_json(r#"{"futureOption": true, "indentSize": 2}"#).unwrap();
        assert_eq!(opts.indent_size, 2);
        assert!(opts.align_types);
    }

    #[test]
    fn indent_unit_honors_insert_spaces() {
        let mut opts = FormatOptions {
            indent_size: 2,
            ..FormatOptions::default()
        };
        assert_eq!(opts.indent_unit(), "  ");
        opts.insert_spaces = false;
        assert_eq!(opts.indent_unit(), "\t");
        assert_eq!(opts.indent_width(), opts.tab_size);
    }
}
