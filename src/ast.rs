//! AST node types
//!
//! A parsed document is a flat list of top-level [`Definition`]s. Every
//! node records the [`Range`] of its full span plus ranges for each name,
//! type and value, so editor callers can map nodes back to exact source
//! text. A declaration that cannot be parsed degrades to
//! [`Definition::Invalid`] instead of aborting the parse.

use std::collections::HashSet;

use once_cell::sync::Lazy;

use crate::position::Range;

/// Built-in base and container type names of the dialect. The diagnostics
/// consumer boundary uses this to separate unresolved user types from
/// builtins when validating type references.
pub static BUILTIN_TYPES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "bool", "byte", "i8", "i16", "i32", "i64", "double", "string", "binary", "uuid",
        "slist", "void", "map", "set", "list",
    ]
    .into_iter()
    .collect()
});

/// True when `name` (optionally with a generic suffix) is a builtin type.
pub fn is_builtin_type(name: &str) -> bool {
    let base = name.split('<').next().unwrap_or(name).trim();
    BUILTIN_TYPES.contains(base)
}

/// A parsed document: one node per top-level declaration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Ast {
    pub body: Vec<Definition>,
    /// Per line: true when the line starts inside an open `/* … */`
    /// comment. Incremental formatting uses this to refuse dirty ranges
    /// that begin mid-comment.
    pub comment_line_flags: Vec<bool>,
}

/// A top-level declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum Definition {
    Namespace(Namespace),
    Include(Include),
    Typedef(Typedef),
    Const(Const),
    Enum(Enum),
    Struct(Struct),
    Service(Service),
    Invalid(Invalid),
}

impl Definition {
    pub fn range(&self) -> Range {
        match self {
            Definition::Namespace(n) => n.range,
            Definition::Include(n) => n.range,
            Definition::Typedef(n) => n.range,
            Definition::Const(n) => n.range,
            Definition::Enum(n) => n.range,
            Definition::Struct(n) => n.range,
            Definition::Service(n) => n.range,
            Definition::Invalid(n) => n.range,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Definition::Namespace(n) => Some(&n.namespace),
            Definition::Include(n) => Some(&n.path),
            Definition::Typedef(n) => Some(&n.name),
            Definition::Const(n) => Some(&n.name),
            Definition::Enum(n) => Some(&n.name),
            Definition::Struct(n) => Some(&n.name),
            Definition::Service(n) => Some(&n.name),
            Definition::Invalid(_) => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Definition::Namespace(_) => "namespace",
            Definition::Include(_) => "include",
            Definition::Typedef(_) => "typedef",
            Definition::Const(_) => "const",
            Definition::Enum(_) => "enum",
            Definition::Struct(s) => s.kind.keyword(),
            Definition::Service(_) => "service",
            Definition::Invalid(_) => "invalid",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Namespace {
    pub scope: String,
    pub namespace: String,
    pub name_range: Range,
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Include {
    pub path: String,
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Typedef {
    pub name: String,
    pub name_range: Range,
    pub alias_type: String,
    pub alias_type_range: Range,
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Const {
    pub name: String,
    pub name_range: Range,
    pub value_type: String,
    pub value_type_range: Range,
    pub value: String,
    pub value_range: Range,
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumMember {
    pub name: String,
    pub name_range: Range,
    pub initializer: Option<String>,
    pub initializer_range: Option<Range>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Enum {
    pub name: String,
    pub name_range: Range,
    pub members: Vec<EnumMember>,
    pub range: Range,
}

/// The reference IDL folds three keywords into one structured shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructKind {
    Struct,
    Union,
    Exception,
}

impl StructKind {
    pub fn keyword(self) -> &'static str {
        match self {
            StructKind::Struct => "struct",
            StructKind::Union => "union",
            StructKind::Exception => "exception",
        }
    }

    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "struct" => Some(StructKind::Struct),
            "union" => Some(StructKind::Union),
            "exception" => Some(StructKind::Exception),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Struct {
    pub kind: StructKind,
    pub name: String,
    pub name_range: Range,
    pub fields: Vec<Field>,
    pub range: Range,
}

/// A struct field's required/optional/default qualifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Requiredness {
    Required,
    Optional,
    #[default]
    Default,
}

impl Requiredness {
    pub fn keyword(self) -> Option<&'static str> {
        match self {
            Requiredness::Required => Some("required"),
            Requiredness::Optional => Some("optional"),
            Requiredness::Default => None,
        }
    }

    pub fn from_keyword(word: Option<&str>) -> Self {
        match word {
            Some("required") => Requiredness::Required,
            Some("optional") => Requiredness::Optional,
            _ => Requiredness::Default,
        }
    }
}

/// A struct field, function argument, or throws entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub id: Option<i64>,
    pub requiredness: Requiredness,
    pub field_type: String,
    pub type_range: Range,
    pub name: String,
    pub name_range: Range,
    pub default_value: Option<String>,
    pub default_value_range: Option<Range>,
    pub annotation: Option<String>,
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub name_range: Range,
    pub return_type: String,
    pub return_type_range: Range,
    pub oneway: bool,
    pub arguments: Vec<Field>,
    pub throws: Vec<Field>,
    /// Spans through the closing paren of `throws`, or of the argument
    /// list when there is no throws clause.
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Service {
    pub name: String,
    pub name_range: Range,
    pub extends: Option<String>,
    pub functions: Vec<Function>,
    pub range: Range,
}

/// A top-level declaration that could not be parsed. The raw text is kept
/// so nothing is ever dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct Invalid {
    pub raw: String,
    pub range: Range,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_type_lookup_sees_through_generics() {
        assert!(is_builtin_type("i32"));
        assert!(is_builtin_type("map<string, i32>"));
        assert!(is_builtin_type("list<UserDefined>"));
        assert!(!is_builtin_type("UserDefined"));
        assert!(!is_builtin_type("shared.Base"));
    }
}
