//! Error types for schema parsing and validation.

use ironxsd_core::TextPosition;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error type for schema parsing operations.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Malformed XML markup.
    #[error("XML syntax error at line {line}, column {column}: {message}")]
    Syntax {
        /// 1-based line number.
        line: usize,
        /// 1-based column number.
        column: usize,
        /// Error message.
        message: String,
    },

    /// A schema file could not be read.
    #[error("cannot read '{}': {source}", .path.display())]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Missing required attribute.
    #[error("missing required attribute '{attribute}' on element '{element}'")]
    MissingAttribute {
        /// Element name.
        element: String,
        /// Attribute name.
        attribute: String,
    },

    /// Invalid attribute value.
    #[error("invalid value '{value}' for attribute '{attribute}' on element '{element}'")]
    InvalidAttribute {
        /// Element name.
        element: String,
        /// Attribute name.
        attribute: String,
        /// Invalid value.
        value: String,
    },

    /// Include recursion exceeded a configured ceiling.
    #[error("include {limit_kind} limit of {limit} exceeded at '{location}'")]
    IncludeLimit {
        /// Location being resolved.
        location: String,
        /// Which ceiling was hit (`depth` or `file count`).
        limit_kind: &'static str,
        /// Configured ceiling.
        limit: usize,
    },

    /// Include or import location with a remote scheme.
    #[error("unsupported schema location '{location}'")]
    UnsupportedLocation {
        /// The location as written.
        location: String,
    },

    /// Input contains no `schema` element.
    #[error("invalid schema structure: {message}")]
    InvalidStructure {
        /// Error message.
        message: String,
    },

    /// UTF-8 decoding error.
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// Malformed entity reference in an attribute value.
    #[error("escape error: {0}")]
    Escape(#[from] quick_xml::escape::EscapeError),
}

/// Error type for schema validation.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Parsing error.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Referenced type is not declared.
    #[error("type '{name}' referenced by '{referenced_by}' not found")]
    TypeNotFound {
        /// Type name.
        name: String,
        /// Type or element holding the reference.
        referenced_by: String,
    },

    /// Substitution group head is not a declared element.
    #[error("element '{element}' names undeclared substitution group head '{head}'")]
    UnresolvedSubstitutionHead {
        /// Member element.
        element: String,
        /// Missing head.
        head: String,
    },

    /// Circular base type chain.
    #[error("circular type reference detected: {path}")]
    CircularReference {
        /// Path of the circular reference.
        path: String,
    },

    /// `minOccurs` larger than `maxOccurs`.
    #[error("element '{element}' has minOccurs {min} greater than maxOccurs {max}")]
    InvalidOccurs {
        /// Element name.
        element: String,
        /// Declared minimum.
        min: u32,
        /// Declared maximum.
        max: u32,
    },

    /// Enumeration value listed twice.
    #[error("duplicate enumeration value '{value}' in type '{type_name}'")]
    DuplicateEnumeration {
        /// Simple type name.
        type_name: String,
        /// Repeated value.
        value: String,
    },
}

impl ParseError {
    /// Creates a syntax error at the given position.
    pub fn syntax(position: TextPosition, message: impl Into<String>) -> Self {
        Self::Syntax {
            line: position.line,
            column: position.column,
            message: message.into(),
        }
    }

    /// Creates an IO error for `path`.
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Creates a missing attribute error.
    pub fn missing_attr(element: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::MissingAttribute {
            element: element.into(),
            attribute: attribute.into(),
        }
    }

    /// Creates an invalid attribute error.
    pub fn invalid_attr(
        element: impl Into<String>,
        attribute: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::InvalidAttribute {
            element: element.into(),
            attribute: attribute.into(),
            value: value.into(),
        }
    }
}
