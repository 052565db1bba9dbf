//! Error types for IronXSD runtime operations.

use crate::position::TextPosition;
use thiserror::Error;

/// Core error type for reading and writing XML documents.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error on the underlying source or sink.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed markup in the input document.
    #[error("XML syntax error at line {line}, column {column}: {message}")]
    Syntax {
        /// 1-based line number.
        line: usize,
        /// 1-based column number.
        column: usize,
        /// Error message.
        message: String,
    },

    /// Error reported by the XML writer.
    #[error("XML write error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// The input ended before any start tag was found.
    #[error("no root element found")]
    NoRootElement,

    /// A document was saved without a root instance.
    #[error("no root element to save")]
    NoRoot,

    /// No constructor is registered for an element or type name.
    #[error("no constructor registered for element '{element}'")]
    NoConstructor {
        /// Element name that was looked up.
        element: String,
    },

    /// Scalar text could not be decoded under the strict policy.
    #[error("invalid {expected} value '{value}' in element '{element}'")]
    ScalarDecode {
        /// Element or attribute carrying the value.
        element: String,
        /// Offending text.
        value: String,
        /// Expected scalar kind.
        expected: &'static str,
    },

    /// The input ended inside an open element.
    #[error("unexpected end of document inside element '{element}'")]
    UnexpectedEof {
        /// Innermost open element.
        element: String,
    },

    /// An attribute was written after the element content had started.
    #[error("attribute '{attribute}' written outside of a start tag")]
    AttributeOutsideStartTag {
        /// Attribute name.
        attribute: String,
    },

    /// `end_element` was called with no open element.
    #[error("end_element called with no open element")]
    UnbalancedEnd,
}

impl Error {
    /// Creates a syntax error at the given position.
    pub fn syntax(position: TextPosition, message: impl Into<String>) -> Self {
        Self::Syntax {
            line: position.line,
            column: position.column,
            message: message.into(),
        }
    }

    /// Creates a scalar decode error.
    pub fn scalar(
        element: impl Into<String>,
        value: impl Into<String>,
        expected: &'static str,
    ) -> Self {
        Self::ScalarDecode {
            element: element.into(),
            value: value.into(),
            expected,
        }
    }
}

/// Result type alias for IronXSD runtime operations.
pub type Result<T> = std::result::Result<T, Error>;
