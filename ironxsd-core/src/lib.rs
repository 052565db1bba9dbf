//! # IronXSD Core
//!
//! Runtime support for polymorphic XML serialization of XSD-derived types.
//!
//! This crate provides:
//! - The [`XmlSerializable`] contract with base-first delegation
//! - A [`TypeRegistry`] mapping element and type names to constructors
//! - Substitution group queries and `xsi:type` dispatch
//! - Scalar codecs for XSD built-in types
//! - [`XmlDocument`] for loading and saving a typed root

pub mod codec;
pub mod context;
pub mod document;
pub mod error;
pub mod polymorphic;
pub mod position;
pub mod reader;
pub mod registry;
pub mod serializable;
pub mod writer;

#[cfg(test)]
mod fixtures;

pub use codec::{DecodePolicy, XmlScalar, decode_lenient};
pub use context::ReadContext;
pub use document::{DocumentOptions, XmlDocument, load_polymorphic, write_document};
pub use error::{Error, Result};
pub use polymorphic::{instantiate, read_polymorphic, read_polymorphic_or_skip, write_polymorphic};
pub use position::TextPosition;
pub use reader::{StartTag, XSI_NAMESPACE, XmlAttribute, XmlEvent, XmlReader};
pub use registry::{Constructor, TypeRegistry};
pub use serializable::{AsAny, XmlSerializable};
pub use writer::XmlWriter;
