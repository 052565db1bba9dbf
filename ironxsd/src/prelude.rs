//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types and traits.
//!
//! ```ignore
//! use ironxsd::prelude::*;
//! ```

// Runtime types
pub use ironxsd_core::context::ReadContext;
pub use ironxsd_core::document::{DocumentOptions, XmlDocument, load_polymorphic};
pub use ironxsd_core::error::{Error as CoreError, Result as CoreResult};
pub use ironxsd_core::polymorphic::{read_polymorphic, read_polymorphic_or_skip, write_polymorphic};
pub use ironxsd_core::reader::{StartTag, XmlReader};
pub use ironxsd_core::registry::TypeRegistry;
pub use ironxsd_core::serializable::XmlSerializable;
pub use ironxsd_core::writer::XmlWriter;
pub use ironxsd_core::{DecodePolicy, XmlScalar};

// Schema types
pub use ironxsd_schema::{
    ElementDecl, MaxOccurs, ParseError, Schema, SchemaError, SchemaIr, SchemaParser, TypeDef,
    parse_schema, validate_schema,
};

// Bridging
pub use crate::{missing_registrations, register_substitution_groups};
