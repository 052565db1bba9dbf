//! # IronXSD
//!
//! XSD schema model and polymorphic XML serialization for Rust.
//!
//! IronXSD parses XML Schema documents into a typed model and provides the
//! runtime contract that reads and writes instances while honouring type
//! extension and substitution groups on the wire.
//!
//! ## Features
//!
//! - **Schema ingestion** - Types, elements, attributes and facets with
//!   include/import resolution
//! - **Resolved IR** - Base chains, flattened fields and transitive
//!   substitution sets
//! - **Polymorphic dispatch** - Concrete types picked from element names or
//!   `xsi:type` overrides
//! - **Document lifecycle** - Load and save one typed root
//!
//! ## Quick Start
//!
//! ```ignore
//! use ironxsd::prelude::*;
//!
//! let schema = parse_schema(xsd)?;
//! let mut registry = TypeRegistry::new();
//! registry.register_type::<Vehicle>();
//! registry.register_type::<Car>();
//! register_substitution_groups(&schema, &mut registry);
//!
//! let mut doc = XmlDocument::<Fleet>::new();
//! doc.load_str(xml, &registry)?;
//! ```
//!
//! ## Crate Organization
//!
//! - [`core`] - Registry, serialization contract, codecs and documents
//! - [`schema`] - XSD parsing, validation and intermediate representation

use tracing::debug;

pub mod prelude;

/// Runtime serialization support.
pub mod core {
    pub use ironxsd_core::*;
}

/// Schema parsing and validation.
pub mod schema {
    pub use ironxsd_schema::*;
}

// Re-export commonly used items at the crate root
pub use ironxsd_core::{
    DocumentOptions, Error, ReadContext, Result, TypeRegistry, XmlDocument, XmlSerializable,
};
pub use ironxsd_schema::{ParseError, Schema, SchemaError, SchemaIr, parse_schema};

/// Copies the substitution groups of `schema` into `registry`.
///
/// Each member is registered under its direct head; transitive membership
/// is answered by [`TypeRegistry::is_substitutable`].
///
/// # Returns
/// The number of member/head relations registered.
pub fn register_substitution_groups(schema: &Schema, registry: &mut TypeRegistry) -> usize {
    let mut count = 0;
    for (head, members) in &schema.substitution_groups {
        for member in members {
            registry.register_substitute(member.as_str(), head.as_str());
            count += 1;
        }
    }
    debug!(relations = count, "registered substitution groups");
    count
}

/// Returns the `(element, type)` pairs the schema expects but `registry`
/// cannot construct, in element declaration order.
#[must_use]
pub fn missing_registrations(ir: &SchemaIr, registry: &TypeRegistry) -> Vec<(String, String)> {
    ir.registrations()
        .into_iter()
        .filter(|(element, type_name)| {
            !registry.contains_element(element) || !registry.contains_type(type_name)
        })
        .collect()
}
