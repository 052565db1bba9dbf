//! # IronXSD Schema
//!
//! XSD schema parser and type definitions.
//!
//! This crate provides:
//! - XSD parsing with `xs:include` / `xs:import` resolution
//! - Type definitions for elements, attributes and derivations
//! - Substitution group tables
//! - Schema validation
//! - A resolved intermediate representation

pub mod error;
pub mod ir;
pub mod parser;
pub mod types;
pub mod validation;

pub use error::{ParseError, SchemaError};
pub use ir::{ResolvedElement, ResolvedType, SchemaIr};
pub use parser::{DEFAULT_MAX_FILES, DEFAULT_MAX_INCLUDE_DEPTH, SchemaParser, parse_schema};
pub use types::{
    AttributeDecl, AttributeUse, BuiltinType, Compositor, ContentKind, Derivation, ElementDecl,
    FormDefault, MaxOccurs, Schema, SimpleFacets, TypeDef, TypeKind, local_name,
};
pub use validation::validate_schema;
