//! Schema validation utilities.
//!
//! Parsing is permissive: unresolved references and cyclic bases are kept
//! as written. This module provides the opt-in checks that reject them.

use crate::error::SchemaError;
use crate::types::{BuiltinType, ElementDecl, MaxOccurs, Schema, TypeDef, local_name};
use std::collections::HashSet;

/// Validates a parsed schema for correctness.
///
/// # Arguments
/// * `schema` - The schema to validate
///
/// # Returns
/// Ok(()) if valid, or SchemaError describing the first issue found.
///
/// # Errors
/// Returns `SchemaError` if validation fails.
pub fn validate_schema(schema: &Schema) -> Result<(), SchemaError> {
    validate_substitution_heads(schema)?;
    for type_def in all_types(schema) {
        validate_base(schema, type_def)?;
        validate_enumerations(type_def)?;
        validate_particles(type_def)?;
    }
    for element in &schema.elements {
        validate_occurs(element)?;
    }
    Ok(())
}

/// Named types followed by inline types of global elements.
fn all_types(schema: &Schema) -> impl Iterator<Item = &TypeDef> {
    schema.types.iter().chain(
        schema
            .elements
            .iter()
            .filter_map(|element| element.inline_type.as_deref()),
    )
}

fn is_builtin(name: &str) -> bool {
    BuiltinType::from_name(name).is_some()
        || name.starts_with("xs:")
        || name.starts_with("xsd:")
}

/// Every `substitutionGroup` must name a declared global element.
fn validate_substitution_heads(schema: &Schema) -> Result<(), SchemaError> {
    for element in &schema.elements {
        if let Some(head) = &element.substitution_group {
            if !schema.has_element(head) {
                return Err(SchemaError::UnresolvedSubstitutionHead {
                    element: element.name.clone(),
                    head: local_name(head).to_string(),
                });
            }
        }
    }
    Ok(())
}

/// The base chain must resolve to declared types and terminate.
fn validate_base(schema: &Schema, type_def: &TypeDef) -> Result<(), SchemaError> {
    let mut path = vec![type_def.name.as_str()];
    let mut seen = HashSet::from([type_def.name.as_str()]);
    let mut current = type_def;

    while let Some(base) = current.base.as_deref() {
        if is_builtin(base) {
            return Ok(());
        }
        let Some(next) = schema.get_type(base) else {
            return Err(SchemaError::TypeNotFound {
                name: base.to_string(),
                referenced_by: current.name.clone(),
            });
        };
        path.push(next.name.as_str());
        if !seen.insert(next.name.as_str()) {
            return Err(SchemaError::CircularReference {
                path: path.join(" -> "),
            });
        }
        current = next;
    }
    Ok(())
}

fn validate_enumerations(type_def: &TypeDef) -> Result<(), SchemaError> {
    let mut seen = HashSet::new();
    for value in &type_def.facets.enumerations {
        if !seen.insert(value.as_str()) {
            return Err(SchemaError::DuplicateEnumeration {
                type_name: type_def.name.clone(),
                value: value.clone(),
            });
        }
    }
    Ok(())
}

fn validate_occurs(element: &ElementDecl) -> Result<(), SchemaError> {
    if let MaxOccurs::Bounded(max) = element.max_occurs {
        if element.min_occurs > max {
            return Err(SchemaError::InvalidOccurs {
                element: element.name.clone(),
                min: element.min_occurs,
                max,
            });
        }
    }
    Ok(())
}

/// Checks occurrence bounds of every local element of `type_def`,
/// descending into anonymous types of local elements.
fn validate_particles(type_def: &TypeDef) -> Result<(), SchemaError> {
    for element in &type_def.elements {
        validate_occurs(element)?;
        if let Some(inline) = &element.inline_type {
            validate_particles(inline)?;
        }
    }
    Ok(())
}
