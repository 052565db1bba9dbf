//! Intermediate representation for binding generation.
//!
//! This module resolves base chains, flattens inherited fields and computes
//! transitive substitution sets, so a generator can emit one binding per
//! type and the registration calls that tie element names to them.

use crate::types::{
    AttributeDecl, ContentKind, ElementDecl, Schema, TypeDef, TypeKind, local_name,
};
use std::collections::{HashMap, HashSet, VecDeque};

/// Intermediate representation of a schema for binding generation.
#[derive(Debug, Clone)]
pub struct SchemaIr {
    /// Target namespace.
    pub target_namespace: Option<String>,
    /// Resolved types: named types first, then inline types of global
    /// elements, each group in declaration order.
    pub types: Vec<ResolvedType>,
    /// Resolved global elements in declaration order.
    pub elements: Vec<ResolvedElement>,
    type_map: HashMap<String, usize>,
    element_map: HashMap<String, usize>,
}

impl SchemaIr {
    /// Creates an intermediate representation from a parsed schema.
    #[must_use]
    pub fn from_schema(schema: &Schema) -> Self {
        let mut defs: Vec<&TypeDef> = schema.types.iter().collect();
        defs.extend(
            schema
                .elements
                .iter()
                .filter_map(|element| element.inline_type.as_deref()),
        );
        let by_name: HashMap<&str, &TypeDef> =
            defs.iter().map(|def| (def.name.as_str(), *def)).collect();

        let mut ir = Self {
            target_namespace: schema.target_namespace.clone(),
            types: Vec::with_capacity(defs.len()),
            elements: Vec::with_capacity(schema.elements.len()),
            type_map: HashMap::new(),
            element_map: HashMap::new(),
        };

        for def in &defs {
            let resolved = ResolvedType::resolve(def, &defs, &by_name);
            ir.type_map.insert(resolved.name.clone(), ir.types.len());
            ir.types.push(resolved);
        }

        for element in &schema.elements {
            let resolved = ResolvedElement::resolve(element, schema);
            ir.element_map
                .insert(resolved.name.clone(), ir.elements.len());
            ir.elements.push(resolved);
        }

        ir
    }

    /// Gets a resolved type by name.
    #[must_use]
    pub fn get_type(&self, name: &str) -> Option<&ResolvedType> {
        self.type_map
            .get(local_name(name))
            .map(|&idx| &self.types[idx])
    }

    /// Gets a resolved global element by name.
    #[must_use]
    pub fn get_element(&self, name: &str) -> Option<&ResolvedElement> {
        self.element_map
            .get(local_name(name))
            .map(|&idx| &self.elements[idx])
    }

    /// Returns true if `name` is `base` or derives from it.
    #[must_use]
    pub fn is_subtype_of(&self, name: &str, base: &str) -> bool {
        let base = local_name(base);
        self.get_type(name)
            .is_some_and(|t| t.name == base || t.base_chain.iter().any(|b| b == base))
    }

    /// Returns the `(element, type)` pairs a binding registers, in element
    /// declaration order.
    ///
    /// Only elements of a declared complex type get a binding. Abstract
    /// elements and elements of builtin or simple types are left out.
    #[must_use]
    pub fn registrations(&self) -> Vec<(String, String)> {
        self.elements
            .iter()
            .filter(|element| !element.is_abstract)
            .filter_map(|element| {
                let type_name = element.type_name.as_ref()?;
                let resolved = self.get_type(type_name)?;
                (resolved.kind == TypeKind::Complex)
                    .then(|| (element.name.clone(), resolved.name.clone()))
            })
            .collect()
    }
}

/// A type with its inheritance resolved.
#[derive(Debug, Clone)]
pub struct ResolvedType {
    /// Type name.
    pub name: String,
    /// Simple or complex.
    pub kind: TypeKind,
    /// Content model.
    pub content: ContentKind,
    /// Schema base types, nearest first.
    pub base_chain: Vec<String>,
    /// Elements declared by this type.
    pub own_elements: Vec<ElementDecl>,
    /// Inherited elements base first, then own.
    pub all_elements: Vec<ElementDecl>,
    /// Inherited attributes base first, then own.
    pub all_attributes: Vec<AttributeDecl>,
    /// Types deriving directly from this one.
    pub direct_subtypes: Vec<String>,
    /// Whether the type is abstract.
    pub is_abstract: bool,
    /// Rust identifier for the binding.
    pub rust_name: String,
}

impl ResolvedType {
    fn resolve(def: &TypeDef, defs: &[&TypeDef], by_name: &HashMap<&str, &TypeDef>) -> Self {
        let base_chain = base_chain(def, by_name);

        let mut all_elements = Vec::new();
        let mut all_attributes = Vec::new();
        for base in base_chain.iter().rev() {
            if let Some(base_def) = by_name.get(base.as_str()) {
                all_elements.extend(base_def.elements.iter().cloned());
                all_attributes.extend(base_def.attributes.iter().cloned());
            }
        }
        all_elements.extend(def.elements.iter().cloned());
        all_attributes.extend(def.attributes.iter().cloned());

        let direct_subtypes = defs
            .iter()
            .filter(|other| {
                other
                    .base
                    .as_deref()
                    .is_some_and(|base| local_name(base) == def.name)
            })
            .map(|other| other.name.clone())
            .collect();

        Self {
            name: def.name.clone(),
            kind: def.kind,
            content: def.content,
            base_chain,
            own_elements: def.elements.clone(),
            all_elements,
            all_attributes,
            direct_subtypes,
            is_abstract: def.is_abstract,
            rust_name: to_pascal_case(&def.name),
        }
    }

    /// Returns true if this type has no schema base.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.base_chain.is_empty()
    }
}

/// Follows `base` references through schema types, stopping at built-ins,
/// unknown names and the first repeated name.
fn base_chain(def: &TypeDef, by_name: &HashMap<&str, &TypeDef>) -> Vec<String> {
    let mut chain = Vec::new();
    let mut seen = HashSet::from([def.name.as_str()]);
    let mut current = def;

    while let Some(base) = current.base.as_deref().map(local_name) {
        let Some(&next) = by_name.get(base) else {
            break;
        };
        if !seen.insert(next.name.as_str()) {
            break;
        }
        chain.push(next.name.clone());
        current = next;
    }
    chain
}

/// A global element with its substitution relations resolved.
#[derive(Debug, Clone)]
pub struct ResolvedElement {
    /// Element name.
    pub name: String,
    /// Type name, prefix stripped; inline types resolve to `<name>Type`.
    pub type_name: Option<String>,
    /// Substitution group head, prefix stripped.
    pub substitution_head: Option<String>,
    /// Every element that may substitute for this one, transitively, in
    /// breadth-first declaration order.
    pub substitutes: Vec<String>,
    /// Whether the element is abstract.
    pub is_abstract: bool,
}

impl ResolvedElement {
    fn resolve(element: &ElementDecl, schema: &Schema) -> Self {
        let mut substitutes = Vec::new();
        let mut seen = HashSet::from([element.name.as_str()]);
        let mut queue = VecDeque::from([element.name.as_str()]);
        while let Some(head) = queue.pop_front() {
            for member in schema.substitution_members(head) {
                if seen.insert(member.as_str()) {
                    substitutes.push(member.clone());
                    queue.push_back(member.as_str());
                }
            }
        }

        Self {
            name: element.name.clone(),
            type_name: element
                .effective_type_name()
                .map(|name| local_name(name).to_string()),
            substitution_head: element
                .substitution_group
                .as_deref()
                .map(|head| local_name(head).to_string()),
            substitutes,
            is_abstract: element.is_abstract,
        }
    }
}

/// Converts an XSD name to a Rust type identifier.
fn to_pascal_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = true;
    for ch in local_name(name).chars() {
        if ch.is_ascii_alphanumeric() {
            if upper {
                out.push(ch.to_ascii_uppercase());
                upper = false;
            } else {
                out.push(ch);
            }
        } else {
            upper = true;
        }
    }
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}
