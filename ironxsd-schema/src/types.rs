//! Schema type definitions.
//!
//! This module contains the data structures representing XSD schema
//! components: named types, element and attribute declarations, and the
//! substitution group table derived from global elements.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Strips a namespace prefix from a qualified name.
#[must_use]
pub fn local_name(name: &str) -> &str {
    name.rsplit_once(':').map_or(name, |(_, local)| local)
}

/// Complete XSD schema definition.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    /// Target namespace of the root schema document.
    pub target_namespace: Option<String>,
    /// Default form of local element declarations.
    pub element_form_default: FormDefault,
    /// Default form of local attribute declarations.
    pub attribute_form_default: FormDefault,
    /// Named types in declaration order.
    pub types: Vec<TypeDef>,
    /// Global elements in declaration order.
    pub elements: Vec<ElementDecl>,
    /// `schemaLocation` values of `include` directives.
    pub includes: Vec<String>,
    /// `schemaLocation` values of `import` directives.
    pub imports: Vec<String>,
    /// Substitution group head → member elements in declaration order.
    pub substitution_groups: BTreeMap<String, Vec<String>>,
    type_map: HashMap<String, usize>,
    element_map: HashMap<String, usize>,
}

impl Schema {
    /// Creates a new empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a type definition, replacing one of the same name in place.
    ///
    /// Returns true if an earlier definition was replaced.
    pub fn add_type(&mut self, type_def: TypeDef) -> bool {
        if let Some(&idx) = self.type_map.get(&type_def.name) {
            self.types[idx] = type_def;
            return true;
        }
        self.type_map.insert(type_def.name.clone(), self.types.len());
        self.types.push(type_def);
        false
    }

    /// Adds a global element, replacing one of the same name in place.
    ///
    /// Returns true if an earlier declaration was replaced.
    pub fn add_element(&mut self, element: ElementDecl) -> bool {
        if let Some(&idx) = self.element_map.get(&element.name) {
            self.elements[idx] = element;
            return true;
        }
        self.element_map
            .insert(element.name.clone(), self.elements.len());
        self.elements.push(element);
        false
    }

    /// Looks up a type by name, ignoring any prefix.
    #[must_use]
    pub fn get_type(&self, name: &str) -> Option<&TypeDef> {
        self.type_map
            .get(local_name(name))
            .map(|&idx| &self.types[idx])
    }

    /// Looks up a global element by name, ignoring any prefix.
    #[must_use]
    pub fn get_element(&self, name: &str) -> Option<&ElementDecl> {
        self.element_map
            .get(local_name(name))
            .map(|&idx| &self.elements[idx])
    }

    /// Returns true if a type with the given name exists.
    #[must_use]
    pub fn has_type(&self, name: &str) -> bool {
        self.type_map.contains_key(local_name(name))
    }

    /// Returns true if a global element with the given name exists.
    #[must_use]
    pub fn has_element(&self, name: &str) -> bool {
        self.element_map.contains_key(local_name(name))
    }

    /// Returns the direct members of a substitution group.
    #[must_use]
    pub fn substitution_members(&self, head: &str) -> &[String] {
        self.substitution_groups
            .get(local_name(head))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Rebuilds the substitution group table from the global elements.
    pub fn build_substitution_groups(&mut self) {
        self.substitution_groups.clear();
        for element in &self.elements {
            if let Some(head) = &element.substitution_group {
                self.substitution_groups
                    .entry(local_name(head).to_string())
                    .or_default()
                    .push(element.name.clone());
            }
        }
    }
}

/// `elementFormDefault` / `attributeFormDefault` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FormDefault {
    /// Local declarations are unqualified.
    #[default]
    Unqualified,
    /// Local declarations are namespace-qualified.
    Qualified,
}

impl FormDefault {
    /// Parses a form default from its attribute value.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "unqualified" => Some(Self::Unqualified),
            "qualified" => Some(Self::Qualified),
            _ => None,
        }
    }
}

/// Simple or complex type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// `simpleType`.
    Simple,
    /// `complexType`.
    Complex,
}

/// Content model of a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ContentKind {
    /// No child elements and no text.
    Empty,
    /// Text only.
    Simple,
    /// Child elements only.
    #[default]
    Complex,
    /// Child elements interleaved with text.
    Mixed,
}

/// How a type derives from its base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Derivation {
    /// `extension`.
    Extension,
    /// `restriction`.
    Restriction,
}

/// Particle compositor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Compositor {
    /// `sequence`.
    Sequence,
    /// `choice`.
    Choice,
    /// `all`.
    All,
}

impl Compositor {
    /// Parses a compositor from its construct name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "sequence" => Some(Self::Sequence),
            "choice" => Some(Self::Choice),
            "all" => Some(Self::All),
            _ => None,
        }
    }
}

/// Facets of a simple type restriction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimpleFacets {
    /// Restricted base type.
    pub base: Option<String>,
    /// Allowed values, in declaration order.
    pub enumerations: Vec<String>,
    /// Regular expression constraint.
    pub pattern: Option<String>,
    /// Minimum length.
    pub min_length: Option<u32>,
    /// Maximum length.
    pub max_length: Option<u32>,
}

impl SimpleFacets {
    /// Returns true if the facets restrict values to an enumeration.
    #[must_use]
    pub fn is_enumeration(&self) -> bool {
        !self.enumerations.is_empty()
    }
}

/// A named simple or complex type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDef {
    /// Type name.
    pub name: String,
    /// Simple or complex.
    pub kind: TypeKind,
    /// Content model.
    pub content: ContentKind,
    /// Base type of a complex derivation.
    pub base: Option<String>,
    /// Derivation method, set together with `base`.
    pub derivation: Option<Derivation>,
    /// Whether the type is abstract.
    pub is_abstract: bool,
    /// Child elements, nested compositors flattened.
    pub elements: Vec<ElementDecl>,
    /// Attribute declarations.
    pub attributes: Vec<AttributeDecl>,
    /// Outermost compositor.
    pub compositor: Option<Compositor>,
    /// Facets of a simple type.
    pub facets: SimpleFacets,
}

impl TypeDef {
    /// Creates an empty complex type.
    #[must_use]
    pub fn complex(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Complex,
            content: ContentKind::Complex,
            base: None,
            derivation: None,
            is_abstract: false,
            elements: Vec::new(),
            attributes: Vec::new(),
            compositor: None,
            facets: SimpleFacets::default(),
        }
    }

    /// Creates an empty simple type.
    #[must_use]
    pub fn simple(name: impl Into<String>) -> Self {
        Self {
            kind: TypeKind::Simple,
            content: ContentKind::Simple,
            ..Self::complex(name)
        }
    }

    /// Returns true for simple types.
    #[must_use]
    pub const fn is_simple(&self) -> bool {
        matches!(self.kind, TypeKind::Simple)
    }

    /// Returns true for complex types.
    #[must_use]
    pub const fn is_complex(&self) -> bool {
        matches!(self.kind, TypeKind::Complex)
    }

    /// Looks up a child element by name.
    #[must_use]
    pub fn get_element(&self, name: &str) -> Option<&ElementDecl> {
        self.elements.iter().find(|e| e.name == name)
    }

    /// Looks up an attribute by name.
    #[must_use]
    pub fn get_attribute(&self, name: &str) -> Option<&AttributeDecl> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

/// Upper occurrence bound of a particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaxOccurs {
    /// At most this many occurrences.
    Bounded(u32),
    /// `maxOccurs="unbounded"`.
    Unbounded,
}

impl Default for MaxOccurs {
    fn default() -> Self {
        Self::Bounded(1)
    }
}

impl MaxOccurs {
    /// Parses a `maxOccurs` attribute value.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "unbounded" => Some(Self::Unbounded),
            other => other.parse().ok().map(Self::Bounded),
        }
    }

    /// Returns true if `count` occurrences are allowed by this bound.
    #[must_use]
    pub const fn allows(&self, count: u32) -> bool {
        match self {
            Self::Bounded(max) => count <= *max,
            Self::Unbounded => true,
        }
    }

    /// Returns true if more than one occurrence is allowed.
    #[must_use]
    pub const fn is_repeated(&self) -> bool {
        match self {
            Self::Bounded(max) => *max > 1,
            Self::Unbounded => true,
        }
    }
}

impl fmt::Display for MaxOccurs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bounded(max) => write!(f, "{max}"),
            Self::Unbounded => f.write_str("unbounded"),
        }
    }
}

/// An element declaration, global or local.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementDecl {
    /// Element name (the referenced name for `ref=` particles).
    pub name: String,
    /// Named type, as written.
    pub type_name: Option<String>,
    /// Anonymous type declared inline.
    pub inline_type: Option<Box<TypeDef>>,
    /// `ref` attribute, as written.
    pub ref_name: Option<String>,
    /// Substitution group head, as written.
    pub substitution_group: Option<String>,
    /// Minimum occurrences.
    pub min_occurs: u32,
    /// Maximum occurrences.
    pub max_occurs: MaxOccurs,
    /// Default value.
    pub default: Option<String>,
    /// Fixed value.
    pub fixed: Option<String>,
    /// Whether `xsi:nil` is allowed.
    pub nillable: bool,
    /// Whether the element is abstract.
    pub is_abstract: bool,
}

impl ElementDecl {
    /// Creates an element occurring exactly once.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: None,
            inline_type: None,
            ref_name: None,
            substitution_group: None,
            min_occurs: 1,
            max_occurs: MaxOccurs::default(),
            default: None,
            fixed: None,
            nillable: false,
            is_abstract: false,
        }
    }

    /// Sets the named type.
    #[must_use]
    pub fn with_type(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    /// Returns the named type, or the inline type's name.
    #[must_use]
    pub fn effective_type_name(&self) -> Option<&str> {
        self.type_name
            .as_deref()
            .or_else(|| self.inline_type.as_ref().map(|t| t.name.as_str()))
    }

    /// Returns true if the element may be absent.
    #[must_use]
    pub const fn is_optional(&self) -> bool {
        self.min_occurs == 0
    }

    /// Returns true if the element may occur more than once.
    #[must_use]
    pub const fn is_repeated(&self) -> bool {
        self.max_occurs.is_repeated()
    }
}

/// `use` attribute of an attribute declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AttributeUse {
    /// May be absent.
    #[default]
    Optional,
    /// Must be present.
    Required,
    /// Must be absent.
    Prohibited,
}

impl AttributeUse {
    /// Parses a `use` attribute value.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "optional" => Some(Self::Optional),
            "required" => Some(Self::Required),
            "prohibited" => Some(Self::Prohibited),
            _ => None,
        }
    }
}

/// An attribute declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDecl {
    /// Attribute name.
    pub name: String,
    /// Simple type, as written.
    pub type_name: Option<String>,
    /// Default value.
    pub default: Option<String>,
    /// Fixed value.
    pub fixed: Option<String>,
    /// Usage.
    pub usage: AttributeUse,
}

impl AttributeDecl {
    /// Creates an optional attribute.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: None,
            default: None,
            fixed: None,
            usage: AttributeUse::Optional,
        }
    }

    /// Returns true for `use="required"`.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        matches!(self.usage, AttributeUse::Required)
    }
}

/// XSD built-in scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinType {
    /// `xs:string`.
    String,
    /// `xs:int`.
    Int,
    /// `xs:integer`.
    Integer,
    /// `xs:long`.
    Long,
    /// `xs:short`.
    Short,
    /// `xs:byte`.
    Byte,
    /// `xs:unsignedInt`.
    UnsignedInt,
    /// `xs:unsignedLong`.
    UnsignedLong,
    /// `xs:unsignedShort`.
    UnsignedShort,
    /// `xs:unsignedByte`.
    UnsignedByte,
    /// `xs:double`.
    Double,
    /// `xs:float`.
    Float,
    /// `xs:decimal`.
    Decimal,
    /// `xs:boolean`.
    Boolean,
    /// `xs:dateTime`.
    DateTime,
    /// `xs:date`.
    Date,
    /// `xs:time`.
    Time,
}

impl BuiltinType {
    /// Recognizes a built-in type name with or without a prefix.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match local_name(name) {
            "string" => Some(Self::String),
            "int" => Some(Self::Int),
            "integer" => Some(Self::Integer),
            "long" => Some(Self::Long),
            "short" => Some(Self::Short),
            "byte" => Some(Self::Byte),
            "unsignedInt" => Some(Self::UnsignedInt),
            "unsignedLong" => Some(Self::UnsignedLong),
            "unsignedShort" => Some(Self::UnsignedShort),
            "unsignedByte" => Some(Self::UnsignedByte),
            "double" => Some(Self::Double),
            "float" => Some(Self::Float),
            "decimal" => Some(Self::Decimal),
            "boolean" => Some(Self::Boolean),
            "dateTime" => Some(Self::DateTime),
            "date" => Some(Self::Date),
            "time" => Some(Self::Time),
            _ => None,
        }
    }

    /// Returns the unprefixed XSD name.
    #[must_use]
    pub const fn xsd_name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Integer => "integer",
            Self::Long => "long",
            Self::Short => "short",
            Self::Byte => "byte",
            Self::UnsignedInt => "unsignedInt",
            Self::UnsignedLong => "unsignedLong",
            Self::UnsignedShort => "unsignedShort",
            Self::UnsignedByte => "unsignedByte",
            Self::Double => "double",
            Self::Float => "float",
            Self::Decimal => "decimal",
            Self::Boolean => "boolean",
            Self::DateTime => "dateTime",
            Self::Date => "date",
            Self::Time => "time",
        }
    }

    /// Returns the Rust type a binding uses for this scalar.
    #[must_use]
    pub const fn rust_type(&self) -> &'static str {
        match self {
            Self::String => "String",
            Self::Int | Self::Integer => "i32",
            Self::Long => "i64",
            Self::Short => "i16",
            Self::Byte => "i8",
            Self::UnsignedInt => "u32",
            Self::UnsignedLong => "u64",
            Self::UnsignedShort => "u16",
            Self::UnsignedByte => "u8",
            Self::Double | Self::Decimal => "f64",
            Self::Float => "f32",
            Self::Boolean => "bool",
            Self::DateTime => "chrono::NaiveDateTime",
            Self::Date => "chrono::NaiveDate",
            Self::Time => "chrono::NaiveTime",
        }
    }
}
