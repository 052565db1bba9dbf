//! XSD schema parser.
//!
//! This module parses W3C XML Schema documents into the [`Schema`] model.
//! Constructs are matched by local name, so `xs:`, `xsd:` and unprefixed
//! schemas parse alike. Unknown constructs are skipped.

use crate::error::ParseError;
use crate::types::{
    AttributeDecl, AttributeUse, Compositor, ContentKind, Derivation, ElementDecl, FormDefault,
    MaxOccurs, Schema, SimpleFacets, TypeDef, local_name,
};
use ironxsd_core::TextPosition;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

/// Default ceiling on include nesting.
pub const DEFAULT_MAX_INCLUDE_DEPTH: usize = 32;

/// Default ceiling on the number of schema files parsed.
pub const DEFAULT_MAX_FILES: usize = 256;

/// Parses an XSD schema from a string.
///
/// Include and import locations are recorded but not resolved.
///
/// # Arguments
/// * `xsd` - XSD schema content
///
/// # Returns
/// Parsed schema or parse error.
///
/// # Errors
/// Returns `ParseError` if the XML is malformed or a construct carries an
/// invalid attribute.
pub fn parse_schema(xsd: &str) -> Result<Schema, ParseError> {
    let mut parser = SchemaParser::new();
    parser.parse_str(xsd)?;
    Ok(parser.into_schema())
}

/// Accumulating parser for one or more schema documents.
#[derive(Debug)]
pub struct SchemaParser {
    schema: Schema,
    max_depth: usize,
    max_files: usize,
    parsed_files: HashSet<PathBuf>,
    include_depth: usize,
    // Locations named by `parse_str` documents, not yet followed.
    unresolved: Vec<String>,
}

impl Default for SchemaParser {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaParser {
    /// Creates a parser with the default include ceilings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_MAX_INCLUDE_DEPTH, DEFAULT_MAX_FILES)
    }

    /// Creates a parser with explicit include ceilings.
    ///
    /// # Arguments
    /// * `max_depth` - Maximum include nesting below the root file
    /// * `max_files` - Maximum number of distinct files parsed
    #[must_use]
    pub fn with_limits(max_depth: usize, max_files: usize) -> Self {
        Self {
            schema: Schema::new(),
            max_depth,
            max_files,
            parsed_files: HashSet::new(),
            include_depth: 0,
            unresolved: Vec::new(),
        }
    }

    /// Returns the schema parsed so far.
    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Consumes the parser and returns the schema.
    #[must_use]
    pub fn into_schema(self) -> Schema {
        self.schema
    }

    /// Parses a schema document into the accumulated model.
    ///
    /// # Errors
    /// Returns `ParseError` on malformed markup or invalid attributes.
    pub fn parse_str(&mut self, xsd: &str) -> Result<(), ParseError> {
        let includes_before = self.schema.includes.len();
        let imports_before = self.schema.imports.len();
        self.parse_document(xsd)?;
        self.unresolved.extend(
            self.schema.includes[includes_before..]
                .iter()
                .chain(&self.schema.imports[imports_before..])
                .cloned(),
        );
        self.schema.build_substitution_groups();
        Ok(())
    }

    /// Parses a schema file and every file it includes or imports.
    ///
    /// Locations are resolved relative to the directory of the file that
    /// names them. A file reached twice is parsed once.
    ///
    /// # Errors
    /// Returns `ParseError::Io` if a file cannot be read,
    /// `ParseError::IncludeLimit` when a ceiling is exceeded, and
    /// `ParseError::UnsupportedLocation` for remote locations.
    pub fn parse_file(&mut self, path: impl AsRef<Path>) -> Result<(), ParseError> {
        self.parse_file_at(path.as_ref())?;
        self.schema.build_substitution_groups();
        Ok(())
    }

    /// Resolves the includes and imports named by documents given to
    /// [`SchemaParser::parse_str`] against `base_dir`.
    ///
    /// Locations reached through [`SchemaParser::parse_file`] are already
    /// resolved relative to their own file and are not revisited.
    ///
    /// # Errors
    /// Same as [`SchemaParser::parse_file`].
    pub fn resolve_includes(&mut self, base_dir: impl AsRef<Path>) -> Result<(), ParseError> {
        let locations = std::mem::take(&mut self.unresolved);
        self.resolve_locations(&locations, base_dir.as_ref())?;
        self.schema.build_substitution_groups();
        Ok(())
    }

    fn parse_file_at(&mut self, path: &Path) -> Result<(), ParseError> {
        let canonical = path
            .canonicalize()
            .map_err(|source| ParseError::io(path, source))?;
        if self.parsed_files.contains(&canonical) {
            debug!(path = %canonical.display(), "schema already parsed, skipping");
            return Ok(());
        }
        if self.parsed_files.len() >= self.max_files {
            return Err(ParseError::IncludeLimit {
                location: path.display().to_string(),
                limit_kind: "file count",
                limit: self.max_files,
            });
        }
        self.parsed_files.insert(canonical.clone());

        let content = std::fs::read_to_string(&canonical)
            .map_err(|source| ParseError::io(&canonical, source))?;
        debug!(path = %canonical.display(), depth = self.include_depth, "parsing schema file");

        let includes_before = self.schema.includes.len();
        let imports_before = self.schema.imports.len();
        self.parse_document(&content)?;

        let locations: Vec<String> = self.schema.includes[includes_before..]
            .iter()
            .chain(&self.schema.imports[imports_before..])
            .cloned()
            .collect();
        let base_dir = canonical.parent().unwrap_or_else(|| Path::new("."));
        self.resolve_locations(&locations, base_dir)
    }

    fn resolve_locations(&mut self, locations: &[String], base_dir: &Path) -> Result<(), ParseError> {
        let Some(first) = locations.first() else {
            return Ok(());
        };
        if self.include_depth >= self.max_depth {
            return Err(ParseError::IncludeLimit {
                location: first.clone(),
                limit_kind: "depth",
                limit: self.max_depth,
            });
        }

        self.include_depth += 1;
        let mut result = Ok(());
        for location in locations {
            if let Err(err) = self.resolve_location(location, base_dir) {
                result = Err(err);
                break;
            }
        }
        self.include_depth -= 1;
        result
    }

    fn resolve_location(&mut self, location: &str, base_dir: &Path) -> Result<(), ParseError> {
        if location.contains("://") {
            return Err(ParseError::UnsupportedLocation {
                location: location.to_string(),
            });
        }
        debug!(location, base = %base_dir.display(), "resolving schema location");
        self.parse_file_at(&base_dir.join(location))
    }

    fn parse_document(&mut self, xsd: &str) -> Result<(), ParseError> {
        let mut cur = Cursor::new(xsd);
        let mut found = false;

        loop {
            match cur.next_event()? {
                Event::Start(e) => {
                    let name = element_name(&e)?;
                    if name == "schema" {
                        self.parse_schema_element(&mut cur, &e)?;
                        found = true;
                    } else {
                        cur.skip(name)?;
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if found {
            Ok(())
        } else {
            Err(ParseError::InvalidStructure {
                message: "no schema element found".to_string(),
            })
        }
    }

    /// Parses the `schema` element and its top-level declarations.
    fn parse_schema_element(
        &mut self,
        cur: &mut Cursor<'_>,
        e: &BytesStart<'_>,
    ) -> Result<(), ParseError> {
        // Included files never override the root file's header.
        if self.include_depth == 0 {
            for (key, value) in attributes(e)? {
                match key.as_str() {
                    "targetNamespace" => self.schema.target_namespace = Some(value),
                    "elementFormDefault" => {
                        self.schema.element_form_default = FormDefault::parse(&value)
                            .ok_or_else(|| {
                                ParseError::invalid_attr("schema", "elementFormDefault", &value)
                            })?
                    }
                    "attributeFormDefault" => {
                        self.schema.attribute_form_default = FormDefault::parse(&value)
                            .ok_or_else(|| {
                                ParseError::invalid_attr("schema", "attributeFormDefault", &value)
                            })?
                    }
                    _ => {}
                }
            }
        }

        for_each_child(cur, "schema", |cur, child, e| {
            match child {
                "element" => {
                    let element = parse_element(cur, e)?;
                    let name = element.name.clone();
                    if self.schema.add_element(element) {
                        warn!(element = %name, "duplicate element declaration replaced");
                    }
                }
                "complexType" => {
                    let type_def = parse_complex_type(cur, e, None)?;
                    self.add_type(type_def);
                }
                "simpleType" => {
                    let type_def = parse_simple_type(cur, e, None)?;
                    self.add_type(type_def);
                }
                "include" => {
                    let location = required(e, "include", "schemaLocation")?;
                    self.schema.includes.push(location);
                    cur.skip(child)?;
                }
                "import" => {
                    if let Some(location) = attribute(e, "schemaLocation")? {
                        self.schema.imports.push(location);
                    }
                    cur.skip(child)?;
                }
                _ => {
                    trace!(construct = child, "skipping schema construct");
                    cur.skip(child)?;
                }
            }
            Ok(())
        })
    }

    fn add_type(&mut self, type_def: TypeDef) {
        let name = type_def.name.clone();
        if self.schema.add_type(type_def) {
            warn!(type_name = %name, "duplicate type definition replaced");
        }
    }
}

/// Event source over one schema document.
struct Cursor<'a> {
    reader: Reader<&'a [u8]>,
    input: &'a [u8],
}

impl<'a> Cursor<'a> {
    fn new(xsd: &'a str) -> Self {
        let mut reader = Reader::from_str(xsd);
        reader.config_mut().trim_text(true);
        reader.config_mut().expand_empty_elements = true;
        Self {
            reader,
            input: xsd.as_bytes(),
        }
    }

    fn next_event(&mut self) -> Result<Event<'a>, ParseError> {
        self.reader
            .read_event()
            .map_err(|err| ParseError::syntax(self.position(), err.to_string()))
    }

    fn position(&self) -> TextPosition {
        TextPosition::locate(self.input, self.reader.buffer_position() as usize)
    }

    fn eof(&self, construct: &str) -> ParseError {
        ParseError::syntax(
            self.position(),
            format!("unexpected end of input inside '{construct}'"),
        )
    }

    /// Consumes everything up to and including the current element's end.
    fn skip(&mut self, construct: &str) -> Result<(), ParseError> {
        let mut depth = 0usize;
        loop {
            match self.next_event()? {
                Event::Start(_) => depth += 1,
                Event::End(_) if depth == 0 => return Ok(()),
                Event::End(_) => depth -= 1,
                Event::Eof => return Err(self.eof(construct)),
                _ => {}
            }
        }
    }
}

/// Feeds each child start tag of the current element to `handle`, which
/// must consume the child through its end tag.
fn for_each_child<'a, F>(cur: &mut Cursor<'a>, parent: &str, mut handle: F) -> Result<(), ParseError>
where
    F: FnMut(&mut Cursor<'a>, &str, &BytesStart<'a>) -> Result<(), ParseError>,
{
    loop {
        match cur.next_event()? {
            Event::Start(e) => {
                let name = element_name(&e)?;
                handle(cur, name, &e)?;
            }
            Event::End(_) => return Ok(()),
            Event::Eof => return Err(cur.eof(parent)),
            _ => {}
        }
    }
}

fn element_name<'e>(e: &'e BytesStart<'_>) -> Result<&'e str, ParseError> {
    Ok(std::str::from_utf8(e.local_name().into_inner())?)
}

/// Collects unescaped attributes keyed by local name.
fn attributes(e: &BytesStart<'_>) -> Result<Vec<(String, String)>, ParseError> {
    let mut attrs = Vec::new();
    for attr in e.attributes().flatten() {
        let qualified = attr.key.as_ref();
        if qualified == b"xmlns" || qualified.starts_with(b"xmlns:") {
            continue;
        }
        let key = std::str::from_utf8(attr.key.local_name().into_inner())?;
        let raw = std::str::from_utf8(&attr.value)?;
        let value = quick_xml::escape::unescape(raw)?;
        attrs.push((key.to_string(), value.into_owned()));
    }
    Ok(attrs)
}

fn attribute(e: &BytesStart<'_>, name: &str) -> Result<Option<String>, ParseError> {
    Ok(attributes(e)?
        .into_iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value))
}

fn required(e: &BytesStart<'_>, construct: &str, name: &str) -> Result<String, ParseError> {
    attribute(e, name)?.ok_or_else(|| ParseError::missing_attr(construct, name))
}

fn parse_bool(construct: &str, attr: &str, value: &str) -> Result<bool, ParseError> {
    match value.trim() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(ParseError::invalid_attr(construct, attr, value)),
    }
}

fn parse_count(construct: &str, attr: &str, value: &str) -> Result<u32, ParseError> {
    value
        .trim()
        .parse()
        .map_err(|_| ParseError::invalid_attr(construct, attr, value))
}

/// Parses an element declaration, global or local.
fn parse_element(cur: &mut Cursor<'_>, e: &BytesStart<'_>) -> Result<ElementDecl, ParseError> {
    let mut name = None;
    let mut element = ElementDecl::new(String::new());

    for (key, value) in attributes(e)? {
        match key.as_str() {
            "name" => name = Some(value),
            "ref" => element.ref_name = Some(value),
            "type" => element.type_name = Some(value),
            "substitutionGroup" => element.substitution_group = Some(value),
            "minOccurs" => element.min_occurs = parse_count("element", "minOccurs", &value)?,
            "maxOccurs" => {
                element.max_occurs = MaxOccurs::parse(&value)
                    .ok_or_else(|| ParseError::invalid_attr("element", "maxOccurs", &value))?
            }
            "default" => element.default = Some(value),
            "fixed" => element.fixed = Some(value),
            "nillable" => element.nillable = parse_bool("element", "nillable", &value)?,
            "abstract" => element.is_abstract = parse_bool("element", "abstract", &value)?,
            _ => {}
        }
    }

    element.name = match (name, &element.ref_name) {
        (Some(name), _) => name,
        (None, Some(reference)) => local_name(reference).to_string(),
        (None, None) => return Err(ParseError::missing_attr("element", "name")),
    };

    let inline_name = format!("{}Type", element.name);
    for_each_child(cur, "element", |cur, child, e| {
        match child {
            "complexType" => {
                let inline = parse_complex_type(cur, e, Some(&inline_name))?;
                element.inline_type = Some(Box::new(inline));
            }
            "simpleType" => {
                let inline = parse_simple_type(cur, e, Some(&inline_name))?;
                element.inline_type = Some(Box::new(inline));
            }
            _ => cur.skip(child)?,
        }
        Ok(())
    })?;

    Ok(element)
}

/// Parses a `complexType`, named by `fallback_name` when anonymous.
fn parse_complex_type(
    cur: &mut Cursor<'_>,
    e: &BytesStart<'_>,
    fallback_name: Option<&str>,
) -> Result<TypeDef, ParseError> {
    let mut name = None;
    let mut is_abstract = false;
    let mut mixed = false;

    for (key, value) in attributes(e)? {
        match key.as_str() {
            "name" => name = Some(value),
            "abstract" => is_abstract = parse_bool("complexType", "abstract", &value)?,
            "mixed" => mixed = parse_bool("complexType", "mixed", &value)?,
            _ => {}
        }
    }

    let name = name
        .or_else(|| fallback_name.map(str::to_string))
        .ok_or_else(|| ParseError::missing_attr("complexType", "name"))?;
    let mut type_def = TypeDef::complex(name);
    type_def.is_abstract = is_abstract;

    for_each_child(cur, "complexType", |cur, child, e| {
        if let Some(compositor) = Compositor::parse(child) {
            if type_def.compositor.is_none() {
                type_def.compositor = Some(compositor);
            }
            return parse_compositor(cur, child, &mut type_def);
        }
        match child {
            "attribute" => type_def.attributes.push(parse_attribute(cur, e)?),
            "complexContent" => parse_content(cur, e, ContentKind::Complex, &mut type_def)?,
            "simpleContent" => parse_content(cur, e, ContentKind::Simple, &mut type_def)?,
            _ => {
                trace!(construct = child, "skipping complexType construct");
                cur.skip(child)?;
            }
        }
        Ok(())
    })?;

    if type_def.elements.is_empty()
        && type_def.base.is_none()
        && type_def.content == ContentKind::Complex
    {
        type_def.content = ContentKind::Empty;
    }
    if mixed {
        type_def.content = ContentKind::Mixed;
    }

    Ok(type_def)
}

/// Parses a `sequence`, `choice` or `all`, flattening nested compositors.
fn parse_compositor(
    cur: &mut Cursor<'_>,
    construct: &str,
    type_def: &mut TypeDef,
) -> Result<(), ParseError> {
    for_each_child(cur, construct, |cur, child, e| {
        match child {
            "element" => type_def.elements.push(parse_element(cur, e)?),
            "sequence" | "choice" | "all" => parse_compositor(cur, child, type_def)?,
            _ => {
                trace!(construct = child, "skipping particle");
                cur.skip(child)?;
            }
        }
        Ok(())
    })
}

/// Parses `simpleContent` or `complexContent`.
fn parse_content(
    cur: &mut Cursor<'_>,
    e: &BytesStart<'_>,
    kind: ContentKind,
    type_def: &mut TypeDef,
) -> Result<(), ParseError> {
    let construct = if kind == ContentKind::Simple {
        "simpleContent"
    } else {
        "complexContent"
    };

    if kind == ContentKind::Simple {
        type_def.content = ContentKind::Simple;
    }
    if let Some(value) = attribute(e, "mixed")? {
        if parse_bool(construct, "mixed", &value)? {
            type_def.content = ContentKind::Mixed;
        }
    }

    for_each_child(cur, construct, |cur, child, e| {
        match child {
            "extension" => parse_derivation(cur, e, Derivation::Extension, type_def)?,
            "restriction" => parse_derivation(cur, e, Derivation::Restriction, type_def)?,
            _ => cur.skip(child)?,
        }
        Ok(())
    })
}

/// Parses an `extension` or `restriction` of a complex type's content.
fn parse_derivation(
    cur: &mut Cursor<'_>,
    e: &BytesStart<'_>,
    derivation: Derivation,
    type_def: &mut TypeDef,
) -> Result<(), ParseError> {
    let construct = match derivation {
        Derivation::Extension => "extension",
        Derivation::Restriction => "restriction",
    };
    type_def.base = Some(required(e, construct, "base")?);
    type_def.derivation = Some(derivation);

    for_each_child(cur, construct, |cur, child, e| {
        if let Some(compositor) = Compositor::parse(child) {
            if type_def.compositor.is_none() {
                type_def.compositor = Some(compositor);
            }
            return parse_compositor(cur, child, type_def);
        }
        if child == "attribute" {
            type_def.attributes.push(parse_attribute(cur, e)?);
            return Ok(());
        }
        apply_facet(child, e, &mut type_def.facets)?;
        cur.skip(child)
    })
}

/// Parses a `simpleType`, named by `fallback_name` when anonymous.
fn parse_simple_type(
    cur: &mut Cursor<'_>,
    e: &BytesStart<'_>,
    fallback_name: Option<&str>,
) -> Result<TypeDef, ParseError> {
    let name = attribute(e, "name")?
        .or_else(|| fallback_name.map(str::to_string))
        .ok_or_else(|| ParseError::missing_attr("simpleType", "name"))?;
    let mut type_def = TypeDef::simple(name);

    for_each_child(cur, "simpleType", |cur, child, e| {
        if child != "restriction" {
            trace!(construct = child, "skipping simpleType construct");
            return cur.skip(child);
        }
        type_def.facets.base = attribute(e, "base")?;
        for_each_child(cur, "restriction", |cur, facet, e| {
            apply_facet(facet, e, &mut type_def.facets)?;
            cur.skip(facet)
        })
    })?;

    Ok(type_def)
}

/// Records a facet. Non-facet constructs are ignored.
fn apply_facet(
    facet: &str,
    e: &BytesStart<'_>,
    facets: &mut SimpleFacets,
) -> Result<(), ParseError> {
    match facet {
        "enumeration" => facets.enumerations.push(required(e, facet, "value")?),
        "pattern" => facets.pattern = Some(required(e, facet, "value")?),
        "length" => {
            let length = parse_count(facet, "value", &required(e, facet, "value")?)?;
            facets.min_length = Some(length);
            facets.max_length = Some(length);
        }
        "minLength" => {
            facets.min_length = Some(parse_count(facet, "value", &required(e, facet, "value")?)?)
        }
        "maxLength" => {
            facets.max_length = Some(parse_count(facet, "value", &required(e, facet, "value")?)?)
        }
        _ => {}
    }
    Ok(())
}

/// Parses an attribute declaration.
fn parse_attribute(cur: &mut Cursor<'_>, e: &BytesStart<'_>) -> Result<AttributeDecl, ParseError> {
    let mut name = None;
    let mut reference = None;
    let mut attr = AttributeDecl::new(String::new());

    for (key, value) in attributes(e)? {
        match key.as_str() {
            "name" => name = Some(value),
            "ref" => reference = Some(value),
            "type" => attr.type_name = Some(value),
            "default" => attr.default = Some(value),
            "fixed" => attr.fixed = Some(value),
            "use" => {
                attr.usage = AttributeUse::parse(&value)
                    .ok_or_else(|| ParseError::invalid_attr("attribute", "use", &value))?
            }
            _ => {}
        }
    }

    attr.name = match (name, reference) {
        (Some(name), _) => name,
        (None, Some(reference)) => local_name(&reference).to_string(),
        (None, None) => return Err(ParseError::missing_attr("attribute", "name")),
    };
    cur.skip("attribute")?;

    Ok(attr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeKind;
    use std::fs;

    const VEHICLE_XSD: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
           xmlns:tns="http://example.com/fleet"
           targetNamespace="http://example.com/fleet"
           elementFormDefault="qualified">
  <xs:annotation>
    <xs:documentation>Fleet model</xs:documentation>
  </xs:annotation>

  <xs:element name="car" type="tns:CarType" substitutionGroup="tns:vehicle"/>

  <xs:complexType name="VehicleType">
    <xs:sequence>
      <xs:element name="licensePlate" type="xs:string"/>
      <xs:element name="year" type="xs:int"/>
      <xs:element name="manufacturer" type="xs:string" minOccurs="0"/>
    </xs:sequence>
    <xs:attribute name="id" type="xs:string" use="required"/>
  </xs:complexType>

  <xs:complexType name="CarType">
    <xs:complexContent>
      <xs:extension base="tns:VehicleType">
        <xs:sequence>
          <xs:element name="numDoors" type="xs:int"/>
          <xs:element name="trunkCapacity" type="xs:double"/>
        </xs:sequence>
      </xs:extension>
    </xs:complexContent>
  </xs:complexType>

  <xs:complexType name="TruckType">
    <xs:complexContent>
      <xs:extension base="tns:VehicleType">
        <xs:sequence>
          <xs:element name="payloadCapacity" type="xs:double"/>
          <xs:element name="numAxles" type="xs:int"/>
        </xs:sequence>
      </xs:extension>
    </xs:complexContent>
  </xs:complexType>

  <xs:complexType name="FleetType">
    <xs:sequence>
      <xs:element name="name" type="xs:string"/>
      <xs:element ref="tns:vehicle" minOccurs="0" maxOccurs="unbounded"/>
    </xs:sequence>
  </xs:complexType>

  <xs:element name="vehicle" type="tns:VehicleType"/>
  <xs:element name="truck" type="tns:TruckType" substitutionGroup="tns:vehicle"/>
  <xs:element name="fleet" type="tns:FleetType"/>
</xs:schema>
"#;

    #[test]
    fn test_parse_vehicle_schema() {
        let schema = parse_schema(VEHICLE_XSD).unwrap();
        assert_eq!(
            schema.target_namespace.as_deref(),
            Some("http://example.com/fleet")
        );
        assert_eq!(schema.element_form_default, FormDefault::Qualified);
        assert_eq!(schema.attribute_form_default, FormDefault::Unqualified);

        let names: Vec<_> = schema.types.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["VehicleType", "CarType", "TruckType", "FleetType"]);

        let vehicle = schema.get_type("VehicleType").unwrap();
        assert_eq!(vehicle.kind, TypeKind::Complex);
        assert_eq!(vehicle.compositor, Some(Compositor::Sequence));
        assert_eq!(vehicle.elements.len(), 3);
        assert!(vehicle.get_element("manufacturer").unwrap().is_optional());
        assert!(vehicle.get_attribute("id").unwrap().is_required());

        let car = schema.get_type("CarType").unwrap();
        assert_eq!(car.base.as_deref(), Some("tns:VehicleType"));
        assert_eq!(car.derivation, Some(Derivation::Extension));
        assert_eq!(car.elements.len(), 2);
        assert_eq!(car.content, ContentKind::Complex);
    }

    #[test]
    fn test_forward_substitution_reference() {
        let schema = parse_schema(VEHICLE_XSD).unwrap();
        assert_eq!(schema.substitution_members("vehicle"), ["car", "truck"]);
    }

    #[test]
    fn test_element_ref_and_unbounded() {
        let schema = parse_schema(VEHICLE_XSD).unwrap();
        let fleet = schema.get_type("FleetType").unwrap();
        let vehicles = fleet.get_element("vehicle").unwrap();
        assert_eq!(vehicles.ref_name.as_deref(), Some("tns:vehicle"));
        assert_eq!(vehicles.min_occurs, 0);
        assert_eq!(vehicles.max_occurs, MaxOccurs::Unbounded);
    }

    #[test]
    fn test_prefix_agnostic() {
        let xsd = r#"<schema xmlns="http://www.w3.org/2001/XMLSchema">
            <element name="a" type="string"/>
        </schema>"#;
        let schema = parse_schema(xsd).unwrap();
        assert_eq!(schema.get_element("a").unwrap().type_name.as_deref(), Some("string"));

        let xsd = r#"<xsd:schema xmlns:xsd="http://www.w3.org/2001/XMLSchema">
            <xsd:element name="b" type="xsd:int"/>
        </xsd:schema>"#;
        assert!(parse_schema(xsd).unwrap().has_element("b"));
    }

    #[test]
    fn test_inline_types_named_after_element() {
        let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
          <xs:element name="garage">
            <xs:complexType>
              <xs:sequence>
                <xs:element name="level">
                  <xs:simpleType>
                    <xs:restriction base="xs:int"/>
                  </xs:simpleType>
                </xs:element>
              </xs:sequence>
            </xs:complexType>
          </xs:element>
        </xs:schema>"#;
        let schema = parse_schema(xsd).unwrap();
        let garage = schema.get_element("garage").unwrap();
        let inline = garage.inline_type.as_ref().unwrap();
        assert_eq!(inline.name, "garageType");
        assert_eq!(garage.effective_type_name(), Some("garageType"));

        let level = inline.get_element("level").unwrap();
        let level_type = level.inline_type.as_ref().unwrap();
        assert_eq!(level_type.name, "levelType");
        assert!(level_type.is_simple());
        assert_eq!(level_type.facets.base.as_deref(), Some("xs:int"));
        assert!(schema.types.is_empty());
    }

    #[test]
    fn test_nested_compositors_flattened() {
        let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
          <xs:complexType name="T">
            <xs:sequence>
              <xs:element name="a" type="xs:string"/>
              <xs:choice>
                <xs:element name="b" type="xs:string"/>
                <xs:sequence>
                  <xs:element name="c" type="xs:string"/>
                </xs:sequence>
              </xs:choice>
              <xs:any/>
            </xs:sequence>
          </xs:complexType>
        </xs:schema>"#;
        let schema = parse_schema(xsd).unwrap();
        let t = schema.get_type("T").unwrap();
        let names: Vec<_> = t.elements.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);
        assert_eq!(t.compositor, Some(Compositor::Sequence));
    }

    #[test]
    fn test_simple_type_facets() {
        let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
          <xs:simpleType name="ColorType">
            <xs:annotation><xs:documentation>colors</xs:documentation></xs:annotation>
            <xs:restriction base="xs:string">
              <xs:enumeration value="red"/>
              <xs:enumeration value="green"/>
              <xs:enumeration value="a &amp; b"/>
            </xs:restriction>
          </xs:simpleType>
          <xs:simpleType name="PlateType">
            <xs:restriction base="xs:string">
              <xs:pattern value="[A-Z]{3}-[0-9]+"/>
              <xs:length value="7"/>
            </xs:restriction>
          </xs:simpleType>
          <xs:simpleType name="NameType">
            <xs:restriction base="xs:string">
              <xs:minLength value="1"/>
              <xs:maxLength value="64"/>
            </xs:restriction>
          </xs:simpleType>
        </xs:schema>"#;
        let schema = parse_schema(xsd).unwrap();

        let color = schema.get_type("ColorType").unwrap();
        assert!(color.is_simple());
        assert_eq!(color.facets.base.as_deref(), Some("xs:string"));
        assert_eq!(color.facets.enumerations, ["red", "green", "a & b"]);

        let plate = schema.get_type("PlateType").unwrap();
        assert_eq!(plate.facets.pattern.as_deref(), Some("[A-Z]{3}-[0-9]+"));
        assert_eq!(plate.facets.min_length, Some(7));
        assert_eq!(plate.facets.max_length, Some(7));

        let name = schema.get_type("NameType").unwrap();
        assert_eq!(name.facets.min_length, Some(1));
        assert_eq!(name.facets.max_length, Some(64));
    }

    #[test]
    fn test_content_kinds() {
        let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
          <xs:complexType name="Marker"/>
          <xs:complexType name="Note" mixed="true">
            <xs:sequence><xs:element name="b" type="xs:string"/></xs:sequence>
          </xs:complexType>
          <xs:complexType name="Price">
            <xs:simpleContent>
              <xs:extension base="xs:decimal">
                <xs:attribute name="currency" type="xs:string" default="EUR"/>
              </xs:extension>
            </xs:simpleContent>
          </xs:complexType>
          <xs:complexType name="Remark">
            <xs:complexContent mixed="1">
              <xs:extension base="Note"/>
            </xs:complexContent>
          </xs:complexType>
        </xs:schema>"#;
        let schema = parse_schema(xsd).unwrap();
        assert_eq!(schema.get_type("Marker").unwrap().content, ContentKind::Empty);
        assert_eq!(schema.get_type("Note").unwrap().content, ContentKind::Mixed);
        assert_eq!(schema.get_type("Remark").unwrap().content, ContentKind::Mixed);

        let price = schema.get_type("Price").unwrap();
        assert_eq!(price.content, ContentKind::Simple);
        assert_eq!(price.base.as_deref(), Some("xs:decimal"));
        let currency = price.get_attribute("currency").unwrap();
        assert_eq!(currency.default.as_deref(), Some("EUR"));
        assert!(!currency.is_required());
    }

    #[test]
    fn test_restriction_derivation() {
        let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
          <xs:complexType name="Base">
            <xs:sequence><xs:element name="a" type="xs:string" maxOccurs="5"/></xs:sequence>
          </xs:complexType>
          <xs:complexType name="Narrow">
            <xs:complexContent>
              <xs:restriction base="Base">
                <xs:sequence><xs:element name="a" type="xs:string" maxOccurs="2"/></xs:sequence>
              </xs:restriction>
            </xs:complexContent>
          </xs:complexType>
        </xs:schema>"#;
        let schema = parse_schema(xsd).unwrap();
        let narrow = schema.get_type("Narrow").unwrap();
        assert_eq!(narrow.derivation, Some(Derivation::Restriction));
        assert_eq!(narrow.elements[0].max_occurs, MaxOccurs::Bounded(2));
    }

    #[test]
    fn test_element_flags() {
        let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
          <xs:element name="base" type="xs:string" abstract="true" nillable="1"
                      default="x" fixed="y"/>
        </xs:schema>"#;
        let schema = parse_schema(xsd).unwrap();
        let base = schema.get_element("base").unwrap();
        assert!(base.is_abstract);
        assert!(base.nillable);
        assert_eq!(base.default.as_deref(), Some("x"));
        assert_eq!(base.fixed.as_deref(), Some("y"));
    }

    #[test]
    fn test_invalid_attribute_values() {
        let cases = [
            r#"<xs:element name="a" maxOccurs="lots"/>"#,
            r#"<xs:element name="a" minOccurs="-1"/>"#,
            r#"<xs:element name="a" nillable="yes"/>"#,
            r#"<xs:complexType name="T"><xs:attribute name="x" use="maybe"/></xs:complexType>"#,
        ];
        for body in cases {
            let xsd = format!(
                r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">{body}</xs:schema>"#
            );
            let err = parse_schema(&xsd).unwrap_err();
            assert!(
                matches!(err, ParseError::InvalidAttribute { .. }),
                "{body}: {err:?}"
            );
        }
    }

    #[test]
    fn test_missing_names() {
        let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
          <xs:complexType><xs:sequence/></xs:complexType>
        </xs:schema>"#;
        match parse_schema(xsd).unwrap_err() {
            ParseError::MissingAttribute { element, attribute } => {
                assert_eq!(element, "complexType");
                assert_eq!(attribute, "name");
            }
            other => panic!("unexpected error {other:?}"),
        }

        let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
          <xs:element type="xs:string"/>
        </xs:schema>"#;
        assert!(matches!(
            parse_schema(xsd).unwrap_err(),
            ParseError::MissingAttribute { .. }
        ));
    }

    #[test]
    fn test_syntax_error_position() {
        let xsd = "<xs:schema xmlns:xs=\"http://www.w3.org/2001/XMLSchema\">\n  <xs:element name=\"a\">\n</xs:schema>";
        match parse_schema(xsd).unwrap_err() {
            ParseError::Syntax { line, column, .. } => {
                assert_eq!(line, 3);
                assert!(column >= 1);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_truncated_input() {
        let xsd = "<xs:schema xmlns:xs=\"http://www.w3.org/2001/XMLSchema\"><xs:complexType name=\"T\">";
        assert!(matches!(
            parse_schema(xsd).unwrap_err(),
            ParseError::Syntax { .. }
        ));
    }

    #[test]
    fn test_no_schema_element() {
        assert!(matches!(
            parse_schema("<root/>").unwrap_err(),
            ParseError::InvalidStructure { .. }
        ));
    }

    #[test]
    fn test_duplicate_type_replaced() {
        let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
          <xs:complexType name="T"><xs:sequence><xs:element name="a" type="xs:string"/></xs:sequence></xs:complexType>
          <xs:complexType name="T"><xs:sequence><xs:element name="b" type="xs:string"/></xs:sequence></xs:complexType>
        </xs:schema>"#;
        let schema = parse_schema(xsd).unwrap();
        assert_eq!(schema.types.len(), 1);
        assert!(schema.get_type("T").unwrap().get_element("b").is_some());
    }

    #[test]
    fn test_records_includes_and_imports() {
        let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
          <xs:include schemaLocation="common.xsd"/>
          <xs:import namespace="urn:other" schemaLocation="other.xsd"/>
          <xs:import namespace="urn:bare"/>
          <xs:group name="ignored"><xs:sequence/></xs:group>
        </xs:schema>"#;
        let schema = parse_schema(xsd).unwrap();
        assert_eq!(schema.includes, ["common.xsd"]);
        assert_eq!(schema.imports, ["other.xsd"]);
    }

    fn write(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(
            &path,
            format!(r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">{body}</xs:schema>"#),
        )
        .unwrap();
        path
    }

    #[test]
    fn test_includes_resolved_relative_and_memoized() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("common")).unwrap();
        write(
            dir.path(),
            "root.xsd",
            r#"<xs:include schemaLocation="common/a.xsd"/>
               <xs:include schemaLocation="common/b.xsd"/>
               <xs:element name="root" type="AType"/>"#,
        );
        write(
            &dir.path().join("common"),
            "a.xsd",
            r#"<xs:include schemaLocation="b.xsd"/><xs:complexType name="AType"/>"#,
        );
        write(
            &dir.path().join("common"),
            "b.xsd",
            r#"<xs:complexType name="BType"/>"#,
        );

        let mut parser = SchemaParser::new();
        parser.parse_file(dir.path().join("root.xsd")).unwrap();
        let schema = parser.schema();
        assert!(schema.has_type("AType"));
        assert!(schema.has_type("BType"));
        assert_eq!(schema.types.len(), 2);
        assert!(schema.has_element("root"));
    }

    #[test]
    fn test_root_namespace_wins() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("root.xsd"),
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" targetNamespace="urn:root">
                 <xs:include schemaLocation="inc.xsd"/>
               </xs:schema>"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("inc.xsd"),
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" targetNamespace="urn:inc"
                          elementFormDefault="qualified">
                 <xs:element name="x" type="xs:string"/>
               </xs:schema>"#,
        )
        .unwrap();

        let mut parser = SchemaParser::new();
        parser.parse_file(dir.path().join("root.xsd")).unwrap();
        let schema = parser.into_schema();
        assert_eq!(schema.target_namespace.as_deref(), Some("urn:root"));
        assert_eq!(schema.element_form_default, FormDefault::Unqualified);
        assert!(schema.has_element("x"));
    }

    #[test]
    fn test_include_cycle_terminates() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.xsd", r#"<xs:include schemaLocation="b.xsd"/><xs:element name="a" type="xs:string"/>"#);
        write(dir.path(), "b.xsd", r#"<xs:include schemaLocation="a.xsd"/><xs:element name="b" type="xs:string"/>"#);

        let mut parser = SchemaParser::new();
        parser.parse_file(dir.path().join("a.xsd")).unwrap();
        assert_eq!(parser.schema().elements.len(), 2);
    }

    #[test]
    fn test_include_depth_limit() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.xsd", r#"<xs:include schemaLocation="b.xsd"/>"#);
        write(dir.path(), "b.xsd", r#"<xs:include schemaLocation="c.xsd"/>"#);
        write(dir.path(), "c.xsd", "");

        let mut parser = SchemaParser::with_limits(1, 16);
        match parser.parse_file(dir.path().join("a.xsd")).unwrap_err() {
            ParseError::IncludeLimit {
                location,
                limit_kind,
                limit,
            } => {
                assert_eq!(location, "c.xsd");
                assert_eq!(limit_kind, "depth");
                assert_eq!(limit, 1);
            }
            other => panic!("unexpected error {other:?}"),
        }

        let mut parser = SchemaParser::with_limits(2, 16);
        assert!(parser.parse_file(dir.path().join("a.xsd")).is_ok());
    }

    #[test]
    fn test_file_count_limit() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "root.xsd",
            r#"<xs:include schemaLocation="a.xsd"/><xs:include schemaLocation="b.xsd"/>"#,
        );
        write(dir.path(), "a.xsd", "");
        write(dir.path(), "b.xsd", "");

        let mut parser = SchemaParser::with_limits(8, 2);
        let err = parser.parse_file(dir.path().join("root.xsd")).unwrap_err();
        assert!(matches!(
            err,
            ParseError::IncludeLimit {
                limit_kind: "file count",
                limit: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_remote_location_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "root.xsd",
            r#"<xs:import namespace="urn:x" schemaLocation="https://example.com/x.xsd"/>"#,
        );
        let mut parser = SchemaParser::new();
        let err = parser.parse_file(dir.path().join("root.xsd")).unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedLocation { .. }));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut parser = SchemaParser::new();
        let err = parser.parse_file(dir.path().join("absent.xsd")).unwrap_err();
        assert!(matches!(err, ParseError::Io { .. }));
    }

    #[test]
    fn test_resolve_includes_after_parse_str() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "types.xsd",
            r#"<xs:element name="car" type="xs:string" substitutionGroup="vehicle"/>"#,
        );

        let mut parser = SchemaParser::new();
        parser
            .parse_str(
                r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                     <xs:include schemaLocation="types.xsd"/>
                     <xs:element name="vehicle" type="xs:string"/>
                   </xs:schema>"#,
            )
            .unwrap();
        assert!(!parser.schema().has_element("car"));

        parser.resolve_includes(dir.path()).unwrap();
        assert!(parser.schema().has_element("car"));
        assert_eq!(parser.schema().substitution_members("vehicle"), ["car"]);
    }

    #[test]
    fn test_resolve_includes_skips_file_locations() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("common")).unwrap();
        write(
            dir.path(),
            "root.xsd",
            r#"<xs:include schemaLocation="common/a.xsd"/><xs:element name="root" type="AType"/>"#,
        );
        write(
            &dir.path().join("common"),
            "a.xsd",
            r#"<xs:include schemaLocation="b.xsd"/><xs:complexType name="AType"/>"#,
        );
        write(
            &dir.path().join("common"),
            "b.xsd",
            r#"<xs:complexType name="BType"/>"#,
        );

        let mut parser = SchemaParser::new();
        parser.parse_file(dir.path().join("root.xsd")).unwrap();
        parser.resolve_includes(dir.path()).unwrap();
        assert!(parser.schema().has_type("BType"));
        assert_eq!(parser.schema().types.len(), 2);
    }
}
