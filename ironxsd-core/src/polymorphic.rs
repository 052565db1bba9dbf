//! Runtime type selection for substitutable elements.

use crate::context::ReadContext;
use crate::error::Result;
use crate::reader::{StartTag, XmlReader};
use crate::registry::TypeRegistry;
use crate::serializable::XmlSerializable;
use crate::writer::XmlWriter;
use tracing::{trace, warn};

/// Builds an empty instance for `start`.
///
/// An `xsi:type` override is looked up as written, then without its
/// prefix. If it names no registered type, or is absent, the element name
/// decides.
#[must_use]
pub fn instantiate(start: &StartTag, registry: &TypeRegistry) -> Option<Box<dyn XmlSerializable>> {
    if let Some(type_name) = start.xsi_type() {
        let local = type_name.rsplit_once(':').map_or(type_name, |(_, local)| local);
        if let Some(instance) = registry
            .create_by_type(type_name)
            .or_else(|| registry.create_by_type(local))
        {
            trace!(element = start.name(), type_name, "instantiated from xsi:type");
            return Some(instance);
        }
        warn!(
            element = start.name(),
            type_name, "xsi:type names no registered type, using element name"
        );
    }
    registry.create_by_element(start.name())
}

/// Reads the element at `start` into a registry-chosen instance.
///
/// Returns `Ok(None)` without consuming input when no constructor matches.
///
/// # Errors
/// Returns an error if the instance fails to read its content.
pub fn read_polymorphic(
    start: &StartTag,
    reader: &mut XmlReader<'_>,
    ctx: &ReadContext<'_>,
) -> Result<Option<Box<dyn XmlSerializable>>> {
    let Some(mut instance) = instantiate(start, ctx.registry()) else {
        return Ok(None);
    };
    instance.read_xml(start, reader, ctx)?;
    Ok(Some(instance))
}

/// Like [`read_polymorphic`], but skips the element when nothing matches.
///
/// # Errors
/// Returns an error if the element is malformed.
pub fn read_polymorphic_or_skip(
    start: &StartTag,
    reader: &mut XmlReader<'_>,
    ctx: &ReadContext<'_>,
) -> Result<Option<Box<dyn XmlSerializable>>> {
    match read_polymorphic(start, reader, ctx)? {
        Some(instance) => Ok(Some(instance)),
        None => {
            trace!(element = start.name(), "no constructor, skipping element");
            reader.skip_element()?;
            Ok(None)
        }
    }
}

/// Writes `instance` as a complete element named by its `element_name`.
///
/// # Errors
/// Returns an error if the writer fails.
pub fn write_polymorphic(
    writer: &mut XmlWriter,
    instance: &dyn XmlSerializable,
    with_xsi_type: bool,
) -> Result<()> {
    writer.start_element(instance.element_name())?;
    if with_xsi_type {
        writer.write_attribute("xsi:type", instance.type_name())?;
    }
    instance.write_xml(writer)?;
    writer.end_element()
}
