//! The contract every polymorphic XML model type implements.
//!
//! Derived types embed their base by value and delegate to it: attributes
//! and content are written base first, then the derived parts, and
//! unrecognized children are offered to the base before being skipped.

use crate::context::ReadContext;
use crate::error::Result;
use crate::reader::{StartTag, XmlReader};
use crate::writer::XmlWriter;
use std::any::Any;
use std::fmt;
use tracing::trace;

/// Upcast to [`Any`] for runtime type checks on trait objects.
pub trait AsAny: Any {
    /// Returns `self` as `&dyn Any`.
    fn as_any(&self) -> &dyn Any;
    /// Returns `self` as `&mut dyn Any`.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A value that can be read from and written to XML.
pub trait XmlSerializable: AsAny + fmt::Debug {
    /// Element name used when this value is the root or a list entry.
    fn element_name(&self) -> &str;

    /// XSD type name, written as `xsi:type` when requested.
    fn type_name(&self) -> &str;

    /// Writes attributes onto the start tag opened by the caller.
    ///
    /// # Errors
    /// Returns an error if the writer fails.
    fn write_attributes(&self, _writer: &mut XmlWriter) -> Result<()> {
        Ok(())
    }

    /// Writes child elements and text.
    ///
    /// # Errors
    /// Returns an error if the writer fails.
    fn write_content(&self, writer: &mut XmlWriter) -> Result<()>;

    /// Reads attributes from this element's start tag.
    ///
    /// # Errors
    /// Returns an error for malformed values under the strict policy.
    fn read_attributes(&mut self, _start: &StartTag, _ctx: &ReadContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Consumes one child element, whose start tag has already been read.
    ///
    /// Returns `false` without consuming anything when the child is not
    /// recognized.
    ///
    /// # Errors
    /// Returns an error on malformed input.
    fn read_child(
        &mut self,
        child: &StartTag,
        reader: &mut XmlReader<'_>,
        ctx: &ReadContext<'_>,
    ) -> Result<bool>;

    /// Writes attributes then content. The caller owns the element tags.
    ///
    /// # Errors
    /// Returns an error if the writer fails.
    fn write_xml(&self, writer: &mut XmlWriter) -> Result<()> {
        self.write_attributes(writer)?;
        self.write_content(writer)
    }

    /// Reads this element from its start tag through its end tag.
    ///
    /// # Errors
    /// Returns an error on malformed input.
    fn read_xml(
        &mut self,
        start: &StartTag,
        reader: &mut XmlReader<'_>,
        ctx: &ReadContext<'_>,
    ) -> Result<()> {
        self.read_attributes(start, ctx)?;
        while let Some(child) = reader.next_child()? {
            if !self.read_child(&child, reader, ctx)? {
                trace!(
                    parent = start.name(),
                    child = child.name(),
                    "skipping unknown element"
                );
                reader.skip_element()?;
            }
        }
        Ok(())
    }
}

impl dyn XmlSerializable {
    /// Returns true if the concrete type is `T`.
    #[must_use]
    pub fn is<T: XmlSerializable>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// Downcasts to a concrete type.
    #[must_use]
    pub fn downcast_ref<T: XmlSerializable>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Downcasts to a concrete type, mutably.
    pub fn downcast_mut<T: XmlSerializable>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }
}
