//! Streaming XML writer used by [`crate::XmlSerializable::write_xml`].
//!
//! The start tag of the innermost element is held back until content is
//! written, so attributes can still be added after `start_element`.

use crate::codec::XmlScalar;
use crate::error::{Error, Result};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

/// Writes an XML document into an in-memory buffer.
pub struct XmlWriter {
    writer: Writer<Vec<u8>>,
    pending: Option<BytesStart<'static>>,
    open: Vec<String>,
}

impl XmlWriter {
    /// Creates a writer producing compact output.
    #[must_use]
    pub fn new() -> Self {
        Self::with_indent(None)
    }

    /// Creates a writer indenting nested elements by `indent` spaces.
    #[must_use]
    pub fn with_indent(indent: Option<usize>) -> Self {
        let writer = match indent {
            Some(width) => Writer::new_with_indent(Vec::new(), b' ', width),
            None => Writer::new(Vec::new()),
        };
        Self {
            writer,
            pending: None,
            open: Vec::new(),
        }
    }

    /// Writes the `<?xml version="1.0" encoding="UTF-8"?>` declaration.
    ///
    /// # Errors
    /// Returns an error if the underlying writer fails.
    pub fn write_declaration(&mut self) -> Result<()> {
        self.writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        Ok(())
    }

    /// Opens an element.
    ///
    /// # Errors
    /// Returns an error if the parent start tag cannot be flushed.
    pub fn start_element(&mut self, name: &str) -> Result<()> {
        self.flush_pending()?;
        self.pending = Some(BytesStart::new(name.to_string()));
        self.open.push(name.to_string());
        Ok(())
    }

    /// Adds an attribute to the element opened last.
    ///
    /// # Errors
    /// Returns [`Error::AttributeOutsideStartTag`] once content has been
    /// written to that element.
    pub fn write_attribute(&mut self, name: &str, value: &str) -> Result<()> {
        match self.pending.as_mut() {
            Some(start) => {
                start.push_attribute((name, value));
                Ok(())
            }
            None => Err(Error::AttributeOutsideStartTag {
                attribute: name.to_string(),
            }),
        }
    }

    /// Adds an encoded scalar attribute.
    ///
    /// # Errors
    /// Same as [`XmlWriter::write_attribute`].
    pub fn write_attribute_value<T: XmlScalar>(&mut self, name: &str, value: &T) -> Result<()> {
        self.write_attribute(name, &value.encode())
    }

    /// Writes escaped character data into the current element.
    ///
    /// # Errors
    /// Returns an error if the underlying writer fails.
    pub fn write_text(&mut self, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        self.flush_pending()?;
        self.writer.write_event(Event::Text(BytesText::new(text)))?;
        Ok(())
    }

    /// Closes the innermost open element.
    ///
    /// Elements without content are written as empty tags.
    ///
    /// # Errors
    /// Returns [`Error::UnbalancedEnd`] if no element is open.
    pub fn end_element(&mut self) -> Result<()> {
        let name = self.open.pop().ok_or(Error::UnbalancedEnd)?;
        match self.pending.take() {
            Some(start) => self.writer.write_event(Event::Empty(start))?,
            None => self.writer.write_event(Event::End(BytesEnd::new(name)))?,
        }
        Ok(())
    }

    /// Writes `<name>text</name>`.
    ///
    /// # Errors
    /// Returns an error if the underlying writer fails.
    pub fn write_text_element(&mut self, name: &str, text: &str) -> Result<()> {
        self.start_element(name)?;
        self.write_text(text)?;
        self.end_element()
    }

    /// Writes a scalar as a simple element.
    ///
    /// # Errors
    /// Returns an error if the underlying writer fails.
    pub fn write_element<T: XmlScalar>(&mut self, name: &str, value: &T) -> Result<()> {
        self.write_text_element(name, &value.encode())
    }

    /// Writes a simple element only when `value` is present.
    ///
    /// # Errors
    /// Returns an error if the underlying writer fails.
    pub fn write_optional<T: XmlScalar>(&mut self, name: &str, value: &Option<T>) -> Result<()> {
        match value {
            Some(value) => self.write_element(name, value),
            None => Ok(()),
        }
    }

    /// Writes one simple element per value.
    ///
    /// # Errors
    /// Returns an error if the underlying writer fails.
    pub fn write_elements<T: XmlScalar>(&mut self, name: &str, values: &[T]) -> Result<()> {
        for value in values {
            self.write_element(name, value)?;
        }
        Ok(())
    }

    /// Returns the number of open elements.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// Closes any open elements and returns the document bytes.
    ///
    /// # Errors
    /// Returns an error if the underlying writer fails.
    pub fn finish(mut self) -> Result<Vec<u8>> {
        while !self.open.is_empty() {
            self.end_element()?;
        }
        Ok(self.writer.into_inner())
    }

    fn flush_pending(&mut self) -> Result<()> {
        if let Some(start) = self.pending.take() {
            self.writer.write_event(Event::Start(start))?;
        }
        Ok(())
    }
}

impl Default for XmlWriter {
    fn default() -> Self {
        Self::new()
    }
}
