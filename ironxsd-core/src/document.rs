//! A typed XML document with a single root value.

use crate::codec::DecodePolicy;
use crate::context::ReadContext;
use crate::error::{Error, Result};
use crate::polymorphic::read_polymorphic;
use crate::reader::{XSI_NAMESPACE, XmlReader};
use crate::registry::TypeRegistry;
use crate::serializable::XmlSerializable;
use crate::writer::XmlWriter;
use std::io::{Read, Write};
use std::path::Path;
use tracing::{debug, warn};

/// Options controlling how a document is read and written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentOptions {
    /// Indentation width, or `None` for compact output.
    pub indent: Option<usize>,
    /// Write `xsi:type` on the root element.
    pub write_xsi_type: bool,
    /// Policy for malformed scalar content.
    pub decode_policy: DecodePolicy,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        Self {
            indent: Some(2),
            write_xsi_type: false,
            decode_policy: DecodePolicy::Lenient,
        }
    }
}

impl DocumentOptions {
    /// Sets the indentation width.
    #[must_use]
    pub fn with_indent(mut self, indent: Option<usize>) -> Self {
        self.indent = indent;
        self
    }

    /// Enables or disables `xsi:type` on the root element.
    #[must_use]
    pub fn with_xsi_type(mut self, write_xsi_type: bool) -> Self {
        self.write_xsi_type = write_xsi_type;
        self
    }

    /// Sets the decode policy.
    #[must_use]
    pub fn with_decode_policy(mut self, policy: DecodePolicy) -> Self {
        self.decode_policy = policy;
        self
    }
}

/// An XML document holding an optional root of type `T`.
#[derive(Debug)]
pub struct XmlDocument<T> {
    root: Option<T>,
    options: DocumentOptions,
}

impl<T> Default for XmlDocument<T> {
    fn default() -> Self {
        Self {
            root: None,
            options: DocumentOptions::default(),
        }
    }
}

impl<T: XmlSerializable + Default> XmlDocument<T> {
    /// Creates an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a document holding `root`.
    #[must_use]
    pub fn with_root(root: T) -> Self {
        Self {
            root: Some(root),
            options: DocumentOptions::default(),
        }
    }

    /// Replaces the document options.
    #[must_use]
    pub fn with_options(mut self, options: DocumentOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns the document options.
    #[must_use]
    pub fn options(&self) -> &DocumentOptions {
        &self.options
    }

    /// Returns the root, if any.
    #[must_use]
    pub fn root(&self) -> Option<&T> {
        self.root.as_ref()
    }

    /// Returns the root mutably, if any.
    pub fn root_mut(&mut self) -> Option<&mut T> {
        self.root.as_mut()
    }

    /// Sets the root.
    pub fn set_root(&mut self, root: T) {
        self.root = Some(root);
    }

    /// Removes and returns the root.
    pub fn take_root(&mut self) -> Option<T> {
        self.root.take()
    }

    /// Reads the document from bytes, replacing the root.
    ///
    /// The first start tag is read into a fresh `T`. A root name that
    /// differs from `T`'s element name is logged and read anyway. On
    /// failure the previous root is kept.
    ///
    /// # Errors
    /// Returns [`Error::NoRootElement`] when the input has no element, or
    /// any error raised while reading the root.
    pub fn load(&mut self, xml: &[u8], registry: &TypeRegistry) -> Result<()> {
        let ctx = ReadContext::new(registry).with_policy(self.options.decode_policy);
        let mut reader = XmlReader::new(xml);
        let start = reader.next_start()?.ok_or(Error::NoRootElement)?;

        let mut root = T::default();
        if start.name() != root.element_name() {
            warn!(
                found = start.name(),
                expected = root.element_name(),
                "root element name mismatch"
            );
        }
        root.read_xml(&start, &mut reader, &ctx)?;
        debug!(element = start.name(), "loaded document");

        self.root = Some(root);
        Ok(())
    }

    /// Reads the document from a string.
    ///
    /// # Errors
    /// Same as [`XmlDocument::load`].
    pub fn load_str(&mut self, xml: &str, registry: &TypeRegistry) -> Result<()> {
        self.load(xml.as_bytes(), registry)
    }

    /// Reads the document from a byte source.
    ///
    /// # Errors
    /// Returns [`Error::Io`] if the source fails, otherwise as
    /// [`XmlDocument::load`].
    pub fn load_from<R: Read>(&mut self, mut source: R, registry: &TypeRegistry) -> Result<()> {
        let mut buffer = Vec::new();
        source.read_to_end(&mut buffer)?;
        self.load(&buffer, registry)
    }

    /// Reads the document from a file.
    ///
    /// # Errors
    /// Returns [`Error::Io`] if the file cannot be read, otherwise as
    /// [`XmlDocument::load`].
    pub fn load_file(&mut self, path: impl AsRef<Path>, registry: &TypeRegistry) -> Result<()> {
        let data = std::fs::read(path.as_ref())?;
        self.load(&data, registry)
    }

    /// Writes the document to a byte sink.
    ///
    /// # Errors
    /// Returns [`Error::NoRoot`] if the document is empty, or
    /// [`Error::Io`] if the sink fails.
    pub fn save_to<W: Write>(&self, mut sink: W) -> Result<()> {
        let bytes = self.render()?;
        sink.write_all(&bytes)?;
        sink.flush()?;
        Ok(())
    }

    /// Renders the document to a string.
    ///
    /// # Errors
    /// Returns [`Error::NoRoot`] if the document is empty.
    pub fn save_to_string(&self) -> Result<String> {
        let bytes = self.render()?;
        String::from_utf8(bytes)
            .map_err(|err| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, err)))
    }

    /// Writes the document to a file, replacing it.
    ///
    /// # Errors
    /// Returns [`Error::NoRoot`] if the document is empty, or
    /// [`Error::Io`] if the file cannot be written.
    pub fn save_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.render()?;
        std::fs::write(path.as_ref(), bytes)?;
        debug!(path = %path.as_ref().display(), "saved document");
        Ok(())
    }

    fn render(&self) -> Result<Vec<u8>> {
        let root = self.root.as_ref().ok_or(Error::NoRoot)?;
        write_document(root, &self.options)
    }
}

/// Renders `root` as a complete document.
///
/// The root element always declares the `xsi` namespace.
///
/// # Errors
/// Returns an error if the root fails to write itself.
pub fn write_document(root: &dyn XmlSerializable, options: &DocumentOptions) -> Result<Vec<u8>> {
    let mut writer = XmlWriter::with_indent(options.indent);
    writer.write_declaration()?;
    writer.start_element(root.element_name())?;
    writer.write_attribute("xmlns:xsi", XSI_NAMESPACE)?;
    if options.write_xsi_type {
        writer.write_attribute("xsi:type", root.type_name())?;
    }
    root.write_xml(&mut writer)?;
    writer.end_element()?;
    writer.finish()
}

/// Reads a document whose root type is chosen by the registry.
///
/// # Errors
/// Returns [`Error::NoRootElement`] for input without elements and
/// [`Error::NoConstructor`] when the root matches nothing registered.
pub fn load_polymorphic(xml: &[u8], ctx: &ReadContext<'_>) -> Result<Box<dyn XmlSerializable>> {
    let mut reader = XmlReader::new(xml);
    let start = reader.next_start()?.ok_or(Error::NoRootElement)?;
    read_polymorphic(&start, &mut reader, ctx)?.ok_or_else(|| Error::NoConstructor {
        element: start.name().to_string(),
    })
}
