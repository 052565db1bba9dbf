//! Forward-only XML cursor used by [`crate::XmlSerializable::read_xml`].
//!
//! The cursor wraps a namespace-aware quick-xml reader over an in-memory
//! document and hands out owned events, so model types never deal with
//! reader lifetimes or entity references.

use crate::context::ReadContext;
use crate::codec::XmlScalar;
use crate::error::{Error, Result};
use crate::position::TextPosition;
use quick_xml::NsReader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;

/// Namespace bound to the `xsi` prefix.
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Attribute of a start tag, value already unescaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    /// Name as written, including any prefix.
    pub qualified_name: String,
    /// Name without prefix.
    pub local_name: String,
    /// Namespace the prefix resolves to, if any.
    pub namespace: Option<String>,
    /// Attribute value.
    pub value: String,
}

/// An element start tag with its attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartTag {
    name: String,
    qualified_name: String,
    attributes: Vec<XmlAttribute>,
}

impl StartTag {
    /// Creates a start tag without attributes.
    #[must_use]
    pub fn new(qualified_name: impl Into<String>) -> Self {
        let qualified_name = qualified_name.into();
        let name = local_part(&qualified_name).to_string();
        Self {
            name,
            qualified_name,
            attributes: Vec::new(),
        }
    }

    /// Adds an unqualified attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let qualified_name = name.into();
        self.attributes.push(XmlAttribute {
            local_name: local_part(&qualified_name).to_string(),
            qualified_name,
            namespace: None,
            value: value.into(),
        });
        self
    }

    /// Returns the local element name (prefix stripped).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the element name as written.
    #[must_use]
    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    /// Returns all attributes in document order.
    #[must_use]
    pub fn attributes(&self) -> &[XmlAttribute] {
        &self.attributes
    }

    /// Looks up an attribute value by its name as written.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.qualified_name == name)
            .map(|attr| attr.value.as_str())
    }

    /// Returns the `xsi:type` override, if present.
    ///
    /// Matches a `type` attribute bound to the XMLSchema-instance namespace,
    /// or failing that the literal name `xsi:type`.
    #[must_use]
    pub fn xsi_type(&self) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| {
                attr.local_name == "type" && attr.namespace.as_deref() == Some(XSI_NAMESPACE)
            })
            .or_else(|| {
                self.attributes
                    .iter()
                    .find(|attr| attr.qualified_name == "xsi:type")
            })
            .map(|attr| attr.value.as_str())
    }
}

/// Owned XML event produced by [`XmlReader::next_event`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlEvent {
    /// Start tag (empty elements produce a start followed by an end).
    Start(StartTag),
    /// End tag, carrying the local name.
    End(String),
    /// Character data, CDATA or a resolved entity reference.
    Text(String),
    /// End of input.
    Eof,
}

/// Forward-only cursor over an XML document.
pub struct XmlReader<'a> {
    reader: NsReader<&'a [u8]>,
    input: &'a [u8],
    open: Vec<String>,
}

impl<'a> XmlReader<'a> {
    /// Creates a cursor over raw UTF-8 input.
    #[must_use]
    pub fn new(input: &'a [u8]) -> Self {
        let mut reader = NsReader::from_reader(input);
        reader.config_mut().expand_empty_elements = true;
        Self {
            reader,
            input,
            open: Vec::new(),
        }
    }

    /// Creates a cursor over a string.
    #[must_use]
    pub fn from_str(input: &'a str) -> Self {
        Self::new(input.as_bytes())
    }

    /// Returns the current line/column in the input.
    #[must_use]
    pub fn position(&self) -> TextPosition {
        TextPosition::locate(self.input, self.reader.buffer_position() as usize)
    }

    /// Returns the number of currently open elements.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// Reads the next significant event.
    ///
    /// Declarations, comments, processing instructions and doctypes are
    /// skipped.
    ///
    /// # Errors
    /// Returns [`Error::Syntax`] on malformed markup.
    pub fn next_event(&mut self) -> Result<XmlEvent> {
        loop {
            let event = self
                .reader
                .read_event()
                .map_err(|err| Error::syntax(self.position(), err.to_string()))?;
            match event {
                Event::Start(ref e) => {
                    let tag = self.start_tag(e)?;
                    self.open.push(tag.name.clone());
                    return Ok(XmlEvent::Start(tag));
                }
                Event::End(ref e) => {
                    let name = self.utf8(e.local_name().as_ref())?.to_string();
                    self.open.pop();
                    return Ok(XmlEvent::End(name));
                }
                Event::Text(ref t) => {
                    return Ok(XmlEvent::Text(self.utf8(t.as_ref())?.to_string()));
                }
                Event::CData(ref c) => {
                    return Ok(XmlEvent::Text(self.utf8(c.as_ref())?.to_string()));
                }
                Event::GeneralRef(ref r) => {
                    let name = self.utf8(r.as_ref())?;
                    let text = resolve_reference(name).ok_or_else(|| {
                        Error::syntax(self.position(), format!("unknown entity '&{name};'"))
                    })?;
                    return Ok(XmlEvent::Text(text));
                }
                Event::Eof => return Ok(XmlEvent::Eof),
                _ => {}
            }
        }
    }

    /// Advances to the next start tag anywhere in the document.
    ///
    /// Returns `None` when the input ends first.
    ///
    /// # Errors
    /// Returns [`Error::Syntax`] on malformed markup.
    pub fn next_start(&mut self) -> Result<Option<StartTag>> {
        loop {
            match self.next_event()? {
                XmlEvent::Start(tag) => return Ok(Some(tag)),
                XmlEvent::Eof => return Ok(None),
                _ => {}
            }
        }
    }

    /// Advances to the next child of the innermost open element.
    ///
    /// Returns `None` once that element's end tag has been consumed. Text
    /// between children is ignored.
    ///
    /// # Errors
    /// Returns [`Error::UnexpectedEof`] if the input ends first.
    pub fn next_child(&mut self) -> Result<Option<StartTag>> {
        loop {
            match self.next_event()? {
                XmlEvent::Start(tag) => return Ok(Some(tag)),
                XmlEvent::End(_) => return Ok(None),
                XmlEvent::Text(_) => {}
                XmlEvent::Eof => return Err(self.eof_error()),
            }
        }
    }

    /// Reads the text content of the element whose start tag was just
    /// consumed, up to and including its end tag.
    ///
    /// Text inside nested elements is discarded.
    ///
    /// # Errors
    /// Returns [`Error::UnexpectedEof`] if the element is never closed.
    pub fn read_text(&mut self) -> Result<String> {
        let mut text = String::new();
        let mut depth = 0usize;
        loop {
            match self.next_event()? {
                XmlEvent::Text(chunk) if depth == 0 => text.push_str(&chunk),
                XmlEvent::Text(_) => {}
                XmlEvent::Start(_) => depth += 1,
                XmlEvent::End(_) if depth == 0 => return Ok(text),
                XmlEvent::End(_) => depth -= 1,
                XmlEvent::Eof => return Err(self.eof_error()),
            }
        }
    }

    /// Reads and decodes the text content of the current element.
    ///
    /// # Errors
    /// Returns an error on malformed markup, or on malformed scalar text
    /// under [`crate::DecodePolicy::Strict`].
    pub fn read_scalar<T: XmlScalar>(&mut self, tag: &StartTag, ctx: &ReadContext<'_>) -> Result<T> {
        let text = self.read_text()?;
        ctx.decode(tag.name(), &text)
    }

    /// Skips the element whose start tag was just consumed.
    ///
    /// # Errors
    /// Returns [`Error::UnexpectedEof`] if the element is never closed.
    pub fn skip_element(&mut self) -> Result<()> {
        let mut depth = 0usize;
        loop {
            match self.next_event()? {
                XmlEvent::Start(_) => depth += 1,
                XmlEvent::End(_) if depth == 0 => return Ok(()),
                XmlEvent::End(_) => depth -= 1,
                XmlEvent::Text(_) => {}
                XmlEvent::Eof => return Err(self.eof_error()),
            }
        }
    }

    fn start_tag(&self, e: &BytesStart<'_>) -> Result<StartTag> {
        let name = self.utf8(e.local_name().as_ref())?.to_string();
        let qualified_name = self.utf8(e.name().as_ref())?.to_string();
        let mut attributes = Vec::new();

        for attr in e.attributes() {
            let attr = attr.map_err(|err| Error::syntax(self.position(), err.to_string()))?;
            let raw = self.utf8(&attr.value)?;
            let value = quick_xml::escape::unescape(raw)
                .map_err(|err| Error::syntax(self.position(), err.to_string()))?;
            let namespace = match self.reader.resolver().resolve_attribute(attr.key).0 {
                ResolveResult::Bound(ns) => Some(self.utf8(ns.as_ref())?.to_string()),
                _ => None,
            };
            attributes.push(XmlAttribute {
                qualified_name: self.utf8(attr.key.as_ref())?.to_string(),
                local_name: self.utf8(attr.key.local_name().as_ref())?.to_string(),
                namespace,
                value: value.into_owned(),
            });
        }

        Ok(StartTag {
            name,
            qualified_name,
            attributes,
        })
    }

    fn utf8<'b>(&self, bytes: &'b [u8]) -> Result<&'b str> {
        std::str::from_utf8(bytes).map_err(|err| Error::syntax(self.position(), err.to_string()))
    }

    fn eof_error(&self) -> Error {
        Error::UnexpectedEof {
            element: self.open.last().cloned().unwrap_or_default(),
        }
    }
}

fn local_part(name: &str) -> &str {
    name.rsplit_once(':').map_or(name, |(_, local)| local)
}

fn resolve_reference(name: &str) -> Option<String> {
    if let Some(code) = name.strip_prefix('#') {
        let value = match code.strip_prefix('x').or_else(|| code.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => code.parse().ok()?,
        };
        return char::from_u32(value).map(String::from);
    }
    let text = match name {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        _ => return None,
    };
    Some(text.to_string())
}
