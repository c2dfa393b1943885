//! Minimal element tree over `quick-xml`.
//!
//! The table of contents format only uses elements and attributes, so the
//! tree keeps exactly that: a name, an ordered attribute map and child
//! elements. Text content, comments and processing instructions are dropped
//! on read.

use crate::error::{LoadErrorKind, Result, TocError};
use indexmap::IndexMap;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::io::Cursor;

/// A single XML element with attributes and child elements.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlElement {
    pub name: String,
    pub attributes: IndexMap<String, String>,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    /// Create an element without attributes or children.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style attribute setter.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(key, value);
        self
    }

    /// Set an attribute, replacing any previous value.
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key.into(), value.into());
    }

    /// Set an attribute only when a value is present.
    pub fn set_optional_attribute(&mut self, key: &str, value: Option<&str>) {
        if let Some(value) = value {
            self.set_attribute(key, value);
        }
    }

    /// Look up an attribute value.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Look up an attribute that must be present and non-empty.
    pub fn required_attribute(&self, key: &str) -> Result<&str> {
        match self.attribute(key) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(TocError::missing_attribute(key, &self.name)),
        }
    }

    /// Look up an attribute that must be present but may be empty.
    pub fn present_attribute(&self, key: &str) -> Result<&str> {
        self.attribute(key)
            .ok_or_else(|| TocError::missing_attribute(key, &self.name))
    }

    /// Append a child element.
    pub fn push_child(&mut self, child: XmlElement) {
        self.children.push(child);
    }

    /// Child elements with the given name.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Parse a document and return its root element.
    pub fn parse(content: &str) -> Result<Self> {
        let mut reader = Reader::from_str(content);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) => {
                    stack.push(element_from_start(e)?);
                }
                Ok(Event::Empty(ref e)) => {
                    let element = element_from_start(e)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Ok(Event::End(_)) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| invalid_xml("closing tag without matching start"))?;
                    attach(&mut stack, &mut root, element)?;
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => {
                    return Err(invalid_xml(format!(
                        "at position {}: {e}",
                        reader.buffer_position()
                    )))
                }
            }
        }

        if let Some(open) = stack.last() {
            return Err(invalid_xml(format!("element <{}> is never closed", open.name)));
        }
        root.ok_or_else(|| invalid_xml("document has no root element"))
    }

    /// Serialize this element as an indented document with an XML declaration.
    pub fn to_xml_string(&self) -> Result<String> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(write_error)?;
        write_element(&mut writer, self)?;

        let bytes = writer.into_inner().into_inner();
        String::from_utf8(bytes).map_err(write_error)
    }
}

fn element_from_start(start: &BytesStart<'_>) -> Result<XmlElement> {
    let mut element = XmlElement::new(String::from_utf8_lossy(start.name().as_ref()));
    for attr in start.attributes() {
        let attr = attr.map_err(|e| invalid_xml(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| invalid_xml(e.to_string()))?
            .into_owned();
        element.attributes.insert(key, value);
    }
    Ok(element)
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        return Ok(());
    }
    if root.is_some() {
        return Err(invalid_xml(format!(
            "second top-level element <{}>",
            element.name
        )));
    }
    *root = Some(element);
    Ok(())
}

fn write_element<W: std::io::Write>(writer: &mut Writer<W>, element: &XmlElement) -> Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        writer.write_event(Event::Empty(start)).map_err(write_error)?;
        return Ok(());
    }

    writer.write_event(Event::Start(start)).map_err(write_error)?;
    for child in &element.children {
        write_element(writer, child)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .map_err(write_error)?;
    Ok(())
}

fn invalid_xml(message: impl Into<String>) -> TocError {
    TocError::load("XML reading", LoadErrorKind::InvalidXml(message.into()))
}

fn write_error(err: impl std::fmt::Display) -> TocError {
    TocError::validation(format!("XML writing failed: {err}"))
}
