//! XML codec and the element tree it parses into.
//!
//! Parsing is built on the `quick-xml` pull reader. The tree keeps element
//! names, attributes, concatenated text and child order; comments, processing
//! instructions and the declaration are dropped.

use std::fmt;

use bytes::Bytes;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::reader::Reader;
use quick_xml::writer::Writer;
use tracing::trace;

use micro_fetch_http::protocol::{DecodeError, EncodeError};

use crate::Value;
use crate::codec::Codec;

const PARSE_ERROR: &str = "Unable to parse response as XML";

/// `application/xml` codec.
///
/// A configured namespace is written as the `xmlns` attribute of the root
/// element when serializing, unless the root already declares one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlCodec {
    namespace: Option<String>,
    declaration: bool,
}

impl XmlCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_namespace<S: Into<String>>(mut self, namespace: S) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Prefix serialized documents with `<?xml version="1.0" encoding="UTF-8"?>`.
    pub fn with_declaration(mut self) -> Self {
        self.declaration = true;
        self
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }
}

impl Codec for XmlCodec {
    fn serialize(&self, value: &Value) -> Result<Bytes, EncodeError> {
        let root = match value {
            Value::Null => return Ok(Bytes::new()),
            Value::Xml(root) => root,
            other => return Err(EncodeError::unsupported_shape("xml", other.shape())),
        };

        let mut out = Vec::new();
        let mut writer = Writer::new(&mut out);
        if self.declaration {
            writer
                .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
                .map_err(|e| EncodeError::serialize("xml", e))?;
        }

        let namespaced;
        let root = match &self.namespace {
            Some(namespace) if root.attribute("xmlns").is_none() => {
                namespaced = root.clone().with_attribute("xmlns", namespace.as_str());
                &namespaced
            }
            _ => root,
        };
        write_element(&mut writer, root).or(Err(EncodeError::serialize("xml", "writer failed")))?;

        Ok(Bytes::from(out))
    }

    fn parse(&self, body: &str) -> Result<Value, DecodeError> {
        if body.is_empty() {
            return Ok(Value::Null);
        }
        parse_document(body).map(Value::Xml)
    }
}

fn parse_document(body: &str) -> Result<XmlElement, DecodeError> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_event() {
            Err(e) => return Err(DecodeError::with_source(PARSE_ERROR, e.to_string())),
            Ok(Event::Eof) => break,
            Ok(Event::Start(start)) => stack.push(element_from_start(&start)?),
            Ok(Event::Empty(start)) => {
                let element = element_from_start(&start)?;
                close_element(element, &mut stack, &mut root)?;
            }
            Ok(Event::End(_)) => {
                let Some(element) = stack.pop() else {
                    return Err(DecodeError::new(PARSE_ERROR));
                };
                close_element(element, &mut stack, &mut root)?;
            }
            Ok(Event::Text(text)) => {
                let text = text.unescape().map_err(|e| DecodeError::with_source(PARSE_ERROR, e.to_string()))?;
                push_text(&mut stack, &text)?;
            }
            Ok(Event::CData(data)) => {
                let data = data.into_inner();
                push_text(&mut stack, &String::from_utf8_lossy(&data))?;
            }
            Ok(_) => {}
        }
    }

    if !stack.is_empty() {
        trace!(unclosed = stack.len(), "xml document ended inside an element");
        return Err(DecodeError::new(PARSE_ERROR));
    }
    root.ok_or_else(|| DecodeError::new(PARSE_ERROR))
}

fn element_from_start(start: &BytesStart<'_>) -> Result<XmlElement, DecodeError> {
    let mut element = XmlElement::new(String::from_utf8_lossy(start.name().as_ref()));
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| DecodeError::with_source(PARSE_ERROR, e.to_string()))?;
        let value = attribute.unescape_value().map_err(|e| DecodeError::with_source(PARSE_ERROR, e.to_string()))?;
        element.attributes.push((String::from_utf8_lossy(attribute.key.as_ref()).into_owned(), value.into_owned()));
    }
    Ok(element)
}

fn close_element(
    element: XmlElement,
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
) -> Result<(), DecodeError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(DecodeError::new(PARSE_ERROR)),
    }
    Ok(())
}

fn push_text(stack: &mut [XmlElement], text: &str) -> Result<(), DecodeError> {
    match stack.last_mut() {
        Some(current) => current.text.push_str(text),
        // text outside the root element
        None if text.trim().is_empty() => {}
        None => return Err(DecodeError::new(PARSE_ERROR)),
    }
    Ok(())
}

fn write_element<W: std::io::Write>(writer: &mut Writer<W>, element: &XmlElement) -> fmt::Result {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.text.is_empty() && element.children.is_empty() {
        return writer.write_event(Event::Empty(start)).or(Err(fmt::Error));
    }

    writer.write_event(Event::Start(start)).or(Err(fmt::Error))?;
    if !element.text.is_empty() {
        writer.write_event(Event::Text(BytesText::new(&element.text))).or(Err(fmt::Error))?;
    }
    for child in &element.children {
        write_element(writer, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(element.name.as_str()))).or(Err(fmt::Error))
}

/// One element of a parsed XML document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<XmlElement>,
}

impl XmlElement {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    pub fn with_attribute<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    pub fn with_text<S: Into<String>>(mut self, text: S) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(child);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// The element's own text, not including the text of its children.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn children(&self) -> &[XmlElement] {
        &self.children
    }

    /// The first child named `name`.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|child| child.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// Follows a `/`-separated path of child names, taking the first match at
    /// each step.
    ///
    /// An absolute path (`/root/a/b`) must start with this element's name.
    pub fn find(&self, path: &str) -> Option<&XmlElement> {
        let mut steps = path.split('/').filter(|step| !step.is_empty());
        if path.starts_with('/') && steps.next()? != self.name {
            return None;
        }
        steps.try_fold(self, |current, step| current.child(step))
    }
}

impl fmt::Display for XmlElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = Vec::new();
        write_element(&mut Writer::new(&mut out), self)?;
        f.write_str(&String::from_utf8_lossy(&out))
    }
}
