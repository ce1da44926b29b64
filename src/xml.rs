//! Minimal mutable XML document model.
//!
//! MLO exports are plain element trees, so this keeps the whole document as
//! an ordered in-memory tree that the pruner can mutate in place. Parsing and
//! serialization both go through quick-xml events; text and attribute values
//! are stored unescaped and re-escaped on output.

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event};

use crate::error::CompactError;

/// One node in the document tree.
///
/// Only `Element` participates in task filtering; the other variants are
/// opaque passengers that round-trip untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction(String),
    DocType(String),
}

/// An element with its attributes and ordered children.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    /// Value of the named attribute, if present.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// First child element with the given name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.child_elements().find(|el| el.name == name)
    }

    /// Mutable variant of [`Element::child`].
    pub fn child_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.children.iter_mut().find_map(|node| match node {
            Node::Element(el) if el.name == name => Some(el),
            _ => None,
        })
    }

    /// All direct child elements in document order.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(el) => Some(el),
            _ => None,
        })
    }

    /// Concatenated direct text and CDATA content of this element.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            match child {
                Node::Text(t) | Node::CData(t) => out.push_str(t),
                _ => {}
            }
        }
        out
    }
}

/// A parsed document: one root element plus whatever surrounds it.
///
/// Comments, whitespace, and a DOCTYPE before or after the root are kept so
/// they survive the round trip; the XML declaration is always rewritten.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub prolog: Vec<Node>,
    pub root: Element,
    pub epilog: Vec<Node>,
}

impl Document {
    /// Parse a UTF-8 XML string into a document tree.
    pub fn parse(input: &str) -> Result<Self, CompactError> {
        let mut reader = Reader::from_str(input);
        let mut stack: Vec<Element> = Vec::new();
        let mut prolog: Vec<Node> = Vec::new();
        let mut epilog: Vec<Node> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader.read_event().map_err(parse_error)? {
                Event::Start(start) => {
                    stack.push(element_from_start(&start)?);
                }
                Event::Empty(start) => {
                    let el = element_from_start(&start)?;
                    place(
                        Node::Element(el),
                        &mut stack,
                        &mut prolog,
                        &mut root,
                        &mut epilog,
                    );
                }
                Event::End(_) => {
                    // quick-xml validates tag nesting, so a matching start
                    // is always on the stack here
                    if let Some(el) = stack.pop() {
                        place(
                            Node::Element(el),
                            &mut stack,
                            &mut prolog,
                            &mut root,
                            &mut epilog,
                        );
                    }
                }
                Event::Text(text) => {
                    let value = text.unescape().map_err(parse_error)?.into_owned();
                    place(
                        Node::Text(value),
                        &mut stack,
                        &mut prolog,
                        &mut root,
                        &mut epilog,
                    );
                }
                Event::CData(data) => {
                    let value = String::from_utf8_lossy(&data).into_owned();
                    place(
                        Node::CData(value),
                        &mut stack,
                        &mut prolog,
                        &mut root,
                        &mut epilog,
                    );
                }
                Event::Comment(text) => {
                    let value = String::from_utf8_lossy(&text).into_owned();
                    place(
                        Node::Comment(value),
                        &mut stack,
                        &mut prolog,
                        &mut root,
                        &mut epilog,
                    );
                }
                Event::PI(pi) => {
                    let value = String::from_utf8_lossy(&pi).into_owned();
                    place(
                        Node::ProcessingInstruction(value),
                        &mut stack,
                        &mut prolog,
                        &mut root,
                        &mut epilog,
                    );
                }
                Event::DocType(text) => {
                    let value = String::from_utf8_lossy(&text).into_owned();
                    place(
                        Node::DocType(value),
                        &mut stack,
                        &mut prolog,
                        &mut root,
                        &mut epilog,
                    );
                }
                // the declaration is rewritten on output
                Event::Decl(_) => {}
                Event::Eof => break,
            }
        }

        if !stack.is_empty() {
            return Err(CompactError::Parse(
                "unexpected end of file inside an open element".to_string(),
            ));
        }
        let root = root.ok_or_else(|| {
            CompactError::Parse("document has no root element".to_string())
        })?;

        Ok(Self {
            prolog,
            root,
            epilog,
        })
    }

    /// Serialize the document to UTF-8 bytes with an XML declaration.
    pub fn to_bytes(&self) -> std::io::Result<Vec<u8>> {
        let mut writer = Writer::new(Vec::new());
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        for node in &self.prolog {
            write_node(&mut writer, node)?;
        }
        write_element(&mut writer, &self.root)?;
        for node in &self.epilog {
            write_node(&mut writer, node)?;
        }
        Ok(writer.into_inner())
    }
}

fn parse_error(err: impl std::fmt::Display) -> CompactError {
    CompactError::Parse(err.to_string())
}

fn element_from_start(start: &BytesStart<'_>) -> Result<Element, CompactError> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(parse_error)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value().map_err(parse_error)?.into_owned();
        attributes.push((key, value));
    }
    Ok(Element {
        name,
        attributes,
        children: Vec::new(),
    })
}

/// Attach a finished node either to the innermost open element or, at the
/// top level, to the prolog/root/epilog slots.
fn place(
    node: Node,
    stack: &mut Vec<Element>,
    prolog: &mut Vec<Node>,
    root: &mut Option<Element>,
    epilog: &mut Vec<Node>,
) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
        return;
    }
    match node {
        Node::Element(el) if root.is_none() => *root = Some(el),
        other => {
            if root.is_none() {
                prolog.push(other);
            } else {
                epilog.push(other);
            }
        }
    }
}

fn write_element(writer: &mut Writer<Vec<u8>>, el: &Element) -> std::io::Result<()> {
    let mut start = BytesStart::new(el.name.as_str());
    for (key, value) in &el.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }
    if el.children.is_empty() {
        return writer.write_event(Event::Empty(start));
    }
    writer.write_event(Event::Start(start))?;
    for child in &el.children {
        write_node(writer, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(el.name.as_str())))
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &Node) -> std::io::Result<()> {
    match node {
        Node::Element(el) => write_element(writer, el),
        Node::Text(text) => writer.write_event(Event::Text(BytesText::new(text))),
        Node::CData(data) => writer.write_event(Event::CData(BytesCData::new(data.as_str()))),
        Node::Comment(text) => {
            writer.write_event(Event::Comment(BytesText::from_escaped(text.as_str())))
        }
        Node::ProcessingInstruction(text) => {
            writer.write_event(Event::PI(BytesPI::new(text.as_str())))
        }
        Node::DocType(text) => {
            writer.write_event(Event::DocType(BytesText::from_escaped(text.as_str())))
        }
    }
}
