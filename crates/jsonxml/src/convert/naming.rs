//! JSON member names for XML nodes

use crate::xml::Node;

pub const DECLARATION_KEY: &str = "?xml";
pub const DOCTYPE_KEY: &str = "!DOCTYPE";
pub const TEXT_KEY: &str = "#text";
pub const CDATA_KEY: &str = "#cdata-section";
pub const WHITESPACE_KEY: &str = "#significant-whitespace";

/// Node kinds that carry nothing but character data
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextKind {
    Text,
    CData,
    SignificantWhitespace,
}

impl TextKind {
    pub fn node(self, text: impl Into<String>) -> Node {
        match self {
            Self::Text => Node::text(text),
            Self::CData => Node::cdata(text),
            Self::SignificantWhitespace => Node::significant_whitespace(text),
        }
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Text => TEXT_KEY,
            Self::CData => CDATA_KEY,
            Self::SignificantWhitespace => WHITESPACE_KEY,
        }
    }
}

/// What a JSON member name denotes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key<'a> {
    XmlDeclaration,
    DocumentType,
    /// Qualified attribute name, without the `@`
    Attribute(&'a str),
    /// Target, without the `?`
    ProcessingInstruction(&'a str),
    Text(TextKind),
    /// Qualified element name
    Element(&'a str),
}

/// Classify a member name; every string maps to exactly one [`Key`]
pub fn classify(key: &str) -> Key<'_> {
    if key == DECLARATION_KEY {
        return Key::XmlDeclaration;
    }
    if key == DOCTYPE_KEY {
        return Key::DocumentType;
    }
    if let Some(name) = key.strip_prefix('@') {
        return Key::Attribute(name);
    }
    if let Some(target) = key.strip_prefix('?') {
        return Key::ProcessingInstruction(target);
    }
    match key {
        TEXT_KEY => Key::Text(TextKind::Text),
        CDATA_KEY => Key::Text(TextKind::CData),
        WHITESPACE_KEY => Key::Text(TextKind::SignificantWhitespace),
        _ => Key::Element(key),
    }
}

/// Member name for a node; comments and documents have none
pub fn key_for(node: &Node) -> Option<String> {
    match node {
        Node::Element(element) => Some(element.name.qualified()),
        Node::Attribute(attr) => Some(format!("@{}", attr.name.qualified())),
        Node::Text(_) => Some(TEXT_KEY.to_string()),
        Node::CData(_) => Some(CDATA_KEY.to_string()),
        Node::SignificantWhitespace(_) => Some(WHITESPACE_KEY.to_string()),
        Node::ProcessingInstruction(pi) => Some(format!("?{}", pi.target)),
        Node::XmlDeclaration(_) => Some(DECLARATION_KEY.to_string()),
        Node::DocumentType(_) => Some(DOCTYPE_KEY.to_string()),
        Node::Comment(_) | Node::Document(_) => None,
    }
}
