//! XML data model

use crate::error::{Error, ErrorKind, Result};

/// Qualified name with its resolved namespace
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QName {
    pub prefix: Option<String>,
    pub local: String,
    pub namespace: Option<String>,
}

impl QName {
    /// Unprefixed name outside any namespace
    pub fn local(local: impl Into<String>) -> Self {
        Self {
            prefix: None,
            local: local.into(),
            namespace: None,
        }
    }

    pub fn new(prefix: Option<String>, local: impl Into<String>, namespace: Option<String>) -> Self {
        Self {
            prefix,
            local: local.into(),
            namespace,
        }
    }

    /// Split `prefix:local` without resolving the prefix
    pub fn parse(qualified: &str) -> Self {
        match split_qualified(qualified) {
            (Some(prefix), local) => Self::new(Some(prefix.to_string()), local, None),
            (None, local) => Self::local(local),
        }
    }

    /// `prefix:local`, or just `local` when unprefixed
    pub fn qualified(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}:{}", self.local),
            None => self.local.clone(),
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }
}

/// Split at the first colon unless it is the first or last character
pub fn split_qualified(name: &str) -> (Option<&str>, &str) {
    match name.find(':') {
        Some(idx) if idx > 0 && idx + 1 < name.len() => {
            let (prefix, rest) = name.split_at(idx);
            (Some(prefix), rest.get(1..).unwrap_or_default())
        }
        _ => (None, name),
    }
}

/// Attribute of an element
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    pub name: QName,
    pub value: String,
}

impl Attribute {
    pub fn new(name: QName, value: impl Into<String>) -> Self {
        Self {
            name,
            value: value.into(),
        }
    }
}

/// XML element
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    pub name: QName,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,
    /// Serialized as `<name/>`; cleared by [`Element::append_child`]
    pub is_empty: bool,
}

impl Element {
    /// New self-closing element
    pub fn new(name: QName) -> Self {
        Self {
            name,
            attributes: Vec::new(),
            children: Vec::new(),
            is_empty: true,
        }
    }

    pub fn append_child(&mut self, child: impl Into<Node>) {
        self.children.push(child.into());
        self.is_empty = false;
    }

    /// Add an attribute, rejecting a second one with the same qualified name
    pub fn append_attribute(&mut self, attribute: Attribute) -> Result<()> {
        let qualified = attribute.name.qualified();
        if self.attribute(&qualified).is_some() {
            return Err(Error::detached(ErrorKind::DuplicateAttribute { name: qualified }));
        }
        self.attributes.push(attribute);
        Ok(())
    }

    /// Value of the attribute with the given qualified name
    pub fn attribute(&self, qualified: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.name.qualified() == qualified)
            .map(|attr| attr.value.as_str())
    }

    /// Child elements, skipping other node kinds
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|child| match child {
            Node::Element(element) => Some(element),
            _ => None,
        })
    }
}

/// `<?target data?>`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessingInstruction {
    pub target: String,
    pub data: String,
}

/// `<?xml version=… encoding=… standalone=…?>`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XmlDeclaration {
    pub version: String,
    pub encoding: Option<String>,
    pub standalone: Option<String>,
}

impl XmlDeclaration {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            encoding: None,
            standalone: None,
        }
    }
}

/// `<!DOCTYPE name PUBLIC "…" "…" […]>`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentType {
    pub name: String,
    pub public_id: Option<String>,
    pub system_id: Option<String>,
    pub internal_subset: Option<String>,
}

impl DocumentType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            public_id: None,
            system_id: None,
            internal_subset: None,
        }
    }
}

/// XML document
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    pub children: Vec<Node>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_child(&mut self, child: impl Into<Node>) {
        self.children.push(child.into());
    }

    /// The document element, if any
    pub fn root(&self) -> Option<&Element> {
        self.children.iter().find_map(|child| match child {
            Node::Element(element) => Some(element),
            _ => None,
        })
    }

    pub fn declaration(&self) -> Option<&XmlDeclaration> {
        self.children.iter().find_map(|child| match child {
            Node::XmlDeclaration(decl) => Some(decl),
            _ => None,
        })
    }

    pub fn doctype(&self) -> Option<&DocumentType> {
        self.children.iter().find_map(|child| match child {
            Node::DocumentType(doctype) => Some(doctype),
            _ => None,
        })
    }
}

/// Any node of an XML tree
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Document(Document),
    Element(Element),
    Attribute(Attribute),
    Text(String),
    CData(String),
    SignificantWhitespace(String),
    Comment(String),
    ProcessingInstruction(ProcessingInstruction),
    XmlDeclaration(XmlDeclaration),
    DocumentType(DocumentType),
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn cdata(text: impl Into<String>) -> Self {
        Self::CData(text.into())
    }

    pub fn significant_whitespace(text: impl Into<String>) -> Self {
        Self::SignificantWhitespace(text.into())
    }

    pub fn comment(text: impl Into<String>) -> Self {
        Self::Comment(text.into())
    }

    pub fn processing_instruction(target: impl Into<String>, data: impl Into<String>) -> Self {
        Self::ProcessingInstruction(ProcessingInstruction {
            target: target.into(),
            data: data.into(),
        })
    }

    /// Node kind, for error messages
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Document(_) => "document",
            Self::Element(_) => "element",
            Self::Attribute(_) => "attribute",
            Self::Text(_) => "text",
            Self::CData(_) => "cdata section",
            Self::SignificantWhitespace(_) => "significant whitespace",
            Self::Comment(_) => "comment",
            Self::ProcessingInstruction(_) => "processing instruction",
            Self::XmlDeclaration(_) => "xml declaration",
            Self::DocumentType(_) => "document type",
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

impl From<Document> for Node {
    fn from(document: Document) -> Self {
        Self::Document(document)
    }
}

impl From<Attribute> for Node {
    fn from(attribute: Attribute) -> Self {
        Self::Attribute(attribute)
    }
}

impl From<XmlDeclaration> for Node {
    fn from(decl: XmlDeclaration) -> Self {
        Self::XmlDeclaration(decl)
    }
}

impl From<DocumentType> for Node {
    fn from(doctype: DocumentType) -> Self {
        Self::DocumentType(doctype)
    }
}

impl From<ProcessingInstruction> for Node {
    fn from(pi: ProcessingInstruction) -> Self {
        Self::ProcessingInstruction(pi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qname_parse() {
        assert_eq!(QName::parse("a:b"), QName::new(Some("a".to_string()), "b", None));
        assert_eq!(QName::parse("plain"), QName::local("plain"));
        assert_eq!(QName::parse(":lead"), QName::local(":lead"));
        assert_eq!(QName::parse("trail:"), QName::local("trail:"));
        assert_eq!(QName::parse("a:b:c").local, "b:c");
    }

    #[test]
    fn test_qname_qualified() {
        assert_eq!(QName::parse("x:y").qualified(), "x:y");
        assert_eq!(QName::local("y").with_namespace("urn:x").qualified(), "y");
    }

    #[test]
    fn test_append_child_clears_empty() {
        let mut element = Element::new(QName::local("root"));
        assert!(element.is_empty);
        element.append_child(Node::text("x"));
        assert!(!element.is_empty);
        assert_eq!(element.children, vec![Node::text("x")]);
    }

    #[test]
    fn test_duplicate_attribute_rejected() -> Result<()> {
        let mut element = Element::new(QName::local("root"));
        element.append_attribute(Attribute::new(QName::local("id"), "1"))?;
        element.append_attribute(Attribute::new(QName::parse("a:id"), "2"))?;
        assert_eq!(element.attribute("id"), Some("1"));
        assert_eq!(element.attribute("a:id"), Some("2"));

        let result = element.append_attribute(Attribute::new(QName::local("id"), "3"));
        assert!(matches!(
            result,
            Err(err) if matches!(err.kind(), ErrorKind::DuplicateAttribute { name } if name == "id")
        ));
        Ok(())
    }

    #[test]
    fn test_document_accessors() {
        let mut doc = Document::new();
        doc.append_child(XmlDeclaration::new("1.0"));
        doc.append_child(Node::comment("c"));
        doc.append_child(Element::new(QName::local("root")));

        assert_eq!(doc.declaration().map(|d| d.version.as_str()), Some("1.0"));
        assert_eq!(doc.root().map(|r| r.name.local.as_str()), Some("root"));
        assert!(doc.doctype().is_none());
    }
}
