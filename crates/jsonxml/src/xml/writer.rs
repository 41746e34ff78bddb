//! XML text serializer

use crate::xml::model::{Document, DocumentType, Element, Node, XmlDeclaration};

impl Document {
    /// Serialize without insignificant whitespace
    pub fn to_xml(&self) -> String {
        let mut output = String::new();
        for child in &self.children {
            serialize_node(child, &mut output);
        }
        output
    }
}

impl Element {
    pub fn to_xml(&self) -> String {
        let mut output = String::new();
        serialize_element(self, &mut output);
        output
    }
}

impl Node {
    pub fn to_xml(&self) -> String {
        let mut output = String::new();
        serialize_node(self, &mut output);
        output
    }
}

fn serialize_node(node: &Node, output: &mut String) {
    match node {
        Node::Document(doc) => {
            for child in &doc.children {
                serialize_node(child, output);
            }
        }
        Node::Element(element) => serialize_element(element, output),
        Node::Attribute(attr) => {
            push_attribute(&attr.name.qualified(), &attr.value, output);
        }
        Node::Text(text) => output.push_str(&escape_text(text)),
        Node::SignificantWhitespace(text) => output.push_str(text),
        Node::CData(text) => {
            output.push_str("<![CDATA[");
            output.push_str(text);
            output.push_str("]]>");
        }
        Node::Comment(text) => {
            output.push_str("<!--");
            output.push_str(text);
            output.push_str("-->");
        }
        Node::ProcessingInstruction(pi) => {
            output.push_str("<?");
            output.push_str(&pi.target);
            if !pi.data.is_empty() {
                output.push(' ');
                output.push_str(&pi.data);
            }
            output.push_str("?>");
        }
        Node::XmlDeclaration(decl) => serialize_declaration(decl, output),
        Node::DocumentType(doctype) => serialize_doctype(doctype, output),
    }
}

fn serialize_declaration(decl: &XmlDeclaration, output: &mut String) {
    output.push_str("<?xml");
    output.push(' ');
    push_attribute("version", &decl.version, output);
    if let Some(encoding) = &decl.encoding {
        output.push(' ');
        push_attribute("encoding", encoding, output);
    }
    if let Some(standalone) = &decl.standalone {
        output.push(' ');
        push_attribute("standalone", standalone, output);
    }
    output.push_str("?>");
}

fn serialize_doctype(doctype: &DocumentType, output: &mut String) {
    output.push_str("<!DOCTYPE ");
    output.push_str(&doctype.name);
    match (&doctype.public_id, &doctype.system_id) {
        (Some(public), Some(system)) => {
            output.push_str(&format!(" PUBLIC \"{public}\" \"{system}\""));
        }
        (Some(public), None) => output.push_str(&format!(" PUBLIC \"{public}\"")),
        (None, Some(system)) => output.push_str(&format!(" SYSTEM \"{system}\"")),
        (None, None) => {}
    }
    if let Some(subset) = &doctype.internal_subset {
        output.push_str(" [");
        output.push_str(subset);
        output.push(']');
    }
    output.push('>');
}

fn serialize_element(element: &Element, output: &mut String) {
    let name = element.name.qualified();
    output.push('<');
    output.push_str(&name);

    for attr in &element.attributes {
        output.push(' ');
        push_attribute(&attr.name.qualified(), &attr.value, output);
    }

    if element.children.is_empty() && element.is_empty {
        output.push_str("/>");
        return;
    }

    output.push('>');
    for child in &element.children {
        serialize_node(child, output);
    }
    output.push_str("</");
    output.push_str(&name);
    output.push('>');
}

fn push_attribute(name: &str, value: &str, output: &mut String) {
    output.push_str(name);
    output.push_str("=\"");
    output.push_str(&escape_attribute(value));
    output.push('"');
}

fn escape_text(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attribute(input: &str) -> String {
    escape_text(input).replace('"', "&quot;")
}
