//! JSON to XML tree

use tracing::debug;

use crate::convert::naming::{classify, Key, TextKind};
use crate::convert::namespaces::{Namespaces, UnresolvedPrefix};
use crate::error::{Error, ErrorKind, Result};
use crate::json::{Event, EventSource};
use crate::value::Value;
use crate::xml::{Attribute, Document, DocumentType, Element, Node, QName, XmlDeclaration};

/// Read one JSON value from `source` as a document
///
/// A `null` root yields `None`. Comments ahead of the root are skipped.
pub fn read<E: EventSource>(source: E, policy: UnresolvedPrefix) -> Result<Option<Document>> {
    let mut reader = Reader {
        source,
        namespaces: Namespaces::new(policy),
    };
    reader.read_document()
}

/// Node currently receiving members
enum Parent<'a> {
    Document(&'a mut Document),
    Element(&'a mut Element),
}

impl Parent<'_> {
    fn append(&mut self, node: impl Into<Node>) {
        match self {
            Self::Document(doc) => doc.append_child(node),
            Self::Element(element) => element.append_child(node),
        }
    }

    const fn is_document(&self) -> bool {
        matches!(self, Self::Document(_))
    }
}

struct Reader<E> {
    source: E,
    namespaces: Namespaces,
}

impl<E: EventSource> Reader<E> {
    fn read_document(&mut self) -> Result<Option<Document>> {
        let first = loop {
            match self.source.next_event()? {
                Some(Event::Comment(text)) => {
                    debug!(comment = %text, "skipping comment before root value");
                }
                other => break other,
            }
        };

        match first {
            Some(Event::Value(Value::Null)) => Ok(None),
            Some(Event::ObjectStart) => {
                let mut doc = Document::new();
                self.read_members(&mut Parent::Document(&mut doc))?;
                Ok(Some(doc))
            }
            Some(other) => Err(Error::detached(ErrorKind::InvalidRoot {
                found: other.name().to_string(),
            })),
            None => Err(Error::detached(ErrorKind::UnexpectedEof)),
        }
    }

    fn next(&mut self) -> Result<Event> {
        self.source
            .next_event()?
            .ok_or_else(|| Error::detached(ErrorKind::UnexpectedEof))
    }

    /// Next event that is not a comment; comments go to `parent`
    fn next_value(&mut self, parent: &mut Parent<'_>) -> Result<Event> {
        loop {
            match self.next()? {
                Event::Comment(text) => parent.append(Node::Comment(text)),
                event => return Ok(event),
            }
        }
    }

    /// Members of an object already opened, up to and including its end
    fn read_members(&mut self, parent: &mut Parent<'_>) -> Result<()> {
        loop {
            match self.next()? {
                Event::ObjectEnd => return Ok(()),
                Event::Comment(text) => parent.append(Node::Comment(text)),
                Event::Key(key) => self.read_member(parent, &key)?,
                other => return Err(unexpected("property name", &other)),
            }
        }
    }

    fn read_member(&mut self, parent: &mut Parent<'_>, key: &str) -> Result<()> {
        match classify(key) {
            Key::XmlDeclaration => {
                if !parent.is_document() {
                    return Err(unsupported("'?xml' below the document level"));
                }
                let fields = self.read_fields(parent, key)?;
                match field(&fields, "@version") {
                    Some(version) => {
                        let mut decl = XmlDeclaration::new(version);
                        decl.encoding = field(&fields, "@encoding").map(str::to_string);
                        decl.standalone = field(&fields, "@standalone").map(str::to_string);
                        parent.append(decl);
                    }
                    None => debug!("xml declaration without version dropped"),
                }
                Ok(())
            }
            Key::DocumentType => {
                if !parent.is_document() {
                    return Err(unsupported("'!DOCTYPE' below the document level"));
                }
                let fields = self.read_fields(parent, key)?;
                match field(&fields, "@name") {
                    Some(name) => {
                        let mut doctype = DocumentType::new(name);
                        doctype.public_id = field(&fields, "@public").map(str::to_string);
                        doctype.system_id = field(&fields, "@system").map(str::to_string);
                        doctype.internal_subset =
                            field(&fields, "@internalSubset").map(str::to_string);
                        parent.append(doctype);
                    }
                    None => debug!("document type without name dropped"),
                }
                Ok(())
            }
            Key::ProcessingInstruction("") => Err(unsupported("empty processing instruction target")),
            Key::Attribute("") => Err(unsupported("empty attribute name")),
            Key::Element("") => Err(unsupported("empty element name")),
            Key::ProcessingInstruction(target) => self.read_processing_instructions(parent, target),
            Key::Attribute(name) => self.read_attribute(parent, name),
            Key::Text(kind) => self.read_text(parent, kind),
            Key::Element(name) => self.read_elements(parent, name),
        }
    }

    fn read_attribute(&mut self, parent: &mut Parent<'_>, name: &str) -> Result<()> {
        let value = match self.next_value(parent)? {
            Event::Value(value) => scalar_text(&value),
            _ => return Err(unsupported(&format!("non-scalar value for attribute '@{name}'"))),
        };

        let Parent::Element(element) = parent else {
            return Err(unsupported(&format!("attribute '@{name}' at the document level")));
        };

        let attribute = Attribute::new(self.namespaces.resolve(name), value.clone().unwrap_or_default());
        element.append_attribute(attribute)?;

        if let (Some(prefix), Some(uri)) = (name.strip_prefix("xmlns:"), value) {
            if !prefix.is_empty() {
                self.namespaces.declare(prefix, &uri);
            }
        }
        Ok(())
    }

    fn read_text(&mut self, parent: &mut Parent<'_>, kind: TextKind) -> Result<()> {
        match self.next_value(parent)? {
            Event::Value(value) => {
                if let Some(text) = scalar_text(&value) {
                    parent.append(kind.node(text));
                }
                Ok(())
            }
            Event::ArrayStart => loop {
                match self.next()? {
                    Event::ArrayEnd => return Ok(()),
                    Event::Comment(text) => parent.append(Node::Comment(text)),
                    Event::Value(value) => {
                        if let Some(text) = scalar_text(&value) {
                            parent.append(kind.node(text));
                        }
                    }
                    _ => return Err(unsupported(&format!("nested value in '{}'", kind.key()))),
                }
            },
            _ => Err(unsupported(&format!("object value for '{}'", kind.key()))),
        }
    }

    fn read_processing_instructions(&mut self, parent: &mut Parent<'_>, target: &str) -> Result<()> {
        match self.next_value(parent)? {
            Event::Value(value) => {
                let data = scalar_text(&value).unwrap_or_default();
                parent.append(Node::processing_instruction(target, data));
                Ok(())
            }
            Event::ArrayStart => loop {
                match self.next()? {
                    Event::ArrayEnd => return Ok(()),
                    Event::Comment(text) => parent.append(Node::Comment(text)),
                    Event::Value(value) => {
                        let data = scalar_text(&value).unwrap_or_default();
                        parent.append(Node::processing_instruction(target, data));
                    }
                    _ => return Err(unsupported(&format!("nested value in '?{target}'"))),
                }
            },
            _ => Err(unsupported(&format!("object value for '?{target}'"))),
        }
    }

    /// `?xml` / `!DOCTYPE` members as non-null scalar fields
    fn read_fields(&mut self, parent: &mut Parent<'_>, key: &str) -> Result<Vec<(String, String)>> {
        let mut fields = Vec::new();
        match self.next_value(parent)? {
            Event::Value(Value::Null) => return Ok(fields),
            Event::ObjectStart => {}
            _ => return Err(unsupported(&format!("'{key}' must be an object"))),
        }

        loop {
            match self.next()? {
                Event::ObjectEnd => return Ok(fields),
                Event::Comment(_) => {}
                Event::Key(name) => {
                    let value = loop {
                        match self.next()? {
                            Event::Comment(_) => {}
                            event => break event,
                        }
                    };
                    match value {
                        Event::Value(value) => match scalar_text(&value) {
                            Some(text) => fields.push((name, text)),
                            None => debug!(key, field = %name, "null field ignored"),
                        },
                        _ => return Err(unsupported(&format!("non-scalar field '{name}' in '{key}'"))),
                    }
                }
                other => return Err(unexpected("property name", &other)),
            }
        }
    }

    /// Element member: one element, or one per array item
    fn read_elements(&mut self, parent: &mut Parent<'_>, name: &str) -> Result<()> {
        match self.next_value(parent)? {
            Event::ArrayStart => loop {
                match self.next()? {
                    Event::ArrayEnd => return Ok(()),
                    Event::Comment(text) => parent.append(Node::Comment(text)),
                    Event::ArrayStart => {
                        return Err(unsupported(&format!("array nested in array for '{name}'")));
                    }
                    event => {
                        let element = self.read_element(name, event)?;
                        parent.append(element);
                    }
                }
            },
            event => {
                let element = self.read_element(name, event)?;
                parent.append(element);
                Ok(())
            }
        }
    }

    /// Element whose value starts with `event`
    fn read_element(&mut self, name: &str, event: Event) -> Result<Element> {
        match event {
            Event::Value(Value::Null) => Ok(Element::new(self.namespaces.resolve(name))),
            Event::Value(value) => {
                let mut element = Element::new(self.namespaces.resolve(name));
                match scalar_text(&value) {
                    Some(text) if !text.is_empty() => element.append_child(Node::Text(text)),
                    _ => element.is_empty = false,
                }
                Ok(element)
            }
            Event::ObjectStart => self.read_element_object(name),
            other => Err(unexpected("value", &other)),
        }
    }

    /// Object-valued element; its name is resolved after its leading attributes
    fn read_element_object(&mut self, name: &str) -> Result<Element> {
        let mut element = Element::new(QName::local(name));
        let mut resolved = false;

        loop {
            let event = self.next()?;
            let leading = match &event {
                Event::Key(key) => key.starts_with('@'),
                Event::Comment(_) => true,
                _ => false,
            };
            if !resolved && !leading {
                element.name = self.namespaces.resolve(name);
                resolved = true;
            }

            let mut parent = Parent::Element(&mut element);
            match event {
                Event::ObjectEnd => break,
                Event::Comment(text) => parent.append(Node::Comment(text)),
                Event::Key(key) => self.read_member(&mut parent, &key)?,
                other => return Err(unexpected("property name", &other)),
            }
        }

        Ok(element)
    }
}

fn field<'a>(fields: &'a [(String, String)], name: &str) -> Option<&'a str> {
    fields
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

/// Canonical text of a scalar; `None` for null
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

fn unsupported(context: &str) -> Error {
    Error::detached(ErrorKind::UnsupportedShape {
        context: context.to_string(),
    })
}

fn unexpected(expected: &str, found: &Event) -> Error {
    Error::detached(ErrorKind::Expected {
        expected: expected.to_string(),
        found: found.name().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json::{Config, Parser};
    use crate::lexer::CommentHandling;

    fn read_json(json: &str) -> Result<Option<Document>> {
        let config = Config::default().with_comments(CommentHandling::Surface);
        let mut parser = Parser::with_config(json.as_bytes(), config);
        read(&mut parser, UnresolvedPrefix::default())
    }

    fn read_xml(json: &str) -> Result<String> {
        Ok(read_json(json)?.map(|doc| doc.to_xml()).unwrap_or_default())
    }

    #[test]
    fn test_null_root() -> Result<()> {
        assert!(read_json("null")?.is_none());
        assert!(read_json("/* lead */ null")?.is_none());
        Ok(())
    }

    #[test]
    fn test_invalid_root() {
        for json in ["[]", "1", "\"s\"", "true"] {
            let result = read_json(json);
            assert!(
                matches!(&result, Err(err) if matches!(err.kind(), ErrorKind::InvalidRoot { .. })),
                "{json}: {result:?}"
            );
        }
    }

    #[test]
    fn test_scalar_elements() -> Result<()> {
        assert_eq!(read_xml(r#"{"root":"Text"}"#)?, "<root>Text</root>");
        assert_eq!(read_xml(r#"{"root":null}"#)?, "<root/>");
        assert_eq!(read_xml(r#"{"root":""}"#)?, "<root></root>");
        assert_eq!(read_xml(r#"{"root":{"n":12,"f":1.5,"b":false}}"#)?, "<root><n>12</n><f>1.5</f><b>false</b></root>");
        Ok(())
    }

    #[test]
    fn test_arrays_make_siblings() -> Result<()> {
        assert_eq!(
            read_xml(r#"{"root":{"e":[null,"x",{"@a":"1"}]}}"#)?,
            r#"<root><e/><e>x</e><e a="1"/></root>"#
        );
        assert_eq!(
            read_xml(r##"{"root":{"#text":["First","Second",null],"child":null}}"##)?,
            "<root>FirstSecond<child/></root>"
        );
        Ok(())
    }

    #[test]
    fn test_nested_array_rejected() {
        let result = read_json(r#"{"root":{"e":[[1]]}}"#);
        assert!(matches!(
            result,
            Err(err) if matches!(err.kind(), ErrorKind::UnsupportedShape { .. })
        ));
    }

    #[test]
    fn test_attributes() -> Result<()> {
        assert_eq!(
            read_xml(r#"{"root":{"@a":"1","@b":null,"@c":2}}"#)?,
            r#"<root a="1" b="" c="2"/>"#
        );

        let result = read_json(r#"{"@a":"1","root":null}"#);
        assert!(matches!(
            result,
            Err(err) if matches!(err.kind(), ErrorKind::UnsupportedShape { .. })
        ));

        let result = read_json(r#"{"root":{"@a":{"x":1}}}"#);
        assert!(matches!(
            result,
            Err(err) if matches!(err.kind(), ErrorKind::UnsupportedShape { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_duplicate_attribute_after_resolution() -> Result<()> {
        let result = read_json(r#"{"root":{"@p:a":"1","@a":"2"}}"#);
        assert!(matches!(
            result,
            Err(err) if matches!(err.kind(), ErrorKind::DuplicateAttribute { name } if name == "a")
        ));

        let doc = read_json(r#"{"root":{"@xmlns:p":"urn:p","@p:a":"1","@a":"2"}}"#)?;
        let attrs = doc.as_ref().and_then(Document::root).map(|r| r.attributes.len());
        assert_eq!(attrs, Some(3));
        Ok(())
    }

    #[test]
    fn test_namespace_resolution() -> Result<()> {
        let doc = read_json(r#"{"root":{"@xmlns:a":"urn:a","a:child":null}}"#)?;
        let child = doc.as_ref().and_then(Document::root).and_then(|r| r.elements().next());
        assert_eq!(child.and_then(|c| c.name.namespace.as_deref()), Some("urn:a"));
        assert_eq!(child.and_then(|c| c.name.prefix.as_deref()), Some("a"));

        let doc = read_json(r#"{"a:root":{"@xmlns:a":"urn:a"}}"#)?;
        let root = doc.as_ref().and_then(Document::root);
        assert_eq!(root.and_then(|r| r.name.namespace.as_deref()), Some("urn:a"));
        Ok(())
    }

    #[test]
    fn test_comment_before_namespace_declaration() -> Result<()> {
        let doc = read_json(r#"{"a:root":{/*c*/"@xmlns:a":"urn:a","a:child":null}}"#)?;
        let root = doc.as_ref().and_then(Document::root);
        assert_eq!(root.and_then(|r| r.name.namespace.as_deref()), Some("urn:a"));
        assert_eq!(root.and_then(|r| r.name.prefix.as_deref()), Some("a"));
        assert_eq!(
            doc.map(|d| d.to_xml()).unwrap_or_default(),
            r#"<a:root xmlns:a="urn:a"><!--c--><a:child/></a:root>"#
        );
        Ok(())
    }

    #[test]
    fn test_empty_names_rejected() {
        for json in [
            r#"{"":null}"#,
            r#"{"root":{"":"x"}}"#,
            r#"{"root":{"@":"1"}}"#,
            r#"{"root":{"?":"d"}}"#,
            r#"{"?":"d","root":null}"#,
        ] {
            let result = read_json(json);
            assert!(
                matches!(&result, Err(err) if matches!(err.kind(), ErrorKind::UnsupportedShape { .. })),
                "{json}: {result:?}"
            );
        }
    }

    #[test]
    fn test_unresolved_prefix_policy() -> Result<()> {
        assert_eq!(read_xml(r#"{"p:root":null}"#)?, "<root/>");

        let mut parser = Parser::new(br#"{"p:root":null}"#);
        let doc = read(&mut parser, UnresolvedPrefix::Placeholder)?;
        let root = doc.as_ref().and_then(Document::root);
        assert_eq!(
            root.and_then(|r| r.name.namespace.as_deref()),
            Some("http://unknown-prefixes/p")
        );
        assert_eq!(doc.map(|d| d.to_xml()).unwrap_or_default(), "<p:root/>");
        Ok(())
    }

    #[test]
    fn test_declaration_optionality() -> Result<()> {
        assert_eq!(read_xml(r#"{"root":null}"#)?, "<root/>");
        assert_eq!(
            read_xml(r#"{"?xml":{"@version":"1.0"},"root":null}"#)?,
            r#"<?xml version="1.0"?><root/>"#
        );
        assert_eq!(
            read_xml(r#"{"?xml":{"@encoding":"utf-8","@other":"x","@version":"1.0","@standalone":null},"root":null}"#)?,
            r#"<?xml version="1.0" encoding="utf-8"?><root/>"#
        );
        assert_eq!(read_xml(r#"{"?xml":{"@encoding":"utf-8"},"root":null}"#)?, "<root/>");
        assert_eq!(read_xml(r#"{"?xml":null,"root":null}"#)?, "<root/>");
        Ok(())
    }

    #[test]
    fn test_doctype() -> Result<()> {
        assert_eq!(
            read_xml(r#"{"!DOCTYPE":{"@name":"html","@public":"-//W3C//DTD","@system":"x.dtd"},"html":null}"#)?,
            r#"<!DOCTYPE html PUBLIC "-//W3C//DTD" "x.dtd"><html/>"#
        );
        assert_eq!(read_xml(r#"{"!DOCTYPE":{"@system":"x.dtd"},"html":null}"#)?, "<html/>");

        let result = read_json(r#"{"root":{"!DOCTYPE":{"@name":"x"}}}"#);
        assert!(matches!(
            result,
            Err(err) if matches!(err.kind(), ErrorKind::UnsupportedShape { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_processing_instructions() -> Result<()> {
        assert_eq!(
            read_xml(r#"{"?pi":["one",null],"root":{"?inner":"d"}}"#)?,
            "<?pi one?><?pi?><root><?inner d?></root>"
        );
        Ok(())
    }

    #[test]
    fn test_comments_attach_to_current_node() -> Result<()> {
        assert_eq!(
            read_xml(r#"{"root":{"element":[null,/* in */null]/* Comment */}}"#)?,
            "<root><element/><!-- in --><element/><!-- Comment --></root>"
        );
        assert_eq!(
            read_xml("{/*a*//*b*/\"root\":null}")?,
            "<!--a--><!--b--><root/>"
        );
        Ok(())
    }

    #[test]
    fn test_text_kinds() -> Result<()> {
        assert_eq!(
            read_xml(r##"{"root":{"#cdata-section":"<x>","#significant-whitespace":" ","#text":null}}"##)?,
            "<root><![CDATA[<x>]]> </root>"
        );
        Ok(())
    }

    #[test]
    fn test_reads_from_value_events() -> Result<()> {
        let mut parser = Parser::new(br#"{"root":{"@id":"7","item":[1,2]}}"#);
        let value = parser.parse_value()?;
        let doc = read(value.events(), UnresolvedPrefix::default())?;
        assert_eq!(
            doc.map(|d| d.to_xml()).unwrap_or_default(),
            r#"<root id="7"><item>1</item><item>2</item></root>"#
        );
        Ok(())
    }
}
