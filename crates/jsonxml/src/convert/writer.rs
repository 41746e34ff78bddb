//! XML tree to JSON

use indexmap::IndexMap;
use tracing::trace;

use crate::convert::naming::key_for;
use crate::error::{Error, ErrorKind, Result};
use crate::json::Sink;
use crate::xml::{DocumentType, Element, Node, XmlDeclaration};

/// One member of an object built from a child list
enum Entry<'a> {
    /// Same-key siblings in document order
    Group(String, Vec<&'a Node>),
    /// Comments keep their position and are never grouped
    Comment(&'a str),
}

/// Write `node` as a JSON value; `None` is written as `null`
pub fn write_node<S: Sink>(sink: &mut S, node: Option<&Node>) -> Result<()> {
    match node {
        None => sink.write_null(),
        Some(node) => write_value(sink, node),
    }
}

fn write_value<S: Sink>(sink: &mut S, node: &Node) -> Result<()> {
    match node {
        Node::Document(doc) => {
            sink.begin_object()?;
            write_members(sink, &doc.children)?;
            sink.end_object()
        }
        Node::Element(element) => write_element(sink, element),
        Node::Attribute(attr) => sink.write_string(&attr.value),
        Node::Text(text) | Node::CData(text) | Node::SignificantWhitespace(text) => {
            sink.write_string(text)
        }
        Node::Comment(text) => sink.write_comment(text),
        Node::ProcessingInstruction(pi) => sink.write_string(&pi.data),
        Node::XmlDeclaration(decl) => write_declaration(sink, decl),
        Node::DocumentType(doctype) => write_doctype(sink, doctype),
    }
}

fn write_element<S: Sink>(sink: &mut S, element: &Element) -> Result<()> {
    if element.attributes.is_empty() {
        match element.children.as_slice() {
            [] if element.is_empty => return sink.write_null(),
            [] => return sink.write_string(""),
            [Node::Text(text)] => return sink.write_string(text),
            _ => {}
        }
    }

    sink.begin_object()?;
    for attr in &element.attributes {
        sink.property_name(&format!("@{}", attr.name.qualified()))?;
        sink.write_string(&attr.value)?;
    }
    write_members(sink, &element.children)?;
    sink.end_object()
}

fn write_members<S: Sink>(sink: &mut S, children: &[Node]) -> Result<()> {
    for entry in group_children(children)? {
        match entry {
            Entry::Comment(text) => sink.write_comment(text)?,
            Entry::Group(key, nodes) => {
                sink.property_name(&key)?;
                match nodes.as_slice() {
                    [single] => write_value(sink, single)?,
                    many => {
                        trace!(key = %key, count = many.len(), "grouping siblings into array");
                        sink.begin_array()?;
                        for node in many {
                            write_value(sink, node)?;
                        }
                        sink.end_array()?;
                    }
                }
            }
        }
    }
    Ok(())
}

/// Stable partition of `children` by member name, in first-occurrence order
fn group_children(children: &[Node]) -> Result<Vec<Entry<'_>>> {
    let mut entries: Vec<Entry<'_>> = Vec::with_capacity(children.len());
    let mut groups: IndexMap<String, usize> = IndexMap::new();

    for child in children {
        let key = match child {
            Node::Comment(text) => {
                entries.push(Entry::Comment(text));
                continue;
            }
            Node::Document(_) | Node::Attribute(_) => {
                return Err(Error::detached(ErrorKind::InvalidTree {
                    reason: format!("{} in a child list", child.kind_name()),
                }));
            }
            other => key_for(other),
        };
        let Some(key) = key else {
            continue;
        };

        match groups.get(&key).and_then(|&idx| entries.get_mut(idx)) {
            Some(Entry::Group(_, nodes)) => nodes.push(child),
            _ => {
                groups.insert(key.clone(), entries.len());
                entries.push(Entry::Group(key, vec![child]));
            }
        }
    }

    Ok(entries)
}

fn write_declaration<S: Sink>(sink: &mut S, decl: &XmlDeclaration) -> Result<()> {
    write_fields(
        sink,
        &[
            ("@version", Some(decl.version.as_str())),
            ("@encoding", decl.encoding.as_deref()),
            ("@standalone", decl.standalone.as_deref()),
        ],
    )
}

fn write_doctype<S: Sink>(sink: &mut S, doctype: &DocumentType) -> Result<()> {
    write_fields(
        sink,
        &[
            ("@name", Some(doctype.name.as_str())),
            ("@public", doctype.public_id.as_deref()),
            ("@system", doctype.system_id.as_deref()),
            ("@internalSubset", doctype.internal_subset.as_deref()),
        ],
    )
}

/// Object of the non-empty fields, in the given order
fn write_fields<S: Sink>(sink: &mut S, fields: &[(&str, Option<&str>)]) -> Result<()> {
    sink.begin_object()?;
    for (name, value) in fields {
        match value {
            Some(value) if !value.is_empty() => {
                sink.property_name(name)?;
                sink.write_string(value)?;
            }
            _ => {}
        }
    }
    sink.end_object()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json::{Formatting, Writer};
    use crate::xml::{from_xml_str, Attribute, Document, QName};

    fn render(node: Option<&Node>) -> Result<String> {
        let mut writer = Writer::new(Formatting::Compact);
        write_node(&mut writer, node)?;
        Ok(writer.into_string())
    }

    fn render_xml(xml: &str) -> Result<String> {
        let doc = from_xml_str(xml)?;
        render(Some(&Node::Document(doc)))
    }

    #[test]
    fn test_absent_node_is_null() -> Result<()> {
        assert_eq!(render(None)?, "null");
        Ok(())
    }

    #[test]
    fn test_empty_duality() -> Result<()> {
        assert_eq!(render_xml("<root/>")?, r#"{"root":null}"#);
        assert_eq!(render_xml("<root></root>")?, r#"{"root":""}"#);
        Ok(())
    }

    #[test]
    fn test_scalar_collapse() -> Result<()> {
        assert_eq!(render_xml("<root>Text</root>")?, r#"{"root":"Text"}"#);
        assert_eq!(
            render_xml(r#"<root attribute="value">Text</root>"#)?,
            r##"{"root":{"@attribute":"value","#text":"Text"}}"##
        );
        assert_eq!(
            render_xml("<root><![CDATA[x]]></root>")?,
            r##"{"root":{"#cdata-section":"x"}}"##
        );
        Ok(())
    }

    #[test]
    fn test_grouping_keeps_first_occurrence_order() -> Result<()> {
        assert_eq!(
            render_xml("<root>First<child/>Second</root>")?,
            r##"{"root":{"#text":["First","Second"],"child":null}}"##
        );
        assert_eq!(
            render_xml("<root><b/><a>1</a><b>2</b></root>")?,
            r#"{"root":{"b":[null,"2"],"a":"1"}}"#
        );
        Ok(())
    }

    #[test]
    fn test_comments_are_not_grouped() -> Result<()> {
        assert_eq!(
            render_xml("<root><element/><!-- Comment --><element/></root>")?,
            r#"{"root":{"element":[null,null]/* Comment */}}"#
        );
        assert_eq!(
            render_xml("<root><!--a--><!--b--></root>")?,
            r#"{"root":{/*a*//*b*/}}"#
        );
        Ok(())
    }

    #[test]
    fn test_prolog_nodes() -> Result<()> {
        let xml = concat!(
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>",
            "<!DOCTYPE root SYSTEM \"r.dtd\">",
            "<?pi one?><?pi two?>",
            "<root/>",
        );
        assert_eq!(
            render_xml(xml)?,
            concat!(
                r#"{"?xml":{"@version":"1.0","@encoding":"utf-8"},"#,
                r#""!DOCTYPE":{"@name":"root","@system":"r.dtd"},"#,
                r#""?pi":["one","two"],"root":null}"#,
            )
        );
        Ok(())
    }

    #[test]
    fn test_namespaced_names_are_verbatim() -> Result<()> {
        assert_eq!(
            render_xml(r#"<root xmlns:a="urn:a"><a:child/></root>"#)?,
            r#"{"root":{"@xmlns:a":"urn:a","a:child":null}}"#
        );
        Ok(())
    }

    #[test]
    fn test_invalid_children_rejected() {
        let mut root = Element::new(QName::local("root"));
        root.append_child(Attribute::new(QName::local("a"), "v"));
        let mut doc = Document::new();
        doc.append_child(root);

        let result = render(Some(&Node::Document(doc)));
        assert!(matches!(
            result,
            Err(err) if matches!(err.kind(), ErrorKind::InvalidTree { .. })
        ));

        let mut root = Element::new(QName::local("root"));
        root.append_child(Document::new());
        let result = render(Some(&Node::Element(root)));
        assert!(result.is_err());
    }

    #[test]
    fn test_comment_terminator_rejected() {
        let mut root = Element::new(QName::local("root"));
        root.append_child(Node::comment("a */ b"));
        let result = render(Some(&Node::Element(root)));
        assert!(matches!(result, Err(err) if *err.kind() == ErrorKind::InvalidComment));
    }
}
