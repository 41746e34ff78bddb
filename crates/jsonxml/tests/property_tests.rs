//! Property-based tests for XML ⇄ JSON conversion
//!
//! These tests use proptest to verify:
//! 1. Roundtrip property: xml -> json -> xml reproduces the parsed document
//! 2. Comment-free output is valid JSON
//! 3. Arbitrary input never panics the JSON reader

use proptest::prelude::*;
use jsonxml::{from_json, from_str, from_xml_str, to_json, Node};

/// Element tree shaped so that sibling grouping never reorders it
#[derive(Clone, Debug)]
struct Tree {
    name: String,
    attributes: Vec<(String, String)>,
    content: Content,
}

#[derive(Clone, Debug)]
enum Content {
    /// `<e/>`, or `<e></e>` when there are no attributes and `open` is set
    Empty { open: bool },
    Text(String),
    /// Leading text, then runs of same-name siblings, then a trailing comment
    Mixed {
        text: Option<String>,
        runs: Vec<(Tree, usize)>,
        comment: Option<String>,
    },
}

fn render(tree: &Tree, out: &mut String) {
    out.push('<');
    out.push_str(&tree.name);
    for (name, value) in &tree.attributes {
        out.push_str(&format!(" {name}=\"{}\"", escape(value).replace('"', "&quot;")));
    }

    match &tree.content {
        Content::Empty { open } if *open && tree.attributes.is_empty() => {
            out.push_str(&format!("></{}>", tree.name));
        }
        Content::Empty { .. } => out.push_str("/>"),
        Content::Text(text) => {
            out.push_str(&format!(">{}</{}>", escape(text), tree.name));
        }
        Content::Mixed {
            text,
            runs,
            comment,
        } => {
            out.push('>');
            if let Some(text) = text {
                out.push_str(&escape(text));
            }
            for (child, count) in runs {
                for _ in 0..*count {
                    render(child, out);
                }
            }
            if let Some(comment) = comment {
                out.push_str(&format!("<!--{comment}-->"));
            }
            out.push_str(&format!("</{}>", tree.name));
        }
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn arb_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,3}"
}

/// Text with at least one non-whitespace character
fn arb_text() -> impl Strategy<Value = String> {
    r#"[a-zA-Z0-9 &<>"']{0,6}[a-zA-Z0-9]"#
}

fn arb_attributes() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::vec((arb_name(), "[a-zA-Z0-9 &<>\"]{0,6}"), 0..3).prop_map(|attrs| {
        let mut seen = Vec::new();
        attrs
            .into_iter()
            .filter(|(name, _)| {
                let fresh = !seen.contains(name);
                seen.push(name.clone());
                fresh
            })
            .collect()
    })
}

fn arb_tree() -> impl Strategy<Value = Tree> {
    let leaf = (
        arb_name(),
        arb_attributes(),
        prop_oneof![
            any::<bool>().prop_map(|open| Content::Empty { open }),
            arb_text().prop_map(Content::Text),
        ],
    )
        .prop_map(|(name, attributes, content)| Tree {
            name,
            attributes,
            content,
        });

    leaf.prop_recursive(4, 32, 4, |inner| {
        (
            arb_name(),
            arb_attributes(),
            proptest::option::of(arb_text()),
            prop::collection::vec((inner, 1..3usize), 1..4),
            proptest::option::of("[a-z ]{0,6}"),
        )
            .prop_map(|(name, attributes, text, runs, comment)| {
                // Same-name runs must not be split by another run
                let mut seen = Vec::new();
                let runs = runs
                    .into_iter()
                    .filter(|(child, _)| {
                        let fresh = !seen.contains(&child.name);
                        seen.push(child.name.clone());
                        fresh
                    })
                    .collect();
                Tree {
                    name,
                    attributes,
                    content: Content::Mixed {
                        text,
                        runs,
                        comment,
                    },
                }
            })
    })
}

proptest! {
    /// Test that converting a parsed document to JSON and back gives the same XML
    #[test]
    fn xml_json_roundtrip(tree in arb_tree()) {
        let mut xml = String::new();
        render(&tree, &mut xml);

        let doc = from_xml_str(&xml).unwrap();
        let json = to_json(Some(&Node::Document(doc.clone()))).unwrap();
        let back = from_json(&json).unwrap().unwrap();

        prop_assert_eq!(back.to_xml(), doc.to_xml());
    }

    /// Test that output without comments parses as standard JSON
    #[test]
    fn comment_free_output_is_json(tree in arb_tree()) {
        let mut xml = String::new();
        render(&tree, &mut xml);

        let json = to_json(Some(&Node::Document(from_xml_str(&xml).unwrap()))).unwrap();
        if !json.contains("/*") {
            prop_assert!(serde_json::from_str::<serde_json::Value>(&json).is_ok(), "{}", json);
        }
    }

    /// Test that arbitrary input never panics the reader
    #[test]
    fn arbitrary_json_never_panics(s in r#"[\[\]{}":,a-z0-9@#?!/* ]{0,40}"#) {
        let _doc = from_json(&s);
        let _value = from_str(&s);
    }

    /// Test that documents built from simple JSON objects render back to the same JSON
    #[test]
    fn json_xml_roundtrip(entries in prop::collection::vec((arb_name(), "[a-z]{1,5}"), 1..5)) {
        let mut seen = Vec::new();
        let members: Vec<String> = entries
            .into_iter()
            .filter(|(name, _)| {
                let fresh = !seen.contains(name);
                seen.push(name.clone());
                fresh
            })
            .map(|(name, text)| format!("\"{name}\":\"{text}\""))
            .collect();
        let json = format!("{{\"root\":{{{}}}}}", members.join(","));

        let doc = from_json(&json).unwrap().unwrap();
        prop_assert_eq!(to_json(Some(&Node::Document(doc))).unwrap(), json);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_forms() {
        let tree = Tree {
            name: "r".to_string(),
            attributes: vec![("a".to_string(), "x\"<".to_string())],
            content: Content::Mixed {
                text: Some("t&".to_string()),
                runs: vec![(
                    Tree {
                        name: "c".to_string(),
                        attributes: Vec::new(),
                        content: Content::Empty { open: true },
                    },
                    2,
                )],
                comment: Some("n".to_string()),
            },
        };
        let mut xml = String::new();
        render(&tree, &mut xml);
        assert_eq!(
            xml,
            "<r a=\"x&quot;&lt;\">t&amp;<c></c><c></c><!--n--></r>"
        );
    }
}
