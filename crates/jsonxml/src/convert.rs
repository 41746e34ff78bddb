//! XML ⇄ JSON conversion

pub mod namespaces;
pub mod naming;
pub mod reader;
pub mod writer;

pub use namespaces::{Namespaces, UnresolvedPrefix};
pub use reader::read;
pub use writer::write_node;

use crate::error::Result;
use crate::json::{Config as JsonConfig, Formatting, Parser as JsonParser, ValueBuilder, Writer};
use crate::lexer::CommentHandling;
use crate::value::Value;
use crate::xml::{Document, Node, Parser as XmlParser};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Json,
    Xml,
}

/// Options for reading JSON into a document
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReadOptions {
    pub json: JsonConfig,
    pub unresolved_prefix: UnresolvedPrefix,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadOptions {
    /// Default parser limits with comments surfaced as XML comments
    pub const fn new() -> Self {
        Self {
            json: JsonConfig::new(128, 10 * 1024 * 1024).with_comments(CommentHandling::Surface),
            unresolved_prefix: UnresolvedPrefix::DropPrefix,
        }
    }

    pub const fn with_unresolved_prefix(mut self, policy: UnresolvedPrefix) -> Self {
        self.unresolved_prefix = policy;
        self
    }
}

/// Options for writing JSON text
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WriteOptions {
    pub formatting: Formatting,
}

impl WriteOptions {
    pub const fn indented(width: usize) -> Self {
        Self {
            formatting: Formatting::Indented(width),
        }
    }
}

/// Options for [`convert_with_options`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConvertOptions {
    pub read: ReadOptions,
    pub write: WriteOptions,
}

/// Serialize a node as compact JSON text
pub fn to_json(node: Option<&Node>) -> Result<String> {
    to_json_with_options(node, &WriteOptions::default())
}

pub fn to_json_with_options(node: Option<&Node>, options: &WriteOptions) -> Result<String> {
    let mut writer = Writer::new(options.formatting);
    write_node(&mut writer, node)?;
    Ok(writer.into_string())
}

/// Convert a node to an in-memory value; comments are dropped
pub fn to_json_value(node: Option<&Node>) -> Result<Value> {
    let mut builder = ValueBuilder::new();
    write_node(&mut builder, node)?;
    builder.finish()
}

/// Parse JSON text into a document; `null` gives `None`
pub fn from_json(text: &str) -> Result<Option<Document>> {
    from_json_with_options(text, &ReadOptions::default())
}

pub fn from_json_with_options(text: &str, options: &ReadOptions) -> Result<Option<Document>> {
    let mut parser = JsonParser::with_config(text.as_bytes(), options.json);
    let doc = read(&mut parser, options.unresolved_prefix)?;
    parser.finish()?;
    Ok(doc)
}

pub fn from_json_value(value: &Value) -> Result<Option<Document>> {
    read(value.events(), UnresolvedPrefix::default())
}

/// XML text to compact JSON text
pub fn xml_to_json(xml: &str) -> Result<String> {
    let doc = XmlParser::new(xml.as_bytes()).parse()?;
    to_json(Some(&Node::Document(doc)))
}

/// JSON text to XML text; `null` gives an empty string
pub fn json_to_xml(json: &str) -> Result<String> {
    Ok(from_json(json)?.map(|doc| doc.to_xml()).unwrap_or_default())
}

/// Convert between supported formats
pub fn convert(input: &str, from: Format, to: Format) -> Result<String> {
    convert_with_options(input, from, to, &ConvertOptions::default())
}

/// Convert between supported formats with options
pub fn convert_with_options(
    input: &str,
    from: Format,
    to: Format,
    options: &ConvertOptions,
) -> Result<String> {
    match (from, to) {
        (Format::Xml, Format::Json) => {
            let doc = XmlParser::new(input.as_bytes()).parse()?;
            to_json_with_options(Some(&Node::Document(doc)), &options.write)
        }
        (Format::Json, Format::Xml) => Ok(from_json_with_options(input, &options.read)?
            .map(|doc| doc.to_xml())
            .unwrap_or_default()),
        (Format::Json, Format::Json) | (Format::Xml, Format::Xml) => Ok(input.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_read_options_default() {
        let options = ReadOptions::default();
        assert_eq!(options.json.max_depth, 128);
        assert_eq!(options.json.comments, CommentHandling::Surface);
        assert_eq!(options.unresolved_prefix, UnresolvedPrefix::DropPrefix);
    }

    #[test]
    fn test_null_identity() -> Result<()> {
        assert_eq!(to_json(None)?, "null");
        assert!(from_json("null")?.is_none());
        assert_eq!(json_to_xml("null")?, "");
        Ok(())
    }

    #[test]
    fn test_trailing_content_rejected() {
        assert!(from_json(r#"{"root":null} 1"#).is_err());
        assert!(from_json(r#"{"root":null} // ok"#).is_ok());
    }

    #[test]
    fn test_identity_conversion() -> Result<()> {
        assert_eq!(convert("<a/>", Format::Xml, Format::Xml)?, "<a/>");
        assert_eq!(convert("not json", Format::Json, Format::Json)?, "not json");
        Ok(())
    }

    #[test]
    fn test_convert_both_ways() -> Result<()> {
        let json = convert("<root><e/><e/></root>", Format::Xml, Format::Json)?;
        assert_eq!(json, r#"{"root":{"e":[null,null]}}"#);
        assert_eq!(convert(&json, Format::Json, Format::Xml)?, "<root><e/><e/></root>");
        Ok(())
    }

    #[test]
    fn test_indented_output() -> Result<()> {
        let options = ConvertOptions {
            write: WriteOptions::indented(2),
            ..ConvertOptions::default()
        };
        let json = convert_with_options("<root a=\"1\"/>", Format::Xml, Format::Json, &options)?;
        assert_eq!(json, "{\n  \"root\": {\n    \"@a\": \"1\"\n  }\n}");
        Ok(())
    }

    #[test]
    fn test_value_conversions() -> Result<()> {
        let doc = from_xml_str_doc("<root><!--c--><v>1</v></root>")?;
        let value = to_json_value(Some(&doc))?;
        assert_eq!(value.to_string(), r#"{"root":{"v":"1"}}"#);

        let back = from_json_value(&value)?;
        assert_eq!(back.map(|d| d.to_xml()).unwrap_or_default(), "<root><v>1</v></root>");
        Ok(())
    }

    #[test]
    fn test_invalid_root_is_format_error() {
        let result = from_json("[1]");
        assert!(matches!(&result, Err(err) if err.is_format_error()));
        assert!(matches!(result, Err(err) if matches!(err.kind(), ErrorKind::InvalidRoot { .. })));
    }

    fn from_xml_str_doc(xml: &str) -> Result<Node> {
        Ok(Node::Document(XmlParser::new(xml.as_bytes()).parse()?))
    }
}
