//! jsonxml - XML ⇄ JSON conversion using the Json.NET naming convention
//!
//! Attributes become `@name` members, text becomes `#text`, repeated
//! sibling elements become arrays and XML comments travel as JSON block
//! comments.
//!
//! # Quick Start
//!
//! ```
//! use jsonxml::{from_json, xml_to_json};
//! # fn main() -> Result<(), jsonxml::Error> {
//! let json = xml_to_json(r#"<root id="1"><item>a</item><item>b</item></root>"#)?;
//! assert_eq!(json, r#"{"root":{"@id":"1","item":["a","b"]}}"#);
//!
//! let doc = from_json(&json)?;
//! let xml = doc.map(|doc| doc.to_xml()).unwrap_or_default();
//! assert_eq!(xml, r#"<root id="1"><item>a</item><item>b</item></root>"#);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub use error::{Error, ErrorKind, Pos, Result, Span};

pub mod lexer;
pub use lexer::{CommentHandling, Token, TokenKind};

pub mod value;
pub use value::{Array, Number, Object, Value};

pub mod json;
pub use json::{Config, Event, EventSource, Formatting, Parser, Sink, ValueBuilder, Writer};

pub mod xml;
pub use xml::{
    from_xml_str, Attribute, Document, DocumentType, Element, Node, ProcessingInstruction, QName,
    XmlDeclaration,
};

pub mod convert;
pub use convert::{
    convert, convert_with_options, from_json, from_json_value, from_json_with_options,
    json_to_xml, to_json, to_json_value, to_json_with_options, xml_to_json, ConvertOptions,
    Format, ReadOptions, UnresolvedPrefix, WriteOptions,
};

/// Parse JSON text into a value
pub fn from_str(s: &str) -> Result<Value> {
    let mut parser = Parser::new(s.as_bytes());
    let value = parser.parse_value()?;
    parser.finish()?;
    Ok(value)
}

/// Parse JSON with custom configuration
pub fn from_str_with_config(s: &str, config: Config) -> Result<Value> {
    let mut parser = Parser::with_config(s.as_bytes(), config);
    let value = parser.parse_value()?;
    parser.finish()?;
    Ok(value)
}
