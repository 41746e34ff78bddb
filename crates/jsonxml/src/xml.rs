//! XML parser, model and serializer

pub mod model;
pub mod parser;
mod writer;

pub use model::{
    Attribute, Document, DocumentType, Element, Node, ProcessingInstruction, QName,
    XmlDeclaration,
};
pub use parser::{from_xml_str, Parser, XMLNS_NAMESPACE, XML_NAMESPACE};
