//! XML parser implementation

use crate::error::{Error, ErrorKind, Pos, Result, Span};
use crate::lexer::Cursor;
use crate::xml::model::{
    Attribute, Document, DocumentType, Element, Node, ProcessingInstruction, QName,
    XmlDeclaration,
};

pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";
pub const XMLNS_NAMESPACE: &str = "http://www.w3.org/2000/xmlns/";

/// Namespace declarations and `xml:space` state of one open element
#[derive(Debug, Default)]
struct Scope {
    /// `None` prefix is the default namespace; an empty URI undeclares it
    bindings: Vec<(Option<String>, String)>,
    preserve_space: bool,
}

/// XML parser
#[derive(Debug)]
pub struct Parser<'a> {
    cursor: Cursor<'a>,
    scopes: Vec<Scope>,
}

impl<'a> Parser<'a> {
    /// Create a new XML parser
    pub const fn new(input: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(input),
            scopes: Vec::new(),
        }
    }

    /// Parse an XML document
    pub fn parse(&mut self) -> Result<Document> {
        let mut doc = Document::new();

        if self.cursor.starts_with(b"<?xml")
            && matches!(self.cursor.peek(5), Some(b' ' | b'\t' | b'\r' | b'\n'))
        {
            self.cursor.advance_by(5);
            doc.append_child(self.parse_declaration()?);
        }

        let mut seen_root = false;
        loop {
            self.cursor.skip_whitespace();
            if self.cursor.is_eof() {
                break;
            }

            if self.cursor.consume_bytes(b"<!--") {
                doc.append_child(Node::Comment(self.take_until(b"-->")?));
            } else if self.cursor.consume_bytes(b"<!DOCTYPE") {
                if seen_root || doc.doctype().is_some() {
                    return Err(self.error_here("unexpected document type declaration"));
                }
                doc.append_child(self.parse_doctype()?);
            } else if self.cursor.consume_bytes(b"<?") {
                doc.append_child(self.parse_processing_instruction()?);
            } else if self.cursor.current() == Some(b'<') {
                if seen_root {
                    return Err(self.error_here("multiple root elements"));
                }
                seen_root = true;
                let root = self.parse_element()?;
                doc.append_child(root);
            } else {
                return Err(self.error_here("text outside the root element"));
            }
        }

        if !seen_root {
            return Err(self.error_here("missing root element"));
        }

        Ok(doc)
    }

    fn parse_declaration(&mut self) -> Result<XmlDeclaration> {
        let mut version = None;
        let mut encoding = None;
        let mut standalone = None;

        for (name, value) in self.parse_attributes()? {
            match name.as_str() {
                "version" => version = Some(value),
                "encoding" => encoding = Some(value),
                "standalone" => standalone = Some(value),
                _ => return Err(self.error_here("unknown xml declaration attribute")),
            }
        }

        if !self.cursor.consume_bytes(b"?>") {
            return Err(self.error_here("unterminated xml declaration"));
        }

        let Some(version) = version else {
            return Err(self.error_here("xml declaration without version"));
        };

        Ok(XmlDeclaration {
            version,
            encoding,
            standalone,
        })
    }

    fn parse_doctype(&mut self) -> Result<DocumentType> {
        self.expect_whitespace()?;
        let mut doctype = DocumentType::new(self.parse_name()?);
        self.cursor.skip_whitespace();

        if self.cursor.consume_bytes(b"PUBLIC") {
            self.expect_whitespace()?;
            doctype.public_id = Some(self.parse_literal()?);
            self.cursor.skip_whitespace();
            if matches!(self.cursor.current(), Some(b'"' | b'\'')) {
                doctype.system_id = Some(self.parse_literal()?);
            }
        } else if self.cursor.consume_bytes(b"SYSTEM") {
            self.expect_whitespace()?;
            doctype.system_id = Some(self.parse_literal()?);
        }
        self.cursor.skip_whitespace();

        if self.cursor.consume(b'[') {
            doctype.internal_subset = Some(self.parse_internal_subset()?);
            self.cursor.skip_whitespace();
        }

        self.expect_byte(b'>')?;
        Ok(doctype)
    }

    fn parse_internal_subset(&mut self) -> Result<String> {
        let start = self.cursor.pos();
        let mut quote = None;
        while let Some(b) = self.cursor.current() {
            match (quote, b) {
                (None, b']') => {
                    let raw = self.cursor.slice_from(start);
                    self.cursor.advance();
                    return bytes_to_string(raw);
                }
                (None, b'"' | b'\'') => quote = Some(b),
                (Some(q), _) if q == b => quote = None,
                _ => {}
            }
            self.cursor.advance();
        }
        Err(self.error_here("unterminated internal subset"))
    }

    fn parse_processing_instruction(&mut self) -> Result<Node> {
        // cursor is past "<?"
        let target = self.parse_name()?;
        if target.eq_ignore_ascii_case("xml") {
            return Err(self.error_here("xml declaration not at start of document"));
        }

        if self.cursor.consume_bytes(b"?>") {
            return Ok(Node::processing_instruction(target, ""));
        }

        self.expect_whitespace()?;
        self.cursor.skip_whitespace();
        let data = self.take_until(b"?>")?;
        Ok(Node::ProcessingInstruction(ProcessingInstruction { target, data }))
    }

    fn parse_element(&mut self) -> Result<Element> {
        self.expect_byte(b'<')?;
        let raw_name = self.parse_name()?;
        let raw_attributes = self.parse_attributes()?;

        self.push_scope(&raw_attributes);
        let result = self.build_element(&raw_name, raw_attributes);
        self.scopes.pop();
        result
    }

    fn build_element(&mut self, raw_name: &str, raw_attributes: Vec<(String, String)>) -> Result<Element> {
        let mut element = Element::new(self.resolve_element_name(raw_name)?);
        for (name, value) in raw_attributes {
            let name = self.resolve_attribute_name(&name)?;
            element.attributes.push(Attribute::new(name, value));
        }

        if self.cursor.consume_bytes(b"/>") {
            return Ok(element);
        }
        self.expect_byte(b'>')?;
        element.is_empty = false;

        loop {
            if self.cursor.consume_bytes(b"</") {
                let start = self.cursor.position();
                let close_name = self.parse_name()?;
                if close_name != raw_name {
                    return Err(Error::new(
                        ErrorKind::MismatchedTag {
                            expected: raw_name.to_string(),
                            found: close_name,
                        },
                        Span::new(start, self.cursor.position()),
                    ));
                }
                self.cursor.skip_whitespace();
                self.expect_byte(b'>')?;
                break;
            }

            if self.cursor.consume_bytes(b"<!--") {
                element.append_child(Node::Comment(self.take_until(b"-->")?));
            } else if self.cursor.consume_bytes(b"<![CDATA[") {
                element.append_child(Node::CData(self.take_until(b"]]>")?));
            } else if self.cursor.consume_bytes(b"<?") {
                element.append_child(self.parse_processing_instruction()?);
            } else if self.cursor.starts_with(b"<!") {
                return Err(self.error_here("unexpected markup declaration"));
            } else if self.cursor.current() == Some(b'<') {
                let child = self.parse_element()?;
                element.append_child(child);
            } else if self.cursor.is_eof() {
                return Err(self.error_here("unterminated element"));
            } else if let Some(text) = self.parse_text()? {
                element.append_child(text);
            }
        }

        Ok(element)
    }

    fn push_scope(&mut self, raw_attributes: &[(String, String)]) {
        let mut scope = Scope {
            bindings: Vec::new(),
            preserve_space: self.scopes.last().is_some_and(|s| s.preserve_space),
        };

        for (name, value) in raw_attributes {
            if name == "xmlns" {
                scope.bindings.push((None, value.clone()));
            } else if let Some(prefix) = name.strip_prefix("xmlns:") {
                scope.bindings.push((Some(prefix.to_string()), value.clone()));
            } else if name == "xml:space" {
                scope.preserve_space = value == "preserve";
            }
        }

        self.scopes.push(scope);
    }

    fn lookup(&self, prefix: Option<&str>) -> Option<String> {
        match prefix {
            Some("xml") => return Some(XML_NAMESPACE.to_string()),
            Some("xmlns") => return Some(XMLNS_NAMESPACE.to_string()),
            _ => {}
        }
        self.scopes
            .iter()
            .rev()
            .flat_map(|scope| scope.bindings.iter().rev())
            .find(|(bound, _)| bound.as_deref() == prefix)
            .map(|(_, uri)| uri.clone())
            .filter(|uri| !uri.is_empty())
    }

    fn resolve_element_name(&self, raw: &str) -> Result<QName> {
        let mut name = QName::parse(raw);
        name.namespace = self.lookup(name.prefix.as_deref());
        if name.prefix.is_some() && name.namespace.is_none() {
            return Err(self.error_here("undeclared namespace prefix"));
        }
        Ok(name)
    }

    fn resolve_attribute_name(&self, raw: &str) -> Result<QName> {
        let mut name = QName::parse(raw);
        match name.prefix.as_deref() {
            // Unprefixed attributes are in no namespace
            None if raw == "xmlns" => name.namespace = Some(XMLNS_NAMESPACE.to_string()),
            None => {}
            Some(prefix) => {
                name.namespace = self.lookup(Some(prefix));
                if name.namespace.is_none() {
                    return Err(self.error_here("undeclared namespace prefix"));
                }
            }
        }
        Ok(name)
    }

    fn parse_attributes(&mut self) -> Result<Vec<(String, String)>> {
        let mut attrs: Vec<(String, String)> = Vec::new();

        loop {
            let had_space = self.skip_whitespace_any();
            match self.cursor.current() {
                Some(b'/' | b'>' | b'?') => break,
                Some(_) if !had_space => {
                    return Err(self.error_here("expected whitespace before attribute"));
                }
                Some(_) => {}
                None => return Err(self.error_here("unexpected end of input")),
            }

            let start = self.cursor.position();
            let name = self.parse_name()?;
            self.cursor.skip_whitespace();
            self.expect_byte(b'=')?;
            self.cursor.skip_whitespace();
            let value = self.parse_attribute_value()?;

            if attrs.iter().any(|(existing, _)| *existing == name) {
                return Err(Error::new(
                    ErrorKind::DuplicateAttribute { name },
                    Span::new(start, self.cursor.position()),
                ));
            }
            attrs.push((name, value));
        }

        Ok(attrs)
    }

    fn parse_attribute_value(&mut self) -> Result<String> {
        let quote = match self.cursor.current() {
            Some(b'"') => b'"',
            Some(b'\'') => b'\'',
            _ => return Err(self.error_here("expected quoted attribute value")),
        };
        self.cursor.advance();

        let start = self.cursor.pos();
        while let Some(b) = self.cursor.current() {
            if b == quote {
                let raw = self.cursor.slice_from(start);
                self.cursor.advance();
                let text = bytes_to_string(raw)?;
                return decode_entities(&text);
            }
            if b == b'<' {
                return Err(self.error_here("'<' in attribute value"));
            }
            self.cursor.advance();
        }

        Err(self.error_here("unterminated attribute value"))
    }

    /// Quoted literal without entity decoding
    fn parse_literal(&mut self) -> Result<String> {
        let quote = match self.cursor.current() {
            Some(b @ (b'"' | b'\'')) => b,
            _ => return Err(self.error_here("expected quoted literal")),
        };
        self.cursor.advance();

        let start = self.cursor.pos();
        while let Some(b) = self.cursor.current() {
            if b == quote {
                let raw = self.cursor.slice_from(start);
                self.cursor.advance();
                return bytes_to_string(raw);
            }
            self.cursor.advance();
        }

        Err(self.error_here("unterminated literal"))
    }

    fn parse_text(&mut self) -> Result<Option<Node>> {
        let start = self.cursor.pos();
        while let Some(b) = self.cursor.current() {
            if b == b'<' {
                break;
            }
            self.cursor.advance();
        }

        let raw = self.cursor.slice_from(start);
        let text = bytes_to_string(raw)?;
        let text = decode_entities(&text)?;

        if !text.chars().all(|c| matches!(c, ' ' | '\t' | '\r' | '\n')) {
            Ok(Some(Node::Text(text)))
        } else if self.scopes.last().is_some_and(|s| s.preserve_space) {
            Ok(Some(Node::SignificantWhitespace(text)))
        } else {
            Ok(None)
        }
    }

    fn parse_name(&mut self) -> Result<String> {
        let start = self.cursor.pos();

        match self.cursor.current() {
            Some(first) if is_name_start(first) => self.cursor.advance(),
            _ => return Err(self.error_here("expected name")),
        }

        while let Some(b) = self.cursor.current() {
            if is_name_char(b) {
                self.cursor.advance();
            } else {
                break;
            }
        }

        let raw = self.cursor.slice_from(start);
        bytes_to_string(raw)
    }

    /// Consume everything up to `pattern`, returning the text before it
    fn take_until(&mut self, pattern: &[u8]) -> Result<String> {
        let start = self.cursor.pos();
        while self.cursor.current().is_some() {
            if self.cursor.starts_with(pattern) {
                let raw = self.cursor.slice_from(start);
                self.cursor.advance_by(pattern.len());
                return bytes_to_string(raw);
            }
            self.cursor.advance();
        }
        Err(self.error_here("unterminated markup"))
    }

    fn expect_byte(&mut self, expected: u8) -> Result<()> {
        if self.cursor.consume(expected) {
            Ok(())
        } else {
            Err(self.error_here("unexpected token"))
        }
    }

    fn expect_whitespace(&mut self) -> Result<()> {
        if self.skip_whitespace_any() {
            Ok(())
        } else {
            Err(self.error_here("expected whitespace"))
        }
    }

    /// Skip whitespace, reporting whether there was any
    fn skip_whitespace_any(&mut self) -> bool {
        let before = self.cursor.pos();
        self.cursor.skip_whitespace();
        self.cursor.pos() != before
    }

    fn error_here(&self, message: &str) -> Error {
        let pos = self.cursor.position();
        Error::with_message(
            ErrorKind::InvalidToken,
            Span::new(Pos::new(pos.offset, pos.line, pos.col), pos),
            message.to_string(),
        )
    }
}

/// Parse XML text into a document
pub fn from_xml_str(input: &str) -> Result<Document> {
    Parser::new(input.as_bytes()).parse()
}

fn bytes_to_string(bytes: &[u8]) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(|s| s.to_string())
        .map_err(|_| {
            Error::with_message(
                ErrorKind::InvalidToken,
                Span::empty(),
                "invalid utf-8".to_string(),
            )
        })
}

fn is_name_start(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'_' | b':') || b >= 0x80
}

fn is_name_char(b: u8) -> bool {
    is_name_start(b) || matches!(b, b'0'..=b'9' | b'-' | b'.')
}

fn decode_entities(input: &str) -> Result<String> {
    if !input.contains('&') {
        return Ok(input.to_string());
    }

    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(ch) = chars.next() {
        if ch != '&' {
            result.push(ch);
            continue;
        }

        let mut entity = String::new();
        let mut terminated = false;
        for next in chars.by_ref() {
            if next == ';' {
                terminated = true;
                break;
            }
            entity.push(next);
        }

        let decoded = match entity.as_str() {
            _ if !terminated => None,
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => decode_numeric_entity(&entity),
        };

        match decoded {
            Some(ch) => result.push(ch),
            None => {
                return Err(Error::with_message(
                    ErrorKind::InvalidToken,
                    Span::empty(),
                    format!("invalid xml entity '&{entity}'"),
                ));
            }
        }
    }

    Ok(result)
}

fn decode_numeric_entity(entity: &str) -> Option<char> {
    if let Some(hex) = entity.strip_prefix("#x") {
        u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
    } else if let Some(dec) = entity.strip_prefix('#') {
        dec.parse::<u32>().ok().and_then(char::from_u32)
    } else {
        None
    }
}
