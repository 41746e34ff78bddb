//! JSON text writer

use crate::error::{Error, ErrorKind, Result};
use crate::json::sink::Sink;
use crate::value::Number;

/// Output layout
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Formatting {
    /// No insignificant whitespace
    #[default]
    Compact,
    /// One entry per line, indented by the given number of spaces per level
    Indented(usize),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Container {
    Object,
    Array,
}

#[derive(Debug)]
struct Frame {
    container: Container,
    /// Values or properties written so far
    items: usize,
    /// Anything written so far, comments included
    has_content: bool,
}

/// [`Sink`] that renders JSON text into a `String`
///
/// Comments are rendered as `/*text*/` and never produce a separating
/// comma of their own.
#[derive(Debug)]
pub struct Writer {
    output: String,
    formatting: Formatting,
    stack: Vec<Frame>,
    /// A property name was written and its value is pending
    after_key: bool,
    root_written: bool,
}

impl Default for Writer {
    fn default() -> Self {
        Self::new(Formatting::default())
    }
}

impl Writer {
    pub fn new(formatting: Formatting) -> Self {
        Self {
            output: String::new(),
            formatting,
            stack: Vec::new(),
            after_key: false,
            root_written: false,
        }
    }

    /// The text written so far
    pub fn as_str(&self) -> &str {
        &self.output
    }

    pub fn into_string(self) -> String {
        self.output
    }

    fn newline_indent(&mut self, level: usize) {
        if let Formatting::Indented(width) = self.formatting {
            self.output.push('\n');
            let spaces = level.saturating_mul(width);
            self.output.extend(std::iter::repeat(' ').take(spaces));
        }
    }

    /// Separator and indentation ahead of a value or property
    fn before_item(&mut self, is_property: bool) -> Result<()> {
        if self.after_key {
            if is_property {
                return Err(misuse("value", "property name"));
            }
            self.after_key = false;
            return Ok(());
        }

        let level = self.stack.len();
        match self.stack.last_mut() {
            None => {
                if self.root_written || is_property {
                    return Err(misuse("end of output", "value"));
                }
                self.root_written = true;
                Ok(())
            }
            Some(frame) => {
                match (frame.container, is_property) {
                    (Container::Object, false) => return Err(misuse("property name", "value")),
                    (Container::Array, true) => return Err(misuse("value", "property name")),
                    _ => {}
                }
                let needs_comma = frame.items > 0;
                frame.items = frame.items.saturating_add(1);
                frame.has_content = true;
                if needs_comma {
                    self.output.push(',');
                }
                self.newline_indent(level);
                Ok(())
            }
        }
    }

    fn open(&mut self, container: Container, bracket: char) -> Result<()> {
        self.before_item(false)?;
        self.output.push(bracket);
        self.stack.push(Frame {
            container,
            items: 0,
            has_content: false,
        });
        Ok(())
    }

    fn close(&mut self, container: Container, bracket: char) -> Result<()> {
        match self.stack.last() {
            Some(frame) if frame.container == container && !self.after_key => {}
            _ => return Err(misuse("matching container end", &bracket.to_string())),
        }
        if let Some(frame) = self.stack.pop() {
            if frame.has_content {
                self.newline_indent(self.stack.len());
            }
        }
        self.output.push(bracket);
        Ok(())
    }

    fn push_escaped(&mut self, value: &str) {
        self.output.push('"');
        for ch in value.chars() {
            match ch {
                '"' => self.output.push_str("\\\""),
                '\\' => self.output.push_str("\\\\"),
                '\n' => self.output.push_str("\\n"),
                '\r' => self.output.push_str("\\r"),
                '\t' => self.output.push_str("\\t"),
                '\u{08}' => self.output.push_str("\\b"),
                '\u{0C}' => self.output.push_str("\\f"),
                c if u32::from(c) < 0x20 => {
                    self.output.push_str(&format!("\\u{:04x}", u32::from(c)));
                }
                c => self.output.push(c),
            }
        }
        self.output.push('"');
    }
}

fn misuse(expected: &str, found: &str) -> Error {
    Error::detached(ErrorKind::Expected {
        expected: expected.to_string(),
        found: found.to_string(),
    })
}

impl Sink for Writer {
    fn write_null(&mut self) -> Result<()> {
        self.before_item(false)?;
        self.output.push_str("null");
        Ok(())
    }

    fn write_bool(&mut self, value: bool) -> Result<()> {
        self.before_item(false)?;
        self.output.push_str(if value { "true" } else { "false" });
        Ok(())
    }

    fn write_number(&mut self, value: Number) -> Result<()> {
        self.before_item(false)?;
        self.output.push_str(&value.to_string());
        Ok(())
    }

    fn write_string(&mut self, value: &str) -> Result<()> {
        self.before_item(false)?;
        self.push_escaped(value);
        Ok(())
    }

    fn write_comment(&mut self, text: &str) -> Result<()> {
        if text.contains("*/") {
            return Err(Error::detached(ErrorKind::InvalidComment));
        }
        if !self.after_key {
            let level = self.stack.len();
            if let Some(frame) = self.stack.last_mut() {
                frame.has_content = true;
                self.newline_indent(level);
            } else if !self.output.is_empty() {
                self.newline_indent(0);
            }
        }
        self.output.push_str("/*");
        self.output.push_str(text);
        self.output.push_str("*/");
        Ok(())
    }

    fn begin_object(&mut self) -> Result<()> {
        self.open(Container::Object, '{')
    }

    fn property_name(&mut self, name: &str) -> Result<()> {
        self.before_item(true)?;
        self.push_escaped(name);
        self.output.push(':');
        if matches!(self.formatting, Formatting::Indented(_)) {
            self.output.push(' ');
        }
        self.after_key = true;
        Ok(())
    }

    fn end_object(&mut self) -> Result<()> {
        self.close(Container::Object, '}')
    }

    fn begin_array(&mut self) -> Result<()> {
        self.open(Container::Array, '[')
    }

    fn end_array(&mut self) -> Result<()> {
        self.close(Container::Array, ']')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compact() -> Writer {
        Writer::new(Formatting::Compact)
    }

    #[test]
    fn test_scalars() -> Result<()> {
        let mut writer = compact();
        writer.begin_array()?;
        writer.write_null()?;
        writer.write_bool(true)?;
        writer.write_number(Number::Integer(-3))?;
        writer.write_number(Number::Float(0.5))?;
        writer.write_string("x")?;
        writer.end_array()?;
        assert_eq!(writer.into_string(), r#"[null,true,-3,0.5,"x"]"#);
        Ok(())
    }

    #[test]
    fn test_string_escaping() -> Result<()> {
        let mut writer = compact();
        writer.write_string("a\"b\\c\nd\u{01}\u{08}")?;
        assert_eq!(writer.into_string(), r#""a\"b\\c\nd\u0001\b""#);
        Ok(())
    }

    #[test]
    fn test_comment_has_no_comma() -> Result<()> {
        let mut writer = compact();
        writer.begin_object()?;
        writer.property_name("element")?;
        writer.begin_array()?;
        writer.write_null()?;
        writer.write_null()?;
        writer.end_array()?;
        writer.write_comment(" Comment ")?;
        writer.property_name("next")?;
        writer.write_string("v")?;
        writer.end_object()?;
        assert_eq!(
            writer.into_string(),
            r#"{"element":[null,null]/* Comment */,"next":"v"}"#
        );
        Ok(())
    }

    #[test]
    fn test_comment_rejects_terminator() {
        let mut writer = compact();
        let result = writer.write_comment("a */ b");
        assert!(matches!(result, Err(err) if *err.kind() == ErrorKind::InvalidComment));
    }

    #[test]
    fn test_indented_layout() -> Result<()> {
        let mut writer = Writer::new(Formatting::Indented(2));
        writer.begin_object()?;
        writer.property_name("root")?;
        writer.begin_object()?;
        writer.property_name("@a")?;
        writer.write_string("1")?;
        writer.property_name("list")?;
        writer.begin_array()?;
        writer.write_null()?;
        writer.end_array()?;
        writer.end_object()?;
        writer.property_name("empty")?;
        writer.begin_object()?;
        writer.end_object()?;
        writer.end_object()?;
        let expected = "{\n  \"root\": {\n    \"@a\": \"1\",\n    \"list\": [\n      null\n    ]\n  },\n  \"empty\": {}\n}";
        assert_eq!(writer.into_string(), expected);
        Ok(())
    }

    #[test]
    fn test_misuse_is_reported() {
        let mut writer = compact();
        assert!(writer.end_object().is_err());

        let mut writer = compact();
        assert!(writer
            .begin_object()
            .and_then(|()| writer.write_null())
            .is_err());

        let mut writer = compact();
        assert!(writer
            .write_null()
            .and_then(|()| writer.write_null())
            .is_err());
    }
}
