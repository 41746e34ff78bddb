//! Builds a [`Value`] from sink calls

use crate::error::{Error, ErrorKind, Result};
use crate::json::sink::Sink;
use crate::value::{Array, Number, Object, Value};

#[derive(Debug)]
enum Partial {
    Object(Object, Option<String>),
    Array(Array),
}

/// [`Sink`] that collects its input into an in-memory [`Value`]
///
/// Comments are dropped.
#[derive(Debug, Default)]
pub struct ValueBuilder {
    stack: Vec<Partial>,
    root: Option<Value>,
}

impl ValueBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The completed value
    pub fn finish(self) -> Result<Value> {
        if !self.stack.is_empty() {
            return Err(Error::detached(ErrorKind::UnexpectedEof));
        }
        self.root
            .ok_or_else(|| Error::detached(ErrorKind::UnexpectedEof))
    }

    fn push_value(&mut self, value: Value) -> Result<()> {
        match self.stack.last_mut() {
            None if self.root.is_none() => {
                self.root = Some(value);
                Ok(())
            }
            None => Err(unexpected("end of input", value.type_name())),
            Some(Partial::Array(items)) => {
                items.push(value);
                Ok(())
            }
            Some(Partial::Object(entries, key)) => match key.take() {
                Some(key) => {
                    entries.insert(key, value);
                    Ok(())
                }
                None => Err(unexpected("property name", value.type_name())),
            },
        }
    }
}

fn unexpected(expected: &str, found: &str) -> Error {
    Error::detached(ErrorKind::Expected {
        expected: expected.to_string(),
        found: found.to_string(),
    })
}

impl Sink for ValueBuilder {
    fn write_null(&mut self) -> Result<()> {
        self.push_value(Value::Null)
    }

    fn write_bool(&mut self, value: bool) -> Result<()> {
        self.push_value(Value::Bool(value))
    }

    fn write_number(&mut self, value: Number) -> Result<()> {
        self.push_value(Value::Number(value))
    }

    fn write_string(&mut self, value: &str) -> Result<()> {
        self.push_value(Value::String(value.to_string()))
    }

    fn write_comment(&mut self, _text: &str) -> Result<()> {
        Ok(())
    }

    fn begin_object(&mut self) -> Result<()> {
        self.stack.push(Partial::Object(Object::new(), None));
        Ok(())
    }

    fn property_name(&mut self, name: &str) -> Result<()> {
        match self.stack.last_mut() {
            Some(Partial::Object(_, key @ None)) => {
                *key = Some(name.to_string());
                Ok(())
            }
            _ => Err(unexpected("value", "property name")),
        }
    }

    fn end_object(&mut self) -> Result<()> {
        match self.stack.pop() {
            Some(Partial::Object(entries, None)) => self.push_value(Value::Object(entries)),
            _ => Err(unexpected("value", "'}'")),
        }
    }

    fn begin_array(&mut self) -> Result<()> {
        self.stack.push(Partial::Array(Array::new()));
        Ok(())
    }

    fn end_array(&mut self) -> Result<()> {
        match self.stack.pop() {
            Some(Partial::Array(items)) => self.push_value(Value::Array(items)),
            _ => Err(unexpected("value", "']'")),
        }
    }
}
