//! In-memory JSON values

use indexmap::map::{IntoIter, Iter, Keys, Values};
use indexmap::IndexMap;
use std::fmt;
use std::ops::Index;

use crate::error::Result;
use crate::json::{Event, EventSource, Formatting, Sink, Writer};

/// A JSON number, kept as an integer whenever the literal allows it
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Integer(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            // i64 -> f64 is the documented lossy widening here
            #[allow(clippy::as_conversions)]
            Self::Integer(n) => n as f64,
            Self::Float(n) => n,
        }
    }

    pub const fn as_i64(self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(n),
            Self::Float(_) => None,
        }
    }
}

/// Canonical decimal text, as used for XML text content
impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(n) if n.is_finite() => write!(f, "{n}"),
            Self::Float(_) => write!(f, "null"),
        }
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

/// A JSON value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Null value
    #[default]
    Null,
    /// Boolean value
    Bool(bool),
    /// Numeric value
    Number(Number),
    /// String value
    String(String),
    /// Array of values
    Array(Array),
    /// Object (key-value pairs with order preservation)
    Object(Object),
}

impl Value {
    /// Returns true if this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns true if this value is an object
    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    /// Returns the boolean value if this is a boolean, None otherwise
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the number if this is a number, None otherwise
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the string value if this is a string, None otherwise
    pub fn as_string(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the array if this is an array, None otherwise
    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Returns the object if this is an object, None otherwise
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Name of the value's type, for error messages
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }

    /// Replay this value into a sink
    pub fn write_to<S: Sink>(&self, sink: &mut S) -> Result<()> {
        match self {
            Self::Null => sink.write_null(),
            Self::Bool(b) => sink.write_bool(*b),
            Self::Number(n) => sink.write_number(*n),
            Self::String(s) => sink.write_string(s),
            Self::Array(arr) => {
                sink.begin_array()?;
                for item in arr {
                    item.write_to(sink)?;
                }
                sink.end_array()
            }
            Self::Object(obj) => {
                sink.begin_object()?;
                for (key, value) in obj {
                    sink.property_name(key)?;
                    value.write_to(sink)?;
                }
                sink.end_object()
            }
        }
    }

    /// Serialize to JSON text
    pub fn to_json(&self, formatting: Formatting) -> String {
        let mut writer = Writer::new(formatting);
        // Values never carry comments, the only thing the writer can reject
        match self.write_to(&mut writer) {
            Ok(()) => writer.into_string(),
            Err(_) => String::new(),
        }
    }

    /// Event stream over this value
    pub fn events(&self) -> Events<'_> {
        Events::new(self)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_json(Formatting::Compact))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(Number::Float(value))
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Number(Number::Integer(i64::from(value)))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Number(Number::Integer(value))
    }
}

impl From<Number> for Value {
    fn from(value: Number) -> Self {
        Self::Number(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<Array> for Value {
    fn from(value: Array) -> Self {
        Self::Array(value)
    }
}

impl From<Object> for Value {
    fn from(value: Object) -> Self {
        Self::Object(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Self::Array(Array(values))
    }
}

/// An order-preserving object (map of string keys to values)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Object(pub(crate) IndexMap<String, Value>);

impl Object {
    /// Creates a new empty object
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Returns the number of key-value pairs in the object
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the object contains no key-value pairs
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a reference to the value corresponding to the key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Inserts a key-value pair into the object
    /// Returns the previous value if the key already existed
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Returns true if the object contains the specified key
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Returns an iterator over the keys
    pub fn keys(&self) -> Keys<'_, String, Value> {
        self.0.keys()
    }

    /// Returns an iterator over the values
    pub fn values(&self) -> Values<'_, String, Value> {
        self.0.values()
    }

    /// Returns an iterator over key-value pairs
    pub fn iter(&self) -> Iter<'_, String, Value> {
        self.0.iter()
    }
}

impl Index<&str> for Object {
    type Output = Value;

    #[allow(clippy::indexing_slicing)]
    fn index(&self, key: &str) -> &Self::Output {
        &self.0[key]
    }
}

impl<'a> IntoIterator for &'a Object {
    type Item = (&'a String, &'a Value);
    type IntoIter = Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for Object {
    type Item = (String, Value);
    type IntoIter = IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<(String, Value)> for Object {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(IndexMap::from_iter(iter))
    }
}

/// An array of values
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Array(pub(crate) Vec<Value>);

impl Array {
    /// Creates a new empty array
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Returns the number of elements in the array
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the array contains no elements
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a reference to the element at the given index
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    /// Appends an element to the end of the array
    pub fn push(&mut self, value: impl Into<Value>) {
        self.0.push(value.into());
    }

    /// Returns an iterator over the array
    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.0.iter()
    }
}

impl Index<usize> for Array {
    type Output = Value;

    #[allow(clippy::indexing_slicing)]
    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl<'a> IntoIterator for &'a Array {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<Vec<Value>> for Array {
    fn from(values: Vec<Value>) -> Self {
        Self(values)
    }
}

impl FromIterator<Value> for Array {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self(Vec::from_iter(iter))
    }
}

/// Where [`Events`] is inside a container
enum Frame<'a> {
    Object(Iter<'a, String, Value>),
    Array(std::slice::Iter<'a, Value>),
}

/// Replays a [`Value`] as the event stream a parser would produce for it
pub struct Events<'a> {
    root: Option<&'a Value>,
    stack: Vec<Frame<'a>>,
    /// Value whose key was just emitted
    pending: Option<&'a Value>,
}

impl<'a> Events<'a> {
    pub fn new(value: &'a Value) -> Self {
        Self {
            root: Some(value),
            stack: Vec::new(),
            pending: None,
        }
    }

    fn enter(&mut self, value: &'a Value) -> Event {
        match value {
            Value::Object(obj) => {
                self.stack.push(Frame::Object(obj.iter()));
                Event::ObjectStart
            }
            Value::Array(arr) => {
                self.stack.push(Frame::Array(arr.iter()));
                Event::ArrayStart
            }
            scalar => Event::Value(scalar.clone()),
        }
    }
}

impl EventSource for Events<'_> {
    fn next_event(&mut self) -> Result<Option<Event>> {
        if let Some(value) = self.pending.take() {
            return Ok(Some(self.enter(value)));
        }
        if let Some(root) = self.root.take() {
            return Ok(Some(self.enter(root)));
        }

        let event = match self.stack.last_mut() {
            None => None,
            Some(Frame::Object(entries)) => match entries.next() {
                Some((key, value)) => {
                    self.pending = Some(value);
                    Some(Event::Key(key.clone()))
                }
                None => {
                    self.stack.pop();
                    Some(Event::ObjectEnd)
                }
            },
            Some(Frame::Array(items)) => match items.next() {
                Some(item) => return Ok(Some(self.enter(item))),
                None => {
                    self.stack.pop();
                    Some(Event::ArrayEnd)
                }
            },
        };
        Ok(event)
    }
}

#[cfg(feature = "serde")]
mod serialize {
    use super::{Number, Value};
    use serde::ser::{SerializeMap, SerializeSeq};
    use serde::{Serialize, Serializer};

    impl Serialize for Number {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            match self {
                Self::Integer(n) => serializer.serialize_i64(*n),
                Self::Float(n) => serializer.serialize_f64(*n),
            }
        }
    }

    impl Serialize for Value {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            match self {
                Self::Null => serializer.serialize_unit(),
                Self::Bool(b) => serializer.serialize_bool(*b),
                Self::Number(n) => n.serialize(serializer),
                Self::String(s) => serializer.serialize_str(s),
                Self::Array(arr) => {
                    let mut seq = serializer.serialize_seq(Some(arr.len()))?;
                    for item in arr {
                        seq.serialize_element(item)?;
                    }
                    seq.end()
                }
                Self::Object(obj) => {
                    let mut map = serializer.serialize_map(Some(obj.len()))?;
                    for (key, value) in obj {
                        map.serialize_entry(key, value)?;
                    }
                    map.end()
                }
            }
        }
    }
}
