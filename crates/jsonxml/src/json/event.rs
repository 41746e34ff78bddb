//! JSON pull events

use crate::error::Result;
use crate::value::Value;

/// Events emitted by a JSON event source
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Start of a JSON object
    ObjectStart,
    /// End of a JSON object
    ObjectEnd,
    /// Start of a JSON array
    ArrayStart,
    /// End of a JSON array
    ArrayEnd,
    /// Object key (always followed by a value event, possibly after comments)
    Key(String),
    /// Scalar value (never an array or object)
    Value(Value),
    /// Comment token, only surfaced when the source is configured to
    Comment(String),
}

impl Event {
    /// Short description for error messages
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ObjectStart => "'{'",
            Self::ObjectEnd => "'}'",
            Self::ArrayStart => "'['",
            Self::ArrayEnd => "']'",
            Self::Key(_) => "property name",
            Self::Value(value) => value.type_name(),
            Self::Comment(_) => "comment",
        }
    }
}

/// Forward-only source of JSON events
///
/// `Ok(None)` marks the end of the stream.
pub trait EventSource {
    fn next_event(&mut self) -> Result<Option<Event>>;
}

impl<S: EventSource + ?Sized> EventSource for &mut S {
    fn next_event(&mut self) -> Result<Option<Event>> {
        (**self).next_event()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        assert_eq!(Event::ObjectStart.name(), "'{'");
        assert_eq!(Event::Key("k".to_string()).name(), "property name");
        assert_eq!(Event::Value(Value::Null).name(), "null");
        assert_eq!(Event::Value(Value::from("s")).name(), "string");
        assert_eq!(Event::Comment(String::new()).name(), "comment");
    }

    #[test]
    fn test_event_equality() {
        assert_eq!(
            Event::Key("test".to_string()),
            Event::Key("test".to_string())
        );
        assert_ne!(Event::ObjectStart, Event::ObjectEnd);
        assert_ne!(Event::Value(Value::Null), Event::Value(Value::Bool(true)));
    }
}
