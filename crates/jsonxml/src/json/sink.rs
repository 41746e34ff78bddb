//! Forward-only JSON output

use crate::error::Result;
use crate::value::Number;

/// Receiver of a JSON token stream
///
/// Callers are responsible for well-formedness: every `begin_*` is matched
/// by its `end_*`, and inside an object each value follows a
/// [`property_name`](Sink::property_name).
pub trait Sink {
    fn write_null(&mut self) -> Result<()>;
    fn write_bool(&mut self, value: bool) -> Result<()>;
    fn write_number(&mut self, value: Number) -> Result<()>;
    fn write_string(&mut self, value: &str) -> Result<()>;
    /// Block comment at the current position; not a value
    fn write_comment(&mut self, text: &str) -> Result<()>;
    fn begin_object(&mut self) -> Result<()>;
    fn property_name(&mut self, name: &str) -> Result<()>;
    fn end_object(&mut self) -> Result<()>;
    fn begin_array(&mut self) -> Result<()>;
    fn end_array(&mut self) -> Result<()>;
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn write_null(&mut self) -> Result<()> {
        (**self).write_null()
    }

    fn write_bool(&mut self, value: bool) -> Result<()> {
        (**self).write_bool(value)
    }

    fn write_number(&mut self, value: Number) -> Result<()> {
        (**self).write_number(value)
    }

    fn write_string(&mut self, value: &str) -> Result<()> {
        (**self).write_string(value)
    }

    fn write_comment(&mut self, text: &str) -> Result<()> {
        (**self).write_comment(text)
    }

    fn begin_object(&mut self) -> Result<()> {
        (**self).begin_object()
    }

    fn property_name(&mut self, name: &str) -> Result<()> {
        (**self).property_name(name)
    }

    fn end_object(&mut self) -> Result<()> {
        (**self).end_object()
    }

    fn begin_array(&mut self) -> Result<()> {
        (**self).begin_array()
    }

    fn end_array(&mut self) -> Result<()> {
        (**self).end_array()
    }
}
