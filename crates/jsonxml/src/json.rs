//! JSON streaming parser and writer module

pub mod builder;
pub mod event;
pub mod parser;
pub mod sink;
pub mod writer;

pub use builder::ValueBuilder;
pub use event::{Event, EventSource};
pub use parser::{Config, Parser};
pub use sink::Sink;
pub use writer::{Formatting, Writer};
