//! JSON streaming parser implementation

use crate::error::{Error, ErrorKind, Result};
use crate::json::builder::ValueBuilder;
use crate::json::event::{Event, EventSource};
use crate::json::sink::Sink;
use crate::lexer::{CommentHandling, JsonLexer, Token, TokenKind};
use crate::value::Value;

/// Configuration for the JSON parser
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Maximum nesting depth (0 means unlimited)
    pub max_depth: u16,
    /// Maximum input size in bytes (0 means unlimited)
    pub max_size: usize,
    /// Treatment of `//` and `/* */` comments
    pub comments: CommentHandling,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_depth: 128,
            max_size: 10 * 1024 * 1024, // 10 MB default
            comments: CommentHandling::Disallow,
        }
    }
}

impl Config {
    /// Create a new config with unlimited depth and size
    pub const fn unlimited() -> Self {
        Self {
            max_depth: 0,
            max_size: 0,
            comments: CommentHandling::Disallow,
        }
    }

    /// Create a new config with specific limits
    pub const fn new(max_depth: u16, max_size: usize) -> Self {
        Self {
            max_depth,
            max_size,
            comments: CommentHandling::Disallow,
        }
    }

    /// Same limits, different comment handling
    pub const fn with_comments(mut self, comments: CommentHandling) -> Self {
        self.comments = comments;
        self
    }
}

/// Context for tracking position within containers
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ContainerContext {
    /// Inside an object, expecting a key or end
    Object,
    /// Inside an array, expecting a value or end
    Array,
}

/// Outcome of feeding one token to the state machine
enum Step {
    Emit(Event),
    /// Token was punctuation, read another
    Continue,
    Finished,
}

/// Streaming JSON parser with depth and size limits
#[derive(Debug)]
pub struct Parser<'a> {
    lexer: JsonLexer<'a>,
    config: Config,
    depth: u16,
    /// Stack of container contexts to track where we are
    context_stack: Vec<ContainerContext>,
    /// Whether we just emitted a key and are expecting a colon
    expecting_colon_after_key: bool,
    /// Whether we're expecting a value after the colon
    expecting_value: bool,
    /// Whether we're in the first element of a container
    is_first_element: bool,
    /// Whether the last punctuation was a comma
    after_comma: bool,
    /// Whether the root value has been completed
    root_done: bool,
}

impl<'a> Parser<'a> {
    /// Create a new parser with default configuration
    pub fn new(input: &'a [u8]) -> Self {
        Self::with_config(input, Config::default())
    }

    /// Create a new parser with custom configuration
    pub fn with_config(input: &'a [u8], config: Config) -> Self {
        Self {
            lexer: JsonLexer::with_comments(input, config.comments),
            config,
            depth: 0,
            context_stack: Vec::new(),
            expecting_colon_after_key: false,
            expecting_value: false,
            is_first_element: true,
            after_comma: false,
            root_done: false,
        }
    }

    /// Get the next event from the parser
    ///
    /// Returns `Ok(None)` once the root value is complete and only
    /// whitespace remains.
    pub fn next_event(&mut self) -> Result<Option<Event>> {
        loop {
            let token = self.lexer.next_token()?;
            self.check_size()?;

            if let TokenKind::Comment(text) = token.kind {
                return Ok(Some(Event::Comment(text)));
            }

            let step = match self.context_stack.last().copied() {
                None => self.handle_root(token)?,
                Some(ContainerContext::Object) => self.handle_in_object(token)?,
                Some(ContainerContext::Array) => self.handle_in_array(token)?,
            };

            match step {
                Step::Emit(event) => return Ok(Some(event)),
                Step::Continue => {}
                Step::Finished => return Ok(None),
            }
        }
    }

    /// Parse the complete input into a Value, ignoring comments
    pub fn parse_value(&mut self) -> Result<Value> {
        let mut builder = ValueBuilder::new();

        while let Some(event) = self.next_event()? {
            match event {
                Event::ObjectStart => builder.begin_object()?,
                Event::ObjectEnd => builder.end_object()?,
                Event::ArrayStart => builder.begin_array()?,
                Event::ArrayEnd => builder.end_array()?,
                Event::Key(key) => builder.property_name(&key)?,
                Event::Value(value) => value.write_to(&mut builder)?,
                Event::Comment(_) => {}
            }
        }

        builder.finish()
    }

    /// Check that nothing but whitespace and comments follows the root value
    pub fn finish(&mut self) -> Result<()> {
        while let Some(event) = self.next_event()? {
            if !matches!(event, Event::Comment(_)) {
                return Err(self.error(ErrorKind::Expected {
                    expected: "end of input".to_string(),
                    found: event.name().to_string(),
                }));
            }
        }
        Ok(())
    }

    fn check_size(&self) -> Result<()> {
        let consumed = self.lexer.position().offset;
        if self.config.max_size > 0 && consumed > self.config.max_size {
            return Err(self.error(ErrorKind::MaxSizeExceeded {
                max: self.config.max_size,
            }));
        }
        Ok(())
    }

    fn handle_root(&mut self, token: Token) -> Result<Step> {
        if self.root_done {
            return match token.kind {
                TokenKind::Eof => Ok(Step::Finished),
                _ => Err(self.expected_error("end of input", &token)),
            };
        }

        match token.kind {
            TokenKind::Eof => Err(Error::new(ErrorKind::UnexpectedEof, token.span)),
            _ => {
                let step = self.parse_value_token(token)?;
                if self.context_stack.is_empty() {
                    self.root_done = true;
                }
                Ok(step)
            }
        }
    }

    fn handle_in_object(&mut self, token: Token) -> Result<Step> {
        // Handle colon after key
        if self.expecting_colon_after_key {
            return match token.kind {
                TokenKind::Colon => {
                    self.expecting_colon_after_key = false;
                    self.expecting_value = true;
                    Ok(Step::Continue)
                }
                _ => Err(self.expected_error("':'", &token)),
            };
        }

        // If we're expecting a value, parse it
        if self.expecting_value {
            self.expecting_value = false;
            return self.parse_value_token(token);
        }

        match token.kind {
            TokenKind::RightBrace if self.after_comma => {
                Err(Error::new(ErrorKind::TrailingComma, token.span))
            }
            TokenKind::RightBrace => {
                self.pop_context();
                Ok(Step::Emit(Event::ObjectEnd))
            }
            TokenKind::String(s) if self.is_first_element || self.after_comma => {
                self.is_first_element = false;
                self.after_comma = false;
                self.expecting_colon_after_key = true;
                Ok(Step::Emit(Event::Key(s)))
            }
            TokenKind::Comma if !self.is_first_element && !self.after_comma => {
                self.after_comma = true;
                Ok(Step::Continue)
            }
            TokenKind::Eof => Err(Error::new(ErrorKind::UnexpectedEof, token.span)),
            _ => {
                if self.is_first_element {
                    Err(self.expected_error("string key or '}'", &token))
                } else if self.after_comma {
                    Err(self.expected_error("string key", &token))
                } else {
                    Err(self.expected_error("',' or '}'", &token))
                }
            }
        }
    }

    fn handle_in_array(&mut self, token: Token) -> Result<Step> {
        match token.kind {
            TokenKind::RightBracket if self.after_comma => {
                Err(Error::new(ErrorKind::TrailingComma, token.span))
            }
            TokenKind::RightBracket => {
                self.pop_context();
                Ok(Step::Emit(Event::ArrayEnd))
            }
            TokenKind::Comma if !self.is_first_element && !self.after_comma => {
                self.after_comma = true;
                Ok(Step::Continue)
            }
            TokenKind::Eof => Err(Error::new(ErrorKind::UnexpectedEof, token.span)),
            _ if self.is_first_element || self.after_comma => {
                self.is_first_element = false;
                self.after_comma = false;
                self.parse_value_token(token)
            }
            _ => Err(self.expected_error("',' or ']'", &token)),
        }
    }

    fn parse_value_token(&mut self, token: Token) -> Result<Step> {
        let event = match token.kind {
            TokenKind::LeftBrace => {
                self.enter(ContainerContext::Object)?;
                Event::ObjectStart
            }
            TokenKind::LeftBracket => {
                self.enter(ContainerContext::Array)?;
                Event::ArrayStart
            }
            TokenKind::Null => Event::Value(Value::Null),
            TokenKind::True => Event::Value(Value::Bool(true)),
            TokenKind::False => Event::Value(Value::Bool(false)),
            TokenKind::String(s) => Event::Value(Value::String(s)),
            TokenKind::Number(n) => Event::Value(Value::Number(n)),
            TokenKind::Eof => return Err(Error::new(ErrorKind::UnexpectedEof, token.span)),
            _ => return Err(self.expected_error("value", &token)),
        };
        Ok(Step::Emit(event))
    }

    fn enter(&mut self, context: ContainerContext) -> Result<()> {
        if self.config.max_depth > 0 && self.depth >= self.config.max_depth {
            return Err(self.error(ErrorKind::MaxDepthExceeded {
                max: self.config.max_depth,
            }));
        }
        self.depth = self.depth.saturating_add(1);
        self.context_stack.push(context);
        self.is_first_element = true;
        self.after_comma = false;
        self.expecting_colon_after_key = false;
        self.expecting_value = false;
        Ok(())
    }

    fn pop_context(&mut self) {
        self.context_stack.pop();
        self.depth = self.depth.saturating_sub(1);
        // The container just closed counts as an element of its parent
        self.is_first_element = false;
        self.after_comma = false;
        self.expecting_colon_after_key = false;
        self.expecting_value = false;
        if self.context_stack.is_empty() {
            self.root_done = true;
        }
    }

    fn error(&self, kind: ErrorKind) -> Error {
        Error::at_pos(kind, self.lexer.position())
    }

    fn expected_error(&self, expected: &str, token: &Token) -> Error {
        Error::new(
            ErrorKind::Expected {
                expected: expected.to_string(),
                found: token.kind.name().to_string(),
            },
            token.span,
        )
    }
}

impl EventSource for Parser<'_> {
    fn next_event(&mut self) -> Result<Option<Event>> {
        Parser::next_event(self)
    }
}
