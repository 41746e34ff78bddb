//! Token types for the JSON lexer

use crate::error::Span;
use crate::value::Number;

/// JSON token types
#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    // Structural
    LeftBrace,    // {
    RightBrace,   // }
    LeftBracket,  // [
    RightBracket, // ]
    Colon,        // :
    Comma,        // ,

    // Literals
    Null,
    True,
    False,

    // Values
    String(String),
    Number(Number),

    /// Comment body without its delimiters, only produced in
    /// [`CommentHandling::Surface`] mode
    Comment(String),

    // Special
    Eof,
}

impl TokenKind {
    /// Get token name for error messages
    pub const fn name(&self) -> &'static str {
        match self {
            Self::LeftBrace => "'{'",
            Self::RightBrace => "'}'",
            Self::LeftBracket => "'['",
            Self::RightBracket => "']'",
            Self::Colon => "':'",
            Self::Comma => "','",
            Self::Null => "null",
            Self::True => "true",
            Self::False => "false",
            Self::String(_) => "string",
            Self::Number(_) => "number",
            Self::Comment(_) => "comment",
            Self::Eof => "EOF",
        }
    }

    /// Check if token is a value (can appear in value position)
    pub const fn is_value(&self) -> bool {
        matches!(
            self,
            Self::Null
                | Self::True
                | Self::False
                | Self::String(_)
                | Self::Number(_)
                | Self::LeftBrace
                | Self::LeftBracket
        )
    }
}

/// How the lexer treats `//` and `/* */` comments
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CommentHandling {
    /// Comments are a syntax error (strict JSON)
    #[default]
    Disallow,
    /// Comments are consumed like whitespace
    Skip,
    /// Comments are returned as [`TokenKind::Comment`] tokens
    Surface,
}

/// Token with source location
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub const fn eof(span: Span) -> Self {
        Self {
            kind: TokenKind::Eof,
            span,
        }
    }
}
