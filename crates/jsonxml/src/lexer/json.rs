//! JSON-specific lexer

use tracing::debug;

use crate::error::{Error, ErrorKind, Pos, Result, Span};
use crate::lexer::cursor::Cursor;
use crate::lexer::token::{CommentHandling, Token, TokenKind};
use crate::value::Number;

/// JSON lexer that tokenizes JSON input
#[derive(Clone, Debug)]
pub struct JsonLexer<'a> {
    cursor: Cursor<'a>,
    comments: CommentHandling,
}

impl<'a> JsonLexer<'a> {
    /// Create a new strict JSON lexer from input bytes
    pub const fn new(input: &'a [u8]) -> Self {
        Self::with_comments(input, CommentHandling::Disallow)
    }

    /// Create a new JSON lexer with the given comment handling
    pub const fn with_comments(input: &'a [u8], comments: CommentHandling) -> Self {
        Self {
            cursor: Cursor::new(input),
            comments,
        }
    }

    /// Current position of the underlying cursor
    pub const fn position(&self) -> Pos {
        self.cursor.position()
    }

    /// Get the next token from the input
    pub fn next_token(&mut self) -> Result<Token> {
        loop {
            self.cursor.skip_whitespace();
            let start = self.cursor.position();

            let kind = match self.cursor.current() {
                None => TokenKind::Eof,
                Some(b'{') => self.single(TokenKind::LeftBrace),
                Some(b'}') => self.single(TokenKind::RightBrace),
                Some(b'[') => self.single(TokenKind::LeftBracket),
                Some(b']') => self.single(TokenKind::RightBracket),
                Some(b':') => self.single(TokenKind::Colon),
                Some(b',') => self.single(TokenKind::Comma),
                Some(b'"') => self.lex_string()?,
                Some(b'n') => self.lex_keyword(b"null", TokenKind::Null)?,
                Some(b't') => self.lex_keyword(b"true", TokenKind::True)?,
                Some(b'f') => self.lex_keyword(b"false", TokenKind::False)?,
                Some(b'-' | b'0'..=b'9') => self.lex_number()?,
                Some(b'/') if self.comments != CommentHandling::Disallow => {
                    let body = self.lex_comment()?;
                    if self.comments == CommentHandling::Skip {
                        continue;
                    }
                    TokenKind::Comment(body)
                }
                Some(_) => return Err(Error::at_pos(ErrorKind::InvalidToken, start)),
            };

            let end = self.cursor.position();
            return Ok(Token::new(kind, Span::new(start, end)));
        }
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.cursor.advance();
        kind
    }

    fn lex_keyword(&mut self, word: &[u8], kind: TokenKind) -> Result<TokenKind> {
        if self.cursor.consume_bytes(word) {
            Ok(kind)
        } else {
            Err(Error::at_pos(ErrorKind::InvalidToken, self.cursor.position()))
        }
    }

    /// Lex a string literal
    fn lex_string(&mut self) -> Result<TokenKind> {
        // Consume opening quote
        self.cursor.advance();

        let mut result = String::new();

        loop {
            match self.cursor.current() {
                None => {
                    return Err(Error::at_pos(
                        ErrorKind::UnterminatedString,
                        self.cursor.position(),
                    ));
                }
                Some(b'"') => {
                    self.cursor.advance();
                    break;
                }
                Some(b'\\') => {
                    self.cursor.advance();
                    let escaped = self.lex_escape()?;
                    result.push(escaped);
                }
                Some(b) if b < 0x20 => {
                    // JSON strings cannot contain raw control characters
                    return Err(Error::at_pos(ErrorKind::InvalidToken, self.cursor.position()));
                }
                Some(_) => {
                    let start = self.cursor.pos();
                    while let Some(b) = self.cursor.current() {
                        if b == b'"' || b == b'\\' || b < 0x20 {
                            break;
                        }
                        self.cursor.advance();
                    }
                    let run = std::str::from_utf8(self.cursor.slice_from(start)).map_err(|_| {
                        Error::with_message(
                            ErrorKind::InvalidToken,
                            Span::at(self.cursor.position()),
                            "invalid utf-8 in string",
                        )
                    })?;
                    result.push_str(run);
                }
            }
        }

        Ok(TokenKind::String(result))
    }

    /// Lex the character after a backslash
    fn lex_escape(&mut self) -> Result<char> {
        let pos = self.cursor.position();
        let escaped = match self.cursor.current() {
            Some(b'"') => '"',
            Some(b'\\') => '\\',
            Some(b'/') => '/',
            Some(b'b') => '\x08',
            Some(b'f') => '\x0C',
            Some(b'n') => '\n',
            Some(b'r') => '\r',
            Some(b't') => '\t',
            Some(b'u') => {
                self.cursor.advance();
                return self.lex_unicode_escape();
            }
            _ => return Err(Error::at_pos(ErrorKind::InvalidEscapeSequence, pos)),
        };
        self.cursor.advance();
        Ok(escaped)
    }

    /// Lex a unicode escape sequence (\uXXXX), pairing surrogates
    fn lex_unicode_escape(&mut self) -> Result<char> {
        let start_pos = self.cursor.position();
        let high = self.lex_hex4()?;

        let code = if (0xD800..0xDC00).contains(&high) {
            if !self.cursor.consume_bytes(b"\\u") {
                return Err(Error::at_pos(ErrorKind::InvalidUnicodeEscape, start_pos));
            }
            let low = self.lex_hex4()?;
            if !(0xDC00..0xE000).contains(&low) {
                return Err(Error::at_pos(ErrorKind::InvalidUnicodeEscape, start_pos));
            }
            0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
        } else {
            high
        };

        char::from_u32(code).ok_or_else(|| Error::at_pos(ErrorKind::InvalidUnicodeEscape, start_pos))
    }

    fn lex_hex4(&mut self) -> Result<u32> {
        let mut code: u32 = 0;
        for _ in 0..4 {
            let digit = self
                .cursor
                .current()
                .and_then(|b| char::from(b).to_digit(16))
                .ok_or_else(|| {
                    Error::at_pos(ErrorKind::InvalidUnicodeEscape, self.cursor.position())
                })?;
            code = code * 16 + digit;
            self.cursor.advance();
        }
        Ok(code)
    }

    /// Lex a `//` or `/* */` comment, returning its body
    fn lex_comment(&mut self) -> Result<String> {
        let start_pos = self.cursor.position();
        match self.cursor.peek(1) {
            Some(b'/') => {
                self.cursor.advance_by(2);
                let start = self.cursor.pos();
                while let Some(b) = self.cursor.current() {
                    if b == b'\n' {
                        break;
                    }
                    self.cursor.advance();
                }
                let body = self.comment_text(start)?;
                self.cursor.consume(b'\n');
                Ok(body.trim_end_matches('\r').to_string())
            }
            Some(b'*') => {
                self.cursor.advance_by(2);
                let start = self.cursor.pos();
                while !self.cursor.is_eof() {
                    if self.cursor.starts_with(b"*/") {
                        let body = self.comment_text(start)?;
                        self.cursor.advance_by(2);
                        return Ok(body);
                    }
                    self.cursor.advance();
                }
                Err(Error::at_pos(ErrorKind::UnterminatedComment, start_pos))
            }
            _ => Err(Error::at_pos(ErrorKind::InvalidToken, start_pos)),
        }
    }

    fn comment_text(&self, start: usize) -> Result<String> {
        std::str::from_utf8(self.cursor.slice_from(start))
            .map(str::to_string)
            .map_err(|_| {
                Error::with_message(
                    ErrorKind::InvalidToken,
                    Span::at(self.cursor.position()),
                    "invalid utf-8 in comment",
                )
            })
    }

    /// Lex a number literal
    fn lex_number(&mut self) -> Result<TokenKind> {
        let start = self.cursor.pos();
        let mut integral = true;

        // Optional minus sign
        self.cursor.consume(b'-');

        // Integer part
        match self.cursor.current() {
            Some(b'0') => self.cursor.advance(),
            Some(b'1'..=b'9') => self.skip_digits(),
            _ => return Err(self.invalid_number()),
        }

        // Optional fraction part
        if self.cursor.consume(b'.') {
            integral = false;
            if !matches!(self.cursor.current(), Some(b'0'..=b'9')) {
                return Err(self.invalid_number());
            }
            self.skip_digits();
        }

        // Optional exponent part
        if matches!(self.cursor.current(), Some(b'e' | b'E')) {
            integral = false;
            self.cursor.advance();
            if matches!(self.cursor.current(), Some(b'+' | b'-')) {
                self.cursor.advance();
            }
            if !matches!(self.cursor.current(), Some(b'0'..=b'9')) {
                return Err(self.invalid_number());
            }
            self.skip_digits();
        }

        let literal =
            std::str::from_utf8(self.cursor.slice_from(start)).map_err(|_| self.invalid_number())?;

        if integral {
            if let Ok(n) = literal.parse::<i64>() {
                return Ok(TokenKind::Number(Number::Integer(n)));
            }
            debug!(literal, "integer literal overflows i64, falling back to float");
        }

        match literal.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(TokenKind::Number(Number::Float(n))),
            _ => Err(self.invalid_number()),
        }
    }

    fn skip_digits(&mut self) {
        while let Some(b'0'..=b'9') = self.cursor.current() {
            self.cursor.advance();
        }
    }

    fn invalid_number(&self) -> Error {
        Error::at_pos(ErrorKind::InvalidNumber, self.cursor.position())
    }
}

impl Iterator for JsonLexer<'_> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_token() {
            Ok(token) if token.kind == TokenKind::Eof => None,
            other => Some(other),
        }
    }
}
