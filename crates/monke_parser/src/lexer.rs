use crate::span::{BytePos, Span};
use crate::token::{Token, TokenKind};

/// Turns source text into tokens, one per call to [`Lexer::next_token`].
///
/// The lexer never fails: bytes it does not understand become
/// [`TokenKind::Illegal`] tokens and the parser reports them. Once the input
/// is exhausted every further call yields [`TokenKind::Eof`].
pub struct Lexer<'a> {
    input: &'a str,
    position: usize,
    /// Set once the iterator has handed out the `Eof` token
    exhausted: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Lexer<'a> {
        Lexer {
            input,
            position: 0,
            exhausted: false,
        }
    }

    /// Consume the next byte from the input.
    fn read_byte(&mut self) -> Option<u8> {
        let next = self.peek_byte();
        if next.is_some() {
            self.position += 1;
        }
        next
    }

    /// Get the next byte from the input without consuming it.
    fn peek_byte(&self) -> Option<u8> {
        self.input.as_bytes().get(self.position).copied()
    }

    /// Consume whitespace until a non-whitespace byte is found.
    fn skip_whitespace(&mut self) {
        while let Some(b) = self.peek_byte() {
            if b.is_ascii_whitespace() {
                self.position += 1;
            } else {
                break;
            }
        }
    }

    /// Consume bytes for as long as they satisfy the predicate.
    fn read_while(&mut self, predicate: fn(u8) -> bool) {
        while let Some(b) = self.peek_byte() {
            if predicate(b) {
                self.position += 1;
            } else {
                break;
            }
        }
    }

    /// Pick `double` if the next byte is `second` (consuming it), otherwise `single`.
    fn one_or_two(&mut self, second: u8, double: TokenKind, single: TokenKind) -> TokenKind {
        if self.peek_byte() == Some(second) {
            self.position += 1;
            double
        } else {
            single
        }
    }

    fn span_from(&self, start: usize) -> Span {
        Span::new(BytePos::new(start), BytePos::new(self.position))
    }

    /// Read a string literal. The opening quote has already been consumed.
    fn read_string(&mut self, start: usize) -> Token {
        let mut bytes = Vec::new();

        loop {
            match self.read_byte() {
                Some(b'"') => break,
                Some(b'\\') => match self.read_byte() {
                    Some(b'"') => bytes.push(b'"'),
                    Some(b'\\') => bytes.push(b'\\'),
                    Some(b'n') => bytes.push(b'\n'),
                    Some(b'r') => bytes.push(b'\r'),
                    Some(b't') => bytes.push(b'\t'),
                    // Unknown escapes are kept as written
                    Some(other) => {
                        bytes.push(b'\\');
                        bytes.push(other);
                    }
                    None => return self.unterminated_string(start),
                },
                Some(b) => bytes.push(b),
                None => return self.unterminated_string(start),
            }
        }

        // Only whole UTF-8 sequences and ASCII escapes were copied, so this is lossless
        let value = String::from_utf8_lossy(&bytes).into_owned();
        Token::new(TokenKind::String, value, self.span_from(start))
    }

    fn unterminated_string(&self, start: usize) -> Token {
        Token::new(
            TokenKind::Illegal,
            &self.input[start..self.position],
            self.span_from(start),
        )
    }

    /// Read a new token from the input.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let start = self.position;

        let kind = match self.read_byte() {
            None => return Token::new(TokenKind::Eof, "", self.span_from(start)),
            Some(b) => match b {
                b'=' => self.one_or_two(b'=', TokenKind::EqualEqual, TokenKind::Equal),
                b'!' => self.one_or_two(b'=', TokenKind::BangEqual, TokenKind::Bang),
                b'+' => TokenKind::Plus,
                b'-' => TokenKind::Minus,
                b'*' => TokenKind::Star,
                b'/' => TokenKind::Slash,
                b'<' => TokenKind::LessThan,
                b'>' => TokenKind::GreaterThan,

                b',' => TokenKind::Comma,
                b';' => TokenKind::Semicolon,
                b':' => TokenKind::Colon,

                b'(' => TokenKind::LeftParen,
                b')' => TokenKind::RightParen,
                b'{' => TokenKind::LeftBrace,
                b'}' => TokenKind::RightBrace,
                b'[' => TokenKind::LeftBracket,
                b']' => TokenKind::RightBracket,

                b'"' => return self.read_string(start),

                b if is_digit(b) => {
                    self.read_while(is_digit);
                    TokenKind::Integer
                }
                b if is_identifier_start(b) => {
                    self.read_while(is_identifier_byte);
                    TokenKind::lookup_keyword(&self.input[start..self.position])
                        .unwrap_or(TokenKind::Identifier)
                }

                b if b.is_ascii() => TokenKind::Illegal,
                // Swallow the rest of a multi-byte character so the literal stays valid UTF-8
                _ => {
                    let width = self.input[start..].chars().next().map_or(1, char::len_utf8);
                    self.position = start + width;
                    TokenKind::Illegal
                }
            },
        };

        Token::new(kind, &self.input[start..self.position], self.span_from(start))
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    /// Yields every token up to and including the first `Eof`.
    fn next(&mut self) -> Option<Token> {
        if self.exhausted {
            return None;
        }

        let token = self.next_token();
        if token.is(TokenKind::Eof) {
            self.exhausted = true;
        }
        Some(token)
    }
}

/// Whether or not the given byte is a digit
fn is_digit(b: u8) -> bool {
    b.is_ascii_digit()
}

/// Whether or not the given byte can start an identifier
fn is_identifier_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

/// Whether or not the given byte is valid inside an identifier
fn is_identifier_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}
