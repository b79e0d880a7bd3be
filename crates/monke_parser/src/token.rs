use std::fmt;

use crate::span::Span;

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum TokenKind {
    // Operators
    Equal,
    Plus,
    Minus,
    Bang,
    Star,
    Slash,

    EqualEqual,
    BangEqual,
    LessThan,
    GreaterThan,

    // Delimiters
    Comma,
    Semicolon,
    Colon,

    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,

    // Identifiers & Literals
    Identifier,
    Integer,
    String,

    // Keywords
    Fn,
    Let,
    True,
    False,
    If,
    Else,
    Return,

    // Special
    Illegal,
    Eof,
}

impl TokenKind {
    /// Get the TokenKind for the given keyword, if valid.
    pub fn lookup_keyword(s: &str) -> Option<TokenKind> {
        use TokenKind::*;

        match s {
            "fn" => Some(Fn),
            "let" => Some(Let),
            "true" => Some(True),
            "false" => Some(False),
            "if" => Some(If),
            "else" => Some(Else),
            "return" => Some(Return),
            _ => None,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use TokenKind::*;

        let s = match self {
            Equal => "=",
            Plus => "+",
            Minus => "-",
            Bang => "!",
            Star => "*",
            Slash => "/",

            EqualEqual => "==",
            BangEqual => "!=",
            LessThan => "<",
            GreaterThan => ">",

            Comma => ",",
            Semicolon => ";",
            Colon => ":",

            LeftParen => "(",
            RightParen => ")",
            LeftBrace => "{",
            RightBrace => "}",
            LeftBracket => "[",
            RightBracket => "]",

            Identifier => "identifier",
            Integer => "integer",
            String => "string",

            Fn => "fn",
            Let => "let",
            True => "true",
            False => "false",
            If => "if",
            Else => "else",
            Return => "return",

            Illegal => "illegal",
            Eof => "end of input",
        };

        write!(f, "{}", s)
    }
}

/// A single lexeme: its kind, the exact source text and where it was found.
#[derive(Debug, PartialEq, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, literal: impl Into<String>, span: Span) -> Self {
        Token {
            kind,
            literal: literal.into(),
            span,
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Eof => write!(f, "{}", self.kind),
            TokenKind::String => write!(f, "\"{}\"", self.literal),
            _ => write!(f, "{}", self.literal),
        }
    }
}
