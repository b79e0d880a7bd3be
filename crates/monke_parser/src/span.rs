use std::fmt::Display;

/// A location somewhere in the source code
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BytePos(usize);

impl BytePos {
    pub fn new(pos: usize) -> Self {
        BytePos(pos)
    }
}

impl Display for BytePos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A subsection of the source code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Starting position (inclusive)
    pub start: BytePos,
    /// Ending position (exclusive)
    pub end: BytePos,
}

impl Span {
    pub fn new(start: BytePos, end: BytePos) -> Span {
        Span { start, end }
    }

    pub fn empty() -> Span {
        Span {
            start: BytePos(0),
            end: BytePos(0),
        }
    }

    /// Convert the given span to the "(at 1:1)" format
    pub fn at_str(&self) -> String {
        format!("(at {})", self)
    }
}

impl Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // TODO: Print line:column instead of byte offsets once the lexer tracks newlines
        write!(f, "{}:{}", self.start, self.end)
    }
}
