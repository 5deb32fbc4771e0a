use std::fmt::{self, Display};

use serde::Serialize;

#[derive(Serialize, Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub struct Position {
    pub byte: usize,
    pub line: usize,
    pub col: usize,
}

impl Default for Position {
    fn default() -> Self {
        Self {
            byte: 0,
            line: 1,
            col: 1,
        }
    }
}

impl Position {
    /// Returns the position immediately following `c` if `c` is located at `self`.
    pub fn advance(self, c: char) -> Self {
        let byte = self.byte + c.len_utf8();

        if c == '\n' {
            Self {
                byte,
                line: self.line + 1,
                col: 1,
            }
        } else {
            Self {
                byte,
                line: self.line,
                col: self.col + 1,
            }
        }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// A half-open span: `start` is the first covered position, `end` is the one right after the last.
#[derive(Serialize, Debug, Clone, Copy, Hash, Eq, PartialEq, Default)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// An empty span located at `pos`.
    pub fn point(pos: Position) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start.byte == self.end.byte
    }

    pub fn convex_hull(&self, other: &Span) -> Span {
        let start = if self.start.byte <= other.start.byte {
            self.start
        } else {
            other.start
        };

        let end = if self.end.byte >= other.end.byte {
            self.end
        } else {
            other.end
        };

        Span { start, end }
    }

    /// Returns the spanned slice of `source`.
    pub fn slice<'a>(&self, source: &'a str) -> Option<&'a str> {
        source.get(self.start.byte..self.end.byte)
    }
}

impl Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

#[derive(Serialize, Debug, Clone, Hash, Eq, PartialEq, Default)]
pub struct Spanned<T> {
    pub value: T,
    pub span: Span,
}

pub trait HasSpan {
    fn span(&self) -> Span;
}

impl HasSpan for Span {
    fn span(&self) -> Span {
        *self
    }
}

impl<T> HasSpan for Spanned<T> {
    fn span(&self) -> Span {
        self.span
    }
}
