use std::borrow::Cow;
use std::error::Error;
use std::fmt::{self, Display};

use itertools::Itertools;
use serde::Serialize;

use crate::position::{HasSpan, Span};

pub type PResult<T> = Result<T, ParseError>;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    Message(Cow<'static, str>),
    EndOfInput,

    /// Every branch of a choice failed at the same depth.
    Alternatives(Vec<ParseError>),

    LonelyOperator(String),
    IncompleteReduction(usize),
}

impl Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Message(msg) => write!(f, "{}", msg),
            Self::EndOfInput => write!(f, "unexpected end of input"),

            Self::Alternatives(errors) => write!(
                f,
                "{}",
                errors.iter().map(|e| e.kind.to_string()).unique().join(" or ")
            ),

            Self::LonelyOperator(op) => {
                write!(f, "internal error: the operator `{}` is missing an operand", op)
            }

            Self::IncompleteReduction(remaining) => write!(
                f,
                "internal error: {} nodes remained after operator precedence reduction",
                remaining
            ),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ParseError {
    span: Span,
    kind: ParseErrorKind,

    /// Fatal errors are never backtracked over.
    fatal: bool,
}

impl ParseError {
    pub fn new(span: Span, message: impl Into<Cow<'static, str>>) -> Self {
        Self::with_kind(span, ParseErrorKind::Message(message.into()))
    }

    pub fn with_kind(span: Span, kind: ParseErrorKind) -> Self {
        Self {
            span,
            kind,
            fatal: false,
        }
    }

    pub fn end_of_input(span: Span) -> Self {
        Self::with_kind(span, ParseErrorKind::EndOfInput)
    }

    /// Groups errors reported at the same location.
    ///
    /// Panics if `errors` is empty.
    pub fn alternatives(mut errors: Vec<ParseError>) -> Self {
        assert!(!errors.is_empty(), "no alternatives provided");

        if errors.len() == 1 {
            return errors.remove(0);
        }

        let span = errors[0].span;
        let fatal = errors.iter().any(ParseError::is_fatal);

        Self {
            span,
            kind: ParseErrorKind::Alternatives(errors),
            fatal,
        }
    }

    pub fn into_fatal(self) -> Self {
        Self {
            fatal: true,
            ..self
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.fatal
    }

    pub fn kind(&self) -> &ParseErrorKind {
        &self.kind
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl Error for ParseError {}

impl HasSpan for ParseError {
    fn span(&self) -> Span {
        self.span
    }
}
