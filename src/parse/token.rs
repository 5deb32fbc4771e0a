use std::borrow::Cow;

use phf::{phf_map, phf_set};
use serde::Serialize;

use crate::position::{HasSpan, Span};

pub const INFIX_CHARS: &str = "+-*/\\|~!@#$%^&=<>";

/// Words that can only be written as raw identifiers.
pub static RESERVED_WORDS: phf::Set<&'static str> = phf_set! {
    "null",
    "yes",
    "no",
    "true",
    "false",
    "switch",
    "where",
    "otherwise",
    "=",
    "->",
    "=>",
};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Keyword {
    Null,
    Bool(bool),
}

pub static KEYWORDS: phf::Map<&'static str, Keyword> = phf_map! {
    "null" => Keyword::Null,
    "yes" => Keyword::Bool(true),
    "true" => Keyword::Bool(true),
    "no" => Keyword::Bool(false),
    "false" => Keyword::Bool(false),
};

pub fn is_infix_char(c: char) -> bool {
    INFIX_CHARS.contains(c)
}

pub fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

pub fn is_ident_continuation(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

/// Checks whether `s` can be written as a bare identifier (ignoring reserved words).
pub fn is_bare_ident(s: &str) -> bool {
    let mut chars = s.chars();

    match chars.next() {
        Some(c) if is_ident_start(c) => chars.all(is_ident_continuation),
        _ => false,
    }
}

/// Checks whether `s` is an operator usable in an infix chain.
pub fn is_infix_operator(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_infix_char) && !matches!(s, "=" | "->" | "=>")
}

#[derive(Serialize, Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum GroupKind {
    Brackets,
    Braces,
    Parens,
    Indent,
}

impl GroupKind {
    pub fn delimiters(self) -> Option<(&'static str, &'static str)> {
        match self {
            Self::Brackets => Some(("[", "]")),
            Self::Braces => Some(("{", "}")),
            Self::Parens => Some(("(", ")")),
            Self::Indent => None,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Token<'buf> {
    pub span: Span,
    pub value: TokenValue<'buf>,
}

impl HasSpan for Token<'_> {
    fn span(&self) -> Span {
        self.span
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub enum TokenValue<'buf> {
    Ident {
        name: Cow<'buf, str>,
        raw: bool,
    },
    Infix(&'buf str),
    Number {
        int: &'buf str,
        frac: Option<&'buf str>,
    },
    Bool(bool),
    Null,
    String(Cow<'buf, str>),
    Delim,
    Space,
    Break,
    Group {
        kind: GroupKind,
        tokens: Vec<Token<'buf>>,
    },
}

impl<'buf> TokenValue<'buf> {
    pub fn is_space(&self) -> bool {
        matches!(self, Self::Space)
    }

    pub fn is_break(&self) -> bool {
        matches!(self, Self::Break)
    }

    pub fn is_whitespace(&self) -> bool {
        matches!(self, Self::Space | Self::Break)
    }

    pub fn is_delim(&self) -> bool {
        matches!(self, Self::Delim)
    }

    pub fn is_infix(&self, symbol: &str) -> bool {
        matches!(self, Self::Infix(s) if *s == symbol)
    }

    /// Checks for a non-raw identifier spelled `word`.
    pub fn is_word(&self, word: &str) -> bool {
        matches!(self, Self::Ident { name, raw: false } if name == word)
    }

    /// Whether an indentation block may follow this token.
    pub fn opens_block(&self) -> bool {
        self.is_word("where") || self.is_word("switch")
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Ident { name, raw: false } => format!("identifier `{}`", name),
            Self::Ident { name, raw: true } => format!("raw identifier `{}`", name),
            Self::Infix(op) => format!("operator `{}`", op),
            Self::Number { int, frac: None } => format!("number `{}`", int),
            Self::Number {
                int,
                frac: Some(frac),
            } => format!("number `{}.{}`", int, frac),
            Self::Bool(value) => format!("boolean `{}`", value),
            Self::Null => "`null`".to_owned(),
            Self::String(_) => "string".to_owned(),
            Self::Delim => "`,`".to_owned(),
            Self::Space => "whitespace".to_owned(),
            Self::Break => "line break".to_owned(),

            Self::Group { kind, .. } => match kind.delimiters() {
                Some((open, close)) => format!("`{}...{}` group", open, close),
                None => "indented block".to_owned(),
            },
        }
    }
}
