pub mod combinator;
pub mod cursor;
pub mod error;
mod lexer;
mod parser;
pub mod precedence;
pub mod syntax;
pub mod token;

use std::borrow::Cow;

use tracing::instrument;

use crate::ast::Ast;

pub use cursor::{CharCursor, Cursor, TokenCursor};
pub use error::{PResult, ParseError, ParseErrorKind};
pub use lexer::{indentation, lex};
pub use parser::parse;
pub use token::{GroupKind, Token, TokenValue};

/// Lexes and parses `source` in one go.
#[instrument(level = "debug", skip_all)]
pub fn parse_str(source: &str) -> PResult<Ast> {
    let tokens = lex(source)?;

    parse(&tokens)
}

/// Replaces `\r\n` line endings with `\n`, which is all the lexer understands.
pub fn normalize_line_endings(source: &str) -> Cow<'_, str> {
    if source.contains("\r\n") {
        Cow::Owned(source.replace("\r\n", "\n"))
    } else {
        Cow::Borrowed(source)
    }
}
