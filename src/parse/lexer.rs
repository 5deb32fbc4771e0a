use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, instrument};

use crate::parse::combinator::{
    alternative, delimited, literal, optional, predicate, regex, take_until, zero_or_more,
};
use crate::parse::cursor::{CharCursor, Cursor};
use crate::parse::error::{PResult, ParseError};
use crate::parse::token::{is_ident_continuation, GroupKind, Keyword, Token, TokenValue, KEYWORDS};
use crate::position::Span;

const TAB_WIDTH: usize = 4;
const CLOSERS: &str = ")]}\"";

static IDENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[_\p{Alphabetic}][_\p{Alphabetic}\p{N}]*").unwrap());
static NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?[0-9]+(?:\.[0-9]+)?").unwrap());
static INFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+\-*/\\|\~!@\#$%\^\&=<>]+").unwrap());
static RAW_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r##"^r#*""##).unwrap());
static SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\S\n]+").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s+").unwrap());

/// Counts the columns of an indentation prefix.
pub fn indentation(prefix: &str) -> usize {
    prefix
        .chars()
        .map(|c| if c == '\t' { TAB_WIDTH } else { 1 })
        .sum()
}

fn lex_keyword<'buf>(cursor: &mut CharCursor<'buf>) -> PResult<TokenValue<'buf>> {
    let span = cursor.span();

    // matching the whole word keeps `null` from being found inside `nullable`
    let word = regex(&IDENT)(cursor)?;

    match KEYWORDS.get(word) {
        Some(Keyword::Null) => Ok(TokenValue::Null),
        Some(Keyword::Bool(value)) => Ok(TokenValue::Bool(*value)),
        None => Err(ParseError::new(span, "expected a keyword")),
    }
}

fn lex_delim<'buf>(cursor: &mut CharCursor<'buf>) -> PResult<TokenValue<'buf>> {
    literal(",")(cursor)?;

    Ok(TokenValue::Delim)
}

fn lex_number<'buf>(cursor: &mut CharCursor<'buf>) -> PResult<TokenValue<'buf>> {
    // `a-1` is a subtraction, not `a` followed by `-1`
    if matches!(cursor.peek(), Ok('-'))
        && cursor
            .prev_char()
            .map_or(false, |c| is_ident_continuation(c) || CLOSERS.contains(c))
    {
        return Err(ParseError::new(cursor.span(), "expected a number"));
    }

    let text = regex(&NUMBER)(cursor)?;

    if cursor.peek().map_or(false, is_ident_continuation) {
        return Err(ParseError::new(
            cursor.span(),
            "a number literal cannot be followed by an identifier character",
        ));
    }

    let (int, frac) = match text.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (text, None),
    };

    Ok(TokenValue::Number { int, frac })
}

fn lex_string<'buf>(cursor: &mut CharCursor<'buf>) -> PResult<TokenValue<'buf>> {
    let escaped = |cursor: &mut CharCursor<'buf>| -> PResult<char> {
        literal("\\")(cursor)?;

        cursor.next()
    };
    let plain = predicate::<CharCursor<'buf>, _>("a string character", |c: &char| {
        *c != '"' && *c != '\\'
    });

    let start = cursor.pos();
    let chars = delimited(
        literal("\""),
        literal("\""),
        zero_or_more(alternative((escaped, plain))),
    )(cursor)?;
    let text = cursor.slice_from(start);
    let body = &text[1..text.len() - 1];

    // a backslash keeps the next character verbatim and is dropped itself
    Ok(TokenValue::String(if body.contains('\\') {
        Cow::Owned(chars.into_iter().collect())
    } else {
        Cow::Borrowed(body)
    }))
}

fn lex_raw_ident<'buf>(cursor: &mut CharCursor<'buf>) -> PResult<TokenValue<'buf>> {
    let open = regex(&RAW_OPEN)(cursor)?;
    let close = format!("\"{}", "#".repeat(open.len() - 2));

    let start = cursor.pos();
    take_until(literal(close.clone()))(cursor)?;
    let name = cursor.slice_from(start);
    literal(close)(cursor)?;

    Ok(TokenValue::Ident {
        name: Cow::Borrowed(name),
        raw: true,
    })
}

fn lex_bare_ident<'buf>(cursor: &mut CharCursor<'buf>) -> PResult<TokenValue<'buf>> {
    let name = regex(&IDENT)(cursor)?;

    Ok(TokenValue::Ident {
        name: Cow::Borrowed(name),
        raw: false,
    })
}

fn lex_infix<'buf>(cursor: &mut CharCursor<'buf>) -> PResult<TokenValue<'buf>> {
    Ok(TokenValue::Infix(regex(&INFIX)(cursor)?))
}

fn lex_group<'buf>(cursor: &mut CharCursor<'buf>) -> PResult<TokenValue<'buf>> {
    let (kind, open, close) = match cursor.peek()? {
        '(' => (GroupKind::Parens, "(", ")"),
        '[' => (GroupKind::Brackets, "[", "]"),
        '{' => (GroupKind::Braces, "{", "}"),

        _ => {
            return Err(ParseError::new(
                cursor.span(),
                format!("expected a group, found {}", cursor.describe_next()),
            ))
        }
    };

    let tokens = delimited(literal(open), literal(close), lex_stream)(cursor)?;

    Ok(TokenValue::Group { kind, tokens })
}

fn lex_whitespace<'buf>(cursor: &mut CharCursor<'buf>) -> PResult<TokenValue<'buf>> {
    let text = regex(&WHITESPACE)(cursor)?;

    Ok(if text.contains('\n') {
        TokenValue::Break
    } else {
        TokenValue::Space
    })
}

#[instrument(level = "trace", skip_all, fields(at = %cursor.pos()))]
fn lex_token<'buf>(cursor: &mut CharCursor<'buf>) -> PResult<Token<'buf>> {
    let start = cursor.pos();
    let value = alternative((
        lex_keyword,
        lex_delim,
        lex_number,
        lex_string,
        lex_raw_ident,
        lex_bare_ident,
        lex_infix,
        lex_group,
        lex_whitespace,
    ))(cursor)?;

    Ok(Token {
        span: Span::new(start, cursor.pos()),
        value,
    })
}

/// Checks whether the upcoming line is indented less than `reference`.
///
/// Blank lines are skipped; running out of input also ends the block.
fn block_ends(cursor: &CharCursor<'_>, reference: usize) -> bool {
    let Some(ws) = cursor.regex_match(&WHITESPACE) else {
        return false;
    };

    match ws.rsplit_once('\n') {
        Some((_, tail)) => ws.len() == cursor.remaining().len() || indentation(tail) < reference,
        None => false,
    }
}

/// Lexes an indentation-delimited block following `where` or `switch`.
///
/// The block must be indented deeper than the enclosing one.
#[instrument(level = "trace", skip_all, fields(at = %cursor.pos()))]
fn lex_indent_block<'buf>(cursor: &mut CharCursor<'buf>, enclosing: usize) -> PResult<Token<'buf>> {
    let start = cursor.pos();
    optional(regex(&SPACE))(cursor)?;
    literal("\n")(cursor)?;

    let reference = match cursor.regex_match(&WHITESPACE) {
        Some(ws) if ws.len() < cursor.remaining().len() => {
            cursor.consume_bytes(ws.len())?;

            indentation(ws.rsplit_once('\n').map_or(ws, |(_, tail)| tail))
        }

        // nothing but blank lines until the end of input
        Some(_) => return Err(ParseError::new(cursor.span(), "expected an indented block")),
        None if cursor.is_eof() => return Err(ParseError::end_of_input(cursor.span())),

        None => 0,
    };

    if reference <= enclosing {
        return Err(ParseError::new(cursor.span(), "expected an indented block"));
    }

    let tokens = lex_tokens(cursor, Some(reference))?;

    Ok(Token {
        span: Span::new(start, cursor.pos()),
        value: TokenValue::Group {
            kind: GroupKind::Indent,
            tokens,
        },
    })
}

fn lex_tokens<'buf>(
    cursor: &mut CharCursor<'buf>,
    reference: Option<usize>,
) -> PResult<Vec<Token<'buf>>> {
    let mut tokens = Vec::new();

    loop {
        if matches!(reference, Some(reference) if block_ends(cursor, reference)) {
            break;
        }

        let Some(token) = optional(lex_token)(cursor)? else {
            break;
        };

        let opens_block = token.value.opens_block();
        tokens.push(token);

        if opens_block {
            let enclosing = reference.unwrap_or(0);
            let block = optional(|cursor: &mut CharCursor<'buf>| {
                lex_indent_block(cursor, enclosing)
            })(cursor)?;

            if let Some(block) = block {
                let end = block.span.end;
                tokens.push(block);

                // lets indented blocks be parsed exactly like braced ones
                tokens.push(Token {
                    span: Span::point(end),
                    value: TokenValue::Break,
                });
            }
        }
    }

    Ok(tokens)
}

fn lex_stream<'buf>(cursor: &mut CharCursor<'buf>) -> PResult<Vec<Token<'buf>>> {
    lex_tokens(cursor, None)
}

/// Turns source text into a token tree. The whole input must be consumed.
///
/// Line breaks are expected to be normalized to `\n`.
#[instrument(level = "debug", skip_all)]
pub fn lex(source: &str) -> PResult<Vec<Token<'_>>> {
    let mut cursor = CharCursor::new(source);
    let tokens = lex_stream(&mut cursor)?;

    if !cursor.is_eof() {
        return Err(cursor.current_error(format!("unexpected {}", cursor.describe_next())));
    }

    debug!(tokens = tokens.len(), "lexed the source");

    Ok(tokens)
}
