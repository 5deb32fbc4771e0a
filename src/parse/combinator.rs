//! Generic parser combinators.
//!
//! Every combinator builds a function `&mut C -> PResult<T>` over any [`Cursor`], so the same
//! primitives drive both the character-level lexer and the token-level parser.
//!
//! Recoverable failures are recorded on the cursor by the backtracking combinators
//! ([`alternative`], [`optional`], [`zero_or_more`]) and only surface when nothing matches.
//! Fatal failures propagate immediately.

use std::borrow::Cow;

use regex::Regex;
use tracing::trace;

use crate::parse::cursor::{CharCursor, Cursor};
use crate::parse::error::{PResult, ParseError};
use crate::position::HasSpan;

/// Runs `parser` on a fork of `cursor`.
///
/// Returns `None` after recording the error if the parser failed recoverably.
fn attempt<C, T, P>(cursor: &mut C, parser: &P) -> Option<PResult<T>>
where
    C: Cursor,
    P: Fn(&mut C) -> PResult<T>,
{
    let mut fork = cursor.fork();

    match parser(&mut fork) {
        Ok(value) => {
            cursor.commit(fork);

            Some(Ok(value))
        }

        Err(e) if e.is_fatal() => Some(Err(e)),

        Err(e) => {
            trace!(error = %e, at = %e.span().start, "backtracking");
            cursor.record_error(e);

            None
        }
    }
}

pub trait Sequence<C, O> {
    fn run(&self, cursor: &mut C) -> PResult<O>;
}

pub trait Choice<C, T> {
    fn choose(&self, cursor: &mut C) -> PResult<T>;
}

macro_rules! impl_combinator_tuples {
    ($( ( $( $p:ident : $t:ident : $idx:tt ),+ ) )+) => {
        $(
            impl<C, $( $p, $t ),+> Sequence<C, ( $( $t, )+ )> for ( $( $p, )+ )
            where
                $( $p: Fn(&mut C) -> PResult<$t>, )+
            {
                fn run(&self, cursor: &mut C) -> PResult<( $( $t, )+ )> {
                    Ok(( $( (self.$idx)(cursor)?, )+ ))
                }
            }

            impl<C: Cursor, T, $( $p ),+> Choice<C, T> for ( $( $p, )+ )
            where
                $( $p: Fn(&mut C) -> PResult<T>, )+
            {
                fn choose(&self, cursor: &mut C) -> PResult<T> {
                    $(
                        if let Some(result) = attempt(cursor, &self.$idx) {
                            return result;
                        }
                    )+

                    Err(cursor.current_error(format!("unexpected {}", cursor.describe_next())))
                }
            }
        )+
    };
}

impl_combinator_tuples! {
    (A: TA: 0)
    (A: TA: 0, B: TB: 1)
    (A: TA: 0, B: TB: 1, D: TD: 2)
    (A: TA: 0, B: TB: 1, D: TD: 2, E: TE: 3)
    (A: TA: 0, B: TB: 1, D: TD: 2, E: TE: 3, F: TF: 4)
    (A: TA: 0, B: TB: 1, D: TD: 2, E: TE: 3, F: TF: 4, G: TG: 5)
    (A: TA: 0, B: TB: 1, D: TD: 2, E: TE: 3, F: TF: 4, G: TG: 5, H: TH: 6)
    (A: TA: 0, B: TB: 1, D: TD: 2, E: TE: 3, F: TF: 4, G: TG: 5, H: TH: 6, I: TI: 7)
    (A: TA: 0, B: TB: 1, D: TD: 2, E: TE: 3, F: TF: 4, G: TG: 5, H: TH: 6, I: TI: 7, J: TJ: 8)
    (A: TA: 0, B: TB: 1, D: TD: 2, E: TE: 3, F: TF: 4, G: TG: 5, H: TH: 6, I: TI: 7, J: TJ: 8, K: TK: 9)
}

/// Runs the parsers in order. Does not roll back on failure.
pub fn sequence<C, O, S>(parsers: S) -> impl Fn(&mut C) -> PResult<O>
where
    S: Sequence<C, O>,
{
    move |cursor| parsers.run(cursor)
}

/// Tries each parser on a fork and commits the first one that succeeds.
pub fn alternative<C, T, S>(parsers: S) -> impl Fn(&mut C) -> PResult<T>
where
    C: Cursor,
    S: Choice<C, T>,
{
    move |cursor| parsers.choose(cursor)
}

/// Matches the parser as many times as possible. Only fails on fatal errors.
pub fn zero_or_more<C, T, P>(parser: P) -> impl Fn(&mut C) -> PResult<Vec<T>>
where
    C: Cursor,
    P: Fn(&mut C) -> PResult<T>,
{
    move |cursor| {
        let mut items = Vec::new();

        loop {
            let mut fork = cursor.fork();

            match parser(&mut fork) {
                // a success without progress would repeat forever
                Ok(_) if fork.offset() == cursor.offset() => break,

                Ok(item) => {
                    cursor.commit(fork);
                    items.push(item);
                }

                Err(e) if e.is_fatal() => return Err(e),

                Err(e) => {
                    cursor.record_error(e);

                    break;
                }
            }
        }

        Ok(items)
    }
}

pub fn optional<C, T, P>(parser: P) -> impl Fn(&mut C) -> PResult<Option<T>>
where
    C: Cursor,
    P: Fn(&mut C) -> PResult<T>,
{
    move |cursor| match attempt(cursor, &parser) {
        Some(Ok(value)) => Ok(Some(value)),
        Some(Err(e)) => Err(e),
        None => Ok(None),
    }
}

/// Consumes exactly the characters of `expected`.
pub fn literal<'buf>(
    expected: impl Into<Cow<'static, str>>,
) -> impl Fn(&mut CharCursor<'buf>) -> PResult<&'buf str> {
    let expected = expected.into();

    move |cursor| {
        let start = cursor.pos();
        let span = cursor.span();

        for c in expected.chars() {
            match cursor.next() {
                Ok(actual) if actual == c => {}

                _ => {
                    return Err(ParseError::new(
                        span,
                        format!("expected `{}`", expected.escape_debug()),
                    ))
                }
            }
        }

        Ok(cursor.slice_from(start))
    }
}

pub fn delimited<C, O, Cl, T, P, Q, R>(open: P, close: Q, inner: R) -> impl Fn(&mut C) -> PResult<T>
where
    C: Cursor,
    P: Fn(&mut C) -> PResult<O>,
    Q: Fn(&mut C) -> PResult<Cl>,
    R: Fn(&mut C) -> PResult<T>,
{
    move |cursor| {
        open(cursor)?;
        let value = inner(cursor)?;
        close(cursor)?;

        Ok(value)
    }
}

/// Consumes the text matched by `re` at the cursor.
pub fn regex<'buf>(re: &'static Regex) -> impl Fn(&mut CharCursor<'buf>) -> PResult<&'buf str> {
    move |cursor| match cursor.regex_match(re) {
        Some(m) if !m.is_empty() => cursor.consume_bytes(m.len()),

        _ => Err(ParseError::new(
            cursor.span(),
            format!("expected /{}/, found {}", re.as_str(), cursor.describe_next()),
        )),
    }
}

/// Consumes a single element satisfying `f`.
pub fn predicate<C, F>(expected: &'static str, f: F) -> impl Fn(&mut C) -> PResult<C::Item>
where
    C: Cursor,
    F: Fn(&C::Item) -> bool,
{
    move |cursor| match cursor.peek() {
        Ok(item) if f(&item) => cursor.next(),

        _ => Err(ParseError::new(
            cursor.span(),
            format!("expected {}, found {}", expected, cursor.describe_next()),
        )),
    }
}

/// Runs `parser` unless `not` would match at the same position.
pub fn negative_lookahead<C, N, T, P, U>(not: N, parser: P) -> impl Fn(&mut C) -> PResult<T>
where
    C: Cursor,
    N: Fn(&mut C) -> PResult<U>,
    P: Fn(&mut C) -> PResult<T>,
{
    move |cursor| {
        let mut fork = cursor.fork();

        match not(&mut fork) {
            Ok(_) => Err(ParseError::new(
                cursor.span(),
                format!("unexpected {}", cursor.describe_next()),
            )),

            Err(e) if e.is_fatal() => Err(e),
            Err(_) => parser(cursor),
        }
    }
}

/// Consumes elements one by one until `stop` matches. The stop sequence is left unconsumed.
///
/// Running out of input is fatal.
pub fn take_until<C, T, P>(stop: P) -> impl Fn(&mut C) -> PResult<Vec<C::Item>>
where
    C: Cursor,
    P: Fn(&mut C) -> PResult<T>,
{
    move |cursor| {
        let mut items = Vec::new();

        loop {
            let mut fork = cursor.fork();

            match stop(&mut fork) {
                Ok(_) => return Ok(items),
                Err(e) if e.is_fatal() => return Err(e),
                Err(_) => items.push(cursor.next().map_err(ParseError::into_fatal)?),
            }
        }
    }
}
