use std::borrow::Cow;
use std::mem;

use regex::Regex;

use crate::parse::error::{PResult, ParseError};
use crate::parse::token::Token;
use crate::position::{HasSpan, Position, Span};

/// Diagnostics recorded at the current position of a cursor.
#[derive(Debug, Clone, Default)]
pub struct Pending(Vec<ParseError>);

impl Pending {
    /// Picks the errors that got the furthest into the input.
    pub fn richest(&self) -> Option<ParseError> {
        let furthest = self.0.iter().map(|e| e.span().start.byte).max()?;
        let mut errors: Vec<ParseError> = Vec::new();

        for error in self.0.iter().filter(|e| e.span().start.byte == furthest) {
            if !errors.contains(error) {
                errors.push(error.clone());
            }
        }

        Some(ParseError::alternatives(errors))
    }
}

/// A positional view over a sequence of elements that supports backtracking.
///
/// Speculative parsing works on a [`fork`](Cursor::fork) of the cursor, which is
/// [committed](Cursor::commit) back if the branch succeeds and dropped otherwise.
pub trait Cursor: Clone {
    type Item: Copy;

    fn peek(&self) -> PResult<Self::Item>;

    /// Consumes the next element. Clears the pending diagnostics on success.
    fn next(&mut self) -> PResult<Self::Item>;

    /// The number of input units consumed so far. Strictly increases on each `next`.
    fn offset(&self) -> usize;

    /// The span of the upcoming element, or an empty span at the end of input.
    fn span(&self) -> Span;

    /// The position right after the last consumed element.
    fn prev_end(&self) -> Position;

    fn describe_next(&self) -> String;

    fn pending(&self) -> &Pending;

    fn pending_mut(&mut self) -> &mut Pending;

    fn is_eof(&self) -> bool {
        self.peek().is_err()
    }

    fn record_error(&mut self, error: ParseError) {
        self.pending_mut().0.push(error);
    }

    /// Returns the most specific diagnostic recorded at this position, or an error built from
    /// `fallback` if there is none.
    fn current_error(&self, fallback: impl Into<Cow<'static, str>>) -> ParseError {
        self.pending()
            .richest()
            .unwrap_or_else(|| ParseError::new(self.span(), fallback))
    }

    fn fork(&self) -> Self {
        let mut fork = self.clone();
        fork.pending_mut().0.clear();

        fork
    }

    /// Adopts the position of a fork that has successfully parsed something.
    fn commit(&mut self, mut fork: Self) {
        if fork.offset() == self.offset() {
            let mut pending = mem::take(self.pending_mut());
            pending.0.append(&mut fork.pending_mut().0);
            *fork.pending_mut() = pending;
        }

        *self = fork;
    }
}

#[derive(Debug, Clone)]
pub struct CharCursor<'buf> {
    src: &'buf str,
    pos: Position,
    prev_end: Position,
    pending: Pending,
}

impl<'buf> CharCursor<'buf> {
    pub fn new(src: &'buf str) -> Self {
        Self {
            src,
            pos: Default::default(),
            prev_end: Default::default(),
            pending: Default::default(),
        }
    }

    /// Returns the position of the immediately following character.
    pub fn pos(&self) -> Position {
        self.pos
    }

    pub fn remaining(&self) -> &'buf str {
        &self.src[self.pos.byte..]
    }

    /// Returns the text consumed since `start`.
    pub fn slice_from(&self, start: Position) -> &'buf str {
        &self.src[start.byte..self.pos.byte]
    }

    /// Returns the last consumed character.
    pub fn prev_char(&self) -> Option<char> {
        self.src[..self.pos.byte].chars().next_back()
    }

    /// Matches `re` against the remaining input without consuming anything.
    ///
    /// Only matches starting right at the cursor count.
    pub fn regex_match(&self, re: &Regex) -> Option<&'buf str> {
        re.find(self.remaining())
            .filter(|m| m.start() == 0)
            .map(|m| m.as_str())
    }

    /// Consumes `n` bytes worth of characters.
    pub fn consume_bytes(&mut self, n: usize) -> PResult<&'buf str> {
        let start = self.pos;

        while self.pos.byte < start.byte + n {
            self.next()?;
        }

        Ok(self.slice_from(start))
    }
}

impl<'buf> Cursor for CharCursor<'buf> {
    type Item = char;

    fn peek(&self) -> PResult<char> {
        self.remaining()
            .chars()
            .next()
            .ok_or_else(|| ParseError::end_of_input(self.span()))
    }

    fn next(&mut self) -> PResult<char> {
        let c = self.peek()?;
        self.pos = self.pos.advance(c);
        self.prev_end = self.pos;
        self.pending.0.clear();

        Ok(c)
    }

    fn offset(&self) -> usize {
        self.pos.byte
    }

    fn span(&self) -> Span {
        match self.remaining().chars().next() {
            Some(c) => Span::new(self.pos, self.pos.advance(c)),
            None => Span::point(self.pos),
        }
    }

    fn prev_end(&self) -> Position {
        self.prev_end
    }

    fn describe_next(&self) -> String {
        match self.peek() {
            Ok(c) => format!("{:?}", c),
            Err(_) => "end of input".to_owned(),
        }
    }

    fn pending(&self) -> &Pending {
        &self.pending
    }

    fn pending_mut(&mut self) -> &mut Pending {
        &mut self.pending
    }
}

/// A cursor over the children of a single token tree level.
#[derive(Debug, Clone)]
pub struct TokenCursor<'t, 'buf> {
    tokens: &'t [Token<'buf>],
    idx: usize,
    start: Position,
    end: Position,
    pending: Pending,
}

impl<'t, 'buf> TokenCursor<'t, 'buf> {
    /// Creates a cursor over `tokens`, which are enclosed by `span`.
    pub fn new(tokens: &'t [Token<'buf>], span: Span) -> Self {
        Self {
            tokens,
            idx: 0,
            start: span.start,
            end: span.end,
            pending: Default::default(),
        }
    }
}

impl<'t, 'buf> Cursor for TokenCursor<'t, 'buf> {
    type Item = &'t Token<'buf>;

    fn peek(&self) -> PResult<&'t Token<'buf>> {
        self.tokens
            .get(self.idx)
            .ok_or_else(|| ParseError::end_of_input(self.span()))
    }

    fn next(&mut self) -> PResult<&'t Token<'buf>> {
        let token = self.peek()?;
        self.idx += 1;
        self.pending.0.clear();

        Ok(token)
    }

    fn offset(&self) -> usize {
        self.idx
    }

    fn span(&self) -> Span {
        match self.tokens.get(self.idx) {
            Some(token) => token.span,
            None => Span::point(self.end),
        }
    }

    fn prev_end(&self) -> Position {
        match self.idx.checked_sub(1) {
            Some(idx) => self.tokens[idx].span.end,
            None => self.start,
        }
    }

    fn describe_next(&self) -> String {
        match self.tokens.get(self.idx) {
            Some(token) => token.value.describe(),
            None => "end of input".to_owned(),
        }
    }

    fn pending(&self) -> &Pending {
        &self.pending
    }

    fn pending_mut(&mut self) -> &mut Pending {
        &mut self.pending
    }
}
