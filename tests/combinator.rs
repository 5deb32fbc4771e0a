use pretty_assertions::assert_eq;

use asct::parse::combinator::{
    alternative, delimited, literal, negative_lookahead, optional, predicate, sequence,
    take_until, zero_or_more,
};
use asct::parse::{CharCursor, Cursor, ParseErrorKind};
use asct::position::HasSpan;

fn digit<'buf>(cursor: &mut CharCursor<'buf>) -> asct::parse::PResult<char> {
    predicate::<CharCursor<'buf>, _>("a digit", |c: &char| c.is_ascii_digit())(cursor)
}

#[test]
fn test_sequence() {
    let mut cursor = CharCursor::new("ab!");
    let result = sequence((literal("a"), literal("b")))(&mut cursor).unwrap();

    assert_eq!(result, ("a", "b"));
    assert_eq!(cursor.remaining(), "!");
}

#[test]
fn test_alternative_backtracks() {
    let mut cursor = CharCursor::new("abd");
    let parser = alternative((literal("abc"), literal("ab")));

    assert_eq!(parser(&mut cursor).unwrap(), "ab");
    assert_eq!(cursor.remaining(), "d");
}

#[test]
fn test_alternative_reports_every_failure() {
    let mut cursor = CharCursor::new("z");
    let e = alternative((literal("x"), literal("y")))(&mut cursor).unwrap_err();

    assert!(matches!(e.kind(), ParseErrorKind::Alternatives(errors) if errors.len() == 2));
    assert_eq!(e.to_string(), "expected `x` or expected `y`");
    assert_eq!(e.span().start.byte, 0);
    assert_eq!(cursor.remaining(), "z");
}

#[test]
fn test_furthest_error_wins() {
    let mut cursor = CharCursor::new("abz");
    let e = alternative((
        sequence((literal("a"), literal("b"), literal("c"))),
        sequence((literal("x"), literal("y"), literal("z"))),
    ))(&mut cursor)
    .unwrap_err();

    assert_eq!(e.to_string(), "expected `c`");
    assert_eq!(e.span().start.byte, 2);
}

#[test]
fn test_zero_or_more() {
    let mut cursor = CharCursor::new("123a");

    assert_eq!(zero_or_more(digit)(&mut cursor).unwrap(), vec!['1', '2', '3']);
    assert_eq!(zero_or_more(digit)(&mut cursor).unwrap(), vec![]);
    assert_eq!(cursor.remaining(), "a");
}

#[test]
fn test_optional() {
    let mut cursor = CharCursor::new("ab");

    assert_eq!(optional(literal("b"))(&mut cursor).unwrap(), None);
    assert_eq!(optional(literal("a"))(&mut cursor).unwrap(), Some("a"));
    assert_eq!(cursor.remaining(), "b");
}

#[test]
fn test_optional_does_not_hide_fatal_errors() {
    let mut cursor = CharCursor::new("<abc");
    let parser = optional(delimited(literal("<"), literal(">"), take_until(literal(">"))));

    let e = parser(&mut cursor).unwrap_err();
    assert!(e.is_fatal());
}

#[test]
fn test_take_until() {
    let mut cursor = CharCursor::new("ab\"#c\"#");
    let taken = take_until(literal("\"#"))(&mut cursor).unwrap();

    assert_eq!(taken, vec!['a', 'b']);
    assert_eq!(cursor.remaining(), "\"#c\"#");
}

#[test]
fn test_negative_lookahead() {
    let parser = negative_lookahead(literal("no"), literal("n"));

    assert!(parser(&mut CharCursor::new("no")).is_err());
    assert_eq!(parser(&mut CharCursor::new("nay")).unwrap(), "n");
}

#[test]
fn test_positions() {
    let mut cursor = CharCursor::new("a\nbc");
    literal("a\nb")(&mut cursor).unwrap();

    let pos = cursor.pos();
    assert_eq!((pos.byte, pos.line, pos.col), (3, 2, 2));
    assert_eq!(cursor.prev_char(), Some('b'));
}

#[test]
fn test_fork_and_commit() {
    let mut cursor = CharCursor::new("abc");
    let mut fork = cursor.fork();
    literal("ab")(&mut fork).unwrap();

    assert_eq!(cursor.remaining(), "abc");
    cursor.commit(fork);
    assert_eq!(cursor.remaining(), "c");
}
