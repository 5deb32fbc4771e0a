mod common;

use std::borrow::Cow;

use insta::assert_snapshot;
use pretty_assertions::assert_eq;

use asct::parse::{indentation, lex, normalize_line_endings, TokenValue};
use asct::position::HasSpan;

use self::common::{dump, lex as render};

#[test]
fn test_simple_definition() {
    assert_snapshot!(render("a = 1"), @"a _ = _ 1");
}

#[test]
fn test_groups() {
    assert_snapshot!(render("f(a, [1,2]) {x}"), @"f Parens[a , _ Brackets[1 , 2]] _ Braces[x]");
}

#[test]
fn test_keywords_need_whole_words() {
    assert_snapshot!(render("nullable = null"), @"nullable _ = _ null");
    assert_snapshot!(render("yesterday = yes"), @"yesterday _ = _ true");
    assert_snapshot!(render("nothing = no"), @"nothing _ = _ false");
}

#[test]
fn test_raw_identifiers() {
    assert_snapshot!(render(r##"r#"a "b" c"# = r"x""##), @r###"raw(a "b" c) _ = _ raw(x)"###);
    assert_snapshot!(render(r###"r##"a"#b"## = 1"###), @r###"raw(a"#b) _ = _ 1"###);
    assert_snapshot!(render(r#"r"" = 1"#), @"raw() _ = _ 1");
}

#[test]
fn test_unterminated_raw_identifier() {
    let e = lex(r##"r#"abc" = 1"##).unwrap_err();

    assert!(e.is_fatal());
}

#[test]
fn test_strings() {
    let tokens = lex(r#""plain" "a\"b" "c\\d""#).unwrap();
    let strings = tokens
        .iter()
        .filter_map(|token| match &token.value {
            TokenValue::String(value) => Some(value.clone()),
            _ => None,
        })
        .collect::<Vec<_>>();

    assert_eq!(
        strings,
        vec![
            Cow::Borrowed("plain"),
            Cow::Owned("a\"b".to_owned()),
            Cow::Owned("c\\d".to_owned()),
        ]
    );
}

#[test]
fn test_unterminated_string() {
    assert!(lex(r#"x = "abc"#).is_err());
}

#[test]
fn test_numbers() {
    assert_snapshot!(render("x = -1.5"), @"x _ = _ -1.5");
    assert_snapshot!(render("f(-2)"), @"f Parens[-2]");
    assert_snapshot!(render("[1, -2]"), @"Brackets[1 , _ -2]");
}

#[test]
fn test_minus_after_operand_is_an_operator() {
    assert_snapshot!(render("a-1"), @"a - 1");
    assert_snapshot!(render("(b)-2"), @"Parens[b] - 2");
    assert_snapshot!(render("a - -1"), @"a _ - _ -1");
}

#[test]
fn test_number_followed_by_identifier() {
    assert!(lex("x = 1abc").is_err());
}

#[test]
fn test_operators_are_maximal() {
    assert_snapshot!(render("a<=b || c @@ d"), @"a <= b _ || _ c _ @@ _ d");
}

#[test]
fn test_indentation() {
    assert_eq!(indentation(""), 0);
    assert_eq!(indentation("  "), 2);
    assert_eq!(indentation("\t "), 5);
}

#[test]
fn test_indented_block() {
    assert_snapshot!(
        render("f = x where\n  y = 1\n  z = 2\ng = 3"),
        @"f _ = _ x _ where Indent[y _ = _ 1 / z _ = _ 2] / / g _ = _ 3"
    );
}

#[test]
fn test_blank_lines_inside_block() {
    assert_snapshot!(
        render("f = x where\n  y = 1\n\n  z = 2\n"),
        @"f _ = _ x _ where Indent[y _ = _ 1 / z _ = _ 2] / /"
    );
}

#[test]
fn test_nested_blocks_end_at_dedent() {
    assert_snapshot!(
        render("f = x where\n  g = y where\n    h = 1\n  k = 2\n"),
        @"f _ = _ x _ where Indent[g _ = _ y _ where Indent[h _ = _ 1] / / k _ = _ 2] / /"
    );
}

#[test]
fn test_block_must_be_indented() {
    // the line after `where` is not part of a block
    assert_snapshot!(render("f = x where\ny = 1"), @"f _ = _ x _ where / y _ = _ 1");
}

#[test]
fn test_braced_block() {
    assert_snapshot!(render("s = switch { otherwise 1 }"), @"s _ = _ switch _ Braces[_ otherwise _ 1 _]");
}

#[test]
fn test_unconsumed_suffix() {
    let e = lex("a = 1 ;").unwrap_err();

    assert_eq!(e.span().start.byte, 6);
}

#[test]
fn test_unclosed_group() {
    assert!(lex("x = f(1").is_err());
}

#[test]
fn test_empty_input() {
    assert_eq!(lex("").unwrap(), vec![]);
}

#[test]
fn test_crlf_line_endings() {
    let source = "f = x -> y where\r\n  y = 1\r\nz = 2\r\n";

    let normalized = normalize_line_endings(source);
    assert_eq!(normalized, "f = x -> y where\n  y = 1\nz = 2\n");
    assert_eq!(dump(&normalized), dump("f = x -> y where\n  y = 1\nz = 2\n"));

    assert!(matches!(normalize_line_endings("a = 1\n"), Cow::Borrowed("a = 1\n")));
}
