mod common;

use insta::assert_snapshot;
use paste::paste;
use pretty_assertions::{assert_eq, assert_str_eq};

use asct::ast::{Ast, Expr, Match, MatrixValue};
use asct::write::{write, write_defs, write_expr, write_ident, write_number, write_string};

use self::common::{dump, format, parse};

fn check_fixture(source: &str, expected: &str, same_tree: bool) {
    let actual = format(source);
    assert_str_eq!(actual, expected);

    // the output is a fixed point of formatting
    assert_str_eq!(format(&actual), actual);

    if same_tree {
        assert_eq!(dump(source), dump(&actual));
    }
}

macro_rules! run_writer_test {
    ($filename:expr, $same_tree:expr) => ({
        let source = include_str!(concat!("writer/", $filename, ".asct"));
        let expected = include_str!(concat!("writer/", $filename, ".expected"));

        check_fixture(source, expected, $same_tree);
    });

    { $( $filename:ident => $same_tree:expr ),+ $(,)? } => {
        $(
            paste! {
                #[test]
                fn [< test_ $filename >]() {
                    run_writer_test!(concat!(stringify!($filename)), $same_tree);
                }
            }
        )+
    };
}

run_writer_test! {
    precedence => true,
    layout => true,
    closures => true,
    literals => true,
    nested => true,
    // cases after a wildcard are dropped
    switch => false,
}

/// Formats `source`, dropping the final line break.
fn formatted(source: &str) -> String {
    format(source).trim_end().to_owned()
}

#[test]
fn test_write_ident() {
    assert_eq!(write_ident("abc_1"), "abc_1");
    assert_eq!(write_ident("ünïcode"), "ünïcode");
    assert_eq!(write_ident("a b"), r##"r#"a b"#"##);
    assert_eq!(write_ident("1st"), r##"r#"1st"#"##);
    assert_eq!(write_ident(""), r##"r#""#"##);
    assert_eq!(write_ident("switch"), r##"r#"switch"#"##);
    assert_eq!(write_ident("null"), r##"r#"null"#"##);
    assert_eq!(write_ident(r##"a"#b"##), r###"r##"a"#b"##"###);
    assert_eq!(write_ident(r###"a"#b"##c"###), r####"r###"a"#b"##c"###"####);
    assert_eq!(write_ident("+"), r##"r#"+"#"##);
}

#[test]
fn test_write_ident_reads_back() {
    for name in ["a b", "otherwise", r#"say "hi""#, r##"x"#"##, "->"] {
        let mut ast = Ast::new();
        let value = ast.add_expr(Expr::Number(1.0)).unwrap();
        ast.add_def(ast.root(), name, Some(value)).unwrap();

        let reparsed = parse(&write(&ast));
        assert_eq!(reparsed.dump(), ast.dump(), "{}", name);
    }
}

#[test]
fn test_write_literals() {
    assert_eq!(write_string(r"a\b"), r#""a\\b""#);
    assert_eq!(write_number(3.0), "3");
    assert_eq!(write_number(-0.25), "-0.25");
    assert_eq!(write_number(1e21), "1000000000000000000000");
}

#[test]
fn test_parenthesization() {
    assert_snapshot!(formatted("x = (a + b) * (c - d)"), @"x = (a + b) * (c - d)");
    assert_snapshot!(formatted("x = a * b + c * d"), @"x = a * b + c * d");
    assert_snapshot!(formatted("x = (a && b) || c"), @"x = a && b || c");
    assert_snapshot!(formatted("x = a + (b @@ c)"), @"x = a + (b @@ c)");
    assert_snapshot!(formatted("x = (a @@ b) @@ c"), @"x = a @@ b @@ c");
    assert_snapshot!(formatted("x = a @@ (b @@ c)"), @"x = a @@ (b @@ c)");
}

#[test]
fn test_unary_minus() {
    assert_snapshot!(formatted("x = -y"), @"x = -y");
    assert_snapshot!(formatted("x = -(y + 1)"), @"x = -(y + 1)");
    assert_snapshot!(formatted("x = -f(y) * 2"), @"x = -f(y) * 2");
    assert_snapshot!(formatted("x = -(2)"), @"x = -(2)");
    assert_snapshot!(formatted("x = -2"), @"x = -2");
    assert_snapshot!(formatted("x = -(-y)"), @"x = -(-y)");
}

#[test]
fn test_closure_arguments() {
    assert_snapshot!(formatted("x = map(xs, x -> x * 2)"), @"x = map(xs, x -> x * 2)");
    assert_snapshot!(formatted("x = (x -> x) + 1"), @"x = (x -> x) + 1");
}

#[test]
fn test_closure_with_where_in_argument() {
    let output = formatted("x = f(a -> b where b = a)");

    assert_snapshot!(output, @r###"
    x = f((a -> b where
      b = a))
    "###);
    assert_eq!(dump(&output), dump("x = f(a -> b where b = a)"));
}

#[test]
fn test_switch_truncation() {
    let mut ast = Ast::new();
    let cond = ast.add_expr(Expr::Ref("a".to_owned())).unwrap();
    let one = ast.add_expr(Expr::Number(1.0)).unwrap();
    let two = ast.add_expr(Expr::Number(2.0)).unwrap();
    let three = ast.add_expr(Expr::Number(3.0)).unwrap();
    let switch = ast
        .add_expr(Expr::Switch(vec![
            Match {
                cond: Some(cond),
                value: one,
            },
            Match {
                cond: None,
                value: two,
            },
            Match {
                cond: None,
                value: three,
            },
        ]))
        .unwrap();

    assert_snapshot!(write_expr(&ast, switch), @r###"
    switch
      a => 1
      otherwise 2
    "###);
}

#[test]
fn test_empty_switch() {
    let mut ast = Ast::new();
    let switch = ast.add_expr(Expr::Switch(vec![])).unwrap();

    assert_eq!(write_expr(&ast, switch), "switch {}");
    assert_eq!(format("x = switch {}"), "x = switch {}\n");
}

#[test]
fn test_matrix() {
    let mut ast = Ast::new();
    let matrix = ast
        .add_expr(Expr::Matrix(MatrixValue::Array(vec![
            MatrixValue::Array(vec![MatrixValue::Number(1.0), MatrixValue::Null]),
            MatrixValue::Array(vec![
                MatrixValue::Bool(true),
                MatrixValue::String("s".to_owned()),
            ]),
        ])))
        .unwrap();

    assert_eq!(write_expr(&ast, matrix), r#"[[1, null], [true, "s"]]"#);
}

#[test]
fn test_non_reference_callee() {
    let mut ast = Ast::new();
    let body = ast.add_defs();
    let param = ast.add_expr(Expr::Ref("y".to_owned())).unwrap();
    ast.add_def(body, "=", Some(param)).unwrap();
    let func = ast
        .add_expr(Expr::FnDef {
            params: vec!["y".to_owned()],
            body,
        })
        .unwrap();
    let arg = ast.add_expr(Expr::Number(2.0)).unwrap();
    let call = ast
        .add_expr(Expr::Call {
            func,
            args: vec![arg],
        })
        .unwrap();

    assert_eq!(write_expr(&ast, call), "(y -> y)(2)");
}

#[test]
fn test_unbound_definition() {
    let mut ast = Ast::new();
    ast.add_def(ast.root(), "x", None).unwrap();

    assert_eq!(write(&ast), "x = null\n");
}

#[test]
fn test_write_defs() {
    let ast = parse("f = x -> y where\n  y = 1\n  z = 2");
    let closure = ast[ast[ast.root()].defs()[0]].expr().unwrap();

    let Expr::FnDef { body, .. } = ast[closure].expr() else {
        panic!("expected a closure");
    };

    assert_snapshot!(write_defs(&ast, *body), @r###"
    r#"="# = y
    y = 1
    z = 2
    "###);
}
