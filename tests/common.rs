#![allow(dead_code)]

use asct::ast::{Ast, DefDump, DefsDump, ExprDump};
use asct::parse::{self, GroupKind, Token, TokenValue};
use asct::position::HasSpan;
use asct::write::write;

pub fn parse(source: &str) -> Ast {
    match parse::parse_str(source) {
        Ok(ast) => ast,
        Err(e) => panic!("failed to parse {:?}: {} (at {})", source, e, e.span()),
    }
}

pub fn dump(source: &str) -> DefsDump {
    let ast = parse(source);
    ast.validate_parents().unwrap();

    ast.dump()
}

pub fn format(source: &str) -> String {
    write(&parse(source))
}

/// Renders a token tree on a single line: `_` is a space, `/` is a line break.
pub fn render_tokens(tokens: &[Token<'_>]) -> String {
    tokens
        .iter()
        .map(|token| match &token.value {
            TokenValue::Ident { name, raw: false } => name.to_string(),
            TokenValue::Ident { name, raw: true } => format!("raw({})", name),
            TokenValue::Infix(op) => op.to_string(),
            TokenValue::Number { int, frac: None } => int.to_string(),
            TokenValue::Number { int, frac: Some(frac) } => format!("{}.{}", int, frac),
            TokenValue::Bool(value) => value.to_string(),
            TokenValue::Null => "null".to_owned(),
            TokenValue::String(value) => format!("{:?}", value),
            TokenValue::Delim => ",".to_owned(),
            TokenValue::Space => "_".to_owned(),
            TokenValue::Break => "/".to_owned(),

            TokenValue::Group { kind, tokens } => {
                let name = match kind {
                    GroupKind::Brackets => "Brackets",
                    GroupKind::Braces => "Braces",
                    GroupKind::Parens => "Parens",
                    GroupKind::Indent => "Indent",
                };

                format!("{}[{}]", name, render_tokens(tokens))
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn lex(source: &str) -> String {
    match parse::lex(source) {
        Ok(tokens) => render_tokens(&tokens),
        Err(e) => panic!("failed to lex {:?}: {} (at {})", source, e, e.span()),
    }
}

pub fn num(value: f64) -> ExprDump {
    ExprDump::Number(value)
}

pub fn var(name: &str) -> ExprDump {
    ExprDump::Ref(name.to_owned())
}

pub fn call(func: &str, args: Vec<ExprDump>) -> ExprDump {
    ExprDump::Call {
        func: Box::new(var(func)),
        args,
    }
}

pub fn def(name: &str, expr: ExprDump) -> DefDump {
    DefDump {
        name: name.to_owned(),
        expr: Some(expr),
    }
}

pub fn defs(defs: Vec<DefDump>) -> DefsDump {
    DefsDump {
        defs,
        floating: vec![],
    }
}

/// The dump of a file consisting of `x = <expr>`.
pub fn single(expr: ExprDump) -> DefsDump {
    defs(vec![def("x", expr)])
}
