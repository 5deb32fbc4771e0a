//! Turns a syntax tree back into source text.
//!
//! Every expression is rendered into a [`Fragment`] that remembers how tightly it binds. An
//! enclosing construct parenthesizes a fragment only if it binds looser than the slot it is put
//! into requires.

use tracing::{debug, instrument};

use crate::ast::{Ast, DefId, DefsId, Expr, ExprId, Match, MatrixValue, RESULT_DEF_NAME};
use crate::parse::precedence::{tier_of, Tier};
use crate::parse::token::{is_bare_ident, is_infix_operator, RESERVED_WORDS};

const INDENT: &str = "  ";

/// How tightly a fragment binds, from the loosest to the tightest.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd)]
enum Prec {
    /// Spans several lines and extends to the end of the last one.
    Multiline,

    /// Can be used as a call argument or a list item.
    Argument,

    Infix(Tier),
    Prefix,
    Atomic,
}

struct Fragment {
    text: String,
    prec: Prec,
}

impl Fragment {
    fn new(text: impl Into<String>, prec: Prec) -> Self {
        Self {
            text: text.into(),
            prec,
        }
    }

    fn atomic(text: impl Into<String>) -> Self {
        Self::new(text, Prec::Atomic)
    }

    fn wrap(self, min: Prec) -> String {
        if self.prec < min {
            format!("({})", self.text)
        } else {
            self.text
        }
    }
}

fn indent(depth: usize) -> String {
    INDENT.repeat(depth)
}

/// Writes an identifier, falling back to the raw syntax if it would not be read back as is.
pub fn write_ident(name: &str) -> String {
    if is_bare_ident(name) && !RESERVED_WORDS.contains(name) {
        return name.to_owned();
    }

    let hashes = (1..)
        .map(|n| "#".repeat(n))
        .find(|hashes| !name.contains(&format!("\"{}", hashes)))
        .unwrap_or_default();

    format!("r{hashes}\"{name}\"{hashes}")
}

/// Escapes backslashes only.
pub fn write_string(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\"))
}

pub fn write_number(value: f64) -> String {
    value.to_string()
}

fn write_matrix(value: &MatrixValue) -> String {
    match value {
        MatrixValue::Null => "null".to_owned(),
        MatrixValue::Bool(value) => value.to_string(),
        MatrixValue::Number(value) => write_number(*value),
        MatrixValue::String(value) => write_string(value),
        MatrixValue::Array(items) => format!(
            "[{}]",
            items.iter().map(write_matrix).collect::<Vec<_>>().join(", ")
        ),
    }
}

struct Writer<'a> {
    ast: &'a Ast,
}

impl Writer<'_> {
    fn defs(&self, id: DefsId, depth: usize) -> Vec<String> {
        self.ast[id]
            .defs()
            .iter()
            .map(|&def| self.def(def, depth))
            .collect()
    }

    fn def(&self, id: DefId, depth: usize) -> String {
        let def = &self.ast[id];

        format!("{} = {}", write_ident(def.name()), self.value(def.expr(), depth))
    }

    /// Writes the expression bound by a definition. Unbound definitions read as `null`.
    fn value(&self, expr: Option<ExprId>, depth: usize) -> String {
        match expr {
            Some(expr) => self.expr(expr, depth).wrap(Prec::Multiline),
            None => "null".to_owned(),
        }
    }

    fn args(&self, args: &[ExprId], depth: usize) -> String {
        args.iter()
            .map(|&arg| self.expr(arg, depth).wrap(Prec::Argument))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn is_zero(&self, id: ExprId) -> bool {
        matches!(self.ast[id].expr(), Expr::Number(value) if *value == 0.0)
    }

    fn expr(&self, id: ExprId, depth: usize) -> Fragment {
        match self.ast[id].expr() {
            Expr::Null => Fragment::atomic("null"),
            Expr::Bool(value) => Fragment::atomic(value.to_string()),
            Expr::Number(value) => Fragment::atomic(write_number(*value)),
            Expr::String(value) => Fragment::atomic(write_string(value)),
            Expr::Ref(name) => Fragment::atomic(write_ident(name)),
            Expr::Matrix(value) => Fragment::atomic(write_matrix(value)),
            Expr::Call { func, args } => self.call(*func, args, depth),
            Expr::List(items) => Fragment::atomic(format!("[{}]", self.args(items, depth))),
            Expr::FnDef { params, body } => self.closure(params, *body, depth),
            Expr::Switch(matches) => self.switch(matches, depth),
        }
    }

    fn call(&self, func: ExprId, args: &[ExprId], depth: usize) -> Fragment {
        let name = match self.ast[func].expr() {
            Expr::Ref(name) => name,

            _ => {
                let callee = self.expr(func, depth).text;

                return Fragment::atomic(format!("({})({})", callee, self.args(args, depth)));
            }
        };

        match *args {
            [zero, operand] if name == "-" && self.is_zero(zero) => {
                let operand = match self.ast[operand].expr() {
                    // `-5` would be read back as a number literal
                    Expr::Number(_) => format!("({})", self.expr(operand, depth).text),
                    _ => self.expr(operand, depth).wrap(Prec::Atomic),
                };

                Fragment::new(format!("-{}", operand), Prec::Prefix)
            }

            [lhs, rhs] if is_infix_operator(name) => {
                let tier = tier_of(name);
                let rhs_min = tier.tighter().map_or(Prec::Prefix, Prec::Infix);

                Fragment::new(
                    format!(
                        "{} {} {}",
                        self.expr(lhs, depth).wrap(Prec::Infix(tier)),
                        name,
                        self.expr(rhs, depth).wrap(rhs_min),
                    ),
                    Prec::Infix(tier),
                )
            }

            _ => Fragment::atomic(format!("{}({})", write_ident(name), self.args(args, depth))),
        }
    }

    fn closure(&self, params: &[String], body: DefsId, depth: usize) -> Fragment {
        let params = match params {
            [param] => write_ident(param),
            _ => format!(
                "({})",
                params.iter().map(|param| write_ident(param)).collect::<Vec<_>>().join(", ")
            ),
        };

        let defs = self.ast[body].defs();
        let result = defs
            .iter()
            .copied()
            .find(|&def| self.ast[def].name() == RESULT_DEF_NAME);
        let wheres = defs
            .iter()
            .copied()
            .filter(|&def| Some(def) != result)
            .collect::<Vec<_>>();

        let result = result.and_then(|def| self.ast[def].expr());

        if wheres.is_empty() {
            let (text, prec) = match result {
                Some(expr) => {
                    let fragment = self.expr(expr, depth);
                    let prec = fragment.prec.min(Prec::Argument);

                    (fragment.wrap(Prec::Multiline), prec)
                }

                None => ("null".to_owned(), Prec::Argument),
            };

            return Fragment::new(format!("{} -> {}", params, text), prec);
        }

        // a `where` following the body would otherwise attach to a nested closure
        let result = match result {
            Some(expr) => self.expr(expr, depth).wrap(Prec::Infix(Tier::Custom)),
            None => "null".to_owned(),
        };

        let mut text = format!("{} -> {} where", params, result);

        for def in wheres {
            text.push('\n');
            text.push_str(&indent(depth + 1));
            text.push_str(&self.def(def, depth + 1));
        }

        Fragment::new(text, Prec::Multiline)
    }

    /// Writes the cases on separate lines. Nothing after the first wildcard case is written.
    fn switch(&self, matches: &[Match], depth: usize) -> Fragment {
        if matches.is_empty() {
            return Fragment::atomic("switch {}");
        }

        let mut text = "switch".to_owned();

        for m in matches {
            text.push('\n');
            text.push_str(&indent(depth + 1));

            let value = self.expr(m.value, depth + 1).wrap(Prec::Multiline);

            match m.cond {
                Some(cond) => {
                    let cond = self.expr(cond, depth + 1).wrap(Prec::Argument);
                    text.push_str(&format!("{} => {}", cond, value));
                }

                None => {
                    text.push_str(&format!("otherwise {}", value));

                    break;
                }
            }
        }

        Fragment::new(text, Prec::Multiline)
    }
}

/// Writes the root definitions of `ast`, one per line.
#[instrument(level = "debug", skip_all)]
pub fn write(ast: &Ast) -> String {
    let lines = Writer { ast }.defs(ast.root(), 0);
    debug!(defs = lines.len(), "wrote the syntax tree");

    lines.into_iter().map(|line| line + "\n").collect()
}

pub fn write_defs(ast: &Ast, defs: DefsId) -> String {
    Writer { ast }.defs(defs, 0).join("\n")
}

pub fn write_expr(ast: &Ast, expr: ExprId) -> String {
    Writer { ast }.expr(expr, 0).text
}
