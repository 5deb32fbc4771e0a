//! An owned snapshot of the tree that ignores handles and source locations.
//!
//! Two trees are structurally equal iff their dumps are. Definitions are sorted by name, since a
//! definition set is unordered.

use serde::Serialize;

use super::{Ast, DefId, DefsId, Expr, ExprId, MatrixValue};

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct DefsDump {
    pub defs: Vec<DefDump>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub floating: Vec<ExprDump>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct DefDump {
    pub name: String,
    pub expr: Option<ExprDump>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub enum ExprDump {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Ref(String),
    Call {
        func: Box<ExprDump>,
        args: Vec<ExprDump>,
    },
    List(Vec<ExprDump>),
    Matrix(MatrixValue),
    FnDef {
        params: Vec<String>,
        body: DefsDump,
    },
    Switch(Vec<MatchDump>),
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct MatchDump {
    pub cond: Option<ExprDump>,
    pub value: ExprDump,
}

pub fn dump_defs(ast: &Ast, id: DefsId) -> DefsDump {
    let defs = &ast[id];
    let mut dumped: Vec<DefDump> = defs.defs().iter().map(|&def| dump_def(ast, def)).collect();
    dumped.sort_by(|lhs, rhs| lhs.name.cmp(&rhs.name));

    DefsDump {
        defs: dumped,
        floating: defs
            .floating()
            .iter()
            .map(|&expr| dump_expr(ast, expr))
            .collect(),
    }
}

pub fn dump_def(ast: &Ast, id: DefId) -> DefDump {
    let def = &ast[id];

    DefDump {
        name: def.name().to_owned(),
        expr: def.expr().map(|expr| dump_expr(ast, expr)),
    }
}

pub fn dump_expr(ast: &Ast, id: ExprId) -> ExprDump {
    match ast[id].expr() {
        Expr::Null => ExprDump::Null,
        Expr::Bool(value) => ExprDump::Bool(*value),
        Expr::Number(value) => ExprDump::Number(*value),
        Expr::String(value) => ExprDump::String(value.clone()),
        Expr::Ref(name) => ExprDump::Ref(name.clone()),
        Expr::Matrix(value) => ExprDump::Matrix(value.clone()),

        Expr::Call { func, args } => ExprDump::Call {
            func: Box::new(dump_expr(ast, *func)),
            args: args.iter().map(|&arg| dump_expr(ast, arg)).collect(),
        },

        Expr::List(items) => ExprDump::List(items.iter().map(|&item| dump_expr(ast, item)).collect()),

        Expr::FnDef { params, body } => ExprDump::FnDef {
            params: params.clone(),
            body: dump_defs(ast, *body),
        },

        Expr::Switch(matches) => ExprDump::Switch(
            matches
                .iter()
                .map(|m| MatchDump {
                    cond: m.cond.map(|cond| dump_expr(ast, cond)),
                    value: dump_expr(ast, m.value),
                })
                .collect(),
        ),
    }
}
