mod common;

use pretty_assertions::assert_eq;

use asct::ast::{Ast, AstError, Expr, ExprDump, Match, NodeId};
use asct::write::write;

use self::common::{call, def, defs, num, parse, var};

fn number(ast: &mut Ast, value: f64) -> asct::ast::ExprId {
    ast.add_expr(Expr::Number(value)).unwrap()
}

fn reference(ast: &mut Ast, name: &str) -> asct::ast::ExprId {
    ast.add_expr(Expr::Ref(name.to_owned())).unwrap()
}

#[test]
fn test_build_from_scratch() {
    let mut ast = Ast::new();
    let f = reference(&mut ast, "f");
    let one = number(&mut ast, 1.0);
    let call_expr = ast
        .add_expr(Expr::Call {
            func: f,
            args: vec![one],
        })
        .unwrap();
    let x = ast.add_def(ast.root(), "x", Some(call_expr)).unwrap();

    ast.validate_parents().unwrap();
    assert_eq!(ast[one].parent(), Some(NodeId::Expr(call_expr)));
    assert_eq!(ast[call_expr].parent(), Some(NodeId::Def(x)));
    assert_eq!(ast[x].parent(), Some(ast.root()));
    assert_eq!(write(&ast), "x = f(1)\n");
}

#[test]
fn test_children_cannot_be_shared() {
    let mut ast = Ast::new();
    let one = number(&mut ast, 1.0);
    ast.add_expr(Expr::List(vec![one])).unwrap();

    assert_eq!(
        ast.add_expr(Expr::List(vec![one])),
        Err(AstError::AlreadyOwned(NodeId::Expr(one)))
    );
}

#[test]
fn test_duplicate_children() {
    let mut ast = Ast::new();
    let one = number(&mut ast, 1.0);

    assert_eq!(
        ast.add_expr(Expr::List(vec![one, one])),
        Err(AstError::AlreadyOwned(NodeId::Expr(one)))
    );
}

#[test]
fn test_root_cannot_be_a_closure_body() {
    let mut ast = Ast::new();
    let root = ast.root();

    assert_eq!(
        ast.add_expr(Expr::FnDef {
            params: vec![],
            body: root,
        }),
        Err(AstError::AlreadyOwned(NodeId::Defs(root)))
    );
}

#[test]
fn test_set_def_expr() {
    let mut ast = parse("x = 1");
    let x = ast[ast.root()].defs()[0];
    let old = ast[x].expr().unwrap();

    let two = number(&mut ast, 2.0);
    assert_eq!(ast.set_def_expr(x, Some(two)), Ok(Some(old)));
    assert_eq!(ast[old].parent(), None);
    assert_eq!(ast[two].parent(), Some(NodeId::Def(x)));

    ast.validate_parents().unwrap();
    assert_eq!(write(&ast), "x = 2\n");
}

#[test]
fn test_rename_def() {
    let mut ast = parse("x = 1");
    let x = ast[ast.root()].defs()[0];
    ast.rename_def(x, "my value").unwrap();

    assert_eq!(write(&ast), "r#\"my value\"# = 1\n");
}

#[test]
fn test_detach_argument() {
    let mut ast = parse("x = f(1, 2)");
    let x = ast[ast.root()].defs()[0];
    let call_expr = ast[x].expr().unwrap();

    let Expr::Call { func, args } = ast[call_expr].expr().clone() else {
        panic!("expected a call");
    };

    ast.detach_expr(args[0], ast.root()).unwrap();
    ast.validate_parents().unwrap();

    assert_eq!(ast[args[0]].parent(), Some(NodeId::Defs(ast.root())));
    assert_eq!(ast[ast.root()].floating(), &[args[0]]);
    assert_eq!(write(&ast), "x = f(2)\n");
    assert_eq!(ast.dump().floating, vec![num(1.0)]);

    // a call cannot lose its callee
    assert_eq!(
        ast.detach_expr(func, ast.root()),
        Err(AstError::RequiredSlot(func))
    );
}

#[test]
fn test_detach_switch_condition() {
    let mut ast = parse("x = switch\n  a => 1\n  otherwise 2");
    let switch = ast[ast[ast.root()].defs()[0]].expr().unwrap();

    let Expr::Switch(matches) = ast[switch].expr().clone() else {
        panic!("expected a switch");
    };
    let Match { cond, value } = matches[0];

    assert_eq!(
        ast.detach_expr(value, ast.root()),
        Err(AstError::RequiredSlot(value))
    );

    ast.detach_expr(cond.unwrap(), ast.root()).unwrap();
    ast.validate_parents().unwrap();

    assert_eq!(write(&ast), "x = switch\n  otherwise 1\n");
}

#[test]
fn test_remove_expr_frees_the_subtree() {
    let mut ast = parse("x = [f(y), z]");
    let list = ast[ast[ast.root()].defs()[0]].expr().unwrap();

    let Expr::List(items) = ast[list].expr().clone() else {
        panic!("expected a list");
    };
    let Expr::Call { func, args } = ast[items[0]].expr().clone() else {
        panic!("expected a call");
    };

    ast.remove_expr(items[0]).unwrap();
    ast.validate_parents().unwrap();

    assert!(ast.expr(items[0]).is_none());
    assert!(ast.expr(func).is_none());
    assert!(ast.expr(args[0]).is_none());
    assert_eq!(write(&ast), "x = [z]\n");

    assert_eq!(
        ast.remove_expr(items[0]),
        Err(AstError::UnknownNode(NodeId::Expr(items[0])))
    );
}

#[test]
fn test_remove_def() {
    let mut ast = parse("f = x -> y where\n  y = x\ng = 1");
    let f = ast[ast.root()].defs()[0];
    let closure = ast[f].expr().unwrap();

    let Expr::FnDef { body, .. } = ast[closure].expr().clone() else {
        panic!("expected a closure");
    };

    ast.remove_def(f).unwrap();
    ast.validate_parents().unwrap();

    assert!(ast.def(f).is_none());
    assert!(ast.expr(closure).is_none());
    assert!(ast.defs(body).is_none());
    assert_eq!(write(&ast), "g = 1\n");
}

#[test]
fn test_closure_bodies() {
    let mut ast = Ast::new();
    let body = ast.add_defs();
    let x = reference(&mut ast, "x");
    ast.add_def(body, "=", Some(x)).unwrap();
    let closure = ast
        .add_expr(Expr::FnDef {
            params: vec!["x".to_owned()],
            body,
        })
        .unwrap();
    ast.add_def(ast.root(), "id", Some(closure)).unwrap();

    ast.validate_parents().unwrap();
    assert_eq!(ast[body].parent(), Some(closure));
    assert_eq!(
        ast.dump(),
        defs(vec![def(
            "id",
            ExprDump::FnDef {
                params: vec!["x".to_owned()],
                body: defs(vec![def("=", var("x"))]),
            }
        )])
    );
}

#[test]
fn test_definitions_keep_source_order() {
    let ast = parse("b = 1\na = g(2)");
    let names = ast[ast.root()]
        .defs()
        .iter()
        .map(|&def| ast[def].name().to_owned())
        .collect::<Vec<_>>();

    assert_eq!(names, vec!["b", "a"]);

    // while dumps are sorted by name
    assert_eq!(
        ast.dump(),
        defs(vec![def("a", call("g", vec![num(2.0)])), def("b", num(1.0))])
    );
}

#[test]
fn test_unknown_nodes() {
    let mut ast = parse("x = 1");
    let x = ast[ast.root()].defs()[0];
    ast.remove_def(x).unwrap();

    assert_eq!(
        ast.rename_def(x, "y"),
        Err(AstError::UnknownNode(NodeId::Def(x)))
    );
    assert!(ast.set_def_expr(x, None).is_err());
}
