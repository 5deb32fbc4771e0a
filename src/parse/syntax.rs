//! The owned tree built by the parser.
//!
//! Nothing is inserted into an [`Ast`](crate::ast::Ast) until the whole input has been parsed, so
//! abandoned branches never leave nodes behind.

use crate::ast::MatrixValue;
use crate::position::Span;

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Ref(String),
    Call { func: Box<Node>, args: Vec<Node> },
    List(Vec<Node>),
    Matrix(MatrixValue),
    FnDef { params: Vec<String>, body: Vec<DefNode> },
    Switch(Vec<MatchNode>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DefNode {
    pub name: String,
    pub expr: Option<Node>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchNode {
    pub cond: Option<Node>,
    pub value: Node,
}

impl Node {
    pub fn new(kind: NodeKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Builds `op(lhs, rhs)`.
    pub fn binary(op: String, op_span: Span, lhs: Node, rhs: Node) -> Self {
        let span = lhs.span.convex_hull(&rhs.span);

        Self::new(
            NodeKind::Call {
                func: Box::new(Self::new(NodeKind::Ref(op), op_span)),
                args: vec![lhs, rhs],
            },
            span,
        )
    }

    /// Desugars `-operand` into `-(0, operand)`.
    pub fn negation(minus_span: Span, operand: Node) -> Self {
        let zero = Self::new(NodeKind::Number(0.0), Span::point(minus_span.start));

        Self::binary("-".to_owned(), minus_span, zero, operand)
    }

    /// Returns the literal value of the node if it only consists of literals.
    pub fn matrix_value(&self) -> Option<MatrixValue> {
        match &self.kind {
            NodeKind::Null => Some(MatrixValue::Null),
            NodeKind::Bool(value) => Some(MatrixValue::Bool(*value)),
            NodeKind::Number(value) => Some(MatrixValue::Number(*value)),
            NodeKind::String(value) => Some(MatrixValue::String(value.clone())),
            NodeKind::Matrix(value) => Some(value.clone()),
            _ => None,
        }
    }
}
