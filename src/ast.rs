//! The arena-backed syntax tree.
//!
//! Nodes own their children through handles. Every node also records a non-owning handle to its
//! owner, which the mutators below keep in sync.

pub mod dump;

use std::error::Error;
use std::fmt::{self, Display};
use std::ops::Index;

use itertools::Itertools;
use serde::Serialize;
use slotmap::{new_key_type, SlotMap};
use tracing::debug;

use crate::parse::syntax::{DefNode, Node, NodeKind};
use crate::position::Span;

pub use dump::{DefDump, DefsDump, ExprDump, MatchDump};

/// The name of the definition holding the value of a closure body.
pub const RESULT_DEF_NAME: &str = "=";

new_key_type! {
    pub struct ExprId;
    pub struct DefId;
    pub struct DefsId;
}

#[derive(Serialize, Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum NodeId {
    Expr(ExprId),
    Def(DefId),
    Defs(DefsId),
}

impl Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expr(id) => write!(f, "expression {:?}", id),
            Self::Def(id) => write!(f, "definition {:?}", id),
            Self::Defs(id) => write!(f, "definition set {:?}", id),
        }
    }
}

/// A nested array of literal values.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub enum MatrixValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<MatrixValue>),
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub enum Expr {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Ref(String),
    Call { func: ExprId, args: Vec<ExprId> },
    List(Vec<ExprId>),
    Matrix(MatrixValue),
    FnDef { params: Vec<String>, body: DefsId },
    Switch(Vec<Match>),
}

impl Expr {
    /// Lists the nodes directly owned by the expression.
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            Self::Call { func, args } => std::iter::once(func)
                .chain(args)
                .map(|&id| NodeId::Expr(id))
                .collect(),

            Self::List(items) => items.iter().map(|&id| NodeId::Expr(id)).collect(),
            Self::FnDef { body, .. } => vec![NodeId::Defs(*body)],

            Self::Switch(matches) => matches
                .iter()
                .flat_map(|m| m.cond.into_iter().chain([m.value]))
                .map(NodeId::Expr)
                .collect(),

            Self::Null
            | Self::Bool(_)
            | Self::Number(_)
            | Self::String(_)
            | Self::Ref(_)
            | Self::Matrix(_) => vec![],
        }
    }
}

/// A switch case. Cases without a condition always match.
#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct Match {
    pub cond: Option<ExprId>,
    pub value: ExprId,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ExprNode {
    expr: Expr,
    parent: Option<NodeId>,
    span: Option<Span>,
}

impl ExprNode {
    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// The owner of the expression: a definition, an enclosing expression or, for floating
    /// expressions, a definition set. `None` for detached expressions.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// The source location, if the expression was parsed.
    pub fn span(&self) -> Option<Span> {
        self.span
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Def {
    name: String,
    expr: Option<ExprId>,
    parent: Option<DefsId>,
    span: Option<Span>,
}

impl Def {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn expr(&self) -> Option<ExprId> {
        self.expr
    }

    pub fn parent(&self) -> Option<DefsId> {
        self.parent
    }

    pub fn span(&self) -> Option<Span> {
        self.span
    }
}

#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct Defs {
    defs: Vec<DefId>,
    floating: Vec<ExprId>,
    parent: Option<ExprId>,
}

impl Defs {
    pub fn defs(&self) -> &[DefId] {
        &self.defs
    }

    /// Expressions owned by the set but bound to no definition.
    pub fn floating(&self) -> &[ExprId] {
        &self.floating
    }

    /// The closure whose body this is. `None` for the root.
    pub fn parent(&self) -> Option<ExprId> {
        self.parent
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub enum AstError {
    UnknownNode(NodeId),

    /// The node already has an owner.
    AlreadyOwned(NodeId),

    /// The expression fills a slot that cannot be left empty.
    RequiredSlot(ExprId),

    BrokenParent(NodeId),
}

impl Display for AstError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownNode(id) => write!(f, "the {} does not exist", id),
            Self::AlreadyOwned(id) => write!(f, "the {} is already owned by another node", id),

            Self::RequiredSlot(id) => write!(
                f,
                "the expression {:?} cannot be detached from its owner",
                id
            ),

            Self::BrokenParent(id) => {
                write!(f, "the parent link of the {} does not match its owner", id)
            }
        }
    }
}

impl Error for AstError {}

#[derive(Serialize, Debug, Clone)]
pub struct Ast {
    exprs: SlotMap<ExprId, ExprNode>,
    defs: SlotMap<DefId, Def>,
    def_sets: SlotMap<DefsId, Defs>,
    root: DefsId,
}

impl Default for Ast {
    fn default() -> Self {
        Self::new()
    }
}

impl Ast {
    /// Creates a tree with an empty root definition set.
    pub fn new() -> Self {
        let mut def_sets = SlotMap::with_key();
        let root = def_sets.insert(Defs::default());

        Self {
            exprs: SlotMap::with_key(),
            defs: SlotMap::with_key(),
            def_sets,
            root,
        }
    }

    pub(crate) fn from_parsed(defs: Vec<DefNode>) -> Self {
        let mut ast = Self::new();
        ast.insert_def_nodes(ast.root, defs);

        debug!(
            exprs = ast.exprs.len(),
            defs = ast.defs.len(),
            "built the syntax tree"
        );

        ast
    }

    fn insert_def_nodes(&mut self, defs_id: DefsId, defs: Vec<DefNode>) {
        for def in defs {
            let def_id = self.defs.insert(Def {
                name: def.name,
                expr: None,
                parent: Some(defs_id),
                span: Some(def.span),
            });

            if let Some(node) = def.expr {
                let expr = self.insert_node(node, NodeId::Def(def_id));
                self.defs[def_id].expr = Some(expr);
            }

            self.def_sets[defs_id].defs.push(def_id);
        }
    }

    fn insert_node(&mut self, node: Node, parent: NodeId) -> ExprId {
        // children need the handle of their owner, so it is reserved first
        let id = self.exprs.insert(ExprNode {
            expr: Expr::Null,
            parent: Some(parent),
            span: Some(node.span),
        });
        let owner = NodeId::Expr(id);

        let expr = match node.kind {
            NodeKind::Null => Expr::Null,
            NodeKind::Bool(value) => Expr::Bool(value),
            NodeKind::Number(value) => Expr::Number(value),
            NodeKind::String(value) => Expr::String(value),
            NodeKind::Ref(name) => Expr::Ref(name),
            NodeKind::Matrix(value) => Expr::Matrix(value),

            NodeKind::Call { func, args } => Expr::Call {
                func: self.insert_node(*func, owner),
                args: args
                    .into_iter()
                    .map(|arg| self.insert_node(arg, owner))
                    .collect(),
            },

            NodeKind::List(items) => Expr::List(
                items
                    .into_iter()
                    .map(|item| self.insert_node(item, owner))
                    .collect(),
            ),

            NodeKind::FnDef { params, body } => {
                let body_id = self.def_sets.insert(Defs {
                    parent: Some(id),
                    ..Default::default()
                });
                self.insert_def_nodes(body_id, body);

                Expr::FnDef {
                    params,
                    body: body_id,
                }
            }

            NodeKind::Switch(matches) => Expr::Switch(
                matches
                    .into_iter()
                    .map(|m| Match {
                        cond: m.cond.map(|cond| self.insert_node(cond, owner)),
                        value: self.insert_node(m.value, owner),
                    })
                    .collect(),
            ),
        };

        self.exprs[id].expr = expr;

        id
    }

    pub fn root(&self) -> DefsId {
        self.root
    }

    pub fn expr(&self, id: ExprId) -> Option<&ExprNode> {
        self.exprs.get(id)
    }

    pub fn def(&self, id: DefId) -> Option<&Def> {
        self.defs.get(id)
    }

    pub fn defs(&self, id: DefsId) -> Option<&Defs> {
        self.def_sets.get(id)
    }

    fn expr_node(&self, id: ExprId) -> Result<&ExprNode, AstError> {
        self.exprs.get(id).ok_or(AstError::UnknownNode(NodeId::Expr(id)))
    }

    fn def_node(&self, id: DefId) -> Result<&Def, AstError> {
        self.defs.get(id).ok_or(AstError::UnknownNode(NodeId::Def(id)))
    }

    fn defs_node(&self, id: DefsId) -> Result<&Defs, AstError> {
        self.def_sets.get(id).ok_or(AstError::UnknownNode(NodeId::Defs(id)))
    }

    fn ensure_detached(&self, id: NodeId) -> Result<(), AstError> {
        let owned = match id {
            NodeId::Expr(id) => self.expr_node(id)?.parent.is_some(),
            NodeId::Def(id) => self.def_node(id)?.parent.is_some(),
            NodeId::Defs(id) => self.defs_node(id)?.parent.is_some() || id == self.root,
        };

        if owned {
            Err(AstError::AlreadyOwned(id))
        } else {
            Ok(())
        }
    }

    fn set_parent(&mut self, id: NodeId, parent: Option<NodeId>) {
        match id {
            NodeId::Expr(id) => self.exprs[id].parent = parent,

            NodeId::Def(id) => {
                self.defs[id].parent = match parent {
                    Some(NodeId::Defs(defs)) => Some(defs),
                    _ => None,
                }
            }

            NodeId::Defs(id) => {
                self.def_sets[id].parent = match parent {
                    Some(NodeId::Expr(expr)) => Some(expr),
                    _ => None,
                }
            }
        }
    }

    /// Inserts a detached expression. Its children must exist and be detached themselves.
    pub fn add_expr(&mut self, expr: Expr) -> Result<ExprId, AstError> {
        let children = expr.children();

        if let Some(&duplicate) = children.iter().duplicates().next() {
            return Err(AstError::AlreadyOwned(duplicate));
        }

        for &child in &children {
            self.ensure_detached(child)?;
        }

        let id = self.exprs.insert(ExprNode {
            expr,
            parent: None,
            span: None,
        });

        for child in children {
            self.set_parent(child, Some(NodeId::Expr(id)));
        }

        Ok(id)
    }

    /// Creates an empty detached definition set, to be used as a closure body.
    pub fn add_defs(&mut self) -> DefsId {
        self.def_sets.insert(Defs::default())
    }

    /// Appends a definition to `defs`. The expression, if any, must be detached.
    pub fn add_def(
        &mut self,
        defs: DefsId,
        name: impl Into<String>,
        expr: Option<ExprId>,
    ) -> Result<DefId, AstError> {
        self.defs_node(defs)?;

        if let Some(expr) = expr {
            self.ensure_detached(NodeId::Expr(expr))?;
        }

        let id = self.defs.insert(Def {
            name: name.into(),
            expr,
            parent: Some(defs),
            span: None,
        });

        if let Some(expr) = expr {
            self.exprs[expr].parent = Some(NodeId::Def(id));
        }

        self.def_sets[defs].defs.push(id);

        Ok(id)
    }

    pub fn rename_def(&mut self, def: DefId, name: impl Into<String>) -> Result<(), AstError> {
        self.def_node(def)?;
        self.defs[def].name = name.into();

        Ok(())
    }

    /// Binds a detached expression to `def`, returning the previously bound one, now detached.
    pub fn set_def_expr(
        &mut self,
        def: DefId,
        expr: Option<ExprId>,
    ) -> Result<Option<ExprId>, AstError> {
        self.def_node(def)?;

        if let Some(expr) = expr {
            self.ensure_detached(NodeId::Expr(expr))?;
        }

        let previous = std::mem::replace(&mut self.defs[def].expr, expr);

        if let Some(previous) = previous {
            self.exprs[previous].parent = None;
        }

        if let Some(expr) = expr {
            self.exprs[expr].parent = Some(NodeId::Def(def));
        }

        Ok(previous)
    }

    /// Makes a detached expression floating in `defs`.
    pub fn add_floating(&mut self, defs: DefsId, expr: ExprId) -> Result<(), AstError> {
        self.defs_node(defs)?;
        self.ensure_detached(NodeId::Expr(expr))?;

        self.def_sets[defs].floating.push(expr);
        self.exprs[expr].parent = Some(NodeId::Defs(defs));

        Ok(())
    }

    /// Removes the expression from its owner, leaving it detached.
    fn unlink_expr(&mut self, id: ExprId) -> Result<(), AstError> {
        match self.expr_node(id)?.parent {
            None => {}

            Some(NodeId::Def(def)) => {
                if let Some(def) = self.defs.get_mut(def) {
                    def.expr = None;
                }
            }

            Some(NodeId::Defs(defs)) => {
                if let Some(defs) = self.def_sets.get_mut(defs) {
                    defs.floating.retain(|&expr| expr != id);
                }
            }

            Some(NodeId::Expr(owner)) => {
                if let Some(owner) = self.exprs.get_mut(owner) {
                    match &mut owner.expr {
                        Expr::Call { func, .. } if *func == id => {
                            return Err(AstError::RequiredSlot(id))
                        }

                        Expr::Call { args: items, .. } | Expr::List(items) => {
                            items.retain(|&item| item != id)
                        }

                        Expr::Switch(matches) => {
                            if matches.iter().any(|m| m.value == id) {
                                return Err(AstError::RequiredSlot(id));
                            }

                            // a case losing its condition turns into a wildcard
                            for m in matches.iter_mut().filter(|m| m.cond == Some(id)) {
                                m.cond = None;
                            }
                        }

                        _ => {}
                    }
                }
            }
        }

        self.exprs[id].parent = None;

        Ok(())
    }

    /// Unlinks the expression from its owner and makes it floating in `into`.
    pub fn detach_expr(&mut self, expr: ExprId, into: DefsId) -> Result<(), AstError> {
        self.defs_node(into)?;
        self.unlink_expr(expr)?;

        self.add_floating(into, expr)
    }

    /// Unlinks the expression from its owner and frees it along with its subtree.
    pub fn remove_expr(&mut self, expr: ExprId) -> Result<(), AstError> {
        self.unlink_expr(expr)?;
        self.free_expr(expr);

        Ok(())
    }

    /// Removes the definition from its set and frees it along with its expression.
    pub fn remove_def(&mut self, def: DefId) -> Result<(), AstError> {
        if let Some(defs) = self.def_node(def)?.parent {
            if let Some(defs) = self.def_sets.get_mut(defs) {
                defs.defs.retain(|&id| id != def);
            }
        }

        self.free_def(def);

        Ok(())
    }

    fn free_expr(&mut self, id: ExprId) {
        let Some(node) = self.exprs.remove(id) else {
            return;
        };

        for child in node.expr.children() {
            match child {
                NodeId::Expr(id) => self.free_expr(id),
                NodeId::Def(id) => self.free_def(id),
                NodeId::Defs(id) => self.free_defs(id),
            }
        }
    }

    fn free_def(&mut self, id: DefId) {
        if let Some(expr) = self.defs.remove(id).and_then(|def| def.expr) {
            self.free_expr(expr);
        }
    }

    fn free_defs(&mut self, id: DefsId) {
        let Some(defs) = self.def_sets.remove(id) else {
            return;
        };

        for def in defs.defs {
            self.free_def(def);
        }

        for expr in defs.floating {
            self.free_expr(expr);
        }
    }

    fn check_parent(&self, id: NodeId, expected: Option<NodeId>) -> Result<(), AstError> {
        let actual = match id {
            NodeId::Expr(expr) => self.expr_node(expr)?.parent,
            NodeId::Def(def) => self.def_node(def)?.parent.map(NodeId::Defs),
            NodeId::Defs(defs) => self.defs_node(defs)?.parent.map(NodeId::Expr),
        };

        if actual == expected {
            Ok(())
        } else {
            Err(AstError::BrokenParent(id))
        }
    }

    /// Checks that every parent handle points at the node actually owning it.
    pub fn validate_parents(&self) -> Result<(), AstError> {
        self.check_parent(NodeId::Defs(self.root), None)?;

        for (id, defs) in &self.def_sets {
            for &def in &defs.defs {
                self.check_parent(NodeId::Def(def), Some(NodeId::Defs(id)))?;
            }

            for &expr in &defs.floating {
                self.check_parent(NodeId::Expr(expr), Some(NodeId::Defs(id)))?;
            }
        }

        for (id, def) in &self.defs {
            if let Some(expr) = def.expr {
                self.check_parent(NodeId::Expr(expr), Some(NodeId::Def(id)))?;
            }
        }

        for (id, node) in &self.exprs {
            for child in node.expr.children() {
                self.check_parent(child, Some(NodeId::Expr(id)))?;
            }
        }

        Ok(())
    }

    pub fn dump(&self) -> DefsDump {
        dump::dump_defs(self, self.root)
    }
}

impl Index<ExprId> for Ast {
    type Output = ExprNode;

    fn index(&self, id: ExprId) -> &ExprNode {
        &self.exprs[id]
    }
}

impl Index<DefId> for Ast {
    type Output = Def;

    fn index(&self, id: DefId) -> &Def {
        &self.defs[id]
    }
}

impl Index<DefsId> for Ast {
    type Output = Defs;

    fn index(&self, id: DefsId) -> &Defs {
        &self.def_sets[id]
    }
}
