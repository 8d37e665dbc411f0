//! Rule trait and the dispatch node view

use gosift_parser::{Block, Expr, File, FuncDecl, ImportSpec, NodeKind, Stmt, ValueSpec};

use crate::context::LintContext;
use crate::messages::RuleId;
use crate::severity::Severity;

/// A borrowed view of one AST node, handed to rules during traversal
#[derive(Clone, Copy)]
pub enum Node<'a> {
    File(&'a File<'a>),
    ImportSpec(&'a ImportSpec<'a>),
    ValueSpec(&'a ValueSpec<'a>),
    FuncDecl(&'a FuncDecl<'a>),
    Block(&'a Block<'a>),
    Stmt(&'a Stmt<'a>),
    Expr(&'a Expr<'a>),
}

impl<'a> Node<'a> {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::File(_) => NodeKind::File,
            Node::ImportSpec(_) => NodeKind::ImportSpec,
            Node::ValueSpec(_) => NodeKind::ValueSpec,
            Node::FuncDecl(_) => NodeKind::FuncDecl,
            Node::Block(_) => NodeKind::Block,
            Node::Stmt(s) => s.kind(),
            Node::Expr(e) => e.kind(),
        }
    }
}

/// A lint rule
///
/// Rules declare the node kinds they react to; the checker only calls
/// `check` for those kinds. Each worker thread builds its own rule
/// instances, so implementations may keep interior caches without
/// synchronization.
pub trait Rule: Send {
    fn id(&self) -> RuleId;

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    /// Node kinds this rule wants to see
    fn targets(&self) -> &'static [NodeKind];

    fn check<'a>(&self, ctx: &mut LintContext<'a>, node: Node<'a>);
}
