//! Read-only traversal.
//!
//! [`IrVisitor`] walks a tree, reaching a shared node once per reference.
//! [`IrGraphVisitor`] walks the same structure as a DAG: each node is
//! visited once no matter how many parents share it.
//!
//! Both default to structural recursion, so an implementation overrides
//! `visit_expr`/`visit_stmt`, handles the kinds it cares about and hands the
//! rest back to [`walk_expr`]/[`walk_stmt`]. The walk functions match every
//! node kind.

use std::collections::HashSet;
use std::sync::Arc;

use crate::node::{Expr, ExprKind, Stmt, StmtKind};

pub trait IrVisitor {
    fn visit_expr(&mut self, expr: &Arc<Expr>) {
        walk_expr(self, expr);
    }

    fn visit_stmt(&mut self, stmt: &Arc<Stmt>) {
        walk_stmt(self, stmt);
    }
}

/// Visit every child of `expr`.
pub fn walk_expr<V: IrVisitor + ?Sized>(v: &mut V, expr: &Arc<Expr>) {
    match expr.kind() {
        ExprKind::Const(_) | ExprKind::StringImm(_) | ExprKind::Variable { .. } => {}
        ExprKind::Cast(value) | ExprKind::Not(value) | ExprKind::Broadcast { value, .. } => v.visit_expr(value),
        ExprKind::Binary(_, a, b) => {
            v.visit_expr(a);
            v.visit_expr(b);
        }
        ExprKind::Select { condition, true_value, false_value } => {
            v.visit_expr(condition);
            v.visit_expr(true_value);
            v.visit_expr(false_value);
        }
        ExprKind::Load { index, .. } => v.visit_expr(index),
        ExprKind::Ramp { base, stride, .. } => {
            v.visit_expr(base);
            v.visit_expr(stride);
        }
        ExprKind::Call { args, .. } => args.iter().for_each(|a| v.visit_expr(a)),
        ExprKind::Let { value, body, .. } => {
            v.visit_expr(value);
            v.visit_expr(body);
        }
    }
}

/// Visit every child of `stmt`, expressions before nested statements.
pub fn walk_stmt<V: IrVisitor + ?Sized>(v: &mut V, stmt: &Arc<Stmt>) {
    match stmt.kind() {
        StmtKind::LetStmt { value, body, .. } => {
            v.visit_expr(value);
            v.visit_stmt(body);
        }
        StmtKind::AssertStmt { condition, .. } => v.visit_expr(condition),
        StmtKind::Pipeline { produce, update, consume, .. } => {
            v.visit_stmt(produce);
            if let Some(update) = update {
                v.visit_stmt(update);
            }
            v.visit_stmt(consume);
        }
        StmtKind::For { min, extent, body, .. } => {
            v.visit_expr(min);
            v.visit_expr(extent);
            v.visit_stmt(body);
        }
        StmtKind::Store { value, index, .. } => {
            v.visit_expr(value);
            v.visit_expr(index);
        }
        StmtKind::Provide { values, args, .. } => {
            values.iter().chain(args).for_each(|e| v.visit_expr(e));
        }
        StmtKind::Allocate { size, body, .. } => {
            v.visit_expr(size);
            v.visit_stmt(body);
        }
        StmtKind::Free { .. } => {}
        StmtKind::Realize { bounds, body, .. } => {
            for range in bounds {
                v.visit_expr(range.min());
                v.visit_expr(range.extent());
            }
            v.visit_stmt(body);
        }
        StmtKind::Block { first, rest } => {
            v.visit_stmt(first);
            if let Some(rest) = rest {
                v.visit_stmt(rest);
            }
        }
        StmtKind::IfThenElse { condition, then_case, else_case } => {
            v.visit_expr(condition);
            v.visit_stmt(then_case);
            if let Some(else_case) = else_case {
                v.visit_stmt(else_case);
            }
        }
        StmtKind::Evaluate(value) => v.visit_expr(value),
    }
}

// =========================================================================
// Graph visitor
// =========================================================================

/// Node ids already visited by an [`IrGraphVisitor`].
#[derive(Debug, Default)]
pub struct Visited {
    exprs: HashSet<u64>,
    stmts: HashSet<u64>,
}

impl Visited {
    pub fn contains_expr(&self, expr: &Expr) -> bool {
        self.exprs.contains(&expr.id)
    }

    pub fn contains_stmt(&self, stmt: &Stmt) -> bool {
        self.stmts.contains(&stmt.id)
    }

    pub fn len(&self) -> usize {
        self.exprs.len() + self.stmts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Visitor that reaches each node of a DAG once.
///
/// Traversal enters through [`include_expr`](Self::include_expr) /
/// [`include_stmt`](Self::include_stmt), which skip nodes seen before and
/// otherwise call `visit_*`. The default `visit_*` includes the children.
pub trait IrGraphVisitor {
    fn visited(&mut self) -> &mut Visited;

    fn include_expr(&mut self, expr: &Arc<Expr>) {
        if self.visited().exprs.insert(expr.id) {
            self.visit_expr(expr);
        }
    }

    fn include_stmt(&mut self, stmt: &Arc<Stmt>) {
        if self.visited().stmts.insert(stmt.id) {
            self.visit_stmt(stmt);
        }
    }

    fn visit_expr(&mut self, expr: &Arc<Expr>) {
        for child in expr.children() {
            self.include_expr(child);
        }
    }

    fn visit_stmt(&mut self, stmt: &Arc<Stmt>) {
        for child in stmt.expr_children() {
            self.include_expr(child);
        }
        for child in stmt.stmt_children() {
            self.include_stmt(child);
        }
    }
}
