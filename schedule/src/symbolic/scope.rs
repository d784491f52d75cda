//! Name queries used before substituting a `let` binding.

use std::sync::Arc;

use weft_ir::visitor::Visited;
use weft_ir::{Expr, ExprKind, IrGraphVisitor, Stmt, StmtKind};

struct NameScan<'a> {
    name: &'a str,
    /// Look for binders (`let`, loops) instead of uses.
    binders: bool,
    found: bool,
    visited: Visited,
}

impl<'a> NameScan<'a> {
    fn uses(name: &'a str) -> Self {
        Self { name, binders: false, found: false, visited: Visited::default() }
    }

    fn binds(name: &'a str) -> Self {
        Self { name, binders: true, found: false, visited: Visited::default() }
    }
}

impl IrGraphVisitor for NameScan<'_> {
    fn visited(&mut self) -> &mut Visited {
        &mut self.visited
    }

    fn visit_expr(&mut self, expr: &Arc<Expr>) {
        if self.found {
            return;
        }
        match expr.kind() {
            ExprKind::Variable { name, .. } if !self.binders && name == self.name => self.found = true,
            ExprKind::Let { name, .. } if self.binders && name == self.name => self.found = true,
            _ => {
                for child in expr.children() {
                    self.include_expr(child);
                }
            }
        }
    }

    fn visit_stmt(&mut self, stmt: &Arc<Stmt>) {
        if self.found {
            return;
        }
        match stmt.kind() {
            StmtKind::LetStmt { name, .. } | StmtKind::For { name, .. } if self.binders && name == self.name => {
                self.found = true;
            }
            _ => {
                for child in stmt.expr_children() {
                    self.include_expr(child);
                }
                for child in stmt.stmt_children() {
                    self.include_stmt(child);
                }
            }
        }
    }
}

/// Whether a variable named `name` occurs anywhere in `expr`.
pub fn references(name: &str, expr: &Arc<Expr>) -> bool {
    let mut scan = NameScan::uses(name);
    scan.include_expr(expr);
    scan.found
}

pub fn references_stmt(name: &str, stmt: &Arc<Stmt>) -> bool {
    let mut scan = NameScan::uses(name);
    scan.include_stmt(stmt);
    scan.found
}

/// Whether `expr` contains a `let` that binds `name`.
pub fn rebinds(name: &str, expr: &Arc<Expr>) -> bool {
    let mut scan = NameScan::binds(name);
    scan.include_expr(expr);
    scan.found
}

/// Whether `stmt` contains a `let`, `LetStmt` or loop that binds `name`.
pub fn rebinds_stmt(name: &str, stmt: &Arc<Stmt>) -> bool {
    let mut scan = NameScan::binds(name);
    scan.include_stmt(stmt);
    scan.found
}
