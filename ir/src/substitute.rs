//! Replacement of free variables.
//!
//! A `Let`/`LetStmt` that rebinds a substituted name shadows it: the bound
//! value is rewritten, the body is not. Names are not renamed to avoid
//! capture; callers that move subtrees under other bindings make names
//! unique first.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::Result;
use crate::mutator::{IrMutator, mutate_expr_children, mutate_stmt_children};
use crate::node::{Expr, ExprKind, Stmt, StmtKind};

struct Substitute<'a> {
    replacements: &'a HashMap<String, Arc<Expr>>,
    /// How many enclosing lets currently rebind each name.
    shadowed: HashMap<String, usize>,
}

impl<'a> Substitute<'a> {
    fn new(replacements: &'a HashMap<String, Arc<Expr>>) -> Self {
        Self { replacements, shadowed: HashMap::new() }
    }

    fn lookup(&self, name: &str) -> Option<&Arc<Expr>> {
        if self.shadowed.get(name).is_some_and(|&n| n > 0) {
            return None;
        }
        self.replacements.get(name)
    }

    /// Run `f` with `name` shadowed if it is one of the replaced names.
    fn scoped<T>(&mut self, name: &str, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if !self.replacements.contains_key(name) {
            return f(self);
        }
        *self.shadowed.entry(name.to_string()).or_default() += 1;
        let result = f(self);
        if let Some(n) = self.shadowed.get_mut(name) {
            *n -= 1;
        }
        result
    }
}

impl IrMutator for Substitute<'_> {
    fn mutate_expr(&mut self, expr: &Arc<Expr>) -> Result<Arc<Expr>> {
        match expr.kind() {
            ExprKind::Variable { name, .. } => Ok(self.lookup(name).cloned().unwrap_or_else(|| expr.clone())),
            ExprKind::Let { name, value, body } => {
                let new_value = self.mutate_expr(value)?;
                let new_body = self.scoped(name, |s| s.mutate_expr(body))?;
                if Arc::ptr_eq(&new_value, value) && Arc::ptr_eq(&new_body, body) {
                    Ok(expr.clone())
                } else {
                    Expr::let_(name.clone(), &new_value, &new_body)
                }
            }
            _ => mutate_expr_children(self, expr),
        }
    }

    fn mutate_stmt(&mut self, stmt: &Arc<Stmt>) -> Result<Arc<Stmt>> {
        match stmt.kind() {
            StmtKind::LetStmt { name, value, body } => {
                let new_value = self.mutate_expr(value)?;
                let new_body = self.scoped(name, |s| s.mutate_stmt(body))?;
                if Arc::ptr_eq(&new_value, value) && Arc::ptr_eq(&new_body, body) {
                    Ok(stmt.clone())
                } else {
                    Stmt::let_stmt(name.clone(), &new_value, &new_body)
                }
            }
            _ => mutate_stmt_children(self, stmt),
        }
    }
}

/// Replace free occurrences of variable `name` in `expr` by `replacement`.
pub fn substitute(name: &str, replacement: &Arc<Expr>, expr: &Arc<Expr>) -> Result<Arc<Expr>> {
    let map = HashMap::from([(name.to_string(), replacement.clone())]);
    substitute_map(&map, expr)
}

/// Replace every free variable named in `replacements`, in one pass.
pub fn substitute_map(replacements: &HashMap<String, Arc<Expr>>, expr: &Arc<Expr>) -> Result<Arc<Expr>> {
    if replacements.is_empty() {
        return Ok(expr.clone());
    }
    Substitute::new(replacements).mutate_expr(expr)
}

pub fn substitute_stmt(name: &str, replacement: &Arc<Expr>, stmt: &Arc<Stmt>) -> Result<Arc<Stmt>> {
    let map = HashMap::from([(name.to_string(), replacement.clone())]);
    substitute_stmt_map(&map, stmt)
}

pub fn substitute_stmt_map(replacements: &HashMap<String, Arc<Expr>>, stmt: &Arc<Stmt>) -> Result<Arc<Stmt>> {
    if replacements.is_empty() {
        return Ok(stmt.clone());
    }
    Substitute::new(replacements).mutate_stmt(stmt)
}
