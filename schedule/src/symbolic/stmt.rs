//! Statement rules and `let` inlining.

use std::sync::Arc;

use weft_ir::pattern::try_const;
use weft_ir::{Expr, ExprKind, Result, Stmt, StmtKind, substitute, substitute_stmt};

use super::rules::RewriteResult;
use super::scope::{rebinds, rebinds_stmt, references, references_stmt};

/// Values cheap enough to copy into every use.
fn is_trivial(value: &Arc<Expr>) -> bool {
    value.is_const() || value.var_name().is_some()
}

/// Substituting `name := value` into a body that rebinds either name would
/// capture or be captured.
fn can_inline(name: &str, value: &Arc<Expr>, rebound: impl Fn(&str) -> bool) -> bool {
    is_trivial(value) && !rebound(name) && value.var_name().is_none_or(|v| !rebound(v))
}

/// `let x = v in body` with `v` trivial or unused.
pub fn let_expr_rules(expr: &Arc<Expr>) -> Result<RewriteResult> {
    let ExprKind::Let { name, value, body } = expr.kind() else {
        return Ok(RewriteResult::NoMatch);
    };
    if !references(name, body) {
        return Ok(RewriteResult::Rewritten(body.clone()));
    }
    if can_inline(name, value, |n| rebinds(n, body)) {
        return Ok(RewriteResult::Rewritten(substitute(name, value, body)?));
    }
    Ok(RewriteResult::NoMatch)
}

pub fn let_stmt_rules(stmt: &Arc<Stmt>) -> Result<RewriteResult<Stmt>> {
    let StmtKind::LetStmt { name, value, body } = stmt.kind() else {
        return Ok(RewriteResult::NoMatch);
    };
    if !references_stmt(name, body) {
        return Ok(RewriteResult::Rewritten(body.clone()));
    }
    if can_inline(name, value, |n| rebinds_stmt(n, body)) {
        return Ok(RewriteResult::Rewritten(substitute_stmt(name, value, body)?));
    }
    Ok(RewriteResult::NoMatch)
}

pub fn if_rules(stmt: &Arc<Stmt>) -> Result<RewriteResult<Stmt>> {
    let StmtKind::IfThenElse { condition, then_case, else_case } = stmt.kind() else {
        return Ok(RewriteResult::NoMatch);
    };
    let otherwise = || else_case.clone().unwrap_or_else(Stmt::no_op);
    Ok(match condition.as_bool() {
        Some(true) => RewriteResult::Rewritten(then_case.clone()),
        Some(false) => RewriteResult::Rewritten(otherwise()),
        None if then_case.is_no_op() && else_case.as_ref().is_none_or(|s| s.is_no_op()) => {
            RewriteResult::Rewritten(Stmt::no_op())
        }
        None if else_case.as_ref().is_some_and(|s| s.is_no_op()) => {
            RewriteResult::Rewritten(Stmt::if_then_else(condition, then_case, None)?)
        }
        None => RewriteResult::NoMatch,
    })
}

/// An assertion that always holds is dropped. One that always fails is kept
/// so it is reported at run time.
pub fn assert_rules(stmt: &Arc<Stmt>) -> Result<RewriteResult<Stmt>> {
    match stmt.kind() {
        StmtKind::AssertStmt { condition, .. } if condition.as_bool() == Some(true) => {
            Ok(RewriteResult::Rewritten(Stmt::no_op()))
        }
        StmtKind::AssertStmt { condition, message } if condition.as_bool() == Some(false) => {
            tracing::warn!(%message, "assertion always fails");
            Ok(RewriteResult::NoMatch)
        }
        _ => Ok(RewriteResult::NoMatch),
    }
}

pub fn block_rules(stmt: &Arc<Stmt>) -> Result<RewriteResult<Stmt>> {
    let StmtKind::Block { first, rest } = stmt.kind() else {
        return Ok(RewriteResult::NoMatch);
    };
    Ok(match rest {
        None => RewriteResult::Rewritten(first.clone()),
        Some(rest) if first.is_no_op() => RewriteResult::Rewritten(rest.clone()),
        Some(rest) if rest.is_no_op() => RewriteResult::Rewritten(first.clone()),
        Some(_) => RewriteResult::NoMatch,
    })
}

/// Loops that run zero or one times, and loops with an empty body.
pub fn for_rules(stmt: &Arc<Stmt>) -> Result<RewriteResult<Stmt>> {
    let StmtKind::For { name, min, extent, body, .. } = stmt.kind() else {
        return Ok(RewriteResult::NoMatch);
    };
    if body.is_no_op() {
        return Ok(RewriteResult::Rewritten(body.clone()));
    }
    Ok(match try_const(extent).and_then(|c| c.as_i64()) {
        Some(n) if n <= 0 => RewriteResult::Rewritten(Stmt::no_op()),
        Some(1) => RewriteResult::Rewritten(Stmt::let_stmt(name.clone(), min, body)?),
        _ => RewriteResult::NoMatch,
    })
}
