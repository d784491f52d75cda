//! Constant folding.
//!
//! Folds operators whose operands are all constants (or broadcasts of
//! constants) by evaluating them at the operand type. When evaluation is
//! undefined, such as division by zero or a signed result that does not fit
//! the type, the node is left alone.

use std::sync::Arc;

use weft_ir::node::eval::{eval_binary_op, eval_not};
use weft_ir::pattern::try_const;
use weft_ir::{Expr, ExprKind, Result};

use super::rules::RewriteResult;

pub fn fold_binary(expr: &Arc<Expr>) -> Result<RewriteResult> {
    let Some((op, a, b)) = expr.as_binary() else {
        return Ok(RewriteResult::NoMatch);
    };
    let (Some(ca), Some(cb)) = (try_const(a), try_const(b)) else {
        return Ok(RewriteResult::NoMatch);
    };
    let Some(value) = eval_binary_op(op, a.ty().element_of(), ca, cb) else {
        return Ok(RewriteResult::NoMatch);
    };
    Ok(RewriteResult::Rewritten(Expr::make_const_value(expr.ty(), value)?))
}

pub fn fold_not(expr: &Arc<Expr>) -> Result<RewriteResult> {
    let ExprKind::Not(value) = expr.kind() else {
        return Ok(RewriteResult::NoMatch);
    };
    match try_const(value).and_then(eval_not) {
        Some(c) => Ok(RewriteResult::Rewritten(Expr::make_const_value(expr.ty(), c)?)),
        None => Ok(RewriteResult::NoMatch),
    }
}

pub fn fold_cast(expr: &Arc<Expr>) -> Result<RewriteResult> {
    let ExprKind::Cast(value) = expr.kind() else {
        return Ok(RewriteResult::NoMatch);
    };
    match try_const(value).and_then(|c| c.cast(expr.ty().element_of())) {
        Some(c) => Ok(RewriteResult::Rewritten(Expr::make_const_value(expr.ty(), c)?)),
        None => Ok(RewriteResult::NoMatch),
    }
}

/// `select` with a constant condition picks a branch.
pub fn fold_select(expr: &Arc<Expr>) -> Result<RewriteResult> {
    let ExprKind::Select { condition, true_value, false_value } = expr.kind() else {
        return Ok(RewriteResult::NoMatch);
    };
    Ok(match try_const(condition) {
        Some(c) if c.is_zero() => RewriteResult::Rewritten(false_value.clone()),
        Some(_) => RewriteResult::Rewritten(true_value.clone()),
        None => RewriteResult::NoMatch,
    })
}
