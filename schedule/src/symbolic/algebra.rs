//! Algebraic identities written as native matches.
//!
//! Rules that move constants, drop identity elements, collapse absorbing
//! elements and merge constant chains. Rules that reassociate or cancel only
//! fire on integer operands, where they are exact.

use std::sync::Arc;

use weft_dtype::Type;
use weft_ir::equality::equal;
use weft_ir::node::eval::eval_binary_op;
use weft_ir::pattern::try_const;
use weft_ir::{BinaryOp, ConstValue, Expr, ExprKind, Result};

use super::rules::RewriteResult;

fn is_integer(ty: Type) -> bool {
    (ty.is_int() || ty.is_uint()) && !ty.is_bool()
}

fn rewritten(expr: Arc<Expr>) -> Result<RewriteResult> {
    Ok(RewriteResult::Rewritten(expr))
}

const fn mirror(op: BinaryOp) -> BinaryOp {
    match op {
        BinaryOp::LT => BinaryOp::GT,
        BinaryOp::LE => BinaryOp::GE,
        BinaryOp::GT => BinaryOp::LT,
        BinaryOp::GE => BinaryOp::LE,
        other => other,
    }
}

const fn negate(op: BinaryOp) -> Option<BinaryOp> {
    Some(match op {
        BinaryOp::EQ => BinaryOp::NE,
        BinaryOp::NE => BinaryOp::EQ,
        BinaryOp::LT => BinaryOp::GE,
        BinaryOp::LE => BinaryOp::GT,
        BinaryOp::GT => BinaryOp::LE,
        BinaryOp::GE => BinaryOp::LT,
        _ => return None,
    })
}

/// Evaluate `c1 op c2` into a constant node of type `ty`, if defined.
fn fold_pair(op: BinaryOp, ty: Type, c1: ConstValue, c2: ConstValue) -> Result<Option<Arc<Expr>>> {
    match eval_binary_op(op, ty.element_of(), c1, c2) {
        Some(v) => Ok(Some(Expr::make_const_value(op.result_type(ty), v)?)),
        None => Ok(None),
    }
}

/// `c op x` becomes `x op c` (comparisons are mirrored), so later rules only
/// look for constants on the right.
pub fn constant_to_right(expr: &Arc<Expr>) -> Result<RewriteResult> {
    let Some((op, a, b)) = expr.as_binary() else {
        return Ok(RewriteResult::NoMatch);
    };
    if try_const(a).is_none() || try_const(b).is_some() {
        return Ok(RewriteResult::NoMatch);
    }
    if op.is_comparison() {
        return rewritten(Expr::binary(mirror(op), b, a)?);
    }
    if op.is_commutative() {
        return rewritten(Expr::binary(op, b, a)?);
    }
    Ok(RewriteResult::NoMatch)
}

pub fn add_rules(expr: &Arc<Expr>) -> Result<RewriteResult> {
    let Some((BinaryOp::Add, a, b)) = expr.as_binary() else {
        return Ok(RewriteResult::NoMatch);
    };
    if b.is_zero() {
        return rewritten(a.clone());
    }
    // (x + c1) + c2
    if is_integer(expr.ty())
        && let Some(c2) = try_const(b)
        && let Some((BinaryOp::Add, x, c1)) = a.as_binary()
        && let Some(c1) = try_const(c1)
        && let Some(c) = fold_pair(BinaryOp::Add, expr.ty(), c1, c2)?
    {
        return rewritten(x.try_add(&c)?);
    }
    Ok(RewriteResult::NoMatch)
}

pub fn sub_rules(expr: &Arc<Expr>) -> Result<RewriteResult> {
    let Some((BinaryOp::Sub, a, b)) = expr.as_binary() else {
        return Ok(RewriteResult::NoMatch);
    };
    if b.is_zero() {
        return rewritten(a.clone());
    }
    // (x + c1) - c2
    if is_integer(expr.ty())
        && let Some(c2) = try_const(b)
        && let Some((BinaryOp::Add, x, c1)) = a.as_binary()
        && let Some(c1) = try_const(c1)
        && let Some(c) = fold_pair(BinaryOp::Sub, expr.ty(), c1, c2)?
    {
        return rewritten(x.try_add(&c)?);
    }
    Ok(RewriteResult::NoMatch)
}

pub fn mul_rules(expr: &Arc<Expr>) -> Result<RewriteResult> {
    let Some((BinaryOp::Mul, a, b)) = expr.as_binary() else {
        return Ok(RewriteResult::NoMatch);
    };
    if b.is_one() {
        return rewritten(a.clone());
    }
    if !is_integer(expr.ty()) {
        return Ok(RewriteResult::NoMatch);
    }
    if b.is_zero() {
        return rewritten(b.clone());
    }
    // (x * c1) * c2
    if let Some(c2) = try_const(b)
        && let Some((BinaryOp::Mul, x, c1)) = a.as_binary()
        && let Some(c1) = try_const(c1)
        && let Some(c) = fold_pair(BinaryOp::Mul, expr.ty(), c1, c2)?
    {
        return rewritten(x.try_mul(&c)?);
    }
    Ok(RewriteResult::NoMatch)
}

pub fn div_mod_rules(expr: &Arc<Expr>) -> Result<RewriteResult> {
    match expr.as_binary() {
        Some((BinaryOp::Div, a, b)) if b.is_one() => rewritten(a.clone()),
        Some((BinaryOp::Mod, _, b)) if b.is_one() && is_integer(expr.ty()) => rewritten(Expr::make_zero(expr.ty())?),
        _ => Ok(RewriteResult::NoMatch),
    }
}

/// Bounds of an integer type, `None` where they do not fit an `i64`.
fn int_bounds(ty: Type) -> Option<(i64, i64)> {
    let ty = ty.element_of();
    if !is_integer(ty) {
        return None;
    }
    Some((ty.imin().ok()?, ty.imax().ok()?))
}

fn const_int(expr: &Arc<Expr>) -> Option<i64> {
    try_const(expr).and_then(|c| c.as_i64())
}

pub fn min_max_rules(expr: &Arc<Expr>) -> Result<RewriteResult> {
    let Some((op @ (BinaryOp::Min | BinaryOp::Max), a, b)) = expr.as_binary() else {
        return Ok(RewriteResult::NoMatch);
    };
    // Against the type bounds one side always wins.
    if let (Some((lo, hi)), Some(c)) = (int_bounds(expr.ty()), const_int(b)) {
        match op {
            BinaryOp::Min if c == hi => return rewritten(a.clone()),
            BinaryOp::Min if c == lo => return rewritten(b.clone()),
            BinaryOp::Max if c == lo => return rewritten(a.clone()),
            BinaryOp::Max if c == hi => return rewritten(b.clone()),
            _ => {}
        }
    }
    // min(min(x, c1), c2)
    if is_integer(expr.ty())
        && let Some(c2) = try_const(b)
        && let Some((inner, x, c1)) = a.as_binary()
        && inner == op
        && let Some(c1) = try_const(c1)
        && let Some(c) = fold_pair(op, expr.ty(), c1, c2)?
    {
        return rewritten(Expr::binary(op, x, &c)?);
    }
    Ok(RewriteResult::NoMatch)
}

/// Comparisons decided by the type bounds of the left operand.
pub fn comparison_rules(expr: &Arc<Expr>) -> Result<RewriteResult> {
    let Some((op, a, b)) = expr.as_binary() else {
        return Ok(RewriteResult::NoMatch);
    };
    let (Some((lo, hi)), Some(c)) = (int_bounds(a.ty()), const_int(b)) else {
        return Ok(RewriteResult::NoMatch);
    };
    let lanes = expr.ty().lanes();
    let decided = match op {
        BinaryOp::LE if c == hi => Some(true),
        BinaryOp::GT if c == hi => Some(false),
        BinaryOp::GE if c == lo => Some(true),
        BinaryOp::LT if c == lo => Some(false),
        _ => None,
    };
    Ok(match decided {
        Some(true) => RewriteResult::Rewritten(Expr::const_true(lanes)),
        Some(false) => RewriteResult::Rewritten(Expr::const_false(lanes)),
        None => RewriteResult::NoMatch,
    })
}

pub fn logical_rules(expr: &Arc<Expr>) -> Result<RewriteResult> {
    match expr.as_binary() {
        Some((BinaryOp::And, a, b)) if b.is_const_true() => rewritten(a.clone()),
        Some((BinaryOp::And, _, b)) if b.is_const_false() => rewritten(b.clone()),
        Some((BinaryOp::Or, a, b)) if b.is_const_false() => rewritten(a.clone()),
        Some((BinaryOp::Or, _, b)) if b.is_const_true() => rewritten(b.clone()),
        _ => Ok(RewriteResult::NoMatch),
    }
}

/// `!!x` and `!(a < b)` for non-float operands.
pub fn not_rules(expr: &Arc<Expr>) -> Result<RewriteResult> {
    let ExprKind::Not(value) = expr.kind() else {
        return Ok(RewriteResult::NoMatch);
    };
    if let ExprKind::Not(inner) = value.kind() {
        return rewritten(inner.clone());
    }
    if let Some((op, a, b)) = value.as_binary()
        && !a.ty().is_float()
        && let Some(negated) = negate(op)
    {
        return rewritten(Expr::binary(negated, a, b)?);
    }
    Ok(RewriteResult::NoMatch)
}

pub fn cast_rules(expr: &Arc<Expr>) -> Result<RewriteResult> {
    match expr.kind() {
        ExprKind::Cast(value) if value.ty() == expr.ty() => rewritten(value.clone()),
        _ => Ok(RewriteResult::NoMatch),
    }
}

/// `select(c, x, x)` and `select(!c, a, b)`.
pub fn select_rules(expr: &Arc<Expr>) -> Result<RewriteResult> {
    let ExprKind::Select { condition, true_value, false_value } = expr.kind() else {
        return Ok(RewriteResult::NoMatch);
    };
    if equal(true_value, false_value) {
        return rewritten(true_value.clone());
    }
    if let ExprKind::Not(inner) = condition.kind() {
        return rewritten(Expr::select(inner, false_value, true_value)?);
    }
    Ok(RewriteResult::NoMatch)
}
