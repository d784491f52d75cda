//! Rules for `Ramp` and `Broadcast`.

use std::sync::Arc;

use weft_ir::{BinaryOp, Expr, ExprKind, Result};

use super::rules::RewriteResult;

/// A ramp that does not move is a broadcast.
pub fn zero_stride_ramp(expr: &Arc<Expr>) -> Result<RewriteResult> {
    match expr.kind() {
        ExprKind::Ramp { base, stride, lanes } if stride.is_zero() => {
            Ok(RewriteResult::Rewritten(Expr::broadcast(base, *lanes)?))
        }
        _ => Ok(RewriteResult::NoMatch),
    }
}

fn as_broadcast(expr: &Arc<Expr>) -> Option<&Arc<Expr>> {
    match expr.kind() {
        ExprKind::Broadcast { value, .. } => Some(value),
        _ => None,
    }
}

fn as_ramp(expr: &Arc<Expr>) -> Option<(&Arc<Expr>, &Arc<Expr>, u16)> {
    match expr.kind() {
        ExprKind::Ramp { base, stride, lanes } => Some((base, stride, *lanes)),
        _ => None,
    }
}

/// `x(a) op x(b)` is computed once on scalars and broadcast.
pub fn broadcast_binary(expr: &Arc<Expr>) -> Result<RewriteResult> {
    let Some((op, a, b)) = expr.as_binary() else {
        return Ok(RewriteResult::NoMatch);
    };
    let (Some(va), Some(vb)) = (as_broadcast(a), as_broadcast(b)) else {
        return Ok(RewriteResult::NoMatch);
    };
    let scalar = Expr::binary(op, va, vb)?;
    Ok(RewriteResult::Rewritten(Expr::broadcast(&scalar, expr.ty().lanes())?))
}

pub fn broadcast_not(expr: &Arc<Expr>) -> Result<RewriteResult> {
    if let ExprKind::Not(value) = expr.kind()
        && let Some(inner) = as_broadcast(value)
    {
        return Ok(RewriteResult::Rewritten(Expr::broadcast(&inner.try_not()?, expr.ty().lanes())?));
    }
    Ok(RewriteResult::NoMatch)
}

/// Arithmetic on integer ramps stays a ramp.
///
/// `ramp(b, s) + x(c)` is `ramp(b + c, s)`, the sum of two ramps adds bases
/// and strides, and scaling a ramp scales both.
pub fn ramp_arithmetic(expr: &Arc<Expr>) -> Result<RewriteResult> {
    let Some((op, a, b)) = expr.as_binary() else {
        return Ok(RewriteResult::NoMatch);
    };
    let elem = expr.ty().element_of();
    if !(elem.is_int() || elem.is_uint()) || elem.is_bool() {
        return Ok(RewriteResult::NoMatch);
    }

    // Broadcast on the left of a commutative op goes right.
    if matches!(op, BinaryOp::Add | BinaryOp::Mul) && as_broadcast(a).is_some() && as_ramp(b).is_some() {
        return Ok(RewriteResult::Rewritten(Expr::binary(op, b, a)?));
    }

    let Some((base, stride, lanes)) = as_ramp(a) else {
        return Ok(RewriteResult::NoMatch);
    };
    let result = match (op, as_broadcast(b), as_ramp(b)) {
        (BinaryOp::Add, Some(c), _) => Expr::ramp(&base.try_add(c)?, stride, lanes)?,
        (BinaryOp::Sub, Some(c), _) => Expr::ramp(&base.try_sub(c)?, stride, lanes)?,
        (BinaryOp::Mul, Some(c), _) => Expr::ramp(&base.try_mul(c)?, &stride.try_mul(c)?, lanes)?,
        (BinaryOp::Add, None, Some((b2, s2, _))) => Expr::ramp(&base.try_add(b2)?, &stride.try_add(s2)?, lanes)?,
        (BinaryOp::Sub, None, Some((b2, s2, _))) => Expr::ramp(&base.try_sub(b2)?, &stride.try_sub(s2)?, lanes)?,
        _ => return Ok(RewriteResult::NoMatch),
    };
    Ok(RewriteResult::Rewritten(result))
}
