//! Constant predicates shared by rewrite rules.

use std::sync::Arc;

use crate::node::Expr;
use crate::types::ConstValue;

/// Constant payload of a scalar constant or a broadcast of one.
#[inline]
pub fn try_const(expr: &Arc<Expr>) -> Option<ConstValue> {
    expr.as_const_or_broadcast()
}

/// Whether `expr` is a (broadcast) constant satisfying `predicate`.
#[inline]
pub fn const_matches<F>(expr: &Arc<Expr>, predicate: F) -> bool
where
    F: FnOnce(&ConstValue) -> bool,
{
    try_const(expr).is_some_and(|c| predicate(&c))
}

/// Signed or float `-1`.
#[inline]
pub fn is_neg_one(expr: &Arc<Expr>) -> bool {
    const_matches(expr, |c| match *c {
        ConstValue::Int(v) => v == -1,
        ConstValue::Float(v) => v == -1.0,
        ConstValue::UInt(_) => false,
    })
}

#[inline]
pub fn is_nonzero(expr: &Arc<Expr>) -> bool {
    const_matches(expr, |c| !c.is_zero())
}
