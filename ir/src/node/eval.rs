//! Constant evaluation.
//!
//! Evaluates operators on [`ConstValue`] payloads at a given operand type.
//! Integer division and modulo round toward negative infinity, so the
//! remainder takes the sign of the divisor.

use weft_dtype::{Type, TypeKind};

use crate::types::{BinaryOp, ConstValue};

/// Floor division. `None` on division by zero or overflow.
///
/// The numerator is biased by one toward zero when the operand signs differ,
/// then the truncating quotient is moved down by one.
pub fn div_imp(a: i64, b: i64) -> Option<i64> {
    if b == 0 {
        return None;
    }
    let post = if a != 0 && (a ^ b) < 0 { -1 } else { 0 };
    let pre = if a < 0 { -post } else { post };
    let q = a.checked_add(pre)?.checked_div(b)?;
    q.checked_add(post)
}

/// Floor modulo: `a - b * div_imp(a, b)`, with the sign of `b`.
pub fn mod_imp(a: i64, b: i64) -> Option<i64> {
    let rem = a.checked_rem(b)?;
    Some(if rem != 0 && (rem ^ b) < 0 { rem + b } else { rem })
}

/// Float modulo rebuilt from `floor`, so the result has the sign of `b`.
pub fn mod_imp_f64(a: f64, b: f64) -> f64 {
    a - b * (a / b).floor()
}

/// Evaluate `a op b` where both payloads have type `ty`.
///
/// Returns `None` when the result is undefined (division by zero), when a
/// signed result does not fit `ty`, or when the type is not folded (half
/// floats, handles). Unsigned arithmetic wraps at the type width.
pub fn eval_binary_op(op: BinaryOp, ty: Type, a: ConstValue, b: ConstValue) -> Option<ConstValue> {
    // Half-float payloads are stored unrounded.
    if ty.kind() == TypeKind::Float && ty.bits() <= 16 {
        return None;
    }
    if op.is_comparison() {
        return eval_comparison(op, a, b).map(|r| ConstValue::UInt(r as u64));
    }
    match (a, b) {
        (ConstValue::Int(a), ConstValue::Int(b)) => {
            let r = eval_int(op, a, b)?;
            ty.can_represent_int(r).then_some(ConstValue::Int(r))
        }
        (ConstValue::UInt(a), ConstValue::UInt(b)) => ConstValue::UInt(eval_uint(op, a, b)?).cast(ty.element_of()),
        (ConstValue::Float(a), ConstValue::Float(b)) if ty.kind() == TypeKind::Float => {
            ConstValue::Float(eval_float(op, a, b)?).cast(ty.element_of())
        }
        _ => None,
    }
}

fn eval_int(op: BinaryOp, a: i64, b: i64) -> Option<i64> {
    match op {
        BinaryOp::Add => a.checked_add(b),
        BinaryOp::Sub => a.checked_sub(b),
        BinaryOp::Mul => a.checked_mul(b),
        BinaryOp::Div => div_imp(a, b),
        BinaryOp::Mod => mod_imp(a, b),
        BinaryOp::Min => Some(a.min(b)),
        BinaryOp::Max => Some(a.max(b)),
        _ => None,
    }
}

fn eval_uint(op: BinaryOp, a: u64, b: u64) -> Option<u64> {
    match op {
        BinaryOp::Add => Some(a.wrapping_add(b)),
        BinaryOp::Sub => Some(a.wrapping_sub(b)),
        BinaryOp::Mul => Some(a.wrapping_mul(b)),
        BinaryOp::Div => a.checked_div(b),
        BinaryOp::Mod => a.checked_rem(b),
        BinaryOp::Min => Some(a.min(b)),
        BinaryOp::Max => Some(a.max(b)),
        BinaryOp::And => Some(((a != 0) && (b != 0)) as u64),
        BinaryOp::Or => Some(((a != 0) || (b != 0)) as u64),
        _ => None,
    }
}

fn eval_float(op: BinaryOp, a: f64, b: f64) -> Option<f64> {
    match op {
        BinaryOp::Add => Some(a + b),
        BinaryOp::Sub => Some(a - b),
        BinaryOp::Mul => Some(a * b),
        BinaryOp::Div if b != 0.0 => Some(a / b),
        BinaryOp::Mod if b != 0.0 => Some(mod_imp_f64(a, b)),
        BinaryOp::Min => Some(a.min(b)),
        BinaryOp::Max => Some(a.max(b)),
        _ => None,
    }
}

fn eval_comparison(op: BinaryOp, a: ConstValue, b: ConstValue) -> Option<bool> {
    use std::cmp::Ordering;

    let ord = match (a, b) {
        (ConstValue::Int(a), ConstValue::Int(b)) => a.cmp(&b),
        (ConstValue::UInt(a), ConstValue::UInt(b)) => a.cmp(&b),
        (ConstValue::Float(a), ConstValue::Float(b)) => {
            // NaN compares false against everything except through NE
            match a.partial_cmp(&b) {
                Some(o) => o,
                None => return Some(op == BinaryOp::NE),
            }
        }
        _ => return None,
    };
    Some(match op {
        BinaryOp::EQ => ord == Ordering::Equal,
        BinaryOp::NE => ord != Ordering::Equal,
        BinaryOp::LT => ord == Ordering::Less,
        BinaryOp::LE => ord != Ordering::Greater,
        BinaryOp::GT => ord == Ordering::Greater,
        BinaryOp::GE => ord != Ordering::Less,
        _ => return None,
    })
}

/// Logical negation of a boolean payload.
pub fn eval_not(v: ConstValue) -> Option<ConstValue> {
    match v {
        ConstValue::UInt(v) => Some(ConstValue::UInt((v == 0) as u64)),
        _ => None,
    }
}
