//! Generators for property-based testing.
//!
//! Strategies for constants, operators and well-typed expression trees.
//! Every generated tree went through the validating constructors.

use std::sync::Arc;

use proptest::prelude::*;
use weft_dtype::Type;

use crate::node::Expr;
use crate::types::{BinaryOp, ConstValue};

// ============================================================================
// Types
// ============================================================================

/// Scalar types the constant folder handles.
pub fn arb_arithmetic_type() -> impl Strategy<Value = Type> {
    prop_oneof![
        4 => Just(Type::Int32),
        1 => Just(Type::Int8),
        1 => Just(Type::Int16),
        1 => Just(Type::Int64),
        1 => Just(Type::UInt8),
        1 => Just(Type::UInt16),
        1 => Just(Type::UInt32),
        2 => Just(Type::Float32),
        1 => Just(Type::Float64),
    ]
}

pub fn arb_int_type() -> impl Strategy<Value = Type> {
    prop_oneof![Just(Type::Int8), Just(Type::Int16), Just(Type::Int32), Just(Type::Int64)]
}

// ============================================================================
// Operators
// ============================================================================

/// Arithmetic operator, weighted towards the common ones.
pub fn arb_arithmetic_op() -> impl Strategy<Value = BinaryOp> {
    prop_oneof![
        5 => Just(BinaryOp::Add),
        4 => Just(BinaryOp::Sub),
        4 => Just(BinaryOp::Mul),
        2 => Just(BinaryOp::Div),
        2 => Just(BinaryOp::Mod),
        3 => Just(BinaryOp::Min),
        3 => Just(BinaryOp::Max),
    ]
}

pub fn arb_comparison_op() -> impl Strategy<Value = BinaryOp> {
    prop_oneof![
        Just(BinaryOp::EQ),
        Just(BinaryOp::NE),
        Just(BinaryOp::LT),
        Just(BinaryOp::LE),
        Just(BinaryOp::GT),
        Just(BinaryOp::GE),
    ]
}

// ============================================================================
// Leaves
// ============================================================================

/// Small constant of scalar type `ty`.
pub fn arb_const(ty: Type) -> impl Strategy<Value = Arc<Expr>> {
    let lo = if ty.is_uint() { 0 } else { -20i64 };
    (lo..=20i64).prop_filter_map("constant must fit", move |v| Expr::make_const(ty, v).ok())
}

/// Variable of type `ty` named `a` to `e`.
pub fn arb_var(ty: Type) -> impl Strategy<Value = Arc<Expr>> {
    "[a-e]".prop_filter_map("valid variable", move |name| Expr::var(ty, name).ok())
}

pub fn arb_leaf(ty: Type) -> impl Strategy<Value = Arc<Expr>> {
    prop_oneof![arb_const(ty), arb_var(ty)]
}

/// Payload that fits scalar type `ty`.
pub fn arb_const_value(ty: Type) -> impl Strategy<Value = ConstValue> {
    arb_const(ty).prop_filter_map("scalar constant", |e| e.as_const())
}

// ============================================================================
// Trees
// ============================================================================

/// Expression of type `ty` up to `depth` levels deep, built from
/// arithmetic, `select` and comparisons.
pub fn arb_expr(ty: Type, depth: u32) -> impl Strategy<Value = Arc<Expr>> {
    arb_leaf(ty).prop_recursive(depth, depth * 6, 3, move |inner| {
        prop_oneof![
            4 => (arb_arithmetic_op(), inner.clone(), inner.clone())
                .prop_filter_map("well-typed binary", |(op, a, b)| Expr::binary(op, &a, &b).ok()),
            1 => (arb_comparison_op(), inner.clone(), inner.clone(), inner.clone(), inner)
                .prop_filter_map("well-typed select", |(op, a, b, t, f)| {
                    let cond = Expr::binary(op, &a, &b).ok()?;
                    Expr::select(&cond, &t, &f).ok()
                }),
        ]
    })
}

/// Integer expression over constants only, so it can be evaluated directly.
pub fn arb_const_expr(ty: Type, depth: u32) -> impl Strategy<Value = Arc<Expr>> {
    arb_const(ty).prop_recursive(depth, depth * 4, 2, move |inner| {
        (arb_arithmetic_op(), inner.clone(), inner)
            .prop_filter_map("well-typed binary", |(op, a, b)| Expr::binary(op, &a, &b).ok())
    })
}
