//! Simplifier idempotence and soundness over random trees.

use std::collections::HashMap;
use std::sync::Arc;

use proptest::prelude::*;
use weft_dtype::Type;
use weft_ir::node::eval::eval_binary_op;
use weft_ir::test::property::generators::{arb_arithmetic_type, arb_const_expr, arb_expr, arb_int_type};
use weft_ir::{ConstValue, Expr, equal, substitute_map};

use crate::symbolic::simplify_expr;

/// Value of a constant-only tree, `None` where evaluation is undefined.
fn evaluate(e: &Arc<Expr>) -> Option<ConstValue> {
    if let Some(c) = e.as_const() {
        return Some(c);
    }
    let (op, a, b) = e.as_binary()?;
    eval_binary_op(op, a.ty().element_of(), evaluate(a)?, evaluate(b)?)
}

fn bind_all(values: &[i64; 5], ty: Type) -> HashMap<String, Arc<Expr>> {
    ["a", "b", "c", "d", "e"]
        .iter()
        .zip(values)
        .map(|(name, v)| (name.to_string(), Expr::make_const(ty, *v).unwrap()))
        .collect()
}

proptest! {
    #[test]
    fn simplify_is_idempotent(e in arb_arithmetic_type().prop_flat_map(|ty| arb_expr(ty, 4))) {
        let once = simplify_expr(&e).unwrap();
        let twice = simplify_expr(&once).unwrap();
        prop_assert!(equal(&once, &twice), "{} -> {} -> {}", e, once, twice);
    }

    #[test]
    fn simplify_preserves_type(e in arb_arithmetic_type().prop_flat_map(|ty| arb_expr(ty, 4))) {
        prop_assert_eq!(simplify_expr(&e).unwrap().ty(), e.ty());
    }

    #[test]
    fn constant_trees_fold_to_their_value(e in arb_int_type().prop_flat_map(|ty| arb_const_expr(ty, 4))) {
        let out = simplify_expr(&e).unwrap();
        if let Some(expected) = evaluate(&e) {
            prop_assert_eq!(out.as_const(), Some(expected), "{} -> {}", e, out);
        }
    }

    /// Simplifying before binding the variables gives the same value as
    /// binding them first, wherever both sides evaluate.
    #[test]
    fn simplify_commutes_with_binding(
        e in arb_expr(Type::Int32, 4),
        values in [-20i64..20, -20i64..20, -20i64..20, -20i64..20, -20i64..20],
    ) {
        let env = bind_all(&values, Type::Int32);
        let direct = simplify_expr(&substitute_map(&env, &e).unwrap()).unwrap();
        let simplified_first = simplify_expr(&substitute_map(&env, &simplify_expr(&e).unwrap()).unwrap()).unwrap();
        if let (Some(x), Some(y)) = (direct.as_const(), simplified_first.as_const()) {
            prop_assert_eq!(x, y, "{} under {:?}", e, values);
        }
    }
}
