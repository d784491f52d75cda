//! Structural equality and ordering laws over random trees.

use std::collections::HashMap;

use proptest::prelude::*;
use weft_dtype::Type;

use super::generators::{arb_arithmetic_type, arb_expr};
use crate::equality::{deep_compare, equal};
use crate::mutator::IrMutator;
use crate::pattern::expr_match;
use crate::substitute::substitute_map;

/// Rebuilds every node, producing a structurally equal tree of fresh nodes.
struct Rebuild;

impl IrMutator for Rebuild {}

proptest! {
    #[test]
    fn equality_is_reflexive(e in arb_expr(Type::Int32, 4)) {
        prop_assert!(equal(&e, &e));
    }

    #[test]
    fn ordering_is_antisymmetric(
        (a, b) in arb_arithmetic_type().prop_flat_map(|ty| (arb_expr(ty, 3), arb_expr(ty, 3)))
    ) {
        prop_assert_eq!(deep_compare(&a, &b), deep_compare(&b, &a).reverse());
    }

    #[test]
    fn identity_mutator_keeps_node(e in arb_expr(Type::Float32, 4)) {
        let out = Rebuild.mutate_expr(&e).unwrap();
        prop_assert!(out.same_as(&e));
    }

    #[test]
    fn tree_matches_itself(e in arb_expr(Type::Int16, 3)) {
        let bindings = expr_match(&e, &e);
        prop_assert!(bindings.is_some_and(|b| b.is_empty()));
    }

    #[test]
    fn empty_substitution_is_identity(e in arb_expr(Type::Int32, 3)) {
        let out = substitute_map(&HashMap::new(), &e).unwrap();
        prop_assert!(out.same_as(&e));
    }
}
