//! Variable substitution and let shadowing.

use std::collections::HashMap;
use std::sync::Arc;

use weft_dtype::Type;

use crate::equality::{equal, equal_stmt};
use crate::node::{Expr, Stmt};
use crate::substitute::{substitute, substitute_map, substitute_stmt};

fn var(name: &str) -> Arc<Expr> {
    Expr::var(Type::Int32, name).unwrap()
}

#[test]
fn test_replaces_free_occurrences() {
    let e = var("x").try_mul(&var("x")).unwrap();
    let out = substitute("x", &Expr::int(3), &e).unwrap();
    assert!(equal(&out, &Expr::int(3).try_mul(&Expr::int(3)).unwrap()));
}

#[test]
fn test_untouched_tree_is_reused() {
    let e = var("y").try_add(&Expr::int(1)).unwrap();
    let out = substitute("x", &Expr::int(3), &e).unwrap();
    assert!(out.same_as(&e));
}

#[test]
fn test_let_shadows_body_but_not_value() {
    // let x = x + 1 in x * 2
    let value = var("x").try_add(&Expr::int(1)).unwrap();
    let body = var("x").try_mul(&Expr::int(2)).unwrap();
    let e = Expr::let_("x", &value, &body).unwrap();

    let out = substitute("x", &var("z"), &e).unwrap();
    let expected = Expr::let_("x", &var("z").try_add(&Expr::int(1)).unwrap(), &body).unwrap();
    assert!(equal(&out, &expected));
}

#[test]
fn test_shadowing_ends_with_the_let() {
    let inner = Expr::let_("x", &Expr::int(0), &var("x")).unwrap();
    let e = inner.try_add(&var("x")).unwrap();
    let out = substitute("x", &Expr::int(7), &e).unwrap();
    let expected = inner.try_add(&Expr::int(7)).unwrap();
    assert!(equal(&out, &expected));
}

#[test]
fn test_batch_form_is_simultaneous() {
    // x -> y, y -> x swaps rather than collapsing.
    let e = var("x").try_sub(&var("y")).unwrap();
    let map = HashMap::from([("x".to_string(), var("y")), ("y".to_string(), var("x"))]);
    let out = substitute_map(&map, &e).unwrap();
    assert!(equal(&out, &var("y").try_sub(&var("x")).unwrap()));
}

#[test]
fn test_statement_substitution() {
    let store = Stmt::store("out", &Expr::float(1.0), &var("i")).unwrap();
    let shadowed = Stmt::let_stmt("i", &var("i"), &store).unwrap();
    let s = Stmt::block(&store, Some(&shadowed));

    let out = substitute_stmt("i", &Expr::int(4), &s).unwrap();
    let store4 = Stmt::store("out", &Expr::float(1.0), &Expr::int(4)).unwrap();
    let expected = Stmt::block(&store4, Some(&Stmt::let_stmt("i", &Expr::int(4), &store).unwrap()));
    assert!(equal_stmt(&out, &expected));
}

#[test]
fn test_type_errors_propagate() {
    let e = var("x").try_add(&Expr::int(1)).unwrap();
    assert!(substitute("x", &Expr::float(1.0), &e).is_err());
}
