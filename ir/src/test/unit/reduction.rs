//! Reduction domains: identity, variable naming and discovery.

use std::sync::Arc;

use weft_dtype::Type;

use crate::error::Error;
use crate::node::Expr;
use crate::reduction::{ReductionDomain, ReductionVariable, find_reduction_domain};

fn bounds(n: usize) -> Vec<(Arc<Expr>, Arc<Expr>)> {
    (0..n).map(|_| (Expr::int(0), Expr::int(10))).collect()
}

#[test]
fn test_identical_domains_are_distinct() {
    let a = ReductionDomain::build(Some("r"), &bounds(2)).unwrap();
    let b = ReductionDomain::build(Some("r"), &bounds(2)).unwrap();
    assert!(!a.same_as(&b));
    assert!(a.same_as(&a));
    assert!(a.same_as(&a.clone()));
}

#[test]
fn test_variable_names() {
    let r = ReductionDomain::build(Some("sum"), &bounds(4)).unwrap();
    let names: Vec<_> = r.vars().iter().map(|v| v.var.as_str()).collect();
    assert_eq!(names, ["sum.x$r", "sum.y$r", "sum.z$r", "sum.w$r"]);
}

#[test]
fn test_build_limits() {
    assert!(matches!(ReductionDomain::build(None, &bounds(0)), Err(Error::DomainDimensions { dims: 0 })));
    assert!(matches!(ReductionDomain::build(None, &bounds(5)), Err(Error::DomainDimensions { dims: 5 })));
    assert!(ReductionDomain::new(vec![]).is_err());
}

#[test]
fn test_bounds_cast_to_int32() {
    let min = Expr::make_const(Type::Int16, 2).unwrap();
    let extent = Expr::make_const(Type::Int64, 8).unwrap();
    let r = ReductionDomain::build(None, &[(min, extent)]).unwrap();
    let v = &r.vars()[0];
    assert_eq!(v.min.ty(), Type::Int32);
    assert_eq!(v.extent.ty(), Type::Int32);
    assert!(r.name().starts_with('r'));
}

#[test]
fn test_single_var() {
    let one = ReductionDomain::build(Some("r1"), &bounds(1)).unwrap();
    let rv = one.single_var().unwrap();
    assert_eq!(rv.name(), "r1.x$r");
    assert!(rv.domain().same_as(&one));

    let two = ReductionDomain::build(Some("r2"), &bounds(2)).unwrap();
    let err = two.single_var().unwrap_err();
    let Error::MultiDimensionalDomain { rendered } = &err else { panic!("unexpected error {err}") };
    assert!(rendered.contains("r2.y$r"));
}

#[test]
fn test_var_index() {
    let r = ReductionDomain::build(Some("r"), &bounds(2)).unwrap();
    assert_eq!(r.var(1).unwrap().name(), "r.y$r");
    assert!(matches!(r.var(2), Err(Error::DomainIndex { index: 2, .. })));
}

#[test]
fn test_rvar_expression() {
    let r = ReductionDomain::build(Some("r"), &bounds(1)).unwrap();
    let e = r.single_var().unwrap().to_expr().unwrap();
    assert_eq!(e.ty(), Type::Int32);
    assert_eq!(e.var_name(), Some("r.x$r"));
}

#[test]
fn test_find_reduction_domain() {
    let r = ReductionDomain::build(Some("r"), &bounds(2)).unwrap();
    let x = r.var(0).unwrap().to_expr().unwrap();
    let y = r.var(1).unwrap().to_expr().unwrap();
    let e = x.try_add(&y).unwrap().try_mul(&Expr::int(3)).unwrap();
    let found = find_reduction_domain(&e).unwrap().unwrap();
    assert!(found.same_as(&r));

    let plain = Expr::var(Type::Int32, "x").unwrap();
    assert!(find_reduction_domain(&plain).unwrap().is_none());
}

#[test]
fn test_find_reduction_domain_rejects_two_domains() {
    let a = ReductionDomain::build(Some("a"), &bounds(1)).unwrap();
    let b = ReductionDomain::build(Some("a"), &bounds(1)).unwrap();
    let e = a.single_var().unwrap().to_expr().unwrap().try_add(&b.single_var().unwrap().to_expr().unwrap()).unwrap();
    assert!(matches!(find_reduction_domain(&e), Err(Error::MultipleDomains { .. })));
}

#[test]
fn test_explicit_variables() {
    let vars = vec![ReductionVariable { var: "k".into(), min: Expr::int(0), extent: Expr::int(3) }];
    let r = ReductionDomain::new(vars).unwrap();
    assert_eq!(r.dimensions(), 1);
    assert_eq!(r.to_string(), format!("{}[k: 0 + 3]", r.name()));
}

#[test]
fn test_explicit_bounds_must_share_a_type() {
    let extent = Expr::make_const(Type::Int64, 3).unwrap();
    let vars = vec![ReductionVariable { var: "k".into(), min: Expr::int(0), extent }];
    let err = ReductionDomain::new(vars).unwrap_err();
    assert!(matches!(err, Error::RangeTypeMismatch { min, extent } if min == Type::Int32 && extent == Type::Int64), "{err}");
}

#[test]
fn test_explicit_bounds_must_be_int32() {
    let min = Expr::make_const(Type::UInt8, 0).unwrap();
    let extent = Expr::make_const(Type::UInt8, 3).unwrap();
    let vars = vec![ReductionVariable { var: "k".into(), min, extent }];
    let err = ReductionDomain::new(vars).unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { node: "ReductionDomain", actual, .. } if actual == Type::UInt8), "{err}");
}
