//! Dispatch and ordering in `RuleSet`.

use std::sync::Arc;

use weft_ir::{Expr, ExprTag};

use crate::symbolic::simplify::{expr_rules, stmt_rules};
use crate::symbolic::{RewriteResult, RuleSet};
use crate::test::helpers::var;

fn constant(value: i32) -> impl Fn(&Arc<Expr>) -> weft_ir::Result<RewriteResult> + Send + Sync + 'static {
    move |_| Ok(RewriteResult::Rewritten(Expr::int(value)))
}

fn rewritten(result: RewriteResult) -> Arc<Expr> {
    match result {
        RewriteResult::Rewritten(e) => e,
        RewriteResult::NoMatch => panic!("expected a rewrite"),
    }
}

#[test]
fn test_rules_only_run_for_their_tag() {
    let mut rules = RuleSet::new();
    rules.add("add", &[ExprTag::Add], constant(1));

    let add = var("x").try_add(&var("y")).unwrap();
    let sub = var("x").try_sub(&var("y")).unwrap();
    assert!(rules.rewrite(&add).unwrap().is_match());
    assert!(!rules.rewrite(&sub).unwrap().is_match());
}

#[test]
fn test_first_matching_rule_wins() {
    let mut rules = RuleSet::new();
    rules.add("never", &[ExprTag::Add], |_: &Arc<Expr>| Ok(RewriteResult::NoMatch));
    rules.add("first", &[ExprTag::Add], constant(1));
    rules.add("second", &[ExprTag::Add], constant(2));

    let add = var("x").try_add(&var("y")).unwrap();
    assert!(rewritten(rules.rewrite(&add).unwrap()).same_as(&Expr::int(1)));
}

#[test]
fn test_wildcards_run_after_indexed_rules() {
    let mut rules = RuleSet::new();
    rules.add_wildcard("any", constant(7));
    rules.add("add", &[ExprTag::Add], constant(1));

    let add = var("x").try_add(&var("y")).unwrap();
    assert!(rewritten(rules.rewrite(&add).unwrap()).same_as(&Expr::int(1)));
    assert!(rewritten(rules.rewrite(&var("x")).unwrap()).same_as(&Expr::int(7)));
}

#[test]
fn test_rule_errors_propagate() {
    let mut rules = RuleSet::new();
    rules.add("bad", &[ExprTag::Variable], |e: &Arc<Expr>| {
        // Adding a bool to an int is rejected by the constructor.
        Ok(RewriteResult::Rewritten(e.try_add(&Expr::bool_(true))?))
    });
    assert!(rules.rewrite(&var("x")).is_err());
}

#[test]
fn test_multi_tag_rule_counts_once_per_tag() {
    let mut rules: RuleSet<Expr> = RuleSet::new();
    assert!(rules.is_empty());
    rules.add("arith", &[ExprTag::Add, ExprTag::Sub, ExprTag::Mul], constant(0));
    rules.add_wildcard("any", constant(0));
    assert_eq!(rules.len(), 4);
}

#[test]
fn test_builtin_rule_sets_are_populated() {
    assert!(!expr_rules().is_empty());
    assert!(!stmt_rules().is_empty());
}
