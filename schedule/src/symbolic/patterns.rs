//! Rules written as wildcard patterns.
//!
//! These rules recognize repeated subterms (`x - x`, `(a - b) + b`,
//! `min(x, x)`), which the pattern matcher checks with structural equality.
//! Wildcards are typed, so each pattern is built for one operand type. The
//! built patterns are cached per (node kind, operand type).

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use parking_lot::Mutex;
use weft_dtype::Type;
use weft_ir::pattern::{Bindings, expr_match, wildcard};
use weft_ir::{BinaryOp, Expr, ExprTag, Result};

use super::rules::RewriteResult;

type Rewrite = fn(&Bindings, Type) -> Result<Option<Arc<Expr>>>;

pub struct PatternRule {
    pub name: &'static str,
    pub pattern: Arc<Expr>,
    rewrite: Rewrite,
}

impl std::fmt::Debug for PatternRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} : {}", self.name, self.pattern)
    }
}

type Cache = HashMap<(ExprTag, Type), Arc<[PatternRule]>>;

static CACHE: LazyLock<Mutex<Cache>> = LazyLock::new(|| Mutex::new(HashMap::new()));

fn bound(b: &Bindings, name: &str) -> Option<Arc<Expr>> {
    b.get(name).cloned()
}

fn take_x(b: &Bindings, _: Type) -> Result<Option<Arc<Expr>>> {
    Ok(bound(b, "x*"))
}

fn take_a(b: &Bindings, _: Type) -> Result<Option<Arc<Expr>>> {
    Ok(bound(b, "a*"))
}

fn take_b(b: &Bindings, _: Type) -> Result<Option<Arc<Expr>>> {
    Ok(bound(b, "b*"))
}

fn zero(_: &Bindings, ty: Type) -> Result<Option<Arc<Expr>>> {
    Expr::make_zero(ty).map(Some)
}

fn always_true(_: &Bindings, ty: Type) -> Result<Option<Arc<Expr>>> {
    Ok(Some(Expr::const_true(ty.lanes())))
}

fn always_false(_: &Bindings, ty: Type) -> Result<Option<Arc<Expr>>> {
    Ok(Some(Expr::const_false(ty.lanes())))
}

fn is_integer(ty: Type) -> bool {
    (ty.is_int() || ty.is_uint()) && !ty.is_bool()
}

/// Build the patterns for a binary node of kind `tag` over operands of type
/// `ty`.
fn build(tag: ExprTag, ty: Type) -> Result<Vec<PatternRule>> {
    let x = wildcard(ty, "x*")?;
    let a = wildcard(ty, "a*")?;
    let b = wildcard(ty, "b*")?;
    let int = is_integer(ty.element_of());

    let rule = |name: &'static str, pattern: Arc<Expr>, rewrite: Rewrite| PatternRule { name, pattern, rewrite };
    let mut rules = Vec::new();
    match tag {
        ExprTag::Add if int => {
            rules.push(rule("(a - b) + b", a.try_sub(&b)?.try_add(&b)?, take_a));
            rules.push(rule("b + (a - b)", b.try_add(&a.try_sub(&b)?)?, take_a));
        }
        ExprTag::Sub if int => {
            rules.push(rule("x - x", x.try_sub(&x)?, zero));
            rules.push(rule("(a + b) - b", a.try_add(&b)?.try_sub(&b)?, take_a));
            rules.push(rule("(a + b) - a", a.try_add(&b)?.try_sub(&a)?, take_b));
        }
        ExprTag::Min | ExprTag::Max => {
            let op = if tag == ExprTag::Min { BinaryOp::Min } else { BinaryOp::Max };
            let dual = if tag == ExprTag::Min { BinaryOp::Max } else { BinaryOp::Min };
            let (same, absorb) = if tag == ExprTag::Min {
                ("min(x, x)", "min(x, max(x, b))")
            } else {
                ("max(x, x)", "max(x, min(x, b))")
            };
            rules.push(rule(same, Expr::binary(op, &x, &x)?, take_x));
            if int {
                let absorbed = Expr::binary(op, &x, &Expr::binary(dual, &x, &b)?)?;
                rules.push(rule(absorb, absorbed, take_x));
            }
        }
        ExprTag::EQ | ExprTag::LE | ExprTag::GE if int => {
            let op = match tag {
                ExprTag::EQ => BinaryOp::EQ,
                ExprTag::LE => BinaryOp::LE,
                _ => BinaryOp::GE,
            };
            rules.push(rule("x == x", Expr::binary(op, &x, &x)?, always_true));
        }
        ExprTag::NE | ExprTag::LT | ExprTag::GT if int => {
            let op = match tag {
                ExprTag::NE => BinaryOp::NE,
                ExprTag::LT => BinaryOp::LT,
                _ => BinaryOp::GT,
            };
            rules.push(rule("x != x", Expr::binary(op, &x, &x)?, always_false));
        }
        ExprTag::And if ty.is_bool() => rules.push(rule("x && x", x.try_and(&x)?, take_x)),
        ExprTag::Or if ty.is_bool() => rules.push(rule("x || x", x.try_or(&x)?, take_x)),
        _ => {}
    }
    Ok(rules)
}

/// Patterns for `tag` over operand type `ty`, built on first use.
pub fn patterns_for(tag: ExprTag, ty: Type) -> Result<Arc<[PatternRule]>> {
    let mut cache = CACHE.lock();
    if let Some(rules) = cache.get(&(tag, ty)) {
        return Ok(rules.clone());
    }
    let rules: Arc<[PatternRule]> = build(tag, ty)?.into();
    tracing::trace!(node.kind = %tag, %ty, count = rules.len(), "built pattern rules");
    cache.insert((tag, ty), rules.clone());
    Ok(rules)
}

/// Try the cached patterns for a binary node.
pub fn pattern_rules(expr: &Arc<Expr>) -> Result<RewriteResult> {
    let Some((_, a, _)) = expr.as_binary() else {
        return Ok(RewriteResult::NoMatch);
    };
    for rule in patterns_for(expr.tag(), a.ty())?.iter() {
        if let Some(bindings) = expr_match(&rule.pattern, expr)
            && let Some(out) = (rule.rewrite)(&bindings, expr.ty())?
        {
            tracing::trace!(rule = rule.name, "pattern matched");
            return Ok(RewriteResult::Rewritten(out));
        }
    }
    Ok(RewriteResult::NoMatch)
}
