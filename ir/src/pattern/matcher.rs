use std::sync::Arc;

use super::{ANY, Bindings, is_wildcard};
use crate::equality::equal;
use crate::node::{Expr, ExprKind, Range, Stmt, StmtKind};

/// Match `expr` against `pattern`.
pub fn expr_match(pattern: &Arc<Expr>, expr: &Arc<Expr>) -> Option<Bindings> {
    let mut bindings = Bindings::default();
    match_expr(pattern, expr, &mut bindings).then_some(bindings)
}

/// Match `stmt` against `pattern`. Wildcards appear in the expressions of
/// the pattern; statement fields other than children must agree exactly.
pub fn stmt_match(pattern: &Arc<Stmt>, stmt: &Arc<Stmt>) -> Option<Bindings> {
    let mut bindings = Bindings::default();
    match_stmt(pattern, stmt, &mut bindings).then_some(bindings)
}

fn match_all(p: &[Arc<Expr>], e: &[Arc<Expr>], b: &mut Bindings) -> bool {
    p.len() == e.len() && p.iter().zip(e).all(|(p, e)| match_expr(p, e, b))
}

fn match_opt(p: &Option<Arc<Stmt>>, s: &Option<Arc<Stmt>>, b: &mut Bindings) -> bool {
    match (p, s) {
        (None, None) => true,
        (Some(p), Some(s)) => match_stmt(p, s, b),
        _ => false,
    }
}

fn match_region(p: &[Range], r: &[Range], b: &mut Bindings) -> bool {
    p.len() == r.len()
        && p.iter().zip(r).all(|(p, r)| match_expr(p.min(), r.min(), b) && match_expr(p.extent(), r.extent(), b))
}

fn match_expr(pattern: &Arc<Expr>, expr: &Arc<Expr>, b: &mut Bindings) -> bool {
    if let ExprKind::Variable { name, .. } = pattern.kind()
        && is_wildcard(name)
    {
        if pattern.ty() != expr.ty() {
            return false;
        }
        if name == ANY {
            return true;
        }
        return match b.get(name) {
            Some(bound) => equal(bound, expr),
            None => {
                b.insert(name, expr);
                true
            }
        };
    }

    if pattern.tag() != expr.tag() || pattern.ty() != expr.ty() {
        return false;
    }

    match (pattern.kind(), expr.kind()) {
        (ExprKind::Const(p), ExprKind::Const(e)) => p == e,
        (ExprKind::StringImm(p), ExprKind::StringImm(e)) => p == e,
        (ExprKind::Cast(p), ExprKind::Cast(e)) | (ExprKind::Not(p), ExprKind::Not(e)) => match_expr(p, e, b),
        (ExprKind::Variable { name: p, .. }, ExprKind::Variable { name: e, .. }) => p == e,
        (ExprKind::Binary(_, pa, pb), ExprKind::Binary(_, ea, eb)) => match_expr(pa, ea, b) && match_expr(pb, eb, b),
        (
            ExprKind::Select { condition: pc, true_value: pt, false_value: pf },
            ExprKind::Select { condition: ec, true_value: et, false_value: ef },
        ) => match_expr(pc, ec, b) && match_expr(pt, et, b) && match_expr(pf, ef, b),
        (ExprKind::Load { name: pn, index: pi, .. }, ExprKind::Load { name: en, index: ei, .. }) => {
            pn == en && match_expr(pi, ei, b)
        }
        (ExprKind::Ramp { base: pb, stride: ps, .. }, ExprKind::Ramp { base: eb, stride: es, .. }) => {
            match_expr(pb, eb, b) && match_expr(ps, es, b)
        }
        (ExprKind::Broadcast { value: p, .. }, ExprKind::Broadcast { value: e, .. }) => match_expr(p, e, b),
        (
            ExprKind::Call { name: pn, args: pa, call_type: pt, value_index: pv, .. },
            ExprKind::Call { name: en, args: ea, call_type: et, value_index: ev, .. },
        ) => pn == en && pt == et && pv == ev && match_all(pa, ea, b),
        (ExprKind::Let { name: pn, value: pv, body: pb }, ExprKind::Let { name: en, value: ev, body: eb }) => {
            pn == en && match_expr(pv, ev, b) && match_expr(pb, eb, b)
        }
        _ => false,
    }
}

fn match_stmt(pattern: &Arc<Stmt>, stmt: &Arc<Stmt>, b: &mut Bindings) -> bool {
    if pattern.tag() != stmt.tag() {
        return false;
    }
    match (pattern.kind(), stmt.kind()) {
        (
            StmtKind::LetStmt { name: pn, value: pv, body: pb },
            StmtKind::LetStmt { name: sn, value: sv, body: sb },
        ) => pn == sn && match_expr(pv, sv, b) && match_stmt(pb, sb, b),
        (
            StmtKind::AssertStmt { condition: pc, message: pm },
            StmtKind::AssertStmt { condition: sc, message: sm },
        ) => pm == sm && match_expr(pc, sc, b),
        (
            StmtKind::Pipeline { name: pn, produce: pp, update: pu, consume: pc },
            StmtKind::Pipeline { name: sn, produce: sp, update: su, consume: sc },
        ) => pn == sn && match_stmt(pp, sp, b) && match_opt(pu, su, b) && match_stmt(pc, sc, b),
        (
            StmtKind::For { name: pn, min: pm, extent: pe, for_type: pt, body: pb },
            StmtKind::For { name: sn, min: sm, extent: se, for_type: st, body: sb },
        ) => pn == sn && pt == st && match_expr(pm, sm, b) && match_expr(pe, se, b) && match_stmt(pb, sb, b),
        (
            StmtKind::Store { name: pn, value: pv, index: pi },
            StmtKind::Store { name: sn, value: sv, index: si },
        ) => pn == sn && match_expr(pv, sv, b) && match_expr(pi, si, b),
        (
            StmtKind::Provide { name: pn, values: pv, args: pa },
            StmtKind::Provide { name: sn, values: sv, args: sa },
        ) => pn == sn && match_all(pv, sv, b) && match_all(pa, sa, b),
        (
            StmtKind::Allocate { name: pn, ty: pt, size: ps, body: pb },
            StmtKind::Allocate { name: sn, ty: st, size: ss, body: sb },
        ) => pn == sn && pt == st && match_expr(ps, ss, b) && match_stmt(pb, sb, b),
        (StmtKind::Free { name: p }, StmtKind::Free { name: s }) => p == s,
        (
            StmtKind::Realize { name: pn, types: pt, bounds: pr, body: pb },
            StmtKind::Realize { name: sn, types: st, bounds: sr, body: sb },
        ) => pn == sn && pt == st && match_region(pr, sr, b) && match_stmt(pb, sb, b),
        (StmtKind::Block { first: pf, rest: pr }, StmtKind::Block { first: sf, rest: sr }) => {
            match_stmt(pf, sf, b) && match_opt(pr, sr, b)
        }
        (
            StmtKind::IfThenElse { condition: pc, then_case: pt, else_case: pe },
            StmtKind::IfThenElse { condition: sc, then_case: st, else_case: se },
        ) => match_expr(pc, sc, b) && match_stmt(pt, st, b) && match_opt(pe, se, b),
        (StmtKind::Evaluate(p), StmtKind::Evaluate(s)) => match_expr(p, s, b),
        _ => false,
    }
}
