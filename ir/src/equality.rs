//! Structural equality and a total order over trees.
//!
//! [`deep_compare`] orders first by node kind, then by type, then by the
//! node's own fields, then by children left to right. Names stand in for the
//! identity-bearing cells a node may carry: two variables, loads or calls
//! that name the same thing compare equal even when they hold different
//! `Parameter`/`Buffer` handles.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::node::{Expr, ExprKind, Range, Stmt, StmtKind};
use crate::types::ConstValue;

fn compare_const(a: &ConstValue, b: &ConstValue) -> Ordering {
    let rank = |c: &ConstValue| match c {
        ConstValue::Int(_) => 0,
        ConstValue::UInt(_) => 1,
        ConstValue::Float(_) => 2,
    };
    match (a, b) {
        (ConstValue::Int(x), ConstValue::Int(y)) => x.cmp(y),
        (ConstValue::UInt(x), ConstValue::UInt(y)) => x.cmp(y),
        (ConstValue::Float(x), ConstValue::Float(y)) => x.total_cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

fn compare_exprs(a: &[Arc<Expr>], b: &[Arc<Expr>]) -> Ordering {
    a.len()
        .cmp(&b.len())
        .then_with(|| a.iter().zip(b).map(|(x, y)| deep_compare(x, y)).find(|o| o.is_ne()).unwrap_or(Ordering::Equal))
}

fn compare_opt_stmt(a: &Option<Arc<Stmt>>, b: &Option<Arc<Stmt>>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => deep_compare_stmt(a, b),
    }
}

fn compare_region(a: &[Range], b: &[Range]) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| {
        a.iter()
            .zip(b)
            .map(|(x, y)| deep_compare(x.min(), y.min()).then_with(|| deep_compare(x.extent(), y.extent())))
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
    })
}

/// Total order over expression trees.
pub fn deep_compare(a: &Arc<Expr>, b: &Arc<Expr>) -> Ordering {
    if Arc::ptr_eq(a, b) {
        return Ordering::Equal;
    }
    let head = a.tag().cmp(&b.tag()).then_with(|| a.ty().cmp(&b.ty()));
    if head.is_ne() {
        return head;
    }
    match (a.kind(), b.kind()) {
        (ExprKind::Const(x), ExprKind::Const(y)) => compare_const(x, y),
        (ExprKind::StringImm(x), ExprKind::StringImm(y)) => x.cmp(y),
        (ExprKind::Cast(x), ExprKind::Cast(y)) | (ExprKind::Not(x), ExprKind::Not(y)) => deep_compare(x, y),
        (ExprKind::Variable { name: x, .. }, ExprKind::Variable { name: y, .. }) => x.cmp(y),
        (ExprKind::Binary(_, xa, xb), ExprKind::Binary(_, ya, yb)) => {
            deep_compare(xa, ya).then_with(|| deep_compare(xb, yb))
        }
        (
            ExprKind::Select { condition: xc, true_value: xt, false_value: xf },
            ExprKind::Select { condition: yc, true_value: yt, false_value: yf },
        ) => deep_compare(xc, yc).then_with(|| deep_compare(xt, yt)).then_with(|| deep_compare(xf, yf)),
        (ExprKind::Load { name: xn, index: xi, .. }, ExprKind::Load { name: yn, index: yi, .. }) => {
            xn.cmp(yn).then_with(|| deep_compare(xi, yi))
        }
        (
            ExprKind::Ramp { base: xb, stride: xs, lanes: xl },
            ExprKind::Ramp { base: yb, stride: ys, lanes: yl },
        ) => xl.cmp(yl).then_with(|| deep_compare(xb, yb)).then_with(|| deep_compare(xs, ys)),
        (ExprKind::Broadcast { value: xv, lanes: xl }, ExprKind::Broadcast { value: yv, lanes: yl }) => {
            xl.cmp(yl).then_with(|| deep_compare(xv, yv))
        }
        (
            ExprKind::Call { name: xn, args: xa, call_type: xt, value_index: xv, .. },
            ExprKind::Call { name: yn, args: ya, call_type: yt, value_index: yv, .. },
        ) => xn
            .cmp(yn)
            .then_with(|| xt.cmp(yt))
            .then_with(|| xv.cmp(yv))
            .then_with(|| compare_exprs(xa, ya)),
        (ExprKind::Let { name: xn, value: xv, body: xb }, ExprKind::Let { name: yn, value: yv, body: yb }) => {
            xn.cmp(yn).then_with(|| deep_compare(xv, yv)).then_with(|| deep_compare(xb, yb))
        }
        // Equal tags imply equal kinds.
        _ => Ordering::Equal,
    }
}

/// Total order over statement trees.
pub fn deep_compare_stmt(a: &Arc<Stmt>, b: &Arc<Stmt>) -> Ordering {
    if Arc::ptr_eq(a, b) {
        return Ordering::Equal;
    }
    let head = a.tag().cmp(&b.tag());
    if head.is_ne() {
        return head;
    }
    match (a.kind(), b.kind()) {
        (
            StmtKind::LetStmt { name: xn, value: xv, body: xb },
            StmtKind::LetStmt { name: yn, value: yv, body: yb },
        ) => xn.cmp(yn).then_with(|| deep_compare(xv, yv)).then_with(|| deep_compare_stmt(xb, yb)),
        (
            StmtKind::AssertStmt { condition: xc, message: xm },
            StmtKind::AssertStmt { condition: yc, message: ym },
        ) => xm.cmp(ym).then_with(|| deep_compare(xc, yc)),
        (
            StmtKind::Pipeline { name: xn, produce: xp, update: xu, consume: xc },
            StmtKind::Pipeline { name: yn, produce: yp, update: yu, consume: yc },
        ) => xn
            .cmp(yn)
            .then_with(|| deep_compare_stmt(xp, yp))
            .then_with(|| compare_opt_stmt(xu, yu))
            .then_with(|| deep_compare_stmt(xc, yc)),
        (
            StmtKind::For { name: xn, min: xm, extent: xe, for_type: xt, body: xb },
            StmtKind::For { name: yn, min: ym, extent: ye, for_type: yt, body: yb },
        ) => xn
            .cmp(yn)
            .then_with(|| xt.cmp(yt))
            .then_with(|| deep_compare(xm, ym))
            .then_with(|| deep_compare(xe, ye))
            .then_with(|| deep_compare_stmt(xb, yb)),
        (
            StmtKind::Store { name: xn, value: xv, index: xi },
            StmtKind::Store { name: yn, value: yv, index: yi },
        ) => xn.cmp(yn).then_with(|| deep_compare(xv, yv)).then_with(|| deep_compare(xi, yi)),
        (
            StmtKind::Provide { name: xn, values: xv, args: xa },
            StmtKind::Provide { name: yn, values: yv, args: ya },
        ) => xn.cmp(yn).then_with(|| compare_exprs(xv, yv)).then_with(|| compare_exprs(xa, ya)),
        (
            StmtKind::Allocate { name: xn, ty: xt, size: xs, body: xb },
            StmtKind::Allocate { name: yn, ty: yt, size: ys, body: yb },
        ) => xn
            .cmp(yn)
            .then_with(|| xt.cmp(yt))
            .then_with(|| deep_compare(xs, ys))
            .then_with(|| deep_compare_stmt(xb, yb)),
        (StmtKind::Free { name: x }, StmtKind::Free { name: y }) => x.cmp(y),
        (
            StmtKind::Realize { name: xn, types: xt, bounds: xr, body: xb },
            StmtKind::Realize { name: yn, types: yt, bounds: yr, body: yb },
        ) => xn
            .cmp(yn)
            .then_with(|| xt.cmp(yt))
            .then_with(|| compare_region(xr, yr))
            .then_with(|| deep_compare_stmt(xb, yb)),
        (StmtKind::Block { first: xf, rest: xr }, StmtKind::Block { first: yf, rest: yr }) => {
            deep_compare_stmt(xf, yf).then_with(|| compare_opt_stmt(xr, yr))
        }
        (
            StmtKind::IfThenElse { condition: xc, then_case: xt, else_case: xe },
            StmtKind::IfThenElse { condition: yc, then_case: yt, else_case: ye },
        ) => deep_compare(xc, yc).then_with(|| deep_compare_stmt(xt, yt)).then_with(|| compare_opt_stmt(xe, ye)),
        (StmtKind::Evaluate(x), StmtKind::Evaluate(y)) => deep_compare(x, y),
        _ => Ordering::Equal,
    }
}

/// Structural equality of two expressions.
pub fn equal(a: &Arc<Expr>, b: &Arc<Expr>) -> bool {
    deep_compare(a, b).is_eq()
}

/// Structural equality of two statements.
pub fn equal_stmt(a: &Arc<Stmt>, b: &Arc<Stmt>) -> bool {
    deep_compare_stmt(a, b).is_eq()
}

// =========================================================================
// Ordered keys
// =========================================================================

/// `Arc<Expr>` ordered and compared by structure, for `BTreeMap`/`BTreeSet`
/// keys. See [`ExprKey`](crate::ExprKey) for the identity-keyed variant.
#[derive(Debug, Clone)]
pub struct ExprDeepKey(pub Arc<Expr>);

impl PartialEq for ExprDeepKey {
    fn eq(&self, other: &Self) -> bool {
        equal(&self.0, &other.0)
    }
}

impl Eq for ExprDeepKey {}

impl PartialOrd for ExprDeepKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ExprDeepKey {
    fn cmp(&self, other: &Self) -> Ordering {
        deep_compare(&self.0, &other.0)
    }
}

#[derive(Debug, Clone)]
pub struct StmtDeepKey(pub Arc<Stmt>);

impl PartialEq for StmtDeepKey {
    fn eq(&self, other: &Self) -> bool {
        equal_stmt(&self.0, &other.0)
    }
}

impl Eq for StmtDeepKey {}

impl PartialOrd for StmtDeepKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for StmtDeepKey {
    fn cmp(&self, other: &Self) -> Ordering {
        deep_compare_stmt(&self.0, &other.0)
    }
}
