//! Bottom-up rebuilding of trees.
//!
//! An [`IrMutator`] returns a replacement for every node it is given. The
//! default rebuilds a node from its mutated children and returns the original
//! handle when no child changed, so untouched subtrees keep their identity
//! and sharing.

use std::sync::Arc;

use crate::error::Result;
use crate::node::{Expr, ExprKind, Range, Stmt, StmtKind};

pub trait IrMutator {
    fn mutate_expr(&mut self, expr: &Arc<Expr>) -> Result<Arc<Expr>> {
        mutate_expr_children(self, expr)
    }

    fn mutate_stmt(&mut self, stmt: &Arc<Stmt>) -> Result<Arc<Stmt>> {
        mutate_stmt_children(self, stmt)
    }
}

fn mutate_opt<M: IrMutator + ?Sized>(m: &mut M, stmt: &Option<Arc<Stmt>>) -> Result<Option<Arc<Stmt>>> {
    stmt.as_ref().map(|s| m.mutate_stmt(s)).transpose()
}

fn same_opt(a: &Option<Arc<Stmt>>, b: &Option<Arc<Stmt>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

fn same_all(a: &[Arc<Expr>], b: &[Arc<Expr>]) -> bool {
    a.iter().zip(b).all(|(a, b)| Arc::ptr_eq(a, b))
}

/// Rebuild `expr` from mutated children, reusing it when nothing changed.
pub fn mutate_expr_children<M: IrMutator + ?Sized>(m: &mut M, expr: &Arc<Expr>) -> Result<Arc<Expr>> {
    Ok(match expr.kind() {
        ExprKind::Const(_) | ExprKind::StringImm(_) | ExprKind::Variable { .. } => expr.clone(),
        ExprKind::Cast(value) => {
            let new = m.mutate_expr(value)?;
            if Arc::ptr_eq(&new, value) { expr.clone() } else { Expr::cast(expr.ty(), &new)? }
        }
        ExprKind::Not(value) => {
            let new = m.mutate_expr(value)?;
            if Arc::ptr_eq(&new, value) { expr.clone() } else { new.try_not()? }
        }
        ExprKind::Binary(op, a, b) => {
            let (na, nb) = (m.mutate_expr(a)?, m.mutate_expr(b)?);
            if Arc::ptr_eq(&na, a) && Arc::ptr_eq(&nb, b) { expr.clone() } else { Expr::binary(*op, &na, &nb)? }
        }
        ExprKind::Select { condition, true_value, false_value } => {
            let nc = m.mutate_expr(condition)?;
            let nt = m.mutate_expr(true_value)?;
            let nf = m.mutate_expr(false_value)?;
            if Arc::ptr_eq(&nc, condition) && Arc::ptr_eq(&nt, true_value) && Arc::ptr_eq(&nf, false_value) {
                expr.clone()
            } else {
                Expr::select(&nc, &nt, &nf)?
            }
        }
        ExprKind::Load { name, index, image, param } => {
            let new = m.mutate_expr(index)?;
            if Arc::ptr_eq(&new, index) {
                expr.clone()
            } else {
                Expr::load(expr.ty(), name.clone(), &new, image.clone(), param.clone())?
            }
        }
        ExprKind::Ramp { base, stride, lanes } => {
            let (nb, ns) = (m.mutate_expr(base)?, m.mutate_expr(stride)?);
            if Arc::ptr_eq(&nb, base) && Arc::ptr_eq(&ns, stride) { expr.clone() } else { Expr::ramp(&nb, &ns, *lanes)? }
        }
        ExprKind::Broadcast { value, lanes } => {
            let new = m.mutate_expr(value)?;
            if Arc::ptr_eq(&new, value) { expr.clone() } else { Expr::broadcast(&new, *lanes)? }
        }
        ExprKind::Call { name, args, call_type, value_index, image, param } => {
            let new_args = args.iter().map(|a| m.mutate_expr(a)).collect::<Result<Vec<_>>>()?;
            if same_all(&new_args, args) {
                expr.clone()
            } else {
                Expr::call()
                    .ty(expr.ty())
                    .name(name.clone())
                    .args(new_args)
                    .call_type(*call_type)
                    .value_index(*value_index)
                    .maybe_image(image.clone())
                    .maybe_param(param.clone())
                    .build()?
            }
        }
        ExprKind::Let { name, value, body } => {
            let (nv, nb) = (m.mutate_expr(value)?, m.mutate_expr(body)?);
            if Arc::ptr_eq(&nv, value) && Arc::ptr_eq(&nb, body) { expr.clone() } else { Expr::let_(name.clone(), &nv, &nb)? }
        }
    })
}

/// Rebuild `stmt` from mutated children, reusing it when nothing changed.
pub fn mutate_stmt_children<M: IrMutator + ?Sized>(m: &mut M, stmt: &Arc<Stmt>) -> Result<Arc<Stmt>> {
    Ok(match stmt.kind() {
        StmtKind::LetStmt { name, value, body } => {
            let (nv, nb) = (m.mutate_expr(value)?, m.mutate_stmt(body)?);
            if Arc::ptr_eq(&nv, value) && Arc::ptr_eq(&nb, body) {
                stmt.clone()
            } else {
                Stmt::let_stmt(name.clone(), &nv, &nb)?
            }
        }
        StmtKind::AssertStmt { condition, message } => {
            let new = m.mutate_expr(condition)?;
            if Arc::ptr_eq(&new, condition) { stmt.clone() } else { Stmt::assert(&new, message.clone())? }
        }
        StmtKind::Pipeline { name, produce, update, consume } => {
            let np = m.mutate_stmt(produce)?;
            let nu = mutate_opt(m, update)?;
            let nc = m.mutate_stmt(consume)?;
            if Arc::ptr_eq(&np, produce) && same_opt(&nu, update) && Arc::ptr_eq(&nc, consume) {
                stmt.clone()
            } else {
                Stmt::pipeline(name.clone(), &np, nu.as_ref(), &nc)
            }
        }
        StmtKind::For { name, min, extent, for_type, body } => {
            let nm = m.mutate_expr(min)?;
            let ne = m.mutate_expr(extent)?;
            let nb = m.mutate_stmt(body)?;
            if Arc::ptr_eq(&nm, min) && Arc::ptr_eq(&ne, extent) && Arc::ptr_eq(&nb, body) {
                stmt.clone()
            } else {
                Stmt::for_(name.clone(), &nm, &ne, *for_type, &nb)?
            }
        }
        StmtKind::Store { name, value, index } => {
            let (nv, ni) = (m.mutate_expr(value)?, m.mutate_expr(index)?);
            if Arc::ptr_eq(&nv, value) && Arc::ptr_eq(&ni, index) {
                stmt.clone()
            } else {
                Stmt::store(name.clone(), &nv, &ni)?
            }
        }
        StmtKind::Provide { name, values, args } => {
            let nv = values.iter().map(|e| m.mutate_expr(e)).collect::<Result<Vec<_>>>()?;
            let na = args.iter().map(|e| m.mutate_expr(e)).collect::<Result<Vec<_>>>()?;
            if same_all(&nv, values) && same_all(&na, args) { stmt.clone() } else { Stmt::provide(name.clone(), nv, na)? }
        }
        StmtKind::Allocate { name, ty, size, body } => {
            let (ns, nb) = (m.mutate_expr(size)?, m.mutate_stmt(body)?);
            if Arc::ptr_eq(&ns, size) && Arc::ptr_eq(&nb, body) {
                stmt.clone()
            } else {
                Stmt::allocate(name.clone(), *ty, &ns, &nb)?
            }
        }
        StmtKind::Free { .. } => stmt.clone(),
        StmtKind::Realize { name, types, bounds, body } => {
            let mut changed = false;
            let mut new_bounds = Vec::with_capacity(bounds.len());
            for range in bounds {
                let nm = m.mutate_expr(range.min())?;
                let ne = m.mutate_expr(range.extent())?;
                changed |= !Arc::ptr_eq(&nm, range.min()) || !Arc::ptr_eq(&ne, range.extent());
                new_bounds.push(Range::new(nm, ne)?);
            }
            let nb = m.mutate_stmt(body)?;
            if !changed && Arc::ptr_eq(&nb, body) {
                stmt.clone()
            } else {
                Stmt::realize(name.clone(), types.clone(), new_bounds, &nb)?
            }
        }
        StmtKind::Block { first, rest } => {
            let nf = m.mutate_stmt(first)?;
            let nr = mutate_opt(m, rest)?;
            if Arc::ptr_eq(&nf, first) && same_opt(&nr, rest) { stmt.clone() } else { Stmt::block(&nf, nr.as_ref()) }
        }
        StmtKind::IfThenElse { condition, then_case, else_case } => {
            let nc = m.mutate_expr(condition)?;
            let nt = m.mutate_stmt(then_case)?;
            let ne = mutate_opt(m, else_case)?;
            if Arc::ptr_eq(&nc, condition) && Arc::ptr_eq(&nt, then_case) && same_opt(&ne, else_case) {
                stmt.clone()
            } else {
                Stmt::if_then_else(&nc, &nt, ne.as_ref())?
            }
        }
        StmtKind::Evaluate(value) => {
            let new = m.mutate_expr(value)?;
            if Arc::ptr_eq(&new, value) { stmt.clone() } else { Stmt::evaluate(&new) }
        }
    })
}
