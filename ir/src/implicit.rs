//! Implicit call arguments.
//!
//! A call may list fewer arguments than the called function has dimensions
//! by including one [`CallArg::Placeholder`]. Resolution replaces the
//! placeholder with implicit Int(32) variables `_0`, `_1`, ... so that the
//! argument count matches. A definition whose right-hand side uses implicit
//! variables gets the same variables appended to its left-hand side.
//!
//! The `_N` spelling is private to this module; other passes see ordinary
//! variables.

use std::collections::BTreeSet;
use std::sync::Arc;

use snafu::ensure;
use weft_dtype::Type;

use crate::error::*;
use crate::node::{Expr, ExprKind};
use crate::visitor::{IrGraphVisitor, Visited};

/// One argument as written at a call site.
#[derive(Debug, Clone)]
pub enum CallArg {
    Expr(Arc<Expr>),
    /// Stands for as many implicit variables as the call is short of.
    Placeholder,
}

impl From<Arc<Expr>> for CallArg {
    fn from(e: Arc<Expr>) -> Self {
        Self::Expr(e)
    }
}

/// Implicit variable number `index`.
pub fn implicit_var(index: usize) -> Result<Arc<Expr>> {
    Expr::var(Type::Int32, format!("_{index}"))
}

/// Index of an implicit variable name, `None` for any other name.
pub fn implicit_index(name: &str) -> Option<usize> {
    let digits = name.strip_prefix('_')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[derive(Default)]
struct ImplicitCounter {
    visited: Visited,
    count: usize,
}

impl IrGraphVisitor for ImplicitCounter {
    fn visited(&mut self) -> &mut Visited {
        &mut self.visited
    }

    fn visit_expr(&mut self, expr: &Arc<Expr>) {
        if let ExprKind::Variable { name, .. } = expr.kind()
            && let Some(index) = implicit_index(name)
        {
            self.count = self.count.max(index + 1);
        }
        for child in expr.children() {
            self.include_expr(child);
        }
    }
}

/// Number of implicit variables `expr` needs: the highest index used plus one.
pub fn implicit_count(expr: &Arc<Expr>) -> usize {
    let mut counter = ImplicitCounter::default();
    counter.include_expr(expr);
    counter.count
}

fn placeholder_position(name: &str, args: &[CallArg]) -> Result<Option<usize>> {
    let mut positions = args.iter().enumerate().filter(|(_, a)| matches!(a, CallArg::Placeholder)).map(|(i, _)| i);
    let first = positions.next();
    ensure!(positions.next().is_none(), MultiplePlaceholdersSnafu { name });
    Ok(first)
}

/// Expand `args` of a call to `name` to exactly `dimensions` expressions.
///
/// Implicit variables are numbered after those the explicit arguments
/// already use.
pub fn expand_call_args(name: &str, args: &[CallArg], dimensions: usize) -> Result<Vec<Arc<Expr>>> {
    let placeholder = placeholder_position(name, args)?;
    let explicit: Vec<&Arc<Expr>> = args
        .iter()
        .filter_map(|a| match a {
            CallArg::Expr(e) => Some(e),
            CallArg::Placeholder => None,
        })
        .collect();
    let given = explicit.len();
    ensure!(given <= dimensions, TooManyArgumentsSnafu { name, given, dimensions });

    let Some(at) = placeholder else {
        ensure!(given == dimensions, TooFewArgumentsSnafu { name, given, dimensions });
        return Ok(explicit.into_iter().cloned().collect());
    };

    let first = explicit.iter().map(|e| implicit_count(e)).max().unwrap_or(0);
    let implicit = (first..first + dimensions - given).map(implicit_var).collect::<Result<Vec<_>>>()?;
    tracing::trace!(call = name, given, dimensions, injected = implicit.len(), "expanded implicit arguments");

    let mut out = Vec::with_capacity(dimensions);
    out.extend(explicit[..at].iter().map(|&e| e.clone()));
    out.extend(implicit);
    out.extend(explicit[at..].iter().map(|&e| e.clone()));
    Ok(out)
}

/// Left-hand side of a definition after implicit variables were appended.
#[derive(Debug, Clone)]
pub struct ExpandedDefinition {
    pub args: Vec<Arc<Expr>>,
    /// Number of implicit variables appended.
    pub implicit: usize,
    /// The right-hand sides disagree on how many implicit variables they need.
    pub ambiguous: bool,
}

/// Append the implicit variables the right-hand sides of `name` use to its
/// left-hand side `lhs`, at the placeholder or at the end.
///
/// The widest requirement wins. Disagreeing right-hand sides are flagged and
/// logged rather than rejected.
pub fn expand_definition(name: &str, lhs: &[CallArg], rhs: &[Arc<Expr>]) -> Result<ExpandedDefinition> {
    let placeholder = placeholder_position(name, lhs)?;
    let requirements: BTreeSet<usize> = rhs.iter().map(implicit_count).collect();
    let implicit = requirements.last().copied().unwrap_or(0);
    let ambiguous = requirements.len() > 1;
    if ambiguous {
        tracing::warn!(
            function = name,
            requirements = ?requirements,
            chosen = implicit,
            "right-hand sides need different numbers of implicit variables"
        );
    }

    let vars = (0..implicit).map(implicit_var).collect::<Result<Vec<_>>>()?;
    let mut args = Vec::with_capacity(lhs.len() + implicit);
    let mut vars = Some(vars);
    for arg in lhs {
        match arg {
            CallArg::Expr(e) => args.push(e.clone()),
            CallArg::Placeholder => args.extend(vars.take().into_iter().flatten()),
        }
    }
    if placeholder.is_none() {
        args.extend(vars.into_iter().flatten());
    }
    Ok(ExpandedDefinition { args, implicit, ambiguous })
}
