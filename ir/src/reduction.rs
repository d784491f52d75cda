//! Reduction domains.
//!
//! A [`ReductionDomain`] is an ordered list of iteration variables shared by
//! every expression of one reduction. Identity matters: two domains with the
//! same bounds are still different domains.

use std::fmt;
use std::sync::Arc;

use snafu::ensure;
use weft_dtype::Type;

use crate::error::*;
use crate::names::unique_name;
use crate::node::{Expr, ExprKind};
use crate::visitor::{IrGraphVisitor, Visited};

/// Largest number of dimensions a reduction domain may have.
pub const MAX_DOMAIN_DIMS: usize = 4;

const AXIS_NAMES: [&str; MAX_DOMAIN_DIMS] = ["x", "y", "z", "w"];

/// One iteration variable of a reduction domain, `[min, min + extent)`.
#[derive(Debug, Clone)]
pub struct ReductionVariable {
    pub var: String,
    pub min: Arc<Expr>,
    pub extent: Arc<Expr>,
}

#[derive(Debug)]
struct DomainContents {
    name: String,
    vars: Vec<ReductionVariable>,
}

/// Shared, identity-compared set of reduction variables, innermost first.
#[derive(Debug, Clone)]
pub struct ReductionDomain(Arc<DomainContents>);

impl ReductionDomain {
    /// Domain over `vars`. The domain name is freshly generated.
    ///
    /// Every bound must be Int(32); use [`ReductionDomain::build`] to cast.
    pub fn new(vars: Vec<ReductionVariable>) -> Result<Self> {
        Self::named(unique_name('r'), vars)
    }

    fn named(name: String, vars: Vec<ReductionVariable>) -> Result<Self> {
        ensure!(!vars.is_empty(), EmptySnafu { node: "ReductionDomain", what: "variable list" });
        ensure!(vars.len() <= MAX_DOMAIN_DIMS, DomainDimensionsSnafu { dims: vars.len() });
        for v in &vars {
            ensure!(v.min.ty() == v.extent.ty(), RangeTypeMismatchSnafu { min: v.min.ty(), extent: v.extent.ty() });
            ensure!(
                v.min.ty() == Type::Int32,
                TypeMismatchSnafu { node: "ReductionDomain", expected: Type::Int32, actual: v.min.ty() }
            );
        }
        Ok(Self(Arc::new(DomainContents { name, vars })))
    }

    /// Domain with one variable per `(min, extent)` pair, named
    /// `{name}.x$r`, `{name}.y$r`, ... Bounds are cast to Int(32).
    pub fn build(name: Option<&str>, bounds: &[(Arc<Expr>, Arc<Expr>)]) -> Result<Self> {
        ensure!(
            (1..=MAX_DOMAIN_DIMS).contains(&bounds.len()),
            DomainDimensionsSnafu { dims: bounds.len() }
        );
        let name = match name {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => unique_name('r'),
        };
        let vars = bounds
            .iter()
            .zip(AXIS_NAMES)
            .map(|((min, extent), axis)| {
                Ok(ReductionVariable {
                    var: format!("{name}.{axis}$r"),
                    min: Expr::cast_if_needed(Type::Int32, min)?,
                    extent: Expr::cast_if_needed(Type::Int32, extent)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        tracing::trace!(domain = %name, dims = vars.len(), "new reduction domain");
        Self::named(name, vars)
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn same_as(&self, other: &ReductionDomain) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn vars(&self) -> &[ReductionVariable] {
        &self.0.vars
    }

    pub fn dimensions(&self) -> usize {
        self.0.vars.len()
    }

    /// Variable `index` of this domain.
    pub fn var(&self, index: usize) -> Result<RVar> {
        ensure!(index < self.dimensions(), DomainIndexSnafu { rendered: self.to_string(), index });
        Ok(RVar { domain: self.clone(), index })
    }

    /// The only variable of a one-dimensional domain.
    pub fn single_var(&self) -> Result<RVar> {
        ensure!(self.dimensions() == 1, MultiDimensionalDomainSnafu { rendered: self.to_string() });
        Ok(RVar { domain: self.clone(), index: 0 })
    }
}

impl fmt::Display for ReductionDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[", self.0.name)?;
        for (i, v) in self.0.vars.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {} + {}", v.var, v.min, v.extent)?;
        }
        write!(f, "]")
    }
}

/// Handle to one variable of a reduction domain.
#[derive(Debug, Clone)]
pub struct RVar {
    domain: ReductionDomain,
    index: usize,
}

impl RVar {
    fn variable(&self) -> &ReductionVariable {
        &self.domain.0.vars[self.index]
    }

    pub fn domain(&self) -> &ReductionDomain {
        &self.domain
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.variable().var
    }

    pub fn min(&self) -> &Arc<Expr> {
        &self.variable().min
    }

    pub fn extent(&self) -> &Arc<Expr> {
        &self.variable().extent
    }

    /// Int(32) variable iterating over this dimension.
    pub fn to_expr(&self) -> Result<Arc<Expr>> {
        Expr::domain_var(self.name(), &self.domain)
    }
}

// =========================================================================
// Domain discovery
// =========================================================================

#[derive(Default)]
struct DomainFinder {
    visited: Visited,
    found: Option<ReductionDomain>,
    conflict: Option<ReductionDomain>,
}

impl IrGraphVisitor for DomainFinder {
    fn visited(&mut self) -> &mut Visited {
        &mut self.visited
    }

    fn visit_expr(&mut self, expr: &Arc<Expr>) {
        if let ExprKind::Variable { domain: Some(domain), .. } = expr.kind() {
            match &self.found {
                None => self.found = Some(domain.clone()),
                Some(found) if !found.same_as(domain) && self.conflict.is_none() => {
                    self.conflict = Some(domain.clone());
                }
                Some(_) => {}
            }
        }
        for child in expr.children() {
            self.include_expr(child);
        }
    }
}

/// The reduction domain `expr` iterates over, if any.
///
/// Fails when the expression refers to more than one domain.
pub fn find_reduction_domain(expr: &Arc<Expr>) -> Result<Option<ReductionDomain>> {
    let mut finder = DomainFinder::default();
    finder.include_expr(expr);
    if let (Some(first), Some(second)) = (&finder.found, &finder.conflict) {
        return MultipleDomainsSnafu { first: first.to_string(), second: second.to_string() }.fail();
    }
    Ok(finder.found)
}
