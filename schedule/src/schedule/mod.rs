//! Per-function schedules.
//!
//! A [`Schedule`] records where a function is computed and stored, how its
//! domain is split into loops, the order and kind of those loops, its
//! storage layout and any explicit bounds. It is pure data: lowering walks
//! it to build the loop nest, nothing here executes it.
//!
//! Directives check the variable names they are given against the current
//! dimensions and fail instead of recording a schedule that cannot be
//! lowered.

pub mod level;
pub mod split;

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use itertools::Itertools;
use snafu::ensure;
use weft_dtype::Type;
use weft_ir::{Expr, ForType, ReductionDomain};

pub use level::{LoopLevel, LoopNest, ROOT};
pub use split::{Bound, Dim, Split, SplitKind};

use crate::error::*;

#[derive(Debug, Clone, Default)]
pub struct Schedule {
    store_level: LoopLevel,
    compute_level: LoopLevel,
    splits: Vec<Split>,
    /// Innermost first.
    dims: Vec<Dim>,
    /// Innermost (most tightly packed) first.
    storage_dims: Vec<String>,
    bounds: Vec<Bound>,
}

fn no_repeats(directive: &'static str, vars: &[&str]) -> Result<()> {
    let mut seen = HashSet::new();
    for var in vars {
        ensure!(seen.insert(*var), RepeatedDimensionSnafu { directive, var: *var });
    }
    Ok(())
}

/// Put the items at `positions` back onto the same set of positions, in
/// the order `positions` lists them.
fn permute<T: Clone>(items: &mut [T], mut positions: Vec<usize>) {
    let moved: Vec<T> = positions.iter().map(|&i| items[i].clone()).collect();
    positions.sort_unstable();
    for (slot, item) in positions.into_iter().zip(moved) {
        items[slot] = item;
    }
}

fn is_integer_scalar(ty: Type) -> bool {
    ty.is_scalar() && (ty.is_int() || ty.is_uint()) && !ty.is_bool()
}

impl Schedule {
    /// Schedule of a pure definition over `pure_args` (innermost first).
    /// Every loop is serial and the function is inlined.
    pub fn new(pure_args: &[impl AsRef<str>]) -> Result<Self> {
        let names: Vec<&str> = pure_args.iter().map(AsRef::as_ref).collect();
        no_repeats("schedule", &names)?;
        Ok(Self {
            dims: names.iter().map(|&n| Dim::serial(n)).collect(),
            storage_dims: names.iter().map(|n| n.to_string()).collect(),
            ..Default::default()
        })
    }

    /// Schedule of an update definition: the reduction variables are the
    /// innermost loops, the pure arguments wrap them.
    pub fn for_update(pure_args: &[impl AsRef<str>], domain: &ReductionDomain) -> Result<Self> {
        let mut schedule = Self::new(pure_args)?;
        let rvars: Vec<Dim> = domain.vars().iter().map(|rv| Dim::serial(rv.var.as_str())).collect();
        schedule.dims.splice(0..0, rvars);
        let names: Vec<&str> = schedule.dims.iter().map(|d| d.var.as_str()).collect();
        no_repeats("schedule", &names)?;
        Ok(schedule)
    }

    pub fn store_level(&self) -> &LoopLevel {
        &self.store_level
    }

    pub fn compute_level(&self) -> &LoopLevel {
        &self.compute_level
    }

    pub fn splits(&self) -> &[Split] {
        &self.splits
    }

    pub fn dims(&self) -> &[Dim] {
        &self.dims
    }

    pub fn storage_dims(&self) -> &[String] {
        &self.storage_dims
    }

    pub fn bounds(&self) -> &[Bound] {
        &self.bounds
    }

    pub fn dim(&self, var: &str) -> Option<&Dim> {
        self.dims.iter().find(|d| d.var == var)
    }

    pub fn bound_for(&self, var: &str) -> Option<&Bound> {
        self.bounds.iter().find(|b| b.var == var)
    }

    fn dim_names(&self) -> String {
        self.dims.iter().map(|d| &d.var).join(", ")
    }

    fn index_of(&self, directive: &'static str, var: &str) -> Result<usize> {
        self.dims
            .iter()
            .position(|d| d.var == var)
            .ok_or_else(|| UnknownDimensionSnafu { directive, var, available: self.dim_names() }.build())
    }

    /// `var` must not name an existing dimension, except those in `replaced`.
    fn ensure_fresh(&self, directive: &'static str, var: &str, replaced: &[&str]) -> Result<()> {
        ensure!(
            replaced.contains(&var) || self.dim(var).is_none(),
            DuplicateDimensionSnafu { directive, var }
        );
        Ok(())
    }

    // ========== Domain directives ==========

    /// Split `old` into `outer * factor + inner`. Both new loops inherit
    /// the loop type of `old`; `outer` is placed just outside `inner`.
    pub fn split(&mut self, old: &str, outer: &str, inner: &str, factor: &Arc<Expr>) -> Result<&mut Self> {
        let at = self.index_of("split", old)?;
        no_repeats("split", &[outer, inner])?;
        self.ensure_fresh("split", outer, &[old])?;
        self.ensure_fresh("split", inner, &[old])?;

        let invalid = || InvalidSplitFactorSnafu { var: old, factor: factor.to_string() };
        ensure!(is_integer_scalar(factor.ty()), invalid());
        ensure!(factor.as_int().is_none_or(|f| f > 0), invalid());
        let factor = Expr::cast_if_needed(Type::Int32, factor)?;

        tracing::debug!(directive = "split", old, outer, inner, factor = %factor, "schedule directive");
        let for_type = self.dims[at].for_type;
        self.dims[at].var = inner.to_string();
        self.dims.insert(at + 1, Dim { var: outer.to_string(), for_type });
        self.splits.push(Split {
            old_var: old.to_string(),
            outer: outer.to_string(),
            inner: Some(inner.to_string()),
            factor,
            kind: SplitKind::Split,
        });
        Ok(self)
    }

    pub fn rename(&mut self, old: &str, new: &str) -> Result<&mut Self> {
        let at = self.index_of("rename", old)?;
        self.ensure_fresh("rename", new, &[old])?;

        tracing::debug!(directive = "rename", old, new, "schedule directive");
        self.dims[at].var = new.to_string();
        self.splits.push(Split {
            old_var: old.to_string(),
            outer: new.to_string(),
            inner: None,
            factor: Expr::int(1),
            kind: SplitKind::Rename,
        });
        Ok(self)
    }

    /// Join `inner` and the loop directly outside it, `outer`, into a
    /// single loop `fused` with the loop type of `inner`.
    pub fn fuse(&mut self, inner: &str, outer: &str, fused: &str) -> Result<&mut Self> {
        let inner_at = self.index_of("fuse", inner)?;
        let outer_at = self.index_of("fuse", outer)?;
        ensure!(outer_at == inner_at + 1, NotAdjacentSnafu { inner, outer });
        self.ensure_fresh("fuse", fused, &[inner, outer])?;

        tracing::debug!(directive = "fuse", inner, outer, fused, "schedule directive");
        self.dims[inner_at].var = fused.to_string();
        self.dims.remove(outer_at);
        self.splits.push(Split {
            old_var: fused.to_string(),
            outer: outer.to_string(),
            inner: Some(inner.to_string()),
            factor: Expr::int(1),
            kind: SplitKind::Fuse,
        });
        Ok(self)
    }

    /// Reorder the named loops, innermost first, among the positions they
    /// already occupy. Loops not named keep their place.
    pub fn reorder(&mut self, vars: &[&str]) -> Result<&mut Self> {
        no_repeats("reorder", vars)?;
        let positions = vars.iter().map(|v| self.index_of("reorder", v)).collect::<Result<Vec<_>>>()?;

        tracing::debug!(directive = "reorder", vars = %vars.iter().join(", "), "schedule directive");
        permute(&mut self.dims, positions);
        Ok(self)
    }

    pub fn set_for_type(&mut self, var: &str, for_type: ForType) -> Result<&mut Self> {
        let at = self.index_of("set_for_type", var)?;
        tracing::debug!(directive = "set_for_type", var, %for_type, "schedule directive");
        self.dims[at].for_type = for_type;
        Ok(self)
    }

    pub fn parallel(&mut self, var: &str) -> Result<&mut Self> {
        self.set_for_type(var, ForType::Parallel)
    }

    pub fn vectorize(&mut self, var: &str) -> Result<&mut Self> {
        self.set_for_type(var, ForType::Vectorized)
    }

    pub fn unroll(&mut self, var: &str) -> Result<&mut Self> {
        self.set_for_type(var, ForType::Unrolled)
    }

    pub fn serial(&mut self, var: &str) -> Result<&mut Self> {
        self.set_for_type(var, ForType::Serial)
    }

    /// Bound `var` to `[min, min + extent)`. A later bound on the same
    /// variable replaces the earlier one. Both expressions are cast to
    /// Int(32).
    pub fn bound(&mut self, var: &str, min: &Arc<Expr>, extent: &Arc<Expr>) -> Result<&mut Self> {
        ensure!(
            self.dim(var).is_some() || self.storage_dims.iter().any(|s| s == var),
            UnknownDimensionSnafu { directive: "bound", var, available: self.dim_names() }
        );
        ensure!(is_integer_scalar(min.ty()), InvalidBoundSnafu { var, what: "min", ty: min.ty() });
        ensure!(is_integer_scalar(extent.ty()), InvalidBoundSnafu { var, what: "extent", ty: extent.ty() });
        let bound = Bound {
            var: var.to_string(),
            min: Expr::cast_if_needed(Type::Int32, min)?,
            extent: Expr::cast_if_needed(Type::Int32, extent)?,
        };

        tracing::debug!(directive = "bound", %bound, "schedule directive");
        match self.bounds.iter_mut().find(|b| b.var == var) {
            Some(existing) => *existing = bound,
            None => self.bounds.push(bound),
        }
        Ok(self)
    }

    // ========== Levels ==========

    /// Compute and store the function at `level`.
    pub fn compute_at(&mut self, level: LoopLevel) -> &mut Self {
        tracing::debug!(directive = "compute_at", %level, "schedule directive");
        self.store_level = level.clone();
        self.compute_level = level;
        self
    }

    /// Store the function at `level`, keeping its compute level. The
    /// level must end up at or outside the compute level, which
    /// [`Schedule::validate_levels`] checks against a concrete nest.
    pub fn store_at(&mut self, level: LoopLevel) -> &mut Self {
        tracing::debug!(directive = "store_at", %level, "schedule directive");
        self.store_level = level;
        self
    }

    pub fn compute_root(&mut self) -> &mut Self {
        self.compute_at(LoopLevel::Root)
    }

    pub fn store_root(&mut self) -> &mut Self {
        self.store_at(LoopLevel::Root)
    }

    pub fn compute_inline(&mut self) -> &mut Self {
        self.compute_at(LoopLevel::Inline)
    }

    // ========== Storage ==========

    /// Reorder the named storage dimensions, innermost first, among the
    /// positions they already occupy.
    pub fn reorder_storage(&mut self, vars: &[&str]) -> Result<&mut Self> {
        no_repeats("reorder_storage", vars)?;
        let positions = vars
            .iter()
            .map(|v| {
                self.storage_dims.iter().position(|s| s == v).ok_or_else(|| {
                    UnknownDimensionSnafu {
                        directive: "reorder_storage",
                        var: *v,
                        available: self.storage_dims.join(", "),
                    }
                    .build()
                })
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(directive = "reorder_storage", vars = %vars.iter().join(", "), "schedule directive");
        permute(&mut self.storage_dims, positions);
        Ok(self)
    }

    // ========== Checks ==========

    /// Replay the split list, in order, against the dimensions the
    /// schedule started from and return the resulting names, innermost
    /// first.
    pub fn replay_splits(&self, initial: &[impl AsRef<str>]) -> Result<Vec<String>> {
        let mut dims: Vec<String> = initial.iter().map(|s| s.as_ref().to_string()).collect();
        for split in &self.splits {
            split.apply(&mut dims)?;
        }
        Ok(dims)
    }

    /// The split list is consistent when replaying it yields the same set
    /// of names as `dims`. Reorders do not appear in the split list, so
    /// only membership is compared.
    pub fn check_splits(&self, initial: &[impl AsRef<str>]) -> Result<()> {
        let replayed = self.replay_splits(initial)?;
        let expected: HashSet<&str> = self.dims.iter().map(|d| d.var.as_str()).collect();
        let actual: HashSet<&str> = replayed.iter().map(String::as_str).collect();
        ensure!(
            replayed.len() == self.dims.len() && expected == actual,
            InconsistentSplitsSnafu { replayed: replayed.join(", "), dims: self.dim_names() }
        );
        Ok(())
    }

    /// Check the store and compute levels against the loop nest the
    /// function will be realized in. Both levels must occur in the nest
    /// and storage must be at or outside compute. Inline functions have
    /// no storage of their own and are always accepted.
    pub fn validate_levels(&self, nest: &LoopNest) -> Result<()> {
        if self.compute_level.is_inline() {
            return Ok(());
        }
        let position = |level: &LoopLevel| {
            nest.position(level)
                .ok_or_else(|| LevelNotInNestSnafu { level: level.to_string(), nest: nest.to_string() }.build())
        };
        let compute = position(&self.compute_level)?;
        let store = position(&self.store_level)?;
        ensure!(
            store <= compute,
            StoreInsideComputeSnafu { store: self.store_level.to_string(), compute: self.compute_level.to_string() }
        );
        Ok(())
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = |l: &LoopLevel| if l.is_inline() { "inline".to_string() } else { l.to_string() };
        writeln!(f, "compute: {}, store: {}", level(&self.compute_level), level(&self.store_level))?;
        if !self.splits.is_empty() {
            writeln!(f, "splits: {}", self.splits.iter().join("; "))?;
        }
        writeln!(f, "dims: {}", self.dims.iter().join(", "))?;
        write!(f, "storage: {}", self.storage_dims.iter().join(", "))?;
        if !self.bounds.is_empty() {
            write!(f, "\nbounds: {}", self.bounds.iter().join(", "))?;
        }
        Ok(())
    }
}
