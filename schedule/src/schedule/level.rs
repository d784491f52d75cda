//! Loop levels and loop nests.
//!
//! Loops are named `func.var`, where `var` may itself contain dots once a
//! dimension has been split (`f.x.xi`). A [`LoopLevel`] names one such
//! loop, or one of the two sentinels: [`LoopLevel::Root`] (outside every
//! loop) and [`LoopLevel::Inline`] (no loop at all, fused into the caller).

use std::fmt;

use itertools::Itertools;
use smallvec::SmallVec;

use super::Schedule;
use crate::error::*;

/// Textual name of the root sentinel.
pub const ROOT: &str = "<root>";

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum LoopLevel {
    #[default]
    Inline,
    Root,
    At { func: String, var: String },
}

impl LoopLevel {
    pub fn at(func: impl Into<String>, var: impl Into<String>) -> Self {
        Self::At { func: func.into(), var: var.into() }
    }

    /// Parse the textual form: `""` is inline, `"<root>"` is root, anything
    /// else is split at the first dot into function and variable.
    pub fn parse(text: &str) -> Result<Self> {
        match text {
            "" => Ok(Self::Inline),
            ROOT => Ok(Self::Root),
            _ => match text.split_once('.') {
                Some((func, var)) if !func.is_empty() && !var.is_empty() => Ok(Self::at(func, var)),
                _ => InvalidLoopLevelSnafu { text }.fail(),
            },
        }
    }

    pub fn is_inline(&self) -> bool {
        matches!(self, Self::Inline)
    }

    pub fn is_root(&self) -> bool {
        matches!(self, Self::Root)
    }

    /// Whether the loop called `loop_name` is this level.
    ///
    /// The loop must belong to the same function and end with the
    /// variable, so `f.x` matches the loop `f.s0.x` and `f.xi` matches
    /// `f.x.xi`.
    pub fn matches_loop(&self, loop_name: &str) -> bool {
        match self {
            Self::Inline => false,
            Self::Root => loop_name == ROOT,
            Self::At { func, var } => loop_name
                .strip_prefix(func.as_str())
                .and_then(|rest| rest.strip_prefix('.'))
                .is_some_and(|rest| rest == var || rest.ends_with(&format!(".{var}"))),
        }
    }

    /// Whether two levels name the same nesting point, tolerating a split
    /// suffix on either side.
    pub fn matches(&self, other: &LoopLevel) -> bool {
        match (self, other) {
            (Self::Inline, Self::Inline) | (Self::Root, Self::Root) => true,
            (Self::At { func: f1, var: v1 }, Self::At { func: f2, var: v2 }) => {
                f1 == f2 && (v1 == v2 || v1.ends_with(&format!(".{v2}")) || v2.ends_with(&format!(".{v1}")))
            }
            _ => false,
        }
    }
}

impl fmt::Display for LoopLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inline => Ok(()),
            Self::Root => f.write_str(ROOT),
            Self::At { func, var } => write!(f, "{func}.{var}"),
        }
    }
}

/// Names of the loops enclosing some point, outermost first. The first
/// entry is always [`ROOT`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopNest {
    loops: SmallVec<[String; 8]>,
}

impl Default for LoopNest {
    fn default() -> Self {
        Self::new()
    }
}

impl LoopNest {
    /// The nest holding only the root sentinel.
    pub fn new() -> Self {
        let mut loops = SmallVec::new();
        loops.push(ROOT.to_string());
        Self { loops }
    }

    /// The loops `func` will be computed in, from its schedule.
    pub fn for_function(func: &str, schedule: &Schedule) -> Self {
        let mut nest = Self::new();
        nest.enter(func, schedule);
        nest
    }

    /// Nest the loops of `func` inside the current innermost loop.
    pub fn enter(&mut self, func: &str, schedule: &Schedule) {
        self.loops.extend(schedule.dims().iter().rev().map(|d| format!("{func}.{}", d.var)));
    }

    pub fn push(&mut self, loop_name: impl Into<String>) {
        self.loops.push(loop_name.into());
    }

    pub fn loops(&self) -> &[String] {
        &self.loops
    }

    pub fn len(&self) -> usize {
        self.loops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loops.is_empty()
    }

    /// Depth of `level` in the nest, 0 being root. Inline levels have no
    /// position.
    pub fn position(&self, level: &LoopLevel) -> Option<usize> {
        self.loops.iter().position(|name| level.matches_loop(name))
    }
}

impl fmt::Display for LoopNest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.loops.iter().join(", "))
    }
}
