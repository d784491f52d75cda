//! Splits, dimensions and bounds, and replaying splits.

use std::fmt;
use std::sync::Arc;

use weft_ir::{Expr, ForType};

use crate::error::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum SplitKind {
    /// `old_var` becomes `outer * factor + inner`.
    Split,
    /// `old_var` is renamed to `outer`; there is no inner variable and the
    /// factor is one.
    Rename,
    /// The inverse of a split: `outer` and `inner` are joined into
    /// `old_var`.
    Fuse,
}

/// One entry of a schedule's split list.
#[derive(Debug, Clone)]
pub struct Split {
    pub old_var: String,
    pub outer: String,
    pub inner: Option<String>,
    pub factor: Arc<Expr>,
    pub kind: SplitKind,
}

impl Split {
    pub fn is_split(&self) -> bool {
        self.kind == SplitKind::Split
    }

    pub fn is_rename(&self) -> bool {
        self.kind == SplitKind::Rename
    }

    pub fn is_fuse(&self) -> bool {
        self.kind == SplitKind::Fuse
    }

    /// Apply this split to a dimension list (innermost first).
    pub(crate) fn apply(&self, dims: &mut Vec<String>) -> Result<()> {
        let find = |dims: &[String], var: &str| {
            dims.iter().position(|d| d == var).ok_or_else(|| {
                UnknownDimensionSnafu { directive: "replay", var, available: dims.join(", ") }.build()
            })
        };
        match (self.kind, &self.inner) {
            (SplitKind::Split, Some(inner)) => {
                let at = find(dims, &self.old_var)?;
                dims[at] = inner.clone();
                dims.insert(at + 1, self.outer.clone());
            }
            (SplitKind::Rename, _) => {
                let at = find(dims, &self.old_var)?;
                dims[at] = self.outer.clone();
            }
            (SplitKind::Fuse, Some(inner)) => {
                let at = find(dims, inner)?;
                let outer = find(dims, &self.outer)?;
                dims[at] = self.old_var.clone();
                dims.remove(outer);
            }
            (_, None) => return MalformedSplitSnafu { split: self.to_string() }.fail(),
        }
        Ok(())
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.as_deref().unwrap_or("");
        match self.kind {
            SplitKind::Split => write!(f, "split {} into {}, {} by {}", self.old_var, self.outer, inner, self.factor),
            SplitKind::Rename => write!(f, "rename {} to {}", self.old_var, self.outer),
            SplitKind::Fuse => write!(f, "fuse {}, {} into {}", inner, self.outer, self.old_var),
        }
    }
}

/// One loop of the final nest.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Dim {
    pub var: String,
    pub for_type: ForType,
}

impl Dim {
    pub fn serial(var: impl Into<String>) -> Self {
        Self { var: var.into(), for_type: ForType::Serial }
    }
}

impl fmt::Display for Dim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.var, self.for_type)
    }
}

/// Explicit bound `[min, min + extent)` on a pure dimension.
#[derive(Debug, Clone)]
pub struct Bound {
    pub var: String,
    pub min: Arc<Expr>,
    pub extent: Arc<Expr>,
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in [{}, {} + {})", self.var, self.min, self.min, self.extent)
    }
}
