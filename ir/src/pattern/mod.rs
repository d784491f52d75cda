//! Wildcard matching of expression and statement trees.
//!
//! A pattern is an ordinary tree in which some variables are wildcards:
//!
//! - a variable named `*` matches any subexpression and binds nothing;
//! - a variable whose name ends in `*` (`x*`) binds the subexpression it
//!   meets under that name. Later occurrences of the same name must meet a
//!   structurally [`equal`](crate::equal) subexpression.
//!
//! A wildcard only matches subexpressions of its own type. Every other
//! pattern node must agree with the target in kind, type and non-child
//! fields. Failure to match is `None`, never an error.

pub mod helpers;
pub mod matcher;

use std::sync::Arc;

use smallvec::SmallVec;
use weft_dtype::Type;

use crate::error::Result;
use crate::node::Expr;

pub use helpers::{const_matches, is_neg_one, is_nonzero, try_const};
pub use matcher::{expr_match, stmt_match};

/// Name of the anonymous wildcard.
pub const ANY: &str = "*";

/// Wildcard variable of type `ty`. `name` should end in `*`; use [`ANY`] for
/// an anonymous wildcard.
pub fn wildcard(ty: Type, name: &str) -> Result<Arc<Expr>> {
    Expr::var(ty, name)
}

/// Whether a variable name is a wildcard marker.
pub fn is_wildcard(name: &str) -> bool {
    name.ends_with('*')
}

/// Subexpressions captured by named wildcards, in first-occurrence order.
#[derive(Debug, Clone, Default)]
pub struct Bindings(SmallVec<[(String, Arc<Expr>); 4]>);

impl Bindings {
    pub fn get(&self, name: &str) -> Option<&Arc<Expr>> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, e)| e)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<Expr>)> {
        self.0.iter().map(|(n, e)| (n.as_str(), e))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn insert(&mut self, name: &str, expr: &Arc<Expr>) {
        self.0.push((name.to_string(), expr.clone()));
    }
}
