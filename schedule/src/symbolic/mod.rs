//! Symbolic simplification.
//!
//! [`simplify_expr`] and [`simplify_stmt`] rewrite a tree to a normal form
//! with constant folding, algebraic identities, vector arithmetic rules,
//! statement cleanups and wildcard patterns for repeated subterms.

pub mod algebra;
pub mod fold;
pub mod patterns;
pub mod rules;
pub mod scope;
pub mod simplify;
pub mod stmt;
pub mod vector;

pub use rules::{RewriteResult, RuleSet, Tagged};
pub use simplify::{Simplifier, simplify_expr, simplify_stmt};
