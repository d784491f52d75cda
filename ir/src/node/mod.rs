//! Expression and statement nodes.
//!
//! - [`core`] - node structs, kinds, identity keys and ranges
//! - [`constructors`] - validating constructors, one per node kind
//! - [`eval`] - constant evaluation used by folding

pub mod constructors;
pub mod core;
pub mod eval;

pub use core::{Expr, ExprKey, ExprKind, ExprTag, Range, Region, Stmt, StmtKey, StmtKind, StmtTag};
