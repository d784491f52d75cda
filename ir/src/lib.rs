//! Intermediate representation for the weft pipeline compiler.
//!
//! Expressions and statements are immutable nodes shared through [`Arc`]
//! handles. Every node is built by a validating constructor, so a handle in
//! hand always refers to a well-typed tree.
//!
//! # Module Organization
//!
//! - [`types`] - constant values, operators, loop and call kinds
//! - [`node`] - [`Expr`] and [`Stmt`] nodes and their constructors
//! - [`visitor`] / [`mutator`] - exhaustive traversal and rebuilding
//! - [`equality`] - structural equality and total ordering of trees
//! - [`pattern`] - wildcard matching of expression and statement trees
//! - [`substitute`] - variable replacement honoring `let` scoping
//! - [`reduction`] / [`parameter`] - identity-bearing shared cells
//! - [`implicit`] - explicit resolution of implicit call arguments
//! - [`printer`] - human-readable rendering used by diagnostics
//!
//! [`Arc`]: std::sync::Arc

pub mod config;
pub mod equality;
pub mod error;
pub mod implicit;
pub mod mutator;
pub mod names;
pub mod node;
pub mod parameter;
pub mod pattern;
pub mod prelude;
pub mod printer;
pub mod reduction;
pub mod substitute;
pub mod types;
pub mod visitor;


pub use config::IrConfig;
pub use equality::{ExprDeepKey, StmtDeepKey, deep_compare, deep_compare_stmt, equal, equal_stmt};
pub use error::{Error, Result};
pub use mutator::IrMutator;
pub use node::{Expr, ExprKey, ExprKind, ExprTag, Range, Region, Stmt, StmtKey, StmtKind, StmtTag};
pub use parameter::Parameter;
pub use pattern::{Bindings, expr_match, stmt_match};
pub use reduction::{RVar, ReductionDomain, ReductionVariable};
pub use substitute::{substitute, substitute_map, substitute_stmt, substitute_stmt_map};
pub use types::{BinaryOp, CallType, ConstValue, ForType};
pub use visitor::{IrGraphVisitor, IrVisitor};

pub use weft_device::Buffer;
pub use weft_dtype::{Argument, Type, TypeKind};
