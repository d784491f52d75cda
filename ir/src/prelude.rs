//! Common imports for building and transforming IR.

pub use std::sync::Arc;

pub use weft_dtype::{Type, TypeKind};

pub use crate::error::{Error, Result};
pub use crate::mutator::IrMutator;
pub use crate::node::{Expr, ExprKind, Range, Stmt, StmtKind};
pub use crate::types::{BinaryOp, CallType, ConstValue, ForType};
pub use crate::visitor::{IrGraphVisitor, IrVisitor};
