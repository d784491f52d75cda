//! Statement constructors.

use std::sync::Arc;

use snafu::ensure;
use weft_dtype::Type;

use crate::error::*;
use crate::node::{Expr, Region, Stmt, StmtKind};
use crate::types::ForType;

impl Stmt {
    pub fn let_stmt(name: impl Into<String>, value: &Arc<Expr>, body: &Arc<Stmt>) -> Result<Arc<Self>> {
        let name = name.into();
        ensure!(!name.is_empty(), EmptySnafu { node: "LetStmt", what: "name" });
        Ok(Self::new(StmtKind::LetStmt { name, value: value.clone(), body: body.clone() }))
    }

    /// Runtime check; `message` is reported through the error handler hook.
    pub fn assert(condition: &Arc<Expr>, message: impl Into<String>) -> Result<Arc<Self>> {
        let ty = condition.ty();
        ensure!(ty.is_bool(), NotBooleanSnafu { node: "AssertStmt", what: "condition", actual: ty });
        ensure!(ty.is_scalar(), NotScalarSnafu { node: "AssertStmt", what: "condition", actual: ty });
        Ok(Self::new(StmtKind::AssertStmt { condition: condition.clone(), message: message.into() }))
    }

    pub fn pipeline(
        name: impl Into<String>,
        produce: &Arc<Stmt>,
        update: Option<&Arc<Stmt>>,
        consume: &Arc<Stmt>,
    ) -> Arc<Self> {
        Self::new(StmtKind::Pipeline {
            name: name.into(),
            produce: produce.clone(),
            update: update.cloned(),
            consume: consume.clone(),
        })
    }

    /// Loop `name` over `[min, min + extent)`. Bounds are scalars of one type.
    pub fn for_(
        name: impl Into<String>,
        min: &Arc<Expr>,
        extent: &Arc<Expr>,
        for_type: ForType,
        body: &Arc<Stmt>,
    ) -> Result<Arc<Self>> {
        ensure!(min.ty().is_scalar(), NotScalarSnafu { node: "For", what: "min", actual: min.ty() });
        ensure!(min.ty() == extent.ty(), TypeMismatchSnafu { node: "For", expected: min.ty(), actual: extent.ty() });
        ensure!(min.ty().is_int(), NotIntegerSnafu { node: "For", what: "min", actual: min.ty() });
        Ok(Self::new(StmtKind::For {
            name: name.into(),
            min: min.clone(),
            extent: extent.clone(),
            for_type,
            body: body.clone(),
        }))
    }

    /// Flat write. The index is Int(32) with as many lanes as the value.
    pub fn store(name: impl Into<String>, value: &Arc<Expr>, index: &Arc<Expr>) -> Result<Arc<Self>> {
        let (value_ty, index_ty) = (value.ty(), index.ty());
        ensure!(
            index_ty.element_of() == Type::Int32,
            TypeMismatchSnafu { node: "Store", expected: Type::Int32.vector_of(value_ty.lanes()), actual: index_ty }
        );
        ensure!(
            index_ty.lanes() == value_ty.lanes(),
            LaneMismatchSnafu { node: "Store", expected: value_ty.lanes(), actual: index_ty.lanes() }
        );
        Ok(Self::new(StmtKind::Store { name: name.into(), value: value.clone(), index: index.clone() }))
    }

    pub fn provide(name: impl Into<String>, values: Vec<Arc<Expr>>, args: Vec<Arc<Expr>>) -> Result<Arc<Self>> {
        ensure!(!values.is_empty(), EmptySnafu { node: "Provide", what: "value list" });
        Ok(Self::new(StmtKind::Provide { name: name.into(), values, args }))
    }

    /// Scratch buffer of `size` elements of `ty`, live inside `body`.
    pub fn allocate(name: impl Into<String>, ty: Type, size: &Arc<Expr>, body: &Arc<Stmt>) -> Result<Arc<Self>> {
        ensure!(size.ty().is_scalar(), NotScalarSnafu { node: "Allocate", what: "size", actual: size.ty() });
        ensure!(
            size.ty().is_int() || size.ty().is_uint(),
            NotIntegerSnafu { node: "Allocate", what: "size", actual: size.ty() }
        );
        Ok(Self::new(StmtKind::Allocate { name: name.into(), ty, size: size.clone(), body: body.clone() }))
    }

    pub fn free(name: impl Into<String>) -> Arc<Self> {
        Self::new(StmtKind::Free { name: name.into() })
    }

    /// Storage for the outputs of function `name` (one type per output) over
    /// the box `bounds`.
    pub fn realize(name: impl Into<String>, types: Vec<Type>, bounds: Region, body: &Arc<Stmt>) -> Result<Arc<Self>> {
        ensure!(!types.is_empty(), EmptySnafu { node: "Realize", what: "type list" });
        for range in &bounds {
            ensure!(
                range.min().ty().is_scalar(),
                NotScalarSnafu { node: "Realize", what: "bound", actual: range.min().ty() }
            );
        }
        Ok(Self::new(StmtKind::Realize { name: name.into(), types, bounds, body: body.clone() }))
    }

    pub fn block(first: &Arc<Stmt>, rest: Option<&Arc<Stmt>>) -> Arc<Self> {
        Self::new(StmtKind::Block { first: first.clone(), rest: rest.cloned() })
    }

    /// Right-nested chain of blocks; `None` for an empty list.
    pub fn block_of(stmts: &[Arc<Stmt>]) -> Option<Arc<Self>> {
        let (last, init) = stmts.split_last()?;
        Some(init.iter().rev().fold(last.clone(), |rest, s| Self::block(s, Some(&rest))))
    }

    pub fn if_then_else(
        condition: &Arc<Expr>,
        then_case: &Arc<Stmt>,
        else_case: Option<&Arc<Stmt>>,
    ) -> Result<Arc<Self>> {
        let ty = condition.ty();
        ensure!(ty.is_bool(), NotBooleanSnafu { node: "IfThenElse", what: "condition", actual: ty });
        ensure!(ty.is_scalar(), NotScalarSnafu { node: "IfThenElse", what: "condition", actual: ty });
        Ok(Self::new(StmtKind::IfThenElse {
            condition: condition.clone(),
            then_case: then_case.clone(),
            else_case: else_case.cloned(),
        }))
    }

    pub fn evaluate(value: &Arc<Expr>) -> Arc<Self> {
        Self::new(StmtKind::Evaluate(value.clone()))
    }

    /// Statement that does nothing.
    pub fn no_op() -> Arc<Self> {
        Self::evaluate(&Expr::int(0))
    }
}
