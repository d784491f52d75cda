//! Pipeline parameters: shared, mutable cells whose value is only known when
//! the pipeline runs.

use std::sync::Arc;

use parking_lot::RwLock;
use snafu::ensure;
use weft_device::Buffer;
use weft_device::MAX_DIMS;
use weft_dtype::{ScalarBits, Type};

use crate::error::*;
use crate::names::unique_name;
use crate::node::Expr;

#[derive(Default)]
struct ParameterState {
    /// Current scalar value, in the low bytes.
    scalar_bits: u64,
    buffer: Option<Buffer>,
    min_constraint: [Option<Arc<Expr>>; MAX_DIMS],
    extent_constraint: [Option<Arc<Expr>>; MAX_DIMS],
    stride_constraint: [Option<Arc<Expr>>; MAX_DIMS],
    min_value: Option<Arc<Expr>>,
    max_value: Option<Arc<Expr>>,
}

struct ParameterContents {
    ty: Type,
    is_buffer: bool,
    name: String,
    state: RwLock<ParameterState>,
}

/// Scalar or buffer input of a pipeline.
///
/// Clones share one cell. Equality is identity ([`Parameter::same_as`]).
#[derive(Clone)]
pub struct Parameter(Arc<ParameterContents>);

impl std::fmt::Debug for Parameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = if self.0.is_buffer { "buffer" } else { "scalar" };
        write!(f, "Parameter({} {kind} {})", self.0.name, self.0.ty)
    }
}

impl Parameter {
    /// New parameter. A missing or empty name is replaced by a fresh `p<N>`.
    ///
    /// The stride of dimension 0 of a buffer parameter is constrained to 1.
    pub fn new(ty: Type, is_buffer: bool, name: Option<&str>) -> Self {
        let name = match name {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => unique_name('p'),
        };
        let mut state = ParameterState::default();
        if is_buffer {
            state.stride_constraint[0] = Some(Expr::int(1));
        }
        tracing::trace!(parameter = %name, %ty, is_buffer, "new parameter");
        Self(Arc::new(ParameterContents { ty, is_buffer, name, state: RwLock::new(state) }))
    }

    pub fn scalar(ty: Type, name: &str) -> Self {
        Self::new(ty, false, Some(name))
    }

    pub fn buffer(ty: Type, name: &str) -> Self {
        Self::new(ty, true, Some(name))
    }

    pub fn ty(&self) -> Type {
        self.0.ty
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn is_buffer(&self) -> bool {
        self.0.is_buffer
    }

    pub fn same_as(&self, other: &Parameter) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    fn require(&self, buffer: bool) -> Result<()> {
        let describe = |b| if b { "a buffer" } else { "a scalar" };
        ensure!(
            self.0.is_buffer == buffer,
            ParameterKindSnafu { name: self.name(), expected: describe(buffer), actual: describe(self.0.is_buffer) }
        );
        Ok(())
    }

    fn check_dim(&self, dim: usize) -> Result<()> {
        self.require(true)?;
        ensure!(dim < MAX_DIMS, ParameterDimensionSnafu { name: self.name(), dim });
        Ok(())
    }

    fn check_type(&self, actual: Type) -> Result<()> {
        ensure!(actual == self.0.ty, ParameterTypeSnafu { name: self.name(), expected: self.0.ty, actual });
        Ok(())
    }

    // =========================================================================
    // Scalar parameters
    // =========================================================================

    pub fn get_scalar<T: ScalarBits>(&self) -> Result<T> {
        self.require(false)?;
        self.check_type(T::TYPE)?;
        Ok(T::from_bits(self.0.state.read().scalar_bits))
    }

    pub fn set_scalar<T: ScalarBits>(&self, value: T) -> Result<()> {
        self.require(false)?;
        self.check_type(T::TYPE)?;
        self.0.state.write().scalar_bits = value.to_bits();
        Ok(())
    }

    /// Raw storage of the current scalar value, as passed to generated code.
    pub fn scalar_bits(&self) -> Result<u64> {
        self.require(false)?;
        Ok(self.0.state.read().scalar_bits)
    }

    pub fn set_min_value(&self, value: Option<Arc<Expr>>) -> Result<()> {
        self.require(false)?;
        if let Some(v) = &value {
            self.check_type(v.ty())?;
        }
        self.0.state.write().min_value = value;
        Ok(())
    }

    pub fn min_value(&self) -> Result<Option<Arc<Expr>>> {
        self.require(false)?;
        Ok(self.0.state.read().min_value.clone())
    }

    pub fn set_max_value(&self, value: Option<Arc<Expr>>) -> Result<()> {
        self.require(false)?;
        if let Some(v) = &value {
            self.check_type(v.ty())?;
        }
        self.0.state.write().max_value = value;
        Ok(())
    }

    pub fn max_value(&self) -> Result<Option<Arc<Expr>>> {
        self.require(false)?;
        Ok(self.0.state.read().max_value.clone())
    }

    // =========================================================================
    // Buffer parameters
    // =========================================================================

    pub fn buffer_value(&self) -> Result<Option<Buffer>> {
        self.require(true)?;
        Ok(self.0.state.read().buffer.clone())
    }

    /// Bind a buffer of the parameter's element type, or unbind with `None`.
    pub fn set_buffer(&self, buffer: Option<Buffer>) -> Result<()> {
        self.require(true)?;
        if let Some(b) = &buffer {
            self.check_type(b.ty())?;
        }
        self.0.state.write().buffer = buffer;
        Ok(())
    }

    pub fn set_min_constraint(&self, dim: usize, e: Option<Arc<Expr>>) -> Result<()> {
        self.check_dim(dim)?;
        self.0.state.write().min_constraint[dim] = e;
        Ok(())
    }

    pub fn set_extent_constraint(&self, dim: usize, e: Option<Arc<Expr>>) -> Result<()> {
        self.check_dim(dim)?;
        self.0.state.write().extent_constraint[dim] = e;
        Ok(())
    }

    pub fn set_stride_constraint(&self, dim: usize, e: Option<Arc<Expr>>) -> Result<()> {
        self.check_dim(dim)?;
        self.0.state.write().stride_constraint[dim] = e;
        Ok(())
    }

    pub fn min_constraint(&self, dim: usize) -> Result<Option<Arc<Expr>>> {
        self.check_dim(dim)?;
        Ok(self.0.state.read().min_constraint[dim].clone())
    }

    pub fn extent_constraint(&self, dim: usize) -> Result<Option<Arc<Expr>>> {
        self.check_dim(dim)?;
        Ok(self.0.state.read().extent_constraint[dim].clone())
    }

    pub fn stride_constraint(&self, dim: usize) -> Result<Option<Arc<Expr>>> {
        self.check_dim(dim)?;
        Ok(self.0.state.read().stride_constraint[dim].clone())
    }
}
