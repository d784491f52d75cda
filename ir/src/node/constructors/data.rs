//! Constants, variables and type bounds.

use std::sync::{Arc, LazyLock};

use snafu::ensure;
use weft_dtype::{Type, TypeKind};

use crate::error::{ConstOutOfRangeSnafu, EmptySnafu, NotScalarSnafu, ParameterKindSnafu, Result};
use crate::node::{Expr, ExprKind};
use crate::parameter::Parameter;
use crate::reduction::ReductionDomain;
use crate::types::ConstValue;

const SMALL_INT_MIN: i64 = -8;
const SMALL_INT_MAX: i64 = 8;

/// Int(32) constants in `SMALL_INT_MIN..=SMALL_INT_MAX`, alive for the whole
/// process. Constructors hand out clones of these.
static SMALL_INTS: LazyLock<[Arc<Expr>; (SMALL_INT_MAX - SMALL_INT_MIN + 1) as usize]> = LazyLock::new(|| {
    std::array::from_fn(|i| Expr::new(Type::Int32, ExprKind::Const(ConstValue::Int(i as i64 + SMALL_INT_MIN))))
});

impl Expr {
    // =========================================================================
    // Constants
    // =========================================================================

    /// Scalar constant with a payload matching `ty`.
    pub fn const_(ty: Type, value: ConstValue) -> Result<Arc<Self>> {
        ensure!(ty.is_scalar(), NotScalarSnafu { node: "Const", what: "type", actual: ty });
        ensure!(value.fits(ty), ConstOutOfRangeSnafu { value: format!("{value:?}"), ty });

        if ty == Type::Int32
            && let ConstValue::Int(v) = value
            && (SMALL_INT_MIN..=SMALL_INT_MAX).contains(&v)
        {
            return Ok(SMALL_INTS[(v - SMALL_INT_MIN) as usize].clone());
        }

        let value = match value {
            ConstValue::Float(v) if ty.bits() == 32 => ConstValue::Float(v as f32 as f64),
            v => v,
        };
        Ok(Self::new(ty, ExprKind::Const(value)))
    }

    /// Int(32) constant. Values in -8..=8 come from a shared cache.
    pub fn int(value: i32) -> Arc<Self> {
        let value = value as i64;
        if (SMALL_INT_MIN..=SMALL_INT_MAX).contains(&value) {
            return SMALL_INTS[(value - SMALL_INT_MIN) as usize].clone();
        }
        Self::new(Type::Int32, ExprKind::Const(ConstValue::Int(value)))
    }

    /// Float(32) constant.
    pub fn float(value: f32) -> Arc<Self> {
        Self::new(Type::Float32, ExprKind::Const(ConstValue::Float(value as f64)))
    }

    /// Scalar boolean constant.
    pub fn bool_(value: bool) -> Arc<Self> {
        Self::new(Type::Bool, ExprKind::Const(ConstValue::UInt(value as u64)))
    }

    /// Boolean constant, broadcast when `lanes > 1`.
    pub fn const_true(lanes: u16) -> Arc<Self> {
        Self::splat(Self::bool_(true), lanes)
    }

    pub fn const_false(lanes: u16) -> Arc<Self> {
        Self::splat(Self::bool_(false), lanes)
    }

    /// Broadcast a scalar that is known to be valid.
    fn splat(value: Arc<Self>, lanes: u16) -> Arc<Self> {
        if lanes <= 1 {
            return value;
        }
        Self::new(value.ty().vector_of(lanes), ExprKind::Broadcast { value, lanes })
    }

    /// Constant of any type with integer value `value`. Vector types get a
    /// broadcast of the scalar constant.
    pub fn make_const(ty: Type, value: i64) -> Result<Arc<Self>> {
        let payload = match ty.kind() {
            TypeKind::Int => ConstValue::Int(value),
            TypeKind::UInt if value >= 0 => ConstValue::UInt(value as u64),
            TypeKind::Float => ConstValue::Float(value as f64),
            TypeKind::UInt | TypeKind::Handle => {
                return ConstOutOfRangeSnafu { value: value.to_string(), ty }.fail();
            }
        };
        Self::make_const_value(ty, payload)
    }

    /// Constant of any type with payload `value`.
    pub fn make_const_value(ty: Type, value: ConstValue) -> Result<Arc<Self>> {
        let scalar = Self::const_(ty.element_of(), value)?;
        Ok(Self::splat(scalar, ty.lanes()))
    }

    pub fn make_zero(ty: Type) -> Result<Arc<Self>> {
        Self::make_const_value(ty, ConstValue::zero(ty))
    }

    pub fn make_one(ty: Type) -> Result<Arc<Self>> {
        Self::make_const_value(ty, ConstValue::one(ty))
    }

    /// String literal, typed as a handle.
    pub fn string(value: impl Into<String>) -> Arc<Self> {
        Self::new(Type::Handle, ExprKind::StringImm(value.into()))
    }

    // =========================================================================
    // Variables
    // =========================================================================

    pub fn var(ty: Type, name: impl Into<String>) -> Result<Arc<Self>> {
        Self::variable(ty, name, None, None)
    }

    /// Variable optionally tied to a parameter or a reduction domain.
    pub fn variable(
        ty: Type,
        name: impl Into<String>,
        param: Option<Parameter>,
        domain: Option<ReductionDomain>,
    ) -> Result<Arc<Self>> {
        let name = name.into();
        ensure!(!name.is_empty(), EmptySnafu { node: "Variable", what: "name" });
        Ok(Self::new(ty, ExprKind::Variable { name, param, domain }))
    }

    /// Variable that reads the current value of a scalar parameter.
    pub fn param_var(param: &Parameter) -> Result<Arc<Self>> {
        ensure!(
            !param.is_buffer(),
            ParameterKindSnafu { name: param.name(), expected: "a scalar", actual: "a buffer" }
        );
        Self::variable(param.ty(), param.name(), Some(param.clone()), None)
    }

    /// Int(32) variable iterating over `domain`.
    pub fn domain_var(name: impl Into<String>, domain: &ReductionDomain) -> Result<Arc<Self>> {
        Self::variable(Type::Int32, name, None, Some(domain.clone()))
    }

    // =========================================================================
    // Type bounds
    // =========================================================================

    /// Largest value of `ty`.
    ///
    /// Integer types get a constant. Bounds that do not fit the 64-bit
    /// constant payload, and float bounds, become calls to the extern
    /// `maxval_{s|u|f}{bits}` provided by the runtime.
    pub fn type_max(ty: Type) -> Result<Arc<Self>> {
        Self::type_bound(ty, true)
    }

    /// Smallest value of `ty`. See [`Expr::type_max`].
    pub fn type_min(ty: Type) -> Result<Arc<Self>> {
        Self::type_bound(ty, false)
    }

    fn type_bound(ty: Type, max: bool) -> Result<Arc<Self>> {
        if ty.is_vector() {
            let scalar = Self::type_bound(ty.element_of(), max)?;
            return Self::broadcast(&scalar, ty.lanes());
        }
        let prefix = if max { "maxval" } else { "minval" };
        match ty.kind() {
            TypeKind::Int => {
                let v = if max { ty.imax()? } else { ty.imin()? };
                Self::const_(ty, ConstValue::Int(v))
            }
            TypeKind::UInt if !max => Self::const_(ty, ConstValue::UInt(0)),
            TypeKind::UInt if ty.bits() < 64 => Self::const_(ty, ConstValue::UInt(ty.imax()? as u64)),
            TypeKind::UInt => Self::extern_call(ty, format!("{prefix}_u{}", ty.bits()), vec![]),
            TypeKind::Float => Self::extern_call(ty, format!("{prefix}_f{}", ty.bits()), vec![]),
            TypeKind::Handle => Err(weft_dtype::Error::NoIntegerBounds { ty }.into()),
        }
    }
}
