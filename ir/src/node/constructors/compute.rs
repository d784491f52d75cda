//! Arithmetic, comparison, logic, selection and casts.

use std::sync::Arc;

use snafu::ensure;
use weft_dtype::Type;

use crate::error::{LaneMismatchSnafu, NotBooleanSnafu, OperandTypeMismatchSnafu, Result, TypeMismatchSnafu};
use crate::node::{Expr, ExprKind};
use crate::types::BinaryOp;

// =========================================================================
// Macro Definitions
// =========================================================================

/// Binary operators as methods on the left operand.
macro_rules! binary_ops {
    ($($method:ident => $op:ident),+ $(,)?) => {
        $(
            #[track_caller]
            pub fn $method(self: &Arc<Self>, rhs: &Arc<Self>) -> Result<Arc<Self>> {
                Self::binary(BinaryOp::$op, self, rhs)
            }
        )+
    };
}

impl Expr {
    /// Validated binary node.
    ///
    /// Operands must have identical types. `And`/`Or` additionally require
    /// booleans. Comparisons yield a boolean with the operands' lane count.
    pub fn binary(op: BinaryOp, lhs: &Arc<Self>, rhs: &Arc<Self>) -> Result<Arc<Self>> {
        ensure!(lhs.ty() == rhs.ty(), OperandTypeMismatchSnafu { op, lhs: lhs.ty(), rhs: rhs.ty() });
        if op.is_logical() {
            ensure!(lhs.ty().is_bool(), NotBooleanSnafu { node: op_name(op), what: "operand", actual: lhs.ty() });
        }
        Ok(Self::new(op.result_type(lhs.ty()), ExprKind::Binary(op, lhs.clone(), rhs.clone())))
    }

    // =========================================================================
    // Arithmetic Operations
    // =========================================================================

    binary_ops! {
        try_add => Add,
        try_sub => Sub,
        try_mul => Mul,
        try_div => Div,
        try_mod => Mod,
        try_min => Min,
        try_max => Max,
    }

    // =========================================================================
    // Comparison Operations
    // =========================================================================

    binary_ops! {
        try_eq => EQ,
        try_ne => NE,
        try_lt => LT,
        try_le => LE,
        try_gt => GT,
        try_ge => GE,
    }

    // =========================================================================
    // Logical Operations
    // =========================================================================

    binary_ops! {
        try_and => And,
        try_or => Or,
    }

    pub fn try_not(self: &Arc<Self>) -> Result<Arc<Self>> {
        ensure!(self.ty().is_bool(), NotBooleanSnafu { node: "Not", what: "operand", actual: self.ty() });
        Ok(Self::new(self.ty(), ExprKind::Not(self.clone())))
    }

    // =========================================================================
    // Selection and Conversion
    // =========================================================================

    /// `condition ? true_value : false_value`, lane-wise for vectors.
    ///
    /// The condition is a boolean that is either scalar or has as many lanes
    /// as the values.
    pub fn select(condition: &Arc<Self>, true_value: &Arc<Self>, false_value: &Arc<Self>) -> Result<Arc<Self>> {
        let cond_ty = condition.ty();
        ensure!(cond_ty.is_bool(), NotBooleanSnafu { node: "Select", what: "condition", actual: cond_ty });
        ensure!(
            true_value.ty() == false_value.ty(),
            TypeMismatchSnafu { node: "Select", expected: true_value.ty(), actual: false_value.ty() }
        );
        ensure!(
            cond_ty.is_scalar() || cond_ty.lanes() == true_value.ty().lanes(),
            LaneMismatchSnafu { node: "Select", expected: true_value.ty().lanes(), actual: cond_ty.lanes() }
        );
        Ok(Self::new(
            true_value.ty(),
            ExprKind::Select {
                condition: condition.clone(),
                true_value: true_value.clone(),
                false_value: false_value.clone(),
            },
        ))
    }

    /// Convert to `ty`. Lane counts must agree.
    pub fn cast(ty: Type, value: &Arc<Self>) -> Result<Arc<Self>> {
        ensure!(
            ty.lanes() == value.ty().lanes(),
            LaneMismatchSnafu { node: "Cast", expected: ty.lanes(), actual: value.ty().lanes() }
        );
        Ok(Self::new(ty, ExprKind::Cast(value.clone())))
    }

    /// Cast unless `value` already has type `ty`.
    pub fn cast_if_needed(ty: Type, value: &Arc<Self>) -> Result<Arc<Self>> {
        if value.ty() == ty { Ok(value.clone()) } else { Self::cast(ty, value) }
    }
}

fn op_name(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::And => "And",
        BinaryOp::Or => "Or",
        _ => "binary operator",
    }
}
