use std::sync::Arc;

use snafu::ensure;

use crate::error::{NotScalarSnafu, Result, TooFewLanesSnafu, TypeMismatchSnafu};
use crate::node::{Expr, ExprKind};

impl Expr {
    /// Vector `[base, base + stride, ...]` of `lanes` elements.
    pub fn ramp(base: &Arc<Self>, stride: &Arc<Self>, lanes: u16) -> Result<Arc<Self>> {
        ensure!(base.ty().is_scalar(), NotScalarSnafu { node: "Ramp", what: "base", actual: base.ty() });
        ensure!(stride.ty().is_scalar(), NotScalarSnafu { node: "Ramp", what: "stride", actual: stride.ty() });
        ensure!(
            base.ty() == stride.ty(),
            TypeMismatchSnafu { node: "Ramp", expected: base.ty(), actual: stride.ty() }
        );
        ensure!(lanes > 1, TooFewLanesSnafu { node: "Ramp", lanes });
        Ok(Self::new(base.ty().vector_of(lanes), ExprKind::Ramp { base: base.clone(), stride: stride.clone(), lanes }))
    }

    /// Vector of `lanes` copies of a scalar.
    pub fn broadcast(value: &Arc<Self>, lanes: u16) -> Result<Arc<Self>> {
        ensure!(value.ty().is_scalar(), NotScalarSnafu { node: "Broadcast", what: "value", actual: value.ty() });
        ensure!(lanes > 1, TooFewLanesSnafu { node: "Broadcast", lanes });
        Ok(Self::new(value.ty().vector_of(lanes), ExprKind::Broadcast { value: value.clone(), lanes }))
    }
}
