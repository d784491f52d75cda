//! Loads, calls and let bindings.

use std::sync::Arc;

use bon::bon;
use snafu::ensure;
use weft_device::Buffer;
use weft_dtype::Type;

use crate::error::*;
use crate::node::{Expr, ExprKind};
use crate::parameter::Parameter;
use crate::types::CallType;

#[bon]
impl Expr {
    /// Call to a function, image, extern or intrinsic.
    ///
    /// Image and pipeline-function calls take Int(32) coordinates. Image calls
    /// need the buffer or parameter they read.
    #[builder(finish_fn = build)]
    pub fn call(
        ty: Type,
        #[builder(into)] name: String,
        #[builder(default)] args: Vec<Arc<Expr>>,
        call_type: CallType,
        #[builder(default)] value_index: usize,
        image: Option<Buffer>,
        param: Option<Parameter>,
    ) -> Result<Arc<Self>> {
        if matches!(call_type, CallType::Image | CallType::Func) {
            for (index, arg) in args.iter().enumerate() {
                ensure!(
                    arg.ty().element_of() == Type::Int32,
                    CallArgTypeSnafu { name: name.clone(), call_type, index, actual: arg.ty() }
                );
            }
        }
        if call_type == CallType::Image {
            ensure!(image.is_some() || param.is_some(), CallMissingSourceSnafu { name: name.clone() });
        }
        Ok(Self::new(ty, ExprKind::Call { name, args, call_type, value_index, image, param }))
    }
}

impl Expr {
    /// Call to a function provided by the host environment.
    pub fn extern_call(ty: Type, name: impl Into<String>, args: Vec<Arc<Expr>>) -> Result<Arc<Self>> {
        Self::call().ty(ty).name(name).args(args).call_type(CallType::Extern).build()
    }

    /// Call to an operation the code generator lowers itself.
    pub fn intrinsic(ty: Type, name: impl Into<String>, args: Vec<Arc<Expr>>) -> Result<Arc<Self>> {
        Self::call().ty(ty).name(name).args(args).call_type(CallType::Intrinsic).build()
    }

    /// Read of output `value_index` of pipeline function `name`.
    pub fn func_call(ty: Type, name: impl Into<String>, args: Vec<Arc<Expr>>, value_index: usize) -> Result<Arc<Self>> {
        Self::call().ty(ty).name(name).args(args).call_type(CallType::Func).value_index(value_index).build()
    }

    /// Read from a concrete input image.
    pub fn image_call(image: &Buffer, args: Vec<Arc<Expr>>) -> Result<Arc<Self>> {
        Self::call()
            .ty(image.ty())
            .name(image.name())
            .args(args)
            .call_type(CallType::Image)
            .image(image.clone())
            .build()
    }

    /// Read from a buffer parameter bound at run time.
    pub fn param_call(param: &Parameter, args: Vec<Arc<Expr>>) -> Result<Arc<Self>> {
        ensure!(
            param.is_buffer(),
            ParameterKindSnafu { name: param.name(), expected: "a buffer", actual: "a scalar" }
        );
        Self::call()
            .ty(param.ty())
            .name(param.name())
            .args(args)
            .call_type(CallType::Image)
            .param(param.clone())
            .build()
    }

    /// Flat read of `ty` from buffer `name` at `index`.
    ///
    /// The index is Int(32) with as many lanes as `ty`.
    pub fn load(
        ty: Type,
        name: impl Into<String>,
        index: &Arc<Self>,
        image: Option<Buffer>,
        param: Option<Parameter>,
    ) -> Result<Arc<Self>> {
        let index_ty = index.ty();
        ensure!(
            index_ty.element_of() == Type::Int32,
            TypeMismatchSnafu { node: "Load", expected: Type::Int32.vector_of(ty.lanes()), actual: index_ty }
        );
        ensure!(index_ty.lanes() == ty.lanes(), LaneMismatchSnafu { node: "Load", expected: ty.lanes(), actual: index_ty.lanes() });
        if let Some(image) = &image {
            ensure!(
                image.ty() == ty.element_of(),
                TypeMismatchSnafu { node: "Load", expected: image.ty(), actual: ty.element_of() }
            );
        }
        if let Some(param) = &param {
            ensure!(
                param.is_buffer(),
                ParameterKindSnafu { name: param.name(), expected: "a buffer", actual: "a scalar" }
            );
            ensure!(
                param.ty() == ty.element_of(),
                TypeMismatchSnafu { node: "Load", expected: param.ty(), actual: ty.element_of() }
            );
        }
        Ok(Self::new(ty, ExprKind::Load { name: name.into(), index: index.clone(), image, param }))
    }

    /// `let name = value in body`.
    pub fn let_(name: impl Into<String>, value: &Arc<Self>, body: &Arc<Self>) -> Result<Arc<Self>> {
        let name = name.into();
        ensure!(!name.is_empty(), EmptySnafu { node: "Let", what: "name" });
        Ok(Self::new(body.ty(), ExprKind::Let { name, value: value.clone(), body: body.clone() }))
    }
}
