//! Node construction tests.
//!
//! Every constructor validates its operands; these tests cover the accepted
//! shapes and the error raised for each violated invariant.

use std::sync::Arc;

use test_case::test_case;
use weft_device::Buffer;
use weft_dtype::Type;

use crate::error::Error;
use crate::node::{Expr, ExprKind, ExprTag, Range, Stmt, StmtKind};
use crate::parameter::Parameter;
use crate::types::{BinaryOp, CallType, ConstValue, ForType};

fn x() -> Arc<Expr> {
    Expr::var(Type::Int32, "x").unwrap()
}

// =========================================================================
// Constants
// =========================================================================

#[test]
fn test_small_ints_are_shared() {
    assert!(Expr::int(5).same_as(&Expr::int(5)));
    assert!(Expr::int(-8).same_as(&Expr::make_const(Type::Int32, -8).unwrap()));
    assert!(!Expr::int(9).same_as(&Expr::int(9)));
}

#[test]
fn test_const_payload_must_fit() {
    let result = Expr::const_(Type::Int8, ConstValue::Int(300));
    assert!(matches!(result, Err(Error::ConstOutOfRange { .. })));

    let result = Expr::const_(Type::UInt8, ConstValue::Int(3));
    assert!(matches!(result, Err(Error::ConstOutOfRange { .. })));
}

#[test]
fn test_const_rejects_vector_type() {
    let result = Expr::const_(Type::Int32.vector_of(4), ConstValue::Int(1));
    assert!(matches!(result, Err(Error::NotScalar { node: "Const", .. })));
}

#[test]
fn test_make_const_broadcasts_vectors() {
    let c = Expr::make_const(Type::Float32.vector_of(8), 3).unwrap();
    assert_eq!(c.ty(), Type::Float32.vector_of(8));
    assert_eq!(c.tag(), ExprTag::Broadcast);
    assert_eq!(c.as_const_or_broadcast(), Some(ConstValue::Float(3.0)));
}

#[test]
fn test_make_const_negative_unsigned() {
    assert!(Expr::make_const(Type::UInt16, -1).is_err());
}

#[test]
fn test_booleans() {
    let t = Expr::bool_(true);
    assert_eq!(t.ty(), Type::Bool);
    assert_eq!(t.as_bool(), Some(true));
    assert!(t.is_const_true());
    assert!(Expr::const_false(4).is_const_false());
    assert_eq!(Expr::const_false(4).ty(), Type::Bool.vector_of(4));
}

#[test]
fn test_float32_constant_is_rounded() {
    let c = Expr::const_(Type::Float32, ConstValue::Float(0.1)).unwrap();
    assert_eq!(c.as_const(), Some(ConstValue::Float(0.1f32 as f64)));
}

// =========================================================================
// Type bounds
// =========================================================================

#[test_case(Type::Int8, 127; "int8")]
#[test_case(Type::Int32, i32::MAX as i64; "int32")]
#[test_case(Type::UInt16, 65535; "uint16")]
fn test_type_max_constant(ty: Type, expected: i64) {
    assert_eq!(Expr::type_max(ty).unwrap().as_int(), Some(expected));
}

#[test]
fn test_type_min_unsigned_is_zero() {
    assert_eq!(Expr::type_min(Type::UInt32).unwrap().as_int(), Some(0));
}

#[test_case(Type::UInt64, "maxval_u64"; "uint64")]
#[test_case(Type::Float32, "maxval_f32"; "float32")]
fn test_type_max_extern(ty: Type, expected: &str) {
    let e = Expr::type_max(ty).unwrap();
    let ExprKind::Call { name, call_type, args, .. } = e.kind() else { panic!("expected call, got {e}") };
    assert_eq!(name, expected);
    assert_eq!(*call_type, CallType::Extern);
    assert!(args.is_empty());
    assert_eq!(e.ty(), ty);
}

#[test]
fn test_type_min_float64_extern() {
    let e = Expr::type_min(Type::Float64).unwrap();
    assert!(matches!(e.kind(), ExprKind::Call { name, .. } if name == "minval_f64"));
}

#[test]
fn test_type_bounds_of_vector() {
    let e = Expr::type_max(Type::Int16.vector_of(4)).unwrap();
    assert_eq!(e.tag(), ExprTag::Broadcast);
    assert_eq!(e.as_const_or_broadcast(), Some(ConstValue::Int(i16::MAX as i64)));
}

#[test]
fn test_type_bounds_of_handle_fail() {
    assert!(matches!(Expr::type_max(Type::Handle), Err(Error::Dtype { .. })));
}

// =========================================================================
// Arithmetic and logic
// =========================================================================

#[test]
fn test_binary_requires_same_type() {
    let f = Expr::float(1.0);
    let result = x().try_add(&f);
    assert!(matches!(
        result,
        Err(Error::OperandTypeMismatch { op: BinaryOp::Add, lhs: Type::Int32, rhs: Type::Float32 })
    ));
}

#[test_case(BinaryOp::Add, Type::Int32; "add keeps type")]
#[test_case(BinaryOp::Min, Type::Int32; "min keeps type")]
#[test_case(BinaryOp::LT, Type::Bool; "comparison is bool")]
#[test_case(BinaryOp::NE, Type::Bool; "ne is bool")]
fn test_binary_result_type(op: BinaryOp, expected: Type) {
    let e = Expr::binary(op, &x(), &Expr::int(3)).unwrap();
    assert_eq!(e.ty(), expected);
    assert_eq!(e.tag(), ExprTag::from(op));
}

#[test]
fn test_vector_comparison_is_bool_vector() {
    let v = Expr::broadcast(&x(), 4).unwrap();
    let e = v.try_lt(&v).unwrap();
    assert_eq!(e.ty(), Type::Bool.vector_of(4));
}

#[test]
fn test_logical_requires_bool() {
    let result = x().try_and(&x());
    assert!(matches!(result, Err(Error::NotBoolean { .. })));
    assert!(x().try_not().is_err());
    assert!(Expr::bool_(true).try_or(&Expr::bool_(false)).is_ok());
}

#[test]
fn test_select_rules() {
    let c = x().try_lt(&Expr::int(2)).unwrap();
    assert!(Expr::select(&c, &x(), &Expr::int(1)).is_ok());
    assert!(matches!(Expr::select(&x(), &x(), &x()), Err(Error::NotBoolean { .. })));
    assert!(Expr::select(&c, &x(), &Expr::float(1.0)).is_err());

    // A scalar condition selects whole vectors; a vector condition must match lanes.
    let v = Expr::broadcast(&x(), 4).unwrap();
    assert!(Expr::select(&c, &v, &v).is_ok());
    let c8 = Expr::const_true(8);
    assert!(matches!(Expr::select(&c8, &v, &v), Err(Error::LaneMismatch { .. })));
}

#[test]
fn test_cast_requires_equal_lanes() {
    let v = Expr::broadcast(&x(), 4).unwrap();
    assert!(Expr::cast(Type::Float32.vector_of(4), &v).is_ok());
    assert!(matches!(Expr::cast(Type::Float32, &v), Err(Error::LaneMismatch { .. })));
}

#[test]
fn test_cast_if_needed_skips_same_type() {
    let e = x();
    assert!(Expr::cast_if_needed(Type::Int32, &e).unwrap().same_as(&e));
    assert_eq!(Expr::cast_if_needed(Type::Int64, &e).unwrap().tag(), ExprTag::Cast);
}

#[test]
fn test_empty_variable_name() {
    assert!(matches!(Expr::var(Type::Int32, ""), Err(Error::Empty { node: "Variable", .. })));
}

// =========================================================================
// Vectors
// =========================================================================

#[test]
fn test_ramp() {
    let r = Expr::ramp(&x(), &Expr::int(2), 8).unwrap();
    assert_eq!(r.ty(), Type::Int32.vector_of(8));
}

#[test_case(1; "single lane")]
#[test_case(0; "no lanes")]
fn test_ramp_needs_lanes(lanes: u16) {
    assert!(matches!(Expr::ramp(&x(), &Expr::int(1), lanes), Err(Error::TooFewLanes { .. })));
}

#[test]
fn test_ramp_requires_scalar_operands() {
    let v = Expr::broadcast(&x(), 4).unwrap();
    assert!(matches!(Expr::ramp(&v, &v, 4), Err(Error::NotScalar { .. })));
    assert!(matches!(Expr::broadcast(&v, 2), Err(Error::NotScalar { .. })));
}

// =========================================================================
// Memory and calls
// =========================================================================

#[test]
fn test_load_index_lanes() {
    let idx = Expr::ramp(&x(), &Expr::int(1), 4).unwrap();
    let load = Expr::load(Type::Float32.vector_of(4), "buf", &idx, None, None).unwrap();
    assert_eq!(load.ty().lanes(), 4);
    assert!(matches!(
        Expr::load(Type::Float32.vector_of(8), "buf", &idx, None, None),
        Err(Error::LaneMismatch { .. })
    ));
    assert!(Expr::load(Type::Float32, "buf", &Expr::float(0.0), None, None).is_err());
}

#[test]
fn test_load_checks_image_type() {
    let image = Buffer::new(Type::UInt8, &[16], Some("in")).unwrap();
    assert!(Expr::load(Type::UInt8, "in", &x(), Some(image.clone()), None).is_ok());
    assert!(matches!(
        Expr::load(Type::Float32, "in", &x(), Some(image), None),
        Err(Error::TypeMismatch { node: "Load", .. })
    ));
}

#[test]
fn test_func_call_requires_int32_args() {
    let ok = Expr::func_call(Type::Float32, "f", vec![x(), Expr::int(0)], 0).unwrap();
    assert_eq!(ok.ty(), Type::Float32);
    let f = Expr::float(1.0);
    let err = Expr::func_call(Type::Float32, "f", vec![x(), f], 0);
    assert!(matches!(err, Err(Error::CallArgType { index: 1, .. })));
}

#[test]
fn test_extern_call_accepts_any_args() {
    let e = Expr::extern_call(Type::Float32, "sinf", vec![Expr::float(0.5)]).unwrap();
    assert!(matches!(e.kind(), ExprKind::Call { call_type: CallType::Extern, .. }));
}

#[test]
fn test_image_call_needs_source() {
    let result = Expr::call().ty(Type::UInt8).name("img").args(vec![x()]).call_type(CallType::Image).build();
    assert!(matches!(result, Err(Error::CallMissingSource { .. })));

    let image = Buffer::new(Type::UInt8, &[4, 4], Some("img")).unwrap();
    let call = Expr::image_call(&image, vec![x(), x()]).unwrap();
    assert_eq!(call.ty(), Type::UInt8);
}

#[test]
fn test_param_call_requires_buffer_parameter() {
    let scalar = Parameter::scalar(Type::Int32, "k");
    assert!(matches!(Expr::param_call(&scalar, vec![x()]), Err(Error::ParameterKind { .. })));
    let buffer = Parameter::buffer(Type::Float32, "input");
    let call = Expr::param_call(&buffer, vec![x()]).unwrap();
    assert!(matches!(call.kind(), ExprKind::Call { param: Some(_), .. }));
}

#[test]
fn test_param_var() {
    let k = Parameter::scalar(Type::Float32, "k");
    let v = Expr::param_var(&k).unwrap();
    assert_eq!(v.ty(), Type::Float32);
    assert_eq!(v.var_name(), Some("k"));
    assert!(Expr::param_var(&Parameter::buffer(Type::Float32, "b")).is_err());
}

#[test]
fn test_let_takes_body_type() {
    let e = Expr::let_("y", &Expr::float(2.0), &x()).unwrap();
    assert_eq!(e.ty(), Type::Int32);
}

// =========================================================================
// Statements
// =========================================================================

#[test]
fn test_for_bounds() {
    let body = Stmt::no_op();
    assert!(Stmt::for_("i", &Expr::int(0), &Expr::int(10), ForType::Parallel, &body).is_ok());
    let f = Expr::float(1.0);
    assert!(Stmt::for_("i", &f, &f, ForType::Serial, &body).is_err());
    let wide = Expr::make_const(Type::Int64, 10).unwrap();
    assert!(matches!(
        Stmt::for_("i", &Expr::int(0), &wide, ForType::Serial, &body),
        Err(Error::TypeMismatch { node: "For", .. })
    ));
}

#[test]
fn test_conditions_must_be_bool() {
    let body = Stmt::no_op();
    assert!(matches!(Stmt::if_then_else(&x(), &body, None), Err(Error::NotBoolean { .. })));
    assert!(matches!(Stmt::assert(&x(), "oops"), Err(Error::NotBoolean { .. })));
    assert!(Stmt::assert(&Expr::bool_(true), "fine").is_ok());
}

#[test]
fn test_store_index_lanes() {
    let v = Expr::broadcast(&Expr::float(1.0), 4).unwrap();
    let idx = Expr::ramp(&x(), &Expr::int(1), 4).unwrap();
    assert!(Stmt::store("out", &v, &idx).is_ok());
    assert!(Stmt::store("out", &v, &x()).is_err());
}

#[test]
fn test_provide_and_realize_need_contents() {
    assert!(matches!(Stmt::provide("f", vec![], vec![x()]), Err(Error::Empty { node: "Provide", .. })));
    let r = Range::new(Expr::int(0), Expr::int(4)).unwrap();
    assert!(Stmt::realize("f", vec![], vec![r.clone()], &Stmt::no_op()).is_err());
    assert!(Stmt::realize("f", vec![Type::Float32], vec![r], &Stmt::no_op()).is_ok());
}

#[test]
fn test_range_types_must_match() {
    let wide = Expr::make_const(Type::Int64, 4).unwrap();
    assert!(matches!(Range::new(Expr::int(0), wide), Err(Error::RangeTypeMismatch { .. })));
}

#[test]
fn test_allocate_size_is_integer() {
    assert!(Stmt::allocate("tmp", Type::Float32, &Expr::int(64), &Stmt::no_op()).is_ok());
    assert!(Stmt::allocate("tmp", Type::Float32, &Expr::float(64.0), &Stmt::no_op()).is_err());
}

#[test]
fn test_block_of_nests_to_the_right() {
    let stmts: Vec<_> = (0..3).map(|i| Stmt::evaluate(&Expr::int(i))).collect();
    let block = Stmt::block_of(&stmts).unwrap();
    let StmtKind::Block { first, rest: Some(rest) } = block.kind() else { panic!("expected block") };
    assert!(first.same_as(&stmts[0]));
    let StmtKind::Block { first: second, rest: Some(third) } = rest.kind() else { panic!("expected block") };
    assert!(second.same_as(&stmts[1]));
    assert!(third.same_as(&stmts[2]));
    assert!(Stmt::block_of(&[]).is_none());
}

#[test]
fn test_no_op() {
    assert!(Stmt::no_op().is_no_op());
    assert!(!Stmt::evaluate(&x()).is_no_op());
}

#[test]
fn test_ids_are_unique() {
    let a = Expr::var(Type::Int32, "x").unwrap();
    let b = Expr::var(Type::Int32, "x").unwrap();
    assert_ne!(a.id, b.id);
    assert!(!a.same_as(&b));
}

#[test]
fn test_children_order() {
    let c = Expr::bool_(true);
    let s = Expr::select(&c, &x(), &Expr::int(1)).unwrap();
    let children = s.children();
    assert_eq!(children.len(), 3);
    assert!(children[0].same_as(&c));
}
