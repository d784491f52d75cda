//! Schedule directives, split replay and level validation.

use test_case::test_case;
use weft_dtype::Type;
use weft_ir::{Expr, ForType, ReductionDomain};

use crate::error::Error;
use crate::schedule::{LoopLevel, LoopNest, Schedule, SplitKind};
use crate::test::helpers::{assert_expr_eq, typed_var, var};

fn names(schedule: &Schedule) -> Vec<&str> {
    schedule.dims().iter().map(|d| d.var.as_str()).collect()
}

fn xy() -> Schedule {
    Schedule::new(&["x", "y"]).unwrap()
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_new_schedule_is_serial_and_inline() {
    let s = Schedule::new(&["x", "y", "c"]).unwrap();
    assert_eq!(names(&s), ["x", "y", "c"]);
    assert!(s.dims().iter().all(|d| d.for_type == ForType::Serial));
    assert_eq!(s.storage_dims(), ["x", "y", "c"]);
    assert!(s.compute_level().is_inline());
    assert!(s.store_level().is_inline());
    assert!(s.splits().is_empty());
    assert!(s.bounds().is_empty());
}

#[test]
fn test_new_rejects_repeated_args() {
    assert!(matches!(Schedule::new(&["x", "x"]), Err(Error::RepeatedDimension { .. })));
}

#[test]
fn test_update_schedule_puts_reduction_innermost() {
    let domain = ReductionDomain::build(Some("r"), &[(Expr::int(0), Expr::int(10))]).unwrap();
    let rvar = domain.vars()[0].var.clone();
    let s = Schedule::for_update(&["x"], &domain).unwrap();
    assert_eq!(names(&s), [rvar.as_str(), "x"]);
    assert_eq!(s.storage_dims(), ["x"]);
}

// ============================================================================
// Split, rename, fuse
// ============================================================================

#[test]
fn test_split_places_outer_outside_inner() {
    let mut s = xy();
    s.parallel("x").unwrap();
    s.split("x", "xo", "xi", &Expr::int(8)).unwrap();

    assert_eq!(names(&s), ["xi", "xo", "y"]);
    assert_eq!(s.dim("xi").unwrap().for_type, ForType::Parallel);
    assert_eq!(s.dim("xo").unwrap().for_type, ForType::Parallel);

    let split = &s.splits()[0];
    assert_eq!(split.kind, SplitKind::Split);
    assert_eq!((split.old_var.as_str(), split.outer.as_str()), ("x", "xo"));
    assert_eq!(split.inner.as_deref(), Some("xi"));
    assert_expr_eq(&split.factor, &Expr::int(8));
}

#[test]
fn test_split_may_reuse_old_name() {
    let mut s = xy();
    s.split("x", "x", "xi", &Expr::int(4)).unwrap();
    assert_eq!(names(&s), ["xi", "x", "y"]);
}

#[test]
fn test_split_casts_factor_to_int32() {
    let mut s = xy();
    s.split("x", "xo", "xi", &Expr::make_const(Type::Int16, 4).unwrap()).unwrap();
    assert_eq!(s.splits()[0].factor.ty(), Type::Int32);
}

#[test]
fn test_split_accepts_symbolic_factor() {
    let mut s = xy();
    s.split("x", "xo", "xi", &var("n")).unwrap();
    assert_expr_eq(&s.splits()[0].factor, &var("n"));
}

#[test]
fn test_split_errors() {
    let mut s = xy();
    assert!(matches!(s.split("z", "zo", "zi", &Expr::int(2)), Err(Error::UnknownDimension { .. })));
    assert!(matches!(s.split("x", "y", "xi", &Expr::int(2)), Err(Error::DuplicateDimension { .. })));
    assert!(matches!(s.split("x", "a", "a", &Expr::int(2)), Err(Error::RepeatedDimension { .. })));
    assert!(matches!(s.split("x", "xo", "xi", &Expr::int(0)), Err(Error::InvalidSplitFactor { .. })));
    assert!(matches!(s.split("x", "xo", "xi", &Expr::int(-2)), Err(Error::InvalidSplitFactor { .. })));
    assert!(matches!(s.split("x", "xo", "xi", &Expr::float(2.0)), Err(Error::InvalidSplitFactor { .. })));
    assert!(matches!(
        s.split("x", "xo", "xi", &typed_var(Type::Bool, "b")),
        Err(Error::InvalidSplitFactor { .. })
    ));
    // Nothing was recorded.
    assert!(s.splits().is_empty());
    assert_eq!(names(&s), ["x", "y"]);
}

#[test]
fn test_rename() {
    let mut s = xy();
    s.rename("y", "row").unwrap();
    assert_eq!(names(&s), ["x", "row"]);
    let split = &s.splits()[0];
    assert!(split.is_rename());
    assert!(split.inner.is_none());
    assert!(split.factor.is_one());

    assert!(matches!(s.rename("x", "row"), Err(Error::DuplicateDimension { .. })));
    assert!(matches!(s.rename("y", "col"), Err(Error::UnknownDimension { .. })));
}

#[test]
fn test_fuse_adjacent_loops() {
    let mut s = Schedule::new(&["x", "y", "c"]).unwrap();
    s.vectorize("x").unwrap();
    s.fuse("x", "y", "xy").unwrap();
    assert_eq!(names(&s), ["xy", "c"]);
    assert_eq!(s.dim("xy").unwrap().for_type, ForType::Vectorized);
    let split = &s.splits()[0];
    assert!(split.is_fuse());
    assert_eq!(split.old_var, "xy");
}

#[test]
fn test_fuse_requires_adjacent_outer() {
    let mut s = Schedule::new(&["x", "y", "c"]).unwrap();
    assert!(matches!(s.fuse("x", "c", "xc"), Err(Error::NotAdjacent { .. })));
    assert!(matches!(s.fuse("y", "x", "yx"), Err(Error::NotAdjacent { .. })));
    assert!(matches!(s.fuse("x", "y", "c"), Err(Error::DuplicateDimension { .. })));
}

// ============================================================================
// Reorder and loop types
// ============================================================================

#[test]
fn test_reorder_all() {
    let mut s = Schedule::new(&["x", "y", "c"]).unwrap();
    s.reorder(&["c", "x", "y"]).unwrap();
    assert_eq!(names(&s), ["c", "x", "y"]);
}

#[test]
fn test_reorder_subset_keeps_other_positions() {
    let mut s = Schedule::new(&["x", "y", "c"]).unwrap();
    s.reorder(&["c", "x"]).unwrap();
    assert_eq!(names(&s), ["c", "y", "x"]);
}

#[test]
fn test_reorder_moves_loop_types() {
    let mut s = xy();
    s.parallel("y").unwrap();
    s.reorder(&["y", "x"]).unwrap();
    assert_eq!(s.dims()[0].for_type, ForType::Parallel);
    assert_eq!(s.dims()[1].for_type, ForType::Serial);
}

#[test]
fn test_reorder_errors() {
    let mut s = xy();
    assert!(matches!(s.reorder(&["x", "x"]), Err(Error::RepeatedDimension { .. })));
    assert!(matches!(s.reorder(&["x", "z"]), Err(Error::UnknownDimension { .. })));
}

#[test]
fn test_loop_types() {
    let mut s = Schedule::new(&["x", "y", "c"]).unwrap();
    s.vectorize("x").unwrap().unroll("c").unwrap().parallel("y").unwrap();
    let types: Vec<_> = s.dims().iter().map(|d| d.for_type).collect();
    assert_eq!(types, [ForType::Vectorized, ForType::Parallel, ForType::Unrolled]);
    s.serial("y").unwrap();
    assert_eq!(s.dim("y").unwrap().for_type, ForType::Serial);
    assert!(s.set_for_type("w", ForType::Parallel).is_err());
}

// ============================================================================
// Bounds and storage
// ============================================================================

#[test]
fn test_bound_casts_and_replaces() {
    let mut s = xy();
    s.bound("x", &Expr::int(0), &Expr::make_const(Type::Int16, 100).unwrap()).unwrap();
    let b = s.bound_for("x").unwrap();
    assert_eq!(b.extent.ty(), Type::Int32);

    s.bound("x", &Expr::int(2), &var("w")).unwrap();
    assert_eq!(s.bounds().len(), 1);
    assert_expr_eq(&s.bound_for("x").unwrap().min, &Expr::int(2));
}

#[test]
fn test_bound_on_split_pure_var() {
    let mut s = xy();
    s.split("x", "xo", "xi", &Expr::int(4)).unwrap();
    assert!(s.bound("x", &Expr::int(0), &Expr::int(64)).is_ok());
}

#[test]
fn test_bound_errors() {
    let mut s = xy();
    assert!(matches!(s.bound("z", &Expr::int(0), &Expr::int(1)), Err(Error::UnknownDimension { .. })));
    assert!(matches!(
        s.bound("x", &Expr::float(0.0), &Expr::int(1)),
        Err(Error::InvalidBound { what: "min", .. })
    ));
    assert!(matches!(
        s.bound("x", &Expr::int(0), &typed_var(Type::Bool, "b")),
        Err(Error::InvalidBound { what: "extent", .. })
    ));
}

#[test]
fn test_reorder_storage() {
    let mut s = Schedule::new(&["x", "y", "c"]).unwrap();
    s.reorder_storage(&["c", "x", "y"]).unwrap();
    assert_eq!(s.storage_dims(), ["c", "x", "y"]);
    // Loop order is untouched.
    assert_eq!(names(&s), ["x", "y", "c"]);
    assert!(matches!(s.reorder_storage(&["xi"]), Err(Error::UnknownDimension { .. })));
}

// ============================================================================
// Split replay
// ============================================================================

#[test]
fn test_replay_reproduces_dims() {
    let mut s = Schedule::new(&["x", "y"]).unwrap();
    s.split("x", "xo", "xi", &Expr::int(8))
        .unwrap()
        .rename("y", "row")
        .unwrap()
        .fuse("xo", "row", "tile")
        .unwrap()
        .reorder(&["tile", "xi"])
        .unwrap();

    let replayed = s.replay_splits(&["x", "y"]).unwrap();
    assert_eq!(replayed, ["xi", "tile"]);
    assert_eq!(names(&s), ["tile", "xi"]);
    s.check_splits(&["x", "y"]).unwrap();
}

#[test]
fn test_replay_against_wrong_args_fails() {
    let mut s = xy();
    s.split("x", "xo", "xi", &Expr::int(8)).unwrap();
    assert!(matches!(s.replay_splits(&["a", "b"]), Err(Error::UnknownDimension { .. })));
    assert!(matches!(s.check_splits(&["x", "y", "c"]), Err(Error::InconsistentSplits { .. })));
}

// ============================================================================
// Levels
// ============================================================================

fn consumer_nest() -> LoopNest {
    LoopNest::for_function("g", &xy())
}

#[test]
fn test_compute_at_sets_both_levels() {
    let mut s = xy();
    s.compute_at(LoopLevel::at("g", "y"));
    assert_eq!(s.compute_level(), &LoopLevel::at("g", "y"));
    assert_eq!(s.store_level(), &LoopLevel::at("g", "y"));
    s.validate_levels(&consumer_nest()).unwrap();
}

#[test]
fn test_store_outside_compute_is_valid() {
    let mut s = xy();
    s.compute_at(LoopLevel::at("g", "x")).store_at(LoopLevel::at("g", "y"));
    s.validate_levels(&consumer_nest()).unwrap();
    s.store_root();
    s.validate_levels(&consumer_nest()).unwrap();
}

#[test]
fn test_store_inside_compute_is_rejected() {
    let mut s = xy();
    s.compute_at(LoopLevel::at("g", "y")).store_at(LoopLevel::at("g", "x"));
    let err = s.validate_levels(&consumer_nest()).unwrap_err();
    assert!(matches!(err, Error::StoreInsideCompute { .. }));
    assert_eq!(err.to_string(), "storage level 'g.x' is inside compute level 'g.y'");
}

#[test]
fn test_compute_root_stores_at_root() {
    let mut s = xy();
    s.compute_root();
    assert!(s.compute_level().is_root());
    assert!(s.store_level().is_root());
    s.validate_levels(&LoopNest::new()).unwrap();
}

#[test_case(LoopLevel::Root, LoopLevel::Root, true; "both root")]
#[test_case(LoopLevel::at("g", "y"), LoopLevel::Root, true; "at compute, root store")]
#[test_case(LoopLevel::Root, LoopLevel::at("g", "y"), false; "root compute, outer store")]
#[test_case(LoopLevel::Root, LoopLevel::at("g", "x"), false; "root compute, inner store")]
#[test_case(LoopLevel::at("g", "x"), LoopLevel::at("g", "x"), true; "same loop")]
fn test_store_must_enclose_compute(compute: LoopLevel, store: LoopLevel, valid: bool) {
    let mut s = xy();
    s.compute_at(compute).store_at(store);
    let result = s.validate_levels(&consumer_nest());
    if valid {
        result.unwrap();
    } else {
        assert!(matches!(result, Err(Error::StoreInsideCompute { .. })));
    }
}

#[test]
fn test_level_missing_from_nest_is_rejected() {
    let mut s = xy();
    s.compute_at(LoopLevel::at("h", "x"));
    assert!(matches!(s.validate_levels(&consumer_nest()), Err(Error::LevelNotInNest { .. })));
}

#[test]
fn test_inline_skips_store_check() {
    let mut s = xy();
    s.compute_inline().store_at(LoopLevel::at("h", "x"));
    assert!(s.compute_level().is_inline());
    s.validate_levels(&consumer_nest()).unwrap();
}

#[test]
fn test_split_level_matches_split_loop() {
    let mut consumer = xy();
    consumer.split("x", "xo", "xi", &Expr::int(4)).unwrap();
    let nest = LoopNest::for_function("g", &consumer);

    let mut s = xy();
    s.compute_at(LoopLevel::at("g", "xi")).store_at(LoopLevel::at("g", "xo"));
    s.validate_levels(&nest).unwrap();
}

// ============================================================================
// Display
// ============================================================================

#[test]
fn test_display() {
    let mut s = xy();
    s.split("x", "xo", "xi", &Expr::int(8)).unwrap().parallel("y").unwrap().compute_root();
    let text = s.to_string();
    assert!(text.starts_with("compute: <root>, store: <root>\n"), "{text}");
    assert!(text.contains("split x into xo, xi by 8"), "{text}");
    assert!(text.contains("dims: xi(serial), xo(serial), y(parallel)"), "{text}");
}
