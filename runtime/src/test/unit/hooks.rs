use std::ffi::c_char;

use test_case::test_case;

use crate::hooks::TaskFn;
use crate::{RuntimeHooks, TraceEvent, serial_do_task, serial_par_for};

unsafe extern "C" fn record(index: i32, closure: *mut u8) -> i32 {
    let seen = unsafe { &mut *closure.cast::<Vec<i32>>() };
    seen.push(index);
    if index == 13 { 1 } else { 0 }
}

unsafe extern "C" fn ignore_errors(_: *const c_char) {}

unsafe extern "C" fn refuse_par_for(_: TaskFn, _: i32, _: i32, _: *mut u8) -> i32 {
    -1
}

fn run_par_for(min: i32, extent: i32) -> (i32, Vec<i32>) {
    let mut seen = Vec::new();
    let closure = (&mut seen as *mut Vec<i32>).cast::<u8>();
    let code = unsafe { serial_par_for(record as TaskFn, min, extent, closure) };
    (code, seen)
}

// =========================================================================
// Serial launchers
// =========================================================================

#[test]
fn test_serial_par_for_runs_in_order() {
    assert_eq!(run_par_for(2, 4), (0, vec![2, 3, 4, 5]));
}

#[test]
fn test_serial_par_for_stops_at_failure() {
    assert_eq!(run_par_for(10, 10), (1, vec![10, 11, 12, 13]));
}

#[test_case(5, 0; "empty")]
#[test_case(5, -3; "negative extent")]
fn test_serial_par_for_no_iterations(min: i32, extent: i32) {
    assert_eq!(run_par_for(min, extent), (0, vec![]));
}

#[test]
fn test_serial_do_task() {
    let mut seen = Vec::new();
    let closure = (&mut seen as *mut Vec<i32>).cast::<u8>();
    assert_eq!(unsafe { serial_do_task(record, 13, closure) }, 1);
    assert_eq!(seen, vec![13]);
}

// =========================================================================
// Hook table
// =========================================================================

#[test]
fn test_default_hooks_are_empty() {
    assert!(RuntimeHooks::default().is_empty());
    assert!(RuntimeHooks::builder().build().is_empty());
    assert!(!RuntimeHooks::builder().do_task(serial_do_task).build().is_empty());
}

#[test]
fn test_merged_prefers_overrides() {
    let base = RuntimeHooks::builder().error_handler(ignore_errors).do_par_for(serial_par_for).build();
    let overrides = RuntimeHooks::builder().do_par_for(refuse_par_for).build();
    let merged = base.merged(&overrides);

    let par_for = merged.do_par_for.unwrap();
    let mut seen = Vec::new();
    let closure = (&mut seen as *mut Vec<i32>).cast::<u8>();
    assert_eq!(unsafe { par_for(record, 0, 3, closure) }, -1);
    assert!(seen.is_empty());
    assert!(merged.error_handler.is_some());
    assert!(merged.do_task.is_none());
}

#[test_case(0, Some(TraceEvent::Load); "load")]
#[test_case(3, Some(TraceEvent::EndRealization); "end realization")]
#[test_case(7, Some(TraceEvent::EndConsume); "end consume")]
#[test_case(8, None; "past the end")]
#[test_case(-1, None; "negative")]
fn test_trace_event_codes(code: i32, expected: Option<TraceEvent>) {
    assert_eq!(TraceEvent::from_code(code), expected);
}

#[test]
fn test_trace_event_display() {
    assert_eq!(TraceEvent::BeginRealization.to_string(), "begin_realization");
    assert_eq!(TraceEvent::Produce.to_string(), "produce");
}
