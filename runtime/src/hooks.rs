//! Hooks generated code calls back into.
//!
//! A compiled module declares allocation, parallel loops, tasks, error
//! reporting and tracing but leaves their implementation to the embedder.
//! Each hook is an `extern "C"` function pointer; an unset hook leaves the
//! module's built-in behavior in place.

use std::ffi::{c_char, c_void};

/// Receives a NUL-terminated diagnostic when generated code fails.
pub type ErrorHandlerFn = unsafe extern "C" fn(message: *const c_char);

pub type MallocFn = unsafe extern "C" fn(size: usize) -> *mut c_void;
pub type FreeFn = unsafe extern "C" fn(ptr: *mut c_void);

/// Body of one parallel loop iteration. Returns zero on success.
pub type TaskFn = unsafe extern "C" fn(index: i32, closure: *mut u8) -> i32;

/// Runs `task` for every index in `[min, min + extent)`.
pub type ParForFn = unsafe extern "C" fn(task: TaskFn, min: i32, extent: i32, closure: *mut u8) -> i32;

/// Runs `task` for a single index.
pub type DoTaskFn = unsafe extern "C" fn(task: TaskFn, index: i32, closure: *mut u8) -> i32;

/// Receives one trace event: function name, event code, element type code,
/// bits, lanes, value index, value pointer, coordinate count and
/// coordinates.
pub type TraceFn = unsafe extern "C" fn(
    func: *const c_char,
    event: i32,
    type_code: i32,
    bits: i32,
    lanes: i32,
    value_index: i32,
    value: *const c_void,
    dimensions: i32,
    coordinates: *const i32,
);

/// Event codes passed as the second argument of a [`TraceFn`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::FromRepr)]
#[strum(serialize_all = "snake_case")]
#[repr(i32)]
pub enum TraceEvent {
    Load = 0,
    Store = 1,
    BeginRealization = 2,
    EndRealization = 3,
    Produce = 4,
    Update = 5,
    Consume = 6,
    EndConsume = 7,
}

impl TraceEvent {
    pub fn from_code(code: i32) -> Option<Self> {
        Self::from_repr(code)
    }
}

/// A replacement for the module's heap. Both halves are installed together.
#[derive(Debug, Clone, Copy)]
pub struct Allocator {
    pub malloc: MallocFn,
    pub free: FreeFn,
}

/// Custom hooks to install into a compiled module.
///
/// ```ignore
/// let hooks = RuntimeHooks::builder().do_par_for(serial_par_for).build();
/// module.install_hooks(&hooks)?;
/// ```
#[derive(Debug, Clone, Copy, Default, bon::Builder)]
pub struct RuntimeHooks {
    pub error_handler: Option<ErrorHandlerFn>,
    pub allocator: Option<Allocator>,
    pub do_par_for: Option<ParForFn>,
    pub do_task: Option<DoTaskFn>,
    pub trace: Option<TraceFn>,
}

impl RuntimeHooks {
    pub fn is_empty(&self) -> bool {
        self.error_handler.is_none()
            && self.allocator.is_none()
            && self.do_par_for.is_none()
            && self.do_task.is_none()
            && self.trace.is_none()
    }

    /// These hooks, with every hook set in `overrides` taking precedence.
    pub fn merged(self, overrides: &RuntimeHooks) -> Self {
        Self {
            error_handler: overrides.error_handler.or(self.error_handler),
            allocator: overrides.allocator.or(self.allocator),
            do_par_for: overrides.do_par_for.or(self.do_par_for),
            do_task: overrides.do_task.or(self.do_task),
            trace: overrides.trace.or(self.trace),
        }
    }
}

/// A parallel-for launcher that runs every iteration on the calling thread,
/// in order, stopping at the first failing one.
///
/// # Safety
///
/// `task` must be safe to call with every index in `[min, min + extent)`
/// and `closure`.
pub unsafe extern "C" fn serial_par_for(task: TaskFn, min: i32, extent: i32, closure: *mut u8) -> i32 {
    let end = min.saturating_add(extent.max(0));
    for index in min..end {
        let code = unsafe { task(index, closure) };
        if code != 0 {
            return code;
        }
    }
    0
}

/// A task launcher that runs the task on the calling thread.
///
/// # Safety
///
/// `task` must be safe to call with `index` and `closure`.
pub unsafe extern "C" fn serial_do_task(task: TaskFn, index: i32, closure: *mut u8) -> i32 {
    unsafe { task(index, closure) }
}
