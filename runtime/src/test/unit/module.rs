//! Calling modules built from Rust functions standing in for generated code.

use std::ffi::{c_char, c_void};
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use weft_device::{Buffer, BufferDescriptor};
use weft_dtype::{Argument, Type};

use crate::hooks::{ErrorHandlerFn, ParForFn};
use crate::{ArgValue, CompiledModule, EntryPoints, Error, RawModule, RuntimeHooks, run, serial_par_for};

/// `out(x) = input(x) + k` over the extent of `out`.
unsafe extern "C" fn add_scalar(args: *const *const c_void) -> i32 {
    unsafe {
        let input = &*(*args.add(0)).cast::<BufferDescriptor>();
        let k = *(*args.add(1)).cast::<i32>();
        let out = &mut *(*args.add(2)).cast_mut().cast::<BufferDescriptor>();
        if input.extent[0] < out.extent[0] {
            return -1;
        }
        for x in 0..out.extent[0] as usize {
            let v = *input.host.cast::<i32>().add(x);
            *out.host.cast::<i32>().add(x) = v + k;
        }
        out.host_dirty = true;
    }
    0
}

unsafe extern "C" fn fail(_: *const *const c_void) -> i32 {
    3
}

fn add_scalar_module() -> RawModule {
    let points = EntryPoints::builder()
        .name("add_scalar")
        .signature(vec![Argument::buffer("input", Type::Int32), Argument::scalar("k", Type::Int32)])
        .entry(add_scalar)
        .build();
    unsafe { RawModule::new(points) }
}

fn ramp(extent: i32) -> Buffer {
    let buf = Buffer::new(Type::Int32, &[extent], Some("input")).unwrap();
    for x in 0..extent {
        buf.set(&[x], x * 10).unwrap();
    }
    buf
}

// =========================================================================
// Calling
// =========================================================================

#[test]
fn test_run_writes_output() {
    let module = add_scalar_module();
    let output = Buffer::new(Type::Int32, &[4], Some("out")).unwrap();
    run(&module, &[ramp(4).into(), ArgValue::scalar(5i32)], &output).unwrap();

    let got: Vec<i32> = (0..4).map(|x| output.get(&[x]).unwrap()).collect();
    assert_eq!(got, vec![5, 15, 25, 35]);
    assert!(output.host_dirty());
}

#[test]
fn test_run_reports_entry_failure() {
    let module = add_scalar_module();
    let output = Buffer::new(Type::Int32, &[8], None).unwrap();
    let err = run(&module, &[ramp(4).into(), ArgValue::scalar(5i32)], &output).unwrap_err();
    assert!(matches!(err, Error::EntryFailed { code: -1, .. }));
    assert_eq!(err.to_string(), "function 'add_scalar' returned error code -1");
}

#[test]
fn test_run_rejects_bad_arguments_before_calling() {
    let module = add_scalar_module();
    let output = Buffer::new(Type::Int32, &[4], None).unwrap();
    let err = run(&module, &[ramp(4).into(), ArgValue::scalar(5u32)], &output).unwrap_err();
    assert!(matches!(err, Error::ArgumentType { .. }));
    assert!(!output.host_dirty());
}

#[test]
fn test_nonzero_code_from_argumentless_module() {
    let module = unsafe { RawModule::new(EntryPoints::builder().name("fail").entry(fail).build()) };
    let output = Buffer::new(Type::UInt8, &[1], None).unwrap();
    assert!(matches!(run(&module, &[], &output), Err(Error::EntryFailed { code: 3, .. })));
}

// =========================================================================
// Device routines
// =========================================================================

static UPLOADS: AtomicUsize = AtomicUsize::new(0);

unsafe extern "C" fn upload(buf: *mut BufferDescriptor) {
    UPLOADS.fetch_add(1, Ordering::SeqCst);
    unsafe { (*buf).dev = 42 };
}

unsafe extern "C" fn download(_: *mut BufferDescriptor) {}

unsafe extern "C" fn release(buf: *mut BufferDescriptor) {
    unsafe { (*buf).dev = 0 };
}

/// Checks that the input arrives with its device handle set.
unsafe extern "C" fn expect_uploaded(args: *const *const c_void) -> i32 {
    let input = unsafe { &*(*args).cast::<BufferDescriptor>() };
    if input.dev == 42 && !input.host_dirty { 0 } else { 1 }
}

#[test]
fn test_device_module_uploads_dirty_inputs() {
    let points = EntryPoints::builder()
        .name("device")
        .signature(vec![Argument::buffer("input", Type::Int32)])
        .entry(expect_uploaded)
        .copy_to_host(download)
        .copy_to_dev(upload)
        .free_dev_buffer(release)
        .build();
    let module = unsafe { RawModule::new(points) };
    assert!(module.device_ops().is_some());

    let input = ramp(2);
    assert!(input.host_dirty());
    let output = Buffer::new(Type::Int32, &[2], None).unwrap();
    run(&module, &[input.clone().into()], &output).unwrap();

    assert_eq!(input.device_handle(), 42);
    assert!(!input.host_dirty());
    assert!(input.source_module().is_some());
    // The clean output was not uploaded.
    assert_eq!(output.device_handle(), 0);
    assert_eq!(UPLOADS.load(Ordering::SeqCst), 1);

    input.free_dev_buffer().unwrap();
    assert_eq!(input.device_handle(), 0);
}

#[test]
fn test_partial_device_routines_are_ignored() {
    let points = EntryPoints::builder().name("partial").entry(fail).copy_to_dev(upload).build();
    let module = unsafe { RawModule::new(points) };
    assert!(module.device_ops().is_none());
}

// =========================================================================
// Hooks and shutdown
// =========================================================================

static ERROR_HANDLER: Mutex<Option<ErrorHandlerFn>> = Mutex::new(None);
static PAR_FOR: Mutex<Option<ParForFn>> = Mutex::new(None);

unsafe extern "C" fn set_error_handler(handler: Option<ErrorHandlerFn>) {
    *ERROR_HANDLER.lock() = handler;
}

unsafe extern "C" fn set_par_for(launcher: Option<ParForFn>) {
    *PAR_FOR.lock() = launcher;
}

unsafe extern "C" fn quiet(_: *const c_char) {}

#[test]
fn test_install_hooks_calls_setters() {
    let points = EntryPoints::builder()
        .name("hooked")
        .entry(fail)
        .set_error_handler(set_error_handler)
        .set_custom_do_par_for(set_par_for)
        .build();
    let module = unsafe { RawModule::new(points) };
    let hooks = RuntimeHooks::builder().error_handler(quiet).do_par_for(serial_par_for).build();
    module.install_hooks(&hooks).unwrap();

    assert!(ERROR_HANDLER.lock().is_some());
    assert!(PAR_FOR.lock().is_some());
}

#[test]
fn test_install_hooks_without_setter_fails() {
    let module = unsafe { RawModule::new(EntryPoints::builder().name("bare").entry(fail).build()) };
    module.install_hooks(&RuntimeHooks::default()).unwrap();

    let hooks = RuntimeHooks::builder().trace(ignore_trace).build();
    let err = module.install_hooks(&hooks).unwrap_err();
    assert!(matches!(err, Error::MissingEntryPoint { entry: "trace", .. }));
    assert_eq!(err.to_string(), "module 'bare' has no trace entry point");
}

unsafe extern "C" fn ignore_trace(
    _: *const c_char,
    _: i32,
    _: i32,
    _: i32,
    _: i32,
    _: i32,
    _: *const c_void,
    _: i32,
    _: *const i32,
) {
}

static SHUTDOWNS: AtomicUsize = AtomicUsize::new(0);

unsafe extern "C" fn count_shutdown() {
    SHUTDOWNS.fetch_add(1, Ordering::SeqCst);
}

#[test]
fn test_drop_shuts_down() {
    let points = EntryPoints::builder()
        .name("pooled")
        .entry(fail)
        .shutdown_thread_pool(count_shutdown)
        .shutdown_trace(count_shutdown)
        .build();
    let module = unsafe { RawModule::new(points) };
    drop(module);
    assert_eq!(SHUTDOWNS.load(Ordering::SeqCst), 2);
}
