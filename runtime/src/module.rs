//! Compiled modules and calling them.

use std::ffi::c_void;
use std::sync::Arc;

use snafu::{ResultExt, ensure};
use weft_device::{Buffer, BufferDescriptor, DeviceOps};
use weft_dtype::Argument;

use crate::args::{ArgValue, check_arguments, pack_arguments};
use crate::error::*;
use crate::hooks::{DoTaskFn, ErrorHandlerFn, FreeFn, MallocFn, ParForFn, RuntimeHooks, TraceFn};

/// A compiled pipeline ready to be called.
///
/// Implementations wrap whatever a code generator produced (a JIT session,
/// a loaded shared library, an interpreter for tests).
///
/// # Safety
///
/// [`call_raw`](Self::call_raw) must be sound for any pointer array laid
/// out by [`pack_arguments`] from [`signature`](Self::signature): it may
/// only read and write through those pointers as the argument types allow.
pub unsafe trait CompiledModule: Send + Sync {
    /// Name of the entry point, for diagnostics.
    fn name(&self) -> &str;

    /// Arguments of the entry point, without the trailing output buffer.
    fn signature(&self) -> &[Argument];

    /// Call the entry point and return its status code, zero on success.
    ///
    /// # Safety
    ///
    /// `args` must hold one valid pointer per signature entry followed by
    /// the output descriptor, each live and unaliased for the whole call.
    unsafe fn call_raw(&self, args: &[*const c_void]) -> i32;

    /// Transfer routines for buffers this module places on a device. Host
    /// only modules have none.
    fn device_ops(&self) -> Option<Arc<dyn DeviceOps>> {
        None
    }

    /// Install every hook set in `hooks`.
    fn install_hooks(&self, hooks: &RuntimeHooks) -> Result<()>;

    /// Stop worker threads and close trace output. Also done when the module
    /// is dropped.
    fn shutdown(&self) {}
}

/// Call `module` with `values`, writing into `output`.
///
/// Buffers without a source module are attached to this module's device
/// routines and uploaded when their host copy is dirty. The device handles
/// and dirty flags left by the call are written back to every buffer.
#[tracing::instrument(skip_all, fields(function = module.name()))]
pub fn run(module: &dyn CompiledModule, values: &[ArgValue], output: &Buffer) -> Result<()> {
    check_arguments(module.signature(), values)?;
    if let Some(ops) = module.device_ops() {
        for buffer in values.iter().filter_map(ArgValue::as_buffer).chain([output]) {
            if buffer.source_module().is_none() {
                buffer.set_source_module(ops.clone());
            }
            buffer.sync_to_device().context(DeviceSnafu)?;
        }
    }
    let packed = pack_arguments(module.signature(), values, output)?;

    // SAFETY: `packed` was laid out from the module's own signature and
    // outlives the call.
    let code = unsafe { module.call_raw(packed.pointers()) };
    packed.write_back();
    tracing::debug!(code, "entry point returned");
    ensure!(code == 0, EntryFailedSnafu { function: module.name(), code });
    Ok(())
}

// ============================================================================
// Function-pointer modules
// ============================================================================

/// Entry point taking the packed argument array.
pub type EntryFn = unsafe extern "C" fn(args: *const *const c_void) -> i32;
pub type BufferFn = unsafe extern "C" fn(buf: *mut BufferDescriptor);
pub type SetErrorHandlerFn = unsafe extern "C" fn(handler: Option<ErrorHandlerFn>);
pub type SetAllocatorFn = unsafe extern "C" fn(malloc: Option<MallocFn>, free: Option<FreeFn>);
pub type SetParForFn = unsafe extern "C" fn(launcher: Option<ParForFn>);
pub type SetDoTaskFn = unsafe extern "C" fn(launcher: Option<DoTaskFn>);
pub type SetTraceFn = unsafe extern "C" fn(trace: Option<TraceFn>);
pub type ShutdownFn = unsafe extern "C" fn();

/// Addresses a code generator resolved in a compiled module. Only `entry`
/// is required.
#[derive(Debug, Clone, bon::Builder)]
pub struct EntryPoints {
    #[builder(into)]
    pub name: String,
    #[builder(default)]
    pub signature: Vec<Argument>,
    pub entry: EntryFn,
    pub copy_to_host: Option<BufferFn>,
    pub copy_to_dev: Option<BufferFn>,
    pub free_dev_buffer: Option<BufferFn>,
    pub set_error_handler: Option<SetErrorHandlerFn>,
    pub set_custom_allocator: Option<SetAllocatorFn>,
    pub set_custom_do_par_for: Option<SetParForFn>,
    pub set_custom_do_task: Option<SetDoTaskFn>,
    pub set_custom_trace: Option<SetTraceFn>,
    pub shutdown_thread_pool: Option<ShutdownFn>,
    pub shutdown_trace: Option<ShutdownFn>,
}

/// Device routines exported by a module.
#[derive(Debug, Clone, Copy)]
struct ExportedDeviceOps {
    copy_to_host: BufferFn,
    copy_to_dev: BufferFn,
    free_dev_buffer: BufferFn,
}

impl DeviceOps for ExportedDeviceOps {
    fn copy_to_host(&self, buf: &mut BufferDescriptor) -> weft_device::Result<()> {
        // SAFETY: the descriptor is a live snapshot of a buffer.
        unsafe { (self.copy_to_host)(buf) };
        Ok(())
    }

    fn copy_to_dev(&self, buf: &mut BufferDescriptor) -> weft_device::Result<()> {
        // SAFETY: as above.
        unsafe { (self.copy_to_dev)(buf) };
        Ok(())
    }

    fn free_dev_buffer(&self, buf: &mut BufferDescriptor) -> weft_device::Result<()> {
        // SAFETY: as above.
        unsafe { (self.free_dev_buffer)(buf) };
        Ok(())
    }
}

/// A module made of raw function pointers.
#[derive(Debug)]
pub struct RawModule {
    points: EntryPoints,
    device: Option<Arc<dyn DeviceOps>>,
}

impl RawModule {
    /// # Safety
    ///
    /// Every address in `points` must stay callable for the lifetime of the
    /// module, and `entry` must accept argument arrays laid out from
    /// `points.signature`.
    pub unsafe fn new(points: EntryPoints) -> Self {
        let device = match (points.copy_to_host, points.copy_to_dev, points.free_dev_buffer) {
            (Some(copy_to_host), Some(copy_to_dev), Some(free_dev_buffer)) => {
                Some(Arc::new(ExportedDeviceOps { copy_to_host, copy_to_dev, free_dev_buffer }) as Arc<dyn DeviceOps>)
            }
            _ => None,
        };
        tracing::debug!(module = %points.name, arguments = points.signature.len(), device = device.is_some(), "module loaded");
        Self { points, device }
    }

    pub fn entry_points(&self) -> &EntryPoints {
        &self.points
    }
}

// SAFETY: `RawModule::new` requires `entry` to accept arrays laid out from
// the signature it stores.
unsafe impl CompiledModule for RawModule {
    fn name(&self) -> &str {
        &self.points.name
    }

    fn signature(&self) -> &[Argument] {
        &self.points.signature
    }

    unsafe fn call_raw(&self, args: &[*const c_void]) -> i32 {
        unsafe { (self.points.entry)(args.as_ptr()) }
    }

    fn device_ops(&self) -> Option<Arc<dyn DeviceOps>> {
        self.device.clone()
    }

    fn install_hooks(&self, hooks: &RuntimeHooks) -> Result<()> {
        let p = &self.points;
        let missing = |entry: &'static str| MissingEntryPointSnafu { module: p.name.as_str(), entry };
        // Check everything first so a failure installs nothing.
        ensure!(hooks.error_handler.is_none() || p.set_error_handler.is_some(), missing("error handler"));
        ensure!(hooks.allocator.is_none() || p.set_custom_allocator.is_some(), missing("allocator"));
        ensure!(hooks.do_par_for.is_none() || p.set_custom_do_par_for.is_some(), missing("parallel for"));
        ensure!(hooks.do_task.is_none() || p.set_custom_do_task.is_some(), missing("task"));
        ensure!(hooks.trace.is_none() || p.set_custom_trace.is_some(), missing("trace"));

        // SAFETY: the setters were resolved from this module and only store
        // the pointers they are given.
        unsafe {
            if let (Some(handler), Some(set)) = (hooks.error_handler, p.set_error_handler) {
                set(Some(handler));
            }
            if let (Some(alloc), Some(set)) = (hooks.allocator, p.set_custom_allocator) {
                set(Some(alloc.malloc), Some(alloc.free));
            }
            if let (Some(launcher), Some(set)) = (hooks.do_par_for, p.set_custom_do_par_for) {
                set(Some(launcher));
            }
            if let (Some(launcher), Some(set)) = (hooks.do_task, p.set_custom_do_task) {
                set(Some(launcher));
            }
            if let (Some(trace), Some(set)) = (hooks.trace, p.set_custom_trace) {
                set(Some(trace));
            }
        }
        tracing::debug!(module = %p.name, ?hooks, "hooks installed");
        Ok(())
    }

    fn shutdown(&self) {
        // SAFETY: shutdown routines take no arguments and may run repeatedly.
        unsafe {
            if let Some(stop) = self.points.shutdown_thread_pool {
                stop();
            }
            if let Some(stop) = self.points.shutdown_trace {
                stop();
            }
        }
    }
}

impl Drop for RawModule {
    fn drop(&mut self) {
        self.shutdown();
    }
}
