//! Calling compiled weft pipelines.
//!
//! Code generation happens elsewhere; this crate models only the boundary a
//! compiled module exposes:
//!
//! - the calling convention, where [`pack_arguments`] lays buffers and
//!   scalars out as the pointer array an entry point takes;
//! - the [`RuntimeHooks`] generated code calls back into;
//! - the [`CompiledModule`] trait and [`run`], which checks arguments,
//!   moves buffers to the module's device and calls the entry point.

pub mod args;
pub mod error;
pub mod hooks;
pub mod module;


pub use args::{ArgValue, PackedArguments, check_arguments, pack_arguments};
pub use error::*;
pub use hooks::{Allocator, RuntimeHooks, TraceEvent, serial_do_task, serial_par_for};
pub use module::{CompiledModule, EntryPoints, RawModule, run};
