//! Host-side buffers for weft pipelines.
//!
//! A [`Buffer`] owns a dense, 32-byte aligned host allocation described by a
//! four-dimensional [`BufferDescriptor`], the `#[repr(C)]` record generated
//! code receives. Device memory is never touched here; moving data between
//! host and device goes through the [`DeviceOps`] boundary supplied by a
//! compiled module.

pub mod buffer;
pub mod descriptor;
pub mod error;
pub mod ops;


pub use buffer::Buffer;
pub use descriptor::{BufferDescriptor, MAX_DIMS};
pub use error::{Error, Result};
pub use ops::DeviceOps;
