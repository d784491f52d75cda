use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use snafu::{OptionExt, ensure};
use weft_dtype::{Argument, ScalarBits, Type};

use crate::descriptor::{BufferDescriptor, MAX_DIMS};
use crate::error::*;
use crate::ops::DeviceOps;

static NEXT_BUFFER_ID: AtomicU64 = AtomicU64::new(0);

/// Host allocations are handed out in 32-byte aligned chunks.
#[repr(C, align(32))]
#[derive(Clone, Copy)]
struct HostChunk([u8; 32]);

/// Mutable part of a buffer: the descriptor fields and the host memory.
struct BufferState {
    dev: u64,
    extent: [i32; MAX_DIMS],
    stride: [i32; MAX_DIMS],
    min: [i32; MAX_DIMS],
    host_dirty: bool,
    dev_dirty: bool,
    host: Box<[HostChunk]>,
}

impl BufferState {
    fn host_bytes(&self) -> &[u8] {
        // SAFETY: HostChunk is a plain byte array, so the chunk slice is a
        // contiguous run of initialized bytes.
        unsafe { std::slice::from_raw_parts(self.host.as_ptr().cast::<u8>(), self.host.len() * 32) }
    }

    fn host_bytes_mut(&mut self) -> &mut [u8] {
        // SAFETY: see `host_bytes`.
        unsafe { std::slice::from_raw_parts_mut(self.host.as_mut_ptr().cast::<u8>(), self.host.len() * 32) }
    }

    fn dimensions(&self) -> usize {
        self.extent.iter().position(|&e| e == 0).unwrap_or(MAX_DIMS)
    }
}

#[derive(derive_more::Debug)]
struct BufferContents {
    name: String,
    ty: Type,
    #[debug(skip)]
    state: Mutex<BufferState>,
    source_module: Mutex<Option<Arc<dyn DeviceOps>>>,
}

impl Drop for BufferContents {
    fn drop(&mut self) {
        let state = self.state.get_mut();
        if state.dev == 0 {
            return;
        }
        if let Some(ops) = self.source_module.get_mut().take() {
            let mut desc = BufferDescriptor {
                dev: state.dev,
                host: state.host.as_mut_ptr().cast(),
                extent: state.extent,
                stride: state.stride,
                min: state.min,
                elem_size: self.ty.bytes() as i32,
                host_dirty: state.host_dirty,
                dev_dirty: state.dev_dirty,
            };
            if let Err(error) = ops.free_dev_buffer(&mut desc) {
                tracing::warn!(buffer = %self.name, %error, "failed to free device allocation");
            }
        }
    }
}

/// Shared, identity-bearing handle to a dense host buffer.
///
/// Clones share the same contents; [`Buffer::same_as`] compares identity.
#[derive(Debug, Clone)]
pub struct Buffer(Arc<BufferContents>);

impl Buffer {
    /// Allocate a zeroed buffer with dense strides.
    ///
    /// `extents` lists the size of each used dimension, innermost first. An
    /// empty list creates a zero-dimensional buffer holding one element.
    pub fn new(ty: Type, extents: &[i32], name: Option<&str>) -> Result<Self> {
        ensure!(ty.is_scalar(), VectorElementSnafu { ty });
        ensure!(extents.len() <= MAX_DIMS, TooManyDimensionsSnafu { max: MAX_DIMS, actual: extents.len() });

        let mut extent = [0i32; MAX_DIMS];
        let mut stride = [0i32; MAX_DIMS];
        let mut dense = 1i32;
        for (dim, &e) in extents.iter().enumerate() {
            ensure!(e > 0, NonPositiveExtentSnafu { dim, extent: e });
            extent[dim] = e;
            stride[dim] = dense;
            dense = dense.checked_mul(e).context(SizeOverflowSnafu { extents })?;
        }

        let bytes = ty.bytes().checked_mul(dense as usize).context(SizeOverflowSnafu { extents })?;
        let chunks = bytes.div_ceil(32).max(1);
        let name = match name {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => format!("b{}", NEXT_BUFFER_ID.fetch_add(1, Ordering::Relaxed)),
        };
        tracing::trace!(buffer = %name, %ty, ?extents, bytes, "allocating host buffer");

        let state = BufferState {
            dev: 0,
            extent,
            stride,
            min: [0; MAX_DIMS],
            host_dirty: false,
            dev_dirty: false,
            host: vec![HostChunk([0; 32]); chunks].into_boxed_slice(),
        };
        Ok(Self(Arc::new(BufferContents { name, ty, state: Mutex::new(state), source_module: Mutex::new(None) })))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn ty(&self) -> Type {
        self.0.ty
    }

    /// Compare two handles for identity, not equality of data.
    pub fn same_as(&self, other: &Buffer) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Describe this buffer as a pipeline argument.
    pub fn argument(&self) -> Argument {
        Argument::buffer(self.name(), self.ty())
    }

    // =========================================================================
    // Shape
    // =========================================================================

    /// Number of used dimensions: the index of the first zero extent.
    pub fn dimensions(&self) -> usize {
        self.0.state.lock().dimensions()
    }

    pub fn extent(&self, dim: usize) -> Result<i32> {
        self.check_dim(dim)?;
        Ok(self.0.state.lock().extent[dim])
    }

    /// Distance in elements between neighbours along `dim`.
    pub fn stride(&self, dim: usize) -> Result<i32> {
        self.check_dim(dim)?;
        Ok(self.0.state.lock().stride[dim])
    }

    /// Coordinate that maps to the first element along `dim`.
    pub fn min(&self, dim: usize) -> Result<i32> {
        self.check_dim(dim)?;
        Ok(self.0.state.lock().min[dim])
    }

    /// Move the origin of the domain this buffer represents. Missing
    /// trailing entries are set to zero.
    pub fn set_min(&self, mins: &[i32]) -> Result<()> {
        ensure!(mins.len() <= MAX_DIMS, TooManyDimensionsSnafu { max: MAX_DIMS, actual: mins.len() });
        let mut state = self.0.state.lock();
        state.min = [0; MAX_DIMS];
        state.min[..mins.len()].copy_from_slice(mins);
        Ok(())
    }

    fn check_dim(&self, dim: usize) -> Result<()> {
        ensure!(dim < MAX_DIMS, DimensionOutOfRangeSnafu { dim, dimensions: MAX_DIMS });
        Ok(())
    }

    // =========================================================================
    // Device State
    // =========================================================================

    /// Device-side handle, zero if no device was ever involved.
    pub fn device_handle(&self) -> u64 {
        self.0.state.lock().dev
    }

    pub fn host_dirty(&self) -> bool {
        self.0.state.lock().host_dirty
    }

    /// Mark the host copy as modified since the last upload.
    pub fn set_host_dirty(&self, dirty: bool) {
        self.0.state.lock().host_dirty = dirty;
    }

    pub fn device_dirty(&self) -> bool {
        self.0.state.lock().dev_dirty
    }

    /// Mark the device copy as modified since the last download.
    pub fn set_device_dirty(&self, dirty: bool) {
        self.0.state.lock().dev_dirty = dirty;
    }

    /// Snapshot of the descriptor. The host pointer stays valid for as long
    /// as any handle to this buffer is alive.
    pub fn descriptor(&self) -> BufferDescriptor {
        let mut state = self.0.state.lock();
        BufferDescriptor {
            dev: state.dev,
            host: state.host.as_mut_ptr().cast(),
            extent: state.extent,
            stride: state.stride,
            min: state.min,
            elem_size: self.0.ty.bytes() as i32,
            host_dirty: state.host_dirty,
            dev_dirty: state.dev_dirty,
        }
    }

    /// Take back the fields generated code is allowed to change: the device
    /// handle and both dirty flags.
    pub fn absorb(&self, desc: &BufferDescriptor) {
        let mut state = self.0.state.lock();
        state.dev = desc.dev;
        state.host_dirty = desc.host_dirty;
        state.dev_dirty = desc.dev_dirty;
    }

    /// Record the module whose transfer routines own this buffer's device
    /// allocation.
    pub fn set_source_module(&self, ops: Arc<dyn DeviceOps>) {
        *self.0.source_module.lock() = Some(ops);
    }

    pub fn source_module(&self) -> Option<Arc<dyn DeviceOps>> {
        self.0.source_module.lock().clone()
    }

    fn with_device_op(&self, op: impl FnOnce(&dyn DeviceOps, &mut BufferDescriptor) -> Result<()>) -> Result<()> {
        let Some(ops) = self.source_module() else {
            return Ok(());
        };
        let mut desc = self.descriptor();
        op(ops.as_ref(), &mut desc)?;
        self.absorb(&desc);
        Ok(())
    }

    /// Download device data through the source module, if any.
    pub fn copy_to_host(&self) -> Result<()> {
        self.with_device_op(|ops, desc| ops.copy_to_host(desc))
    }

    /// Upload host data through the source module, if any.
    pub fn copy_to_dev(&self) -> Result<()> {
        self.with_device_op(|ops, desc| ops.copy_to_dev(desc))
    }

    /// Release the device allocation through the source module, if any.
    pub fn free_dev_buffer(&self) -> Result<()> {
        self.with_device_op(|ops, desc| ops.free_dev_buffer(desc))
    }

    /// Download only when the device copy is newer.
    pub fn sync_to_host(&self) -> Result<()> {
        if self.device_dirty() {
            tracing::debug!(buffer = %self.name(), "device copy is dirty, copying back");
            self.copy_to_host()?;
            self.set_device_dirty(false);
        }
        Ok(())
    }

    /// Upload only when the host copy is newer.
    pub fn sync_to_device(&self) -> Result<()> {
        if self.host_dirty() {
            tracing::debug!(buffer = %self.name(), "host copy is dirty, uploading");
            self.copy_to_dev()?;
            self.set_host_dirty(false);
        }
        Ok(())
    }

    // =========================================================================
    // Element Access
    // =========================================================================

    /// Byte offset of the element at `coords`, given in domain coordinates.
    fn element_offset(&self, state: &BufferState, coords: &[i32]) -> Result<usize> {
        let dimensions = state.dimensions();
        ensure!(coords.len() == dimensions, CoordinateCountSnafu { expected: dimensions, actual: coords.len() });
        let mut index = 0i64;
        for (dim, &coord) in coords.iter().enumerate() {
            let (min, extent) = (state.min[dim], state.extent[dim]);
            let local = i64::from(coord) - i64::from(min);
            ensure!((0..i64::from(extent)).contains(&local), CoordinateOutOfBoundsSnafu { dim, coord, min, extent });
            index += local * i64::from(state.stride[dim]);
        }
        Ok(index as usize * self.0.ty.bytes())
    }

    fn check_access<T: ScalarBits>(&self) -> Result<()> {
        ensure!(
            T::TYPE == self.0.ty,
            ElementTypeMismatchSnafu { name: self.0.name.clone(), expected: self.0.ty, actual: T::TYPE }
        );
        Ok(())
    }

    /// Read one element.
    pub fn get<T: ScalarBits>(&self, coords: &[i32]) -> Result<T> {
        self.check_access::<T>()?;
        let state = self.0.state.lock();
        let offset = self.element_offset(&state, coords)?;
        let size = self.0.ty.bytes();
        let mut raw = [0u8; 8];
        let bytes = &state.host_bytes()[offset..offset + size];
        let bits = if cfg!(target_endian = "little") {
            raw[..size].copy_from_slice(bytes);
            u64::from_le_bytes(raw)
        } else {
            raw[8 - size..].copy_from_slice(bytes);
            u64::from_be_bytes(raw)
        };
        Ok(T::from_bits(bits))
    }

    /// Write one element and mark the host copy dirty.
    pub fn set<T: ScalarBits>(&self, coords: &[i32], value: T) -> Result<()> {
        self.check_access::<T>()?;
        let mut state = self.0.state.lock();
        let offset = self.element_offset(&state, coords)?;
        let size = self.0.ty.bytes();
        let bits = value.to_bits();
        let dst = &mut state.host_bytes_mut()[offset..offset + size];
        if cfg!(target_endian = "little") {
            dst.copy_from_slice(&bits.to_le_bytes()[..size]);
        } else {
            dst.copy_from_slice(&bits.to_be_bytes()[8 - size..]);
        }
        state.host_dirty = true;
        Ok(())
    }
}
