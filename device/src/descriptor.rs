//! The raw buffer record shared with generated code.

use std::ptr;

/// Number of dimensions a descriptor can describe.
pub const MAX_DIMS: usize = 4;

/// C-layout buffer descriptor.
///
/// The address of element `(x, y, z, w)` is
/// `host + ((x - min[0]) * stride[0] + ... + (w - min[3]) * stride[3]) * elem_size`.
/// Strides are counted in elements. Unused trailing dimensions have extent 0.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferDescriptor {
    /// Device-side handle, zero when no device allocation exists.
    pub dev: u64,
    /// Host memory, may be null.
    pub host: *mut u8,
    pub extent: [i32; MAX_DIMS],
    pub stride: [i32; MAX_DIMS],
    pub min: [i32; MAX_DIMS],
    pub elem_size: i32,
    /// Host copy was modified after the last upload.
    pub host_dirty: bool,
    /// Device copy was modified after the last download.
    pub dev_dirty: bool,
}

impl Default for BufferDescriptor {
    fn default() -> Self {
        Self {
            dev: 0,
            host: ptr::null_mut(),
            extent: [0; MAX_DIMS],
            stride: [0; MAX_DIMS],
            min: [0; MAX_DIMS],
            elem_size: 0,
            host_dirty: false,
            dev_dirty: false,
        }
    }
}

impl BufferDescriptor {
    /// Index of the first zero extent.
    pub fn dimensions(&self) -> usize {
        self.extent.iter().position(|&e| e == 0).unwrap_or(MAX_DIMS)
    }

    /// Number of elements covered by the used dimensions.
    pub fn element_count(&self) -> usize {
        self.extent[..self.dimensions()].iter().map(|&e| e as usize).product()
    }
}
