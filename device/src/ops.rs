use crate::descriptor::BufferDescriptor;
use crate::error::Result;

/// Host/device transfer entry points exported by a compiled module.
///
/// Each call receives the descriptor of the buffer being moved and may update
/// its `dev` handle and dirty flags.
pub trait DeviceOps: Send + Sync + std::fmt::Debug {
    fn copy_to_host(&self, buf: &mut BufferDescriptor) -> Result<()>;
    fn copy_to_dev(&self, buf: &mut BufferDescriptor) -> Result<()>;
    fn free_dev_buffer(&self, buf: &mut BufferDescriptor) -> Result<()>;
}
