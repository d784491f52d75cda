//! Argument packing for the generated-function calling convention.
//!
//! A compiled entry point takes one pointer per argument: buffers pass a
//! pointer to their [`BufferDescriptor`], scalars a pointer to a 64-bit cell
//! holding the value in its native width. The output buffer's descriptor
//! comes last.

use std::ffi::c_void;
use std::iter;

use smallvec::SmallVec;
use snafu::{ResultExt, ensure};
use weft_device::{Buffer, BufferDescriptor};
use weft_dtype::{Argument, ScalarBits, Type};
use weft_ir::Parameter;

use crate::error::*;

/// A value for one argument of a compiled function.
#[derive(Debug, Clone)]
pub enum ArgValue {
    Buffer(Buffer),
    /// A scalar as stored by [`ScalarBits`], zero-extended to 64 bits.
    Scalar { ty: Type, bits: u64 },
}

impl ArgValue {
    pub fn scalar<T: ScalarBits>(value: T) -> Self {
        Self::Scalar { ty: T::TYPE, bits: value.to_bits() }
    }

    /// The current value of a parameter: its bound buffer, or its scalar
    /// contents.
    pub fn from_parameter(param: &Parameter) -> Result<Self> {
        let name = param.name();
        if param.is_buffer() {
            let buffer = param.buffer_value().context(ParameterSnafu { name })?;
            return buffer.map(Self::Buffer).ok_or_else(|| UnboundParameterSnafu { name }.build());
        }
        let bits = param.scalar_bits().context(ParameterSnafu { name })?;
        Ok(Self::Scalar { ty: param.ty(), bits })
    }

    pub fn ty(&self) -> Type {
        match self {
            Self::Buffer(buffer) => buffer.ty(),
            Self::Scalar { ty, .. } => *ty,
        }
    }

    pub fn as_buffer(&self) -> Option<&Buffer> {
        match self {
            Self::Buffer(buffer) => Some(buffer),
            Self::Scalar { .. } => None,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Buffer(_) => "buffer",
            Self::Scalar { .. } => "scalar",
        }
    }
}

impl From<Buffer> for ArgValue {
    fn from(buffer: Buffer) -> Self {
        Self::Buffer(buffer)
    }
}

/// Lay `bits` out so the first `ty.bytes()` bytes of the cell hold the
/// value in native byte order.
fn scalar_cell(ty: Type, bits: u64) -> u64 {
    let shift = 64 - 8 * ty.bytes().min(8) as u32;
    if cfg!(target_endian = "big") { bits << shift } else { bits }
}

/// Owned argument storage plus the pointer array referring into it.
///
/// The storage is boxed so the pointers stay valid when this value moves.
#[derive(Debug)]
pub struct PackedArguments {
    buffers: Vec<Buffer>,
    descriptors: Box<[BufferDescriptor]>,
    scalars: Box<[u64]>,
    pointers: SmallVec<[*const c_void; 8]>,
}

impl PackedArguments {
    /// The argument array to pass to the entry point.
    pub fn pointers(&self) -> &[*const c_void] {
        &self.pointers
    }

    /// Descriptor slot of the `index`-th buffer argument, the output being
    /// the last one.
    pub fn descriptor(&self, index: usize) -> Option<&BufferDescriptor> {
        self.descriptors.get(index)
    }

    pub fn scalar_cells(&self) -> &[u64] {
        &self.scalars
    }

    /// Hand the fields generated code may change back to the buffers.
    pub fn write_back(&self) {
        for (buffer, desc) in self.buffers.iter().zip(self.descriptors.iter()) {
            buffer.absorb(desc);
        }
    }
}

/// Check that `values` match `signature` in count, kind and type.
pub fn check_arguments(signature: &[Argument], values: &[ArgValue]) -> Result<()> {
    ensure!(values.len() == signature.len(), ArgumentCountSnafu { expected: signature.len(), actual: values.len() });
    for (arg, value) in signature.iter().zip(values) {
        let expected = if arg.is_buffer { "buffer" } else { "scalar" };
        ensure!(expected == value.kind(), ArgumentKindSnafu { name: &arg.name, expected, actual: value.kind() });
        ensure!(arg.ty == value.ty(), ArgumentTypeSnafu { name: &arg.name, expected: arg.ty, actual: value.ty() });
    }
    Ok(())
}

/// Check `values` against `signature` and lay them out for a call.
pub fn pack_arguments(signature: &[Argument], values: &[ArgValue], output: &Buffer) -> Result<PackedArguments> {
    check_arguments(signature, values)?;

    let buffers: Vec<Buffer> =
        values.iter().filter_map(ArgValue::as_buffer).chain(iter::once(output)).cloned().collect();
    let mut descriptors: Box<[BufferDescriptor]> = buffers.iter().map(Buffer::descriptor).collect();
    let mut scalars: Box<[u64]> = values
        .iter()
        .filter_map(|v| match v {
            ArgValue::Scalar { ty, bits } => Some(scalar_cell(*ty, *bits)),
            ArgValue::Buffer(_) => None,
        })
        .collect();

    let descriptor_base = descriptors.as_mut_ptr();
    let scalar_base = scalars.as_mut_ptr();
    let (mut next_buffer, mut next_scalar) = (0, 0);
    let mut pointers = SmallVec::with_capacity(values.len() + 1);
    for value in values {
        // Both indices stay below the lengths of the slices counted above.
        let ptr = match value {
            ArgValue::Buffer(_) => {
                next_buffer += 1;
                descriptor_base.wrapping_add(next_buffer - 1).cast::<c_void>()
            }
            ArgValue::Scalar { .. } => {
                next_scalar += 1;
                scalar_base.wrapping_add(next_scalar - 1).cast::<c_void>()
            }
        };
        pointers.push(ptr.cast_const());
    }
    pointers.push(descriptor_base.wrapping_add(next_buffer).cast::<c_void>().cast_const());

    tracing::trace!(arguments = values.len(), buffers = buffers.len(), "packed arguments");
    Ok(PackedArguments { buffers, descriptors, scalars, pointers })
}
