//! Mapping between Rust native types and [`Type`].

use super::*;

pub trait HasType {
    const TYPE: Type;
}

macro_rules! impl_has_type {
    ($($ty:ty => $wt:expr),* $(,)?) => {
        $(impl HasType for $ty { const TYPE: Type = $wt; })*
    };
}

impl_has_type! {
    bool => Type::Bool,
    i8 => Type::Int8, i16 => Type::Int16, i32 => Type::Int32, i64 => Type::Int64,
    u8 => Type::UInt8, u16 => Type::UInt16, u32 => Type::UInt32, u64 => Type::UInt64,
    f32 => Type::Float32, f64 => Type::Float64,
}

impl<T> HasType for *const T {
    const TYPE: Type = Type::Handle;
}

impl<T> HasType for *mut T {
    const TYPE: Type = Type::Handle;
}

/// Conversion to and from a 64-bit storage cell.
///
/// Scalar parameters keep their current value in a `u64` regardless of type;
/// the value lives in the low `size_of::<Self>()` bytes.
pub trait ScalarBits: HasType + Copy {
    fn to_bits(self) -> u64;
    fn from_bits(bits: u64) -> Self;
}

macro_rules! impl_scalar_bits_int {
    ($($ty:ty => $unsigned:ty),* $(,)?) => {
        $(impl ScalarBits for $ty {
            fn to_bits(self) -> u64 {
                self as $unsigned as u64
            }

            fn from_bits(bits: u64) -> Self {
                bits as $unsigned as $ty
            }
        })*
    };
}

impl_scalar_bits_int! {
    i8 => u8, i16 => u16, i32 => u32, i64 => u64,
    u8 => u8, u16 => u16, u32 => u32, u64 => u64,
}

impl ScalarBits for bool {
    fn to_bits(self) -> u64 {
        self as u64
    }

    fn from_bits(bits: u64) -> Self {
        bits & 1 != 0
    }
}

impl ScalarBits for f32 {
    fn to_bits(self) -> u64 {
        f32::to_bits(self) as u64
    }

    fn from_bits(bits: u64) -> Self {
        f32::from_bits(bits as u32)
    }
}

impl ScalarBits for f64 {
    fn to_bits(self) -> u64 {
        f64::to_bits(self)
    }

    fn from_bits(bits: u64) -> Self {
        f64::from_bits(bits)
    }
}
