//! Value types for the weft IR.
//!
//! A [`Type`] is a `(kind, bits, lanes)` triple. It is a plain value: two
//! types are equal iff all three fields match. Scalars have one lane, vectors
//! have more. Booleans are single-bit unsigned integers.

pub mod error;
pub mod ext;

#[cfg(any(test, feature = "proptest"))]
pub mod proptest_gen;


use std::fmt;

pub use error::{Error, Result};
pub use ext::{HasType, ScalarBits};

use snafu::ensure;

/// Broad family of a [`Type`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(strum::EnumCount, strum::EnumIter, strum::VariantArray, strum::IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "lowercase")]
pub enum TypeKind {
    /// Signed two's complement integer.
    Int,
    /// Unsigned integer. One-bit unsigned integers are booleans.
    UInt,
    /// IEEE floating point.
    Float,
    /// Opaque pointer-sized value.
    Handle,
}

impl TypeKind {
    /// Bit widths this kind admits.
    pub const fn valid_bits(self, bits: u8) -> bool {
        match self {
            Self::Int => matches!(bits, 8 | 16 | 32 | 64),
            Self::UInt => matches!(bits, 1 | 8 | 16 | 32 | 64),
            Self::Float => matches!(bits, 16 | 32 | 64),
            Self::Handle => bits == 64,
        }
    }
}

/// Scalar or vector value type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Type {
    kind: TypeKind,
    bits: u8,
    lanes: u16,
}

impl Type {
    // =========================================================================
    // Type Constructors
    // =========================================================================

    /// Validated constructor.
    pub fn try_new(kind: TypeKind, bits: u8, lanes: u16) -> Result<Self> {
        ensure!(kind.valid_bits(bits), error::InvalidBitsSnafu { kind, bits });
        ensure!(lanes >= 1, error::InvalidLanesSnafu { lanes });
        Ok(Self { kind, bits, lanes })
    }

    /// Scalar type of the given kind.
    ///
    /// # Panics
    ///
    /// Panics if `bits` is not a valid width for `kind`.
    pub const fn scalar(kind: TypeKind, bits: u8) -> Self {
        assert!(kind.valid_bits(bits), "invalid bit width for type kind");
        Self { kind, bits, lanes: 1 }
    }

    pub const fn int(bits: u8) -> Self {
        Self::scalar(TypeKind::Int, bits)
    }

    pub const fn uint(bits: u8) -> Self {
        Self::scalar(TypeKind::UInt, bits)
    }

    pub const fn float(bits: u8) -> Self {
        Self::scalar(TypeKind::Float, bits)
    }

    pub const fn bool_() -> Self {
        Self::scalar(TypeKind::UInt, 1)
    }

    pub const fn handle() -> Self {
        Self::scalar(TypeKind::Handle, 64)
    }

    /// Same element type with `lanes` lanes.
    ///
    /// # Panics
    ///
    /// Panics if `lanes` is zero.
    pub const fn vector_of(self, lanes: u16) -> Self {
        assert!(lanes >= 1, "a type needs at least one lane");
        Self { lanes, ..self }
    }

    /// Scalar element type.
    pub const fn element_of(self) -> Self {
        Self { lanes: 1, ..self }
    }

    // =========================================================================
    // Type Properties
    // =========================================================================

    pub const fn kind(&self) -> TypeKind {
        self.kind
    }

    pub const fn bits(&self) -> u8 {
        self.bits
    }

    pub const fn lanes(&self) -> u16 {
        self.lanes
    }

    /// Storage size of one element, rounded up to whole bytes.
    pub const fn bytes(&self) -> usize {
        (self.bits as usize).div_ceil(8)
    }

    /// Boolean check ignores the lane count.
    pub const fn is_bool(&self) -> bool {
        matches!(self.kind, TypeKind::UInt) && self.bits == 1
    }

    pub const fn is_int(&self) -> bool {
        matches!(self.kind, TypeKind::Int)
    }

    pub const fn is_uint(&self) -> bool {
        matches!(self.kind, TypeKind::UInt)
    }

    pub const fn is_float(&self) -> bool {
        matches!(self.kind, TypeKind::Float)
    }

    pub const fn is_handle(&self) -> bool {
        matches!(self.kind, TypeKind::Handle)
    }

    pub const fn is_scalar(&self) -> bool {
        self.lanes == 1
    }

    pub const fn is_vector(&self) -> bool {
        self.lanes > 1
    }

    // =========================================================================
    // Integer Bounds
    // =========================================================================

    /// Largest value representable by an integer type.
    ///
    /// Bounds are carried in an `i64`, so the maximum of a 64-bit unsigned
    /// type is out of reach and reported as [`Error::UnsupportedWidth`].
    pub fn imax(&self) -> Result<i64> {
        match self.kind {
            TypeKind::Int => Ok(i64::MAX >> (64 - self.bits as u32)),
            TypeKind::UInt if self.bits < 64 => Ok(((1u64 << self.bits) - 1) as i64),
            TypeKind::UInt => error::UnsupportedWidthSnafu { ty: *self }.fail(),
            TypeKind::Float | TypeKind::Handle => error::NoIntegerBoundsSnafu { ty: *self }.fail(),
        }
    }

    /// Smallest value representable by an integer type.
    pub fn imin(&self) -> Result<i64> {
        match self.kind {
            TypeKind::Int => Ok(i64::MIN >> (64 - self.bits as u32)),
            TypeKind::UInt => Ok(0),
            TypeKind::Float | TypeKind::Handle => error::NoIntegerBoundsSnafu { ty: *self }.fail(),
        }
    }

    /// Whether `value` is representable in this integer type.
    pub fn can_represent_int(&self, value: i64) -> bool {
        match (self.imin(), self.imax()) {
            (Ok(lo), Ok(hi)) => lo <= value && value <= hi,
            (Ok(lo), Err(_)) if self.is_uint() => lo <= value,
            _ => self.is_float(),
        }
    }

    /// Whether `value` is representable in this unsigned type.
    pub fn can_represent_uint(&self, value: u64) -> bool {
        match self.kind {
            TypeKind::UInt if self.bits == 64 => true,
            TypeKind::UInt => value < (1u64 << self.bits),
            TypeKind::Int => value <= self.imax().map_or(0, |m| m as u64),
            TypeKind::Float => true,
            TypeKind::Handle => false,
        }
    }
}

#[allow(non_upper_case_globals)]
impl Type {
    pub const Bool: Self = Self::bool_();
    pub const Int8: Self = Self::int(8);
    pub const Int16: Self = Self::int(16);
    pub const Int32: Self = Self::int(32);
    pub const Int64: Self = Self::int(64);
    pub const UInt8: Self = Self::uint(8);
    pub const UInt16: Self = Self::uint(16);
    pub const UInt32: Self = Self::uint(32);
    pub const UInt64: Self = Self::uint(64);
    pub const Float16: Self = Self::float(16);
    pub const Float32: Self = Self::float(32);
    pub const Float64: Self = Self::float(64);
    pub const Handle: Self = Self::handle();
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_bool() {
            f.write_str("bool")?;
        } else if self.is_handle() {
            f.write_str("handle")?;
        } else {
            let kind: &'static str = self.kind.into();
            write!(f, "{kind}{}", self.bits)?;
        }
        if self.is_vector() {
            write!(f, "x{}", self.lanes)?;
        }
        Ok(())
    }
}

/// One argument of a generated function.
///
/// Buffer arguments are passed as a pointer to a buffer descriptor, scalar
/// arguments as a pointer to a value of type `ty`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Argument {
    pub name: String,
    pub is_buffer: bool,
    pub ty: Type,
}

impl Argument {
    pub fn new(name: impl Into<String>, is_buffer: bool, ty: Type) -> Self {
        Self { name: name.into(), is_buffer, ty }
    }

    pub fn scalar(name: impl Into<String>, ty: Type) -> Self {
        Self::new(name, false, ty)
    }

    pub fn buffer(name: impl Into<String>, ty: Type) -> Self {
        Self::new(name, true, ty)
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_buffer { write!(f, "{}: buffer<{}>", self.name, self.ty) } else { write!(f, "{}: {}", self.name, self.ty) }
    }
}
