use snafu::Snafu;

use crate::{Type, TypeKind};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Bit width not allowed for the kind.
    #[snafu(display("invalid bit width {bits} for {kind:?} type"))]
    InvalidBits { kind: TypeKind, bits: u8 },

    #[snafu(display("a type needs at least one lane, got {lanes}"))]
    InvalidLanes { lanes: u16 },

    /// Exact bound does not fit the native 64-bit signed representation.
    #[snafu(display("integer bounds of {ty} exceed the native representation"))]
    UnsupportedWidth { ty: Type },

    #[snafu(display("{ty} has no integer bounds"))]
    NoIntegerBounds { ty: Type },
}
