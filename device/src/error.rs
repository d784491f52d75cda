use snafu::Snafu;
use weft_dtype::Type;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Buffers hold scalar elements only.
    #[snafu(display("cannot create a buffer of vector type {ty}"))]
    VectorElement { ty: Type },

    #[snafu(display("buffers have at most {max} dimensions, got {actual}"))]
    TooManyDimensions { max: usize, actual: usize },

    #[snafu(display("extent of dimension {dim} must be positive, got {extent}"))]
    NonPositiveExtent { dim: usize, extent: i32 },

    #[snafu(display("a buffer with extents {extents:?} does not fit in memory"))]
    SizeOverflow { extents: Vec<i32> },

    #[snafu(display("dimension {dim} is out of range for a buffer with {dimensions} dimensions"))]
    DimensionOutOfRange { dim: usize, dimensions: usize },

    #[snafu(display("expected {expected} coordinates, got {actual}"))]
    CoordinateCount { expected: usize, actual: usize },

    #[snafu(display("coordinate {coord} is outside [{min}, {min} + {extent}) in dimension {dim}"))]
    CoordinateOutOfBounds { dim: usize, coord: i32, min: i32, extent: i32 },

    #[snafu(display("buffer '{name}' holds {expected}, accessed as {actual}"))]
    ElementTypeMismatch { name: String, expected: Type, actual: Type },

    /// Failed to copy data between host and device.
    #[snafu(display("copy operation failed on buffer '{name}': {reason}"))]
    CopyFailed { name: String, reason: String },
}
