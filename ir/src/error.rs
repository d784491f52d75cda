use snafu::Snafu;
use weft_dtype::Type;

use crate::types::{BinaryOp, CallType};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    // =========================================================================
    // Construction invariants
    // =========================================================================
    /// Operands of a binary node must share one type.
    #[snafu(display("{op} operands must have the same type, got {lhs} and {rhs}"))]
    OperandTypeMismatch { op: BinaryOp, lhs: Type, rhs: Type },

    #[snafu(display("{node} requires a boolean {what}, got {actual}"))]
    NotBoolean { node: &'static str, what: &'static str, actual: Type },

    #[snafu(display("{node} requires a scalar {what}, got {actual}"))]
    NotScalar { node: &'static str, what: &'static str, actual: Type },

    #[snafu(display("{node} requires an integer {what}, got {actual}"))]
    NotInteger { node: &'static str, what: &'static str, actual: Type },

    #[snafu(display("{node} requires more than one lane, got {lanes}"))]
    TooFewLanes { node: &'static str, lanes: u16 },

    #[snafu(display("{node} lane mismatch: {expected} lanes expected, got {actual}"))]
    LaneMismatch { node: &'static str, expected: u16, actual: u16 },

    #[snafu(display("{node} type mismatch: {expected} expected, got {actual}"))]
    TypeMismatch { node: &'static str, expected: Type, actual: Type },

    #[snafu(display("constant {value} is not representable as {ty}"))]
    ConstOutOfRange { value: String, ty: Type },

    #[snafu(display("{node} requires a non-empty {what}"))]
    Empty { node: &'static str, what: &'static str },

    #[snafu(display("{call_type} call to '{name}' needs Int(32) arguments, argument {index} is {actual}"))]
    CallArgType { name: String, call_type: CallType, index: usize, actual: Type },

    #[snafu(display("image call to '{name}' has neither a buffer nor a parameter"))]
    CallMissingSource { name: String },

    #[snafu(display("range bounds must share one type, got min {min} and extent {extent}"))]
    RangeTypeMismatch { min: Type, extent: Type },

    // =========================================================================
    // Domain identity
    // =========================================================================
    /// A reduction domain with several variables used where one is expected.
    #[snafu(display("cannot use multi-dimensional reduction domain {rendered} as a single variable"))]
    MultiDimensionalDomain { rendered: String },

    #[snafu(display("expression refers to two different reduction domains: {first} and {second}"))]
    MultipleDomains { first: String, second: String },

    #[snafu(display("reduction domains have one to four dimensions, got {dims}"))]
    DomainDimensions { dims: usize },

    #[snafu(display("reduction domain {rendered} has no dimension {index}"))]
    DomainIndex { rendered: String, index: usize },

    // =========================================================================
    // Parameters
    // =========================================================================
    #[snafu(display("parameter '{name}' is {actual}, operation requires {expected}"))]
    ParameterKind { name: String, expected: &'static str, actual: &'static str },

    #[snafu(display("parameter '{name}' has type {expected}, got {actual}"))]
    ParameterType { name: String, expected: Type, actual: Type },

    #[snafu(display("parameter '{name}' constrains dimensions 0..4, got {dim}"))]
    ParameterDimension { name: String, dim: usize },

    // =========================================================================
    // Implicit arguments
    // =========================================================================
    #[snafu(display("call to '{name}' has more than one implicit-argument placeholder"))]
    MultiplePlaceholders { name: String },

    #[snafu(display("call to '{name}' passes {given} arguments but the function has {dimensions} dimensions"))]
    TooManyArguments { name: String, given: usize, dimensions: usize },

    #[snafu(display("call to '{name}' passes {given} arguments, {dimensions} required"))]
    TooFewArguments { name: String, given: usize, dimensions: usize },

    // =========================================================================
    // Wrapped
    // =========================================================================
    /// Unsupported width or kind when deriving type bounds.
    #[snafu(display("type error: {source}"))]
    Dtype { source: weft_dtype::Error },
}

impl From<weft_dtype::Error> for Error {
    fn from(source: weft_dtype::Error) -> Self {
        Self::Dtype { source }
    }
}
