//! Error types for simplification and scheduling.

use snafu::Snafu;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// A rewrite built an invalid node.
    #[snafu(display("IR error: {source}"))]
    Ir { source: weft_ir::Error },

    #[snafu(display("{directive}: no dimension named '{var}' (have: {available})"))]
    UnknownDimension { directive: &'static str, var: String, available: String },

    #[snafu(display("{directive}: dimension '{var}' already exists"))]
    DuplicateDimension { directive: &'static str, var: String },

    #[snafu(display("{directive}: dimension '{var}' named more than once"))]
    RepeatedDimension { directive: &'static str, var: String },

    #[snafu(display("split of '{var}': factor {factor} is not a positive Int(32) value"))]
    InvalidSplitFactor { var: String, factor: String },

    #[snafu(display("fuse: '{outer}' must be the loop directly outside '{inner}'"))]
    NotAdjacent { inner: String, outer: String },

    #[snafu(display("bound on '{var}': {what} must be an integer scalar, got {ty}"))]
    InvalidBound { var: String, what: &'static str, ty: weft_dtype::Type },

    #[snafu(display("'{text}' is not a loop level (expected 'func.var', '<root>' or '')"))]
    InvalidLoopLevel { text: String },

    #[snafu(display("storage level '{store}' is inside compute level '{compute}'"))]
    StoreInsideCompute { store: String, compute: String },

    #[snafu(display("loop level '{level}' does not occur in loop nest [{nest}]"))]
    LevelNotInNest { level: String, nest: String },

    #[snafu(display("'{split}' has no inner variable"))]
    MalformedSplit { split: String },

    #[snafu(display("split list is inconsistent with dimensions: replay gives [{replayed}], dims are [{dims}]"))]
    InconsistentSplits { replayed: String, dims: String },
}

impl From<weft_ir::Error> for Error {
    fn from(source: weft_ir::Error) -> Self {
        Error::Ir { source }
    }
}
