//! Error types for calling compiled pipelines.

use snafu::Snafu;
use weft_dtype::Type;

/// Result type for runtime operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("expected {expected} arguments, got {actual}"))]
    ArgumentCount { expected: usize, actual: usize },

    /// A buffer was passed for a scalar argument or the other way round.
    #[snafu(display("argument '{name}' expects a {expected}, got a {actual}"))]
    ArgumentKind { name: String, expected: &'static str, actual: &'static str },

    #[snafu(display("argument '{name}' has type {expected}, got {actual}"))]
    ArgumentType { name: String, expected: Type, actual: Type },

    /// A parameter with no buffer bound to it was used as an argument.
    #[snafu(display("buffer parameter '{name}' is unbound"))]
    UnboundParameter { name: String },

    #[snafu(display("parameter '{name}': {source}"))]
    Parameter { name: String, source: weft_ir::Error },

    #[snafu(display("device transfer failed: {source}"))]
    Device { source: weft_device::Error },

    /// The generated function reported failure through its return code.
    #[snafu(display("function '{function}' returned error code {code}"))]
    EntryFailed { function: String, code: i32 },

    /// A module does not export the routine needed for an operation.
    #[snafu(display("module '{module}' has no {entry} entry point"))]
    MissingEntryPoint { module: String, entry: &'static str },
}
