//! Simplification and scheduling for weft pipelines.
//!
//! - [`symbolic`] rewrites expression and statement trees to a normal form.
//! - [`schedule`] records how each function's loop nest is split, ordered,
//!   stored and bounded, and checks those choices against a loop nest.

pub mod error;
pub mod schedule;
pub mod symbolic;

#[cfg(test)]
pub mod test;

pub use error::{Error, Result};
pub use schedule::{Bound, Dim, LoopLevel, LoopNest, Schedule, Split, SplitKind};
pub use symbolic::{Simplifier, simplify_expr, simplify_stmt};
