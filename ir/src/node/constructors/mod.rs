//! Validating constructors, grouped by semantic category.
//!
//! Every constructor checks operand types and lane counts before the node
//! exists; a violated precondition is returned as an [`Error`](crate::Error)
//! and no node is built.
//!
//! - [`data`] - constants, variables, type bounds
//! - [`compute`] - arithmetic, comparison, logic, select, cast
//! - [`vector`] - ramp and broadcast
//! - [`memory`] - loads, calls, lets
//! - [`control`] - statements

pub mod compute;
pub mod control;
pub mod data;
pub mod memory;
pub mod vector;
