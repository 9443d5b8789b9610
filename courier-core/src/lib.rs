//! Core domain types for the courier engine.
//!
//! A Multiple Courier Problem instance assigns every item to exactly one
//! courier, orders each courier's items into a depot-to-depot route, and keeps
//! every courier within its load capacity. Solvers minimise the longest route.
//!
//! These models validate eagerly so that solver crates can rely on the shape
//! of an [`Instance`] without re-checking it.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod instance;
mod report;
mod route;
mod solver;

pub use instance::{Instance, InstanceValidationError};
pub use report::SolveReport;
pub use route::{Route, Solution};
pub use solver::{Diagnostics, Error, SolveError, SolveResponse, SolveStatus, Solver};

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;
