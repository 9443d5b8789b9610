//! Facade crate for the courier engine.
//!
//! This crate re-exports the core domain types and, behind the `solver-sat`
//! feature, the satisfiability-based Multiple Courier Problem solver.

#![forbid(unsafe_code)]

pub use courier_core::{
    Diagnostics, Instance, InstanceValidationError, Route, Solution, SolveError, SolveReport,
    SolveResponse, SolveStatus, Solver,
};

#[cfg(feature = "solver-sat")]
pub use courier_solver_sat::{CardinalityStrategy, SatSolver, SatSolverConfig};
