//! Solver interface and the response it produces.

use std::time::Duration;

use thiserror::Error;

use crate::{Instance, InstanceValidationError, Solution};

/// How a solve run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// The returned solution is proven optimal.
    Optimal,
    /// A solution was found but the budget ran out before optimality was proven.
    Feasible,
    /// The instance was proven to have no solution.
    Infeasible,
    /// The budget ran out before any solution was found.
    Unknown,
}

impl SolveStatus {
    /// Whether the search finished, either with an optimal solution or with a
    /// proof that none exists.
    pub const fn is_proven(self) -> bool {
        matches!(self, Self::Optimal | Self::Infeasible)
    }
}

/// Timing and size figures gathered while solving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Diagnostics {
    /// Time spent building the formula.
    pub build_time: Duration,
    /// Time spent in the optimisation loop.
    pub search_time: Duration,
    /// Propositional variables in the final formula.
    pub variables: usize,
    /// Clauses in the final formula.
    pub clauses: usize,
    /// Oracle calls made by the optimisation loop.
    pub iterations: usize,
}

/// Result of a solve run.
///
/// `solution` is `None` whenever no feasible solution is known, so "no
/// solution" and "best effort solution" stay distinguishable through
/// [`SolveResponse::status`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveResponse {
    /// Terminal status of the run.
    pub status: SolveStatus,
    /// Best solution found, if any.
    pub solution: Option<Solution>,
    /// Timing and size figures.
    pub diagnostics: Diagnostics,
}

impl SolveResponse {
    /// Wall-clock time spent building and searching.
    pub fn elapsed(&self) -> Duration {
        self.diagnostics.build_time + self.diagnostics.search_time
    }

    /// Objective value of the best solution, if any.
    pub fn objective(&self) -> Option<u64> {
        self.solution.as_ref().map(|solution| solution.objective)
    }
}

/// Errors returned by [`Solver::solve`].
///
/// Timeouts are not errors; they surface as [`SolveStatus::Feasible`] or
/// [`SolveStatus::Unknown`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolveError {
    /// The instance violates a precondition.
    #[error("invalid instance: {0}")]
    InvalidInstance(#[from] InstanceValidationError),
    /// An integer did not fit the bit width chosen for it.
    #[error("value {value} does not fit in {width} bits")]
    WidthOverflow {
        /// Value being encoded.
        value: u64,
        /// Available width.
        width: usize,
    },
    /// A satisfying model did not decode into well-formed routes.
    #[error("malformed model for courier {courier}: {reason}")]
    MalformedModel {
        /// Courier whose route failed to decode.
        courier: usize,
        /// What went wrong.
        reason: String,
    },
    /// The satisfiability backend reported a failure.
    #[error("satisfiability oracle failed: {message}")]
    Oracle {
        /// Backend error message.
        message: String,
    },
}

/// Alias for the solver error type.
pub type Error = SolveError;

/// Solve Multiple Courier Problem instances.
///
/// Implementations should return [`Error::InvalidInstance`] for instances that
/// violate the problem preconditions rather than panicking.
/// Solvers must be `Send + Sync` to operate safely across threads.
pub trait Solver: Send + Sync {
    /// Solve an instance, producing the best known solution or an error.
    fn solve(&self, instance: &Instance) -> Result<SolveResponse, Error>;
}
