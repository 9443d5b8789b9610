//! Satisfiability oracles.
//!
//! The driver talks to a SAT backend only through [`Oracle`]. The default
//! backend is CaDiCaL via `rustsat-cadical`; the per-call time limit is
//! enforced with the solver's terminator callback.

use std::time::{Duration, Instant};

use courier_core::SolveError;
use rustsat::solvers::{ControlSignal, Solve, SolveIncremental, SolverResult, Terminate};
use rustsat::types::{Clause, Lit, TernaryVal};
use rustsat_cadical::CaDiCaL;

/// Answer to a single satisfiability query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OracleAnswer {
    /// A model exists; values can be read with [`Oracle::value`].
    Sat,
    /// No model exists under the given assumptions.
    Unsat,
    /// The time limit expired first.
    Unknown,
}

/// An incremental SAT solver.
pub trait Oracle {
    /// Add a clause permanently.
    ///
    /// # Errors
    ///
    /// Returns [`SolveError::Oracle`] when the backend rejects the clause.
    fn add_clause(&mut self, clause: &Clause) -> Result<(), SolveError>;

    /// Decide the clauses added so far under `assumptions`, giving up after
    /// `limit`.
    ///
    /// # Errors
    ///
    /// Returns [`SolveError::Oracle`] when the backend fails.
    fn solve(&mut self, assumptions: &[Lit], limit: Duration) -> Result<OracleAnswer, SolveError>;

    /// Value of `lit` in the model found by the last satisfiable call.
    ///
    /// # Errors
    ///
    /// Returns [`SolveError::Oracle`] when no model is available.
    fn value(&self, lit: Lit) -> Result<bool, SolveError>;
}

fn backend(err: impl std::fmt::Display) -> SolveError {
    SolveError::Oracle {
        message: err.to_string(),
    }
}

/// [`Oracle`] backed by CaDiCaL.
#[derive(Default)]
pub struct CadicalOracle {
    solver: CaDiCaL<'static, 'static>,
}

impl CadicalOracle {
    /// A fresh solver with no clauses.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Oracle for CadicalOracle {
    fn add_clause(&mut self, clause: &Clause) -> Result<(), SolveError> {
        self.solver.add_clause(clause.clone()).map_err(backend)
    }

    fn solve(&mut self, assumptions: &[Lit], limit: Duration) -> Result<OracleAnswer, SolveError> {
        match Instant::now().checked_add(limit) {
            Some(deadline) => self.solver.attach_terminator(move || {
                if Instant::now() >= deadline {
                    ControlSignal::Terminate
                } else {
                    ControlSignal::Continue
                }
            }),
            None => self.solver.detach_terminator(),
        }
        let answer = self.solver.solve_assumps(assumptions).map_err(backend)?;
        Ok(match answer {
            SolverResult::Sat => OracleAnswer::Sat,
            SolverResult::Unsat => OracleAnswer::Unsat,
            SolverResult::Interrupted => OracleAnswer::Unknown,
        })
    }

    fn value(&self, lit: Lit) -> Result<bool, SolveError> {
        // Unconstrained variables may be reported as don't-care.
        Ok(matches!(self.solver.lit_val(lit).map_err(backend)?, TernaryVal::True))
    }
}
