//! Anytime optimisation over a built model.
//!
//! The driver repeatedly asks the oracle for a model, records it, and then
//! appends `objective < found` to the session. Each oracle call gets whatever
//! is left of the solving budget. The search ends when the tightened formula
//! is unsatisfiable, the oracle gives up, or the budget is spent.

use std::fmt;
use std::time::Duration;

use courier_core::SolveError;
use rustsat::types::Lit;

use crate::bits::{BitVec, from_bits, less_than};
use crate::{Deadline, McpModel, Oracle, OracleAnswer, Session};

/// Where the optimisation loop stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    /// Waiting for the next oracle answer.
    Searching,
    /// The last answer improved the incumbent.
    ImprovedFound,
    /// The tightened formula is unsatisfiable; the incumbent, if any, is
    /// optimal.
    Exhausted,
    /// The budget ran out or the oracle gave up.
    TimedOut,
}

impl fmt::Display for SearchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Searching => "searching",
            Self::ImprovedFound => "improved",
            Self::Exhausted => "exhausted",
            Self::TimedOut => "timed out",
        })
    }
}

/// Best solution seen so far, read back from an oracle model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Incumbent {
    /// Objective value.
    pub objective: u64,
    /// `assignment[c][i]`.
    pub assignment: Vec<Vec<bool>>,
    /// `precedence[i][j]`.
    pub precedence: Vec<Vec<bool>>,
}

/// What the optimisation loop achieved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchReport {
    /// Terminal state, either [`SearchState::Exhausted`] or
    /// [`SearchState::TimedOut`].
    pub state: SearchState,
    /// Best incumbent found.
    pub best: Option<Incumbent>,
    /// Objective of every incumbent in discovery order; strictly decreasing.
    pub improvements: Vec<u64>,
    /// Oracle calls made.
    pub iterations: usize,
    /// Time spent in the loop.
    pub elapsed: Duration,
}

/// Minimise the objective of `model` within `budget`.
///
/// Clauses appended to `session` since the last call are forwarded before
/// each oracle query, so the same oracle can be reused across calls on one
/// session.
///
/// # Errors
///
/// Propagates oracle failures and [`SolveError::WidthOverflow`] should an
/// objective not fit its own width.
pub fn optimise<O: Oracle + ?Sized>(
    session: &mut Session,
    model: &McpModel,
    oracle: &mut O,
    budget: Duration,
) -> Result<SearchReport, SolveError> {
    let deadline = Deadline::new(budget);
    let objective = model.objective();
    let mut forwarded = 0;
    let mut state = SearchState::Searching;
    let mut best = None;
    let mut improvements = Vec::new();
    let mut iterations = 0;

    while state == SearchState::Searching {
        if deadline.expired() {
            state = transition(state, SearchState::TimedOut);
            break;
        }
        forwarded = forward(session, oracle, forwarded)?;
        iterations += 1;
        match oracle.solve(&[], deadline.remaining())? {
            OracleAnswer::Sat => {
                let incumbent = read_incumbent(oracle, model)?;
                log::info!(
                    "iteration {iterations}: objective {} after {:?}",
                    incumbent.objective,
                    deadline.elapsed()
                );
                let bound = BitVec::constant(incumbent.objective, model.widths.distance)?;
                session.assert(&less_than(&objective, &bound));
                improvements.push(incumbent.objective);
                best = Some(incumbent);
                state = transition(state, SearchState::ImprovedFound);
                state = transition(state, SearchState::Searching);
            }
            OracleAnswer::Unsat => state = transition(state, SearchState::Exhausted),
            OracleAnswer::Unknown => state = transition(state, SearchState::TimedOut),
        }
    }

    Ok(SearchReport {
        state,
        best,
        improvements,
        iterations,
        elapsed: deadline.elapsed(),
    })
}

fn transition(from: SearchState, to: SearchState) -> SearchState {
    log::debug!("search state {from} -> {to}");
    to
}

/// Send clauses past `forwarded` to the oracle; returns the new count.
fn forward<O: Oracle + ?Sized>(
    session: &Session,
    oracle: &mut O,
    forwarded: usize,
) -> Result<usize, SolveError> {
    let mut count = forwarded;
    for clause in session.clauses_from(forwarded) {
        oracle.add_clause(clause)?;
        count += 1;
    }
    Ok(count)
}

fn read_lits<O: Oracle + ?Sized>(oracle: &O, lits: &[Lit]) -> Result<Vec<bool>, SolveError> {
    lits.iter().map(|lit| oracle.value(*lit)).collect()
}

fn read_incumbent<O: Oracle + ?Sized>(
    oracle: &O,
    model: &McpModel,
) -> Result<Incumbent, SolveError> {
    let objective = from_bits(&read_lits(oracle, &model.max_distance)?);
    let assignment = model
        .assignment
        .iter()
        .map(|row| read_lits(oracle, row))
        .collect::<Result<_, _>>()?;
    let precedence = model
        .precedence
        .iter()
        .map(|row| read_lits(oracle, row))
        .collect::<Result<_, _>>()?;
    Ok(Incumbent {
        objective,
        assignment,
        precedence,
    })
}
