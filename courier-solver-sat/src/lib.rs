//! Exact Multiple Courier Problem solver built on propositional satisfiability.
//!
//! This crate provides [`SatSolver`], an implementation of the
//! [`Solver`](courier_core::Solver) trait. The instance is encoded into CNF by
//! hand: integers become most-significant-bit-first vectors of literals, sums
//! become ripple-carry adders, and route structure is expressed with an
//! assignment matrix, an immediate-precedence table and per-item step
//! counters that rule out detached cycles. An anytime loop then asks a SAT
//! oracle for a model, records its objective and appends `objective < found`
//! until the formula becomes unsatisfiable or the budget runs out.
//!
//! The layers can be used on their own:
//!
//! - [`formula`] and [`session`] hold boolean expressions and turn them into
//!   clauses.
//! - [`bits`] offers bit-vector constants, comparators and adders.
//! - [`cardinality`] ships four at-most-one encodings behind
//!   [`CardinalityEncoder`].
//! - [`model`] builds the courier formula, [`driver`] minimises it and
//!   [`extract`] decodes routes from a model.
//!
//! ```
//! use courier_solver_sat::bits::{from_bits, to_bits};
//!
//! # fn main() -> Result<(), courier_core::SolveError> {
//! let bits = to_bits(6, 4)?;
//! assert_eq!(bits, vec![false, true, true, false]);
//! assert_eq!(from_bits(&bits), 6);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod bits;
pub mod cardinality;
mod deadline;
pub mod driver;
pub mod extract;
pub mod formula;
pub mod model;
pub mod oracle;
pub mod session;
mod solver;

pub use cardinality::{
    Bitwise, CardinalityEncoder, CardinalityStrategy, Commander, Pairwise, ParseStrategyError,
    SequentialCounter,
};
pub use deadline::{Deadline, Progress};
pub use driver::{Incumbent, SearchReport, SearchState, optimise};
pub use extract::extract_routes;
pub use formula::Bool;
pub use model::{McpModel, ModelOptions, Widths, build_model};
pub use oracle::{CadicalOracle, Oracle, OracleAnswer};
pub use session::{Session, VarKey};
pub use solver::{SatSolver, SatSolverConfig};
