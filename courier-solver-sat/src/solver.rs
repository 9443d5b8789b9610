//! `SatSolver` implementation backed by a CaDiCaL oracle.

use std::time::Duration;

use courier_core::{
    Diagnostics, Instance, Solution, SolveError, SolveResponse, SolveStatus, Solver,
};

use crate::{
    CadicalOracle, CardinalityStrategy, Deadline, ModelOptions, Oracle, Progress, SearchReport,
    SearchState, Session, build_model, extract_routes, optimise,
};

/// Configuration for [`SatSolver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SatSolverConfig {
    /// Skip ordering couriers of equal capacity.
    pub ignore_max_load_symmetry_breaking: bool,
    /// Skip ordering the precedence table against its transpose.
    pub ignore_distance_symmetry_breaking: bool,
    /// Wall-clock budget for building the formula.
    pub constraint_building_timeout: Duration,
    /// Wall-clock budget for the optimisation loop.
    pub solving_timeout: Duration,
    /// At-most-one encoding used by the model.
    pub cardinality_strategy: CardinalityStrategy,
}

impl Default for SatSolverConfig {
    fn default() -> Self {
        Self {
            ignore_max_load_symmetry_breaking: true,
            ignore_distance_symmetry_breaking: true,
            constraint_building_timeout: Duration::from_secs(600),
            solving_timeout: Duration::from_secs(30),
            cardinality_strategy: CardinalityStrategy::default(),
        }
    }
}

impl SatSolverConfig {
    fn model_options(&self) -> ModelOptions {
        ModelOptions {
            strategy: self.cardinality_strategy,
            break_load_symmetry: !self.ignore_max_load_symmetry_breaking,
            break_distance_symmetry: !self.ignore_distance_symmetry_breaking,
        }
    }
}

/// Exact solver that encodes the instance into CNF and tightens the
/// objective bound until the formula becomes unsatisfiable.
///
/// # Examples
/// ```no_run
/// use courier_core::{Instance, SolveStatus, Solver};
/// use courier_solver_sat::SatSolver;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let instance = Instance::new(
///     vec![10, 10],
///     vec![3, 4, 5],
///     vec![
///         vec![0, 2, 7, 3],
///         vec![2, 0, 4, 6],
///         vec![7, 4, 0, 5],
///         vec![3, 6, 5, 0],
///     ],
/// )?;
/// let response = SatSolver::new().solve(&instance)?;
/// assert_eq!(response.status, SolveStatus::Optimal);
/// assert_eq!(response.objective(), Some(11));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct SatSolver {
    config: SatSolverConfig,
}

impl SatSolver {
    /// Construct a solver using default configuration.
    pub fn new() -> Self {
        Self::with_config(SatSolverConfig::default())
    }

    /// Construct a solver with explicit configuration.
    pub const fn with_config(config: SatSolverConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    pub const fn config(&self) -> &SatSolverConfig {
        &self.config
    }

    /// Solve `instance` using `oracle` as the satisfiability backend.
    ///
    /// The oracle must be fresh: every clause of the session is forwarded to
    /// it.
    ///
    /// # Errors
    ///
    /// Returns [`SolveError::InvalidInstance`] for invalid instances,
    /// [`SolveError::WidthOverflow`] when the distances cannot be encoded,
    /// [`SolveError::MalformedModel`] when a model does not decode into
    /// routes, and [`SolveError::Oracle`] for backend failures.
    pub fn solve_with<O: Oracle + ?Sized>(
        &self,
        instance: &Instance,
        oracle: &mut O,
    ) -> Result<SolveResponse, SolveError> {
        instance.validate()?;
        let build = Deadline::new(self.config.constraint_building_timeout);
        let mut session = Session::new(build);
        let model = match build_model(&mut session, instance, &self.config.model_options())? {
            Progress::Complete(model) => model,
            Progress::Partial { elapsed, .. } => {
                log::warn!("constraint building timed out after {elapsed:?}");
                return Ok(SolveResponse {
                    status: SolveStatus::Unknown,
                    solution: None,
                    diagnostics: Diagnostics {
                        build_time: elapsed,
                        variables: session.variables(),
                        clauses: session.clauses(),
                        ..Diagnostics::default()
                    },
                });
            }
        };
        let build_time = build.elapsed();

        let report = optimise(&mut session, &model, oracle, self.config.solving_timeout)?;
        let status = status_of(&report);
        let solution = report
            .best
            .as_ref()
            .map(|best| {
                let routes = extract_routes(&best.assignment, &best.precedence)?;
                let solution = Solution::from_routes(instance, routes);
                if solution.objective != best.objective {
                    log::warn!(
                        "decoded routes measure {} but the model reported {}",
                        solution.objective,
                        best.objective
                    );
                }
                Ok::<_, SolveError>(solution)
            })
            .transpose()?;
        log::info!(
            "search {} after {} iterations: {status:?}, objective {:?}",
            report.state,
            report.iterations,
            solution.as_ref().map(|found| found.objective)
        );

        Ok(SolveResponse {
            status,
            solution,
            diagnostics: Diagnostics {
                build_time,
                search_time: report.elapsed,
                variables: session.variables(),
                clauses: session.clauses(),
                iterations: report.iterations,
            },
        })
    }
}

const fn status_of(report: &SearchReport) -> SolveStatus {
    match (report.state, report.best.is_some()) {
        (SearchState::Exhausted, true) => SolveStatus::Optimal,
        (SearchState::Exhausted, false) => SolveStatus::Infeasible,
        (_, true) => SolveStatus::Feasible,
        (_, false) => SolveStatus::Unknown,
    }
}

impl Solver for SatSolver {
    fn solve(&self, instance: &Instance) -> Result<SolveResponse, SolveError> {
        self.solve_with(instance, &mut CadicalOracle::new())
    }
}
