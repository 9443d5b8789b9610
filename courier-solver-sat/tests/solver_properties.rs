//! Property-based tests for `SatSolver` against the exhaustive reference
//! solver.
//!
//! # Invariants tested
//!
//! - **Optimality:** a run that ends `Optimal` reports the brute-force optimum,
//!   and a run that ends `Infeasible` matches a brute-force search that finds
//!   nothing.
//! - **Monotone search:** incumbent objectives are strictly decreasing.
//! - **Symmetry breaking:** enabling either symmetry-breaking option never
//!   changes the optimum.
//! - **Extraction totality:** every returned solution covers each item once,
//!   respects the capacities, and its objective is the longest route.


use std::time::Duration;

use courier_core::test_support::brute_force_optimum;
use courier_core::{Instance, SolveStatus, Solver};
use courier_solver_sat::{
    CadicalOracle, CardinalityStrategy, Deadline, ModelOptions, Progress, SatSolver,
    SatSolverConfig, SearchState, Session, build_model, optimise,
};
use proptest::prelude::*;

use proptest_support::{instance_strategy, symmetric_instance_strategy};

fn config(strategy: CardinalityStrategy, break_symmetry: bool) -> SatSolverConfig {
    SatSolverConfig {
        ignore_max_load_symmetry_breaking: !break_symmetry,
        ignore_distance_symmetry_breaking: !break_symmetry,
        constraint_building_timeout: Duration::from_secs(60),
        solving_timeout: Duration::from_secs(60),
        cardinality_strategy: strategy,
    }
}

fn proven_objective(instance: &Instance, config: SatSolverConfig) -> Option<u64> {
    let response = SatSolver::with_config(config)
        .solve(instance)
        .expect("solve should succeed");
    assert!(
        response.status.is_proven(),
        "small instance was not solved to completion: {:?}",
        response.status
    );
    response.objective()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Property: the proven optimum equals the brute-force optimum.
    #[test]
    fn optimum_matches_brute_force(
        instance in instance_strategy(3, 5),
        strategy in proptest::sample::select(CardinalityStrategy::ALL.to_vec()),
    ) {
        let expected = brute_force_optimum(&instance);
        let response = SatSolver::with_config(config(strategy, false))
            .solve(&instance)
            .expect("solve should succeed");
        let status = if expected.is_some() {
            SolveStatus::Optimal
        } else {
            SolveStatus::Infeasible
        };
        prop_assert_eq!(response.status, status);
        prop_assert_eq!(response.objective(), expected);
    }

    /// Property: every returned solution is a well-formed set of routes.
    #[test]
    fn solutions_are_well_formed(instance in instance_strategy(3, 5)) {
        let response = SatSolver::new().solve(&instance).expect("solve should succeed");
        if let Some(solution) = response.solution {
            prop_assert_eq!(solution.routes.len(), instance.couriers);
            prop_assert!(solution.covers_each_item_once(&instance));
            prop_assert!(solution.respects_capacity(&instance));
            prop_assert_eq!(solution.objective, solution.max_route_distance(&instance));
        }
    }

    /// Property: incumbents improve strictly and the loop ends exhausted.
    #[test]
    fn improvements_strictly_decrease(instance in instance_strategy(2, 5)) {
        let mut session = Session::new(Deadline::new(Duration::from_secs(60)));
        let Progress::Complete(model) =
            build_model(&mut session, &instance, &ModelOptions::default()).expect("valid instance")
        else {
            panic!("build should complete within its budget");
        };
        let mut oracle = CadicalOracle::new();
        let report = optimise(&mut session, &model, &mut oracle, Duration::from_secs(60))
            .expect("search succeeds");
        prop_assert_eq!(report.state, SearchState::Exhausted);
        prop_assert!(
            report
                .improvements
                .windows(2)
                .all(|pair| matches!(pair, [earlier, later] if earlier > later))
        );
        prop_assert_eq!(report.improvements.last().copied(), brute_force_optimum(&instance));
    }

    /// Property: symmetry breaking keeps the optimum on symmetric instances.
    #[test]
    fn symmetry_breaking_preserves_the_optimum(instance in symmetric_instance_strategy(3, 5)) {
        let plain = proven_objective(&instance, config(CardinalityStrategy::Sequential, false));
        let broken = proven_objective(&instance, config(CardinalityStrategy::Sequential, true));
        prop_assert_eq!(plain, broken);
    }

    /// Property: symmetry breaking keeps the optimum on asymmetric instances.
    #[test]
    fn load_symmetry_breaking_preserves_the_optimum(instance in instance_strategy(3, 5)) {
        let plain = proven_objective(&instance, config(CardinalityStrategy::Commander, false));
        let broken = proven_objective(&instance, config(CardinalityStrategy::Commander, true));
        prop_assert_eq!(plain, broken);
    }
}
