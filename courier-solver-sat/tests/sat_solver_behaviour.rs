//! Behavioural tests for `SatSolver` using rstest-bdd.

use std::cell::RefCell;
use std::time::Duration;

use courier_core::test_support::sample_instance;
use courier_core::{Instance, SolveError, SolveResponse, SolveStatus, Solver};
use courier_solver_sat::{CardinalityStrategy, SatSolver, SatSolverConfig};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

#[derive(Debug)]
struct SolverWorld {
    instance: RefCell<Option<Instance>>,
    config: RefCell<SatSolverConfig>,
    outcome: RefCell<Option<Result<SolveResponse, SolveError>>>,
}

impl SolverWorld {
    fn new() -> Self {
        Self {
            instance: RefCell::new(None),
            config: RefCell::new(SatSolverConfig::default()),
            outcome: RefCell::new(None),
        }
    }

    #[expect(
        clippy::expect_used,
        reason = "behaviour tests use expect for readable failures"
    )]
    fn expect_outcome(&self) -> Result<SolveResponse, SolveError> {
        self.outcome
            .borrow()
            .as_ref()
            .cloned()
            .expect("outcome should be recorded before assertions")
    }

    #[expect(
        clippy::expect_used,
        reason = "behaviour tests use expect for readable failures"
    )]
    fn expect_response(&self) -> SolveResponse {
        self.expect_outcome().expect("expected solve success")
    }
}

#[fixture]
fn world() -> SolverWorld {
    SolverWorld::new()
}

#[given("the two-courier sample instance")]
fn given_sample_instance(world: &SolverWorld) {
    world.instance.replace(Some(sample_instance()));
}

#[given("an instance whose items cannot be packed")]
fn given_unpackable_instance(world: &SolverWorld) {
    // Each courier fits a single item, but there are three.
    let mut instance = sample_instance();
    instance.loads = vec![3, 3];
    instance.sizes = vec![2, 2, 2];
    world.instance.replace(Some(instance));
}

#[given("an instance with a missing courier load")]
fn given_instance_missing_load(world: &SolverWorld) {
    let mut instance = sample_instance();
    instance.loads.pop();
    world.instance.replace(Some(instance));
}

#[given("the default solver configuration")]
fn given_default_config(world: &SolverWorld) {
    world.config.replace(SatSolverConfig::default());
}

#[given("a zero constraint building budget")]
fn given_zero_build_budget(world: &SolverWorld) {
    world.config.borrow_mut().constraint_building_timeout = Duration::ZERO;
}

#[given("symmetry breaking with the commander encoding")]
fn given_commander_with_symmetry_breaking(world: &SolverWorld) {
    world.config.replace(SatSolverConfig {
        ignore_max_load_symmetry_breaking: false,
        ignore_distance_symmetry_breaking: false,
        cardinality_strategy: CardinalityStrategy::Commander,
        ..SatSolverConfig::default()
    });
}

#[when("the SAT solver runs")]
#[expect(
    clippy::expect_used,
    reason = "behaviour tests use expect for readable failures"
)]
fn when_solver_runs(world: &SolverWorld) {
    let instance = world
        .instance
        .borrow()
        .clone()
        .expect("an instance should be given first");
    let solver = SatSolver::with_config(world.config.borrow().clone());
    world.outcome.replace(Some(solver.solve(&instance)));
}

#[then("the status is optimal")]
fn then_status_optimal(world: &SolverWorld) {
    assert_eq!(world.expect_response().status, SolveStatus::Optimal);
}

#[then("the status is infeasible")]
fn then_status_infeasible(world: &SolverWorld) {
    assert_eq!(world.expect_response().status, SolveStatus::Infeasible);
}

#[then("the status is unknown")]
fn then_status_unknown(world: &SolverWorld) {
    assert_eq!(world.expect_response().status, SolveStatus::Unknown);
}

#[then("the objective is 11")]
fn then_objective_eleven(world: &SolverWorld) {
    assert_eq!(world.expect_response().objective(), Some(11));
}

#[then("every item is delivered exactly once")]
#[expect(
    clippy::expect_used,
    reason = "behaviour tests use expect for readable failures"
)]
fn then_items_delivered_once(world: &SolverWorld) {
    let response = world.expect_response();
    let solution = response.solution.expect("expected a solution");
    let instance = world
        .instance
        .borrow()
        .clone()
        .expect("instance recorded");
    assert!(solution.covers_each_item_once(&instance));
    assert!(solution.respects_capacity(&instance));
}

#[then("no solution is returned")]
fn then_no_solution(world: &SolverWorld) {
    assert!(world.expect_response().solution.is_none());
}

#[then("the solve fails with an invalid instance error")]
#[expect(
    clippy::expect_used,
    reason = "behaviour tests use expect for readable failures"
)]
fn then_invalid_instance(world: &SolverWorld) {
    let err = world
        .expect_outcome()
        .expect_err("expected InvalidInstance error");
    assert!(matches!(err, SolveError::InvalidInstance(_)));
}

#[scenario(path = "tests/features/sat_solver.feature", index = 0)]
fn optimal_sample(world: SolverWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/sat_solver.feature", index = 1)]
fn unpackable_items(world: SolverWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/sat_solver.feature", index = 2)]
fn malformed_instance(world: SolverWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/sat_solver.feature", index = 3)]
fn build_budget_exhausted(world: SolverWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/sat_solver.feature", index = 4)]
fn commander_with_symmetry_breaking(world: SolverWorld) {
    let _ = world;
}
