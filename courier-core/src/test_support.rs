//! Test-only fixtures: a small sample instance and an exhaustive reference
//! solver used to check other solvers on tiny inputs.

use std::time::Instant;

use crate::{Diagnostics, Error, Instance, Route, Solution, SolveResponse, SolveStatus, Solver};

/// Two couriers, three items and a symmetric distance matrix; the optimum is 11.
///
/// # Panics
///
/// Never panics; the literal data is a valid instance.
#[expect(clippy::expect_used, reason = "fixture data is known to be valid")]
pub fn sample_instance() -> Instance {
    Instance::new(
        vec![10, 10],
        vec![3, 4, 5],
        vec![
            vec![0, 2, 7, 3],
            vec![2, 0, 4, 6],
            vec![7, 4, 0, 5],
            vec![3, 6, 5, 0],
        ],
    )
    .expect("sample instance is valid")
}

/// Shortest ordering of `items` as a depot-to-depot tour.
fn best_tour(instance: &Instance, items: &[usize]) -> (u64, Vec<usize>) {
    let mut best = (instance.route_distance(items), items.to_vec());
    let mut current = items.to_vec();
    permute(instance, &mut current, 0, &mut best);
    best
}

fn permute(instance: &Instance, items: &mut [usize], fixed: usize, best: &mut (u64, Vec<usize>)) {
    if fixed >= items.len() {
        let distance = instance.route_distance(items);
        if distance < best.0 {
            *best = (distance, items.to_vec());
        }
        return;
    }
    for next in fixed..items.len() {
        items.swap(fixed, next);
        permute(instance, items, fixed + 1, best);
        items.swap(fixed, next);
    }
}

/// Enumerate every assignment and ordering and return an optimal solution,
/// or `None` when no assignment respects the capacities.
///
/// The search is exponential; keep instances to a handful of items.
pub fn brute_force(instance: &Instance) -> Option<Solution> {
    let mut owners = vec![0_usize; instance.items];
    let mut best: Option<(u64, Vec<Route>)> = None;
    loop {
        let mut carried = vec![Vec::new(); instance.couriers];
        for (item, owner) in owners.iter().enumerate() {
            if let Some(route) = carried.get_mut(*owner) {
                route.push(item);
            }
        }
        let fits = carried
            .iter()
            .zip(&instance.loads)
            .all(|(items, load)| instance.route_load(items) <= *load);
        if fits {
            let tours: Vec<(u64, Vec<usize>)> =
                carried.iter().map(|items| best_tour(instance, items)).collect();
            let objective = tours.iter().map(|(distance, _)| *distance).max().unwrap_or(0);
            if best.as_ref().is_none_or(|(known, _)| objective < *known) {
                let routes = tours.into_iter().map(|(_, items)| Route::new(items)).collect();
                best = Some((objective, routes));
            }
        }
        if !advance(&mut owners, instance.couriers) {
            break;
        }
    }
    best.map(|(_, routes)| Solution::from_routes(instance, routes))
}

/// Step `owners` to the next base-`couriers` counter value.
fn advance(owners: &mut [usize], couriers: usize) -> bool {
    for owner in owners.iter_mut() {
        *owner += 1;
        if *owner < couriers {
            return true;
        }
        *owner = 0;
    }
    false
}

/// Optimal objective value by exhaustive search.
pub fn brute_force_optimum(instance: &Instance) -> Option<u64> {
    brute_force(instance).map(|solution| solution.objective)
}

/// Reference [`Solver`] backed by [`brute_force`].
#[derive(Debug, Default, Clone, Copy)]
pub struct BruteForceSolver;

impl Solver for BruteForceSolver {
    fn solve(&self, instance: &Instance) -> Result<SolveResponse, Error> {
        instance.validate()?;
        let started = Instant::now();
        let solution = brute_force(instance);
        let status = if solution.is_some() {
            SolveStatus::Optimal
        } else {
            SolveStatus::Infeasible
        };
        Ok(SolveResponse {
            status,
            solution,
            diagnostics: Diagnostics {
                search_time: started.elapsed(),
                ..Diagnostics::default()
            },
        })
    }
}
