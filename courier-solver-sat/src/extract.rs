//! Turn assignment and precedence matrices back into routes.

use courier_core::{Route, SolveError};

fn precedes(precedence: &[Vec<bool>], from: usize, to: usize) -> bool {
    from != to
        && precedence
            .get(from)
            .and_then(|row| row.get(to))
            .copied()
            .unwrap_or(false)
}

/// Decode one route per courier.
///
/// Each courier's route starts at its carried item without a predecessor and
/// follows successors until none is left. A courier that carries nothing gets
/// an empty route.
///
/// # Errors
///
/// Returns [`SolveError::MalformedModel`] when a courier carries items but none
/// lacks a predecessor, when the chain revisits an item (so no chain runs
/// past the item count), moves to an item of another courier, or stops
/// before covering every item the courier carries.
///
/// # Examples
/// ```
/// use courier_core::Route;
/// use courier_solver_sat::extract_routes;
///
/// let assignment = vec![vec![true, true, false], vec![false, false, true]];
/// let mut precedence = vec![vec![false; 3]; 3];
/// precedence[1][0] = true;
/// let routes = extract_routes(&assignment, &precedence).expect("well-formed");
/// assert_eq!(routes, vec![Route::new(vec![1, 0]), Route::new(vec![2])]);
/// ```
pub fn extract_routes(
    assignment: &[Vec<bool>],
    precedence: &[Vec<bool>],
) -> Result<Vec<Route>, SolveError> {
    assignment
        .iter()
        .enumerate()
        .map(|(courier, carried)| route_for(courier, carried, precedence))
        .collect()
}

fn route_for(
    courier: usize,
    carried: &[bool],
    precedence: &[Vec<bool>],
) -> Result<Route, SolveError> {
    let malformed = |reason: String| SolveError::MalformedModel { courier, reason };
    let items = carried.len();
    let owned: Vec<usize> = carried
        .iter()
        .enumerate()
        .filter(|(_, held)| **held)
        .map(|(item, _)| item)
        .collect();
    if owned.is_empty() {
        return Ok(Route::empty());
    }
    let Some(start) = owned
        .iter()
        .copied()
        .find(|item| !(0..items).any(|from| precedes(precedence, from, *item)))
    else {
        return Err(malformed("every carried item has a predecessor".to_owned()));
    };

    let mut visited = vec![false; items];
    let mut route = Vec::with_capacity(owned.len());
    let mut next = Some(start);
    while let Some(item) = next {
        match visited.get_mut(item) {
            Some(seen) if *seen => {
                return Err(malformed(format!("item {item} is visited twice")));
            }
            Some(seen) => *seen = true,
            None => return Err(malformed(format!("item {item} is out of range"))),
        }
        if !carried.get(item).copied().unwrap_or(false) {
            return Err(malformed(format!("item {item} belongs to another courier")));
        }
        route.push(item);
        next = (0..items).find(|to| precedes(precedence, item, *to));
    }
    if route.len() != owned.len() {
        return Err(malformed(format!(
            "route covers {} of {} carried items",
            route.len(),
            owned.len()
        )));
    }
    Ok(Route::new(route))
}
