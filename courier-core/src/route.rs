//! Courier routes and complete solutions.

use std::collections::HashSet;

use crate::Instance;

/// The ordered items one courier delivers, leaving from and returning to the
/// depot. Item indices are zero-based.
///
/// # Examples
/// ```
/// use courier_core::Route;
///
/// let route = Route::new(vec![2, 0]);
/// assert_eq!(route.items(), &[2, 0]);
/// assert_eq!(route.one_based(), vec![3, 1]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Route {
    items: Vec<usize>,
}

impl Route {
    /// Construct a route visiting `items` in order.
    pub const fn new(items: Vec<usize>) -> Self {
        Self { items }
    }

    /// Construct a route for a courier that carries nothing.
    pub const fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Items in visiting order.
    pub fn items(&self) -> &[usize] {
        &self.items
    }

    /// Whether the courier carries nothing.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of items on the route.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Items in visiting order, numbered from one as in the report format.
    pub fn one_based(&self) -> Vec<usize> {
        self.items.iter().map(|item| item + 1).collect()
    }
}

/// A feasible assignment of items to couriers with its objective value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    /// Maximum tour length over all couriers.
    pub objective: u64,
    /// One route per courier, in courier order.
    pub routes: Vec<Route>,
    /// `assignment[c][i]` is true when courier `c` carries item `i`.
    pub assignment: Vec<Vec<bool>>,
    /// `precedence[i][j]` is true when item `i` immediately precedes item `j`.
    pub precedence: Vec<Vec<bool>>,
}

impl Solution {
    /// Build a solution from explicit routes, deriving the objective and the
    /// assignment and precedence matrices.
    ///
    /// # Panics
    ///
    /// Panics if a route names an item outside the instance.
    pub fn from_routes(instance: &Instance, routes: Vec<Route>) -> Self {
        let assignment = (0..instance.couriers)
            .map(|courier| {
                let carried = routes.get(courier).map(Route::items).unwrap_or_default();
                (0..instance.items)
                    .map(|item| carried.contains(&item))
                    .collect()
            })
            .collect();
        let links: HashSet<(usize, usize)> = routes
            .iter()
            .flat_map(|route| route.items().windows(2))
            .filter_map(|pair| match pair {
                [from, to] => Some((*from, *to)),
                _ => None,
            })
            .collect();
        let precedence = (0..instance.items)
            .map(|from| {
                (0..instance.items)
                    .map(|to| links.contains(&(from, to)))
                    .collect()
            })
            .collect();
        let objective = routes
            .iter()
            .map(|route| instance.route_distance(route.items()))
            .max()
            .unwrap_or(0);
        Self {
            objective,
            routes,
            assignment,
            precedence,
        }
    }

    /// Longest tour among the routes, measured on `instance`.
    pub fn max_route_distance(&self, instance: &Instance) -> u64 {
        self.routes
            .iter()
            .map(|route| instance.route_distance(route.items()))
            .max()
            .unwrap_or(0)
    }

    /// Whether every courier stays within its load capacity.
    pub fn respects_capacity(&self, instance: &Instance) -> bool {
        self.routes
            .iter()
            .zip(&instance.loads)
            .all(|(route, load)| instance.route_load(route.items()) <= *load)
    }

    /// Whether every item appears on exactly one route.
    pub fn covers_each_item_once(&self, instance: &Instance) -> bool {
        let mut seen = vec![0_usize; instance.items];
        for item in self.routes.iter().flat_map(Route::items) {
            match seen.get_mut(*item) {
                Some(count) => *count += 1,
                None => return false,
            }
        }
        seen.iter().all(|count| *count == 1)
    }
}
