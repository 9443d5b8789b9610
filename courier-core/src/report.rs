//! Flat result record written by collaborators such as the CLI.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Route, SolveResponse};

/// Summary of a solve run in the course result format.
///
/// Routes in `sol` are numbered from one. `obj` is `None` when no solution is
/// known; `optimal` is true for proven optima and for proven infeasibility.
///
/// # Examples
/// ```
/// use courier_core::{Diagnostics, SolveReport, SolveResponse, SolveStatus};
///
/// let response = SolveResponse {
///     status: SolveStatus::Unknown,
///     solution: None,
///     diagnostics: Diagnostics::default(),
/// };
/// let report = SolveReport::from(&response);
/// assert_eq!(report.obj, None);
/// assert!(report.sol.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SolveReport {
    /// Elapsed wall-clock time, rounded up to whole seconds.
    pub time: u64,
    /// Whether the search completed.
    pub optimal: bool,
    /// Objective value of the best solution, if any.
    pub obj: Option<u64>,
    /// One-based item sequence per courier.
    pub sol: Vec<Vec<usize>>,
}

impl From<&SolveResponse> for SolveReport {
    fn from(response: &SolveResponse) -> Self {
        let elapsed = response.elapsed();
        let time = elapsed.as_secs() + u64::from(elapsed.subsec_nanos() > 0);
        let sol = response
            .solution
            .as_ref()
            .map(|solution| solution.routes.iter().map(Route::one_based).collect())
            .unwrap_or_default();
        Self {
            time,
            optimal: response.status.is_proven(),
            obj: response.objective(),
            sol,
        }
    }
}
