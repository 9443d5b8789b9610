//! Wall-clock budgets and results that may have been cut short by one.

use std::time::{Duration, Instant};

/// A wall-clock budget measured from a fixed start instant.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use courier_solver_sat::Deadline;
///
/// let deadline = Deadline::new(Duration::ZERO);
/// assert!(deadline.expired());
/// assert_eq!(deadline.remaining(), Duration::ZERO);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    started: Instant,
    budget: Duration,
}

impl Deadline {
    /// Start a budget now.
    pub fn new(budget: Duration) -> Self {
        Self::starting_at(Instant::now(), budget)
    }

    /// Start a budget at an explicit instant.
    pub const fn starting_at(started: Instant, budget: Duration) -> Self {
        Self { started, budget }
    }

    /// Total budget.
    pub const fn budget(&self) -> Duration {
        self.budget
    }

    /// Time spent since the budget started.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Whether the budget is used up.
    pub fn expired(&self) -> bool {
        self.elapsed() >= self.budget
    }

    /// Budget left, clipped at zero.
    pub fn remaining(&self) -> Duration {
        self.budget.saturating_sub(self.elapsed())
    }
}

/// Outcome of a budgeted computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress<T> {
    /// The computation ran to completion.
    Complete(T),
    /// The budget ran out; `value` holds whatever was built so far.
    Partial {
        /// Work completed before the budget expired.
        value: T,
        /// Time spent when the cut-off was noticed.
        elapsed: Duration,
    },
}

impl<T> Progress<T> {
    /// Whether the computation ran to completion.
    pub const fn is_complete(&self) -> bool {
        matches!(self, Self::Complete(_))
    }

    /// Borrow the carried value.
    pub const fn value(&self) -> &T {
        match self {
            Self::Complete(value) | Self::Partial { value, .. } => value,
        }
    }

    /// Take the carried value, complete or not.
    pub fn into_value(self) -> T {
        match self {
            Self::Complete(value) | Self::Partial { value, .. } => value,
        }
    }

    /// Transform the carried value, keeping completeness.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Progress<U> {
        match self {
            Self::Complete(value) => Progress::Complete(f(value)),
            Self::Partial { value, elapsed } => Progress::Partial {
                value: f(value),
                elapsed,
            },
        }
    }
}
