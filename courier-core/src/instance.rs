//! Multiple Courier Problem instances.

use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A parsed Multiple Courier Problem instance.
///
/// Locations `0..items` are the item delivery points and location `items` is
/// the depot, so `distances` is a square matrix of side `items + 1`. The
/// matrix need not be symmetric.
///
/// # Examples
///
/// ```
/// use courier_core::Instance;
///
/// # fn main() -> Result<(), courier_core::InstanceValidationError> {
/// let instance = Instance::new(
///     vec![10, 10],
///     vec![3, 4],
///     vec![vec![0, 2, 3], vec![2, 0, 4], vec![3, 4, 0]],
/// )?;
/// assert_eq!(instance.depot(), 2);
/// assert_eq!(instance.route_distance(&[0, 1]), 3 + 2 + 4);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Instance {
    /// Number of couriers (`m`).
    pub couriers: usize,
    /// Number of items (`n`).
    pub items: usize,
    /// Load capacity of each courier.
    pub loads: Vec<u64>,
    /// Size of each item.
    pub sizes: Vec<u64>,
    /// Distance matrix over the items plus the depot at index `items`.
    pub distances: Vec<Vec<u64>>,
}

/// Reasons an [`Instance`] is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstanceValidationError {
    /// The instance has no couriers.
    #[error("at least one courier is required")]
    NoCouriers,
    /// The number of loads differs from the courier count.
    #[error("expected {couriers} courier loads, found {loads}")]
    LoadCountMismatch {
        /// Declared courier count.
        couriers: usize,
        /// Number of loads supplied.
        loads: usize,
    },
    /// The number of sizes differs from the item count.
    #[error("expected {items} item sizes, found {sizes}")]
    SizeCountMismatch {
        /// Declared item count.
        items: usize,
        /// Number of sizes supplied.
        sizes: usize,
    },
    /// There are fewer items than couriers.
    #[error("{items} items cannot be shared among {couriers} couriers")]
    FewerItemsThanCouriers {
        /// Declared item count.
        items: usize,
        /// Declared courier count.
        couriers: usize,
    },
    /// The items do not fit in the couriers' combined capacity.
    #[error("total item size {total_size} exceeds total capacity {total_capacity}")]
    InsufficientCapacity {
        /// Sum of all item sizes.
        total_size: u64,
        /// Sum of all courier loads.
        total_capacity: u64,
    },
    /// Summing the item sizes overflowed `u64`.
    #[error("sum of item sizes overflows")]
    TotalOverflow,
    /// The distance matrix has the wrong number of rows.
    #[error("distance matrix must have {expected} rows, found {found}")]
    DistanceRows {
        /// Required row count (`items + 1`).
        expected: usize,
        /// Rows supplied.
        found: usize,
    },
    /// A distance row has the wrong number of columns.
    #[error("distance row {row} must have {expected} entries, found {found}")]
    DistanceColumns {
        /// Offending row index.
        row: usize,
        /// Required column count (`items + 1`).
        expected: usize,
        /// Columns supplied.
        found: usize,
    },
}

impl Instance {
    /// Build an instance from loads, sizes and distances, deriving the courier
    /// and item counts from the vector lengths.
    pub fn new(
        loads: Vec<u64>,
        sizes: Vec<u64>,
        distances: Vec<Vec<u64>>,
    ) -> Result<Self, InstanceValidationError> {
        let instance = Self {
            couriers: loads.len(),
            items: sizes.len(),
            loads,
            sizes,
            distances,
        };
        instance.validate()?;
        Ok(instance)
    }

    /// Check the structural shape and the problem preconditions
    /// (`items >= couriers`, total size within total capacity).
    pub fn validate(&self) -> Result<(), InstanceValidationError> {
        if self.couriers == 0 {
            return Err(InstanceValidationError::NoCouriers);
        }
        if self.loads.len() != self.couriers {
            return Err(InstanceValidationError::LoadCountMismatch {
                couriers: self.couriers,
                loads: self.loads.len(),
            });
        }
        if self.sizes.len() != self.items {
            return Err(InstanceValidationError::SizeCountMismatch {
                items: self.items,
                sizes: self.sizes.len(),
            });
        }
        let side = self.items + 1;
        if self.distances.len() != side {
            return Err(InstanceValidationError::DistanceRows {
                expected: side,
                found: self.distances.len(),
            });
        }
        if let Some((row, found)) = self
            .distances
            .iter()
            .map(Vec::len)
            .enumerate()
            .find(|(_, len)| *len != side)
        {
            return Err(InstanceValidationError::DistanceColumns {
                row,
                expected: side,
                found,
            });
        }
        if self.items < self.couriers {
            return Err(InstanceValidationError::FewerItemsThanCouriers {
                items: self.items,
                couriers: self.couriers,
            });
        }
        let total_size = checked_total(&self.sizes)?;
        let total_capacity = self.total_capacity();
        if total_size > total_capacity {
            return Err(InstanceValidationError::InsufficientCapacity {
                total_size,
                total_capacity,
            });
        }
        Ok(())
    }

    /// Index of the depot location.
    pub const fn depot(&self) -> usize {
        self.items
    }

    /// Distance from location `from` to location `to`.
    ///
    /// # Panics
    ///
    /// Panics if either index exceeds the depot index.
    #[expect(
        clippy::indexing_slicing,
        reason = "out-of-range locations are a caller bug, documented under Panics"
    )]
    pub fn distance(&self, from: usize, to: usize) -> u64 {
        self.distances[from][to]
    }

    /// Sum of all item sizes, saturating at `u64::MAX`.
    pub fn total_size(&self) -> u64 {
        self.sizes.iter().fold(0_u64, |acc, size| acc.saturating_add(*size))
    }

    /// Sum of all courier loads, saturating at `u64::MAX`.
    pub fn total_capacity(&self) -> u64 {
        self.loads.iter().fold(0_u64, |acc, load| acc.saturating_add(*load))
    }

    /// Whether `distance(a, b) == distance(b, a)` for every pair of locations.
    pub fn is_symmetric(&self) -> bool {
        self.distances.iter().enumerate().all(|(row, values)| {
            values
                .iter()
                .enumerate()
                .all(|(col, value)| self.distances.get(col).and_then(|r| r.get(row)) == Some(value))
        })
    }

    /// Length of the tour leaving the depot, visiting `items` in order and
    /// returning to the depot. An empty route has length zero.
    ///
    /// # Panics
    ///
    /// Panics if an item index is out of range.
    pub fn route_distance(&self, items: &[usize]) -> u64 {
        let (Some(first), Some(last)) = (items.first(), items.last()) else {
            return 0;
        };
        let depot = self.depot();
        let legs: u64 = items
            .windows(2)
            .map(|pair| match pair {
                [from, to] => self.distance(*from, *to),
                _ => 0,
            })
            .sum();
        self.distance(depot, *first) + legs + self.distance(*last, depot)
    }

    /// Total size of the given items.
    ///
    /// # Panics
    ///
    /// Panics if an item index is out of range.
    #[expect(
        clippy::indexing_slicing,
        reason = "out-of-range items are a caller bug, documented under Panics"
    )]
    pub fn route_load(&self, items: &[usize]) -> u64 {
        items.iter().map(|item| self.sizes[*item]).sum()
    }
}

fn checked_total(values: &[u64]) -> Result<u64, InstanceValidationError> {
    values
        .iter()
        .try_fold(0_u64, |acc, value| acc.checked_add(*value))
        .ok_or(InstanceValidationError::TotalOverflow)
}
