//! Reader for instance files in the course `.dat` format.
//!
//! The layout is line oriented: the courier count, the item count, the
//! courier loads, the item sizes, then one distance row per location with
//! the depot last. Values on a line are separated by whitespace and blank
//! lines are ignored.

use std::str::FromStr;

use courier_core::{Instance, InstanceValidationError};
use thiserror::Error;

/// Reasons a `.dat` document is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DatError {
    /// The document ended early.
    #[error("expected {what}, found end of file")]
    MissingLine {
        /// What the next line should have held.
        what: &'static str,
    },
    /// A token is not a non-negative integer.
    #[error("line {line}: `{token}` is not a non-negative integer")]
    InvalidNumber {
        /// One-based line number.
        line: usize,
        /// Offending token.
        token: String,
    },
    /// A line holds the wrong number of values.
    #[error("line {line}: expected {expected} values, found {found}")]
    WrongCount {
        /// One-based line number.
        line: usize,
        /// Values required.
        expected: usize,
        /// Values present.
        found: usize,
    },
    /// Content follows the last distance row.
    #[error("line {line}: unexpected content after the distance matrix")]
    TrailingContent {
        /// One-based line number.
        line: usize,
    },
    /// The values parse but do not form a valid instance.
    #[error(transparent)]
    Invalid(#[from] InstanceValidationError),
}

type Line<'a> = (usize, &'a str);

/// Parse a `.dat` document into a validated [`Instance`].
///
/// # Errors
///
/// Returns a [`DatError`] describing the first problem found.
pub fn parse_instance(text: &str) -> Result<Instance, DatError> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(index, content)| (index + 1, content.trim()))
        .filter(|(_, content)| !content.is_empty());

    let couriers = single(next_line(&mut lines, "the courier count")?)?;
    let items = single(next_line(&mut lines, "the item count")?)?;
    let loads = row(next_line(&mut lines, "the courier loads")?, couriers)?;
    let sizes = row(next_line(&mut lines, "the item sizes")?, items)?;
    let distances = (0..=items)
        .map(|_| row(next_line(&mut lines, "a distance row")?, items + 1))
        .collect::<Result<Vec<Vec<u64>>, DatError>>()?;
    if let Some((line, _)) = lines.next() {
        return Err(DatError::TrailingContent { line });
    }
    Ok(Instance::new(loads, sizes, distances)?)
}

fn next_line<'a>(
    lines: &mut impl Iterator<Item = Line<'a>>,
    what: &'static str,
) -> Result<Line<'a>, DatError> {
    lines.next().ok_or(DatError::MissingLine { what })
}

fn values<T: FromStr>((line, content): Line<'_>) -> Result<Vec<T>, DatError> {
    content
        .split_whitespace()
        .map(|token| {
            token.parse().map_err(|_| DatError::InvalidNumber {
                line,
                token: token.to_owned(),
            })
        })
        .collect()
}

fn row<T: FromStr>(line: Line<'_>, expected: usize) -> Result<Vec<T>, DatError> {
    let parsed = values(line)?;
    if parsed.len() == expected {
        Ok(parsed)
    } else {
        Err(DatError::WrongCount {
            line: line.0,
            expected,
            found: parsed.len(),
        })
    }
}

fn single(line: Line<'_>) -> Result<usize, DatError> {
    let mut parsed = row(line, 1)?;
    Ok(parsed.pop().unwrap_or_default())
}
