//! Cardinality constraints over literals.
//!
//! Every encoder asserts its clauses straight into a [`Session`]. The model
//! builder only sees the [`CardinalityEncoder`] trait and picks an
//! implementation through [`CardinalityStrategy`].

use std::fmt;
use std::str::FromStr;

use rustsat::types::Lit;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::Session;
use crate::bits::{bits_for, to_bits};

/// Encodes "how many of these literals are true" constraints.
///
/// Only [`at_most_one`](Self::at_most_one) differs between the shipped
/// encoders; the counting constraints default to a sequential counter.
pub trait CardinalityEncoder: Sync {
    /// At least one literal holds. An empty input is unsatisfiable.
    fn at_least_one(&self, session: &mut Session, lits: &[Lit]) {
        session.add_clause(lits.iter().copied());
    }

    /// At most one literal holds.
    fn at_most_one(&self, session: &mut Session, lits: &[Lit]);

    /// Exactly one literal holds.
    fn exactly_one(&self, session: &mut Session, lits: &[Lit]) {
        self.at_least_one(session, lits);
        self.at_most_one(session, lits);
    }

    /// At most `k` literals hold.
    fn at_most_k(&self, session: &mut Session, lits: &[Lit], k: usize) {
        sequential_at_most_k(session, lits, k);
    }

    /// At least `k` literals hold, as at most `n - k` of the negations.
    fn at_least_k(&self, session: &mut Session, lits: &[Lit], k: usize) {
        if k == 0 {
            return;
        }
        if k > lits.len() {
            session.add_clause([]);
            return;
        }
        let negated: Vec<Lit> = lits.iter().map(|lit| !*lit).collect();
        self.at_most_k(session, &negated, lits.len() - k);
    }

    /// Exactly `k` literals hold.
    fn exactly_k(&self, session: &mut Session, lits: &[Lit], k: usize) {
        self.at_most_k(session, lits, k);
        self.at_least_k(session, lits, k);
    }
}

/// One binary clause per pair of inputs.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pairwise;

impl CardinalityEncoder for Pairwise {
    fn at_most_one(&self, session: &mut Session, lits: &[Lit]) {
        pairwise_at_most_one(session, lits);
    }

    fn at_most_k(&self, session: &mut Session, lits: &[Lit], k: usize) {
        if k >= lits.len() {
            return;
        }
        for subset in Combinations::new(lits.len(), k + 1) {
            session.add_clause(
                subset
                    .iter()
                    .filter_map(|index| lits.get(*index))
                    .map(|lit| !*lit),
            );
        }
    }
}

/// Sinz's sequential counter.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialCounter;

impl CardinalityEncoder for SequentialCounter {
    fn at_most_one(&self, session: &mut Session, lits: &[Lit]) {
        sequential_at_most_k(session, lits, 1);
    }
}

/// Binary encoding: each input selects a distinct pattern of
/// `ceil(log2 n)` auxiliary bits.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bitwise;

impl CardinalityEncoder for Bitwise {
    fn at_most_one(&self, session: &mut Session, lits: &[Lit]) {
        if lits.len() < 2 {
            return;
        }
        let width = bits_for(lits.len() as u64 - 1);
        let selector: Vec<Lit> = (0..width).map(|_| session.fresh()).collect();
        for (index, lit) in lits.iter().enumerate() {
            let Ok(pattern) = to_bits(index as u64, width) else {
                continue;
            };
            for (bit, set) in selector.iter().zip(pattern) {
                session.add_clause([!*lit, if set { *bit } else { !*bit }]);
            }
        }
    }
}

/// Commander encoding, unrolled into a loop.
///
/// Three inputs and a fresh commander `y` form a pairwise group; the search
/// continues with `!y` in their place until at most four literals remain.
#[derive(Debug, Clone, Copy, Default)]
pub struct Commander;

impl CardinalityEncoder for Commander {
    fn at_most_one(&self, session: &mut Session, lits: &[Lit]) {
        let mut remaining = lits.to_vec();
        while remaining.len() > 4 {
            let commander = session.fresh();
            let rest = remaining.split_off(3);
            remaining.push(commander);
            pairwise_at_most_one(session, &remaining);
            remaining = std::iter::once(!commander).chain(rest).collect();
        }
        pairwise_at_most_one(session, &remaining);
    }
}

fn pairwise_at_most_one(session: &mut Session, lits: &[Lit]) {
    for (position, first) in lits.iter().enumerate() {
        for second in lits.iter().skip(position + 1) {
            session.add_clause([!*first, !*second]);
        }
    }
}

/// Sinz's LT-SEQ encoding of `sum(lits) <= k`.
///
/// Register bit `j` after input `i` holds when at least `j + 1` of the first
/// `i + 1` inputs are true.
fn sequential_at_most_k(session: &mut Session, lits: &[Lit], k: usize) {
    if k >= lits.len() {
        return;
    }
    if k == 0 {
        for lit in lits {
            session.add_clause([!*lit]);
        }
        return;
    }
    let Some((last, body)) = lits.split_last() else {
        return;
    };
    let mut before: Option<Vec<Lit>> = None;
    for lit in body {
        let register: Vec<Lit> = (0..k).map(|_| session.fresh()).collect();
        if let Some(first) = register.first() {
            session.add_clause([!*lit, *first]);
        }
        match &before {
            None => {
                for higher in register.iter().skip(1) {
                    session.add_clause([!*higher]);
                }
            }
            Some(below) => {
                for (current, carried) in register.iter().zip(below) {
                    session.add_clause([!*carried, *current]);
                }
                for (current, carried) in register.iter().skip(1).zip(below) {
                    session.add_clause([!*lit, !*carried, *current]);
                }
                if let Some(full) = below.last() {
                    session.add_clause([!*lit, !*full]);
                }
            }
        }
        before = Some(register);
    }
    if let Some(full) = before.as_ref().and_then(|register| register.last()) {
        session.add_clause([!*last, !*full]);
    }
}

/// Ascending `size`-subsets of `0..n`.
struct Combinations {
    n: usize,
    indices: Vec<usize>,
    done: bool,
}

impl Combinations {
    fn new(n: usize, size: usize) -> Self {
        Self {
            n,
            indices: (0..size).collect(),
            done: size > n,
        }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let current = self.indices.clone();
        let limit = self.n - self.indices.len();
        let movable = self
            .indices
            .iter()
            .enumerate()
            .rposition(|(position, index)| *index < limit + position);
        match movable {
            Some(position) => {
                let start = current.get(position).map_or(0, |index| index + 1);
                for (offset, slot) in self.indices.iter_mut().skip(position).enumerate() {
                    *slot = start + offset;
                }
            }
            None => self.done = true,
        }
        Some(current)
    }
}

/// Which at-most-one encoding the model builder uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum CardinalityStrategy {
    /// [`Pairwise`].
    Pairwise,
    /// [`SequentialCounter`].
    #[default]
    Sequential,
    /// [`Bitwise`].
    Bitwise,
    /// [`Commander`].
    Commander,
}

impl CardinalityStrategy {
    /// Every strategy, in declaration order.
    pub const ALL: [Self; 4] = [
        Self::Pairwise,
        Self::Sequential,
        Self::Bitwise,
        Self::Commander,
    ];

    /// The encoder implementing this strategy.
    pub fn encoder(self) -> &'static dyn CardinalityEncoder {
        match self {
            Self::Pairwise => &Pairwise,
            Self::Sequential => &SequentialCounter,
            Self::Bitwise => &Bitwise,
            Self::Commander => &Commander,
        }
    }

    const fn name(self) -> &'static str {
        match self {
            Self::Pairwise => "pairwise",
            Self::Sequential => "sequential",
            Self::Bitwise => "bitwise",
            Self::Commander => "commander",
        }
    }
}

impl fmt::Display for CardinalityStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown [`CardinalityStrategy`] name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown cardinality strategy `{0}`; expected pairwise, sequential, bitwise or commander")]
pub struct ParseStrategyError(String);

impl FromStr for CardinalityStrategy {
    type Err = ParseStrategyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.name() == wanted)
            .ok_or_else(|| ParseStrategyError(value.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Deadline;
    use rstest::rstest;
    use std::time::Duration;

    fn inputs(session: &mut Session, n: usize) -> Vec<Lit> {
        (0..n).map(|_| session.fresh()).collect()
    }

    fn session() -> Session {
        Session::new(Deadline::new(Duration::from_secs(60)))
    }

    #[rstest]
    #[case(3, 0, 1)]
    #[case(0, 0, 1)]
    #[case(4, 2, 6)]
    #[case(5, 3, 10)]
    #[case(2, 3, 0)]
    fn combinations_are_counted(#[case] n: usize, #[case] size: usize, #[case] expected: usize) {
        assert_eq!(Combinations::new(n, size).count(), expected);
    }

    #[rstest]
    fn combinations_are_ascending() {
        let all: Vec<Vec<usize>> = Combinations::new(4, 2).collect();
        assert_eq!(
            all,
            vec![
                vec![0, 1],
                vec![0, 2],
                vec![0, 3],
                vec![1, 2],
                vec![1, 3],
                vec![2, 3]
            ]
        );
    }

    #[rstest]
    #[case(CardinalityStrategy::Pairwise, 6, 0)]
    #[case(CardinalityStrategy::Sequential, 8, 3)]
    #[case(CardinalityStrategy::Bitwise, 8, 2)]
    #[case(CardinalityStrategy::Commander, 6, 0)]
    fn at_most_one_over_four_inputs(
        #[case] strategy: CardinalityStrategy,
        #[case] clauses: usize,
        #[case] auxiliaries: usize,
    ) {
        let mut session = session();
        let lits = inputs(&mut session, 4);
        let (clauses_before, variables_before) = (session.clauses(), session.variables());
        strategy.encoder().at_most_one(&mut session, &lits);
        assert_eq!(session.clauses() - clauses_before, clauses);
        assert_eq!(session.variables() - variables_before, auxiliaries);
    }

    #[rstest]
    fn commander_introduces_one_literal_per_group() {
        let mut session = session();
        let lits = inputs(&mut session, 9);
        let before = session.variables();
        Commander.at_most_one(&mut session, &lits);
        assert_eq!(session.variables() - before, 3);
    }

    #[rstest]
    #[case::pairwise(CardinalityStrategy::Pairwise)]
    #[case::sequential(CardinalityStrategy::Sequential)]
    #[case::bitwise(CardinalityStrategy::Bitwise)]
    #[case::commander(CardinalityStrategy::Commander)]
    fn trivial_inputs_add_nothing(#[case] strategy: CardinalityStrategy) {
        let mut session = session();
        let lits = inputs(&mut session, 1);
        let before = session.clauses();
        strategy.encoder().at_most_one(&mut session, &[]);
        strategy.encoder().at_most_one(&mut session, &lits);
        strategy.encoder().at_most_k(&mut session, &lits, 3);
        assert_eq!(session.clauses(), before);
    }

    #[rstest]
    fn empty_at_least_one_is_unsatisfiable() {
        let mut session = session();
        let before = session.clauses();
        SequentialCounter.at_least_one(&mut session, &[]);
        assert_eq!(session.clauses(), before + 1);
    }

    #[rstest]
    #[case("pairwise", CardinalityStrategy::Pairwise)]
    #[case("Sequential", CardinalityStrategy::Sequential)]
    #[case(" bitwise ", CardinalityStrategy::Bitwise)]
    #[case("commander", CardinalityStrategy::Commander)]
    fn strategies_parse(#[case] text: &str, #[case] expected: CardinalityStrategy) {
        assert_eq!(text.parse::<CardinalityStrategy>(), Ok(expected));
        assert_eq!(expected.to_string().parse::<CardinalityStrategy>(), Ok(expected));
    }

    #[rstest]
    fn unknown_strategy_is_rejected() {
        let err = "ladder".parse::<CardinalityStrategy>().expect_err("unknown name");
        assert!(err.to_string().contains("ladder"));
    }

    #[rstest]
    fn sequential_is_the_default() {
        assert_eq!(CardinalityStrategy::default(), CardinalityStrategy::Sequential);
    }
}
