//! Property-based tests for the propositional building blocks.
//!
//! # Invariants tested
//!
//! - **Bit round-trip:** `from_bits(to_bits(v, L)) == v` whenever `v < 2^L`,
//!   and `to_bits` refuses values that do not fit.
//! - **Comparators:** `less_than`, `less_or_equal` and `equal` agree with
//!   integer comparison for widths 1 to 16, including mixed widths.
//! - **Adder:** a satisfying model of `add` holds `a + b` whenever it fits the
//!   width, and the constraint is unsatisfiable when it does not.
//! - **Cardinality:** for every strategy and up to twelve inputs, the
//!   at-most-one encoding admits exactly the assignments with at most one true
//!   input, and the counting constraints admit exactly the assignments with
//!   the requested count.


use std::time::Duration;

use courier_solver_sat::bits::{BitVec, add, equal, from_bits, less_or_equal, less_than, to_bits};
use courier_solver_sat::{CadicalOracle, CardinalityStrategy, Deadline, Session};
use proptest::prelude::*;
use rstest::rstest;
use rustsat::types::Lit;

use proptest_support::{assumptions, bits_of, load_session, model_value, satisfiable, valuation};

fn session() -> Session {
    Session::new(Deadline::new(Duration::from_secs(60)))
}

fn mask(width: usize) -> u64 {
    if width >= 64 { u64::MAX } else { (1 << width) - 1 }
}

fn fresh_vector(session: &mut Session, width: usize) -> (Vec<Lit>, BitVec) {
    let lits: Vec<Lit> = (0..width).map(|_| session.fresh()).collect();
    let vector = BitVec::from_lits(lits.iter().copied());
    (lits, vector)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Property: conversion to bits and back is lossless.
    #[test]
    fn bits_round_trip(raw in any::<u64>(), width in 1_usize..=64) {
        let value = raw & mask(width);
        let bits = to_bits(value, width).expect("masked value fits");
        prop_assert_eq!(bits.len(), width);
        prop_assert_eq!(from_bits(&bits), value);
    }

    /// Property: values wider than the requested width are refused.
    #[test]
    fn oversized_values_are_refused(raw in any::<u64>(), width in 1_usize..64) {
        let value = raw | (1 << width);
        prop_assert!(to_bits(value, width).is_err());
    }

    /// Property: comparator formulas match integer comparison.
    #[test]
    fn comparators_match_integers(
        a_width in 1_usize..=16,
        b_width in 1_usize..=16,
        a_raw in any::<u64>(),
        b_raw in any::<u64>(),
    ) {
        let (a, b) = (a_raw & mask(a_width), b_raw & mask(b_width));
        let mut session = session();
        let (a_lits, a_vec) = fresh_vector(&mut session, a_width);
        let (b_lits, b_vec) = fresh_vector(&mut session, b_width);
        let lits: Vec<Lit> = a_lits.into_iter().chain(b_lits).collect();
        let values: Vec<bool> = bits_of(a, a_width).into_iter().chain(bits_of(b, b_width)).collect();
        let valuation = valuation(lits, values);

        prop_assert_eq!(a_vec.value_in(&valuation), a);
        prop_assert_eq!(less_than(&a_vec, &b_vec).eval(&valuation), a < b);
        prop_assert_eq!(less_or_equal(&a_vec, &b_vec).eval(&valuation), a <= b);
        prop_assert_eq!(equal(&a_vec, &b_vec).eval(&valuation), a == b);
    }

    /// Property: constant comparisons fold to the right constant.
    #[test]
    fn constant_comparisons_fold(a in 0_u64..1024, b in 0_u64..1024) {
        let a_vec = BitVec::constant(a, 10).expect("fits");
        let b_vec = BitVec::constant(b, 10).expect("fits");
        prop_assert_eq!(less_than(&a_vec, &b_vec).as_const(), Some(a < b));
        prop_assert_eq!(equal(&a_vec, &b_vec).as_const(), Some(a == b));
    }

    /// Property: the adder computes `a + b` or is unsatisfiable on overflow.
    #[test]
    fn adder_matches_integer_addition(width in 1_usize..=8, a_raw in any::<u64>(), b_raw in any::<u64>()) {
        let (a, b) = (a_raw & mask(width), b_raw & mask(width));
        let mut session = session();
        let (a_lits, a_vec) = fresh_vector(&mut session, width);
        let (b_lits, b_vec) = fresh_vector(&mut session, width);
        let sum = add(&mut session, &a_vec, &b_vec, width);
        session.assert(&sum.constraint);
        let mut oracle = CadicalOracle::new();
        load_session(&session, &mut oracle);

        let mut fixed = assumptions(&a_lits, &bits_of(a, width));
        fixed.extend(assumptions(&b_lits, &bits_of(b, width)));
        let fits = a + b <= mask(width);
        prop_assert_eq!(satisfiable(&mut oracle, &fixed), fits);
        if fits {
            let bits: Vec<bool> = sum.total.bits().iter().map(|bit| model_value(&oracle, bit)).collect();
            prop_assert_eq!(from_bits(&bits), a + b);
        }
    }

    /// Property: counting constraints admit exactly the assignments with the
    /// requested number of true inputs.
    #[test]
    fn counting_constraints_are_exact(
        strategy in proptest::sample::select(CardinalityStrategy::ALL.to_vec()),
        inputs in 0_usize..=6,
        k in 0_usize..=7,
    ) {
        let encoder = strategy.encoder();
        let mut at_most = session();
        let mut at_least = session();
        let mut exactly = session();
        let lits: Vec<Lit> = (0..inputs).map(|_| at_most.fresh()).collect();
        for other in [&mut at_least, &mut exactly] {
            for _ in 0..inputs {
                other.fresh();
            }
        }
        encoder.at_most_k(&mut at_most, &lits, k);
        encoder.at_least_k(&mut at_least, &lits, k);
        encoder.exactly_k(&mut exactly, &lits, k);
        let mut at_most_oracle = CadicalOracle::new();
        let mut at_least_oracle = CadicalOracle::new();
        let mut exactly_oracle = CadicalOracle::new();
        load_session(&at_most, &mut at_most_oracle);
        load_session(&at_least, &mut at_least_oracle);
        load_session(&exactly, &mut exactly_oracle);

        for pattern in 0_u64..(1 << inputs) {
            let values: Vec<bool> = (0..inputs).map(|bit| (pattern >> bit) & 1 == 1).collect();
            let count = values.iter().filter(|value| **value).count();
            let fixed = assumptions(&lits, &values);
            prop_assert_eq!(satisfiable(&mut at_most_oracle, &fixed), count <= k);
            prop_assert_eq!(satisfiable(&mut at_least_oracle, &fixed), count >= k);
            prop_assert_eq!(satisfiable(&mut exactly_oracle, &fixed), count == k);
        }
    }
}

/// Exhaustive at-most-one and exactly-one checks for up to twelve inputs.
#[rstest]
#[case::pairwise(CardinalityStrategy::Pairwise)]
#[case::sequential(CardinalityStrategy::Sequential)]
#[case::bitwise(CardinalityStrategy::Bitwise)]
#[case::commander(CardinalityStrategy::Commander)]
fn at_most_one_is_exact(#[case] strategy: CardinalityStrategy) {
    let encoder = strategy.encoder();
    for inputs in 0_usize..=12 {
        let mut amo = session();
        let lits: Vec<Lit> = (0..inputs).map(|_| amo.fresh()).collect();
        let mut exactly = session();
        for _ in 0..inputs {
            exactly.fresh();
        }
        encoder.at_most_one(&mut amo, &lits);
        encoder.exactly_one(&mut exactly, &lits);
        let mut amo_oracle = CadicalOracle::new();
        let mut exactly_oracle = CadicalOracle::new();
        load_session(&amo, &mut amo_oracle);
        load_session(&exactly, &mut exactly_oracle);

        for pattern in 0_u64..(1 << inputs) {
            let count = pattern.count_ones();
            let values: Vec<bool> = (0..inputs).map(|bit| (pattern >> bit) & 1 == 1).collect();
            let fixed = assumptions(&lits, &values);
            assert_eq!(
                satisfiable(&mut amo_oracle, &fixed),
                count <= 1,
                "{strategy} at-most-one with {inputs} inputs, pattern {pattern:b}"
            );
            assert_eq!(
                satisfiable(&mut exactly_oracle, &fixed),
                count == 1,
                "{strategy} exactly-one with {inputs} inputs, pattern {pattern:b}"
            );
        }
    }
}

/// Exhaustive at-most-k, at-least-k and exactly-k checks beyond the sizes the
/// property above samples.
#[rstest]
fn counting_is_exact_up_to_twelve_inputs(
    #[values(
        CardinalityStrategy::Pairwise,
        CardinalityStrategy::Sequential,
        CardinalityStrategy::Bitwise,
        CardinalityStrategy::Commander
    )]
    strategy: CardinalityStrategy,
    #[values((7, 3), (9, 4), (12, 0), (12, 2), (12, 6), (12, 11), (12, 12), (12, 13))] shape: (
        usize,
        usize,
    ),
) {
    let (inputs, k) = shape;
    let encoder = strategy.encoder();
    let mut at_most = session();
    let lits: Vec<Lit> = (0..inputs).map(|_| at_most.fresh()).collect();
    let mut at_least = session();
    let mut exactly = session();
    for other in [&mut at_least, &mut exactly] {
        for _ in 0..inputs {
            other.fresh();
        }
    }
    encoder.at_most_k(&mut at_most, &lits, k);
    encoder.at_least_k(&mut at_least, &lits, k);
    encoder.exactly_k(&mut exactly, &lits, k);
    let mut at_most_oracle = CadicalOracle::new();
    let mut at_least_oracle = CadicalOracle::new();
    let mut exactly_oracle = CadicalOracle::new();
    load_session(&at_most, &mut at_most_oracle);
    load_session(&at_least, &mut at_least_oracle);
    load_session(&exactly, &mut exactly_oracle);

    for pattern in 0_u64..(1 << inputs) {
        let values: Vec<bool> = (0..inputs).map(|bit| (pattern >> bit) & 1 == 1).collect();
        let count = values.iter().filter(|value| **value).count();
        let fixed = assumptions(&lits, &values);
        assert_eq!(
            satisfiable(&mut at_most_oracle, &fixed),
            count <= k,
            "{strategy} at-most-{k} with {inputs} inputs, pattern {pattern:b}"
        );
        assert_eq!(
            satisfiable(&mut at_least_oracle, &fixed),
            count >= k,
            "{strategy} at-least-{k} with {inputs} inputs, pattern {pattern:b}"
        );
        assert_eq!(
            satisfiable(&mut exactly_oracle, &fixed),
            count == k,
            "{strategy} exactly-{k} with {inputs} inputs, pattern {pattern:b}"
        );
    }
}
