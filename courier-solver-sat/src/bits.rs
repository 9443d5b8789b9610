//! Fixed-width unsigned integers over boolean formulas.
//!
//! Every bit sequence here is most significant bit first: `to_bits(6, 4)` is
//! `[false, true, true, false]`. Comparators are pure formulas and allocate
//! nothing; the adder introduces fresh sum and carry variables through the
//! session and hands back the constraint that ties them to the operands.

use courier_core::SolveError;
use rustsat::types::Lit;

use crate::{Bool, Deadline, Progress, Session};

/// MSB-first binary expansion of `value` in exactly `width` bits.
///
/// # Errors
///
/// Returns [`SolveError::WidthOverflow`] when `value >= 2^width`.
///
/// # Examples
/// ```
/// use courier_solver_sat::bits::{from_bits, to_bits};
///
/// # fn main() -> Result<(), courier_core::SolveError> {
/// let bits = to_bits(6, 4)?;
/// assert_eq!(bits, vec![false, true, true, false]);
/// assert_eq!(from_bits(&bits), 6);
/// assert!(to_bits(16, 4).is_err());
/// # Ok(())
/// # }
/// ```
pub fn to_bits(value: u64, width: usize) -> Result<Vec<bool>, SolveError> {
    if width < 64 && value >> width != 0 {
        return Err(SolveError::WidthOverflow { value, width });
    }
    Ok((0..width)
        .rev()
        .map(|position| position < 64 && (value >> position) & 1 == 1)
        .collect())
}

/// Value of an MSB-first bit sequence.
pub fn from_bits(bits: &[bool]) -> u64 {
    bits.iter()
        .fold(0_u64, |acc, bit| (acc << 1) | u64::from(*bit))
}

/// Bits needed to represent every value in `0..=max_value`, at least one.
pub const fn bits_for(max_value: u64) -> usize {
    let needed = (u64::BITS - max_value.leading_zeros()) as usize;
    if needed == 0 { 1 } else { needed }
}

/// An unsigned integer whose bits are formulas, most significant first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitVec {
    bits: Vec<Bool>,
}

impl BitVec {
    /// A constant of the given width.
    ///
    /// # Errors
    ///
    /// Returns [`SolveError::WidthOverflow`] when `value` does not fit.
    pub fn constant(value: u64, width: usize) -> Result<Self, SolveError> {
        Ok(Self {
            bits: to_bits(value, width)?
                .into_iter()
                .map(Bool::constant)
                .collect(),
        })
    }

    /// All-zero constant of the given width.
    pub fn zeros(width: usize) -> Self {
        Self {
            bits: vec![Bool::FALSE; width],
        }
    }

    /// A vector of free literals, most significant first.
    pub fn from_lits(lits: impl IntoIterator<Item = Lit>) -> Self {
        Self {
            bits: lits.into_iter().map(Bool::lit).collect(),
        }
    }

    /// Wrap arbitrary bit formulas, most significant first.
    pub const fn from_bools(bits: Vec<Bool>) -> Self {
        Self { bits }
    }

    /// Number of bits.
    pub fn width(&self) -> usize {
        self.bits.len()
    }

    /// Bit formulas, most significant first.
    pub fn bits(&self) -> &[Bool] {
        &self.bits
    }

    /// This value when `guard` holds and zero otherwise.
    #[must_use]
    pub fn masked(&self, guard: &Bool) -> Self {
        Self {
            bits: self
                .bits
                .iter()
                .map(|bit| Bool::and([guard.clone(), bit.clone()]))
                .collect(),
        }
    }

    /// Whether every bit folded to constant false.
    pub fn is_zero(&self) -> bool {
        self.bits.iter().all(|bit| bit.as_const() == Some(false))
    }

    /// Value under a valuation of literals.
    pub fn value_in(&self, valuation: &impl Fn(Lit) -> bool) -> u64 {
        let bits: Vec<bool> = self.bits.iter().map(|bit| bit.eval(valuation)).collect();
        from_bits(&bits)
    }

    /// Bits aligned to `width` by padding with leading zeros. Bits beyond
    /// `width` are returned separately, most significant first.
    fn aligned(&self, width: usize) -> (Vec<Bool>, Vec<Bool>) {
        let excess = self.width().saturating_sub(width);
        let (high, low) = self.bits.split_at(excess);
        let mut aligned = vec![Bool::FALSE; width - low.len()];
        aligned.extend_from_slice(low);
        (aligned, high.to_vec())
    }
}

/// Bit pairs of `a` and `b`, zero-extended to a common width, MSB first.
fn paired(a: &BitVec, b: &BitVec) -> Vec<(Bool, Bool)> {
    let width = a.width().max(b.width());
    let (low_a, _) = a.aligned(width);
    let (low_b, _) = b.aligned(width);
    low_a.into_iter().zip(low_b).collect()
}

/// Lexicographic comparison from the least significant bit upwards; `at_end`
/// is the result for equal operands.
fn compare(a: &BitVec, b: &BitVec, at_end: bool) -> Bool {
    paired(a, b)
        .into_iter()
        .rev()
        .fold(Bool::constant(at_end), |below, (x, y)| {
            let smaller_here = Bool::and([Bool::not(x.clone()), y.clone()]);
            let same_here = Bool::iff(x, y);
            Bool::or([smaller_here, Bool::and([same_here, below])])
        })
}

/// `a < b` as unsigned integers.
pub fn less_than(a: &BitVec, b: &BitVec) -> Bool {
    compare(a, b, false)
}

/// `a <= b` as unsigned integers.
pub fn less_or_equal(a: &BitVec, b: &BitVec) -> Bool {
    compare(a, b, true)
}

/// `a == b` as unsigned integers.
pub fn equal(a: &BitVec, b: &BitVec) -> Bool {
    Bool::and(paired(a, b).into_iter().map(|(x, y)| Bool::iff(x, y)))
}

/// `a <= b` for long vectors such as flattened tables.
///
/// Each prefix result is reified into its own literal, so the encoded formula
/// stays shallow regardless of the operand width.
pub fn chained_less_or_equal(session: &mut Session, a: &BitVec, b: &BitVec) -> Bool {
    let mut below = Bool::TRUE;
    for (x, y) in paired(a, b).into_iter().rev() {
        let smaller_here = Bool::and([Bool::not(x.clone()), y.clone()]);
        let same_here = Bool::iff(x, y);
        let step = Bool::or([smaller_here, Bool::and([same_here, below])]);
        below = match step.as_const() {
            Some(value) => Bool::constant(value),
            None => Bool::lit(session.reify(&step)),
        };
    }
    below
}

/// Output of [`add`]: the sum bits and the formula defining them.
#[derive(Debug, Clone)]
pub struct Sum {
    /// Sum bits, most significant first.
    pub total: BitVec,
    /// Holds exactly when `total = a + b` without overflowing the width.
    pub constraint: Bool,
}

/// Ripple-carry addition of `a` and `b` into `width` fresh bits.
///
/// The constraint fixes the carry into the least significant bit to zero and
/// forbids a carry out of the most significant bit, so an addition whose true
/// result needs more than `width` bits is unsatisfiable. Operand bits above
/// `width` are required to be zero by the same constraint.
pub fn add(session: &mut Session, a: &BitVec, b: &BitVec, width: usize) -> Sum {
    let (a_bits, a_high) = a.aligned(width);
    let (b_bits, b_high) = b.aligned(width);
    let mut parts: Vec<Bool> = a_high.into_iter().chain(b_high).map(Bool::not).collect();
    let mut total = Vec::with_capacity(width);
    let mut carry = Bool::FALSE;
    for (x, y) in a_bits.into_iter().zip(b_bits).rev() {
        let sum = Bool::lit(session.fresh());
        let carry_out = Bool::lit(session.fresh());
        let half = Bool::xor(x.clone(), y.clone());
        parts.push(Bool::iff(sum.clone(), Bool::xor(half.clone(), carry.clone())));
        parts.push(Bool::iff(
            carry_out.clone(),
            Bool::or([Bool::and([x, y]), Bool::and([carry, half])]),
        ));
        total.push(sum);
        carry = carry_out;
    }
    total.reverse();
    parts.push(Bool::not(carry));
    Sum {
        total: BitVec::from_bools(total),
        constraint: Bool::and(parts),
    }
}

/// Sum of `terms` in `width` bits, asserting each intermediate addition.
///
/// Terms that folded to constant zero are skipped. The deadline is checked
/// after every addition; when it has expired the running sum so far is
/// returned as [`Progress::Partial`].
pub fn sum_all(
    session: &mut Session,
    terms: &[BitVec],
    width: usize,
    deadline: &Deadline,
) -> Progress<BitVec> {
    let mut total: Option<BitVec> = None;
    for term in terms.iter().filter(|term| !term.is_zero()) {
        let next = match total.take() {
            None => term.clone(),
            Some(running) => {
                let sum = add(session, &running, term, width);
                session.assert(&sum.constraint);
                sum.total
            }
        };
        total = Some(next);
        if deadline.expired() {
            return Progress::Partial {
                value: total.unwrap_or_else(|| BitVec::zeros(width)),
                elapsed: deadline.elapsed(),
            };
        }
    }
    Progress::Complete(total.unwrap_or_else(|| BitVec::zeros(width)))
}
