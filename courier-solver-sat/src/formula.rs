//! Side-effect-free boolean expressions over solver literals.
//!
//! Formulas are plain values: building one never touches the clause store.
//! The smart constructors fold constants and flatten nested conjunctions and
//! disjunctions, so constant operands (for example the high bits of a small
//! constant) disappear before anything is encoded. A [`Session`](crate::Session)
//! turns formulas into clauses when they are asserted or reified.

use rustsat::types::Lit;

/// A boolean expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bool {
    /// A constant truth value.
    Const(bool),
    /// A solver literal.
    Lit(Lit),
    /// Negation of a compound formula.
    Not(Box<Bool>),
    /// Conjunction; empty means true.
    And(Vec<Bool>),
    /// Disjunction; empty means false.
    Or(Vec<Bool>),
    /// Exclusive or of two formulas.
    Xor(Box<Bool>, Box<Bool>),
}

impl Bool {
    /// The constant true formula.
    pub const TRUE: Self = Self::Const(true);
    /// The constant false formula.
    pub const FALSE: Self = Self::Const(false);

    /// Wrap a literal.
    pub const fn lit(lit: Lit) -> Self {
        Self::Lit(lit)
    }

    /// Wrap a constant.
    pub const fn constant(value: bool) -> Self {
        Self::Const(value)
    }

    /// The constant value, if the formula folded to one.
    pub const fn as_const(&self) -> Option<bool> {
        match self {
            Self::Const(value) => Some(*value),
            _ => None,
        }
    }

    /// Negation. Literals are negated in place and double negation cancels.
    #[must_use]
    pub fn not(formula: Self) -> Self {
        match formula {
            Self::Const(value) => Self::Const(!value),
            Self::Lit(lit) => Self::Lit(!lit),
            Self::Not(inner) => *inner,
            other => Self::Not(Box::new(other)),
        }
    }

    /// Conjunction of `parts`.
    pub fn and(parts: impl IntoIterator<Item = Self>) -> Self {
        let mut flat = Vec::new();
        for part in parts {
            match part {
                Self::Const(true) => {}
                Self::Const(false) => return Self::FALSE,
                Self::And(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        match flat.len() {
            0 => Self::TRUE,
            1 => flat.pop().unwrap_or(Self::TRUE),
            _ => Self::And(flat),
        }
    }

    /// Disjunction of `parts`.
    pub fn or(parts: impl IntoIterator<Item = Self>) -> Self {
        let mut flat = Vec::new();
        for part in parts {
            match part {
                Self::Const(false) => {}
                Self::Const(true) => return Self::TRUE,
                Self::Or(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        match flat.len() {
            0 => Self::FALSE,
            1 => flat.pop().unwrap_or(Self::FALSE),
            _ => Self::Or(flat),
        }
    }

    /// Exclusive or.
    pub fn xor(left: Self, right: Self) -> Self {
        match (left.as_const(), right.as_const()) {
            (Some(false), _) => right,
            (Some(true), _) => Self::not(right),
            (_, Some(false)) => left,
            (_, Some(true)) => Self::not(left),
            (None, None) => Self::Xor(Box::new(left), Box::new(right)),
        }
    }

    /// Equivalence.
    pub fn iff(left: Self, right: Self) -> Self {
        Self::not(Self::xor(left, right))
    }

    /// Implication `premise → conclusion`.
    pub fn implies(premise: Self, conclusion: Self) -> Self {
        Self::or([Self::not(premise), conclusion])
    }

    /// Evaluate under a valuation of literals.
    ///
    /// The valuation is consulted for positive and negative literals alike, so
    /// it must satisfy `valuation(!l) == !valuation(l)`.
    pub fn eval(&self, valuation: &impl Fn(Lit) -> bool) -> bool {
        match self {
            Self::Const(value) => *value,
            Self::Lit(lit) => valuation(*lit),
            Self::Not(inner) => !inner.eval(valuation),
            Self::And(parts) => parts.iter().all(|part| part.eval(valuation)),
            Self::Or(parts) => parts.iter().any(|part| part.eval(valuation)),
            Self::Xor(left, right) => left.eval(valuation) != right.eval(valuation),
        }
    }
}

impl From<Lit> for Bool {
    fn from(lit: Lit) -> Self {
        Self::Lit(lit)
    }
}

impl From<bool> for Bool {
    fn from(value: bool) -> Self {
        Self::Const(value)
    }
}
