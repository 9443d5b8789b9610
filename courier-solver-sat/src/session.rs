//! The clause store and variable registry for one solve run.

use std::collections::HashMap;

use rustsat::instances::SatInstance;
use rustsat::types::{Clause, Lit};

use crate::{Bool, Deadline};

/// Name of a model variable.
///
/// Every named variable is created once per session; asking for the same key
/// again returns the same literal. Auxiliary variables introduced by encoders
/// come from [`Session::fresh`] and have no key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarKey {
    /// Courier `courier` carries item `item`.
    Assignment {
        /// Courier index.
        courier: usize,
        /// Item index.
        item: usize,
    },
    /// Item `from` is delivered immediately before item `to`.
    Precedence {
        /// Earlier item.
        from: usize,
        /// Later item.
        to: usize,
    },
    /// Bit `bit` (most significant first) of the step counter of `item`.
    Step {
        /// Item index.
        item: usize,
        /// Bit position, most significant first.
        bit: usize,
    },
    /// Bit `bit` (most significant first) of the objective.
    MaxDistance {
        /// Bit position, most significant first.
        bit: usize,
    },
}

/// Owns the growing formula of one solve run.
///
/// A session holds the clause store, the map from [`VarKey`] to literals, a
/// literal fixed to true by a unit clause, and the build [`Deadline`]. Clauses
/// are only ever appended, so a consumer can forward them incrementally with
/// [`Session::clauses_from`].
pub struct Session {
    instance: SatInstance,
    named: HashMap<VarKey, Lit>,
    truth: Lit,
    variables: usize,
    deadline: Deadline,
}

impl Session {
    /// Start an empty session whose build phase is bounded by `deadline`.
    pub fn new(deadline: Deadline) -> Self {
        let mut instance: SatInstance = SatInstance::new();
        let truth = instance.new_lit();
        instance.add_unit(truth);
        Self {
            instance,
            named: HashMap::new(),
            truth,
            variables: 1,
            deadline,
        }
    }

    /// Literal for `key`, created on first use.
    pub fn lit(&mut self, key: VarKey) -> Lit {
        if let Some(lit) = self.named.get(&key) {
            return *lit;
        }
        let lit = self.fresh();
        self.named.insert(key, lit);
        lit
    }

    /// Literal for `key` if it has been created.
    pub fn lookup(&self, key: VarKey) -> Option<Lit> {
        self.named.get(&key).copied()
    }

    /// A new auxiliary literal.
    pub fn fresh(&mut self) -> Lit {
        self.variables += 1;
        self.instance.new_lit()
    }

    /// The literal fixed to true.
    pub const fn truth(&self) -> Lit {
        self.truth
    }

    /// Build deadline.
    pub const fn deadline(&self) -> Deadline {
        self.deadline
    }

    /// Number of variables created so far.
    pub const fn variables(&self) -> usize {
        self.variables
    }

    /// Number of clauses added so far.
    pub fn clauses(&self) -> usize {
        self.instance.n_clauses()
    }

    /// Clauses added after the first `sent` ones.
    pub fn clauses_from(&self, sent: usize) -> impl Iterator<Item = &Clause> {
        self.instance.cnf().iter().skip(sent)
    }

    /// Add a clause. An empty clause makes the formula unsatisfiable.
    pub fn add_clause(&mut self, lits: impl IntoIterator<Item = Lit>) {
        let clause: Clause = lits.into_iter().collect();
        if clause.is_empty() {
            self.instance.add_unit(!self.truth);
        } else {
            self.instance.add_clause(clause);
        }
    }

    /// Require `formula` to hold.
    pub fn assert(&mut self, formula: &Bool) {
        match formula {
            Bool::Const(true) => {}
            Bool::Const(false) => self.add_clause([]),
            Bool::Lit(lit) => self.add_clause([*lit]),
            Bool::And(parts) => {
                for part in parts {
                    self.assert(part);
                }
            }
            Bool::Or(parts) => {
                let lits: Vec<Lit> = parts.iter().map(|part| self.reify(part)).collect();
                self.add_clause(lits);
            }
            Bool::Xor(left, right) => {
                let (lhs, rhs) = (self.reify(left), self.reify(right));
                self.add_clause([lhs, rhs]);
                self.add_clause([!lhs, !rhs]);
            }
            Bool::Not(inner) => self.assert_negation(inner),
        }
    }

    fn assert_negation(&mut self, formula: &Bool) {
        match formula {
            Bool::And(parts) => {
                let lits: Vec<Lit> = parts.iter().map(|part| !self.reify(part)).collect();
                self.add_clause(lits);
            }
            Bool::Or(parts) => {
                for part in parts {
                    self.assert(&Bool::not(part.clone()));
                }
            }
            Bool::Xor(left, right) => {
                let (lhs, rhs) = (self.reify(left), self.reify(right));
                self.add_clause([!lhs, rhs]);
                self.add_clause([lhs, !rhs]);
            }
            other => {
                let lit = self.reify(other);
                self.add_clause([!lit]);
            }
        }
    }

    /// A literal equivalent to `formula`, introducing Tseitin variables for
    /// compound subformulas.
    pub fn reify(&mut self, formula: &Bool) -> Lit {
        match formula {
            Bool::Const(true) => self.truth,
            Bool::Const(false) => !self.truth,
            Bool::Lit(lit) => *lit,
            Bool::Not(inner) => !self.reify(inner),
            Bool::And(parts) => {
                let lits: Vec<Lit> = parts.iter().map(|part| self.reify(part)).collect();
                let out = self.fresh();
                for lit in &lits {
                    self.add_clause([!out, *lit]);
                }
                self.add_clause(lits.iter().map(|lit| !*lit).chain([out]));
                out
            }
            Bool::Or(parts) => {
                let lits: Vec<Lit> = parts.iter().map(|part| self.reify(part)).collect();
                let out = self.fresh();
                for lit in &lits {
                    self.add_clause([out, !*lit]);
                }
                self.add_clause(lits.iter().copied().chain([!out]));
                out
            }
            Bool::Xor(left, right) => {
                let (lhs, rhs) = (self.reify(left), self.reify(right));
                let out = self.fresh();
                self.add_clause([!out, lhs, rhs]);
                self.add_clause([!out, !lhs, !rhs]);
                self.add_clause([out, !lhs, rhs]);
                self.add_clause([out, lhs, !rhs]);
                out
            }
        }
    }
}
