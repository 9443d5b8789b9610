//! Encodes a Multiple Courier Problem instance as a propositional formula.
//!
//! Every variable is allocated before the first constraint is written, so a
//! build cut short by its deadline still returns a complete set of model
//! handles alongside a partial formula.

use std::ops::ControlFlow;
use std::time::Duration;

use courier_core::{Instance, SolveError};
use rustsat::types::Lit;

use crate::bits::{BitVec, add, bits_for, chained_less_or_equal, equal, less_or_equal, sum_all};
use crate::{Bool, CardinalityEncoder, CardinalityStrategy, Deadline, Progress, Session, VarKey};

/// Switches that shape the encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModelOptions {
    /// At-most-one encoding used throughout the model.
    pub strategy: CardinalityStrategy,
    /// Order the assignment rows of equal-capacity couriers.
    pub break_load_symmetry: bool,
    /// Order the precedence table against its transpose when distances are
    /// symmetric.
    pub break_distance_symmetry: bool,
}

/// Bit widths chosen for an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Widths {
    /// Step counters; covers `0..=n-1`.
    pub step: usize,
    /// Tour lengths and the objective.
    pub distance: usize,
    /// Courier loads.
    pub weight: usize,
}

impl Widths {
    /// Widths large enough that no feasible solution overflows.
    ///
    /// A tour enters every location at most once, so the sum over locations
    /// of the largest distance into that location bounds any tour length.
    ///
    /// # Errors
    ///
    /// Returns [`SolveError::WidthOverflow`] when that bound exceeds `u64`.
    pub fn for_instance(instance: &Instance) -> Result<Self, SolveError> {
        let locations = instance.items + 1;
        let tour_bound = (0..locations)
            .try_fold(0_u64, |total, to| {
                let inbound = (0..locations)
                    .map(|from| instance.distance(from, to))
                    .max()
                    .unwrap_or(0);
                total.checked_add(inbound)
            })
            .ok_or(SolveError::WidthOverflow {
                value: u64::MAX,
                width: 64,
            })?;
        Ok(Self {
            step: bits_for(instance.items.saturating_sub(1) as u64),
            distance: bits_for(tour_bound),
            weight: bits_for(instance.total_size()),
        })
    }
}

/// Literal handles of an encoded instance.
#[derive(Debug, Clone)]
pub struct McpModel {
    /// Widths the model was built with.
    pub widths: Widths,
    /// `assignment[c][i]`: courier `c` carries item `i`.
    pub assignment: Vec<Vec<Lit>>,
    /// `precedence[i][j]`: item `i` immediately precedes item `j`.
    pub precedence: Vec<Vec<Lit>>,
    /// Hops from the depot per item.
    pub steps: Vec<BitVec>,
    /// `first[i]`: item `i` has no predecessor.
    pub first: Vec<Lit>,
    /// `last[i]`: item `i` has no successor.
    pub last: Vec<Lit>,
    /// Objective bits, most significant first.
    pub max_distance: Vec<Lit>,
}

impl McpModel {
    fn allocate(session: &mut Session, instance: &Instance, widths: Widths) -> Self {
        let (couriers, items) = (instance.couriers, instance.items);
        let assignment: Vec<Vec<Lit>> = (0..couriers)
            .map(|courier| {
                (0..items)
                    .map(|item| session.lit(VarKey::Assignment { courier, item }))
                    .collect()
            })
            .collect();
        let precedence: Vec<Vec<Lit>> = (0..items)
            .map(|from| {
                (0..items)
                    .map(|to| session.lit(VarKey::Precedence { from, to }))
                    .collect()
            })
            .collect();
        let steps = (0..items)
            .map(|item| {
                BitVec::from_lits(
                    (0..widths.step)
                        .map(|bit| session.lit(VarKey::Step { item, bit }))
                        .collect::<Vec<_>>(),
                )
            })
            .collect();
        let max_distance = (0..widths.distance)
            .map(|bit| session.lit(VarKey::MaxDistance { bit }))
            .collect();
        let first = (0..items)
            .map(|item| {
                let predecessors = precedence
                    .iter()
                    .enumerate()
                    .filter(|(from, _)| *from != item)
                    .filter_map(|(_, row)| row.get(item))
                    .map(|lit| Bool::lit(*lit));
                session.reify(&Bool::not(Bool::or(predecessors)))
            })
            .collect();
        let last = precedence
            .iter()
            .enumerate()
            .map(|(item, row)| {
                let successors = row
                    .iter()
                    .enumerate()
                    .filter(|(to, _)| *to != item)
                    .map(|(_, lit)| Bool::lit(*lit));
                session.reify(&Bool::not(Bool::or(successors)))
            })
            .collect();
        Self {
            widths,
            assignment,
            precedence,
            steps,
            first,
            last,
            max_distance,
        }
    }

    /// The objective as a bit-vector.
    pub fn objective(&self) -> BitVec {
        BitVec::from_lits(self.max_distance.iter().copied())
    }

    /// Literal for "`from` immediately precedes `to`".
    fn precedes(&self, from: usize, to: usize) -> Option<Lit> {
        self.precedence.get(from)?.get(to).copied()
    }

    fn carried_by(&self, item: usize) -> Vec<Lit> {
        self.assignment
            .iter()
            .filter_map(|row| row.get(item).copied())
            .collect()
    }
}

/// Handles of one item used by the pairwise constraints.
struct ItemView<'m> {
    index: usize,
    step: &'m BitVec,
    increment: &'m BitVec,
    first: Lit,
}

/// Items other than `item`.
fn others(items: usize, item: usize) -> impl Iterator<Item = usize> {
    (0..items).filter(move |other| *other != item)
}

/// Stop the build with the elapsed time once the deadline has passed.
macro_rules! checkpoint {
    ($deadline:expr) => {
        if $deadline.expired() {
            return Ok(ControlFlow::Break($deadline.elapsed()));
        }
    };
}

/// Unwrap a complete sum or stop the build.
macro_rules! complete {
    ($progress:expr) => {
        match $progress {
            Progress::Complete(value) => value,
            Progress::Partial { elapsed, .. } => return Ok(ControlFlow::Break(elapsed)),
        }
    };
}

/// Encode `instance` into `session`.
///
/// The instance is validated before any variable is created. When the
/// session's build deadline passes at a checkpoint the model handles are
/// returned as [`Progress::Partial`]; the formula is then incomplete and must
/// not be solved.
///
/// # Errors
///
/// Returns [`SolveError::InvalidInstance`] for instances that fail
/// validation and [`SolveError::WidthOverflow`] when distances are too large
/// to encode.
pub fn build_model(
    session: &mut Session,
    instance: &Instance,
    options: &ModelOptions,
) -> Result<Progress<McpModel>, SolveError> {
    instance.validate()?;
    let widths = Widths::for_instance(instance)?;
    let model = McpModel::allocate(session, instance, widths);
    let deadline = session.deadline();
    let encoder = options.strategy.encoder();
    let mut builder = Builder {
        session: &mut *session,
        instance,
        model: &model,
        encoder,
        deadline,
        maxima: Vec::with_capacity(instance.couriers),
    };
    let outcome = builder.constrain(options)?;
    match outcome {
        ControlFlow::Continue(()) => {
            log::info!(
                "model built: {} couriers, {} items, widths step={} distance={} weight={}, {} variables, {} clauses",
                instance.couriers,
                instance.items,
                widths.step,
                widths.distance,
                widths.weight,
                session.variables(),
                session.clauses()
            );
            Ok(Progress::Complete(model))
        }
        ControlFlow::Break(elapsed) => {
            log::warn!(
                "model build stopped after {elapsed:?} with {} clauses",
                session.clauses()
            );
            Ok(Progress::Partial {
                value: model,
                elapsed,
            })
        }
    }
}

struct Builder<'a> {
    session: &'a mut Session,
    instance: &'a Instance,
    model: &'a McpModel,
    encoder: &'static dyn CardinalityEncoder,
    deadline: Deadline,
    maxima: Vec<Lit>,
}

type Flow = Result<ControlFlow<Duration>, SolveError>;

impl Builder<'_> {
    fn constrain(&mut self, options: &ModelOptions) -> Flow {
        let (instance, model) = (self.instance, self.model);
        for (carried, load) in model.assignment.iter().zip(&instance.loads) {
            if let ControlFlow::Break(elapsed) = self.courier_constraints(carried, *load)? {
                return Ok(ControlFlow::Break(elapsed));
            }
        }
        // Some courier's tour is the longest one.
        let maxima = std::mem::take(&mut self.maxima);
        self.session.add_clause(maxima);
        let mut increments = Vec::with_capacity(instance.items);
        let handles = model.steps.iter().zip(&model.first).zip(&model.last);
        for (item, ((step, first), last)) in handles.enumerate() {
            checkpoint!(self.deadline);
            increments.push(self.item_constraints(item, step, *first, *last)?);
        }
        let views: Vec<ItemView<'_>> = increments
            .iter()
            .zip(&model.steps)
            .zip(&model.first)
            .enumerate()
            .map(|(index, ((increment, step), first))| ItemView {
                index,
                step,
                increment,
                first: *first,
            })
            .collect();
        for (position, view) in views.iter().enumerate() {
            checkpoint!(self.deadline);
            for other in views.iter().skip(position + 1) {
                self.pair_constraints(view, other);
            }
        }
        self.symmetry_constraints(options)
    }

    /// Capacity, tour length, and the tie between tours and the objective.
    fn courier_constraints(&mut self, carried: &[Lit], load: u64) -> Flow {
        checkpoint!(self.deadline);
        let (instance, model) = (self.instance, self.model);
        let widths = model.widths;

        let weights = instance
            .sizes
            .iter()
            .zip(carried)
            .map(|(size, lit)| {
                Ok(BitVec::constant(*size, widths.weight)?.masked(&Bool::lit(*lit)))
            })
            .collect::<Result<Vec<_>, SolveError>>()?;
        let weight = complete!(sum_all(self.session, &weights, widths.weight, &self.deadline));
        let limit = load.min(instance.total_size());
        let capacity = BitVec::constant(limit, widths.weight)?;
        self.session.assert(&less_or_equal(&weight, &capacity));

        let depot = instance.depot();
        let mut legs = Vec::new();
        let handles = carried.iter().zip(&model.first).zip(&model.last);
        for (item, ((holder, first), last)) in handles.enumerate() {
            legs.extend(self.leg(instance.distance(depot, item), *holder, *first)?);
            for from in others(instance.items, item) {
                if let Some(precedes) = model.precedes(from, item) {
                    legs.extend(self.leg(instance.distance(from, item), *holder, precedes)?);
                }
            }
            legs.extend(self.leg(instance.distance(item, depot), *holder, *last)?);
        }
        let tour = complete!(sum_all(self.session, &legs, widths.distance, &self.deadline));
        let objective = model.objective();
        self.session.assert(&less_or_equal(&tour, &objective));
        let reached = self.session.reify(&equal(&tour, &objective));
        self.maxima.push(reached);
        Ok(ControlFlow::Continue(()))
    }

    /// `distance` when `holder ∧ condition` holds, zero otherwise.
    fn leg(
        &mut self,
        distance: u64,
        holder: Lit,
        condition: Lit,
    ) -> Result<Option<BitVec>, SolveError> {
        if distance == 0 {
            return Ok(None);
        }
        let guard = self
            .session
            .reify(&Bool::and([Bool::lit(holder), Bool::lit(condition)]));
        let value = BitVec::constant(distance, self.model.widths.distance)?;
        Ok(Some(value.masked(&Bool::lit(guard))))
    }

    /// Assignment, neighbour, and step constraints of one item. Returns
    /// `step + 1`, valid whenever the item has a successor.
    fn item_constraints(
        &mut self,
        item: usize,
        step: &BitVec,
        first: Lit,
        last: Lit,
    ) -> Result<BitVec, SolveError> {
        let model = self.model;
        let items = self.instance.items;
        let width = model.widths.step;

        if let Some(self_loop) = model.precedes(item, item) {
            self.session.add_clause([!self_loop]);
        }
        self.encoder.exactly_one(self.session, &model.carried_by(item));
        let predecessors: Vec<Lit> = others(items, item)
            .filter_map(|from| model.precedes(from, item))
            .collect();
        self.encoder.at_most_one(self.session, &predecessors);
        let successors: Vec<Lit> = others(items, item)
            .filter_map(|to| model.precedes(item, to))
            .collect();
        self.encoder.at_most_one(self.session, &successors);

        self.session.assert(&Bool::implies(
            Bool::lit(first),
            equal(step, &BitVec::zeros(width)),
        ));
        let one = BitVec::constant(1, width)?;
        let next = add(self.session, step, &one, width);
        self.session
            .assert(&Bool::implies(Bool::lit(!last), next.constraint));
        Ok(next.total)
    }

    /// Same-courier, step, and single-start constraints between two items.
    fn pair_constraints(&mut self, item: &ItemView<'_>, other: &ItemView<'_>) {
        let model = self.model;
        let (a, b) = (item.index, other.index);
        let shared = Bool::or(model.assignment.iter().filter_map(|row| {
            Some(Bool::and([
                Bool::lit(*row.get(a)?),
                Bool::lit(*row.get(b)?),
            ]))
        }));
        let same = Bool::lit(self.session.reify(&shared));

        if let Some(forward) = model.precedes(a, b) {
            self.session.assert(&Bool::implies(
                Bool::lit(forward),
                Bool::and([same.clone(), equal(item.increment, other.step)]),
            ));
        }
        if let Some(backward) = model.precedes(b, a) {
            self.session.assert(&Bool::implies(
                Bool::lit(backward),
                Bool::and([same.clone(), equal(other.increment, item.step)]),
            ));
        }

        let columns_match = Bool::and(model.precedence.iter().filter_map(|row| {
            Some(Bool::iff(Bool::lit(*row.get(a)?), Bool::lit(*row.get(b)?)))
        }));
        self.session.assert(&Bool::implies(
            Bool::lit(!item.first),
            Bool::not(columns_match),
        ));
        self.session.assert(&Bool::implies(
            same,
            Bool::not(Bool::and([Bool::lit(item.first), Bool::lit(other.first)])),
        ));
    }

    /// The optional symmetry-breaking phases, each behind a checkpoint.
    fn symmetry_constraints(&mut self, options: &ModelOptions) -> Flow {
        if options.break_load_symmetry {
            checkpoint!(self.deadline);
            self.break_load_symmetry();
        }
        if options.break_distance_symmetry {
            checkpoint!(self.deadline);
            self.break_distance_symmetry();
        }
        Ok(ControlFlow::Continue(()))
    }

    /// Equal-capacity couriers are interchangeable, so keep their assignment
    /// rows in non-decreasing order.
    fn break_load_symmetry(&mut self) {
        let (instance, model) = (self.instance, self.model);
        let rows: Vec<(&Vec<Lit>, u64)> = model
            .assignment
            .iter()
            .zip(instance.loads.iter().copied())
            .collect();
        for (position, (row, load)) in rows.iter().enumerate() {
            let Some((twin_row, _)) = rows
                .iter()
                .skip(position + 1)
                .find(|(_, twin_load)| twin_load == load)
            else {
                continue;
            };
            let earlier = BitVec::from_lits(row.iter().copied());
            let later = BitVec::from_lits(twin_row.iter().copied());
            let ordered = chained_less_or_equal(self.session, &earlier, &later);
            self.session.assert(&ordered);
        }
    }

    /// With symmetric distances every route can be reversed, so keep the
    /// precedence table no greater than its transpose.
    fn break_distance_symmetry(&mut self) {
        if !self.instance.is_symmetric() {
            log::debug!("distance matrix is asymmetric; skipping route reversal symmetry breaking");
            return;
        }
        let precedence = &self.model.precedence;
        let table = BitVec::from_lits(precedence.iter().flatten().copied());
        let transpose = BitVec::from_lits((0..precedence.len()).flat_map(|col| {
            precedence
                .iter()
                .filter_map(move |row| row.get(col).copied())
        }));
        let ordered = chained_less_or_equal(self.session, &table, &transpose);
        self.session.assert(&ordered);
    }
}
