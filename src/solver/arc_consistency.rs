use std::collections::{HashSet, VecDeque};
use std::time::Instant;

use tracing::debug;

use crate::{
    error::{Error, Result},
    solver::{
        state::CspState,
        stats::ArcStats,
        termination::{checkpoint, Termination},
        value::Value,
        variable::VariableName,
    },
};

impl<V: Value> CspState<V> {
    /// Makes the problem arc consistent (AC-3): for every binary constraint
    /// over (X, Y) and every value x in Dom(X), some y in Dom(Y) must satisfy
    /// the constraint under the temporary assignment {X=x, Y=y}. Values with
    /// no support are removed, and the removal propagates to neighbours.
    ///
    /// Already-assigned variables contribute the singleton `[value]` instead
    /// of their domain, so their stored domains are never touched; losing
    /// support for that singleton is what proves the problem unsatisfiable.
    ///
    /// Returns the pass's counters, or [`Error::Unsatisfiable`] naming the
    /// constraint that emptied a domain.
    pub fn make_arc_consistent(&mut self, termination: &mut impl Termination) -> Result<ArcStats> {
        let mut stats = ArcStats::default();
        let mut queue: VecDeque<usize> = (0..self.constraints.len()).collect();
        let mut queued: HashSet<usize> = queue.iter().copied().collect();

        while let Some(index) = queue.pop_front() {
            queued.remove(&index);
            checkpoint(termination)?;

            let constraint = self.constraints.get(index);
            if !constraint.is_binary() {
                continue;
            }
            let x = constraint.vars()[0].clone();
            let y = constraint.vars()[1].clone();

            if self.arc_reduce(&x, &y, index, &mut stats)? {
                self.reenqueue(&x, &y, &mut queue, &mut queued);
            }
            if self.arc_reduce(&y, &x, index, &mut stats)? {
                self.reenqueue(&y, &x, &mut queue, &mut queued);
            }
        }

        debug!(
            revisions = stats.revisions,
            removed = stats.removed,
            "arc consistency complete"
        );
        Ok(stats)
    }

    /// Removes from Dom(X) every value with no supporting value in Dom(Y).
    /// Returns whether X's domain changed.
    fn arc_reduce(
        &mut self,
        x: &VariableName,
        y: &VariableName,
        index: usize,
        stats: &mut ArcStats,
    ) -> Result<bool> {
        let started = Instant::now();
        stats.revisions += 1;
        let per_constraint = stats.constraint_stats.entry(index).or_default();
        per_constraint.revisions += 1;

        let constraint = self.constraints.get(index).clone();

        let x_var = self.variables.find(x).ok_or_else(|| Error::UnknownVariable {
            name: x.clone(),
        })?;
        let x_assigned = !x_var.is_empty();
        let dx: Vec<V> = match x_var.value() {
            Some(value) => vec![value.clone()],
            None => x_var.domain().iter().cloned().collect(),
        };
        let saved_x = x_var.value().cloned();

        let y_var = self.variables.find(y).ok_or_else(|| Error::UnknownVariable {
            name: y.clone(),
        })?;
        let dy: Vec<V> = match y_var.value() {
            Some(value) => vec![value.clone()],
            None => y_var.domain().iter().cloned().collect(),
        };
        let saved_y = y_var.value().cloned();

        let mut unsupported: Vec<V> = Vec::new();
        for x_value in &dx {
            // catalogue binaries are probed directly; opaque predicates see
            // the store under a temporary {X=x, Y=y} assignment
            let supported = dy.iter().any(|y_value| {
                constraint.test_pair(x, x_value, y_value).unwrap_or_else(|| {
                    self.variables.set_value(x, x_value.clone());
                    self.variables.set_value(y, y_value.clone());
                    constraint.holds(&self.variables)
                })
            });
            if !supported {
                unsupported.push(x_value.clone());
            }
        }

        // take back the tentative assignments
        match saved_x {
            Some(value) => self.variables.set_value(x, value),
            None => self.variables.unset(x),
        }
        match saved_y {
            Some(value) => self.variables.set_value(y, value),
            None => self.variables.unset(y),
        }

        let changed = !unsupported.is_empty();
        if changed {
            if x_assigned {
                // the singleton [value] lost its support
                return Err(Error::Unsatisfiable {
                    name: x.clone(),
                    constraint: constraint.label().to_string(),
                });
            }

            let mut new_domain = self.variables.find(x).expect("checked above").domain().clone();
            for value in &unsupported {
                new_domain = new_domain.remove(value);
            }
            if new_domain.is_empty() {
                return Err(Error::Unsatisfiable {
                    name: x.clone(),
                    constraint: constraint.label().to_string(),
                });
            }

            stats.removed += unsupported.len() as u64;
            let per_constraint = stats.constraint_stats.entry(index).or_default();
            per_constraint.prunings += 1;
            self.variables.set_domain(x, new_domain);
        }

        let per_constraint = stats.constraint_stats.entry(index).or_default();
        per_constraint.time_spent_micros += started.elapsed().as_micros() as u64;
        Ok(changed)
    }

    /// Puts every constraint that references `changed` but not `partner`
    /// back on the queue.
    fn reenqueue(
        &self,
        changed: &VariableName,
        partner: &VariableName,
        queue: &mut VecDeque<usize>,
        queued: &mut HashSet<usize>,
    ) {
        for (index, constraint) in self.constraints.iter().enumerate() {
            if queued.contains(&index) {
                continue;
            }
            if constraint.vars().contains(changed) && !constraint.vars().contains(partner) {
                queue.push_back(index);
                queued.insert(index);
            }
        }
    }
}
