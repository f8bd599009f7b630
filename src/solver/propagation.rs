use std::fmt;
use std::sync::Arc;

use crate::solver::{
    value::Value,
    variable::{VariableName, Variables},
};

/// An instruction to pop `value` out of the domain of the named variable.
///
/// Propagation functions return these rather than mutating the store; the
/// search applies them, journals them, and reverses them on backtrack.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainRemoval<V: Value> {
    pub name: VariableName,
    pub value: V,
}

impl<V: Value> DomainRemoval<V> {
    pub fn new(name: impl Into<VariableName>, value: V) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// A value having just been assigned to the named variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment<V: Value> {
    pub name: VariableName,
    pub value: V,
}

/// The signature of a propagation hook: given the assignment that just
/// happened and a read-only view of the store, decide which domain values to
/// prune from sibling variables.
pub type PropagationFn<V> = dyn Fn(&Assignment<V>, &Variables<V>) -> Vec<DomainRemoval<V>>;

/// A user-supplied hook fired after each tentative assignment to one of its
/// variables. The function must not mutate the store; it only reports the
/// removals it wants enacted.
#[derive(Clone)]
pub struct Propagation<V: Value> {
    vars: Vec<VariableName>,
    function: Arc<PropagationFn<V>>,
}

impl<V: Value> Propagation<V> {
    pub fn new(
        vars: impl IntoIterator<Item = impl Into<VariableName>>,
        function: impl Fn(&Assignment<V>, &Variables<V>) -> Vec<DomainRemoval<V>> + 'static,
    ) -> Self {
        Self {
            vars: vars.into_iter().map(Into::into).collect(),
            function: Arc::new(function),
        }
    }

    pub fn vars(&self) -> &[VariableName] {
        &self.vars
    }

    pub fn execute(&self, assignment: &Assignment<V>, variables: &Variables<V>) -> Vec<DomainRemoval<V>> {
        (self.function)(assignment, variables)
    }
}

impl<V: Value> fmt::Debug for Propagation<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Propagation").field("vars", &self.vars).finish_non_exhaustive()
    }
}

/// An ordered collection of propagations, fired in registration order.
#[derive(Debug, Clone)]
pub struct Propagations<V: Value> {
    items: Vec<Propagation<V>>,
}

impl<V: Value> Propagations<V> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn push(&mut self, propagation: Propagation<V>) {
        self.items.push(propagation);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Runs every propagation whose variable list contains the assigned
    /// name, concatenating the removals in registration order.
    pub fn execute(&self, assignment: &Assignment<V>, variables: &Variables<V>) -> Vec<DomainRemoval<V>> {
        let mut removals = Vec::new();
        for propagation in &self.items {
            if propagation.vars.contains(&assignment.name) {
                removals.extend(propagation.execute(assignment, variables));
            }
        }
        removals
    }
}

impl<V: Value> Default for Propagations<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Value> FromIterator<Propagation<V>> for Propagations<V> {
    fn from_iter<I: IntoIterator<Item = Propagation<V>>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}
