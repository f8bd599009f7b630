use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::{
    error::{Error, Result},
    solver::{domain::Domain, propagation::DomainRemoval, value::Value},
};

/// The name of a variable. Two variables are the same iff their names are
/// equal. Cheap to clone; dereferences to `str`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariableName(Arc<str>);

impl VariableName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::ops::Deref for VariableName {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for VariableName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VariableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VariableName {
    fn from(name: &str) -> Self {
        Self(Arc::from(name))
    }
}

impl From<String> for VariableName {
    fn from(name: String) -> Self {
        Self(Arc::from(name.as_str()))
    }
}

impl From<&VariableName> for VariableName {
    fn from(name: &VariableName) -> Self {
        name.clone()
    }
}

/// A named cell holding either an assigned value or nothing, together with
/// its current domain of candidate values.
///
/// While a search step is in flight, an assigned variable's value may
/// temporarily be absent from its own (pruned) domain; the search restores
/// the domain before the variable is unset, so the window is invisible at
/// every observable checkpoint. Constraints and propagations must treat the
/// *value* as the source of truth for an assigned variable, never the domain.
#[derive(Debug, Clone)]
pub struct Variable<V: Value> {
    name: VariableName,
    value: Option<V>,
    domain: Domain<V>,
}

impl<V: Value> Variable<V> {
    /// Creates an unassigned variable with the given domain.
    pub fn new(name: impl Into<VariableName>, domain: Domain<V>) -> Self {
        Self {
            name: name.into(),
            value: None,
            domain,
        }
    }

    pub fn name(&self) -> &VariableName {
        &self.name
    }

    /// The assigned value, or `None` while the variable is empty.
    pub fn value(&self) -> Option<&V> {
        self.value.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_none()
    }

    pub fn domain(&self) -> &Domain<V> {
        &self.domain
    }

    pub fn set_value(&mut self, value: V) {
        self.value = Some(value);
    }

    pub fn unset(&mut self) {
        self.value = None;
    }

    pub fn set_domain(&mut self, domain: Domain<V>) {
        self.domain = domain;
    }
}

/// An insertion-ordered collection of variables. The stored order is stable
/// and defines the order in which the backtracking search picks variables;
/// a secondary name index keeps lookup cheap without disturbing that order.
#[derive(Debug, Clone)]
pub struct Variables<V: Value> {
    items: Vec<Variable<V>>,
    index: HashMap<VariableName, usize>,
}

impl<V: Value> Default for Variables<V> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<V: Value> Variables<V> {
    /// Builds a store from the given variables.
    ///
    /// # Panics
    ///
    /// Panics if two variables share a name.
    pub fn new(variables: impl IntoIterator<Item = Variable<V>>) -> Self {
        variables.into_iter().collect()
    }

    /// Adds a variable to the end of the store.
    ///
    /// # Panics
    ///
    /// Panics if a variable with the same name is already present.
    pub fn push(&mut self, variable: Variable<V>) {
        assert!(
            !self.contains(&variable.name),
            "duplicate variable name {}",
            variable.name
        );
        self.index.insert(variable.name.clone(), self.items.len());
        self.items.push(variable);
    }

    pub fn find(&self, name: &str) -> Option<&Variable<V>> {
        self.index.get(name).map(|&index| &self.items[index])
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut Variable<V>> {
        self.index
            .get(name)
            .copied()
            .map(move |index| &mut self.items[index])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// The assigned value of the named variable; `None` if the variable is
    /// empty or does not exist. The usual lookup inside custom predicates.
    pub fn value_of(&self, name: &str) -> Option<&V> {
        self.find(name).and_then(Variable::value)
    }

    /// Assigns `value` to the named variable.
    ///
    /// # Panics
    ///
    /// Panics if no variable has the given name. A value outside the
    /// variable's domain is accepted here and rejected at the first
    /// constraint check.
    pub fn set_value(&mut self, name: &str, value: V) {
        self.find_mut(name)
            .unwrap_or_else(|| panic!("no variable named {name} in the store"))
            .set_value(value);
    }

    /// Returns the named variable to the empty state.
    ///
    /// # Panics
    ///
    /// Panics if no variable has the given name.
    pub fn unset(&mut self, name: &str) {
        self.find_mut(name)
            .unwrap_or_else(|| panic!("no variable named {name} in the store"))
            .unset();
    }

    /// Replaces the domain of the named variable.
    ///
    /// # Panics
    ///
    /// Panics if no variable has the given name.
    pub fn set_domain(&mut self, name: &str, domain: Domain<V>) {
        self.find_mut(name)
            .unwrap_or_else(|| panic!("no variable named {name} in the store"))
            .set_domain(domain);
    }

    /// The number of variables still unassigned.
    pub fn unassigned(&self) -> usize {
        self.items.iter().filter(|variable| variable.is_empty()).count()
    }

    /// True iff no variable is empty.
    pub fn complete(&self) -> bool {
        self.items.iter().all(|variable| !variable.is_empty())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Variable<V>> {
        self.items.iter()
    }

    pub(crate) fn first_empty(&self) -> Option<usize> {
        self.items.iter().position(Variable::is_empty)
    }

    pub(crate) fn set_value_at(&mut self, index: usize, value: V) {
        self.items[index].set_value(value);
    }

    pub(crate) fn unset_at(&mut self, index: usize) {
        self.items[index].unset();
    }

    pub(crate) fn at(&self, index: usize) -> &Variable<V> {
        &self.items[index]
    }

    /// Applies the given removals to the store, recording each one that
    /// actually changed a domain in `journal`. A removal naming a value that
    /// is already absent is a no-op.
    pub(crate) fn apply_removals(
        &mut self,
        removals: &[DomainRemoval<V>],
        journal: &mut Journal<V>,
    ) -> Result<()> {
        for removal in removals {
            let index = self
                .index
                .get(removal.name.as_str())
                .copied()
                .ok_or_else(|| Error::UnknownVariable {
                    name: removal.name.clone(),
                })?;
            let variable = &mut self.items[index];
            if let Some(slot) = variable.domain.position(&removal.value) {
                variable.domain = variable.domain.remove_at(slot);
                journal.entries.push(JournalEntry {
                    variable: index,
                    slot,
                    value: removal.value.clone(),
                });
            }
        }
        Ok(())
    }

    /// Reverses every removal recorded in `journal`, newest first, putting
    /// each value back at the exact position it was removed from. The journal
    /// is left empty.
    pub(crate) fn restore(&mut self, journal: &mut Journal<V>) {
        while let Some(entry) = journal.entries.pop() {
            let variable = &mut self.items[entry.variable];
            variable.domain = variable.domain.insert_at(entry.slot, entry.value);
        }
    }
}

impl<V: Value> FromIterator<Variable<V>> for Variables<V> {
    fn from_iter<I: IntoIterator<Item = Variable<V>>>(iter: I) -> Self {
        let mut variables = Self::default();
        for variable in iter {
            variables.push(variable);
        }
        variables
    }
}

impl<'a, V: Value> IntoIterator for &'a Variables<V> {
    type Item = &'a Variable<V>;
    type IntoIter = std::slice::Iter<'a, Variable<V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// The LIFO record of domain removals contributed by a single search
/// decision. Journals live on the recursion stack, never on the shared
/// state, so that the search is naturally re-entrant.
#[derive(Debug, Default)]
pub(crate) struct Journal<V: Value> {
    entries: Vec<JournalEntry<V>>,
}

#[derive(Debug)]
struct JournalEntry<V: Value> {
    variable: usize,
    slot: usize,
    value: V,
}

impl<V: Value> Journal<V> {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}
