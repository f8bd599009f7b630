use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::{
    error::{Error, Result},
    solver::{
        value::{OrderedValue, Value},
        variable::{VariableName, Variables},
    },
};

/// The signature of an opaque user predicate: a pure function over the
/// store. The predicate is responsible for deciding what to return while
/// some of its referenced variables are still empty; the convention is to
/// return true until fully grounded.
pub type PredicateFn<V> = dyn Fn(&Variables<V>) -> bool;

/// A declarative rule over a named subset of variables.
///
/// Built-in constraints evaluate as trivially true until every referenced
/// variable is assigned. The *order* of a constraint is the number of
/// variables it references; binary constraints (order 2) are the ones the
/// arc-consistency preprocessor operates on.
#[derive(Clone)]
pub struct Constraint<V: Value> {
    vars: Vec<VariableName>,
    label: String,
    kind: ConstraintKind<V>,
}

#[derive(Clone)]
enum ConstraintKind<V: Value> {
    Binary(Arc<dyn Fn(&V, &V) -> bool>),
    Unary(Arc<dyn Fn(&V) -> bool>),
    Predicate(Arc<PredicateFn<V>>),
}

impl<V: Value> Constraint<V> {
    /// Wraps a custom predicate over the whole store. `vars` must list every
    /// variable the predicate reads.
    pub fn new(
        vars: impl IntoIterator<Item = impl Into<VariableName>>,
        predicate: impl Fn(&Variables<V>) -> bool + 'static,
    ) -> Self {
        let vars: Vec<VariableName> = vars.into_iter().map(Into::into).collect();
        let label = format!(
            "predicate({})",
            vars.iter().map(VariableName::as_str).collect::<Vec<_>>().join(", ")
        );
        Self {
            vars,
            label,
            kind: ConstraintKind::Predicate(Arc::new(predicate)),
        }
    }

    /// `a.value == b.value`
    pub fn equals(a: impl Into<VariableName>, b: impl Into<VariableName>) -> Self {
        Self::binary(a.into(), b.into(), "==", |x, y| x == y)
    }

    /// `a.value != b.value`
    pub fn not_equals(a: impl Into<VariableName>, b: impl Into<VariableName>) -> Self {
        Self::binary(a.into(), b.into(), "!=", |x, y| x != y)
    }

    /// `a.value == value`
    pub fn unary_equals(a: impl Into<VariableName>, value: V) -> Self {
        Self::unary(a.into(), "==", value, |x, v| x == v)
    }

    /// `a.value != value`
    pub fn unary_not_equals(a: impl Into<VariableName>, value: V) -> Self {
        Self::unary(a.into(), "!=", value, |x, v| x != v)
    }

    /// `a.value < b.value`
    pub fn less_than(a: impl Into<VariableName>, b: impl Into<VariableName>) -> Self
    where
        V: OrderedValue,
    {
        Self::comparison(a.into(), b.into(), "<", &[Ordering::Less])
    }

    /// `a.value > b.value`
    pub fn greater_than(a: impl Into<VariableName>, b: impl Into<VariableName>) -> Self
    where
        V: OrderedValue,
    {
        Self::comparison(a.into(), b.into(), ">", &[Ordering::Greater])
    }

    /// `a.value <= b.value`
    pub fn less_than_or_equal(a: impl Into<VariableName>, b: impl Into<VariableName>) -> Self
    where
        V: OrderedValue,
    {
        Self::comparison(a.into(), b.into(), "<=", &[Ordering::Less, Ordering::Equal])
    }

    /// `a.value >= b.value`
    pub fn greater_than_or_equal(a: impl Into<VariableName>, b: impl Into<VariableName>) -> Self
    where
        V: OrderedValue,
    {
        Self::comparison(a.into(), b.into(), ">=", &[Ordering::Greater, Ordering::Equal])
    }

    fn binary(
        a: VariableName,
        b: VariableName,
        symbol: &str,
        test: impl Fn(&V, &V) -> bool + 'static,
    ) -> Self {
        Self {
            label: format!("{a} {symbol} {b}"),
            vars: vec![a, b],
            kind: ConstraintKind::Binary(Arc::new(test)),
        }
    }

    fn unary(
        a: VariableName,
        symbol: &str,
        value: V,
        test: impl Fn(&V, &V) -> bool + 'static,
    ) -> Self {
        Self {
            label: format!("{a} {symbol} {value:?}"),
            vars: vec![a],
            kind: ConstraintKind::Unary(Arc::new(move |x| test(x, &value))),
        }
    }

    fn comparison(a: VariableName, b: VariableName, symbol: &str, allowed: &'static [Ordering]) -> Self
    where
        V: OrderedValue,
    {
        Self::binary(a, b, symbol, move |x: &V, y: &V| {
            x.partial_cmp(y).is_some_and(|ordering| allowed.contains(&ordering))
        })
    }

    /// The ordered list of variable names this constraint references.
    pub fn vars(&self) -> &[VariableName] {
        &self.vars
    }

    /// The number of variables referenced.
    pub fn order(&self) -> usize {
        self.vars.len()
    }

    pub fn is_binary(&self) -> bool {
        self.order() == 2
    }

    /// A human-readable rendering, used in error messages and statistics.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Checks whether the constraint is satisfied by the given store.
    ///
    /// Every referenced name must exist in the store, and every referenced
    /// variable that is assigned must hold a value inside its own domain;
    /// violations of either are bugs in the problem definition and are
    /// reported as errors. (The search itself evaluates constraints through
    /// the in-flight journal window, where an assigned value can sit outside
    /// a pruned domain; the journal is always reversed before that window
    /// becomes observable here.)
    pub fn satisfied(&self, variables: &Variables<V>) -> Result<bool> {
        for name in &self.vars {
            let Some(variable) = variables.find(name) else {
                return Err(Error::UnknownVariable { name: name.clone() });
            };
            if let Some(value) = variable.value() {
                if !variable.domain().contains(value) {
                    return Err(Error::ValueOutsideDomain {
                        name: variable.name().clone(),
                        value: format!("{value:?}"),
                    });
                }
            }
        }
        Ok(self.holds(variables))
    }

    /// Evaluates the predicate without the contract checks. Used by the
    /// preprocessors, which probe tentative assignments at high frequency.
    pub(crate) fn holds(&self, variables: &Variables<V>) -> bool {
        match &self.kind {
            ConstraintKind::Binary(test) => {
                let a = variables.value_of(&self.vars[0]);
                let b = variables.value_of(&self.vars[1]);
                match (a, b) {
                    (Some(a), Some(b)) => test(a, b),
                    _ => true,
                }
            }
            ConstraintKind::Unary(test) => match variables.value_of(&self.vars[0]) {
                Some(value) => test(value),
                None => true,
            },
            ConstraintKind::Predicate(predicate) => predicate(variables),
        }
    }

    /// Evaluates a catalogue binary constraint against two candidate values
    /// directly, without touching the store. `first` names the variable
    /// `first_value` belongs to. Returns `None` for constraints that need
    /// the whole store (custom predicates, unary constraints).
    pub(crate) fn test_pair(
        &self,
        first: &VariableName,
        first_value: &V,
        second_value: &V,
    ) -> Option<bool> {
        match &self.kind {
            ConstraintKind::Binary(test) => {
                if *first == self.vars[0] {
                    Some(test(first_value, second_value))
                } else {
                    Some(test(second_value, first_value))
                }
            }
            _ => None,
        }
    }
}

impl<V: Value> fmt::Debug for Constraint<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constraint")
            .field("label", &self.label)
            .field("vars", &self.vars)
            .finish_non_exhaustive()
    }
}

/// An ordered collection of constraints.
#[derive(Debug, Clone, Default)]
pub struct Constraints<V: Value> {
    items: Vec<Constraint<V>>,
}

impl<V: Value> Constraints<V> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn push(&mut self, constraint: Constraint<V>) {
        self.items.push(constraint);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Constraint<V>> {
        self.items.iter()
    }

    pub(crate) fn get(&self, index: usize) -> &Constraint<V> {
        &self.items[index]
    }

    /// The conjunction of `satisfied` across all members, short-circuiting
    /// on the first unsatisfied constraint.
    pub fn all_satisfied(&self, variables: &Variables<V>) -> Result<bool> {
        for constraint in &self.items {
            if !constraint.satisfied(variables)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// All constraints referencing the given variable name.
    pub fn filter_by_name(&self, name: &str) -> Constraints<V> {
        self.items
            .iter()
            .filter(|constraint| constraint.vars.iter().any(|var| **var == *name))
            .cloned()
            .collect()
    }

    /// All constraints of the given order.
    pub fn filter_by_order(&self, order: usize) -> Constraints<V> {
        self.items
            .iter()
            .filter(|constraint| constraint.order() == order)
            .cloned()
            .collect()
    }
}

impl<V: Value> FromIterator<Constraint<V>> for Constraints<V> {
    fn from_iter<I: IntoIterator<Item = Constraint<V>>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<V: Value> Extend<Constraint<V>> for Constraints<V> {
    fn extend<I: IntoIterator<Item = Constraint<V>>>(&mut self, iter: I) {
        self.items.extend(iter);
    }
}

impl<V: Value> IntoIterator for Constraints<V> {
    type Item = Constraint<V>;
    type IntoIter = std::vec::IntoIter<Constraint<V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, V: Value> IntoIterator for &'a Constraints<V> {
    type Item = &'a Constraint<V>;
    type IntoIter = std::slice::Iter<'a, Constraint<V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Expands "all of these variables are equal" into one binary
/// [`Constraint::equals`] per unordered pair of names.
///
/// The expansion is what lets an n-ary rule participate in arc consistency,
/// which only operates on binary constraints.
///
/// # Panics
///
/// Panics if `names` is empty.
pub fn all_equals<V: Value>(
    names: impl IntoIterator<Item = impl Into<VariableName>>,
) -> Constraints<V> {
    expand_pairs(names, Constraint::equals)
}

/// Expands "all of these variables are pairwise distinct" into one binary
/// [`Constraint::not_equals`] per unordered pair of names.
///
/// # Panics
///
/// Panics if `names` is empty.
pub fn all_unique<V: Value>(
    names: impl IntoIterator<Item = impl Into<VariableName>>,
) -> Constraints<V> {
    expand_pairs(names, Constraint::not_equals)
}

fn expand_pairs<V: Value>(
    names: impl IntoIterator<Item = impl Into<VariableName>>,
    pair: fn(VariableName, VariableName) -> Constraint<V>,
) -> Constraints<V> {
    let names: Vec<VariableName> = names.into_iter().map(Into::into).collect();
    assert!(!names.is_empty(), "at least one variable name is required");
    let mut constraints = Constraints::new();
    for (i, a) in names.iter().enumerate() {
        for b in &names[i + 1..] {
            constraints.push(pair(a.clone(), b.clone()));
        }
    }
    constraints
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::solver::{
        domain::{int_range, Domain},
        variable::Variable,
    };

    fn store() -> Variables<i64> {
        Variables::new([
            Variable::new("A", int_range(1, 4)),
            Variable::new("B", int_range(1, 4)),
        ])
    }

    #[test]
    fn binary_constraints_are_trivially_true_until_grounded() {
        let variables = store();
        let equals = Constraint::equals("A", "B");
        assert!(equals.satisfied(&variables).unwrap());

        let mut variables = variables;
        variables.set_value("A", 1);
        assert!(equals.satisfied(&variables).unwrap());

        variables.set_value("B", 2);
        assert!(!equals.satisfied(&variables).unwrap());
        variables.set_value("B", 1);
        assert!(equals.satisfied(&variables).unwrap());
    }

    #[test]
    fn unary_constraints_check_against_the_constant() {
        let mut variables = store();
        let wants_two = Constraint::unary_equals("A", 2);
        let not_two = Constraint::unary_not_equals("A", 2);
        assert!(wants_two.satisfied(&variables).unwrap());

        variables.set_value("A", 2);
        assert!(wants_two.satisfied(&variables).unwrap());
        assert!(!not_two.satisfied(&variables).unwrap());

        variables.set_value("A", 3);
        assert!(!wants_two.satisfied(&variables).unwrap());
        assert!(not_two.satisfied(&variables).unwrap());
    }

    #[test]
    fn ordering_constraints_reference_both_variables() {
        let less = Constraint::<i64>::less_than("A", "B");
        let names: Vec<&str> = less.vars().iter().map(VariableName::as_str).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert!(less.is_binary());

        let mut variables = store();
        variables.set_value("A", 1);
        variables.set_value("B", 2);
        assert!(less.satisfied(&variables).unwrap());
        assert!(!Constraint::<i64>::greater_than("A", "B").satisfied(&variables).unwrap());
        assert!(Constraint::<i64>::less_than_or_equal("A", "B").satisfied(&variables).unwrap());

        variables.set_value("B", 1);
        assert!(Constraint::<i64>::greater_than_or_equal("A", "B").satisfied(&variables).unwrap());
    }

    #[test]
    fn unknown_variable_is_reported_loudly() {
        let variables = store();
        let constraint = Constraint::<i64>::equals("A", "Z");
        assert!(matches!(
            constraint.satisfied(&variables),
            Err(crate::error::Error::UnknownVariable { .. })
        ));
    }

    #[test]
    fn value_outside_domain_is_reported_loudly() {
        let mut variables = store();
        variables.set_value("A", 42);
        let constraint = Constraint::<i64>::equals("A", "B");
        assert!(matches!(
            constraint.satisfied(&variables),
            Err(crate::error::Error::ValueOutsideDomain { .. })
        ));
    }

    #[test]
    fn custom_predicates_see_the_whole_store() {
        let mut variables = store();
        let doubled = Constraint::new(["A", "B"], |variables: &Variables<i64>| {
            match (variables.value_of("A"), variables.value_of("B")) {
                (Some(a), Some(b)) => *b == a * 2,
                _ => true,
            }
        });

        assert!(doubled.satisfied(&variables).unwrap());
        variables.set_value("A", 1);
        variables.set_value("B", 2);
        assert!(doubled.satisfied(&variables).unwrap());
        variables.set_value("B", 3);
        assert!(!doubled.satisfied(&variables).unwrap());
    }

    #[test]
    fn all_unique_expands_into_every_unordered_pair() {
        let constraints: Constraints<i64> = all_unique(["A", "B", "C", "D"]);
        assert_eq!(constraints.len(), 6);
        assert!(constraints.iter().all(Constraint::is_binary));
        assert!(constraints.iter().all(|c| c.vars()[0] != c.vars()[1]));

        // a single name has no pairs and therefore nothing to constrain
        let trivial: Constraints<i64> = all_unique(["A"]);
        assert!(trivial.is_empty());
    }

    #[test]
    #[should_panic(expected = "at least one variable name")]
    fn all_equals_rejects_zero_names() {
        let _: Constraints<i64> = all_equals(Vec::<&str>::new());
    }

    #[test]
    fn expanded_all_unique_matches_pairwise_semantics() {
        let mut variables = Variables::new([
            Variable::new("A", int_range(1, 4)),
            Variable::new("B", int_range(1, 4)),
            Variable::new("C", int_range(1, 4)),
        ]);
        let constraints: Constraints<i64> = all_unique(["A", "B", "C"]);

        variables.set_value("A", 1);
        variables.set_value("B", 2);
        assert!(constraints.all_satisfied(&variables).unwrap());

        variables.set_value("C", 2);
        assert!(!constraints.all_satisfied(&variables).unwrap());

        variables.set_value("C", 3);
        assert!(constraints.all_satisfied(&variables).unwrap());
    }

    #[test]
    fn filters_select_by_name_and_order() {
        let mut constraints = Constraints::new();
        constraints.push(Constraint::equals("A", "B"));
        constraints.push(Constraint::unary_equals("A", 1));
        constraints.push(Constraint::not_equals("B", "C"));

        assert_eq!(constraints.filter_by_name("A").len(), 2);
        assert_eq!(constraints.filter_by_name("C").len(), 1);
        assert_eq!(constraints.filter_by_order(2).len(), 2);
        assert_eq!(constraints.filter_by_order(1).len(), 1);
    }

    #[test]
    fn empty_constraint_set_is_always_satisfied() {
        let variables = store();
        assert!(Constraints::<i64>::new().all_satisfied(&variables).unwrap());
    }

    #[test]
    fn domains_of_string_values_work() {
        let mut variables = Variables::new([
            Variable::new("X", Domain::new(["red", "green"])),
            Variable::new("Y", Domain::new(["red", "green"])),
        ]);
        let different = Constraint::not_equals("X", "Y");
        variables.set_value("X", "red");
        variables.set_value("Y", "red");
        assert!(!different.satisfied(&variables).unwrap());
        variables.set_value("Y", "green");
        assert!(different.satisfied(&variables).unwrap());
    }
}
