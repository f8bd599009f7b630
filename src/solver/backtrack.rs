use tracing::debug;

use crate::{
    error::Result,
    solver::{
        constraint::Constraints,
        propagation::{Assignment, Propagations},
        state::CspState,
        stats::SearchStats,
        termination::{checkpoint, Termination},
        value::Value,
        variable::{Journal, Variables},
    },
};

/// Depth-first backtracking search over a [`CspState`].
///
/// Variables are visited in store order and values in domain order, so two
/// identical inputs always produce identical outputs. On `Ok(true)` the
/// state's variables hold the satisfying assignment; on `Ok(false)` every
/// variable that began empty is empty again and every domain is back to its
/// entry value.
pub struct BackTrackingSolver<V: Value> {
    pub state: CspState<V>,
    stats: SearchStats,
}

impl<V: Value> BackTrackingSolver<V> {
    pub fn new(variables: Variables<V>, constraints: Constraints<V>) -> Self {
        Self::with_propagations(variables, constraints, Propagations::new())
    }

    /// A solver whose search decisions additionally run the given
    /// propagation hooks, journalling their removals per decision.
    pub fn with_propagations(
        variables: Variables<V>,
        constraints: Constraints<V>,
        propagations: Propagations<V>,
    ) -> Self {
        Self {
            state: CspState::new(variables, constraints, propagations),
            stats: SearchStats::default(),
        }
    }

    /// Searches for an assignment satisfying every constraint.
    ///
    /// Returns `Ok(true)` when one is found (the assignment is left in
    /// `self.state.variables`), `Ok(false)` when the search space is
    /// exhausted, or an error on cancellation or a contract violation.
    pub fn solve(&mut self, termination: &mut impl Termination) -> Result<bool> {
        self.stats = SearchStats::default();
        let solved = reduce(&mut self.state, termination, &mut self.stats)?;
        debug!(
            solved,
            nodes_visited = self.stats.nodes_visited,
            backtracks = self.stats.backtracks,
            "search finished"
        );
        Ok(solved)
    }

    /// Counters from the most recent [`solve`](Self::solve).
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }
}

fn reduce<V: Value>(
    state: &mut CspState<V>,
    termination: &mut impl Termination,
    stats: &mut SearchStats,
) -> Result<bool> {
    let Some(index) = state.variables.first_empty() else {
        return Ok(true);
    };
    let name = state.variables.at(index).name().clone();
    let options: Vec<V> = state.variables.at(index).domain().iter().cloned().collect();

    // removals contributed by the current candidate, reversed before the
    // next candidate is tried and before control returns upward
    let mut journal = Journal::new();

    for option in options {
        checkpoint(termination)?;
        state.variables.restore(&mut journal);
        state.variables.set_value_at(index, option.clone());
        stats.nodes_visited += 1;

        let assignment = Assignment {
            name: name.clone(),
            value: option,
        };
        let removals = state.propagations.execute(&assignment, &state.variables);
        state.variables.apply_removals(&removals, &mut journal)?;

        let complete = state.variables.complete();
        let satisfied = state.constraints.all_satisfied(&state.variables)?;
        match (complete, satisfied) {
            (true, true) => return Ok(true),
            (false, true) => {
                if reduce(state, termination, stats)? {
                    return Ok(true);
                }
            }
            (_, false) => {}
        }
    }

    state.variables.restore(&mut journal);
    state.variables.unset_at(index);
    stats.backtracks += 1;
    Ok(false)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        error::Error,
        solver::{
            constraint::{all_unique, Constraint},
            domain::{int_range, Domain},
            propagation::{DomainRemoval, Propagation},
            termination::{CancelFlag, Indefinite},
            variable::Variable,
        },
    };

    #[test]
    fn no_constraints_fills_variables_in_store_order() {
        let variables = Variables::new([
            Variable::new("A", Domain::new([7, 8])),
            Variable::new("B", Domain::new([3, 4])),
        ]);
        let mut solver = BackTrackingSolver::new(variables, Constraints::<i64>::new());

        assert!(solver.solve(&mut Indefinite).unwrap());
        assert_eq!(solver.state.variables.value_of("A"), Some(&7));
        assert_eq!(solver.state.variables.value_of("B"), Some(&3));
    }

    #[test]
    fn empty_initial_domain_fails_without_recursing() {
        let variables = Variables::new([
            Variable::new("A", Domain::<i64>::new([])),
            Variable::new("B", Domain::new([1])),
        ]);
        let mut solver = BackTrackingSolver::new(variables, Constraints::new());

        assert!(!solver.solve(&mut Indefinite).unwrap());
        assert_eq!(solver.stats().nodes_visited, 0);
        assert!(solver.state.variables.find("B").unwrap().is_empty());
    }

    #[test]
    fn unary_equals_solves_exactly_when_the_constant_is_in_the_domain() {
        let variables = Variables::new([Variable::new("X", int_range(1, 5))]);
        let mut constraints = Constraints::new();
        constraints.push(Constraint::unary_equals("X", 3));
        let mut solver = BackTrackingSolver::new(variables, constraints);
        assert!(solver.solve(&mut Indefinite).unwrap());
        assert_eq!(solver.state.variables.value_of("X"), Some(&3));

        let variables = Variables::new([Variable::new("X", int_range(1, 5))]);
        let mut constraints = Constraints::new();
        constraints.push(Constraint::unary_equals("X", 9));
        let mut solver = BackTrackingSolver::new(variables, constraints);
        assert!(!solver.solve(&mut Indefinite).unwrap());
    }

    #[test]
    fn failed_search_restores_the_entry_state() {
        let variables = Variables::new([
            Variable::new("A", int_range(1, 3)),
            Variable::new("B", int_range(1, 3)),
            Variable::new("C", int_range(1, 3)),
        ]);
        let constraints = all_unique(["A", "B", "C"]);

        // forward checking, to put the journal under load
        let forward = Propagation::new(["A", "B", "C"], |assignment: &Assignment<i64>, variables: &Variables<i64>| {
            variables
                .iter()
                .filter(|variable| *variable.name() != assignment.name)
                .filter(|variable| variable.domain().contains(&assignment.value))
                .map(|variable| DomainRemoval::new(variable.name(), assignment.value.clone()))
                .collect()
        });
        let mut propagations = Propagations::new();
        propagations.push(forward);

        // three mutually distinct variables over two values is impossible
        let mut solver = BackTrackingSolver::with_propagations(variables, constraints, propagations);
        assert!(!solver.solve(&mut Indefinite).unwrap());

        for name in ["A", "B", "C"] {
            let variable = solver.state.variables.find(name).unwrap();
            assert!(variable.is_empty());
            let domain: Vec<i64> = variable.domain().iter().copied().collect();
            assert_eq!(domain, vec![1, 2]);
        }
    }

    #[test]
    fn forward_checking_visits_fewer_nodes() {
        let problem = || {
            let variables = Variables::new([
                Variable::new("A", int_range(1, 5)),
                Variable::new("B", int_range(1, 5)),
                Variable::new("C", int_range(1, 5)),
                Variable::new("D", int_range(1, 5)),
            ]);
            let constraints = all_unique(["A", "B", "C", "D"]);
            (variables, constraints)
        };

        let (variables, constraints) = problem();
        let mut plain = BackTrackingSolver::new(variables, constraints);
        assert!(plain.solve(&mut Indefinite).unwrap());

        let (variables, constraints) = problem();
        let mut propagations = Propagations::new();
        propagations.push(Propagation::new(
            ["A", "B", "C", "D"],
            |assignment: &Assignment<i64>, variables: &Variables<i64>| {
                variables
                    .iter()
                    .filter(|variable| *variable.name() != assignment.name)
                    .filter(|variable| variable.is_empty())
                    .filter(|variable| variable.domain().contains(&assignment.value))
                    .map(|variable| DomainRemoval::new(variable.name(), assignment.value.clone()))
                    .collect()
            },
        ));
        let mut checked = BackTrackingSolver::with_propagations(variables, constraints, propagations);
        assert!(checked.solve(&mut Indefinite).unwrap());

        assert_eq!(
            plain.state.variables.value_of("A"),
            checked.state.variables.value_of("A")
        );
        assert!(checked.stats().nodes_visited <= plain.stats().nodes_visited);
    }

    #[test]
    fn identical_inputs_solve_identically() {
        let build = || {
            let variables = Variables::new([
                Variable::new("A", int_range(1, 4)),
                Variable::new("B", int_range(1, 4)),
            ]);
            let mut constraints = Constraints::new();
            constraints.push(Constraint::less_than("A", "B"));
            BackTrackingSolver::new(variables, constraints)
        };

        let mut first = build();
        let mut second = build();
        assert!(first.solve(&mut Indefinite).unwrap());
        assert!(second.solve(&mut Indefinite).unwrap());

        for name in ["A", "B"] {
            assert_eq!(
                first.state.variables.value_of(name),
                second.state.variables.value_of(name)
            );
        }
        assert_eq!(first.stats().nodes_visited, second.stats().nodes_visited);
    }

    #[test]
    fn cancellation_is_distinct_from_no_solution() {
        let variables = Variables::new([
            Variable::new("A", int_range(1, 10)),
            Variable::new("B", int_range(1, 10)),
        ]);
        let mut constraints = Constraints::new();
        constraints.push(Constraint::equals("A", "B"));

        let flag = CancelFlag::new();
        flag.cancel();
        let mut solver = BackTrackingSolver::new(variables, constraints);
        let result = solver.solve(&mut flag.clone());
        assert!(matches!(result, Err(Error::Canceled)));
    }

    #[test]
    fn pre_assignments_are_respected() {
        let mut variables = Variables::new([
            Variable::new("A", int_range(1, 4)),
            Variable::new("B", int_range(1, 4)),
        ]);
        variables.set_value("A", 3);
        let mut constraints = Constraints::new();
        constraints.push(Constraint::equals("A", "B"));

        let mut solver = BackTrackingSolver::new(variables, constraints);
        assert!(solver.solve(&mut Indefinite).unwrap());
        assert_eq!(solver.state.variables.value_of("A"), Some(&3));
        assert_eq!(solver.state.variables.value_of("B"), Some(&3));
    }
}
