use crate::solver::{
    constraint::Constraints, propagation::Propagations, value::Value, variable::Variables,
};

/// The shared mutable state of one constraint problem: the variable store,
/// the constraints over it, and the registered propagation hooks.
///
/// A solver owns its state exclusively for the duration of a solve; nothing
/// else may mutate it while a solve is running.
#[derive(Debug, Clone)]
pub struct CspState<V: Value> {
    pub variables: Variables<V>,
    pub constraints: Constraints<V>,
    pub propagations: Propagations<V>,
}

impl<V: Value> CspState<V> {
    pub fn new(
        variables: Variables<V>,
        constraints: Constraints<V>,
        propagations: Propagations<V>,
    ) -> Self {
        Self {
            variables,
            constraints,
            propagations,
        }
    }
}
