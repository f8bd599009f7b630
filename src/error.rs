use crate::solver::variable::VariableName;

pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Errors surfaced by the solver kernel.
///
/// An exhausted search is *not* an error; it is reported as `Ok(false)` from
/// [`solve`](crate::solver::backtrack::BackTrackingSolver::solve).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A constraint or propagation referenced a variable name that does not
    /// exist in the store. This is a bug in the problem definition.
    #[error("no variable named {name} in the store")]
    UnknownVariable { name: VariableName },

    /// An assigned variable holds a value outside its own domain, e.g. a
    /// pre-assignment that was never a member of the domain.
    #[error("variable {name} holds {value} which is outside its domain")]
    ValueOutsideDomain { name: VariableName, value: String },

    /// Arc consistency emptied a variable's domain, proving the problem has
    /// no solution. The constraint that caused the wipeout is named.
    #[error("unsatisfiable: arc consistency emptied the domain of {name} via {constraint}")]
    Unsatisfiable {
        name: VariableName,
        constraint: String,
    },

    /// The cancellation token fired before the call could finish. The store
    /// may be in an intermediate state and should not be trusted.
    #[error("execution canceled")]
    Canceled,
}
