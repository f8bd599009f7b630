//! Ravel is a generic finite-domain constraint satisfaction problem (CSP)
//! solver.
//!
//! A problem is a set of named variables, each with a finite domain of
//! candidate values, plus a set of declarative constraints over those
//! variables. The solver searches for an assignment to every variable that
//! satisfies every constraint: map colouring, Sudoku, zebra-style logic
//! puzzles, integer equations. The engine is parameterised by the value type
//! of the variables — integers, strings, timestamps, floats — anything that
//! supports equality.
//!
//! # Core Concepts
//!
//! - **[`Domain`](solver::domain::Domain)**: an ordered collection of the
//!   values a variable may take. The stored order is the order the search
//!   tries values in.
//! - **[`Variables`](solver::variable::Variables)**: the store of named
//!   cells, each assigned or empty. Store order is the order the search
//!   picks variables in.
//! - **[`Constraint`](solver::constraint::Constraint)**: a pure predicate
//!   over a named subset of variables. A standard catalogue
//!   ([`equals`](solver::constraint::Constraint::equals),
//!   [`not_equals`](solver::constraint::Constraint::not_equals), orderings,
//!   and the pairwise [`all_unique`](solver::constraint::all_unique) /
//!   [`all_equals`](solver::constraint::all_equals) expansions) is provided,
//!   and custom predicates can be attached with
//!   [`Constraint::new`](solver::constraint::Constraint::new).
//! - **[`BackTrackingSolver`](solver::backtrack::BackTrackingSolver)**: the
//!   depth-first search driver. The companion preprocessor
//!   [`make_arc_consistent`](solver::state::CspState::make_arc_consistent)
//!   shrinks domains before searching.
//!
//! # Example: A Simple 2-Variable Problem
//!
//! Solving `A != B` where `A` can be `1` or `2` and `B` can only be `1`; the
//! solver must deduce that `A` is `2`.
//!
//! ```
//! use ravel::solver::{
//!     backtrack::BackTrackingSolver,
//!     constraint::{Constraint, Constraints},
//!     domain::Domain,
//!     termination::Indefinite,
//!     variable::{Variable, Variables},
//! };
//!
//! let variables = Variables::new([
//!     Variable::new("A", Domain::new([1, 2])),
//!     Variable::new("B", Domain::new([1])),
//! ]);
//!
//! let mut constraints = Constraints::new();
//! constraints.push(Constraint::not_equals("A", "B"));
//!
//! let mut solver = BackTrackingSolver::new(variables, constraints);
//! let solved = solver.solve(&mut Indefinite).unwrap();
//!
//! assert!(solved);
//! assert_eq!(solver.state.variables.value_of("A"), Some(&2));
//! assert_eq!(solver.state.variables.value_of("B"), Some(&1));
//! ```
//!
//! Long-running solves take a [`Termination`](solver::termination::Termination)
//! condition; pass a [`Deadline`](solver::termination::Deadline) or a
//! [`CancelFlag`](solver::termination::CancelFlag) instead of
//! [`Indefinite`](solver::termination::Indefinite) to bound the search. A
//! triggered condition surfaces as [`Error::Canceled`](error::Error::Canceled),
//! which is distinct from the `Ok(false)` of an exhausted search.

pub mod error;
pub mod solver;
