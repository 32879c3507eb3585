//! Deterministic belief tracking over the hidden deal.
//!
//! - `grid`: the tri-state player × card grid and cell provenance.
//! - `constraint`: "holds at least one of" clauses.
//! - `engine`: the pure event reducer and fixpoint driver.
//! - `rules`: the rule families the fixpoint applies.
//! - `query`: solution status and progress metrics.

pub mod constraint;
pub mod contradiction;
pub mod engine;
pub mod grid;
pub mod query;
mod rules;

pub use constraint::{Constraint, ConstraintId, ConstraintStatus, ConstraintStore, Tightening};
pub use contradiction::Contradiction;
pub use engine::{AppliedEffects, BeliefState, SettledCell, reduce};
pub use grid::{BeliefGrid, CellState, Explanation, Mark, Reason, Transition};
pub use query::{GridMetrics, SolutionReport, SolutionVerdict, solution_status};
