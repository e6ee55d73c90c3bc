pub mod canonical;
mod error;
mod format;
pub mod geometric;
pub mod linalg;
mod problem;
mod simplex;
mod solution;
mod solver;
mod tableau;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use canonical::{CanonicalForm, VariableKind};
pub use error::SolveError;
pub use geometric::GeometricSolver;
pub use problem::{ConstraintSign, Method, Operator, Problem, ProblemType};
pub use simplex::{EngineStatus, SimplexEngine, SimplexSolver};
pub use solution::{FAILURE_MARK, Pivot, SUCCESS_MARK, SimplexIteration, Solution, SolutionStatus, TableData};
pub use solver::{Solver, apply_operators, solve_lp_problem};
pub use tableau::{Step, Tableau};
