use thiserror::Error;

/// Reasons a problem cannot be handed to a solver.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolveError {
    #[error("Objective function has no coefficients")]
    EmptyObjective,
    #[error("Constraint {row} has {found} coefficients, expected {expected}")]
    RowLength {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("Expected {expected} {what}, found {found}")]
    ConstraintCount {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("Non-finite number in {what}")]
    NonFinite { what: String },
    #[error("The {method} method needs {expected} variables, found {found}")]
    VariableCount {
        method: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("Unknown basis variable: {0}")]
    UnknownBasisVariable(String),
    #[error("Unknown solution method: {0}")]
    UnknownMethod(String),
}
