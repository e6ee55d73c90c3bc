use std::fmt;
use std::str::FromStr;

use crate::error::SolveError;

/// A linear programming problem over non-negative variables
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Clone, PartialEq)]
pub struct Problem {
    /// Whether to maximize or minimize
    pub problem_type: ProblemType,
    /// Objective coefficients, one per decision variable
    pub objective_function: Vec<f64>,
    /// One coefficient row per constraint
    pub constraint_coefficients: Vec<Vec<f64>>,
    /// Comparison operator per constraint
    pub constraint_signs: Vec<ConstraintSign>,
    /// Right-hand side per constraint
    pub constraint_values: Vec<f64>,
    /// Sign toggle applied to the objective (all coefficients but the first)
    #[cfg_attr(feature = "serde", serde(default))]
    pub objective_operator: Operator,
    /// Sign toggle per constraint row; empty means all `+`
    #[cfg_attr(feature = "serde", serde(default))]
    pub constraint_operators: Vec<Operator>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProblemType {
    Max,
    Min,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintSign {
    /// Less than or equal (<=)
    #[cfg_attr(feature = "serde", serde(rename = "<="))]
    Le,
    /// Equal (=)
    #[cfg_attr(feature = "serde", serde(rename = "="))]
    Eq,
    /// Greater than or equal (>=)
    #[cfg_attr(feature = "serde", serde(rename = ">="))]
    Ge,
}

/// The `+`/`-` toggle of the input form
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Operator {
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "+"))]
    Plus,
    #[cfg_attr(feature = "serde", serde(rename = "-"))]
    Minus,
}

/// Which solution procedure to run
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Vertex enumeration, two variables only
    Graphical,
    /// Two-phase tableau simplex
    Simplex,
    /// Alias of `Simplex`
    General,
}

impl ConstraintSign {
    pub fn symbol(self) -> &'static str {
        match self {
            ConstraintSign::Le => "<=",
            ConstraintSign::Eq => "=",
            ConstraintSign::Ge => ">=",
        }
    }

    /// Whether `lhs` satisfies `lhs <sign> rhs` within `tol`
    pub fn holds(self, lhs: f64, rhs: f64, tol: f64) -> bool {
        match self {
            ConstraintSign::Le => lhs <= rhs + tol,
            ConstraintSign::Ge => lhs >= rhs - tol,
            ConstraintSign::Eq => (lhs - rhs).abs() <= tol,
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            ConstraintSign::Le => ConstraintSign::Ge,
            ConstraintSign::Ge => ConstraintSign::Le,
            ConstraintSign::Eq => ConstraintSign::Eq,
        }
    }
}

impl fmt::Display for ConstraintSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl Method {
    /// Graphical for two variables, simplex otherwise
    pub fn default_for(num_variables: usize) -> Self {
        if num_variables == 2 {
            Method::Graphical
        } else {
            Method::Simplex
        }
    }
}

impl FromStr for Method {
    type Err = SolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "graphical" => Ok(Method::Graphical),
            "simplex" => Ok(Method::Simplex),
            "general" => Ok(Method::General),
            other => Err(SolveError::UnknownMethod(other.to_string())),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Method::Graphical => "graphical",
            Method::Simplex => "simplex",
            Method::General => "general",
        })
    }
}

impl Problem {
    pub fn new(problem_type: ProblemType, objective_function: Vec<f64>) -> Self {
        Self {
            problem_type,
            objective_function,
            constraint_coefficients: Vec::new(),
            constraint_signs: Vec::new(),
            constraint_values: Vec::new(),
            objective_operator: Operator::Plus,
            constraint_operators: Vec::new(),
        }
    }

    pub fn maximize(objective_function: Vec<f64>) -> Self {
        Self::new(ProblemType::Max, objective_function)
    }

    pub fn minimize(objective_function: Vec<f64>) -> Self {
        Self::new(ProblemType::Min, objective_function)
    }

    pub fn add_constraint(&mut self, coefficients: Vec<f64>, sign: ConstraintSign, rhs: f64) {
        self.constraint_coefficients.push(coefficients);
        self.constraint_signs.push(sign);
        self.constraint_values.push(rhs);
    }

    /// Builder form of [`Problem::add_constraint`]
    pub fn with_constraint(mut self, coefficients: Vec<f64>, sign: ConstraintSign, rhs: f64) -> Self {
        self.add_constraint(coefficients, sign, rhs);
        self
    }

    /// The default problem of the input form:
    /// max x1 + x2 with five `<=` constraints
    pub fn classroom_example() -> Self {
        Problem::maximize(vec![1.0, 1.0])
            .with_constraint(vec![2.0, -3.0], ConstraintSign::Le, 2.0)
            .with_constraint(vec![2.0, 1.0], ConstraintSign::Le, 11.0)
            .with_constraint(vec![-1.0, 1.0], ConstraintSign::Le, 3.0)
            .with_constraint(vec![1.0, 0.0], ConstraintSign::Le, 4.0)
            .with_constraint(vec![0.0, 1.0], ConstraintSign::Le, 5.0)
    }

    pub fn num_variables(&self) -> usize {
        self.objective_function.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraint_coefficients.len()
    }

    pub fn is_maximization(&self) -> bool {
        self.problem_type == ProblemType::Max
    }

    pub fn constraint_operator(&self, row: usize) -> Operator {
        self.constraint_operators.get(row).copied().unwrap_or_default()
    }

    /// Check that all sequence lengths agree and every number is finite
    pub fn validate(&self) -> Result<(), SolveError> {
        let n = self.num_variables();
        let m = self.num_constraints();
        if n == 0 {
            return Err(SolveError::EmptyObjective);
        }
        if self.constraint_signs.len() != m {
            return Err(SolveError::ConstraintCount {
                what: "constraint signs",
                expected: m,
                found: self.constraint_signs.len(),
            });
        }
        if self.constraint_values.len() != m {
            return Err(SolveError::ConstraintCount {
                what: "right-hand sides",
                expected: m,
                found: self.constraint_values.len(),
            });
        }
        if !self.constraint_operators.is_empty() && self.constraint_operators.len() != m {
            return Err(SolveError::ConstraintCount {
                what: "constraint operators",
                expected: m,
                found: self.constraint_operators.len(),
            });
        }
        for (row, coefficients) in self.constraint_coefficients.iter().enumerate() {
            if coefficients.len() != n {
                return Err(SolveError::RowLength {
                    row,
                    expected: n,
                    found: coefficients.len(),
                });
            }
            if coefficients.iter().any(|c| !c.is_finite()) {
                return Err(SolveError::NonFinite {
                    what: format!("constraint {}", row + 1),
                });
            }
        }
        if self.objective_function.iter().any(|c| !c.is_finite()) {
            return Err(SolveError::NonFinite {
                what: "objective function".to_string(),
            });
        }
        if self.constraint_values.iter().any(|v| !v.is_finite()) {
            return Err(SolveError::NonFinite {
                what: "right-hand sides".to_string(),
            });
        }
        Ok(())
    }

    /// Objective value at `point`
    pub fn evaluate(&self, point: &[f64]) -> f64 {
        crate::linalg::dot(&self.objective_function, point)
    }

    /// Left-hand side of constraint `row` at `point`
    pub fn lhs(&self, row: usize, point: &[f64]) -> f64 {
        crate::linalg::dot(&self.constraint_coefficients[row], point)
    }

    /// Whether `point` satisfies every constraint and non-negativity within `tol`
    pub fn is_feasible(&self, point: &[f64], tol: f64) -> bool {
        if point.len() != self.num_variables() || point.iter().any(|&x| x < -tol) {
            return false;
        }
        (0..self.num_constraints()).all(|i| {
            self.constraint_signs[i].holds(self.lhs(i, point), self.constraint_values[i], tol)
        })
    }

    /// Indices of the constraints saturated at `point`
    pub fn active_constraints(&self, point: &[f64], tol: f64) -> Vec<usize> {
        if point.len() != self.num_variables() {
            return Vec::new();
        }
        (0..self.num_constraints())
            .filter(|&i| (self.lhs(i, point) - self.constraint_values[i]).abs() < tol)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_ragged_row() {
        let problem = Problem::maximize(vec![1.0, 1.0])
            .with_constraint(vec![1.0, 1.0], ConstraintSign::Le, 4.0)
            .with_constraint(vec![1.0], ConstraintSign::Le, 3.0);

        assert_eq!(
            problem.validate(),
            Err(SolveError::RowLength { row: 1, expected: 2, found: 1 })
        );
    }

    #[test]
    fn test_validate_counts_and_numbers() {
        let mut problem = Problem::classroom_example();
        assert!(problem.validate().is_ok());

        problem.constraint_values.pop();
        assert!(matches!(
            problem.validate(),
            Err(SolveError::ConstraintCount { what: "right-hand sides", .. })
        ));

        let problem = Problem::minimize(vec![f64::NAN]);
        assert!(matches!(problem.validate(), Err(SolveError::NonFinite { .. })));

        let problem = Problem::minimize(Vec::new());
        assert_eq!(problem.validate(), Err(SolveError::EmptyObjective));
    }

    #[test]
    fn test_feasibility_and_active_constraints() {
        let problem = Problem::classroom_example();

        assert!(problem.is_feasible(&[3.0, 5.0], 1e-8));
        assert!(!problem.is_feasible(&[4.0, 5.0], 1e-8));
        assert!(!problem.is_feasible(&[-1.0, 0.0], 1e-8));

        // 2x1 + x2 <= 11 and x2 <= 5 meet at (3, 5)
        assert_eq!(problem.active_constraints(&[3.0, 5.0], 1e-6), vec![1, 4]);
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!("Simplex".parse::<Method>(), Ok(Method::Simplex));
        assert_eq!(" graphical ".parse::<Method>(), Ok(Method::Graphical));
        assert_eq!(
            "dual".parse::<Method>(),
            Err(SolveError::UnknownMethod("dual".to_string()))
        );
        assert_eq!(Method::default_for(2), Method::Graphical);
        assert_eq!(Method::default_for(3), Method::Simplex);
    }
}
