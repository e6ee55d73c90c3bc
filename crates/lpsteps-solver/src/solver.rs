use log::{info, warn};

use crate::error::SolveError;
use crate::geometric::{GeometricSolver, polytope_vertices_3d};
use crate::problem::{Method, Operator, Problem};
use crate::simplex::SimplexSolver;
use crate::solution::Solution;

/// Tolerance for reporting a constraint as saturated at the optimum
const ACTIVE_TOLERANCE: f64 = 1e-6;

/// Entry point: picks the solution method and turns every failure into an
/// invalid [`Solution`]
#[derive(Debug, Clone, Copy)]
pub struct Solver {
    /// Maximum pivots per simplex phase
    max_iterations: usize,
    /// Tolerance for floating point comparisons
    tolerance: f64,
}

impl Default for Solver {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1e-8,
        }
    }
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    /// Solve with `method`, or the default method for the variable count
    pub fn solve(&self, problem: &Problem, method: Option<Method>) -> Solution {
        match self.try_solve(problem, method) {
            Ok(solution) => solution,
            Err(e) => {
                warn!("error solving LP problem: {}", e);
                Solution::error(format!("The problem could not be solved: {}", e))
            }
        }
    }

    fn try_solve(&self, problem: &Problem, method: Option<Method>) -> Result<Solution, SolveError> {
        problem.validate()?;
        let problem = apply_operators(problem);
        let n = problem.num_variables();
        let method = method.unwrap_or_else(|| Method::default_for(n));
        info!("solving {} x {} problem with the {} method", problem.num_constraints(), n, method);

        let simplex = SimplexSolver::new(self.max_iterations, self.tolerance);
        let mut solution = match method {
            Method::Graphical if n == 2 => GeometricSolver::new(self.tolerance).solve(&problem)?,
            Method::Graphical => {
                let mut solution = simplex.solve(&problem)?;
                solution.messages.insert(
                    0,
                    format!("The graphical method needs 2 variables, found {}; using the simplex method.", n),
                );
                solution
            }
            Method::Simplex | Method::General => simplex.solve(&problem)?,
        };

        if solution.is_valid {
            solution.active_constraints = problem.active_constraints(&solution.coordinates, ACTIVE_TOLERANCE);
        }
        if n == 3 {
            solution.polytope_vertices = Some(polytope_vertices_3d(&problem));
        }
        Ok(solution)
    }
}

/// Solve with the default configuration
pub fn solve_lp_problem(problem: &Problem, method: Option<Method>) -> Solution {
    Solver::new().solve(problem, method)
}

/// Resolve the `+`/`-` toggles of the input form into signed coefficients.
///
/// A `-` operator forces every coefficient except the first to `-|c|`; the
/// first coefficient is left as entered.
pub fn apply_operators(problem: &Problem) -> Problem {
    let mut resolved = problem.clone();
    if problem.objective_operator == Operator::Minus {
        negate_tail(&mut resolved.objective_function);
    }
    for (row, coefficients) in resolved.constraint_coefficients.iter_mut().enumerate() {
        if problem.constraint_operator(row) == Operator::Minus {
            negate_tail(coefficients);
        }
    }
    resolved.objective_operator = Operator::Plus;
    resolved.constraint_operators.clear();
    resolved
}

fn negate_tail(coefficients: &mut [f64]) {
    for c in coefficients.iter_mut().skip(1) {
        *c = -c.abs();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::ConstraintSign::*;
    use crate::solution::SolutionStatus;

    fn solver() -> Solver {
        let _ = env_logger::builder().is_test(true).try_init();
        Solver::new()
    }

    fn bounded_problems() -> Vec<Problem> {
        vec![
            Problem::classroom_example(),
            Problem::maximize(vec![3.0, 2.0])
                .with_constraint(vec![1.0, 1.0], Le, 4.0)
                .with_constraint(vec![1.0, 0.0], Le, 3.0)
                .with_constraint(vec![0.0, 1.0], Le, 3.0),
            Problem::maximize(vec![5.0, 4.0])
                .with_constraint(vec![6.0, 4.0], Le, 24.0)
                .with_constraint(vec![1.0, 2.0], Le, 6.0)
                .with_constraint(vec![-1.0, 1.0], Le, 1.0)
                .with_constraint(vec![0.0, 1.0], Le, 2.0),
        ]
    }

    #[test]
    fn test_classroom_example() {
        let problem = Problem::classroom_example();
        let solution = solver().solve(&problem, None);

        assert!(solution.is_valid);
        assert!(solution.feasible_region.is_some(), "two variables default to the graphical method");
        assert!((solution.coordinates[0] - 3.0).abs() < 1e-9);
        assert!((solution.coordinates[1] - 5.0).abs() < 1e-9);
        assert_eq!(solution.value, problem.evaluate(&solution.coordinates));
        assert_eq!(solution.active_constraints, vec![1, 4]);
    }

    #[test]
    fn test_valid_coordinates_are_feasible() {
        for problem in bounded_problems() {
            for method in [Method::Graphical, Method::Simplex] {
                let solution = solver().solve(&problem, Some(method));
                assert!(solution.is_valid, "{:?} failed: {:?}", method, solution.messages);
                assert!(problem.is_feasible(&solution.coordinates, 1e-8), "{:?}", solution.coordinates);
            }
        }
    }

    #[test]
    fn test_graphical_and_simplex_agree() {
        for problem in bounded_problems() {
            let graphical = solver().solve(&problem, Some(Method::Graphical));
            let simplex = solver().solve(&problem, Some(Method::Simplex));

            assert!(
                (graphical.value - simplex.value).abs() < 1e-6,
                "graphical {} vs simplex {}",
                graphical.value,
                simplex.value
            );
        }
    }

    #[test]
    fn test_infeasible_both_methods() {
        let problem = Problem::maximize(vec![1.0, 1.0])
            .with_constraint(vec![1.0, 1.0], Le, 1.0)
            .with_constraint(vec![1.0, 1.0], Ge, 5.0);

        for method in [Method::Graphical, Method::Simplex] {
            let solution = solver().solve(&problem, Some(method));
            assert!(!solution.is_valid);
            assert_eq!(solution.status, SolutionStatus::Infeasible);
            assert!(solution.failures().any(|m| m.contains("Infeasible")));
        }
    }

    #[test]
    fn test_unbounded_simplex() {
        let problem = Problem::maximize(vec![1.0, 0.0]).with_constraint(vec![1.0, -1.0], Le, 1.0);

        let solution = solver().solve(&problem, Some(Method::Simplex));

        assert_eq!(solution.status, SolutionStatus::Unbounded);
        assert!(solution.coordinates.is_empty());
        assert!(solution.iterations.is_some());
    }

    #[test]
    fn test_equality_row_adds_only_an_artificial() {
        let problem = Problem::minimize(vec![1.0, 1.0, 1.0])
            .with_constraint(vec![1.0, 1.0, 1.0], Eq, 6.0)
            .with_constraint(vec![1.0, 0.0, 0.0], Le, 4.0);

        let solution = solver().solve(&problem, None);
        let canonical = solution.canonical_form.as_ref().unwrap();

        assert_eq!(canonical.variable_names, vec!["x1", "x2", "x3", "a1", "s1"]);
        assert_eq!(canonical.basis_variables, vec!["a1", "s1"]);
        assert!(solution.is_valid);
        assert!((solution.value - 6.0).abs() < 1e-9);
        assert!(solution.polytope_vertices.is_some());
    }

    #[test]
    fn test_general_is_simplex() {
        let problem = Problem::minimize(vec![2.0, 3.0])
            .with_constraint(vec![1.0, 1.0], Ge, 4.0)
            .with_constraint(vec![1.0, 0.0], Le, 3.0);

        let general = solver().solve(&problem, Some(Method::General));
        let simplex = solver().solve(&problem, Some(Method::Simplex));

        assert_eq!(general, simplex);
    }

    #[test]
    fn test_graphical_falls_back_for_three_variables() {
        let problem = Problem::maximize(vec![1.0, 2.0, 3.0])
            .with_constraint(vec![1.0, 1.0, 1.0], Le, 10.0)
            .with_constraint(vec![0.0, 0.0, 1.0], Le, 4.0);

        let solution = solver().solve(&problem, Some(Method::Graphical));

        assert!(solution.is_valid);
        assert!(solution.iterations.is_some());
        assert!(solution.feasible_region.is_none());
        assert!(solution.messages[0].contains("graphical method needs 2 variables"));
        // x3 = 4, x2 = 6
        assert!((solution.value - 24.0).abs() < 1e-9, "obj = {}", solution.value);
        assert!(solution.polytope_vertices.unwrap().contains(&[0.0, 6.0, 4.0]));
    }

    #[test]
    fn test_malformed_input_becomes_error_solution() {
        let problem = Problem::maximize(vec![1.0, 1.0]).with_constraint(vec![1.0], Le, 1.0);

        let solution = solver().solve(&problem, None);

        assert!(!solution.is_valid);
        assert_eq!(solution.status, SolutionStatus::Error);
        assert!(solution.coordinates.is_empty());
        assert_eq!(solution.failures().count(), 1);
    }

    #[test]
    fn test_operators_leave_first_coefficient() {
        let mut problem = Problem::maximize(vec![1.0, 2.0, -3.0])
            .with_constraint(vec![3.0, 4.0, 5.0], Le, 1.0)
            .with_constraint(vec![-5.0, -6.0, 7.0], Le, 1.0)
            .with_constraint(vec![1.0, 1.0, 1.0], Le, 1.0);
        problem.objective_operator = Operator::Minus;
        problem.constraint_operators = vec![Operator::Minus, Operator::Minus, Operator::Plus];

        let resolved = apply_operators(&problem);

        assert_eq!(resolved.objective_function, vec![1.0, -2.0, -3.0]);
        assert_eq!(resolved.constraint_coefficients[0], vec![3.0, -4.0, -5.0]);
        assert_eq!(resolved.constraint_coefficients[1], vec![-5.0, -6.0, -7.0]);
        assert_eq!(resolved.constraint_coefficients[2], vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_iteration_limit_is_configurable() {
        let problem = Problem::classroom_example();
        let solution = solver().with_max_iterations(1).solve(&problem, Some(Method::Simplex));

        assert_eq!(solution.status, SolutionStatus::MaxIterations);
        assert!(!solution.is_valid);
    }
}
