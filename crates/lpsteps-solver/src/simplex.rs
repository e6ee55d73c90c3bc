use log::{debug, info};

use crate::canonical::{CanonicalForm, is_artificial};
use crate::error::SolveError;
use crate::format;
use crate::problem::Problem;
use crate::solution::{Pivot, SimplexIteration, Solution, SolutionStatus, failure, success};
use crate::tableau::{Step, Tableau};

/// Terminal state of one engine run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineStatus {
    Optimal,
    Unbounded,
    MaxIterations,
}

/// Primal simplex over a tableau, maximizing its installed objective
#[derive(Debug, Clone, Copy)]
pub struct SimplexEngine {
    /// Pivot limit for a single run
    pub max_iterations: usize,
    /// Tolerance for reduced costs and pivot entries
    pub tolerance: f64,
}

impl SimplexEngine {
    /// Pivot until optimal, unbounded or out of iterations, appending one
    /// snapshot per step to `log`
    pub fn run(&self, tableau: &mut Tableau, phase: u8, log: &mut Vec<SimplexIteration>) -> EngineStatus {
        for index in 0..=self.max_iterations {
            let Some(col) = tableau.entering_column(self.tolerance) else {
                log.push(tableau.snapshot(index, phase, Step { is_optimal: true, ..Step::default() }));
                info!("phase {}: optimal after {} pivots, objective {}", phase, index, tableau.objective_value());
                return EngineStatus::Optimal;
            };
            if index == self.max_iterations {
                break;
            }

            let entering = tableau.variable_names()[col].clone();
            let (ratios, leaving_row) = tableau.ratio_test(col, self.tolerance);
            let Some(row) = leaving_row else {
                log.push(tableau.snapshot(
                    index,
                    phase,
                    Step {
                        ratios: Some(ratios),
                        entering: Some(entering),
                        ..Step::default()
                    },
                ));
                info!("phase {}: no leaving row for column {}, unbounded", phase, col);
                return EngineStatus::Unbounded;
            };

            let leaving = tableau.basis()[row].clone();
            debug!("phase {} step {}: {} enters, {} leaves (pivot {}, {})", phase, index, entering, leaving, row, col);
            log.push(tableau.snapshot(
                index,
                phase,
                Step {
                    pivot: Some(Pivot { row, col }),
                    ratios: Some(ratios),
                    entering: Some(entering),
                    leaving: Some(leaving),
                    is_optimal: false,
                },
            ));
            tableau.pivot(row, col, self.tolerance);
        }
        info!("phase {}: iteration limit of {} reached", phase, self.max_iterations);
        EngineStatus::MaxIterations
    }
}

/// Two-phase simplex with a full iteration trace
#[derive(Debug, Clone, Copy)]
pub struct SimplexSolver {
    engine: SimplexEngine,
}

impl SimplexSolver {
    pub fn new(max_iterations: usize, tolerance: f64) -> Self {
        Self {
            engine: SimplexEngine { max_iterations, tolerance },
        }
    }

    fn tolerance(&self) -> f64 {
        self.engine.tolerance
    }

    /// Solve `problem`, whose coefficients are already sign-resolved
    pub fn solve(&self, problem: &Problem) -> Result<Solution, SolveError> {
        let n = problem.num_variables();
        let canonical = CanonicalForm::new(
            &problem.objective_function,
            &problem.constraint_coefficients,
            &problem.constraint_signs,
            &problem.constraint_values,
            problem.is_maximization(),
        );

        let mut tableau = Tableau::new(
            &canonical.constraint_matrix,
            &canonical.right_hand_side,
            &canonical.objective_function,
            &canonical.variable_names,
            &canonical.basis_variables,
        )?;
        let mut iterations = Vec::new();
        let mut messages = Vec::new();

        let artificial = canonical.artificial_indexes();
        if !artificial.is_empty() {
            messages.push("Phase 1: minimizing the sum of the artificial variables.".to_string());
            let mut phase1_objective = vec![0.0; canonical.variable_names.len()];
            for &j in &artificial {
                phase1_objective[j] = -1.0;
            }
            tableau.install_objective(&phase1_objective)?;
            let status = self.engine.run(&mut tableau, 1, &mut iterations);

            let values = tableau.solution_vector();
            let sum = -tableau.objective_value();
            let artificial_values: Vec<String> = artificial.iter().map(|&j| format!("{:.6}", values[j])).collect();
            messages.push(format!("Sum of the artificial variables after phase 1: {:.6}", sum));
            messages.push(format!("Artificial variable values: [{}]", artificial_values.join(", ")));

            if status == EngineStatus::MaxIterations {
                messages.push(failure("Iteration limit reached in phase 1: the problem may be degenerate or cycling."));
                let solution = Solution::failed(SolutionStatus::MaxIterations, messages);
                return Ok(with_trace(solution, iterations, canonical));
            }
            if status != EngineStatus::Optimal || sum.abs() > self.tolerance() {
                messages.push(failure(
                    "Infeasible problem: the artificial variables cannot all be driven to zero in phase 1.",
                ));
                info!("phase 1 ended with artificial sum {}, infeasible", sum);
                return Ok(with_trace(Solution::infeasible(messages), iterations, canonical));
            }

            self.leave_phase_one(&mut tableau, &mut messages);
            messages.push(success("Phase 1 complete: a feasible basis was found, moving on to phase 2."));
        }

        messages.push("Phase 2: optimizing the real objective function.".to_string());
        let objective: Vec<f64> = canonical
            .variable_names
            .iter()
            .zip(&canonical.objective_function)
            .filter(|(name, _)| !is_artificial(name))
            .map(|(_, &c)| c)
            .collect();
        tableau.install_objective(&objective)?;
        let status = self.engine.run(&mut tableau, 2, &mut iterations);

        match status {
            EngineStatus::Unbounded => {
                messages.push(failure("Unbounded problem: no variable can leave the basis during a pivot."));
                return Ok(with_trace(Solution::unbounded(messages), iterations, canonical));
            }
            EngineStatus::MaxIterations => {
                messages.push(failure("Iteration limit reached: the problem may be degenerate or cycling."));
                let solution = Solution::failed(SolutionStatus::MaxIterations, messages);
                return Ok(with_trace(solution, iterations, canonical));
            }
            EngineStatus::Optimal => {}
        }

        let values = tableau.solution_vector();
        let coordinates: Vec<f64> = (0..n)
            .map(|j| {
                let name = format!("x{}", j + 1);
                let value = tableau.column_index(&name).map_or(0.0, |col| values[col]);
                if value.abs() < self.tolerance() { 0.0 } else { value }
            })
            .collect();
        let value = problem.evaluate(&coordinates);
        messages.push(success(format!(
            "Optimal solution found in phase 2: {} with Z = {}",
            format::point(&coordinates),
            format::number(value)
        )));

        let solution = Solution {
            messages,
            ..Solution::optimal(coordinates, value)
        };
        Ok(with_trace(solution, iterations, canonical))
    }

    /// Drive leftover artificial variables out of the basis, then drop
    /// their columns.
    ///
    /// An artificial still basic after a successful phase 1 sits at zero.
    /// It is swapped for the first non-artificial variable with a non-zero
    /// entry in its row; a row with no such entry is redundant and removed.
    fn leave_phase_one(&self, tableau: &mut Tableau, messages: &mut Vec<String>) {
        let mut row = 0;
        while row < tableau.num_rows() {
            let basic = tableau.basis()[row].clone();
            if !is_artificial(&basic) {
                row += 1;
                continue;
            }
            let replacement = (0..tableau.num_columns()).find(|&col| {
                !is_artificial(&tableau.variable_names()[col]) && tableau.get(row, col).abs() > self.tolerance()
            });
            match replacement {
                Some(col) => {
                    let name = tableau.variable_names()[col].clone();
                    messages.push(format!("{} stays basic at zero and is replaced by {}.", basic, name));
                    debug!("degenerate pivot ({}, {}) to remove {}", row, col, basic);
                    tableau.pivot(row, col, self.tolerance());
                    row += 1;
                }
                None => {
                    messages.push(format!(
                        "Constraint {} is redundant and is removed together with {}.",
                        row + 1,
                        basic
                    ));
                    tableau.remove_row(row);
                }
            }
        }
        tableau.drop_columns(is_artificial);
    }
}

fn with_trace(solution: Solution, iterations: Vec<SimplexIteration>, canonical: CanonicalForm) -> Solution {
    Solution {
        iterations: Some(iterations),
        canonical_form: Some(canonical),
        ..solution
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::ConstraintSign::*;

    fn solver() -> SimplexSolver {
        let _ = env_logger::builder().is_test(true).try_init();
        SimplexSolver::new(100, 1e-8)
    }

    #[test]
    fn test_simple_maximization() {
        // Maximize: 3x + 2y
        // Subject to:
        //   x + y <= 4
        //   x <= 3
        //   y <= 3
        // Optimal: x=3, y=1, obj=11
        let problem = Problem::maximize(vec![3.0, 2.0])
            .with_constraint(vec![1.0, 1.0], Le, 4.0)
            .with_constraint(vec![1.0, 0.0], Le, 3.0)
            .with_constraint(vec![0.0, 1.0], Le, 3.0);

        let solution = solver().solve(&problem).unwrap();

        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert!((solution.coordinates[0] - 3.0).abs() < 1e-6, "x = {} (expected 3)", solution.coordinates[0]);
        assert!((solution.coordinates[1] - 1.0).abs() < 1e-6, "y = {} (expected 1)", solution.coordinates[1]);
        assert!((solution.value - 11.0).abs() < 1e-6, "obj = {} (expected 11)", solution.value);
    }

    #[test]
    fn test_only_le_constraints_skip_phase_one() {
        let problem = Problem::classroom_example();
        let solution = solver().solve(&problem).unwrap();
        let iterations = solution.iterations.as_ref().unwrap();

        assert!(iterations.iter().all(|it| it.phase == 2));
        assert!(iterations.last().unwrap().is_optimal);
        assert!(!solution.messages.iter().any(|m| m.starts_with("Phase 1")));
        assert!((solution.value - 8.0).abs() < 1e-6, "obj = {}", solution.value);
    }

    #[test]
    fn test_minimization_with_ge() {
        // Minimize: 2x + 3y
        // Subject to:
        //   x + y >= 4
        //   x <= 3
        //   y <= 3
        // Optimal: x=3, y=1, obj=9
        let problem = Problem::minimize(vec![2.0, 3.0])
            .with_constraint(vec![1.0, 1.0], Ge, 4.0)
            .with_constraint(vec![1.0, 0.0], Le, 3.0)
            .with_constraint(vec![0.0, 1.0], Le, 3.0);

        let solution = solver().solve(&problem).unwrap();

        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert!((solution.coordinates[0] - 3.0).abs() < 1e-6, "x = {} (expected 3)", solution.coordinates[0]);
        assert!((solution.coordinates[1] - 1.0).abs() < 1e-6, "y = {} (expected 1)", solution.coordinates[1]);
        assert!((solution.value - 9.0).abs() < 1e-6, "obj = {} (expected 9)", solution.value);

        let iterations = solution.iterations.unwrap();
        assert_eq!(iterations[0].phase, 1);
        assert_eq!(iterations.last().unwrap().phase, 2);
        assert!(iterations.iter().filter(|it| it.phase == 2).all(|it| !it.variable_names.contains(&"a1".to_string())));
    }

    #[test]
    fn test_infeasible() {
        // x1 + x2 <= 1 and x1 + x2 >= 5
        let problem = Problem::maximize(vec![1.0, 1.0])
            .with_constraint(vec![1.0, 1.0], Le, 1.0)
            .with_constraint(vec![1.0, 1.0], Ge, 5.0);

        let solution = solver().solve(&problem).unwrap();

        assert_eq!(solution.status, SolutionStatus::Infeasible);
        assert!(!solution.is_valid);
        assert!(solution.coordinates.is_empty());
        assert!(solution.failures().any(|m| m.contains("Infeasible")));
        assert!(solution.iterations.unwrap().iter().all(|it| it.phase == 1));
    }

    #[test]
    fn test_unbounded() {
        // max x1 with x1 - x2 <= 1
        let problem = Problem::maximize(vec![1.0, 0.0]).with_constraint(vec![1.0, -1.0], Le, 1.0);

        let solution = solver().solve(&problem).unwrap();

        assert_eq!(solution.status, SolutionStatus::Unbounded);
        assert!(solution.failures().any(|m| m.contains("Unbounded")));
        let last = solution.iterations.unwrap().pop().unwrap();
        assert_eq!(last.pivot, None);
        assert_eq!(last.entering_variable.as_deref(), Some("x2"));
    }

    #[test]
    fn test_equality_constraint() {
        // max x1 + 2x2 with x1 + x2 = 4, x2 <= 3
        let problem = Problem::maximize(vec![1.0, 2.0])
            .with_constraint(vec![1.0, 1.0], Eq, 4.0)
            .with_constraint(vec![0.0, 1.0], Le, 3.0);

        let solution = solver().solve(&problem).unwrap();
        let canonical = solution.canonical_form.as_ref().unwrap();

        assert_eq!(canonical.variable_names, vec!["x1", "x2", "a1", "s1"]);
        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert!((solution.coordinates[0] - 1.0).abs() < 1e-9);
        assert!((solution.coordinates[1] - 3.0).abs() < 1e-9);
        assert!((solution.value - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_redundant_equality_row_is_removed() {
        // the second row repeats the first, so one artificial stays basic at zero
        let problem = Problem::maximize(vec![1.0, 1.0])
            .with_constraint(vec![1.0, 1.0], Eq, 2.0)
            .with_constraint(vec![2.0, 2.0], Eq, 4.0)
            .with_constraint(vec![1.0, 0.0], Le, 1.5);

        let solution = solver().solve(&problem).unwrap();

        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert!((solution.value - 2.0).abs() < 1e-9, "obj = {}", solution.value);
        assert!(problem.is_feasible(&solution.coordinates, 1e-8));
        assert!(solution.messages.iter().any(|m| m.contains("redundant")));
    }

    #[test]
    fn test_zero_level_artificial_is_pivoted_out() {
        // both equalities say x1 = x2, so phase 1 is optimal at once with a1
        // and a2 basic at zero
        let problem = Problem::maximize(vec![1.0, 2.0])
            .with_constraint(vec![1.0, -1.0], Eq, 0.0)
            .with_constraint(vec![-1.0, 1.0], Eq, 0.0)
            .with_constraint(vec![1.0, 1.0], Le, 4.0);

        let solution = solver().solve(&problem).unwrap();

        assert!(
            solution.messages.iter().any(|m| m == "a1 stays basic at zero and is replaced by x1."),
            "{:?}",
            solution.messages
        );
        assert!(solution.messages.iter().any(|m| m.starts_with("Constraint 2 is redundant")));
        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert!(problem.is_feasible(&solution.coordinates, 1e-8), "{:?}", solution.coordinates);
        assert!((solution.coordinates[0] - 2.0).abs() < 1e-9, "{:?}", solution.coordinates);
        assert!((solution.coordinates[1] - 2.0).abs() < 1e-9, "{:?}", solution.coordinates);
        assert!((solution.value - 6.0).abs() < 1e-9, "obj = {} (expected 6)", solution.value);
    }

    #[test]
    fn test_degenerate_rows_after_phase_one_stay_feasible() {
        // phase 1 leaves a row whose RHS is -2.2e-16 instead of 0
        let problem = Problem::maximize(vec![0.0, 3.0, 2.0])
            .with_constraint(vec![0.0, 2.0, 1.0], Ge, 3.0)
            .with_constraint(vec![1.0, -2.0, -2.0], Ge, -3.0)
            .with_constraint(vec![1.0, 3.0, 1.0], Ge, 2.0)
            .with_constraint(vec![1.0, 1.0, 1.0], Le, 10.0);

        let solution = solver().solve(&problem).unwrap();

        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert!(problem.is_feasible(&solution.coordinates, 1e-8), "{:?}", solution.coordinates);
        assert!((solution.value - 13.0).abs() < 1e-9, "obj = {} (expected 13)", solution.value);
        assert!(solution.coordinates.iter().all(|&x| x >= 0.0));
        for iteration in solution.iterations.unwrap() {
            let rhs: Vec<f64> = iteration.tableau[..iteration.basis.len()].iter().map(|row| row[row.len() - 1]).collect();
            assert!(rhs.iter().all(|&b| b >= 0.0), "phase {} step {}: {:?}", iteration.phase, iteration.iteration, rhs);
        }
    }

    #[test]
    fn test_repaired_basis_reaches_best_vertex() {
        // max -x1 - 3x3, best vertex (0, 0, 2)
        let problem = Problem::maximize(vec![-1.0, 0.0, -3.0])
            .with_constraint(vec![-3.0, 0.0, 3.0], Le, 6.0)
            .with_constraint(vec![-3.0, -2.0, 1.0], Eq, 2.0)
            .with_constraint(vec![1.0, 1.0, 3.0], Ge, 2.0)
            .with_constraint(vec![1.0, 1.0, 1.0], Le, 10.0);

        let solution = solver().solve(&problem).unwrap();

        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert!(problem.is_feasible(&solution.coordinates, 1e-8), "{:?}", solution.coordinates);
        assert!((solution.value + 6.0).abs() < 1e-9, "obj = {} (expected -6)", solution.value);
    }

    #[test]
    fn test_iteration_cap_in_phase_one() {
        // min x1 + x2 with x1 >= 1, x2 >= 1 needs two phase 1 pivots
        let problem = Problem::minimize(vec![1.0, 1.0])
            .with_constraint(vec![1.0, 0.0], Ge, 1.0)
            .with_constraint(vec![0.0, 1.0], Ge, 1.0);

        let solution = SimplexSolver::new(1, 1e-8).solve(&problem).unwrap();

        assert_eq!(solution.status, SolutionStatus::MaxIterations);
        assert!(!solution.is_valid);
        assert!(solution.failures().any(|m| m.contains("Iteration limit reached in phase 1")));
        assert!(!solution.failures().any(|m| m.contains("Infeasible")));
    }

    #[test]
    fn test_iteration_cap() {
        let problem = Problem::maximize(vec![3.0, 2.0])
            .with_constraint(vec![1.0, 1.0], Le, 4.0)
            .with_constraint(vec![1.0, 0.0], Le, 3.0);

        let solution = SimplexSolver::new(1, 1e-8).solve(&problem).unwrap();

        assert_eq!(solution.status, SolutionStatus::MaxIterations);
        assert!(solution.failures().any(|m| m.contains("Iteration limit")));
    }

    #[test]
    fn test_pivot_snapshots_are_taken_before_pivoting() {
        let problem = Problem::maximize(vec![3.0, 2.0])
            .with_constraint(vec![1.0, 1.0], Le, 4.0)
            .with_constraint(vec![1.0, 0.0], Le, 3.0);

        let solution = solver().solve(&problem).unwrap();
        let iterations = solution.iterations.unwrap();
        let first = &iterations[0];

        assert_eq!(first.iteration, 0);
        assert_eq!(first.pivot, Some(Pivot { row: 1, col: 0 }));
        assert_eq!(first.entering_variable.as_deref(), Some("x1"));
        assert_eq!(first.leaving_variable.as_deref(), Some("s2"));
        assert_eq!(first.ratios, Some(vec![4.0, 3.0]));
        assert_eq!(first.tableau[1], vec![1.0, 0.0, 0.0, 1.0, 3.0]);
        assert_eq!(first.objective_value, 0.0);

        // the next snapshot shows the pivoted tableau
        let second = &iterations[1];
        assert_eq!(second.basis, vec!["s1", "x1"]);
        assert!((second.objective_value - 9.0).abs() < 1e-12);
    }
}
