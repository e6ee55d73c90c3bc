use crate::error::SolveError;
use crate::solution::{Pivot, SimplexIteration};

/// Dense simplex tableau.
///
/// `grid` holds the m constraint rows, then the Cj row, then the Δj row.
/// Every row has one column per variable plus a trailing RHS column.
#[derive(Debug, Clone)]
pub struct Tableau {
    grid: Vec<Vec<f64>>,
    variable_names: Vec<String>,
    basis: Vec<String>,
    basis_coefficients: Vec<f64>,
    objective: Vec<f64>,
}

/// What a snapshot records about the step it was taken at
#[derive(Debug, Clone, Default)]
pub struct Step {
    pub pivot: Option<Pivot>,
    pub ratios: Option<Vec<f64>>,
    pub entering: Option<String>,
    pub leaving: Option<String>,
    pub is_optimal: bool,
}

impl Tableau {
    pub fn new(
        matrix: &[Vec<f64>],
        rhs: &[f64],
        objective: &[f64],
        variable_names: &[String],
        basis: &[String],
    ) -> Result<Self, SolveError> {
        let n = variable_names.len();
        if objective.len() != n {
            return Err(SolveError::ConstraintCount {
                what: "objective coefficients",
                expected: n,
                found: objective.len(),
            });
        }
        if rhs.len() != matrix.len() || basis.len() != matrix.len() {
            return Err(SolveError::ConstraintCount {
                what: "right-hand sides and basis variables",
                expected: matrix.len(),
                found: rhs.len().min(basis.len()),
            });
        }

        let mut grid = Vec::with_capacity(matrix.len() + 2);
        for (row, (coefficients, &b)) in matrix.iter().zip(rhs).enumerate() {
            if coefficients.len() != n {
                return Err(SolveError::RowLength {
                    row,
                    expected: n,
                    found: coefficients.len(),
                });
            }
            let mut r = coefficients.clone();
            r.push(b);
            grid.push(r);
        }
        grid.push(vec![0.0; n + 1]);
        grid.push(vec![0.0; n + 1]);

        let mut tableau = Self {
            grid,
            variable_names: variable_names.to_vec(),
            basis: basis.to_vec(),
            basis_coefficients: vec![0.0; basis.len()],
            objective: Vec::new(),
        };
        for name in basis {
            if tableau.column_index(name).is_none() {
                return Err(SolveError::UnknownBasisVariable(name.clone()));
            }
        }
        tableau.install_objective(objective)?;
        Ok(tableau)
    }

    /// Number of constraint rows
    pub fn num_rows(&self) -> usize {
        self.grid.len() - 2
    }

    /// Number of variable columns, excluding the RHS
    pub fn num_columns(&self) -> usize {
        self.variable_names.len()
    }

    fn rhs_col(&self) -> usize {
        self.num_columns()
    }

    fn cj_index(&self) -> usize {
        self.grid.len() - 2
    }

    fn delta_index(&self) -> usize {
        self.grid.len() - 1
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.grid[row][col]
    }

    pub fn rhs(&self, row: usize) -> f64 {
        self.grid[row][self.rhs_col()]
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.grid
    }

    pub fn delta_j(&self) -> &[f64] {
        &self.grid[self.delta_index()]
    }

    pub fn variable_names(&self) -> &[String] {
        &self.variable_names
    }

    pub fn basis(&self) -> &[String] {
        &self.basis
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.variable_names.iter().position(|v| v == name)
    }

    /// Replace the objective and price it against the current basis.
    ///
    /// Δj = Cj - Σ cB_i · a_ij, and the RHS cell of Δj is -Σ cB_i · b_i,
    /// i.e. minus the objective value of the current basic solution.
    pub fn install_objective(&mut self, objective: &[f64]) -> Result<(), SolveError> {
        if objective.len() != self.num_columns() {
            return Err(SolveError::ConstraintCount {
                what: "objective coefficients",
                expected: self.num_columns(),
                found: objective.len(),
            });
        }
        self.objective = objective.to_vec();

        let mut coefficients = Vec::with_capacity(self.basis.len());
        for name in &self.basis {
            let col = self
                .column_index(name)
                .ok_or_else(|| SolveError::UnknownBasisVariable(name.clone()))?;
            coefficients.push(objective[col]);
        }
        self.basis_coefficients = coefficients;

        let mut cj = objective.to_vec();
        cj.push(0.0);
        let mut delta = cj.clone();
        for (row, &cb) in self.basis_coefficients.iter().enumerate() {
            if cb == 0.0 {
                continue;
            }
            for (d, &a) in delta.iter_mut().zip(&self.grid[row]) {
                *d -= cb * a;
            }
        }
        let cj_index = self.cj_index();
        let delta_index = self.delta_index();
        self.grid[cj_index] = cj;
        self.grid[delta_index] = delta;
        Ok(())
    }

    /// Column with the largest reduced cost above `eps`, if any
    pub fn entering_column(&self, eps: f64) -> Option<usize> {
        let delta = self.delta_j();
        let mut best = 0.0;
        let mut entering = None;
        for (j, &value) in delta[..self.num_columns()].iter().enumerate() {
            if value > best + eps {
                best = value;
                entering = Some(j);
            }
        }
        entering
    }

    /// Minimum ratio test on column `col`.
    ///
    /// Returns the ratio of every row (+∞ or -1 where the entry is not
    /// positive) and the row with the smallest non-negative ratio. A RHS
    /// within `eps` of zero counts as zero.
    pub fn ratio_test(&self, col: usize, eps: f64) -> (Vec<f64>, Option<usize>) {
        let mut ratios = Vec::with_capacity(self.num_rows());
        let mut min_ratio = f64::INFINITY;
        let mut leaving = None;
        for i in 0..self.num_rows() {
            let entry = self.grid[i][col];
            let rhs = if self.rhs(i).abs() <= eps { 0.0 } else { self.rhs(i) };
            if entry > eps {
                let ratio = rhs / entry;
                ratios.push(ratio);
                if ratio >= 0.0 && ratio < min_ratio {
                    min_ratio = ratio;
                    leaving = Some(i);
                }
            } else {
                ratios.push(if rhs >= 0.0 { f64::INFINITY } else { -1.0 });
            }
        }
        (ratios, leaving)
    }

    /// Pivot on `(row, col)`: normalize the pivot row and clear the column
    /// from every other row, Cj and Δj included.
    ///
    /// Constraint RHS cells that end up within `eps` of zero are set to
    /// exactly zero so a degenerate row keeps a non-negative ratio.
    pub fn pivot(&mut self, row: usize, col: usize, eps: f64) {
        let pivot_value = self.grid[row][col];
        for value in self.grid[row].iter_mut() {
            *value /= pivot_value;
        }
        self.grid[row][col] = 1.0;

        let pivot_row = self.grid[row].clone();
        for (i, r) in self.grid.iter_mut().enumerate() {
            if i == row {
                continue;
            }
            let factor = r[col];
            if factor == 0.0 {
                continue;
            }
            for (value, &p) in r.iter_mut().zip(&pivot_row) {
                *value -= factor * p;
            }
            r[col] = 0.0;
        }
        let rhs_col = self.rhs_col();
        let num_rows = self.num_rows();
        for r in self.grid.iter_mut().take(num_rows) {
            if r[rhs_col].abs() < eps {
                r[rhs_col] = 0.0;
            }
        }

        self.basis[row] = self.variable_names[col].clone();
        self.basis_coefficients[row] = self.objective[col];
    }

    /// Objective value of the current basic solution
    pub fn objective_value(&self) -> f64 {
        -self.grid[self.delta_index()][self.rhs_col()]
    }

    /// Value of every variable in the current basic solution
    pub fn solution_vector(&self) -> Vec<f64> {
        let mut values = vec![0.0; self.num_columns()];
        for (row, name) in self.basis.iter().enumerate() {
            if let Some(col) = self.column_index(name) {
                values[col] = self.rhs(row);
            }
        }
        values
    }

    /// Remove every column whose name matches `drop`
    pub fn drop_columns(&mut self, drop: impl Fn(&str) -> bool) {
        let keep: Vec<usize> = (0..self.num_columns())
            .filter(|&j| !drop(&self.variable_names[j]))
            .chain(std::iter::once(self.rhs_col()))
            .collect();
        for row in self.grid.iter_mut() {
            *row = keep.iter().map(|&j| row[j]).collect();
        }
        let kept_vars = &keep[..keep.len() - 1];
        self.variable_names = kept_vars.iter().map(|&j| self.variable_names[j].clone()).collect();
        self.objective = kept_vars.iter().map(|&j| self.objective[j]).collect();
    }

    /// Remove constraint row `row` along with its basis entry
    pub fn remove_row(&mut self, row: usize) {
        self.grid.remove(row);
        self.basis.remove(row);
        self.basis_coefficients.remove(row);
    }

    /// Deep copy of the current state for the iteration log
    pub fn snapshot(&self, iteration: usize, phase: u8, step: Step) -> SimplexIteration {
        let mut cj_row = self.objective.clone();
        cj_row.push(0.0);
        SimplexIteration {
            iteration,
            phase,
            tableau: self.grid.clone(),
            basis: self.basis.clone(),
            basis_coefficients: self.basis_coefficients.clone(),
            pivot: step.pivot,
            ratios: step.ratios,
            entering_variable: step.entering,
            leaving_variable: step.leaving,
            is_optimal: step.is_optimal,
            objective_value: self.objective_value(),
            cj_row,
            delta_j_row: self.delta_j().to_vec(),
            variable_names: self.variable_names.clone(),
        }
    }
}
