use crate::format;
use crate::problem::ConstraintSign;

/// Standard form of a problem, ready for the simplex tableau
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalForm {
    /// Objective extended with zeros for every added variable (always maximized)
    pub objective_function: Vec<f64>,
    /// Constraint rows including slack, surplus and artificial columns
    pub constraint_matrix: Vec<Vec<f64>>,
    pub right_hand_side: Vec<f64>,
    /// `x1..xn`, then `s_k`, `e_k`, `a_k` in order of introduction
    pub variable_names: Vec<String>,
    /// Initial basic variable of each row
    pub basis_variables: Vec<String>,
    pub explanation: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    Decision,
    Slack,
    Surplus,
    Artificial,
}

impl VariableKind {
    /// Classify a column by its name prefix
    pub fn of(name: &str) -> Self {
        match name.chars().next() {
            Some('s') => VariableKind::Slack,
            Some('e') => VariableKind::Surplus,
            Some('a') => VariableKind::Artificial,
            _ => VariableKind::Decision,
        }
    }
}

pub fn is_artificial(name: &str) -> bool {
    VariableKind::of(name) == VariableKind::Artificial
}

impl CanonicalForm {
    /// Convert a problem into standard form.
    ///
    /// Minimization is turned into maximization by negating the objective.
    /// A row with a negative right-hand side is multiplied by -1 first so
    /// the initial basis stays feasible.
    pub fn new(
        objective: &[f64],
        rows: &[Vec<f64>],
        signs: &[ConstraintSign],
        values: &[f64],
        maximize: bool,
    ) -> Self {
        let n = objective.len();
        let decision = format::decision_names(n);
        let internal: Vec<f64> = if maximize {
            objective.to_vec()
        } else {
            objective.iter().map(|c| -c).collect()
        };

        let mut explanation = vec!["Conversion to canonical form:".to_string()];
        if maximize {
            explanation.push(format!(
                "Objective function: MAX Z = {}",
                format::expression(objective, &decision)
            ));
        } else {
            explanation.push(format!(
                "Objective function: MIN Z = {}, solved as MAX -Z = {}",
                format::expression(objective, &decision),
                format::expression(&internal, &decision)
            ));
        }
        explanation.push("Constraints:".to_string());

        let mut matrix: Vec<Vec<f64>> = Vec::with_capacity(rows.len());
        let mut rhs = Vec::with_capacity(rows.len());
        let mut normalized_signs = Vec::with_capacity(rows.len());
        for ((row, &sign), &value) in rows.iter().zip(signs).zip(values) {
            let restated = format!(
                "  {} {} {}",
                format::expression(row, &decision),
                sign,
                format::number(value)
            );
            if value < 0.0 {
                let flipped: Vec<f64> = row.iter().map(|c| -c).collect();
                explanation.push(format!(
                    "{}  (multiplied by -1: {} {} {})",
                    restated,
                    format::expression(&flipped, &decision),
                    sign.reversed(),
                    format::number(-value)
                ));
                matrix.push(flipped);
                rhs.push(-value);
                normalized_signs.push(sign.reversed());
            } else {
                explanation.push(restated);
                matrix.push(row.clone());
                rhs.push(value);
                normalized_signs.push(sign);
            }
        }

        let mut variable_names = decision;
        let mut basis_variables = Vec::with_capacity(rows.len());
        let mut slack = Vec::new();
        let mut surplus = Vec::new();
        let mut artificial = Vec::new();

        for (i, sign) in normalized_signs.iter().enumerate() {
            match sign {
                ConstraintSign::Le => {
                    let name = format!("s{}", slack.len() + 1);
                    push_column(&mut matrix, i, 1.0);
                    variable_names.push(name.clone());
                    basis_variables.push(name.clone());
                    slack.push(name);
                }
                ConstraintSign::Ge => {
                    let surplus_name = format!("e{}", surplus.len() + 1);
                    push_column(&mut matrix, i, -1.0);
                    variable_names.push(surplus_name.clone());
                    surplus.push(surplus_name);

                    let artificial_name = format!("a{}", artificial.len() + 1);
                    push_column(&mut matrix, i, 1.0);
                    variable_names.push(artificial_name.clone());
                    basis_variables.push(artificial_name.clone());
                    artificial.push(artificial_name);
                }
                ConstraintSign::Eq => {
                    let name = format!("a{}", artificial.len() + 1);
                    push_column(&mut matrix, i, 1.0);
                    variable_names.push(name.clone());
                    basis_variables.push(name.clone());
                    artificial.push(name);
                }
            }
        }

        let mut objective_function = internal;
        objective_function.resize(variable_names.len(), 0.0);

        explanation.push("Added variables:".to_string());
        explanation.push(format!("  Slack variables: {}", list_or_none(&slack)));
        explanation.push(format!("  Surplus variables: {}", list_or_none(&surplus)));
        explanation.push(format!("  Artificial variables: {}", list_or_none(&artificial)));

        Self {
            objective_function,
            constraint_matrix: matrix,
            right_hand_side: rhs,
            variable_names,
            basis_variables,
            explanation,
        }
    }

    /// Number of columns appended to the decision variables
    pub fn added_columns(&self, num_decision: usize) -> usize {
        self.variable_names.len() - num_decision
    }

    pub fn artificial_indexes(&self) -> Vec<usize> {
        self.variable_names
            .iter()
            .enumerate()
            .filter(|(_, name)| is_artificial(name))
            .map(|(j, _)| j)
            .collect()
    }

    pub fn count(&self, kind: VariableKind) -> usize {
        self.variable_names.iter().filter(|name| VariableKind::of(name) == kind).count()
    }
}

/// Append a column that is `value` in `row` and zero elsewhere
fn push_column(matrix: &mut [Vec<f64>], row: usize, value: f64) {
    for (r, coefficients) in matrix.iter_mut().enumerate() {
        coefficients.push(if r == row { value } else { 0.0 });
    }
}

fn list_or_none(names: &[String]) -> String {
    if names.is_empty() {
        "none".to_string()
    } else {
        names.join(", ")
    }
}
