use crate::canonical::CanonicalForm;

/// Marker prefixed to messages describing a successful step
pub const SUCCESS_MARK: &str = "✓";
/// Marker prefixed to messages describing a failure
pub const FAILURE_MARK: &str = "✗";

/// The result of solving an LP problem, with everything needed to show how
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// True only when an optimum was found
    pub is_valid: bool,
    pub status: SolutionStatus,
    /// Decision variable values; empty on failure
    pub coordinates: Vec<f64>,
    /// Objective value at `coordinates`
    pub value: f64,
    pub table_data: TableData,
    /// Simplex only
    pub iterations: Option<Vec<SimplexIteration>>,
    /// Simplex only
    pub canonical_form: Option<CanonicalForm>,
    /// Graphical method only: polygon vertices in counter-clockwise order
    pub feasible_region: Option<Vec<[f64; 2]>>,
    /// Vertices of the feasible polytope for three-variable problems
    pub polytope_vertices: Option<Vec<[f64; 3]>>,
    /// Constraints saturated at the optimum
    pub active_constraints: Vec<usize>,
    /// Ordered log of pedagogical and diagnostic lines
    pub messages: Vec<String>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionStatus {
    /// An optimal solution was found
    Optimal,
    /// No point satisfies every constraint
    Infeasible,
    /// The objective improves without bound
    Unbounded,
    /// The iteration cap was hit, probably cycling on a degenerate vertex
    MaxIterations,
    /// The input could not be solved at all
    Error,
}

/// Headers and rows of the derivation table
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableData {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pivot {
    pub row: usize,
    pub col: usize,
}

/// Snapshot of the tableau at one step of a simplex phase
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Clone, PartialEq)]
pub struct SimplexIteration {
    /// Step number within its phase, starting at 0
    pub iteration: usize,
    pub phase: u8,
    /// Constraint rows, Cj row and Δj row, each ending with the RHS column
    pub tableau: Vec<Vec<f64>>,
    pub basis: Vec<String>,
    pub basis_coefficients: Vec<f64>,
    /// Pivot chosen at this step, if any
    pub pivot: Option<Pivot>,
    /// Ratio test results per constraint row
    #[cfg_attr(feature = "serde", serde(default, with = "ratio_serde"))]
    pub ratios: Option<Vec<f64>>,
    pub entering_variable: Option<String>,
    pub leaving_variable: Option<String>,
    pub is_optimal: bool,
    pub objective_value: f64,
    /// Objective coefficients of the phase, padded with the RHS slot
    pub cj_row: Vec<f64>,
    /// Reduced costs, last cell holds minus the objective value
    pub delta_j_row: Vec<f64>,
    pub variable_names: Vec<String>,
}

impl SolutionStatus {
    pub fn describe(self) -> &'static str {
        match self {
            SolutionStatus::Optimal => "optimal",
            SolutionStatus::Infeasible => "infeasible",
            SolutionStatus::Unbounded => "unbounded",
            SolutionStatus::MaxIterations => "iteration limit reached",
            SolutionStatus::Error => "error",
        }
    }
}

impl Solution {
    /// An optimal solution; the caller fills the method-specific fields
    pub fn optimal(coordinates: Vec<f64>, value: f64) -> Self {
        Self {
            is_valid: true,
            status: SolutionStatus::Optimal,
            coordinates,
            value,
            table_data: TableData::default(),
            iterations: None,
            canonical_form: None,
            feasible_region: None,
            polytope_vertices: None,
            active_constraints: Vec::new(),
            messages: Vec::new(),
        }
    }

    /// A failed solve carrying no coordinates
    pub fn failed(status: SolutionStatus, messages: Vec<String>) -> Self {
        Self {
            is_valid: false,
            status,
            coordinates: Vec::new(),
            value: 0.0,
            table_data: TableData::default(),
            iterations: None,
            canonical_form: None,
            feasible_region: None,
            polytope_vertices: None,
            active_constraints: Vec::new(),
            messages,
        }
    }

    pub fn infeasible(messages: Vec<String>) -> Self {
        Self::failed(SolutionStatus::Infeasible, messages)
    }

    pub fn unbounded(messages: Vec<String>) -> Self {
        Self::failed(SolutionStatus::Unbounded, messages)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::failed(SolutionStatus::Error, vec![failure(message)])
    }

    /// Messages flagged as failures
    pub fn failures(&self) -> impl Iterator<Item = &str> {
        self.messages
            .iter()
            .map(String::as_str)
            .filter(|m| m.starts_with(FAILURE_MARK))
    }
}

pub(crate) fn success(message: impl Into<String>) -> String {
    format!("{} {}", SUCCESS_MARK, message.into())
}

pub(crate) fn failure(message: impl Into<String>) -> String {
    format!("{} {}", FAILURE_MARK, message.into())
}

/// JSON has no infinity, so unbounded ratios travel as `"inf"`
#[cfg(feature = "serde")]
mod ratio_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    #[serde(untagged)]
    enum Ratio {
        Finite(f64),
        Named(String),
    }

    pub fn serialize<S: Serializer>(ratios: &Option<Vec<f64>>, serializer: S) -> Result<S::Ok, S::Error> {
        let encoded: Option<Vec<Ratio>> = ratios.as_ref().map(|ratios| {
            ratios
                .iter()
                .map(|&r| {
                    if r.is_finite() {
                        Ratio::Finite(r)
                    } else if r > 0.0 {
                        Ratio::Named("inf".to_string())
                    } else {
                        Ratio::Named("-inf".to_string())
                    }
                })
                .collect()
        });
        encoded.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec<f64>>, D::Error> {
        let encoded = Option::<Vec<Ratio>>::deserialize(deserializer)?;
        encoded
            .map(|ratios| {
                ratios
                    .into_iter()
                    .map(|r| match r {
                        Ratio::Finite(r) => Ok(r),
                        Ratio::Named(name) => match name.as_str() {
                            "inf" => Ok(f64::INFINITY),
                            "-inf" => Ok(f64::NEG_INFINITY),
                            other => Err(serde::de::Error::custom(format!("invalid ratio: {}", other))),
                        },
                    })
                    .collect()
            })
            .transpose()
    }
}
