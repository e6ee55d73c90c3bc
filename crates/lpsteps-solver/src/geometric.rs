//! The graphical method: enumerate the vertices of the feasible polygon and
//! pick the best one.

use log::info;

use crate::error::SolveError;
use crate::format;
use crate::linalg::{self, dot, intersect_lines};
use crate::problem::Problem;
use crate::solution::{Solution, TableData, failure, success};

/// Points closer than this are the same vertex
const DUPLICATE_TOLERANCE: f64 = 1e-9;
/// Feasibility tolerance for the three-variable polytope
const POLYTOPE_TOLERANCE: f64 = 1e-6;

pub const TABLE_HEADERS: [&str; 5] = ["Constraint", "Line equation", "Point 1", "Point 2", "Point 3"];

/// Vertex-enumeration solver for two decision variables
#[derive(Debug, Clone, Copy)]
pub struct GeometricSolver {
    tolerance: f64,
}

impl GeometricSolver {
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    pub fn solve(&self, problem: &Problem) -> Result<Solution, SolveError> {
        if problem.num_variables() != 2 {
            return Err(SolveError::VariableCount {
                method: "graphical",
                expected: 2,
                found: problem.num_variables(),
            });
        }
        let table_data = derivation_table(problem);
        let mut messages = Vec::new();

        let vertices = self.feasible_vertices(problem);
        if vertices.is_empty() {
            messages.push(failure("Infeasible problem: no point satisfies every constraint and x1, x2 >= 0."));
            info!("graphical method: empty feasible region");
            return Ok(Solution {
                table_data,
                ..Solution::infeasible(messages)
            });
        }
        messages.push(format!(
            "Feasible vertices: {}",
            vertices.iter().map(|v| format::point(v)).collect::<Vec<_>>().join(", ")
        ));

        if let Some(ray) = self.improving_ray(problem) {
            messages.push(failure(format!(
                "Unbounded problem: the objective keeps improving along the direction {}.",
                format::point(&ray)
            )));
            info!("graphical method: unbounded along {:?}", ray);
            return Ok(Solution {
                table_data,
                feasible_region: Some(order_polygon(&vertices)),
                ..Solution::unbounded(messages)
            });
        }

        let values: Vec<f64> = vertices.iter().map(|v| problem.evaluate(v)).collect();
        let mut best = 0;
        for (i, &value) in values.iter().enumerate().skip(1) {
            let better = if problem.is_maximization() {
                value > values[best]
            } else {
                value < values[best]
            };
            if better {
                best = i;
            }
        }
        for (vertex, value) in vertices.iter().zip(&values) {
            messages.push(format!("Z{} = {}", format::point(vertex), format::number(*value)));
        }
        messages.push(success(format!(
            "Optimal vertex {} with Z = {}",
            format::point(&vertices[best]),
            format::number(values[best])
        )));

        Ok(Solution {
            table_data,
            feasible_region: Some(order_polygon(&vertices)),
            messages,
            ..Solution::optimal(vertices[best].to_vec(), values[best])
        })
    }

    /// Every candidate corner that satisfies all constraints, deduplicated,
    /// in discovery order
    pub fn feasible_vertices(&self, problem: &Problem) -> Vec<[f64; 2]> {
        let lines: Vec<([f64; 2], f64)> = problem
            .constraint_coefficients
            .iter()
            .zip(&problem.constraint_values)
            .map(|(a, &b)| ([a[0], a[1]], b))
            .collect();

        let mut candidates = Vec::new();
        for (i, &(a1, b1)) in lines.iter().enumerate() {
            for &(a2, b2) in &lines[i + 1..] {
                if let Some(p) = intersect_lines(a1, b1, a2, b2) {
                    candidates.push(p);
                }
            }
        }
        for &(a, b) in &lines {
            if a[1].abs() > self.tolerance {
                candidates.push([0.0, b / a[1]]);
            }
            if a[0].abs() > self.tolerance {
                candidates.push([b / a[0], 0.0]);
            }
        }
        candidates.push([0.0, 0.0]);

        let mut vertices: Vec<[f64; 2]> = Vec::new();
        for p in candidates {
            if !problem.is_feasible(&p, self.tolerance) {
                continue;
            }
            let duplicate = vertices
                .iter()
                .any(|v| (v[0] - p[0]).abs() < DUPLICATE_TOLERANCE && (v[1] - p[1]).abs() < DUPLICATE_TOLERANCE);
            if !duplicate {
                vertices.push(p);
            }
        }
        vertices
    }

    /// A direction of the region's recession cone along which the objective
    /// improves, if one exists.
    ///
    /// In the first quadrant the cone is pointed, so its extreme rays lie on
    /// an axis or along a constraint line; checking those suffices.
    pub fn improving_ray(&self, problem: &Problem) -> Option<[f64; 2]> {
        let mut rays = vec![[1.0, 0.0], [0.0, 1.0]];
        for a in &problem.constraint_coefficients {
            let norm = a[0].hypot(a[1]);
            if norm > self.tolerance {
                rays.push([a[1] / norm, -a[0] / norm]);
                rays.push([-a[1] / norm, a[0] / norm]);
            }
        }

        rays.into_iter().find(|d| {
            if d[0] < -self.tolerance || d[1] < -self.tolerance {
                return false;
            }
            let recedes = problem
                .constraint_coefficients
                .iter()
                .zip(&problem.constraint_signs)
                .all(|(a, sign)| sign.holds(dot(a, d), 0.0, self.tolerance));
            let rate = problem.evaluate(d);
            let improves = if problem.is_maximization() {
                rate > self.tolerance
            } else {
                rate < -self.tolerance
            };
            recedes && improves
        })
    }
}

/// Sort vertices counter-clockwise by angle around their centroid
pub fn order_polygon(vertices: &[[f64; 2]]) -> Vec<[f64; 2]> {
    if vertices.is_empty() {
        return Vec::new();
    }
    let count = vertices.len() as f64;
    let cx = vertices.iter().map(|v| v[0]).sum::<f64>() / count;
    let cy = vertices.iter().map(|v| v[1]).sum::<f64>() / count;
    let mut ordered = vertices.to_vec();
    ordered.sort_by(|a, b| {
        let angle_a = (a[1] - cy).atan2(a[0] - cx);
        let angle_b = (b[1] - cy).atan2(b[0] - cx);
        angle_a.total_cmp(&angle_b)
    });
    ordered
}

/// One row per constraint with its boundary line and axis intercepts, then
/// the non-negativity row
pub fn derivation_table(problem: &Problem) -> TableData {
    let names = format::decision_names(2);
    let mut rows = Vec::with_capacity(problem.num_constraints() + 1);
    for ((a, sign), &b) in problem
        .constraint_coefficients
        .iter()
        .zip(&problem.constraint_signs)
        .zip(&problem.constraint_values)
    {
        let lhs = format::expression(a, &names);
        let mut row = vec![
            format!("{} {} {}", lhs, sign, format::number(b)),
            format!("{} = {}", lhs, format::number(b)),
        ];
        if a[0] != 0.0 && b / a[0] >= 0.0 {
            row.push(format::point(&[b / a[0], 0.0]));
        }
        if a[1] != 0.0 && b / a[1] >= 0.0 {
            row.push(format::point(&[0.0, b / a[1]]));
        }
        row.resize(TABLE_HEADERS.len(), "-".to_string());
        rows.push(row);
    }
    rows.push(vec![
        "x1, x2 >= 0".to_string(),
        "x1 = 0, x2 = 0".to_string(),
        "(0, 0)".to_string(),
        "-".to_string(),
        "-".to_string(),
    ]);
    TableData {
        headers: TABLE_HEADERS.iter().map(|h| h.to_string()).collect(),
        rows,
    }
}

/// Vertices of the feasible polytope of a three-variable problem.
///
/// Every triple of boundary planes (constraints and coordinate planes) is
/// intersected; feasible points are kept once each.
pub fn polytope_vertices_3d(problem: &Problem) -> Vec<[f64; 3]> {
    if problem.num_variables() != 3 {
        return Vec::new();
    }
    let mut planes: Vec<([f64; 3], f64)> = problem
        .constraint_coefficients
        .iter()
        .zip(&problem.constraint_values)
        .map(|(a, &b)| ([a[0], a[1], a[2]], b))
        .collect();
    planes.push(([1.0, 0.0, 0.0], 0.0));
    planes.push(([0.0, 1.0, 0.0], 0.0));
    planes.push(([0.0, 0.0, 1.0], 0.0));

    let mut vertices: Vec<[f64; 3]> = Vec::new();
    for i in 0..planes.len() {
        for j in i + 1..planes.len() {
            for k in j + 1..planes.len() {
                let a = [planes[i].0, planes[j].0, planes[k].0];
                let b = [planes[i].1, planes[j].1, planes[k].1];
                let Some(p) = linalg::solve3x3(a, b) else {
                    continue;
                };
                if !problem.is_feasible(&p, POLYTOPE_TOLERANCE) {
                    continue;
                }
                let rounded = p.map(|x| (x * 1e8).round() / 1e8);
                let duplicate = vertices
                    .iter()
                    .any(|v| v.iter().zip(&rounded).all(|(x, y)| (x - y).abs() < POLYTOPE_TOLERANCE));
                if !duplicate {
                    vertices.push(rounded);
                }
            }
        }
    }
    vertices
}
