//! Small dense linear algebra used by the geometric method.

/// Determinant magnitude below which a system is treated as singular
pub const SINGULAR_TOLERANCE: f64 = 1e-8;

pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

pub fn det2(a: [[f64; 2]; 2]) -> f64 {
    a[0][0] * a[1][1] - a[1][0] * a[0][1]
}

pub fn det3(a: [[f64; 3]; 3]) -> f64 {
    a[0][0] * (a[1][1] * a[2][2] - a[1][2] * a[2][1])
        - a[0][1] * (a[1][0] * a[2][2] - a[1][2] * a[2][0])
        + a[0][2] * (a[1][0] * a[2][1] - a[1][1] * a[2][0])
}

/// Intersection of the lines `a1 · p = b1` and `a2 · p = b2`.
///
/// Returns `None` for parallel (or coincident) lines.
pub fn intersect_lines(a1: [f64; 2], b1: f64, a2: [f64; 2], b2: f64) -> Option<[f64; 2]> {
    let det = det2([a1, a2]);
    if det.abs() < SINGULAR_TOLERANCE {
        return None;
    }
    let x = (b1 * a2[1] - b2 * a1[1]) / det;
    let y = (a1[0] * b2 - a2[0] * b1) / det;
    Some([x, y])
}

/// Solve the 3×3 system `a · p = b` by Cramer's rule
pub fn solve3x3(a: [[f64; 3]; 3], b: [f64; 3]) -> Option<[f64; 3]> {
    let det = det3(a);
    if det.abs() < SINGULAR_TOLERANCE {
        return None;
    }
    let mut solution = [0.0; 3];
    for (col, value) in solution.iter_mut().enumerate() {
        let mut replaced = a;
        for row in 0..3 {
            replaced[row][col] = b[row];
        }
        *value = det3(replaced) / det;
    }
    Some(solution)
}
