//! WASM bindings for lpsteps
//!
//! Accepts the problem object of the web form and returns the full solution
//! (trace included) as a plain JavaScript object.

use wasm_bindgen::prelude::*;

use crate::problem::{Method, Problem};
use crate::solver::Solver;

/// Solve a problem; `method` is `graphical`, `simplex` or `general`, or
/// omitted for the default
#[wasm_bindgen(js_name = solveLpProblem)]
pub fn solve_lp_problem(problem: JsValue, method: Option<String>) -> Result<JsValue, JsValue> {
    let problem: Problem =
        serde_wasm_bindgen::from_value(problem).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let method = method
        .map(|m| m.parse::<Method>())
        .transpose()
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    let solution = Solver::new().solve(&problem, method);
    serde_wasm_bindgen::to_value(&solution).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// The default problem of the input form
#[wasm_bindgen(js_name = classroomExample)]
pub fn classroom_example() -> JsValue {
    serde_wasm_bindgen::to_value(&Problem::classroom_example()).unwrap_or(JsValue::NULL)
}
