//! Text helpers shared by the derivation traces.

/// Render a number without trailing zeros (`4`, `5.5`, `0.3333`)
pub fn number(value: f64) -> String {
    let value = if value == 0.0 { 0.0 } else { value };
    if value.fract() == 0.0 {
        return format!("{:.0}", value);
    }
    let text = format!("{:.4}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" { "0".to_string() } else { text.to_string() }
}

/// Render `c1·x1 + c2·x2 + ...` as `2x1 - 3x2 + 0x3`
pub fn expression(coefficients: &[f64], names: &[String]) -> String {
    let mut out = String::new();
    for (i, (&c, name)) in coefficients.iter().zip(names).enumerate() {
        if i == 0 {
            if c < 0.0 {
                out.push('-');
            }
        } else if c < 0.0 {
            out.push_str(" - ");
        } else {
            out.push_str(" + ");
        }
        out.push_str(&number(c.abs()));
        out.push_str(name);
    }
    out
}

/// `x1`, `x2`, ... for `n` decision variables
pub fn decision_names(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("x{}", i)).collect()
}

pub fn point(p: &[f64]) -> String {
    let parts: Vec<String> = p.iter().map(|&v| number(v)).collect();
    format!("({})", parts.join(", "))
}
