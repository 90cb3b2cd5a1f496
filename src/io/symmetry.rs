use crate::core::error::ParseError;
use nalgebra::{Matrix3, Vector3};

/// Tolerance (fractional units) under which two generated sites are the same.
pub const DUPLICATE_TOLERANCE: f64 = 1e-3;

/// A space-group operation `r -> R r + t` in fractional coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct SymmetryOperation {
    pub rotation: Matrix3<f64>,
    pub translation: Vector3<f64>,
}

impl SymmetryOperation {
    pub fn identity() -> Self {
        Self {
            rotation: Matrix3::identity(),
            translation: Vector3::zeros(),
        }
    }

    /// Parses a Jones-faithful triplet such as `-x+1/2, y, z-1/4` or `x-y,x,z`.
    pub fn parse(op: &str) -> Result<Self, ParseError> {
        let parts: Vec<&str> = op.split(',').collect();
        if parts.len() != 3 {
            return Err(ParseError::Malformed(format!("symmetry operation '{}'", op)));
        }

        let mut rotation = Matrix3::zeros();
        let mut translation = Vector3::zeros();
        for (row, expr) in parts.iter().enumerate() {
            let (coeffs, shift) = parse_component(expr)
                .ok_or_else(|| ParseError::Malformed(format!("symmetry operation '{}'", op)))?;
            for (col, c) in coeffs.iter().enumerate() {
                rotation[(row, col)] = *c;
            }
            translation[row] = shift;
        }
        Ok(Self { rotation, translation })
    }

    pub fn apply(&self, frac: &Vector3<f64>) -> Vector3<f64> {
        self.rotation * frac + self.translation
    }
}

/// Splits one component (`-x+1/2`) into its x/y/z coefficients and constant shift.
fn parse_component(expr: &str) -> Option<([f64; 3], f64)> {
    let s: String = expr.chars().filter(|c| !c.is_whitespace()).collect::<String>().to_lowercase();
    if s.is_empty() {
        return None;
    }

    let mut coeffs = [0.0; 3];
    let mut shift = 0.0;

    let mut terms = Vec::new();
    let mut current = String::new();
    for c in s.chars() {
        if (c == '+' || c == '-') && !current.is_empty() {
            terms.push(std::mem::take(&mut current));
        }
        current.push(c);
    }
    terms.push(current);

    for term in terms {
        let (sign, body) = match term.strip_prefix('-') {
            Some(rest) => (-1.0, rest),
            None => (1.0, term.strip_prefix('+').unwrap_or(term.as_str())),
        };

        match body.find(&['x', 'y', 'z'][..]) {
            Some(idx) => {
                let axis = match &body[idx..] {
                    "x" => 0,
                    "y" => 1,
                    "z" => 2,
                    _ => return None,
                };
                let factor = match body[..idx].trim_end_matches('*') {
                    "" => 1.0,
                    f => parse_number(f)?,
                };
                coeffs[axis] += sign * factor;
            }
            None => shift += sign * parse_number(body)?,
        }
    }
    Some((coeffs, shift))
}

fn parse_number(s: &str) -> Option<f64> {
    match s.split_once('/') {
        Some((num, den)) => {
            let (num, den) = (num.parse::<f64>().ok()?, den.parse::<f64>().ok()?);
            if den == 0.0 { None } else { Some(num / den) }
        }
        None => s.parse().ok(),
    }
}

/// Wraps each component into [0, 1).
pub fn wrap_fractional(v: &Vector3<f64>) -> Vector3<f64> {
    v.map(|c| {
        let w = c.rem_euclid(1.0);
        // tiny negatives round up to 1.0; -0.0 would print with a sign
        if w >= 1.0 { 0.0 } else { w + 0.0 }
    })
}

fn is_same_site(a: &Vector3<f64>, b: &Vector3<f64>) -> bool {
    let d = a - b;
    d.iter().all(|c| (c - c.round()).abs() < DUPLICATE_TOLERANCE)
}

/// Applies every operation to every asymmetric-unit site.
///
/// Images are wrapped into the unit cell and dropped when they coincide with a
/// site generated earlier. Order: site order first, then operation order.
pub fn expand_sites(
    sites: &[(String, Vector3<f64>)],
    operations: &[SymmetryOperation],
) -> Vec<(String, Vector3<f64>)> {
    let mut expanded: Vec<(String, Vector3<f64>)> = Vec::new();
    for (label, position) in sites {
        for op in operations {
            let image = wrap_fractional(&op.apply(position));
            if !expanded.iter().any(|(_, p)| is_same_site(p, &image)) {
                expanded.push((label.clone(), image));
            }
        }
    }
    expanded
}
