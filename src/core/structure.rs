use crate::core::error::ParseError;
use nalgebra::{Matrix3, Vector3};

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Lattice vectors stored as the ROWS of a 3x3 matrix, in angstrom.
#[derive(Debug, Clone, PartialEq)]
pub struct Lattice {
    pub matrix: Matrix3<f64>,
}

impl Lattice {
    pub fn new(matrix: Matrix3<f64>) -> Result<Self, ParseError> {
        if matrix.determinant().abs() < 1e-6 {
            return Err(ParseError::DegenerateLattice);
        }
        Ok(Self { matrix })
    }

    pub fn from_rows(rows: [[f64; 3]; 3]) -> Result<Self, ParseError> {
        Self::new(Matrix3::from_fn(|i, j| rows[i][j]))
    }

    /// Builds the lattice from cell lengths (angstrom) and angles (degrees).
    ///
    /// The c vector is aligned with Cartesian z and a lies in the xz-plane, so the
    /// third fractional coordinate is the height above the ab-plane.
    pub fn from_parameters(a: f64, b: f64, c: f64, alpha: f64, beta: f64, gamma: f64) -> Result<Self, ParseError> {
        let (alpha_r, beta_r, gamma_r) = (alpha.to_radians(), beta.to_radians(), gamma.to_radians());

        let term = 1.0 - alpha_r.cos().powi(2) - beta_r.cos().powi(2) - gamma_r.cos().powi(2)
            + 2.0 * alpha_r.cos() * beta_r.cos() * gamma_r.cos();
        if term <= 0.0 {
            return Err(ParseError::DegenerateLattice);
        }

        let cos_gamma_star = ((alpha_r.cos() * beta_r.cos() - gamma_r.cos())
            / (alpha_r.sin() * beta_r.sin()))
            .clamp(-1.0, 1.0);
        let gamma_star = cos_gamma_star.acos();

        let matrix = Matrix3::new(
            a * beta_r.sin(), 0.0, a * beta_r.cos(),
            -b * alpha_r.sin() * gamma_star.cos(), b * alpha_r.sin() * gamma_star.sin(), b * alpha_r.cos(),
            0.0, 0.0, c,
        );
        Self::new(matrix)
    }

    pub fn rows(&self) -> [[f64; 3]; 3] {
        let m = &self.matrix;
        [
            [m[(0, 0)], m[(0, 1)], m[(0, 2)]],
            [m[(1, 0)], m[(1, 1)], m[(1, 2)]],
            [m[(2, 0)], m[(2, 1)], m[(2, 2)]],
        ]
    }

    pub fn volume(&self) -> f64 {
        self.matrix.determinant().abs()
    }

    pub fn to_fractional(&self, cart: &Vector3<f64>) -> Option<Vector3<f64>> {
        self.matrix.transpose().try_inverse().map(|inv| inv * cart)
    }

    pub fn to_parameters(&self) -> (f64, f64, f64, f64, f64, f64) {
        let (va, vb, vc) = (self.matrix.row(0), self.matrix.row(1), self.matrix.row(2));
        let (a, b, c) = (va.norm(), vb.norm(), vc.norm());
        let alpha = (vb.dot(&vc) / (b * c)).acos().to_degrees();
        let beta = (va.dot(&vc) / (a * c)).acos().to_degrees();
        let gamma = (va.dot(&vb) / (a * b)).acos().to_degrees();
        (a, b, c, alpha, beta, gamma)
    }
}

/// A single site: the label as it appears in the source file plus its
/// fractional position.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// Element symbol, possibly carrying an oxidation or site suffix (`Fe2+`, `O1`).
    pub label: String,
    pub fractional_coords: Vector3<f64>,
}

impl Atom {
    pub fn new(label: impl Into<String>, x: f64, y: f64, z: f64) -> Self {
        Self {
            label: label.into(),
            fractional_coords: Vector3::new(x, y, z),
        }
    }

    /// Height along the third lattice vector, in fractional units.
    pub fn height(&self) -> f64 {
        self.fractional_coords.z
    }
}

/// Lattice plus atoms, built once by a structure parser and read by every
/// later stage.
#[derive(Debug, Clone, PartialEq)]
pub struct StructureDescriptor {
    pub lattice: Lattice,
    pub atoms: Vec<Atom>,
}

impl StructureDescriptor {
    pub fn new(lattice: Lattice, atoms: Vec<Atom>) -> Result<Self, ParseError> {
        if atoms.is_empty() {
            return Err(ParseError::NoAtoms);
        }
        Ok(Self { lattice, atoms })
    }

    pub fn nat(&self) -> usize {
        self.atoms.len()
    }
}
