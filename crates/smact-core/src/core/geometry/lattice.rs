use super::GeometryError;
use nalgebra::{Matrix3, Point3, Vector3};

/// A crystal lattice, stored as the matrix whose columns are the lattice vectors in Å.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lattice {
    matrix: Matrix3<f64>,
}

impl Lattice {
    /// Builds a lattice from cell lengths (Å) and angles (degrees).
    ///
    /// Uses the standard orientation: **a** along x, **b** in the xy plane.
    pub fn from_parameters(
        a: f64,
        b: f64,
        c: f64,
        alpha: f64,
        beta: f64,
        gamma: f64,
    ) -> Result<Self, GeometryError> {
        if [a, b, c].iter().any(|&l| !(l.is_finite() && l > 0.0)) {
            return Err(GeometryError::InvalidCell(format!(
                "cell lengths must be positive, got ({a}, {b}, {c})"
            )));
        }
        if [alpha, beta, gamma]
            .iter()
            .any(|&angle| !(angle.is_finite() && angle > 0.0 && angle < 180.0))
        {
            return Err(GeometryError::InvalidCell(format!(
                "cell angles must lie strictly between 0 and 180 degrees, got ({alpha}, {beta}, {gamma})"
            )));
        }

        let (cos_a, cos_b) = (alpha.to_radians().cos(), beta.to_radians().cos());
        let (sin_g, cos_g) = gamma.to_radians().sin_cos();
        let cy = (cos_a - cos_b * cos_g) / sin_g;
        let cz_sq = 1.0 - cos_b * cos_b - cy * cy;
        if cz_sq <= 0.0 {
            return Err(GeometryError::InvalidCell(format!(
                "angles ({alpha}, {beta}, {gamma}) do not describe a cell with positive volume"
            )));
        }

        let va = Vector3::new(a, 0.0, 0.0);
        let vb = Vector3::new(b * cos_g, b * sin_g, 0.0);
        let vc = Vector3::new(c * cos_b, c * cy, c * cz_sq.sqrt());
        Ok(Self {
            matrix: Matrix3::from_columns(&[va, vb, vc]),
        })
    }

    /// Builds a lattice from a `[a, b, c, alpha, beta, gamma]` parameter array.
    pub fn from_cell(cell: [f64; 6]) -> Result<Self, GeometryError> {
        let [a, b, c, alpha, beta, gamma] = cell;
        Self::from_parameters(a, b, c, alpha, beta, gamma)
    }

    pub fn cubic(a: f64) -> Result<Self, GeometryError> {
        Self::from_parameters(a, a, a, 90.0, 90.0, 90.0)
    }

    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.matrix
    }

    pub fn vectors(&self) -> [Vector3<f64>; 3] {
        [
            self.matrix.column(0).into_owned(),
            self.matrix.column(1).into_owned(),
            self.matrix.column(2).into_owned(),
        ]
    }

    pub fn volume(&self) -> f64 {
        self.matrix.determinant().abs()
    }

    #[inline]
    pub fn to_cartesian(&self, fractional: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.matrix * fractional.coords)
    }

    /// The lattice of an `na × nb × nc` supercell.
    pub fn scaled(&self, repetitions: [u32; 3]) -> Self {
        let [na, nb, nc] = repetitions.map(f64::from);
        let mut matrix = self.matrix;
        matrix.column_mut(0).scale_mut(na);
        matrix.column_mut(1).scale_mut(nb);
        matrix.column_mut(2).scale_mut(nc);
        Self { matrix }
    }
}
