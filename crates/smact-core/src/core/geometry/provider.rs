use super::lattice::Lattice;
use nalgebra::Point3;

/// Source of atomic positions for the structure builder.
///
/// Positions are indexed `0..site_count()`; the builder places the `i`-th expanded site of a
/// composition or pattern at `fractional_coordinate(i)`.
pub trait GeometryTemplate {
    fn lattice(&self) -> &Lattice;

    fn site_count(&self) -> usize;

    fn fractional_coordinate(&self, index: usize) -> Option<Point3<f64>>;
}

/// A lattice together with an explicit list of fractional coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct ExplicitGeometry {
    lattice: Lattice,
    positions: Vec<Point3<f64>>,
}

impl ExplicitGeometry {
    pub fn new(lattice: Lattice, positions: Vec<Point3<f64>>) -> Self {
        Self { lattice, positions }
    }

    pub fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }
}

impl GeometryTemplate for ExplicitGeometry {
    fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    fn site_count(&self) -> usize {
        self.positions.len()
    }

    fn fractional_coordinate(&self, index: usize) -> Option<Point3<f64>> {
        self.positions.get(index).copied()
    }
}
