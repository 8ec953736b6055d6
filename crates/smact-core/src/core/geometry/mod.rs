//! Lattices and fractional-coordinate providers consumed by the structure builder.
//!
//! - [`lattice`]: cell parameters to lattice vectors and fractional → Cartesian conversion.
//! - [`provider`]: the [`GeometryTemplate`](provider::GeometryTemplate) trait and an explicit
//!   coordinate-list implementation.
//! - [`prototypes`]: a few textbook structure types expanded from their Wyckoff sites,
//!   supercell repetition and sub-lattice templates carrying the space-group symmetry that
//!   survives in the supercell.

pub mod lattice;
pub mod prototypes;
pub mod provider;

use crate::core::models::site::TemplateError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("Invalid cell: {0}")]
    InvalidCell(String),
    #[error("Unknown structure prototype: '{0}'")]
    UnknownPrototype(String),
    #[error("Prototype '{prototype}' has no site labelled '{label}'")]
    UnknownSublattice { prototype: String, label: String },
    #[error("Supercell repetitions must be positive, got {0:?}")]
    InvalidRepetitions([u32; 3]),
    #[error("Symmetry operation '{operation}' does not map the '{label}' sub-lattice onto itself")]
    BrokenSymmetry { operation: String, label: String },
    #[error("Failed to build sub-lattice template: {0}")]
    Template(#[from] TemplateError),
}
