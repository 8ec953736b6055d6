//! # Core Module
//!
//! Stateless building blocks for compound screening: the species table, site templates,
//! the permutation-group machinery, geometry providers, derived properties and file I/O.
//!
//! ## Architecture
//!
//! - **Elemental Data** ([`table`]) - Allowed oxidation states and scalar properties per
//!   element, and the table that validates species against them
//! - **Data Models** ([`models`]) - Species, site templates, compositions, substitution
//!   patterns and structures
//! - **Symmetry** ([`symmetry`]) - Permutations, generated groups, orbits and canonical
//!   representatives
//! - **Geometry** ([`geometry`]) - Lattices, explicit coordinate lists and a few structure
//!   prototypes with supercell expansion
//! - **Properties** ([`properties`]) - Compound electronegativity, the Pauling test and band
//!   gap estimates
//! - **File I/O** ([`io`]) - CSV and TOML element table readers
//!
//! Everything here is immutable once built and can be shared freely between threads.

pub mod geometry;
pub mod io;
pub mod models;
pub mod properties;
pub mod symmetry;
pub mod table;
