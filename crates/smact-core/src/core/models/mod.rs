//! # Core Models Module
//!
//! Plain data types shared by every enumerator and workflow.
//!
//! ## Key Components
//!
//! - [`species`] - An element in a definite oxidation state, obtainable only through a
//!   [`SpeciesTable`](crate::core::table::registry::SpeciesTable)
//! - [`site`] - Site templates: crystallographic sites with multiplicities, their equivalence
//!   classes and the permutation symmetry acting on them
//! - [`composition`] - Charge-neutral assignments of species to the sites of a template
//! - [`pattern`] - Symmetry-distinct distributions of substituent labels over a sub-lattice
//! - [`structure`] - Occupied sites and the concrete structures the builder places them into
//!
//! Compositions and patterns are immutable values with a total order, so result sets built
//! from them are deterministic regardless of how the search was scheduled.

pub mod composition;
pub mod pattern;
pub mod site;
pub mod species;
pub mod structure;
