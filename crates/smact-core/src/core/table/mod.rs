//! In-memory elemental data: per-element oxidation states and optional scalar properties,
//! and the [`registry::SpeciesTable`] that validates species against them.

pub mod element;
pub mod registry;
