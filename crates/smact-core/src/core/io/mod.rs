//! Readers for elemental data files.
//!
//! The enumerators never touch the file system; this module only turns CSV or TOML element
//! tables into the read-only [`SpeciesTable`](crate::core::table::registry::SpeciesTable)
//! they consume.

pub mod species;
