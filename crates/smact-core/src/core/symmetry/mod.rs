//! Permutation groups acting on site indices.
//!
//! Both enumerators deduplicate through the [`SiteSymmetry`] capability: orbits of
//! assignments under a group, and the lexicographically smallest member of an orbit as its
//! canonical representative.

pub mod group;
pub mod permutation;

pub use group::{MaterializedGroup, PermutationGroup, SiteSymmetry};
pub use permutation::{Permutation, PermutationError};
