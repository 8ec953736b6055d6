//! # Workflows Module
//!
//! End-to-end entry points that tie the [`engine`](crate::engine) enumerators to the
//! [`core`](crate::core) data, with phase progress reporting and structured logging.
//!
//! ## Architecture
//!
//! - **Screening Workflow** ([`screen`]) - Charge-neutral compositions of a site template,
//!   optionally filtered by the Pauling test and annotated with compound electronegativity
//! - **Substitution Workflow** ([`substitute`]) - Symmetry-distinct substitution patterns of
//!   a sub-lattice, including the prototype-supercell case with structure building
//! - **Counting Workflow** ([`count`]) - Neutral stoichiometry counts over all species
//!   combinations drawn from a set of elements

pub mod count;
pub mod screen;
pub mod substitute;
