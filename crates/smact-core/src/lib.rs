//! # SMACT Core Library
//!
//! Combinatorial screening of inorganic compounds: charge-neutral stoichiometries for a
//! crystallographic site arrangement, and the symmetry-distinct ways of distributing
//! substituents over a sub-lattice.
//!
//! ## Architectural Philosophy
//!
//! The library keeps a three-layer architecture with a clear separation of concerns:
//!
//! - **[`core`]: The Foundation.** Immutable data models (`SpeciesTable`, `SiteTemplate`,
//!   `Composition`, `SubstitutionPattern`), the permutation-group capability, geometry
//!   providers, elemental property calculations and file readers.
//!
//! - **[`engine`]: The Logic Core.** The depth-first charge search with interval pruning, the
//!   stoichiometry and substitution enumerators, the structure builder, and the shared
//!   configuration, cancellation and progress plumbing.
//!
//! - **[`workflows`]: The Public API.** End-to-end procedures (screening a template,
//!   substituting on a prototype sub-lattice, counting neutral stoichiometries over a table)
//!   that tie `engine` and `core` together with phase reporting and logging.

pub mod core;
pub mod engine;
pub mod workflows;
