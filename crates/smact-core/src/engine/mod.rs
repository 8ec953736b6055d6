//! # Engine Module
//!
//! The search machinery behind every workflow: the two enumerators, the structure builder,
//! and the plumbing they share for configuration, cancellation, progress and errors.
//!
//! ## Architecture
//!
//! - **Charge Search** ([`search`]) - One stack-based depth-first walk over "one value per
//!   level" choices with interval pruning, shared by stoichiometry and ratio enumeration
//! - **Stoichiometry** ([`stoichiometry`]) - Charge-neutral compositions of a site template
//! - **Substitution** ([`substitution`]) - Symmetry-distinct substituent patterns of a
//!   sub-lattice, with orbit-minimum canonicalisation and prefix pruning
//! - **Structure Builder** ([`builder`]) - Compositions or patterns placed onto a geometry
//! - **Neutral Ratios** ([`ratios`]) - Integer stoichiometries balancing a tuple of
//!   oxidation states
//! - **Configuration** ([`config`]) - Typed settings and their builders
//! - **Cancellation** ([`cancel`]) - The per-node cancellation poll
//! - **Results** ([`outcome`]) - Deduplicated result sets with completion status and counters
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress reporting
//! - **Error Handling** ([`error`]) - Engine-specific error types and error propagation
//!
//! ## Key Capabilities
//!
//! - **Deterministic results** ordered by value, independent of scheduling
//! - **Optional parallelism** (`parallel` feature) over independent first-level branches
//! - **Cooperative cancellation** returning partial results flagged as such

pub mod builder;
pub mod cancel;
pub mod config;
pub mod error;
pub mod outcome;
pub mod progress;
pub mod ratios;
pub(crate) mod search;
pub mod stoichiometry;
pub mod substitution;
