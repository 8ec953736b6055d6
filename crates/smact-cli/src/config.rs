mod builder;
mod defaults;
mod file;
mod models;

pub use builder::{build_count_job, build_stoichiometry_job, build_substitution_job};
pub use models::{CountJob, StoichiometryJob, SubstitutionJob, SubstitutionTarget};
