pub mod count;
pub mod stoichiometry;
pub mod substitute;
