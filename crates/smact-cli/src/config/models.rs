use smact::core::geometry::prototypes::Prototype;
use smact::core::models::site::SiteTemplate;
use smact::core::table::registry::SpeciesTable;
use smact::engine::config::{CountConfig, ScreeningConfig, SubstitutionConfig};
use smact::engine::stoichiometry::SpeciesPools;
use smact::engine::substitution::SubstituentPool;
use std::collections::BTreeMap;

#[derive(Debug)]
pub struct StoichiometryJob {
    pub table: SpeciesTable,
    pub template: SiteTemplate,
    pub pools: SpeciesPools,
    pub screening: ScreeningConfig,
}

#[derive(Debug)]
pub enum SubstitutionTarget {
    Prototype {
        prototype: Prototype,
        sublattice: String,
        hosts: BTreeMap<String, String>,
        build_structures: bool,
    },
    Template(SiteTemplate),
}

#[derive(Debug)]
pub struct SubstitutionJob {
    pub target: SubstitutionTarget,
    pub pool: SubstituentPool,
    pub config: SubstitutionConfig,
}

pub struct CountJob {
    pub table: SpeciesTable,
    pub elements: Vec<String>,
    pub config: CountConfig,
}
