use crate::error::{CliError, Result};
use serde::Deserialize;
use smact::core::properties::electronegativity::ElectronegativitySource;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum FileEmptyPool {
    Silent,
    Fatal,
}

/// A site of the stoichiometry template, optionally with its own candidate list.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileSiteConfig {
    pub id: String,
    pub multiplicity: Option<i64>,
    /// Defaults to the site id.
    pub class: Option<String>,
    /// Element symbols (every allowed state) or species labels such as `"Ti4+"`.
    pub species: Option<Vec<String>>,
}

/// A site of an explicit substitution sub-lattice.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileLatticeSite {
    pub id: String,
    pub multiplicity: Option<i64>,
    pub class: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileStoichiometryConfig {
    pub empty_pool: Option<FileEmptyPool>,
    #[serde(default)]
    pub sites: Vec<FileSiteConfig>,
    /// Candidate lists shared by every site of a class.
    pub class_species: Option<BTreeMap<String, Vec<String>>>,
    /// Symmetry generators as site-id images, e.g. `["B", "A"]` swaps sites A and B.
    pub generators: Option<Vec<Vec<String>>>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FilePaulingConfig {
    pub threshold: Option<f64>,
    pub repeat_anions: Option<bool>,
    pub repeat_cations: Option<bool>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileScreeningConfig {
    pub pauling_test: Option<bool>,
    pub electronegativity: Option<ElectronegativitySource>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileSubstituent {
    pub label: String,
    pub at_most: Option<u32>,
    pub exactly: Option<u32>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileSubstitutionConfig {
    pub prototype: Option<String>,
    pub sublattice: Option<String>,
    pub repetitions: Option<[u32; 3]>,
    /// `[a, b, c, alpha, beta, gamma]` of the prototype unit cell.
    pub cell: Option<[f64; 6]>,
    /// Occupant of every other prototype site label.
    pub hosts: Option<BTreeMap<String, String>>,
    pub build_structures: Option<bool>,
    pub sites: Option<Vec<FileLatticeSite>>,
    pub generators: Option<Vec<Vec<String>>>,
    #[serde(default)]
    pub substituents: Vec<FileSubstituent>,
    pub incremental_threshold: Option<usize>,
    pub group_order_limit: Option<usize>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileCountConfig {
    pub elements: Option<Vec<String>>,
    pub max_ions: Option<usize>,
    pub threshold: Option<u32>,
    pub primitive_only: Option<bool>,
    pub pauling_test: Option<bool>,
}

/// A job file as written by the user; every section is optional.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileConfig {
    pub species_table: Option<PathBuf>,
    pub stoichiometry: Option<FileStoichiometryConfig>,
    pub screening: Option<FileScreeningConfig>,
    pub pauling: Option<FilePaulingConfig>,
    pub substitution: Option<FileSubstitutionConfig>,
    pub count: Option<FileCountConfig>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading job file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        if let (Some(table), Some(dir)) = (config.species_table.as_mut(), path.parent()) {
            if table.is_relative() {
                *table = dir.join(&*table);
            }
        }
        Ok(config)
    }
}
