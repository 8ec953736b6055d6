use super::defaults::DefaultsConfig;
use super::file::{
    FileConfig, FileEmptyPool, FileLatticeSite, FilePaulingConfig, FileSiteConfig,
    FileSubstituent,
};
use super::models::{CountJob, StoichiometryJob, SubstitutionJob, SubstitutionTarget};
use crate::cli::{CountArgs, ElectronegativityArg, StoichiometryArgs, SubstituteArgs};
use crate::error::{CliError, Result};
use smact::core::geometry::prototypes::Prototype;
use smact::core::io::species::load_species_table;
use smact::core::models::site::SiteTemplate;
use smact::core::models::species::Species;
use smact::core::properties::electronegativity::{ElectronegativitySource, PaulingTestOptions};
use smact::core::table::registry::SpeciesTable;
use smact::engine::config as core_config;
use smact::engine::error::EngineError;
use smact::engine::stoichiometry::SpeciesPools;
use smact::engine::substitution::{Occupancy, SubstituentPool};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

pub fn build_stoichiometry_job(args: &StoichiometryArgs) -> Result<StoichiometryJob> {
    let defaults = DefaultsConfig::default();
    let file_config = FileConfig::from_file(&args.config)?;
    let mut file_config = apply_set_values(file_config, &args.set_values)?;

    let table = load_table(args.species_table.as_deref(), file_config.species_table.as_deref())?;

    let stoichiometry = file_config.stoichiometry.take().unwrap_or_default();
    let template = stoichiometry_template(&stoichiometry.sites, stoichiometry.generators.as_deref(), &defaults)?;
    let pools = species_pools(&table, &stoichiometry.sites, stoichiometry.class_species.as_ref())?;

    let empty_pool = if args.strict {
        core_config::EmptyPoolPolicy::Fatal
    } else {
        match stoichiometry.empty_pool {
            Some(FileEmptyPool::Fatal) => core_config::EmptyPoolPolicy::Fatal,
            Some(FileEmptyPool::Silent) | None => core_config::EmptyPoolPolicy::Silent,
        }
    };
    let enumeration = core_config::EnumerationConfigBuilder::new()
        .empty_pool(empty_pool)
        .build()
        .map_err(EngineError::from)?;

    let screening_file = file_config.screening.take().unwrap_or_default();
    let mut builder = core_config::ScreeningConfigBuilder::new().enumeration(enumeration);
    let pauling_enabled = args
        .pauling
        .resolve()
        .or(screening_file.pauling_test)
        .unwrap_or(false);
    if pauling_enabled {
        builder = builder.pauling_test(pauling_options(file_config.pauling.as_ref(), &defaults));
    }
    let electronegativity = args
        .electronegativity
        .map(|arg| match arg {
            ElectronegativityArg::Mulliken => ElectronegativitySource::Mulliken,
            ElectronegativityArg::Pauling => ElectronegativitySource::Pauling,
        })
        .or(screening_file.electronegativity);
    if let Some(source) = electronegativity {
        builder = builder.electronegativity(source);
    }
    let screening = builder.build().map_err(EngineError::from)?;

    info!(
        sites = template.len(),
        classes = template.classes().len(),
        pauling = pauling_enabled,
        "Stoichiometry job prepared."
    );
    Ok(StoichiometryJob {
        table,
        template,
        pools,
        screening,
    })
}

pub fn build_substitution_job(args: &SubstituteArgs) -> Result<SubstitutionJob> {
    let defaults = DefaultsConfig::default();
    let file_config = FileConfig::from_file(&args.config)?;
    let mut file_config = apply_set_values(file_config, &args.set_values)?;
    let file = file_config.substitution.take().ok_or_else(|| {
        CliError::Config("A `[substitution]` section is required.".to_string())
    })?;

    let pool = substituent_pool(&file.substituents)?;

    let mut config_builder = core_config::SubstitutionConfigBuilder::new();
    if let Some(sites) = args.incremental_threshold.or(file.incremental_threshold) {
        config_builder = config_builder.incremental_threshold(sites);
    }
    if let Some(order) = file.group_order_limit {
        config_builder = config_builder.group_order_limit(order);
    }
    let config = config_builder.build().map_err(EngineError::from)?;

    let target = match (&file.prototype, &file.sites) {
        (Some(_), Some(_)) => {
            return Err(CliError::Config(
                "`substitution.prototype` and `substitution.sites` are mutually exclusive."
                    .to_string(),
            ));
        }
        (Some(name), None) => {
            let mut prototype = Prototype::named(name).map_err(EngineError::from)?;
            if let Some(cell) = file.cell {
                prototype = prototype.with_cell(cell);
            }
            let repetitions = match &args.repetitions {
                Some(values) => Some(repetitions_from(values)?),
                None => file.repetitions,
            };
            if let Some(repetitions) = repetitions {
                prototype = prototype
                    .with_repetitions(repetitions)
                    .map_err(EngineError::from)?;
            }
            let sublattice = file.sublattice.clone().ok_or_else(|| {
                CliError::Config("`substitution.sublattice` is required with a prototype.".to_string())
            })?;
            SubstitutionTarget::Prototype {
                prototype,
                sublattice,
                hosts: file.hosts.clone().unwrap_or_default(),
                build_structures: args.build_structures
                    || file.build_structures.unwrap_or(defaults.build_structures),
            }
        }
        (None, Some(sites)) => {
            if args.repetitions.is_some() || args.build_structures {
                return Err(CliError::Argument(
                    "--repetitions and --build-structures need a prototype job.".to_string(),
                ));
            }
            SubstitutionTarget::Template(lattice_template(
                sites,
                file.generators.as_deref(),
                &defaults,
            )?)
        }
        (None, None) => {
            return Err(CliError::Config(
                "`substitution` needs either a `prototype` or a list of `sites`.".to_string(),
            ));
        }
    };

    debug!(labels = pool.len(), "Substitution job prepared.");
    Ok(SubstitutionJob {
        target,
        pool,
        config,
    })
}

pub fn build_count_job(args: &CountArgs) -> Result<CountJob> {
    let defaults = DefaultsConfig::default();
    let file_config = match &args.config {
        Some(path) => FileConfig::from_file(path)?,
        None => FileConfig::default(),
    };
    let mut file_config = apply_set_values(file_config, &args.set_values)?;
    let count_file = file_config.count.take().unwrap_or_default();

    let table = load_table(args.species_table.as_deref(), file_config.species_table.as_deref())?;

    let elements = if args.elements.is_empty() {
        count_file.elements.unwrap_or_default()
    } else {
        args.elements.clone()
    };
    if elements.is_empty() {
        return Err(CliError::Config(
            "No elements given; use --elements or `count.elements`.".to_string(),
        ));
    }

    let mut builder = core_config::CountConfigBuilder::new()
        .max_ions(
            args.max_ions
                .or(count_file.max_ions)
                .unwrap_or(defaults.count_max_ions),
        )
        .threshold(
            args.threshold
                .or(count_file.threshold)
                .unwrap_or(defaults.count_threshold),
        )
        .primitive_only(
            args.primitive_only
                || count_file
                    .primitive_only
                    .unwrap_or(defaults.primitive_only),
        );
    let pauling_enabled = args
        .pauling
        .resolve()
        .or(count_file.pauling_test)
        .unwrap_or(false);
    if pauling_enabled {
        builder = builder.pauling_test(pauling_options(file_config.pauling.as_ref(), &defaults));
    }
    let config = builder.build().map_err(EngineError::from)?;

    Ok(CountJob {
        table,
        elements,
        config,
    })
}

fn load_table(cli_path: Option<&Path>, file_path: Option<&Path>) -> Result<SpeciesTable> {
    let path = cli_path.or(file_path).ok_or_else(|| {
        CliError::Config(
            "A species table is required: use --species-table or `species-table`.".to_string(),
        )
    })?;
    info!("Loading species table from {:?}", path);
    Ok(load_species_table(path)?)
}

fn pauling_options(file: Option<&FilePaulingConfig>, defaults: &DefaultsConfig) -> PaulingTestOptions {
    let file = file.cloned().unwrap_or_default();
    PaulingTestOptions {
        threshold: file.threshold.unwrap_or(defaults.pauling_threshold),
        repeat_anions: file.repeat_anions.unwrap_or(defaults.repeat_anions),
        repeat_cations: file.repeat_cations.unwrap_or(defaults.repeat_cations),
    }
}

fn stoichiometry_template(
    sites: &[FileSiteConfig],
    generators: Option<&[Vec<String>]>,
    defaults: &DefaultsConfig,
) -> Result<SiteTemplate> {
    let lattice: Vec<FileLatticeSite> = sites
        .iter()
        .map(|site| FileLatticeSite {
            id: site.id.clone(),
            multiplicity: site.multiplicity,
            class: Some(site.class.clone().unwrap_or_else(|| site.id.clone())),
        })
        .collect();
    lattice_template(&lattice, generators, defaults)
}

fn lattice_template(
    sites: &[FileLatticeSite],
    generators: Option<&[Vec<String>]>,
    defaults: &DefaultsConfig,
) -> Result<SiteTemplate> {
    let class_of = |site: &FileLatticeSite| {
        site.class
            .clone()
            .unwrap_or_else(|| defaults.sublattice_class.clone())
    };

    let mut builder = SiteTemplate::builder();
    for site in sites {
        builder = builder.class(&class_of(site));
    }
    for site in sites {
        builder = builder.site(
            &site.id,
            site.multiplicity.unwrap_or(defaults.multiplicity),
            &class_of(site),
        );
    }
    for images in generators.unwrap_or_default() {
        let ids: Vec<&str> = images.iter().map(String::as_str).collect();
        builder = builder.generator_by_ids(&ids);
    }
    Ok(builder.build().map_err(EngineError::from)?)
}

fn species_pools(
    table: &SpeciesTable,
    sites: &[FileSiteConfig],
    class_species: Option<&std::collections::BTreeMap<String, Vec<String>>>,
) -> Result<SpeciesPools> {
    let mut pools = SpeciesPools::new();
    for site in sites {
        if let Some(entries) = &site.species {
            pools = pools.for_site(&site.id, resolve_species(table, entries)?);
        }
    }
    for (class, entries) in class_species.into_iter().flatten() {
        pools = pools.for_class(class, resolve_species(table, entries)?);
    }
    Ok(pools)
}

/// A bare element symbol stands for all of its oxidation states; anything else is parsed as a
/// species label.
fn resolve_species(table: &SpeciesTable, entries: &[String]) -> Result<Vec<Species>> {
    let mut species = Vec::new();
    for entry in entries {
        let entry = entry.trim();
        if entry.chars().all(|c| c.is_ascii_alphabetic()) {
            species.extend(table.all_species(entry).map_err(EngineError::from)?);
        } else {
            species.push(table.parse_species(entry).map_err(EngineError::from)?);
        }
    }
    Ok(species)
}

fn substituent_pool(substituents: &[FileSubstituent]) -> Result<SubstituentPool> {
    let mut pool = SubstituentPool::new();
    for substituent in substituents {
        let occupancy = match (substituent.exactly, substituent.at_most) {
            (Some(_), Some(_)) => {
                return Err(CliError::Config(format!(
                    "Substituent '{}' sets both `exactly` and `at-most`.",
                    substituent.label
                )));
            }
            (Some(n), None) => Occupancy::Exactly(n),
            (None, Some(n)) => Occupancy::AtMost(n),
            (None, None) => Occupancy::Any,
        };
        pool = pool.with(substituent.label.clone(), occupancy);
    }
    Ok(pool)
}

fn repetitions_from(values: &[u32]) -> Result<[u32; 3]> {
    <[u32; 3]>::try_from(values).map_err(|_| {
        CliError::Argument(format!(
            "--repetitions takes exactly three values, got {}",
            values.len()
        ))
    })
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        CliError::Config(format!("Invalid value for {}: {}", key, value))
    })
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let Some((key, value)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        };
        let key = key.trim();

        match key {
            "species-table" => {
                config.species_table = Some(PathBuf::from(value.trim()));
            }
            "stoichiometry.empty-pool" => {
                let policy = match value.trim() {
                    "silent" => FileEmptyPool::Silent,
                    "fatal" => FileEmptyPool::Fatal,
                    other => {
                        return Err(CliError::Config(format!(
                            "Invalid value for {}: {} (expected 'silent' or 'fatal')",
                            key, other
                        )));
                    }
                };
                config
                    .stoichiometry
                    .get_or_insert_with(Default::default)
                    .empty_pool = Some(policy);
            }
            "screening.pauling-test" => {
                config
                    .screening
                    .get_or_insert_with(Default::default)
                    .pauling_test = Some(parse_value(key, value)?);
            }
            "screening.electronegativity" => {
                let source = match value.trim() {
                    "mulliken" => ElectronegativitySource::Mulliken,
                    "pauling" => ElectronegativitySource::Pauling,
                    other => {
                        return Err(CliError::Config(format!(
                            "Invalid value for {}: {} (expected 'mulliken' or 'pauling')",
                            key, other
                        )));
                    }
                };
                config
                    .screening
                    .get_or_insert_with(Default::default)
                    .electronegativity = Some(source);
            }
            "pauling.threshold" => {
                config.pauling.get_or_insert_with(Default::default).threshold =
                    Some(parse_value(key, value)?);
            }
            "pauling.repeat-anions" => {
                config
                    .pauling
                    .get_or_insert_with(Default::default)
                    .repeat_anions = Some(parse_value(key, value)?);
            }
            "pauling.repeat-cations" => {
                config
                    .pauling
                    .get_or_insert_with(Default::default)
                    .repeat_cations = Some(parse_value(key, value)?);
            }
            "substitution.prototype" => {
                config
                    .substitution
                    .get_or_insert_with(Default::default)
                    .prototype = Some(value.trim().to_string());
            }
            "substitution.sublattice" => {
                config
                    .substitution
                    .get_or_insert_with(Default::default)
                    .sublattice = Some(value.trim().to_string());
            }
            "substitution.build-structures" => {
                config
                    .substitution
                    .get_or_insert_with(Default::default)
                    .build_structures = Some(parse_value(key, value)?);
            }
            "substitution.incremental-threshold" => {
                config
                    .substitution
                    .get_or_insert_with(Default::default)
                    .incremental_threshold = Some(parse_value(key, value)?);
            }
            "substitution.group-order-limit" => {
                config
                    .substitution
                    .get_or_insert_with(Default::default)
                    .group_order_limit = Some(parse_value(key, value)?);
            }
            "count.max-ions" => {
                config.count.get_or_insert_with(Default::default).max_ions =
                    Some(parse_value(key, value)?);
            }
            "count.threshold" => {
                config.count.get_or_insert_with(Default::default).threshold =
                    Some(parse_value(key, value)?);
            }
            "count.primitive-only" => {
                config
                    .count
                    .get_or_insert_with(Default::default)
                    .primitive_only = Some(parse_value(key, value)?);
            }
            "count.pauling-test" => {
                config
                    .count
                    .get_or_insert_with(Default::default)
                    .pauling_test = Some(parse_value(key, value)?);
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}
