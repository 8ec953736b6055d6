use crate::core::table::element::ElementData;
use crate::core::table::registry::SpeciesTable;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("Invalid record for '{element}' in '{path}': {reason}")]
    InvalidRecord {
        path: String,
        element: String,
        reason: String,
    },
    #[error("Unsupported species table format for '{0}' (expected .csv or .toml)")]
    UnsupportedFormat(String),
}

/// One CSV row. Oxidation states are a single space-separated column, e.g. `"-2 2 4 6"`.
#[derive(Debug, Deserialize)]
struct CsvRecord {
    symbol: String,
    atomic_number: u8,
    #[serde(default)]
    oxidation_states: String,
    #[serde(default)]
    pauling_electronegativity: Option<f64>,
    #[serde(default)]
    ionization_potential: Option<f64>,
    #[serde(default)]
    electron_affinity: Option<f64>,
    #[serde(default)]
    eig: Option<f64>,
    #[serde(default)]
    eig_s: Option<f64>,
    #[serde(default)]
    sse: Option<f64>,
    #[serde(default)]
    sse_2015: Option<f64>,
}

/// One `[Symbol]` table of a TOML file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlRecord {
    atomic_number: u8,
    #[serde(default)]
    oxidation_states: Vec<i32>,
    #[serde(default)]
    pauling_electronegativity: Option<f64>,
    #[serde(default)]
    ionization_potential: Option<f64>,
    #[serde(default)]
    electron_affinity: Option<f64>,
    #[serde(default)]
    eig: Option<f64>,
    #[serde(default)]
    eig_s: Option<f64>,
    #[serde(default)]
    sse: Option<f64>,
    #[serde(default)]
    sse_2015: Option<f64>,
}

struct Properties {
    pauling_electronegativity: Option<f64>,
    ionization_potential: Option<f64>,
    electron_affinity: Option<f64>,
    eig: Option<f64>,
    eig_s: Option<f64>,
    sse: Option<f64>,
    sse_2015: Option<f64>,
}

macro_rules! properties_of {
    ($record:expr) => {
        Properties {
            pauling_electronegativity: $record.pauling_electronegativity,
            ionization_potential: $record.ionization_potential,
            electron_affinity: $record.electron_affinity,
            eig: $record.eig,
            eig_s: $record.eig_s,
            sse: $record.sse,
            sse_2015: $record.sse_2015,
        }
    };
}

/// Loads a species table, choosing the format from the file extension.
pub fn load_species_table(path: &Path) -> Result<SpeciesTable, LoadError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("csv") => load_csv(path),
        Some("toml") => load_toml(path),
        _ => Err(LoadError::UnsupportedFormat(
            path.to_string_lossy().to_string(),
        )),
    }
}

pub fn load_csv(path: &Path) -> Result<SpeciesTable, LoadError> {
    let origin = path.to_string_lossy().to_string();
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_path(path)
        .map_err(|e| LoadError::Csv {
            path: origin.clone(),
            source: e,
        })?;

    let mut elements = Vec::new();
    for result in reader.deserialize::<CsvRecord>() {
        let record = result.map_err(|e| LoadError::Csv {
            path: origin.clone(),
            source: e,
        })?;
        let states = parse_states(&record.oxidation_states).map_err(|reason| {
            LoadError::InvalidRecord {
                path: origin.clone(),
                element: record.symbol.clone(),
                reason,
            }
        })?;
        elements.push(element_data(
            &origin,
            record.symbol,
            record.atomic_number,
            &states,
            properties_of!(record),
        )?);
    }
    collect_table(&origin, elements)
}

pub fn load_toml(path: &Path) -> Result<SpeciesTable, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|e| LoadError::Io {
        path: path.to_string_lossy().to_string(),
        source: e,
    })?;
    parse_toml(&content, &path.to_string_lossy())
}

/// Parses TOML table text; `origin` names the source in error messages.
pub fn parse_toml(content: &str, origin: &str) -> Result<SpeciesTable, LoadError> {
    let records: BTreeMap<String, TomlRecord> =
        toml::from_str(content).map_err(|e| LoadError::Toml {
            path: origin.to_string(),
            source: e,
        })?;
    let elements = records
        .into_iter()
        .map(|(symbol, record)| {
            element_data(
                origin,
                symbol,
                record.atomic_number,
                &record.oxidation_states,
                properties_of!(record),
            )
        })
        .collect::<Result<Vec<_>, _>>()?;
    collect_table(origin, elements)
}

fn parse_states(field: &str) -> Result<Vec<i32>, String> {
    field
        .split_whitespace()
        .map(|token| {
            token
                .trim_start_matches('+')
                .parse::<i32>()
                .map_err(|_| format!("'{token}' is not an oxidation state"))
        })
        .collect()
}

fn element_data(
    origin: &str,
    symbol: String,
    atomic_number: u8,
    states: &[i32],
    properties: Properties,
) -> Result<ElementData, LoadError> {
    let invalid = |reason: String| LoadError::InvalidRecord {
        path: origin.to_string(),
        element: symbol.clone(),
        reason,
    };
    if !is_element_symbol(&symbol) {
        return Err(invalid("not an element symbol".to_string()));
    }
    if atomic_number == 0 {
        return Err(invalid("atomic number must be positive".to_string()));
    }
    if let Some(bad) = [
        properties.pauling_electronegativity,
        properties.ionization_potential,
        properties.electron_affinity,
        properties.eig,
        properties.eig_s,
        properties.sse,
        properties.sse_2015,
    ]
    .into_iter()
    .flatten()
    .find(|v| !v.is_finite())
    {
        return Err(invalid(format!("non-finite property value {bad}")));
    }

    let mut element = ElementData::new(&symbol, atomic_number, states);
    element.pauling_electronegativity = properties.pauling_electronegativity;
    element.ionization_potential = properties.ionization_potential;
    element.electron_affinity = properties.electron_affinity;
    element.eig = properties.eig;
    element.eig_s = properties.eig_s;
    element.sse = properties.sse;
    element.sse_2015 = properties.sse_2015;
    Ok(element)
}

fn is_element_symbol(symbol: &str) -> bool {
    let mut chars = symbol.chars();
    chars.next().is_some_and(|c| c.is_ascii_uppercase())
        && symbol.len() <= 3
        && chars.all(|c| c.is_ascii_lowercase())
}

fn collect_table(origin: &str, elements: Vec<ElementData>) -> Result<SpeciesTable, LoadError> {
    let mut table = SpeciesTable::new();
    for element in elements {
        if table.contains(&element.symbol) {
            return Err(LoadError::InvalidRecord {
                path: origin.to_string(),
                element: element.symbol,
                reason: "element listed more than once".to_string(),
            });
        }
        table.insert(element);
    }
    debug!(elements = table.len(), path = origin, "Loaded species table.");
    Ok(table)
}
