use super::PropertyError;
use crate::core::models::species::Species;
use crate::core::table::element::ElementData;
use crate::core::table::registry::SpeciesTable;
use serde::{Deserialize, Serialize};

/// Factor bringing Pauling electronegativities onto the Mulliken (eV) scale (Nethercot, 1974).
pub const PAULING_TO_MULLIKEN: f64 = 2.86;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElectronegativitySource {
    /// Mean of ionisation potential and electron affinity.
    #[default]
    Mulliken,
    /// Pauling electronegativity rescaled by [`PAULING_TO_MULLIKEN`].
    Pauling,
}

/// Electronegativity of a single element on the Mulliken scale.
pub fn element_electronegativity(
    element: &ElementData,
    source: ElectronegativitySource,
) -> Result<f64, PropertyError> {
    let value = match source {
        ElectronegativitySource::Mulliken => element.mulliken_electronegativity(),
        ElectronegativitySource::Pauling => element
            .pauling_electronegativity
            .map(|chi| chi * PAULING_TO_MULLIKEN),
    };
    value.ok_or_else(|| PropertyError::MissingProperty {
        element: element.symbol.clone(),
        property: match source {
            ElectronegativitySource::Mulliken => "Mulliken electronegativity",
            ElectronegativitySource::Pauling => "Pauling electronegativity",
        },
    })
}

/// Estimates the electronegativity of a compound as the geometric mean of its elemental
/// electronegativities, each weighted by its amount.
///
/// For Cu2S this is `(χ_Cu · χ_Cu · χ_S)^(1/3)`.
pub fn compound_electronegativity(
    table: &SpeciesTable,
    amounts: &[(&str, f64)],
    source: ElectronegativitySource,
) -> Result<f64, PropertyError> {
    if amounts.is_empty() {
        return Err(PropertyError::EmptyInput("no elements given"));
    }
    let total: f64 = amounts.iter().map(|(_, n)| n).sum();
    if total <= 0.0 {
        return Err(PropertyError::InvalidArgument(format!(
            "total amount must be positive, got {total}"
        )));
    }

    let mut product = 1.0;
    for &(symbol, amount) in amounts {
        let element = table
            .get(symbol)
            .ok_or_else(|| PropertyError::UnknownElement(symbol.to_string()))?;
        product *= element_electronegativity(element, source)?.powf(amount);
    }
    Ok(product.powf(1.0 / total))
}

/// Options of [`pauling_test`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaulingTestOptions {
    /// Tolerance: the test passes while `max χ(cation) − min χ(anion) < threshold`.
    pub threshold: f64,
    /// Allow an element to appear more than once as an anion (in different states).
    pub repeat_anions: bool,
    /// Allow an element to appear more than once as a cation (in different states).
    pub repeat_cations: bool,
}

impl Default for PaulingTestOptions {
    fn default() -> Self {
        Self {
            threshold: 0.0,
            repeat_anions: true,
            repeat_cations: true,
        }
    }
}

/// Checks that every cation is less electronegative than every anion (Pauling scale).
///
/// Species with oxidation state zero take no part in the ordering. A species whose element is
/// missing from the table or has no Pauling electronegativity makes the test fail. With no
/// cation or no anion there is nothing to order and the test passes.
pub fn pauling_test(
    species: &[Species],
    table: &SpeciesTable,
    options: &PaulingTestOptions,
) -> bool {
    let mut cations: Vec<(&str, f64)> = Vec::new();
    let mut anions: Vec<(&str, f64)> = Vec::new();

    for s in species.iter().filter(|s| s.oxidation_state() != 0) {
        let Some(chi) = table
            .get(s.element())
            .and_then(|e| e.pauling_electronegativity)
        else {
            return false;
        };
        let side = if s.is_cation() {
            &mut cations
        } else {
            &mut anions
        };
        side.push((s.element(), chi));
    }

    if !options.repeat_cations && has_repeated_element(&cations) {
        return false;
    }
    if !options.repeat_anions && has_repeated_element(&anions) {
        return false;
    }

    let max_cation = cations.iter().map(|&(_, chi)| chi).reduce(f64::max);
    let min_anion = anions.iter().map(|&(_, chi)| chi).reduce(f64::min);
    match (max_cation, min_anion) {
        (Some(cation), Some(anion)) => cation - anion < options.threshold,
        _ => true,
    }
}

fn has_repeated_element(ions: &[(&str, f64)]) -> bool {
    ions.iter()
        .enumerate()
        .any(|(i, (element, _))| ions[..i].iter().any(|(other, _)| other == element))
}
