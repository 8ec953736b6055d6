use super::PropertyError;
use crate::core::models::species::Species;
use crate::core::table::element::ElementData;
use crate::core::table::registry::SpeciesTable;
use serde::{Deserialize, Serialize};

/// ħ²/m in eV·Å², as used by Harrison.
pub const HBAR_SQ_OVER_M: f64 = 7.62;

/// Estimates the band gap (eV) of a binary compound from elemental orbital energies.
///
/// Follows equation (3-43) of Harrison, *Electronic Structure and the Properties of Solids*
/// (1980). `distance` is the anion–cation separation in Å, typically the sum of ionic radii.
pub fn band_gap_harrison(
    table: &SpeciesTable,
    anion: &str,
    cation: &str,
    distance: f64,
) -> Result<f64, PropertyError> {
    if !(distance.is_finite() && distance > 0.0) {
        return Err(PropertyError::InvalidArgument(format!(
            "internuclear distance must be positive, got {distance}"
        )));
    }
    let (an_p, an_s) = eigenvalues(lookup(table, anion)?)?;
    let (cat_p, cat_s) = eigenvalues(lookup(table, cation)?)?;

    let v1_cation = (cat_p - cat_s) / 4.0;
    let v1_anion = (an_p - an_s) / 4.0;
    let v1_bar = (v1_anion + v1_cation) / 2.0;
    let v2 = 2.16 * HBAR_SQ_OVER_M / (distance * distance);
    let v3 = (cat_p - an_p) / 2.0;
    let hybrid = v2.hypot(v3);
    let metallicity = 1.11 * v1_bar / hybrid;

    Ok((3.60 / 3.0) * hybrid * (1.0 - metallicity))
}

/// Which solid-state energy data set to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SseSet {
    Original,
    #[default]
    Revised2015,
}

/// SSE band gap: lowest cation SSE minus highest anion SSE.
pub fn sse_min_gap(
    table: &SpeciesTable,
    species: &[Species],
    set: SseSet,
) -> Result<f64, PropertyError> {
    let (cations, anions) = sse_sides(table, species, set)?;
    Ok(min(&cations) - max(&anions))
}

/// SSE band gap from the mean cation and mean anion SSE.
pub fn sse_average_gap(
    table: &SpeciesTable,
    species: &[Species],
    set: SseSet,
) -> Result<f64, PropertyError> {
    let (cations, anions) = sse_sides(table, species, set)?;
    Ok(mean(&cations) - mean(&anions))
}

/// SSE band gap with each side's extremes mixed by a spread-dependent weight.
///
/// For a side with spread `Δ = max − min > 0` the weight is `F = ½·exp(−Δ^(−x))`; a side
/// without spread uses `F = ½`.
pub fn sse_weighted_gap(
    table: &SpeciesTable,
    species: &[Species],
    x: f64,
    set: SseSet,
) -> Result<f64, PropertyError> {
    let (cations, anions) = sse_sides(table, species, set)?;
    let weight = |values: &[f64]| {
        let spread = max(values) - min(values);
        if spread == 0.0 {
            0.5
        } else {
            0.5 * (-spread.powf(-x)).exp()
        }
    };
    let f_cation = weight(&cations);
    let f_anion = weight(&anions);
    Ok(f_cation * max(&cations) + (1.0 - f_cation) * min(&cations)
        - (1.0 - f_anion) * max(&anions)
        - f_anion * min(&anions))
}

fn lookup<'t>(table: &'t SpeciesTable, symbol: &str) -> Result<&'t ElementData, PropertyError> {
    table
        .get(symbol)
        .ok_or_else(|| PropertyError::UnknownElement(symbol.to_string()))
}

fn eigenvalues(element: &ElementData) -> Result<(f64, f64), PropertyError> {
    match (element.eig, element.eig_s) {
        (Some(p), Some(s)) => Ok((p, s)),
        _ => Err(PropertyError::MissingProperty {
            element: element.symbol.clone(),
            property: "Harrison eigenvalue",
        }),
    }
}

/// Splits species into cation and anion SSE values. Oxidation state zero counts as a cation.
fn sse_sides(
    table: &SpeciesTable,
    species: &[Species],
    set: SseSet,
) -> Result<(Vec<f64>, Vec<f64>), PropertyError> {
    let mut cations = Vec::new();
    let mut anions = Vec::new();
    for s in species {
        let element = lookup(table, s.element())?;
        let value = match set {
            SseSet::Original => element.sse,
            SseSet::Revised2015 => element.sse_2015,
        }
        .ok_or_else(|| PropertyError::MissingProperty {
            element: element.symbol.clone(),
            property: "solid-state energy",
        })?;
        if s.is_anion() {
            anions.push(value);
        } else {
            cations.push(value);
        }
    }
    if cations.is_empty() {
        return Err(PropertyError::EmptyInput("no cations given"));
    }
    if anions.is_empty() {
        return Err(PropertyError::EmptyInput("no anions given"));
    }
    Ok((cations, anions))
}

fn min(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::INFINITY, f64::min)
}

fn max(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn table() -> SpeciesTable {
        SpeciesTable::from_elements([
            ElementData::new("Zn", 30, &[2])
                .with_eigenvalues(-3.38, -8.4)
                .with_sse(-4.6)
                .with_sse_2015(-4.5),
            ElementData::new("Cd", 48, &[2])
                .with_eigenvalues(-3.38, -7.7)
                .with_sse(-4.3)
                .with_sse_2015(-4.2),
            ElementData::new("O", 8, &[-2])
                .with_eigenvalues(-14.13, -29.14)
                .with_sse(-7.2)
                .with_sse_2015(-7.0),
            ElementData::new("S", 16, &[-2])
                .with_eigenvalues(-10.27, -20.8)
                .with_sse(-6.0)
                .with_sse_2015(-6.1),
            ElementData::new("Ar", 18, &[1]),
        ])
    }

    fn species(table: &SpeciesTable, labels: &[&str]) -> Vec<Species> {
        labels
            .iter()
            .map(|l| table.parse_species(l).unwrap())
            .collect()
    }

    #[test]
    fn harrison_gap_follows_closed_form() {
        let d: f64 = 1.95;
        let v1_bar = ((-14.13 - -29.14) / 4.0 + (-3.38 - -8.4) / 4.0) / 2.0;
        let v2 = 2.16 * 7.62 / (d * d);
        let v3 = (-3.38 - -14.13) / 2.0;
        let root = (v2 * v2 + v3 * v3).sqrt();
        let expected = 1.2 * root * (1.0 - 1.11 * v1_bar / root);

        let gap = band_gap_harrison(&table(), "O", "Zn", d).unwrap();
        assert_relative_eq!(gap, expected, epsilon = 1e-12);
    }

    #[test]
    fn harrison_gap_requires_eigenvalues_and_positive_distance() {
        let table = table();
        assert!(matches!(
            band_gap_harrison(&table, "O", "Ar", 2.0),
            Err(PropertyError::MissingProperty { .. })
        ));
        assert!(matches!(
            band_gap_harrison(&table, "O", "Zn", 0.0),
            Err(PropertyError::InvalidArgument(_))
        ));
    }

    #[test]
    fn sse_min_and_average_gaps() {
        let table = table();
        let compound = species(&table, &["Zn2+", "Cd2+", "O2-", "S2-"]);
        assert_relative_eq!(
            sse_min_gap(&table, &compound, SseSet::Revised2015).unwrap(),
            -4.5 - -6.1,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            sse_average_gap(&table, &compound, SseSet::Original).unwrap(),
            (-4.6 + -4.3) / 2.0 - (-7.2 + -6.0) / 2.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn sse_weighted_gap_uses_half_weights_without_spread() {
        let table = table();
        let compound = species(&table, &["Zn2+", "O2-"]);
        let gap = sse_weighted_gap(&table, &compound, 1.0, SseSet::Revised2015).unwrap();
        assert_relative_eq!(gap, -4.5 - -7.0, epsilon = 1e-12);
    }

    #[test]
    fn sse_weighted_gap_mixes_extremes() {
        let table = table();
        let compound = species(&table, &["Zn2+", "Cd2+", "O2-"]);
        let f1 = 0.5 * (-(0.3f64).powf(-2.0)).exp();
        let expected = f1 * -4.2 + (1.0 - f1) * -4.5 - 0.5 * -7.0 - 0.5 * -7.0;
        let gap = sse_weighted_gap(&table, &compound, 2.0, SseSet::Revised2015).unwrap();
        assert_relative_eq!(gap, expected, epsilon = 1e-12);
    }

    #[test]
    fn sse_gaps_need_both_sides() {
        let table = table();
        let compound = species(&table, &["Zn2+"]);
        assert_eq!(
            sse_min_gap(&table, &compound, SseSet::Original),
            Err(PropertyError::EmptyInput("no anions given"))
        );
    }
}
