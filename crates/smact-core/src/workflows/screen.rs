use crate::core::models::composition::Composition;
use crate::core::models::site::SiteTemplate;
use crate::core::models::species::Species;
use crate::core::properties::electronegativity::{compound_electronegativity, pauling_test};
use crate::core::table::registry::SpeciesTable;
use crate::engine::cancel::Cancellation;
use crate::engine::config::ScreeningConfig;
use crate::engine::error::EngineError;
use crate::engine::outcome::{EnumerationStatus, SearchStats};
use crate::engine::progress::ProgressReporter;
use crate::engine::stoichiometry::{SpeciesPools, StoichiometryEnumerator};
use serde::Serialize;
use tracing::{debug, info, instrument};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScreenedComposition {
    pub composition: Composition,
    pub formula: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub electronegativity: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScreeningResult {
    pub candidates: Vec<ScreenedComposition>,
    /// Charge-neutral compositions dropped by the Pauling test.
    pub rejected: usize,
    pub status: EnumerationStatus,
    pub stats: SearchStats,
}

/// Enumerates the charge-neutral compositions of `template`, then filters and annotates them.
///
/// Candidates keep the deterministic order of the enumeration result.
#[instrument(skip_all, name = "screening_workflow")]
pub fn run<C: Cancellation + ?Sized>(
    table: &SpeciesTable,
    template: &SiteTemplate,
    pools: &SpeciesPools,
    config: &ScreeningConfig,
    cancel: &C,
    reporter: &ProgressReporter,
) -> Result<ScreeningResult, EngineError> {
    // === Phase 1: Charge-neutral enumeration ===
    let enumeration = {
        let _phase = reporter.phase("Enumerating Compositions");
        info!(
            sites = template.len(),
            classes = template.classes().len(),
            "Enumerating charge-neutral compositions."
        );
        StoichiometryEnumerator::new(template, &config.enumeration)
            .enumerate_with(pools, cancel, reporter)?
    };
    let status = enumeration.status;
    let stats = enumeration.stats;
    info!(found = enumeration.len(), "Enumeration finished.");

    // === Phase 2: Electronegativity filtering ===
    let found = enumeration.len();
    let survivors: Vec<Composition> = match &config.pauling {
        Some(options) => {
            let _phase = reporter.phase("Pauling Test");
            enumeration
                .into_items()
                .into_iter()
                .filter(|composition| {
                    let species: Vec<Species> =
                        composition.species().into_iter().cloned().collect();
                    pauling_test(&species, table, options)
                })
                .collect()
        }
        None => enumeration.into_items().into_iter().collect(),
    };
    let rejected = found - survivors.len();
    if config.pauling.is_some() {
        info!(kept = survivors.len(), rejected, "Pauling test applied.");
    }

    // === Phase 3: Annotation ===
    let candidates = {
        let _phase = reporter.phase("Annotating Candidates");
        survivors
            .into_iter()
            .map(|composition| -> Result<ScreenedComposition, EngineError> {
                let electronegativity = config
                    .electronegativity
                    .map(|source| {
                        let amounts: Vec<(&str, f64)> = composition
                            .element_amounts()
                            .into_iter()
                            .map(|(element, n)| (element, f64::from(n)))
                            .collect();
                        compound_electronegativity(table, &amounts, source)
                    })
                    .transpose()?;
                Ok(ScreenedComposition {
                    formula: composition.formula(),
                    composition,
                    electronegativity,
                })
            })
            .collect::<Result<Vec<_>, _>>()?
    };

    debug!(
        visited = stats.visited,
        pruned = stats.pruned,
        "Screening search statistics."
    );
    info!(
        "Screening complete. Returning {} candidate(s).",
        candidates.len()
    );
    Ok(ScreeningResult {
        candidates,
        rejected,
        status,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::properties::electronegativity::{
        ElectronegativitySource, PaulingTestOptions,
    };
    use crate::core::table::element::ElementData;
    use crate::engine::cancel::NeverCancel;
    use crate::engine::config::ScreeningConfigBuilder;
    use crate::engine::progress::Progress;
    use approx::assert_relative_eq;
    use std::sync::Mutex;

    fn table() -> SpeciesTable {
        SpeciesTable::from_elements([
            ElementData::new("Na", 11, &[-1, 1])
                .with_pauling_electronegativity(0.93)
                .with_ionization_potential(5.14)
                .with_electron_affinity(0.55),
            ElementData::new("Cl", 17, &[-1, 1])
                .with_pauling_electronegativity(3.16)
                .with_ionization_potential(12.97)
                .with_electron_affinity(3.61),
        ])
    }

    fn binary() -> SiteTemplate {
        SiteTemplate::builder()
            .classes(&["M", "X"])
            .site("M", 1, "M")
            .site("X", 1, "X")
            .build()
            .unwrap()
    }

    fn pools(table: &SpeciesTable) -> SpeciesPools {
        let everything: Vec<Species> = ["Na", "Cl"]
            .iter()
            .flat_map(|s| table.all_species(s).unwrap())
            .collect();
        SpeciesPools::new()
            .for_class("M", everything.clone())
            .for_class("X", everything)
    }

    #[test]
    fn pauling_test_drops_inverted_compounds() {
        let table = table();
        let unfiltered = run(
            &table,
            &binary(),
            &pools(&table),
            &ScreeningConfigBuilder::new().build().unwrap(),
            &NeverCancel,
            &ProgressReporter::new(),
        )
        .unwrap();
        let config = ScreeningConfigBuilder::new()
            .pauling_test(PaulingTestOptions::default())
            .build()
            .unwrap();
        let filtered = run(
            &table,
            &binary(),
            &pools(&table),
            &config,
            &NeverCancel,
            &ProgressReporter::new(),
        )
        .unwrap();

        assert!(unfiltered.candidates.len() > filtered.candidates.len());
        assert_eq!(
            filtered.rejected,
            unfiltered.candidates.len() - filtered.candidates.len()
        );
        for candidate in &filtered.candidates {
            let m = candidate.composition.species_at("M").unwrap();
            let x = candidate.composition.species_at("X").unwrap();
            assert!(m.oxidation_state() == -x.oxidation_state());
        }
        assert!(
            filtered
                .candidates
                .iter()
                .any(|c| c.composition.to_string() == "NaCl [M: Na+, X: Cl-]")
        );
        assert!(
            !filtered
                .candidates
                .iter()
                .any(|c| c.composition.to_string() == "NaCl [M: Na-, X: Cl+]")
        );
    }

    #[test]
    fn electronegativity_annotation_uses_geometric_mean() {
        let table = table();
        let config = ScreeningConfigBuilder::new()
            .pauling_test(PaulingTestOptions::default())
            .electronegativity(ElectronegativitySource::Pauling)
            .build()
            .unwrap();
        let result = run(
            &table,
            &binary(),
            &pools(&table),
            &config,
            &NeverCancel,
            &ProgressReporter::new(),
        )
        .unwrap();
        let nacl = result
            .candidates
            .iter()
            .find(|c| c.formula == "NaCl")
            .unwrap();
        let expected = (0.93f64 * 2.86 * 3.16 * 2.86).sqrt();
        assert_relative_eq!(nacl.electronegativity.unwrap(), expected, epsilon = 1e-9);
    }

    #[test]
    fn workflow_reports_its_phases() {
        let table = table();
        let events = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|e| {
            if let Progress::PhaseStart { name } = e {
                events.lock().unwrap().push(name);
            }
        }));
        let config = ScreeningConfigBuilder::new()
            .pauling_test(PaulingTestOptions::default())
            .build()
            .unwrap();
        run(
            &table,
            &binary(),
            &pools(&table),
            &config,
            &NeverCancel,
            &reporter,
        )
        .unwrap();
        drop(reporter);
        assert_eq!(
            events.into_inner().unwrap(),
            vec![
                "Enumerating Compositions",
                "Pauling Test",
                "Annotating Candidates"
            ]
        );
    }

    #[test]
    fn missing_property_data_is_an_error() {
        let table = SpeciesTable::from_elements([
            ElementData::new("Na", 11, &[1]),
            ElementData::new("Cl", 17, &[-1]),
        ]);
        let config = ScreeningConfigBuilder::new()
            .electronegativity(ElectronegativitySource::Mulliken)
            .build()
            .unwrap();
        let pools = SpeciesPools::new()
            .for_class("M", table.all_species("Na").unwrap())
            .for_class("X", table.all_species("Cl").unwrap());
        let err = run(
            &table,
            &binary(),
            &pools,
            &config,
            &NeverCancel,
            &ProgressReporter::new(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Property { .. }));
    }
}
