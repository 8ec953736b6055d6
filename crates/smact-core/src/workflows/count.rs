use crate::core::models::species::Species;
use crate::core::properties::electronegativity::pauling_test;
use crate::core::table::registry::SpeciesTable;
use crate::engine::cancel::Cancellation;
use crate::engine::config::CountConfig;
use crate::engine::error::EngineError;
use crate::engine::outcome::EnumerationStatus;
use crate::engine::progress::ProgressReporter;
use crate::engine::ratios::neutral_ratios;
use itertools::Itertools;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, instrument};

/// Tallies for one combination size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CountEntry {
    /// Species combinations examined.
    pub combinations: u64,
    /// Combinations left after the Pauling test (all of them when it is off).
    pub plausible: u64,
    /// Plausible combinations with at least one neutral ratio.
    pub neutral: u64,
    /// Neutral ratios summed over all plausible combinations.
    pub ratios: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountResult {
    /// Keyed by the number of species in the combination.
    pub by_size: BTreeMap<usize, CountEntry>,
    pub status: EnumerationStatus,
}

/// Counts charge-neutral stoichiometries over every combination of `2..=max_ions` distinct
/// species of `elements`.
///
/// Species in oxidation state zero are left out. Ratio counts depend only on the sorted tuple
/// of oxidation states, so they are computed once per tuple.
///
/// Every species combination is counted exactly once. Counting per element subset instead
/// (drawing `size` states from the union of each subset of up to `size` elements) visits a
/// combination once for every subset containing its elements, so its totals are larger
/// whenever `elements` has more members than the combination uses.
#[instrument(skip_all, name = "count_workflow")]
pub fn run<C: Cancellation + ?Sized>(
    table: &SpeciesTable,
    elements: &[&str],
    config: &CountConfig,
    cancel: &C,
    reporter: &ProgressReporter,
) -> Result<CountResult, EngineError> {
    let mut species: Vec<Species> = Vec::new();
    for symbol in elements {
        species.extend(
            table
                .all_species(symbol)?
                .into_iter()
                .filter(|s| s.oxidation_state() != 0),
        );
    }
    species.sort();
    species.dedup();
    info!(
        elements = elements.len(),
        species = species.len(),
        max_ions = config.max_ions,
        threshold = config.threshold,
        "Counting neutral stoichiometries."
    );

    let mut memo: HashMap<Vec<i32>, u64> = HashMap::new();
    let mut by_size = BTreeMap::new();
    let mut status = EnumerationStatus::Complete;

    'sizes: for size in 2..=config.max_ions.min(species.len()) {
        let _phase = reporter.phase("Counting Combinations");
        let task = reporter.task(binomial(species.len(), size));
        let mut entry = CountEntry::default();

        for combination in species.iter().cloned().combinations(size) {
            if cancel.is_cancelled() {
                status = EnumerationStatus::Cancelled;
                by_size.insert(size, entry);
                break 'sizes;
            }
            entry.combinations += 1;
            task.increment();

            if let Some(options) = &config.pauling {
                if !pauling_test(&combination, table, options) {
                    continue;
                }
            }
            entry.plausible += 1;

            let mut states: Vec<i32> = combination.iter().map(Species::oxidation_state).collect();
            states.sort_unstable();
            let ratios = *memo.entry(states).or_insert_with_key(|states| {
                neutral_ratios(states, config.threshold, config.primitive_only).len() as u64
            });
            if ratios > 0 {
                entry.neutral += 1;
                entry.ratios += ratios;
            }
        }

        debug!(size, ?entry, "Finished combination size.");
        by_size.insert(size, entry);
    }

    info!(
        distinct_state_tuples = memo.len(),
        complete = status == EnumerationStatus::Complete,
        "Counting complete."
    );
    Ok(CountResult { by_size, status })
}

fn binomial(n: usize, k: usize) -> u64 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k) as u64;
    let n = n as u64;
    (0..k).fold(1u64, |acc, i| acc * (n - i) / (i + 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::properties::electronegativity::PaulingTestOptions;
    use crate::core::table::element::ElementData;
    use crate::engine::cancel::{NeverCancel, PollBudget};
    use crate::engine::config::CountConfigBuilder;

    fn table() -> SpeciesTable {
        SpeciesTable::from_elements([
            ElementData::new("Na", 11, &[-1, 0, 1]).with_pauling_electronegativity(0.93),
            ElementData::new("Cl", 17, &[-1, 1]).with_pauling_electronegativity(3.16),
            ElementData::new("O", 8, &[-2]).with_pauling_electronegativity(3.44),
        ])
    }

    #[test]
    fn binomial_matches_small_cases() {
        assert_eq!(binomial(5, 2), 10);
        assert_eq!(binomial(6, 3), 20);
        assert_eq!(binomial(2, 3), 0);
    }

    #[test]
    fn binary_counts_without_pauling_test() {
        // Species: Cl-, Cl+, Na-, Na+, O2-.
        let config = CountConfigBuilder::new()
            .max_ions(2)
            .threshold(2)
            .build()
            .unwrap();
        let result = run(
            &table(),
            &["Na", "Cl", "O"],
            &config,
            &NeverCancel,
            &ProgressReporter::new(),
        )
        .unwrap();
        let pairs = result.by_size[&2];
        assert_eq!(pairs.combinations, 10);
        assert_eq!(pairs.plausible, 10);
        // (+1,-1) pairs: Cl-Cl+, Cl-Na+, Cl+Na-, Na-Na+ => 2 ratios each up to 2: [1,1],[2,2].
        // (-2,+1) pairs: Cl+O2-, Na+O2- => [1,2].
        assert_eq!(pairs.neutral, 6);
        assert_eq!(pairs.ratios, 4 * 2 + 2);
    }

    #[test]
    fn species_combinations_are_not_recounted_per_element_subset() {
        let config = CountConfigBuilder::new()
            .max_ions(2)
            .threshold(2)
            .build()
            .unwrap();
        let reporter = ProgressReporter::new();
        let pair = run(&table(), &["Na", "O"], &config, &NeverCancel, &reporter).unwrap();
        let triple = run(&table(), &["Na", "Cl", "O"], &config, &NeverCancel, &reporter).unwrap();
        // Na-, Na+, O2-: Na-Na+ gives two ratios and Na+O2- one. Adding Cl must not count
        // them a second time.
        assert_eq!(pair.by_size[&2].combinations, 3);
        assert_eq!(pair.by_size[&2].ratios, 3);
        assert_eq!(triple.by_size[&2].ratios, 4 * 2 + 2);
    }

    #[test]
    fn pauling_test_and_primitive_ratios_reduce_counts() {
        let config = CountConfigBuilder::new()
            .max_ions(2)
            .threshold(2)
            .pauling_test(PaulingTestOptions::default())
            .primitive_only(true)
            .build()
            .unwrap();
        let result = run(
            &table(),
            &["Na", "Cl", "O"],
            &config,
            &NeverCancel,
            &ProgressReporter::new(),
        )
        .unwrap();
        let pairs = result.by_size[&2];
        // Cl-Cl+, Cl+Na- and Na-Na+ fail; of the rest only Cl-Na+, Cl+O2- and Na+O2- balance.
        assert_eq!(pairs.plausible, 7);
        assert_eq!(pairs.neutral, 3);
        assert_eq!(pairs.ratios, 3);
    }

    #[test]
    fn larger_sizes_are_counted_up_to_max_ions() {
        let config = CountConfigBuilder::new()
            .max_ions(3)
            .threshold(3)
            .build()
            .unwrap();
        let result = run(
            &table(),
            &["Na", "Cl", "O"],
            &config,
            &NeverCancel,
            &ProgressReporter::new(),
        )
        .unwrap();
        assert_eq!(result.by_size.len(), 2);
        assert_eq!(result.by_size[&3].combinations, 10);
        assert!(result.by_size[&3].neutral > 0);
    }

    #[test]
    fn unknown_element_is_an_error_and_cancellation_is_reported() {
        let config = CountConfigBuilder::new()
            .max_ions(2)
            .threshold(2)
            .build()
            .unwrap();
        assert!(matches!(
            run(&table(), &["Xx"], &config, &NeverCancel, &ProgressReporter::new()),
            Err(EngineError::Species { .. })
        ));

        let result = run(
            &table(),
            &["Na", "Cl", "O"],
            &config,
            &PollBudget::new(3),
            &ProgressReporter::new(),
        )
        .unwrap();
        assert_eq!(result.status, EnumerationStatus::Cancelled);
        assert_eq!(result.by_size[&2].combinations, 3);
    }
}
