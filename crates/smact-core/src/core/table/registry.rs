use super::element::ElementData;
use crate::core::models::species::{Species, parse_ion_label};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("Unknown element: '{0}'")]
    UnknownElement(String),
    #[error("Oxidation state {oxidation_state} is not allowed for {element} (allowed: {allowed:?})")]
    InvalidOxidationState {
        element: String,
        oxidation_state: i32,
        allowed: Vec<i32>,
    },
    #[error("Malformed species label: '{0}'")]
    MalformedSpecies(String),
}

/// Read-only lookup from element symbol to its tabulated data.
///
/// The table is the only way to obtain a [`Species`]: [`SpeciesTable::species`] rejects
/// oxidation states the element does not allow, so every species handed to the enumerators is
/// valid by construction.
#[derive(Debug, Clone, Default)]
pub struct SpeciesTable {
    elements: BTreeMap<String, ElementData>,
}

impl SpeciesTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_elements(elements: impl IntoIterator<Item = ElementData>) -> Self {
        let mut table = Self::new();
        for element in elements {
            table.insert(element);
        }
        table
    }

    /// Adds or replaces the entry for `element.symbol`.
    pub fn insert(&mut self, element: ElementData) {
        self.elements.insert(element.symbol.clone(), element);
    }

    pub fn get(&self, symbol: &str) -> Option<&ElementData> {
        self.elements.get(symbol)
    }

    /// Like [`get`](Self::get), but reports a missing symbol as [`TableError::UnknownElement`].
    pub fn element(&self, symbol: &str) -> Result<&ElementData, TableError> {
        self.get(symbol)
            .ok_or_else(|| TableError::UnknownElement(symbol.to_string()))
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.elements.contains_key(symbol)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// All symbols in alphabetical order.
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.elements.keys().map(String::as_str)
    }

    /// Validates `(symbol, oxidation_state)` against the table and returns the species.
    pub fn species(&self, symbol: &str, oxidation_state: i32) -> Result<Species, TableError> {
        let element = self.element(symbol)?;
        if !element.allows(oxidation_state) {
            return Err(TableError::InvalidOxidationState {
                element: symbol.to_string(),
                oxidation_state,
                allowed: element.oxidation_states.clone(),
            });
        }
        Ok(Species::new(&element.symbol, oxidation_state))
    }

    /// Parses an ionic label such as `"Ti4+"` and validates it against the table.
    pub fn parse_species(&self, label: &str) -> Result<Species, TableError> {
        let (symbol, oxidation_state) =
            parse_ion_label(label).ok_or_else(|| TableError::MalformedSpecies(label.to_string()))?;
        self.species(&symbol, oxidation_state)
    }

    /// Every species of `symbol`, one per allowed oxidation state, in ascending order.
    pub fn all_species(&self, symbol: &str) -> Result<Vec<Species>, TableError> {
        let element = self.element(symbol)?;
        Ok(element
            .oxidation_states
            .iter()
            .map(|&state| Species::new(&element.symbol, state))
            .collect())
    }

    /// Species of each element in `symbols` whose oxidation state is listed in `states`.
    ///
    /// This is the usual way of building a candidate pool for a site, e.g. "all of Ba, Sr, Ca
    /// in state +2". Elements without a matching state contribute nothing.
    pub fn species_with_states(
        &self,
        symbols: &[&str],
        states: &[i32],
    ) -> Result<Vec<Species>, TableError> {
        let mut pool = Vec::new();
        for symbol in symbols {
            let element = self.element(symbol)?;
            pool.extend(
                element
                    .oxidation_states
                    .iter()
                    .filter(|state| states.contains(state))
                    .map(|&state| Species::new(&element.symbol, state)),
            );
        }
        pool.sort();
        pool.dedup();
        Ok(pool)
    }

    /// Symbols of all elements with `first_z <= Z <= last_z`, ordered by atomic number.
    pub fn ordered_elements(&self, first_z: u8, last_z: u8) -> Vec<&str> {
        let mut selected: Vec<&ElementData> = self
            .elements
            .values()
            .filter(|e| (first_z..=last_z).contains(&e.atomic_number))
            .collect();
        selected.sort_by_key(|e| e.atomic_number);
        selected.into_iter().map(|e| e.symbol.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> SpeciesTable {
        SpeciesTable::from_elements([
            ElementData::new("Ba", 56, &[2]),
            ElementData::new("Ti", 22, &[2, 3, 4]),
            ElementData::new("O", 8, &[-2]),
            ElementData::new("Sr", 38, &[2]),
        ])
    }

    #[test]
    fn species_accepts_allowed_state() {
        let ti = table().species("Ti", 4).unwrap();
        assert_eq!(ti.element(), "Ti");
        assert_eq!(ti.oxidation_state(), 4);
    }

    #[test]
    fn species_rejects_disallowed_state() {
        assert_eq!(
            table().species("Ba", 3),
            Err(TableError::InvalidOxidationState {
                element: "Ba".to_string(),
                oxidation_state: 3,
                allowed: vec![2],
            })
        );
    }

    #[test]
    fn species_rejects_unknown_element() {
        assert_eq!(
            table().species("Xx", 1),
            Err(TableError::UnknownElement("Xx".to_string()))
        );
    }

    #[test]
    fn parse_species_validates_label_and_state() {
        let table = table();
        assert_eq!(table.parse_species("O2-").unwrap().to_string(), "O2-");
        assert!(matches!(
            table.parse_species("O2+"),
            Err(TableError::InvalidOxidationState { .. })
        ));
        assert_eq!(
            table.parse_species("2O"),
            Err(TableError::MalformedSpecies("2O".to_string()))
        );
    }

    #[test]
    fn all_species_lists_every_state() {
        let states: Vec<i32> = table()
            .all_species("Ti")
            .unwrap()
            .iter()
            .map(Species::oxidation_state)
            .collect();
        assert_eq!(states, vec![2, 3, 4]);
    }

    #[test]
    fn species_with_states_filters_and_sorts() {
        let pool = table()
            .species_with_states(&["Ti", "Sr", "Ba"], &[2])
            .unwrap();
        let labels: Vec<String> = pool.iter().map(ToString::to_string).collect();
        assert_eq!(labels, vec!["Ba2+", "Sr2+", "Ti2+"]);
    }

    #[test]
    fn ordered_elements_sorts_by_atomic_number() {
        assert_eq!(table().ordered_elements(1, 40), vec!["O", "Ti", "Sr"]);
        assert!(table().ordered_elements(60, 90).is_empty());
    }
}
