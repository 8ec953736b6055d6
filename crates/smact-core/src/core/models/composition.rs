use super::species::Species;
use serde::Serialize;
use std::fmt;

/// One site of a composition together with the species assigned to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SiteAssignment {
    pub site_id: String,
    pub multiplicity: u32,
    pub species: Species,
}

/// A charge-neutral assignment of species to the sites of a template.
///
/// Assignments are stored in template order, so two compositions of the same template compare
/// equal exactly when they assign the same species to every site. The derived ordering makes
/// result sets deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Composition {
    assignments: Vec<SiteAssignment>,
}

impl Composition {
    pub(crate) fn from_assignments(assignments: Vec<SiteAssignment>) -> Self {
        Self { assignments }
    }

    pub fn assignments(&self) -> &[SiteAssignment] {
        &self.assignments
    }

    pub fn species_at(&self, site_id: &str) -> Option<&Species> {
        self.assignments
            .iter()
            .find(|a| a.site_id == site_id)
            .map(|a| &a.species)
    }

    /// Σ oxidation state × multiplicity; zero for every composition the enumerator emits.
    pub fn net_charge(&self) -> i64 {
        self.assignments
            .iter()
            .map(|a| i64::from(a.species.oxidation_state()) * i64::from(a.multiplicity))
            .sum()
    }

    /// Number of physical positions, the sum of all multiplicities.
    pub fn site_count(&self) -> usize {
        self.assignments
            .iter()
            .map(|a| a.multiplicity as usize)
            .sum()
    }

    /// Distinct species in the composition, sorted.
    pub fn species(&self) -> Vec<&Species> {
        let mut species: Vec<&Species> = self.assignments.iter().map(|a| &a.species).collect();
        species.sort();
        species.dedup();
        species
    }

    /// Element amounts in order of first appearance, e.g. `[("Ba", 1), ("Ti", 1), ("O", 3)]`.
    pub fn element_amounts(&self) -> Vec<(&str, u32)> {
        let mut amounts: Vec<(&str, u32)> = Vec::new();
        for assignment in &self.assignments {
            let element = assignment.species.element();
            match amounts.iter_mut().find(|(e, _)| *e == element) {
                Some((_, amount)) => *amount += assignment.multiplicity,
                None => amounts.push((element, assignment.multiplicity)),
            }
        }
        amounts
    }

    /// Chemical formula with elements in order of first appearance, e.g. `BaTiO3`.
    pub fn formula(&self) -> String {
        self.element_amounts()
            .into_iter()
            .map(|(element, amount)| {
                if amount == 1 {
                    element.to_string()
                } else {
                    format!("{element}{amount}")
                }
            })
            .collect()
    }
}

impl fmt::Display for Composition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [", self.formula())?;
        for (i, a) in self.assignments.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", a.site_id, a.species)?;
        }
        write!(f, "]")
    }
}
