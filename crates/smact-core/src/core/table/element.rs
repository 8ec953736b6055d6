use serde::{Deserialize, Serialize};

/// Tabulated data for one chemical element.
///
/// Only the symbol, atomic number and oxidation states are mandatory; every scalar property is
/// optional because the published data sets do not cover the whole periodic table. Consumers
/// that need a property report its absence as an error instead of assuming a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementData {
    pub symbol: String,
    pub atomic_number: u8,
    /// Allowed formal oxidation states, sorted ascending and free of duplicates.
    pub oxidation_states: Vec<i32>,
    /// Pauling electronegativity (dimensionless).
    pub pauling_electronegativity: Option<f64>,
    /// First ionisation potential in eV.
    pub ionization_potential: Option<f64>,
    /// Electron affinity in eV.
    pub electron_affinity: Option<f64>,
    /// Harrison valence p-orbital eigenvalue in eV.
    pub eig: Option<f64>,
    /// Harrison valence s-orbital eigenvalue in eV.
    pub eig_s: Option<f64>,
    /// Solid-state energy in eV (original data set).
    pub sse: Option<f64>,
    /// Solid-state energy in eV (2015 revision).
    pub sse_2015: Option<f64>,
}

impl ElementData {
    /// Creates an entry without any optional properties.
    pub fn new(symbol: &str, atomic_number: u8, oxidation_states: &[i32]) -> Self {
        let mut states = oxidation_states.to_vec();
        states.sort_unstable();
        states.dedup();
        Self {
            symbol: symbol.to_string(),
            atomic_number,
            oxidation_states: states,
            pauling_electronegativity: None,
            ionization_potential: None,
            electron_affinity: None,
            eig: None,
            eig_s: None,
            sse: None,
            sse_2015: None,
        }
    }

    pub fn with_pauling_electronegativity(mut self, value: f64) -> Self {
        self.pauling_electronegativity = Some(value);
        self
    }

    pub fn with_ionization_potential(mut self, value: f64) -> Self {
        self.ionization_potential = Some(value);
        self
    }

    pub fn with_electron_affinity(mut self, value: f64) -> Self {
        self.electron_affinity = Some(value);
        self
    }

    pub fn with_eigenvalues(mut self, eig: f64, eig_s: f64) -> Self {
        self.eig = Some(eig);
        self.eig_s = Some(eig_s);
        self
    }

    pub fn with_sse(mut self, sse: f64) -> Self {
        self.sse = Some(sse);
        self
    }

    pub fn with_sse_2015(mut self, sse_2015: f64) -> Self {
        self.sse_2015 = Some(sse_2015);
        self
    }

    pub fn allows(&self, oxidation_state: i32) -> bool {
        self.oxidation_states.binary_search(&oxidation_state).is_ok()
    }

    /// Mulliken electronegativity, the mean of ionisation potential and electron affinity.
    pub fn mulliken_electronegativity(&self) -> Option<f64> {
        Some((self.ionization_potential? + self.electron_affinity?) / 2.0)
    }
}
