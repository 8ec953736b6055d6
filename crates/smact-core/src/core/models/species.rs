use serde::Serialize;
use std::fmt;

/// An ion: a chemical element in a definite oxidation state.
///
/// Species are compared, ordered and hashed by `(element, oxidation_state)`, which makes
/// them usable directly as members of candidate pools and as values inside compositions.
/// Elemental property scalars (electronegativity, eigenvalues, solid-state energies) are not
/// carried by the species itself; they are looked up through the
/// [`SpeciesTable`](crate::core::table::registry::SpeciesTable) that validated it.
///
/// A `Species` can only be obtained from a table, so its oxidation state is always one of the
/// element's allowed states.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Species {
    element: String,
    oxidation_state: i32,
}

impl Species {
    pub(crate) fn new(element: &str, oxidation_state: i32) -> Self {
        Self {
            element: element.to_string(),
            oxidation_state,
        }
    }

    /// The element symbol (e.g. `"Fe"`).
    pub fn element(&self) -> &str {
        &self.element
    }

    /// The formal oxidation state of the ion.
    pub fn oxidation_state(&self) -> i32 {
        self.oxidation_state
    }

    pub fn is_cation(&self) -> bool {
        self.oxidation_state > 0
    }

    pub fn is_anion(&self) -> bool {
        self.oxidation_state < 0
    }
}

impl fmt::Display for Species {
    /// Formats the species in the usual ionic notation, e.g. `Fe3+`, `O2-`, `Na+`, `Fe0`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let magnitude = self.oxidation_state.unsigned_abs();
        let sign = match self.oxidation_state.signum() {
            1 => "+",
            -1 => "-",
            _ => "",
        };
        if magnitude == 1 {
            write!(f, "{}{}", self.element, sign)
        } else {
            write!(f, "{}{}{}", self.element, magnitude, sign)
        }
    }
}

/// Splits an ionic label such as `"Fe3+"`, `"O2-"` or `"Cl-"` into its element symbol and
/// signed oxidation state.
///
/// A bare element symbol parses with oxidation state zero. Returns `None` for labels that do
/// not follow the `<Symbol><magnitude?><sign>` shape.
pub(crate) fn parse_ion_label(label: &str) -> Option<(String, i32)> {
    let label = label.trim();
    let symbol_end = label
        .char_indices()
        .skip(1)
        .find(|(_, c)| !c.is_ascii_lowercase())
        .map(|(i, _)| i)
        .unwrap_or(label.len());
    let (symbol, charge) = label.split_at(symbol_end);

    let mut chars = symbol.chars();
    if !chars.next().is_some_and(|c| c.is_ascii_uppercase()) {
        return None;
    }

    if charge.is_empty() {
        return Some((symbol.to_string(), 0));
    }

    let (digits, sign) = if let Some(digits) = charge.strip_suffix('+') {
        (digits, 1)
    } else if let Some(digits) = charge.strip_suffix('-') {
        (digits, -1)
    } else {
        return None;
    };
    let magnitude: i32 = if digits.is_empty() {
        1
    } else {
        digits.parse().ok()?
    };
    Some((symbol.to_string(), sign * magnitude))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_ionic_notation() {
        assert_eq!(Species::new("Fe", 3).to_string(), "Fe3+");
        assert_eq!(Species::new("O", -2).to_string(), "O2-");
        assert_eq!(Species::new("Na", 1).to_string(), "Na+");
        assert_eq!(Species::new("Cl", -1).to_string(), "Cl-");
        assert_eq!(Species::new("Fe", 0).to_string(), "Fe0");
    }

    #[test]
    fn species_order_by_element_then_oxidation_state() {
        let mut pool = vec![
            Species::new("O", -2),
            Species::new("Fe", 3),
            Species::new("Fe", 2),
        ];
        pool.sort();
        assert_eq!(
            pool,
            vec![
                Species::new("Fe", 2),
                Species::new("Fe", 3),
                Species::new("O", -2)
            ]
        );
    }

    #[test]
    fn cation_and_anion_flags_follow_sign() {
        assert!(Species::new("Ba", 2).is_cation());
        assert!(Species::new("O", -2).is_anion());
        let neutral = Species::new("Fe", 0);
        assert!(!neutral.is_cation() && !neutral.is_anion());
    }

    #[test]
    fn parse_ion_label_handles_common_forms() {
        assert_eq!(parse_ion_label("Fe3+"), Some(("Fe".to_string(), 3)));
        assert_eq!(parse_ion_label("O2-"), Some(("O".to_string(), -2)));
        assert_eq!(parse_ion_label("Cl-"), Some(("Cl".to_string(), -1)));
        assert_eq!(parse_ion_label("Na+"), Some(("Na".to_string(), 1)));
        assert_eq!(parse_ion_label(" Ti4+ "), Some(("Ti".to_string(), 4)));
        assert_eq!(parse_ion_label("Zn"), Some(("Zn".to_string(), 0)));
    }

    #[test]
    fn parse_ion_label_rejects_malformed_labels() {
        assert_eq!(parse_ion_label(""), None);
        assert_eq!(parse_ion_label("fe3+"), None);
        assert_eq!(parse_ion_label("Fe3"), None);
        assert_eq!(parse_ion_label("Fe?+"), None);
        assert_eq!(parse_ion_label("Fe3\u{2212}"), None);
    }
}
