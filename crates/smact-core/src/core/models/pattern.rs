use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Shared description of the sub-lattice a family of patterns lives on.
///
/// Every pattern produced by one enumeration run points to the same frame, so a pattern only
/// owns its encoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PatternFrame {
    pub(crate) site_ids: Vec<String>,
    pub(crate) multiplicities: Vec<u32>,
    /// Substituent labels in ascending order; a label is encoded as its index here.
    pub(crate) labels: Vec<String>,
}

impl PatternFrame {
    pub fn site_ids(&self) -> &[String] {
        &self.site_ids
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

/// A symmetry-distinct distribution of substituent labels over the sites of a sub-lattice.
///
/// The stored assignment is the canonical member of its orbit: the lexicographically smallest
/// encoding, where each label is encoded by its index in the sorted substituent pool.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubstitutionPattern {
    encoding: Vec<u16>,
    frame: Arc<PatternFrame>,
}

impl SubstitutionPattern {
    pub(crate) fn new(encoding: Vec<u16>, frame: Arc<PatternFrame>) -> Self {
        debug_assert_eq!(encoding.len(), frame.site_ids.len());
        Self { encoding, frame }
    }

    /// Label indices per site, in template order.
    pub fn encoding(&self) -> &[u16] {
        &self.encoding
    }

    pub fn frame(&self) -> &PatternFrame {
        &self.frame
    }

    pub fn label_at(&self, site_id: &str) -> Option<&str> {
        let index = self.frame.site_ids.iter().position(|id| id == site_id)?;
        Some(self.label_of(index))
    }

    /// `(site id, label)` pairs in template order.
    pub fn assignments(&self) -> impl Iterator<Item = (&str, &str)> {
        self.frame
            .site_ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_str(), self.label_of(i)))
    }

    /// Number of positions carrying each label, weighted by site multiplicity.
    pub fn counts(&self) -> BTreeMap<&str, u32> {
        let mut counts = BTreeMap::new();
        for (i, &code) in self.encoding.iter().enumerate() {
            *counts
                .entry(self.frame.labels[code as usize].as_str())
                .or_insert(0) += self.frame.multiplicities[i];
        }
        counts
    }

    pub(crate) fn multiplicity_at(&self, index: usize) -> u32 {
        self.frame.multiplicities[index]
    }

    pub(crate) fn label_of(&self, index: usize) -> &str {
        &self.frame.labels[self.encoding[index] as usize]
    }
}

impl fmt::Display for SubstitutionPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (site, label)) in self.assignments().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{site}:{label}")?;
        }
        Ok(())
    }
}

impl Serialize for SubstitutionPattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.encoding.len()))?;
        for (site, label) in self.assignments() {
            map.serialize_entry(site, label)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> Arc<PatternFrame> {
        Arc::new(PatternFrame {
            site_ids: vec!["A1".to_string(), "A2".to_string(), "A3".to_string()],
            multiplicities: vec![1, 1, 2],
            labels: vec!["Ba".to_string(), "Sr".to_string()],
        })
    }

    #[test]
    fn label_lookup_follows_encoding() {
        let pattern = SubstitutionPattern::new(vec![0, 1, 0], frame());
        assert_eq!(pattern.label_at("A2"), Some("Sr"));
        assert_eq!(pattern.label_at("A9"), None);
        assert_eq!(pattern.to_string(), "A1:Ba A2:Sr A3:Ba");
    }

    #[test]
    fn counts_weight_by_multiplicity() {
        let pattern = SubstitutionPattern::new(vec![1, 0, 1], frame());
        let counts = pattern.counts();
        assert_eq!(counts.get("Sr"), Some(&3));
        assert_eq!(counts.get("Ba"), Some(&1));
    }

    #[test]
    fn patterns_order_by_encoding() {
        let a = SubstitutionPattern::new(vec![0, 0, 1], frame());
        let b = SubstitutionPattern::new(vec![0, 1, 0], frame());
        assert!(a < b);
    }
}
