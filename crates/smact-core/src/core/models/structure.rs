use super::composition::Composition;
use super::pattern::SubstitutionPattern;
use super::species::Species;
use crate::core::geometry::lattice::Lattice;
use nalgebra::Point3;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// What sits on a placed position: a full ionic species or a bare substituent label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Occupant {
    Ion(Species),
    Label(String),
}

impl Occupant {
    /// The element symbol for an ion, the label itself otherwise.
    pub fn symbol(&self) -> &str {
        match self {
            Self::Ion(species) => species.element(),
            Self::Label(label) => label,
        }
    }

    pub fn species(&self) -> Option<&Species> {
        match self {
            Self::Ion(species) => Some(species),
            Self::Label(_) => None,
        }
    }
}

impl fmt::Display for Occupant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ion(species) => write!(f, "{species}"),
            Self::Label(label) => f.write_str(label),
        }
    }
}

impl Serialize for Occupant {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One template site with its occupant, before expansion into positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupiedSite {
    pub site_id: String,
    pub multiplicity: u32,
    pub occupant: Occupant,
}

/// Anything that assigns an occupant to every site of a template, in template order.
///
/// The structure builder expands each site into `multiplicity` consecutive positions.
pub trait SiteOccupancy {
    fn occupied_sites(&self) -> Vec<OccupiedSite>;

    fn site_count(&self) -> usize {
        self.occupied_sites()
            .iter()
            .map(|site| site.multiplicity as usize)
            .sum()
    }
}

impl SiteOccupancy for Composition {
    fn occupied_sites(&self) -> Vec<OccupiedSite> {
        self.assignments()
            .iter()
            .map(|a| OccupiedSite {
                site_id: a.site_id.clone(),
                multiplicity: a.multiplicity,
                occupant: Occupant::Ion(a.species.clone()),
            })
            .collect()
    }

    fn site_count(&self) -> usize {
        Composition::site_count(self)
    }
}

impl SiteOccupancy for SubstitutionPattern {
    fn occupied_sites(&self) -> Vec<OccupiedSite> {
        (0..self.encoding().len())
            .map(|i| OccupiedSite {
                site_id: self.frame().site_ids()[i].clone(),
                multiplicity: self.multiplicity_at(i),
                occupant: Occupant::Label(self.label_of(i).to_string()),
            })
            .collect()
    }
}

impl SiteOccupancy for [OccupiedSite] {
    fn occupied_sites(&self) -> Vec<OccupiedSite> {
        self.to_vec()
    }
}

impl SiteOccupancy for Vec<OccupiedSite> {
    fn occupied_sites(&self) -> Vec<OccupiedSite> {
        self.clone()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedAtom {
    pub occupant: Occupant,
    pub site_id: String,
    pub fractional: Point3<f64>,
}

/// A lattice plus the atoms placed in it.
#[derive(Debug, Clone, PartialEq)]
pub struct Structure {
    lattice: Lattice,
    atoms: Vec<PlacedAtom>,
}

impl Structure {
    pub(crate) fn new(lattice: Lattice, atoms: Vec<PlacedAtom>) -> Self {
        Self { lattice, atoms }
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub fn atoms(&self) -> &[PlacedAtom] {
        &self.atoms
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn cartesian_positions(&self) -> Vec<Point3<f64>> {
        self.atoms
            .iter()
            .map(|atom| self.lattice.to_cartesian(&atom.fractional))
            .collect()
    }

    /// Number of atoms per occupant symbol.
    pub fn symbol_counts(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for atom in &self.atoms {
            *counts.entry(atom.occupant.symbol()).or_insert(0) += 1;
        }
        counts
    }
}

impl Serialize for Structure {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(serde::Serialize)]
        struct AtomRecord<'a> {
            occupant: &'a Occupant,
            site: &'a str,
            fractional: [f64; 3],
            cartesian: [f64; 3],
        }

        let vectors: Vec<[f64; 3]> = self
            .lattice
            .vectors()
            .iter()
            .map(|v| [v.x, v.y, v.z])
            .collect();
        let atoms: Vec<AtomRecord<'_>> = self
            .atoms
            .iter()
            .map(|atom| {
                let cartesian = self.lattice.to_cartesian(&atom.fractional);
                AtomRecord {
                    occupant: &atom.occupant,
                    site: &atom.site_id,
                    fractional: [atom.fractional.x, atom.fractional.y, atom.fractional.z],
                    cartesian: [cartesian.x, cartesian.y, cartesian.z],
                }
            })
            .collect();

        let mut state = serializer.serialize_struct("Structure", 2)?;
        state.serialize_field("lattice", &vectors)?;
        state.serialize_field("atoms", &atoms)?;
        state.end()
    }
}
