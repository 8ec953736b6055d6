use super::error::EngineError;
use crate::core::geometry::provider::GeometryTemplate;
use crate::core::models::structure::{PlacedAtom, SiteOccupancy, Structure};
use tracing::debug;

/// Places the occupants of a composition or pattern onto a geometry template.
///
/// Each occupied site is expanded into `multiplicity` consecutive positions in template
/// order, and the `n`-th expanded position takes the geometry's `n`-th fractional coordinate.
/// The result depends only on the inputs.
pub fn build<O, G>(occupancy: &O, geometry: &G) -> Result<Structure, EngineError>
where
    O: SiteOccupancy + ?Sized,
    G: GeometryTemplate + ?Sized,
{
    let sites = occupancy.occupied_sites();
    let expanded: usize = sites.iter().map(|s| s.multiplicity as usize).sum();
    if expanded != geometry.site_count() {
        return Err(EngineError::SiteCountMismatch {
            geometry: geometry.site_count(),
            occupancy: expanded,
        });
    }

    let mut atoms = Vec::with_capacity(expanded);
    for site in sites {
        for _ in 0..site.multiplicity {
            let index = atoms.len();
            let fractional = geometry.fractional_coordinate(index).ok_or_else(|| {
                EngineError::Internal(format!(
                    "geometry reports {} positions but has no coordinate for index {index}",
                    geometry.site_count()
                ))
            })?;
            atoms.push(PlacedAtom {
                occupant: site.occupant.clone(),
                site_id: site.site_id.clone(),
                fractional,
            });
        }
    }

    debug!(atoms = atoms.len(), "Built structure.");
    Ok(Structure::new(*geometry.lattice(), atoms))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::lattice::Lattice;
    use crate::core::geometry::prototypes::Prototype;
    use crate::core::geometry::provider::ExplicitGeometry;
    use crate::core::models::structure::{Occupant, OccupiedSite};
    use crate::core::table::element::ElementData;
    use crate::core::table::registry::SpeciesTable;
    use crate::engine::stoichiometry::{self, SpeciesPools};
    use crate::engine::substitution::{self, Occupancy, SubstituentPool};
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    fn table() -> SpeciesTable {
        SpeciesTable::from_elements([
            ElementData::new("Ba", 56, &[2]),
            ElementData::new("Ti", 22, &[4]),
            ElementData::new("O", 8, &[-2]),
        ])
    }

    #[test]
    fn composition_expands_onto_prototype_positions() {
        let table = table();
        let prototype = Prototype::named("cubic-perovskite").unwrap();
        let template = prototype.site_template().unwrap();
        let pools = SpeciesPools::new()
            .for_site("A", table.all_species("Ba").unwrap())
            .for_site("B", table.all_species("Ti").unwrap())
            .for_site("X", table.all_species("O").unwrap());
        let compositions = stoichiometry::enumerate(&template, &pools).unwrap();
        let composition = compositions.iter().next().unwrap();

        let structure = build(composition, &prototype.geometry().unwrap()).unwrap();
        assert_eq!(structure.len(), 5);
        assert_eq!(structure.atoms()[0].occupant.to_string(), "Ba2+");
        assert_eq!(structure.atoms()[4].site_id, "X");
        assert_eq!(structure.symbol_counts().get("O"), Some(&3));
    }

    #[test]
    fn pattern_is_placed_on_its_sublattice() {
        let prototype = Prototype::named("cubic-perovskite")
            .unwrap()
            .with_repetitions([2, 1, 1])
            .unwrap();
        let template = prototype.sublattice_template("A").unwrap();
        let pool = SubstituentPool::new()
            .with("Ba", Occupancy::Any)
            .with("Sr", Occupancy::Exactly(1));
        let patterns = substitution::enumerate(&template, &pool).unwrap();
        assert_eq!(patterns.len(), 1);

        let geometry = prototype.sublattice_geometry("A").unwrap();
        let structure = build(patterns.iter().next().unwrap(), &geometry).unwrap();
        assert_eq!(structure.len(), 2);
        assert_eq!(structure.atoms()[1].occupant, Occupant::Label("Sr".to_string()));
        assert_relative_eq!(structure.atoms()[1].fractional, Point3::new(0.5, 0.0, 0.0));
    }

    #[test]
    fn mismatched_counts_are_rejected() {
        let geometry = ExplicitGeometry::new(
            Lattice::cubic(3.0).unwrap(),
            vec![Point3::origin(), Point3::new(0.5, 0.5, 0.5)],
        );
        let sites = vec![OccupiedSite {
            site_id: "A".to_string(),
            multiplicity: 3,
            occupant: Occupant::Label("Cs".to_string()),
        }];
        assert!(matches!(
            build(&sites, &geometry),
            Err(EngineError::SiteCountMismatch {
                geometry: 2,
                occupancy: 3
            })
        ));
    }

    #[test]
    fn enumerated_patterns_build_identically_every_time() {
        let prototype = Prototype::named("cubic-perovskite")
            .unwrap()
            .with_repetitions([2, 2, 1])
            .unwrap();
        let template = prototype.sublattice_template("A").unwrap();
        let geometry = prototype.sublattice_geometry("A").unwrap();
        let pool = SubstituentPool::unrestricted(["Ba", "Sr"]);
        let patterns = substitution::enumerate(&template, &pool).unwrap();
        assert!(patterns.len() > 1);
        for pattern in &patterns {
            let first = build(pattern, &geometry).unwrap();
            let second = build(pattern, &geometry).unwrap();
            assert_eq!(first, second);
            assert_eq!(first.len(), 4);
        }
    }

    #[test]
    fn enumerated_composition_builds_identically_every_time() {
        let table = table();
        let prototype = Prototype::named("cubic-perovskite").unwrap();
        let pools = SpeciesPools::new()
            .for_site("A", table.all_species("Ba").unwrap())
            .for_site("B", table.all_species("Ti").unwrap())
            .for_site("X", table.all_species("O").unwrap());
        let compositions = stoichiometry::enumerate(&prototype.site_template().unwrap(), &pools).unwrap();
        let composition = compositions.iter().next().unwrap();
        let geometry = prototype.geometry().unwrap();
        assert_eq!(
            build(composition, &geometry).unwrap(),
            build(composition, &geometry).unwrap()
        );
    }
}
