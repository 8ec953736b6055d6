use crate::core::geometry::prototypes::Prototype;
use crate::core::models::pattern::SubstitutionPattern;
use crate::core::models::site::SiteTemplate;
use crate::core::models::structure::{Occupant, OccupiedSite, SiteOccupancy, Structure};
use crate::engine::builder;
use crate::engine::cancel::Cancellation;
use crate::engine::config::SubstitutionConfig;
use crate::engine::error::EngineError;
use crate::engine::outcome::{Enumeration, EnumerationStatus, SearchStats};
use crate::engine::progress::ProgressReporter;
use crate::engine::substitution::{SubstituentPool, SubstitutionEnumerator};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{info, instrument};

/// Enumerates the symmetry-distinct patterns of `pool` over an arbitrary sub-lattice template.
#[instrument(skip_all, name = "substitution_workflow")]
pub fn run<C: Cancellation + ?Sized>(
    template: &SiteTemplate,
    pool: &SubstituentPool,
    config: &SubstitutionConfig,
    cancel: &C,
    reporter: &ProgressReporter,
) -> Result<Enumeration<SubstitutionPattern>, EngineError> {
    let _phase = reporter.phase("Enumerating Patterns");
    info!(
        sites = template.len(),
        generators = template.symmetry().generators().len(),
        labels = pool.len(),
        "Enumerating symmetry-distinct substitution patterns."
    );
    let result = SubstitutionEnumerator::new(template, config).enumerate_with(pool, cancel, reporter)?;
    info!(found = result.len(), "Pattern enumeration finished.");
    Ok(result)
}

/// What to substitute on a prototype supercell.
#[derive(Debug, Clone)]
pub struct PrototypeSubstitution<'a> {
    pub prototype: &'a Prototype,
    /// Prototype site label whose positions are substituted, e.g. `"A"`.
    pub sublattice: &'a str,
    pub pool: &'a SubstituentPool,
    /// Occupant label for every other prototype site; unlisted sites keep their own label.
    pub hosts: &'a BTreeMap<String, String>,
    /// Also build the full supercell structure of every pattern.
    pub build_structures: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubstitutedCell {
    pub pattern: SubstitutionPattern,
    pub counts: BTreeMap<String, u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structure: Option<Structure>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PrototypeSubstitutionResult {
    pub prototype: &'static str,
    pub sublattice: String,
    pub repetitions: [u32; 3],
    pub sites: usize,
    pub cells: Vec<SubstitutedCell>,
    pub status: EnumerationStatus,
    pub stats: SearchStats,
}

/// Substitutes on one sub-lattice of a prototype supercell, e.g. Sr on the Ba sites of a
/// 2×2×2 BaTiO3 cell, optionally building the resulting structures.
#[instrument(skip_all, name = "prototype_substitution_workflow")]
pub fn run_on_prototype<C: Cancellation + ?Sized>(
    job: &PrototypeSubstitution<'_>,
    config: &SubstitutionConfig,
    cancel: &C,
    reporter: &ProgressReporter,
) -> Result<PrototypeSubstitutionResult, EngineError> {
    // === Phase 1: Sub-lattice preparation ===
    let template = {
        let _phase = reporter.phase("Preparing Sub-lattice");
        info!(
            prototype = job.prototype.name(),
            sublattice = job.sublattice,
            repetitions = ?job.prototype.repetitions(),
            "Building sub-lattice template."
        );
        job.prototype.sublattice_template(job.sublattice)?
    };

    // === Phase 2: Enumeration ===
    let enumeration = run(&template, job.pool, config, cancel, reporter)?;
    let status = enumeration.status;
    let stats = enumeration.stats;

    // === Phase 3: Structure building ===
    let host_sites = if job.build_structures {
        Some(host_occupancy(job)?)
    } else {
        None
    };
    let geometry = if job.build_structures {
        Some(job.prototype.geometry()?)
    } else {
        None
    };

    let cells = {
        let _phase = reporter.phase("Building Structures");
        let task = reporter.task(enumeration.len() as u64);
        let mut cells = Vec::with_capacity(enumeration.len());
        for pattern in enumeration.into_items() {
            let structure = match (&host_sites, &geometry) {
                (Some((before, after)), Some(geometry)) => {
                    let mut sites = before.clone();
                    sites.extend(pattern.occupied_sites());
                    sites.extend(after.iter().cloned());
                    Some(builder::build(&sites, geometry)?)
                }
                _ => None,
            };
            let counts = pattern
                .counts()
                .into_iter()
                .map(|(label, n)| (label.to_string(), n))
                .collect();
            cells.push(SubstitutedCell {
                pattern,
                counts,
                structure,
            });
            task.increment();
        }
        cells
    };

    info!(
        "Substitution complete. Returning {} pattern(s).",
        cells.len()
    );
    Ok(PrototypeSubstitutionResult {
        prototype: job.prototype.name(),
        sublattice: job.sublattice.to_string(),
        repetitions: job.prototype.repetitions(),
        sites: template.len(),
        cells,
        status,
        stats,
    })
}

/// Host sites before and after the substituted label, in prototype order.
fn host_occupancy(
    job: &PrototypeSubstitution<'_>,
) -> Result<(Vec<OccupiedSite>, Vec<OccupiedSite>), EngineError> {
    let full = job.prototype.site_template()?;
    let mut before = Vec::new();
    let mut after = Vec::new();
    let mut seen = false;
    for site in full.sites() {
        if site.id() == job.sublattice {
            seen = true;
            continue;
        }
        let occupant = job
            .hosts
            .get(site.id())
            .cloned()
            .unwrap_or_else(|| site.id().to_string());
        let occupied = OccupiedSite {
            site_id: site.id().to_string(),
            multiplicity: site.multiplicity(),
            occupant: Occupant::Label(occupant),
        };
        if seen {
            after.push(occupied);
        } else {
            before.push(occupied);
        }
    }
    Ok((before, after))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::cancel::NeverCancel;
    use crate::engine::substitution::Occupancy;

    fn hosts() -> BTreeMap<String, String> {
        BTreeMap::from([
            ("B".to_string(), "Ti".to_string()),
            ("X".to_string(), "O".to_string()),
        ])
    }

    #[test]
    fn sr_on_ba_sites_of_a_perovskite_supercell() {
        let prototype = Prototype::named("cubic-perovskite")
            .unwrap()
            .with_repetitions([2, 2, 2])
            .unwrap();
        let pool = SubstituentPool::new()
            .with("Ba", Occupancy::Any)
            .with("Sr", Occupancy::Exactly(2));
        let hosts = hosts();
        let job = PrototypeSubstitution {
            prototype: &prototype,
            sublattice: "A",
            pool: &pool,
            hosts: &hosts,
            build_structures: true,
        };

        let result = run_on_prototype(
            &job,
            &SubstitutionConfig::default(),
            &NeverCancel,
            &ProgressReporter::new(),
        )
        .unwrap();

        assert_eq!(result.sites, 8);
        assert_eq!(result.cells.len(), 3);
        assert_eq!(result.status, EnumerationStatus::Complete);
        for cell in &result.cells {
            assert_eq!(cell.counts.get("Sr"), Some(&2));
            let structure = cell.structure.as_ref().unwrap();
            assert_eq!(structure.len(), 40);
            let counts = structure.symbol_counts();
            assert_eq!(counts.get("Ba"), Some(&6));
            assert_eq!(counts.get("Ti"), Some(&8));
            assert_eq!(counts.get("O"), Some(&24));
        }
    }

    #[test]
    fn structures_are_skipped_unless_requested() {
        let prototype = Prototype::named("wurtzite")
            .unwrap()
            .with_repetitions([2, 1, 1])
            .unwrap();
        let pool = SubstituentPool::unrestricted(["Ga", "In"]);
        let hosts = BTreeMap::new();
        let job = PrototypeSubstitution {
            prototype: &prototype,
            sublattice: "A",
            pool: &pool,
            hosts: &hosts,
            build_structures: false,
        };
        let result = run_on_prototype(
            &job,
            &SubstitutionConfig::default(),
            &NeverCancel,
            &ProgressReporter::new(),
        )
        .unwrap();
        assert!(result.cells.iter().all(|c| c.structure.is_none()));
        assert!(!result.cells.is_empty());
    }

    #[test]
    fn unknown_sublattice_is_reported() {
        let prototype = Prototype::named("cubic-perovskite").unwrap();
        let pool = SubstituentPool::unrestricted(["Sr"]);
        let hosts = hosts();
        let job = PrototypeSubstitution {
            prototype: &prototype,
            sublattice: "Q",
            pool: &pool,
            hosts: &hosts,
            build_structures: false,
        };
        let err = run_on_prototype(
            &job,
            &SubstitutionConfig::default(),
            &NeverCancel,
            &ProgressReporter::new(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Geometry { .. }));
    }
}
