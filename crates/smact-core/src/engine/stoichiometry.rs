use super::cancel::{Cancellation, NeverCancel};
use super::config::{EmptyPoolPolicy, EnumerationConfig};
use super::error::EngineError;
use super::outcome::{Enumeration, EnumerationStatus};
use super::progress::ProgressReporter;
use super::search::ChargeSearch;
use crate::core::models::composition::{Composition, SiteAssignment};
use crate::core::models::site::SiteTemplate;
use crate::core::models::species::Species;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, instrument, trace};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// What a candidate pool applies to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PoolTarget {
    Site(String),
    Class(String),
}

/// Candidate species per site and/or per equivalence class.
///
/// A class pool applies to every site of the class. When a site has both a site pool and a
/// class pool, its candidates are the species present in both.
#[derive(Debug, Clone, Default)]
pub struct SpeciesPools {
    by_site: BTreeMap<String, BTreeSet<Species>>,
    by_class: BTreeMap<String, BTreeSet<Species>>,
}

impl SpeciesPools {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_site(mut self, site_id: &str, species: impl IntoIterator<Item = Species>) -> Self {
        self.insert(PoolTarget::Site(site_id.to_string()), species);
        self
    }

    pub fn for_class(mut self, class: &str, species: impl IntoIterator<Item = Species>) -> Self {
        self.insert(PoolTarget::Class(class.to_string()), species);
        self
    }

    /// Adds candidates to a pool, creating it if needed.
    pub fn insert(&mut self, target: PoolTarget, species: impl IntoIterator<Item = Species>) {
        let pool = match target {
            PoolTarget::Site(id) => self.by_site.entry(id).or_default(),
            PoolTarget::Class(class) => self.by_class.entry(class).or_default(),
        };
        pool.extend(species);
    }

    fn validate(&self, template: &SiteTemplate) -> Result<(), EngineError> {
        if let Some(site) = self.by_site.keys().find(|id| template.index_of(id).is_none()) {
            return Err(EngineError::UnknownSite(site.clone()));
        }
        if let Some(class) = self
            .by_class
            .keys()
            .find(|class| template.class_index(class).is_none())
        {
            return Err(EngineError::UnknownClass(class.clone()));
        }
        Ok(())
    }

    fn site_candidates(&self, site_id: &str, class: &str) -> BTreeSet<Species> {
        match (self.by_site.get(site_id), self.by_class.get(class)) {
            (Some(site), Some(class)) => site.intersection(class).cloned().collect(),
            (Some(pool), None) | (None, Some(pool)) => pool.clone(),
            (None, None) => BTreeSet::new(),
        }
    }
}

/// Enumerates every charge-neutral composition of a site template.
///
/// The search runs over equivalence classes in order of first appearance. Every class takes a
/// single species, drawn from the candidates common to all of its sites, and contributes
/// `oxidation state × total class multiplicity` to the net charge.
pub struct StoichiometryEnumerator<'t> {
    template: &'t SiteTemplate,
    config: &'t EnumerationConfig,
}

struct SearchPlan {
    candidates: Vec<Vec<Species>>,
    levels: Vec<Vec<i64>>,
    /// For each site, the position of its class in the search order.
    class_slot: Vec<usize>,
}

impl SearchPlan {
    fn composition(&self, template: &SiteTemplate, choice: &[usize]) -> Composition {
        let assignments = template
            .sites()
            .iter()
            .zip(&self.class_slot)
            .map(|(site, &slot)| SiteAssignment {
                site_id: site.id().to_string(),
                multiplicity: site.multiplicity(),
                species: self.candidates[slot][choice[slot]].clone(),
            })
            .collect();
        Composition::from_assignments(assignments)
    }
}

impl<'t> StoichiometryEnumerator<'t> {
    pub fn new(template: &'t SiteTemplate, config: &'t EnumerationConfig) -> Self {
        Self { template, config }
    }

    pub fn enumerate(&self, pools: &SpeciesPools) -> Result<Enumeration<Composition>, EngineError> {
        self.enumerate_with(pools, &NeverCancel, &ProgressReporter::new())
    }

    /// Like [`enumerate`](Self::enumerate), polling `cancel` at every search node and
    /// reporting one task step per first-level candidate.
    #[instrument(skip_all, name = "stoichiometry_enumeration")]
    pub fn enumerate_with<C: Cancellation + ?Sized>(
        &self,
        pools: &SpeciesPools,
        cancel: &C,
        reporter: &ProgressReporter,
    ) -> Result<Enumeration<Composition>, EngineError> {
        let Some(plan) = self.plan(pools)? else {
            return Ok(Enumeration::empty());
        };
        let (first, rest) = plan
            .levels
            .split_first()
            .ok_or_else(|| EngineError::Internal("site template without classes".to_string()))?;
        debug!(
            classes = plan.levels.len(),
            branches = first.len(),
            "Starting charge-neutral search."
        );

        let task = reporter.task(first.len() as u64);
        let branch = |index: usize| -> Enumeration<Composition> {
            let mut out = Enumeration::empty();
            out.stats.visited += 1;
            if cancel.is_cancelled() {
                out.status = EnumerationStatus::Cancelled;
                return out;
            }
            let search = ChargeSearch::new(rest, -first[index]);
            if search.is_feasible() {
                let mut choice = Vec::with_capacity(plan.levels.len());
                let report = search.run(
                    cancel,
                    |tail| {
                        choice.clear();
                        choice.push(index);
                        choice.extend_from_slice(tail);
                        let composition = plan.composition(self.template, &choice);
                        trace!(%composition, "Found charge-neutral composition.");
                        out.items.insert(composition);
                    },
                    || {},
                );
                out.status = report.status;
                out.stats += report.stats;
            } else {
                out.stats.pruned += 1;
            }
            task.increment();
            out
        };

        #[cfg(not(feature = "parallel"))]
        let branches = 0..first.len();

        #[cfg(feature = "parallel")]
        let branches = (0..first.len()).into_par_iter();

        let partials: Vec<Enumeration<Composition>> = branches.map(branch).collect();
        let mut result = Enumeration::empty();
        for partial in partials {
            result.merge(partial);
        }

        debug!(
            found = result.len(),
            visited = result.stats.visited,
            pruned = result.stats.pruned,
            complete = result.is_complete(),
            "Charge-neutral search finished."
        );
        Ok(result)
    }

    fn plan(&self, pools: &SpeciesPools) -> Result<Option<SearchPlan>, EngineError> {
        pools.validate(self.template)?;

        let class_order = self.template.classes_by_first_appearance();
        let mut candidates = Vec::with_capacity(class_order.len());
        let mut levels = Vec::with_capacity(class_order.len());
        let mut class_slot = vec![0usize; self.template.len()];

        for (slot, &class) in class_order.iter().enumerate() {
            let class_name = &self.template.classes()[class];
            let members = self.template.class_members(class);

            let mut common: Option<BTreeSet<Species>> = None;
            let mut weight = 0i64;
            for &index in &members {
                class_slot[index] = slot;
                let site = &self.template.sites()[index];
                weight += i64::from(site.multiplicity());
                let site_pool = pools.site_candidates(site.id(), class_name);
                common = Some(match common {
                    None => site_pool,
                    Some(acc) => acc.intersection(&site_pool).cloned().collect(),
                });
            }

            let pool: Vec<Species> = common.unwrap_or_default().into_iter().collect();
            if pool.is_empty() {
                match self.config.empty_pool {
                    EmptyPoolPolicy::Silent => {
                        debug!(class = %class_name, "Empty candidate pool; no compositions.");
                        return Ok(None);
                    }
                    EmptyPoolPolicy::Fatal => {
                        return Err(EngineError::EmptyPool {
                            target: format!("equivalence class '{class_name}'"),
                        });
                    }
                }
            }
            levels.push(
                pool.iter()
                    .map(|s| i64::from(s.oxidation_state()) * weight)
                    .collect(),
            );
            candidates.push(pool);
        }

        Ok(Some(SearchPlan {
            candidates,
            levels,
            class_slot,
        }))
    }
}

/// Enumerates the charge-neutral compositions of `template` with the default configuration.
pub fn enumerate(
    template: &SiteTemplate,
    pools: &SpeciesPools,
) -> Result<BTreeSet<Composition>, EngineError> {
    let config = EnumerationConfig::default();
    Ok(StoichiometryEnumerator::new(template, &config)
        .enumerate(pools)?
        .into_items())
}
