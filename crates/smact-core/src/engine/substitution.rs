use super::cancel::{Cancellation, NeverCancel};
use super::config::{ConfigError, SubstitutionConfig};
use super::error::EngineError;
use super::outcome::{Enumeration, EnumerationStatus};
use super::progress::ProgressReporter;
use crate::core::models::pattern::{PatternFrame, SubstitutionPattern};
use crate::core::models::site::SiteTemplate;
use crate::core::symmetry::{MaterializedGroup, SiteSymmetry};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, instrument, trace};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// How many sites a substituent label may occupy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Occupancy {
    #[default]
    Any,
    AtMost(u32),
    Exactly(u32),
}

impl Occupancy {
    fn max(self) -> Option<u32> {
        match self {
            Self::Any => None,
            Self::AtMost(n) | Self::Exactly(n) => Some(n),
        }
    }

    fn exact(self) -> Option<u32> {
        match self {
            Self::Exactly(n) => Some(n),
            _ => None,
        }
    }
}

/// The labels that may be placed on a sub-lattice, kept sorted by label.
///
/// Occupancy limits count sites, not positions: a site of multiplicity 3 carrying a label
/// uses one unit of that label's limit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubstituentPool {
    entries: Vec<(String, Occupancy)>,
}

impl SubstituentPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// A pool in which every label may occupy any number of sites.
    pub fn unrestricted<S: Into<String>>(labels: impl IntoIterator<Item = S>) -> Self {
        labels
            .into_iter()
            .fold(Self::new(), |pool, label| pool.with(label, Occupancy::Any))
    }

    /// Adds `label`, replacing the occupancy of an existing entry with the same label.
    pub fn with(mut self, label: impl Into<String>, occupancy: Occupancy) -> Self {
        let label = label.into();
        match self.entries.binary_search_by(|(l, _)| l.as_str().cmp(&label)) {
            Ok(index) => self.entries[index].1 = occupancy,
            Err(index) => self.entries.insert(index, (label, occupancy)),
        }
        self
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(label, _)| label.as_str())
    }

    pub fn occupancy(&self, label: &str) -> Option<Occupancy> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, occupancy)| *occupancy)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_unrestricted(&self) -> bool {
        self.entries.iter().all(|(_, o)| *o == Occupancy::Any)
    }
}

/// Enumerates symmetry-distinct distributions of substituent labels over a sub-lattice.
///
/// Generation is depth-first over site positions. An assignment is kept only if it is the
/// lexicographically smallest member of its orbit. Above
/// [`incremental_threshold`](SubstitutionConfig::incremental_threshold) sites the symmetry
/// group is materialised (when its order stays within
/// [`group_order_limit`](SubstitutionConfig::group_order_limit)) and prefixes that every
/// completion of which some element would map to a smaller assignment are cut off early.
pub struct SubstitutionEnumerator<'t> {
    template: &'t SiteTemplate,
    config: &'t SubstitutionConfig,
}

/// Per-run state shared by all branches.
struct Walk<'t> {
    template: &'t SiteTemplate,
    group: Option<MaterializedGroup>,
    max: Vec<Option<u32>>,
    exact: Vec<Option<u32>>,
    bounded: bool,
    frame: Arc<PatternFrame>,
}

impl Walk<'_> {
    fn sites(&self) -> usize {
        self.template.len()
    }

    fn labels(&self) -> usize {
        self.max.len()
    }

    /// Whether the counts in `used` can still be completed with `remaining` more sites.
    fn is_feasible(&self, used: &[u32], remaining: u32) -> bool {
        let mut deficit = 0u32;
        let mut capacity = 0u32;
        for (label, &count) in used.iter().enumerate() {
            if let Some(max) = self.max[label] {
                if count > max {
                    return false;
                }
                capacity = capacity.saturating_add(max - count);
            }
            if let Some(exact) = self.exact[label] {
                deficit += exact.saturating_sub(count);
            }
        }
        deficit <= remaining && (!self.bounded || capacity >= remaining)
    }

    fn is_canonical(&self, assignment: &[u16]) -> bool {
        match &self.group {
            Some(group) => !group.dominates_prefix(assignment),
            None => self.template.symmetry().is_canonical(assignment),
        }
    }

    /// Explores every assignment whose first site carries label `first`.
    fn branch<C: Cancellation + ?Sized>(
        &self,
        first: usize,
        cancel: &C,
    ) -> Enumeration<SubstitutionPattern> {
        let sites = self.sites();
        let mut out = Enumeration::empty();
        let mut assignment = vec![0u16; sites];
        let mut used = vec![0u32; self.labels()];
        let mut cursor = vec![0usize; sites];

        out.stats.visited += 1;
        if cancel.is_cancelled() {
            out.status = EnumerationStatus::Cancelled;
            return out;
        }
        assignment[0] = first as u16;
        used[first] += 1;
        if !self.is_feasible(&used, (sites - 1) as u32) {
            out.stats.pruned += 1;
            return out;
        }
        if sites == 1 {
            self.emit(&assignment, &mut out);
            return out;
        }

        let mut depth = 1usize;
        loop {
            if cursor[depth] == self.labels() {
                cursor[depth] = 0;
                depth -= 1;
                if depth == 0 {
                    break;
                }
                used[assignment[depth] as usize] -= 1;
                cursor[depth] += 1;
                continue;
            }

            out.stats.visited += 1;
            if cancel.is_cancelled() {
                out.status = EnumerationStatus::Cancelled;
                return out;
            }

            let label = cursor[depth];
            assignment[depth] = label as u16;
            used[label] += 1;
            let placed = depth + 1;
            let prefix = &assignment[..placed];

            let keep = self.is_feasible(&used, (sites - placed) as u32)
                && (placed == sites
                    || self
                        .group
                        .as_ref()
                        .is_none_or(|group| !group.dominates_prefix(prefix)));

            if !keep {
                out.stats.pruned += 1;
            } else if placed == sites {
                self.emit(&assignment, &mut out);
            } else {
                depth = placed;
                continue;
            }

            used[label] -= 1;
            cursor[depth] += 1;
        }

        out
    }

    fn emit(&self, assignment: &[u16], out: &mut Enumeration<SubstitutionPattern>) {
        out.stats.leaves += 1;
        if self.is_canonical(assignment) {
            let pattern = SubstitutionPattern::new(assignment.to_vec(), Arc::clone(&self.frame));
            trace!(%pattern, "Found symmetry-distinct pattern.");
            out.items.insert(pattern);
        }
    }
}

impl<'t> SubstitutionEnumerator<'t> {
    pub fn new(template: &'t SiteTemplate, config: &'t SubstitutionConfig) -> Self {
        Self { template, config }
    }

    pub fn enumerate(
        &self,
        pool: &SubstituentPool,
    ) -> Result<Enumeration<SubstitutionPattern>, EngineError> {
        self.enumerate_with(pool, &NeverCancel, &ProgressReporter::new())
    }

    /// Like [`enumerate`](Self::enumerate), polling `cancel` at every search node and
    /// reporting one task step per label tried on the first site.
    #[instrument(skip_all, name = "substitution_enumeration")]
    pub fn enumerate_with<C: Cancellation + ?Sized>(
        &self,
        pool: &SubstituentPool,
        cancel: &C,
        reporter: &ProgressReporter,
    ) -> Result<Enumeration<SubstitutionPattern>, EngineError> {
        if pool.is_empty() {
            debug!("Empty substituent pool; no patterns.");
            return Ok(Enumeration::empty());
        }
        if pool.len() > usize::from(u16::MAX) + 1 {
            return Err(ConfigError::InvalidParameter {
                name: "substituent_pool",
                reason: format!("at most 65536 labels are supported, got {}", pool.len()),
            }
            .into());
        }

        let walk = self.prepare(pool);
        let sites = walk.sites() as u32;
        if !walk.is_feasible(&vec![0; walk.labels()], sites) {
            debug!("Occupancy limits cannot be met; no patterns.");
            return Ok(Enumeration::empty());
        }
        debug!(
            sites,
            labels = walk.labels(),
            materialized_order = walk.group.as_ref().map(MaterializedGroup::order),
            "Starting substitution search."
        );

        let task = reporter.task(walk.labels() as u64);
        let branch = |first: usize| {
            let out = walk.branch(first, cancel);
            task.increment();
            out
        };

        #[cfg(not(feature = "parallel"))]
        let branches = 0..walk.labels();

        #[cfg(feature = "parallel")]
        let branches = (0..walk.labels()).into_par_iter();

        let partials: Vec<Enumeration<SubstitutionPattern>> = branches.map(branch).collect();
        let mut result = Enumeration::empty();
        for partial in partials {
            result.merge(partial);
        }

        debug!(
            found = result.len(),
            visited = result.stats.visited,
            pruned = result.stats.pruned,
            complete = result.is_complete(),
            "Substitution search finished."
        );
        Ok(result)
    }

    fn prepare(&self, pool: &SubstituentPool) -> Walk<'t> {
        let group = if self.template.len() > self.config.incremental_threshold
            && !self.template.symmetry().is_trivial()
        {
            let group =
                MaterializedGroup::try_from_group(self.template.symmetry(), self.config.group_order_limit);
            if group.is_none() {
                debug!(
                    limit = self.config.group_order_limit,
                    "Symmetry group too large to materialise; canonicity is checked per leaf only."
                );
            }
            group
        } else {
            None
        };

        let frame = PatternFrame {
            site_ids: self
                .template
                .sites()
                .iter()
                .map(|s| s.id().to_string())
                .collect(),
            multiplicities: self
                .template
                .sites()
                .iter()
                .map(|s| s.multiplicity())
                .collect(),
            labels: pool.labels().map(str::to_string).collect(),
        };

        Walk {
            template: self.template,
            group,
            max: pool.entries.iter().map(|(_, o)| o.max()).collect(),
            exact: pool.entries.iter().map(|(_, o)| o.exact()).collect(),
            bounded: !pool.entries.iter().any(|(_, o)| *o == Occupancy::Any),
            frame: Arc::new(frame),
        }
    }
}

/// Enumerates the symmetry-distinct patterns of `template` with the default configuration.
pub fn enumerate(
    template: &SiteTemplate,
    pool: &SubstituentPool,
) -> Result<BTreeSet<SubstitutionPattern>, EngineError> {
    let config = SubstitutionConfig::default();
    Ok(SubstitutionEnumerator::new(template, &config)
        .enumerate(pool)?
        .into_items())
}
