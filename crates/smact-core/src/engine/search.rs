use super::cancel::Cancellation;
use super::outcome::{EnumerationStatus, SearchStats};

/// Depth-first search for choices, one per level, whose values sum to a target.
///
/// Each level is a list of integer contributions (for the enumerators: oxidation state ×
/// multiplicity). The walk keeps an explicit cursor per level instead of recursing. Before a
/// node is entered, the partial sum plus the smallest and largest sums the remaining levels
/// can still add must bracket the target; otherwise the whole subtree is skipped.
#[derive(Debug)]
pub(crate) struct ChargeSearch<'l> {
    levels: &'l [Vec<i64>],
    target: i64,
    /// `suffix_min[d]` is the smallest sum levels `d..` can contribute; one extra trailing zero.
    suffix_min: Vec<i64>,
    suffix_max: Vec<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SearchReport {
    pub status: EnumerationStatus,
    pub stats: SearchStats,
}

impl<'l> ChargeSearch<'l> {
    pub fn new(levels: &'l [Vec<i64>], target: i64) -> Self {
        let mut suffix_min = vec![0i64; levels.len() + 1];
        let mut suffix_max = vec![0i64; levels.len() + 1];
        for (depth, level) in levels.iter().enumerate().rev() {
            let lo = level.iter().copied().min().unwrap_or(0);
            let hi = level.iter().copied().max().unwrap_or(0);
            suffix_min[depth] = suffix_min[depth + 1] + lo;
            suffix_max[depth] = suffix_max[depth + 1] + hi;
        }
        Self {
            levels,
            target,
            suffix_min,
            suffix_max,
        }
    }

    /// Whether any choice at all could reach the target.
    pub fn is_feasible(&self) -> bool {
        !self.levels.iter().any(Vec::is_empty)
            && self.suffix_min[0] <= self.target
            && self.target <= self.suffix_max[0]
    }

    /// Walks the tree, calling `on_leaf` with the chosen index per level for every exact hit,
    /// in lexicographic order of those indices. `on_root_advance` fires each time a first-level
    /// choice has been fully explored.
    ///
    /// With no levels the empty choice is the only leaf, reached iff the target is zero. A
    /// level without choices yields nothing.
    pub fn run<C, L, R>(&self, cancel: &C, mut on_leaf: L, mut on_root_advance: R) -> SearchReport
    where
        C: Cancellation + ?Sized,
        L: FnMut(&[usize]),
        R: FnMut(),
    {
        let mut stats = SearchStats::default();
        let depth_count = self.levels.len();

        if depth_count == 0 {
            stats.visited = 1;
            if cancel.is_cancelled() {
                return self.report(EnumerationStatus::Cancelled, stats);
            }
            if self.target == 0 {
                stats.leaves = 1;
                on_leaf(&[]);
            }
            return self.report(EnumerationStatus::Complete, stats);
        }
        if self.levels.iter().any(Vec::is_empty) {
            return self.report(EnumerationStatus::Complete, stats);
        }

        let mut cursor = vec![0usize; depth_count];
        let mut partial = vec![0i64; depth_count + 1];
        let mut depth = 0usize;

        loop {
            if cursor[depth] == self.levels[depth].len() {
                if depth == 0 {
                    break;
                }
                cursor[depth] = 0;
                depth -= 1;
                cursor[depth] += 1;
                if depth == 0 {
                    on_root_advance();
                }
                continue;
            }

            stats.visited += 1;
            if cancel.is_cancelled() {
                return self.report(EnumerationStatus::Cancelled, stats);
            }

            let sum = partial[depth] + self.levels[depth][cursor[depth]];
            let next = depth + 1;
            let reachable = sum + self.suffix_min[next] <= self.target
                && self.target <= sum + self.suffix_max[next];

            if !reachable {
                stats.pruned += 1;
            } else if next == depth_count {
                stats.leaves += 1;
                on_leaf(&cursor);
            } else {
                partial[next] = sum;
                depth = next;
                continue;
            }

            cursor[depth] += 1;
            if depth == 0 {
                on_root_advance();
            }
        }

        self.report(EnumerationStatus::Complete, stats)
    }

    fn report(&self, status: EnumerationStatus, stats: SearchStats) -> SearchReport {
        SearchReport { status, stats }
    }
}
