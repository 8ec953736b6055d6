use super::permutation::Permutation;
use std::collections::{BTreeSet, HashSet, VecDeque};

/// The action of a site symmetry group on assignments of values to sites.
///
/// Both enumerators rely on this capability only: an orbit is the set of assignments reachable
/// under the group action, and the canonical representative of an orbit is its
/// lexicographically smallest member. Because assignments are compared with `Ord`, the choice
/// is deterministic for any totally ordered value type.
pub trait SiteSymmetry {
    /// Number of sites the group acts on.
    fn degree(&self) -> usize;

    /// All assignments equivalent to `assignment`, including itself.
    fn orbit<T: Ord + Clone>(&self, assignment: &[T]) -> BTreeSet<Vec<T>>;

    /// The lexicographically smallest member of the orbit of `assignment`.
    fn canonical_representative<T: Ord + Clone>(&self, assignment: &[T]) -> Vec<T> {
        self.orbit(assignment)
            .into_iter()
            .next()
            .unwrap_or_else(|| assignment.to_vec())
    }

    /// Whether `assignment` is the canonical representative of its own orbit.
    fn is_canonical<T: Ord + Clone>(&self, assignment: &[T]) -> bool {
        self.canonical_representative(assignment).as_slice() == assignment
    }
}

/// A permutation group on site indices, given by a set of generators.
///
/// The group is never materialised unless asked for: orbits are computed by closing an
/// assignment under the generators, which visits exactly the orbit and nothing else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermutationGroup {
    degree: usize,
    generators: Vec<Permutation>,
}

impl PermutationGroup {
    /// The group containing only the identity.
    pub fn trivial(degree: usize) -> Self {
        Self {
            degree,
            generators: Vec::new(),
        }
    }

    /// Builds the group generated by `generators`. Every generator must have degree `degree`;
    /// identity generators are dropped.
    pub(crate) fn from_generators(degree: usize, generators: Vec<Permutation>) -> Self {
        let mut unique = Vec::with_capacity(generators.len());
        for generator in generators {
            debug_assert_eq!(generator.degree(), degree);
            if !generator.is_identity() && !unique.contains(&generator) {
                unique.push(generator);
            }
        }
        Self {
            degree,
            generators: unique,
        }
    }

    pub fn generators(&self) -> &[Permutation] {
        &self.generators
    }

    pub fn is_trivial(&self) -> bool {
        self.generators.is_empty()
    }

    /// Enumerates every group element, or returns `None` as soon as the group turns out to
    /// have more than `limit` elements.
    ///
    /// The identity is always the first element.
    pub fn elements(&self, limit: usize) -> Option<Vec<Permutation>> {
        let identity = Permutation::identity(self.degree);
        let mut seen: HashSet<Permutation> = HashSet::from([identity.clone()]);
        let mut elements = vec![identity.clone()];
        let mut queue = VecDeque::from([identity]);

        while let Some(element) = queue.pop_front() {
            for generator in &self.generators {
                let product = generator.compose(&element);
                if seen.insert(product.clone()) {
                    if elements.len() >= limit {
                        return None;
                    }
                    elements.push(product.clone());
                    queue.push_back(product);
                }
            }
        }
        Some(elements)
    }
}

impl SiteSymmetry for PermutationGroup {
    fn degree(&self) -> usize {
        self.degree
    }

    fn orbit<T: Ord + Clone>(&self, assignment: &[T]) -> BTreeSet<Vec<T>> {
        let mut orbit = BTreeSet::from([assignment.to_vec()]);
        let mut frontier = vec![assignment.to_vec()];
        while let Some(current) = frontier.pop() {
            for generator in &self.generators {
                let image = generator.act(&current);
                if !orbit.contains(&image) {
                    orbit.insert(image.clone());
                    frontier.push(image);
                }
            }
        }
        orbit
    }

    fn is_canonical<T: Ord + Clone>(&self, assignment: &[T]) -> bool {
        // Early exit on the first smaller image instead of building the whole orbit.
        let mut visited = BTreeSet::from([assignment.to_vec()]);
        let mut frontier = vec![assignment.to_vec()];
        while let Some(current) = frontier.pop() {
            for generator in &self.generators {
                let image = generator.act(&current);
                if image.as_slice() < assignment {
                    return false;
                }
                if !visited.contains(&image) {
                    visited.insert(image.clone());
                    frontier.push(image);
                }
            }
        }
        true
    }
}

/// A fully enumerated group, kept together with the inverse of every element.
///
/// Storing the inverses allows reading `(g·a)[j] = a[g⁻¹(j)]` position by position, which is
/// what partial (prefix) canonicity tests need.
#[derive(Debug, Clone)]
pub struct MaterializedGroup {
    degree: usize,
    inverses: Vec<Permutation>,
}

impl MaterializedGroup {
    /// Materialises `group` if its order does not exceed `limit`.
    pub fn try_from_group(group: &PermutationGroup, limit: usize) -> Option<Self> {
        let elements = group.elements(limit)?;
        Some(Self {
            degree: group.degree,
            inverses: elements.iter().map(Permutation::inverse).collect(),
        })
    }

    pub fn order(&self) -> usize {
        self.inverses.len()
    }

    /// Returns `true` when some group element provably maps every completion of `prefix`
    /// to a lexicographically smaller assignment.
    ///
    /// `prefix` holds the values of sites `0..prefix.len()`; a full assignment is a prefix of
    /// length `degree`, in which case this is the exact "not canonical" test.
    pub fn dominates_prefix<T: Ord>(&self, prefix: &[T]) -> bool {
        self.inverses
            .iter()
            .any(|inverse| image_precedes(prefix, inverse.images()))
    }
}

fn image_precedes<T: Ord>(prefix: &[T], inverse: &[usize]) -> bool {
    let known = prefix.len();
    for (position, value) in prefix.iter().enumerate() {
        let source = inverse[position];
        if source >= known {
            return false;
        }
        match prefix[source].cmp(value) {
            std::cmp::Ordering::Less => return true,
            std::cmp::Ordering::Greater => return false,
            std::cmp::Ordering::Equal => {}
        }
    }
    false
}

impl SiteSymmetry for MaterializedGroup {
    fn degree(&self) -> usize {
        self.degree
    }

    fn orbit<T: Ord + Clone>(&self, assignment: &[T]) -> BTreeSet<Vec<T>> {
        self.inverses
            .iter()
            .map(|inverse| inverse.inverse().act(assignment))
            .collect()
    }

    fn is_canonical<T: Ord + Clone>(&self, assignment: &[T]) -> bool {
        !self.dominates_prefix(assignment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn perm(images: &[usize]) -> Permutation {
        Permutation::try_new(images.to_vec()).unwrap()
    }

    fn swap_group() -> PermutationGroup {
        PermutationGroup::from_generators(2, vec![perm(&[1, 0])])
    }

    #[test]
    fn trivial_group_orbit_is_singleton() {
        let group = PermutationGroup::trivial(3);
        let orbit = group.orbit(&['a', 'b', 'c']);
        assert_eq!(orbit.len(), 1);
        assert!(group.is_canonical(&['c', 'b', 'a']));
    }

    #[test]
    fn swap_orbit_contains_both_orders() {
        let orbit = swap_group().orbit(&['B', 'A']);
        assert_eq!(
            orbit.into_iter().collect::<Vec<_>>(),
            vec![vec!['A', 'B'], vec!['B', 'A']]
        );
    }

    #[test]
    fn canonical_representative_is_lexicographic_minimum() {
        let group = swap_group();
        assert_eq!(group.canonical_representative(&['B', 'A']), vec!['A', 'B']);
        assert!(group.is_canonical(&['A', 'B']));
        assert!(!group.is_canonical(&['B', 'A']));
    }

    #[test]
    fn identity_and_duplicate_generators_are_dropped() {
        let group = PermutationGroup::from_generators(
            2,
            vec![perm(&[0, 1]), perm(&[1, 0]), perm(&[1, 0])],
        );
        assert_eq!(group.generators().len(), 1);
    }

    #[test]
    fn elements_enumerates_cyclic_group() {
        let group = PermutationGroup::from_generators(4, vec![perm(&[1, 2, 3, 0])]);
        let elements = group.elements(100).unwrap();
        assert_eq!(elements.len(), 4);
        assert!(elements[0].is_identity());
    }

    #[test]
    fn elements_respects_limit() {
        // S4 generated by a transposition and a 4-cycle has 24 elements.
        let group =
            PermutationGroup::from_generators(4, vec![perm(&[1, 0, 2, 3]), perm(&[1, 2, 3, 0])]);
        assert_eq!(group.elements(24).map(|e| e.len()), Some(24));
        assert!(group.elements(23).is_none());
    }

    #[test]
    fn materialized_group_agrees_with_generator_closure() {
        let group =
            PermutationGroup::from_generators(4, vec![perm(&[1, 0, 2, 3]), perm(&[1, 2, 3, 0])]);
        let materialized = MaterializedGroup::try_from_group(&group, 1000).unwrap();
        assert_eq!(materialized.order(), 24);

        let assignment = [2u16, 0, 1, 0];
        assert_eq!(group.orbit(&assignment), materialized.orbit(&assignment));
        assert_eq!(
            group.is_canonical(&assignment),
            materialized.is_canonical(&assignment)
        );
        assert!(materialized.is_canonical(&[0u16, 0, 1, 2]));
    }

    #[test]
    fn dominates_prefix_detects_doomed_prefixes() {
        let materialized = MaterializedGroup::try_from_group(&swap_group(), 10).unwrap();
        // Site 1 is unknown, so nothing can be concluded from a one-site prefix.
        assert!(!materialized.dominates_prefix(&[1u16]));
        assert!(materialized.dominates_prefix(&[1u16, 0]));
        assert!(!materialized.dominates_prefix(&[0u16, 1]));
    }
}
