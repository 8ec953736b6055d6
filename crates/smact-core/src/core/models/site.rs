use crate::core::symmetry::{Permutation, PermutationGroup};
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("Site template has no sites")]
    EmptyTemplate,
    #[error("Site '{site}' has non-positive multiplicity {multiplicity}")]
    NonPositiveMultiplicity { site: String, multiplicity: i64 },
    #[error("Site '{0}' is declared more than once")]
    DuplicateSite(String),
    #[error("Site '{site}' refers to undeclared equivalence class '{class}'")]
    DanglingClass { site: String, class: String },
    #[error("Symmetry generator {generator} refers to unknown site '{site}'")]
    UnknownSite { generator: usize, site: String },
    #[error("Symmetry generator {generator} is not a permutation of the sites: {reason}")]
    MalformedPermutation { generator: usize, reason: String },
    #[error(
        "Symmetry generator {generator} maps site '{site}' onto site '{image}' of a different equivalence class"
    )]
    SymmetryAction {
        generator: usize,
        site: String,
        image: String,
    },
}

/// A crystallographic position class: an identifier, the number of physically equivalent
/// positions it stands for, and the equivalence class it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Site {
    id: String,
    multiplicity: u32,
    class: String,
}

impl Site {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn multiplicity(&self) -> u32 {
        self.multiplicity
    }

    pub fn class(&self) -> &str {
        &self.class
    }
}

/// An ordered set of sites together with the permutation group acting on their indices.
///
/// Templates are immutable once built. Every generator of the symmetry group is guaranteed to
/// be a bijection on site indices that keeps each site inside its equivalence class.
#[derive(Debug, Clone)]
pub struct SiteTemplate {
    sites: Vec<Site>,
    classes: Vec<String>,
    site_classes: Vec<usize>,
    index_by_id: HashMap<String, usize>,
    symmetry: PermutationGroup,
}

impl SiteTemplate {
    pub fn builder() -> SiteTemplateBuilder {
        SiteTemplateBuilder::default()
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    /// Always `false` for a built template; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    pub fn site(&self, index: usize) -> Option<&Site> {
        self.sites.get(index)
    }

    pub fn index_of(&self, site_id: &str) -> Option<usize> {
        self.index_by_id.get(site_id).copied()
    }

    /// Declared equivalence class names, in declaration order.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn class_index(&self, class: &str) -> Option<usize> {
        self.classes.iter().position(|c| c == class)
    }

    /// Index into [`classes`](Self::classes) of the class of site `index`.
    pub fn class_of(&self, index: usize) -> usize {
        self.site_classes[index]
    }

    /// Indices of the sites of class `class_index`, in template order.
    pub fn class_members(&self, class_index: usize) -> Vec<usize> {
        self.site_classes
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c == class_index)
            .map(|(i, _)| i)
            .collect()
    }

    /// Indices of the classes that have at least one site, ordered by their first appearance
    /// in the site list.
    pub fn classes_by_first_appearance(&self) -> Vec<usize> {
        let mut order = Vec::new();
        for &class in &self.site_classes {
            if !order.contains(&class) {
                order.push(class);
            }
        }
        order
    }

    /// Number of physical positions, i.e. the sum of all multiplicities.
    pub fn total_positions(&self) -> usize {
        self.sites.iter().map(|s| s.multiplicity as usize).sum()
    }

    pub fn symmetry(&self) -> &PermutationGroup {
        &self.symmetry
    }
}

#[derive(Debug, Clone)]
enum GeneratorSpec {
    Indices(Vec<usize>),
    SiteIds(Vec<String>),
}

#[derive(Debug, Clone)]
struct SiteSpec {
    id: String,
    multiplicity: i64,
    class: String,
}

/// Collects sites, classes and generators and validates them together in [`build`](Self::build).
#[derive(Debug, Clone, Default)]
pub struct SiteTemplateBuilder {
    classes: Vec<String>,
    sites: Vec<SiteSpec>,
    generators: Vec<GeneratorSpec>,
}

impl SiteTemplateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares an equivalence class. Declaring the same name twice has no effect.
    pub fn class(mut self, name: &str) -> Self {
        if !self.classes.iter().any(|c| c == name) {
            self.classes.push(name.to_string());
        }
        self
    }

    pub fn classes(self, names: &[&str]) -> Self {
        names.iter().fold(self, |builder, name| builder.class(name))
    }

    pub fn site(mut self, id: &str, multiplicity: i64, class: &str) -> Self {
        self.sites.push(SiteSpec {
            id: id.to_string(),
            multiplicity,
            class: class.to_string(),
        });
        self
    }

    /// Adds a symmetry generator in image form: site `i` is mapped to site `images[i]`.
    pub fn generator(mut self, images: Vec<usize>) -> Self {
        self.generators.push(GeneratorSpec::Indices(images));
        self
    }

    /// Adds a symmetry generator in image form, naming each image by its site id.
    pub fn generator_by_ids(mut self, images: &[&str]) -> Self {
        self.generators.push(GeneratorSpec::SiteIds(
            images.iter().map(|s| s.to_string()).collect(),
        ));
        self
    }

    pub fn build(self) -> Result<SiteTemplate, TemplateError> {
        if self.sites.is_empty() {
            return Err(TemplateError::EmptyTemplate);
        }

        let mut sites = Vec::with_capacity(self.sites.len());
        let mut site_classes = Vec::with_capacity(self.sites.len());
        let mut index_by_id = HashMap::with_capacity(self.sites.len());

        for entry in self.sites {
            let multiplicity = u32::try_from(entry.multiplicity)
                .ok()
                .filter(|&m| m > 0)
                .ok_or_else(|| TemplateError::NonPositiveMultiplicity {
                    site: entry.id.clone(),
                    multiplicity: entry.multiplicity,
                })?;
            if index_by_id.contains_key(&entry.id) {
                return Err(TemplateError::DuplicateSite(entry.id));
            }
            let class_index = self
                .classes
                .iter()
                .position(|c| *c == entry.class)
                .ok_or_else(|| TemplateError::DanglingClass {
                    site: entry.id.clone(),
                    class: entry.class.clone(),
                })?;

            index_by_id.insert(entry.id.clone(), sites.len());
            site_classes.push(class_index);
            sites.push(Site {
                id: entry.id,
                multiplicity,
                class: entry.class,
            });
        }

        let mut permutations = Vec::with_capacity(self.generators.len());
        for (generator, generator_def) in self.generators.into_iter().enumerate() {
            let images = match generator_def {
                GeneratorSpec::Indices(images) => images,
                GeneratorSpec::SiteIds(ids) => ids
                    .into_iter()
                    .map(|id| {
                        index_by_id
                            .get(&id)
                            .copied()
                            .ok_or(TemplateError::UnknownSite {
                                generator,
                                site: id,
                            })
                    })
                    .collect::<Result<Vec<_>, _>>()?,
            };
            if images.len() != sites.len() {
                return Err(TemplateError::MalformedPermutation {
                    generator,
                    reason: format!(
                        "expected {} images, found {}",
                        sites.len(),
                        images.len()
                    ),
                });
            }
            let permutation = Permutation::try_new(images).map_err(|e| {
                TemplateError::MalformedPermutation {
                    generator,
                    reason: e.to_string(),
                }
            })?;
            for (i, &image) in permutation.images().iter().enumerate() {
                if site_classes[i] != site_classes[image] {
                    return Err(TemplateError::SymmetryAction {
                        generator,
                        site: sites[i].id.clone(),
                        image: sites[image].id.clone(),
                    });
                }
            }
            permutations.push(permutation);
        }

        Ok(SiteTemplate {
            symmetry: PermutationGroup::from_generators(sites.len(), permutations),
            sites,
            classes: self.classes,
            site_classes,
            index_by_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn perovskite() -> SiteTemplate {
        SiteTemplate::builder()
            .classes(&["A", "B", "X"])
            .site("A", 1, "A")
            .site("B", 1, "B")
            .site("X", 3, "X")
            .build()
            .unwrap()
    }

    #[test]
    fn build_indexes_sites_and_classes() {
        let template = perovskite();
        assert_eq!(template.len(), 3);
        assert_eq!(template.index_of("X"), Some(2));
        assert_eq!(template.class_of(2), 2);
        assert_eq!(template.class_members(0), vec![0]);
        assert_eq!(template.total_positions(), 5);
        assert!(template.symmetry().is_trivial());
    }

    #[test]
    fn classes_are_ordered_by_first_appearance() {
        let template = SiteTemplate::builder()
            .classes(&["anion", "cation"])
            .site("c1", 1, "cation")
            .site("a1", 1, "anion")
            .site("c2", 1, "cation")
            .build()
            .unwrap();
        assert_eq!(template.classes_by_first_appearance(), vec![1, 0]);
        assert_eq!(template.class_members(1), vec![0, 2]);
    }

    #[test]
    fn empty_template_is_rejected() {
        assert_eq!(
            SiteTemplate::builder().class("A").build().unwrap_err(),
            TemplateError::EmptyTemplate
        );
    }

    #[test]
    fn zero_and_negative_multiplicity_are_rejected() {
        for multiplicity in [0, -2] {
            let err = SiteTemplate::builder()
                .class("A")
                .site("A", multiplicity, "A")
                .build()
                .unwrap_err();
            assert_eq!(
                err,
                TemplateError::NonPositiveMultiplicity {
                    site: "A".to_string(),
                    multiplicity,
                }
            );
        }
    }

    #[test]
    fn duplicate_site_is_rejected() {
        let err = SiteTemplate::builder()
            .class("A")
            .site("A", 1, "A")
            .site("A", 2, "A")
            .build()
            .unwrap_err();
        assert_eq!(err, TemplateError::DuplicateSite("A".to_string()));
    }

    #[test]
    fn dangling_class_is_rejected() {
        let err = SiteTemplate::builder()
            .class("A")
            .site("B", 1, "B")
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            TemplateError::DanglingClass {
                site: "B".to_string(),
                class: "B".to_string(),
            }
        );
    }

    #[test]
    fn generator_with_wrong_degree_is_malformed() {
        let err = SiteTemplate::builder()
            .class("A")
            .site("a1", 1, "A")
            .site("a2", 1, "A")
            .generator(vec![1, 0, 2])
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            TemplateError::MalformedPermutation { generator: 0, .. }
        ));
    }

    #[test]
    fn non_bijective_generator_is_malformed() {
        let err = SiteTemplate::builder()
            .class("A")
            .site("a1", 1, "A")
            .site("a2", 1, "A")
            .generator(vec![1, 1])
            .build()
            .unwrap_err();
        assert!(matches!(err, TemplateError::MalformedPermutation { .. }));
    }

    #[test]
    fn generator_crossing_classes_is_rejected() {
        let err = SiteTemplate::builder()
            .classes(&["A", "B"])
            .site("a", 1, "A")
            .site("b", 1, "B")
            .generator(vec![1, 0])
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            TemplateError::SymmetryAction {
                generator: 0,
                site: "a".to_string(),
                image: "b".to_string(),
            }
        );
    }

    #[test]
    fn generator_by_ids_resolves_names() {
        let template = SiteTemplate::builder()
            .class("A")
            .site("a1", 1, "A")
            .site("a2", 1, "A")
            .generator_by_ids(&["a2", "a1"])
            .build()
            .unwrap();
        assert_eq!(template.symmetry().generators()[0].images(), &[1, 0]);

        let err = SiteTemplate::builder()
            .class("A")
            .site("a1", 1, "A")
            .generator_by_ids(&["zz"])
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            TemplateError::UnknownSite {
                generator: 0,
                site: "zz".to_string(),
            }
        );
    }
}
