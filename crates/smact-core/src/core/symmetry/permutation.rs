use thiserror::Error;

/// A permutation of site indices `0..degree`, stored in image form: site `i` is sent to
/// `images[i]`.
///
/// Acting on an assignment `a` (one value per site), a permutation moves the value held at
/// site `i` onto site `images[i]`, i.e. `(p·a)[p[i]] = a[i]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Permutation {
    images: Vec<usize>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PermutationError {
    #[error("image {image} is out of range for a permutation of degree {degree}")]
    OutOfRange { image: usize, degree: usize },
    #[error("site {image} is the image of more than one site")]
    RepeatedImage { image: usize },
}

impl Permutation {
    /// Builds a permutation from its image list, checking that it is a bijection on
    /// `0..images.len()`.
    pub fn try_new(images: Vec<usize>) -> Result<Self, PermutationError> {
        let degree = images.len();
        let mut seen = vec![false; degree];
        for &image in &images {
            if image >= degree {
                return Err(PermutationError::OutOfRange { image, degree });
            }
            if std::mem::replace(&mut seen[image], true) {
                return Err(PermutationError::RepeatedImage { image });
            }
        }
        Ok(Self { images })
    }

    pub fn identity(degree: usize) -> Self {
        Self {
            images: (0..degree).collect(),
        }
    }

    pub fn degree(&self) -> usize {
        self.images.len()
    }

    pub fn images(&self) -> &[usize] {
        &self.images
    }

    /// The image of site `index`.
    #[inline]
    pub fn image(&self, index: usize) -> usize {
        self.images[index]
    }

    pub fn is_identity(&self) -> bool {
        self.images.iter().enumerate().all(|(i, &image)| i == image)
    }

    pub fn inverse(&self) -> Self {
        let mut inverse = vec![0; self.images.len()];
        for (i, &image) in self.images.iter().enumerate() {
            inverse[image] = i;
        }
        Self { images: inverse }
    }

    /// Returns `self ∘ other`: apply `other` first, then `self`.
    pub fn compose(&self, other: &Permutation) -> Self {
        Self {
            images: other.images.iter().map(|&i| self.images[i]).collect(),
        }
    }

    /// Moves every value of `assignment` to the image of its site.
    pub fn act<T: Clone>(&self, assignment: &[T]) -> Vec<T> {
        let mut moved = assignment.to_vec();
        for (i, value) in assignment.iter().enumerate() {
            moved[self.images[i]] = value.clone();
        }
        moved
    }
}
