//! Derived chemical properties computed from tabulated elemental data.
//!
//! - [`electronegativity`]: compound electronegativity and the Pauling ordering test.
//! - [`band_gap`]: Harrison tight-binding and solid-state-energy band gap estimates.

pub mod band_gap;
pub mod electronegativity;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PropertyError {
    #[error("Element '{0}' is not in the species table")]
    UnknownElement(String),
    #[error("Element '{element}' has no {property} data")]
    MissingProperty {
        element: String,
        property: &'static str,
    },
    #[error("Empty input: {0}")]
    EmptyInput(&'static str),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
