use thiserror::Error;

use super::config::ConfigError;
use crate::core::geometry::GeometryError;
use crate::core::models::site::TemplateError;
use crate::core::properties::PropertyError;
use crate::core::table::registry::TableError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid site template: {0}")]
    InvalidTemplate(TemplateError),

    #[error("Invalid symmetry action: {0}")]
    InvalidSymmetryAction(TemplateError),

    #[error("Empty species pool for {target}")]
    EmptyPool { target: String },

    #[error("Site count mismatch: geometry has {geometry} positions, occupancy has {occupancy}")]
    SiteCountMismatch { geometry: usize, occupancy: usize },

    #[error("Pool refers to unknown site '{0}'")]
    UnknownSite(String),

    #[error("Pool refers to unknown equivalence class '{0}'")]
    UnknownClass(String),

    #[error("Species error: {source}")]
    Species {
        #[from]
        source: TableError,
    },

    #[error("Property evaluation failed: {source}")]
    Property {
        #[from]
        source: PropertyError,
    },

    #[error("Geometry error: {source}")]
    Geometry {
        #[from]
        source: GeometryError,
    },

    #[error("Configuration error: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Internal logic error: {0}")]
    Internal(String),
}

impl From<TemplateError> for EngineError {
    fn from(err: TemplateError) -> Self {
        match err {
            TemplateError::SymmetryAction { .. } => EngineError::InvalidSymmetryAction(err),
            other => EngineError::InvalidTemplate(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_violation_maps_to_invalid_symmetry_action() {
        let err: EngineError = TemplateError::SymmetryAction {
            generator: 0,
            site: "a".to_string(),
            image: "b".to_string(),
        }
        .into();
        assert!(matches!(err, EngineError::InvalidSymmetryAction(_)));
    }

    #[test]
    fn other_template_errors_map_to_invalid_template() {
        let err: EngineError = TemplateError::EmptyTemplate.into();
        assert!(matches!(
            err,
            EngineError::InvalidTemplate(TemplateError::EmptyTemplate)
        ));
    }
}
