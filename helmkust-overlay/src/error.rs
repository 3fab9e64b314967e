//! Error types for helmkust-overlay.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OverlayError {
    /// The document is not valid YAML.
    #[error("invalid kustomization YAML: {0}")]
    Parse(#[source] serde_yaml::Error),

    /// The document parsed but is not a mapping.
    #[error("kustomization must be a mapping, found {found}")]
    NotAMapping { found: &'static str },

    /// `resources` is present but is not a list of paths.
    #[error("invalid `resources` field: {reason}")]
    InvalidResources { reason: String },

    #[error("serialize kustomization: {0}")]
    Serialize(#[source] serde_yaml::Error),
}

impl OverlayError {
    /// True for errors caused by the input document rather than by serialization.
    pub fn is_parse(&self) -> bool {
        !matches!(self, OverlayError::Serialize(_))
    }
}

pub type OverlayResult<T> = Result<T, OverlayError>;
