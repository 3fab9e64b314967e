//! Port traits abstracting external tools away from the pipeline.

use crate::error::BuildError;
use camino::Utf8Path;

/// The overlay build run against a staged directory.
///
/// Implementations read the entry configuration under `root` and return the
/// rendered multi-document YAML stream. They are called at most once per run.
pub trait OverlayBuilder {
    fn build(&self, root: &Utf8Path) -> Result<Vec<u8>, BuildError>;
}
