//! Manifest stream codec.
//!
//! Splits a rendered multi-document YAML stream into [`Manifest`]s and writes
//! manifests back out in canonical form. The codec never maps documents onto
//! a typed schema: every manifest keeps its full mapping so fields it does not
//! know about survive the trip. Callers that need typed access peek at the
//! [`TypeMeta`] first and only then [`Manifest::parse_as`] the documents they
//! care about.

mod canonical;
pub mod emit;
mod manifest;

pub use canonical::canonicalize;
pub use manifest::{Manifest, TypeMeta};

use serde::Deserialize;
use serde_yaml::Value;
use thiserror::Error;
use tracing::debug;

/// Document separator used when joining encoded manifests.
pub const SEPARATOR: &str = "---\n";

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("document {index}: invalid YAML: {source}")]
    Parse {
        index: usize,
        source: serde_yaml::Error,
    },

    #[error("document {index}: expected a mapping at top level, found {found}")]
    NotAMapping { index: usize, found: &'static str },

    #[error("document {index}: unexpected shape: {source}")]
    Schema {
        index: usize,
        source: serde_yaml::Error,
    },

    #[error("document {index}: serialize: {source}")]
    Serialize {
        index: usize,
        source: serde_yaml::Error,
    },
}

/// Split `input` into manifests, in stream order.
///
/// Empty input and empty documents (a bare `---`) yield nothing.
pub fn decode(input: &[u8]) -> Result<Vec<Manifest>, StreamError> {
    if input.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    let mut out = Vec::new();
    for (index, document) in serde_yaml::Deserializer::from_slice(input).enumerate() {
        let value =
            Value::deserialize(document).map_err(|source| StreamError::Parse { index, source })?;
        match value {
            Value::Null => debug!(index, "skipping empty document"),
            Value::Mapping(body) => out.push(Manifest::new(index, body)),
            other => {
                return Err(StreamError::NotAMapping {
                    index,
                    found: value_kind(&other),
                });
            }
        }
    }

    debug!(documents = out.len(), "decoded manifest stream");
    Ok(out)
}

/// Serialize manifests as one canonical stream.
///
/// Mapping keys are sorted at every depth; document order is kept as given.
/// A single document carries no separator and an empty slice encodes to nothing.
pub fn encode(manifests: &[Manifest]) -> Result<Vec<u8>, StreamError> {
    let mut out = String::new();
    for (index, manifest) in manifests.iter().enumerate() {
        if index > 0 {
            out.push_str(SEPARATOR);
        }
        let canonical = canonicalize(&Value::Mapping(manifest.body().clone()));
        let text = emit::to_string(&canonical)
            .map_err(|source| StreamError::Serialize { index, source })?;
        out.push_str(&text);
    }
    Ok(out.into_bytes())
}

/// Short human description of a YAML node's type, for error messages.
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
