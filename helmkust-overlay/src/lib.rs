//! Lossless model of a kustomize entry file.
//!
//! Responsibilities:
//! - Parse `kustomization.yaml` while keeping every field, known or not.
//! - Expose `resources` as a typed view over the raw mapping.
//! - Append a resource idempotently and write the document back out.
//!
//! The raw mapping is the only copy of the data. [`Kustomization::resources`]
//! reads from it and [`Kustomization::add_resource`] writes into it, so the
//! typed view and the serialized form cannot drift apart.

mod error;

pub use error::{OverlayError, OverlayResult};

use helmkust_stream::{canonicalize, emit, value_kind};
use helmkust_types::protocol::AGGREGATE_FILE;
use serde_yaml::{Mapping, Value};
use tracing::{debug, warn};

/// Field listing the files kustomize loads, in order.
pub const RESOURCES_KEY: &str = "resources";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Kustomization {
    raw: Mapping,
}

impl Kustomization {
    /// Parse an entry file. An empty document is an empty kustomization.
    pub fn parse(bytes: &[u8]) -> OverlayResult<Self> {
        let value: Value = serde_yaml::from_slice(bytes).map_err(OverlayError::Parse)?;
        let raw = match value {
            Value::Null => Mapping::new(),
            Value::Mapping(raw) => raw,
            other => {
                return Err(OverlayError::NotAMapping {
                    found: value_kind(&other),
                });
            }
        };
        validate_resources(&raw)?;
        Ok(Self { raw })
    }

    /// Paths listed under `resources`, in file order. Empty when the field is absent.
    pub fn resources(&self) -> Vec<&str> {
        match self.raw.get(RESOURCES_KEY) {
            Some(Value::Sequence(items)) => items.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }

    /// The full document, including fields this model does not interpret.
    pub fn raw(&self) -> &Mapping {
        &self.raw
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.raw.get(key)
    }

    /// Append `path` to `resources` unless it is already listed.
    ///
    /// Returns whether the document changed. Paths are compared as plain
    /// strings: `./all.yaml` and `all.yaml` are different entries.
    pub fn add_resource(&mut self, path: &str) -> bool {
        if self.resources().contains(&path) {
            return false;
        }

        let entry = Value::String(path.to_string());
        match self.raw.get_mut(RESOURCES_KEY) {
            Some(Value::Sequence(items)) => items.push(entry),
            // Absent or explicit null.
            _ => {
                self.raw
                    .insert(Value::from(RESOURCES_KEY), Value::Sequence(vec![entry]));
            }
        }
        true
    }

    /// Serialize with keys sorted at every depth.
    pub fn marshal(&self) -> OverlayResult<Vec<u8>> {
        let canonical = canonicalize(&Value::Mapping(self.raw.clone()));
        emit::to_string(&canonical)
            .map(String::into_bytes)
            .map_err(OverlayError::Serialize)
    }
}

fn validate_resources(raw: &Mapping) -> OverlayResult<()> {
    match raw.get(RESOURCES_KEY) {
        None | Some(Value::Null) => Ok(()),
        Some(Value::Sequence(items)) => {
            for (index, item) in items.iter().enumerate() {
                if !item.is_string() {
                    return Err(OverlayError::InvalidResources {
                        reason: format!("entry {index} is {}, expected a path", value_kind(item)),
                    });
                }
            }
            Ok(())
        }
        Some(other) => Err(OverlayError::InvalidResources {
            reason: format!("expected a list of paths, found {}", value_kind(other)),
        }),
    }
}

/// Parse `bytes`, make sure `path` is listed in `resources`, and re-serialize.
///
/// Returns the new document and whether `path` had to be added. Fields other
/// than `resources` are carried through unchanged.
pub fn ensure_resource(bytes: &[u8], path: &str) -> OverlayResult<(Vec<u8>, bool)> {
    let mut kustomization = Kustomization::parse(bytes)?;

    let changed = kustomization.add_resource(path);
    if changed {
        let bare = path.trim_start_matches("./");
        if let Some(alias) = kustomization
            .resources()
            .iter()
            .find(|r| **r != path && r.trim_start_matches("./") == bare)
        {
            warn!(
                resource = path,
                alias = *alias,
                "resource already listed under another spelling; kustomize may load it twice"
            );
        }
        debug!(resource = path, "added resource to kustomization");
    }

    Ok((kustomization.marshal()?, changed))
}

/// [`ensure_resource`] for the aggregate manifest file.
pub fn ensure_aggregate_included(bytes: &[u8]) -> OverlayResult<(Vec<u8>, bool)> {
    ensure_resource(bytes, AGGREGATE_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_reads_resources_in_order() {
        let k = Kustomization::parse(b"resources:\n- all.yaml\n- deployment.yaml\n").unwrap();
        assert_eq!(k.resources(), vec!["all.yaml", "deployment.yaml"]);
    }

    #[test]
    fn parse_without_resources_is_empty() {
        let k = Kustomization::parse(b"patches:\n- path: patch.yaml\n").unwrap();
        assert!(k.resources().is_empty());
        assert!(k.get("patches").is_some());
    }

    #[test]
    fn parse_empty_document() {
        assert!(Kustomization::parse(b"").unwrap().raw().is_empty());
        assert!(Kustomization::parse(b"{}").unwrap().raw().is_empty());
    }

    #[test]
    fn parse_rejects_scalar_resources() {
        let err = Kustomization::parse(b"resources: all.yaml\n").unwrap_err();
        assert!(matches!(err, OverlayError::InvalidResources { .. }), "{err}");
    }

    #[test]
    fn parse_rejects_non_string_resource_entry() {
        let err = Kustomization::parse(b"resources:\n- all.yaml\n- {path: x}\n").unwrap_err();
        assert!(err.to_string().contains("entry 1"), "{err}");
    }

    #[test]
    fn parse_rejects_top_level_sequence() {
        let err = Kustomization::parse(b"- a\n- b\n").unwrap_err();
        assert!(matches!(err, OverlayError::NotAMapping { .. }));
    }

    #[test]
    fn add_resource_replaces_null_resources() {
        let mut k = Kustomization::parse(b"resources:\nnamespace: demo\n").unwrap();
        assert!(k.add_resource("all.yaml"));
        assert_eq!(k.resources(), vec!["all.yaml"]);
        assert_eq!(k.get("namespace"), Some(&Value::from("demo")));
    }

    #[test]
    fn add_resource_keeps_raw_in_step() {
        let mut k = Kustomization::parse(b"resources:\n- base.yaml\n").unwrap();
        assert!(k.add_resource("all.yaml"));
        let raw: Vec<&str> = k.raw()[RESOURCES_KEY]
            .as_sequence()
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect();
        assert_eq!(raw, k.resources());
    }

    #[test]
    fn marshal_sorts_keys() {
        let k = Kustomization::parse(b"namespace: demo\nkind: Kustomization\n").unwrap();
        let out = String::from_utf8(k.marshal().unwrap()).unwrap();
        assert_eq!(out, "kind: Kustomization\nnamespace: demo\n");
    }

    #[test]
    fn dotted_alias_is_not_deduplicated() {
        let (out, changed) = ensure_resource(b"resources:\n- ./all.yaml\n", "all.yaml").unwrap();
        assert!(changed);
        let k = Kustomization::parse(&out).unwrap();
        assert_eq!(k.resources(), vec!["./all.yaml", "all.yaml"]);
    }
}
