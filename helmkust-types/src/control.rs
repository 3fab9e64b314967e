use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::protocol::{DEFAULT_ENTRY_FILE, ENTRY_FILE_NAMES, PLUGIN_API_VERSION, PLUGIN_KIND};

/// The control document carried in a rendered chart.
///
/// ```yaml
/// apiVersion: helm.plugin.kustomize/v1
/// kind: KustomizePluginData
/// files:
///   kustomization.yaml: |
///     resources:
///       - all.yaml
/// ```
///
/// `files` maps a path relative to the overlay root to the raw file text.
/// Everything else on the document (metadata, labels) is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginData {
    pub api_version: String,
    pub kind: String,

    #[serde(default)]
    pub files: BTreeMap<String, String>,
}

impl Default for PluginData {
    fn default() -> Self {
        Self {
            api_version: PLUGIN_API_VERSION.to_string(),
            kind: PLUGIN_KIND.to_string(),
            files: BTreeMap::new(),
        }
    }
}

impl PluginData {
    /// Name of the overlay entry file inside `files`.
    ///
    /// Returns the key as written, so `./kustomization.yaml` is found too. Falls
    /// back to `kustomization.yaml` when none of the recognised names is present.
    pub fn entry_file(&self) -> &str {
        ENTRY_FILE_NAMES
            .iter()
            .find_map(|name| {
                self.files
                    .keys()
                    .find(|key| names_file(key, name))
                    .map(String::as_str)
            })
            .unwrap_or(DEFAULT_ENTRY_FILE)
    }
}

// Empty and `.` segments do not change which file a key names.
fn names_file(key: &str, name: &str) -> bool {
    let mut segments = key.split('/').filter(|s| !s.is_empty() && *s != ".");
    segments.next() == Some(name) && segments.next().is_none()
}
