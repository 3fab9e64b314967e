//! Shared protocol types for the helmkust workspace.
//!
//! # Design constraints
//! - The control-document shape is owned by the chart authors, not by us.
//! - Be tolerant when reading: unknown fields are ignored.
//! - Constants here are part of the wire contract and must not change silently.

pub mod control;

pub use control::PluginData;

/// Protocol constants shared between the chart templates and the post-renderer.
pub mod protocol {
    /// `apiVersion` of the control document.
    pub const PLUGIN_API_VERSION: &str = "helm.plugin.kustomize/v1";

    /// `kind` of the control document.
    pub const PLUGIN_KIND: &str = "KustomizePluginData";

    /// File synthesized from every ordinary manifest in the rendered stream.
    ///
    /// Charts may not ship a file under this name.
    pub const AGGREGATE_FILE: &str = "all.yaml";

    /// Entry configuration filenames recognised by kustomize, in lookup order.
    pub const ENTRY_FILE_NAMES: [&str; 3] = ["kustomization.yaml", "kustomization.yml", "Kustomization"];

    /// Entry file used when the control document ships none of [`ENTRY_FILE_NAMES`].
    pub const DEFAULT_ENTRY_FILE: &str = ENTRY_FILE_NAMES[0];
}
