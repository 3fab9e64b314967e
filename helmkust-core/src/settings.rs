//! Clap-free settings for the post-render pipeline.

use helmkust_stage::StagingOptions;

/// How to invoke the overlay build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KustomizeSettings {
    /// Program name or path.
    pub program: String,
    /// Arguments placed before the staging directory.
    pub args: Vec<String>,
}

impl Default for KustomizeSettings {
    fn default() -> Self {
        Self {
            program: "kustomize".to_string(),
            args: vec!["build".to_string()],
        }
    }
}

/// Settings for one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct RunSettings {
    pub kustomize: KustomizeSettings,
    pub staging: StagingOptions,
}
