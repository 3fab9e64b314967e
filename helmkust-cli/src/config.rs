//! Configuration file loading for helmkust.
//!
//! Discovers and loads `helmkust.toml` from the working directory, or from an
//! explicit path. Merges config file settings with CLI arguments (CLI takes precedence).

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use helmkust_core::settings::{KustomizeSettings, RunSettings};
use helmkust_stage::{DEFAULT_PREFIX, StagingOptions};
use serde::Deserialize;
use tracing::debug;

/// The config file name to search for.
pub const CONFIG_FILE_NAME: &str = "helmkust.toml";

/// Top-level configuration from helmkust.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HelmkustConfig {
    pub kustomize: KustomizeConfig,
    pub staging: StagingConfig,
}

/// How the overlay build is invoked.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KustomizeConfig {
    /// Program name or path.
    pub binary: String,

    /// Arguments placed before the staging directory.
    pub args: Vec<String>,
}

impl Default for KustomizeConfig {
    fn default() -> Self {
        let defaults = KustomizeSettings::default();
        Self {
            binary: defaults.program,
            args: defaults.args,
        }
    }
}

/// Where staging areas are created.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StagingConfig {
    /// Parent directory for staging areas (default: the system temp dir).
    pub parent_dir: Option<Utf8PathBuf>,

    /// Directory name prefix.
    pub prefix: String,
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            parent_dir: None,
            prefix: DEFAULT_PREFIX.to_string(),
        }
    }
}

/// Look for `helmkust.toml` in `dir`.
pub fn discover_config(dir: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = dir.join(CONFIG_FILE_NAME);
    if config_path.is_file() {
        debug!("found config file at {}", config_path);
        Some(config_path)
    } else {
        debug!("no config file found at {}", config_path);
        None
    }
}

/// Load and parse a helmkust.toml config file.
pub fn load_config(path: &Utf8Path) -> anyhow::Result<HelmkustConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

pub fn parse_config(contents: &str) -> anyhow::Result<HelmkustConfig> {
    let config: HelmkustConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

/// Load the explicit config if given, otherwise the one in `dir`, otherwise defaults.
///
/// An explicit path that does not exist is an error.
pub fn load_or_default(
    explicit: Option<&Utf8Path>,
    dir: &Utf8Path,
) -> anyhow::Result<HelmkustConfig> {
    if let Some(path) = explicit {
        return load_config(path);
    }
    match discover_config(dir) {
        Some(path) => load_config(&path),
        None => Ok(HelmkustConfig::default()),
    }
}

/// CLI overrides. `None`/empty means "use the config file".
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub kustomize_bin: Option<String>,
    pub kustomize_args: Vec<String>,
    pub staging_dir: Option<Utf8PathBuf>,
}

/// Builder for merging config file with CLI arguments.
pub struct ConfigMerger {
    config: HelmkustConfig,
}

impl ConfigMerger {
    pub fn new(config: HelmkustConfig) -> Self {
        Self { config }
    }

    /// Produce run settings. CLI values replace config values; `--kustomize-arg`
    /// replaces the whole argument list rather than extending it.
    pub fn merge(self, cli: CliOverrides) -> RunSettings {
        let HelmkustConfig { kustomize, staging } = self.config;

        let args = if cli.kustomize_args.is_empty() {
            kustomize.args
        } else {
            cli.kustomize_args
        };

        RunSettings {
            kustomize: KustomizeSettings {
                program: cli.kustomize_bin.unwrap_or(kustomize.binary),
                args,
            },
            staging: StagingOptions {
                parent_dir: cli.staging_dir.or(staging.parent_dir),
                prefix: staging.prefix,
            },
        }
    }
}
