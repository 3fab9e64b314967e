//! Default subprocess-backed port implementations.

use crate::error::BuildError;
use crate::ports::OverlayBuilder;
use crate::settings::KustomizeSettings;
use camino::Utf8Path;
use std::process::{Command, Stdio};
use tracing::debug;

/// Runs `<program> <args...> <root>` with `root` as the working directory.
///
/// The default is `kustomize build <root>`; `kubectl kustomize <root>` works
/// the same way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KustomizeCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl KustomizeCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl Default for KustomizeCommand {
    fn default() -> Self {
        Self::from(&KustomizeSettings::default())
    }
}

impl From<&KustomizeSettings> for KustomizeCommand {
    fn from(settings: &KustomizeSettings) -> Self {
        Self::new(settings.program.clone(), settings.args.clone())
    }
}

impl OverlayBuilder for KustomizeCommand {
    fn build(&self, root: &Utf8Path) -> Result<Vec<u8>, BuildError> {
        debug!(program = %self.program, args = ?self.args, root = %root, "running overlay build");

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(root)
            .current_dir(root)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| BuildError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let diagnostics = if stderr.trim().is_empty() {
                String::from_utf8_lossy(&output.stdout).trim().to_string()
            } else {
                stderr.trim().to_string()
            };
            return Err(BuildError::Exit {
                program: self.program.clone(),
                code: output.status.code(),
                diagnostics,
            });
        }

        debug!(bytes = output.stdout.len(), "overlay build finished");
        Ok(output.stdout)
    }
}
