//! Run-scoped staging area for overlay files.
//!
//! A [`StagingArea`] is a fresh temporary directory owned by exactly one
//! pipeline run. Every path handed to it is checked by [`validate_path`]
//! before it is joined onto the real directory, for reads as well as writes.
//! The directory is removed when the area is torn down or dropped; removal
//! failures are logged and otherwise ignored.

mod error;

pub use error::{PathRejection, StageError, StageResult};

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use fs_err as fs;
use std::io;
use tempfile::TempDir;
use tracing::{debug, warn};

/// Directory name prefix for staging areas.
pub const DEFAULT_PREFIX: &str = "helm-kustomize-";

/// Where and how staging directories are created.
#[derive(Debug, Clone)]
pub struct StagingOptions {
    /// Parent directory; the system temp dir when `None`.
    pub parent_dir: Option<Utf8PathBuf>,
    pub prefix: String,
}

impl Default for StagingOptions {
    fn default() -> Self {
        Self {
            parent_dir: None,
            prefix: DEFAULT_PREFIX.to_string(),
        }
    }
}

/// Check that `path` stays inside whatever root it is joined to.
///
/// `.` segments and repeated separators are dropped. Absolute paths and any
/// `..` segment are refused outright. This is stricter than lexical cleaning:
/// `a/../b` is rejected even though it would land inside the root at `b`.
/// Returns the normalized relative path.
pub fn validate_path(path: &str) -> StageResult<Utf8PathBuf> {
    let reject = |reason| -> StageResult<Utf8PathBuf> {
        Err(StageError::UnsafePath {
            path: path.to_string(),
            reason,
        })
    };

    let mut normalized = Utf8PathBuf::new();
    for component in Utf8Path::new(path).components() {
        match component {
            Utf8Component::Prefix(_) | Utf8Component::RootDir => {
                return reject(PathRejection::Absolute);
            }
            Utf8Component::ParentDir => return reject(PathRejection::ParentTraversal),
            Utf8Component::CurDir => {}
            Utf8Component::Normal(part) => normalized.push(part),
        }
    }

    if normalized.as_str().is_empty() {
        return reject(PathRejection::Empty);
    }
    Ok(normalized)
}

#[derive(Debug)]
pub struct StagingArea {
    dir: Option<TempDir>,
    root: Utf8PathBuf,
}

impl StagingArea {
    /// Create a staging area under the system temp directory.
    pub fn new() -> StageResult<Self> {
        Self::create(&StagingOptions::default())
    }

    /// Create a uniquely named staging area as described by `opts`.
    pub fn create(opts: &StagingOptions) -> StageResult<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(&opts.prefix);

        let parent = opts
            .parent_dir
            .clone()
            .unwrap_or_else(|| Utf8PathBuf::from(std::env::temp_dir().to_string_lossy().into_owned()));

        let dir = builder
            .tempdir_in(&parent)
            .map_err(|source| StageError::Io {
                action: "create staging area in",
                path: parent.clone(),
                source,
            })?;

        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).map_err(|raw| {
            StageError::Io {
                action: "create staging area at",
                path: Utf8PathBuf::from(raw.to_string_lossy().into_owned()),
                source: io::Error::new(io::ErrorKind::InvalidData, "path is not valid UTF-8"),
            }
        })?;

        debug!(path = %root, "created staging area");
        Ok(Self {
            dir: Some(dir),
            root,
        })
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Absolute location of a validated relative path.
    pub fn resolve(&self, rel: &str) -> StageResult<Utf8PathBuf> {
        Ok(self.root.join(validate_path(rel)?))
    }

    /// Write `contents` at `rel`, creating parent directories. Existing files are replaced.
    pub fn write_file(&self, rel: &str, contents: &[u8]) -> StageResult<()> {
        let abs = self.resolve(rel)?;

        if let Some(parent) = abs.parent() {
            fs::create_dir_all(parent).map_err(|source| StageError::Io {
                action: "create directory",
                path: parent.to_path_buf(),
                source,
            })?;
        }

        fs::write(&abs, contents).map_err(|source| StageError::Io {
            action: "write",
            path: Utf8PathBuf::from(rel),
            source,
        })?;

        debug!(path = rel, bytes = contents.len(), "staged file");
        Ok(())
    }

    /// Write every entry of `files`, stopping at the first failure.
    ///
    /// Not transactional: files written before the failure stay in place.
    pub fn extract_files<K, V>(&self, files: impl IntoIterator<Item = (K, V)>) -> StageResult<()>
    where
        K: AsRef<str>,
        V: AsRef<[u8]>,
    {
        for (rel, contents) in files {
            self.write_file(rel.as_ref(), contents.as_ref())?;
        }
        Ok(())
    }

    pub fn read_file(&self, rel: &str) -> StageResult<Vec<u8>> {
        let abs = self.resolve(rel)?;
        fs::read(&abs).map_err(|source| StageError::Io {
            action: "read",
            path: Utf8PathBuf::from(rel),
            source,
        })
    }

    pub fn exists(&self, rel: &str) -> StageResult<bool> {
        Ok(self.resolve(rel)?.is_file())
    }

    /// Remove the staging area now. Equivalent to dropping it.
    pub fn teardown(mut self) {
        self.release();
    }

    fn release(&mut self) {
        let Some(dir) = self.dir.take() else {
            return;
        };
        match dir.close() {
            Ok(()) => debug!(path = %self.root, "removed staging area"),
            Err(err) => warn!(
                path = %self.root,
                error = %err,
                "failed to remove staging area; leaving it for the OS to reclaim"
            ),
        }
    }
}

impl Drop for StagingArea {
    fn drop(&mut self) {
        self.release();
    }
}
