//! Error types for helmkust-stage.

use camino::Utf8PathBuf;
use std::io;
use thiserror::Error;

/// Why a relative path was refused before touching the filesystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PathRejection {
    #[error("absolute paths are not allowed")]
    Absolute,

    #[error("parent directory components are not allowed")]
    ParentTraversal,

    #[error("path names no file")]
    Empty,
}

#[derive(Debug, Error)]
pub enum StageError {
    /// The path would resolve outside the staging area.
    #[error("unsafe path {path:?}: {reason}")]
    UnsafePath {
        path: String,
        reason: PathRejection,
    },

    #[error("{action} {path}: {source}")]
    Io {
        action: &'static str,
        path: Utf8PathBuf,
        source: io::Error,
    },
}

impl StageError {
    pub fn is_unsafe_path(&self) -> bool {
        matches!(self, StageError::UnsafePath { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StageError::Io { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}

pub type StageResult<T> = Result<T, StageError>;
