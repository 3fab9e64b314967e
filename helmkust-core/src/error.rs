//! Error types for helmkust-core.
//!
//! Every failure aborts the run. [`ErrorKind`] groups the variants into the
//! categories a caller acts on, and [`PipelineError::exit_code`] separates
//! rejected input (exit code 2) from runtime failures (exit code 1).

use helmkust_overlay::OverlayError;
use helmkust_stage::StageError;
use helmkust_stream::StreamError;
use helmkust_types::protocol::{AGGREGATE_FILE, PLUGIN_KIND};
use std::io;
use thiserror::Error;

/// Failure of the external overlay build.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("failed to start `{program}`: {source}")]
    Spawn { program: String, source: io::Error },

    #[error("`{program}` {}: {diagnostics}", exit_label(.code))]
    Exit {
        program: String,
        /// `None` when the process was killed by a signal.
        code: Option<i32>,
        diagnostics: String,
    },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exited with code {code}"),
        None => "was terminated by a signal".to_string(),
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("parse manifest stream: {0}")]
    Parse(#[from] StreamError),

    #[error("control document at position {position} is malformed: {source}")]
    InvalidControlDocument {
        position: usize,
        source: StreamError,
    },

    #[error(
        "found more than one {} document (positions {first} and {second})",
        PLUGIN_KIND
    )]
    MultipleControlDocuments { first: usize, second: usize },

    #[error(
        "control document file {path:?} uses the reserved name `{}`; \
         that file is generated from the rendered manifests",
        AGGREGATE_FILE
    )]
    ReservedName { path: String },

    #[error("kustomization {path}: {source}")]
    Overlay { path: String, source: OverlayError },

    #[error(transparent)]
    PathTraversal(StageError),

    #[error(transparent)]
    Io(StageError),

    #[error("{action} manifest stream: {source}")]
    StreamIo {
        action: &'static str,
        source: io::Error,
    },

    #[error("overlay build failed: {0}")]
    ExternalTool(#[from] BuildError),
}

impl From<StageError> for PipelineError {
    fn from(err: StageError) -> Self {
        if err.is_unsafe_path() {
            PipelineError::PathTraversal(err)
        } else {
            PipelineError::Io(err)
        }
    }
}

/// Failure categories of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Parse,
    ReservedName,
    PathTraversal,
    Io,
    ExternalTool,
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Parse(_)
            | PipelineError::InvalidControlDocument { .. }
            | PipelineError::MultipleControlDocuments { .. } => ErrorKind::Parse,
            PipelineError::Overlay { source, .. } if source.is_parse() => ErrorKind::Parse,
            PipelineError::Overlay { .. } => ErrorKind::Io,
            PipelineError::ReservedName { .. } => ErrorKind::ReservedName,
            PipelineError::PathTraversal(_) => ErrorKind::PathTraversal,
            PipelineError::Io(_) | PipelineError::StreamIo { .. } => ErrorKind::Io,
            PipelineError::ExternalTool(_) => ErrorKind::ExternalTool,
        }
    }

    /// True when the chart's control document was rejected before staging.
    pub fn is_rejected_input(&self) -> bool {
        matches!(
            self,
            PipelineError::InvalidControlDocument { .. }
                | PipelineError::MultipleControlDocuments { .. }
                | PipelineError::ReservedName { .. }
                | PipelineError::PathTraversal(_)
        )
    }

    /// Returns the recommended exit code for this error.
    pub fn exit_code(&self) -> u8 {
        if self.is_rejected_input() { 2 } else { 1 }
    }
}
