//! Embeddable core library for helmkust.
//!
//! Provides a clap-free, I/O-abstracted entry point suitable for linking
//! into a Helm plugin binary or any other host process.
//!
//! # Port traits
//!
//! The external overlay build is abstracted behind [`OverlayBuilder`](ports::OverlayBuilder).
//! The [`adapters`] module provides the default `kustomize` subprocess implementation.
//!
//! # Entry points
//!
//! - [`run`](pipeline::run): read a manifest stream, post-render it, write the result
//! - [`run_bytes`](pipeline::run_bytes): the same over in-memory buffers

pub mod adapters;
pub mod error;
pub mod pipeline;
pub mod ports;
pub mod settings;

pub use error::{BuildError, ErrorKind, PipelineError};
pub use pipeline::{Classified, RunOutcome, classify, run, run_bytes, validate_control};

// Re-export the staging options so embedders don't need helmkust-stage directly.
pub use helmkust_stage::StagingOptions;
pub use helmkust_types::PluginData;
