//! The post-render pipeline.
//!
//! One pass, no retries:
//! decode -> classify -> validate -> stage -> patch entry file -> build -> re-encode.
//! A stream without a control document is re-encoded and returned without
//! staging anything. The staging area is removed on every exit path.

use crate::error::PipelineError;
use crate::ports::OverlayBuilder;
use camino::Utf8Path;
use helmkust_overlay::ensure_aggregate_included;
use helmkust_stage::{StagingArea, StagingOptions, validate_path};
use helmkust_stream::{Manifest, decode, encode};
use helmkust_types::PluginData;
use helmkust_types::protocol::{AGGREGATE_FILE, PLUGIN_API_VERSION, PLUGIN_KIND};
use std::io::{Read, Write};
use tracing::{debug, info};

/// Outcome of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// Canonical output stream.
    pub output: Vec<u8>,
    /// Ordinary manifests in the input (the control document is not counted).
    pub manifests_in: usize,
    pub manifests_out: usize,
    /// Whether the overlay build ran.
    pub transformed: bool,
}

/// Documents of a stream, split by role.
#[derive(Debug, Clone, Default)]
pub struct Classified {
    pub control: Option<Manifest>,
    /// Every other document, in stream order.
    pub manifests: Vec<Manifest>,
}

/// Read a manifest stream from `input`, post-render it, and write the result to `output`.
pub fn run(
    input: &mut dyn Read,
    output: &mut dyn Write,
    staging: &StagingOptions,
    builder: &dyn OverlayBuilder,
) -> Result<RunOutcome, PipelineError> {
    let mut buf = Vec::new();
    input
        .read_to_end(&mut buf)
        .map_err(|source| PipelineError::StreamIo {
            action: "read",
            source,
        })?;

    let outcome = run_bytes(&buf, staging, builder)?;

    output
        .write_all(&outcome.output)
        .and_then(|()| output.flush())
        .map_err(|source| PipelineError::StreamIo {
            action: "write",
            source,
        })?;

    Ok(outcome)
}

/// Post-render an in-memory manifest stream.
pub fn run_bytes(
    input: &[u8],
    staging: &StagingOptions,
    builder: &dyn OverlayBuilder,
) -> Result<RunOutcome, PipelineError> {
    let documents = decode(input)?;
    if documents.is_empty() {
        debug!("empty manifest stream");
        return Ok(RunOutcome {
            output: Vec::new(),
            manifests_in: 0,
            manifests_out: 0,
            transformed: false,
        });
    }

    let Classified { control, manifests } = classify(documents)?;

    let Some(control) = control else {
        debug!(
            manifests = manifests.len(),
            "no control document; passing manifests through"
        );
        return Ok(RunOutcome {
            output: encode(&manifests)?,
            manifests_in: manifests.len(),
            manifests_out: manifests.len(),
            transformed: false,
        });
    };

    let plugin: PluginData =
        control
            .parse_as()
            .map_err(|source| PipelineError::InvalidControlDocument {
                position: control.position(),
                source,
            })?;
    validate_control(&plugin)?;

    let rendered = build_overlay(&plugin, &manifests, staging, builder)?;
    let documents = decode(&rendered)?;

    let outcome = RunOutcome {
        output: encode(&documents)?,
        manifests_in: manifests.len(),
        manifests_out: documents.len(),
        transformed: true,
    };
    info!(
        manifests_in = outcome.manifests_in,
        manifests_out = outcome.manifests_out,
        files = plugin.files.len(),
        "overlay applied"
    );
    Ok(outcome)
}

/// Split out the control document. More than one is an error.
pub fn classify(documents: Vec<Manifest>) -> Result<Classified, PipelineError> {
    let mut classified = Classified::default();
    for document in documents {
        if !document.type_meta().is(PLUGIN_API_VERSION, PLUGIN_KIND) {
            classified.manifests.push(document);
            continue;
        }
        if let Some(first) = &classified.control {
            return Err(PipelineError::MultipleControlDocuments {
                first: first.position(),
                second: document.position(),
            });
        }
        debug!(position = document.position(), "found control document");
        classified.control = Some(document);
    }
    Ok(classified)
}

/// Check every file key of the control document before anything touches disk.
///
/// A key naming the aggregate file, or a path beneath it, is reserved after
/// normalization. A reserved key wins over a traversal error elsewhere in the map.
pub fn validate_control(plugin: &PluginData) -> Result<(), PipelineError> {
    let mut unsafe_path = None;
    for key in plugin.files.keys() {
        match validate_path(key) {
            Ok(normalized) if shadows_aggregate(&normalized) => {
                return Err(PipelineError::ReservedName { path: key.clone() });
            }
            Ok(_) => {}
            Err(err) => {
                unsafe_path.get_or_insert(err);
            }
        }
    }
    match unsafe_path {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}

// `all.yaml/x.yaml` would turn the aggregate's location into a directory.
fn shadows_aggregate(normalized: &Utf8Path) -> bool {
    normalized
        .components()
        .next()
        .is_some_and(|first| first.as_str() == AGGREGATE_FILE)
}

fn build_overlay(
    plugin: &PluginData,
    manifests: &[Manifest],
    staging: &StagingOptions,
    builder: &dyn OverlayBuilder,
) -> Result<Vec<u8>, PipelineError> {
    // Dropping `area` on any early return removes the directory.
    let area = StagingArea::create(staging)?;

    area.extract_files(&plugin.files)?;
    area.write_file(AGGREGATE_FILE, &encode(manifests)?)?;

    let entry = plugin.entry_file();
    let current = area.read_file(entry)?;
    let (patched, changed) =
        ensure_aggregate_included(&current).map_err(|source| PipelineError::Overlay {
            path: entry.to_string(),
            source,
        })?;
    if changed {
        area.write_file(entry, &patched)?;
    }
    debug!(entry, changed, root = %area.root(), "staged overlay");

    let rendered = builder.build(area.root())?;
    area.teardown();
    Ok(rendered)
}
