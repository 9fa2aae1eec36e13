//! Splitting a selection into adjustment files.
//!
//! Nobl9 caps how many SLOs one adjustment may target, so a selection is cut
//! into contiguous chunks of at most `batch_size` SLOs. Chunk `n` becomes
//! `<base>.yml` (n = 1) or `<base>-<n>.yml`, with `metadata.name` and
//! `displayName` suffixed the same way.

use crate::error::{EbaError, Result};
use crate::io;
use crate::paths;
use crate::template::{Fields, Template};
use crate::types::{AdjustmentRecord, Selection, Slo};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

pub const DEFAULT_BATCH_SIZE: usize = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    /// 1-based.
    pub index: usize,
    pub name: String,
    pub display_name: String,
    pub slos: Vec<Slo>,
}

impl Batch {
    pub fn file_name(&self, extension: &str) -> String {
        format!("{}.{extension}", self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    pub path: PathBuf,
    pub slos: usize,
}

/// Result of a generation run.
#[derive(Debug, Clone)]
pub struct Output {
    pub dir: PathBuf,
    pub files: Vec<WrittenFile>,
    pub total_slos: usize,
}

/// Cut `selection` into batches of at most `batch_size`, keeping order.
pub fn plan(selection: &Selection, display_name: &str, batch_size: usize) -> Result<Vec<Batch>> {
    if batch_size == 0 {
        return Err(EbaError::InvalidBatchSize(batch_size));
    }
    let total = selection.len().div_ceil(batch_size);
    let base = paths::fit_name(&paths::slugify(display_name), total);
    paths::validate_name(&paths::suffixed(&base, total))?;
    let display_base = paths::fit_display_name(display_name, total);

    Ok(selection
        .slos()
        .chunks(batch_size)
        .enumerate()
        .map(|(i, chunk)| {
            let index = i + 1;
            Batch {
                index,
                name: paths::suffixed(&base, index),
                display_name: paths::suffixed(&display_base, index),
                slos: chunk.to_vec(),
            }
        })
        .collect())
}

/// Render every batch, then write them into a fresh `run-<timestamp>`
/// directory under `root`. Nothing touches the disk if any batch fails to
/// render.
pub fn write(
    root: &Path,
    at: DateTime<Utc>,
    template: &Template,
    record: &AdjustmentRecord,
    batches: &[Batch],
    extension: &str,
) -> Result<Output> {
    if batches.is_empty() {
        return Err(EbaError::EmptySelection);
    }
    let rendered = batches
        .iter()
        .map(|b| {
            let yaml = template.render(&Fields {
                name: &b.name,
                display_name: &b.display_name,
                record,
                slos: &b.slos,
            })?;
            Ok((b.file_name(extension), b.slos.len(), yaml))
        })
        .collect::<Result<Vec<_>>>()?;

    let dir = io::create_unique_dir(root, &paths::run_dir_stem(at))?;
    let mut files = Vec::with_capacity(rendered.len());
    for (file_name, slos, yaml) in rendered {
        let path = dir.join(file_name);
        io::atomic_write(&path, yaml.as_bytes())?;
        tracing::info!(path = %path.display(), slos, "wrote budget adjustment");
        files.push(WrittenFile { path, slos });
    }

    Ok(Output {
        dir,
        files,
        total_slos: batches.iter().map(|b| b.slos.len()).sum(),
    })
}

/// Plan and write in one step.
pub fn generate(
    root: &Path,
    at: DateTime<Utc>,
    template: &Template,
    record: &AdjustmentRecord,
    selection: &Selection,
    batch_size: usize,
    extension: &str,
) -> Result<Output> {
    let batches = plan(selection, &record.display_name, batch_size)?;
    write(root, at, template, record, &batches, extension)
}
