//! CSV loader for re-reading previously exported datasets.

use crate::dataset::{Dataset, DuplicatePolicy};
use crate::models::{RawRow, Record};
use anyhow::{bail, Context, Result};
use std::path::Path;
use tracing::{debug, info};

/// Raw cells of every data row; the header must name `columns` exactly.
pub fn read_rows(path: &Path, columns: &[&str]) -> Result<Vec<RawRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open {:?}", path))?;

    let headers: Vec<String> = reader
        .headers()
        .with_context(|| format!("No header row in {:?}", path))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    if headers != columns {
        bail!("{:?}: expected columns {:?}, found {:?}", path, columns, headers);
    }

    let mut rows = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("Row {} in {:?} is unreadable", i + 1, path))?;
        rows.push(record.iter().map(|s| s.to_string()).collect());
    }

    debug!("{:?}: {} rows read", path, rows.len());
    Ok(rows)
}

/// Load an exported dataset back through the dataset builder.
pub fn load_dataset<R: Record>(path: &Path, policy: DuplicatePolicy) -> Result<Dataset<R>> {
    let rows = read_rows(path, R::COLUMNS)?;
    let dataset = Dataset::build(rows, policy).with_context(|| format!("Loading {:?}", path))?;
    info!("{:?}: {} rows loaded", path, dataset.len());
    Ok(dataset)
}
