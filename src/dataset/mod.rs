//! Dataset builder: raw rows → typed, coerced, schema-conforming table.

use crate::models::{RawRow, Record};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DatasetError {
    #[error("row {row} has {found} cells, schema {columns:?} needs {expected}")]
    WidthMismatch {
        row: usize,
        found: usize,
        expected: usize,
        columns: &'static [&'static str],
    },
}

/// What to do with several rows naming the same party.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Keep every row as scraped.
    #[default]
    Preserve,
    /// Fold later rows into the first one, summing their counts.
    Merge,
}

impl DuplicatePolicy {
    pub fn from_flag(merge_duplicates: bool) -> Self {
        if merge_duplicates { Self::Merge } else { Self::Preserve }
    }
}

/// Normalized table, rows in extraction order. Read-only once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset<R> {
    rows: Vec<R>,
}

impl<R: Record> Dataset<R> {
    /// Bind every row to the schema. A width mismatch is a broken data
    /// contract and fails the whole build.
    pub fn build(raw: Vec<RawRow>, policy: DuplicatePolicy) -> Result<Self, DatasetError> {
        let mut rows = Vec::with_capacity(raw.len());
        for (i, cells) in raw.iter().enumerate() {
            let record = R::from_cells(cells).ok_or(DatasetError::WidthMismatch {
                row: i,
                found: cells.len(),
                expected: R::COLUMNS.len(),
                columns: R::COLUMNS,
            })?;
            rows.push(record);
        }

        if policy == DuplicatePolicy::Merge {
            let before = rows.len();
            rows = merge_by_party(rows);
            debug!("Merged {} duplicate rows", before - rows.len());
        }

        info!("Built {:?} dataset: {} rows", R::COLUMNS, rows.len());
        Ok(Self { rows })
    }

    pub fn from_records(rows: Vec<R>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn columns(&self) -> &'static [&'static str] {
        R::COLUMNS
    }
}

fn merge_by_party<R: Record>(rows: Vec<R>) -> Vec<R> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut merged: Vec<R> = Vec::with_capacity(rows.len());

    for row in rows {
        match index.get(row.party()) {
            Some(&i) => merged[i].absorb(&row),
            None => {
                index.insert(row.party().to_string(), merged.len());
                merged.push(row);
            }
        }
    }
    merged
}
