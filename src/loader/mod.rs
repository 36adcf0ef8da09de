//! Interaction log ingestion.
//!
//! Reads the CSV event log into a typed [`InteractionTable`] and owns the
//! per-run cache. An absent file is a valid empty table; a malformed file
//! fails the whole load, and no partially coerced table is ever returned
//! or cached.

use crate::errors::DataFormatError;
use crate::models::{self, InteractionRecord, InteractionTable};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info};

/// One data row as it appears in the file, before coercion.
#[derive(Debug, Deserialize)]
struct RawRecord {
    timestamp: String,
    rak: String,
    durasi_detik: String,
}

/// Read the interaction log at `path`.
///
/// An absent file yields an empty table with the schema intact. When the
/// file exists, every row must coerce: `timestamp` into a date-time and
/// `durasi_detik` into a finite non-negative float. The first failure
/// aborts the load.
pub fn read_log(path: &Path) -> Result<InteractionTable, DataFormatError> {
    if !path.exists() {
        info!(
            "Log file {} not found, starting with an empty table",
            path.display()
        );
        return Ok(InteractionTable::empty());
    }

    let mut reader = csv::Reader::from_path(path).map_err(|source| DataFormatError::Csv {
        path: path.to_path_buf(),
        source,
    })?;

    let mut records = Vec::new();
    for (idx, row) in reader.deserialize::<RawRecord>().enumerate() {
        // Data rows are 1-based; the header is not counted.
        let row_number = idx + 1;
        let raw = row.map_err(|source| DataFormatError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        records.push(coerce_record(row_number, raw)?);
    }

    debug!("Parsed {} records from {}", records.len(), path.display());
    Ok(InteractionTable::from(records))
}

/// Coerce one raw row into a typed record.
fn coerce_record(row: usize, raw: RawRecord) -> Result<InteractionRecord, DataFormatError> {
    let timestamp =
        models::parse_timestamp(&raw.timestamp).ok_or_else(|| DataFormatError::Timestamp {
            row,
            value: raw.timestamp.clone(),
        })?;

    let duration_secs = raw
        .durasi_detik
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|d| d.is_finite() && *d >= 0.0)
        .ok_or_else(|| DataFormatError::Duration {
            row,
            value: raw.durasi_detik.clone(),
        })?;

    let shelf_id = raw.rak.trim().to_string();
    if shelf_id.is_empty() {
        return Err(DataFormatError::ShelfId { row });
    }

    Ok(InteractionRecord {
        timestamp,
        shelf_id,
        duration_secs,
    })
}

/// Single-entry cache for the loaded table, keyed by path and mtime.
///
/// Within one run the table is read at most once; [`TableCache::refresh`]
/// is the only way to pick up file changes short of a restart. A failed
/// reload keeps the previous good table cached.
#[derive(Debug)]
pub struct TableCache {
    path: PathBuf,
    entry: Option<CacheEntry>,
}

#[derive(Debug)]
struct CacheEntry {
    table: InteractionTable,
    /// Last-modified time at load; `None` when the file was absent.
    modified: Option<SystemTime>,
}

impl TableCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entry: None,
        }
    }

    /// The cached table, reading the file on first access.
    pub fn table(&mut self) -> Result<&InteractionTable, DataFormatError> {
        match self.entry {
            Some(ref entry) => Ok(&entry.table),
            None => {
                let modified = modified_time(&self.path);
                let table = read_log(&self.path)?;
                debug!("Cached {} interaction records", table.len());
                Ok(&self.entry.insert(CacheEntry { table, modified }).table)
            }
        }
    }

    /// Explicitly re-check the file, reloading when its mtime changed.
    ///
    /// On a reload failure the previous table stays cached and the error
    /// propagates to the caller.
    pub fn refresh(&mut self) -> Result<&InteractionTable, DataFormatError> {
        let modified = modified_time(&self.path);
        let unchanged = modified.is_some()
            && matches!(&self.entry, Some(entry) if entry.modified == modified);
        if unchanged {
            debug!("Log unchanged since last load, keeping cached table");
            return self.table();
        }

        let table = read_log(&self.path)?;
        info!(
            "Reloaded {} interaction records from {}",
            table.len(),
            self.path.display()
        );
        Ok(&self.entry.insert(CacheEntry { table, modified }).table)
    }

    /// Drop the cached table; the next access re-reads the file.
    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}

/// Last-modified time, `None` when the file is absent or unstatable.
fn modified_time(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}
