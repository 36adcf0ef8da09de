//! Interaction aggregation and statistics.
//!
//! Pure functions over the loaded table. None of them fail: an empty table
//! produces zero counts, `None` means, and empty groupings.

use crate::models::{InteractionRecord, InteractionTable, ShelfBreakdown};
use std::collections::HashMap;

/// Total number of recorded interactions.
pub fn count(table: &InteractionTable) -> usize {
    table.len()
}

/// Arithmetic mean of all interaction durations, `None` for an empty table.
pub fn mean_duration(table: &InteractionTable) -> Option<f64> {
    if table.is_empty() {
        return None;
    }
    let total: f64 = table.iter().map(|r| r.duration_secs).sum();
    Some(total / table.len() as f64)
}

/// Number of interactions per shelf. Counts sum to [`count`].
pub fn count_by_shelf(table: &InteractionTable) -> HashMap<String, usize> {
    let mut counts: HashMap<String, usize> = HashMap::new();

    for record in table.iter() {
        *counts.entry(record.shelf_id.clone()).or_default() += 1;
    }

    counts
}

/// Mean interaction duration per shelf, over that shelf's records only.
pub fn mean_duration_by_shelf(table: &InteractionTable) -> HashMap<String, f64> {
    let mut sums: HashMap<String, (f64, usize)> = HashMap::new();

    for record in table.iter() {
        let entry = sums.entry(record.shelf_id.clone()).or_insert((0.0, 0));
        entry.0 += record.duration_secs;
        entry.1 += 1;
    }

    sums.into_iter()
        .map(|(shelf, (total, n))| (shelf, total / n as f64))
        .collect()
}

/// A copy of the table sorted by timestamp, most recent first.
///
/// The sort is stable: records sharing a timestamp keep their insertion
/// order. The input table is left untouched.
pub fn sorted_by_time_desc(table: &InteractionTable) -> InteractionTable {
    let mut records: Vec<InteractionRecord> = table.records().to_vec();
    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    InteractionTable::from(records)
}

/// Per-shelf dashboard lines, most active shelf first (ties by label).
pub fn shelf_breakdown(table: &InteractionTable) -> Vec<ShelfBreakdown> {
    let counts = count_by_shelf(table);
    let means = mean_duration_by_shelf(table);

    let mut rows: Vec<ShelfBreakdown> = counts
        .into_iter()
        .map(|(shelf_id, interactions)| ShelfBreakdown {
            mean_duration_secs: means.get(&shelf_id).copied().unwrap_or_default(),
            shelf_id,
            interactions,
        })
        .collect();

    rows.sort_by(|a, b| {
        b.interactions
            .cmp(&a.interactions)
            .then_with(|| a.shelf_id.cmp(&b.shelf_id))
    });

    rows
}
