//! Core data structures for the shelf-interaction dashboard.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// One recorded customer engagement with a shelf.
///
/// Serialized field names follow the log's column contract: `rak` is the
/// shelf label, `durasi_detik` the interaction duration in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    /// Event time, timezone-naive (the log carries no offset).
    #[serde(with = "timestamp_format")]
    pub timestamp: NaiveDateTime,

    /// Shelf label; repeats across records.
    #[serde(rename = "rak")]
    pub shelf_id: String,

    /// Interaction duration in seconds, finite and non-negative.
    #[serde(rename = "durasi_detik")]
    pub duration_secs: f64,
}

/// Parse a timestamp string in any accepted log format.
///
/// RFC 3339 values are normalized to UTC before the offset is dropped;
/// offset-free values are taken as-is. Fractional seconds are optional.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc).naive_utc());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }
    None
}

/// Serde adapter for the log's timestamp strings.
pub mod timestamp_format {
    use super::parse_timestamp;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const WRITE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

    pub fn serialize<S>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&ts.format(WRITE_FORMAT))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unparseable timestamp {raw:?}")))
    }
}

/// Ordered collection of interaction records. Insertion order is file order.
///
/// Built once per load by the loader and never mutated afterwards; derived
/// views (sorted copies, samples) are computed fresh from it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InteractionTable {
    records: Vec<InteractionRecord>,
}

impl InteractionTable {
    /// An empty table: the valid state for an absent log file.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, InteractionRecord> {
        self.records.iter()
    }

    pub fn records(&self) -> &[InteractionRecord] {
        &self.records
    }

    /// The last `n` records in insertion order (the raw tail, not the
    /// most recent by timestamp).
    pub fn tail(&self, n: usize) -> &[InteractionRecord] {
        let start = self.records.len().saturating_sub(n);
        &self.records[start..]
    }
}

impl From<Vec<InteractionRecord>> for InteractionTable {
    fn from(records: Vec<InteractionRecord>) -> Self {
        Self { records }
    }
}

impl FromIterator<InteractionRecord> for InteractionTable {
    fn from_iter<I: IntoIterator<Item = InteractionRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

/// Per-shelf aggregate line for the dashboard tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShelfBreakdown {
    /// Shelf label (`rak`).
    pub shelf_id: String,
    /// Number of interactions recorded for this shelf.
    pub interactions: usize,
    /// Mean interaction duration for this shelf, in seconds.
    pub mean_duration_secs: f64,
}

/// Metadata about one dashboard render.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Path of the interaction log backing this render.
    pub log_path: String,
    /// When the dashboard was generated.
    pub generated_at: DateTime<Utc>,
    /// Number of records in the loaded table.
    pub record_count: usize,
}

/// Outcome of the on-demand insight request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InsightStatus {
    /// The service returned generated text, kept verbatim.
    Generated { text: String },
    /// The table was empty; no network call was made.
    SkippedEmpty,
    /// The call failed; the dashboard still renders.
    Failed { error: String },
}

/// The complete dashboard: everything the renderers consume.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardReport {
    pub metadata: ReportMetadata,

    /// Total number of interactions.
    pub total_interactions: usize,

    /// Mean duration across all records; `None` for an empty table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean_duration_secs: Option<f64>,

    /// Per-shelf aggregates, most active shelf first.
    pub shelves: Vec<ShelfBreakdown>,

    /// Most recent interactions, newest first, capped by config.
    pub recent: Vec<InteractionRecord>,

    /// Insight outcome; `None` when no insight was requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insight: Option<InsightStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(ts: &str, shelf: &str, duration: f64) -> InteractionRecord {
        InteractionRecord {
            timestamp: parse_timestamp(ts).unwrap(),
            shelf_id: shelf.to_string(),
            duration_secs: duration,
        }
    }

    #[test]
    fn parses_iso_and_space_separated_timestamps() {
        assert!(parse_timestamp("2024-01-01T10:00:00").is_some());
        assert!(parse_timestamp("2024-01-01 10:00:00").is_some());
        assert!(parse_timestamp("2024-01-01T10:00:00.250").is_some());
        assert!(parse_timestamp("  2024-01-01T10:00:00  ").is_some());
    }

    #[test]
    fn rejects_unparseable_timestamps() {
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("2024-13-01T10:00:00").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn rfc3339_offsets_normalize_to_utc() {
        let ts = parse_timestamp("2024-01-01T10:00:00+07:00").unwrap();
        assert_eq!(ts, parse_timestamp("2024-01-01T03:00:00").unwrap());
    }

    #[test]
    fn tail_takes_the_last_records_in_order() {
        let table = InteractionTable::from(vec![
            record("2024-01-01T10:00:00", "A", 1.0),
            record("2024-01-01T10:00:01", "B", 2.0),
            record("2024-01-01T10:00:02", "C", 3.0),
        ]);
        let tail = table.tail(2);
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0].shelf_id, "B");
        assert_eq!(tail[1].shelf_id, "C");
    }

    #[test]
    fn tail_larger_than_table_takes_everything() {
        let table = InteractionTable::from(vec![record("2024-01-01T10:00:00", "A", 1.0)]);
        assert_eq!(table.tail(10).len(), 1);
        assert!(InteractionTable::empty().tail(5).is_empty());
    }

    #[test]
    fn insight_status_serializes_with_a_status_tag() {
        let json = serde_json::to_value(InsightStatus::Generated {
            text: "busy morning".into(),
        })
        .unwrap();
        assert_eq!(json["status"], "generated");
        assert_eq!(json["text"], "busy morning");

        let json = serde_json::to_value(InsightStatus::SkippedEmpty).unwrap();
        assert_eq!(json["status"], "skipped_empty");
    }

    #[test]
    fn record_serializes_with_log_column_names() {
        let json = serde_json::to_value(record("2024-01-01T10:00:00", "A", 5.0)).unwrap();
        assert_eq!(json["timestamp"], "2024-01-01T10:00:00");
        assert_eq!(json["rak"], "A");
        assert_eq!(json["durasi_detik"], 5.0);
    }
}
