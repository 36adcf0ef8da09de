//! Prompt assembly for the insight request.
//!
//! The sample sent to the model is the raw tail of the table, the last
//! records in file order rather than the most recent by timestamp,
//! serialized back into the same CSV shape the log uses.

use crate::errors::InsightError;
use crate::models::InteractionTable;

/// Fixed template the serialized data block is embedded into.
const PROMPT_TEMPLATE: &str = "\
Based on the following customer shelf-interaction data from a minimarket \
(columns: timestamp, rak = shelf id, durasi_detik = interaction duration \
in seconds):

{data}

Provide a summary of behavioral insights, notable engagement patterns, and \
product display recommendations.";

/// Serialize the last `sample_size` records as a CSV block with header.
pub fn sample_csv(table: &InteractionTable, sample_size: usize) -> Result<String, InsightError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    for record in table.tail(sample_size) {
        writer
            .serialize(record)
            .map_err(|e| InsightError::Sample(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| InsightError::Sample(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| InsightError::Sample(e.to_string()))
}

/// Embed a serialized sample into the fixed prompt template.
pub fn build_prompt(sample: &str) -> String {
    PROMPT_TEMPLATE.replace("{data}", sample.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{parse_timestamp, InteractionRecord};

    fn record(ts: &str, shelf: &str, duration: f64) -> InteractionRecord {
        InteractionRecord {
            timestamp: parse_timestamp(ts).unwrap(),
            shelf_id: shelf.to_string(),
            duration_secs: duration,
        }
    }

    fn numbered_table(n: usize) -> InteractionTable {
        (0..n)
            .map(|i| {
                record(
                    &format!("2024-01-01T10:{:02}:00", i),
                    &format!("R{}", i),
                    i as f64,
                )
            })
            .collect()
    }

    #[test]
    fn sample_has_the_log_header_and_the_tail() {
        let sample = sample_csv(&numbered_table(12), 10).unwrap();
        let lines: Vec<&str> = sample.lines().collect();

        assert_eq!(lines[0], "timestamp,rak,durasi_detik");
        assert_eq!(lines.len(), 11);
        // The first two records fall outside the window.
        assert!(!sample.contains("R0,"));
        assert!(!sample.contains("R1,"));
        assert!(lines[1].contains("R2"));
        assert!(lines[10].contains("R11"));
    }

    #[test]
    fn tail_sample_keeps_insertion_order() {
        // Deliberately out of chronological order: the sample must mirror
        // the file, not a sorted view.
        let table = InteractionTable::from(vec![
            record("2024-01-03T10:00:00", "LATE", 1.0),
            record("2024-01-01T10:00:00", "EARLY", 2.0),
            record("2024-01-02T10:00:00", "MID", 3.0),
        ]);

        let sample = sample_csv(&table, 10).unwrap();
        let lines: Vec<&str> = sample.lines().collect();
        assert!(lines[1].contains("LATE"));
        assert!(lines[2].contains("EARLY"));
        assert!(lines[3].contains("MID"));
    }

    #[test]
    fn short_table_samples_everything() {
        let sample = sample_csv(&numbered_table(3), 10).unwrap();
        assert_eq!(sample.lines().count(), 4);
    }

    #[test]
    fn shelf_ids_with_commas_are_quoted() {
        let table = InteractionTable::from(vec![record("2024-01-01T10:00:00", "A,B", 1.0)]);
        let sample = sample_csv(&table, 10).unwrap();
        assert!(sample.contains("\"A,B\""));
    }

    #[test]
    fn prompt_embeds_the_data_block() {
        let sample = sample_csv(&numbered_table(3), 10).unwrap();
        let prompt = build_prompt(&sample);

        assert!(prompt.contains("timestamp,rak,durasi_detik"));
        assert!(prompt.contains("R2"));
        assert!(prompt.contains("display recommendations"));
        assert!(!prompt.contains("{data}"));
    }
}
