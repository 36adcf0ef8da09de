//! Dashboard rendering.
//!
//! Builds the Markdown dashboard (the display surface of this tool) and the
//! JSON variant for downstream consumers from a [`DashboardReport`].

use crate::models::{
    DashboardReport, InsightStatus, InteractionRecord, ReportMetadata, ShelfBreakdown,
};
use anyhow::Result;

/// Generate the complete Markdown dashboard.
pub fn generate_markdown_report(report: &DashboardReport) -> String {
    let mut output = String::new();

    output.push_str("# Shelf Interaction Dashboard\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_summary_section(report));
    output.push_str(&generate_shelf_section(&report.shelves));
    output.push_str(&generate_recent_section(&report.recent));
    output.push_str(&generate_insight_section(report.insight.as_ref()));
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Source Log:** `{}`\n", metadata.log_path));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Records:** {}\n", metadata.record_count));
    section.push('\n');

    section
}

/// Generate the summary metrics. An absent mean renders as `-`.
fn generate_summary_section(report: &DashboardReport) -> String {
    let mean = match report.mean_duration_secs {
        Some(mean) => format!("{:.2}", mean),
        None => "-".to_string(),
    };

    let mut section = String::new();

    section.push_str("## Summary\n\n");
    section.push_str("| Total Interactions | Mean Duration (s) |\n");
    section.push_str("|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} |\n\n",
        report.total_interactions, mean
    ));

    section
}

/// Generate the per-shelf breakdown table.
fn generate_shelf_section(shelves: &[ShelfBreakdown]) -> String {
    let mut section = String::new();

    section.push_str("## Interactions per Shelf\n\n");

    if shelves.is_empty() {
        section.push_str("No interaction data recorded yet.\n\n");
        return section;
    }

    section.push_str("| Shelf | Interactions | Mean Duration (s) |\n");
    section.push_str("|:---|:---:|:---:|\n");
    for shelf in shelves {
        section.push_str(&format!(
            "| {} | {} | {:.2} |\n",
            shelf.shelf_id, shelf.interactions, shelf.mean_duration_secs
        ));
    }
    section.push('\n');

    section
}

/// Generate the recent-interactions table, newest first.
fn generate_recent_section(recent: &[InteractionRecord]) -> String {
    let mut section = String::new();

    section.push_str("## Recent Interactions\n\n");

    if recent.is_empty() {
        section.push_str("No interactions recorded yet.\n\n");
        return section;
    }

    section.push_str("| Timestamp | Shelf | Duration (s) |\n");
    section.push_str("|:---|:---|:---:|\n");
    for record in recent {
        section.push_str(&format!(
            "| {} | {} | {:.2} |\n",
            record.timestamp.format("%Y-%m-%d %H:%M:%S"),
            record.shelf_id,
            record.duration_secs
        ));
    }
    section.push('\n');

    section
}

/// Generate the insight section; empty when no insight was requested.
fn generate_insight_section(insight: Option<&InsightStatus>) -> String {
    let Some(status) = insight else {
        return String::new();
    };

    let mut section = String::new();
    section.push_str("## AI Insight\n\n");

    match status {
        InsightStatus::Generated { text } => {
            section.push_str(text.trim_end());
            section.push_str("\n\n");
        }
        InsightStatus::SkippedEmpty => {
            section.push_str("> ⚠️ No interaction data yet; the insight request was skipped.\n\n");
        }
        InsightStatus::Failed { error } => {
            section.push_str(&format!("> ❌ Insight request failed: {}\n\n", error));
        }
    }

    section
}

/// Generate the dashboard footer.
fn generate_footer() -> String {
    "---\n\n*Generated by rakdash*\n".to_string()
}

/// Render the dashboard as pretty-printed JSON.
pub fn generate_json_report(report: &DashboardReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}
