//! CLI presentation: run summaries as a text table or JSON.

use crate::error::ScanError;
use crate::format::human_size;
use crate::scan::ScanSummary;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use std::path::Path;
use std::str::FromStr;

/// Summary output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryFormat {
    Text,
    Json,
}

impl FromStr for SummaryFormat {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(SummaryFormat::Text),
            "json" => Ok(SummaryFormat::Json),
            other => Err(ScanError::Config(format!(
                "Invalid summary format: {} (must be 'text' or 'json')",
                other
            ))),
        }
    }
}

/// Render the summary as a table followed by any missing roots
pub fn format_summary_text(manifest: &Path, summary: &ScanSummary, color: bool) -> String {
    let title = "Scan complete";
    let mut out = if color {
        format!("{}\n", title.bold().underline())
    } else {
        format!("{}\n", title)
    };
    out.push_str(&format!("Manifest: {}\n", manifest.display()));

    let totals = &summary.totals;
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Metric", "Count"]);
    table.add_row(vec!["Roots scanned".to_string(), summary.roots_walked.len().to_string()]);
    table.add_row(vec!["Files hashed".to_string(), totals.files_hashed.to_string()]);
    table.add_row(vec!["Bytes hashed".to_string(), human_size(totals.bytes_hashed)]);
    table.add_row(vec!["Unavailable".to_string(), totals.skipped_unavailable.to_string()]);
    table.add_row(vec!["Non-regular".to_string(), totals.skipped_non_regular.to_string()]);
    table.add_row(vec!["Unreadable dirs".to_string(), totals.skipped_directories.to_string()]);
    table.add_row(vec!["Read failures".to_string(), totals.read_failures.to_string()]);
    out.push_str(&table.to_string());
    out.push('\n');

    for root in &summary.missing_roots {
        let line = format!("Path does not exist: {}", root.display());
        if color {
            out.push_str(&format!("{}\n", line.red()));
        } else {
            out.push_str(&line);
            out.push('\n');
        }
    }

    out
}

/// Render the summary as pretty JSON
pub fn format_summary_json(manifest: &Path, summary: &ScanSummary) -> Result<String, ScanError> {
    let value = serde_json::json!({
        "manifest": manifest,
        "summary": summary,
    });
    serde_json::to_string_pretty(&value)
        .map_err(|e| ScanError::Config(format!("Failed to serialize summary: {}", e)))
}
