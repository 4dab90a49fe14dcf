//! Output formatting for plan and status reports.

use crate::commands::StatusReport;
use crate::error::Result;
use colored::*;
use thera_domain::Chunk;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
}

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format a chunk plan.
    pub fn format_plan(&self, chunks: &[Chunk]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let json: Vec<serde_json::Value> = chunks
                    .iter()
                    .map(|c| {
                        serde_json::json!({
                            "worker": c.index,
                            "start_index": c.start,
                            "batch_size": c.size,
                            "endpoint": c.endpoint,
                        })
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&json)?)
            }
            OutputFormat::Table => {
                if chunks.iter().all(|c| c.size == 0) {
                    return Ok(self.colorize("Nothing pending.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["Worker", "Start", "Size", "Range", "Endpoint"]);
                for chunk in chunks {
                    let range = chunk.range();
                    builder.push_record([
                        chunk.index.to_string(),
                        chunk.start.to_string(),
                        chunk.size.to_string(),
                        format!("{}..{}", range.start, range.end),
                        chunk.endpoint.clone().unwrap_or_else(|| "-".to_string()),
                    ]);
                }

                let mut table = builder.build();
                table
                    .with(Style::rounded())
                    .with(Modify::new(Rows::first()).with(Alignment::center()));
                Ok(table.to_string())
            }
        }
    }

    /// Format progress counts.
    pub fn format_status(&self, report: &StatusReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["Total", "Completed", "Pending", "Percent"]);
                builder.push_record([
                    report.total.to_string(),
                    report.completed.to_string(),
                    report.pending.to_string(),
                    format!("{:.1}%", report.percent_complete()),
                ]);

                let mut table = builder.build();
                table
                    .with(Style::rounded())
                    .with(Modify::new(Rows::first()).with(Alignment::center()));

                let mut out = table.to_string();
                if report.orphaned > 0 {
                    out.push('\n');
                    out.push_str(&self.warning(&format!(
                        "{} result file(s) match no catalog entry",
                        report.orphaned
                    )));
                }
                Ok(out)
            }
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}
