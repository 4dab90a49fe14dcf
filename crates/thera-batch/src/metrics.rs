//! Metrics collected while a chunk runs

use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;
use thera_domain::ResultSet;

/// Counters for one chunk
///
/// Serialises to the machine-readable summary line orchestration scripts
/// read to decide whether to resubmit.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct RunSummary {
    /// First pending-set index of the chunk
    pub start_index: usize,
    /// Items in the chunk
    pub total: usize,
    /// Items queried and persisted during this run
    pub processed: usize,
    /// Items skipped because a result already existed
    pub already_done: usize,
    /// Items whose inference or write failed
    pub failed: usize,
    /// Records across all persisted results
    pub records_found: usize,
    /// Records at or above the confidence threshold
    pub confirmed: usize,
    /// Zero-record results per outcome
    pub zero_record: BTreeMap<String, usize>,
    /// Wall-clock time for the chunk
    pub elapsed_secs: f64,
    /// Persisted items per minute
    pub throughput_per_min: f64,
    /// The session supervisor stopped the chunk early
    pub interrupted: bool,
    /// Why the chunk never started, for fatal aborts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunSummary {
    /// Empty summary for a chunk of `total` items
    pub fn new(start_index: usize, total: usize) -> Self {
        Self {
            start_index,
            total,
            ..Self::default()
        }
    }

    /// Zero-count summary for a chunk that could not start
    pub fn aborted(start_index: usize, total: usize, reason: impl Into<String>) -> Self {
        Self {
            error: Some(reason.into()),
            ..Self::new(start_index, total)
        }
    }

    /// Record a persisted result
    pub fn record_processed(&mut self, result: &ResultSet) {
        self.processed += 1;
        self.records_found += result.records.len();
        self.confirmed += result.confirmed_count;
        if let Some(outcome) = result.outcome.filter(|_| result.records.is_empty()) {
            *self.zero_record.entry(outcome.as_str().to_string()).or_insert(0) += 1;
        }
    }

    /// Record an item that already had a result
    pub fn record_skipped(&mut self) {
        self.already_done += 1;
    }

    /// Record a failed item
    pub fn record_failed(&mut self) {
        self.failed += 1;
    }

    /// Close the summary with the chunk's wall-clock time
    pub fn finish(&mut self, elapsed: Duration) {
        self.elapsed_secs = elapsed.as_secs_f64();
        self.throughput_per_min = if self.elapsed_secs > 0.0 {
            self.processed as f64 * 60.0 / self.elapsed_secs
        } else {
            0.0
        };
    }

    /// Items not attempted (only non-zero when interrupted)
    pub fn not_attempted(&self) -> usize {
        self.total
            .saturating_sub(self.processed + self.already_done + self.failed)
    }

    /// Every attempted item ended up persisted or already present
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Single-line JSON for stdout
    pub fn to_json_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| format!("{{\"error\":\"{}\"}}", e))
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Chunk Summary".to_string(),
            "=============".to_string(),
            format!("Chunk start: {}", self.start_index),
            format!("Items: {}", self.total),
            format!("Processed: {}", self.processed),
            format!("Already done: {}", self.already_done),
            format!("Failed: {}", self.failed),
            format!("Records: {} ({} confirmed)", self.records_found, self.confirmed),
            format!("Elapsed: {:.1}s", self.elapsed_secs),
            format!("Throughput: {:.2} items/min", self.throughput_per_min),
        ];

        if let Some(error) = &self.error {
            lines.push(format!("Aborted: {}", error));
        }

        if self.interrupted {
            lines.push(format!("Interrupted: {} items not attempted", self.not_attempted()));
        }

        if !self.zero_record.is_empty() {
            lines.push(String::new());
            lines.push("Zero-record outcomes:".to_string());
            for (outcome, count) in &self.zero_record {
                lines.push(format!("  {}: {}", outcome, count));
            }
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thera_domain::{CandidateRecord, Confidence, Outcome, RunId};

    fn with_records(n: usize) -> ResultSet {
        let records = (0..n)
            .map(|i| CandidateRecord {
                label: format!("condition {}", i),
                confidence: Confidence::clamped(0.5 + 0.2 * i as f64),
                evidence: false,
                citations: vec![],
                rationale: String::new(),
                extracted_at: 0,
            })
            .collect();
        ResultSet::new("x", records, 0.6, RunId::new())
    }

    #[test]
    fn test_counts() {
        let mut summary = RunSummary::new(0, 5);
        summary.record_processed(&with_records(2));
        summary.record_processed(&with_records(0).with_outcome(Outcome::SafetyRefusal));
        summary.record_processed(&with_records(0).with_outcome(Outcome::SafetyRefusal));
        summary.record_skipped();
        summary.record_failed();

        assert_eq!(summary.processed, 3);
        assert_eq!(summary.records_found, 2);
        assert_eq!(summary.confirmed, 1);
        assert_eq!(summary.zero_record.get("safety_refusal"), Some(&2));
        assert_eq!(summary.not_attempted(), 0);
        assert!(!summary.is_success());
    }

    #[test]
    fn test_throughput() {
        let mut summary = RunSummary::new(0, 10);
        for _ in 0..10 {
            summary.record_processed(&with_records(1));
        }
        summary.finish(Duration::from_secs(120));
        assert_eq!(summary.throughput_per_min, 5.0);

        let mut empty = RunSummary::new(0, 0);
        empty.finish(Duration::ZERO);
        assert_eq!(empty.throughput_per_min, 0.0);
    }

    #[test]
    fn test_json_line_is_parseable() {
        let mut summary = RunSummary::new(40, 2);
        summary.record_skipped();
        summary.record_failed();

        let line = summary.to_json_line();
        assert!(!line.contains('\n'));
        let json: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(json["already_done"], 1);
        assert_eq!(json["failed"], 1);
        assert_eq!(json["start_index"], 40);
    }

    #[test]
    fn test_aborted_line_carries_error() {
        let line = RunSummary::aborted(10, 5, "Endpoint unreachable: refused").to_json_line();
        let json: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(json["processed"], 0);
        assert_eq!(json["total"], 5);
        assert_eq!(json["error"], "Endpoint unreachable: refused");

        let ok: serde_json::Value = serde_json::from_str(&RunSummary::new(0, 1).to_json_line()).unwrap();
        assert!(ok.get("error").is_none());
    }

    #[test]
    fn test_summary_text() {
        let mut summary = RunSummary::new(0, 3);
        summary.record_processed(&with_records(0).with_outcome(Outcome::Unclear));
        summary.interrupted = true;

        let text = summary.summary();
        assert!(text.contains("Processed: 1"));
        assert!(text.contains("unclear: 1"));
        assert!(text.contains("2 items not attempted"));
    }
}
