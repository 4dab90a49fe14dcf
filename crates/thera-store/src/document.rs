//! On-disk shape of a persisted result set

use crate::StoreError;
use serde::{Deserialize, Serialize};
use thera_domain::{CandidateRecord, Confidence, Outcome, ResultSet, RunId};

/// One persisted result document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredResult {
    /// Run metadata
    pub metadata: StoredMetadata,
    /// Extracted records in reply order
    pub records: Vec<StoredRecord>,
    /// Present only when no records were extracted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<StoredDiagnostics>,
}

/// Metadata block of a result document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredMetadata {
    /// Work item id
    pub work_item_id: String,
    /// Number of records found
    pub total_found: usize,
    /// Records at or above the threshold
    pub confirmed_count: usize,
    /// Wall-clock time spent on the item
    pub processing_time_ms: u64,
    /// Unix seconds when the result was produced
    pub timestamp: u64,
    /// Model that produced the reply
    pub model: String,
    /// Threshold used for `confirmed_count`
    pub confidence_threshold: f64,
    /// Worker invocation that produced the result
    pub run_id: String,
}

/// One record in a result document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    /// Condition name
    pub label: String,
    /// Score in [0, 1]
    pub confidence: f64,
    /// The model asserted explicit evidence
    pub evidence: bool,
    /// Supporting citation ids
    pub citations: Vec<String>,
    /// Model rationale
    pub rationale: String,
    /// Unix seconds when the record was parsed
    pub extracted_at: u64,
}

/// Why a result holds no records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDiagnostics {
    /// The reply exactly as received
    pub raw_reply: String,
    /// Classifier verdict identifier
    pub outcome: String,
}

impl From<&CandidateRecord> for StoredRecord {
    fn from(record: &CandidateRecord) -> Self {
        Self {
            label: record.label.clone(),
            confidence: record.confidence.value(),
            evidence: record.evidence,
            citations: record.citations.clone(),
            rationale: record.rationale.clone(),
            extracted_at: record.extracted_at,
        }
    }
}

impl From<&ResultSet> for StoredResult {
    fn from(result: &ResultSet) -> Self {
        let diagnostics = result.records.is_empty().then(|| StoredDiagnostics {
            raw_reply: result.raw_reply.clone(),
            outcome: result.outcome.unwrap_or(Outcome::Unclear).as_str().to_string(),
        });

        Self {
            metadata: StoredMetadata {
                work_item_id: result.work_item_id.clone(),
                total_found: result.records.len(),
                confirmed_count: result.confirmed_count,
                processing_time_ms: result.processing_time_ms,
                timestamp: result.created_at,
                model: result.model_name.clone(),
                confidence_threshold: result.confidence_threshold,
                run_id: result.run_id.to_string(),
            },
            records: result.records.iter().map(StoredRecord::from).collect(),
            diagnostics,
        }
    }
}

impl StoredResult {
    /// Rebuild the domain value
    ///
    /// The raw reply is only kept on disk for zero-record results, so it is
    /// empty otherwise.
    pub fn into_result_set(self) -> Result<ResultSet, StoreError> {
        let run_id = RunId::from_string(&self.metadata.run_id).map_err(StoreError::InvalidData)?;

        let records = self
            .records
            .into_iter()
            .map(|r| CandidateRecord {
                label: r.label,
                confidence: Confidence::clamped(r.confidence),
                evidence: r.evidence,
                citations: r.citations,
                rationale: r.rationale,
                extracted_at: r.extracted_at,
            })
            .collect();

        let mut result = ResultSet::new(
            self.metadata.work_item_id,
            records,
            self.metadata.confidence_threshold,
            run_id,
        )
        .with_model_name(self.metadata.model)
        .with_processing_time_ms(self.metadata.processing_time_ms);
        result.created_at = self.metadata.timestamp;

        if let Some(diagnostics) = self.diagnostics {
            let outcome = Outcome::parse(&diagnostics.outcome).ok_or_else(|| {
                StoreError::InvalidData(format!("unknown outcome '{}'", diagnostics.outcome))
            })?;
            result = result.with_raw_reply(diagnostics.raw_reply).with_outcome(outcome);
        }

        Ok(result)
    }
}
