//! Result sets - everything produced for one work item

use crate::{CandidateRecord, Outcome, RunId};

/// All records extracted for one work item, plus run metadata
///
/// Built exactly once after a successful inference call and persisted by the
/// result store. Records are already deduplicated by the parser.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet {
    /// Work item this result belongs to
    pub work_item_id: String,
    /// Deduplicated records in reply order
    pub records: Vec<CandidateRecord>,
    /// Records whose confidence meets `confidence_threshold`
    pub confirmed_count: usize,
    /// Threshold used to count confirmed records
    pub confidence_threshold: f64,
    /// Wall-clock time spent on this item (milliseconds)
    pub processing_time_ms: u64,
    /// Model that produced the reply
    pub model_name: String,
    /// Unix timestamp (seconds) of creation
    pub created_at: u64,
    /// Raw reply text, kept for audit and failure classification
    pub raw_reply: String,
    /// Verdict when `records` is empty
    pub outcome: Option<Outcome>,
    /// Worker invocation that produced this result
    pub run_id: RunId,
}

impl ResultSet {
    /// Create a result set, counting confirmed records against `confidence_threshold`
    ///
    /// # Examples
    ///
    /// ```
    /// use thera_domain::{CandidateRecord, Confidence, ResultSet, RunId};
    ///
    /// let record = CandidateRecord {
    ///     label: "Hypertension".into(),
    ///     confidence: Confidence::clamped(0.85),
    ///     evidence: true,
    ///     citations: vec![],
    ///     rationale: String::new(),
    ///     extracted_at: 0,
    /// };
    /// let set = ResultSet::new("lisinopril", vec![record], 0.6, RunId::new());
    /// assert_eq!(set.confirmed_count, 1);
    /// ```
    pub fn new(
        work_item_id: impl Into<String>,
        records: Vec<CandidateRecord>,
        confidence_threshold: f64,
        run_id: RunId,
    ) -> Self {
        let confirmed_count = records
            .iter()
            .filter(|r| r.confidence.meets(confidence_threshold))
            .count();

        Self {
            work_item_id: work_item_id.into(),
            records,
            confirmed_count,
            confidence_threshold,
            processing_time_ms: 0,
            model_name: String::new(),
            created_at: crate::unix_now(),
            raw_reply: String::new(),
            outcome: None,
            run_id,
        }
    }

    /// Attach the raw reply
    pub fn with_raw_reply(mut self, raw_reply: impl Into<String>) -> Self {
        self.raw_reply = raw_reply.into();
        self
    }

    /// Attach the zero-record verdict
    pub fn with_outcome(mut self, outcome: Outcome) -> Self {
        self.outcome = Some(outcome);
        self
    }

    /// Attach the model name
    pub fn with_model_name(mut self, model_name: impl Into<String>) -> Self {
        self.model_name = model_name.into();
        self
    }

    /// Attach processing time
    pub fn with_processing_time_ms(mut self, ms: u64) -> Self {
        self.processing_time_ms = ms;
        self
    }

    /// True when no records were found
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
