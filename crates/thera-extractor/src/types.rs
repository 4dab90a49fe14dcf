//! Intermediate types produced while parsing a reply

use thera_domain::{CandidateRecord, Confidence};

/// Result of parsing one reply
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedReply {
    /// Accepted records, deduplicated, in reply order
    pub records: Vec<CandidateRecord>,
    /// The reply matched a refusal phrase
    pub refused: bool,
    /// Candidate blocks that were discarded (missing label, zero confidence, duplicate)
    pub dropped: usize,
}

impl ParsedReply {
    pub(crate) fn refusal() -> Self {
        Self {
            records: Vec::new(),
            refused: true,
            dropped: 0,
        }
    }
}

/// Named fields the prompt asks the model to emit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Field {
    Label,
    Confidence,
    Evidence,
    Citations,
    Rationale,
}

impl Field {
    /// Map a normalized field name (uppercase, underscores) to a field
    pub(crate) fn from_name(name: &str) -> Option<Self> {
        match name {
            "INDICATION" | "CONDITION" | "DISEASE" | "THERAPEUTIC_INDICATION" => Some(Field::Label),
            "CONFIDENCE" | "CONFIDENCE_SCORE" => Some(Field::Confidence),
            "EVIDENCE" | "EXPLICIT_EVIDENCE" | "EVIDENCE_FLAG" => Some(Field::Evidence),
            "PMIDS" | "PMID" | "CITATIONS" | "SUPPORTING_PMIDS" | "REFERENCES" => Some(Field::Citations),
            "REASONING" | "RATIONALE" | "EXPLANATION" => Some(Field::Rationale),
            _ => None,
        }
    }
}

/// Accumulates fields for one candidate; fails closed on build
#[derive(Debug, Default)]
pub(crate) struct RecordBuilder {
    pub label: Option<String>,
    pub confidence: Option<Confidence>,
    pub evidence: Option<bool>,
    pub citations: Option<Vec<String>>,
    pub rationale: Option<String>,
}

impl RecordBuilder {
    /// True when no field was recognised at all
    pub fn is_blank(&self) -> bool {
        self.label.is_none()
            && self.confidence.is_none()
            && self.evidence.is_none()
            && self.citations.is_none()
            && self.rationale.is_none()
    }

    /// Check required fields
    pub fn validate(&self) -> Result<(), String> {
        match &self.label {
            Some(label) if !label.is_empty() => {}
            _ => return Err("label is missing".to_string()),
        }
        match self.confidence {
            Some(c) if c.value() > 0.0 => Ok(()),
            Some(c) => Err(format!("confidence {} is not positive", c)),
            None => Err("confidence is missing".to_string()),
        }
    }

    /// Build the record, or `None` when validation fails
    pub fn build(self, extracted_at: u64) -> Option<CandidateRecord> {
        self.validate().ok()?;
        Some(CandidateRecord {
            label: self.label?,
            confidence: self.confidence?,
            evidence: self.evidence.unwrap_or(false),
            citations: self.citations.unwrap_or_default(),
            rationale: self.rationale.unwrap_or_default(),
            extracted_at,
        })
    }
}
