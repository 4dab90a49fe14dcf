//! Candidate records and their confidence scores

use std::fmt;

/// Heuristic confidence score, always within [0.0, 1.0]
///
/// Values come from the model's own self-report and are not calibrated
/// probabilities. Construction clamps; non-finite input becomes 0.0.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Confidence(f64);

impl Confidence {
    /// Zero confidence
    pub const ZERO: Confidence = Confidence(0.0);

    /// Build a confidence, clamping into [0, 1]
    ///
    /// # Examples
    ///
    /// ```
    /// use thera_domain::Confidence;
    ///
    /// assert_eq!(Confidence::clamped(1.7).value(), 1.0);
    /// assert_eq!(Confidence::clamped(-0.2).value(), 0.0);
    /// assert_eq!(Confidence::clamped(f64::NAN).value(), 0.0);
    /// ```
    pub fn clamped(value: f64) -> Self {
        if value.is_finite() {
            Self(value.clamp(0.0, 1.0))
        } else {
            Self::ZERO
        }
    }

    /// Raw value
    pub fn value(&self) -> f64 {
        self.0
    }

    /// True when the score meets or exceeds `threshold`
    pub fn meets(&self, threshold: f64) -> bool {
        self.0 >= threshold
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// One extracted claim (e.g. "drug X treats condition Y")
///
/// Created by the response parser from a single reply and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateRecord {
    /// Extracted label (condition name)
    pub label: String,
    /// Self-reported confidence
    pub confidence: Confidence,
    /// Whether the model asserted explicit evidence
    pub evidence: bool,
    /// Supporting citation ids, in reply order, without repeats
    pub citations: Vec<String>,
    /// Free-text rationale
    pub rationale: String,
    /// Unix timestamp (seconds) when the record was parsed
    pub extracted_at: u64,
}

impl CandidateRecord {
    /// Key used for within-reply deduplication
    ///
    /// Case-insensitive, whitespace-collapsed, trailing punctuation removed.
    pub fn dedup_key(&self) -> String {
        normalize_label(&self.label)
    }
}

/// Normalize a label for comparison
pub fn normalize_label(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end_matches(|c: char| c.is_ascii_punctuation())
        .to_lowercase()
}
