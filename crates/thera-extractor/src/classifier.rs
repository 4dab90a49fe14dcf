//! Diagnose replies that produced zero records
//!
//! Decision order:
//!
//! 1. empty reply -> parsing defect (no response)
//! 2. refusal phrase -> safety refusal
//! 3. "nothing found" phrase -> legitimate negative
//! 4. schema markers present -> parsing defect (the model tried, we failed)
//! 5. treatment vocabulary without structure -> informal mention
//! 6. otherwise -> unclear

use crate::config::ExtractorConfig;
use crate::parser::{contains_any, is_record_heading, split_field};
use crate::types::Field;
use thera_domain::{DefectKind, Outcome};

const TREATMENT_VOCABULARY: &[&str] = &[
    "treat",
    "therapy",
    "therapeutic",
    "indicated for",
    "used for",
    "management of",
    "prescribed for",
];

/// Classifies zero-record replies for operator-facing diagnostics
#[derive(Debug, Clone)]
pub struct OutcomeClassifier {
    refusal_phrases: Vec<String>,
    negative_phrases: Vec<String>,
}

impl OutcomeClassifier {
    /// Build a classifier from extractor configuration
    pub fn new(config: &ExtractorConfig) -> Self {
        Self {
            refusal_phrases: config.refusal_phrases.iter().map(|p| p.to_lowercase()).collect(),
            negative_phrases: config.negative_phrases.iter().map(|p| p.to_lowercase()).collect(),
        }
    }

    /// Classify a reply that parsed to zero records
    ///
    /// # Examples
    ///
    /// ```
    /// use thera_domain::Outcome;
    /// use thera_extractor::{ExtractorConfig, OutcomeClassifier};
    ///
    /// let classifier = OutcomeClassifier::new(&ExtractorConfig::default());
    /// assert_eq!(
    ///     classifier.classify("I can't provide medical advice about this."),
    ///     Outcome::SafetyRefusal
    /// );
    /// ```
    pub fn classify(&self, raw: &str) -> Outcome {
        if raw.trim().is_empty() {
            return Outcome::ParsingDefect(DefectKind::NoResponse);
        }
        if contains_any(raw, &self.refusal_phrases) {
            return Outcome::SafetyRefusal;
        }
        if contains_any(raw, &self.negative_phrases) {
            return Outcome::LegitimateNegative;
        }
        if has_schema_markers(raw) {
            return Outcome::ParsingDefect(DefectKind::StructureUnparsed);
        }

        let lower = raw.to_lowercase();
        if TREATMENT_VOCABULARY.iter().any(|w| lower.contains(w)) {
            return Outcome::InformalMention;
        }

        Outcome::Unclear
    }
}

/// Record headings or any field line the prompt asks for
fn has_schema_markers(raw: &str) -> bool {
    raw.lines().any(|line| {
        is_record_heading(line)
            || split_field(line)
                .and_then(|(name, _)| Field::from_name(&name))
                .is_some_and(|f| matches!(f, Field::Label | Field::Confidence | Field::Citations))
    })
}
