//! Parse free-text model replies into candidate records
//!
//! The grammar is deliberately small:
//!
//! 1. a reply is split into blocks at record headings (`Indication 1:`),
//!    falling back to numbered list items (`1.` / `2)`) when no heading exists;
//! 2. each block is read line by line as `FIELD: value` pairs;
//! 3. a block becomes a record only if it has a label and a positive
//!    confidence, otherwise it is dropped.
//!
//! Everything here is pure; the caller supplies the timestamp.

use crate::config::ExtractorConfig;
use crate::types::{Field, ParsedReply, RecordBuilder};
use std::collections::{BTreeSet, HashSet};
use thera_domain::{CandidateRecord, Confidence};
use tracing::debug;

/// Reply parser configured with refusal phrases and the citation id format
#[derive(Debug, Clone)]
pub struct ReplyParser {
    refusal_phrases: Vec<String>,
    citation_id_digits: usize,
}

impl ReplyParser {
    /// Build a parser from extractor configuration
    pub fn new(config: &ExtractorConfig) -> Self {
        Self {
            refusal_phrases: config.refusal_phrases.iter().map(|p| p.to_lowercase()).collect(),
            citation_id_digits: config.citation_id_digits,
        }
    }

    /// Parse `raw` into records
    ///
    /// Citation ids survive only if they have the configured digit count and
    /// appear in `available_citations`.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::collections::BTreeSet;
    /// use thera_extractor::{ExtractorConfig, ReplyParser};
    ///
    /// let parser = ReplyParser::new(&ExtractorConfig::default());
    /// let reply = "Indication 1:\nINDICATION: Hypertension\nCONFIDENCE: 0.85\nEVIDENCE: YES";
    /// let parsed = parser.parse(reply, &BTreeSet::new(), 0);
    /// assert_eq!(parsed.records.len(), 1);
    /// assert!(parsed.records[0].evidence);
    /// ```
    pub fn parse(
        &self,
        raw: &str,
        available_citations: &BTreeSet<String>,
        extracted_at: u64,
    ) -> ParsedReply {
        if contains_any(raw, &self.refusal_phrases) {
            debug!("Reply matched a refusal phrase");
            return ParsedReply::refusal();
        }

        let mut records: Vec<CandidateRecord> = Vec::new();
        let mut seen = HashSet::new();
        let mut dropped = 0;

        for block in split_blocks(raw) {
            let builder = self.parse_block(&block, available_citations);
            if builder.is_blank() {
                continue;
            }
            match builder.build(extracted_at) {
                Some(record) => {
                    if seen.insert(record.dedup_key()) {
                        records.push(record);
                    } else {
                        debug!(label = %record.label, "Dropping duplicate label");
                        dropped += 1;
                    }
                }
                None => dropped += 1,
            }
        }

        ParsedReply {
            records,
            refused: false,
            dropped,
        }
    }

    fn parse_block(&self, block: &[&str], available: &BTreeSet<String>) -> RecordBuilder {
        let mut builder = RecordBuilder::default();
        let mut current: Option<Field> = None;

        for line in block {
            match split_field(line) {
                Some((name, value)) => {
                    current = Field::from_name(&name);
                    let Some(field) = current else { continue };
                    match field {
                        Field::Label => {
                            if builder.label.is_none() {
                                builder.label = Some(clean_label(&value));
                            }
                        }
                        Field::Confidence => {
                            if builder.confidence.is_none() {
                                builder.confidence = Some(Confidence::clamped(parse_confidence(&value)));
                            }
                        }
                        Field::Evidence => {
                            if builder.evidence.is_none() {
                                builder.evidence = Some(parse_evidence(&value));
                            }
                        }
                        Field::Citations => {
                            let ids = extract_citations(&value, available, self.citation_id_digits);
                            let citations = builder.citations.get_or_insert_with(Vec::new);
                            for id in ids {
                                if !citations.contains(&id) {
                                    citations.push(id);
                                }
                            }
                        }
                        Field::Rationale => {
                            if builder.rationale.is_none() {
                                builder.rationale = Some(value);
                            }
                        }
                    }
                }
                None => {
                    // continuation of a multi-line rationale
                    let text = line.trim();
                    if current == Some(Field::Rationale) && !text.is_empty() {
                        if let Some(rationale) = builder.rationale.as_mut() {
                            if !rationale.is_empty() {
                                rationale.push(' ');
                            }
                            rationale.push_str(text);
                        }
                    }
                }
            }
        }

        builder
    }
}

/// Parse a confidence token into [0, 1]; unparsable input yields 0.0
///
/// Takes the leading number of the value, so `0.85 (high)` and a
/// sentence-final `0.85.` both parse as 0.85. A trailing `%` divides by 100.
///
/// # Examples
///
/// ```
/// use thera_extractor::parse_confidence;
///
/// assert_eq!(parse_confidence("0.85"), 0.85);
/// assert_eq!(parse_confidence("85%"), 0.85);
/// assert_eq!(parse_confidence("1.4"), 1.0);
/// assert_eq!(parse_confidence("high"), 0.0);
/// ```
pub fn parse_confidence(token: &str) -> f64 {
    let token = token.trim().trim_start_matches(['*', '"', '\'', '(', '[']);
    let numeric_len = leading_number_len(token);

    let (number, rest) = token.split_at(numeric_len);
    let Ok(mut value) = number.parse::<f64>() else {
        return 0.0;
    };
    if rest.trim_start().starts_with('%') {
        value /= 100.0;
    }
    Confidence::clamped(value).value()
}

/// Byte length of the leading `[+-]digits[.digits]` run
///
/// A point only counts when a digit follows it, so trailing punctuation is
/// left out of the number.
fn leading_number_len(token: &str) -> usize {
    let bytes = token.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'-' | b'+')) {
        end = 1;
    }
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end + 1 < bytes.len() && bytes[end] == b'.' && bytes[end + 1].is_ascii_digit() {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
    }
    end
}

/// Keep well-formed citation ids that were actually offered as evidence
pub fn extract_citations(value: &str, available: &BTreeSet<String>, digits: usize) -> Vec<String> {
    let mut ids = Vec::new();
    for token in value.split(|c: char| !c.is_ascii_alphanumeric()) {
        if token.len() != digits || !token.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        if !available.contains(token) {
            continue;
        }
        if !ids.iter().any(|id| id == token) {
            ids.push(token.to_string());
        }
    }
    ids
}

fn parse_evidence(value: &str) -> bool {
    let first = value
        .trim()
        .split(|c: char| !c.is_ascii_alphabetic())
        .find(|w| !w.is_empty())
        .unwrap_or("")
        .to_ascii_lowercase();
    matches!(first.as_str(), "yes" | "y" | "true" | "explicit")
}

fn clean_label(value: &str) -> String {
    value
        .trim()
        .trim_matches(|c: char| c == '*' || c == '"' || c == '\'' || c == '`')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Case-insensitive substring match against lowercase phrases
pub(crate) fn contains_any(text: &str, lowercase_phrases: &[String]) -> bool {
    let haystack = text.to_lowercase().replace(['\u{2019}', '\u{2018}'], "'");
    lowercase_phrases.iter().any(|p| haystack.contains(p.as_str()))
}

/// Strip list bullets, heading hashes and bold markers from the line start
fn strip_decorations(line: &str) -> &str {
    let mut rest = line.trim();
    loop {
        let before = rest;
        rest = rest.trim_start_matches(['#', '*', '-', '\u{2022}', '>']).trim_start();
        if let Some(after) = strip_list_number(rest) {
            rest = after.trim_start();
        }
        if rest == before {
            return rest;
        }
    }
}

/// `12. rest` or `3) rest` -> `rest`
fn strip_list_number(line: &str) -> Option<&str> {
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    let rest = &line[digits..];
    let rest = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')'))?;
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        Some(rest)
    } else {
        None
    }
}

/// Split `FIELD: value` (or `FIELD = value`) into a normalized name and value
pub(crate) fn split_field(line: &str) -> Option<(String, String)> {
    let cleaned = strip_decorations(line);
    let sep = cleaned.find([':', '='])?;
    let (raw_name, raw_value) = cleaned.split_at(sep);

    let name_chars = raw_name.trim().trim_matches('*');
    if name_chars.is_empty()
        || name_chars.len() > 32
        || name_chars.split_whitespace().count() > 3
        || !name_chars
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == ' ' || c == '_' || c == '-')
    {
        return None;
    }

    let name = name_chars
        .split(|c: char| c == ' ' || c == '-' || c == '_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
        .to_ascii_uppercase();

    let value = raw_value[1..]
        .trim()
        .trim_start_matches('*')
        .trim()
        .to_string();

    Some((name, value))
}

/// `Indication 1:`, `## Indication #2`, `**Indication 3**`
pub(crate) fn is_record_heading(line: &str) -> bool {
    let cleaned = strip_decorations(line).to_ascii_lowercase();
    let Some(rest) = cleaned.strip_prefix("indication") else {
        return false;
    };
    let rest = rest.trim_start();
    let rest = rest.strip_prefix('#').unwrap_or(rest);
    rest.starts_with(|c: char| c.is_ascii_digit())
}

fn is_numbered_item(line: &str) -> bool {
    strip_list_number(line.trim_start()).is_some()
}

/// Split a reply into candidate blocks of lines
///
/// Each block includes its own heading line; text before the first marker is
/// discarded. With no markers at all the whole reply is one block.
pub(crate) fn split_blocks(raw: &str) -> Vec<Vec<&str>> {
    let lines: Vec<&str> = raw.lines().collect();

    let mut starts: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, l)| is_record_heading(l))
        .map(|(i, _)| i)
        .collect();

    if starts.is_empty() {
        starts = lines
            .iter()
            .enumerate()
            .filter(|(_, l)| is_numbered_item(l))
            .map(|(i, _)| i)
            .collect();
    }

    if starts.is_empty() {
        return vec![lines];
    }

    starts
        .iter()
        .enumerate()
        .map(|(n, &start)| {
            let end = starts.get(n + 1).copied().unwrap_or(lines.len());
            lines[start..end].to_vec()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> ReplyParser {
        ReplyParser::new(&ExtractorConfig::default())
    }

    fn none() -> BTreeSet<String> {
        BTreeSet::new()
    }

    #[test]
    fn test_single_well_formed_record() {
        let reply = "Indication 1:\nINDICATION: Hypertension\nCONFIDENCE: 0.85\nEVIDENCE: YES\nREASONING: Lowers blood pressure.";
        let parsed = parser().parse(reply, &none(), 7);

        assert_eq!(parsed.records.len(), 1);
        let record = &parsed.records[0];
        assert_eq!(record.label, "Hypertension");
        assert_eq!(record.confidence.value(), 0.85);
        assert!(record.evidence);
        assert_eq!(record.rationale, "Lowers blood pressure.");
        assert_eq!(record.extracted_at, 7);
        assert!(!parsed.refused);
    }

    #[test]
    fn test_refusal_returns_empty() {
        let parsed = parser().parse("I can't provide medical advice about this.", &none(), 0);
        assert!(parsed.records.is_empty());
        assert!(parsed.refused);
    }

    #[test]
    fn test_curly_apostrophe_refusal() {
        let parsed = parser().parse("I can\u{2019}t provide medical advice.", &none(), 0);
        assert!(parsed.refused);
    }

    #[test]
    fn test_duplicate_labels_keep_first() {
        let reply = "Indication 1:\nINDICATION: Hypertension\nCONFIDENCE: 0.9\n\n\
                     Indication 2:\nINDICATION: hypertension\nCONFIDENCE: 0.4\n";
        let parsed = parser().parse(reply, &none(), 0);

        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].confidence.value(), 0.9);
        assert_eq!(parsed.dropped, 1);
    }

    #[test]
    fn test_citation_filtering() {
        let available: BTreeSet<String> =
            ["12345678", "87654321"].iter().map(|s| s.to_string()).collect();
        let reply = "Indication 1:\nINDICATION: Pain\nCONFIDENCE: 0.7\nPMIDS: 12345678, 99999999, 1234";
        let parsed = parser().parse(reply, &available, 0);

        assert_eq!(parsed.records[0].citations, vec!["12345678".to_string()]);
    }

    #[test]
    fn test_structured_but_missing_label() {
        let reply = "Indication 1:\nCONFIDENCE: 0.8\nEVIDENCE: YES\nREASONING: Something.";
        let parsed = parser().parse(reply, &none(), 0);
        assert!(parsed.records.is_empty());
        assert_eq!(parsed.dropped, 1);
    }

    #[test]
    fn test_zero_and_unparsable_confidence_dropped() {
        let reply = "Indication 1:\nINDICATION: A\nCONFIDENCE: 0\n\
                     Indication 2:\nINDICATION: B\nCONFIDENCE: unknown\n\
                     Indication 3:\nINDICATION: C\nCONFIDENCE: 0.3\n";
        let parsed = parser().parse(reply, &none(), 0);
        let labels: Vec<_> = parsed.records.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["C"]);
    }

    #[test]
    fn test_numbered_fallback() {
        let reply = "Here are the indications:\n\
                     1. INDICATION: Angina\n   CONFIDENCE: 0.7\n\
                     2. INDICATION: Migraine prophylaxis\n   CONFIDENCE: 0.5\n   EVIDENCE: no";
        let parsed = parser().parse(reply, &none(), 0);

        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.records[1].label, "Migraine prophylaxis");
        assert!(!parsed.records[1].evidence);
    }

    #[test]
    fn test_unmarked_single_block() {
        let reply = "INDICATION: Gout\nCONFIDENCE: 0.65";
        let parsed = parser().parse(reply, &none(), 0);
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].label, "Gout");
    }

    #[test]
    fn test_formatting_tolerance() {
        let reply = "## Indication #1\n**Indication:** Atrial fibrillation\n- confidence = 0.75\n* Evidence: True\nSupporting PMIDs: PMID:12345678";
        let available: BTreeSet<String> = ["12345678".to_string()].into_iter().collect();
        let parsed = parser().parse(reply, &available, 0);

        assert_eq!(parsed.records.len(), 1);
        let r = &parsed.records[0];
        assert_eq!(r.label, "Atrial fibrillation");
        assert_eq!(r.confidence.value(), 0.75);
        assert!(r.evidence);
        assert_eq!(r.citations, vec!["12345678".to_string()]);
    }

    #[test]
    fn test_multiline_rationale() {
        let reply = "Indication 1:\nINDICATION: Asthma\nCONFIDENCE: 0.9\nREASONING: Relaxes airway\nsmooth muscle.\n";
        let parsed = parser().parse(reply, &none(), 0);
        assert_eq!(parsed.records[0].rationale, "Relaxes airway smooth muscle.");
    }

    #[test]
    fn test_parse_confidence_edge_cases() {
        assert_eq!(parse_confidence(""), 0.0);
        assert_eq!(parse_confidence("-0.5"), 0.0);
        assert_eq!(parse_confidence("0.85 (high)"), 0.85);
        assert_eq!(parse_confidence("**0.9**"), 0.9);
        assert_eq!(parse_confidence("NaN"), 0.0);
        assert_eq!(parse_confidence("1e9"), 1.0);
    }

    #[test]
    fn test_parse_confidence_trailing_punctuation() {
        assert_eq!(parse_confidence("0.85."), 0.85);
        assert_eq!(parse_confidence("0.9,"), 0.9);
        assert_eq!(parse_confidence("1."), 1.0);
        assert_eq!(parse_confidence(".5"), 0.5);
        assert_eq!(parse_confidence("80%."), 0.8);
    }

    #[test]
    fn test_sentence_final_confidence_keeps_record() {
        let reply = "Indication 1:\nINDICATION: Hypertension\nCONFIDENCE: 0.85.\nEVIDENCE: YES";
        let parsed = parser().parse(reply, &none(), 0);

        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.dropped, 0);
        assert_eq!(parsed.records[0].confidence.value(), 0.85);
    }

    #[test]
    fn test_heading_detection() {
        assert!(is_record_heading("Indication 1:"));
        assert!(is_record_heading("**Indication 2**"));
        assert!(is_record_heading("### Indication #3"));
        assert!(!is_record_heading("INDICATION: Hypertension"));
        assert!(!is_record_heading("Indications include"));
    }

    #[test]
    fn test_split_field() {
        assert_eq!(
            split_field("  **CONFIDENCE:** 0.8"),
            Some(("CONFIDENCE".to_string(), "0.8".to_string()))
        );
        assert_eq!(
            split_field("supporting-pmids: 1, 2"),
            Some(("SUPPORTING_PMIDS".to_string(), "1, 2".to_string()))
        );
        assert_eq!(split_field("Note that this is: a sentence, not a field."), None);
        assert_eq!(split_field("no separator here"), None);
    }
}
