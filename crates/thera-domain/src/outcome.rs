//! Zero-record outcome classification

use std::fmt;

/// Why a parsing defect was declared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefectKind {
    /// The reply was empty or missing
    NoResponse,
    /// The reply followed the schema but nothing parsed
    StructureUnparsed,
}

/// Diagnostic verdict for a reply that produced zero records
///
/// Advisory only: it never changes control flow, it tells operators whether
/// an empty result is a true negative or a bug.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The model reported that nothing relevant exists
    LegitimateNegative,
    /// The model declined to answer for policy reasons
    SafetyRefusal,
    /// Relevant vocabulary without the expected structure
    InformalMention,
    /// The parser or the prompt is at fault
    ParsingDefect(DefectKind),
    /// Needs manual inspection
    Unclear,
}

impl Outcome {
    /// Stable identifier used in persisted diagnostics and summaries
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::LegitimateNegative => "legitimate_negative",
            Outcome::SafetyRefusal => "safety_refusal",
            Outcome::InformalMention => "informal_mention",
            Outcome::ParsingDefect(DefectKind::NoResponse) => "parsing_defect_no_response",
            Outcome::ParsingDefect(DefectKind::StructureUnparsed) => "parsing_defect",
            Outcome::Unclear => "unclear",
        }
    }

    /// Parse an identifier produced by [`Outcome::as_str`]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "legitimate_negative" => Some(Outcome::LegitimateNegative),
            "safety_refusal" => Some(Outcome::SafetyRefusal),
            "informal_mention" => Some(Outcome::InformalMention),
            "parsing_defect_no_response" => Some(Outcome::ParsingDefect(DefectKind::NoResponse)),
            "parsing_defect" => Some(Outcome::ParsingDefect(DefectKind::StructureUnparsed)),
            "unclear" => Some(Outcome::Unclear),
            _ => None,
        }
    }

    /// Outcomes that point at a bug rather than the data
    pub fn is_defect(&self) -> bool {
        matches!(self, Outcome::ParsingDefect(_))
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
