//! LLM prompt engineering for indication extraction

use std::collections::BTreeSet;
use thera_domain::{Excerpt, WorkContext, WorkItem};

/// A rendered prompt and the citation ids it actually shows the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPrompt {
    /// Prompt text
    pub text: String,
    /// Ids of the excerpts that made it into `text`
    pub citations: BTreeSet<String>,
}

/// Builds the extraction prompt for one work item
pub struct PromptBuilder<'a> {
    item: &'a WorkItem,
    max_excerpts: usize,
    max_context_chars: usize,
}

impl<'a> PromptBuilder<'a> {
    /// Create a new prompt builder with default context limits
    pub fn new(item: &'a WorkItem) -> Self {
        Self {
            item,
            max_excerpts: 50,
            max_context_chars: 60_000,
        }
    }

    /// Cap the number of excerpts rendered
    pub fn with_max_excerpts(mut self, max: usize) -> Self {
        self.max_excerpts = max;
        self
    }

    /// Cap the characters of context rendered
    pub fn with_max_context_chars(mut self, max: usize) -> Self {
        self.max_context_chars = max;
        self
    }

    /// Build the complete extraction prompt
    pub fn build(&self) -> String {
        self.render().text
    }

    /// Build the prompt and report which citation ids survived the limits
    ///
    /// Replies may only cite these ids; anything else was never shown.
    pub fn render(&self) -> RenderedPrompt {
        let mut prompt = String::new();
        let mut citations = BTreeSet::new();

        prompt.push_str(EXTRACTION_INSTRUCTIONS);
        prompt.push_str("\n\n");
        prompt.push_str(&format!("Drug: {}\n\n", self.item.id));

        match &self.item.context {
            WorkContext::Description(text) => {
                prompt.push_str("Description:\n---\n");
                prompt.push_str(truncate_chars(text, self.max_context_chars));
                prompt.push_str("\n---\n\n");
            }
            WorkContext::Excerpts(excerpts) => {
                prompt.push_str("Evidence excerpts:\n---\n");
                prompt.push_str(&self.render_excerpts(excerpts, &mut citations));
                prompt.push_str("---\n\n");
            }
        }

        prompt.push_str(OUTPUT_FORMAT_REMINDER);
        RenderedPrompt {
            text: prompt,
            citations,
        }
    }

    /// Render whole excerpts until either limit is reached
    ///
    /// An oversized first excerpt is cut to fit rather than leaving the
    /// prompt without evidence.
    fn render_excerpts(&self, excerpts: &[Excerpt], citations: &mut BTreeSet<String>) -> String {
        let mut rendered = String::new();
        let mut used = 0;

        for excerpt in excerpts.iter().take(self.max_excerpts) {
            let header = format!("PMID: {}\n", excerpt.citation_id);
            let text = excerpt.text.trim();
            let len = header.chars().count() + text.chars().count() + 2;

            if used + len > self.max_context_chars {
                let room = self
                    .max_context_chars
                    .saturating_sub(header.chars().count() + 2);
                if rendered.is_empty() && room > 0 {
                    rendered.push_str(&header);
                    rendered.push_str(truncate_chars(text, room));
                    rendered.push_str("\n\n");
                    citations.insert(excerpt.citation_id.clone());
                }
                break;
            }

            used += len;
            rendered.push_str(&header);
            rendered.push_str(text);
            rendered.push_str("\n\n");
            citations.insert(excerpt.citation_id.clone());
        }

        rendered
    }
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

const EXTRACTION_INSTRUCTIONS: &str = r#"You are reviewing published evidence about a drug.
List every therapeutic indication (a disease or condition the drug is used to treat or prevent)
that the evidence below supports.

Rules:
- One indication per entry
- Use the standard clinical name of the condition
- CONFIDENCE is a number between 0.0 and 1.0
- EVIDENCE is YES only when an excerpt explicitly states the drug treats the condition
- PMIDS lists only ids that appear in the evidence below, comma separated
- If the evidence supports no indications, reply exactly: No indications found"#;

const OUTPUT_FORMAT_REMINDER: &str = r#"Reply using exactly this format, one block per indication:

Indication 1:
INDICATION: <condition name>
CONFIDENCE: <0.0-1.0>
EVIDENCE: <YES or NO>
PMIDS: <comma separated ids>
REASONING: <one or two sentences>

Indication 2:
..."#;

#[cfg(test)]
mod tests {
    use super::*;

    fn excerpt(id: &str, text: &str) -> Excerpt {
        Excerpt {
            citation_id: id.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_prompt_includes_drug_and_schema() {
        let item = WorkItem::with_description("lisinopril", "An ACE inhibitor.");
        let prompt = PromptBuilder::new(&item).build();

        assert!(prompt.contains("Drug: lisinopril"));
        assert!(prompt.contains("An ACE inhibitor."));
        assert!(prompt.contains("Indication 1:"));
        assert!(prompt.contains("CONFIDENCE:"));
        assert!(prompt.contains("PMIDS:"));
    }

    #[test]
    fn test_prompt_lists_excerpts_with_ids() {
        let item = WorkItem::with_excerpts(
            "aspirin",
            vec![
                excerpt("12345678", "Aspirin reduces fever."),
                excerpt("87654321", "Aspirin prevents stroke."),
            ],
        );
        let prompt = PromptBuilder::new(&item).build();

        assert!(prompt.contains("PMID: 12345678\nAspirin reduces fever."));
        assert!(prompt.contains("PMID: 87654321"));
    }

    #[test]
    fn test_limits_excerpt_count() {
        let excerpts = (0..30)
            .map(|i| excerpt(&format!("{:08}", i), "text"))
            .collect();
        let item = WorkItem::with_excerpts("x", excerpts);
        let prompt = PromptBuilder::new(&item).with_max_excerpts(20).build();

        assert!(prompt.contains("PMID: 00000019"));
        assert!(!prompt.contains("PMID: 00000020"));
    }

    #[test]
    fn test_limits_context_chars() {
        let excerpts = vec![excerpt("11111111", &"a".repeat(50)), excerpt("22222222", &"b".repeat(50))];
        let item = WorkItem::with_excerpts("x", excerpts);
        let prompt = PromptBuilder::new(&item).with_max_context_chars(80).build();

        assert!(prompt.contains("PMID: 11111111"));
        assert!(!prompt.contains("PMID: 22222222"));
    }

    #[test]
    fn test_rendered_citations_follow_limits() {
        let excerpts = vec![excerpt("11111111", "first"), excerpt("22222222", "second")];
        let item = WorkItem::with_excerpts("x", excerpts);
        let rendered = PromptBuilder::new(&item).with_max_excerpts(1).render();

        assert!(!rendered.text.contains("22222222"));
        let ids: Vec<_> = rendered.citations.iter().map(String::as_str).collect();
        assert_eq!(ids, vec!["11111111"]);
    }

    #[test]
    fn test_oversized_first_excerpt_is_truncated() {
        let item = WorkItem::with_excerpts("x", vec![excerpt("11111111", &"a".repeat(500))]);
        let rendered = PromptBuilder::new(&item).with_max_context_chars(100).render();

        assert!(rendered.text.contains("PMID: 11111111\naaaa"));
        assert!(!rendered.text.contains(&"a".repeat(100)));
        assert!(rendered.citations.contains("11111111"));
    }

    #[test]
    fn test_description_has_no_citations() {
        let item = WorkItem::with_description("x", "text");
        assert!(PromptBuilder::new(&item).render().citations.is_empty());
    }

    #[test]
    fn test_description_truncated_on_char_boundary() {
        let item = WorkItem::with_description("x", "ééééé");
        let prompt = PromptBuilder::new(&item).with_max_context_chars(3).build();
        assert!(prompt.contains("---\nééé\n---"));
    }
}
