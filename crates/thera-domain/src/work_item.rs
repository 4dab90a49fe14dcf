//! Work items - the unit of extraction work

use std::collections::BTreeSet;

/// One excerpt of source evidence with its citation id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Excerpt {
    /// Citation identifier (e.g. a PubMed id)
    pub citation_id: String,
    /// Excerpt body
    pub text: String,
}

/// Free-text context supplied to the model for a work item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkContext {
    /// A static description with no citable sources
    Description(String),
    /// Document excerpts, each carrying a citation id
    Excerpts(Vec<Excerpt>),
}

impl WorkContext {
    /// True when there is nothing to show the model
    pub fn is_empty(&self) -> bool {
        match self {
            WorkContext::Description(text) => text.trim().is_empty(),
            WorkContext::Excerpts(excerpts) => excerpts.is_empty(),
        }
    }
}

/// A single unit of extraction work, keyed by a unique name
///
/// Work items are created once from the catalog and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    /// Unique key (e.g. the drug name)
    pub id: String,
    /// Supporting context
    pub context: WorkContext,
}

impl WorkItem {
    /// Create a work item backed by a plain description
    pub fn with_description(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            context: WorkContext::Description(description.into()),
        }
    }

    /// Create a work item backed by citable excerpts
    pub fn with_excerpts(id: impl Into<String>, excerpts: Vec<Excerpt>) -> Self {
        Self {
            id: id.into(),
            context: WorkContext::Excerpts(excerpts),
        }
    }

    /// Citation ids the model is allowed to reference for this item
    ///
    /// # Examples
    ///
    /// ```
    /// use thera_domain::{Excerpt, WorkItem};
    ///
    /// let item = WorkItem::with_excerpts("aspirin", vec![
    ///     Excerpt { citation_id: "12345678".into(), text: "...".into() },
    /// ]);
    /// assert!(item.available_citations().contains("12345678"));
    /// ```
    pub fn available_citations(&self) -> BTreeSet<String> {
        match &self.context {
            WorkContext::Description(_) => BTreeSet::new(),
            WorkContext::Excerpts(excerpts) => excerpts
                .iter()
                .map(|e| e.citation_id.clone())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_description_has_no_citations() {
        let item = WorkItem::with_description("metformin", "An oral antidiabetic.");
        assert!(item.available_citations().is_empty());
        assert!(!item.context.is_empty());
    }

    #[test]
    fn test_excerpt_citations_are_deduplicated() {
        let item = WorkItem::with_excerpts(
            "aspirin",
            vec![
                Excerpt { citation_id: "11111111".into(), text: "a".into() },
                Excerpt { citation_id: "11111111".into(), text: "b".into() },
                Excerpt { citation_id: "22222222".into(), text: "c".into() },
            ],
        );
        let ids: Vec<_> = item.available_citations().into_iter().collect();
        assert_eq!(ids, vec!["11111111", "22222222"]);
    }

    #[test]
    fn test_blank_context_is_empty() {
        assert!(WorkContext::Description("   ".into()).is_empty());
        assert!(WorkContext::Excerpts(vec![]).is_empty());
    }
}
