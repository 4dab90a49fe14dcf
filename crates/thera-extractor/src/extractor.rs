//! Core Extractor implementation

use crate::classifier::OutcomeClassifier;
use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::parser::ReplyParser;
use crate::prompt::PromptBuilder;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;
use thera_domain::traits::LlmProvider;
use thera_domain::{unix_now, Outcome, ResultSet, RunId, WorkItem};
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// The Extractor turns one work item into one result set
///
/// It owns the prompt, the parse and the zero-record diagnosis. Persistence
/// and skip-if-done are left to the caller.
pub struct Extractor<L>
where
    L: LlmProvider,
{
    llm_provider: Arc<L>,
    config: ExtractorConfig,
    parser: ReplyParser,
    classifier: OutcomeClassifier,
    run_id: RunId,
}

impl<L> Extractor<L>
where
    L: LlmProvider + Send + Sync,
    L::Error: std::fmt::Display,
{
    /// Create a new Extractor
    pub fn new(llm_provider: L, config: ExtractorConfig) -> Self {
        Self::from_shared(Arc::new(llm_provider), config)
    }

    /// Create an Extractor around a provider shared with other components
    pub fn from_shared(llm_provider: Arc<L>, config: ExtractorConfig) -> Self {
        let parser = ReplyParser::new(&config);
        let classifier = OutcomeClassifier::new(&config);
        Self {
            llm_provider,
            config,
            parser,
            classifier,
            run_id: RunId::new(),
        }
    }

    /// Stamp result sets with an existing run id
    pub fn with_run_id(mut self, run_id: RunId) -> Self {
        self.run_id = run_id;
        self
    }

    /// The underlying provider
    pub fn provider(&self) -> &Arc<L> {
        &self.llm_provider
    }

    /// Active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Run id stamped on every result set
    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Probe the provider
    pub async fn health_check(&self) -> Result<(), ExtractorError> {
        self.llm_provider
            .health_check()
            .await
            .map_err(|e| ExtractorError::Llm(e.to_string()))
    }

    /// Query the model for `item` and build its result set
    ///
    /// A reply that yields no records is not an error: the result set carries
    /// the raw reply and an [`Outcome`] instead.
    pub async fn extract(&self, item: &WorkItem) -> Result<ResultSet, ExtractorError> {
        if item.id.trim().is_empty() {
            return Err(ExtractorError::InvalidInput("work item id is empty".to_string()));
        }

        let started = Instant::now();
        let prompt = PromptBuilder::new(item)
            .with_max_excerpts(self.config.max_excerpts)
            .with_max_context_chars(self.config.max_context_chars)
            .render();

        debug!(
            item = %item.id,
            prompt_chars = prompt.text.len(),
            citations = prompt.citations.len(),
            "Built prompt"
        );

        let reply = timeout(self.config.extraction_timeout(), self.llm_provider.generate(&prompt.text))
            .await
            .map_err(|_| ExtractorError::Timeout(self.config.extraction_timeout_secs))?
            .map_err(|e| ExtractorError::Llm(e.to_string()))?;

        debug!(item = %item.id, reply_chars = reply.len(), "Received reply");

        let elapsed_ms = started.elapsed().as_millis() as u64;
        Ok(self.assemble(item, reply, &prompt.citations, elapsed_ms))
    }

    /// Parse `reply` and, if it holds no records, diagnose it
    ///
    /// Only ids in `shown_citations` survive citation filtering.
    pub fn assemble(
        &self,
        item: &WorkItem,
        reply: String,
        shown_citations: &BTreeSet<String>,
        processing_time_ms: u64,
    ) -> ResultSet {
        let parsed = self.parser.parse(&reply, shown_citations, unix_now());

        if parsed.dropped > 0 {
            warn!(item = %item.id, dropped = parsed.dropped, "Discarded malformed or duplicate candidates");
        }

        let outcome = if !parsed.records.is_empty() {
            None
        } else if parsed.refused {
            Some(Outcome::SafetyRefusal)
        } else {
            Some(self.classifier.classify(&reply))
        };

        let mut result = ResultSet::new(
            item.id.clone(),
            parsed.records,
            self.config.confidence_threshold,
            self.run_id,
        )
        .with_raw_reply(reply)
        .with_model_name(self.llm_provider.model_name())
        .with_processing_time_ms(processing_time_ms);

        match outcome {
            Some(outcome) => {
                info!(item = %item.id, outcome = %outcome, "No records extracted");
                result = result.with_outcome(outcome);
            }
            None => {
                info!(
                    item = %item.id,
                    found = result.records.len(),
                    confirmed = result.confirmed_count,
                    "Extracted records"
                );
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thera_domain::{DefectKind, Excerpt};
    use thera_llm::MockProvider;

    const WELL_FORMED: &str = "Indication 1:\nINDICATION: Hypertension\nCONFIDENCE: 0.85\nEVIDENCE: YES\nPMIDS: 12345678\nREASONING: Lowers blood pressure.";

    fn item() -> WorkItem {
        WorkItem::with_excerpts(
            "lisinopril",
            vec![Excerpt {
                citation_id: "12345678".to_string(),
                text: "Lisinopril lowers blood pressure.".to_string(),
            }],
        )
    }

    #[tokio::test]
    async fn test_extract_records() {
        let extractor = Extractor::new(MockProvider::new(WELL_FORMED), ExtractorConfig::default());

        let result = extractor.extract(&item()).await.unwrap();
        assert_eq!(result.work_item_id, "lisinopril");
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].citations, vec!["12345678".to_string()]);
        assert_eq!(result.confirmed_count, 1);
        assert_eq!(result.model_name, "mock-model");
        assert!(result.outcome.is_none());
        assert_eq!(result.run_id, extractor.run_id());
    }

    #[tokio::test]
    async fn test_citations_limited_to_rendered_excerpts() {
        let item = WorkItem::with_excerpts(
            "lisinopril",
            vec![
                Excerpt {
                    citation_id: "11111111".to_string(),
                    text: "Lowers blood pressure.".to_string(),
                },
                Excerpt {
                    citation_id: "22222222".to_string(),
                    text: "Reduces proteinuria.".to_string(),
                },
            ],
        );
        let reply = "Indication 1:\nINDICATION: Hypertension\nCONFIDENCE: 0.8\nPMIDS: 11111111, 22222222";
        let config = ExtractorConfig {
            max_excerpts: 1,
            ..ExtractorConfig::default()
        };
        let extractor = Extractor::new(MockProvider::new(reply), config);

        let result = extractor.extract(&item).await.unwrap();
        assert_eq!(result.records[0].citations, vec!["11111111".to_string()]);
    }

    #[tokio::test]
    async fn test_refusal_outcome() {
        let extractor = Extractor::new(
            MockProvider::new("I can't provide medical advice about this."),
            ExtractorConfig::default(),
        );

        let result = extractor.extract(&item()).await.unwrap();
        assert!(result.is_empty());
        assert_eq!(result.outcome, Some(Outcome::SafetyRefusal));
        assert!(result.raw_reply.contains("medical advice"));
    }

    #[tokio::test]
    async fn test_empty_reply_is_defect() {
        let extractor = Extractor::new(MockProvider::new(""), ExtractorConfig::default());

        let result = extractor.extract(&item()).await.unwrap();
        assert_eq!(result.outcome, Some(Outcome::ParsingDefect(DefectKind::NoResponse)));
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let provider = MockProvider::default();
        provider.push_error("connection reset");
        let extractor = Extractor::new(provider, ExtractorConfig::default());

        let result = extractor.extract(&item()).await;
        assert!(matches!(result, Err(ExtractorError::Llm(_))));
    }

    #[tokio::test]
    async fn test_empty_id_rejected() {
        let extractor = Extractor::new(MockProvider::default(), ExtractorConfig::default());
        let result = extractor.extract(&WorkItem::with_description(" ", "text")).await;
        assert!(matches!(result, Err(ExtractorError::InvalidInput(_))));
        assert_eq!(extractor.provider().call_count(), 0);
    }

    #[tokio::test]
    async fn test_health_check() {
        let provider = MockProvider::default();
        let handle = provider.clone();
        let extractor = Extractor::new(provider, ExtractorConfig::default());

        assert!(extractor.health_check().await.is_ok());
        handle.set_healthy(false);
        assert!(extractor.health_check().await.is_err());
    }
}
