//! Integration tests for the Extractor

#[cfg(test)]
mod tests {
    use crate::{parse_confidence, Extractor, ExtractorConfig, ExtractorError, ReplyParser};
    use proptest::prelude::*;
    use std::collections::BTreeSet;
    use std::time::Duration;
    use thera_domain::{DefectKind, Excerpt, Outcome, WorkItem};
    use thera_llm::{MockProvider, RetryPolicy, RetryingProvider};

    const TWO_RECORDS: &str = "Indication 1:
INDICATION: Hypertension
CONFIDENCE: 0.85
EVIDENCE: YES
PMIDS: 12345678, 99999999
REASONING: Lowers blood pressure.

Indication 2:
INDICATION: Heart failure
CONFIDENCE: 0.4
EVIDENCE: NO
PMIDS: 87654321
REASONING: Mentioned as adjunct therapy.";

    fn work_item() -> WorkItem {
        WorkItem::with_excerpts(
            "lisinopril",
            vec![
                Excerpt {
                    citation_id: "12345678".to_string(),
                    text: "Lisinopril is indicated for hypertension.".to_string(),
                },
                Excerpt {
                    citation_id: "87654321".to_string(),
                    text: "Used alongside diuretics in heart failure.".to_string(),
                },
            ],
        )
    }

    fn fast_policy() -> RetryPolicy {
        RetryPolicy::new(3, Duration::from_millis(1), 10)
    }

    #[tokio::test]
    async fn test_full_extraction_flow() {
        let extractor = Extractor::new(MockProvider::new(TWO_RECORDS), ExtractorConfig::default());

        let result = extractor.extract(&work_item()).await.unwrap();

        assert_eq!(result.records.len(), 2);
        assert_eq!(result.confirmed_count, 1);
        assert_eq!(result.records[0].citations, vec!["12345678".to_string()]);
        assert_eq!(result.records[1].label, "Heart failure");
        assert!(!result.records[1].evidence);
        assert_eq!(result.confidence_threshold, 0.6);
    }

    #[tokio::test]
    async fn test_threshold_from_config() {
        let extractor = Extractor::new(MockProvider::new(TWO_RECORDS), ExtractorConfig::lenient());

        let result = extractor.extract(&work_item()).await.unwrap();
        assert_eq!(result.confirmed_count, 2);
    }

    #[tokio::test]
    async fn test_extraction_through_retrying_provider() {
        let mock = MockProvider::default();
        mock.push_error("connection reset");
        mock.push_reply("ok");
        mock.push_reply(TWO_RECORDS);
        let handle = mock.clone();

        let provider = RetryingProvider::new(mock, fast_policy());
        let extractor = Extractor::new(provider, ExtractorConfig::default());

        let result = extractor.extract(&work_item()).await.unwrap();
        assert_eq!(result.records.len(), 2);
        assert_eq!(handle.call_count(), 3);
    }

    #[tokio::test]
    async fn test_exhausted_retries_surface_as_llm_error() {
        let mock = MockProvider::default();
        for _ in 0..3 {
            mock.push_error("connection reset");
        }

        let provider = RetryingProvider::new(mock, fast_policy());
        let extractor = Extractor::new(provider, ExtractorConfig::default());

        let err = extractor.extract(&work_item()).await.unwrap_err();
        assert!(matches!(err, ExtractorError::Llm(_)));
        assert!(err.to_string().contains("3 attempts"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_extraction_deadline() {
        let mock = MockProvider::default();
        for _ in 0..3 {
            mock.push_error("connection reset");
        }
        let provider = RetryingProvider::new(mock, RetryPolicy::new(3, Duration::from_secs(60), 10));
        let config = ExtractorConfig {
            extraction_timeout_secs: 30,
            ..Default::default()
        };
        let extractor = Extractor::new(provider, config);

        let err = extractor.extract(&work_item()).await.unwrap_err();
        assert!(matches!(err, ExtractorError::Timeout(30)));
    }

    #[tokio::test]
    async fn test_structured_but_unparsed_reply() {
        let reply = "Indication 1:\nCONFIDENCE: 0.9\nEVIDENCE: YES\nREASONING: missing label";
        let extractor = Extractor::new(MockProvider::new(reply), ExtractorConfig::default());

        let result = extractor.extract(&work_item()).await.unwrap();
        assert!(result.is_empty());
        assert_eq!(
            result.outcome,
            Some(Outcome::ParsingDefect(DefectKind::StructureUnparsed))
        );
        assert_eq!(result.raw_reply, reply);
    }

    #[test]
    fn test_blocking_extraction() {
        let extractor = Extractor::new(
            MockProvider::new("No indications found in the provided abstracts."),
            ExtractorConfig::default(),
        );

        let result = tokio_test::block_on(extractor.extract(&work_item())).unwrap();
        assert_eq!(result.outcome, Some(Outcome::LegitimateNegative));
    }

    proptest! {
        #[test]
        fn prop_parse_is_idempotent(reply in "[A-Za-z0-9:,.%\\n ]{0,200}") {
            let parser = ReplyParser::new(&ExtractorConfig::default());
            let available: BTreeSet<String> = ["12345678".to_string()].into_iter().collect();

            let first = parser.parse(&reply, &available, 7);
            let second = parser.parse(&reply, &available, 7);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_confidence_always_clamped(token in "\\PC{0,12}") {
            let value = parse_confidence(&token);
            prop_assert!((0.0..=1.0).contains(&value));
        }

        #[test]
        fn prop_numeric_confidence_clamped(x in proptest::num::f64::ANY) {
            let value = parse_confidence(&x.to_string());
            prop_assert!((0.0..=1.0).contains(&value));
        }
    }
}
