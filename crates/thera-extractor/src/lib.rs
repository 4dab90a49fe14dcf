//! Thera Extractor
//!
//! Turns one work item into one result set by querying a text-generation
//! model and parsing its semi-structured reply.
//!
//! # Architecture
//!
//! ```text
//! WorkItem → PromptBuilder → LlmProvider → ReplyParser → ResultSet
//!                                              ↓ (zero records)
//!                                       OutcomeClassifier
//! ```
//!
//! # Key Features
//!
//! - **Tolerant parsing**: blocks split by `Indication N:` headings, falling
//!   back to numbered items; fields matched by line prefix with aliases
//! - **Fail-closed records**: candidates without a label or with zero
//!   confidence are dropped, duplicates by normalized label keep the first
//! - **Citation filtering**: only well-formed ids present in the evidence survive
//! - **Zero-record diagnosis**: refusals, genuine negatives and parser defects
//!   are told apart for operators
//!
//! # Example Usage
//!
//! ```no_run
//! use thera_domain::WorkItem;
//! use thera_extractor::{Extractor, ExtractorConfig};
//! use thera_llm::MockProvider;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = MockProvider::new("Indication 1:\nINDICATION: Hypertension\nCONFIDENCE: 0.85");
//! let extractor = Extractor::new(llm, ExtractorConfig::default());
//!
//! let item = WorkItem::with_description("lisinopril", "An ACE inhibitor.");
//! let result = extractor.extract(&item).await?;
//!
//! println!("Found: {} records", result.records.len());
//! println!("Confirmed: {}", result.confirmed_count);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod classifier;
mod config;
mod error;
mod extractor;
mod parser;
mod prompt;
mod types;

#[cfg(test)]
mod tests;

pub use classifier::OutcomeClassifier;
pub use config::ExtractorConfig;
pub use error::ExtractorError;
pub use extractor::Extractor;
pub use parser::{extract_citations, parse_confidence, ReplyParser};
pub use prompt::{PromptBuilder, RenderedPrompt};
pub use types::ParsedReply;
