pub mod types;
pub mod config;
pub mod traits;
pub mod fetcher;
pub mod parser;
pub mod extract;
pub mod article;
pub mod aggregator;
pub mod llm_adapter;
pub mod summarizer;
pub mod digest;
pub mod delivery;
pub mod pipeline;
pub mod utils;

pub use types::*;
pub use config::{DigestConfig, FeedCatalog, FeedCategory, FeedSource, LlmSettings, SecretPolicy};
pub use traits::{ArticleFetch, FeedFetch};
pub use fetcher::Fetcher;
pub use parser::FeedParser;
pub use article::ArticleFetcher;
pub use aggregator::NewsAggregator;
pub use llm_adapter::{LlmAdapter, MockLlmAdapter, OpenAiCompatibleAdapter};
pub use summarizer::{Summarizer, SummaryOutcome};
pub use delivery::{chunk_text, DeliveryOutcome, DeliveryReport, FeishuNotifier, Notifier, ServerChanNotifier};
pub use pipeline::{DigestPipeline, RunSummary};
