use crate::types::{ArticleResult, ParsedFeed};
use async_trait::async_trait;

/// Retrieves a syndication feed, retrying internally.
#[async_trait]
pub trait FeedFetch: Send + Sync {
    /// `None` means the source is unavailable for this run: every attempt
    /// errored or produced no entries.
    async fn fetch_with_retry(&self, url: &str) -> Option<ParsedFeed>;
}

/// Downloads one article and extracts its body text.
#[async_trait]
pub trait ArticleFetch: Send + Sync {
    /// Never fails: problems are reported through `ArticleResult::error`.
    async fn fetch_article(&self, url: &str) -> ArticleResult;
}
