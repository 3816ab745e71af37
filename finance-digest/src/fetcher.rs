use crate::parser::FeedParser;
use crate::traits::FeedFetch;
use crate::types::{DigestError, FetchConfig, ParsedFeed, Result};
use async_trait::async_trait;
use backoff::backoff::{Backoff, Constant};
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Feed retrieval with a fixed-delay retry policy.
pub struct Fetcher {
    client: Client,
    config: FetchConfig,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()?;

        Ok(Self { client, config })
    }

    /// Try the feed up to `feed_max_retries` times, sleeping
    /// `feed_retry_delay_seconds` between attempts whatever the failure was.
    /// An attempt only succeeds when the feed parses and has at least one entry.
    pub async fn fetch_feed(&self, url: &str) -> Option<ParsedFeed> {
        let attempts = self.config.feed_max_retries.max(1);
        let mut backoff = Constant::new(Duration::from_secs(self.config.feed_retry_delay_seconds));

        for attempt in 1..=attempts {
            match self.fetch_once(url).await {
                Ok(feed) if !feed.entries.is_empty() => {
                    return Some(feed);
                }
                Ok(_) => {
                    warn!("Attempt {} for {} returned no entries", attempt, url);
                }
                Err(e) => {
                    warn!("Attempt {} for {} failed: {}", attempt, url, e);
                }
            }

            if attempt < attempts {
                if let Some(delay) = backoff.next_backoff() {
                    debug!("Retrying {} in {:?}", url, delay);
                    tokio::time::sleep(delay).await;
                }
            }
        }

        error!("Skipping {} after {} attempts", url, attempts);
        None
    }

    async fn fetch_once(&self, url: &str) -> Result<ParsedFeed> {
        let start_time = Instant::now();
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(DigestError::General(format!(
                "HTTP {}: {}",
                status,
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        let content = response.bytes().await?;
        debug!(
            "Fetched feed {} ({} bytes in {} ms)",
            url,
            content.len(),
            start_time.elapsed().as_millis()
        );

        FeedParser::parse_feed(&content)
    }
}

#[async_trait]
impl FeedFetch for Fetcher {
    async fn fetch_with_retry(&self, url: &str) -> Option<ParsedFeed> {
        let feed = self.fetch_feed(url).await;
        if let Some(ref feed) = feed {
            info!("Fetched {} with {} entries", url, feed.entries.len());
        }
        feed
    }
}
