use crate::extract::{truncate_chars, ArticleExtractor};
use crate::traits::ArticleFetch;
use crate::types::{ArticleError, ArticleResult, FetchConfig, Result};
use async_trait::async_trait;
use backoff::backoff::{Backoff, Constant};
use reqwest::header::{ACCEPT_LANGUAGE, REFERER};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, error, info, warn};
use url::Url;

/// Downloads article pages and turns them into plain text for the summarizer.
///
/// Retry policy: transport errors are retried with a fixed delay; a timeout,
/// a non-200 status or an undecodable body ends the fetch immediately.
pub struct ArticleFetcher {
    client: Client,
    config: FetchConfig,
    extractor: ArticleExtractor,
}

enum AttemptError {
    Status(StatusCode),
    /// The response arrived but its body could not be decoded.
    Body(reqwest::Error),
    Transport(reqwest::Error),
}

impl ArticleFetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()?;

        Ok(Self {
            client,
            config,
            extractor: ArticleExtractor::new()?,
        })
    }

    pub async fn fetch(&self, url: &str) -> ArticleResult {
        let referer = referer_for(url);
        let attempts = self.config.max_retries.max(1);
        let mut backoff = Constant::new(Duration::from_secs(self.config.retry_delay_seconds));
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            info!("Fetching article {} (attempt {})", url, attempt);

            match self.download(url, &referer).await {
                Ok(html) => return self.build_result(url, &html),
                Err(AttemptError::Status(status)) => {
                    error!("Non-200 status {} for {}", status.as_u16(), url);
                    return ArticleResult::failed(ArticleError::HttpStatus(status.as_u16()));
                }
                Err(AttemptError::Body(e)) => {
                    let detail = e.without_url().to_string();
                    error!("Failed to decode article body of {}: {}", url, detail);
                    return ArticleResult::failed(ArticleError::ParseError(detail));
                }
                Err(AttemptError::Transport(e)) if e.is_timeout() => {
                    error!("Timed out after {}s fetching {}", self.config.timeout_seconds, url);
                    return ArticleResult::failed(ArticleError::Timeout);
                }
                Err(AttemptError::Transport(e)) if e.is_builder() => {
                    error!("Could not build request for {}: {}", url, e);
                    return ArticleResult::failed(ArticleError::UnknownError(e.to_string()));
                }
                Err(AttemptError::Transport(e)) => {
                    warn!(
                        "Request error for {}: {} ({} retries left)",
                        url,
                        e,
                        attempts - attempt
                    );
                    last_error = e.to_string();
                }
            }

            if attempt < attempts {
                if let Some(delay) = backoff.next_backoff() {
                    tokio::time::sleep(delay).await;
                }
            }
        }

        ArticleResult::failed(ArticleError::RequestException(last_error))
    }

    async fn download(&self, url: &str, referer: &str) -> std::result::Result<String, AttemptError> {
        let response = self
            .client
            .get(url)
            .header(REFERER, referer)
            .header(ACCEPT_LANGUAGE, &self.config.accept_language)
            .send()
            .await
            .map_err(AttemptError::Transport)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(AttemptError::Status(status));
        }

        response.text().await.map_err(|e| {
            if e.is_decode() {
                AttemptError::Body(e)
            } else {
                AttemptError::Transport(e)
            }
        })
    }

    fn build_result(&self, url: &str, html: &str) -> ArticleResult {
        if html.trim().is_empty() {
            warn!("Empty HTML for {}", url);
            return ArticleResult::empty();
        }

        let text = self.extractor.extract(html);
        if text.is_empty() {
            warn!("No article body found in {}", url);
        }
        let text = truncate_chars(&text, self.config.max_article_chars);
        debug!("Extracted {} chars from {}", text.chars().count(), url);
        ArticleResult::ok(text)
    }
}

#[async_trait]
impl ArticleFetch for ArticleFetcher {
    async fn fetch_article(&self, url: &str) -> ArticleResult {
        self.fetch(url).await
    }
}

/// `scheme://host/` of `url`, or an empty string when it cannot be parsed.
pub fn referer_for(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => match parsed.host_str() {
            Some(host) if !host.is_empty() => {
                let port = parsed.port().map(|p| format!(":{}", p)).unwrap_or_default();
                format!("{}://{}{}/", parsed.scheme(), host, port)
            }
            _ => String::new(),
        },
        Err(_) => String::new(),
    }
}
