use crate::config::{FeedCatalog, FeedSource};
use crate::traits::{ArticleFetch, FeedFetch};
use crate::types::{AggregatedNews, CategoryContent, FailureRecord};
use tracing::{info, warn};

/// Walks the feed catalog and collects listings, analysis text and failures.
///
/// Nothing in here returns an error: every failing feed or article becomes a
/// `FailureRecord` and the walk carries on.
pub struct NewsAggregator {
    feeds: Box<dyn FeedFetch>,
    articles: Box<dyn ArticleFetch>,
    max_articles_per_source: usize,
}

impl NewsAggregator {
    pub fn new(
        feeds: Box<dyn FeedFetch>,
        articles: Box<dyn ArticleFetch>,
        max_articles_per_source: usize,
    ) -> Self {
        Self {
            feeds,
            articles,
            max_articles_per_source,
        }
    }

    pub async fn aggregate(&self, catalog: &FeedCatalog) -> AggregatedNews {
        let mut news = AggregatedNews::default();

        for category in &catalog.categories {
            let mut content = String::new();
            for source in &category.sources {
                if let Some(block) = self.aggregate_source(source, &mut news).await {
                    content.push_str(&block);
                }
            }
            news.categories.push(CategoryContent {
                name: category.name.clone(),
                content,
            });
        }

        info!(
            "Aggregated {} articles across {} categories ({} failures)",
            news.listed_articles,
            news.categories.len(),
            news.failures.len()
        );
        news
    }

    /// Returns the `### source` block, or `None` when the source listed nothing.
    async fn aggregate_source(&self, source: &FeedSource, news: &mut AggregatedNews) -> Option<String> {
        info!("Fetching RSS for {}: {}", source.name, source.url);

        let Some(feed) = self.feeds.fetch_with_retry(&source.url).await else {
            warn!("No RSS data for {}", source.name);
            news.failures.push(FailureRecord::feed_unavailable(&source.name, &source.url));
            return None;
        };
        info!("{} returned {} entries", source.name, feed.entries.len());

        let mut lines = Vec::new();
        for entry in &feed.entries {
            if lines.len() >= self.max_articles_per_source {
                break;
            }
            // link-less entries do not count against the cap
            if entry.link.is_empty() {
                warn!("{}: '{}' has no link, skipping", source.name, entry.title);
                news.failures.push(FailureRecord::missing_link(&source.name, &entry.title));
                continue;
            }

            let article = self.articles.fetch_article(&entry.link).await;
            if let Some(error) = article.error {
                news.failures.push(FailureRecord::article(
                    &source.name,
                    &entry.title,
                    &entry.link,
                    error,
                ));
            }
            if !article.text.is_empty() {
                news.analysis_text
                    .push_str(&format!("【{}】\n{}\n\n", entry.title, article.text));
            }

            info!("{} - {} done ({})", source.name, entry.title, entry.link);
            lines.push(format!("- [{}]({})", entry.title, entry.link));
        }

        if lines.is_empty() {
            return None;
        }
        news.listed_articles += lines.len();
        Some(format!("### {}\n{}\n\n", source.name, lines.join("\n")))
    }
}
