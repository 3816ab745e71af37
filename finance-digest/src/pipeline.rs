use crate::aggregator::NewsAggregator;
use crate::article::ArticleFetcher;
use crate::config::{DigestConfig, FeedCatalog};
use crate::delivery::{
    send_category_chunks, send_full_report, DeliveryReport, FeishuNotifier, Notifier,
    ServerChanNotifier,
};
use crate::digest::compose_report;
use crate::fetcher::Fetcher;
use crate::llm_adapter::OpenAiCompatibleAdapter;
use crate::summarizer::{Summarizer, SummaryOutcome};
use crate::types::{AggregatedNews, Result};
use std::time::Instant;
use tracing::{info, warn};

/// One daily run: aggregate, summarize, compose, deliver.
pub struct DigestPipeline {
    catalog: FeedCatalog,
    aggregator: NewsAggregator,
    summarizer: Summarizer,
    /// Channels that receive the whole report as one message.
    report_channels: Vec<Box<dyn Notifier>>,
    /// Channels that receive per-category messages split into parts.
    chunked_channels: Vec<Box<dyn Notifier>>,
}

/// What a run produced, for the caller to print or inspect.
#[derive(Debug)]
pub struct RunSummary {
    pub date_label: String,
    pub report: String,
    pub news: AggregatedNews,
    pub summary: SummaryOutcome,
    pub sources: usize,
    pub delivery: DeliveryReport,
}

impl RunSummary {
    pub fn deliveries_ok(&self) -> usize {
        self.delivery.succeeded()
    }

    pub fn deliveries_failed(&self) -> usize {
        self.delivery.failed()
    }
}

impl DigestPipeline {
    pub fn new(
        catalog: FeedCatalog,
        aggregator: NewsAggregator,
        summarizer: Summarizer,
        report_channels: Vec<Box<dyn Notifier>>,
        chunked_channels: Vec<Box<dyn Notifier>>,
    ) -> Self {
        Self {
            catalog,
            aggregator,
            summarizer,
            report_channels,
            chunked_channels,
        }
    }

    /// Wire the HTTP-backed components from configuration.
    pub fn from_config(config: &DigestConfig) -> Result<Self> {
        let aggregator = NewsAggregator::new(
            Box::new(Fetcher::new(config.fetch.clone())?),
            Box::new(ArticleFetcher::new(config.fetch.clone())?),
            config.max_articles_per_source,
        );

        let summarizer = match &config.llm {
            Some(settings) => Summarizer::new(Box::new(OpenAiCompatibleAdapter::new(settings.clone())?)),
            None => Summarizer::disabled(),
        };

        let timeout = config.fetch.delivery_timeout_seconds;
        let mut report_channels: Vec<Box<dyn Notifier>> = Vec::new();
        if !config.server_chan_keys.is_empty() {
            report_channels.push(Box::new(ServerChanNotifier::new(
                config.server_chan_keys.clone(),
                timeout,
            )?));
        }

        let mut chunked_channels: Vec<Box<dyn Notifier>> = Vec::new();
        if !config.feishu_webhooks.is_empty() {
            chunked_channels.push(Box::new(FeishuNotifier::new(
                config.feishu_webhooks.clone(),
                timeout,
            )?));
        }

        Ok(Self::new(
            config.catalog.clone(),
            aggregator,
            summarizer,
            report_channels,
            chunked_channels,
        ))
    }

    /// Run the whole digest for `date_label`. Delivery is skipped when
    /// `deliver` is false. Per-item problems end up in the report, not in
    /// the return value.
    pub async fn run(&self, date_label: &str, deliver: bool) -> RunSummary {
        let start_time = Instant::now();
        let sources = self.catalog.source_count();
        info!(
            "Starting digest for {} ({} categories, {} sources)",
            date_label,
            self.catalog.categories.len(),
            sources
        );

        let news = self.aggregator.aggregate(&self.catalog).await;
        let summary = self.summarizer.summarize_outcome(&news.analysis_text).await;
        let report = compose_report(
            date_label,
            &summary.clone().into_text(),
            &news.categories,
            &news.failures,
        );

        let mut delivery = DeliveryReport::default();
        if deliver {
            for channel in &self.report_channels {
                delivery.merge(send_full_report(channel.as_ref(), date_label, &report).await);
            }
            for channel in &self.chunked_channels {
                delivery.merge(send_category_chunks(channel.as_ref(), date_label, &news.categories).await);
            }
            if self.report_channels.is_empty() && self.chunked_channels.is_empty() {
                warn!("No delivery channel configured, report was not sent");
            }
        } else {
            info!("Delivery disabled for this run");
        }

        info!(
            "Digest for {} finished in {:.1}s: {} articles listed, {} failures, {} deliveries ok, {} failed",
            date_label,
            start_time.elapsed().as_secs_f64(),
            news.listed_articles,
            news.failures.len(),
            delivery.succeeded(),
            delivery.failed()
        );

        RunSummary {
            date_label: date_label.to_string(),
            report,
            news,
            summary,
            sources,
            delivery,
        }
    }
}
