use anyhow::Context;
use clap::Parser;
use finance_digest::config::{DigestConfig, FeedCatalog, SecretPolicy};
use finance_digest::digest::today_label;
use finance_digest::pipeline::DigestPipeline;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Daily financial news digest: fetch feeds, summarize, push.
#[derive(Debug, Parser)]
#[command(name = "finance-digest", version, about)]
struct Args {
    /// TOML feed catalog to use instead of the built-in one
    #[arg(long, value_name = "PATH")]
    feeds: Option<PathBuf>,

    /// Maximum articles listed per source
    #[arg(long, value_name = "N")]
    max_articles: Option<usize>,

    /// Date label for the report (defaults to today in Beijing time)
    #[arg(long, value_name = "YYYY-MM-DD", value_parser = parse_date_label)]
    date: Option<String>,

    /// Print the report instead of pushing it; push keys become optional
    #[arg(long)]
    dry_run: bool,
}

fn parse_date_label(raw: &str) -> Result<String, String> {
    chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|date| date.format("%Y-%m-%d").to_string())
        .map_err(|e| format!("expected YYYY-MM-DD: {}", e))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let policy = if args.dry_run {
        SecretPolicy::AllowMissing
    } else {
        SecretPolicy::RequirePushKeys
    };

    let mut config = DigestConfig::from_env(policy).map_err(|e| {
        error!("Configuration error: {}", e);
        e
    })?;

    if let Some(path) = &args.feeds {
        config.catalog = FeedCatalog::from_file(path)
            .with_context(|| format!("loading feed catalog from {}", path.display()))?;
    }
    if let Some(max_articles) = args.max_articles {
        config.max_articles_per_source = max_articles;
    }

    let date_label = args.date.clone().unwrap_or_else(today_label);
    let pipeline = DigestPipeline::from_config(&config).context("building pipeline")?;

    info!(
        "Running finance digest for {} ({} sources, up to {} articles each)",
        date_label,
        config.catalog.source_count(),
        config.max_articles_per_source
    );
    let summary = pipeline.run(&date_label, !args.dry_run).await;

    if args.dry_run {
        println!("{}", summary.report);
    }

    info!(
        "Done: {} sources, {} articles, {} failures, {} deliveries ok, {} failed",
        summary.sources,
        summary.news.listed_articles,
        summary.news.failures.len(),
        summary.deliveries_ok(),
        summary.deliveries_failed()
    );
    Ok(())
}
