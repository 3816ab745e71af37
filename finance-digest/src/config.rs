use crate::types::{DigestError, FetchConfig, Result};
use ::config::{Config, File, FileFormat};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, warn};

pub const SERVER_CHAN_KEYS_VAR: &str = "SERVER_CHAN_KEYS";
pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const OPENAI_BASE_URL_VAR: &str = "OPENAI_BASE_URL";
pub const OPENAI_MODEL_VAR: &str = "OPENAI_MODEL";
pub const FEISHU_WEBHOOK_URLS_VAR: &str = "FEISHU_WEBHOOK_URLS";
pub const FEISHU_WEBHOOK_URL_VAR: &str = "FEISHU_WEBHOOK_URL";
pub const MAX_ARTICLES_VAR: &str = "DIGEST_MAX_ARTICLES";

pub const DEFAULT_LLM_BASE_URL: &str = "https://api.deepseek.com/v1";
pub const DEFAULT_LLM_MODEL: &str = "deepseek-chat";
pub const DEFAULT_MAX_ARTICLES: usize = 10;

const BUILTIN_FEEDS: &[(&str, &[(&str, &str)])] = &[
    (
        "💲 华尔街见闻",
        &[("华尔街见闻", "https://dedicated.wallstreetcn.com/rss.xml")],
    ),
    ("💻 36氪", &[("36氪", "https://36kr.com/feed")]),
    (
        "🇨🇳 中国经济",
        &[
            ("香港經濟日報", "https://www.hket.com/rss/china"),
            ("东方财富", "http://rss.eastmoney.com/rss_partener.xml"),
            ("百度股票焦点", "http://news.baidu.com/n?cmd=1&class=stock&tn=rss&sub=0"),
            ("中新网", "https://www.chinanews.com.cn/rss/finance.xml"),
            ("国家统计局-最新发布", "https://www.stats.gov.cn/sj/zxfb/rss.xml"),
        ],
    ),
    (
        "🇺🇸 美国经济",
        &[
            ("华尔街日报 - 经济", "https://feeds.content.dowjones.io/public/rss/WSJcomUSBusiness"),
            ("华尔街日报 - 市场", "https://feeds.content.dowjones.io/public/rss/RSSMarketsMain"),
            ("MarketWatch美股", "https://www.marketwatch.com/rss/topstories"),
            ("ZeroHedge华尔街新闻", "https://feeds.feedburner.com/zerohedge/feed"),
            ("ETF Trends", "https://www.etftrends.com/feed/"),
        ],
    ),
    (
        "🌍 世界经济",
        &[
            ("华尔街日报 - 经济", "https://feeds.content.dowjones.io/public/rss/socialeconomyfeed"),
            ("BBC全球经济", "http://feeds.bbci.co.uk/news/business/rss.xml"),
        ],
    ),
];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeedSource {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeedCategory {
    pub name: String,
    #[serde(default)]
    pub sources: Vec<FeedSource>,
}

/// Ordered category → source → feed URL mapping. Iteration order is the
/// order the categories and sources were written in.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct FeedCatalog {
    #[serde(default)]
    pub categories: Vec<FeedCategory>,
}

impl FeedCatalog {
    pub fn builtin() -> Self {
        let categories = BUILTIN_FEEDS
            .iter()
            .map(|(category, sources)| FeedCategory {
                name: category.to_string(),
                sources: sources
                    .iter()
                    .map(|(name, url)| FeedSource {
                        name: name.to_string(),
                        url: url.to_string(),
                    })
                    .collect(),
            })
            .collect();
        Self { categories }
    }

    /// Load a catalog from a TOML/YAML/JSON file, format chosen by extension.
    pub fn from_file(path: &Path) -> Result<Self> {
        let settings = Config::builder().add_source(File::from(path)).build()?;
        let catalog: FeedCatalog = settings.try_deserialize()?;
        debug!("Loaded {} feed categories from {}", catalog.categories.len(), path.display());
        Ok(catalog)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::from_str(content, FileFormat::Toml))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    pub fn source_count(&self) -> usize {
        self.categories.iter().map(|c| c.sources.len()).sum()
    }
}

#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

/// Whether a missing push-key list aborts configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretPolicy {
    RequirePushKeys,
    AllowMissing,
}

#[derive(Debug, Clone)]
pub struct DigestConfig {
    pub server_chan_keys: Vec<String>,
    pub feishu_webhooks: Vec<String>,
    pub llm: Option<LlmSettings>,
    pub max_articles_per_source: usize,
    pub fetch: FetchConfig,
    pub catalog: FeedCatalog,
}

impl DigestConfig {
    /// Read the process environment, after loading a `.env` file if one exists.
    pub fn from_env(policy: SecretPolicy) -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok(), policy)
    }

    pub fn from_lookup<F>(lookup: F, policy: SecretPolicy) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server_chan_keys = lookup(SERVER_CHAN_KEYS_VAR)
            .map(|raw| split_list(&raw))
            .unwrap_or_default();
        if server_chan_keys.is_empty() && policy == SecretPolicy::RequirePushKeys {
            return Err(DigestError::MissingSecret {
                name: SERVER_CHAN_KEYS_VAR.to_string(),
            });
        }

        let mut feishu_webhooks = lookup(FEISHU_WEBHOOK_URLS_VAR)
            .map(|raw| split_list(&raw))
            .unwrap_or_default();
        if feishu_webhooks.is_empty() {
            if let Some(single) = lookup(FEISHU_WEBHOOK_URL_VAR) {
                let single = single.trim();
                if !single.is_empty() {
                    feishu_webhooks.push(single.to_string());
                }
            }
        }

        let llm = lookup(OPENAI_API_KEY_VAR)
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .map(|api_key| LlmSettings {
                api_key,
                base_url: lookup(OPENAI_BASE_URL_VAR)
                    .unwrap_or_else(|| DEFAULT_LLM_BASE_URL.to_string()),
                model: lookup(OPENAI_MODEL_VAR).unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            });
        if llm.is_none() {
            warn!("{} is not set, the AI summary will be replaced by a placeholder", OPENAI_API_KEY_VAR);
        }

        let max_articles_per_source = match lookup(MAX_ARTICLES_VAR) {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                warn!("Ignoring invalid {}={:?}, using {}", MAX_ARTICLES_VAR, raw, DEFAULT_MAX_ARTICLES);
                DEFAULT_MAX_ARTICLES
            }),
            None => DEFAULT_MAX_ARTICLES,
        };

        Ok(Self {
            server_chan_keys,
            feishu_webhooks,
            llm,
            max_articles_per_source,
            fetch: FetchConfig::default(),
            catalog: FeedCatalog::builtin(),
        })
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
