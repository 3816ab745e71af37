use std::fmt;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
pub const DEFAULT_ACCEPT_LANGUAGE: &str = "zh-CN,zh;q=0.9,en-US,en;q=0.8";

/// Network policy shared by the feed fetcher, the article fetcher and the notifiers.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub accept_language: String,
    /// Per-request deadline for article downloads. Timeouts are never retried.
    pub timeout_seconds: u64,
    /// Attempts made for an article when the request fails at the transport level.
    pub max_retries: u32,
    pub retry_delay_seconds: u64,
    /// Attempts made for a feed that errors or comes back without entries.
    pub feed_max_retries: u32,
    pub feed_retry_delay_seconds: u64,
    /// Article text is cut to this many characters before it reaches the summarizer.
    pub max_article_chars: usize,
    pub delivery_timeout_seconds: u64,
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
            timeout_seconds: 10,
            max_retries: 3,
            retry_delay_seconds: 2,
            feed_max_retries: 3,
            feed_retry_delay_seconds: 5,
            max_article_chars: 1500,
            delivery_timeout_seconds: 10,
            max_redirects: 5,
        }
    }
}

/// One item of a parsed feed. `link` is empty when neither a link nor a
/// URL-shaped guid was present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: String,
    pub link: String,
}

#[derive(Debug, Clone, Default)]
pub struct ParsedFeed {
    pub title: Option<String>,
    pub entries: Vec<FeedEntry>,
}

/// Classified reason an article could not be (fully) retrieved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArticleError {
    Timeout,
    HttpStatus(u16),
    RequestException(String),
    ParseError(String),
    UnknownError(String),
}

impl fmt::Display for ArticleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArticleError::Timeout => write!(f, "timeout"),
            ArticleError::HttpStatus(status) => write!(f, "HTTP_{}", status),
            ArticleError::RequestException(detail) => write!(f, "request_exception: {}", detail),
            ArticleError::ParseError(detail) => write!(f, "parse_error: {}", detail),
            ArticleError::UnknownError(detail) => write!(f, "unknown_error: {}", detail),
        }
    }
}

/// Outcome of one article fetch. Empty text with no error is a valid result,
/// and an error may still come with usable partial text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleResult {
    pub text: String,
    pub error: Option<ArticleError>,
}

impl ArticleResult {
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            error: None,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn failed(error: ArticleError) -> Self {
        Self {
            text: String::new(),
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    RssFetchFailed,
    NoLink,
    Article(ArticleError),
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::RssFetchFailed => write!(f, "rss_fetch_failed"),
            FailureKind::NoLink => write!(f, "no_link"),
            FailureKind::Article(err) => write!(f, "{}", err),
        }
    }
}

/// One failed unit of work, surfaced at the bottom of the report.
/// `title` is empty for feed-level failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureRecord {
    pub source: String,
    pub title: String,
    pub url: String,
    pub error: FailureKind,
}

impl FailureRecord {
    pub fn feed_unavailable(source: &str, feed_url: &str) -> Self {
        Self {
            source: source.to_string(),
            title: String::new(),
            url: feed_url.to_string(),
            error: FailureKind::RssFetchFailed,
        }
    }

    pub fn missing_link(source: &str, title: &str) -> Self {
        Self {
            source: source.to_string(),
            title: title.to_string(),
            url: String::new(),
            error: FailureKind::NoLink,
        }
    }

    pub fn article(source: &str, title: &str, url: &str, error: ArticleError) -> Self {
        Self {
            source: source.to_string(),
            title: title.to_string(),
            url: url.to_string(),
            error: FailureKind::Article(error),
        }
    }
}

/// Rendered markdown listing for one category. Empty when no source produced a link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryContent {
    pub name: String,
    pub content: String,
}

/// Everything one aggregation run produces.
#[derive(Debug, Clone, Default)]
pub struct AggregatedNews {
    pub categories: Vec<CategoryContent>,
    /// `【title】\n{text}\n\n` segments, input for the summarizer only.
    pub analysis_text: String,
    pub failures: Vec<FailureRecord>,
    pub listed_articles: usize,
}

impl AggregatedNews {
    pub fn category(&self, name: &str) -> Option<&str> {
        self.categories
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.content.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DigestError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Feed parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("required secret {name} is not set")]
    MissingSecret { name: String },

    #[error("Extractor setup error: {0}")]
    Extract(#[from] crate::extract::ExtractError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("General error: {0}")]
    General(String),
}

pub type Result<T> = std::result::Result<T, DigestError>;
