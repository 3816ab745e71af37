#![allow(dead_code)]

use async_trait::async_trait;
use finance_digest::delivery::Notifier;
use finance_digest::traits::{ArticleFetch, FeedFetch};
use finance_digest::types::{ArticleResult, DigestError, FeedEntry, ParsedFeed, Result};
use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_test_writer()
        .try_init();
}

/// Canned reply for one route of the stub server.
#[derive(Debug, Clone)]
pub struct StubResponse {
    pub status: u16,
    pub body: Vec<u8>,
    pub content_type: String,
    pub delay: Option<Duration>,
    pub content_encoding: Option<String>,
    /// Close the connection without writing a response.
    pub hang_up: bool,
}

impl StubResponse {
    pub fn ok(content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            body: body.into(),
            content_type: content_type.to_string(),
            delay: None,
            content_encoding: None,
            hang_up: false,
        }
    }

    pub fn html(body: &str) -> Self {
        Self::ok("text/html; charset=utf-8", body)
    }

    pub fn rss(body: &str) -> Self {
        Self::ok("application/rss+xml; charset=utf-8", body)
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            ..Self::ok("text/plain", "stub error")
        }
    }

    pub fn hang_up() -> Self {
        Self {
            hang_up: true,
            ..Self::status(500)
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_content_encoding(mut self, encoding: &str) -> Self {
        self.content_encoding = Some(encoding.to_string());
        self
    }
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    /// Header names are lowercased.
    pub headers: HashMap<String, String>,
    pub body: String,
}

/// Minimal HTTP/1.1 server on 127.0.0.1 serving fixed responses by path.
/// Unknown paths get a 404. Every request is recorded.
pub struct StubServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    handle: JoinHandle<()>,
}

impl StubServer {
    pub async fn start(routes: Vec<(&str, StubResponse)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let routes: Arc<HashMap<String, StubResponse>> = Arc::new(
            routes
                .into_iter()
                .map(|(path, response)| (path.to_string(), response))
                .collect(),
        );
        let requests = Arc::new(Mutex::new(Vec::new()));

        let recorded = requests.clone();
        let handle = tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                let routes = routes.clone();
                let recorded = recorded.clone();
                tokio::spawn(async move {
                    serve_connection(stream, routes, recorded).await;
                });
            }
        });

        Self {
            addr,
            requests,
            handle,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, path: &str) -> usize {
        self.requests().iter().filter(|r| r.path == path).count()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn serve_connection(
    mut stream: TcpStream,
    routes: Arc<HashMap<String, StubResponse>>,
    recorded: Arc<Mutex<Vec<RecordedRequest>>>,
) {
    let Some(request) = read_request(&mut stream).await else {
        return;
    };
    let route = request.path.split('?').next().unwrap_or("").to_string();
    recorded.lock().unwrap().push(request);

    let response = routes
        .get(&route)
        .cloned()
        .unwrap_or_else(|| StubResponse::status(404));

    if let Some(delay) = response.delay {
        tokio::time::sleep(delay).await;
    }
    if response.hang_up {
        let _ = stream.shutdown().await;
        return;
    }

    let encoding = response
        .content_encoding
        .as_ref()
        .map(|e| format!("Content-Encoding: {}\r\n", e))
        .unwrap_or_default();
    let head = format!(
        "HTTP/1.1 {} STUB\r\nContent-Type: {}\r\n{}Content-Length: {}\r\nConnection: close\r\n\r\n",
        response.status,
        response.content_type,
        encoding,
        response.body.len()
    );
    let _ = stream.write_all(head.as_bytes()).await;
    let _ = stream.write_all(&response.body).await;
    let _ = stream.shutdown().await;
}

async fn read_request(stream: &mut TcpStream) -> Option<RecordedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();

    let headers: HashMap<String, String> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(name, value)| (name.trim().to_ascii_lowercase(), value.trim().to_string()))
        .collect();

    let content_length: usize = headers
        .get("content-length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body_end = buf.len().min(header_end + content_length);
    let body = String::from_utf8_lossy(&buf[header_end..body_end]).to_string();

    Some(RecordedRequest {
        method,
        path,
        headers,
        body,
    })
}

/// An address on which nothing is listening.
pub async fn closed_port_url(path: &str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}{}", addr, path)
}

pub fn rss_document(title: &str, items: &[(&str, &str)]) -> String {
    let items: String = items
        .iter()
        .map(|(title, link)| format!("<item><title>{}</title><link>{}</link></item>", title, link))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><rss version="2.0"><channel><title>{}</title><link>http://example.com/</link><description>stub</description>{}</channel></rss>"#,
        title, items
    )
}

pub fn feed(entries: &[(&str, &str)]) -> ParsedFeed {
    ParsedFeed {
        title: Some("stub".to_string()),
        entries: entries
            .iter()
            .map(|(title, link)| FeedEntry {
                title: title.to_string(),
                link: link.to_string(),
            })
            .collect(),
    }
}

/// Feed fetcher answering from a map; unknown URLs are unavailable.
#[derive(Default)]
pub struct MockFeedFetch {
    feeds: HashMap<String, ParsedFeed>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockFeedFetch {
    pub fn with_feed(mut self, url: &str, feed: ParsedFeed) -> Self {
        self.feeds.insert(url.to_string(), feed);
        self
    }

    pub fn calls(&self) -> Arc<Mutex<Vec<String>>> {
        self.calls.clone()
    }
}

#[async_trait]
impl FeedFetch for MockFeedFetch {
    async fn fetch_with_retry(&self, url: &str) -> Option<ParsedFeed> {
        self.calls.lock().unwrap().push(url.to_string());
        self.feeds.get(url).cloned()
    }
}

/// Article fetcher answering from a map; unknown URLs yield `body of {url}`.
#[derive(Default)]
pub struct MockArticleFetch {
    results: HashMap<String, ArticleResult>,
    fetched: Arc<Mutex<Vec<String>>>,
}

impl MockArticleFetch {
    pub fn with_result(mut self, url: &str, result: ArticleResult) -> Self {
        self.results.insert(url.to_string(), result);
        self
    }

    pub fn fetched(&self) -> Arc<Mutex<Vec<String>>> {
        self.fetched.clone()
    }
}

#[async_trait]
impl ArticleFetch for MockArticleFetch {
    async fn fetch_article(&self, url: &str) -> ArticleResult {
        self.fetched.lock().unwrap().push(url.to_string());
        self.results
            .get(url)
            .cloned()
            .unwrap_or_else(|| ArticleResult::ok(format!("body of {}", url)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub destination: String,
    pub title: String,
    pub content: String,
}

/// Notifier that records every send; listed destinations fail.
pub struct RecordingNotifier {
    destinations: Vec<String>,
    failing: HashSet<String>,
    sent: Arc<Mutex<Vec<SentMessage>>>,
}

impl RecordingNotifier {
    pub fn new(destinations: &[&str]) -> Self {
        Self {
            destinations: destinations.iter().map(|d| d.to_string()).collect(),
            failing: HashSet::new(),
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing_on(mut self, destination: &str) -> Self {
        self.failing.insert(destination.to_string());
        self
    }

    pub fn sent(&self) -> Arc<Mutex<Vec<SentMessage>>> {
        self.sent.clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn channel(&self) -> &str {
        "recording"
    }

    fn destinations(&self) -> &[String] {
        &self.destinations
    }

    async fn send(&self, destination: &str, title: &str, content: &str) -> Result<()> {
        self.sent.lock().unwrap().push(SentMessage {
            destination: destination.to_string(),
            title: title.to_string(),
            content: content.to_string(),
        });
        if self.failing.contains(destination) {
            return Err(DigestError::General(format!("{} rejected the message", destination)));
        }
        Ok(())
    }
}
