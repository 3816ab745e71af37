use super::Notifier;
use crate::types::{DigestError, Result};
use crate::utils::preview;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

pub const SERVER_CHAN_BASE_URL: &str = "https://sctapi.ftqq.com";

/// Server酱 push: one form POST to `{base}/{key}.send` per key.
pub struct ServerChanNotifier {
    client: Client,
    keys: Vec<String>,
    base_url: String,
}

impl ServerChanNotifier {
    pub fn new(keys: Vec<String>, timeout_seconds: u64) -> Result<Self> {
        Self::with_base_url(keys, SERVER_CHAN_BASE_URL, timeout_seconds)
    }

    pub fn with_base_url(keys: Vec<String>, base_url: &str, timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            keys,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, key: &str) -> String {
        format!("{}/{}.send", self.base_url, key)
    }
}

#[async_trait]
impl Notifier for ServerChanNotifier {
    fn channel(&self) -> &str {
        "server_chan"
    }

    fn destinations(&self) -> &[String] {
        &self.keys
    }

    async fn send(&self, destination: &str, title: &str, content: &str) -> Result<()> {
        let response = self
            .client
            .post(self.endpoint(destination))
            .form(&[("title", title), ("desp", content)])
            .send()
            .await
            // the request URL embeds the push key
            .map_err(|e| DigestError::Http(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DigestError::General(format!(
                "HTTP {}: {}",
                status.as_u16(),
                preview(&body, 200)
            )));
        }
        Ok(())
    }
}
