use super::Notifier;
use crate::types::{DigestError, Result};
use crate::utils::preview;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

/// Feishu custom-bot webhooks; each destination is a full webhook URL.
pub struct FeishuNotifier {
    client: Client,
    webhooks: Vec<String>,
}

#[derive(Debug, Serialize)]
struct MarkdownMessage<'a> {
    msg_type: &'static str,
    markdown: MarkdownBody<'a>,
}

#[derive(Debug, Serialize)]
struct MarkdownBody<'a> {
    title: &'a str,
    text: &'a str,
}

impl FeishuNotifier {
    pub fn new(webhooks: Vec<String>, timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;

        Ok(Self { client, webhooks })
    }
}

#[async_trait]
impl Notifier for FeishuNotifier {
    fn channel(&self) -> &str {
        "feishu"
    }

    fn destinations(&self) -> &[String] {
        &self.webhooks
    }

    async fn send(&self, destination: &str, title: &str, content: &str) -> Result<()> {
        let payload = MarkdownMessage {
            msg_type: "markdown",
            markdown: MarkdownBody { title, text: content },
        };

        let response = self
            .client
            .post(destination)
            .json(&payload)
            .send()
            .await
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
