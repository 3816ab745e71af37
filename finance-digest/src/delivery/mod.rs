pub mod chunk;
pub mod feishu;
pub mod server_chan;

pub use chunk::chunk_text;
pub use feishu::FeishuNotifier;
pub use server_chan::{ServerChanNotifier, SERVER_CHAN_BASE_URL};

use crate::digest::{category_part_title, report_title};
use crate::types::{CategoryContent, Result};
use crate::utils::mask_secret;
use async_trait::async_trait;
use tracing::{error, info};

/// Longest message body sent per chunk on the chunked channel.
pub const CHUNK_MAX_CHARS: usize = 2000;

/// A push channel with one or more destinations (keys, webhook URLs).
#[async_trait]
pub trait Notifier: Send + Sync {
    fn channel(&self) -> &str;

    fn destinations(&self) -> &[String];

    /// Deliver one message to one destination.
    async fn send(&self, destination: &str, title: &str, content: &str) -> Result<()>;
}

#[derive(Debug)]
pub struct DeliveryOutcome {
    pub destination: String,
    pub title: String,
    pub result: Result<()>,
}

#[derive(Debug, Default)]
pub struct DeliveryReport {
    pub outcomes: Vec<DeliveryOutcome>,
}

impl DeliveryReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn merge(&mut self, other: DeliveryReport) {
        self.outcomes.extend(other.outcomes);
    }
}

/// Send one message to every destination of `notifier`. A failing
/// destination is logged and recorded; the remaining ones are still tried.
pub async fn deliver_to_all(notifier: &dyn Notifier, title: &str, content: &str) -> DeliveryReport {
    let mut report = DeliveryReport::default();

    for destination in notifier.destinations() {
        let masked = mask_secret(destination);
        let result = notifier.send(destination, title, content).await;
        match &result {
            Ok(()) => info!("{} push succeeded: {}", notifier.channel(), masked),
            Err(e) => error!("{} push failed: {}: {}", notifier.channel(), masked, e),
        }
        report.outcomes.push(DeliveryOutcome {
            destination: destination.clone(),
            title: title.to_string(),
            result,
        });
    }

    report
}

/// The whole composed report as a single message.
pub async fn send_full_report(notifier: &dyn Notifier, date_label: &str, report: &str) -> DeliveryReport {
    deliver_to_all(notifier, &report_title(date_label), report).await
}

/// One `### category` message per non-blank category, split into numbered parts.
pub async fn send_category_chunks(
    notifier: &dyn Notifier,
    date_label: &str,
    categories: &[CategoryContent],
) -> DeliveryReport {
    let mut report = DeliveryReport::default();

    for category in categories {
        if category.content.trim().is_empty() {
            continue;
        }
        let message = format!("### {}\n{}", category.name, category.content);
        let chunks = chunk_text(&message, CHUNK_MAX_CHARS);
        let total = chunks.len();
        info!("Sending {} in {} part(s) via {}", category.name, total, notifier.channel());

        for (index, chunk) in chunks.iter().enumerate() {
            let title = category_part_title(date_label, &category.name, index + 1, total);
            report.merge(deliver_to_all(notifier, &title, chunk).await);
        }
    }

    report
}
