use crate::llm_adapter::LlmAdapter;
use tracing::{error, info};

pub const EMPTY_INPUT_PLACEHOLDER: &str =
    "（未能获取到足够的正文用于自动分析，请查看下方的爬取结果与失败列表。）";
pub const BACKEND_FAILURE_PLACEHOLDER: &str =
    "（自动分析过程中发生错误，未能生成摘要；请查看原文链接与爬取失败列表以获取详情。）";

pub const ANALYST_PROMPT: &str = "你是一名专业的财经新闻分析师，请根据以下新闻内容，按照以下步骤完成任务：
1. 提取新闻中涉及的主要行业和主题，找出近1天涨幅最高的3个行业或主题，以及近3天涨幅较高且此前2周表现平淡的3个行业/主题。（如新闻未提供具体涨幅，请结合描述和市场情绪推测热点）
2. 针对每个热点，输出：
   - 催化剂：分析近期上涨的可能原因（政策、数据、事件、情绪等）。
   - 复盘：梳理过去3个月该行业/主题的核心逻辑、关键动态与阶段性走势。
   - 展望：判断该热点是短期炒作还是有持续行情潜力。
3. 将以上分析整合为一篇1500字以内的财经热点摘要，逻辑清晰、重点突出，适合专业投资者阅读。
4. 根据这些信息分析相关最大受益A股个股前10位，给出股票名称，代码及利好分析。";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryOutcome {
    Generated(String),
    EmptyInput,
    BackendFailed(String),
}

impl SummaryOutcome {
    /// The text shown in the report; the two failure cases become placeholders.
    pub fn into_text(self) -> String {
        match self {
            SummaryOutcome::Generated(text) => text,
            SummaryOutcome::EmptyInput => EMPTY_INPUT_PLACEHOLDER.to_string(),
            SummaryOutcome::BackendFailed(_) => BACKEND_FAILURE_PLACEHOLDER.to_string(),
        }
    }
}

/// Turns the aggregated article text into one market digest. Never fails.
pub struct Summarizer {
    adapter: Option<Box<dyn LlmAdapter>>,
}

impl Summarizer {
    pub fn new(adapter: Box<dyn LlmAdapter>) -> Self {
        Self {
            adapter: Some(adapter),
        }
    }

    /// A summarizer with no backend; every non-empty input is a backend failure.
    pub fn disabled() -> Self {
        Self { adapter: None }
    }

    pub async fn summarize_outcome(&self, text: &str) -> SummaryOutcome {
        if text.trim().is_empty() {
            info!("No article text to analyse, skipping the model call");
            return SummaryOutcome::EmptyInput;
        }

        let Some(adapter) = &self.adapter else {
            error!("No LLM backend configured, cannot generate summary");
            return SummaryOutcome::BackendFailed("no LLM backend configured".to_string());
        };

        match adapter.complete(ANALYST_PROMPT, text).await {
            Ok(reply) => SummaryOutcome::Generated(reply.trim().to_string()),
            Err(e) => {
                error!("Summary generation via {} failed: {}", adapter.adapter_name(), e);
                SummaryOutcome::BackendFailed(e.to_string())
            }
        }
    }

    pub async fn summarize(&self, text: &str) -> String {
        self.summarize_outcome(text).await.into_text()
    }
}
