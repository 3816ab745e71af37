use crate::types::{CategoryContent, FailureRecord};
use chrono::{DateTime, FixedOffset, Utc};

const BEIJING_OFFSET_SECONDS: i32 = 8 * 3600;

/// Calendar date of `now` in Beijing time, as `YYYY-MM-DD`.
pub fn date_label_at(now: DateTime<Utc>) -> String {
    match FixedOffset::east_opt(BEIJING_OFFSET_SECONDS) {
        Some(beijing) => now.with_timezone(&beijing).format("%Y-%m-%d").to_string(),
        None => now.format("%Y-%m-%d").to_string(),
    }
}

pub fn today_label() -> String {
    date_label_at(Utc::now())
}

pub fn report_title(date_label: &str) -> String {
    format!("📌 {} 财经新闻摘要", date_label)
}

pub fn category_part_title(date_label: &str, category: &str, part: usize, total: usize) -> String {
    format!("📌 {} 财经新闻摘要 - {} (Part {}/{})", date_label, category, part, total)
}

/// Assemble the full digest: header with the AI summary, one section per
/// non-blank category, and the failure list when there is one.
pub fn compose_report(
    date_label: &str,
    summary: &str,
    categories: &[CategoryContent],
    failures: &[FailureRecord],
) -> String {
    let mut report = format!(
        "📅 **{} 财经新闻摘要**\n\n✍️ **今日分析总结：**\n{}\n\n---\n\n",
        date_label, summary
    );

    for category in categories {
        if category.content.trim().is_empty() {
            continue;
        }
        report.push_str(&format!("## {}\n{}\n\n", category.name, category.content));
    }

    if !failures.is_empty() {
        report.push_str("\n\n---\n\n爬取失败列表（若有多条，按顺序列出）：\n");
        for failure in failures {
            report.push_str(&failure_line(failure));
        }
    }

    report
}

fn failure_line(failure: &FailureRecord) -> String {
    if failure.title.is_empty() {
        format!("- {} ({}): {}\n", failure.url, failure.source, failure.error)
    } else {
        format!(
            "- [{}]({}) ({}): {}\n",
            failure.title, failure.url, failure.source, failure.error
        )
    }
}
