//! Readability-style article body extraction.
//!
//! The document is scanned for the usual article containers; the one holding
//! the most paragraph text wins. When no container carries any text, every
//! paragraph outside page chrome is used instead.

use scraper::{ElementRef, Html, Selector};

const CONTENT_CONTAINERS: &[&str] = &[
    "article",
    "main",
    "[itemprop='articleBody']",
    ".article-content",
    ".article-body",
    ".post-content",
    ".entry-content",
    "#content",
];

const PARAGRAPHS: &str = "p, h2, h3, blockquote, li";

/// Elements whose text never belongs to an article body.
const CHROME_TAGS: &[&str] = &[
    "script", "style", "noscript", "nav", "header", "footer", "aside", "form", "iframe", "template",
];

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("invalid selector {selector:?}: {reason}")]
    Selector { selector: String, reason: String },
}

fn selector(raw: &str) -> Result<Selector, ExtractError> {
    Selector::parse(raw).map_err(|e| ExtractError::Selector {
        selector: raw.to_string(),
        reason: format!("{:?}", e),
    })
}

/// Compiled selectors, built once per fetcher and reused for every page.
pub struct ArticleExtractor {
    containers: Vec<Selector>,
    paragraphs: Selector,
}

impl ArticleExtractor {
    pub fn new() -> Result<Self, ExtractError> {
        let containers = CONTENT_CONTAINERS
            .iter()
            .map(|raw| selector(raw))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            containers,
            paragraphs: selector(PARAGRAPHS)?,
        })
    }

    /// Extract the plain-text body of an HTML page. Paragraphs are separated
    /// by newlines; an empty string means nothing article-like was found.
    pub fn extract(&self, html: &str) -> String {
        let document = Html::parse_document(html);

        let mut best: Vec<String> = Vec::new();
        let mut best_len = 0;
        for container in &self.containers {
            for element in document.select(container) {
                let blocks = collect_blocks(element, &self.paragraphs);
                let len: usize = blocks.iter().map(|b| b.chars().count()).sum();
                if len > best_len {
                    best_len = len;
                    best = blocks;
                }
            }
        }

        if best.is_empty() {
            best = collect_blocks(document.root_element(), &self.paragraphs);
        }

        best.join("\n")
    }
}

fn collect_blocks(root: ElementRef<'_>, paragraphs: &Selector) -> Vec<String> {
    root.select(paragraphs)
        .filter(|el| !inside_chrome(el))
        // nested matches (a <p> inside an <li>) would otherwise repeat text
        .filter(|el| !has_block_ancestor_within(el, &root, paragraphs))
        .map(|el| collapse_whitespace(&el.text().collect::<Vec<_>>().join(" ")))
        .filter(|text| !text.is_empty())
        .collect()
}

fn inside_chrome(element: &ElementRef<'_>) -> bool {
    std::iter::once(*element)
        .chain(element.ancestors().filter_map(ElementRef::wrap))
        .any(|el| CHROME_TAGS.contains(&el.value().name()))
}

fn has_block_ancestor_within(element: &ElementRef<'_>, root: &ElementRef<'_>, paragraphs: &Selector) -> bool {
    for ancestor in element.ancestors().filter_map(ElementRef::wrap) {
        if ancestor == *root {
            return false;
        }
        if paragraphs.matches(&ancestor) {
            return true;
        }
    }
    false
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cut `text` to at most `max_chars` characters without splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => text[..byte_index].to_string(),
        None => text.to_string(),
    }
}
