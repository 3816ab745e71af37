use crate::types::{DigestError, FeedEntry, ParsedFeed, Result};
use feed_rs::parser;
use tracing::debug;
use url::Url;

pub const UNTITLED: &str = "无标题";

pub struct FeedParser;

impl FeedParser {
    /// Parse RSS, Atom or JSON Feed content. Entries keep feed order and are
    /// never dropped here; a missing link shows up as an empty `link`.
    pub fn parse_feed(content: &[u8]) -> Result<ParsedFeed> {
        debug!("Parsing feed content ({} bytes)", content.len());

        let feed = parser::parse(content)
            .map_err(|e| DigestError::Parse(format!("Failed to parse feed: {}", e)))?;

        let title = feed.title.map(|t| t.content);
        let entries = feed.entries.into_iter().map(Self::parse_entry).collect();

        Ok(ParsedFeed { title, entries })
    }

    /// Title: trimmed, `无标题` when missing or blank (an empty `<title></title>`
    /// is treated as missing).
    ///
    /// Link: first non-empty link href, else the guid when it is an absolute
    /// http(s) URL, else empty. An opaque guid such as `item-42` is never used
    /// as a link; the entry then surfaces as a `no_link` failure instead of a
    /// listing that points nowhere.
    fn parse_entry(entry: feed_rs::model::Entry) -> FeedEntry {
        let title = entry
            .title
            .map(|t| t.content.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| UNTITLED.to_string());

        // feed-rs synthesises an id when the feed has none, so the guid is only
        // trusted as a link when it is itself an absolute web URL.
        let link = entry
            .links
            .iter()
            .map(|l| l.href.trim())
            .find(|href| !href.is_empty())
            .map(str::to_string)
            .or_else(|| is_web_url(&entry.id).then(|| entry.id.trim().to_string()))
            .unwrap_or_default();

        FeedEntry { title, link }
    }
}

fn is_web_url(candidate: &str) -> bool {
    Url::parse(candidate.trim())
        .map(|url| matches!(url.scheme(), "http" | "https") && url.host_str().is_some())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Markets</title>
    <link>https://news.example.com</link>
    <description>test</description>
    <item>
      <title>Stocks rally</title>
      <link>https://news.example.com/a</link>
    </item>
    <item>
      <title>Guid only</title>
      <guid isPermaLink="true">https://news.example.com/guid-link</guid>
    </item>
    <item>
      <title>Opaque guid</title>
      <guid isPermaLink="false">item-42</guid>
    </item>
    <item>
      <description>no title here</description>
      <link>https://news.example.com/c</link>
    </item>
    <item>
      <title>   </title>
      <link>https://news.example.com/d</link>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn resolves_titles_and_link_fallbacks_in_order() {
        let feed = FeedParser::parse_feed(RSS.as_bytes()).unwrap();
        assert_eq!(feed.title.as_deref(), Some("Markets"));
        assert_eq!(
            feed.entries,
            vec![
                FeedEntry {
                    title: "Stocks rally".into(),
                    link: "https://news.example.com/a".into()
                },
                FeedEntry {
                    title: "Guid only".into(),
                    link: "https://news.example.com/guid-link".into()
                },
                FeedEntry {
                    title: "Opaque guid".into(),
                    link: String::new()
                },
                FeedEntry {
                    title: UNTITLED.into(),
                    link: "https://news.example.com/c".into()
                },
                FeedEntry {
                    title: UNTITLED.into(),
                    link: "https://news.example.com/d".into()
                },
            ]
        );
    }

    #[test]
    fn parses_atom() {
        let atom = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Atom Markets</title>
  <id>urn:uuid:feed</id>
  <updated>2024-01-01T00:00:00Z</updated>
  <entry>
    <title>Bonds slip</title>
    <id>urn:uuid:entry-1</id>
    <updated>2024-01-01T00:00:00Z</updated>
    <link href="https://atom.example.com/bonds"/>
  </entry>
</feed>"#;
        let feed = FeedParser::parse_feed(atom.as_bytes()).unwrap();
        assert_eq!(feed.entries.len(), 1);
        assert_eq!(feed.entries[0].link, "https://atom.example.com/bonds");
    }

    #[test]
    fn rejects_non_feed_content() {
        assert!(FeedParser::parse_feed(b"<html><body>nope</body></html>").is_err());
    }
}
