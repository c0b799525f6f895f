// src/ingest/providers/rss.rs
use anyhow::{Context, Result};
use quick_xml::de::from_str;
use serde::Deserialize;

use crate::config::RssFeedConfig;
use crate::ingest::fetch::HttpFetch;
use crate::ingest::types::RawItem;

/// Feeds carry no popularity metric; every item gets the same score so the
/// stable ranking sort keeps feed order.
pub const RSS_DEFAULT_SCORE: i64 = 100;

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    description: Option<String>,
    author: Option<String>,
    guid: Option<Guid>,
}

#[derive(Debug, Deserialize)]
struct Guid {
    #[serde(rename = "$text", default)]
    value: Option<String>,
}

/// Parse an RSS 2.0 document into at most `limit` raw items.
pub fn parse_feed(feed_name: &str, xml: &str, limit: usize) -> Result<Vec<RawItem>> {
    let xml_clean = scrub_html_entities_for_xml(xml);
    let rss: Rss = from_str(&xml_clean).with_context(|| format!("parsing rss xml of {feed_name}"))?;

    Ok(rss
        .channel
        .item
        .into_iter()
        .take(limit)
        .map(|it| {
            let link = it.link.unwrap_or_default();
            let id = it
                .guid
                .and_then(|g| g.value)
                .map(|g| g.trim().to_string())
                .filter(|g| !g.is_empty())
                .unwrap_or_else(|| link.trim().to_string());
            RawItem {
                id,
                title: it.title.unwrap_or_default(),
                url: link,
                score: RSS_DEFAULT_SCORE,
                comments_count: 0,
                author: it.author.or_else(|| Some(feed_name.to_string())),
                excerpt: it.description,
                source: None,
            }
        })
        .collect())
}

pub async fn fetch_feed(cfg: &RssFeedConfig, http: &dyn HttpFetch) -> Result<Vec<RawItem>> {
    let body = http
        .get_text(&cfg.url, None)
        .await
        .with_context(|| format!("rss feed {}", cfg.name))?;
    parse_feed(&cfg.name, &body, cfg.limit)
}

/// Named HTML entities are not valid XML; fold the common ones before parsing.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
        .replace("&hellip;", "...")
}
