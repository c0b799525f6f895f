// src/ingest/providers/hackernews.rs
//! Hacker News via the official Firebase API.
//!
//! One request for the front-page id list, then one request per story. The
//! front page is general-interest, so stories are kept only when the title
//! matches the configured keyword allowlist.

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::config::HackerNewsConfig;
use crate::ingest::fetch::{polite_pause, HttpFetch};
use crate::ingest::types::{Comment, RawItem};
use crate::ingest::{matches_any_keyword, normalize_comment};

#[derive(Debug, Deserialize)]
struct Item {
    id: u64,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    score: Option<i64>,
    #[serde(default)]
    descendants: Option<i64>,
    #[serde(default)]
    by: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    kids: Vec<u64>,
    #[serde(default)]
    deleted: bool,
    #[serde(default)]
    dead: bool,
}

pub fn top_stories_url(api_url: &str) -> String {
    format!("{}/topstories.json", api_url.trim_end_matches('/'))
}

pub fn item_url(api_url: &str, id: u64) -> String {
    format!("{}/item/{id}.json", api_url.trim_end_matches('/'))
}

pub fn discussion_url(id: u64) -> String {
    format!("https://news.ycombinator.com/item?id={id}")
}

pub fn parse_top_ids(body: &str) -> Result<Vec<u64>> {
    serde_json::from_str(body).context("parsing hn topstories json")
}

/// Parse one story; `Ok(None)` when it is not a live story or fails the allowlist.
pub fn parse_story(body: &str, keywords: &[String]) -> Result<Option<RawItem>> {
    let item: Item = serde_json::from_str(body).context("parsing hn item json")?;
    if item.deleted || item.dead {
        return Ok(None);
    }
    let title = item.title.unwrap_or_default();
    if !matches_any_keyword(&title, keywords) {
        return Ok(None);
    }
    let url = item
        .url
        .filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| discussion_url(item.id));
    Ok(Some(RawItem {
        id: item.id.to_string(),
        title,
        url,
        score: item.score.unwrap_or(0),
        comments_count: item.descendants.unwrap_or(0),
        author: item.by,
        excerpt: None,
        source: None,
    }))
}

/// Parse one comment item. HN exposes no per-comment score.
pub fn parse_comment(body: &str) -> Result<Option<Comment>> {
    let item: Item = serde_json::from_str(body).context("parsing hn comment json")?;
    if item.deleted || item.dead {
        return Ok(None);
    }
    Ok(item
        .text
        .as_deref()
        .and_then(|t| normalize_comment(item.by.clone(), t, None)))
}

fn parse_kids(body: &str) -> Result<Vec<u64>> {
    let item: Item = serde_json::from_str(body).context("parsing hn story json")?;
    Ok(item.kids)
}

pub async fn fetch_stories(cfg: &HackerNewsConfig, http: &dyn HttpFetch) -> Result<Vec<RawItem>> {
    let body = http
        .get_text(&top_stories_url(&cfg.api_url), None)
        .await
        .context("hn topstories")?;
    let ids = parse_top_ids(&body)?;

    let mut out = Vec::new();
    for (i, id) in ids.into_iter().take(cfg.max_stories).enumerate() {
        if i > 0 {
            polite_pause(cfg.item_delay()).await;
        }
        // A single broken item must not sink the whole front page.
        let parsed = match http.get_text(&item_url(&cfg.api_url, id), None).await {
            Ok(body) => parse_story(&body, &cfg.keywords),
            Err(e) => Err(e),
        };
        match parsed {
            Ok(Some(raw)) => out.push(raw),
            Ok(None) => {}
            Err(e) => tracing::debug!(error = ?e, id, "hn item skipped"),
        }
    }
    Ok(out)
}

pub async fn fetch_comments(
    cfg: &HackerNewsConfig,
    http: &dyn HttpFetch,
    story_id: &str,
    fetch_limit: usize,
) -> Result<Vec<Comment>> {
    let id: u64 = story_id
        .parse()
        .with_context(|| format!("hn story id {story_id:?} is not numeric"))?;
    let body = http.get_text(&item_url(&cfg.api_url, id), None).await?;
    let kids = parse_kids(&body)?;

    let mut out = Vec::new();
    for (i, kid) in kids.into_iter().take(fetch_limit).enumerate() {
        if i > 0 {
            polite_pause(cfg.item_delay()).await;
        }
        let parsed = match http.get_text(&item_url(&cfg.api_url, kid), None).await {
            Ok(body) => parse_comment(&body),
            Err(e) => Err(e),
        };
        match parsed {
            Ok(Some(c)) => out.push(c),
            Ok(None) => {}
            Err(e) => tracing::debug!(error = ?e, kid, "hn comment skipped"),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kw() -> Vec<String> {
        vec!["llm".into(), "agent".into()]
    }

    #[test]
    fn story_matching_keyword_is_kept() {
        let body = r#"{"id":42,"type":"story","title":"Show HN: An LLM agent in Rust","url":"https://example.test/a","score":120,"descendants":33,"by":"pg"}"#;
        let raw = parse_story(body, &kw()).unwrap().unwrap();
        assert_eq!(raw.id, "42");
        assert_eq!(raw.score, 120);
        assert_eq!(raw.comments_count, 33);
        assert_eq!(raw.author.as_deref(), Some("pg"));
    }

    #[test]
    fn off_topic_story_is_filtered() {
        let body = r#"{"id":1,"title":"Rust 1.80 released","score":500}"#;
        assert!(parse_story(body, &kw()).unwrap().is_none());
    }

    #[test]
    fn ask_hn_falls_back_to_discussion_url() {
        let body = r#"{"id":7,"title":"Ask HN: agent frameworks?","score":10}"#;
        let raw = parse_story(body, &kw()).unwrap().unwrap();
        assert_eq!(raw.url, "https://news.ycombinator.com/item?id=7");
    }

    #[test]
    fn dead_comment_is_skipped_and_html_is_stripped() {
        let dead = r#"{"id":9,"dead":true,"text":"spam spam spam spam"}"#;
        assert!(parse_comment(dead).unwrap().is_none());
        let live = r#"{"id":10,"by":"ann","text":"It&#x27;s good<p>Really good"}"#;
        let c = parse_comment(live).unwrap().unwrap();
        assert_eq!(c.body, "It's good Really good");
        assert_eq!(c.score, None);
    }

    #[test]
    fn malformed_top_ids_is_an_error() {
        assert!(parse_top_ids("<html>").is_err());
    }
}
