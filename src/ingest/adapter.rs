// src/ingest/adapter.rs
//! Source adapters: one closed variant per source kind.
//!
//! `fetch` returns normalized topics or an error; the pipeline turns an error
//! into "zero topics from this source" and keeps going.

use anyhow::Result;
use metrics::{counter, histogram};
use std::time::{Duration, Instant};

use crate::config::{HackerNewsConfig, RedditConfig, RssFeedConfig, SourcesConfig, TwitterConfig};
use crate::ingest::fetch::HttpFetch;
use crate::ingest::normalize_item;
use crate::ingest::providers::{hackernews, reddit, rss, twitter};
use crate::ingest::types::{RawItem, SourceTag, Topic};

#[derive(Debug, Clone)]
pub enum SourceAdapter {
    HackerNews(HackerNewsConfig),
    Reddit(RedditConfig),
    Rss(RssFeedConfig),
    Twitter(TwitterConfig),
}

impl SourceAdapter {
    /// Enabled adapters in fixed order: HN, Reddit, RSS feeds as listed, Twitter.
    pub fn from_config(cfg: &SourcesConfig) -> Vec<SourceAdapter> {
        let mut out = Vec::new();
        if cfg.hackernews.enabled {
            out.push(SourceAdapter::HackerNews(cfg.hackernews.clone()));
        }
        if cfg.reddit.enabled && !cfg.reddit.subreddits.is_empty() {
            out.push(SourceAdapter::Reddit(cfg.reddit.clone()));
        }
        out.extend(
            cfg.rss
                .iter()
                .filter(|f| f.enabled)
                .cloned()
                .map(SourceAdapter::Rss),
        );
        if cfg.twitter.enabled && !cfg.twitter.search_queries.is_empty() {
            out.push(SourceAdapter::Twitter(cfg.twitter.clone()));
        }
        out
    }

    /// Adapter-level tag. For Reddit this names every configured subreddit in
    /// multireddit form (`reddit:a+b`); its topics carry their own subreddit.
    pub fn tag(&self) -> SourceTag {
        match self {
            SourceAdapter::HackerNews(_) => SourceTag::HackerNews,
            SourceAdapter::Reddit(cfg) => SourceTag::Reddit(cfg.subreddits.join("+")),
            SourceAdapter::Rss(f) => SourceTag::Rss(f.name.clone()),
            SourceAdapter::Twitter(_) => SourceTag::Twitter,
        }
    }

    /// Source-level language; only RSS feeds declare their own.
    pub fn language_hint<'a>(&'a self, default: &'a str) -> &'a str {
        match self {
            SourceAdapter::Rss(f) => f.language.as_deref().unwrap_or(default),
            _ => default,
        }
    }

    /// Per-source override of `top_n_per_source`.
    pub fn top_n_override(&self) -> Option<usize> {
        match self {
            SourceAdapter::Rss(f) => f.top_n,
            _ => None,
        }
    }

    async fn fetch_raw(&self, http: &dyn HttpFetch, polite_delay: Duration) -> Result<Vec<RawItem>> {
        match self {
            SourceAdapter::HackerNews(cfg) => hackernews::fetch_stories(cfg, http).await,
            SourceAdapter::Reddit(cfg) => reddit::fetch_posts(cfg, http, polite_delay).await,
            SourceAdapter::Rss(cfg) => rss::fetch_feed(cfg, http).await,
            SourceAdapter::Twitter(cfg) => twitter::fetch_tweets(cfg, http, polite_delay).await,
        }
    }

    /// Fetch and normalize. Items missing a title or URL are dropped silently.
    pub async fn fetch(
        &self,
        http: &dyn HttpFetch,
        polite_delay: Duration,
        default_language: &str,
    ) -> Result<Vec<Topic>> {
        let t0 = Instant::now();
        let tag = self.tag();
        let hint = self.language_hint(default_language);

        let raw = self.fetch_raw(http, polite_delay).await?;
        let raw_len = raw.len();
        let topics: Vec<Topic> = raw
            .into_iter()
            .filter_map(|r| normalize_item(r, &tag, hint))
            .collect();

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("source_fetch_ms", "source" => tag.kind()).record(ms);
        counter!("topics_fetched_total", "source" => tag.kind()).increment(topics.len() as u64);
        if topics.len() < raw_len {
            tracing::debug!(
                source = %tag,
                dropped = raw_len - topics.len(),
                "items dropped during normalization"
            );
        }
        Ok(topics)
    }
}
