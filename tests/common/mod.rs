// tests/common/mod.rs
#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use hot_topics::analyze::curate::CommentCurator;
use hot_topics::config::{AppConfig, RssFeedConfig};
use hot_topics::ingest::fetch::HttpFetch;
use hot_topics::ingest::types::{Comment, Topic};

pub const HN_API: &str = "https://hn.test/v0";
pub const REDDIT_BASE: &str = "https://reddit.test";
pub const REDDIT_HOT_URL: &str = "https://reddit.test/r/rust/hot.json?limit=5&t=day";
pub const TECH_FEED_URL: &str = "https://wire.example/feed.xml";

pub fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("fixture {}: {e}", path.display()))
}

/// URL-keyed canned responses. Unknown URLs fail like an upstream 503.
#[derive(Default)]
pub struct MockHttp {
    pages: HashMap<String, String>,
    slow: HashMap<String, Duration>,
    calls: Mutex<Vec<String>>,
}

impl MockHttp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: &str, body: impl Into<String>) -> Self {
        self.pages.insert(url.to_string(), body.into());
        self
    }

    pub fn with_fixture(self, url: &str, name: &str) -> Self {
        let body = fixture(name);
        self.with(url, body)
    }

    /// Delay the response for `url` (use with paused tokio time).
    pub fn slow(mut self, url: &str, delay: Duration) -> Self {
        self.slow.insert(url.to_string(), delay);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpFetch for MockHttp {
    async fn get_text(&self, url: &str, _bearer: Option<&str>) -> Result<String> {
        self.calls.lock().unwrap().push(url.to_string());
        if let Some(d) = self.slow.get(url) {
            tokio::time::sleep(*d).await;
        }
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow!("GET {url}: upstream returned 503"))
    }
}

/// Records every topic it is asked to curate.
#[derive(Default)]
pub struct CountingCurator {
    pub seen: Mutex<Vec<String>>,
    delay: Option<Duration>,
}

impl CountingCurator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            seen: Mutex::new(vec![]),
            delay: Some(delay),
        }
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommentCurator for CountingCurator {
    async fn curate(&self, topic: &Topic) -> Vec<Comment> {
        self.seen.lock().unwrap().push(topic.id.clone());
        if let Some(d) = self.delay {
            tokio::time::sleep(d).await;
        }
        vec![Comment {
            author: Some("tester".into()),
            body: format!("comment on {}", topic.id),
            score: Some(1),
            flagged_interesting: false,
        }]
    }
}

pub fn tech_feed(language: Option<&str>) -> RssFeedConfig {
    RssFeedConfig {
        enabled: true,
        name: "Tech Wire".into(),
        url: TECH_FEED_URL.into(),
        limit: 10,
        language: language.map(str::to_string),
        top_n: None,
    }
}

/// Every source off, test hosts, no politeness delays.
pub fn base_config() -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.sources.polite_delay_ms = 0;
    cfg.sources.hackernews.enabled = false;
    cfg.sources.hackernews.api_url = HN_API.into();
    cfg.sources.hackernews.item_delay_ms = 0;
    cfg.sources.reddit.enabled = false;
    cfg.sources.reddit.base_url = REDDIT_BASE.into();
    cfg.sources.reddit.subreddits = vec!["rust".into()];
    cfg.sources.rss = vec![];
    cfg.sources.twitter.enabled = false;
    cfg
}

/// Canned responses for the HN, Reddit and Tech Wire fixtures.
pub fn fixture_http() -> MockHttp {
    MockHttp::new()
        .with_fixture(&format!("{HN_API}/topstories.json"), "hn_topstories.json")
        .with_fixture(&format!("{HN_API}/item/101.json"), "hn_item_101.json")
        .with_fixture(&format!("{HN_API}/item/102.json"), "hn_item_102.json")
        .with_fixture(&format!("{HN_API}/item/103.json"), "hn_item_103.json")
        .with_fixture(&format!("{HN_API}/item/1011.json"), "hn_item_1011.json")
        .with_fixture(&format!("{HN_API}/item/1012.json"), "hn_item_1012.json")
        .with_fixture(&format!("{HN_API}/item/1013.json"), "hn_item_1013.json")
        .with_fixture(REDDIT_HOT_URL, "reddit_hot.json")
        .with_fixture(
            "https://reddit.test/comments/p1.json?limit=30",
            "reddit_comments_p1.json",
        )
        .with_fixture(TECH_FEED_URL, "tech_rss.xml")
}

pub fn ids(topics: &[Topic]) -> Vec<&str> {
    topics.iter().map(|t| t.id.as_str()).collect()
}
