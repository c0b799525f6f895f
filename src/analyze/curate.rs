// src/analyze/curate.rs
//! Comment curation for selected topics.
//!
//! Comments are ranked by score (desc, absent = 0) with a stable sort so
//! ties keep fetch order, cut to `limit`, then flagged "interesting" when the
//! score exceeds `score_threshold` or the body contains one of `markers`
//! (case-insensitive). Fetch failures yield an empty list, never an error.

use async_trait::async_trait;
use metrics::counter;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::{HackerNewsConfig, RedditConfig};
use crate::ingest::fetch::HttpFetch;
use crate::ingest::providers::{hackernews, reddit};
use crate::ingest::types::{Comment, SourceTag, Topic};

fn default_true() -> bool {
    true
}
fn default_limit() -> usize {
    5
}
fn default_fetch_limit() -> usize {
    30
}
fn default_score_threshold() -> i64 {
    100
}
fn default_markers() -> Vec<String> {
    ["lol", "lmao", "haha", "😂", "🤣", "underrated", "hot take"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurationParams {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Size of the highlighted subset per topic.
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// How many raw comments are requested upstream.
    #[serde(default = "default_fetch_limit")]
    pub fetch_limit: usize,
    #[serde(default = "default_score_threshold")]
    pub score_threshold: i64,
    #[serde(default = "default_markers")]
    pub markers: Vec<String>,
}

impl Default for CurationParams {
    fn default() -> Self {
        Self {
            enabled: true,
            limit: default_limit(),
            fetch_limit: default_fetch_limit(),
            score_threshold: default_score_threshold(),
            markers: default_markers(),
        }
    }
}

impl CurationParams {
    pub fn sanitized(mut self) -> Self {
        self.fetch_limit = self.fetch_limit.max(self.limit);
        self.markers = self
            .markers
            .into_iter()
            .map(|m| m.trim().to_lowercase())
            .filter(|m| !m.is_empty())
            .collect();
        self
    }
}

pub fn is_interesting(c: &Comment, params: &CurationParams) -> bool {
    if c.rank_score() > params.score_threshold {
        return true;
    }
    let body = c.body.to_lowercase();
    params
        .markers
        .iter()
        .any(|m| !m.is_empty() && body.contains(&m.to_lowercase()))
}

/// Rank, cut and flag. Pure; the same input always gives the same output.
pub fn rank_and_flag(mut comments: Vec<Comment>, params: &CurationParams) -> Vec<Comment> {
    comments.sort_by(|a, b| b.rank_score().cmp(&a.rank_score()));
    comments.truncate(params.limit);
    for c in comments.iter_mut() {
        c.flagged_interesting = is_interesting(c, params);
    }
    comments
}

/// Produces the highlighted comments of one topic.
#[async_trait]
pub trait CommentCurator: Send + Sync {
    async fn curate(&self, topic: &Topic) -> Vec<Comment>;
}

/// Fetches comments through the source's own API.
pub struct HttpCurator {
    http: Arc<dyn HttpFetch>,
    params: CurationParams,
    hackernews: HackerNewsConfig,
    reddit: RedditConfig,
}

impl HttpCurator {
    pub fn new(
        http: Arc<dyn HttpFetch>,
        params: CurationParams,
        hackernews: HackerNewsConfig,
        reddit: RedditConfig,
    ) -> Self {
        Self {
            http,
            params,
            hackernews,
            reddit,
        }
    }
}

#[async_trait]
impl CommentCurator for HttpCurator {
    async fn curate(&self, topic: &Topic) -> Vec<Comment> {
        let http = self.http.as_ref();
        let fetched = match &topic.source {
            SourceTag::Reddit(_) => {
                reddit::fetch_comments(&self.reddit, http, &topic.id, self.params.fetch_limit).await
            }
            SourceTag::HackerNews => {
                hackernews::fetch_comments(&self.hackernews, http, &topic.id, self.params.fetch_limit)
                    .await
            }
            // Feeds and tweets expose no discussion thread.
            SourceTag::Rss(_) | SourceTag::Twitter => return Vec::new(),
        };
        match fetched {
            Ok(raw) => rank_and_flag(raw, &self.params),
            Err(e) => {
                tracing::warn!(error = ?e, source = %topic.source, id = %topic.id, "comment fetch failed");
                counter!("comment_fetch_errors_total").increment(1);
                Vec::new()
            }
        }
    }
}
