// src/ingest/types.rs
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Origin of a topic. The set of source kinds is closed. Reddit topics carry
/// their subreddit and RSS topics their feed name, so each subreddit and each
/// feed counts as its own source under the diversity cap.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum SourceTag {
    HackerNews,
    Reddit(String),
    Rss(String),
    Twitter,
}

impl SourceTag {
    /// Short kind label used for metrics and logs ("rss" for every feed).
    pub fn kind(&self) -> &'static str {
        match self {
            SourceTag::HackerNews => "hackernews",
            SourceTag::Reddit(_) => "reddit",
            SourceTag::Rss(_) => "rss",
            SourceTag::Twitter => "twitter",
        }
    }
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceTag::Reddit(sub) => write!(f, "reddit:{sub}"),
            SourceTag::Rss(name) => write!(f, "rss:{name}"),
            other => f.write_str(other.kind()),
        }
    }
}

impl FromStr for SourceTag {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let named = |prefix: &str| {
            s.strip_prefix(prefix)
                .filter(|name| !name.trim().is_empty())
                .map(str::to_string)
        };
        match s {
            "hackernews" => Ok(SourceTag::HackerNews),
            "twitter" => Ok(SourceTag::Twitter),
            _ => {
                if let Some(sub) = named("reddit:") {
                    Ok(SourceTag::Reddit(sub))
                } else if let Some(name) = named("rss:") {
                    Ok(SourceTag::Rss(name))
                } else {
                    Err(anyhow!("unknown source tag: {s}"))
                }
            }
        }
    }
}

impl From<SourceTag> for String {
    fn from(tag: SourceTag) -> Self {
        tag.to_string()
    }
}

impl TryFrom<String> for SourceTag {
    type Error = anyhow::Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

/// A single discussion reply attached to a selected topic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Comment {
    pub author: Option<String>,
    pub body: String,
    /// Absent when the upstream exposes no comment score (Hacker News).
    pub score: Option<i64>,
    #[serde(default)]
    pub flagged_interesting: bool,
}

impl Comment {
    /// Score used for ranking; absent counts as zero.
    pub fn rank_score(&self) -> i64 {
        self.score.unwrap_or(0)
    }
}

/// A normalized hot-topic candidate. Field names are the artifact schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Topic {
    pub id: String,
    pub source: SourceTag,
    pub title: String,
    pub url: String,
    pub score: u64,
    pub comments_count: u64,
    pub author: Option<String>,
    pub excerpt: Option<String>,
    pub language: String,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

/// Item as pulled from an upstream payload, before validation.
/// Numeric fields are signed so upstream negatives can be clamped.
#[derive(Debug, Clone, Default)]
pub struct RawItem {
    /// Finer-grained origin than the adapter's own tag (a post's subreddit).
    pub source: Option<SourceTag>,
    pub id: String,
    pub title: String,
    pub url: String,
    pub score: i64,
    pub comments_count: i64,
    pub author: Option<String>,
    pub excerpt: Option<String>,
}
