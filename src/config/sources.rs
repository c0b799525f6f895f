// src/config/sources.rs
//! Per-source settings. Every field has a serde default so a partial TOML
//! file only needs to mention what it changes.

use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_true() -> bool {
    true
}
fn default_timeout_s() -> u64 {
    15
}
fn default_source_timeout_s() -> u64 {
    90
}
fn default_comment_timeout_s() -> u64 {
    30
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (compatible; hot-topics/0.1)".to_string()
}
fn default_polite_delay_ms() -> u64 {
    1_000
}
fn default_language() -> String {
    "en".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Per-request HTTP timeout.
    #[serde(default = "default_timeout_s")]
    pub timeout_s: u64,
    /// Budget for one adapter's whole fetch (all its requests).
    #[serde(default = "default_source_timeout_s")]
    pub source_timeout_s: u64,
    /// Budget for one topic's comment curation.
    #[serde(default = "default_comment_timeout_s")]
    pub comment_timeout_s: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Pause between successive requests of one adapter (subreddits, queries).
    #[serde(default = "default_polite_delay_ms")]
    pub polite_delay_ms: u64,
    /// Language tag assumed for sources without their own hint.
    #[serde(default = "default_language")]
    pub default_language: String,
    #[serde(default)]
    pub hackernews: HackerNewsConfig,
    #[serde(default)]
    pub reddit: RedditConfig,
    #[serde(default = "default_rss_feeds")]
    pub rss: Vec<RssFeedConfig>,
    #[serde(default)]
    pub twitter: TwitterConfig,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            timeout_s: default_timeout_s(),
            source_timeout_s: default_source_timeout_s(),
            comment_timeout_s: default_comment_timeout_s(),
            user_agent: default_user_agent(),
            polite_delay_ms: default_polite_delay_ms(),
            default_language: default_language(),
            hackernews: HackerNewsConfig::default(),
            reddit: RedditConfig::default(),
            rss: default_rss_feeds(),
            twitter: TwitterConfig::default(),
        }
    }
}

impl SourcesConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_s)
    }
    pub fn source_timeout(&self) -> Duration {
        Duration::from_secs(self.source_timeout_s)
    }
    pub fn comment_timeout(&self) -> Duration {
        Duration::from_secs(self.comment_timeout_s)
    }
    pub fn polite_delay(&self) -> Duration {
        Duration::from_millis(self.polite_delay_ms)
    }
}

fn default_hn_api_url() -> String {
    "https://hacker-news.firebaseio.com/v0".to_string()
}
fn default_hn_max_stories() -> usize {
    30
}
fn default_hn_item_delay_ms() -> u64 {
    100
}
fn default_hn_keywords() -> Vec<String> {
    [
        "ai",
        "agent",
        "llm",
        "gpt",
        "artificial intelligence",
        "machine learning",
        "ml",
        "neural",
        "chatbot",
        "claude",
        "openai",
        "anthropic",
        "deepmind",
        "langchain",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Link aggregator. The only source that needs a keyword allowlist: its
/// front page is not inherently on-topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HackerNewsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_hn_api_url")]
    pub api_url: String,
    /// How many front-page ids are inspected.
    #[serde(default = "default_hn_max_stories")]
    pub max_stories: usize,
    /// Pause between per-item requests.
    #[serde(default = "default_hn_item_delay_ms")]
    pub item_delay_ms: u64,
    #[serde(default = "default_hn_keywords")]
    pub keywords: Vec<String>,
}

impl Default for HackerNewsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_url: default_hn_api_url(),
            max_stories: default_hn_max_stories(),
            item_delay_ms: default_hn_item_delay_ms(),
            keywords: default_hn_keywords(),
        }
    }
}

impl HackerNewsConfig {
    pub fn item_delay(&self) -> Duration {
        Duration::from_millis(self.item_delay_ms)
    }
}

fn default_reddit_base_url() -> String {
    "https://www.reddit.com".to_string()
}
fn default_subreddits() -> Vec<String> {
    vec!["artificial".to_string(), "MachineLearning".to_string()]
}
fn default_limit_per_subreddit() -> usize {
    5
}
fn default_time_filter() -> String {
    "day".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_reddit_base_url")]
    pub base_url: String,
    #[serde(default = "default_subreddits")]
    pub subreddits: Vec<String>,
    #[serde(default = "default_limit_per_subreddit")]
    pub limit_per_subreddit: usize,
    /// hour | day | week | month | year | all
    #[serde(default = "default_time_filter")]
    pub time_filter: String,
}

impl Default for RedditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_reddit_base_url(),
            subreddits: default_subreddits(),
            limit_per_subreddit: default_limit_per_subreddit(),
            time_filter: default_time_filter(),
        }
    }
}

fn default_rss_limit() -> usize {
    10
}

fn default_rss_feeds() -> Vec<RssFeedConfig> {
    vec![RssFeedConfig {
        enabled: true,
        name: "China News".to_string(),
        url: "https://www.chinanews.com/rss/".to_string(),
        limit: default_rss_limit(),
        language: Some("zh".to_string()),
        top_n: None,
    }]
}

/// One RSS feed = one source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RssFeedConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub name: String,
    pub url: String,
    #[serde(default = "default_rss_limit")]
    pub limit: usize,
    /// Language of the feed's items, trusted over text detection.
    #[serde(default)]
    pub language: Option<String>,
    /// Overrides `ranking.top_n_per_source` for this feed.
    #[serde(default)]
    pub top_n: Option<usize>,
}

fn default_twitter_api_url() -> String {
    "https://api.twitter.com/2".to_string()
}
fn default_search_queries() -> Vec<String> {
    vec!["AI agents".to_string(), "LLM agents".to_string()]
}
fn default_max_tweets() -> usize {
    10
}
fn default_bearer_env() -> String {
    "TWITTER_BEARER_TOKEN".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwitterConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_twitter_api_url")]
    pub api_url: String,
    #[serde(default = "default_search_queries")]
    pub search_queries: Vec<String>,
    #[serde(default = "default_max_tweets")]
    pub max_tweets_per_query: usize,
    /// Name of the env var holding the bearer token (never the token itself).
    #[serde(default = "default_bearer_env")]
    pub bearer_token_env: String,
}

impl Default for TwitterConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_url: default_twitter_api_url(),
            search_queries: default_search_queries(),
            max_tweets_per_query: default_max_tweets(),
            bearer_token_env: default_bearer_env(),
        }
    }
}
