// src/ingest/providers/twitter.rs
//! Social search via the Twitter/X v2 recent-search endpoint.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

use crate::config::TwitterConfig;
use crate::ingest::fetch::{polite_pause, HttpFetch};
use crate::ingest::types::RawItem;

const TITLE_CHARS: usize = 100;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<Tweet>,
}

#[derive(Debug, Deserialize)]
struct Tweet {
    id: String,
    text: String,
    #[serde(default)]
    author_id: Option<String>,
    #[serde(default)]
    public_metrics: Metrics,
}

#[derive(Debug, Default, Deserialize)]
struct Metrics {
    #[serde(default)]
    like_count: i64,
    #[serde(default)]
    retweet_count: i64,
    #[serde(default)]
    reply_count: i64,
}

/// The API only accepts 10..=100 results per page.
pub fn search_url(api_url: &str, query: &str, max_results: usize) -> Result<String> {
    let base = format!("{}/tweets/search/recent", api_url.trim_end_matches('/'));
    let max = max_results.clamp(10, 100).to_string();
    let url = reqwest::Url::parse_with_params(
        &base,
        &[
            ("query", query),
            ("max_results", max.as_str()),
            ("tweet.fields", "public_metrics,author_id,created_at"),
        ],
    )
    .with_context(|| format!("building twitter search url from {base}"))?;
    Ok(url.into())
}

pub fn tweet_url(id: &str) -> String {
    format!("https://twitter.com/i/web/status/{id}")
}

fn headline(text: &str) -> String {
    if text.chars().count() > TITLE_CHARS {
        let cut: String = text.chars().take(TITLE_CHARS).collect();
        format!("{}...", cut.trim_end())
    } else {
        text.to_string()
    }
}

/// Score = likes + 2 × retweets.
pub fn parse_search(body: &str) -> Result<Vec<RawItem>> {
    let resp: SearchResponse = serde_json::from_str(body).context("parsing twitter search json")?;
    Ok(resp
        .data
        .into_iter()
        .map(|t| RawItem {
            url: tweet_url(&t.id),
            title: headline(&t.text),
            score: t.public_metrics.like_count + 2 * t.public_metrics.retweet_count,
            comments_count: t.public_metrics.reply_count,
            author: t.author_id,
            excerpt: Some(t.text),
            id: t.id,
            source: None,
        })
        .collect())
}

pub fn bearer_token(cfg: &TwitterConfig) -> Result<String> {
    std::env::var(&cfg.bearer_token_env)
        .ok()
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| anyhow!("missing twitter bearer token in ${}", cfg.bearer_token_env))
}

pub async fn fetch_tweets(
    cfg: &TwitterConfig,
    http: &dyn HttpFetch,
    polite_delay: std::time::Duration,
) -> Result<Vec<RawItem>> {
    let token = bearer_token(cfg)?;
    let mut out = Vec::new();
    for (i, query) in cfg.search_queries.iter().enumerate() {
        if i > 0 {
            polite_pause(polite_delay).await;
        }
        let url = search_url(&cfg.api_url, query, cfg.max_tweets_per_query)?;
        let body = http
            .get_text(&url, Some(&token))
            .await
            .with_context(|| format!("twitter search {query:?}"))?;
        out.extend(
            parse_search(&body)?
                .into_iter()
                .take(cfg.max_tweets_per_query),
        );
    }
    Ok(out)
}
