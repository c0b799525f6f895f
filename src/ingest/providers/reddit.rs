// src/ingest/providers/reddit.rs
//! Reddit via the public `.json` listing endpoints.

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;

use crate::config::RedditConfig;
use crate::ingest::fetch::{polite_pause, HttpFetch};
use crate::ingest::normalize_comment;
use crate::ingest::types::{Comment, RawItem, SourceTag};

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Thing>,
}

#[derive(Debug, Deserialize)]
struct Thing {
    kind: String,
    data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct Post {
    #[serde(default)]
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    permalink: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    num_comments: i64,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    selftext: Option<String>,
    #[serde(default)]
    stickied: bool,
}

#[derive(Debug, Deserialize)]
struct RedditComment {
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    score: Option<i64>,
}

/// Hot listing for one subreddit.
pub fn hot_url(base_url: &str, subreddit: &str, limit: usize, time_filter: &str) -> String {
    format!(
        "{}/r/{subreddit}/hot.json?limit={limit}&t={time_filter}",
        base_url.trim_end_matches('/')
    )
}

/// Comment listing for a post, addressed by id on the Reddit host so a link
/// post never sends the request to the linked site.
pub fn comments_url(base_url: &str, post_id: &str, fetch_limit: usize) -> String {
    format!(
        "{}/comments/{post_id}.json?limit={fetch_limit}",
        base_url.trim_end_matches('/')
    )
}

/// Parse one subreddit's hot listing. Stickied (moderator pinned) posts are
/// skipped. Every item is tagged with `subreddit`.
pub fn parse_listing(base_url: &str, subreddit: &str, body: &str) -> Result<Vec<RawItem>> {
    let listing: Listing = serde_json::from_str(body).context("parsing reddit listing json")?;
    let mut out = Vec::with_capacity(listing.data.children.len());
    for thing in listing.data.children {
        if thing.kind != "t3" {
            continue;
        }
        let post: Post = match serde_json::from_value(thing.data) {
            Ok(p) => p,
            Err(e) => {
                tracing::debug!(error = ?e, "reddit post skipped");
                continue;
            }
        };
        if post.stickied {
            continue;
        }
        let url = match post.permalink.as_deref().filter(|p| !p.is_empty()) {
            Some(permalink) => format!("{}{permalink}", base_url.trim_end_matches('/')),
            None => post.url.unwrap_or_default(),
        };
        out.push(RawItem {
            id: post.id,
            title: post.title,
            url,
            score: post.score,
            comments_count: post.num_comments,
            author: post.author,
            excerpt: post.selftext,
            source: Some(SourceTag::Reddit(subreddit.to_string())),
        });
    }
    Ok(out)
}

/// Parse a post's comment page: `[post_listing, comment_listing]`.
pub fn parse_comments(body: &str, fetch_limit: usize) -> Result<Vec<Comment>> {
    let listings: Vec<Listing> =
        serde_json::from_str(body).context("parsing reddit comments json")?;
    let comments = listings
        .into_iter()
        .nth(1)
        .ok_or_else(|| anyhow!("reddit comments payload has no comment listing"))?;

    Ok(comments
        .data
        .children
        .into_iter()
        .take(fetch_limit)
        .filter(|t| t.kind == "t1")
        .filter_map(|t| serde_json::from_value::<RedditComment>(t.data).ok())
        .filter_map(|c| normalize_comment(c.author, c.body.as_deref().unwrap_or_default(), c.score))
        .collect())
}

/// Fetch every configured subreddit, pausing politely between them. A failing
/// subreddit is logged and skipped; the adapter fails only when all do.
pub async fn fetch_posts(
    cfg: &RedditConfig,
    http: &dyn HttpFetch,
    polite_delay: std::time::Duration,
) -> Result<Vec<RawItem>> {
    let mut out = Vec::new();
    let mut last_err = None;
    let mut any_ok = false;
    for (i, sub) in cfg.subreddits.iter().enumerate() {
        if i > 0 {
            polite_pause(polite_delay).await;
        }
        let url = hot_url(&cfg.base_url, sub, cfg.limit_per_subreddit, &cfg.time_filter);
        let parsed = match http.get_text(&url, None).await {
            Ok(body) => parse_listing(&cfg.base_url, sub, &body),
            Err(e) => Err(e),
        };
        match parsed {
            Ok(items) => {
                any_ok = true;
                out.extend(items.into_iter().take(cfg.limit_per_subreddit));
            }
            Err(e) => {
                tracing::warn!(error = ?e, subreddit = %sub, "subreddit fetch failed");
                last_err = Some(e.context(format!("r/{sub}")));
            }
        }
    }
    match (any_ok, last_err) {
        (false, Some(e)) => Err(e),
        _ => Ok(out),
    }
}

pub async fn fetch_comments(
    cfg: &RedditConfig,
    http: &dyn HttpFetch,
    post_id: &str,
    fetch_limit: usize,
) -> Result<Vec<Comment>> {
    // Ids fall back to the URL when a post had none; that is not addressable.
    if post_id.is_empty() || post_id.contains('/') {
        bail!("reddit post has no id to fetch comments for: {post_id}");
    }
    let url = comments_url(&cfg.base_url, post_id, fetch_limit);
    let body = http.get_text(&url, None).await?;
    parse_comments(&body, fetch_limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"{"kind":"Listing","data":{"children":[
        {"kind":"t3","data":{"id":"p0","title":"Weekly thread","permalink":"/r/ml/comments/p0/","score":5,"stickied":true}},
        {"kind":"t3","data":{"id":"p1","title":"New model beats baseline","permalink":"/r/ml/comments/p1/x/","url":"https://arxiv.org/abs/1","score":321,"num_comments":45,"author":"alice","selftext":"**Bold** claim &amp; more"}},
        {"kind":"t3","data":{"id":"p2","title":"Downvoted take","permalink":"/r/ml/comments/p2/y/","score":-3,"num_comments":2}}
    ]}}"#;

    #[test]
    fn listing_skips_stickied_and_uses_permalink() {
        let items = parse_listing("https://www.reddit.com", "ml", LISTING).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, "p1");
        assert_eq!(items[0].url, "https://www.reddit.com/r/ml/comments/p1/x/");
        assert_eq!(items[0].source, Some(SourceTag::Reddit("ml".into())));
        assert_eq!(items[0].score, 321);
        assert_eq!(items[1].score, -3);
    }

    #[test]
    fn comments_come_from_second_listing() {
        let body = r#"[
            {"kind":"Listing","data":{"children":[]}},
            {"kind":"Listing","data":{"children":[
                {"kind":"t1","data":{"author":"a","body":"This is a thoughtful reply","score":12}},
                {"kind":"t1","data":{"author":"b","body":"ok","score":99}},
                {"kind":"more","data":{"count":10,"children":["x"]}}
            ]}}
        ]"#;
        let cs = parse_comments(body, 30).unwrap();
        assert_eq!(cs.len(), 1);
        assert_eq!(cs[0].author.as_deref(), Some("a"));
        assert_eq!(cs[0].score, Some(12));
    }

    #[test]
    fn urls_are_built_from_config() {
        assert_eq!(
            hot_url("https://www.reddit.com/", "rust", 5, "day"),
            "https://www.reddit.com/r/rust/hot.json?limit=5&t=day"
        );
        assert_eq!(
            comments_url("https://www.reddit.com/", "p1", 30),
            "https://www.reddit.com/comments/p1.json?limit=30"
        );
    }

    #[test]
    fn link_post_without_permalink_keeps_comments_on_reddit() {
        let body = r#"{"kind":"Listing","data":{"children":[
            {"kind":"t3","data":{"id":"q9","title":"Paper drop","url":"https://arxiv.org/abs/9","score":10}}
        ]}}"#;
        let items = parse_listing("https://www.reddit.com", "ml", body).unwrap();
        assert_eq!(items[0].url, "https://arxiv.org/abs/9");
        assert_eq!(
            comments_url("https://www.reddit.com", &items[0].id, 30),
            "https://www.reddit.com/comments/q9.json?limit=30"
        );
    }
}
