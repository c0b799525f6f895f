// src/ingest/mod.rs
pub mod adapter;
pub mod fetch;
pub mod providers;
pub mod types;

use crate::ingest::types::{Comment, RawItem, SourceTag, Topic};
use metrics::{describe_counter, describe_gauge, describe_histogram};
use once_cell::sync::OnceCell;

pub use adapter::SourceAdapter;
pub use fetch::{HttpFetch, ReqwestFetcher};

/// Title cap (chars) after normalization.
pub const TITLE_MAX_CHARS: usize = 300;
/// Excerpt cap (chars) after normalization.
pub const EXCERPT_MAX_CHARS: usize = 300;
/// Comment body cap (chars).
pub const COMMENT_MAX_CHARS: usize = 500;
/// Comments must be longer than this (chars, after normalization); shorter
/// ones are dropped as noise.
pub const COMMENT_MIN_CHARS: usize = 10;

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "topics_fetched_total",
            "Topics that survived normalization, per source."
        );
        describe_counter!(
            "topics_selected_total",
            "Topics selected into the final set, per source."
        );
        describe_counter!("source_errors_total", "Adapter fetch/parse failures.");
        describe_counter!(
            "comment_fetch_errors_total",
            "Comment fetch failures or timeouts."
        );
        describe_counter!("pipeline_runs_total", "Completed aggregation runs.");
        describe_histogram!("source_fetch_ms", "Adapter fetch time in milliseconds.");
        describe_gauge!(
            "pipeline_last_run_ts",
            "Unix ts when the aggregation pipeline last ran."
        );
    });
}

/// Normalize text: strip HTML, unescape entities, fold quotes, collapse whitespace,
/// cap at `max_chars` characters.
pub fn normalize_text(s: &str, max_chars: usize) -> String {
    // 1) Block-level tags become spaces so paragraphs don't glue together
    static RE_BLOCK: OnceCell<regex::Regex> = OnceCell::new();
    let re_block = RE_BLOCK.get_or_init(|| {
        regex::Regex::new(r"(?i)<\s*/?\s*(p|br|div|li|ul|ol|tr|h[1-6])\b[^>]*>").unwrap()
    });
    let mut out = re_block.replace_all(s, " ").to_string();

    // 2) Strip remaining tags
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    // 3) HTML entity decode
    out = html_escape::decode_html_entities(&out).to_string();

    // 4) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 5) Collapse whitespace
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").trim().to_string();

    // 6) Length cap
    if out.chars().count() > max_chars {
        out = out.chars().take(max_chars).collect::<String>().trim_end().to_string();
    }

    out
}

/// Case-insensitive substring allowlist. An empty allowlist admits everything.
pub fn matches_any_keyword<S: AsRef<str>>(text: &str, keywords: &[S]) -> bool {
    if keywords.is_empty() {
        return true;
    }
    let hay = text.to_lowercase();
    keywords
        .iter()
        .map(|k| k.as_ref().trim().to_lowercase())
        .any(|k| !k.is_empty() && hay.contains(&k))
}

fn non_empty(s: Option<String>, max_chars: usize) -> Option<String> {
    s.map(|v| normalize_text(&v, max_chars))
        .filter(|v| !v.is_empty())
}

/// Validate and normalize one upstream item. Items without a title or URL are
/// dropped (`None`); negative counters clamp to zero. The item's own source
/// wins over the adapter's `source`. Pure: the same input always yields the
/// same Topic.
pub fn normalize_item(raw: RawItem, source: &SourceTag, language_hint: &str) -> Option<Topic> {
    let title = normalize_text(&raw.title, TITLE_MAX_CHARS);
    let url = raw.url.trim().to_string();
    if title.is_empty() || url.is_empty() {
        return None;
    }
    let id = match raw.id.trim() {
        "" => url.clone(),
        id => id.to_string(),
    };
    Some(Topic {
        id,
        source: raw.source.unwrap_or_else(|| source.clone()),
        title,
        url,
        score: raw.score.max(0) as u64,
        comments_count: raw.comments_count.max(0) as u64,
        author: non_empty(raw.author, TITLE_MAX_CHARS),
        excerpt: non_empty(raw.excerpt, EXCERPT_MAX_CHARS),
        language: language_hint.to_string(),
        comments: Vec::new(),
    })
}

/// Normalize a raw comment body; short or empty bodies are dropped.
pub fn normalize_comment(author: Option<String>, body: &str, score: Option<i64>) -> Option<Comment> {
    let body = normalize_text(body, COMMENT_MAX_CHARS);
    if body.chars().count() <= COMMENT_MIN_CHARS {
        return None;
    }
    Some(Comment {
        author: non_empty(author, TITLE_MAX_CHARS),
        body,
        score,
        flagged_interesting: false,
    })
}
