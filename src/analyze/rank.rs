// src/analyze/rank.rs
//! Cross-source ranking in two stages.
//!
//! 1. Per-source trim: stable sort by score (desc), keep `top_n_per_source`
//!    of each fetched batch.
//! 2. Overall selection: merge the trimmed lists, stable sort by score (desc),
//!    walk greedily and accept a candidate unless its `Topic::source` already
//!    has `max_per_source` accepted topics. Skipped candidates are not
//!    revisited. One batch may hold several sources (a Reddit batch holds one
//!    per subreddit), so the cap is per topic source, not per batch.
//!
//! Scores are compared raw across sources. A 50-point forum post and a
//! 500-point link-aggregator story are ranked as 50 < 500; the only fairness
//! lever is the per-source count cap.
//!
//! Stage 2 also drops cross-source duplicates by URL. Title similarity
//! (`strsim::normalized_levenshtein`) is opt-in via `dedup_titles`: distinct
//! stories often differ by a single digit ("GPT-4" vs "GPT-5"). The
//! higher-ranked copy wins.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strsim::normalized_levenshtein;

use crate::ingest::types::{SourceTag, Topic};

fn default_top_n_per_source() -> usize {
    3
}
fn default_top_n_overall() -> usize {
    3
}
fn default_max_per_source() -> usize {
    2
}
fn default_true() -> bool {
    true
}
fn default_dedup_similarity() -> f32 {
    0.92
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankParams {
    #[serde(default = "default_top_n_per_source")]
    pub top_n_per_source: usize,
    #[serde(default = "default_top_n_overall")]
    pub top_n_overall: usize,
    /// Diversity cap: max selected topics from any single source.
    #[serde(default = "default_max_per_source")]
    pub max_per_source: usize,
    /// Drop candidates whose URL was already accepted.
    #[serde(default = "default_true")]
    pub dedup: bool,
    /// Also drop candidates whose title is near-identical to an accepted one.
    #[serde(default)]
    pub dedup_titles: bool,
    /// Title similarity in [0.0, 1.0] at or above which two topics are duplicates.
    #[serde(default = "default_dedup_similarity")]
    pub dedup_similarity: f32,
}

impl Default for RankParams {
    fn default() -> Self {
        Self {
            top_n_per_source: default_top_n_per_source(),
            top_n_overall: default_top_n_overall(),
            max_per_source: default_max_per_source(),
            dedup: true,
            dedup_titles: false,
            dedup_similarity: default_dedup_similarity(),
        }
    }
}

impl RankParams {
    pub fn new(top_n_per_source: usize, top_n_overall: usize, max_per_source: usize) -> Self {
        Self {
            top_n_per_source,
            top_n_overall,
            max_per_source,
            ..Self::default()
        }
    }

    pub fn sanitized(mut self) -> Self {
        self.top_n_per_source = self.top_n_per_source.max(1);
        self.top_n_overall = self.top_n_overall.max(1);
        self.max_per_source = self.max_per_source.max(1);
        self.dedup_similarity = self.dedup_similarity.clamp(0.0, 1.0);
        self
    }
}

/// One source's fetched topics, as handed to the ranker.
#[derive(Debug, Clone)]
pub struct SourceBatch {
    pub source: SourceTag,
    /// Overrides `RankParams::top_n_per_source` for this source.
    pub top_n: Option<usize>,
    pub topics: Vec<Topic>,
}

impl SourceBatch {
    pub fn new(source: SourceTag, topics: Vec<Topic>) -> Self {
        Self {
            source,
            top_n: None,
            topics,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceCounts {
    pub source: SourceTag,
    pub after_trim: usize,
    pub selected: usize,
}

#[derive(Debug, Clone)]
pub struct Selection {
    pub topics: Vec<Topic>,
    /// In batch order.
    pub counts: Vec<SourceCounts>,
    pub duplicates_dropped: usize,
}

/// Stable: equal scores keep their input order.
pub fn sort_by_score_desc(topics: &mut [Topic]) {
    topics.sort_by(|a, b| b.score.cmp(&a.score));
}

/// Stage 1 for a single source.
pub fn trim_per_source(mut topics: Vec<Topic>, top_n: usize) -> Vec<Topic> {
    sort_by_score_desc(&mut topics);
    topics.truncate(top_n);
    topics
}

fn url_key(url: &str) -> String {
    url.trim().trim_end_matches('/').to_ascii_lowercase()
}

fn is_duplicate(candidate: &Topic, accepted: &[(usize, Topic)], params: &RankParams) -> bool {
    let url = url_key(&candidate.url);
    let title = candidate.title.to_lowercase();
    accepted.iter().any(|(_, t)| {
        (params.dedup && url_key(&t.url) == url)
            || (params.dedup_titles
                && normalized_levenshtein(&title, &t.title.to_lowercase()) as f32
                    >= params.dedup_similarity)
    })
}

/// Stage 2 over `(batch, topic)` pairs; the batch index rides along so
/// callers can count selections per batch.
fn select_pool(
    mut pool: Vec<(usize, Topic)>,
    params: &RankParams,
) -> (Vec<(usize, Topic)>, usize) {
    // Stable: equal scores keep merge order.
    pool.sort_by(|a, b| b.1.score.cmp(&a.1.score));

    let mut accepted: Vec<(usize, Topic)> =
        Vec::with_capacity(params.top_n_overall.min(pool.len()));
    let mut per_source: HashMap<SourceTag, usize> = HashMap::new();
    let mut dupes = 0usize;

    for (batch, cand) in pool {
        if accepted.len() >= params.top_n_overall {
            break;
        }
        if is_duplicate(&cand, &accepted, params) {
            dupes += 1;
            continue;
        }
        let n = per_source.entry(cand.source.clone()).or_insert(0);
        if *n >= params.max_per_source {
            continue;
        }
        *n += 1;
        accepted.push((batch, cand));
    }
    (accepted, dupes)
}

/// Stage 2 over an already-merged pool. Returns the accepted topics and how
/// many candidates were dropped as duplicates.
pub fn select_overall(pool: Vec<Topic>, params: &RankParams) -> (Vec<Topic>, usize) {
    let (accepted, dupes) = select_pool(pool.into_iter().map(|t| (0, t)).collect(), params);
    (accepted.into_iter().map(|(_, t)| t).collect(), dupes)
}

/// Full two-stage selection. Empty batches (failed or empty sources) simply
/// contribute nothing.
pub fn select(batches: Vec<SourceBatch>, params: &RankParams) -> Selection {
    let mut counts = Vec::with_capacity(batches.len());
    let mut pool = Vec::new();
    for (i, b) in batches.into_iter().enumerate() {
        let top_n = b.top_n.unwrap_or(params.top_n_per_source);
        let trimmed = trim_per_source(b.topics, top_n);
        counts.push(SourceCounts {
            source: b.source,
            after_trim: trimmed.len(),
            selected: 0,
        });
        pool.extend(trimmed.into_iter().map(|t| (i, t)));
    }

    let (accepted, duplicates_dropped) = select_pool(pool, params);
    let mut topics = Vec::with_capacity(accepted.len());
    for (i, t) in accepted {
        counts[i].selected += 1;
        topics.push(t);
    }

    Selection {
        topics,
        counts,
        duplicates_dropped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topic(source: SourceTag, id: &str, score: u64) -> Topic {
        Topic {
            id: id.to_string(),
            source,
            title: id.to_string(),
            url: format!("https://example.test/{id}"),
            score,
            comments_count: 0,
            author: None,
            excerpt: None,
            language: "en".into(),
            comments: Vec::new(),
        }
    }

    fn sub(name: &str) -> SourceTag {
        SourceTag::Reddit(name.to_string())
    }

    fn ids(ts: &[Topic]) -> Vec<&str> {
        ts.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn trim_keeps_k_highest_in_desc_order() {
        let ts = vec![
            topic(sub("rust"), "a", 10),
            topic(sub("rust"), "b", 50),
            topic(sub("rust"), "c", 30),
            topic(sub("rust"), "d", 40),
        ];
        let out = trim_per_source(ts, 2);
        assert_eq!(ids(&out), vec!["b", "d"]);
    }

    #[test]
    fn equal_scores_keep_input_order() {
        let ts = vec![
            topic(sub("rust"), "first", 7),
            topic(sub("rust"), "high", 9),
            topic(sub("rust"), "second", 7),
        ];
        let out = trim_per_source(ts, 3);
        assert_eq!(ids(&out), vec!["high", "first", "second"]);
    }

    #[test]
    fn diversity_cap_does_not_promote_capped_sources() {
        let a = SourceTag::HackerNews;
        let b = sub("rust");
        let pool = vec![
            topic(a.clone(), "a100", 100),
            topic(a.clone(), "a90", 90),
            topic(a.clone(), "a80", 80),
            topic(b.clone(), "b70", 70),
        ];
        let params = RankParams::new(10, 3, 1);
        let (out, _) = select_overall(pool, &params);
        assert_eq!(ids(&out), vec!["a100", "b70"]);
    }

    #[test]
    fn each_subreddit_has_its_own_cap() {
        let batch_tag = sub("a+b");
        let reddit = SourceBatch::new(
            batch_tag,
            vec![
                topic(sub("a"), "a1", 900),
                topic(sub("a"), "a2", 800),
                topic(sub("b"), "b1", 700),
            ],
        );
        let wire = SourceTag::Rss("Tech Wire".into());
        let feed = SourceBatch::new(wire.clone(), vec![topic(wire, "wire-1", 100)]);

        let mut params = RankParams::new(3, 3, 2);
        params.dedup = false;
        let sel = select(vec![reddit, feed], &params);
        assert_eq!(ids(&sel.topics), vec!["a1", "a2", "b1"]);
        // counts stay per fetched batch
        assert_eq!(sel.counts[0].after_trim, 3);
        assert_eq!(sel.counts[0].selected, 3);
        assert_eq!(sel.counts[1].selected, 0);
    }

    #[test]
    fn fewer_candidates_than_requested_returns_all() {
        let batches = vec![
            SourceBatch::new(SourceTag::HackerNews, vec![topic(SourceTag::HackerNews, "x", 1)]),
            SourceBatch::new(SourceTag::Twitter, Vec::new()),
        ];
        let sel = select(batches, &RankParams::new(3, 5, 2));
        assert_eq!(ids(&sel.topics), vec!["x"]);
        assert_eq!(sel.counts[1].after_trim, 0);
        assert_eq!(sel.counts[1].selected, 0);
    }

    #[test]
    fn per_source_override_and_counts() {
        let rss = SourceTag::Rss("feed".into());
        let mut feed = SourceBatch::new(
            rss.clone(),
            vec![
                topic(rss.clone(), "r1", 100),
                topic(rss.clone(), "r2", 100),
                topic(rss.clone(), "r3", 100),
            ],
        );
        feed.top_n = Some(1);
        let hn = SourceBatch::new(
            SourceTag::HackerNews,
            vec![
                topic(SourceTag::HackerNews, "h1", 300),
                topic(SourceTag::HackerNews, "h2", 20),
            ],
        );
        let sel = select(vec![hn, feed], &RankParams::new(3, 3, 2));
        assert_eq!(ids(&sel.topics), vec!["h1", "r1", "h2"]);
        assert_eq!(sel.counts[0].after_trim, 2);
        assert_eq!(sel.counts[0].selected, 2);
        assert_eq!(sel.counts[1].after_trim, 1);
        assert_eq!(sel.counts[1].selected, 1);
    }

    #[test]
    fn same_url_across_sources_keeps_the_higher_copy() {
        let mut hn = topic(SourceTag::HackerNews, "hn", 500);
        hn.url = "https://example.test/story".into();
        let mut tw = topic(SourceTag::Twitter, "tw", 200);
        tw.url = "https://Example.test/story/".into();
        let other = topic(sub("rust"), "other", 100);

        let (out, dupes) = select_overall(vec![tw, hn, other], &RankParams::new(3, 3, 2));
        assert_eq!(ids(&out), vec!["hn", "other"]);
        assert_eq!(dupes, 1);
    }

    #[test]
    fn near_identical_titles_are_distinct_by_default() {
        let mut five = topic(SourceTag::HackerNews, "h", 500);
        five.title = "OpenAI releases GPT-5 model for developers today".into();
        let mut four = topic(sub("artificial"), "r", 400);
        four.title = "OpenAI releases GPT-4 model for developers today".into();
        let mut s1 = topic(SourceTag::Rss("Firehose".into()), "w", 300);
        s1.title = "Firehose story 1".into();
        let mut s2 = topic(SourceTag::Twitter, "t", 200);
        s2.title = "Firehose story 2".into();

        let (out, dupes) = select_overall(vec![five, four, s1, s2], &RankParams::new(3, 4, 2));
        assert_eq!(ids(&out), vec!["h", "r", "w", "t"]);
        assert_eq!(dupes, 0);
    }

    #[test]
    fn title_dedup_is_opt_in() {
        let mut hn = topic(SourceTag::HackerNews, "hn", 500);
        hn.title = "OpenAI releases a new reasoning model".into();
        let mut rd = topic(sub("artificial"), "rd", 300);
        rd.title = "OpenAI releases a new reasoning model!".into();
        let other = topic(sub("rust"), "other", 100);
        let pool = vec![rd, hn, other];

        let (out, _) = select_overall(pool.clone(), &RankParams::new(3, 3, 2));
        assert_eq!(ids(&out), vec!["hn", "rd", "other"]);

        let mut params = RankParams::new(3, 3, 2);
        params.dedup_titles = true;
        let (out, dupes) = select_overall(pool, &params);
        assert_eq!(ids(&out), vec!["hn", "other"]);
        assert_eq!(dupes, 1);
    }

    #[test]
    fn dedup_can_be_disabled() {
        let a = topic(SourceTag::HackerNews, "a", 2);
        let mut b = topic(sub("rust"), "b", 1);
        b.url = a.url.clone();
        let mut params = RankParams::new(3, 3, 2);
        params.dedup = false;
        let (out, dupes) = select_overall(vec![a, b], &params);
        assert_eq!(out.len(), 2);
        assert_eq!(dupes, 0);
    }
}
