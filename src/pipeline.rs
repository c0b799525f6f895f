// src/pipeline.rs
//! Aggregation run: fetch every enabled source, rank, curate comments for the
//! selected topics only, persist the artifact.
//!
//! Strictly two-phase: curation never starts before final selection, so a run
//! makes at most `top_n_overall` curation calls however many items were fetched.

use chrono::NaiveDate;
use futures::future::join_all;
use metrics::{counter, gauge};
use serde::Serialize;
use std::sync::Arc;

use crate::analyze::curate::{CommentCurator, HttpCurator};
use crate::analyze::language::classify;
use crate::analyze::rank::{select, SourceBatch};
use crate::artifact::{write_artifact, ArtifactPaths};
use crate::config::AppConfig;
use crate::ingest::adapter::SourceAdapter;
use crate::ingest::ensure_metrics_described;
use crate::ingest::fetch::{HttpFetch, ReqwestFetcher};
use crate::ingest::types::{SourceTag, Topic};

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("no sources are enabled")]
    NoSourcesEnabled,
    #[error("all {attempted} enabled sources failed")]
    AllSourcesFailed { attempted: usize },
    #[error("sources returned no topics")]
    NoTopics,
    #[error("writing artifact: {0:#}")]
    Artifact(anyhow::Error),
}

/// Per-source observability counts for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceReport {
    pub source: SourceTag,
    /// Topics that survived normalization.
    pub fetched: usize,
    pub after_trim: usize,
    pub selected: usize,
    /// Set when the adapter failed or timed out.
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    /// In adapter order.
    pub sources: Vec<SourceReport>,
    pub duplicates_dropped: usize,
    pub curation_calls: usize,
}

impl RunReport {
    pub fn failed_sources(&self) -> impl Iterator<Item = &SourceReport> {
        self.sources.iter().filter(|s| s.error.is_some())
    }
}

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub topics: Vec<Topic>,
    pub report: RunReport,
}

pub struct Pipeline {
    cfg: AppConfig,
    http: Arc<dyn HttpFetch>,
    curator: Arc<dyn CommentCurator>,
}

impl Pipeline {
    pub fn new(cfg: AppConfig, http: Arc<dyn HttpFetch>, curator: Arc<dyn CommentCurator>) -> Self {
        Self {
            cfg: cfg.sanitized(),
            http,
            curator,
        }
    }

    /// Adapters and the HTTP curator share one fetcher.
    pub fn from_parts(cfg: AppConfig, http: Arc<dyn HttpFetch>) -> Self {
        let cfg = cfg.sanitized();
        let curator = Arc::new(HttpCurator::new(
            http.clone(),
            cfg.curation.clone(),
            cfg.sources.hackernews.clone(),
            cfg.sources.reddit.clone(),
        ));
        Self::new(cfg, http, curator)
    }

    /// Production wiring over a `reqwest` client.
    pub fn from_config(cfg: AppConfig) -> anyhow::Result<Self> {
        let http = Arc::new(ReqwestFetcher::new(
            &cfg.sources.user_agent,
            cfg.sources.request_timeout(),
        )?);
        Ok(Self::from_parts(cfg, http))
    }

    pub fn config(&self) -> &AppConfig {
        &self.cfg
    }

    /// Phase 0: run every adapter in fixed order. Failures become empty batches.
    async fn collect(&self) -> Result<(Vec<SourceBatch>, Vec<SourceReport>), PipelineError> {
        let src = &self.cfg.sources;
        let adapters = SourceAdapter::from_config(src);
        if adapters.is_empty() {
            return Err(PipelineError::NoSourcesEnabled);
        }

        let mut batches = Vec::with_capacity(adapters.len());
        let mut reports = Vec::with_capacity(adapters.len());
        for adapter in &adapters {
            let tag = adapter.tag();
            let hint = adapter.language_hint(&src.default_language);
            let fetched = tokio::time::timeout(
                src.source_timeout(),
                adapter.fetch(self.http.as_ref(), src.polite_delay(), &src.default_language),
            )
            .await;

            let (topics, error) = match fetched {
                Ok(Ok(mut topics)) => {
                    for t in topics.iter_mut() {
                        let lang = classify(t, hint, &src.default_language);
                        t.language = lang;
                    }
                    (topics, None)
                }
                Ok(Err(e)) => (Vec::new(), Some(format!("{e:#}"))),
                Err(_) => (
                    Vec::new(),
                    Some(format!("timed out after {}s", src.source_timeout_s)),
                ),
            };
            if let Some(err) = &error {
                tracing::warn!(source = %tag, error = %err, "source failed; continuing without it");
                counter!("source_errors_total", "source" => tag.kind()).increment(1);
            }

            reports.push(SourceReport {
                source: tag.clone(),
                fetched: topics.len(),
                after_trim: 0,
                selected: 0,
                error,
            });
            batches.push(SourceBatch {
                source: tag,
                top_n: adapter.top_n_override(),
                topics,
            });
        }

        if reports.iter().all(|r| r.error.is_some()) {
            return Err(PipelineError::AllSourcesFailed {
                attempted: reports.len(),
            });
        }
        if reports.iter().all(|r| r.fetched == 0) {
            return Err(PipelineError::NoTopics);
        }
        Ok((batches, reports))
    }

    /// Phase 2: curate each selected topic concurrently, each under its own timeout.
    async fn enrich(&self, topics: &mut [Topic]) -> usize {
        if !self.cfg.curation.enabled || topics.is_empty() {
            return 0;
        }
        let budget = self.cfg.sources.comment_timeout();
        let results = join_all(topics.iter().map(|t| async move {
            match tokio::time::timeout(budget, self.curator.curate(t)).await {
                Ok(comments) => comments,
                Err(_) => {
                    tracing::warn!(source = %t.source, id = %t.id, "comment curation timed out");
                    counter!("comment_fetch_errors_total").increment(1);
                    Vec::new()
                }
            }
        }))
        .await;

        let calls = results.len();
        for (t, comments) in topics.iter_mut().zip(results) {
            t.comments = comments;
        }
        calls
    }

    /// Fetch, rank and enrich without touching the filesystem.
    pub async fn aggregate(&self) -> Result<RunOutcome, PipelineError> {
        ensure_metrics_described();

        let (batches, mut reports) = self.collect().await?;

        // Phase 1: selection
        let selection = select(batches, &self.cfg.ranking);
        for (r, c) in reports.iter_mut().zip(selection.counts.iter()) {
            r.after_trim = c.after_trim;
            r.selected = c.selected;
        }
        let mut topics = selection.topics;

        let curation_calls = self.enrich(&mut topics).await;

        for r in &reports {
            tracing::info!(
                source = %r.source,
                fetched = r.fetched,
                after_trim = r.after_trim,
                selected = r.selected,
                failed = r.error.is_some(),
                "source summary"
            );
            counter!("topics_selected_total", "source" => r.source.kind()).increment(r.selected as u64);
        }
        counter!("pipeline_runs_total").increment(1);
        gauge!("pipeline_last_run_ts").set(chrono::Utc::now().timestamp() as f64);

        Ok(RunOutcome {
            topics,
            report: RunReport {
                sources: reports,
                duplicates_dropped: selection.duplicates_dropped,
                curation_calls,
            },
        })
    }

    /// Full run: aggregate, then persist the artifact for `date`.
    pub async fn run(&self, date: NaiveDate) -> Result<(RunOutcome, ArtifactPaths), PipelineError> {
        let outcome = self.aggregate().await?;
        let paths =
            write_artifact(&self.cfg.output, date, &outcome.topics).map_err(PipelineError::Artifact)?;
        tracing::info!(
            topics = outcome.topics.len(),
            path = %paths.topics.display(),
            "artifact written"
        );
        Ok((outcome, paths))
    }
}
