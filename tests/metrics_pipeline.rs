// tests/metrics_pipeline.rs
// Installs the global recorder; keep it the only test in this binary.
#![cfg(feature = "strict-metrics")]

mod common;

use common::*;
use std::sync::Arc;

use hot_topics::pipeline::Pipeline;
use hot_topics::telemetry;

#[tokio::test]
async fn run_emits_expected_series_and_snapshot() {
    let handle = telemetry::install_metrics().expect("recorder installs once");

    let mut cfg = base_config();
    cfg.sources.reddit.enabled = true;
    cfg.sources.rss = vec![tech_feed(None)];
    let http = MockHttp::new().with_fixture(TECH_FEED_URL, "tech_rss.xml");
    let out = Pipeline::new(cfg, Arc::new(http), Arc::new(CountingCurator::new()))
        .aggregate()
        .await
        .unwrap();
    assert_eq!(out.topics.len(), 2);

    let text = handle.render();
    for needle in [
        "pipeline_runs_total 1",
        "source_errors_total{source=\"reddit\"} 1",
        "topics_fetched_total{source=\"rss\"} 4",
        "topics_selected_total{source=\"rss\"} 2",
        "source_fetch_ms",
        "pipeline_last_run_ts",
    ] {
        assert!(text.contains(needle), "missing {needle:?} in:\n{text}");
    }

    let dir = tempfile::tempdir().unwrap();
    let path = telemetry::write_metrics_snapshot(&handle, dir.path()).unwrap();
    assert_eq!(path.file_name().unwrap(), telemetry::METRICS_FILE);
    assert!(std::fs::read_to_string(path).unwrap().contains("pipeline_runs_total"));
}
