//! Hot Topics binary entrypoint.
//! Loads config, then runs the aggregation once or on the configured schedule.

use anyhow::{Context, Result};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::PathBuf;

use hot_topics::config::AppConfig;
use hot_topics::pipeline::Pipeline;
use hot_topics::{scheduler, telemetry};

#[derive(Debug, Parser)]
#[command(name = "hot-topics", about = "Aggregate and rank trending topics into a daily artifact")]
struct Cli {
    /// TOML config file (overrides $HOT_TOPICS_CONFIG and config/hot_topics.toml).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Run once and exit, even if the scheduler is enabled.
    #[arg(long)]
    once: bool,
}

async fn run_once(pipeline: &Pipeline, metrics: Option<&PrometheusHandle>) -> Result<()> {
    let today = chrono::Local::now().date_naive();
    let (outcome, paths) = pipeline.run(today).await?;

    for failed in outcome.report.failed_sources() {
        tracing::warn!(
            source = %failed.source,
            error = failed.error.as_deref().unwrap_or_default(),
            "run completed without this source"
        );
    }
    tracing::info!(
        selected = outcome.topics.len(),
        duplicates = outcome.report.duplicates_dropped,
        curation_calls = outcome.report.curation_calls,
        dir = %paths.day_dir.display(),
        "run finished"
    );

    if let Some(handle) = metrics {
        if let Err(e) = telemetry::write_metrics_snapshot(handle, &paths.day_dir) {
            tracing::warn!(error = ?e, "metrics snapshot not written");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    telemetry::init_tracing();

    let cli = Cli::parse();
    let cfg = match &cli.config {
        Some(path) => AppConfig::load_from_file(path)?,
        None => AppConfig::load_default().context("loading config")?,
    };

    let metrics = match telemetry::install_metrics() {
        Ok(h) => Some(h),
        Err(e) => {
            tracing::warn!(error = ?e, "metrics disabled");
            None
        }
    };

    let schedule = cfg.scheduler.clone();
    let pipeline = Pipeline::from_config(cfg)?;

    if cli.once || !schedule.enabled {
        return run_once(&pipeline, metrics.as_ref()).await;
    }

    tracing::info!(mode = ?schedule.mode, time = %schedule.time, "scheduler started");
    let pipeline = &pipeline;
    let metrics = metrics.as_ref();
    scheduler::run_scheduled(&schedule, move || run_once(pipeline, metrics)).await
}
