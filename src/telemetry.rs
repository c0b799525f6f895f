// src/telemetry.rs
//! Logging and metrics bootstrap for the binary.
//!
//! `RUST_LOG` overrides the filter; `LOG_FORMAT=json` switches to JSON lines.
//! Metrics go to an in-process Prometheus recorder and are dumped as text next
//! to each artifact, since the job has no HTTP surface.

use anyhow::{Context, Result};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const DEFAULT_LOG_FILTER: &str = "hot_topics=info,warn";
pub const METRICS_FILE: &str = "metrics.prom";

fn wants_json() -> bool {
    std::env::var("LOG_FORMAT")
        .ok()
        .is_some_and(|v| v.eq_ignore_ascii_case("json"))
}

/// Install the global subscriber. A second call is a no-op.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let registry = tracing_subscriber::registry().with(filter);
    let _ = if wants_json() {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().compact()).try_init()
    };
}

pub fn install_metrics() -> Result<PrometheusHandle> {
    PrometheusBuilder::new()
        .install_recorder()
        .context("installing prometheus recorder")
}

/// Write the current exposition text to `{dir}/metrics.prom`.
pub fn write_metrics_snapshot(handle: &PrometheusHandle, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = dir.join(METRICS_FILE);
    fs::write(&path, handle.render()).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}
