// src/scheduler.rs
//! Recurring runs: daily at a local HH:MM, at the top of every hour, or every
//! N minutes. A failed run is logged and the loop keeps going.

use anyhow::{anyhow, Result};
use chrono::{Duration as ChronoDuration, NaiveDateTime, NaiveTime, Timelike};
use std::future::Future;
use std::time::Duration;

use crate::config::{ScheduleMode, SchedulerConfig};

pub fn parse_daily_time(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M")
        .map_err(|e| anyhow!("invalid scheduler time {s:?} (expected HH:MM): {e}"))
}

/// Time from `now` until the next run. Pure, so callers choose the clock.
pub fn next_delay(now: NaiveDateTime, cfg: &SchedulerConfig) -> Result<Duration> {
    let next = match cfg.mode {
        ScheduleMode::Daily => {
            let at = parse_daily_time(&cfg.time)?;
            let today = now.date().and_time(at);
            if today > now {
                today
            } else {
                today + ChronoDuration::days(1)
            }
        }
        ScheduleMode::Hourly => {
            let top = now
                .with_minute(0)
                .and_then(|t| t.with_second(0))
                .and_then(|t| t.with_nanosecond(0))
                .ok_or_else(|| anyhow!("cannot truncate {now} to the hour"))?;
            top + ChronoDuration::hours(1)
        }
        ScheduleMode::Interval => {
            return Ok(Duration::from_secs(cfg.interval_minutes.max(1) * 60));
        }
    };
    (next - now)
        .to_std()
        .map_err(|e| anyhow!("negative delay until {next}: {e}"))
}

async fn run_logged<F, Fut>(job: &mut F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<()>>,
{
    if let Err(e) = job().await {
        tracing::error!(error = ?e, "scheduled run failed");
    }
}

/// Run `job` forever on the configured cadence. Returns only on a config error.
pub async fn run_scheduled<F, Fut>(cfg: &SchedulerConfig, mut job: F) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<()>>,
{
    // Surface a bad HH:MM before doing any work.
    next_delay(chrono::Local::now().naive_local(), cfg)?;

    if cfg.run_on_start {
        run_logged(&mut job).await;
    }
    loop {
        let delay = next_delay(chrono::Local::now().naive_local(), cfg)?;
        tracing::info!(mode = ?cfg.mode, wait_secs = delay.as_secs(), "next run scheduled");
        tokio::time::sleep(delay).await;
        run_logged(&mut job).await;
    }
}
