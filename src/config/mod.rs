// src/config/mod.rs
//! Application configuration loaded from TOML.
//!
//! Lookup order for [`AppConfig::load_default`]:
//! 1) `$HOT_TOPICS_CONFIG`
//! 2) `config/hot_topics.toml`
//! 3) built-in defaults
//!
//! Values are sanitized after parsing so downstream code never sees a zero
//! cap or an out-of-range similarity.

pub mod sources;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::analyze::curate::CurationParams;
use crate::analyze::rank::RankParams;
pub use sources::{HackerNewsConfig, RedditConfig, RssFeedConfig, SourcesConfig, TwitterConfig};

pub const ENV_CONFIG_PATH: &str = "HOT_TOPICS_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config/hot_topics.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub ranking: RankParams,
    #[serde(default)]
    pub curation: CurationParams,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

fn default_root_dir() -> PathBuf {
    PathBuf::from("./output")
}
fn default_retain_days() -> u32 {
    30
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_root_dir")]
    pub root_dir: PathBuf,
    /// Mirror the newest artifact into `{root_dir}/latest/`.
    #[serde(default = "default_true")]
    pub write_latest: bool,
    /// Dated run directories older than this are removed. 0 keeps everything.
    #[serde(default = "default_retain_days")]
    pub retain_days: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root_dir: default_root_dir(),
            write_latest: true,
            retain_days: default_retain_days(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleMode {
    #[default]
    Daily,
    Hourly,
    Interval,
}

fn default_daily_time() -> String {
    "08:00".to_string()
}
fn default_interval_minutes() -> u64 {
    60
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub mode: ScheduleMode,
    /// HH:MM, local time, for `daily`.
    #[serde(default = "default_daily_time")]
    pub time: String,
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u64,
    #[serde(default)]
    pub run_on_start: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            mode: ScheduleMode::Daily,
            time: default_daily_time(),
            interval_minutes: default_interval_minutes(),
            run_on_start: false,
        }
    }
}

impl AppConfig {
    /// Load from an explicit TOML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: AppConfig = toml::from_str(s)?;
        Ok(cfg.sanitized())
    }

    /// Env var, then `config/hot_topics.toml`, then defaults.
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from_file(&pb);
            } else {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
        }
        let p = PathBuf::from(DEFAULT_CONFIG_PATH);
        if p.exists() {
            return Self::load_from_file(&p);
        }
        Ok(Self::default().sanitized())
    }

    /// Clamp values that would make a run meaningless.
    pub fn sanitized(mut self) -> Self {
        self.ranking = self.ranking.sanitized();
        self.curation = self.curation.sanitized();
        if self.sources.timeout_s == 0 {
            self.sources.timeout_s = 1;
        }
        if self.sources.source_timeout_s < self.sources.timeout_s {
            self.sources.source_timeout_s = self.sources.timeout_s;
        }
        if self.sources.comment_timeout_s == 0 {
            self.sources.comment_timeout_s = self.sources.timeout_s;
        }
        if self.sources.default_language.trim().is_empty() {
            self.sources.default_language = "en".to_string();
        }
        if self.scheduler.interval_minutes == 0 {
            self.scheduler.interval_minutes = 1;
        }
        self.sources.reddit.subreddits = self
            .sources
            .reddit
            .subreddits
            .iter()
            .map(|s| s.trim().trim_start_matches("r/").to_string())
            .filter(|s| !s.is_empty())
            .collect();
        // The feed name is the topic's source tag; it must not be blank.
        for (i, feed) in self.sources.rss.iter_mut().enumerate() {
            feed.name = feed.name.trim().to_string();
            if feed.name.is_empty() {
                feed.name = match feed.url.trim() {
                    "" => format!("feed-{}", i + 1),
                    url => url.to_string(),
                };
            }
        }
        self
    }
}
