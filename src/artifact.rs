// src/artifact.rs
//! Persisted hand-off to the summarizer: `{root}/{YYYY-MM-DD}/topics.json`
//! plus its SHA-256, optionally mirrored into `{root}/latest/`.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::OutputConfig;
use crate::ingest::types::Topic;

pub const TOPICS_FILE: &str = "topics.json";
pub const CHECKSUM_FILE: &str = "topics.sha256";
pub const LATEST_DIR: &str = "latest";
const DAY_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub day_dir: PathBuf,
    pub topics: PathBuf,
    pub checksum: PathBuf,
}

/// Pretty JSON; non-ASCII text is written as-is.
pub fn topics_to_json(topics: &[Topic]) -> Result<String> {
    serde_json::to_string_pretty(topics).context("serializing topics")
}

pub fn topics_from_json(s: &str) -> Result<Vec<Topic>> {
    serde_json::from_str(s).context("parsing topics artifact")
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut out = String::with_capacity(64);
    for b in digest.iter() {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

pub fn day_dir(root: &Path, date: NaiveDate) -> PathBuf {
    root.join(date.format(DAY_FORMAT).to_string())
}

fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, content).with_context(|| format!("writing {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("renaming into {}", path.display()))?;
    Ok(())
}

fn write_pair(dir: &Path, json: &str, checksum: &str) -> Result<(PathBuf, PathBuf)> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let topics = dir.join(TOPICS_FILE);
    let sum = dir.join(CHECKSUM_FILE);
    write_atomic(&topics, json.as_bytes())?;
    write_atomic(&sum, checksum.as_bytes())?;
    Ok((topics, sum))
}

/// Write the artifact for `date`, mirror it into `latest/` if configured, then
/// prune expired run directories.
pub fn write_artifact(out: &OutputConfig, date: NaiveDate, topics: &[Topic]) -> Result<ArtifactPaths> {
    let json = topics_to_json(topics)?;
    let checksum = sha256_hex(json.as_bytes());

    let dir = day_dir(&out.root_dir, date);
    let (topics_path, checksum_path) = write_pair(&dir, &json, &checksum)?;

    if out.write_latest {
        write_pair(&out.root_dir.join(LATEST_DIR), &json, &checksum)?;
    }

    if out.retain_days > 0 {
        match prune_old_runs(&out.root_dir, date, out.retain_days) {
            Ok(0) => {}
            Ok(n) => tracing::info!(removed = n, "pruned expired run directories"),
            Err(e) => tracing::warn!(error = ?e, "pruning old runs failed"),
        }
    }

    Ok(ArtifactPaths {
        day_dir: dir,
        topics: topics_path,
        checksum: checksum_path,
    })
}

/// Remove `{root}/{YYYY-MM-DD}` directories older than `retain_days` before
/// `today`. Anything not named like a date is left alone.
pub fn prune_old_runs(root: &Path, today: NaiveDate, retain_days: u32) -> Result<usize> {
    let mut removed = 0usize;
    let entries = match fs::read_dir(root) {
        Ok(e) => e,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e).with_context(|| format!("listing {}", root.display())),
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|s| s.to_str()) else {
            continue;
        };
        let Ok(date) = NaiveDate::parse_from_str(name, DAY_FORMAT) else {
            continue;
        };
        if (today - date).num_days() > i64::from(retain_days) {
            fs::remove_dir_all(&path).with_context(|| format!("removing {}", path.display()))?;
            removed += 1;
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_of_empty_is_known() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn day_dir_uses_iso_date() {
        let d = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        assert_eq!(day_dir(Path::new("out"), d), PathBuf::from("out/2026-03-07"));
    }

    #[test]
    fn prune_missing_root_is_noop() {
        let d = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        assert_eq!(prune_old_runs(Path::new("/definitely/not/here"), d, 3).unwrap(), 0);
    }
}
