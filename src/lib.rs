// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod analyze;
pub mod artifact;
pub mod config;
pub mod ingest;
pub mod pipeline;
pub mod scheduler;
pub mod telemetry;

// ---- Re-exports for stable public API ----
pub use crate::analyze::{CommentCurator, HttpCurator, RankParams};
pub use crate::config::AppConfig;
pub use crate::ingest::types::{Comment, SourceTag, Topic};
pub use crate::ingest::{HttpFetch, ReqwestFetcher, SourceAdapter};
pub use crate::pipeline::{Pipeline, PipelineError, RunOutcome, RunReport, SourceReport};
