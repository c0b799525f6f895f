// src/analyze/mod.rs
//! Analysis stage: cross-source ranking, comment curation, language hints.

pub mod curate;
pub mod language;
pub mod rank;

// Re-export convenient types.
pub use crate::analyze::curate::{rank_and_flag, CommentCurator, CurationParams, HttpCurator};
pub use crate::analyze::language::classify;
pub use crate::analyze::rank::{select, RankParams, Selection, SourceBatch, SourceCounts};
