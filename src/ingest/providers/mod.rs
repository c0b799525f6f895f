// src/ingest/providers/mod.rs
pub mod hackernews;
pub mod reddit;
pub mod rss;
pub mod twitter;
