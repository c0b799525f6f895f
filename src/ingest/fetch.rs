// src/ingest/fetch.rs
//! Network capability consumed by source adapters and the comment curator.
//!
//! Adapters never touch `reqwest` directly; they ask an [`HttpFetch`] for a
//! body and treat any error (timeout, non-2xx, transport) as a source failure.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::time::Duration;

#[async_trait]
pub trait HttpFetch: Send + Sync {
    /// GET `url` and return the body. `bearer` adds an `Authorization` header.
    async fn get_text(&self, url: &str, bearer: Option<&str>) -> Result<String>;
}

/// Shared `reqwest` client with a per-request timeout and fixed user agent.
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .context("building http client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpFetch for ReqwestFetcher {
    async fn get_text(&self, url: &str, bearer: Option<&str>) -> Result<String> {
        let mut req = self.client.get(url);
        if let Some(token) = bearer {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await.with_context(|| format!("GET {url}"))?;
        let status = resp.status();
        if !status.is_success() {
            bail!("GET {url}: upstream returned {status}");
        }
        resp.text()
            .await
            .with_context(|| format!("reading body of {url}"))
    }
}

/// Sleep between successive requests of one adapter. Zero means no pause.
pub async fn polite_pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
