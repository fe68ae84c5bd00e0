// src/fetch/http.rs

use super::PageRenderer;
use crate::error::{Result, ScrapeError};
use anyhow::Context;
use reqwest::blocking::Client;
use std::time::Duration;
use url::Url;

/// Plain GET without script execution. Only useful for pages that arrive
/// already rendered (saved snapshots, prerender proxies).
pub struct HttpRenderer {
    client: Client,
}

impl HttpRenderer {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .cookie_store(true)
            .build()
            .map_err(|e| ScrapeError::Config(format!("building HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl PageRenderer for HttpRenderer {
    fn name(&self) -> &'static str {
        "http"
    }

    fn render(&mut self, url: &Url) -> anyhow::Result<String> {
        let html = self
            .client
            .get(url.clone())
            .send()
            .with_context(|| format!("GET {url}"))?
            .error_for_status()?
            .text()
            .with_context(|| format!("reading body from {url}"))?;
        Ok(html)
    }
}
