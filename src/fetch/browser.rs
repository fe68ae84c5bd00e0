// src/fetch/browser.rs

use super::PageRenderer;
use crate::config::SettleMode;
use crate::error::{Result, ScrapeError};
use anyhow::Context;
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::{sync::Arc, thread, time::Duration};
use tracing::{debug, info, warn};
use url::Url;

/// Headless Chrome with a single reused tab.
///
/// The browser process lives until `release` (or drop); one launch serves the
/// whole run.
pub struct ChromeRenderer {
    browser: Option<Browser>,
    tab: Option<Arc<Tab>>,
    settle_mode: SettleMode,
    settle: Duration,
    ready_selector: String,
}

impl ChromeRenderer {
    pub fn launch(
        headless: bool,
        settle_mode: SettleMode,
        settle: Duration,
        ready_selector: &str,
    ) -> Result<Self> {
        let options = LaunchOptions::default_builder()
            .headless(headless)
            .build()
            .map_err(|e| ScrapeError::Config(format!("chrome launch options: {e}")))?;
        let browser = Browser::new(options).map_err(|e| ScrapeError::Fetch {
            url: "about:blank".into(),
            reason: format!("launching chrome: {e:#}"),
        })?;
        let tab = browser.new_tab().map_err(|e| ScrapeError::Fetch {
            url: "about:blank".into(),
            reason: format!("opening tab: {e:#}"),
        })?;
        info!(headless, ?settle_mode, ?settle, "chrome launched");

        Ok(Self {
            browser: Some(browser),
            tab: Some(tab),
            settle_mode,
            settle,
            ready_selector: ready_selector.to_string(),
        })
    }

    fn wait_until_settled(&self, tab: &Tab, url: &Url) {
        match self.settle_mode {
            SettleMode::Fixed => thread::sleep(self.settle),
            SettleMode::UntilSelector => {
                if let Err(e) =
                    tab.wait_for_element_with_custom_timeout(&self.ready_selector, self.settle)
                {
                    // capture whatever rendered; the extractor reports empty pages
                    warn!(url = %url, selector = %self.ready_selector, "no cells after {:?}: {}", self.settle, e);
                }
            }
        }
    }
}

impl PageRenderer for ChromeRenderer {
    fn name(&self) -> &'static str {
        "chrome"
    }

    fn render(&mut self, url: &Url) -> anyhow::Result<String> {
        let tab = self
            .tab
            .clone()
            .ok_or_else(|| anyhow::anyhow!("browser already released"))?;

        tab.navigate_to(url.as_str())
            .with_context(|| format!("navigating to {url}"))?;
        tab.wait_until_navigated()
            .with_context(|| format!("waiting for {url} to load"))?;
        self.wait_until_settled(&tab, url);

        let html = tab
            .get_content()
            .with_context(|| format!("reading rendered markup of {url}"))?;
        debug!(url = %url, bytes = html.len(), "captured markup");
        Ok(html)
    }

    fn release(&mut self) {
        self.tab = None;
        // dropping the last handle kills the chrome process
        if self.browser.take().is_some() {
            info!("chrome closed");
        }
    }
}

impl Drop for ChromeRenderer {
    fn drop(&mut self) {
        self.release();
    }
}
