// src/fetch/mod.rs

pub mod browser;
pub mod http;

pub use browser::ChromeRenderer;
pub use http::HttpRenderer;

use crate::config::{Config, RendererKind};
use crate::error::{Result, ScrapeError};
use std::time::Instant;
use tracing::{debug, error, info, instrument};
use url::Url;

/// Opaque markup-rendering service.
pub trait PageRenderer {
    fn name(&self) -> &'static str;

    /// Navigate to `url` and return the markup once it has settled.
    fn render(&mut self, url: &Url) -> anyhow::Result<String>;

    /// Free whatever the renderer holds. Called exactly once by `RendererSession`.
    fn release(&mut self) {}
}

impl<R: PageRenderer + ?Sized> PageRenderer for Box<R> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn render(&mut self, url: &Url) -> anyhow::Result<String> {
        (**self).render(url)
    }

    fn release(&mut self) {
        (**self).release()
    }
}

/// Build the renderer selected in `config`. For Chrome this launches the browser.
pub fn open_renderer(config: &Config) -> Result<Box<dyn PageRenderer>> {
    let fetch = &config.fetch;
    let renderer: Box<dyn PageRenderer> = match fetch.renderer {
        RendererKind::Chrome => Box::new(ChromeRenderer::launch(
            fetch.headless,
            fetch.settle_mode,
            fetch.settle(),
            &config.extract.cell_selector,
        )?),
        RendererKind::Http => Box::new(HttpRenderer::new(fetch.settle())?),
    };
    Ok(renderer)
}

/// Scoped ownership of a renderer: released once on `finish`, or on drop if
/// the fetch loop exits early.
pub struct RendererSession<R: PageRenderer> {
    renderer: R,
    released: bool,
}

impl<R: PageRenderer> RendererSession<R> {
    pub fn open(renderer: R) -> Self {
        debug!(renderer = renderer.name(), "renderer acquired");
        Self {
            renderer,
            released: false,
        }
    }

    pub fn render(&mut self, url: &Url) -> anyhow::Result<String> {
        self.renderer.render(url)
    }

    pub fn finish(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.renderer.release();
            debug!(renderer = self.renderer.name(), "renderer released");
        }
    }
}

impl<R: PageRenderer> Drop for RendererSession<R> {
    fn drop(&mut self) {
        self.release();
    }
}

/// Markup for one address. A failed render is kept so the caller can report it.
#[derive(Debug)]
pub struct RenderedPage {
    pub url: Url,
    pub markup: Result<String>,
}

/// Render every address in order, one at a time.
///
/// With `abort_on_error` the first failure is returned immediately; otherwise
/// failures are logged and carried in the output.
#[instrument(level = "info", skip_all, fields(pages = urls.len()))]
pub fn fetch_pages<R: PageRenderer>(
    session: &mut RendererSession<R>,
    urls: &[Url],
    abort_on_error: bool,
) -> Result<Vec<RenderedPage>> {
    let mut pages = Vec::with_capacity(urls.len());

    for url in urls {
        let start = Instant::now();
        let markup = match session.render(url) {
            Ok(html) => {
                info!(url = %url, bytes = html.len(), elapsed = ?start.elapsed(), "rendered");
                Ok(html)
            }
            Err(e) => {
                let err = ScrapeError::Fetch {
                    url: url.to_string(),
                    reason: format!("{e:#}"),
                };
                error!("{}", err);
                if abort_on_error {
                    return Err(err);
                }
                Err(err)
            }
        };

        pages.push(RenderedPage {
            url: url.clone(),
            markup,
        });
    }

    Ok(pages)
}
