// src/process/extract.rs

use crate::error::{Result, ScrapeError};
use scraper::{Html, Selector};

/// Pulls the text of every table cell out of rendered markup.
#[derive(Debug, Clone)]
pub struct CellExtractor {
    selector: Selector,
}

impl CellExtractor {
    pub fn new(selector: &str) -> Result<Self> {
        let selector = Selector::parse(selector)
            .map_err(|e| ScrapeError::Config(format!("invalid cell selector {selector:?}: {e:?}")))?;
        Ok(Self { selector })
    }

    /// Cell texts in document order; each cell's text nodes are concatenated
    /// as-is. No match is not an error.
    pub fn extract(&self, markup: &str) -> Vec<String> {
        let document = Html::parse_document(markup);
        document
            .select(&self.selector)
            .map(|cell| cell.text().collect::<String>())
            .collect()
    }
}
