// src/process/mod.rs
pub mod chunk;
pub mod clean;
pub mod extract;

pub use chunk::{chunk, RawRow, ROW_WIDTH};
pub use clean::clean;
pub use extract::CellExtractor;

use crate::error::Result;
use tracing::{debug, instrument, warn};

/// Extract and reassemble the rows of one rendered page.
///
/// Chunking is per page so a malformed page is reported by URL instead of
/// misaligning every page after it.
#[instrument(level = "debug", skip(extractor, markup))]
pub fn page_rows(
    extractor: &CellExtractor,
    url: &str,
    markup: &str,
    width: usize,
) -> Result<Vec<Vec<String>>> {
    let cells = extractor.extract(markup);
    if cells.is_empty() {
        warn!(url, "no table cells found; page may not have finished rendering");
        return Ok(Vec::new());
    }
    debug!(url, cells = cells.len(), "extracted cells");
    chunk(cells, width).map_err(|e| e.at_url(url))
}

/// Convert reassembled rows into named six-field rows.
pub fn into_raw_rows(rows: Vec<Vec<String>>) -> Result<Vec<RawRow>> {
    rows.into_iter().map(RawRow::try_from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScrapeError;
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    fn init_test_logging() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info,rxscraper::process=debug")),
            )
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    fn page(cells: &[&str]) -> String {
        let body: String = cells
            .iter()
            .map(|c| format!(r#"<div role="cell">{c}</div>"#))
            .collect();
        format!("<html><body><div role=\"table\">{body}</div></body></html>")
    }

    #[test]
    fn page_rows_then_clean() -> Result<()> {
        init_test_logging();
        let extractor = CellExtractor::new(r#"div[role="cell"]"#)?;
        let html = page(&[
            "Aspirin (81mg) Get Started",
            "Tablet",
            "$10.00",
            "$3.00",
            "Save $7.00",
            "Get Started",
            "Omeprazole (20mg) Get Started",
            "Capsule",
            "$1,024.80",
            "$24.80",
            "Save $1,000.00",
            "Get Started",
        ]);

        let rows = page_rows(&extractor, "https://rx.test/gi/", &html, ROW_WIDTH)?;
        assert_eq!(rows.len(), 2);
        let table = clean(into_raw_rows(rows)?)?;
        let omeprazole = table.get("Omeprazole").next().expect("row present");
        assert_eq!(omeprazole.retail, 1024.8);
        assert_eq!(omeprazole.savings, 1000.0);
        Ok(())
    }

    #[test]
    fn malformed_page_names_url() -> Result<()> {
        init_test_logging();
        let extractor = CellExtractor::new(r#"div[role="cell"]"#)?;
        let html = page(&["A", "Tablet", "$1", "$1", "Save $0", "x", "orphan"]);

        match page_rows(&extractor, "https://rx.test/bad/", &html, ROW_WIDTH) {
            Err(ScrapeError::MalformedRow { url, cells, .. }) => {
                assert_eq!(url.as_deref(), Some("https://rx.test/bad/"));
                assert_eq!(cells, 7);
            }
            other => panic!("expected MalformedRow, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn empty_page_yields_no_rows() -> Result<()> {
        let extractor = CellExtractor::new(r#"div[role="cell"]"#)?;
        let rows = page_rows(&extractor, "https://rx.test/empty/", "<html></html>", ROW_WIDTH)?;
        assert!(rows.is_empty());
        Ok(())
    }
}
