// src/pipeline.rs

use crate::config::Config;
use crate::error::{Result, ScrapeError};
use crate::fetch::{self, PageRenderer, RenderedPage, RendererSession};
use crate::process::{self, CellExtractor};
use crate::report::{self, Summary};
use crate::table::Table;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use tracing::{info, warn};

/// What a run produced.
#[derive(Debug)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub pages_requested: usize,
    pub pages_rendered: usize,
    pub failed_pages: Vec<String>,
    pub table: Table,
    pub summary: Summary,
    pub artifacts: Vec<PathBuf>,
}

/// Full run with the renderer named in `config`.
pub fn run(config: &Config) -> Result<RunReport> {
    config.validate()?;
    let renderer = fetch::open_renderer(config)?;
    run_with(config, renderer)
}

/// Full run with a caller-supplied renderer. The renderer is released once the
/// fetch stage ends, whether or not it succeeded.
pub fn run_with<R: PageRenderer>(config: &Config, renderer: R) -> Result<RunReport> {
    let started_at = Utc::now();
    let urls = config.addresses()?;
    let extractor = CellExtractor::new(&config.extract.cell_selector)?;

    // ─── 1) render every page ─────────────────────────────────────────
    let pages = {
        let mut session = RendererSession::open(renderer);
        let pages = fetch::fetch_pages(&mut session, &urls, config.fetch.abort_on_error)?;
        session.finish();
        pages
    };

    // ─── 2) extract + reassemble + clean ──────────────────────────────
    let (table, rendered, failed_pages) = tabulate(&extractor, pages, config.extract.columns)?;
    info!(
        records = table.len(),
        pages = rendered,
        failed = failed_pages.len(),
        "table built"
    );
    for issue in table.consistency_issues() {
        warn!("{}", issue);
    }

    // ─── 3) report ────────────────────────────────────────────────────
    let out = &config.output;
    let summary = report::summarize(&table);
    let mut artifacts = Vec::new();

    let csv_path = out.csv_path();
    report::export_csv(&table, &csv_path)?;
    artifacts.push(csv_path);

    artifacts.push(report::write_summary_json(
        &summary,
        started_at,
        &config.urls,
        &out.summary_path(),
    )?);

    if out.parquet {
        let parquet_path = out.parquet_path();
        report::export_parquet(&table, &parquet_path)?;
        artifacts.push(parquet_path);
    }
    if out.plots {
        artifacts.extend(report::visualize(&table, &out.dir, out.histogram_bins)?);
    }

    Ok(RunReport {
        started_at,
        pages_requested: urls.len(),
        pages_rendered: rendered,
        failed_pages,
        table,
        summary,
        artifacts,
    })
}

/// Turn rendered pages into the cleaned table. Failed renders are skipped
/// unless every page failed.
fn tabulate(
    extractor: &CellExtractor,
    pages: Vec<RenderedPage>,
    width: usize,
) -> Result<(Table, usize, Vec<String>)> {
    let mut rows = Vec::new();
    let mut rendered = 0;
    let mut failed = Vec::new();
    let mut last_error = None;

    for page in pages {
        match page.markup {
            Ok(markup) => {
                rendered += 1;
                rows.extend(process::page_rows(extractor, page.url.as_str(), &markup, width)?);
            }
            Err(e) => {
                warn!(url = %page.url, "skipping page: {}", e);
                failed.push(page.url.to_string());
                last_error = Some(e);
            }
        }
    }

    if rendered == 0 {
        if let Some(e) = last_error {
            return Err(e);
        }
    }

    let table = process::clean(process::into_raw_rows(rows)?)?;
    Ok((table, rendered, failed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::tests::FakeRenderer;
    use tempfile::tempdir;

    fn page(cells: &[&str]) -> String {
        let body: String = cells
            .iter()
            .map(|c| format!(r#"<div role="cell">{c}</div>"#))
            .collect();
        format!("<html><body>{body}</body></html>")
    }

    fn config(dir: &std::path::Path, urls: &[&str]) -> Config {
        let mut cfg = Config::default();
        cfg.urls = urls.iter().map(|u| u.to_string()).collect();
        cfg.output.dir = dir.to_path_buf();
        cfg
    }

    #[test]
    fn end_to_end_with_fake_renderer() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let mut cfg = config(
            dir.path(),
            &["https://rx.test/diabetes/", "https://rx.test/gone/", "https://rx.test/allergies/"],
        );
        cfg.output.parquet = true;

        let diabetes = page(&[
            "Metformin (500mg) Get Started",
            "Tablet",
            "$20.58",
            "$4.50",
            "Save $16.08",
            "Get Started",
        ]);
        let allergies = page(&[
            "Cetirizine (10mg) Get Started",
            "Tablet",
            "$1,041.96",
            "$7.03",
            "Save $1,034.93",
            "Get Started",
        ]);
        let fake = FakeRenderer::new(&[
            ("https://rx.test/diabetes/", diabetes.as_str()),
            ("https://rx.test/allergies/", allergies.as_str()),
        ]);
        let releases = fake.releases.clone();

        let report = run_with(&cfg, fake)?;

        assert_eq!(releases.get(), 1);
        assert_eq!(report.pages_requested, 3);
        assert_eq!(report.pages_rendered, 2);
        assert_eq!(report.failed_pages, vec!["https://rx.test/gone/"]);
        assert_eq!(report.table.len(), 2);
        let cetirizine = report.table.get("Cetirizine").next().expect("scraped");
        assert_eq!(cetirizine.retail, 1041.96);

        // csv + summary + parquet + 3 histograms + box plot
        assert_eq!(report.artifacts.len(), 7);
        assert!(report.artifacts.iter().all(|p| p.exists()));

        let back = report::read_csv(&dir.path().join("medications.csv"))?;
        assert_eq!(back, report.table);
        Ok(())
    }

    #[test]
    fn all_pages_failing_is_an_error() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let cfg = config(dir.path(), &["https://rx.test/a/", "https://rx.test/b/"]);
        let fake = FakeRenderer::new(&[]);
        let releases = fake.releases.clone();

        match run_with(&cfg, fake) {
            Err(ScrapeError::Fetch { url, .. }) => assert_eq!(url, "https://rx.test/b/"),
            other => panic!("expected fetch error, got {other:?}"),
        }
        assert_eq!(releases.get(), 1);
        assert!(!dir.path().join("medications.csv").exists());
        Ok(())
    }

    #[test]
    fn malformed_page_aborts_before_export() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let cfg = config(dir.path(), &["https://rx.test/a/"]);
        let html = page(&["A", "Tablet", "$1", "$1"]);
        let fake = FakeRenderer::new(&[("https://rx.test/a/", html.as_str())]);

        let err = run_with(&cfg, fake).unwrap_err();
        assert!(matches!(err, ScrapeError::MalformedRow { cells: 4, .. }));
        assert!(!dir.path().join("medications.csv").exists());
        Ok(())
    }

    #[test]
    fn rendered_but_empty_pages_give_empty_outputs() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let cfg = config(dir.path(), &["https://rx.test/a/"]);
        let fake = FakeRenderer::new(&[("https://rx.test/a/", "<html><body>loading</body></html>")]);

        let report = run_with(&cfg, fake)?;
        assert!(report.table.is_empty());
        // csv + summary, no plots for an empty table
        assert_eq!(report.artifacts.len(), 2);
        Ok(())
    }
}
