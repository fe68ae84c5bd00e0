use anyhow::{Context, Result};
use rxscraper::{pipeline, Config};
use std::time::Instant;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .with_writer(std::io::stderr)
        .init();
    info!("startup");
    let t0 = Instant::now();

    // ─── 2) configuration ────────────────────────────────────────────
    let config = Config::load().context("loading configuration")?;
    info!(
        pages = config.urls.len(),
        renderer = ?config.fetch.renderer,
        out = %config.output.dir.display(),
        "configured"
    );

    // ─── 3) scrape → clean → report ──────────────────────────────────
    let report = pipeline::run(&config).context("scrape run failed")?;

    println!("{} rows x 4 columns", report.table.len());
    report.summary.render().printstd();

    for path in &report.artifacts {
        info!(path = %path.display(), "wrote");
    }
    if !report.failed_pages.is_empty() {
        info!(
            "{} of {} pages could not be rendered",
            report.failed_pages.len(),
            report.pages_requested
        );
    }
    info!(elapsed = ?t0.elapsed(), "all done");
    Ok(())
}
