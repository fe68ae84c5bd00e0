use anyhow::{Context, Result};
use rxscraper::report::{self, export::read_csv};
use std::{env, path::Path, process::exit};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    // Expect one CLI argument (an exported CSV) and an optional plot directory.
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        eprintln!("Usage: {} <MEDICATIONS_CSV> [PLOT_DIR]", args[0]);
        exit(1);
    }
    let csv_path = Path::new(&args[1]);

    let table = read_csv(csv_path).with_context(|| format!("reading {}", csv_path.display()))?;
    tracing::info!(rows = table.len(), "loaded {}", csv_path.display());

    println!("=== {} ===", csv_path.display());
    println!("{} rows x 4 columns", table.len());
    report::summarize(&table).render().printstd();

    let issues = table.consistency_issues();
    if !issues.is_empty() {
        println!("\n--- {} pricing inconsistencies ---", issues.len());
        for issue in &issues {
            println!("  {}", issue);
        }
    }

    if let Some(dir) = args.get(2) {
        let files = report::visualize(&table, Path::new(dir), 25).context("rendering plots")?;
        for f in files {
            println!("plot: {}", f.display());
        }
    }

    Ok(())
}
