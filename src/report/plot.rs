// src/report/plot.rs

use super::stats::percentile;
use crate::error::{Result, ScrapeError};
use crate::table::{NumericColumn, Table};
use plotters::prelude::*;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{info, instrument};

const SIZE: (u32, u32) = (800, 600);

/// One equal-width histogram bin; `end` is exclusive except for the last bin.
#[derive(Debug, Clone, PartialEq)]
pub struct Bin {
    pub start: f64,
    pub end: f64,
    pub count: u32,
}

/// Split `[min, max]` into `bins` equal-width bins. Constant data gets a
/// single unit-wide span so the bins stay non-degenerate.
pub fn histogram(values: &[f64], bins: usize) -> Vec<Bin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }
    let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if hi <= lo {
        hi = lo + 1.0;
    }
    let width = (hi - lo) / bins as f64;

    let mut out: Vec<Bin> = (0..bins)
        .map(|i| Bin {
            start: lo + width * i as f64,
            end: lo + width * (i + 1) as f64,
            count: 0,
        })
        .collect();
    for &v in values {
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        out[idx].count += 1;
    }
    out
}

/// Box plot geometry: quartiles, whiskers at 1.5 IQR (clipped to the data) and
/// the points beyond them.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub lower_whisker: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

impl BoxStats {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let q1 = percentile(&sorted, 0.25);
        let median = percentile(&sorted, 0.5);
        let q3 = percentile(&sorted, 0.75);
        let iqr = q3 - q1;
        let fence = (q1 - 1.5 * iqr)..=(q3 + 1.5 * iqr);

        let lower_whisker = sorted.iter().copied().find(|v| fence.contains(v)).unwrap_or(q1);
        let upper_whisker = sorted.iter().rev().copied().find(|v| fence.contains(v)).unwrap_or(q3);
        let outliers = sorted.iter().copied().filter(|v| !fence.contains(v)).collect();

        Some(Self {
            q1,
            median,
            q3,
            lower_whisker,
            upper_whisker,
            outliers,
        })
    }
}

fn plot_err<E: std::fmt::Display>(e: E) -> ScrapeError {
    ScrapeError::Plot(e.to_string())
}

fn draw_histogram(path: &Path, column: NumericColumn, bins: &[Bin]) -> Result<()> {
    let (lo, hi) = match (bins.first(), bins.last()) {
        (Some(first), Some(last)) => (first.start, last.end),
        _ => return Ok(()),
    };
    let max_count = bins.iter().map(|b| b.count).max().unwrap_or(0);

    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(column.name(), ("sans-serif", 24))
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(lo..hi, 0u32..max_count + 1)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(column.name())
        .y_desc("Count")
        .draw()
        .map_err(plot_err)?;

    chart
        .draw_series(bins.iter().map(|b| {
            Rectangle::new([(b.start, 0), (b.end, b.count)], BLUE.mix(0.6).filled())
        }))
        .map_err(plot_err)?;

    root.present().map_err(plot_err)?;
    Ok(())
}

fn draw_box_plot(path: &Path, column: NumericColumn, stats: &BoxStats) -> Result<()> {
    let lo = stats
        .outliers
        .iter()
        .copied()
        .fold(stats.lower_whisker, f64::min);
    let hi = stats
        .outliers
        .iter()
        .copied()
        .fold(stats.upper_whisker, f64::max);
    let pad = ((hi - lo) * 0.05).max(0.5);

    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(column.name(), ("sans-serif", 24))
        .margin(12)
        .x_label_area_size(20)
        .y_label_area_size(50)
        .build_cartesian_2d(0f64..2f64, (lo - pad)..(hi + pad))
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(0)
        .y_desc(column.name())
        .draw()
        .map_err(plot_err)?;

    let (left, right, mid) = (0.7, 1.3, 1.0);
    chart
        .draw_series(std::iter::once(Rectangle::new(
            [(left, stats.q1), (right, stats.q3)],
            BLUE.stroke_width(2),
        )))
        .map_err(plot_err)?;

    let segments = vec![
        // median
        vec![(left, stats.median), (right, stats.median)],
        // whiskers and caps
        vec![(mid, stats.q3), (mid, stats.upper_whisker)],
        vec![(mid, stats.q1), (mid, stats.lower_whisker)],
        vec![(0.85, stats.upper_whisker), (1.15, stats.upper_whisker)],
        vec![(0.85, stats.lower_whisker), (1.15, stats.lower_whisker)],
    ];
    chart
        .draw_series(
            segments.into_iter().enumerate().map(|(i, pts)| {
                let color = if i == 0 { RED } else { BLACK };
                PathElement::new(pts, color.stroke_width(2))
            }),
        )
        .map_err(plot_err)?;

    chart
        .draw_series(
            stats
                .outliers
                .iter()
                .map(|&v| Circle::new((mid, v), 3, BLACK.filled())),
        )
        .map_err(plot_err)?;

    root.present().map_err(plot_err)?;
    Ok(())
}

/// Write `<column>_hist.svg` for every numeric column and `price_box.svg`
/// into `out_dir`. Returns the files written; an empty table writes nothing.
#[instrument(level = "info", skip(table), fields(rows = table.len()))]
pub fn visualize(table: &Table, out_dir: &Path, bins: usize) -> Result<Vec<PathBuf>> {
    if table.is_empty() {
        info!("empty table; skipping plots");
        return Ok(Vec::new());
    }
    fs::create_dir_all(out_dir).map_err(|e| ScrapeError::io(out_dir, e))?;

    let mut written = Vec::new();
    for column in NumericColumn::ALL {
        let path = out_dir.join(format!("{}_hist.svg", column.name().to_lowercase()));
        draw_histogram(&path, column, &histogram(&table.column(column), bins))?;
        written.push(path);
    }

    if let Some(stats) = BoxStats::from_values(&table.column(NumericColumn::Price)) {
        let path = out_dir.join("price_box.svg");
        draw_box_plot(&path, NumericColumn::Price, &stats)?;
        written.push(path);
    }

    info!(files = written.len(), dir = %out_dir.display(), "plots written");
    Ok(written)
}
