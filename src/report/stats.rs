// src/report/stats.rs

use crate::table::{NumericColumn, Table};
use prettytable::{format, Cell, Row, Table as TextTable};
use serde::Serialize;

/// Descriptive statistics for one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub column: NumericColumn,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1).
    pub std: f64,
    pub min: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub max: f64,
}

impl ColumnSummary {
    pub fn from_values(column: NumericColumn, values: &[f64]) -> Self {
        let count = values.len();
        if count == 0 {
            return Self {
                column,
                count,
                mean: f64::NAN,
                std: f64::NAN,
                min: f64::NAN,
                p25: f64::NAN,
                p50: f64::NAN,
                p75: f64::NAN,
                max: f64::NAN,
            };
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let mean = sorted.iter().sum::<f64>() / count as f64;
        let std = if count > 1 {
            let ss: f64 = sorted.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (count - 1) as f64).sqrt()
        } else {
            f64::NAN
        };

        Self {
            column,
            count,
            mean,
            std,
            min: sorted[0],
            p25: percentile(&sorted, 0.25),
            p50: percentile(&sorted, 0.50),
            p75: percentile(&sorted, 0.75),
            max: sorted[count - 1],
        }
    }

    fn values(&self) -> [f64; 8] {
        [
            self.count as f64,
            self.mean,
            self.std,
            self.min,
            self.p25,
            self.p50,
            self.p75,
            self.max,
        ]
    }
}

/// Linear interpolation between closest ranks. `sorted` must be ascending and
/// non-empty.
pub fn percentile(sorted: &[f64], q: f64) -> f64 {
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Per-column statistics for Retail, Price and Savings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub rows: usize,
    pub columns: Vec<ColumnSummary>,
}

impl Summary {
    pub fn column(&self, column: NumericColumn) -> Option<&ColumnSummary> {
        self.columns.iter().find(|c| c.column == column)
    }

    /// Statistic-per-row layout, one value column per numeric field.
    pub fn render(&self) -> TextTable {
        let mut table = TextTable::new();
        table.set_format(*format::consts::FORMAT_BOX_CHARS);

        let mut header = vec![Cell::new("")];
        header.extend(self.columns.iter().map(|c| Cell::new(c.column.name()).style_spec("bFg")));
        table.set_titles(Row::new(header));

        let per_column: Vec<[f64; 8]> = self.columns.iter().map(ColumnSummary::values).collect();
        for (i, label) in ["count", "mean", "std", "min", "25%", "50%", "75%", "max"]
            .iter()
            .enumerate()
        {
            let mut row = vec![Cell::new(label)];
            row.extend(
                per_column
                    .iter()
                    .map(|vals| Cell::new(&format!("{:.6}", vals[i])).style_spec("r")),
            );
            table.add_row(Row::new(row));
        }
        table
    }
}

pub fn summarize(table: &Table) -> Summary {
    Summary {
        rows: table.len(),
        columns: NumericColumn::ALL
            .iter()
            .map(|&c| ColumnSummary::from_values(c, &table.column(c)))
            .collect(),
    }
}
