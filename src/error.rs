// src/error.rs

use std::{io, path::PathBuf};
use thiserror::Error;

pub type Result<T, E = ScrapeError> = std::result::Result<T, E>;

/// Everything a pipeline stage can fail with. Each variant names the input
/// that caused it (URL, row, field or path).
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("failed to render {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("row {row}: field `{field}` is not a non-negative number: {value:?}")]
    Parse {
        row: usize,
        field: &'static str,
        value: String,
    },

    #[error(
        "malformed table{}: {cells} cells do not split into rows of {width}",
        .url.as_deref().map(|u| format!(" at {u}")).unwrap_or_default()
    )]
    MalformedRow {
        url: Option<String>,
        cells: usize,
        width: usize,
    },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("plot error: {0}")]
    Plot(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl ScrapeError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Attach the page URL to a `MalformedRow` raised by the reassembler.
    pub fn at_url(self, page: &str) -> Self {
        match self {
            Self::MalformedRow { cells, width, .. } => Self::MalformedRow {
                url: Some(page.to_string()),
                cells,
                width,
            },
            other => other,
        }
    }
}
