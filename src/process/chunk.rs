// src/process/chunk.rs

use crate::error::{Result, ScrapeError};

/// Number of cells in one scraped table row.
pub const ROW_WIDTH: usize = 6;

/// Split a flat cell list into consecutive rows of `width`.
///
/// A trailing partial row would shift every column after it, so it is
/// rejected rather than kept.
pub fn chunk(cells: Vec<String>, width: usize) -> Result<Vec<Vec<String>>> {
    if width == 0 {
        return Err(ScrapeError::Config("row width must be at least 1".into()));
    }
    if cells.len() % width != 0 {
        return Err(ScrapeError::MalformedRow {
            url: None,
            cells: cells.len(),
            width,
        });
    }

    let mut rows = Vec::with_capacity(cells.len() / width);
    let mut it = cells.into_iter();
    loop {
        let row: Vec<String> = it.by_ref().take(width).collect();
        if row.is_empty() {
            break;
        }
        rows.push(row);
    }
    Ok(rows)
}

/// One six-cell row as scraped, before any cleaning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub medication: String,
    pub form: String,
    pub retail: String,
    pub price: String,
    pub savings: String,
    pub button: String,
}

impl TryFrom<Vec<String>> for RawRow {
    type Error = ScrapeError;

    fn try_from(cells: Vec<String>) -> Result<Self> {
        let n = cells.len();
        let [medication, form, retail, price, savings, button]: [String; ROW_WIDTH] =
            cells.try_into().map_err(|_| ScrapeError::MalformedRow {
                url: None,
                cells: n,
                width: ROW_WIDTH,
            })?;
        Ok(Self {
            medication,
            form,
            retail,
            price,
            savings,
            button,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("c{i}")).collect()
    }

    #[test]
    fn full_rows() -> Result<()> {
        for n in [0, 6, 12, 132] {
            let rows = chunk(cells(n), ROW_WIDTH)?;
            assert_eq!(rows.len(), n / ROW_WIDTH);
            assert!(rows.iter().all(|r| r.len() == ROW_WIDTH));
        }
        let rows = chunk(cells(12), ROW_WIDTH)?;
        assert_eq!(rows[1][0], "c6");
        assert_eq!(rows[1][5], "c11");
        Ok(())
    }

    #[test]
    fn trailing_partial_row_is_rejected() {
        for n in [1, 5, 7, 13] {
            match chunk(cells(n), ROW_WIDTH) {
                Err(ScrapeError::MalformedRow { cells, width, url }) => {
                    assert_eq!(cells, n);
                    assert_eq!(width, ROW_WIDTH);
                    assert!(url.is_none());
                }
                other => panic!("{n} cells: expected MalformedRow, got {other:?}"),
            }
        }
    }

    #[test]
    fn zero_width_is_config_error() {
        assert!(matches!(chunk(cells(6), 0), Err(ScrapeError::Config(_))));
    }

    #[test]
    fn raw_row_from_six_cells() -> Result<()> {
        let row = RawRow::try_from(cells(6))?;
        assert_eq!(row.medication, "c0");
        assert_eq!(row.savings, "c4");
        assert_eq!(row.button, "c5");
        assert!(RawRow::try_from(cells(5)).is_err());
        Ok(())
    }
}
