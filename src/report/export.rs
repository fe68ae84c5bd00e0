// src/report/export.rs

use super::stats::Summary;
use crate::error::{Result, ScrapeError};
use crate::table::{Record, Table, HEADER};
use arrow::{
    array::{ArrayRef, Float64Array, StringArray},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use chrono::{DateTime, Utc};
use parquet::{arrow::ArrowWriter, basic::Compression, file::properties::WriterProperties};
use serde::Serialize;
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::{info, instrument};

/// Plain decimal with at least one fractional digit: `10.0`, `1234.56`.
pub fn format_decimal(v: f64) -> String {
    if v.fract() == 0.0 && v.is_finite() {
        format!("{v:.1}")
    } else {
        format!("{v}")
    }
}

/// Temp file next to `path`, renamed over it once fully written.
fn write_atomically<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(File) -> Result<()>,
{
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|e| ScrapeError::io(dir, e))?;
    }
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp_path = path.with_file_name(format!(".{name}.tmp"));

    let file = File::create(&tmp_path).map_err(|e| ScrapeError::io(&tmp_path, e))?;
    if let Err(e) = write(file) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }
    fs::rename(&tmp_path, path).map_err(|e| ScrapeError::io(path, e))?;
    Ok(())
}

/// Write the table as CSV, medication first, overwriting `path`.
#[instrument(level = "info", skip(table), fields(rows = table.len(), path = %path.display()))]
pub fn export_csv(table: &Table, path: &Path) -> Result<()> {
    write_atomically(path, |file| {
        let mut wtr = csv::Writer::from_writer(BufWriter::new(file));
        wtr.write_record(HEADER)?;
        for r in table {
            let (retail, price, savings) = (
                format_decimal(r.retail),
                format_decimal(r.price),
                format_decimal(r.savings),
            );
            wtr.write_record([
                r.medication.as_str(),
                r.form.as_str(),
                retail.as_str(),
                price.as_str(),
                savings.as_str(),
            ])?;
        }
        wtr.flush().map_err(|e| ScrapeError::io(path, e))?;
        Ok(())
    })?;
    info!("csv written");
    Ok(())
}

/// Read back a file produced by `export_csv`.
pub fn read_csv(path: &Path) -> Result<Table> {
    let file = File::open(path).map_err(|e| ScrapeError::io(path, e))?;
    let mut rdr = csv::Reader::from_reader(file);

    let headers = rdr.headers()?.clone();
    if headers.iter().ne(HEADER.iter().copied()) {
        return Err(ScrapeError::Config(format!(
            "{}: unexpected header {:?}",
            path.display(),
            headers.iter().collect::<Vec<_>>()
        )));
    }

    let records = rdr.deserialize::<Record>().collect::<Result<Vec<_>, _>>()?;
    Ok(Table::new(records))
}

fn record_batch(table: &Table) -> Result<RecordBatch> {
    let schema = Schema::new(vec![
        Field::new(HEADER[0], DataType::Utf8, false),
        Field::new(HEADER[1], DataType::Utf8, false),
        Field::new(HEADER[2], DataType::Float64, false),
        Field::new(HEADER[3], DataType::Float64, false),
        Field::new(HEADER[4], DataType::Float64, false),
    ]);
    let recs = table.records();
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from_iter_values(recs.iter().map(|r| r.medication.as_str()))),
        Arc::new(StringArray::from_iter_values(recs.iter().map(|r| r.form.as_str()))),
        Arc::new(Float64Array::from_iter_values(recs.iter().map(|r| r.retail))),
        Arc::new(Float64Array::from_iter_values(recs.iter().map(|r| r.price))),
        Arc::new(Float64Array::from_iter_values(recs.iter().map(|r| r.savings))),
    ];
    Ok(RecordBatch::try_new(Arc::new(schema), columns)?)
}

/// Columnar copy of the table for downstream analysis tools.
#[instrument(level = "info", skip(table), fields(rows = table.len(), path = %path.display()))]
pub fn export_parquet(table: &Table, path: &Path) -> Result<()> {
    let batch = record_batch(table)?;
    write_atomically(path, |file| {
        let props = WriterProperties::builder()
            .set_compression(Compression::SNAPPY)
            .build();
        let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
        writer.write(&batch)?;
        writer.close()?;
        Ok(())
    })?;
    info!("parquet written");
    Ok(())
}

#[derive(Serialize)]
struct SummaryDocument<'a> {
    generated_at: DateTime<Utc>,
    sources: &'a [String],
    #[serde(flatten)]
    summary: &'a Summary,
}

/// Pretty JSON of the run summary, with the run time and source pages.
pub fn write_summary_json(
    summary: &Summary,
    generated_at: DateTime<Utc>,
    sources: &[String],
    path: &Path,
) -> Result<PathBuf> {
    let doc = SummaryDocument {
        generated_at,
        sources,
        summary,
    };
    write_atomically(path, |file| {
        let mut out = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut out, &doc)
            .map_err(|e| ScrapeError::io(path, e.into()))?;
        out.write_all(b"\n").map_err(|e| ScrapeError::io(path, e))?;
        out.flush().map_err(|e| ScrapeError::io(path, e))?;
        Ok(())
    })?;
    Ok(path.to_path_buf())
}
