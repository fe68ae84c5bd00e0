pub mod export;
pub mod plot;
pub mod stats;

pub use export::{export_csv, export_parquet, read_csv, write_summary_json};
pub use plot::visualize;
pub use stats::{summarize, ColumnSummary, Summary};
