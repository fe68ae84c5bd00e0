pub mod config;
pub mod error;
pub mod fetch;
pub mod pipeline;
pub mod process;
pub mod report;
pub mod table;

pub use config::Config;
pub use error::{Result, ScrapeError};
pub use pipeline::{run, run_with, RunReport};
pub use table::{NumericColumn, Record, Table};
