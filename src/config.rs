// src/config.rs

use crate::error::{Result, ScrapeError};
use crate::process::ROW_WIDTH;
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::info;
use url::Url;

/// Env var naming an optional YAML config file.
pub const CONFIG_ENV: &str = "RXSCRAPER_CONFIG";

/// Category pages for popular drug indications.
static DEFAULT_CATEGORY_URLS: &[&str] = &[
    "https://costplusdrugs.com/medications/categories/diabetes/",
    "https://costplusdrugs.com/medications/categories/high-blood-pressure/",
    "https://costplusdrugs.com/medications/categories/high-cholesterol/",
    "https://costplusdrugs.com/medications/categories/gastrointestinal/",
    "https://costplusdrugs.com/medications/categories/allergies/",
    "https://costplusdrugs.com/medications/categories/infection/",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RendererKind {
    /// Headless Chrome, executes page scripts.
    Chrome,
    /// Plain HTTP GET, for pre-rendered pages.
    Http,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettleMode {
    /// Wait for the first cell to appear, bounded by the settle duration.
    UntilSelector,
    /// Sleep for the whole settle duration after navigation.
    Fixed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub renderer: RendererKind,
    pub headless: bool,
    pub settle_secs: u64,
    pub settle_mode: SettleMode,
    pub abort_on_error: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            renderer: RendererKind::Chrome,
            headless: true,
            settle_secs: 8,
            settle_mode: SettleMode::UntilSelector,
            abort_on_error: false,
        }
    }
}

impl FetchConfig {
    pub fn settle(&self) -> Duration {
        Duration::from_secs(self.settle_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    pub cell_selector: String,
    pub columns: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            cell_selector: r#"div[role="cell"]"#.to_string(),
            columns: ROW_WIDTH,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub csv_name: String,
    pub summary_name: String,
    pub parquet_name: String,
    pub plots: bool,
    pub parquet: bool,
    pub histogram_bins: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("output"),
            csv_name: "medications.csv".to_string(),
            summary_name: "summary.json".to_string(),
            parquet_name: "medications.parquet".to_string(),
            plots: true,
            parquet: false,
            histogram_bins: 25,
        }
    }
}

impl OutputConfig {
    pub fn csv_path(&self) -> PathBuf {
        self.dir.join(&self.csv_name)
    }

    pub fn summary_path(&self) -> PathBuf {
        self.dir.join(&self.summary_name)
    }

    pub fn parquet_path(&self) -> PathBuf {
        self.dir.join(&self.parquet_name)
    }
}

/// Run configuration. `Default` reproduces the stock category scrape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub urls: Vec<String>,
    pub fetch: FetchConfig,
    pub extract: ExtractConfig,
    pub output: OutputConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            urls: DEFAULT_CATEGORY_URLS.iter().map(|u| u.to_string()).collect(),
            fetch: FetchConfig::default(),
            extract: ExtractConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    /// Load from the file named by `RXSCRAPER_CONFIG`, or fall back to defaults.
    pub fn load() -> Result<Self> {
        match env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_path(Path::new(&path)),
            None => {
                info!("{} not set; using built-in configuration", CONFIG_ENV);
                Ok(Self::default())
            }
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| ScrapeError::io(path, e))?;
        let cfg = Self::from_yaml(&text)
            .map_err(|e| ScrapeError::Config(format!("{}: {}", path.display(), e)))?;
        info!(path = %path.display(), urls = cfg.urls.len(), "loaded configuration");
        Ok(cfg)
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        let cfg: Self =
            serde_yaml::from_str(text).map_err(|e| ScrapeError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.extract.columns != ROW_WIDTH {
            return Err(ScrapeError::Config(format!(
                "extract.columns is {}, but scraped rows have {} cells",
                self.extract.columns, ROW_WIDTH
            )));
        }
        if self.output.histogram_bins == 0 {
            return Err(ScrapeError::Config(
                "output.histogram_bins must be at least 1".into(),
            ));
        }
        self.addresses().map(|_| ())
    }

    /// Parsed page addresses, in configured order.
    pub fn addresses(&self) -> Result<Vec<Url>> {
        self.urls
            .iter()
            .map(|u| {
                Url::parse(u).map_err(|e| ScrapeError::Config(format!("invalid URL {u:?}: {e}")))
            })
            .collect()
    }
}
