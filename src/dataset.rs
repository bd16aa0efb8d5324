//! Dataset loading: remote fetch with local fallback, then CSV parsing.
//!
//! ## Source Selection
//!
//! ```text
//! data.remote_url set and http(s)?
//! ├── yes → fetch (bounded by data.fetch_timeout_secs)
//! │         ├── Fetched + CSV with a name column → save data/points_fetched.csv, use it
//! │         └── Failed(reason) or unusable        → warn, use data.local_csv
//! └── no  → use data.local_csv
//! ```
//!
//! A failed fetch is never an error for the build. A missing local file is.
//!
//! ## Parsing
//!
//! The source is comma-delimited text with a header row. Keys and values are
//! trimmed; rows whose `name` is blank are dropped. Ragged rows are tolerated.

use crate::config::SiteConfig;
use crate::types::Row;
use csv::{ReaderBuilder, Trim};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Where a fetched payload is saved, relative to the project root.
pub const FETCH_CACHE_PATH: &str = "data/points_fetched.csv";

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Cannot read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("CSV error in {origin}: {source}")]
    Csv { origin: String, source: csv::Error },
}

/// Outcome of a remote fetch. Failures carry a human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchResult {
    Fetched(String),
    Failed(String),
}

/// Which source the rows were read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Remote { url: String, cache: PathBuf },
    Local { path: PathBuf },
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Remote { url, .. } => write!(f, "{url}"),
            DataSource::Local { path } => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadedDataset {
    pub rows: Vec<Row>,
    pub source: DataSource,
}

/// Parse CSV text into rows, dropping rows without a name.
///
/// `origin` names the source in error messages.
pub fn parse_rows(text: &str, origin: &str) -> Result<Vec<Row>, DatasetError> {
    let csv_err = |source: csv::Error| DatasetError::Csv {
        origin: origin.to_string(),
        source,
    };

    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers().map_err(csv_err)?.clone();

    let mut rows = Vec::new();
    let mut dropped = 0usize;
    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(csv_err)?;
        match Row::from_pairs(headers.iter().zip(record.iter())) {
            Some(row) => rows.push(row),
            None => {
                dropped += 1;
                log::debug!("{origin}: dropping record {} without a name", line + 1);
            }
        }
    }
    if dropped > 0 {
        log::info!("{origin}: skipped {dropped} rows without a name");
    }
    Ok(rows)
}

/// Fetch a remote CSV payload. Any failure becomes [`FetchResult::Failed`].
pub fn fetch_remote(url: &Url, timeout: Duration) -> FetchResult {
    match try_fetch(url, timeout) {
        Ok(body) => FetchResult::Fetched(body),
        Err(reason) => FetchResult::Failed(reason),
    }
}

fn try_fetch(url: &Url, timeout: Duration) -> Result<String, String> {
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| format!("cannot build HTTP client: {e}"))?;
    let response = client
        .get(url.clone())
        .send()
        .map_err(|e| format!("request failed: {e}"))?
        .error_for_status()
        .map_err(|e| format!("bad status: {e}"))?;
    let bytes = response
        .bytes()
        .map_err(|e| format!("failed reading body: {e}"))?;
    String::from_utf8(bytes.to_vec()).map_err(|e| format!("body is not UTF-8: {e}"))
}

/// Load the dataset for a project rooted at `root`.
pub fn load_rows(config: &SiteConfig, root: &Path) -> Result<LoadedDataset, DatasetError> {
    if let Some(url) = config.remote_url() {
        log::info!("Fetching dataset from {url}");
        match fetch_remote(&url, config.data.fetch_timeout()) {
            FetchResult::Fetched(body) => match parse_fetched(&body, url.as_str()) {
                Ok(rows) => {
                    let cache = root.join(FETCH_CACHE_PATH);
                    persist_fetched(&cache, &body);
                    return Ok(LoadedDataset {
                        rows,
                        source: DataSource::Remote {
                            url: url.to_string(),
                            cache,
                        },
                    });
                }
                Err(e) => log::warn!("Remote dataset unusable, using local CSV: {e}"),
            },
            FetchResult::Failed(reason) => {
                log::warn!("Could not fetch remote dataset, using local CSV: {reason}")
            }
        }
    }
    load_local(&root.join(&config.data.local_csv))
}

/// Parse a fetched payload. Anything without a `name` column in its header
/// row (an HTML login or error page served with 200, say) is rejected.
fn parse_fetched(body: &str, origin: &str) -> Result<Vec<Row>, String> {
    let has_name_column = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(body.as_bytes())
        .headers()
        .map(|headers| headers.iter().any(|h| h == "name"))
        .unwrap_or(false);
    if !has_name_column {
        return Err("payload has no `name` column".to_string());
    }
    parse_rows(body, origin).map_err(|e| e.to_string())
}

/// Read and parse a local CSV file.
pub fn load_local(path: &Path) -> Result<LoadedDataset, DatasetError> {
    let text = fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let rows = parse_rows(&text, &path.display().to_string())?;
    Ok(LoadedDataset {
        rows,
        source: DataSource::Local {
            path: path.to_path_buf(),
        },
    })
}

/// Save the fetched payload for inspection. Failure only costs the copy.
fn persist_fetched(cache: &Path, body: &str) {
    let result = cache
        .parent()
        .map(fs::create_dir_all)
        .unwrap_or(Ok(()))
        .and_then(|()| fs::write(cache, body));
    if let Err(e) = result {
        log::warn!("Could not save fetched dataset to {}: {e}", cache.display());
    }
}
