//! Bulk loader for the crawler's CSV output.
//!
//! Layout under the data directory:
//!
//! ```text
//! MRT_carriage_data/<line name>/<YYYY-MM-DD>-<Weekday>.csv
//! MRT_stream_data/<YYYY-MM-DD>-<Weekday>.csv
//! ```
//!
//! Malformed rows are logged and skipped; a failed batch insert only
//! loses that file.

pub mod carriage;
pub mod stream;

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use log::{error, info, warn};
use thiserror::Error;

use crate::db::Store;
use crate::error::StoreError;
use crate::model::MrtLine;

pub use carriage::{parse_carriage_csv, CarriageParse};
pub use stream::{parse_stream_csv, StreamParse};

pub const CARRIAGE_DIR: &str = "MRT_carriage_data";
pub const STREAM_DIR: &str = "MRT_stream_data";

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("unexpected file format: {0}")]
    Format(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone, Debug)]
pub struct ImportOptions {
    pub data_dir: PathBuf,
    pub carriage: bool,
    pub stream: bool,
    /// Append instead of clearing the target table first.
    pub keep_existing: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub files_seen: usize,
    pub files_imported: usize,
    pub records: usize,
    pub rows_skipped: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub carriage: Option<ImportSummary>,
    pub stream: Option<ImportSummary>,
}

pub async fn run(store: &Store, options: &ImportOptions) -> Result<ImportReport, ImportError> {
    let mut report = ImportReport::default();
    if options.carriage {
        report.carriage = Some(import_carriage_data(store, &options.data_dir, options.keep_existing).await?);
    }
    if options.stream {
        report.stream = Some(import_stream_data(store, &options.data_dir, options.keep_existing).await?);
    }
    Ok(report)
}

pub async fn import_carriage_data(
    store: &Store,
    data_dir: &Path,
    keep_existing: bool,
) -> Result<ImportSummary, ImportError> {
    let repo = store.mrt_carriages();
    if !keep_existing {
        let removed = repo.delete_all().await?;
        info!("cleared {} carriage records", removed);
    }

    let root = data_dir.join(CARRIAGE_DIR);
    let mut summary = ImportSummary::default();
    for line in MrtLine::ALL {
        let line_dir = root.join(line.name());
        if !is_dir(&line_dir).await {
            warn!("no data directory for {} ({})", line.name(), line_dir.display());
            continue;
        }

        info!("importing {} ({})", line.name(), line.code());
        for path in csv_files(&line_dir).await? {
            summary.files_seen += 1;
            let name = file_name(&path);
            let Some(date) = date_from_file_name(&name) else {
                warn!("skipping {}: file name has no YYYY-MM-DD prefix", path.display());
                continue;
            };
            let content = match tokio::fs::read_to_string(&path).await {
                Ok(content) => content,
                Err(e) => {
                    error!("failed to read {}: {}", path.display(), e);
                    continue;
                }
            };

            let parsed = parse_carriage_csv(&content, date, line, &name);
            summary.rows_skipped += parsed.skipped;
            if parsed.rows.is_empty() {
                continue;
            }
            match repo.insert_many(&parsed.rows).await {
                Ok(n) => {
                    summary.records += n;
                    summary.files_imported += 1;
                    info!("imported {} rows from {}", n, name);
                }
                Err(e) => error!("failed to import {}: {}", name, e),
            }
        }
    }

    info!(
        "carriage import done: {} records from {}/{} files, {} rows skipped",
        summary.records, summary.files_imported, summary.files_seen, summary.rows_skipped
    );
    Ok(summary)
}

pub async fn import_stream_data(
    store: &Store,
    data_dir: &Path,
    keep_existing: bool,
) -> Result<ImportSummary, ImportError> {
    let repo = store.mrt_streams();
    if !keep_existing {
        let removed = repo.delete_all().await?;
        info!("cleared {} passenger stream records", removed);
    }

    let dir = data_dir.join(STREAM_DIR);
    let mut summary = ImportSummary::default();
    if !is_dir(&dir).await {
        warn!("no passenger stream directory at {}", dir.display());
        return Ok(summary);
    }

    let files = csv_files(&dir).await?;
    info!("found {} stream files in {}", files.len(), dir.display());
    for path in files {
        summary.files_seen += 1;
        let name = file_name(&path);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) => {
                error!("failed to read {}: {}", path.display(), e);
                continue;
            }
        };

        let parsed = match parse_stream_csv(&content, &name) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("skipping {}: {}", name, e);
                continue;
            }
        };
        summary.rows_skipped += parsed.skipped;
        if parsed.rows.is_empty() {
            continue;
        }
        match repo.insert_many(&parsed.rows).await {
            Ok(n) => {
                summary.records += n;
                summary.files_imported += 1;
                info!("imported {} samples from {}", n, name);
            }
            Err(e) => error!("failed to import {}: {}", name, e),
        }
    }

    info!(
        "stream import done: {} records from {}/{} files, {} rows skipped",
        summary.records, summary.files_imported, summary.files_seen, summary.rows_skipped
    );
    match repo.count_all().await {
        Ok(total) => info!("passenger stream records in store: {}", total),
        Err(e) => warn!("could not count stream records: {}", e),
    }
    match repo.time_range().await {
        Ok(Some((first, last))) => info!("stream data covers {} to {}", first, last),
        Ok(None) => {}
        Err(e) => warn!("could not read stream time range: {}", e),
    }
    Ok(summary)
}

/// `2024-01-02-Tuesday.csv` -> 2024-01-02
pub fn date_from_file_name(name: &str) -> Option<NaiveDate> {
    let prefix: Vec<&str> = name.splitn(4, '-').take(3).collect();
    if prefix.len() != 3 {
        return None;
    }
    let day = prefix[2].trim_end_matches(".csv");
    NaiveDate::parse_from_str(&format!("{}-{}-{}", prefix[0], prefix[1], day), "%Y-%m-%d").ok()
}

async fn is_dir(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_dir())
        .unwrap_or(false)
}

async fn csv_files(dir: &Path) -> Result<Vec<PathBuf>, ImportError> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) == Some("csv") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
