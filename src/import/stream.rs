use chrono::NaiveDateTime;
use csv::{ReaderBuilder, Trim};
use log::warn;
use serde::Deserialize;

use super::ImportError;
use crate::model::MrtStream;

const REQUIRED_COLUMNS: [&str; 3] = ["date", "timestamp", "count"];

#[derive(Debug, Default)]
pub struct StreamParse {
    pub rows: Vec<MrtStream>,
    pub skipped: usize,
}

#[derive(Debug, Deserialize)]
struct StreamRow {
    date: String,
    timestamp: String,
    count: String,
}

/// Parses a `date,timestamp,count` file. Fails only when the header is
/// missing one of the columns; bad rows are skipped.
pub fn parse_stream_csv(content: &str, source: &str) -> Result<StreamParse, ImportError> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    if let Some(missing) = REQUIRED_COLUMNS
        .iter()
        .find(|col| !headers.iter().any(|h| h == **col))
    {
        return Err(ImportError::Format(format!("missing column `{}`", missing)));
    }

    let mut parsed = StreamParse::default();
    for (idx, result) in reader.deserialize::<StreamRow>().enumerate() {
        let row_no = idx + 2;
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                warn!("{}:{}: unreadable row: {}", source, row_no, e);
                parsed.skipped += 1;
                continue;
            }
        };
        match parse_row(&row) {
            Ok(sample) => parsed.rows.push(sample),
            Err(reason) => {
                warn!("{}:{}: {}", source, row_no, reason);
                parsed.skipped += 1;
            }
        }
    }
    Ok(parsed)
}

fn parse_row(row: &StreamRow) -> Result<MrtStream, String> {
    if row.date.is_empty() || row.timestamp.is_empty() {
        return Err(format!("empty date or time: {:?} {:?}", row.date, row.timestamp));
    }
    let raw = format!("{} {}", row.date, row.timestamp);
    let timestamp = NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S")
        .map_err(|e| format!("invalid timestamp {:?}: {}", raw, e))?;
    let count = row
        .count
        .parse::<i64>()
        .map_err(|e| format!("invalid count {:?}: {}", row.count, e))?;
    Ok(MrtStream::new(timestamp, count))
}
