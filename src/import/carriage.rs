use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use csv::ReaderBuilder;
use log::{debug, warn};

use crate::model::mrt_carriage::NO_DATA;
use crate::model::{MrtCarriage, MrtLine};

/// First cell of the optional column header row.
const HEADER_CELL: &str = "編號";

#[derive(Debug, Default)]
pub struct CarriageParse {
    pub rows: Vec<MrtCarriage>,
    pub skipped: usize,
}

/// Parses one day's congestion file of `line`.
///
/// `==HH:MM:SS==` rows set the capture time for the station rows that
/// follow. Station rows have four cells: code, name, then the raw digit
/// strings toward the terminal and toward the origin.
pub fn parse_carriage_csv(content: &str, date: NaiveDate, line: MrtLine, source: &str) -> CarriageParse {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut parsed = CarriageParse::default();
    let mut current: Option<NaiveDateTime> = None;

    for (idx, result) in reader.records().enumerate() {
        let row_no = idx + 1;
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!("{}:{}: unreadable row: {}", source, row_no, e);
                parsed.skipped += 1;
                continue;
            }
        };
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let first = record.get(0).unwrap_or_default().trim();
        if first.starts_with("==") {
            let time = first.trim_matches('=');
            match NaiveTime::parse_from_str(time, "%H:%M:%S") {
                Ok(t) => current = Some(date.and_time(t)),
                Err(_) => warn!("{}:{}: invalid time marker {} {}", source, row_no, date, time),
            }
            continue;
        }
        if record.len() != 4 || first.starts_with("---") || first == HEADER_CELL {
            continue;
        }

        let Some(timestamp) = current else {
            debug!("{}:{}: station row before any time marker", source, row_no);
            parsed.skipped += 1;
            continue;
        };

        let (Some(to_terminal), Some(to_start)) = (
            parse_congestion(record.get(2).unwrap_or_default()),
            parse_congestion(record.get(3).unwrap_or_default()),
        ) else {
            warn!("{}:{}: invalid congestion value in {:?}", source, row_no, record);
            parsed.skipped += 1;
            continue;
        };

        parsed.rows.push(MrtCarriage {
            line_code: line.code().to_string(),
            line_name: line.name().to_string(),
            station_code: first.to_string(),
            station_name: record.get(1).unwrap_or_default().trim().to_string(),
            to_terminal,
            to_start,
            timestamp,
        });
    }

    parsed
}

/// `Some(None)` for the no-data placeholder, `Some(Some(digits))` for a
/// digit string, `None` when the cell is malformed.
fn parse_congestion(cell: &str) -> Option<Option<String>> {
    let cell = cell.trim();
    if cell == NO_DATA {
        return Some(None);
    }
    if !cell.is_empty() && cell.chars().all(|c| c.is_ascii_digit()) {
        return Some(Some(cell.to_string()));
    }
    None
}
