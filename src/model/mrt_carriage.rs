//! Per-car congestion snapshots of the Taipei MRT lines.
//!
//! The crawler records one digit per physical car (`1` light, `2` busy,
//! `3` full) for both directions of travel. Rows captured in the same
//! crawl share one timestamp; together they form a line's snapshot.

use chrono::NaiveDateTime;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Serialize;

use crate::entity::mrt_carriage;
use crate::error::StoreError;
use crate::repository::{Document, Record, Repository};

/// Written by the crawler when a direction has no reading.
pub const NO_DATA: &str = "----";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum MrtLine {
    Bannan,
    TamsuiXinyi,
    SongshanXindian,
    ZhongheXinlu,
    Wenhu,
}

impl MrtLine {
    pub const ALL: [MrtLine; 5] = [
        MrtLine::Bannan,
        MrtLine::TamsuiXinyi,
        MrtLine::SongshanXindian,
        MrtLine::ZhongheXinlu,
        MrtLine::Wenhu,
    ];

    pub fn code(self) -> &'static str {
        match self {
            MrtLine::Bannan => "BL",
            MrtLine::TamsuiXinyi => "R",
            MrtLine::SongshanXindian => "G",
            MrtLine::ZhongheXinlu => "O",
            MrtLine::Wenhu => "BR",
        }
    }

    /// Name used for the line's data directory.
    pub fn name(self) -> &'static str {
        match self {
            MrtLine::Bannan => "板南線",
            MrtLine::TamsuiXinyi => "淡水信義線",
            MrtLine::SongshanXindian => "松山新店線",
            MrtLine::ZhongheXinlu => "中和新蘆線",
            MrtLine::Wenhu => "文湖線",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|line| line.code().eq_ignore_ascii_case(code))
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|line| line.name() == name)
    }
}

/// Percentage for one car's congestion digit.
pub fn decode_level(digit: char) -> f64 {
    match digit {
        '1' => 33.33,
        '2' => 66.67,
        '3' => 100.0,
        _ => 0.0,
    }
}

/// Decodes a per-car digit string; a missing value or the no-data
/// placeholder yields `None`.
pub fn decode_congestion(raw: Option<&str>) -> Option<Vec<f64>> {
    match raw {
        None => None,
        Some(NO_DATA) => None,
        Some(digits) => Some(digits.chars().map(decode_level).collect()),
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MrtCarriage {
    pub line_code: String,
    pub line_name: String,
    pub station_code: String,
    pub station_name: String,
    pub to_terminal: Option<String>,
    pub to_start: Option<String>,
    pub timestamp: NaiveDateTime,
}

impl MrtCarriage {
    pub fn to_terminal_levels(&self) -> Option<Vec<f64>> {
        decode_congestion(self.to_terminal.as_deref())
    }

    pub fn to_start_levels(&self) -> Option<Vec<f64>> {
        decode_congestion(self.to_start.as_deref())
    }
}

impl Document for MrtCarriage {
    type Entity = mrt_carriage::Entity;
    type ActiveModel = mrt_carriage::ActiveModel;

    fn to_active_model(&self) -> mrt_carriage::ActiveModel {
        mrt_carriage::ActiveModel {
            line_code: Set(self.line_code.clone()),
            line_name: Set(self.line_name.clone()),
            station_code: Set(self.station_code.clone()),
            station_name: Set(self.station_name.clone()),
            to_terminal: Set(self.to_terminal.clone()),
            to_start: Set(self.to_start.clone()),
            timestamp: Set(self.timestamp),
            ..Default::default()
        }
    }

    fn from_model(model: mrt_carriage::Model) -> (i32, Self) {
        (
            model.id,
            Self {
                line_code: model.line_code,
                line_name: model.line_name,
                station_code: model.station_code,
                station_name: model.station_name,
                to_terminal: model.to_terminal,
                to_start: model.to_start,
                timestamp: model.timestamp,
            },
        )
    }
}

impl Repository<MrtCarriage> {
    /// Every station row of the line's most recent snapshot, ordered by
    /// station code. Empty when the line has no data.
    pub async fn get_latest_by_line(&self, line_code: &str) -> Result<Vec<Record<MrtCarriage>>, StoreError> {
        let latest = self
            .fetch_one(
                mrt_carriage::Entity::find()
                    .filter(mrt_carriage::Column::LineCode.eq(line_code))
                    .order_by_desc(mrt_carriage::Column::Timestamp),
            )
            .await?;
        let Some(latest) = latest else {
            return Ok(Vec::new());
        };

        self.fetch_all(
            mrt_carriage::Entity::find()
                .filter(mrt_carriage::Column::LineCode.eq(line_code))
                .filter(mrt_carriage::Column::Timestamp.eq(latest.data().timestamp))
                .order_by_asc(mrt_carriage::Column::StationCode),
        )
        .await
    }
}
