use chrono::{NaiveDate, NaiveDateTime};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set};

use crate::entity::mrt_stream;
use crate::error::StoreError;
use crate::repository::{Document, Record, Repository};

/// One system-wide passenger count sample.
#[derive(Clone, Debug, PartialEq)]
pub struct MrtStream {
    pub count: i64,
    pub timestamp: NaiveDateTime,
    pub date: String,
    pub time: String,
    pub weekday: String,
}

impl MrtStream {
    /// Derives the date, time-of-day and weekday columns from `timestamp`.
    pub fn new(timestamp: NaiveDateTime, count: i64) -> Self {
        Self {
            count,
            timestamp,
            date: timestamp.format("%Y-%m-%d").to_string(),
            time: timestamp.format("%H:%M:%S").to_string(),
            weekday: timestamp.format("%A").to_string(),
        }
    }
}

impl Document for MrtStream {
    type Entity = mrt_stream::Entity;
    type ActiveModel = mrt_stream::ActiveModel;

    fn to_active_model(&self) -> mrt_stream::ActiveModel {
        mrt_stream::ActiveModel {
            count: Set(self.count),
            timestamp: Set(self.timestamp),
            date: Set(self.date.clone()),
            time: Set(self.time.clone()),
            weekday: Set(self.weekday.clone()),
            ..Default::default()
        }
    }

    fn from_model(model: mrt_stream::Model) -> (i32, Self) {
        (
            model.id,
            Self {
                count: model.count,
                timestamp: model.timestamp,
                date: model.date,
                time: model.time,
                weekday: model.weekday,
            },
        )
    }
}

impl Repository<MrtStream> {
    pub async fn find_latest(&self) -> Result<Option<Record<MrtStream>>, StoreError> {
        self.fetch_one(mrt_stream::Entity::find().order_by_desc(mrt_stream::Column::Timestamp))
            .await
    }

    pub async fn find_earliest(&self) -> Result<Option<Record<MrtStream>>, StoreError> {
        self.fetch_one(mrt_stream::Entity::find().order_by_asc(mrt_stream::Column::Timestamp))
            .await
    }

    /// All samples of one calendar day in chronological order. Without a
    /// date the day of the most recent sample is used.
    pub async fn get_daily_data(&self, date: Option<NaiveDate>) -> Result<Vec<Record<MrtStream>>, StoreError> {
        let day = match date {
            Some(day) => day,
            None => match self.find_latest().await? {
                Some(latest) => latest.data().timestamp.date(),
                None => return Ok(Vec::new()),
            },
        };

        let (Some(start), Some(end)) = (
            day.and_hms_opt(0, 0, 0),
            day.and_hms_micro_opt(23, 59, 59, 999_999),
        ) else {
            return Ok(Vec::new());
        };
        self.fetch_all(
            mrt_stream::Entity::find()
                .filter(mrt_stream::Column::Timestamp.between(start, end))
                .order_by_asc(mrt_stream::Column::Timestamp),
        )
        .await
    }

    pub async fn count_all(&self) -> Result<u64, StoreError> {
        let db = self.store().conn()?;
        Ok(mrt_stream::Entity::find().count(db).await?)
    }

    /// Earliest and latest stored timestamps.
    pub async fn time_range(&self) -> Result<Option<(NaiveDateTime, NaiveDateTime)>, StoreError> {
        let earliest = self.find_earliest().await?;
        let latest = self.find_latest().await?;
        Ok(match (earliest, latest) {
            (Some(first), Some(last)) => Some((first.data().timestamp, last.data().timestamp)),
            _ => None,
        })
    }
}
