use actix_web::{web, HttpResponse};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::db::Store;
use crate::error::AppError;
use crate::model::{MrtCarriage, MrtLine, MrtStream};
use crate::response::ResponseDto;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/lines").route(web::get().to(lines)))
        .service(web::resource("/carriage/{line_code}").route(web::get().to(carriage_by_line)))
        .service(web::resource("/stream/daily").route(web::get().to(daily_stream)));
}

#[derive(Serialize)]
struct LineDto {
    code: &'static str,
    name: &'static str,
}

#[derive(Serialize)]
struct CarriageDto {
    station_name: String,
    to_terminal: Option<Vec<f64>>,
    to_start: Option<Vec<f64>>,
    station_code: String,
}

impl From<MrtCarriage> for CarriageDto {
    fn from(row: MrtCarriage) -> Self {
        Self {
            to_terminal: row.to_terminal_levels(),
            to_start: row.to_start_levels(),
            station_name: row.station_name,
            station_code: row.station_code,
        }
    }
}

#[derive(Serialize)]
struct StreamDto {
    timestamp: NaiveDateTime,
    count: i64,
    date: String,
    weekday: String,
}

impl From<MrtStream> for StreamDto {
    fn from(sample: MrtStream) -> Self {
        Self {
            timestamp: sample.timestamp,
            count: sample.count,
            date: sample.date,
            weekday: sample.weekday,
        }
    }
}

#[derive(Deserialize)]
struct DailyQuery {
    date: Option<String>,
}

async fn lines() -> Result<HttpResponse, AppError> {
    let list: Vec<LineDto> = MrtLine::ALL
        .into_iter()
        .map(|line| LineDto {
            code: line.code(),
            name: line.name(),
        })
        .collect();
    Ok(HttpResponse::Ok().json(ResponseDto::success(Some(list))))
}

/// Latest congestion snapshot of one line as a bare JSON array.
async fn carriage_by_line(
    store: web::Data<Store>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let line_code = MrtLine::from_code(&path)
        .map(|line| line.code().to_string())
        .unwrap_or_else(|| path.into_inner());

    let rows: Vec<CarriageDto> = store
        .mrt_carriages()
        .get_latest_by_line(&line_code)
        .await?
        .into_iter()
        .map(|record| CarriageDto::from(record.into_data()))
        .collect();
    Ok(HttpResponse::Ok().json(rows))
}

/// One day of passenger counts as a bare JSON array.
async fn daily_stream(
    store: web::Data<Store>,
    query: web::Query<DailyQuery>,
) -> Result<HttpResponse, AppError> {
    let date = match query.date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        Some(raw) => Some(
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|_| AppError::param_error("date must be YYYY-MM-DD"))?,
        ),
        None => None,
    };

    let rows: Vec<StreamDto> = store
        .mrt_streams()
        .get_daily_data(date)
        .await?
        .into_iter()
        .map(|record| StreamDto::from(record.into_data()))
        .collect();
    Ok(HttpResponse::Ok().json(rows))
}
