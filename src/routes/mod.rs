pub mod comment;
pub mod mrt;
pub mod post;
pub mod user;

use actix_web::web;
use chrono::{DateTime, SecondsFormat, Utc};

/// Mounts every API scope under `/api`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(web::scope("/user").configure(user::config))
            .service(web::scope("/post").configure(post::config))
            .service(web::scope("/comment").configure(comment::config))
            .service(web::scope("/mrt").configure(mrt::config)),
    );
}

pub(crate) fn to_rfc3339(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, false)
}
