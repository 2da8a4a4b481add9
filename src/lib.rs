//! Blog backend (users, posts, comments) with a read-only MRT dashboard
//! API over imported crawler data.

pub mod auth;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod import;
pub mod model;
pub mod repository;
pub mod response;
pub mod routes;

use actix_web::web;

use crate::config::AppConfig;
use crate::db::Store;
use crate::response::{json_error_handler, query_error_handler};

/// Shared state, extractor config and routes for one `App`.
pub fn configure_app(store: Store, config: AppConfig) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(web::Data::new(store))
            .app_data(web::Data::new(config))
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(web::QueryConfig::default().error_handler(query_error_handler))
            .configure(routes::configure);
    }
}
