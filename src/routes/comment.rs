use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::db::Store;
use crate::error::AppError;
use crate::response::ResponseDto;
use crate::routes::post::CommentDto;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/add").route(web::post().to(add)))
        .service(web::resource("/mine").route(web::get().to(mine)));
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SaveCommentRequest {
    post_id: i32,
    content: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SaveCommentResponse {
    id: i32,
}

async fn add(
    store: web::Data<Store>,
    auth: AuthUser,
    payload: web::Json<SaveCommentRequest>,
) -> Result<HttpResponse, AppError> {
    let content = payload.content.clone().unwrap_or_default();
    if content.trim().is_empty() {
        return Err(AppError::param_error("comment cannot be empty"));
    }

    store
        .posts()
        .find_by_id(payload.post_id)
        .await?
        .ok_or_else(|| AppError::fail("post does not exist"))?;

    let id = store
        .comments()
        .create(&content, payload.post_id, auth.user_id, None)
        .await?;
    Ok(HttpResponse::Ok().json(ResponseDto::success(Some(SaveCommentResponse { id }))))
}

async fn mine(store: web::Data<Store>, auth: AuthUser) -> Result<HttpResponse, AppError> {
    let list: Vec<CommentDto> = store
        .comments()
        .find_by_author(auth.user_id)
        .await?
        .into_iter()
        .filter_map(|comment| CommentDto::from_record(comment, Some(auth.username.clone())))
        .collect();
    Ok(HttpResponse::Ok().json(ResponseDto::success(Some(list))))
}
