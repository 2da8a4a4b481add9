use std::collections::HashMap;

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::db::Store;
use crate::error::AppError;
use crate::model::{Comment, Post};
use crate::repository::Record;
use crate::response::ResponseDto;
use crate::routes::to_rfc3339;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/list").route(web::get().to(list)))
        .service(web::resource("/save").route(web::post().to(save)))
        .service(web::resource("/{id:\\d+}").route(web::get().to(detail)));
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SavePostRequest {
    title: Option<String>,
    content: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SavePostResponse {
    id: i32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PostDto {
    id: i32,
    title: String,
    content: String,
    user_id: i32,
    author_name: Option<String>,
    created_at: String,
}

impl PostDto {
    pub(crate) fn from_record(record: Record<Post>, author_name: Option<String>) -> Option<Self> {
        let id = record.id()?;
        let post = record.into_data();
        Some(Self {
            id,
            title: post.title,
            content: post.content,
            user_id: post.user_id,
            author_name,
            created_at: to_rfc3339(post.created_at),
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CommentDto {
    id: i32,
    post_id: i32,
    user_id: i32,
    author_name: Option<String>,
    content: String,
    created_at: String,
}

impl CommentDto {
    pub(crate) fn from_record(record: Record<Comment>, author_name: Option<String>) -> Option<Self> {
        let id = record.id()?;
        let comment = record.into_data();
        Some(Self {
            id,
            post_id: comment.post_id,
            user_id: comment.user_id,
            author_name,
            content: comment.content,
            created_at: to_rfc3339(comment.created_at),
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PostDetailResponse {
    post: PostDto,
    comments: Vec<CommentDto>,
}

async fn list(store: web::Data<Store>) -> Result<HttpResponse, AppError> {
    let posts = store.posts().find_all().await?;
    let names = author_names(&store, posts.iter().map(|p| p.data().user_id)).await?;

    let items: Vec<PostDto> = posts
        .into_iter()
        .filter_map(|post| {
            let author = names.get(&post.data().user_id).cloned();
            PostDto::from_record(post, author)
        })
        .collect();
    Ok(HttpResponse::Ok().json(ResponseDto::success(Some(items))))
}

async fn save(
    store: web::Data<Store>,
    auth: AuthUser,
    payload: web::Json<SavePostRequest>,
) -> Result<HttpResponse, AppError> {
    let title = payload.title.clone().unwrap_or_default();
    let content = payload.content.clone().unwrap_or_default();
    if title.trim().is_empty() {
        return Err(AppError::param_error("title cannot be empty"));
    }
    if content.trim().is_empty() {
        return Err(AppError::param_error("content cannot be empty"));
    }

    let id = store
        .posts()
        .create(title.trim(), &content, auth.user_id, None)
        .await?;
    Ok(HttpResponse::Ok().json(ResponseDto::success(Some(SavePostResponse { id }))))
}

async fn detail(store: web::Data<Store>, path: web::Path<i32>) -> Result<HttpResponse, AppError> {
    let post = store
        .posts()
        .find_by_id(*path)
        .await?
        .ok_or_else(|| AppError::fail("post does not exist"))?;
    let post_id = post.id().ok_or_else(AppError::system_exception)?;
    let comments = store.comments().find_by_post(post_id).await?;

    let user_ids = std::iter::once(post.data().user_id).chain(comments.iter().map(|c| c.data().user_id));
    let names = author_names(&store, user_ids).await?;

    let author = names.get(&post.data().user_id).cloned();
    let post = PostDto::from_record(post, author).ok_or_else(AppError::system_exception)?;
    let comments = comments
        .into_iter()
        .filter_map(|comment| {
            let author = names.get(&comment.data().user_id).cloned();
            CommentDto::from_record(comment, author)
        })
        .collect();

    Ok(HttpResponse::Ok().json(ResponseDto::success(Some(PostDetailResponse { post, comments }))))
}

/// Usernames for the given author ids; unknown ids are left out.
pub(crate) async fn author_names(
    store: &Store,
    user_ids: impl IntoIterator<Item = i32>,
) -> Result<HashMap<i32, String>, AppError> {
    let users = store.users();
    let mut names = HashMap::new();
    for user_id in user_ids {
        if names.contains_key(&user_id) {
            continue;
        }
        if let Some(user) = users.find_by_id(user_id).await? {
            names.insert(user_id, user.into_data().username);
        }
    }
    Ok(names)
}
