use actix_web::{web, HttpResponse};
use log::info;
use serde::{Deserialize, Serialize};

use crate::auth::{issue_token, AuthUser};
use crate::config::AppConfig;
use crate::db::Store;
use crate::error::AppError;
use crate::model::{Post, User, MAX_PASSWORD_BYTES};
use crate::repository::Record;
use crate::response::ResponseDto;
use crate::routes::post::PostDto;
use crate::routes::to_rfc3339;

/// Paths under `/api/user` that shadow `/{username}`.
const RESERVED_USERNAMES: [&str; 4] = ["register", "login", "logout", "list"];

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/register").route(web::post().to(register_user)))
        .service(web::resource("/login").route(web::post().to(login)))
        .service(web::resource("/logout").route(web::post().to(logout)))
        .service(web::resource("/list").route(web::get().to(list_users)))
        .service(web::resource("/{username}").route(web::get().to(profile)));
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterUserRequest {
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest {
    username: Option<String>,
    password: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    token: String,
    username: String,
    user_id: i32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RegisterResponse {
    user_id: i32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserDto {
    id: i32,
    username: String,
    email: String,
    created_at: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProfileResponse {
    user: UserDto,
    posts: Vec<PostDto>,
}

async fn register_user(
    store: web::Data<Store>,
    payload: web::Json<RegisterUserRequest>,
) -> Result<HttpResponse, AppError> {
    let username = payload.username.clone().unwrap_or_default();
    let email = payload.email.clone().unwrap_or_default();
    let password = payload.password.clone().unwrap_or_default();
    if username.trim().is_empty() {
        return Err(AppError::param_error("username cannot be null"));
    }
    if email.trim().is_empty() {
        return Err(AppError::param_error("email cannot be null"));
    }
    if password.trim().is_empty() {
        return Err(AppError::param_error("password cannot be null"));
    }
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(AppError::param_error(format!(
            "password cannot exceed {} bytes",
            MAX_PASSWORD_BYTES
        )));
    }
    if RESERVED_USERNAMES
        .iter()
        .any(|name| name.eq_ignore_ascii_case(username.trim()))
    {
        return Err(AppError::param_error("username is reserved"));
    }

    // check-then-insert: two concurrent registrations can still both pass
    let users = store.users();
    if users.find_by_username(username.trim()).await?.is_some() {
        return Err(AppError::fail("username already exists"));
    }
    if users.find_by_email(email.trim()).await?.is_some() {
        return Err(AppError::fail("email already registered"));
    }

    let user_id = users.create(username.trim(), email.trim(), &password).await?;
    info!("registered user {} ({})", username.trim(), user_id);
    Ok(HttpResponse::Ok().json(ResponseDto::success(Some(RegisterResponse { user_id }))))
}

async fn login(
    store: web::Data<Store>,
    config: web::Data<AppConfig>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let username = payload.username.clone().unwrap_or_default();
    let password = payload.password.clone().unwrap_or_default();
    if username.trim().is_empty() {
        return Err(AppError::param_error("username cannot be null"));
    }
    if password.trim().is_empty() {
        return Err(AppError::param_error("password cannot be null"));
    }

    let user = store
        .users()
        .find_by_username(username.trim())
        .await?
        .ok_or_else(|| AppError::fail("user does not exist"))?;
    if !user.data().verify_password(&password) {
        return Err(AppError::fail("wrong password"));
    }

    let user_id = user.id().ok_or_else(AppError::system_exception)?;
    let token = issue_token(&config, user_id)?;
    let response = LoginResponse {
        token,
        username: user.into_data().username,
        user_id,
    };
    Ok(HttpResponse::Ok().json(ResponseDto::success(Some(response))))
}

async fn logout(_auth: AuthUser) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(ResponseDto::<()>::success(None)))
}

async fn list_users(store: web::Data<Store>) -> Result<HttpResponse, AppError> {
    let list: Vec<UserDto> = store
        .users()
        .list_all()
        .await?
        .into_iter()
        .filter_map(to_user_dto)
        .collect();
    Ok(HttpResponse::Ok().json(ResponseDto::success(Some(list))))
}

async fn profile(
    store: web::Data<Store>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let user = store
        .users()
        .find_by_username(&path)
        .await?
        .ok_or_else(|| AppError::fail("user does not exist"))?;
    let user_id = user.id().ok_or_else(AppError::system_exception)?;
    let author = user.data().username.clone();

    let posts = store
        .posts()
        .find_by_author(user_id)
        .await?
        .into_iter()
        .filter_map(|post: Record<Post>| PostDto::from_record(post, Some(author.clone())))
        .collect();
    let user = to_user_dto(user).ok_or_else(AppError::system_exception)?;

    Ok(HttpResponse::Ok().json(ResponseDto::success(Some(ProfileResponse { user, posts }))))
}

pub(crate) fn to_user_dto(record: Record<User>) -> Option<UserDto> {
    let id = record.id()?;
    let user = record.into_data();
    Some(UserDto {
        id,
        username: user.username,
        email: user.email,
        created_at: to_rfc3339(user.created_at),
    })
}
