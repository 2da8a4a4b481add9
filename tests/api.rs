use std::path::PathBuf;

use actix_web::{test, App};
use chrono::NaiveDate;
use mrtblog_backend_rs::{
    config::AppConfig,
    configure_app,
    db::Store,
    model::{MrtCarriage, MrtLine, MrtStream},
};
use serde_json::{json, Value};

fn test_config() -> AppConfig {
    AppConfig {
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        debug: true,
        sqlite_path: String::new(),
        database_url: Some("sqlite::memory:".to_string()),
        jwt_secret: "test-secret".to_string(),
        token_header: "token".to_string(),
        mrt_data_dir: PathBuf::from("crawler"),
    }
}

async fn memory_store() -> Store {
    let store = Store::new("sqlite::memory:");
    store.init().await.unwrap();
    store
}

fn post(uri: &str, token: Option<&str>, body: Value) -> test::TestRequest {
    let req = test::TestRequest::post().uri(uri).set_json(body);
    match token {
        Some(token) => req.insert_header(("token", token)),
        None => req,
    }
}

fn get(uri: &str, token: Option<&str>) -> test::TestRequest {
    let req = test::TestRequest::get().uri(uri);
    match token {
        Some(token) => req.insert_header(("token", token)),
        None => req,
    }
}

#[actix_web::test]
async fn register_login_post_and_comment() {
    let store = memory_store().await;
    let app = test::init_service(App::new().configure(configure_app(store.clone(), test_config()))).await;

    let body = json!({"username": "alice", "email": "alice@example.com", "password": "pw-alice"});
    let resp: Value = test::call_and_read_body_json(&app, post("/api/user/register", None, body).to_request()).await;
    assert_eq!(resp["code"], 0);
    let alice_id = resp["data"]["userId"].as_i64().unwrap();

    let body = json!({"username": "alice", "password": "wrong"});
    let resp: Value = test::call_and_read_body_json(&app, post("/api/user/login", None, body).to_request()).await;
    assert_eq!(resp["code"], 2);

    let body = json!({"username": "alice", "password": "pw-alice"});
    let resp: Value = test::call_and_read_body_json(&app, post("/api/user/login", None, body).to_request()).await;
    assert_eq!(resp["code"], 0);
    assert_eq!(resp["data"]["userId"].as_i64(), Some(alice_id));
    let token = resp["data"]["token"].as_str().unwrap().to_string();

    // anonymous posting is refused
    let body = json!({"title": "t", "content": "c"});
    let resp: Value = test::call_and_read_body_json(&app, post("/api/post/save", None, body).to_request()).await;
    assert_eq!(resp["code"], 3);

    let body = json!({"title": "Hello", "content": "first post"});
    let resp: Value =
        test::call_and_read_body_json(&app, post("/api/post/save", Some(&token), body).to_request()).await;
    assert_eq!(resp["code"], 0);
    let post_id = resp["data"]["id"].as_i64().unwrap();

    let body = json!({"postId": post_id, "content": "   "});
    let resp: Value =
        test::call_and_read_body_json(&app, post("/api/comment/add", Some(&token), body).to_request()).await;
    assert_eq!(resp["code"], 1);

    let body = json!({"postId": 9999, "content": "lost"});
    let resp: Value =
        test::call_and_read_body_json(&app, post("/api/comment/add", Some(&token), body).to_request()).await;
    assert_eq!(resp["code"], 2);

    for text in ["one", "two"] {
        let body = json!({"postId": post_id, "content": text});
        let resp: Value =
            test::call_and_read_body_json(&app, post("/api/comment/add", Some(&token), body).to_request()).await;
        assert_eq!(resp["code"], 0);
    }

    let uri = format!("/api/post/{}", post_id);
    let resp: Value = test::call_and_read_body_json(&app, get(&uri, None).to_request()).await;
    assert_eq!(resp["data"]["post"]["title"], "Hello");
    assert_eq!(resp["data"]["post"]["authorName"], "alice");
    let comments = resp["data"]["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0]["content"], "one");
    assert_eq!(comments[1]["content"], "two");

    let resp: Value = test::call_and_read_body_json(&app, get("/api/post/list", None).to_request()).await;
    assert_eq!(resp["data"].as_array().unwrap().len(), 1);

    let resp: Value = test::call_and_read_body_json(&app, get("/api/user/alice", None).to_request()).await;
    assert_eq!(resp["data"]["user"]["email"], "alice@example.com");
    assert_eq!(resp["data"]["posts"][0]["id"].as_i64(), Some(post_id));

    let resp: Value =
        test::call_and_read_body_json(&app, get("/api/comment/mine", Some(&token)).to_request()).await;
    let mine = resp["data"].as_array().unwrap();
    assert_eq!(mine.len(), 2);
    assert!(mine.iter().all(|c| c["authorName"] == "alice"));

    let resp: Value =
        test::call_and_read_body_json(&app, post("/api/user/logout", Some(&token), json!({})).to_request()).await;
    assert_eq!(resp["code"], 0);
}

#[actix_web::test]
async fn registration_prechecks_duplicates() {
    let store = memory_store().await;
    let app = test::init_service(App::new().configure(configure_app(store.clone(), test_config()))).await;

    let body = json!({"username": "bob", "email": "bob@example.com", "password": "pw"});
    let resp: Value = test::call_and_read_body_json(&app, post("/api/user/register", None, body).to_request()).await;
    assert_eq!(resp["code"], 0);

    let body = json!({"username": "bob", "email": "other@example.com", "password": "pw"});
    let resp: Value = test::call_and_read_body_json(&app, post("/api/user/register", None, body).to_request()).await;
    assert_eq!(resp["code"], 2);

    let body = json!({"username": "robert", "email": "bob@example.com", "password": "pw"});
    let resp: Value = test::call_and_read_body_json(&app, post("/api/user/register", None, body).to_request()).await;
    assert_eq!(resp["code"], 2);

    let body = json!({"username": "carol", "password": "pw"});
    let resp: Value = test::call_and_read_body_json(&app, post("/api/user/register", None, body).to_request()).await;
    assert_eq!(resp["code"], 1);

    let resp: Value = test::call_and_read_body_json(&app, get("/api/user/list", None).to_request()).await;
    assert_eq!(resp["data"].as_array().unwrap().len(), 1);

    let resp: Value = test::call_and_read_body_json(&app, get("/api/user/nobody", None).to_request()).await;
    assert_eq!(resp["code"], 2);
}

#[actix_web::test]
async fn registration_refuses_route_names_and_overlong_passwords() {
    let store = memory_store().await;
    let app = test::init_service(App::new().configure(configure_app(store.clone(), test_config()))).await;

    for name in ["list", "login", "register", "logout"] {
        let body = json!({"username": name, "email": format!("{}@example.com", name), "password": "pw"});
        let resp: Value =
            test::call_and_read_body_json(&app, post("/api/user/register", None, body).to_request()).await;
        assert_eq!(resp["code"], 1, "{} should be reserved", name);
    }

    let long = format!("{}X", "a".repeat(72));
    let body = json!({"username": "dana", "email": "dana@example.com", "password": long});
    let resp: Value = test::call_and_read_body_json(&app, post("/api/user/register", None, body).to_request()).await;
    assert_eq!(resp["code"], 1);

    let body = json!({"username": "dana", "email": "dana@example.com", "password": "a".repeat(72)});
    let resp: Value = test::call_and_read_body_json(&app, post("/api/user/register", None, body).to_request()).await;
    assert_eq!(resp["code"], 0);

    let body = json!({"username": "dana", "password": format!("{}Y", "a".repeat(72))});
    let resp: Value = test::call_and_read_body_json(&app, post("/api/user/login", None, body).to_request()).await;
    assert_eq!(resp["code"], 2);

    let resp: Value = test::call_and_read_body_json(&app, get("/api/user/list", None).to_request()).await;
    let users = resp["data"].as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["username"], "dana");
}

#[actix_web::test]
async fn forged_token_is_rejected() {
    let store = memory_store().await;
    let app = test::init_service(App::new().configure(configure_app(store.clone(), test_config()))).await;

    let body = json!({"title": "t", "content": "c"});
    let resp: Value = test::call_and_read_body_json(
        &app,
        post("/api/post/save", Some("not-a-jwt"), body).to_request(),
    )
    .await;
    assert_eq!(resp["code"], 3);
}

#[actix_web::test]
async fn congestion_endpoint_returns_latest_snapshot() {
    let store = memory_store().await;
    let day = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let row = |station: &str, h: u32, to_terminal: Option<&str>| MrtCarriage {
        line_code: MrtLine::Bannan.code().to_string(),
        line_name: MrtLine::Bannan.name().to_string(),
        station_code: station.to_string(),
        station_name: format!("name-{}", station),
        to_terminal: to_terminal.map(str::to_string),
        to_start: Some("3".to_string()),
        timestamp: day.and_hms_opt(h, 0, 0).unwrap(),
    };
    store
        .mrt_carriages()
        .insert_many(&[
            row("BL01", 7, Some("111")),
            row("BL02", 8, Some("12")),
            row("BL01", 8, None),
        ])
        .await
        .unwrap();

    let app = test::init_service(App::new().configure(configure_app(store.clone(), test_config()))).await;
    let resp: Value = test::call_and_read_body_json(&app, get("/api/mrt/carriage/BL", None).to_request()).await;
    assert_eq!(
        resp,
        json!([
            {"station_name": "name-BL01", "to_terminal": null, "to_start": [100.0], "station_code": "BL01"},
            {"station_name": "name-BL02", "to_terminal": [33.33, 66.67], "to_start": [100.0], "station_code": "BL02"}
        ])
    );

    let resp: Value = test::call_and_read_body_json(&app, get("/api/mrt/carriage/G", None).to_request()).await;
    assert_eq!(resp, json!([]));

    let resp: Value = test::call_and_read_body_json(&app, get("/api/mrt/lines", None).to_request()).await;
    assert_eq!(resp["data"].as_array().unwrap().len(), 5);
}

#[actix_web::test]
async fn daily_stream_endpoint() {
    let store = memory_store().await;
    let ts = |d: u32, h: u32| NaiveDate::from_ymd_opt(2024, 1, d).unwrap().and_hms_opt(h, 0, 0).unwrap();
    store
        .mrt_streams()
        .insert_many(&[
            MrtStream::new(ts(1, 9), 100),
            MrtStream::new(ts(2, 10), 210),
            MrtStream::new(ts(2, 9), 200),
        ])
        .await
        .unwrap();

    let app = test::init_service(App::new().configure(configure_app(store.clone(), test_config()))).await;

    let resp: Value = test::call_and_read_body_json(&app, get("/api/mrt/stream/daily", None).to_request()).await;
    assert_eq!(
        resp,
        json!([
            {"timestamp": "2024-01-02T09:00:00", "count": 200, "date": "2024-01-02", "weekday": "Tuesday"},
            {"timestamp": "2024-01-02T10:00:00", "count": 210, "date": "2024-01-02", "weekday": "Tuesday"}
        ])
    );

    let resp: Value =
        test::call_and_read_body_json(&app, get("/api/mrt/stream/daily?date=2024-01-01", None).to_request()).await;
    assert_eq!(resp.as_array().unwrap().len(), 1);
    assert_eq!(resp[0]["count"], 100);

    let resp: Value =
        test::call_and_read_body_json(&app, get("/api/mrt/stream/daily?date=yesterday", None).to_request()).await;
    assert_eq!(resp["code"], 1);
}
