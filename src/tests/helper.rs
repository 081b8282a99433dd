use axum::Router;
use axum::body::Body;
use axum::body::Bytes;
use axum::http::Method;
use axum::http::Request;
use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use axum::http::header::CONTENT_TYPE;
use chrono::DateTime;
use chrono::Days;
use chrono::NaiveDateTime;
use chrono::Utc;
use http_body_util::BodyExt;
use serde_json::Value;
use serde_json::json;
use sqlx::SqlitePool;
use tower::Service;
use uuid::Uuid;

use crate::api::JwtKeys;
use crate::database::CreateEntryValues;
use crate::database::Database;
use crate::database::DatabaseConfig;
use crate::entries::Entry;
use crate::kind::Kind;
use crate::setup_app;

/// Secret the test app signs its tokens with
pub const JWT_SECRET: &[u8] = b"verysecret";

/// Password of every test user
pub const PASSWORD: &str = "verysecret";

/// Test helper version of User struct
#[derive(Debug)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub token: String,
}

/// Error response
#[derive(Debug, PartialEq, Eq)]
pub struct Error {
    pub error: String,
    pub description: Option<String>,
}

/// Setup the Omega app on a fresh database
pub async fn setup_test_app(pool: SqlitePool) -> Router {
    setup_app(
        DatabaseConfig::ExistingConnection(pool),
        JwtKeys::new(JWT_SECRET),
    )
    .await
    .unwrap()
}

/// Direct access to the database of the test app
pub async fn setup_test_database(pool: SqlitePool) -> Database {
    Database::from_config(DatabaseConfig::ExistingConnection(pool))
        .await
        .unwrap()
}

/// Send a request, with an optional bearer token and JSON payload
pub async fn call(
    app: &mut Router,
    method: Method,
    uri: &str,
    access_token: Option<&str>,
    payload: Option<&Value>,
) -> (StatusCode, Bytes) {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(access_token) = access_token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {access_token}"));
    }

    let body = if let Some(payload) = payload {
        builder = builder.header(CONTENT_TYPE, mime::APPLICATION_JSON.as_ref());
        Body::from(serde_json::to_vec(payload).unwrap())
    } else {
        Body::empty()
    };

    let request = builder.body(body).unwrap();

    let response = app.call(request).await.unwrap();
    let status_code = response.status();

    let body = response.into_body().collect().await.unwrap().to_bytes();

    (status_code, body)
}

/// Send a request with a raw `Authorization` header
pub async fn call_with_authorization(
    app: &mut Router,
    uri: &str,
    authorization: &str,
) -> (StatusCode, Bytes) {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header(AUTHORIZATION, authorization)
        .body(Body::empty())
        .unwrap();

    let response = app.call(request).await.unwrap();
    let status_code = response.status();

    let body = response.into_body().collect().await.unwrap().to_bytes();

    (status_code, body)
}

pub async fn maybe_register(
    app: &mut Router,
    payload: &Value,
) -> (StatusCode, Option<User>, Option<String>) {
    let (status_code, body) = call(app, Method::POST, "/register", None, Some(payload)).await;

    (
        status_code,
        if status_code == StatusCode::CREATED {
            Some(get_user(&body))
        } else {
            None
        },
        if status_code == StatusCode::BAD_REQUEST {
            Some(get_error_message(&body))
        } else {
            None
        },
    )
}

pub async fn register(app: &mut Router, name: &str, email: &str) -> User {
    let payload = json!({ "name": name, "email": email, "password": PASSWORD });

    let (status_code, user, _) = maybe_register(app, &payload).await;
    assert_eq!(StatusCode::CREATED, status_code);

    user.unwrap()
}

pub async fn maybe_login(
    app: &mut Router,
    email: &str,
    password: &str,
) -> (StatusCode, Option<User>, Option<String>) {
    let payload = json!({ "email": email, "password": password });

    let (status_code, body) = call(app, Method::POST, "/login", None, Some(&payload)).await;

    (
        status_code,
        if status_code == StatusCode::OK {
            Some(get_user(&body))
        } else {
            None
        },
        if status_code == StatusCode::BAD_REQUEST {
            Some(get_error_message(&body))
        } else {
            None
        },
    )
}

pub async fn list_entries(app: &mut Router, access_token: &str) -> (StatusCode, Option<Vec<Value>>) {
    let (status_code, body) = call(app, Method::GET, "/entries", Some(access_token), None).await;

    (
        status_code,
        if status_code == StatusCode::OK {
            Some(get_list(&body, "entries"))
        } else {
            None
        },
    )
}

pub async fn list_public_entries(app: &mut Router) -> (StatusCode, Option<Vec<Value>>) {
    let (status_code, body) = call(app, Method::GET, "/entries/public", None, None).await;

    (
        status_code,
        if status_code == StatusCode::OK {
            Some(get_list(&body, "entries"))
        } else {
            None
        },
    )
}

pub async fn entry_status(app: &mut Router, access_token: &str) -> (StatusCode, Option<Value>) {
    let (status_code, body) =
        call(app, Method::GET, "/entries/status", Some(access_token), None).await;

    (
        status_code,
        if status_code == StatusCode::OK {
            Some(get_json(&body))
        } else {
            None
        },
    )
}

pub async fn maybe_create_entry(
    app: &mut Router,
    access_token: &str,
    payload: &Value,
) -> (StatusCode, Option<Value>, Option<String>) {
    let (status_code, body) =
        call(app, Method::POST, "/entries", Some(access_token), Some(payload)).await;

    (
        status_code,
        if status_code == StatusCode::OK {
            Some(get_json(&body)["entry"].clone())
        } else {
            None
        },
        if status_code == StatusCode::BAD_REQUEST {
            Some(get_error_message(&body))
        } else {
            None
        },
    )
}

pub async fn list_messages(app: &mut Router, access_token: &str) -> (StatusCode, Option<Value>) {
    let (status_code, body) = call(app, Method::GET, "/messages", Some(access_token), None).await;

    (
        status_code,
        if status_code == StatusCode::OK {
            Some(get_json(&body))
        } else {
            None
        },
    )
}

pub async fn maybe_create_message(
    app: &mut Router,
    access_token: &str,
    payload: &Value,
) -> (StatusCode, Option<Value>, Option<String>) {
    let (status_code, body) =
        call(app, Method::POST, "/messages", Some(access_token), Some(payload)).await;

    (
        status_code,
        if status_code == StatusCode::OK {
            Some(get_json(&body)["message"].clone())
        } else {
            None
        },
        if status_code == StatusCode::BAD_REQUEST {
            Some(get_error_message(&body))
        } else {
            None
        },
    )
}

pub async fn maybe_create_entry_with_raw_body(
    app: &mut Router,
    access_token: &str,
    body: &'static str,
    include_content_type: bool,
) -> (StatusCode, Option<Error>) {
    let mut builder = Request::builder().method(Method::POST).uri("/entries");

    if include_content_type {
        builder = builder.header(CONTENT_TYPE, mime::APPLICATION_JSON.as_ref());
    }

    let request = builder
        .header(AUTHORIZATION, format!("Bearer {access_token}"))
        .body(Body::from(body.as_bytes()))
        .unwrap();

    let response = app.call(request).await.unwrap();
    let status_code = response.status();

    let body = response.into_body().collect().await.unwrap().to_bytes();

    (
        status_code,
        if status_code == StatusCode::BAD_REQUEST {
            Some(get_error(&body))
        } else {
            None
        },
    )
}

/// Store an entry directly, bypassing the interval check
pub async fn insert_entry(
    database: &Database,
    email: &str,
    title: &str,
    is_public: bool,
    created_at: NaiveDateTime,
    entry_interval: i64,
) -> Entry {
    let user = database
        .find_single_user_by_email(email)
        .await
        .unwrap()
        .unwrap();

    let values = CreateEntryValues {
        user: &user,
        title,
        content: "Some content",
        kind: Kind::Text,
        is_public,
        video_url: None,
        entry_interval,
        next_entry_date: created_at
            .checked_add_days(Days::new(entry_interval.try_into().unwrap()))
            .unwrap(),
        created_at,
    };

    database.create_entry(&values).await.unwrap()
}

/// Now, minus a number of days
pub fn days_ago(days: u64) -> NaiveDateTime {
    Utc::now()
        .naive_utc()
        .checked_sub_days(Days::new(days))
        .unwrap()
}

/// Parse a UTC date from a JSON value, the offset is required
pub fn get_date(value: &Value) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value.as_str().unwrap())
        .unwrap()
        .with_timezone(&Utc)
}

pub fn get_json(body: &Bytes) -> Value {
    serde_json::from_slice::<Value>(body).unwrap()
}

fn get_user(body: &Bytes) -> User {
    let json = get_json(body);

    User {
        id: json["user"]["id"].as_str().unwrap().parse().unwrap(),
        name: json["user"]["name"].as_str().unwrap().to_string(),
        email: json["user"]["email"].as_str().unwrap().to_string(),
        token: json["token"].as_str().unwrap().to_string(),
    }
}

fn get_list(body: &Bytes, key: &str) -> Vec<Value> {
    get_json(body)[key].as_array().unwrap().clone()
}

pub fn get_error(body: &Bytes) -> Error {
    let json = get_json(body);

    Error {
        error: json["error"].as_str().unwrap().to_string(),
        description: json["description"].as_str().map(ToString::to_string),
    }
}

pub fn get_error_message(body: &Bytes) -> String {
    get_error(body).error
}
