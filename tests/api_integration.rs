//! Integration tests for the Exercise Tracker API.
//!
//! These tests spin up a real server instance backed by in-memory storage and
//! make HTTP requests to verify the complete request/response cycle.

use std::net::SocketAddr;
use std::sync::Arc;

use chrono::Utc;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use tempfile::TempDir;
use tokio::net::TcpListener;

use exercise_tracker::api::{AppState, create_router};
use exercise_tracker::config::{AppConfig, AssetsConfig, ObservabilityConfig, StorageConfig};
use exercise_tracker::domain::format_date;
use exercise_tracker::storage::create_storage;

// ============================================================================
// Test Harness
// ============================================================================

/// Test server instance.
struct TestServer {
    addr: SocketAddr,
    client: Client,
    _assets: TempDir,
}

impl TestServer {
    async fn new() -> Self {
        let assets = TempDir::new().expect("Failed to create temp dir");
        let index_file = assets.path().join("index.html");
        let public_dir = assets.path().join("public");
        std::fs::write(&index_file, "<h1>Exercise tracker</h1>").unwrap();
        std::fs::create_dir_all(&public_dir).unwrap();
        std::fs::write(public_dir.join("style.css"), "body { margin: 0; }").unwrap();

        let config = AppConfig {
            storage: StorageConfig::default(),
            assets: AssetsConfig {
                index_file,
                public_dir,
            },
            observability: ObservabilityConfig {
                log_level: "warn".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };

        let storage = create_storage(&config.storage)
            .await
            .expect("Failed to create storage");

        let state = AppState::new(Arc::new(config), storage);
        let app = create_router(state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Server failed");
        });

        Self {
            addr,
            client: Client::new(),
            _assets: assets,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("Request failed")
    }

    async fn post_json(&self, path: &str, body: &Value) -> Response {
        self.client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Request failed")
    }

    async fn post_form(&self, path: &str, fields: &[(&str, &str)]) -> Response {
        self.client
            .post(self.url(path))
            .form(fields)
            .send()
            .await
            .expect("Request failed")
    }

    async fn post_raw(&self, path: &str, content_type: Option<&str>, body: &'static str) -> Response {
        let mut request = self.client.post(self.url(path)).body(body);
        if let Some(content_type) = content_type {
            request = request.header(reqwest::header::CONTENT_TYPE, content_type);
        }
        request.send().await.expect("Request failed")
    }

    async fn create_user(&self, username: &str) -> UserBody {
        let response = self
            .post_json("/api/users", &json!({ "username": username }))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        response.json().await.unwrap()
    }

    async fn add_exercise(&self, user_id: &str, body: &Value) -> ExerciseBody {
        let response = self
            .post_json(&format!("/api/users/{user_id}/exercises"), body)
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        response.json().await.unwrap()
    }

    async fn logs(&self, user_id: &str, query: &str) -> LogBody {
        let response = self.get(&format!("/api/users/{user_id}/logs{query}")).await;
        assert_eq!(response.status(), StatusCode::OK);
        response.json().await.unwrap()
    }
}

fn unknown_user_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

async fn assert_error(response: Response, message: &str) {
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "error": message }));
}

async fn assert_user_not_found(response: Response) {
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.text().await.unwrap(), "User not found");
}

/// The server picks "today" between `before` and the check, so a run that
/// crosses midnight UTC sees either day.
fn assert_today_since(date: &str, before: chrono::NaiveDate) {
    let after = Utc::now().date_naive();
    assert!(
        date == format_date(before) || date == format_date(after),
        "{date} is neither {before} nor {after}"
    );
}

#[derive(Debug, Deserialize)]
struct UserBody {
    #[serde(rename = "_id")]
    id: String,
    username: String,
}

#[derive(Debug, Deserialize)]
struct ExerciseBody {
    #[serde(rename = "_id")]
    id: String,
    username: String,
    description: String,
    duration: i64,
    date: String,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
struct LogEntryBody {
    description: String,
    duration: i64,
    date: String,
}

#[derive(Debug, Deserialize)]
struct LogBody {
    #[serde(rename = "_id")]
    id: String,
    username: String,
    count: usize,
    log: Vec<LogEntryBody>,
}

// ============================================================================
// Health and Static Asset Tests
// ============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let server = TestServer::new().await;
    let response = server.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_ready_endpoint() {
    let server = TestServer::new().await;
    let response = server.get("/ready").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["ready"], true);
    assert_eq!(body["components"]["storage"]["backend"], "memory");
}

#[tokio::test]
async fn test_index_page() {
    let server = TestServer::new().await;
    let response = server.get("/").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains("Exercise tracker"));
}

#[tokio::test]
async fn test_public_assets() {
    let server = TestServer::new().await;

    let response = server.get("/style.css").await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = server.get("/missing.css").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let server = TestServer::new().await;
    let response = server
        .client
        .get(server.url("/api/users"))
        .header("Origin", "https://example.com")
        .send()
        .await
        .unwrap();

    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}

// ============================================================================
// User Tests
// ============================================================================

#[tokio::test]
async fn test_create_user() {
    let server = TestServer::new().await;
    let user = server.create_user("fcc_test").await;

    assert!(!user.id.is_empty());
    assert_eq!(user.username, "fcc_test");
}

#[tokio::test]
async fn test_create_user_from_form() {
    let server = TestServer::new().await;
    let response = server
        .post_form("/api/users", &[("username", "form user")])
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let user: UserBody = response.json().await.unwrap();
    assert_eq!(user.username, "form user");
}

#[tokio::test]
async fn test_create_user_without_username() {
    let server = TestServer::new().await;
    let response = server.post_json("/api/users", &json!({})).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Unable to create user" }));
}

#[tokio::test]
async fn test_create_user_without_body() {
    let server = TestServer::new().await;

    let response = server.post_raw("/api/users", None, "").await;
    assert_error(response, "Unable to create user").await;

    let response = server
        .post_raw("/api/users", Some("text/plain"), "username=fcc_test")
        .await;
    assert_error(response, "Unable to create user").await;
}

#[tokio::test]
async fn test_create_user_malformed_json() {
    let server = TestServer::new().await;

    let response = server
        .post_raw("/api/users", Some("application/json"), "{\"username\":")
        .await;
    assert_error(response, "Unable to create user").await;

    let response = server
        .post_json("/api/users", &json!({ "username": ["a", "b"] }))
        .await;
    assert_error(response, "Unable to create user").await;
}

#[tokio::test]
async fn test_create_user_scalar_username() {
    let server = TestServer::new().await;

    let response = server.post_json("/api/users", &json!({ "username": 123 })).await;
    assert_eq!(response.status(), StatusCode::OK);

    let user: UserBody = response.json().await.unwrap();
    assert_eq!(user.username, "123");
}

#[tokio::test]
async fn test_list_users() {
    let server = TestServer::new().await;
    let created = [
        server.create_user("alice").await,
        server.create_user("bob").await,
        server.create_user("alice").await,
    ];

    let response = server.get("/api/users").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Vec<Value> = response.json().await.unwrap();
    assert!(body.len() >= created.len());
    for entry in &body {
        assert!(entry["_id"].is_string());
        assert!(entry["username"].is_string());
    }

    let ids: Vec<&str> = body.iter().filter_map(|u| u["_id"].as_str()).collect();
    for user in &created {
        assert!(ids.contains(&user.id.as_str()));
    }
}

// ============================================================================
// Exercise Tests
// ============================================================================

#[tokio::test]
async fn test_add_exercise_with_date() {
    let server = TestServer::new().await;
    let user = server.create_user("runner").await;

    let response = server
        .post_json(
            &format!("/api/users/{}/exercises", user.id),
            &json!({ "description": "test run", "duration": 30, "date": "2023-01-15" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["_id"], user.id.as_str());
    assert_eq!(body["username"], "runner");
    assert_eq!(body["description"], "test run");
    assert_eq!(body["duration"], json!(30));
    assert!(body["duration"].is_number());
    assert_eq!(body["date"], "Sun Jan 15 2023");
}

#[tokio::test]
async fn test_add_exercise_defaults_to_today() {
    let server = TestServer::new().await;
    let user = server.create_user("runner").await;

    let before = Utc::now().date_naive();
    let exercise = server
        .add_exercise(&user.id, &json!({ "description": "walk", "duration": 15 }))
        .await;

    assert_today_since(&exercise.date, before);
}

#[tokio::test]
async fn test_add_exercise_from_form() {
    let server = TestServer::new().await;
    let user = server.create_user("runner").await;

    let before = Utc::now().date_naive();
    let response = server
        .post_form(
            &format!("/api/users/{}/exercises", user.id),
            &[("description", "swim"), ("duration", "45"), ("date", "")],
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let exercise: ExerciseBody = response.json().await.unwrap();
    assert_eq!(exercise.id, user.id);
    assert_eq!(exercise.username, "runner");
    assert_eq!(exercise.description, "swim");
    assert_eq!(exercise.duration, 45);
    assert_today_since(&exercise.date, before);
}

#[tokio::test]
async fn test_add_exercise_unknown_user() {
    let server = TestServer::new().await;
    let response = server
        .post_json(
            &format!("/api/users/{}/exercises", unknown_user_id()),
            &json!({ "description": "run", "duration": 30 }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.text().await.unwrap(), "User not found");
}

#[tokio::test]
async fn test_add_exercise_malformed_user_id() {
    let server = TestServer::new().await;
    let response = server
        .post_json(
            "/api/users/not-an-id/exercises",
            &json!({ "description": "run", "duration": 30 }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Unable to add exercise" }));
}

#[tokio::test]
async fn test_add_exercise_invalid_input() {
    let server = TestServer::new().await;
    let user = server.create_user("runner").await;
    let path = format!("/api/users/{}/exercises", user.id);

    for body in [
        json!({ "duration": 30 }),
        json!({ "description": "run" }),
        json!({ "description": "run", "duration": "lots" }),
        json!({ "description": "run", "duration": 30, "date": "whenever" }),
    ] {
        let response = server.post_json(&path, &body).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR, "{body}");

        let error: Value = response.json().await.unwrap();
        assert_eq!(error, json!({ "error": "Unable to add exercise" }));
    }

    let log = server.logs(&user.id, "").await;
    assert_eq!(log.count, 0);
}

#[tokio::test]
async fn test_add_exercise_scalar_description() {
    let server = TestServer::new().await;
    let user = server.create_user("runner").await;

    let exercise = server
        .add_exercise(
            &user.id,
            &json!({ "description": 5, "duration": 10, "date": "2023-01-15" }),
        )
        .await;
    assert_eq!(exercise.description, "5");
    assert_eq!(exercise.date, "Sun Jan 15 2023");
}

#[tokio::test]
async fn test_add_exercise_unknown_user_wins_over_bad_body() {
    let server = TestServer::new().await;
    let path = format!("/api/users/{}/exercises", unknown_user_id());

    let response = server
        .post_json(&path, &json!({ "description": 5 }))
        .await;
    assert_user_not_found(response).await;

    let response = server
        .post_raw(&path, Some("application/json"), "{not json")
        .await;
    assert_user_not_found(response).await;

    let response = server.post_raw(&path, None, "").await;
    assert_user_not_found(response).await;
}

#[tokio::test]
async fn test_add_exercise_unreadable_body() {
    let server = TestServer::new().await;
    let user = server.create_user("runner").await;
    let path = format!("/api/users/{}/exercises", user.id);

    let response = server
        .post_raw(&path, Some("application/json"), "{not json")
        .await;
    assert_error(response, "Unable to add exercise").await;

    let response = server.post_raw(&path, None, "").await;
    assert_error(response, "Unable to add exercise").await;

    let response = server
        .post_json(&path, &json!({ "description": { "kind": "run" }, "duration": 5 }))
        .await;
    assert_error(response, "Unable to add exercise").await;
}

// ============================================================================
// Log Tests
// ============================================================================

#[tokio::test]
async fn test_logs_unknown_user() {
    let server = TestServer::new().await;
    let response = server
        .get(&format!("/api/users/{}/logs", unknown_user_id()))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.text().await.unwrap(), "User not found");
}

#[tokio::test]
async fn test_logs_empty() {
    let server = TestServer::new().await;
    let user = server.create_user("idle").await;

    let log = server.logs(&user.id, "").await;
    assert_eq!(log.id, user.id);
    assert_eq!(log.username, "idle");
    assert_eq!(log.count, 0);
    assert!(log.log.is_empty());
}

#[tokio::test]
async fn test_logs_range_with_limit() {
    let server = TestServer::new().await;
    let user = server.create_user("runner").await;

    for day in 1..=5 {
        server
            .add_exercise(
                &user.id,
                &json!({
                    "description": format!("run {day}"),
                    "duration": 10 * day,
                    "date": format!("2023-01-{:02}", day * 5),
                }),
            )
            .await;
    }

    let log = server
        .logs(&user.id, "?from=2023-01-01&to=2023-01-31&limit=2")
        .await;
    assert_eq!(log.count, 2);
    assert_eq!(log.log.len(), 2);

    let log = server.logs(&user.id, "?from=2023-01-01&to=2023-01-31").await;
    assert_eq!(log.count, 5);
}

#[tokio::test]
async fn test_logs_bounds_are_inclusive() {
    let server = TestServer::new().await;
    let user = server.create_user("runner").await;

    for date in ["2022-12-31", "2023-01-01", "2023-01-15", "2023-01-31", "2023-02-01"] {
        server
            .add_exercise(
                &user.id,
                &json!({ "description": date, "duration": 5, "date": date }),
            )
            .await;
    }

    let log = server.logs(&user.id, "?from=2023-01-01&to=2023-01-31").await;
    let dates: Vec<&str> = log.log.iter().map(|e| e.date.as_str()).collect();
    assert_eq!(dates, ["Sun Jan 01 2023", "Sun Jan 15 2023", "Tue Jan 31 2023"]);

    let log = server.logs(&user.id, "?from=2023-01-31").await;
    assert_eq!(log.count, 2);

    let log = server.logs(&user.id, "?to=2023-01-01").await;
    assert_eq!(log.count, 2);
}

#[tokio::test]
async fn test_logs_only_include_own_exercises() {
    let server = TestServer::new().await;
    let me = server.create_user("me").await;
    let other = server.create_user("other").await;

    let added = [
        server
            .add_exercise(
                &me.id,
                &json!({ "description": "run", "duration": 30, "date": "2023-03-01" }),
            )
            .await,
        server
            .add_exercise(
                &me.id,
                &json!({ "description": "bike", "duration": "60", "date": "2023-03-02" }),
            )
            .await,
    ];
    server
        .add_exercise(
            &other.id,
            &json!({ "description": "swim", "duration": 20, "date": "2023-03-01" }),
        )
        .await;

    let log = server.logs(&me.id, "").await;
    assert_eq!(log.count, added.len());

    for entry in &log.log {
        assert!(added.iter().any(|exercise| {
            exercise.description == entry.description
                && exercise.duration == entry.duration
                && exercise.date == entry.date
        }));
    }
}

#[tokio::test]
async fn test_logs_invalid_query() {
    let server = TestServer::new().await;
    let user = server.create_user("runner").await;

    for query in ["?from=someday", "?limit=many", "?limit=1&limit=2", "?to=a&to=b"] {
        let response = server
            .get(&format!("/api/users/{}/logs{query}", user.id))
            .await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR, "{query}");

        let body: Value = response.json().await.unwrap();
        assert_eq!(body, json!({ "error": "Unable to fetch logs" }));
    }
}

#[tokio::test]
async fn test_logs_unknown_user_with_bad_query() {
    let server = TestServer::new().await;
    let response = server
        .get(&format!("/api/users/{}/logs?limit=1&limit=2", unknown_user_id()))
        .await;
    assert_user_not_found(response).await;
}

#[tokio::test]
async fn test_logs_negative_limit_caps_entries() {
    let server = TestServer::new().await;
    let user = server.create_user("runner").await;

    for day in 1..=3 {
        server
            .add_exercise(
                &user.id,
                &json!({ "description": "run", "duration": day, "date": format!("2023-05-0{day}") }),
            )
            .await;
    }

    let log = server.logs(&user.id, "?limit=-2").await;
    assert_eq!(log.count, 2);
    assert_eq!(log.log.len(), 2);
}
