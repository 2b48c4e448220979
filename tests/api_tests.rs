// tests/api_tests.rs

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use exam_admin::{
    config::Config,
    models::attempt::{AttemptRecord, AttemptSummary},
    routes,
    source::MemoryRecordSource,
    state::AppState,
};
use serde_json::{Value, json};

const ADMIN: &str = "admin";
const PASSWORD: &str = "correct horse";

fn test_config(edit_lock: bool) -> Config {
    Config {
        database_url: "unused".to_string(),
        admin_username: ADMIN.to_string(),
        admin_password: PASSWORD.to_string(),
        exam_edit_lock: edit_lock,
        port: 0,
        public_dir: concat!(env!("CARGO_MANIFEST_DIR"), "/public").to_string(),
        rust_log: "error".to_string(),
        session_ttl_secs: 600, // 10 minutes for tests
        dashboard_cache_ttl_secs: 60,
        dashboard_cache_max_entries: None,
        db_acquire_timeout_secs: 1,
    }
}

/// Helper function to spawn the app on a random port for testing.
/// Returns the base URL (e.g., "http://127.0.0.1:12345").
async fn spawn_app(source: MemoryRecordSource, edit_lock: bool) -> String {
    let state = AppState::new(test_config(edit_lock), Arc::new(source)).expect("state");
    let app = routes::create_router(state);

    // Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    // Spawn the server in the background
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

async fn login(client: &reqwest::Client, address: &str) -> String {
    let resp: Value = client
        .post(format!("{}/api/auth/login", address))
        .json(&json!({ "username": ADMIN, "password": PASSWORD }))
        .send()
        .await
        .expect("Login failed")
        .json()
        .await
        .expect("Failed to parse login json");

    resp["token"].as_str().expect("Token not found").to_string()
}

fn attempt(id: i64, candidate: &str, score: i64, time: Option<i64>, submitted_min: i64) -> AttemptRecord {
    let base = Utc.with_ymd_and_hms(2024, 9, 1, 9, 0, 0).unwrap();
    AttemptRecord {
        id,
        attempt_id: Some(format!("att-{}", id)),
        candidate_id: candidate.to_string(),
        status: Some("submitted".to_string()),
        exam_started_at: Some(base),
        submitted_at: Some(base + Duration::minutes(submitted_min)),
        created_at: base,
        duration_seconds: Some(3600),
        time_taken_seconds: time,
        summary: AttemptSummary {
            total_questions: 100,
            answered: 100,
            correct: score,
            wrong: 100 - score,
            score,
            ..Default::default()
        },
    }
}

#[tokio::test]
async fn health_and_login_are_open() {
    let address = spawn_app(MemoryRecordSource::new(), false).await;
    let client = reqwest::Client::new();

    let health = client
        .get(format!("{}/api/health", address))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(health.status().as_u16(), 200);
    let body: Value = health.json().await.unwrap();
    assert_eq!(body["ok"], true);

    let resp: Value = client
        .post(format!("{}/api/auth/login", address))
        .json(&json!({ "username": ADMIN, "password": PASSWORD }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(resp["ok"], true);
    assert_eq!(resp["token"].as_str().unwrap().len(), 48);
    assert!(resp["expiresAt"].as_i64().unwrap() > Utc::now().timestamp_millis());
}

#[tokio::test]
async fn bad_credentials_get_the_same_rejection() {
    let address = spawn_app(MemoryRecordSource::new(), false).await;
    let client = reqwest::Client::new();

    let mut bodies = Vec::new();
    for (user, pass) in [(ADMIN, "wrong"), ("nobody", PASSWORD), ("", "")] {
        let resp = client
            .post(format!("{}/api/auth/login", address))
            .json(&json!({ "username": user, "password": pass }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 401);
        bodies.push(resp.json::<Value>().await.unwrap());
    }
    assert!(bodies.windows(2).all(|w| w[0] == w[1]));
}

#[tokio::test]
async fn api_requires_a_live_token() {
    let address = spawn_app(MemoryRecordSource::new(), false).await;
    let client = reqwest::Client::new();

    for path in ["/api/results", "/api/scorecard", "/api/exam/questions", "/api/config"] {
        let resp = client
            .get(format!("{}{}", address, path))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 401, "{}", path);

        let resp = client
            .get(format!("{}{}", address, path))
            .header("x-admin-token", "not-a-real-token")
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 401, "{}", path);
    }

    let token = login(&client, &address).await;
    let resp = client
        .get(format!("{}/api/config", address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["examEditLock"], false);
}

#[tokio::test]
async fn logout_revokes_the_token() {
    let address = spawn_app(MemoryRecordSource::new(), false).await;
    let client = reqwest::Client::new();
    let token = login(&client, &address).await;

    let resp = client
        .post(format!("{}/api/auth/logout", address))
        .header("x-admin-token", &token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let resp = client
        .get(format!("{}/api/results", address))
        .header("x-admin-token", &token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 401);
}

#[tokio::test]
async fn dashboard_dedups_and_dense_ranks() {
    let source = MemoryRecordSource::new();
    source.add_attempt(attempt(1, "A", 80, Some(300), 0));
    source.add_attempt(attempt(2, "A", 95, Some(200), 30));
    source.add_attempt(attempt(3, "B", 95, Some(200), 10));
    source.add_attempt(attempt(4, "C", 90, Some(100), 20));
    source.add_attempt(attempt(5, "XY-1", 10, Some(50), 5));

    let address = spawn_app(source, false).await;
    let client = reqwest::Client::new();
    let token = login(&client, &address).await;

    let results: Value = client
        .get(format!("{}/api/results", address))
        .header("x-admin-token", &token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(results["count"], 4);
    let order: Vec<&str> = results["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["candidateId"].as_str().unwrap())
        .collect();
    assert_eq!(order, vec!["A", "C", "B", "XY-1"]);
    assert_eq!(results["results"][0]["score"], 95);

    let board: Value = client
        .get(format!("{}/api/scorecard", address))
        .query(&[("search", "  ")])
        .header("x-admin-token", &token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let ranks: Vec<(String, i64)> = board["scorecard"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| {
            (
                e["candidateId"].as_str().unwrap().to_string(),
                e["rank"].as_i64().unwrap(),
            )
        })
        .collect();
    assert_eq!(
        ranks,
        vec![
            ("B".to_string(), 1),
            ("A".to_string(), 1),
            ("C".to_string(), 2),
            ("XY-1".to_string(), 3),
        ]
    );
    assert_eq!(board["scorecard"][0]["reason"], "Score 95, Time 200s");

    let filtered: Value = client
        .get(format!("{}/api/dashboard", address))
        .query(&[("search", "xy")])
        .header("x-admin-token", &token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(filtered["results"].as_array().unwrap().len(), 1);
    assert_eq!(filtered["leaderboard"][0]["candidateId"], "XY-1");
    assert_eq!(filtered["leaderboard"][0]["rank"], 1);
}

#[tokio::test]
async fn question_crud_with_soft_delete_numbering() {
    let source = MemoryRecordSource::new();
    let address = spawn_app(source.clone(), false).await;
    let client = reqwest::Client::new();
    let token = login(&client, &address).await;

    let mut ids = Vec::new();
    for text in ["First?", "Second?", "Third?"] {
        let resp = client
            .post(format!("{}/api/exam/questions", address))
            .header("x-admin-token", &token)
            .json(&json!({
                "question": text,
                "options": ["yes", {"text": "no"}],
                "correctOptionIndex": 1
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 201);
        let body: Value = resp.json().await.unwrap();
        ids.push(body["questionId"].as_str().unwrap().to_string());
        // distinct creation timestamps
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    let resp = client
        .put(format!("{}/api/exam/questions/{}", address, ids[2]))
        .header("x-admin-token", &token)
        .json(&json!({
            "question": "Third, edited?",
            "options": ["a", "b", "c"],
            "correctOptionIndex": "2"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let resp = client
        .delete(format!("{}/api/exam/questions/{}", address, ids[0]))
        .header("x-admin-token", &token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let listed: Value = client
        .get(format!("{}/api/exam/questions", address))
        .header("x-admin-token", &token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed["total"], 2);
    let questions = listed["questions"].as_array().unwrap();
    assert_eq!(questions[0]["questionNumber"], 1);
    assert_eq!(questions[0]["question"], "Second?");
    assert_eq!(questions[0]["correctOptionIndex"], 1);
    assert_eq!(questions[1]["questionNumber"], 2);
    assert_eq!(questions[1]["question"], "Third, edited?");
    assert_eq!(questions[1]["correctOptionIndex"], 2);
    let external = questions[1]["id"].as_str().unwrap();
    assert_eq!(
        questions[1]["options"][2]["id"].as_str().unwrap(),
        format!("{}-opt-3", external)
    );

    let summary: Value = client
        .get(format!("{}/api/exam/summary", address))
        .header("x-admin-token", &token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(summary["totalActiveQuestions"], 2);

    // The deleted record is still stored.
    assert_eq!(source.all_questions().len(), 3);

    let resp = client
        .delete(format!("{}/api/exam/questions/{}", address, ids[0]))
        .header("x-admin-token", &token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);
}

#[tokio::test]
async fn invalid_question_is_rejected_without_a_write() {
    let source = MemoryRecordSource::new();
    let address = spawn_app(source.clone(), false).await;
    let client = reqwest::Client::new();
    let token = login(&client, &address).await;

    let resp = client
        .post(format!("{}/api/exam/questions", address))
        .header("x-admin-token", &token)
        .json(&json!({
            "question": "Only one option?",
            "options": ["lonely"],
            "correctOptionIndex": 0
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["ok"], false);
    assert!(source.all_questions().is_empty());
}

#[tokio::test]
async fn edit_lock_blocks_mutations_with_423() {
    let address = spawn_app(MemoryRecordSource::new(), true).await;
    let client = reqwest::Client::new();
    let token = login(&client, &address).await;

    let valid = json!({
        "question": "Valid?",
        "options": ["a", "b"],
        "correctOptionIndex": 0
    });

    let create = client
        .post(format!("{}/api/exam/questions", address))
        .header("x-admin-token", &token)
        .json(&valid)
        .send()
        .await
        .unwrap();
    let update = client
        .put(format!("{}/api/exam/questions/1", address))
        .header("x-admin-token", &token)
        .json(&valid)
        .send()
        .await
        .unwrap();
    let delete = client
        .delete(format!("{}/api/exam/questions/1", address))
        .header("x-admin-token", &token)
        .send()
        .await
        .unwrap();

    for resp in [create, update, delete] {
        assert_eq!(resp.status().as_u16(), 423);
    }

    let config: Value = client
        .get(format!("{}/api/config", address))
        .header("x-admin-token", &token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(config["examEditLock"], true);
}

#[tokio::test]
async fn edit_lock_is_reported_before_the_body_is_read() {
    let address = spawn_app(MemoryRecordSource::new(), true).await;
    let client = reqwest::Client::new();
    let token = login(&client, &address).await;

    let create = client
        .post(format!("{}/api/exam/questions", address))
        .header("x-admin-token", &token)
        .json(&json!({ "question": 5, "options": "a,b", "correctOptionIndex": 0 }))
        .send()
        .await
        .unwrap();
    let update = client
        .put(format!("{}/api/exam/questions/1", address))
        .header("x-admin-token", &token)
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();

    for resp in [create, update] {
        assert_eq!(resp.status().as_u16(), 423);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["ok"], false);
    }
}

#[tokio::test]
async fn malformed_question_body_is_a_json_400() {
    let source = MemoryRecordSource::new();
    let address = spawn_app(source.clone(), false).await;
    let client = reqwest::Client::new();
    let token = login(&client, &address).await;

    let resp = client
        .post(format!("{}/api/exam/questions", address))
        .header("x-admin-token", &token)
        .json(&json!({ "question": "Q?", "options": "a,b", "correctOptionIndex": 0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["ok"], false);
    assert!(body["error"].is_string());
    assert!(source.all_questions().is_empty());

    // Scalar question text is taken as text.
    let resp = client
        .post(format!("{}/api/exam/questions", address))
        .header("x-admin-token", &token)
        .json(&json!({ "question": 5, "options": ["a", "b"], "correctOptionIndex": 0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 201);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["question"]["question"], "5");
}

#[tokio::test]
async fn unreachable_source_is_a_503() {
    let source = MemoryRecordSource::new();
    source.set_unavailable(true);
    let address = spawn_app(source, false).await;
    let client = reqwest::Client::new();
    let token = login(&client, &address).await;

    let resp = client
        .get(format!("{}/api/dashboard", address))
        .header("x-admin-token", &token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 503);
}

#[tokio::test]
async fn unknown_api_route_is_json_404_and_ui_falls_back_to_index() {
    let address = spawn_app(MemoryRecordSource::new(), false).await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{}/api/random_path_that_does_not_exist", address))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "API route not found.");

    let resp = client
        .get(format!("{}/some/client/route", address))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    assert!(resp.text().await.unwrap().contains("Exam Admin Portal"));
}
