use std::sync::Arc;

use rand::Rng;
use rocket::{
    http::{ContentType, Status},
    local::asynchronous::{Client, LocalResponse},
    serde::json::Value,
};
use sqlx::any::AnyPoolOptions;

use crate::{
    database::{ScoreEntry, ScoreSubmission, SqlDialect, SqlScoreStore},
    leaderboard::TOP_SCORES_LIMIT,
    requests::{ErrorDetail, IndexPage},
    service::ScoreService,
};

const TEST_TABLE: &str = "scores";

const CREATE_TABLE: &str = "CREATE TABLE scores (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    player_name TEXT NOT NULL,
    score BIGINT NOT NULL,
    difficulty TEXT NOT NULL,
    time_taken BIGINT NOT NULL,
    created_at TEXT NOT NULL
)";

/// Opens a fresh in-memory sqlite store, optionally creating the scores table.
async fn sqlite_store(create_table: bool) -> SqlScoreStore {
    sqlx::any::install_default_drivers();
    // A single connection that never expires, so the in-memory database outlives the test
    let pool = AnyPoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite database");

    let store = SqlScoreStore::new(pool, SqlDialect::Sqlite, TEST_TABLE);
    if create_table {
        sqlx::query(CREATE_TABLE)
            .execute(store.pool())
            .await
            .expect("scores table");
    }
    store
}

async fn spawn_client_with(service: ScoreService) -> Client {
    Client::tracked(super::build(service, IndexPage::default()))
        .await
        .expect("valid rocket instance")
}

async fn spawn_client() -> Client {
    let store = sqlite_store(true).await;
    spawn_client_with(ScoreService::new(Arc::new(store))).await
}

async fn deserialize_response<'a, T: rocket::serde::DeserializeOwned>(
    response: LocalResponse<'a>,
) -> rocket::serde::json::serde_json::Result<T> {
    let string = response.into_string().await.unwrap();
    rocket::serde::json::serde_json::from_str(&string)
}

/// Posts a score and returns the rows the server reports as stored.
async fn save_score<'a>(
    client: &'a Client,
    submission: &ScoreSubmission,
) -> Result<Vec<Value>, LocalResponse<'a>> {
    let response = client.post("/api/scores").json(submission).dispatch().await;
    if response.status() != Status::Ok {
        return Err(response);
    }

    let stored = deserialize_response::<Vec<Value>>(response)
        .await
        .unwrap();
    Ok(stored)
}

/// Fetches the top scores.
async fn get_scores(client: &Client) -> Result<Vec<ScoreEntry>, LocalResponse<'_>> {
    let response = client.get("/api/scores").dispatch().await;
    if response.status() != Status::Ok {
        return Err(response);
    }

    let scores = deserialize_response::<Vec<ScoreEntry>>(response)
        .await
        .unwrap();
    Ok(scores)
}

async fn post_raw<'a>(client: &'a Client, body: &'a str) -> LocalResponse<'a> {
    client
        .post("/api/scores")
        .header(ContentType::JSON)
        .body(body)
        .dispatch()
        .await
}

#[rocket::async_test]
async fn index_page_is_served() {
    let client = spawn_client().await;
    let response = client.get("/").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(response.content_type(), Some(ContentType::HTML));

    let body = response.into_string().await.unwrap();
    assert!(body.contains("/api/scores"));
}

#[rocket::async_test]
async fn index_page_falls_back_when_the_template_is_missing() {
    let service = ScoreService::unavailable();
    let page = IndexPage::new(Some("does/not/exist/index.html".into()));
    let client = Client::tracked(super::build(service, page))
        .await
        .expect("valid rocket instance");

    let response = client.get("/").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    let body = response.into_string().await.unwrap();
    assert!(body.contains("<h1>Score API</h1>"));
}

/// Saves a score and reads it back from the top of the leaderboard
#[rocket::async_test]
async fn save_then_list() {
    let client = spawn_client().await;

    let ann = ScoreSubmission::new("Ann", 950, "easy", 42);
    let stored = save_score(&client, &ann).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert!(stored[0]["id"].is_i64());
    assert_eq!(stored[0]["player_name"], "Ann");
    assert_eq!(stored[0]["score"], 950);
    assert_eq!(stored[0]["difficulty"], "easy");
    assert_eq!(stored[0]["time_taken"], 42);
    assert!(stored[0]["created_at"].is_string());

    save_score(&client, &ScoreSubmission::new("Bob", 120, "hard", 300))
        .await
        .unwrap();

    let scores = get_scores(&client).await.unwrap();
    assert_eq!(scores.len(), 2);
    assert_eq!(scores[0], ScoreEntry::from(ann));
}

/// The leaderboard is capped and sorted, whatever order the scores arrive in
#[rocket::async_test]
async fn list_is_capped_and_sorted() {
    let client = spawn_client().await;

    let mut rng = rand::thread_rng();
    for i in 0..(TOP_SCORES_LIMIT + 5) {
        let submission = ScoreSubmission::new(
            format!("player{}", i),
            rng.gen_range(-1000..10_000),
            "normal",
            rng.gen_range(0..600),
        );
        save_score(&client, &submission).await.unwrap();
    }

    let scores = get_scores(&client).await.unwrap();
    assert_eq!(scores.len(), TOP_SCORES_LIMIT);
    assert!(scores.windows(2).all(|pair| pair[0].score >= pair[1].score));
}

/// Identical submissions are stored as separate records
#[rocket::async_test]
async fn duplicate_submissions_are_kept() {
    let client = spawn_client().await;

    let submission = ScoreSubmission::new("Ann", 500, "easy", 10);
    let first = save_score(&client, &submission).await.unwrap();
    let second = save_score(&client, &submission).await.unwrap();
    assert_ne!(first[0]["id"], second[0]["id"]);

    let scores = get_scores(&client).await.unwrap();
    assert_eq!(scores.len(), 2);
    assert!(scores.iter().all(|entry| *entry == ScoreEntry::from(submission.clone())));
}

/// Malformed bodies are rejected before anything is written
#[rocket::async_test]
async fn malformed_submissions_are_rejected() {
    let client = spawn_client().await;

    let missing_field = r#"{"player_name": "Ann", "score": 950, "difficulty": "easy"}"#;
    let response = post_raw(&client, missing_field).await;
    assert_eq!(response.status(), Status::UnprocessableEntity);
    let error = deserialize_response::<ErrorDetail>(response).await.unwrap();
    assert!(
        error.detail.starts_with("missing field `time_taken`"),
        "{}",
        error.detail
    );

    let string_score =
        r#"{"player_name": "Ann", "score": "lots", "difficulty": "easy", "time_taken": 42}"#;
    let response = post_raw(&client, string_score).await;
    assert_eq!(response.status(), Status::UnprocessableEntity);
    let error = deserialize_response::<ErrorDetail>(response).await.unwrap();
    assert!(
        error.detail.starts_with("invalid type: string \"lots\""),
        "{}",
        error.detail
    );

    let response = post_raw(&client, "{not json").await;
    assert_eq!(response.status(), Status::BadRequest);
    let error = deserialize_response::<ErrorDetail>(response).await.unwrap();
    assert!(error.detail.contains("line 1"), "{}", error.detail);

    assert!(get_scores(&client).await.unwrap().is_empty());
}

/// Without a store both endpoints answer with a 500 and a detail message
#[rocket::async_test]
async fn unavailable_store() {
    let client = spawn_client_with(ScoreService::unavailable()).await;

    let response = get_scores(&client).await.unwrap_err();
    assert_eq!(response.status(), Status::InternalServerError);
    let error = deserialize_response::<ErrorDetail>(response).await.unwrap();
    assert_eq!(
        error,
        ErrorDetail::new("score store connection is not configured")
    );

    let submission = ScoreSubmission::new("Ann", 950, "easy", 42);
    let response = save_score(&client, &submission).await.unwrap_err();
    assert_eq!(response.status(), Status::InternalServerError);
    let error = deserialize_response::<ErrorDetail>(response).await.unwrap();
    assert_eq!(
        error,
        ErrorDetail::new("score store connection is not configured")
    );
}

/// Store failures are echoed back in the detail message
#[rocket::async_test]
async fn store_errors_are_reported() {
    let store = sqlite_store(false).await;
    let client = spawn_client_with(ScoreService::new(Arc::new(store))).await;

    let response = get_scores(&client).await.unwrap_err();
    assert_eq!(response.status(), Status::InternalServerError);
    let error = deserialize_response::<ErrorDetail>(response).await.unwrap();
    assert!(error.detail.contains("no such table"), "{}", error.detail);

    let submission = ScoreSubmission::new("Ann", 950, "easy", 42);
    let response = save_score(&client, &submission).await.unwrap_err();
    assert_eq!(response.status(), Status::InternalServerError);
}

#[rocket::async_test]
async fn unknown_routes_answer_with_json() {
    let client = spawn_client().await;
    let response = client.get("/api/unknown").dispatch().await;
    assert_eq!(response.status(), Status::NotFound);
    let error = deserialize_response::<ErrorDetail>(response).await.unwrap();
    assert!(error.detail.contains("/api/unknown"));
}
