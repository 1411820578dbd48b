use async_trait::async_trait;
use reqwest::{Client, Response};
use rocket::serde::json::Value;
use rocket::serde::Deserialize;
use tracing::debug;

use super::*;

/// Scores kept in a hosted table exposed through a PostgREST endpoint (e.g. Supabase).
pub struct RestScoreStore {
    client: Client,
    table_url: String,
    api_key: String,
}

/// Error body returned by PostgREST.
#[derive(Deserialize, Debug)]
#[serde(crate = "rocket::serde")]
struct RestError {
    message: String,
}

impl RestScoreStore {
    pub fn new(base_url: &str, api_key: &str, table: &str) -> StoreResult<Self> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            table_url: table_url(base_url, table),
            api_key: api_key.to_owned(),
        })
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }
}

fn table_url(base_url: &str, table: &str) -> String {
    format!("{}/rest/v1/{}", base_url.trim_end_matches('/'), table)
}

fn top_scores_query(limit: usize) -> [(&'static str, String); 3] {
    [
        ("select", "player_name,score,difficulty,time_taken".to_owned()),
        ("order", "score.desc".to_owned()),
        ("limit", limit.to_string()),
    ]
}

/// Turns a non-successful response into [`StoreError::Rejected`].
async fn check_status(response: Response) -> StoreResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await?;
    Err(StoreError::Rejected {
        status: status.as_u16(),
        message: rejection_message(&body),
    })
}

fn rejection_message(body: &str) -> String {
    match rocket::serde::json::from_str::<RestError>(body) {
        Ok(error) => error.message,
        Err(_) if body.trim().is_empty() => "empty response from score store".to_owned(),
        Err(_) => body.trim().to_owned(),
    }
}

#[async_trait]
impl ScoreStore for RestScoreStore {
    async fn top_scores(&self, limit: usize) -> StoreResult<Vec<ScoreEntry>> {
        debug!("fetching top {} scores from {}", limit, self.table_url);
        let request = self
            .client
            .get(&self.table_url)
            .query(&top_scores_query(limit));
        let response = self.authorized(request).send().await?;
        let entries = check_status(response).await?.json().await?;
        Ok(entries)
    }

    async fn insert_score(&self, record: &ScoreRecord) -> StoreResult<Value> {
        let request = self
            .client
            .post(&self.table_url)
            .header("Prefer", "return=representation")
            .json(record);
        let response = self.authorized(request).send().await?;
        // Passed through untouched, whatever columns the table has
        let body = check_status(response).await?.text().await?;
        let inserted = rocket::serde::json::from_str(&body)?;
        Ok(inserted)
    }
}
