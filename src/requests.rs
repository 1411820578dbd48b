use std::path::PathBuf;

use rocket::http::Status;
use rocket::response::{self, content::RawHtml, status, Responder};
use rocket::serde::json::{self, Json, Value};
use rocket::serde::{Deserialize, Serialize};
use rocket::{catch, get, post, Request, State};
use tracing::{error, warn};

use crate::database::{ScoreEntry, ScoreSubmission};
use crate::leaderboard::Leaderboard;
use crate::service::{ScoreService, ServiceError};

/// Body of every error response.
#[derive(Serialize, Deserialize, PartialEq, Debug)]
#[serde(crate = "rocket::serde")]
pub struct ErrorDetail {
    pub detail: String,
}

impl ErrorDetail {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

impl<'r> Responder<'r, 'static> for ServiceError {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        error!("{} {} failed: {}", request.method(), request.uri(), self);
        status::Custom(
            Status::InternalServerError,
            Json(ErrorDetail::new(self.to_string())),
        )
        .respond_to(request)
    }
}

/// Failures of a single request: a body that does not describe a score, or the service failing.
#[derive(Debug)]
pub enum RequestError {
    InvalidBody { status: Status, detail: String },
    Service(ServiceError),
}

impl From<ServiceError> for RequestError {
    fn from(error: ServiceError) -> Self {
        Self::Service(error)
    }
}

impl From<json::Error<'_>> for RequestError {
    fn from(error: json::Error<'_>) -> Self {
        let status = match &error {
            // Well-formed JSON of the wrong shape: missing fields, wrong types
            json::Error::Parse(_, error) if error.is_data() => Status::UnprocessableEntity,
            _ => Status::BadRequest,
        };
        let detail = match error {
            json::Error::Parse(_, error) => error.to_string(),
            json::Error::Io(error) => error.to_string(),
        };
        Self::InvalidBody { status, detail }
    }
}

impl<'r> Responder<'r, 'static> for RequestError {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        match self {
            Self::InvalidBody { status, detail } => {
                warn!("{} {} rejected: {}", request.method(), request.uri(), detail);
                status::Custom(status, Json(ErrorDetail::new(detail))).respond_to(request)
            }
            Self::Service(error) => error.respond_to(request),
        }
    }
}

pub type RequestResult<T> = std::result::Result<T, RequestError>;

/// Where the landing page comes from.
#[derive(Clone, Debug, Default)]
pub struct IndexPage {
    template: Option<PathBuf>,
}

impl IndexPage {
    pub fn new(template: Option<PathBuf>) -> Self {
        Self { template }
    }

    /// Reads the configured template, falling back to the built-in page.
    pub async fn render(&self) -> String {
        let Some(path) = &self.template else {
            return INDEX_HTML.to_owned();
        };
        match tokio::fs::read_to_string(path).await {
            Ok(html) => html,
            Err(err) => {
                warn!("failed to read index template {}: {}", path.display(), err);
                INDEX_HTML.to_owned()
            }
        }
    }
}

#[get("/")]
pub async fn index(page: &State<IndexPage>) -> RawHtml<String> {
    RawHtml(page.render().await)
}

/// Fetches the ten best scores, highest first.
#[get("/api/scores")]
pub async fn get_scores(
    service: &State<ScoreService>,
) -> RequestResult<Json<Leaderboard<ScoreEntry>>> {
    let leaderboard = service.list_top_scores().await?;
    Ok(Json(leaderboard))
}

/// Records a new score and echoes what the store returned for it.
#[post("/api/scores", data = "<submission>")]
pub async fn save_score(
    submission: Result<Json<ScoreSubmission>, json::Error<'_>>,
    service: &State<ScoreService>,
) -> RequestResult<Json<Value>> {
    let submission = submission?.into_inner();
    let stored = service.save_score(submission).await?;
    Ok(Json(stored))
}

#[catch(404)]
pub fn not_found(request: &Request<'_>) -> Json<ErrorDetail> {
    Json(ErrorDetail::new(format!("no route for {}", request.uri())))
}

#[catch(500)]
pub fn internal_error() -> Json<ErrorDetail> {
    Json(ErrorDetail::new("internal server error"))
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
    <head>
        <title>Score API</title>
        <meta charset="UTF-8">
        <meta name="viewport" content="width=device-width, initial-scale=1.0">
        <style>
            body {
                font-family: Arial, sans-serif;
                line-height: 1.6;
                max-width: 800px;
                margin: 0 auto;
                padding: 20px;
            }
            .endpoint {
                background-color: #f4f4f4;
                padding: 10px;
                border-radius: 5px;
                margin-bottom: 10px;
            }
        </style>
    </head>
    <body>
        <h1>Score API</h1>
        <p>The API is up and running.</p>

        <h2>Endpoints</h2>

        <div class="endpoint">
            <h3>GET /api/scores</h3>
            <p>Returns the ten highest scores.</p>
        </div>

        <div class="endpoint">
            <h3>POST /api/scores</h3>
            <p>Stores a new score. The body must be JSON of the form:</p>
            <pre><code>
{
    "player_name": "player",
    "score": 1000,
    "difficulty": "easy",
    "time_taken": 60
}
            </code></pre>
        </div>
    </body>
</html>
"#;
