use std::sync::Arc;

use rocket::serde::json::Value;
use tracing::{debug, info};

use crate::database::{ScoreEntry, ScoreStore, ScoreSubmission, StoreError};
use crate::leaderboard::{Leaderboard, TOP_SCORES_LIMIT};

#[derive(Debug)]
pub enum ServiceError {
    /// No connection to the score store was established at startup.
    Unavailable,
    Upstream(StoreError),
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Unavailable => None,
            Self::Upstream(error) => Some(error),
        }
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable => write!(f, "score store connection is not configured"),
            Self::Upstream(error) => write!(f, "{}", error),
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(error: StoreError) -> Self {
        Self::Upstream(error)
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

/// Reads and writes score records through an injected [`ScoreStore`].
pub struct ScoreService {
    store: Option<Arc<dyn ScoreStore>>,
}

impl ScoreService {
    pub fn new(store: Arc<dyn ScoreStore>) -> Self {
        Self { store: Some(store) }
    }

    /// A service without a store: every operation fails with [`ServiceError::Unavailable`].
    pub fn unavailable() -> Self {
        Self { store: None }
    }

    fn store(&self) -> ServiceResult<&dyn ScoreStore> {
        self.store.as_deref().ok_or(ServiceError::Unavailable)
    }

    pub async fn list_top_scores(&self) -> ServiceResult<Leaderboard<ScoreEntry>> {
        let entries = self.store()?.top_scores(TOP_SCORES_LIMIT).await?;
        let leaderboard = Leaderboard::ranked(entries, TOP_SCORES_LIMIT);
        debug!("fetched {} top scores", leaderboard.len());
        Ok(leaderboard)
    }

    /// Stamps the submission with the server's local time and writes it.
    /// Every call creates a new record, even for identical submissions.
    /// Returns the store's answer unchanged.
    pub async fn save_score(&self, submission: ScoreSubmission) -> ServiceResult<Value> {
        let store = self.store()?;
        let record = submission.stamp(chrono::Local::now().naive_local());
        let stored = store.insert_score(&record).await?;
        info!(
            "saved score {} for player {:?} ({})",
            record.score, record.player_name, record.difficulty
        );
        Ok(stored)
    }
}
