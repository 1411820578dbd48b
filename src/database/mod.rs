use std::sync::Arc;

use async_trait::async_trait;
use rocket::serde::json::Value;

use crate::config::{self, StoreSettings};

pub mod rest;
mod score;
pub mod sql;
mod store_error;

pub use rest::RestScoreStore;
pub use score::*;
pub use sql::{SqlDialect, SqlScoreStore};
pub use store_error::*;

/// A table of score records living outside of this process.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScoreStore: Send + Sync {
    /// Fetches at most `limit` records, highest score first.
    async fn top_scores(&self, limit: usize) -> StoreResult<Vec<ScoreEntry>>;

    /// Writes a single record and returns whatever the store reports back for it,
    /// usually an array holding the inserted row with its generated columns.
    async fn insert_score(&self, record: &ScoreRecord) -> StoreResult<Value>;
}

/// Opens the store described by `settings`.
/// Http(s) endpoints are treated as a hosted REST table, anything else as a database url.
pub async fn connect(settings: &StoreSettings) -> StoreResult<Arc<dyn ScoreStore>> {
    if config::is_http_url(&settings.url) {
        let key = settings.key.as_deref().unwrap_or_default();
        let store = RestScoreStore::new(&settings.url, key, &settings.table)?;
        Ok(Arc::new(store))
    } else {
        let store = SqlScoreStore::connect(&settings.url, &settings.table).await?;
        Ok(Arc::new(store))
    }
}
